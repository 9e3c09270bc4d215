//! Canonical anatomical joint slots.
//!
//! Two independently-authored skeletons are correlated through this fixed
//! enumeration. The set and its order are identical for every skeleton; a
//! skeleton may leave any slot unmapped.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Number of canonical slots. Also the terminal sentinel of the enumeration.
pub const SLOT_COUNT: usize = 55;

/// A canonical anatomical joint identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalSlot {
    Hips,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    LeftFoot,
    RightFoot,
    Spine,
    Chest,
    Neck,
    Head,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
    LeftToes,
    RightToes,
    LeftEye,
    RightEye,
    Jaw,
    LeftThumbProximal,
    LeftThumbIntermediate,
    LeftThumbDistal,
    LeftIndexProximal,
    LeftIndexIntermediate,
    LeftIndexDistal,
    LeftMiddleProximal,
    LeftMiddleIntermediate,
    LeftMiddleDistal,
    LeftRingProximal,
    LeftRingIntermediate,
    LeftRingDistal,
    LeftLittleProximal,
    LeftLittleIntermediate,
    LeftLittleDistal,
    RightThumbProximal,
    RightThumbIntermediate,
    RightThumbDistal,
    RightIndexProximal,
    RightIndexIntermediate,
    RightIndexDistal,
    RightMiddleProximal,
    RightMiddleIntermediate,
    RightMiddleDistal,
    RightRingProximal,
    RightRingIntermediate,
    RightRingDistal,
    RightLittleProximal,
    RightLittleIntermediate,
    RightLittleDistal,
    UpperChest,
}

impl CanonicalSlot {
    /// All slots in canonical order.
    pub const ALL: [CanonicalSlot; SLOT_COUNT] = [
        CanonicalSlot::Hips,
        CanonicalSlot::LeftUpperLeg,
        CanonicalSlot::RightUpperLeg,
        CanonicalSlot::LeftLowerLeg,
        CanonicalSlot::RightLowerLeg,
        CanonicalSlot::LeftFoot,
        CanonicalSlot::RightFoot,
        CanonicalSlot::Spine,
        CanonicalSlot::Chest,
        CanonicalSlot::Neck,
        CanonicalSlot::Head,
        CanonicalSlot::LeftShoulder,
        CanonicalSlot::RightShoulder,
        CanonicalSlot::LeftUpperArm,
        CanonicalSlot::RightUpperArm,
        CanonicalSlot::LeftLowerArm,
        CanonicalSlot::RightLowerArm,
        CanonicalSlot::LeftHand,
        CanonicalSlot::RightHand,
        CanonicalSlot::LeftToes,
        CanonicalSlot::RightToes,
        CanonicalSlot::LeftEye,
        CanonicalSlot::RightEye,
        CanonicalSlot::Jaw,
        CanonicalSlot::LeftThumbProximal,
        CanonicalSlot::LeftThumbIntermediate,
        CanonicalSlot::LeftThumbDistal,
        CanonicalSlot::LeftIndexProximal,
        CanonicalSlot::LeftIndexIntermediate,
        CanonicalSlot::LeftIndexDistal,
        CanonicalSlot::LeftMiddleProximal,
        CanonicalSlot::LeftMiddleIntermediate,
        CanonicalSlot::LeftMiddleDistal,
        CanonicalSlot::LeftRingProximal,
        CanonicalSlot::LeftRingIntermediate,
        CanonicalSlot::LeftRingDistal,
        CanonicalSlot::LeftLittleProximal,
        CanonicalSlot::LeftLittleIntermediate,
        CanonicalSlot::LeftLittleDistal,
        CanonicalSlot::RightThumbProximal,
        CanonicalSlot::RightThumbIntermediate,
        CanonicalSlot::RightThumbDistal,
        CanonicalSlot::RightIndexProximal,
        CanonicalSlot::RightIndexIntermediate,
        CanonicalSlot::RightIndexDistal,
        CanonicalSlot::RightMiddleProximal,
        CanonicalSlot::RightMiddleIntermediate,
        CanonicalSlot::RightMiddleDistal,
        CanonicalSlot::RightRingProximal,
        CanonicalSlot::RightRingIntermediate,
        CanonicalSlot::RightRingDistal,
        CanonicalSlot::RightLittleProximal,
        CanonicalSlot::RightLittleIntermediate,
        CanonicalSlot::RightLittleDistal,
        CanonicalSlot::UpperChest,
    ];

    /// Position of this slot in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the slot at `index`, or `None` past the terminal sentinel.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the humanoid anatomy name used as the key of naming tables.
    pub fn canonical_name(self) -> &'static str {
        match self {
            CanonicalSlot::Hips => "Hips",
            CanonicalSlot::LeftUpperLeg => "LeftUpperLeg",
            CanonicalSlot::RightUpperLeg => "RightUpperLeg",
            CanonicalSlot::LeftLowerLeg => "LeftLowerLeg",
            CanonicalSlot::RightLowerLeg => "RightLowerLeg",
            CanonicalSlot::LeftFoot => "LeftFoot",
            CanonicalSlot::RightFoot => "RightFoot",
            CanonicalSlot::Spine => "Spine",
            CanonicalSlot::Chest => "Chest",
            CanonicalSlot::Neck => "Neck",
            CanonicalSlot::Head => "Head",
            CanonicalSlot::LeftShoulder => "LeftShoulder",
            CanonicalSlot::RightShoulder => "RightShoulder",
            CanonicalSlot::LeftUpperArm => "LeftUpperArm",
            CanonicalSlot::RightUpperArm => "RightUpperArm",
            CanonicalSlot::LeftLowerArm => "LeftLowerArm",
            CanonicalSlot::RightLowerArm => "RightLowerArm",
            CanonicalSlot::LeftHand => "LeftHand",
            CanonicalSlot::RightHand => "RightHand",
            CanonicalSlot::LeftToes => "LeftToes",
            CanonicalSlot::RightToes => "RightToes",
            CanonicalSlot::LeftEye => "LeftEye",
            CanonicalSlot::RightEye => "RightEye",
            CanonicalSlot::Jaw => "Jaw",
            CanonicalSlot::LeftThumbProximal => "Left Thumb Proximal",
            CanonicalSlot::LeftThumbIntermediate => "Left Thumb Intermediate",
            CanonicalSlot::LeftThumbDistal => "Left Thumb Distal",
            CanonicalSlot::LeftIndexProximal => "Left Index Proximal",
            CanonicalSlot::LeftIndexIntermediate => "Left Index Intermediate",
            CanonicalSlot::LeftIndexDistal => "Left Index Distal",
            CanonicalSlot::LeftMiddleProximal => "Left Middle Proximal",
            CanonicalSlot::LeftMiddleIntermediate => "Left Middle Intermediate",
            CanonicalSlot::LeftMiddleDistal => "Left Middle Distal",
            CanonicalSlot::LeftRingProximal => "Left Ring Proximal",
            CanonicalSlot::LeftRingIntermediate => "Left Ring Intermediate",
            CanonicalSlot::LeftRingDistal => "Left Ring Distal",
            CanonicalSlot::LeftLittleProximal => "Left Little Proximal",
            CanonicalSlot::LeftLittleIntermediate => "Left Little Intermediate",
            CanonicalSlot::LeftLittleDistal => "Left Little Distal",
            CanonicalSlot::RightThumbProximal => "Right Thumb Proximal",
            CanonicalSlot::RightThumbIntermediate => "Right Thumb Intermediate",
            CanonicalSlot::RightThumbDistal => "Right Thumb Distal",
            CanonicalSlot::RightIndexProximal => "Right Index Proximal",
            CanonicalSlot::RightIndexIntermediate => "Right Index Intermediate",
            CanonicalSlot::RightIndexDistal => "Right Index Distal",
            CanonicalSlot::RightMiddleProximal => "Right Middle Proximal",
            CanonicalSlot::RightMiddleIntermediate => "Right Middle Intermediate",
            CanonicalSlot::RightMiddleDistal => "Right Middle Distal",
            CanonicalSlot::RightRingProximal => "Right Ring Proximal",
            CanonicalSlot::RightRingIntermediate => "Right Ring Intermediate",
            CanonicalSlot::RightRingDistal => "Right Ring Distal",
            CanonicalSlot::RightLittleProximal => "Right Little Proximal",
            CanonicalSlot::RightLittleIntermediate => "Right Little Intermediate",
            CanonicalSlot::RightLittleDistal => "Right Little Distal",
            CanonicalSlot::UpperChest => "UpperChest",
        }
    }

    /// Looks a slot up by its canonical anatomy name.
    pub fn from_canonical_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|slot| slot.canonical_name() == name)
    }
}

impl std::fmt::Display for CanonicalSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_name())
    }
}

// =============================================================================
// Slot-indexed storage
// =============================================================================

/// Fixed-size per-slot storage indexed by [`CanonicalSlot`].
///
/// Replaces keyed maps for per-joint state: every slot always has an entry,
/// so lookups cannot miss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotArray<T>([T; SLOT_COUNT]);

impl<T> SlotArray<T> {
    /// Builds an array by evaluating `f` for every slot in canonical order.
    pub fn from_fn(mut f: impl FnMut(CanonicalSlot) -> T) -> Self {
        Self(std::array::from_fn(|i| f(CanonicalSlot::ALL[i])))
    }

    /// Iterates `(slot, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalSlot, &T)> {
        CanonicalSlot::ALL.iter().copied().zip(self.0.iter())
    }

    /// Iterates `(slot, value)` pairs mutably in canonical order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (CanonicalSlot, &mut T)> {
        CanonicalSlot::ALL.iter().copied().zip(self.0.iter_mut())
    }

    /// Returns the values as a slice in canonical order.
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T: Clone> SlotArray<T> {
    /// Builds an array with every slot set to `value`.
    pub fn splat(value: T) -> Self {
        Self::from_fn(|_| value.clone())
    }
}

impl<T: Default> Default for SlotArray<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<CanonicalSlot> for SlotArray<T> {
    type Output = T;

    fn index(&self, slot: CanonicalSlot) -> &T {
        &self.0[slot.index()]
    }
}

impl<T> IndexMut<CanonicalSlot> for SlotArray<T> {
    fn index_mut(&mut self, slot: CanonicalSlot) -> &mut T {
        &mut self.0[slot.index()]
    }
}
