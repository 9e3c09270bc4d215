//! Bone naming conventions and streamed-name resolution.
//!
//! Each convention maps canonical slots to the suffix the streaming host uses
//! for that joint. The streamed bone name is the asset prefix joined to the
//! suffix with an underscore. Slots a convention cannot represent are simply
//! absent from the table; that is a valid unmapped joint, not a fault.

use glam::Quat;
use serde::{Deserialize, Serialize};

use crate::slot::{CanonicalSlot, SlotArray};

/// Streaming host bone naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// Motive native names (`Hip`, `Ab`, `LUArm`, ...).
    #[default]
    Motive,
    /// FBX / MotionBuilder names (`Hips`, `Spine1`, `LeftForeArm`, ...).
    Fbx,
    /// BVH names (`Hips`, `Chest2`, `LeftElbow`, ...).
    Bvh,
}

impl NamingConvention {
    /// Returns the convention name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingConvention::Motive => "motive",
            NamingConvention::Fbx => "fbx",
            NamingConvention::Bvh => "bvh",
        }
    }

    /// Returns the `(slot, suffix)` pairs this convention can represent.
    pub fn suffixes(&self) -> &'static [(CanonicalSlot, &'static str)] {
        match self {
            NamingConvention::Motive => MOTIVE_SUFFIXES,
            NamingConvention::Fbx => FBX_SUFFIXES,
            NamingConvention::Bvh => BVH_SUFFIXES,
        }
    }

    /// Returns the suffix for `slot`, if the convention represents it.
    pub fn suffix(&self, slot: CanonicalSlot) -> Option<&'static str> {
        self.suffixes()
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, suffix)| *suffix)
    }

    /// Rest rotation the streamed skeleton implies for `slot`, when it differs
    /// from identity.
    ///
    /// Streamed skeletons are described with identity rest rotations, but the
    /// proximal thumbs rest at +/-60 degrees about Y relative to the humanoid
    /// T-pose. The correction is the same for every convention.
    pub fn rest_correction(&self, slot: CanonicalSlot) -> Option<Quat> {
        match slot {
            CanonicalSlot::LeftThumbProximal => Some(Quat::from_rotation_y(60f32.to_radians())),
            CanonicalSlot::RightThumbProximal => Some(Quat::from_rotation_y(-60f32.to_radians())),
            _ => None,
        }
    }
}

impl std::fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joins an asset prefix and a convention suffix into a streamed bone name.
///
/// An empty prefix yields the bare suffix.
pub fn streamed_name(prefix: &str, suffix: &str) -> String {
    if prefix.is_empty() {
        suffix.to_string()
    } else {
        format!("{}_{}", prefix, suffix)
    }
}

// =============================================================================
// Name tables
// =============================================================================

/// Resolved mapping from canonical slot to skeleton bone name.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneNameTable {
    names: SlotArray<Option<String>>,
    convention: Option<NamingConvention>,
}

impl BoneNameTable {
    /// Resolves the table for a convention and asset prefix.
    ///
    /// Pure and deterministic: the same inputs always produce an identical
    /// table, so callers simply recompute it when either input changes.
    pub fn resolve(convention: NamingConvention, prefix: &str) -> Self {
        let mut names = SlotArray::default();
        for (slot, suffix) in convention.suffixes() {
            names[*slot] = Some(streamed_name(prefix, suffix));
        }
        Self {
            names,
            convention: Some(convention),
        }
    }

    /// Builds a table from explicit `(slot, bone name)` pairs.
    ///
    /// Later pairs for the same slot replace earlier ones.
    pub fn custom<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (CanonicalSlot, S)>,
        S: Into<String>,
    {
        let mut names = SlotArray::default();
        for (slot, name) in pairs {
            names[slot] = Some(name.into());
        }
        Self {
            names,
            convention: None,
        }
    }

    /// The convention this table was resolved from; `None` for custom tables.
    pub fn convention(&self) -> Option<NamingConvention> {
        self.convention
    }

    /// Returns the bone name for `slot`.
    pub fn get(&self, slot: CanonicalSlot) -> Option<&str> {
        self.names[slot].as_deref()
    }

    /// Returns the bone name for a canonical anatomy name.
    pub fn get_by_canonical_name(&self, canonical_name: &str) -> Option<&str> {
        CanonicalSlot::from_canonical_name(canonical_name).and_then(|slot| self.get(slot))
    }

    /// Iterates the represented slots and their bone names in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalSlot, &str)> {
        self.names
            .iter()
            .filter_map(|(slot, name)| name.as_deref().map(|n| (slot, n)))
    }

    /// Number of represented slots.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true when no slot is represented.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Convention suffix tables
// =============================================================================

use CanonicalSlot as S;

const MOTIVE_SUFFIXES: &[(CanonicalSlot, &str)] = &[
    (S::Hips, "Hip"),
    (S::Spine, "Ab"),
    (S::Chest, "Chest"),
    (S::Neck, "Neck"),
    (S::Head, "Head"),
    (S::LeftShoulder, "LShoulder"),
    (S::LeftUpperArm, "LUArm"),
    (S::LeftLowerArm, "LFArm"),
    (S::LeftHand, "LHand"),
    (S::RightShoulder, "RShoulder"),
    (S::RightUpperArm, "RUArm"),
    (S::RightLowerArm, "RFArm"),
    (S::RightHand, "RHand"),
    (S::LeftUpperLeg, "LThigh"),
    (S::LeftLowerLeg, "LShin"),
    (S::LeftFoot, "LFoot"),
    (S::LeftToes, "LToe"),
    (S::RightUpperLeg, "RThigh"),
    (S::RightLowerLeg, "RShin"),
    (S::RightFoot, "RFoot"),
    (S::RightToes, "RToe"),
    (S::LeftThumbProximal, "LThumb1"),
    (S::LeftThumbIntermediate, "LThumb2"),
    (S::LeftThumbDistal, "LThumb3"),
    (S::RightThumbProximal, "RThumb1"),
    (S::RightThumbIntermediate, "RThumb2"),
    (S::RightThumbDistal, "RThumb3"),
    (S::LeftIndexProximal, "LIndex1"),
    (S::LeftIndexIntermediate, "LIndex2"),
    (S::LeftIndexDistal, "LIndex3"),
    (S::RightIndexProximal, "RIndex1"),
    (S::RightIndexIntermediate, "RIndex2"),
    (S::RightIndexDistal, "RIndex3"),
    (S::LeftMiddleProximal, "LMiddle1"),
    (S::LeftMiddleIntermediate, "LMiddle2"),
    (S::LeftMiddleDistal, "LMiddle3"),
    (S::RightMiddleProximal, "RMiddle1"),
    (S::RightMiddleIntermediate, "RMiddle2"),
    (S::RightMiddleDistal, "RMiddle3"),
    (S::LeftRingProximal, "LRing1"),
    (S::LeftRingIntermediate, "LRing2"),
    (S::LeftRingDistal, "LRing3"),
    (S::RightRingProximal, "RRing1"),
    (S::RightRingIntermediate, "RRing2"),
    (S::RightRingDistal, "RRing3"),
    (S::LeftLittleProximal, "LPinky1"),
    (S::LeftLittleIntermediate, "LPinky2"),
    (S::LeftLittleDistal, "LPinky3"),
    (S::RightLittleProximal, "RPinky1"),
    (S::RightLittleIntermediate, "RPinky2"),
    (S::RightLittleDistal, "RPinky3"),
];

const FBX_SUFFIXES: &[(CanonicalSlot, &str)] = &[
    (S::Hips, "Hips"),
    (S::Spine, "Spine"),
    (S::Chest, "Spine1"),
    (S::Neck, "Neck"),
    (S::Head, "Head"),
    (S::LeftShoulder, "LeftShoulder"),
    (S::LeftUpperArm, "LeftArm"),
    (S::LeftLowerArm, "LeftForeArm"),
    (S::LeftHand, "LeftHand"),
    (S::RightShoulder, "RightShoulder"),
    (S::RightUpperArm, "RightArm"),
    (S::RightLowerArm, "RightForeArm"),
    (S::RightHand, "RightHand"),
    (S::LeftUpperLeg, "LeftUpLeg"),
    (S::LeftLowerLeg, "LeftLeg"),
    (S::LeftFoot, "LeftFoot"),
    (S::LeftToes, "LeftToeBase"),
    (S::RightUpperLeg, "RightUpLeg"),
    (S::RightLowerLeg, "RightLeg"),
    (S::RightFoot, "RightFoot"),
    (S::RightToes, "RightToeBase"),
    (S::LeftThumbProximal, "LeftHandThumb1"),
    (S::LeftThumbIntermediate, "LeftHandThumb2"),
    (S::LeftThumbDistal, "LeftHandThumb3"),
    (S::RightThumbProximal, "RightHandThumb1"),
    (S::RightThumbIntermediate, "RightHandThumb2"),
    (S::RightThumbDistal, "RightHandThumb3"),
    (S::LeftIndexProximal, "LeftHandIndex1"),
    (S::LeftIndexIntermediate, "LeftHandIndex2"),
    (S::LeftIndexDistal, "LeftHandIndex3"),
    (S::RightIndexProximal, "RightHandIndex1"),
    (S::RightIndexIntermediate, "RightHandIndex2"),
    (S::RightIndexDistal, "RightHandIndex3"),
    (S::LeftMiddleProximal, "LeftHandMiddle1"),
    (S::LeftMiddleIntermediate, "LeftHandMiddle2"),
    (S::LeftMiddleDistal, "LeftHandMiddle3"),
    (S::RightMiddleProximal, "RightHandMiddle1"),
    (S::RightMiddleIntermediate, "RightHandMiddle2"),
    (S::RightMiddleDistal, "RightHandMiddle3"),
    (S::LeftRingProximal, "LeftHandRing1"),
    (S::LeftRingIntermediate, "LeftHandRing2"),
    (S::LeftRingDistal, "LeftHandRing3"),
    (S::RightRingProximal, "RightHandRing1"),
    (S::RightRingIntermediate, "RightHandRing2"),
    (S::RightRingDistal, "RightHandRing3"),
    (S::LeftLittleProximal, "LeftHandPinky1"),
    (S::LeftLittleIntermediate, "LeftHandPinky2"),
    (S::LeftLittleDistal, "LeftHandPinky3"),
    (S::RightLittleProximal, "RightHandPinky1"),
    (S::RightLittleIntermediate, "RightHandPinky2"),
    (S::RightLittleDistal, "RightHandPinky3"),
];

const BVH_SUFFIXES: &[(CanonicalSlot, &str)] = &[
    (S::Hips, "Hips"),
    (S::Spine, "Chest"),
    (S::Chest, "Chest2"),
    (S::Neck, "Neck"),
    (S::Head, "Head"),
    (S::LeftShoulder, "LeftCollar"),
    (S::LeftUpperArm, "LeftShoulder"),
    (S::LeftLowerArm, "LeftElbow"),
    (S::LeftHand, "LeftWrist"),
    (S::RightShoulder, "RightCollar"),
    (S::RightUpperArm, "RightShoulder"),
    (S::RightLowerArm, "RightElbow"),
    (S::RightHand, "RightWrist"),
    (S::LeftUpperLeg, "LeftHip"),
    (S::LeftLowerLeg, "LeftKnee"),
    (S::LeftFoot, "LeftAnkle"),
    (S::LeftToes, "LeftToe"),
    (S::RightUpperLeg, "RightHip"),
    (S::RightLowerLeg, "RightKnee"),
    (S::RightFoot, "RightAnkle"),
    (S::RightToes, "RightToe"),
    (S::LeftThumbProximal, "LeftFinger0"),
    (S::LeftThumbIntermediate, "LeftFinger01"),
    (S::LeftThumbDistal, "LeftFinger02"),
    (S::RightThumbProximal, "RightFinger0"),
    (S::RightThumbIntermediate, "RightFinger01"),
    (S::RightThumbDistal, "RightFinger02"),
    (S::LeftIndexProximal, "LeftFinger1"),
    (S::LeftIndexIntermediate, "LeftFinger11"),
    (S::LeftIndexDistal, "LeftFinger12"),
    (S::RightIndexProximal, "RightFinger1"),
    (S::RightIndexIntermediate, "RightFinger11"),
    (S::RightIndexDistal, "RightFinger12"),
    (S::LeftMiddleProximal, "LeftFinger2"),
    (S::LeftMiddleIntermediate, "LeftFinger21"),
    (S::LeftMiddleDistal, "LeftFinger22"),
    (S::RightMiddleProximal, "RightFinger2"),
    (S::RightMiddleIntermediate, "RightFinger21"),
    (S::RightMiddleDistal, "RightFinger22"),
    (S::LeftRingProximal, "LeftFinger3"),
    (S::LeftRingIntermediate, "LeftFinger31"),
    (S::LeftRingDistal, "LeftFinger32"),
    (S::RightRingProximal, "RightFinger3"),
    (S::RightRingIntermediate, "RightFinger31"),
    (S::RightRingDistal, "RightFinger32"),
    (S::LeftLittleProximal, "LeftFinger4"),
    (S::LeftLittleIntermediate, "LeftFinger41"),
    (S::LeftLittleDistal, "LeftFinger42"),
    (S::RightLittleProximal, "RightFinger4"),
    (S::RightLittleIntermediate, "RightFinger41"),
    (S::RightLittleDistal, "RightFinger42"),
];
