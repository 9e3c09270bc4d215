//! Rest-pose tables and rest rotation stacking.

use glam::{Quat, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::correspondence::SkeletonCorrespondence;
use crate::error::{RetargetError, RetargetResult};
use crate::naming::NamingConvention;
use crate::skeleton::{BoneIndex, Skeleton};
use crate::slot::{CanonicalSlot, SlotArray};

/// Local rest transform of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestJoint {
    pub rotation: Quat,
    pub position: Vec3,
    /// False when the slot is unmapped on this skeleton.
    pub valid: bool,
}

impl Default for RestJoint {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            position: Vec3::ZERO,
            valid: false,
        }
    }
}

/// Per-slot local rest transforms of one skeleton.
///
/// Built once from a skeleton and its correspondence and never mutated;
/// a new skeleton or recalibration replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct RestPose {
    joints: SlotArray<RestJoint>,
}

impl RestPose {
    /// Captures the local rest transform of every mapped slot.
    pub fn from_skeleton(skeleton: &Skeleton, correspondence: &SkeletonCorrespondence) -> Self {
        let joints = SlotArray::from_fn(|slot| {
            correspondence
                .bone(slot)
                .and_then(|index| skeleton.bone(index))
                .map(|bone| RestJoint {
                    rotation: bone.rest_rotation,
                    position: bone.offset,
                    valid: true,
                })
                .unwrap_or_default()
        });
        Self { joints }
    }

    /// Rest transform of `slot`.
    pub fn joint(&self, slot: CanonicalSlot) -> &RestJoint {
        &self.joints[slot]
    }

    /// Iterates `(slot, joint)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalSlot, &RestJoint)> {
        self.joints.iter()
    }
}

// =============================================================================
// Stacking
// =============================================================================

/// Where rest rotation stacking stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceRoot {
    /// Stack every ancestor, including the topmost bone.
    #[default]
    SkeletonOrigin,
    /// Stop below this bone. It must be a strict ancestor of every stacked joint.
    Bone(BoneIndex),
}

impl ReferenceRoot {
    /// Resolves an optional bone name against a skeleton.
    pub fn resolve(skeleton: &Skeleton, name: Option<&str>) -> RetargetResult<Self> {
        match name {
            None => Ok(ReferenceRoot::SkeletonOrigin),
            Some(name) => skeleton
                .find_by_name(name)
                .map(ReferenceRoot::Bone)
                .ok_or_else(|| RetargetError::UnknownReferenceRoot {
                    skeleton: skeleton.name().to_string(),
                    name: name.to_string(),
                }),
        }
    }

    fn describe(&self, skeleton: &Skeleton) -> String {
        match self {
            ReferenceRoot::SkeletonOrigin => "<origin>".to_string(),
            ReferenceRoot::Bone(index) => skeleton
                .bone(*index)
                .map(|bone| bone.name.clone())
                .unwrap_or_else(|| format!("#{}", index)),
        }
    }
}

/// Accumulates local rest rotations from `bone` up to `root`.
///
/// Walking up the parent chain, each joint's local rest rotation is composed
/// onto the running total as `total = local * total`, so the result maps the
/// joint's local frame into the root's frame. The root itself is excluded.
///
/// The walk is bounded by the skeleton size. A root that is not a strict
/// ancestor of `bone` fails with [`RetargetError::RootNotAncestor`].
pub fn stack_to_root(
    skeleton: &Skeleton,
    slot: CanonicalSlot,
    bone: BoneIndex,
    root: ReferenceRoot,
) -> RetargetResult<Quat> {
    let not_ancestor = || RetargetError::RootNotAncestor {
        skeleton: skeleton.name().to_string(),
        slot,
        bone: skeleton
            .bone(bone)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| format!("#{}", bone)),
        root: root.describe(skeleton),
    };

    if root == ReferenceRoot::Bone(bone) {
        return Err(not_ancestor());
    }

    let mut total = Quat::IDENTITY;
    let mut current = Some(bone);
    for _ in 0..=skeleton.len() {
        let Some(index) = current else {
            return match root {
                ReferenceRoot::SkeletonOrigin => Ok(total.normalize()),
                ReferenceRoot::Bone(_) => Err(not_ancestor()),
            };
        };
        if root == ReferenceRoot::Bone(index) {
            return Ok(total.normalize());
        }
        let Some(joint) = skeleton.bone(index) else {
            return Err(not_ancestor());
        };
        total = joint.rest_rotation * total;
        current = joint.parent;
    }

    Err(not_ancestor())
}

/// Replaces the rest rotation of each bound bone the convention corrects.
///
/// The correction is the bone's whole rest rotation; any authored rest on
/// that bone is discarded. Returns the number of bones corrected.
pub fn apply_rest_correction(
    skeleton: &mut Skeleton,
    correspondence: &SkeletonCorrespondence,
    convention: NamingConvention,
) -> usize {
    let mut corrected = 0;
    for (slot, index) in correspondence.iter() {
        let Some(correction) = convention.rest_correction(slot) else {
            continue;
        };
        if skeleton.bone(index).is_none() {
            continue;
        }
        skeleton.set_rest_rotation(index, correction.normalize());
        corrected += 1;
    }
    if corrected > 0 {
        debug!(
            "skeleton '{}': applied {} rest correction to {} bones",
            skeleton.name(),
            convention,
            corrected
        );
    }
    corrected
}
