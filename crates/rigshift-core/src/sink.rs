//! Destination pose output.
//!
//! Each frame the transformer hands a [`DestinationPose`] to a [`PoseSink`].
//! Every slot is either a retargeted value or an explicit request to fall
//! back to the destination rest pose; a sink never leaves a joint at a stale
//! source-derived value.

use glam::{Quat, Vec3};

use crate::correspondence::SkeletonCorrespondence;
use crate::rest_pose::RestPose;
use crate::skeleton::{BoneIndex, Skeleton};
use crate::slot::{CanonicalSlot, SlotArray};

/// Output of one slot for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SlotOutput {
    /// A value derived from the live source.
    Retargeted {
        rotation: Quat,
        /// `None` when positions are not applied.
        position: Option<Vec3>,
    },
    /// Write the destination skeleton's own rest transform.
    #[default]
    Rest,
}

impl SlotOutput {
    /// Returns true for [`SlotOutput::Rest`].
    pub fn is_rest(&self) -> bool {
        matches!(self, SlotOutput::Rest)
    }
}

/// One frame of destination output for every slot.
pub type DestinationPose = SlotArray<SlotOutput>;

/// Receives destination poses.
pub trait PoseSink {
    /// Writes one frame. Must apply the rest fallback for [`SlotOutput::Rest`].
    fn write_pose(&mut self, pose: &DestinationPose);
}

impl<T: PoseSink + ?Sized> PoseSink for &mut T {
    fn write_pose(&mut self, pose: &DestinationPose) {
        (**self).write_pose(pose)
    }
}

/// Reference sink holding a destination skeleton's live local transforms.
///
/// Bones start at their rest transform. Bones no slot is bound to are never
/// written.
#[derive(Debug, Clone)]
pub struct SkeletonPoseSink {
    bone_by_slot: SlotArray<Option<BoneIndex>>,
    rest: RestPose,
    rotations: Vec<Quat>,
    positions: Vec<Vec3>,
    frames_written: u64,
}

impl SkeletonPoseSink {
    pub fn new(skeleton: &Skeleton, correspondence: &SkeletonCorrespondence) -> Self {
        Self {
            bone_by_slot: SlotArray::from_fn(|slot| correspondence.bone(slot)),
            rest: RestPose::from_skeleton(skeleton, correspondence),
            rotations: skeleton.bones().iter().map(|b| b.rest_rotation).collect(),
            positions: skeleton.bones().iter().map(|b| b.offset).collect(),
            frames_written: 0,
        }
    }

    /// Local rotation of the bone at `index`.
    pub fn local_rotation(&self, index: BoneIndex) -> Option<Quat> {
        self.rotations.get(index).copied()
    }

    /// Local position of the bone at `index`.
    pub fn local_position(&self, index: BoneIndex) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    /// Local rotation of the bone bound to `slot`.
    pub fn slot_rotation(&self, slot: CanonicalSlot) -> Option<Quat> {
        self.bone_by_slot[slot].and_then(|index| self.local_rotation(index))
    }

    /// Local position of the bone bound to `slot`.
    pub fn slot_position(&self, slot: CanonicalSlot) -> Option<Vec3> {
        self.bone_by_slot[slot].and_then(|index| self.local_position(index))
    }

    /// Number of frames written.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl PoseSink for SkeletonPoseSink {
    fn write_pose(&mut self, pose: &DestinationPose) {
        for (slot, output) in pose.iter() {
            let Some(index) = self.bone_by_slot[slot] else {
                continue;
            };
            let (Some(rotation), Some(position)) =
                (self.rotations.get_mut(index), self.positions.get_mut(index))
            else {
                continue;
            };
            match output {
                SlotOutput::Retargeted {
                    rotation: r,
                    position: p,
                } => {
                    *rotation = *r;
                    if let Some(p) = p {
                        *position = *p;
                    }
                }
                SlotOutput::Rest => {
                    let rest = self.rest.joint(slot);
                    *rotation = rest.rotation;
                    *position = rest.position;
                }
            }
        }
        self.frames_written += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correspondence::ResolveOptions;
    use crate::naming::BoneNameTable;
    use crate::skeleton::{BoneDefinition, SkeletonDefinition, ROOT_PARENT_ID};

    fn avatar() -> (Skeleton, SkeletonCorrespondence) {
        let def = SkeletonDefinition::new("Avatar")
            .with_bone(BoneDefinition::new(1, "pelvis", ROOT_PARENT_ID).with_offset(Vec3::new(0.0, 1.0, 0.0)))
            .with_bone(
                BoneDefinition::new(2, "head", 1)
                    .with_offset(Vec3::new(0.0, 0.6, 0.0))
                    .with_rest_rotation(Quat::from_rotation_x(0.3)),
            )
            .with_bone(BoneDefinition::new(3, "prop", 1));
        let skeleton = Skeleton::from_definition(&def).unwrap();
        let names = BoneNameTable::custom([
            (CanonicalSlot::Hips, "pelvis"),
            (CanonicalSlot::Head, "head"),
        ]);
        let corr = SkeletonCorrespondence::resolve(&skeleton, &names, ResolveOptions::default()).unwrap();
        (skeleton, corr)
    }

    #[test]
    fn test_sink_starts_at_rest() {
        let (skeleton, corr) = avatar();
        let sink = SkeletonPoseSink::new(&skeleton, &corr);
        assert_eq!(sink.slot_rotation(CanonicalSlot::Head), Some(Quat::from_rotation_x(0.3)));
        assert_eq!(sink.slot_rotation(CanonicalSlot::Neck), None);
        assert_eq!(sink.frames_written(), 0);
    }

    #[test]
    fn test_rest_output_restores_rest_transform() {
        let (skeleton, corr) = avatar();
        let mut sink = SkeletonPoseSink::new(&skeleton, &corr);

        let mut pose = DestinationPose::default();
        pose[CanonicalSlot::Head] = SlotOutput::Retargeted {
            rotation: Quat::from_rotation_y(1.0),
            position: Some(Vec3::new(0.0, 0.7, 0.1)),
        };
        sink.write_pose(&pose);
        assert_eq!(sink.slot_rotation(CanonicalSlot::Head), Some(Quat::from_rotation_y(1.0)));
        assert_eq!(sink.slot_position(CanonicalSlot::Head), Some(Vec3::new(0.0, 0.7, 0.1)));

        pose[CanonicalSlot::Head] = SlotOutput::Rest;
        sink.write_pose(&pose);
        assert_eq!(sink.slot_rotation(CanonicalSlot::Head), Some(Quat::from_rotation_x(0.3)));
        assert_eq!(sink.slot_position(CanonicalSlot::Head), Some(Vec3::new(0.0, 0.6, 0.0)));
        assert_eq!(sink.frames_written(), 2);
    }

    #[test]
    fn test_rotation_only_output_keeps_position() {
        let (skeleton, corr) = avatar();
        let mut sink = SkeletonPoseSink::new(&skeleton, &corr);

        let mut pose = DestinationPose::default();
        pose[CanonicalSlot::Hips] = SlotOutput::Retargeted {
            rotation: Quat::from_rotation_z(0.5),
            position: None,
        };
        sink.write_pose(&pose);
        assert_eq!(sink.slot_position(CanonicalSlot::Hips), Some(Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(sink.local_rotation(2), Some(Quat::IDENTITY));
    }
}
