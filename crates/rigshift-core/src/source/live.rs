use std::collections::HashMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::PoseSource;
use crate::correspondence::SkeletonCorrespondence;
use crate::skeleton::{BoneId, Skeleton};
use crate::slot::{CanonicalSlot, SlotArray};

/// One joint's sampled local transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointSample {
    pub rotation: Quat,
    pub position: Vec3,
}

impl JointSample {
    pub fn new(rotation: Quat, position: Vec3) -> Self {
        Self { rotation, position }
    }
}

/// One frame of streamed samples keyed by bone id.
///
/// Bones absent from the frame have no update this frame.
pub type BoneFrame = HashMap<BoneId, JointSample>;

/// A per-slot pose snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LivePose {
    samples: SlotArray<Option<JointSample>>,
}

impl LivePose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sample of `slot`.
    pub fn set(&mut self, slot: CanonicalSlot, sample: JointSample) {
        self.samples[slot] = Some(sample);
    }

    /// Sample of `slot`, if any.
    pub fn sample(&self, slot: CanonicalSlot) -> Option<&JointSample> {
        self.samples[slot].as_ref()
    }

    /// Number of available slots.
    pub fn available_count(&self) -> usize {
        self.samples.iter().filter(|(_, s)| s.is_some()).count()
    }
}

impl PoseSource for LivePose {
    fn rotation(&self, slot: CanonicalSlot) -> Quat {
        self.samples[slot]
            .map(|s| s.rotation)
            .unwrap_or(Quat::IDENTITY)
    }

    fn position(&self, slot: CanonicalSlot) -> Vec3 {
        self.samples[slot].map(|s| s.position).unwrap_or(Vec3::ZERO)
    }

    fn available(&self, slot: CanonicalSlot) -> bool {
        self.samples[slot].is_some()
    }
}

/// Accumulates streamed bone frames into a [`LivePose`].
///
/// Ids are mapped to slots through the source skeleton's correspondence.
/// A slot keeps its last sample until a newer one arrives and becomes
/// available once it has received any sample.
#[derive(Debug, Clone)]
pub struct StreamPose {
    slot_by_id: HashMap<BoneId, CanonicalSlot>,
    pose: LivePose,
    fresh: bool,
}

impl StreamPose {
    pub fn new(skeleton: &Skeleton, correspondence: &SkeletonCorrespondence) -> Self {
        Self {
            slot_by_id: correspondence.bone_id_map(skeleton),
            pose: LivePose::new(),
            fresh: false,
        }
    }

    /// Merges one frame. Unknown ids are ignored.
    ///
    /// Returns the number of slots updated.
    pub fn ingest(&mut self, frame: &BoneFrame) -> usize {
        let mut updated = 0;
        for (id, sample) in frame {
            if let Some(slot) = self.slot_by_id.get(id) {
                self.pose.set(*slot, *sample);
                updated += 1;
            }
        }
        if updated > 0 {
            self.fresh = true;
        }
        updated
    }

    /// Returns true and clears the flag when a frame updated any slot since
    /// the previous call.
    pub fn take_fresh(&mut self) -> bool {
        std::mem::replace(&mut self.fresh, false)
    }

    /// The current snapshot.
    pub fn pose(&self) -> &LivePose {
        &self.pose
    }

    /// Forgets every sample.
    pub fn reset(&mut self) {
        self.pose = LivePose::new();
        self.fresh = false;
    }
}

impl PoseSource for StreamPose {
    fn rotation(&self, slot: CanonicalSlot) -> Quat {
        self.pose.rotation(slot)
    }

    fn position(&self, slot: CanonicalSlot) -> Vec3 {
        self.pose.position(slot)
    }

    fn available(&self, slot: CanonicalSlot) -> bool {
        self.pose.available(slot)
    }
}
