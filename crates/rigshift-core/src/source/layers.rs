use glam::{Quat, Vec3};

use super::PoseSource;
use crate::mirror::MirrorSpec;
use crate::rest_pose::RestPose;
use crate::retarget::RetargetTable;
use crate::slot::{CanonicalSlot, SlotArray};

/// Reports a skeleton's rest pose (T-pose).
#[derive(Debug, Clone)]
pub struct RestPoseSource {
    rest: RestPose,
}

impl RestPoseSource {
    pub fn new(rest: RestPose) -> Self {
        Self { rest }
    }
}

impl PoseSource for RestPoseSource {
    fn rotation(&self, slot: CanonicalSlot) -> Quat {
        self.rest.joint(slot).rotation
    }

    fn position(&self, slot: CanonicalSlot) -> Vec3 {
        self.rest.joint(slot).position
    }

    fn available(&self, slot: CanonicalSlot) -> bool {
        self.rest.joint(slot).valid
    }
}

/// Mirrors the inner rotations per slot.
#[derive(Debug, Clone, Copy)]
pub struct Mirrored<'a, S> {
    inner: S,
    mirrors: &'a MirrorSpec,
}

impl<'a, S: PoseSource> Mirrored<'a, S> {
    pub fn new(inner: S, mirrors: &'a MirrorSpec) -> Self {
        Self { inner, mirrors }
    }
}

impl<S: PoseSource> PoseSource for Mirrored<'_, S> {
    fn rotation(&self, slot: CanonicalSlot) -> Quat {
        self.mirrors[slot].apply(self.inner.rotation(slot))
    }

    fn position(&self, slot: CanonicalSlot) -> Vec3 {
        self.inner.position(slot)
    }

    fn available(&self, slot: CanonicalSlot) -> bool {
        self.inner.available(slot)
    }
}

/// Converts inner source-local rotations into destination-local rotations.
///
/// Slots unmapped in the table are reported unavailable. Positions pass
/// through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Retargeted<'a, S> {
    inner: S,
    table: &'a RetargetTable,
}

impl<'a, S: PoseSource> Retargeted<'a, S> {
    pub fn new(inner: S, table: &'a RetargetTable) -> Self {
        Self { inner, table }
    }
}

impl<S: PoseSource> PoseSource for Retargeted<'_, S> {
    fn rotation(&self, slot: CanonicalSlot) -> Quat {
        self.table.component(slot).apply(self.inner.rotation(slot))
    }

    fn position(&self, slot: CanonicalSlot) -> Vec3 {
        self.inner.position(slot)
    }

    fn available(&self, slot: CanonicalSlot) -> bool {
        self.table.is_mapped(slot) && self.inner.available(slot)
    }
}

/// Right-multiplies a per-slot correction onto the inner rotations.
#[derive(Debug, Clone, Copy)]
pub struct ManualOffset<'a, S> {
    inner: S,
    offsets: &'a SlotArray<Quat>,
}

impl<'a, S: PoseSource> ManualOffset<'a, S> {
    pub fn new(inner: S, offsets: &'a SlotArray<Quat>) -> Self {
        Self { inner, offsets }
    }
}

impl<S: PoseSource> PoseSource for ManualOffset<'_, S> {
    fn rotation(&self, slot: CanonicalSlot) -> Quat {
        self.inner.rotation(slot) * self.offsets[slot]
    }

    fn position(&self, slot: CanonicalSlot) -> Vec3 {
        self.inner.position(slot)
    }

    fn available(&self, slot: CanonicalSlot) -> bool {
        self.inner.available(slot)
    }
}
