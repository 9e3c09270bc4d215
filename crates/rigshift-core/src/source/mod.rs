//! Pose sources.
//!
//! A [`PoseSource`] reports a local rotation, a local position and an
//! availability flag per canonical slot. Raw producers ([`LivePose`],
//! [`StreamPose`], [`RestPoseSource`]) are wrapped by decorators
//! ([`Mirrored`], [`Retargeted`], [`ManualOffset`]) so the layering order is
//! explicit in the type. The runtime evaluates
//! `ManualOffset(Retargeted(Mirrored(source)))`.

mod layers;
mod live;


pub use layers::{ManualOffset, Mirrored, RestPoseSource, Retargeted};
pub use live::{BoneFrame, JointSample, LivePose, StreamPose};

use glam::{Quat, Vec3};

use crate::slot::CanonicalSlot;

/// Anything that can report a per-slot pose.
pub trait PoseSource {
    /// Local rotation of `slot`. Meaningful only when [`available`](Self::available).
    fn rotation(&self, slot: CanonicalSlot) -> Quat;

    /// Local position of `slot`. Meaningful only when [`available`](Self::available).
    fn position(&self, slot: CanonicalSlot) -> Vec3;

    /// Returns true when the source has a value for `slot`.
    fn available(&self, slot: CanonicalSlot) -> bool;
}

impl<T: PoseSource + ?Sized> PoseSource for &T {
    fn rotation(&self, slot: CanonicalSlot) -> Quat {
        (**self).rotation(slot)
    }

    fn position(&self, slot: CanonicalSlot) -> Vec3 {
        (**self).position(slot)
    }

    fn available(&self, slot: CanonicalSlot) -> bool {
        (**self).available(slot)
    }
}
