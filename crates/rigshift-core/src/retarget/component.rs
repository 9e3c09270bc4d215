use glam::Quat;

use crate::quat::{change_frame, from_to};

/// Precomputed retargeting data for one canonical slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetargetingComponent {
    /// Source joint's own local rest rotation.
    pub source_rest_local: Quat,
    /// Destination joint's own local rest rotation.
    pub dest_rest_local: Quat,
    /// Maps the source root-relative rest frame onto the destination's.
    pub frame_change: Quat,
}

impl RetargetingComponent {
    /// Component of an unmapped slot.
    pub const IDENTITY: RetargetingComponent = RetargetingComponent {
        source_rest_local: Quat::IDENTITY,
        dest_rest_local: Quat::IDENTITY,
        frame_change: Quat::IDENTITY,
    };

    /// Builds a component from each joint's local rest rotation and its rest
    /// rotation stacked up to the reference root.
    pub fn new(
        source_rest_local: Quat,
        dest_rest_local: Quat,
        source_stack: Quat,
        dest_stack: Quat,
    ) -> Self {
        Self {
            source_rest_local,
            dest_rest_local,
            frame_change: from_to(source_stack, dest_stack).normalize(),
        }
    }

    /// Converts a live source local rotation into a destination local rotation.
    ///
    /// The delta of `source_local` from the source rest is re-expressed in the
    /// destination frame, then composed onto the destination rest.
    #[inline]
    pub fn apply(&self, source_local: Quat) -> Quat {
        let delta = self.source_rest_local.inverse() * source_local;
        (self.dest_rest_local * change_frame(delta, self.frame_change)).normalize()
    }
}

impl Default for RetargetingComponent {
    fn default() -> Self {
        Self::IDENTITY
    }
}
