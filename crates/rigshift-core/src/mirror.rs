//! Per-slot axis mirroring.
//!
//! Mirroring flips the sign of two quaternion components, reflecting the
//! rotation across one local axis. It is applied at evaluation time and is
//! never baked into a retargeting table.

use glam::Quat;
use serde::{Deserialize, Serialize};

use crate::slot::SlotArray;

/// A local joint axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorAxis {
    X,
    Y,
    Z,
}

impl MirrorAxis {
    /// Mirrors `q` across this axis.
    pub fn mirror(self, q: Quat) -> Quat {
        match self {
            MirrorAxis::X => Quat::from_xyzw(q.x, -q.y, -q.z, q.w),
            MirrorAxis::Y => Quat::from_xyzw(-q.x, q.y, -q.z, q.w),
            MirrorAxis::Z => Quat::from_xyzw(-q.x, -q.y, q.z, q.w),
        }
    }
}

/// Independently toggleable mirror axes for one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorAxes {
    #[serde(default)]
    pub x: bool,
    #[serde(default)]
    pub y: bool,
    #[serde(default)]
    pub z: bool,
}

impl MirrorAxes {
    /// No mirroring.
    pub const NONE: MirrorAxes = MirrorAxes {
        x: false,
        y: false,
        z: false,
    };

    /// Enables the listed axes.
    pub fn from_axes(axes: &[MirrorAxis]) -> Self {
        let mut result = Self::NONE;
        for axis in axes {
            result.set(*axis, true);
        }
        result
    }

    /// Toggles one axis.
    pub fn set(&mut self, axis: MirrorAxis, enabled: bool) {
        match axis {
            MirrorAxis::X => self.x = enabled,
            MirrorAxis::Y => self.y = enabled,
            MirrorAxis::Z => self.z = enabled,
        }
    }

    /// Applies the enabled axes in X, Y, Z order.
    pub fn apply(&self, mut q: Quat) -> Quat {
        if self.x {
            q = MirrorAxis::X.mirror(q);
        }
        if self.y {
            q = MirrorAxis::Y.mirror(q);
        }
        if self.z {
            q = MirrorAxis::Z.mirror(q);
        }
        q
    }
}

/// Mirror axes for every slot.
pub type MirrorSpec = SlotArray<MirrorAxes>;
