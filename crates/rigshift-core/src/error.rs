//! Error types for retargeting setup.
//!
//! Only setup can fail. Per-frame evaluation degrades gracefully and never
//! returns an error.

use thiserror::Error;

use crate::naming::NamingConvention;
use crate::slot::CanonicalSlot;

/// Result type for retargeting setup operations.
pub type RetargetResult<T> = Result<T, RetargetError>;

/// Errors that can occur while setting up a retargeting pair.
#[derive(Debug, Error)]
pub enum RetargetError {
    /// A bone uses the id reserved for the skeleton root sentinel.
    #[error("skeleton '{skeleton}': bone '{bone}' uses reserved id 0")]
    ReservedBoneId {
        /// Skeleton name.
        skeleton: String,
        /// Offending bone name.
        bone: String,
    },

    /// Two bones share the same id.
    #[error("skeleton '{skeleton}': duplicate bone id {id}")]
    DuplicateBoneId {
        /// Skeleton name.
        skeleton: String,
        /// The duplicated id.
        id: i32,
    },

    /// A bone references a parent that is not declared before it.
    #[error("skeleton '{skeleton}': bone '{bone}' references undeclared parent id {parent_id}")]
    UnknownParent {
        /// Skeleton name.
        skeleton: String,
        /// Child bone name.
        bone: String,
        /// The unresolved parent id.
        parent_id: i32,
    },

    /// A bone's rest rotation is not a rotation, or its offset is not finite.
    #[error("skeleton '{skeleton}': bone '{bone}' has a degenerate rest transform")]
    InvalidRestTransform {
        /// Skeleton name.
        skeleton: String,
        /// Offending bone name.
        bone: String,
    },

    /// A slot's resolved name matches more than one bone (strict mode).
    #[error("skeleton '{skeleton}': slot {slot} resolves to '{name}', which names {count} bones")]
    DuplicateBoneName {
        /// Skeleton name.
        skeleton: String,
        /// Slot being resolved.
        slot: CanonicalSlot,
        /// The ambiguous bone name.
        name: String,
        /// How many bones carry that name.
        count: usize,
    },

    /// Two slots resolve to the same bone (strict mode).
    #[error("skeleton '{skeleton}': slots {first} and {second} both resolve to bone '{bone}'")]
    SlotConflict {
        /// Skeleton name.
        skeleton: String,
        /// Slot that claimed the bone first.
        first: CanonicalSlot,
        /// Slot that tried to claim it again.
        second: CanonicalSlot,
        /// The contested bone name.
        bone: String,
    },

    /// The naming table did not match a single bone of the skeleton.
    #[error("skeleton '{skeleton}': no bone matches the {convention} naming table")]
    NoMatchingBones {
        /// Skeleton name.
        skeleton: String,
        /// Convention (or "custom") the table was built from.
        convention: String,
    },

    /// The configured reference root names no bone of the skeleton.
    #[error("skeleton '{skeleton}': reference root '{name}' not found")]
    UnknownReferenceRoot {
        /// Skeleton name.
        skeleton: String,
        /// The missing bone name.
        name: String,
    },

    /// Stacking rest rotations never reached the reference root.
    #[error(
        "skeleton '{skeleton}': reference root '{root}' is not an ancestor of bone '{bone}' (slot {slot})"
    )]
    RootNotAncestor {
        /// Skeleton name.
        skeleton: String,
        /// Slot whose bone was being stacked.
        slot: CanonicalSlot,
        /// Bone the walk started from.
        bone: String,
        /// Reference root description.
        root: String,
    },

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RetargetError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a no-match error for the given convention.
    pub fn no_matching_bones(skeleton: impl Into<String>, convention: Option<NamingConvention>) -> Self {
        Self::NoMatchingBones {
            skeleton: skeleton.into(),
            convention: convention
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| "custom".to_string()),
        }
    }

    /// Stable error code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            RetargetError::ReservedBoneId { .. } => "RETARGET_001",
            RetargetError::DuplicateBoneId { .. } => "RETARGET_002",
            RetargetError::UnknownParent { .. } => "RETARGET_003",
            RetargetError::DuplicateBoneName { .. } => "RETARGET_004",
            RetargetError::SlotConflict { .. } => "RETARGET_005",
            RetargetError::NoMatchingBones { .. } => "RETARGET_006",
            RetargetError::UnknownReferenceRoot { .. } => "RETARGET_007",
            RetargetError::RootNotAncestor { .. } => "RETARGET_008",
            RetargetError::InvalidConfig { .. } => "RETARGET_009",
            RetargetError::Json(_) => "RETARGET_010",
            RetargetError::InvalidRestTransform { .. } => "RETARGET_011",
        }
    }

    /// Error category for grouping related errors.
    pub fn category(&self) -> &'static str {
        match self {
            RetargetError::ReservedBoneId { .. }
            | RetargetError::DuplicateBoneId { .. }
            | RetargetError::UnknownParent { .. }
            | RetargetError::InvalidRestTransform { .. } => "skeleton",
            RetargetError::DuplicateBoneName { .. }
            | RetargetError::SlotConflict { .. }
            | RetargetError::NoMatchingBones { .. } => "correspondence",
            RetargetError::UnknownReferenceRoot { .. } | RetargetError::RootNotAncestor { .. } => {
                "stacking"
            }
            RetargetError::InvalidConfig { .. } | RetargetError::Json(_) => "config",
        }
    }

    /// Returns the skeleton the error refers to, if any.
    pub fn skeleton(&self) -> Option<&str> {
        match self {
            RetargetError::ReservedBoneId { skeleton, .. }
            | RetargetError::DuplicateBoneId { skeleton, .. }
            | RetargetError::UnknownParent { skeleton, .. }
            | RetargetError::InvalidRestTransform { skeleton, .. }
            | RetargetError::DuplicateBoneName { skeleton, .. }
            | RetargetError::SlotConflict { skeleton, .. }
            | RetargetError::NoMatchingBones { skeleton, .. }
            | RetargetError::UnknownReferenceRoot { skeleton, .. }
            | RetargetError::RootNotAncestor { skeleton, .. } => Some(skeleton),
            RetargetError::InvalidConfig { .. } | RetargetError::Json(_) => None,
        }
    }

    /// Returns the slot the error refers to, if any.
    pub fn slot(&self) -> Option<CanonicalSlot> {
        match self {
            RetargetError::DuplicateBoneName { slot, .. }
            | RetargetError::RootNotAncestor { slot, .. } => Some(*slot),
            RetargetError::SlotConflict { second, .. } => Some(*second),
            _ => None,
        }
    }

    /// True when the pairing must not proceed to runtime evaluation.
    ///
    /// An unmapped slot is never an error; every variant here is fatal to setup.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, RetargetError::Json(_))
    }
}
