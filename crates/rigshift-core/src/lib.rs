//! rigshift: real-time skeletal pose retargeting
//!
//! This crate retargets a streamed motion-capture pose onto an arbitrary
//! humanoid skeleton, preserving per-joint orientation even when the two
//! skeletons differ in rest pose, bone naming and hierarchy depth.
//!
//! # Overview
//!
//! Setup runs once per skeleton pair:
//!
//! - **Naming**: a [`NamingConvention`] and asset prefix resolve a
//!   [`BoneNameTable`] of streamed bone names per [`CanonicalSlot`]
//! - **Correspondence**: the table is matched against a skeleton's bones
//! - **Stacking**: each joint's rest rotation is accumulated up to a
//!   reference root
//! - **Table build**: one [`RetargetingComponent`] per slot, holding the
//!   frame change between the two stacked rest rotations
//!
//! Every frame, a [`PoseTransformer`] reads one [`PoseSource`] snapshot and
//! writes one [`DestinationPose`] to a [`PoseSink`]. Slots unmapped on either
//! skeleton are always written as the destination rest pose.
//!
//! # Example
//!
//! ```
//! use rigshift_core::{
//!     BoneDefinition, BoneFrame, CanonicalSlot, JointSample, NamingConvention,
//!     RetargetConfig, RetargetSession, SkeletonDefinition,
//! };
//! use glam::{Quat, Vec3};
//!
//! let source = SkeletonDefinition::new("Skeleton1")
//!     .with_bone(BoneDefinition::new(1, "Skeleton1_Hip", 0))
//!     .with_bone(BoneDefinition::new(2, "Skeleton1_Ab", 1));
//! let destination = SkeletonDefinition::new("Avatar")
//!     .with_bone(BoneDefinition::new(1, "Avatar_Hips", 0))
//!     .with_bone(BoneDefinition::new(2, "Avatar_Spine", 1));
//!
//! let config = RetargetConfig::new(NamingConvention::Motive, "Skeleton1", NamingConvention::Fbx, "Avatar");
//! let mut session = RetargetSession::setup(config, &source, &destination).unwrap();
//! let mut sink = session.destination_sink();
//!
//! let mut frame = BoneFrame::new();
//! frame.insert(2, JointSample::new(Quat::from_rotation_x(0.3), Vec3::ZERO));
//! session.ingest(&frame);
//! session.evaluate(&mut sink);
//!
//! assert!(sink.slot_rotation(CanonicalSlot::Spine).is_some());
//! ```
//!
//! # Modules
//!
//! - [`slot`]: Canonical slot enumeration and slot-indexed storage
//! - [`naming`]: Naming conventions and bone name tables
//! - [`skeleton`]: Skeleton descriptions and validation
//! - [`correspondence`]: Slot to bone mapping
//! - [`rest_pose`]: Rest-pose tables and rest rotation stacking
//! - [`retarget`]: Retargeting components and table builder
//! - [`source`]: Pose sources and decorators
//! - [`sink`]: Destination pose output
//! - [`transformer`]: Per-frame evaluation, staging and diagnostics
//! - [`config`]: Setup configuration
//! - [`session`]: Setup and runtime for one skeleton pair

pub mod config;
pub mod correspondence;
pub mod error;
pub mod mirror;
pub mod naming;
pub mod quat;
pub mod rest_pose;
pub mod retarget;
pub mod session;
pub mod sink;
pub mod skeleton;
pub mod slot;
pub mod source;
pub mod transformer;

// Re-export commonly used types at the crate root
pub use config::{DestinationConfig, ManualOffsetEntry, MirrorEntry, RetargetConfig, SourceConfig};
pub use correspondence::{ResolveOptions, SkeletonCorrespondence};
pub use error::{RetargetError, RetargetResult};
pub use mirror::{MirrorAxes, MirrorAxis, MirrorSpec};
pub use naming::{streamed_name, BoneNameTable, NamingConvention};
pub use rest_pose::{apply_rest_correction, stack_to_root, ReferenceRoot, RestJoint, RestPose};
pub use retarget::{build_components, BoundSkeleton, RetargetTable, RetargetingComponent};
pub use session::RetargetSession;
pub use sink::{DestinationPose, PoseSink, SkeletonPoseSink, SlotOutput};
pub use skeleton::{Bone, BoneDefinition, BoneId, BoneIndex, Skeleton, SkeletonDefinition, ROOT_PARENT_ID};
pub use slot::{CanonicalSlot, SlotArray, SLOT_COUNT};
pub use source::{
    BoneFrame, JointSample, LivePose, ManualOffset, Mirrored, PoseSource, RestPoseSource,
    Retargeted, StreamPose,
};
pub use transformer::{
    Calibration, CalibrationEdit, CalibrationStage, FrameStats, FrameStatus, GapPolicy,
    PoseTransformer, TableStage,
};
