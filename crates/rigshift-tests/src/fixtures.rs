//! Skeleton fixtures and helpers shared by the integration tests.

use glam::{Quat, Vec3};
use rigshift_core::{
    BoneDefinition, BoneFrame, DestinationPose, JointSample, PoseSink, SkeletonDefinition,
    ROOT_PARENT_ID,
};

/// Rotation of `degrees` about `axis`.
pub fn rot(axis: Vec3, degrees: f32) -> Quat {
    Quat::from_axis_angle(axis.normalize(), degrees.to_radians())
}

/// `(id, motive suffix, parent id, offset)` of the streamed body.
const MOTIVE_BODY: &[(i32, &str, i32, [f32; 3])] = &[
    (1, "Hip", ROOT_PARENT_ID, [0.0, 1.0, 0.0]),
    (2, "Ab", 1, [0.0, 0.1, 0.0]),
    (3, "Chest", 2, [0.0, 0.2, 0.0]),
    (4, "Neck", 3, [0.0, 0.25, 0.0]),
    (5, "Head", 4, [0.0, 0.1, 0.0]),
    (6, "LShoulder", 3, [0.05, 0.2, 0.0]),
    (7, "LUArm", 6, [0.15, 0.0, 0.0]),
    (8, "LFArm", 7, [0.3, 0.0, 0.0]),
    (9, "LHand", 8, [0.25, 0.0, 0.0]),
    (10, "RShoulder", 3, [-0.05, 0.2, 0.0]),
    (11, "RUArm", 10, [-0.15, 0.0, 0.0]),
    (12, "RFArm", 11, [-0.3, 0.0, 0.0]),
    (13, "RHand", 12, [-0.25, 0.0, 0.0]),
    (14, "LThigh", 1, [0.1, 0.0, 0.0]),
    (15, "LShin", 14, [0.0, -0.45, 0.0]),
    (16, "LFoot", 15, [0.0, -0.45, 0.0]),
    (17, "LToe", 16, [0.0, -0.05, 0.12]),
    (18, "RThigh", 1, [-0.1, 0.0, 0.0]),
    (19, "RShin", 18, [0.0, -0.45, 0.0]),
    (20, "RFoot", 19, [0.0, -0.45, 0.0]),
    (21, "RToe", 20, [0.0, -0.05, 0.12]),
    (22, "LThumb1", 9, [0.03, 0.0, 0.03]),
    (23, "LThumb2", 22, [0.03, 0.0, 0.0]),
    (24, "LThumb3", 23, [0.02, 0.0, 0.0]),
    (25, "RThumb1", 13, [-0.03, 0.0, 0.03]),
    (26, "RThumb2", 25, [-0.03, 0.0, 0.0]),
    (27, "RThumb3", 26, [-0.02, 0.0, 0.0]),
];

/// Number of bones in [`motive_skeleton`].
pub const MOTIVE_BONE_COUNT: usize = 27;

/// A streamed Motive skeleton with identity rest rotations.
pub fn motive_skeleton(prefix: &str) -> SkeletonDefinition {
    MOTIVE_BODY
        .iter()
        .fold(SkeletonDefinition::new(prefix), |def, (id, suffix, parent, offset)| {
            def.with_bone(
                BoneDefinition::new(*id, format!("{}_{}", prefix, suffix), *parent)
                    .with_offset(Vec3::from_array(*offset)),
            )
        })
}

/// Replaces the rest rotations of a description, cycling through `rests`.
pub fn with_rest_rotations(mut def: SkeletonDefinition, rests: &[Quat]) -> SkeletonDefinition {
    if rests.is_empty() {
        return def;
    }
    for (i, bone) in def.bones.iter_mut().enumerate() {
        bone.rest_rotation = rests[i % rests.len()];
    }
    def
}

/// An FBX-named avatar with non-identity rests, a twist bone in the left
/// arm and no toe bones.
pub fn fbx_avatar(prefix: &str) -> SkeletonDefinition {
    let bones: &[(i32, &str, i32, Quat)] = &[
        (10, "Hips", ROOT_PARENT_ID, rot(Vec3::X, -90.0)),
        (11, "Spine", 10, rot(Vec3::X, 90.0)),
        (12, "Spine1", 11, rot(Vec3::X, 5.0)),
        (13, "Neck", 12, rot(Vec3::X, -8.0)),
        (14, "Head", 13, rot(Vec3::X, 3.0)),
        (15, "LeftShoulder", 12, rot(Vec3::Z, -90.0)),
        (16, "LeftArm", 15, rot(Vec3::Z, 10.0)),
        (17, "LeftArmTwist", 16, rot(Vec3::Y, 25.0)),
        (18, "LeftForeArm", 17, rot(Vec3::Y, -25.0)),
        (19, "LeftHand", 18, rot(Vec3::X, 4.0)),
        (20, "RightShoulder", 12, rot(Vec3::Z, 90.0)),
        (21, "RightArm", 20, rot(Vec3::Z, -10.0)),
        (22, "RightForeArm", 21, Quat::IDENTITY),
        (23, "RightHand", 22, rot(Vec3::X, -4.0)),
        (24, "LeftUpLeg", 10, rot(Vec3::Z, 180.0)),
        (25, "LeftLeg", 24, rot(Vec3::X, 2.0)),
        (26, "LeftFoot", 25, rot(Vec3::X, 60.0)),
        (27, "RightUpLeg", 10, rot(Vec3::Z, 180.0)),
        (28, "RightLeg", 27, rot(Vec3::X, 2.0)),
        (29, "RightFoot", 28, rot(Vec3::X, 60.0)),
        (30, "LeftHandThumb1", 19, rot(Vec3::new(1.0, 1.0, 0.0), 30.0)),
        (31, "LeftHandThumb2", 30, Quat::IDENTITY),
        (32, "RightHandThumb1", 23, rot(Vec3::new(1.0, -1.0, 0.0), 30.0)),
    ];
    bones
        .iter()
        .fold(SkeletonDefinition::new(prefix), |def, (id, suffix, parent, rest)| {
            def.with_bone(
                BoneDefinition::new(*id, format!("{}_{}", prefix, suffix), *parent)
                    .with_offset(Vec3::new(0.0, 0.1, 0.0))
                    .with_rest_rotation(*rest),
            )
        })
}

/// A frame with one sample per `(id, rotation)` and zero positions.
pub fn frame(samples: &[(i32, Quat)]) -> BoneFrame {
    samples
        .iter()
        .map(|(id, rotation)| (*id, JointSample::new(*rotation, Vec3::ZERO)))
        .collect()
}

/// A frame giving every bone of `def` the same rotation.
pub fn uniform_frame(def: &SkeletonDefinition, rotation: Quat) -> BoneFrame {
    def.bones
        .iter()
        .map(|bone| (bone.id, JointSample::new(rotation, bone.offset)))
        .collect()
}

/// Records every pose written to it.
#[derive(Debug, Default)]
pub struct CapturingSink {
    pub poses: Vec<DestinationPose>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent pose.
    pub fn last(&self) -> Option<&DestinationPose> {
        self.poses.last()
    }
}

impl PoseSink for CapturingSink {
    fn write_pose(&mut self, pose: &DestinationPose) {
        self.poses.push(*pose);
    }
}
