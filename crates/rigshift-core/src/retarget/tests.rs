//! Tests for retargeting table construction and application.

use glam::{Quat, Vec3};

use super::*;
use crate::correspondence::{ResolveOptions, SkeletonCorrespondence};
use crate::error::RetargetError;
use crate::naming::BoneNameTable;
use crate::quat::{same_rotation, ROTATION_EPSILON};
use crate::rest_pose::ReferenceRoot;
use crate::skeleton::{BoneDefinition, Skeleton, SkeletonDefinition, ROOT_PARENT_ID};

fn rot(axis: Vec3, degrees: f32) -> Quat {
    Quat::from_axis_angle(axis.normalize(), degrees.to_radians())
}

/// Hips -> upper arm -> lower arm, with optional twist bone before the
/// lower arm.
fn arm_skeleton(name: &str, rests: [Quat; 3], twist: Option<Quat>) -> (Skeleton, SkeletonCorrespondence) {
    let mut def = SkeletonDefinition::new(name)
        .with_bone(BoneDefinition::new(1, "hips", ROOT_PARENT_ID).with_rest_rotation(rests[0]))
        .with_bone(BoneDefinition::new(2, "upper", 1).with_rest_rotation(rests[1]));
    let lower_parent = match twist {
        Some(twist) => {
            def = def.with_bone(BoneDefinition::new(3, "twist", 2).with_rest_rotation(twist));
            3
        }
        None => 2,
    };
    def = def.with_bone(BoneDefinition::new(4, "lower", lower_parent).with_rest_rotation(rests[2]));

    let skeleton = Skeleton::from_definition(&def).unwrap();
    let names = BoneNameTable::custom([
        (CanonicalSlot::Hips, "hips"),
        (CanonicalSlot::LeftUpperArm, "upper"),
        (CanonicalSlot::LeftLowerArm, "lower"),
    ]);
    let corr = SkeletonCorrespondence::resolve(&skeleton, &names, ResolveOptions::default()).unwrap();
    (skeleton, corr)
}

fn live_rotations() -> Vec<Quat> {
    vec![
        Quat::IDENTITY,
        rot(Vec3::X, 90.0),
        rot(Vec3::new(1.0, 1.0, 0.0), -45.0),
        rot(Vec3::new(0.2, -0.7, 0.4), 170.0),
    ]
}

#[test]
fn test_identity_pair_is_noop() {
    let rests = [rot(Vec3::Y, 15.0), rot(Vec3::Z, -80.0), rot(Vec3::X, 20.0)];
    let (skeleton, corr) = arm_skeleton("Same", rests, None);
    let bound = BoundSkeleton::new(&skeleton, &corr);
    let table = build_components(&bound, &bound).unwrap();

    assert_eq!(table.mapped_count(), 3);
    for (slot, component, mapped) in table.iter() {
        if !mapped {
            continue;
        }
        assert!(
            same_rotation(component.frame_change, Quat::IDENTITY, ROTATION_EPSILON),
            "{} frame change not identity",
            slot
        );
        for a in live_rotations() {
            assert!(same_rotation(component.apply(a), a, 1e-4), "{} altered {:?}", slot, a);
        }
    }
}

#[test]
fn test_frame_change_with_parent_roots() {
    let rs = rot(Vec3::new(0.3, 1.0, 0.0), 40.0);
    let rd = rot(Vec3::new(-1.0, 0.2, 0.5), 75.0);
    let (src, _) = arm_skeleton("Source", [Quat::IDENTITY, rot(Vec3::X, 10.0), rs], None);
    let (dest, _) = arm_skeleton("Dest", [Quat::IDENTITY, rot(Vec3::Z, 33.0), rd], None);

    // Only the lower arm has the upper arm as a strict ancestor.
    let lower_only = BoneNameTable::custom([(CanonicalSlot::LeftLowerArm, "lower")]);
    let src_corr = SkeletonCorrespondence::resolve(&src, &lower_only, ResolveOptions::default()).unwrap();
    let dest_corr = SkeletonCorrespondence::resolve(&dest, &lower_only, ResolveOptions::default()).unwrap();

    let source = BoundSkeleton::new(&src, &src_corr).with_root(ReferenceRoot::Bone(1));
    let destination = BoundSkeleton::new(&dest, &dest_corr).with_root(ReferenceRoot::Bone(1));
    let table = build_components(&source, &destination).unwrap();
    assert_eq!(table.mapped_count(), 1);

    let component = table.component(CanonicalSlot::LeftLowerArm);
    assert!(same_rotation(component.frame_change, rs.inverse() * rd, ROTATION_EPSILON));
    assert!(same_rotation(component.source_rest_local, rs, ROTATION_EPSILON));
    assert!(same_rotation(component.dest_rest_local, rd, ROTATION_EPSILON));
    assert!(same_rotation(component.apply(rs), rd, 1e-4));
}

#[test]
fn test_rest_in_rest_out_with_twist_bone() {
    let (src, src_corr) = arm_skeleton(
        "Source",
        [rot(Vec3::Y, 5.0), rot(Vec3::Z, 90.0), rot(Vec3::X, 0.0)],
        None,
    );
    let (dest, dest_corr) = arm_skeleton(
        "Avatar",
        [Quat::IDENTITY, rot(Vec3::X, -90.0), rot(Vec3::Y, 12.0)],
        Some(rot(Vec3::Y, 35.0)),
    );
    let table = build_components(
        &BoundSkeleton::new(&src, &src_corr),
        &BoundSkeleton::new(&dest, &dest_corr),
    )
    .unwrap();

    for (slot, index) in src_corr.iter() {
        let src_rest = src.bones()[index].rest_rotation;
        let dest_rest = dest.bones()[dest_corr.bone(slot).unwrap()].rest_rotation;
        let out = table.component(slot).apply(src_rest);
        assert!(same_rotation(out, dest_rest, 1e-4), "{} not at rest", slot);
    }
}

#[test]
fn test_unmapped_slots_get_identity() {
    let (src, src_corr) = arm_skeleton("Source", [Quat::IDENTITY; 3], None);
    let dest = Skeleton::from_definition(
        &SkeletonDefinition::new("Partial")
            .with_bone(BoneDefinition::new(1, "hips", ROOT_PARENT_ID).with_rest_rotation(rot(Vec3::Y, 90.0))),
    )
    .unwrap();
    let dest_corr = SkeletonCorrespondence::resolve(
        &dest,
        &BoneNameTable::custom([(CanonicalSlot::Hips, "hips")]),
        ResolveOptions::default(),
    )
    .unwrap();

    let table = build_components(
        &BoundSkeleton::new(&src, &src_corr),
        &BoundSkeleton::new(&dest, &dest_corr),
    )
    .unwrap();

    assert!(table.is_mapped(CanonicalSlot::Hips));
    assert!(!table.is_mapped(CanonicalSlot::LeftUpperArm));
    assert_eq!(
        *table.component(CanonicalSlot::LeftUpperArm),
        RetargetingComponent::IDENTITY
    );
    assert_eq!(table.mapped_count(), 1);
}

#[test]
fn test_unreachable_root_aborts_build() {
    let (src, src_corr) = arm_skeleton("Source", [Quat::IDENTITY; 3], None);
    let (dest, dest_corr) = arm_skeleton("Dest", [Quat::IDENTITY; 3], None);

    // The upper arm is not an ancestor of the hips.
    let source = BoundSkeleton::new(&src, &src_corr).with_root(ReferenceRoot::Bone(1));
    let err = build_components(&source, &BoundSkeleton::new(&dest, &dest_corr)).unwrap_err();
    match err {
        RetargetError::RootNotAncestor { skeleton, slot, .. } => {
            assert_eq!(skeleton, "Source");
            assert_eq!(slot, CanonicalSlot::Hips);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_rebuild_is_identical() {
    let (src, src_corr) = arm_skeleton("Source", [rot(Vec3::X, 3.0), rot(Vec3::Z, 91.0), rot(Vec3::Y, 7.0)], None);
    let (dest, dest_corr) = arm_skeleton(
        "Dest",
        [Quat::IDENTITY, rot(Vec3::X, -88.0), rot(Vec3::Y, 2.0)],
        Some(rot(Vec3::Y, 10.0)),
    );
    let source = BoundSkeleton::new(&src, &src_corr);
    let destination = BoundSkeleton::new(&dest, &dest_corr);

    let first = build_components(&source, &destination).unwrap();
    let second = build_components(&source, &destination).unwrap();
    assert_eq!(first, second);
}
