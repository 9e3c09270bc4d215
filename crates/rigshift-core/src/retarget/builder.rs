use log::debug;

use super::{RetargetTable, RetargetingComponent};
use crate::correspondence::SkeletonCorrespondence;
use crate::error::RetargetResult;
use crate::rest_pose::{stack_to_root, ReferenceRoot};
use crate::skeleton::Skeleton;
use crate::slot::CanonicalSlot;

/// A skeleton together with its correspondence and stacking root.
#[derive(Debug, Clone, Copy)]
pub struct BoundSkeleton<'a> {
    pub skeleton: &'a Skeleton,
    pub correspondence: &'a SkeletonCorrespondence,
    pub root: ReferenceRoot,
}

impl<'a> BoundSkeleton<'a> {
    /// Binds a skeleton stacked up to its origin.
    pub fn new(skeleton: &'a Skeleton, correspondence: &'a SkeletonCorrespondence) -> Self {
        Self {
            skeleton,
            correspondence,
            root: ReferenceRoot::SkeletonOrigin,
        }
    }

    /// Sets the stacking root.
    pub fn with_root(mut self, root: ReferenceRoot) -> Self {
        self.root = root;
        self
    }
}

/// Builds the retargeting table for a source and destination skeleton.
///
/// Slots unmapped on either side get [`RetargetingComponent::IDENTITY`] and
/// stay unmapped in the table. For the rest, each side's rest rotation is
/// stacked up to its reference root and the frame change is
/// `source_stack⁻¹ · dest_stack`. Fails if any stacking walk misses its root.
pub fn build_components(
    source: &BoundSkeleton<'_>,
    destination: &BoundSkeleton<'_>,
) -> RetargetResult<RetargetTable> {
    let mut table = RetargetTable::unmapped();

    for slot in CanonicalSlot::ALL {
        let (Some(src_index), Some(dest_index)) = (
            source.correspondence.bone(slot),
            destination.correspondence.bone(slot),
        ) else {
            continue;
        };
        let (Some(src_bone), Some(dest_bone)) = (
            source.skeleton.bone(src_index),
            destination.skeleton.bone(dest_index),
        ) else {
            continue;
        };

        let source_stack = stack_to_root(source.skeleton, slot, src_index, source.root)?;
        let dest_stack = stack_to_root(destination.skeleton, slot, dest_index, destination.root)?;

        table.set(
            slot,
            RetargetingComponent::new(
                src_bone.rest_rotation,
                dest_bone.rest_rotation,
                source_stack,
                dest_stack,
            ),
        );
    }

    debug!(
        "built retarget table '{}' -> '{}': {} slots mapped",
        source.skeleton.name(),
        destination.skeleton.name(),
        table.mapped_count()
    );

    Ok(table)
}
