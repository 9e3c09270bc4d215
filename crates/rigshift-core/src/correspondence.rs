//! Correspondence between canonical slots and a skeleton's bones.

use std::collections::HashMap;

use log::{debug, warn};

use crate::error::{RetargetError, RetargetResult};
use crate::naming::BoneNameTable;
use crate::skeleton::{BoneId, BoneIndex, Skeleton};
use crate::slot::{CanonicalSlot, SlotArray};

/// Options controlling how ambiguous skeletons are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Treat duplicate bone names and doubly-claimed bones as errors.
    pub strict: bool,
}

impl ResolveOptions {
    /// Strict resolution.
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Partial injective mapping between canonical slots and bone indices.
///
/// Total over slots: every slot has an entry, `None` meaning unmapped.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonCorrespondence {
    skeleton: String,
    slots: SlotArray<Option<BoneIndex>>,
    bones: Vec<Option<CanonicalSlot>>,
}

impl SkeletonCorrespondence {
    /// Matches every named slot against the skeleton's bones.
    ///
    /// A slot maps to the first bone, in declared order, whose name equals
    /// the slot's resolved name. Duplicate names and bones claimed by two
    /// slots are logged and resolved in favor of the first occurrence, or
    /// rejected when `options.strict` is set. A table that matches no bone
    /// at all is rejected.
    pub fn resolve(
        skeleton: &Skeleton,
        names: &BoneNameTable,
        options: ResolveOptions,
    ) -> RetargetResult<Self> {
        let mut slots: SlotArray<Option<BoneIndex>> = SlotArray::default();
        let mut bones: Vec<Option<CanonicalSlot>> = vec![None; skeleton.len()];

        for (slot, name) in names.iter() {
            let mut matches = skeleton.indices_named(name);
            let Some(index) = matches.next() else {
                continue;
            };

            let extra = matches.count();
            if extra > 0 {
                if options.strict {
                    return Err(RetargetError::DuplicateBoneName {
                        skeleton: skeleton.name().to_string(),
                        slot,
                        name: name.to_string(),
                        count: extra + 1,
                    });
                }
                warn!(
                    "skeleton '{}': {} bones named '{}', slot {} uses the first",
                    skeleton.name(),
                    extra + 1,
                    name,
                    slot
                );
            }

            if let Some(first) = bones[index] {
                if options.strict {
                    return Err(RetargetError::SlotConflict {
                        skeleton: skeleton.name().to_string(),
                        first,
                        second: slot,
                        bone: name.to_string(),
                    });
                }
                warn!(
                    "skeleton '{}': bone '{}' already bound to {}, leaving {} unmapped",
                    skeleton.name(),
                    name,
                    first,
                    slot
                );
                continue;
            }

            bones[index] = Some(slot);
            slots[slot] = Some(index);
        }

        let correspondence = Self {
            skeleton: skeleton.name().to_string(),
            slots,
            bones,
        };

        if correspondence.mapped_count() == 0 {
            return Err(RetargetError::no_matching_bones(
                skeleton.name(),
                names.convention(),
            ));
        }

        debug!(
            "skeleton '{}': {} of {} named slots mapped",
            correspondence.skeleton,
            correspondence.mapped_count(),
            names.len()
        );

        Ok(correspondence)
    }

    /// Name of the skeleton this correspondence was built for.
    pub fn skeleton_name(&self) -> &str {
        &self.skeleton
    }

    /// Bone bound to `slot`.
    pub fn bone(&self, slot: CanonicalSlot) -> Option<BoneIndex> {
        self.slots[slot]
    }

    /// Slot bound to the bone at `index`.
    pub fn slot(&self, index: BoneIndex) -> Option<CanonicalSlot> {
        self.bones.get(index).copied().flatten()
    }

    /// Returns true when `slot` is bound to a bone.
    pub fn is_mapped(&self, slot: CanonicalSlot) -> bool {
        self.slots[slot].is_some()
    }

    /// Number of mapped slots.
    pub fn mapped_count(&self) -> usize {
        self.slots.iter().filter(|(_, bone)| bone.is_some()).count()
    }

    /// Iterates the mapped `(slot, bone)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalSlot, BoneIndex)> + '_ {
        self.slots
            .iter()
            .filter_map(|(slot, bone)| bone.map(|index| (slot, index)))
    }

    /// Maps the stable ids of bound bones to their slots.
    pub fn bone_id_map(&self, skeleton: &Skeleton) -> HashMap<BoneId, CanonicalSlot> {
        self.iter()
            .filter_map(|(slot, index)| skeleton.bone(index).map(|bone| (bone.id, slot)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NamingConvention;
    use crate::skeleton::{BoneDefinition, SkeletonDefinition, ROOT_PARENT_ID};

    fn motive_torso(extra: &[(i32, &str, i32)]) -> Skeleton {
        let mut def = SkeletonDefinition::new("Skeleton1")
            .with_bone(BoneDefinition::new(1, "Skeleton1_Hip", ROOT_PARENT_ID))
            .with_bone(BoneDefinition::new(2, "Skeleton1_Ab", 1))
            .with_bone(BoneDefinition::new(3, "Skeleton1_Chest", 2))
            .with_bone(BoneDefinition::new(4, "Skeleton1_Neck", 3))
            .with_bone(BoneDefinition::new(5, "Skeleton1_Head", 4));
        for (id, name, parent) in extra {
            def = def.with_bone(BoneDefinition::new(*id, *name, *parent));
        }
        Skeleton::from_definition(&def).unwrap()
    }

    #[test]
    fn test_resolve_maps_present_bones() {
        let skeleton = motive_torso(&[]);
        let names = BoneNameTable::resolve(NamingConvention::Motive, "Skeleton1");
        let corr =
            SkeletonCorrespondence::resolve(&skeleton, &names, ResolveOptions::default()).unwrap();

        assert_eq!(corr.mapped_count(), 5);
        assert_eq!(corr.bone(CanonicalSlot::Hips), Some(0));
        assert_eq!(corr.bone(CanonicalSlot::Spine), Some(1));
        assert_eq!(corr.bone(CanonicalSlot::LeftHand), None);
        assert_eq!(corr.slot(4), Some(CanonicalSlot::Head));
        assert_eq!(corr.slot(99), None);
    }

    #[test]
    fn test_correspondence_is_total() {
        let skeleton = motive_torso(&[]);
        let names = BoneNameTable::resolve(NamingConvention::Motive, "Skeleton1");
        let corr =
            SkeletonCorrespondence::resolve(&skeleton, &names, ResolveOptions::default()).unwrap();
        let entries = CanonicalSlot::ALL.iter().filter(|s| corr.bone(**s).is_none()).count();
        assert_eq!(entries + corr.mapped_count(), crate::slot::SLOT_COUNT);
    }

    #[test]
    fn test_duplicate_name_lenient_picks_first() {
        let skeleton = motive_torso(&[(6, "Skeleton1_Head", 1)]);
        let names = BoneNameTable::resolve(NamingConvention::Motive, "Skeleton1");
        let corr =
            SkeletonCorrespondence::resolve(&skeleton, &names, ResolveOptions::default()).unwrap();
        assert_eq!(corr.bone(CanonicalSlot::Head), Some(4));
    }

    #[test]
    fn test_duplicate_name_strict_fails() {
        let skeleton = motive_torso(&[(6, "Skeleton1_Head", 1)]);
        let names = BoneNameTable::resolve(NamingConvention::Motive, "Skeleton1");
        let err = SkeletonCorrespondence::resolve(&skeleton, &names, ResolveOptions::strict())
            .unwrap_err();
        assert!(matches!(
            err,
            RetargetError::DuplicateBoneName {
                slot: CanonicalSlot::Head,
                count: 2,
                ..
            }
        ));
        assert_eq!(err.skeleton(), Some("Skeleton1"));
    }

    #[test]
    fn test_slot_conflict() {
        let skeleton = motive_torso(&[]);
        let names = BoneNameTable::custom([
            (CanonicalSlot::Chest, "Skeleton1_Chest"),
            (CanonicalSlot::UpperChest, "Skeleton1_Chest"),
        ]);

        let corr =
            SkeletonCorrespondence::resolve(&skeleton, &names, ResolveOptions::default()).unwrap();
        assert_eq!(corr.bone(CanonicalSlot::Chest), Some(2));
        assert_eq!(corr.bone(CanonicalSlot::UpperChest), None);

        let err = SkeletonCorrespondence::resolve(&skeleton, &names, ResolveOptions::strict())
            .unwrap_err();
        assert_eq!(err.code(), "RETARGET_005");
        assert_eq!(err.slot(), Some(CanonicalSlot::UpperChest));
    }

    #[test]
    fn test_no_matches_is_configuration_error() {
        let skeleton = motive_torso(&[]);
        let names = BoneNameTable::resolve(NamingConvention::Fbx, "Other");
        let err = SkeletonCorrespondence::resolve(&skeleton, &names, ResolveOptions::default())
            .unwrap_err();
        assert!(matches!(err, RetargetError::NoMatchingBones { .. }));
        assert!(err.to_string().contains("fbx"));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_bone_id_map() {
        let skeleton = motive_torso(&[(6, "unrelated", 1)]);
        let names = BoneNameTable::resolve(NamingConvention::Motive, "Skeleton1");
        let corr =
            SkeletonCorrespondence::resolve(&skeleton, &names, ResolveOptions::default()).unwrap();
        let ids = corr.bone_id_map(&skeleton);
        assert_eq!(ids.len(), 5);
        assert_eq!(ids.get(&3), Some(&CanonicalSlot::Chest));
        assert_eq!(ids.get(&6), None);
    }
}
