//! Retargeting tables.
//!
//! A [`RetargetTable`] holds one [`RetargetingComponent`] per canonical slot,
//! built once per (source, destination) skeleton pair by
//! [`build_components`]. Tables are immutable; a change to either rest pose
//! produces a whole new table.

mod builder;
mod component;

#[cfg(test)]
mod tests;

pub use builder::{build_components, BoundSkeleton};
pub use component::RetargetingComponent;

use crate::slot::{CanonicalSlot, SlotArray};

/// Per-slot retargeting components for one skeleton pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RetargetTable {
    components: SlotArray<RetargetingComponent>,
    mapped: SlotArray<bool>,
}

impl RetargetTable {
    /// A table with every slot unmapped.
    pub fn unmapped() -> Self {
        Self {
            components: SlotArray::splat(RetargetingComponent::IDENTITY),
            mapped: SlotArray::splat(false),
        }
    }

    /// Component for `slot`. Identity when the slot is unmapped.
    pub fn component(&self, slot: CanonicalSlot) -> &RetargetingComponent {
        &self.components[slot]
    }

    /// Returns true when both skeletons map `slot`.
    pub fn is_mapped(&self, slot: CanonicalSlot) -> bool {
        self.mapped[slot]
    }

    /// Number of slots mapped on both skeletons.
    pub fn mapped_count(&self) -> usize {
        self.mapped.iter().filter(|(_, mapped)| **mapped).count()
    }

    /// Iterates `(slot, component, mapped)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalSlot, &RetargetingComponent, bool)> {
        self.components
            .iter()
            .zip(self.mapped.as_slice().iter())
            .map(|((slot, component), mapped)| (slot, component, *mapped))
    }

    pub(crate) fn set(&mut self, slot: CanonicalSlot, component: RetargetingComponent) {
        self.components[slot] = component;
        self.mapped[slot] = true;
    }
}

impl Default for RetargetTable {
    fn default() -> Self {
        Self::unmapped()
    }
}
