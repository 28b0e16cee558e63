//! Rotation state.
//!
//! Owned by a single `RotationScheduler`; nothing else mutates it.

use crate::catalog::{CatalogItem, ItemId};

#[derive(Debug, Clone, Default)]
pub struct RotationState {
    /// Ids of the most recent flattening, in rotation order.
    pub ordered_catalog: Vec<ItemId>,

    /// Position of the active item within the flattening it was chosen from.
    pub cursor_index: usize,

    pub active: Option<CatalogItem>,

    /// Bumped on every selection.
    pub generation: u64,

    /// Highest generation whose fetch result has been accepted.
    pub applied_generation: u64,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_item_id(&self) -> Option<ItemId> {
        self.active.as_ref().map(|i| i.item_id)
    }
}
