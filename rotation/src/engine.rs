//! The rotation engine.
//!
//! On every tick it:
//!   1. Flattens the current catalog deterministically.
//!   2. Locates the active item and moves one position forward, wrapping.
//!   3. Falls back to the raw cursor when the active item vanished.
//!   4. Issues a new `FetchTicket` for the selected item.
//!
//! Fetch results are gated through `accept`, which discards responses for
//! items the rotation has already moved away from.

use tracing::{debug, warn};

use crate::catalog::{Catalog, CatalogItem};
use crate::state::RotationState;
use crate::types::{FetchTicket, Selection, SelectionReason};

#[derive(Debug, Default)]
pub struct RotationScheduler {
    state: RotationState,
}

impl RotationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the cursor at `cursor_index` (taken modulo the catalog length
    /// on first selection).
    pub fn with_cursor(cursor_index: usize) -> Self {
        Self {
            state: RotationState {
                cursor_index,
                ..RotationState::default()
            },
        }
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn active(&self) -> Option<&CatalogItem> {
        self.state.active.as_ref()
    }

    /// Advances the rotation against a fresh view of the catalog.
    ///
    /// Returns `None` (and leaves the state untouched) when the catalog is empty.
    pub fn tick(&mut self, catalog: &Catalog) -> Option<Selection> {
        let flat = catalog.flatten();
        if flat.is_empty() {
            debug!("catalog empty; no selection");
            return None;
        }
        let len = flat.len();

        let (index, reason) = match self.state.active_item_id() {
            None => (self.state.cursor_index % len, SelectionReason::Initial),
            Some(active_id) => match flat.iter().position(|i| i.item_id == active_id) {
                Some(i) => ((i + 1) % len, SelectionReason::Advanced),
                None => {
                    // Graceful degradation: the catalog shrank or reshuffled.
                    let index = self.state.cursor_index % len;
                    warn!(
                        missing_item_id = active_id,
                        fallback_index = index,
                        catalog_len = len,
                        "active item left the catalog; falling back to cursor"
                    );
                    (index, SelectionReason::Fallback)
                }
            },
        };

        let item = flat[index].clone();

        self.state.generation += 1;
        self.state.cursor_index = index;
        self.state.ordered_catalog = flat.iter().map(|i| i.item_id).collect();
        self.state.active = Some(item.clone());

        let ticket = FetchTicket {
            item_id: item.item_id,
            generation: self.state.generation,
        };

        debug!(
            item_id = item.item_id,
            index,
            generation = ticket.generation,
            ?reason,
            "rotation selected item"
        );

        Some(Selection {
            item,
            index,
            reason,
            ticket,
        })
    }

    /// Decides whether a resolved fetch may be applied.
    ///
    /// A result is accepted only when its item is still the active one and it
    /// is newer than anything accepted before. Accepting records its generation.
    pub fn accept(&mut self, ticket: &FetchTicket) -> bool {
        let is_active = self.state.active_item_id() == Some(ticket.item_id);
        let is_newer = ticket.generation > self.state.applied_generation;

        if is_active && is_newer {
            self.state.applied_generation = ticket.generation;
            true
        } else {
            debug!(
                item_id = ticket.item_id,
                generation = ticket.generation,
                active_item_id = ?self.state.active_item_id(),
                applied_generation = self.state.applied_generation,
                "rejecting stale fetch result"
            );
            false
        }
    }
}
