//! Shared types used by the rotation subsystem.

use crate::catalog::{CatalogItem, ItemId};

/// Identifies one dispatched history fetch.
///
/// `generation` increases by one on every selection, so a response can be
/// matched against the rotation state at the moment it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub item_id: ItemId,
    pub generation: u64,
}

/// How the next item was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    /// No item was active yet.
    Initial,

    /// The active item was found; moved one position forward.
    Advanced,

    /// The active item disappeared from the catalog; fell back to the raw
    /// cursor modulo the new catalog length.
    Fallback,
}

/// Outcome of one rotation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub item: CatalogItem,
    pub index: usize,
    pub reason: SelectionReason,
    pub ticket: FetchTicket,
}
