pub mod catalog;
pub mod engine;
pub mod state;
pub mod types;

pub use catalog::{Catalog, CatalogItem, ItemId};
pub use engine::RotationScheduler;
pub use state::RotationState;
pub use types::{FetchTicket, Selection, SelectionReason};
