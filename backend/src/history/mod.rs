pub mod client;
pub mod errors;

pub use client::HistoryClient;
pub use errors::HistoryError;

use async_trait::async_trait;
use chart::PriceHistoryRecord;

/// Source of raw price-change records for one item.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    async fn price_history(&self, item_id: i64) -> Result<Vec<PriceHistoryRecord>, HistoryError>;
}
