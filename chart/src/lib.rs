//! Price-history reconstruction and windowing.
//!
//! Pipeline: raw records → `EventNormalizer` → `SeriesBuilder` →
//! `WindowExtractor` → `TickAligner`, with `NearestPointLocator` serving
//! hover queries against the resulting window. Every stage is a pure
//! function of its inputs and the supplied `now`.

pub mod error;
pub mod format;
pub mod frame;
pub mod layout;
pub mod locate;
pub mod normalizer;
pub mod series;
pub mod ticks;
pub mod types;
pub mod window;

pub use error::SeriesError;
pub use frame::{ChartFrame, Direction, FrameComposer, Hover};
pub use locate::NearestPointLocator;
pub use normalizer::EventNormalizer;
pub use series::{PriceHints, SeriesBuilder};
pub use ticks::{TickAligner, TickPolicy};
pub use types::{PriceEvent, PriceHistoryRecord, Sample, Series, TickSet, Window};
pub use window::WindowExtractor;
