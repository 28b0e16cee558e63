use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SeriesError;

/// Raw price-change record as delivered by the event store.
///
/// Prices are decoded leniently: numbers, numeric strings and `null` are all
/// accepted. Anything that does not yield a number decodes as `None` and is
/// treated as a non-finite price further down the pipeline. A `createdAt` that
/// is missing or not a string decodes as `None`; the normalizer drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryRecord {
    pub id: i64,

    #[serde(alias = "inventoryId")]
    pub item_id: i64,

    #[serde(default, deserialize_with = "lenient_price")]
    pub price_before: Option<f64>,

    #[serde(default, deserialize_with = "lenient_price")]
    pub price_after: Option<f64>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_price<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LenientNumber>::deserialize(de)?;

    Ok(raw.and_then(|v| match v {
        LenientNumber::Number(n) => Some(n),
        LenientNumber::Text(s) => s.trim().parse::<f64>().ok(),
        LenientNumber::Other(_) => None,
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientText {
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LenientText>::deserialize(de)?;

    Ok(raw.and_then(|v| match v {
        LenientText::Text(s) => Some(s),
        LenientText::Other(_) => None,
    }))
}

/// One validated price change. Prices may be non-finite (NaN marks a missing value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEvent {
    pub timestamp: DateTime<Utc>,
    pub price_before: f64,
    pub price_after: f64,
}

/// A point on the reconstructed step function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Right-continuous step function: the price holds between samples and jumps
/// at each sample's timestamp.
///
/// A `Series` is never empty, its prices are finite and its timestamps never
/// decrease. Equal timestamps only occur when two real events share an instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    /// Validates and wraps an ordered list of samples.
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self, SeriesError> {
        if samples.is_empty() {
            return Err(SeriesError::Empty);
        }

        for (index, s) in samples.iter().enumerate() {
            if !s.price.is_finite() {
                return Err(SeriesError::NonFinite { index });
            }
            if index > 0 && s.timestamp < samples[index - 1].timestamp {
                return Err(SeriesError::OutOfOrder { index });
            }
        }

        Ok(Self { samples })
    }

    /// Callers guarantee the invariants checked by `from_samples`.
    pub(crate) fn from_ordered(samples: Vec<Sample>) -> Self {
        debug_assert!(!samples.is_empty());
        debug_assert!(samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn first(&self) -> &Sample {
        &self.samples[0]
    }

    pub fn last(&self) -> &Sample {
        &self.samples[self.samples.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The visible trailing slice of a series.
///
/// `samples` always starts at `cutoff` and ends at `now`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Window {
    pub cutoff: DateTime<Utc>,
    pub now: DateTime<Utc>,

    /// Net change over the window (last price minus first price).
    pub delta: f64,

    pub samples: Vec<Sample>,
}

impl Window {
    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }
}

/// Ascending axis ticks bounded by `[cutoff, now]`, both ends included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSet {
    ticks: Vec<DateTime<Utc>>,
}

impl TickSet {
    pub(crate) fn new(ticks: Vec<DateTime<Utc>>) -> Self {
        Self { ticks }
    }

    pub fn as_slice(&self) -> &[DateTime<Utc>] {
        &self.ticks
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.ticks.iter()
    }

    pub fn first(&self) -> Option<&DateTime<Utc>> {
        self.ticks.first()
    }

    pub fn last(&self) -> Option<&DateTime<Utc>> {
        self.ticks.last()
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
