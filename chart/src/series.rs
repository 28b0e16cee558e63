//! Step-function reconstruction.
//!
//! Folds ascending `PriceEvent`s into a gap-free `Series` that starts one
//! millisecond before the first event and extends to `now`.

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::{PriceEvent, Sample, Series};

/// Catalog-side prices used when the events carry no usable baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceHints {
    pub base_price: Option<f64>,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesBuilder {
    hints: PriceHints,
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

fn one_ms_before(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.checked_sub_signed(TimeDelta::milliseconds(1)).unwrap_or(ts)
}

impl SeriesBuilder {
    pub fn new(hints: PriceHints) -> Self {
        Self { hints }
    }

    /// Price in effect before the first event.
    ///
    /// Priority: first non-zero finite `price_before`, configured base price,
    /// unit price, first `price_after`, zero.
    pub fn baseline(&self, events: &[PriceEvent]) -> f64 {
        events
            .iter()
            .map(|e| e.price_before)
            .find(|p| p.is_finite() && *p != 0.0)
            .or_else(|| self.hints.base_price.and_then(finite))
            .or_else(|| self.hints.unit_price.and_then(finite))
            .or_else(|| events.first().and_then(|e| finite(e.price_after)))
            .unwrap_or(0.0)
    }

    /// Builds the step function for `events`, which must be in ascending
    /// timestamp order (see `EventNormalizer`).
    pub fn build(&self, events: &[PriceEvent], now: DateTime<Utc>) -> Series {
        let base = self.baseline(events);

        let Some(first) = events.first() else {
            return Series::from_ordered(vec![
                Sample::new(one_ms_before(now), base),
                Sample::new(now, base),
            ]);
        };

        let mut samples = Vec::with_capacity(events.len() + 2);
        samples.push(Sample::new(one_ms_before(first.timestamp), base));

        // A malformed step never erases the last known price.
        let mut last = base;
        for e in events {
            let next = finite(e.price_after).unwrap_or(last);
            samples.push(Sample::new(e.timestamp, next));
            last = next;
        }

        if samples.last().is_some_and(|s| s.timestamp < now) {
            samples.push(Sample::new(now, last));
        }

        Series::from_ordered(samples)
    }
}
