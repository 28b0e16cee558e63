//! Plot geometry shared with the rendering layer.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::types::Sample;

pub const DEFAULT_OUTER_WIDTH: f64 = 760.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 56.0,
            right: 28.0,
            bottom: 56.0,
            left: 72.0,
        }
    }
}

/// Outer and inner plot dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotLayout {
    pub width: f64,
    pub height: f64,
    pub inner_width: f64,
    pub inner_height: f64,
    pub margins: Margins,
}

impl PlotLayout {
    /// Derives the plot area from the container width. A zero or non-finite
    /// width falls back to `DEFAULT_OUTER_WIDTH`.
    pub fn from_outer_width(width: f64) -> Self {
        let width = if width.is_finite() && width > 0.0 {
            width
        } else {
            DEFAULT_OUTER_WIDTH
        };
        let margins = Margins::default();
        let height = (width * 0.48).round().max(320.0);

        Self {
            width,
            height,
            inner_width: (width - margins.left - margins.right).max(140.0),
            inner_height: (height - margins.top - margins.bottom).max(120.0),
            margins,
        }
    }
}

/// Vertical extent of a window's prices, padded so flat lines stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// `[min - pad, max + pad]` with `pad = max(6% of the spread, 0.1)`.
    pub fn padded(samples: &[Sample]) -> Option<Self> {
        let (lo, hi) = samples.iter().fold(None, |acc: Option<(f64, f64)>, s| {
            Some(match acc {
                Some((lo, hi)) => (lo.min(s.price), hi.max(s.price)),
                None => (s.price, s.price),
            })
        })?;

        let pad = ((hi - lo) * 0.06).max(0.1);
        Some(Self {
            min: lo - pad,
            max: hi + pad,
        })
    }
}

/// Linear mapping between `[start, end]` and `[0, range_px]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    range_px: f64,
}

impl TimeScale {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, range_px: f64) -> Self {
        Self {
            start,
            end,
            range_px,
        }
    }

    fn span_ms(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64
    }

    pub fn to_px(&self, t: DateTime<Utc>) -> f64 {
        let span = self.span_ms();
        if span <= 0.0 {
            return 0.0;
        }
        (t - self.start).num_milliseconds() as f64 / span * self.range_px
    }

    /// Maps a pointer x-coordinate back to an instant (millisecond precision).
    pub fn invert(&self, px: f64) -> DateTime<Utc> {
        let span = self.span_ms();
        if span <= 0.0 || self.range_px <= 0.0 || !px.is_finite() {
            return self.start;
        }

        let offset_ms = (px / self.range_px * span).round() as i64;
        self.start
            .checked_add_signed(TimeDelta::milliseconds(offset_ms))
            .unwrap_or(self.end)
    }
}
