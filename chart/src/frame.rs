//! Render-ready chart frames.
//!
//! A `ChartFrame` carries everything the drawing layer needs (window, ticks,
//! labels, layout) so none of the reconstruction logic is re-derived there.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::format::{duration_label, format_clock, format_delta, tooltip_label};
use crate::layout::{PlotLayout, PriceRange, TimeScale};
use crate::locate::NearestPointLocator;
use crate::ticks::{TickAligner, TickPolicy};
use crate::types::{Sample, Series, TickSet, Window};
use crate::window::WindowExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    NonNegative,
    Negative,
}

impl Direction {
    pub fn of(delta: f64) -> Self {
        if delta >= 0.0 {
            Direction::NonNegative
        } else {
            Direction::Negative
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub title: String,
    pub window: Window,
    pub ticks: TickSet,
    pub tick_labels: Vec<String>,
    pub delta_label: String,
    pub direction: Direction,
    pub price_range: Option<PriceRange>,
    pub layout: PlotLayout,
}

impl ChartFrame {
    pub fn delta(&self) -> f64 {
        self.window.delta
    }

    pub fn time_scale(&self) -> TimeScale {
        TimeScale::new(self.window.cutoff, self.window.now, self.layout.inner_width)
    }
}

/// Result of a hover query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hover {
    pub sample: Sample,
    pub label: String,
}

#[derive(Debug, Clone, Copy)]
pub struct FrameComposer {
    extractor: WindowExtractor,
    aligner: TickAligner,
}

impl FrameComposer {
    pub fn new(window: TimeDelta, zone: Tz, policy: TickPolicy) -> Self {
        Self {
            extractor: WindowExtractor::new(window),
            aligner: TickAligner::new(zone, policy),
        }
    }

    pub fn zone(&self) -> Tz {
        self.aligner.zone()
    }

    pub fn extractor(&self) -> &WindowExtractor {
        &self.extractor
    }

    /// Builds a frame for `series` as of `now`, laid out for a container of
    /// `outer_width` pixels.
    pub fn compose(
        &self,
        item_name: &str,
        series: &Series,
        now: DateTime<Utc>,
        outer_width: f64,
    ) -> ChartFrame {
        let layout = PlotLayout::from_outer_width(outer_width);
        let window = self.extractor.extract(series, now);
        let ticks = self
            .aligner
            .ticks(window.cutoff, window.now, layout.inner_width);

        let zone = self.aligner.zone();
        let tick_labels = ticks.iter().map(|t| format_clock(*t, zone)).collect();

        ChartFrame {
            title: format!(
                "{item_name} • Last {}",
                duration_label(self.extractor.duration())
            ),
            delta_label: format_delta(window.delta),
            direction: Direction::of(window.delta),
            price_range: PriceRange::padded(&window.samples),
            tick_labels,
            ticks,
            window,
            layout,
        }
    }

    /// Nearest sample to the instant under `pointer_x` (inner-plot pixels).
    pub fn hover(&self, frame: &ChartFrame, pointer_x: f64) -> Option<Hover> {
        let query = frame.time_scale().invert(pointer_x);
        self.hover_at(frame, query)
    }

    pub fn hover_at(&self, frame: &ChartFrame, query: DateTime<Utc>) -> Option<Hover> {
        NearestPointLocator::new(&frame.window.samples)
            .locate(query)
            .map(|s| Hover {
                sample: *s,
                label: tooltip_label(s, self.aligner.zone()),
            })
    }
}
