//! Trailing window extraction.
//!
//! A pure derivation: every refresh recomputes the window from the full series
//! and the current wall clock, with no incremental state.

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::{Sample, Series, Window};

pub fn default_window() -> TimeDelta {
    TimeDelta::hours(1)
}

#[derive(Debug, Clone, Copy)]
pub struct WindowExtractor {
    duration: TimeDelta,
}

impl Default for WindowExtractor {
    fn default() -> Self {
        Self {
            duration: default_window(),
        }
    }
}

impl WindowExtractor {
    /// Negative durations are clamped to zero.
    pub fn new(duration: TimeDelta) -> Self {
        Self {
            duration: duration.max(TimeDelta::zero()),
        }
    }

    pub fn duration(&self) -> TimeDelta {
        self.duration
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.duration)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Extracts `[now - duration, now]` from `series`.
    ///
    /// The first sample is always `(cutoff, seed)`, where `seed` is the price of
    /// the latest sample at or before `cutoff` (or the first sample when none
    /// exists). Samples dated after `now` are not shown yet.
    pub fn extract(&self, series: &Series, now: DateTime<Utc>) -> Window {
        let cutoff = self.cutoff(now);
        let all = series.samples();

        let after_cutoff = all.partition_point(|s| s.timestamp <= cutoff);
        let seed = match after_cutoff {
            0 => series.first().price,
            i => all[i - 1].price,
        };

        let start = all.partition_point(|s| s.timestamp < cutoff);

        let mut samples = Vec::with_capacity(all.len() - start + 2);
        samples.push(Sample::new(cutoff, seed));
        samples.extend(
            all[start..]
                .iter()
                .take_while(|s| s.timestamp <= now)
                .copied(),
        );

        let last = samples[samples.len() - 1];
        if last.timestamp < now {
            samples.push(Sample::new(now, last.price));
        }

        let delta = samples[samples.len() - 1].price - samples[0].price;

        Window {
            cutoff,
            now,
            delta,
            samples,
        }
    }
}
