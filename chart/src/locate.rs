use chrono::{DateTime, Utc};

use crate::types::Sample;

/// Resolves the sample nearest to a query instant by bisection.
///
/// Read-only over a borrowed, time-ordered slice (usually `Window::samples`).
#[derive(Debug, Clone, Copy)]
pub struct NearestPointLocator<'a> {
    samples: &'a [Sample],
}

impl<'a> NearestPointLocator<'a> {
    pub fn new(samples: &'a [Sample]) -> Self {
        Self { samples }
    }

    /// Nearest sample to `query`. Exact ties resolve to the earlier sample.
    pub fn locate(&self, query: DateTime<Utc>) -> Option<&'a Sample> {
        let samples = self.samples;
        let i = samples.partition_point(|s| s.timestamp < query);

        let before = i.checked_sub(1).and_then(|j| samples.get(j));
        let after = samples.get(i);

        match (before, after) {
            (Some(a), Some(b)) => {
                if b.timestamp - query < query - a.timestamp {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (a, b) => a.or(b),
        }
    }
}
