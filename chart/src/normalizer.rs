//! Event normalization.
//!
//! Turns raw history records into validated `PriceEvent`s in ascending time
//! order. Input order is not trusted and records with a timestamp that cannot
//! be parsed (or cannot be represented as an instant) are dropped one by one.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::types::{PriceEvent, PriceHistoryRecord};

/// Offset-less layouts accepted after RFC 3339 fails.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy)]
pub struct EventNormalizer {
    /// Zone used to interpret timestamps that carry no UTC offset.
    naive_zone: Tz,
}

impl Default for EventNormalizer {
    fn default() -> Self {
        Self { naive_zone: Tz::UTC }
    }
}

impl EventNormalizer {
    pub fn new(naive_zone: Tz) -> Self {
        Self { naive_zone }
    }

    /// Parses, filters and stably sorts `records`.
    ///
    /// Records sharing a timestamp keep their arrival order.
    pub fn normalize(&self, records: &[PriceHistoryRecord]) -> Vec<PriceEvent> {
        let mut events: Vec<PriceEvent> = records
            .iter()
            .filter_map(|r| {
                let parsed = r
                    .created_at
                    .as_deref()
                    .and_then(|raw| self.parse_timestamp(raw));

                match parsed {
                    Some(timestamp) => Some(PriceEvent {
                        timestamp,
                        price_before: r.price_before.unwrap_or(f64::NAN),
                        price_after: r.price_after.unwrap_or(f64::NAN),
                    }),
                    None => {
                        debug!(
                            record_id = r.id,
                            created_at = ?r.created_at,
                            "dropping record with unparseable timestamp"
                        );
                        None
                    }
                }
            })
            .collect();

        // `sort_by_key` is stable.
        events.sort_by_key(|e| e.timestamp);
        events
    }

    /// Parses a record timestamp into an absolute instant.
    ///
    /// Local times that fall into a DST gap or an ambiguous fold of the
    /// fallback zone are unrepresentable and yield `None`.
    pub fn parse_timestamp(&self, raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }

        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })?;

        self.naive_zone
            .from_local_datetime(&naive)
            .single()
            .map(|ts| ts.with_timezone(&Utc))
    }
}
