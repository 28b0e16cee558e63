//! Human-facing labels: EUR amounts in Estonian notation, signed deltas and
//! wall-clock times in the display zone.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::types::Sample;

const NBSP: char = '\u{a0}';
const MINUS: char = '\u{2212}';

/// Formats `value` as `12,50` with a decimal comma and no-break-space grouping
/// for five or more integer digits.
pub fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let grouped = if whole.len() >= 5 {
        let mut out = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                out.push(NBSP);
            }
            out.push(ch);
        }
        out
    } else {
        whole
    };

    if value < 0.0 && cents > 0 {
        format!("{MINUS}{grouped},{frac:02}")
    } else {
        format!("{grouped},{frac:02}")
    }
}

/// `12,50 €`
pub fn format_eur(value: f64) -> String {
    format!("{} €", format_amount(value))
}

/// Signed change such as `+1,50 €` or `−0,25 €`. Zero is shown as non-negative.
pub fn format_delta(delta: f64) -> String {
    let sign = if delta >= 0.0 { '+' } else { MINUS };
    format!("{sign}{} €", format_amount(delta.abs()))
}

/// `HH:MM` in `zone`.
pub fn format_clock(t: DateTime<Utc>, zone: Tz) -> String {
    t.with_timezone(&zone).format("%H:%M").to_string()
}

/// Hover label: `10:45 • 12,50 €`.
pub fn tooltip_label(sample: &Sample, zone: Tz) -> String {
    format!("{} • {}", format_clock(sample.timestamp, zone), format_eur(sample.price))
}

/// Compact duration label used in titles: `1h`, `90m`, `2h`.
pub fn duration_label(d: TimeDelta) -> String {
    let minutes = d.num_minutes();
    if minutes > 0 && minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{}s", d.num_seconds().max(0))
    }
}
