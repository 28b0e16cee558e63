//! Wall-clock aligned time-axis ticks.
//!
//! Alignment is computed from the wall-clock minute and second in the display
//! zone, then ticks are generated by stepping backwards in absolute time from
//! the snapped instant. Raw instant arithmetic alone would misplace ticks in
//! zones whose offset is not a whole number of steps (e.g. UTC+05:30).

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use chrono_tz::Tz;

use crate::types::TickSet;

/// Width-dependent tick density knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPolicy {
    /// Step used below `width_threshold_px`.
    pub narrow_step_minutes: u32,

    /// Step used at or above `width_threshold_px`.
    pub wide_step_minutes: u32,

    pub width_threshold_px: u32,

    /// Roughly one tick per this many pixels.
    pub px_per_tick: u32,

    pub min_ticks: usize,
}

impl Default for TickPolicy {
    fn default() -> Self {
        Self {
            narrow_step_minutes: 15,
            wide_step_minutes: 10,
            width_threshold_px: 520,
            px_per_tick: 110,
            min_ticks: 3,
        }
    }
}

impl TickPolicy {
    pub fn step_minutes(&self, width_px: f64) -> u32 {
        if width_px < f64::from(self.width_threshold_px) {
            self.narrow_step_minutes
        } else {
            self.wide_step_minutes
        }
    }

    /// Never below 2: `cutoff` and `now` are always kept.
    pub fn max_ticks(&self, width_px: f64) -> usize {
        let per = f64::from(self.px_per_tick.max(1));
        let fit = (width_px.max(0.0) / per).floor() as usize;
        fit.max(self.min_ticks).max(2)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TickAligner {
    zone: Tz,
    policy: TickPolicy,
}

impl TickAligner {
    pub fn new(zone: Tz, policy: TickPolicy) -> Self {
        Self { zone, policy }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn policy(&self) -> &TickPolicy {
        &self.policy
    }

    /// Ticks for `[cutoff, now]` rendered at `width_px` inner plot width.
    pub fn ticks(&self, cutoff: DateTime<Utc>, now: DateTime<Utc>, width_px: f64) -> TickSet {
        let step = self.policy.step_minutes(width_px);
        let ticks = aligned_ticks(cutoff, now, step, self.zone);
        TickSet::new(declutter(ticks, self.policy.max_ticks(width_px)))
    }
}

/// Snaps `instant` down to the most recent wall-clock multiple of
/// `step_minutes` in `zone`.
pub fn snap_to_step(instant: DateTime<Utc>, step_minutes: u32, zone: Tz) -> DateTime<Utc> {
    let local = instant.with_timezone(&zone);
    let step = step_minutes.max(1);

    let back = TimeDelta::minutes(i64::from(local.minute() % step))
        + TimeDelta::seconds(i64::from(local.second()))
        + TimeDelta::nanoseconds(i64::from(local.nanosecond() % 1_000_000_000));

    instant.checked_sub_signed(back).unwrap_or(instant)
}

/// Aligned ticks in ascending order with `cutoff` first and `now` last.
pub fn aligned_ticks(
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
    step_minutes: u32,
    zone: Tz,
) -> Vec<DateTime<Utc>> {
    let step = TimeDelta::minutes(i64::from(step_minutes.max(1)));

    let mut out = Vec::new();
    let mut t = snap_to_step(now, step_minutes, zone);
    while t >= cutoff {
        out.push(t);
        match t.checked_sub_signed(step) {
            Some(prev) => t = prev,
            None => break,
        }
    }
    out.reverse();

    if out.first() != Some(&cutoff) {
        out.insert(0, cutoff);
    }
    if out.last() != Some(&now) {
        out.push(now);
    }
    out
}

/// Reduces `ticks` to at most `max` entries, never dropping the first or last.
///
/// Interior ticks are kept at an even stride starting from the first interior tick.
pub fn declutter(ticks: Vec<DateTime<Utc>>, max: usize) -> Vec<DateTime<Utc>> {
    if ticks.len() <= max || ticks.len() <= 2 {
        return ticks;
    }

    let first = ticks[0];
    let last = ticks[ticks.len() - 1];
    let interior = &ticks[1..ticks.len() - 1];

    let budget = max.saturating_sub(2);
    if budget == 0 {
        return vec![first, last];
    }

    let stride = interior.len().div_ceil(budget);

    let mut out = Vec::with_capacity(max);
    out.push(first);
    out.extend(interior.iter().step_by(stride).copied());
    out.push(last);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::{Asia::Kolkata, Europe::Tallinn};

    fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, h, m, s).unwrap()
    }

    #[test]
    fn snaps_to_step_boundary_in_local_time() {
        let now = utc(9, 37, 42) + TimeDelta::milliseconds(500);
        assert_eq!(snap_to_step(now, 10, Tallinn), utc(9, 30, 0));
        assert_eq!(snap_to_step(now, 15, Tallinn), utc(9, 30, 0));
    }

    #[test]
    fn half_hour_offset_zone_aligns_on_local_minutes() {
        // 09:37 UTC is 15:07 in Kolkata; the last 15-minute boundary there is
        // 15:00 local, i.e. 09:30 UTC.
        assert_eq!(snap_to_step(utc(9, 37, 0), 15, Kolkata), utc(9, 30, 0));

        // 09:44 UTC is 15:14 local; 10-minute boundary 15:10 local = 09:40 UTC.
        assert_eq!(snap_to_step(utc(9, 44, 0), 10, Kolkata), utc(9, 40, 0));
    }

    #[test]
    fn generates_aligned_ticks_with_exact_boundaries() {
        let now = utc(9, 37, 42);
        let cutoff = now - TimeDelta::hours(1);

        let ticks = aligned_ticks(cutoff, now, 10, Tallinn);

        assert_eq!(
            ticks,
            vec![
                cutoff,
                utc(8, 40, 0),
                utc(8, 50, 0),
                utc(9, 0, 0),
                utc(9, 10, 0),
                utc(9, 20, 0),
                utc(9, 30, 0),
                now,
            ]
        );
    }

    #[test]
    fn on_grid_boundaries_are_not_duplicated() {
        let now = utc(10, 0, 0);
        let cutoff = utc(9, 0, 0);

        let ticks = aligned_ticks(cutoff, now, 15, Tallinn);

        assert_eq!(
            ticks,
            vec![utc(9, 0, 0), utc(9, 15, 0), utc(9, 30, 0), utc(9, 45, 0), utc(10, 0, 0)]
        );
    }

    #[test]
    fn window_shorter_than_step_keeps_only_boundaries() {
        let now = utc(9, 37, 0);
        let cutoff = utc(9, 33, 0);

        assert_eq!(aligned_ticks(cutoff, now, 10, Tallinn), vec![cutoff, now]);
    }

    #[test]
    fn declutter_keeps_boundaries_and_strides_interior() {
        let ticks: Vec<_> = (0..10).map(|i| utc(9, i * 5, 0)).collect();

        let out = declutter(ticks.clone(), 5);

        assert!(out.len() <= 5);
        assert_eq!(out.first(), ticks.first());
        assert_eq!(out.last(), ticks.last());
        // 8 interior ticks, budget 3 -> stride 3 -> interior indices 1, 4, 7.
        assert_eq!(out, vec![ticks[0], ticks[1], ticks[4], ticks[7], ticks[9]]);
    }

    #[test]
    fn declutter_is_a_no_op_under_budget() {
        let ticks = vec![utc(9, 0, 0), utc(9, 10, 0), utc(9, 20, 0)];
        assert_eq!(declutter(ticks.clone(), 3), ticks);
    }

    #[test]
    fn policy_picks_step_and_budget_from_width() {
        let p = TickPolicy::default();

        assert_eq!(p.step_minutes(400.0), 15);
        assert_eq!(p.step_minutes(520.0), 10);
        assert_eq!(p.max_ticks(140.0), 3);
        assert_eq!(p.max_ticks(660.0), 6);
    }

    #[test]
    fn budget_never_drops_below_the_two_endpoints() {
        let p = TickPolicy {
            min_ticks: 1,
            ..TickPolicy::default()
        };
        assert_eq!(p.max_ticks(50.0), 2);

        let now = utc(9, 37, 42);
        let cutoff = now - TimeDelta::hours(1);
        let ticks = TickAligner::new(Tallinn, p).ticks(cutoff, now, 50.0);

        assert_eq!(ticks.as_slice(), &[cutoff, now]);
    }

    fn assert_interior_on_local_grid(ticks: &[DateTime<Utc>], step: u32) {
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
        for t in &ticks[1..ticks.len() - 1] {
            let local = t.with_timezone(&Tallinn);
            assert_eq!(local.minute() % step, 0, "tick {t} is {local}");
            assert_eq!(local.second(), 0);
        }
    }

    #[test]
    fn ticks_stay_on_the_local_grid_across_autumn_fallback() {
        // Tallinn leaves EEST at 2025-10-26 01:00 UTC (04:00 local -> 03:00).
        let now = Utc.with_ymd_and_hms(2025, 10, 26, 1, 37, 42).unwrap();
        let cutoff = now - TimeDelta::hours(1);

        let ticks = aligned_ticks(cutoff, now, 10, Tallinn);

        assert_eq!(ticks.first(), Some(&cutoff));
        assert_eq!(ticks.last(), Some(&now));
        assert_eq!(ticks.len(), 8);
        assert_interior_on_local_grid(&ticks, 10);
    }

    #[test]
    fn ticks_stay_on_the_local_grid_across_spring_forward() {
        // Tallinn enters EEST at 2025-03-30 01:00 UTC (03:00 local -> 04:00).
        let now = Utc.with_ymd_and_hms(2025, 3, 30, 1, 22, 5).unwrap();
        let cutoff = now - TimeDelta::hours(1);

        let ticks = aligned_ticks(cutoff, now, 15, Tallinn);

        assert_eq!(ticks.first(), Some(&cutoff));
        assert_eq!(ticks.last(), Some(&now));
        assert_eq!(ticks.len(), 6);
        assert_interior_on_local_grid(&ticks, 15);
    }

    #[test]
    fn aligner_applies_policy_end_to_end() {
        let aligner = TickAligner::new(Tallinn, TickPolicy::default());
        let now = utc(9, 37, 42);
        let cutoff = now - TimeDelta::hours(1);

        // Narrow: 15-minute step, at most 3 ticks.
        let narrow = aligner.ticks(cutoff, now, 300.0);
        assert_eq!(narrow.len(), 3);
        assert_eq!(narrow.first(), Some(&cutoff));
        assert_eq!(narrow.last(), Some(&now));

        // Wide: 10-minute step, 8 ticks fit into 7 * 110 px.
        let wide = aligner.ticks(cutoff, now, 880.0);
        assert_eq!(wide.len(), 8);
    }
}
