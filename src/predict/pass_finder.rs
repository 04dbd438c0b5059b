use log::debug;

use crate::orbit::{propagate, TleRecord};
use crate::predict::error::PredictError;
use crate::predict::site::GroundSite;
use crate::predict::topocentric::observe;
use crate::predict::types::{PassEvent, PassList, SearchOutcome, TopocentricView};
use crate::predict::visibility::{classify, ground_dark};
use crate::timebase::Instant;

/// Tunable search parameters. The defaults are the documented behavior:
/// 60 s detection grid, 0.1 s event refinement, passes under 30 s skipped
/// without counting, 25 min clock advance past each set, 10 day window.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub coarse_step_s: f64,
    pub refine_tolerance_s: f64,
    pub min_duration_s: f64,
    pub advance_minutes: f64,
    pub max_window_days: f64,
    /// Solar elevation below which the site counts as dark.
    pub twilight_deg: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            coarse_step_s: 60.0,
            refine_tolerance_s: 0.1,
            min_duration_s: 30.0,
            advance_minutes: 25.0,
            max_window_days: 10.0,
            twilight_deg: -6.0,
        }
    }
}

/// Search forward from `start` for up to `count` passes of the satellite
/// above the site's horizon.
///
/// A pass already in progress at `start` is not reported; the scan first
/// waits for the satellite to drop below the horizon. Visibility is
/// classified at transit. The optional `abort` callback is polled between
/// coarse grid steps so a long search can be cancelled cooperatively;
/// both cancellation and window exhaustion yield the partial list with
/// the corresponding outcome rather than an error.
pub fn find_passes(
    tle: &TleRecord,
    site: &GroundSite,
    start: Instant,
    count: usize,
    config: &SearchConfig,
    abort: Option<&dyn Fn() -> bool>,
) -> Result<PassList, PredictError> {
    let deadline = start.plus_days(config.max_window_days);
    let mut passes: Vec<PassEvent> = Vec::new();
    let mut cursor = start;
    let mut outcome = SearchOutcome::Complete;

    'search: while passes.len() < count {
        // Coarse grid scan for the next upward horizon crossing.
        let mut prev_t = cursor;
        let mut prev_el = view_at(tle, site, prev_t)?.elevation_deg;
        let (below_t, above_t) = loop {
            if should_abort(abort) {
                outcome = SearchOutcome::Aborted;
                break 'search;
            }
            if prev_t >= deadline {
                outcome = SearchOutcome::WindowExhausted;
                break 'search;
            }
            let t = prev_t.plus_seconds(config.coarse_step_s);
            let el = view_at(tle, site, t)?.elevation_deg;
            if prev_el < site.horizon_deg && el >= site.horizon_deg {
                break (prev_t, t);
            }
            prev_t = t;
            prev_el = el;
        };

        let rise_t = refine_crossing(tle, site, below_t, above_t, true, config)?;
        let rise_view = view_at(tle, site, rise_t)?;

        // Walk forward until the satellite drops back below the horizon.
        // A pass in progress at the window edge may finish, but a target
        // that never sets ends the search after one extra day.
        let mut t_above = above_t;
        let (above_set_t, below_set_t) = loop {
            if should_abort(abort) {
                outcome = SearchOutcome::Aborted;
                break 'search;
            }
            if t_above.days_since(deadline) > 1.0 {
                outcome = SearchOutcome::WindowExhausted;
                break 'search;
            }
            let t = t_above.plus_seconds(config.coarse_step_s);
            let el = view_at(tle, site, t)?.elevation_deg;
            if el < site.horizon_deg {
                break (t_above, t);
            }
            t_above = t;
        };

        let set_t = refine_crossing(tle, site, above_set_t, below_set_t, false, config)?;
        let set_view = view_at(tle, site, set_t)?;
        let transit_view = refine_maximum(tle, site, rise_t, set_t, config)?;

        let duration_s = set_t.seconds_since(rise_t);
        if duration_s < config.min_duration_s {
            debug!(
                "skipping {duration_s:.0} s pass below the {:.0} s minimum",
                config.min_duration_s
            );
        } else {
            let transit_t = transit_view.instant;
            let transit_state = propagate(tle, transit_t)?;
            let visibility = classify(
                transit_state.illuminated,
                ground_dark(
                    site.latitude_deg,
                    site.longitude_deg,
                    transit_t,
                    config.twilight_deg,
                ),
            );
            debug!(
                "transit range {:.1} km, range rate {:+.3} km/s",
                transit_view.range_km, transit_view.range_rate_km_s
            );
            passes.push(PassEvent {
                rise: rise_view.instant.to_datetime(),
                rise_azimuth_deg: rise_view.azimuth_deg,
                transit: transit_t.to_datetime(),
                transit_elevation_deg: transit_view.elevation_deg,
                set: set_view.instant.to_datetime(),
                set_azimuth_deg: set_view.azimuth_deg,
                duration_seconds: duration_s,
                visibility,
            });
        }

        // Jump well past this revolution before searching again.
        cursor = set_t.plus_minutes(config.advance_minutes);
    }

    Ok(PassList { passes, outcome })
}

fn should_abort(abort: Option<&dyn Fn() -> bool>) -> bool {
    abort.is_some_and(|check| check())
}

fn view_at(tle: &TleRecord, site: &GroundSite, t: Instant) -> Result<TopocentricView, PredictError> {
    Ok(observe(&propagate(tle, t)?, site))
}

/// Bisect a horizon crossing down to the refinement tolerance. For a rise
/// the returned instant is on the above-horizon side, for a set on the
/// below-horizon side, so a pass brackets its own rise and set.
fn refine_crossing(
    tle: &TleRecord,
    site: &GroundSite,
    mut low: Instant,
    mut high: Instant,
    rising: bool,
    config: &SearchConfig,
) -> Result<Instant, PredictError> {
    while high.seconds_since(low) > config.refine_tolerance_s {
        let mid = Instant::midpoint(low, high);
        let above = view_at(tle, site, mid)?.elevation_deg >= site.horizon_deg;
        if above == rising {
            high = mid;
        } else {
            low = mid;
        }
    }
    Ok(high)
}

/// Ternary search for the elevation maximum between rise and set.
/// Elevation is unimodal across a single pass.
fn refine_maximum(
    tle: &TleRecord,
    site: &GroundSite,
    mut low: Instant,
    mut high: Instant,
    config: &SearchConfig,
) -> Result<TopocentricView, PredictError> {
    while high.seconds_since(low) > config.refine_tolerance_s {
        let third = high.seconds_since(low) / 3.0;
        let m1 = low.plus_seconds(third);
        let m2 = high.plus_seconds(-third);
        if view_at(tle, site, m1)?.elevation_deg < view_at(tle, site, m2)?.elevation_deg {
            low = m1;
        } else {
            high = m2;
        }
    }
    view_at(tle, site, Instant::midpoint(low, high))
}
