use crate::almanac::error::AlmanacError;
use crate::almanac::sun::solar_elevation_deg;
use crate::timebase::Instant;

/// Coarse scan step for bracketing a solar elevation crossing.
const SCAN_STEP_S: f64 = 600.0;
/// One day of coarse steps, plus one to close the final bracket.
const SCAN_STEPS: u32 = 145;
/// Refinement target for the crossing instant.
const REFINE_TOLERANCE_S: f64 = 0.5;
const MAX_BISECTIONS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Rising,
    Setting,
}

/// Outcome of a solar crossing search.
///
/// At extreme latitudes a full search day may contain no crossing at all;
/// that is reported as a permanent condition, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SunCrossing {
    At(Instant),
    AlwaysAbove,
    AlwaysBelow,
}

/// Find the next instant after `start` at which the Sun crosses
/// `threshold_deg` elevation in the given direction, searching one day.
pub fn next_crossing(
    latitude_deg: f64,
    longitude_deg: f64,
    start: Instant,
    threshold_deg: f64,
    crossing: Crossing,
) -> Result<SunCrossing, AlmanacError> {
    let offset = |t: Instant| solar_elevation_deg(latitude_deg, longitude_deg, t) - threshold_deg;

    let mut prev_t = start;
    let mut prev = offset(start);
    for i in 1..=SCAN_STEPS {
        let t = start.plus_seconds(f64::from(i) * SCAN_STEP_S);
        let cur = offset(t);
        if brackets(crossing, prev, cur) {
            return refine(prev_t, t, crossing, &offset).map(SunCrossing::At);
        }
        prev_t = t;
        prev = cur;
    }

    Ok(no_crossing(offset(start)))
}

/// Find the most recent instant before `start` at which the Sun crossed
/// `threshold_deg` elevation in the given direction, searching one day back.
pub fn previous_crossing(
    latitude_deg: f64,
    longitude_deg: f64,
    start: Instant,
    threshold_deg: f64,
    crossing: Crossing,
) -> Result<SunCrossing, AlmanacError> {
    let offset = |t: Instant| solar_elevation_deg(latitude_deg, longitude_deg, t) - threshold_deg;

    let mut later_t = start;
    let mut later = offset(start);
    for i in 1..=SCAN_STEPS {
        let t = start.plus_seconds(-f64::from(i) * SCAN_STEP_S);
        let earlier = offset(t);
        if brackets(crossing, earlier, later) {
            return refine(t, later_t, crossing, &offset).map(SunCrossing::At);
        }
        later_t = t;
        later = earlier;
    }

    Ok(no_crossing(offset(start)))
}

fn brackets(crossing: Crossing, before: f64, after: f64) -> bool {
    match crossing {
        Crossing::Rising => before < 0.0 && after >= 0.0,
        Crossing::Setting => before >= 0.0 && after < 0.0,
    }
}

/// With no transition found across a full day the condition is permanent
/// for the search window; classify by the elevation at the search origin.
fn no_crossing(offset_at_start: f64) -> SunCrossing {
    if offset_at_start >= 0.0 {
        SunCrossing::AlwaysAbove
    } else {
        SunCrossing::AlwaysBelow
    }
}

fn refine(
    mut low: Instant,
    mut high: Instant,
    crossing: Crossing,
    offset: &dyn Fn(Instant) -> f64,
) -> Result<Instant, AlmanacError> {
    for _ in 0..MAX_BISECTIONS {
        if high.seconds_since(low) <= REFINE_TOLERANCE_S {
            return Ok(high);
        }
        let mid = Instant::midpoint(low, high);
        let above = offset(mid) >= 0.0;
        let in_upper_half = match crossing {
            Crossing::Rising => above,
            Crossing::Setting => !above,
        };
        if in_upper_half {
            high = mid;
        } else {
            low = mid;
        }
    }
    Err(AlmanacError::NoConvergence {
        iterations: MAX_BISECTIONS,
    })
}
