mod almanac;
mod config;
mod orbit;
mod predict;
mod report;
mod store;
mod timebase;

use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::almanac::{next_crossing, previous_crossing, Crossing, SunCrossing};
use crate::config::Config;
use crate::orbit::{epoch_age_days, propagate, subpoint, TleRecord};
use crate::predict::{find_passes, GroundSite};
use crate::report::{LocationReport, PassesReport};
use crate::store::{Clock, FileTleStore, SystemClock, TleStore};
use crate::timebase::Instant;

#[derive(Parser)]
#[command(name = "skypass")]
#[command(about = "Satellite pass prediction from two-line element sets")]
struct Cli {
    /// Optional YAML configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the satellite's current sub-point
    Location {
        /// TLE file: name plus two element lines, or the bare pair
        #[arg(long)]
        tle: String,
        /// RFC 3339 instant to evaluate instead of now
        #[arg(long)]
        time: Option<String>,
    },
    /// Predict upcoming passes over a ground site
    Passes {
        #[arg(long)]
        tle: String,
        /// Site as "lat, lon" in degrees; falls back to the configured station
        #[arg(long)]
        site: Option<String>,
        /// Site altitude in meters
        #[arg(long)]
        altitude: Option<f64>,
        /// Number of passes to predict
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// Minimum elevation in degrees; 0 searches the full sky
        #[arg(long, allow_negative_numbers = true)]
        horizon: Option<f64>,
        /// RFC 3339 search start instead of now
        #[arg(long)]
        start: Option<String>,
        /// Search window such as "3days" or "36h"
        #[arg(long)]
        window: Option<String>,
    },
    /// Next solar rise and set crossings for a site
    Sun {
        #[arg(long)]
        site: String,
        #[arg(long)]
        time: Option<String>,
        /// Reference elevation in degrees, e.g. -6 for civil twilight
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<f64>,
    },
    /// Validate a TLE file
    Validate { tle: String },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Commands::Location { tle, time } => location(&config, &tle, time.as_deref()),
        Commands::Passes {
            tle,
            site,
            altitude,
            count,
            horizon,
            start,
            window,
        } => passes(
            &config,
            &tle,
            site.as_deref(),
            altitude,
            count,
            horizon,
            start.as_deref(),
            window.as_deref(),
        ),
        Commands::Sun {
            site,
            time,
            threshold,
        } => sun(&site, time.as_deref(), threshold),
        Commands::Validate { tle } => validate(&tle),
    }
}

fn location(config: &Config, tle_path: &str, time: Option<&str>) -> ExitCode {
    let t = match resolve_time(time) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let store = FileTleStore::new(tle_path);
    let tle = match store.current_tle() {
        Ok(tle) => tle,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    warn_if_stale(&tle, t, config.predict.tle_staleness_days);

    let state = match propagate(&tle, t) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let sp = subpoint(&state);
    log::debug!("sub-point altitude {:.1} km", sp.altitude_km);
    print_json(&LocationReport::new(&sp, t));
    ExitCode::SUCCESS
}

#[allow(clippy::too_many_arguments)]
fn passes(
    config: &Config,
    tle_path: &str,
    site_arg: Option<&str>,
    altitude: Option<f64>,
    count: usize,
    horizon: Option<f64>,
    start: Option<&str>,
    window: Option<&str>,
) -> ExitCode {
    let coordinates = match site_arg {
        Some(s) => s,
        None => match config.station.coordinates.as_deref() {
            Some(s) => {
                if let Some(name) = config.station.name.as_deref() {
                    log::info!("using configured station {name}");
                }
                s
            }
            None => {
                eprintln!("Error: no --site given and no station configured");
                return ExitCode::FAILURE;
            }
        },
    };
    let horizon_deg = horizon.unwrap_or(config.predict.horizon_deg);
    let altitude_m = altitude.unwrap_or(config.station.altitude_m);
    let site = match GroundSite::from_coordinates(coordinates, altitude_m, horizon_deg) {
        Ok(site) => site,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let start_t = match resolve_time(start) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let store = FileTleStore::new(tle_path);
    let tle = match store.current_tle() {
        Ok(tle) => tle,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let stale = warn_if_stale(&tle, start_t, config.predict.tle_staleness_days);

    let mut search = config.predict.search();
    if let Some(window) = window {
        match humantime::parse_duration(window) {
            Ok(d) => search.max_window_days = d.as_secs_f64() / 86_400.0,
            Err(e) => {
                eprintln!("Error parsing window {window:?}: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    match find_passes(&tle, &site, start_t, count, &search, None) {
        Ok(list) => {
            print_json(&PassesReport::new(&site, count, start_t, stale, &list));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn sun(site_arg: &str, time: Option<&str>, threshold: Option<f64>) -> ExitCode {
    let threshold = threshold.unwrap_or(0.0);
    let site = match GroundSite::from_coordinates(site_arg, 0.0, 0.0) {
        Ok(site) => site,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let t = match resolve_time(time) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let lat = site.latitude_deg;
    let lon = site.longitude_deg;
    let crossings = [
        next_crossing(lat, lon, t, threshold, Crossing::Rising),
        next_crossing(lat, lon, t, threshold, Crossing::Setting),
        previous_crossing(lat, lon, t, threshold, Crossing::Rising),
        previous_crossing(lat, lon, t, threshold, Crossing::Setting),
    ];
    let mut values = Vec::new();
    for crossing in crossings {
        match crossing {
            Ok(c) => values.push(crossing_value(c)),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    print_json(&serde_json::json!({
        "latitude": lat,
        "longitude": lon,
        "threshold": threshold,
        "next_rising": values[0],
        "next_setting": values[1],
        "previous_rising": values[2],
        "previous_setting": values[3],
    }));
    ExitCode::SUCCESS
}

fn validate(tle_path: &str) -> ExitCode {
    let store = FileTleStore::new(tle_path);
    match store.current_tle() {
        Ok(tle) => {
            let name = tle.name.as_deref().unwrap_or("(unnamed)");
            println!("TLE is valid: {name}, catalog {}", tle.norad_id);
            println!("  designator: {}", tle.intl_designator);
            println!("  epoch: {}", tle.epoch.to_datetime().to_rfc3339());
            println!(
                "  inclination: {} deg, revolution {} at epoch",
                tle.inclination_deg, tle.rev_number
            );
            println!("  mean motion: {} rev/day", tle.mean_motion_rev_day);
            println!("  bstar: {:e}", tle.bstar);
            if let Some(updated) = store.last_update() {
                println!("  file updated: {}", updated.to_datetime().to_rfc3339());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Invalid TLE: {e}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_time(time: Option<&str>) -> Result<Instant, ExitCode> {
    match time {
        None => Ok(SystemClock.now()),
        Some(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => Ok(Instant::from_datetime(dt.with_timezone(&Utc))),
            Err(e) => {
                eprintln!("Error parsing time {s:?}: {e}");
                Err(ExitCode::FAILURE)
            }
        },
    }
}

/// Stale elements still propagate; the caller just gets told.
fn warn_if_stale(tle: &TleRecord, t: Instant, threshold_days: f64) -> bool {
    let age = epoch_age_days(tle, t);
    let stale = age.abs() > threshold_days;
    if stale {
        log::warn!(
            "TLE epoch is {age:.1} days from the requested instant; accuracy degrades beyond {threshold_days:.0} days"
        );
    }
    stale
}

fn crossing_value(crossing: SunCrossing) -> serde_json::Value {
    match crossing {
        SunCrossing::At(t) => serde_json::Value::String(t.to_datetime().to_rfc3339()),
        SunCrossing::AlwaysAbove => serde_json::Value::String("always_above".to_string()),
        SunCrossing::AlwaysBelow => serde_json::Value::String("always_below".to_string()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing output: {e}"),
    }
}
