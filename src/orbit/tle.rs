use std::ops::Range;
use std::str::FromStr;

use crate::orbit::error::OrbitError;
use crate::timebase::Instant;

/// A parsed two-line element set.
///
/// Angles are kept in the degrees the TLE encodes them in; the mean motion
/// derivative fields keep the TLE convention of storing n-dot/2 and
/// n-ddot/6 so propagation can apply them to elapsed time directly.
/// Immutable once parsed.
#[derive(Debug, Clone)]
pub struct TleRecord {
    pub name: Option<String>,
    pub norad_id: u32,
    pub intl_designator: String,
    pub epoch: Instant,
    /// Mean motion, revolutions per day.
    pub mean_motion_rev_day: f64,
    /// First derivative of mean motion divided by two, rev/day^2.
    pub mean_motion_dot: f64,
    /// Second derivative of mean motion divided by six, rev/day^3.
    pub mean_motion_ddot: f64,
    /// Drag term, inverse Earth radii.
    pub bstar: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub eccentricity: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    pub rev_number: u32,
}

impl TleRecord {
    /// Parse a TLE from its two 69-column element lines, with an optional
    /// name line. Both checksums must validate before any field is used.
    pub fn parse(name: Option<&str>, line1: &str, line2: &str) -> Result<Self, OrbitError> {
        validate_line(line1, 1, '1')?;
        validate_line(line2, 2, '2')?;

        let catalog1 = line1[2..7].trim();
        let catalog2 = line2[2..7].trim();
        if catalog1 != catalog2 {
            return Err(OrbitError::CatalogMismatch {
                line1: catalog1.to_string(),
                line2: catalog2.to_string(),
            });
        }

        let norad_id: u32 = field(line1, 1, 2..7, "catalog number")?;
        let intl_designator = line1[9..17].trim().to_string();
        let epoch = parse_epoch(line1)?;
        let mean_motion_dot = parse_point_decimal(line1, 1, 33..43, "mean motion derivative")?;
        let mean_motion_ddot =
            parse_packed_decimal(line1, 1, 44..52, "mean motion second derivative")?;
        let bstar = parse_packed_decimal(line1, 1, 53..61, "bstar")?;

        let inclination_deg: f64 = field(line2, 2, 8..16, "inclination")?;
        let raan_deg: f64 = field(line2, 2, 17..25, "right ascension of ascending node")?;
        let eccentricity = f64::from(field::<u32>(line2, 2, 26..33, "eccentricity")?) * 1e-7;
        let arg_perigee_deg: f64 = field(line2, 2, 34..42, "argument of perigee")?;
        let mean_anomaly_deg: f64 = field(line2, 2, 43..51, "mean anomaly")?;
        let mean_motion_rev_day: f64 = field(line2, 2, 52..63, "mean motion")?;
        let rev_number: u32 = field(line2, 2, 63..68, "revolution number")?;

        Ok(TleRecord {
            name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            norad_id,
            intl_designator,
            epoch,
            mean_motion_rev_day,
            mean_motion_dot,
            mean_motion_ddot,
            bstar,
            inclination_deg,
            raan_deg,
            eccentricity,
            arg_perigee_deg,
            mean_anomaly_deg,
            rev_number,
        })
    }

    /// Parse the first TLE found in a block of text, accepting both the
    /// 3-line (name + elements) and bare 2-line forms.
    pub fn from_text(text: &str) -> Result<Self, OrbitError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end())
            .filter(|l| !l.is_empty())
            .collect();

        for i in 0..lines.len() {
            if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
                let name = if i > 0
                    && !lines[i - 1].starts_with("1 ")
                    && !lines[i - 1].starts_with("2 ")
                {
                    Some(lines[i - 1])
                } else {
                    None
                };
                return TleRecord::parse(name, lines[i], lines[i + 1]);
            }
        }

        Err(OrbitError::MissingLines)
    }
}

fn validate_line(line: &str, line_no: u8, expected: char) -> Result<(), OrbitError> {
    if line.len() != 69 || !line.is_ascii() {
        return Err(OrbitError::LineLength {
            line: line_no,
            length: line.len(),
        });
    }
    if !line.starts_with(expected) {
        return Err(OrbitError::LineNumber {
            line: line_no,
            expected,
        });
    }

    let computed = line_checksum(&line[..68]);
    let recorded = line[68..]
        .parse::<u32>()
        .map_err(|_| OrbitError::Field {
            line: line_no,
            field: "checksum",
            value: line[68..].to_string(),
        })?;
    if computed != recorded {
        return Err(OrbitError::Checksum {
            line: line_no,
            computed,
            recorded,
        });
    }
    Ok(())
}

/// Modulo-10 line checksum: digits count their value, a minus sign counts
/// one, everything else counts zero.
fn line_checksum(line: &str) -> u32 {
    line.chars()
        .map(|c| match c {
            '0'..='9' => c as u32 - '0' as u32,
            '-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

fn field<T: FromStr>(
    line: &str,
    line_no: u8,
    range: Range<usize>,
    name: &'static str,
) -> Result<T, OrbitError> {
    let raw = &line[range];
    raw.trim().parse().map_err(|_| OrbitError::Field {
        line: line_no,
        field: name,
        value: raw.to_string(),
    })
}

/// Epoch field: two-digit year (pivot 57, so 57..99 are 19xx) followed by
/// a fractional day of year, day 1 being January 1.
fn parse_epoch(line1: &str) -> Result<Instant, OrbitError> {
    let yy: i32 = field(line1, 1, 18..20, "epoch year")?;
    let day_of_year: f64 = field(line1, 1, 20..32, "epoch day")?;
    if day_of_year < 1.0 || day_of_year >= 367.0 {
        return Err(OrbitError::Field {
            line: 1,
            field: "epoch day",
            value: line1[20..32].trim().to_string(),
        });
    }

    let year = if yy < 57 { 2000 + yy } else { 1900 + yy };
    let jan1 = Instant::from_calendar(year, 1, 1, 0, 0, 0.0)?;
    Ok(jan1.plus_days(day_of_year - 1.0))
}

/// Fields such as ` .00002182` or `-.00002182`: a bare decimal with the
/// leading zero omitted.
fn parse_point_decimal(
    line: &str,
    line_no: u8,
    range: Range<usize>,
    name: &'static str,
) -> Result<f64, OrbitError> {
    let raw = &line[range];
    let trimmed = raw.trim();
    let rebuilt = if let Some(rest) = trimmed.strip_prefix("-.") {
        format!("-0.{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("+.") {
        format!("0.{rest}")
    } else if let Some(rest) = trimmed.strip_prefix('.') {
        format!("0.{rest}")
    } else {
        trimmed.to_string()
    };
    rebuilt.parse().map_err(|_| OrbitError::Field {
        line: line_no,
        field: name,
        value: raw.to_string(),
    })
}

/// Packed exponential fields such as `-11606-4`, meaning -0.11606e-4:
/// sign, five mantissa digits with an implied leading decimal point,
/// then a signed single-digit power of ten.
fn parse_packed_decimal(
    line: &str,
    line_no: u8,
    range: Range<usize>,
    name: &'static str,
) -> Result<f64, OrbitError> {
    let raw = &line[range];
    if raw.trim().is_empty() {
        return Ok(0.0);
    }
    let err = || OrbitError::Field {
        line: line_no,
        field: name,
        value: raw.to_string(),
    };

    let (mantissa_part, exponent_part) = raw.split_at(raw.len() - 2);
    let sign = if mantissa_part.trim_start().starts_with('-') {
        -1.0
    } else {
        1.0
    };
    let digits = mantissa_part
        .trim_start_matches([' ', '+', '-'])
        .trim();
    let mantissa: f64 = digits.parse::<u32>().map_err(|_| err())? as f64 * 1e-5;
    let exponent: i32 = exponent_part.trim().parse().map_err(|_| err())?;

    Ok(sign * mantissa * 10f64.powi(exponent))
}
