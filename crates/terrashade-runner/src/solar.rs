//! Solar position from time and place.
//!
//! Low-precision ephemeris after the formulas of Astronomy Answers, good to
//! a fraction of a degree for dates near the present.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::f64::consts::PI;

use crate::{Result, RunnerError};

const RAD: f64 = PI / 180.0;
const MS_PER_DAY: f64 = 86_400_000.0;
const JULIAN_1970: f64 = 2_440_588.0;
const JULIAN_2000: f64 = 2_451_545.0;
/// Obliquity of the Earth's axis.
const OBLIQUITY: f64 = RAD * 23.4397;
/// Perihelion of the Earth.
const PERIHELION: f64 = RAD * 102.9372;

/// Where the sun is in the sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Radians from south, positive towards west.
    pub azimuth: f64,
    /// Radians above the horizon.
    pub altitude: f64,
}

impl SolarPosition {
    pub fn is_above_horizon(&self) -> bool {
        self.altitude > 0.0
    }
}

/// Days since the J2000 epoch.
fn days_since_j2000(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / MS_PER_DAY - 0.5 + JULIAN_1970 - JULIAN_2000
}

fn solar_mean_anomaly(d: f64) -> f64 {
    RAD * (357.5291 + 0.985_600_28 * d)
}

fn ecliptic_longitude(m: f64) -> f64 {
    let centre = RAD * (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin());
    m + centre + PERIHELION + PI
}

fn sidereal_time(d: f64, lw: f64) -> f64 {
    RAD * (280.16 + 360.985_623_5 * d) - lw
}

/// Sun position seen from `(lat, lng)` at `time`.
pub fn solar_position(time: DateTime<Utc>, lat: f64, lng: f64) -> SolarPosition {
    let lw = RAD * -lng;
    let phi = RAD * lat;
    let d = days_since_j2000(time);

    let l = ecliptic_longitude(solar_mean_anomaly(d));
    let declination = (OBLIQUITY.sin() * l.sin()).asin();
    let right_ascension = (l.sin() * OBLIQUITY.cos()).atan2(l.cos());

    let h = sidereal_time(d, lw) - right_ascension;

    SolarPosition {
        azimuth: h.sin().atan2(h.cos() * phi.sin() - declination.tan() * phi.cos()),
        altitude: (phi.sin() * declination.sin() + phi.cos() * declination.cos() * h.cos()).asin(),
    }
}

/// Parse `YYYY-MM-DD HH:MM` as UTC, or any RFC 3339 timestamp.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| RunnerError::InvalidTime(s.to_string()))
}
