//! Unit conversions for weather readings
//!
//! OpenWeatherMap reports SI units by default (Kelvin, hPa, m/s, UTC epoch
//! seconds). The dashboard shows imperial units and local wall-clock time.

use chrono::{DateTime, NaiveDateTime};

/// Inches of mercury per hectopascal
const INHG_PER_HPA: f64 = 0.029_529_983_071_4;

/// Miles per hour per metre per second
const MPH_PER_MPS: f64 = 2.236_936_292_054_4;

/// Converts a temperature in Kelvin to degrees Fahrenheit
pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    (kelvin - 273.15) * 9.0 / 5.0 + 32.0
}

/// Converts a pressure in hectopascals to inches of mercury
pub fn hpa_to_inhg(hpa: f64) -> f64 {
    hpa * INHG_PER_HPA
}

/// Converts a speed in metres per second to miles per hour
pub fn mps_to_mph(mps: f64) -> f64 {
    mps * MPH_PER_MPS
}

/// Shifts a UTC epoch timestamp by a UTC offset and returns the local wall-clock time.
///
/// # Arguments
/// * `utc` - Seconds since the Unix epoch
/// * `offset_seconds` - Offset from UTC in seconds (negative west of Greenwich)
///
/// # Returns
/// * `Some(NaiveDateTime)` - The local time at the given offset
/// * `None` - If the shifted timestamp is outside chrono's representable range
pub fn utc_to_local(utc: i64, offset_seconds: i64) -> Option<NaiveDateTime> {
    let shifted = utc.checked_add(offset_seconds)?;
    DateTime::from_timestamp(shifted, 0).map(|dt| dt.naive_utc())
}
