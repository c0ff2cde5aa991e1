//! Core data models for the weather dashboard
//!
//! This module contains the weather snapshot shown on screen, the explicit
//! fetch outcome, and the `WeatherSource` that owns the fetch bookkeeping.

pub mod weather;

pub use weather::{decode_response, WeatherClient, WeatherError, WeatherFetcher};

use std::time::Instant;

use chrono::Local;

use crate::refresh::RefreshState;

/// Geographic position the dashboard reports weather for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Huntington Beach, CA
    pub const DEFAULT: Coordinate = Coordinate {
        latitude: 33.681944,
        longitude: -117.973056,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One internally consistent set of display-ready weather values.
///
/// Each field holds either a formatted value or the empty string. A snapshot
/// is never edited after construction; a new fetch produces a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherSnapshot {
    pub temp_f: String,
    pub feels_like_f: String,
    pub temp_min_f: String,
    pub temp_max_f: String,
    pub pressure_hg: String,
    pub humidity_pct: String,
    pub wind_speed_mph: String,
    pub wind_direction_deg: String,
    pub cloud_cover_pct: String,
    pub time_zone_offset: String,
    pub sunrise_utc: String,
    pub sunset_utc: String,
    pub location_name: String,
    /// Observation time reported by the provider (`dt`), in the location's
    /// time zone. Only when the response has no `dt` is this the host's local
    /// time of the fetch attempt, so it does not tick forward on a refetch of
    /// unchanged data.
    pub last_update: String,
}

/// The all-empty snapshot shown before the first success
static BLANK_SNAPSHOT: WeatherSnapshot = WeatherSnapshot {
    temp_f: String::new(),
    feels_like_f: String::new(),
    temp_min_f: String::new(),
    temp_max_f: String::new(),
    pressure_hg: String::new(),
    humidity_pct: String::new(),
    wind_speed_mph: String::new(),
    wind_direction_deg: String::new(),
    cloud_cover_pct: String::new(),
    time_zone_offset: String::new(),
    sunrise_utc: String::new(),
    sunset_utc: String::new(),
    location_name: String::new(),
    last_update: String::new(),
};

impl WeatherSnapshot {
    /// Number of rows in the weather panel
    pub const FIELD_COUNT: usize = 14;

    /// Returns a reference to the shared all-empty snapshot
    pub fn blank() -> &'static WeatherSnapshot {
        &BLANK_SNAPSHOT
    }

    /// Field names paired with their values, in panel order
    pub fn fields(&self) -> [(&'static str, &str); Self::FIELD_COUNT] {
        [
            ("temp_f", self.temp_f.as_str()),
            ("feels_like_f", self.feels_like_f.as_str()),
            ("temp_min_f", self.temp_min_f.as_str()),
            ("temp_max_f", self.temp_max_f.as_str()),
            ("pressure_hg", self.pressure_hg.as_str()),
            ("humidity_pct", self.humidity_pct.as_str()),
            ("wind_speed_mph", self.wind_speed_mph.as_str()),
            ("wind_direction_deg", self.wind_direction_deg.as_str()),
            ("cloud_cover_pct", self.cloud_cover_pct.as_str()),
            ("time_zone_offset", self.time_zone_offset.as_str()),
            ("sunrise_utc", self.sunrise_utc.as_str()),
            ("sunset_utc", self.sunset_utc.as_str()),
            ("location_name", self.location_name.as_str()),
            ("last_update", self.last_update.as_str()),
        ]
    }

    /// True when every field is the empty placeholder
    pub fn is_blank(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_empty())
    }
}

/// Outcome of a single fetch attempt
#[derive(Debug)]
pub enum FetchResult {
    /// The response decoded into a complete snapshot
    Success(WeatherSnapshot),
    /// The attempt failed; nothing was decoded
    Failure(WeatherError),
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success(_))
    }
}

impl From<Result<WeatherSnapshot, WeatherError>> for FetchResult {
    fn from(result: Result<WeatherSnapshot, WeatherError>) -> Self {
        match result {
            Ok(snapshot) => FetchResult::Success(snapshot),
            Err(err) => FetchResult::Failure(err),
        }
    }
}

/// What the weather panel shows after a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Show empty values until the next success
    #[default]
    Blank,
    /// Keep showing the last successful snapshot
    KeepLastGood,
}

/// Fetches weather for a fixed coordinate and remembers the outcome
#[derive(Debug)]
pub struct WeatherSource<F = WeatherClient> {
    fetcher: F,
    coordinate: Coordinate,
    last_good: Option<WeatherSnapshot>,
    last_failed: bool,
}

impl<F: WeatherFetcher> WeatherSource<F> {
    pub fn new(fetcher: F, coordinate: Coordinate) -> Self {
        Self {
            fetcher,
            coordinate,
            last_good: None,
            last_failed: false,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn fetcher_mut(&mut self) -> &mut F {
        &mut self.fetcher
    }

    /// Last successfully decoded snapshot, if any
    pub fn last_good(&self) -> Option<&WeatherSnapshot> {
        self.last_good.as_ref()
    }

    /// Makes one fetch attempt.
    ///
    /// The attempt is stamped on `refresh` before any network I/O, so a failed
    /// or slow request still re-arms the interval. Errors never escape; they
    /// come back as `FetchResult::Failure`.
    pub async fn fetch(&mut self, refresh: &mut RefreshState, now: Instant) -> FetchResult {
        refresh.mark_attempted(now);
        let attempted_at = Local::now().naive_local();

        let result: FetchResult = self
            .fetcher
            .fetch_weather(self.coordinate, attempted_at)
            .await
            .into();

        match &result {
            FetchResult::Success(snapshot) => {
                self.last_good = Some(snapshot.clone());
                self.last_failed = false;
            }
            FetchResult::Failure(_) => {
                self.last_failed = true;
            }
        }

        result
    }

    /// The snapshot the weather panel should show under `policy`
    pub fn displayed(&self, policy: StalePolicy) -> &WeatherSnapshot {
        match (&self.last_good, self.last_failed, policy) {
            (None, _, _) => WeatherSnapshot::blank(),
            (Some(_), true, StalePolicy::Blank) => WeatherSnapshot::blank(),
            (Some(snapshot), _, _) => snapshot,
        }
    }
}
