//! OpenWeatherMap current weather client
//!
//! This module fetches the current conditions for a coordinate from the
//! OpenWeatherMap API and decodes them into a display-ready `WeatherSnapshot`.

use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{Coordinate, WeatherSnapshot};
use crate::convert::{hpa_to_inhg, kelvin_to_fahrenheit, mps_to_mph, utc_to_local};

/// Base URL for the OpenWeatherMap API
pub const OPEN_WEATHER_BASE_URL: &str = "https://api.openweathermap.org";

/// Path of the current weather endpoint
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Format used for every timestamp on the panel
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// No API key was configured
    #[error("No OpenWeatherMap API key configured")]
    MissingApiKey,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Weather API returned HTTP {0}")]
    HttpStatus(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Timestamp plus offset does not fit a calendar date
    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(i64),
}

/// Source of decoded weather snapshots.
///
/// `WeatherClient` is the network implementation; tests substitute canned ones.
#[allow(async_fn_in_trait)]
pub trait WeatherFetcher {
    /// Fetch a snapshot for `coordinate`.
    ///
    /// `attempted_at` is the local time of the attempt, used as the
    /// last-update stamp when the response carries no observation time.
    async fn fetch_weather(
        &self,
        coordinate: Coordinate,
        attempted_at: NaiveDateTime,
    ) -> Result<WeatherSnapshot, WeatherError>;
}

/// Client for fetching weather data from OpenWeatherMap
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherClient {
    /// Create a new WeatherClient with default settings
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: OPEN_WEATHER_BASE_URL.to_string(),
        }
    }

    /// Create a new WeatherClient whose requests give up after `timeout`
    pub fn with_timeout(api_key: Option<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: OPEN_WEATHER_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the current weather endpoint
    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CURRENT_WEATHER_PATH)
    }
}

impl WeatherFetcher for WeatherClient {
    async fn fetch_weather(
        &self,
        coordinate: Coordinate,
        attempted_at: NaiveDateTime,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;

        tracing::debug!(
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            "Fetching current weather"
        );

        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::HttpStatus(status.as_u16()));
        }

        let text = response.text().await?;
        decode_response(&text, attempted_at)
    }
}

/// Decode a current weather JSON body into a snapshot.
///
/// Any missing key or type mismatch fails the whole decode, so a snapshot is
/// either complete or not produced at all.
///
/// # Arguments
/// * `body` - Raw JSON response body
/// * `attempted_at` - Local time of the fetch, used when the body has no `dt`
pub fn decode_response(
    body: &str,
    attempted_at: NaiveDateTime,
) -> Result<WeatherSnapshot, WeatherError> {
    let response: OwCurrentResponse = serde_json::from_str(body)?;
    let offset = response.timezone;

    let local_time = |utc: i64| -> Result<String, WeatherError> {
        utc_to_local(utc, offset)
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
            .ok_or(WeatherError::InvalidTimestamp(utc))
    };

    let last_update = match response.dt {
        Some(dt) => local_time(dt)?,
        None => attempted_at.format(TIMESTAMP_FORMAT).to_string(),
    };

    let main = &response.main;
    Ok(WeatherSnapshot {
        temp_f: format_degrees(main.temp),
        feels_like_f: format_degrees(main.feels_like),
        temp_min_f: format_degrees(main.temp_min),
        temp_max_f: format_degrees(main.temp_max),
        pressure_hg: format!("{:<5.2}", hpa_to_inhg(main.pressure)),
        humidity_pct: format!("{:<3}", main.humidity),
        wind_speed_mph: format!("{:<3.0}", mps_to_mph(response.wind.speed)),
        wind_direction_deg: format!("{:<3.0}", response.wind.deg),
        cloud_cover_pct: format!("{:<3}", response.clouds.all),
        time_zone_offset: offset.to_string(),
        sunrise_utc: local_time(response.sys.sunrise)?,
        sunset_utc: local_time(response.sys.sunset)?,
        location_name: response.name,
        last_update,
    })
}

/// Kelvin to a three-column Fahrenheit integer
fn format_degrees(kelvin: f64) -> String {
    format!("{:<3.0}", kelvin_to_fahrenheit(kelvin))
}

/// OpenWeatherMap current weather response
#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    wind: OwWind,
    clouds: OwClouds,
    timezone: i64,
    sys: OwSys,
    name: String,
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}
