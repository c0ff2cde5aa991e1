//! Command-line interface parsing for weatherdash
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated `DashboardConfig`. With no arguments the dashboard runs with its
//! built-in coordinate and a 60 second refresh.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::data::weather::OPEN_WEATHER_BASE_URL;
use crate::data::{Coordinate, StalePolicy};
use crate::refresh::RefreshConfig;

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    #[error("Invalid latitude: {0}. Must be between -90 and 90")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0}. Must be between -180 and 180")]
    InvalidLongitude(f64),

    #[error("Invalid {0}: must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Invalid scale: must be at least 1")]
    ZeroScale,
}

/// weatherdash - time, host identity, and current weather in the terminal
#[derive(Parser, Debug)]
#[command(name = "weatherdash")]
#[command(about = "Terminal dashboard with the time, host address, and current weather")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Latitude of the weather location
    #[arg(long, allow_negative_numbers = true, default_value_t = Coordinate::DEFAULT.latitude)]
    pub lat: f64,

    /// Longitude of the weather location
    #[arg(long, allow_negative_numbers = true, default_value_t = Coordinate::DEFAULT.longitude)]
    pub lon: f64,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Seconds between weather refreshes
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    pub interval: u64,

    /// Milliseconds between screen repaints
    #[arg(long, value_name = "MS", default_value_t = 500)]
    pub tick_ms: u64,

    /// Give up on a weather request after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Keep showing the last good weather when a refresh fails
    #[arg(long)]
    pub keep_last_good: bool,

    /// Write logs to this file (the terminal is used by the dashboard)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Weather API base URL
    #[arg(long, value_name = "URL", default_value = OPEN_WEATHER_BASE_URL)]
    pub endpoint: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scale a JSON bitmap font by an integer factor
    ScaleFont {
        /// Font to read
        base: PathBuf,
        /// Where to write the scaled font
        output: PathBuf,
        /// Integer scale factor
        #[arg(long, default_value_t = 2)]
        scale: u32,
    },
}

/// Configuration for the dashboard derived from CLI arguments
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub coordinate: Coordinate,
    pub api_key: Option<String>,
    pub refresh: RefreshConfig,
    pub timeout: Option<Duration>,
    pub policy: StalePolicy,
    pub log_file: Option<PathBuf>,
    pub endpoint: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            coordinate: Coordinate::DEFAULT,
            api_key: None,
            refresh: RefreshConfig::default(),
            timeout: None,
            policy: StalePolicy::Blank,
            log_file: None,
            endpoint: OPEN_WEATHER_BASE_URL.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Creates a DashboardConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(DashboardConfig)` with validated settings
    /// * `Err(CliError)` if a coordinate or duration is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if !(-90.0..=90.0).contains(&cli.lat) {
            return Err(CliError::InvalidLatitude(cli.lat));
        }
        if !(-180.0..=180.0).contains(&cli.lon) {
            return Err(CliError::InvalidLongitude(cli.lon));
        }
        if cli.interval == 0 {
            return Err(CliError::ZeroDuration("interval"));
        }
        if cli.tick_ms == 0 {
            return Err(CliError::ZeroDuration("tick-ms"));
        }
        if cli.timeout == Some(0) {
            return Err(CliError::ZeroDuration("timeout"));
        }

        Ok(DashboardConfig {
            coordinate: Coordinate::new(cli.lat, cli.lon),
            api_key: cli.api_key.clone().filter(|key| !key.trim().is_empty()),
            refresh: RefreshConfig {
                weather_interval: Duration::from_secs(cli.interval),
                tick_interval: Duration::from_millis(cli.tick_ms),
            },
            timeout: cli.timeout.map(Duration::from_secs),
            policy: if cli.keep_last_good {
                StalePolicy::KeepLastGood
            } else {
                StalePolicy::Blank
            },
            log_file: cli.log_file.clone(),
            endpoint: cli.endpoint.clone(),
        })
    }
}

/// Validates the scale-font factor
pub fn parse_scale(scale: u32) -> Result<u32, CliError> {
    if scale == 0 {
        Err(CliError::ZeroScale)
    } else {
        Ok(scale)
    }
}
