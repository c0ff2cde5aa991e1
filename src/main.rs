//! weatherdash - a terminal dashboard
//!
//! Shows the local time, this host's name and address, and the current
//! weather for a fixed location, refreshed once a minute. Any key exits.

use std::io;
use std::panic;
use std::process::ExitCode;

use clap::Parser;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};

use weatherdash::app::Dashboard;
use weatherdash::cli::{parse_scale, Cli, Command, DashboardConfig};
use weatherdash::data::WeatherClient;
use weatherdash::font::scale_font;
use weatherdash::host::HostIdentity;
use weatherdash::logging;
use weatherdash::surface::{self, Screen};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal; the screen's own teardown then
        // leaves the panic output alone
        surface::mark_terminal_released();
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Builds the weather client, honoring the optional request timeout
fn weather_client(config: &DashboardConfig) -> Result<WeatherClient, Box<dyn std::error::Error>> {
    let client = match config.timeout {
        Some(timeout) => WeatherClient::with_timeout(config.api_key.clone(), timeout)?,
        None => WeatherClient::new(config.api_key.clone()),
    };
    Ok(client.with_base_url(config.endpoint.clone()))
}

async fn run_dashboard(config: DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    logging::init(config.log_file.as_deref())?;
    tracing::info!(
        lat = config.coordinate.latitude,
        lon = config.coordinate.longitude,
        interval_secs = config.refresh.weather_interval.as_secs(),
        "Starting dashboard"
    );
    if config.api_key.is_none() {
        tracing::warn!("No API key configured; weather fields will stay empty");
    }

    let client = weather_client(&config)?;
    let host = HostIdentity::resolve();
    let mut dashboard =
        Dashboard::new(client, config.coordinate, config.refresh, host).with_policy(config.policy);

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    let mut screen = Screen::stdout()?;
    dashboard.run(&mut screen).await?;

    tracing::info!("Dashboard stopped");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(Command::ScaleFont {
        base,
        output,
        scale,
    }) = &cli.command
    {
        if let Err(err) = logging::init(cli.log_file.as_deref()) {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
        let result = parse_scale(*scale)
            .map_err(|e| e.to_string())
            .and_then(|scale| scale_font(base, output, scale).map_err(|e| e.to_string()));
        return match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {}", err);
                ExitCode::FAILURE
            }
        };
    }

    let config = match DashboardConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(2);
        }
    };

    match run_dashboard(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
