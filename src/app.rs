//! Dashboard loop
//!
//! One cooperative loop owns all state. Every tick paints the status line;
//! when the refresh interval has run out it also fetches weather (inline,
//! on the same thread) and repaints the weather panel. Both paints land
//! before the frame is pushed to the screen. A key press ends the loop.

use std::io;
use std::time::{Duration, Instant};

use chrono::Local;

use crate::data::{Coordinate, FetchResult, StalePolicy, WeatherFetcher, WeatherSource};
use crate::host::HostIdentity;
use crate::refresh::{RefreshConfig, RefreshState};
use crate::surface::{DisplaySurface, TeardownGuard};
use crate::ui::{self, StatusLine};

/// What the last tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Painted the status line only
    IdleTick,
    /// Painted the status line and a freshly fetched weather panel
    Refreshing,
    /// A key was pressed; the loop should stop
    Exit,
}

/// Main dashboard struct owning the refresh state and weather source
pub struct Dashboard<F: WeatherFetcher> {
    source: WeatherSource<F>,
    refresh: RefreshState,
    host: HostIdentity,
    policy: StalePolicy,
    tick_interval: Duration,
    phase: Phase,
    refreshes: u64,
}

impl<F: WeatherFetcher> Dashboard<F> {
    /// Creates a dashboard; the first tick will fetch weather
    pub fn new(
        fetcher: F,
        coordinate: Coordinate,
        config: RefreshConfig,
        host: HostIdentity,
    ) -> Self {
        Self {
            source: WeatherSource::new(fetcher, coordinate),
            refresh: RefreshState::new(config.weather_interval),
            host,
            policy: StalePolicy::default(),
            tick_interval: config.tick_interval,
            phase: Phase::IdleTick,
            refreshes: 0,
        }
    }

    pub fn with_policy(mut self, policy: StalePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn refresh_state(&self) -> &RefreshState {
        &self.refresh
    }

    pub fn source(&self) -> &WeatherSource<F> {
        &self.source
    }

    /// Number of fetch attempts made so far
    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    /// Runs one tick at `now`: status line, refresh when due, frame, key check.
    pub async fn tick<S: DisplaySurface + ?Sized>(
        &mut self,
        surface: &mut S,
        now: Instant,
    ) -> io::Result<Phase> {
        let (rows, _cols) = surface.size()?;

        let status = StatusLine {
            time: Local::now().naive_local(),
            host: &self.host,
            countdown: self.refresh.seconds_until_next(now),
        };
        ui::paint_status_line(surface, rows, &status);

        self.phase = if self.refresh.is_due(now) {
            self.refreshes += 1;
            match self.source.fetch(&mut self.refresh, now).await {
                FetchResult::Success(snapshot) => {
                    tracing::info!(location = %snapshot.location_name, "Weather refreshed");
                }
                FetchResult::Failure(err) => {
                    tracing::warn!(
                        "Weather fetch failed: {} (retry in {}s)",
                        err,
                        self.refresh.interval().as_secs()
                    );
                }
            }
            ui::paint_weather_panel(surface, rows, self.source.displayed(self.policy));
            Phase::Refreshing
        } else {
            Phase::IdleTick
        };

        surface.refresh()?;

        if let Some(key) = surface.read_key()? {
            tracing::debug!(?key, "Key pressed, exiting");
            self.phase = Phase::Exit;
        }
        Ok(self.phase)
    }

    /// Ticks until a key is pressed, sleeping between ticks.
    ///
    /// The surface is torn down exactly once on the way out, whether the loop
    /// ended by key press, I/O error, or panic.
    pub async fn run<S: DisplaySurface>(&mut self, surface: &mut S) -> io::Result<()> {
        let mut guard = TeardownGuard::new(surface);
        loop {
            let phase = self.tick(&mut *guard, Instant::now()).await?;
            tracing::trace!(?phase, "Tick");
            if phase == Phase::Exit {
                break;
            }
            tokio::time::sleep(self.tick_interval).await;
        }
        guard.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{decode_response, WeatherError, WeatherSnapshot};
    use crate::surface::Screen;
    use chrono::NaiveDateTime;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::style::Color;
    use std::cell::Cell;

    const WORKED_EXAMPLE: &str = r#"{
        "main": {"temp": 300.0, "feels_like": 300.0, "temp_min": 300.0,
                 "temp_max": 300.0, "pressure": 1000, "humidity": 50},
        "wind": {"speed": 5, "deg": 90},
        "clouds": {"all": 20},
        "timezone": 0,
        "sys": {"sunrise": 1700000000, "sunset": 1700040000},
        "name": "Greenwich",
        "dt": 1700000000
    }"#;

    /// Decodes a canned body, or fails, and counts calls
    struct StubFetcher {
        body: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl StubFetcher {
        fn ok() -> Self {
            Self {
                body: Some(WORKED_EXAMPLE),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                body: None,
                calls: Cell::new(0),
            }
        }
    }

    impl WeatherFetcher for StubFetcher {
        async fn fetch_weather(
            &self,
            _coordinate: Coordinate,
            attempted_at: NaiveDateTime,
        ) -> Result<WeatherSnapshot, WeatherError> {
            self.calls.set(self.calls.get() + 1);
            match self.body {
                Some(body) => decode_response(body, attempted_at),
                None => Err(WeatherError::HttpStatus(503)),
            }
        }
    }

    /// Surface wrapper that scripts key presses and counts teardowns
    struct ScriptedSurface {
        screen: Screen<TestBackend, fn() -> io::Result<Option<KeyEvent>>>,
        key_on_read: Option<usize>,
        reads: usize,
        refreshes: usize,
        teardowns: usize,
        fail_refresh: bool,
    }

    fn no_keys() -> io::Result<Option<KeyEvent>> {
        Ok(None)
    }

    impl ScriptedSurface {
        fn new(width: u16, height: u16, key_on_read: Option<usize>) -> Self {
            Self {
                screen: Screen::new(TestBackend::new(width, height), no_keys as fn() -> _).unwrap(),
                key_on_read,
                reads: 0,
                refreshes: 0,
                teardowns: 0,
                fail_refresh: false,
            }
        }

        fn row(&self, y: u16) -> String {
            let buffer = self.screen.backend().buffer();
            (0..buffer.area.width)
                .map(|x| buffer.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
                .collect()
        }
    }

    impl DisplaySurface for ScriptedSurface {
        fn size(&mut self) -> io::Result<(u16, u16)> {
            self.screen.size()
        }

        fn write(&mut self, x: u16, y: u16, text: &str, color: Color) -> u16 {
            self.screen.write(x, y, text, color)
        }

        fn read_key(&mut self) -> io::Result<Option<KeyEvent>> {
            let read = self.reads;
            self.reads += 1;
            if self.key_on_read == Some(read) {
                Ok(Some(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)))
            } else {
                Ok(None)
            }
        }

        fn clear(&mut self) -> io::Result<()> {
            self.screen.clear()
        }

        fn refresh(&mut self) -> io::Result<()> {
            self.refreshes += 1;
            if self.fail_refresh {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"));
            }
            self.screen.refresh()
        }

        fn teardown(&mut self) -> io::Result<()> {
            self.teardowns += 1;
            self.screen.teardown()
        }
    }

    fn fast_config() -> RefreshConfig {
        RefreshConfig {
            weather_interval: Duration::from_secs(60),
            tick_interval: Duration::ZERO,
        }
    }

    fn dashboard(fetcher: StubFetcher) -> Dashboard<StubFetcher> {
        Dashboard::new(
            fetcher,
            Coordinate::DEFAULT,
            fast_config(),
            HostIdentity::new("testhost", "192.0.2.1"),
        )
    }

    #[tokio::test]
    async fn test_first_tick_refreshes() {
        let mut dash = dashboard(StubFetcher::ok());
        let mut surface = ScriptedSurface::new(80, 24, None);

        let phase = dash.tick(&mut surface, Instant::now()).await.unwrap();

        assert_eq!(phase, Phase::Refreshing);
        assert_eq!(dash.refresh_count(), 1);
        assert_eq!(surface.refreshes, 1);
    }

    #[tokio::test]
    async fn test_end_to_end_panel_values() {
        let mut dash = dashboard(StubFetcher::ok());
        let mut surface = ScriptedSurface::new(80, 24, None);

        dash.tick(&mut surface, Instant::now()).await.unwrap();

        assert!(surface.row(0).starts_with("temp_f               80 "));
        assert!(surface.row(4).starts_with("pressure_hg          29.53"));
        assert!(surface.row(6).starts_with("wind_speed_mph       11 "));
        assert!(surface.row(10).starts_with("sunrise_utc          2023-11-14 22:13:20"));
        assert!(surface.row(11).starts_with("sunset_utc           2023-11-15 09:20:00"));
        assert!(surface.row(23).contains("testhost 192.0.2.1"));
    }

    #[tokio::test]
    async fn test_ticks_within_interval_are_idle() {
        let fetcher = StubFetcher::ok();
        let mut dash = dashboard(fetcher);
        let mut surface = ScriptedSurface::new(80, 24, None);
        let start = Instant::now();

        dash.tick(&mut surface, start).await.unwrap();
        for half_seconds in 1..120u64 {
            let now = start + Duration::from_millis(500 * half_seconds);
            let phase = dash.tick(&mut surface, now).await.unwrap();
            assert_eq!(phase, Phase::IdleTick, "tick at {}ms", 500 * half_seconds);
        }
        assert_eq!(dash.refresh_count(), 1);

        let phase = dash
            .tick(&mut surface, start + Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(phase, Phase::Refreshing);
        assert_eq!(dash.refresh_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_network_retries_once_per_interval() {
        let mut dash = dashboard(StubFetcher::failing());
        let mut surface = ScriptedSurface::new(80, 24, None);
        let start = Instant::now();

        for second in 0..180u64 {
            dash.tick(&mut surface, start + Duration::from_secs(second))
                .await
                .unwrap();
        }

        assert_eq!(dash.source.fetcher_calls(), 3);
        assert!(dash.source().displayed(StalePolicy::Blank).is_blank());
    }

    #[tokio::test]
    async fn test_failure_shows_blank_values() {
        let mut dash = dashboard(StubFetcher::failing());
        let mut surface = ScriptedSurface::new(80, 24, None);

        let phase = dash.tick(&mut surface, Instant::now()).await.unwrap();

        assert_eq!(phase, Phase::Refreshing);
        assert_eq!(surface.row(0).trim_end(), "temp_f");
        assert_eq!(surface.row(12).trim_end(), "location_name");
    }

    #[tokio::test]
    async fn test_countdown_on_status_line() {
        let mut dash = dashboard(StubFetcher::ok());
        let mut surface = ScriptedSurface::new(80, 24, None);
        let start = Instant::now();

        dash.tick(&mut surface, start).await.unwrap();
        assert!(surface.row(23).trim_end().ends_with("192.0.2.1  0"));

        dash.tick(&mut surface, start + Duration::from_secs(15))
            .await
            .unwrap();
        assert!(surface.row(23).trim_end().ends_with("192.0.2.1 45"));
    }

    #[tokio::test]
    async fn test_small_terminal_skips_panel_rows() {
        let mut dash = dashboard(StubFetcher::ok());
        let mut surface = ScriptedSurface::new(80, 4, None);

        dash.tick(&mut surface, Instant::now()).await.unwrap();

        assert!(surface.row(2).starts_with("temp_min_f"));
        // The status line shares the last row with the fourth panel row
        assert!(surface.row(3).starts_with("temp_max_f"));
    }

    #[tokio::test]
    async fn test_key_press_exits_and_tears_down_once() {
        let mut dash = dashboard(StubFetcher::ok());
        let mut surface = ScriptedSurface::new(80, 24, Some(3));

        dash.run(&mut surface).await.unwrap();

        assert_eq!(dash.phase(), Phase::Exit);
        assert_eq!(surface.reads, 4);
        assert_eq!(surface.refreshes, 4);
        assert_eq!(surface.teardowns, 1);
        assert!(surface.screen.is_torn_down());
    }

    #[tokio::test]
    async fn test_key_on_first_tick_still_paints_frame() {
        let mut dash = dashboard(StubFetcher::ok());
        let mut surface = ScriptedSurface::new(80, 24, Some(0));

        dash.run(&mut surface).await.unwrap();

        assert_eq!(surface.refreshes, 1);
        assert_eq!(dash.refresh_count(), 1);
        assert_eq!(surface.teardowns, 1);
    }

    #[tokio::test]
    async fn test_io_error_still_tears_down() {
        let mut dash = dashboard(StubFetcher::ok());
        let mut surface = ScriptedSurface::new(80, 24, None);
        surface.fail_refresh = true;

        let result = dash.run(&mut surface).await;

        assert!(result.is_err());
        assert_eq!(surface.teardowns, 1);
    }

    #[tokio::test]
    async fn test_keep_last_good_policy_survives_failure() {
        let mut dash = dashboard(StubFetcher::ok()).with_policy(StalePolicy::KeepLastGood);
        let mut surface = ScriptedSurface::new(80, 24, None);
        let start = Instant::now();

        dash.tick(&mut surface, start).await.unwrap();
        dash.source.fetcher_mut().body = None;
        dash.tick(&mut surface, start + Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(dash.refresh_count(), 2);
        assert!(surface.row(0).starts_with("temp_f               80 "));
    }

    impl WeatherSource<StubFetcher> {
        fn fetcher_calls(&self) -> usize {
            self.fetcher().calls.get()
        }
    }
}
