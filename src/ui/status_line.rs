//! Bottom-row status line: clock, host identity, refresh countdown

use chrono::NaiveDateTime;
use ratatui::style::Color;

use crate::data::weather::TIMESTAMP_FORMAT;
use crate::host::HostIdentity;
use crate::surface::DisplaySurface;

const TIME_COLOR: Color = Color::Blue;
const HOSTNAME_COLOR: Color = Color::Cyan;
const IP_COLOR: Color = Color::Green;
const COUNTDOWN_COLOR: Color = Color::Yellow;

/// Values shown on the status line for one tick
#[derive(Debug, Clone)]
pub struct StatusLine<'a> {
    /// Local wall-clock time
    pub time: NaiveDateTime,
    pub host: &'a HostIdentity,
    /// Whole seconds until the next weather refresh
    pub countdown: u64,
}

/// Paints the status line on the last row of a grid `rows` tall.
///
/// Items are written left to right with one blank column between them.
/// Returns the column just past the last item.
pub fn paint<S: DisplaySurface + ?Sized>(surface: &mut S, rows: u16, status: &StatusLine) -> u16 {
    let Some(y) = rows.checked_sub(1) else {
        return 0;
    };

    let items = [
        (status.time.format(TIMESTAMP_FORMAT).to_string(), TIME_COLOR),
        (status.host.hostname.clone(), HOSTNAME_COLOR),
        (status.host.ip_address.clone(), IP_COLOR),
        (format!("{:2}", status.countdown), COUNTDOWN_COLOR),
    ];

    let mut x: u16 = 0;
    for (text, color) in &items {
        let width = surface.write(x, y, text, *color);
        x = x.saturating_add(width).saturating_add(1);
    }
    x
}
