//! Screen layout for the dashboard
//!
//! This module paints the two regions of the screen onto a `DisplaySurface`:
//! the status line on the bottom row and the weather panel from the top-left.

pub mod panel;
pub mod status_line;

pub use panel::paint as paint_weather_panel;
pub use status_line::{paint as paint_status_line, StatusLine};

use ratatui::style::Color;

/// Value colors, cycled row by row through the weather panel
pub const PALETTE: [Color; 7] = [
    Color::Blue,
    Color::Cyan,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::White,
    Color::Yellow,
];

/// Palette color for the `index`th colored item, wrapping after the last
pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_has_seven_distinct_colors() {
        for (i, a) in PALETTE.iter().enumerate() {
            for b in &PALETTE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_palette_color_wraps() {
        assert_eq!(palette_color(0), Color::Blue);
        assert_eq!(palette_color(6), Color::Yellow);
        assert_eq!(palette_color(7), Color::Blue);
        assert_eq!(palette_color(15), Color::Cyan);
    }
}
