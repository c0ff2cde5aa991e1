//! Weather panel: one row per snapshot field from the top-left corner

use ratatui::style::Color;

use super::palette_color;
use crate::data::WeatherSnapshot;
use crate::surface::DisplaySurface;

/// Color of the field name column
const NAME_COLOR: Color = Color::White;

/// Width both columns are padded to
const COLUMN_WIDTH: usize = 20;

/// Paints `snapshot` as a two-column table, skipping rows past `rows`.
///
/// Values are padded so a shorter value fully covers a longer one left by the
/// previous refresh. Returns the number of rows painted.
pub fn paint<S: DisplaySurface + ?Sized>(
    surface: &mut S,
    rows: u16,
    snapshot: &WeatherSnapshot,
) -> u16 {
    let mut painted = 0;
    for (row, (name, value)) in snapshot.fields().iter().enumerate() {
        let y = row as u16;
        if y >= rows {
            break;
        }
        let label = format!("{:width$}", name, width = COLUMN_WIDTH);
        let width = surface.write(0, y, &label, NAME_COLOR);
        surface.write(
            width + 1,
            y,
            &format!("{:width$}", value, width = COLUMN_WIDTH),
            palette_color(row),
        );
        painted += 1;
    }
    painted
}
