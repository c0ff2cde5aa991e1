//! Character-grid display surface
//!
//! The dashboard only ever talks to a `DisplaySurface`: write colored text at
//! a cell, ask for the grid size, poll for a key, clear, push the frame to the
//! screen, and tear down. `Screen` implements it on top of a ratatui
//! `Terminal`, keeping its own cell buffer so text persists between frames the
//! way a curses window does.

use std::io::{self, Stdout};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    Terminal,
};

/// Grid operations the dashboard needs from a terminal
pub trait DisplaySurface {
    /// Current grid size as `(rows, cols)`
    fn size(&mut self) -> io::Result<(u16, u16)>;

    /// Writes `text` starting at column `x`, row `y`, and returns its width.
    ///
    /// Text running past the right edge is cut off; a row outside the grid is
    /// not drawn at all.
    fn write(&mut self, x: u16, y: u16, text: &str, color: Color) -> u16;

    /// Returns a pending key press without waiting
    fn read_key(&mut self) -> io::Result<Option<KeyEvent>>;

    /// Blanks the whole grid
    fn clear(&mut self) -> io::Result<()>;

    /// Pushes everything written since the last refresh to the screen
    fn refresh(&mut self) -> io::Result<()>;

    /// Clears the grid and gives the terminal back in its original state
    fn teardown(&mut self) -> io::Result<()>;
}

/// Non-blocking source of key presses
pub trait KeySource {
    fn poll_key(&mut self) -> io::Result<Option<KeyEvent>>;
}

impl<F> KeySource for F
where
    F: FnMut() -> io::Result<Option<KeyEvent>>,
{
    fn poll_key(&mut self) -> io::Result<Option<KeyEvent>> {
        self()
    }
}

/// Key presses from the crossterm event queue
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn poll_key(&mut self) -> io::Result<Option<KeyEvent>> {
        while event::poll(Duration::ZERO)? {
            // Resize and mouse events are drained and ignored
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(key));
                }
            }
        }
        Ok(None)
    }
}

/// Set once something outside `Screen` has already restored the terminal
static TERMINAL_RELEASED: AtomicBool = AtomicBool::new(false);

/// Records that the terminal modes were restored elsewhere, as a panic hook
/// does before printing.
///
/// A `Screen` that owns the terminal then skips its own clear and mode reset,
/// which would otherwise wipe the main screen the hook just wrote to.
pub fn mark_terminal_released() {
    TERMINAL_RELEASED.store(true, Ordering::SeqCst);
}

/// A `DisplaySurface` backed by a ratatui terminal
pub struct Screen<B: Backend, K> {
    terminal: Terminal<B>,
    keys: K,
    buffer: Buffer,
    /// Whether raw mode and the alternate screen were entered by this screen
    owns_terminal_mode: bool,
    torn_down: bool,
}

impl Screen<CrosstermBackend<Stdout>, CrosstermKeys> {
    /// Takes over stdout: raw mode, alternate screen, hidden cursor.
    ///
    /// The terminal is restored by `teardown`, or on drop.
    pub fn stdout() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err);
        }

        let mut screen = match Self::new(CrosstermBackend::new(stdout), CrosstermKeys) {
            Ok(screen) => screen,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                return Err(err);
            }
        };
        // From here on, Drop restores the terminal
        screen.owns_terminal_mode = true;
        screen.terminal.hide_cursor()?;
        screen.terminal.clear()?;
        Ok(screen)
    }
}

impl<B: Backend, K> Screen<B, K> {
    /// True when this screen took over the terminal and it was since released
    fn terminal_released(&self) -> bool {
        self.owns_terminal_mode && TERMINAL_RELEASED.load(Ordering::SeqCst)
    }
}

impl<B: Backend, K: KeySource> Screen<B, K> {
    /// Wraps an existing backend without changing terminal modes
    pub fn new(backend: B, keys: K) -> io::Result<Self> {
        let mut terminal = Terminal::new(backend)?;
        let area = terminal.get_frame().area();
        Ok(Self {
            terminal,
            keys,
            buffer: Buffer::empty(area),
            owns_terminal_mode: false,
            torn_down: false,
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.terminal.backend_mut()
    }

    /// Cells written so far, including ones not yet refreshed to screen
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Keeps the cell buffer the same size as the terminal.
    ///
    /// Cells inside both the old and new areas keep their `(x, y)`.
    fn sync_area(&mut self) -> io::Result<Rect> {
        self.terminal.autoresize()?;
        let area = self.terminal.get_frame().area();
        if self.buffer.area != area {
            let mut resized = Buffer::empty(area);
            let kept = self.buffer.area.intersection(area);
            for y in kept.top()..kept.bottom() {
                for x in kept.left()..kept.right() {
                    if let (Some(src), Some(dst)) =
                        (self.buffer.cell((x, y)), resized.cell_mut((x, y)))
                    {
                        *dst = src.clone();
                    }
                }
            }
            self.buffer = resized;
        }
        Ok(area)
    }
}

impl<B: Backend, K: KeySource> DisplaySurface for Screen<B, K> {
    fn size(&mut self) -> io::Result<(u16, u16)> {
        let area = self.sync_area()?;
        Ok((area.height, area.width))
    }

    fn write(&mut self, x: u16, y: u16, text: &str, color: Color) -> u16 {
        let width = text.chars().count() as u16;
        let area = self.buffer.area;
        if y >= area.bottom() || x >= area.right() {
            return width;
        }
        let max_width = (area.right() - x) as usize;
        self.buffer
            .set_stringn(x, y, text, max_width, Style::default().fg(color));
        width
    }

    fn read_key(&mut self) -> io::Result<Option<KeyEvent>> {
        self.keys.poll_key()
    }

    fn clear(&mut self) -> io::Result<()> {
        self.buffer.reset();
        self.terminal.clear()
    }

    fn refresh(&mut self) -> io::Result<()> {
        let buffer = &self.buffer;
        self.terminal.draw(|frame| {
            let area = frame.area();
            let out = frame.buffer_mut();
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    if let (Some(src), Some(dst)) = (buffer.cell((x, y)), out.cell_mut((x, y))) {
                        *dst = src.clone();
                    }
                }
            }
        })?;
        Ok(())
    }

    fn teardown(&mut self) -> io::Result<()> {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;

        self.buffer.reset();
        if self.terminal_released() {
            return Ok(());
        }
        let mut result = self.terminal.clear().and(self.terminal.show_cursor());
        if self.owns_terminal_mode {
            result = result
                .and(disable_raw_mode())
                .and(execute!(io::stdout(), LeaveAlternateScreen));
        }
        result
    }
}

impl<B: Backend, K> Drop for Screen<B, K> {
    fn drop(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if self.terminal_released() {
            return;
        }
        let _ = self.terminal.clear();
        let _ = self.terminal.show_cursor();
        if self.owns_terminal_mode {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

/// Tears a surface down when dropped, unless `finish` already did.
///
/// Holding one across the dashboard loop guarantees teardown on every exit
/// path, including `?` returns and panics.
pub struct TeardownGuard<'a, S: DisplaySurface> {
    surface: &'a mut S,
    finished: bool,
}

impl<'a, S: DisplaySurface> TeardownGuard<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        Self {
            surface,
            finished: false,
        }
    }

    /// Tears down now and reports any error
    pub fn finish(mut self) -> io::Result<()> {
        self.finished = true;
        self.surface.teardown()
    }
}

impl<S: DisplaySurface> Deref for TeardownGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: DisplaySurface> DerefMut for TeardownGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DisplaySurface> Drop for TeardownGuard<'_, S> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.surface.teardown();
        }
    }
}
