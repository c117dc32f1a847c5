use std::io;
use std::io::Write;
use std::ops::ControlFlow;
use std::time::Duration;

use crossterm::cursor;
use crossterm::event;
use crossterm::event::Event as CtEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use crossterm::execute;
use crossterm::queue;
use crossterm::style;
use crossterm::style::StyledContent;
use crossterm::style::Stylize;
use crossterm::terminal;

use crate::Age;
use crate::driver::Renderer;
use crate::driver::Status;
use crate::grid::Snapshot;

/// The border is redrawn on generations `1`, `101`, `201`, ...
const BORDER_REDRAW_PERIOD: u64 = 100;

/// How cell ages are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Glyphs {
    /// Young cells get their own glyph
    pub age_shape: bool,

    /// Cells are colored by age
    pub age_color: bool,
}

/// Glyph for a cell of the given age. Dead cells are blank.
pub fn cell_glyph(age: Age, glyphs: Glyphs) -> StyledContent<&'static str> {
    if age == 0 {
        return style::style(" ");
    }

    let shape = match age {
        1 if glyphs.age_shape => ".",
        2 if glyphs.age_shape => "∘",
        3 if glyphs.age_shape => "∙",
        _ => "*",
    };

    if !glyphs.age_color {
        return style::style(shape);
    }

    match age {
        1 => shape.green().bold(),
        2 => shape.cyan().bold(),
        3 => shape.red().bold(),
        4 => shape.magenta().bold(),
        _ => shape.dark_yellow(),
    }
}

/// Status line printed above the board.
pub fn header(snapshot: &Snapshot<'_>, status: &Status) -> String {
    format!(
        "Conway's Life | board {}x{}; rate {}/sec; alive = {:3}; gen = {}",
        snapshot.rows(),
        snapshot.cols(),
        status.rate,
        snapshot.alive_count(),
        snapshot.generation(),
    )
}

/// Draws generations in place using cursor addressing. Only cells that changed since the last
/// frame are rewritten.
pub struct TerminalRenderer<W: Write> {
    out: W,
    glyphs: Glyphs,

    /// Ages as they are currently on screen. Empty before the first frame.
    drawn: Vec<Age>,

    /// Poll the keyboard for `q` / Ctrl-C between frames
    interactive: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, glyphs: Glyphs) -> Self {
        Self {
            out,
            glyphs,
            drawn: Vec::new(),
            interactive: false,
        }
    }

    /// Listen for quit keys. Only makes sense when `out` is a terminal in raw mode.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw_border(&mut self, rows: usize, cols: usize) -> io::Result<()> {
        let line = format!("+{}+", "-".repeat(cols));

        queue!(self.out, cursor::MoveTo(0, 1), style::Print(&line))?;

        for r in 0..rows {
            let y = to_u16(r + 2);

            queue!(
                self.out,
                cursor::MoveTo(0, y),
                style::Print('|'),
                cursor::MoveTo(to_u16(cols + 1), y),
                style::Print('|'),
            )?;
        }

        queue!(self.out, cursor::MoveTo(0, to_u16(rows + 2)), style::Print(&line))
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, snapshot: Snapshot<'_>, status: &Status) -> io::Result<ControlFlow<()>> {
        let (rows, cols) = (snapshot.rows(), snapshot.cols());

        let first = self.drawn.is_empty();
        if first {
            self.drawn = vec![0; rows * cols];
            queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
        }

        queue!(
            self.out,
            cursor::MoveTo(0, 0),
            style::Print(header(&snapshot, status)),
            terminal::Clear(terminal::ClearType::UntilNewLine),
        )?;

        if first || snapshot.generation() % BORDER_REDRAW_PERIOD == 1 {
            self.draw_border(rows, cols)?;
        }

        for (i, (&age, drawn)) in snapshot.cells().iter().zip(self.drawn.iter_mut()).enumerate() {
            if age == *drawn {
                continue;
            }

            let (r, c) = (i / cols, i % cols);

            queue!(
                self.out,
                cursor::MoveTo(to_u16(c + 1), to_u16(r + 2)),
                style::PrintStyledContent(cell_glyph(age, self.glyphs)),
            )?;

            *drawn = age;
        }

        queue!(self.out, cursor::MoveTo(0, to_u16(rows + 3)))?;
        self.out.flush()?;

        if self.interactive && exit_requested()? {
            return Ok(ControlFlow::Break(()));
        }

        Ok(ControlFlow::Continue(()))
    }
}

/// Drain pending terminal events without blocking. True if the user asked to quit.
fn exit_requested() -> io::Result<bool> {
    while event::poll(Duration::ZERO)? {
        match event::read()? {
            CtEvent::Key(
                KeyEvent {
                    code: KeyCode::Char('q'),
                    ..
                }
                | KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                },
            ) => return Ok(true),
            _ => {}
        }
    }

    Ok(false)
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Raw mode for the lifetime of the value, so key presses reach us unbuffered. The cursor is
/// hidden meanwhile.
pub struct RawMode;

impl RawMode {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), cursor::Hide)?;

        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}
