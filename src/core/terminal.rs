//! Terminal size resolution and the final write to stdout.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::tty::IsTty;
use crossterm::QueueableCommand;
use serde::Serialize;
use tracing::{debug, warn};

use super::config::GridSize;
use crate::error::RenderError;

/// Rows left free under the image for the shell prompt.
pub const PROMPT_ROWS: u16 = 1;

/// Smallest explicit row or column override.
pub const MIN_GRID_DIM: u16 = 2;

/// VT100 size, used when stdout is not a terminal.
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

pub fn is_terminal() -> bool {
    io::stdout().is_tty()
}

/// `(columns, rows)` of the attached terminal.
pub fn detected_size() -> Result<(u16, u16), RenderError> {
    if !is_terminal() {
        warn!(
            cols = FALLBACK_SIZE.0,
            rows = FALLBACK_SIZE.1,
            "stdout is not a terminal, assuming default size"
        );
        return Ok(FALLBACK_SIZE);
    }
    let (cols, rows) = terminal::size().map_err(RenderError::Terminal)?;
    if cols == 0 || rows == 0 {
        warn!(cols, rows, "terminal reported an empty size, assuming default size");
        return Ok(FALLBACK_SIZE);
    }
    Ok((cols, rows))
}

/// Cell grid from the detected size and optional overrides.
///
/// Overrides are taken as given. Only the detected height loses
/// [`PROMPT_ROWS`], and never below one row.
pub fn resolve_grid(
    detected: (u16, u16),
    cols: Option<u16>,
    rows: Option<u16>,
) -> Result<GridSize, RenderError> {
    let cols = match cols {
        Some(value) => check_override("columns", value)?,
        None => detected.0,
    };
    let rows = match rows {
        Some(value) => check_override("rows", value)?,
        None => render_rows(detected.1),
    };
    debug!(cols, rows, ?detected, "resolved cell grid");
    Ok(GridSize {
        cols: u32::from(cols),
        rows: u32::from(rows),
    })
}

/// Detected height minus the prompt, keeping at least one row.
fn render_rows(detected: u16) -> u16 {
    detected.saturating_sub(PROMPT_ROWS).max(1)
}

fn check_override(name: &str, value: u16) -> Result<u16, RenderError> {
    if value < MIN_GRID_DIM {
        return Err(RenderError::InvalidConfig(format!(
            "{name} must be at least {MIN_GRID_DIM} (got {value})"
        )));
    }
    Ok(value)
}

/// What `terminal-size` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TerminalReport {
    pub columns: u16,
    pub rows: u16,
    pub render_rows: u16,
}

impl TerminalReport {
    pub fn new((columns, rows): (u16, u16)) -> Self {
        Self {
            columns,
            rows,
            render_rows: render_rows(rows),
        }
    }
}

/// Write `stream` to `out` in one call.
///
/// With `clear` the screen is wiped and the cursor homed first; with
/// `trailing_newline` the prompt starts on a fresh line afterwards.
pub fn write_stream<W: Write>(
    out: &mut W,
    stream: &[u8],
    clear: bool,
    trailing_newline: bool,
) -> Result<(), RenderError> {
    let mut buffer = Vec::with_capacity(stream.len() + 16);
    if clear {
        buffer
            .queue(Clear(ClearType::All))
            .and_then(|b| b.queue(MoveTo(0, 0)))
            .map_err(RenderError::Output)?;
    }
    buffer.extend_from_slice(stream);
    if trailing_newline {
        buffer.push(b'\n');
    }

    out.write_all(&buffer).map_err(RenderError::Output)?;
    out.flush().map_err(RenderError::Output)
}
