//! Redrawable single-line progress indicator.
//!
//! The waiter calls [`ProgressLine::advance`] once per tick with the current
//! field values; nothing is captured by reference. When the console is not a
//! terminal every drawing call is a no-op, so pipes and log files never see
//! carriage returns or erase sequences.

use std::io::{self, Write};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use actwatch_core::format::format_elapsed;

use crate::console::Console;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const ERASE_LINE: &str = "\r\x1b[2K";

pub struct ProgressLine {
    start: Instant,
    /// Time already elapsed on the platform when the line was created.
    offset: Duration,
    frame: usize,
    last_line: String,
    visible: bool,
}

impl ProgressLine {
    /// Count elapsed time from now.
    pub fn new() -> Self {
        Self::with_offset(Duration::ZERO)
    }

    /// Count elapsed time from a platform timestamp. A start in the future
    /// counts as now.
    pub fn since(started: DateTime<Utc>) -> Self {
        let offset = (Utc::now() - started).to_std().unwrap_or(Duration::ZERO);
        Self::with_offset(offset)
    }

    fn with_offset(offset: Duration) -> Self {
        Self {
            start: Instant::now(),
            offset,
            frame: 0,
            last_line: String::new(),
            visible: false,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        (self.offset + self.start.elapsed()).as_secs()
    }

    /// Pure rendering of one progress line.
    pub fn render(&self, elapsed_secs: u64, fields: &[(&str, &str)]) -> String {
        let mut line = format!("{} [{}]", SPINNER[self.frame], format_elapsed(elapsed_secs));
        for (name, value) in fields {
            line.push_str(&format!(" {name}: {value}"));
        }
        line
    }

    /// Step the spinner and redraw with fresh field values.
    pub fn advance<W: Write>(
        &mut self,
        console: &mut Console<W>,
        fields: &[(&str, &str)],
    ) -> io::Result<()> {
        if !console.is_interactive() {
            return Ok(());
        }
        self.frame = (self.frame + 1) % SPINNER.len();
        self.last_line = self.render(self.elapsed_secs(), fields);
        console.write_raw(&format!("{ERASE_LINE}{}", self.last_line))?;
        self.visible = true;
        Ok(())
    }

    /// Erase the line so regular output can be printed in its place.
    pub fn clear<W: Write>(&mut self, console: &mut Console<W>) -> io::Result<()> {
        if !self.visible {
            return Ok(());
        }
        console.write_raw(ERASE_LINE)?;
        self.visible = false;
        Ok(())
    }

    /// Draw the last rendered line again after a [`clear`](Self::clear).
    pub fn redraw<W: Write>(&mut self, console: &mut Console<W>) -> io::Result<()> {
        if !console.is_interactive() || self.last_line.is_empty() {
            return Ok(());
        }
        console.write_raw(&format!("{ERASE_LINE}{}", self.last_line))?;
        self.visible = true;
        Ok(())
    }

    pub fn finish<W: Write>(&mut self, console: &mut Console<W>) -> io::Result<()> {
        self.clear(console)?;
        self.last_line.clear();
        Ok(())
    }
}

impl Default for ProgressLine {
    fn default() -> Self {
        Self::new()
    }
}
