//! Output destination shared by the waiters and the progress line.

use std::io::{self, IsTerminal, Write};

/// A single writer plus the facts that decide how to draw on it.
///
/// `interactive` gates redrawable progress output; `color` gates ANSI styling.
pub struct Console<W: Write = io::Stderr> {
    out: W,
    interactive: bool,
    color: bool,
}

impl Console<io::Stderr> {
    pub fn stderr(color: &str) -> Self {
        let interactive = io::stderr().is_terminal();
        Self::new(io::stderr(), interactive, resolve_color(color, interactive))
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, interactive: bool, color: bool) -> Self {
        Self {
            out,
            interactive,
            color,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn println(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    /// Write without a trailing newline (progress redraws).
    pub fn write_raw(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Resolve a `--color` flag against whether output is a terminal.
pub fn resolve_color(color: &str, interactive: bool) -> bool {
    match color {
        "always" => true,
        "never" => false,
        _ => interactive,
    }
}
