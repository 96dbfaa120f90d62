//! Colored status lines.
//!
//! Formatting is a pure function of tone and text ([`format_line`]); the
//! [`Printer`] only owns the sink those lines go to.

use std::io::{self, Write};

use colored::{Color, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Plain,
    Info,
    Success,
    Warning,
    Error,
    Custom(Color),
}

pub fn format_line(tone: Tone, text: &str) -> String {
    match tone {
        Tone::Plain => text.to_string(),
        Tone::Info => text.cyan().to_string(),
        Tone::Success => text.green().to_string(),
        Tone::Warning => text.yellow().to_string(),
        Tone::Error => text.red().bold().to_string(),
        Tone::Custom(color) => text.color(color).to_string(),
    }
}

pub struct Printer {
    out: Box<dyn Write>,
}

impl Printer {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn line(&mut self, tone: Tone, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format_line(tone, text))?;
        self.out.flush()
    }

    /// Writes `text` without a newline, for prompts.
    pub fn inline(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{text}")?;
        self.out.flush()
    }

    pub fn print(&mut self, text: &str) -> io::Result<()> {
        self.line(Tone::Plain, text)
    }

    pub fn info(&mut self, text: &str) -> io::Result<()> {
        self.line(Tone::Info, text)
    }

    pub fn success(&mut self, text: &str) -> io::Result<()> {
        self.line(Tone::Success, text)
    }

    pub fn warning(&mut self, text: &str) -> io::Result<()> {
        self.line(Tone::Warning, text)
    }

    pub fn error(&mut self, text: &str) -> io::Result<()> {
        self.line(Tone::Error, text)
    }

    pub fn custom(&mut self, text: &str, color: Color) -> io::Result<()> {
        self.line(Tone::Custom(color), text)
    }
}
