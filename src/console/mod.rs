//! # Console Adapter
//!
//! Line-oriented terminal I/O: the [`Console`] reads one line at a time and
//! writes through a [`Printer`]. Menus and screens only ever see a
//! `&mut Console`, so tests can script the input and capture the output.

pub mod input;
pub mod menu;
pub mod printer;
pub mod screens;

use std::io::{self, BufRead};

use log::info;

use crate::core::context::AppContext;
use printer::Printer;

pub struct Console {
    input: Box<dyn BufRead>,
    pub printer: Printer,
}

impl Console {
    pub fn new(input: Box<dyn BufRead>, printer: Printer) -> Self {
        Self { input, printer }
    }

    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdin().lock()), Printer::stdout())
    }

    /// Next line without its line ending, or `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    pub fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        self.printer.inline(text)?;
        self.read_line()
    }
}

/// Runs the main menu on stdin/stdout until the user exits.
pub fn run(ctx: &AppContext) -> io::Result<()> {
    let mut console = Console::stdio();
    let outcome = screens::main_menu(ctx, &mut console)?;
    info!("Main menu closed: {:?}", outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_support::scripted_console;

    #[test]
    fn test_read_line_strips_line_endings() {
        let (mut console, _) = scripted_console(&["first\r", "second"]);
        assert_eq!(console.read_line().unwrap().as_deref(), Some("first"));
        assert_eq!(console.read_line().unwrap().as_deref(), Some("second"));
        assert_eq!(console.read_line().unwrap(), None);
    }

    #[test]
    fn test_prompt_writes_before_reading() {
        let (mut console, transcript) = scripted_console(&["42"]);
        let answer = console.prompt("Enter your choice: ").unwrap();
        assert_eq!(answer.as_deref(), Some("42"));
        assert_eq!(transcript.contents(), "Enter your choice: ");
    }
}
