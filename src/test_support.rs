//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::io::{self, Cursor, Write};
use std::rc::Rc;

use crate::console::Console;
use crate::console::printer::Printer;

/// A cloneable in-memory sink; every clone sees the same bytes.
#[derive(Clone, Default)]
pub struct Transcript(Rc<RefCell<Vec<u8>>>);

impl Transcript {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Transcript {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A console that reads the given lines as user input and records all output.
pub fn scripted_console(lines: &[&str]) -> (Console, Transcript) {
    let mut input = lines.join("\n");
    input.push('\n');
    let transcript = Transcript::default();
    let console = Console::new(
        Box::new(Cursor::new(input.into_bytes())),
        Printer::new(Box::new(transcript.clone())),
    );
    (console, transcript)
}
