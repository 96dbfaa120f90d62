//! # Menu Navigator
//!
//! A paginated, numbered list of labelled actions. Each screen of the app is
//! a fresh `Menu` whose `run` blocks on stdin until the user leaves it:
//!
//! ```text
//! What would you like to do with the gene set?
//!
//! [1] View Genes
//! [2] Export Genes
//! [back] Back
//!
//! Enter your choice:
//! ```
//!
//! Actions may build and run child menus, which is how screens nest. Leaving
//! a screen goes through sentinels rather than errors: an action returns
//! [`Flow::Back`] or [`Flow::Exit`], and `run` reports how it ended as a
//! [`MenuOutcome`].

use std::cell::Cell;
use std::error::Error;
use std::io;
use std::ops::Range;
use std::rc::Rc;

use colored::Color;
use log::{debug, error};

use super::Console;

pub const BACK_LABEL: &str = "Back";
pub const EXIT_LABEL: &str = "Exit";
pub const DEFAULT_PROMPT: &str = "Please select an option from the menu below:";
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// What the menu should do once an action returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Return from this menu's `run` to its caller.
    Back,
    /// End this menu's loop.
    Exit,
}

/// How a call to [`Menu::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    Back,
    Exit,
    /// An action ran and the menu was built with `stop_on_selection`.
    Selected,
    /// The stop flag was set.
    Stopped,
    /// Input reached end of file.
    InputClosed,
}

pub type ActionResult = Result<Flow, Box<dyn Error>>;
pub type Action<'a> = Box<dyn FnMut(&mut Console) -> ActionResult + 'a>;

/// Ordered label → action mapping. Labels are unique; inserting an existing
/// label swaps its action and keeps its position.
#[derive(Default)]
pub struct MenuOptions<'a> {
    entries: Vec<(String, Action<'a>)>,
}

impl<'a> MenuOptions<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, label: impl Into<String>, action: Action<'a>) {
        let label = label.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some(entry) => entry.1 = action,
            None => self.entries.push((label, action)),
        }
    }

    /// Adds an action that keeps the menu running when it succeeds.
    pub fn add<F>(mut self, label: impl Into<String>, mut action: F) -> Self
    where
        F: FnMut(&mut Console) -> Result<(), Box<dyn Error>> + 'a,
    {
        self.insert(label, Box::new(move |console| action(console).map(|_| Flow::Continue)));
        self
    }

    /// Adds an action that decides the flow itself.
    pub fn add_flow<F>(mut self, label: impl Into<String>, action: F) -> Self
    where
        F: FnMut(&mut Console) -> ActionResult + 'a,
    {
        self.insert(label, Box::new(action));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }
}

/// Shared stop flag. Clones can be captured by actions.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

pub struct Menu<'a> {
    options: MenuOptions<'a>,
    prompt: String,
    include_exit: bool,
    include_back: bool,
    stop_on_selection: bool,
    /// 0 shows every option on one page.
    page_size: usize,
    current_page: usize,
    stop: StopHandle,
}

impl<'a> Menu<'a> {
    pub fn new(options: MenuOptions<'a>) -> Self {
        Self {
            options,
            prompt: DEFAULT_PROMPT.to_string(),
            include_exit: false,
            include_back: true,
            stop_on_selection: false,
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 0,
            stop: StopHandle::default(),
        }
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn include_exit(mut self, include: bool) -> Self {
        self.include_exit = include;
        self
    }

    pub fn include_back(mut self, include: bool) -> Self {
        self.include_back = include;
        self
    }

    pub fn stop_on_selection(mut self, stop: bool) -> Self {
        self.stop_on_selection = stop;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn options(&self) -> &MenuOptions<'a> {
        &self.options
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// `ceil(options / page_size)`, never less than one.
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 1;
        }
        self.options.len().div_ceil(self.page_size).max(1)
    }

    pub fn next_page(&mut self) {
        self.current_page = (self.current_page + 1) % self.total_pages();
    }

    pub fn previous_page(&mut self) {
        let total = self.total_pages();
        self.current_page = (self.current_page + total - 1) % total;
    }

    /// Indices into the option set shown on the current page.
    pub fn page_range(&self) -> Range<usize> {
        if self.page_size == 0 {
            return 0..self.options.len();
        }
        let start = (self.current_page * self.page_size).min(self.options.len());
        let end = (start + self.page_size).min(self.options.len());
        start..end
    }

    pub fn page_labels(&self) -> Vec<&str> {
        self.options.entries[self.page_range()]
            .iter()
            .map(|(label, _)| label.as_str())
            .collect()
    }

    fn add_synthetic_options(&mut self) {
        if self.include_exit {
            self.options.insert(EXIT_LABEL, Box::new(|_| Ok(Flow::Exit)));
        }
        if self.include_back {
            self.options.insert(BACK_LABEL, Box::new(|_| Ok(Flow::Back)));
        }
        self.current_page %= self.total_pages();
    }

    fn render(&self, console: &mut Console) -> io::Result<()> {
        console.printer.print(&format!("\n{}\n", self.prompt))?;

        for (i, label) in self.page_labels().into_iter().enumerate() {
            match label {
                BACK_LABEL => console
                    .printer
                    .custom(&format!("[back] {label}"), Color::Yellow)?,
                EXIT_LABEL => console
                    .printer
                    .custom(&format!("[exit] {label}"), Color::Red)?,
                _ => console.printer.print(&format!("[{}] {}", i + 1, label))?,
            }
        }

        let total_pages = self.total_pages();
        if total_pages > 1 {
            console.printer.print(&format!(
                "\nPage {} of {}",
                self.current_page + 1,
                total_pages
            ))?;
            console
                .printer
                .print("Enter 'n' for next page, 'p' for previous page, or select an option.")?;
        }

        console.printer.print("")
    }

    /// Runs the menu until the user leaves it, an action ends it, or it is stopped.
    ///
    /// Invalid choices are reported and re-prompted. An action that fails is
    /// reported and logged, and the menu carries on. Only console I/O errors
    /// escape.
    pub fn run(&mut self, console: &mut Console) -> io::Result<MenuOutcome> {
        loop {
            if self.stop.is_stopped() {
                return Ok(MenuOutcome::Stopped);
            }

            self.add_synthetic_options();
            self.render(console)?;

            let Some(raw_choice) = console.prompt("Enter your choice: ")? else {
                debug!("Input closed in menu '{}'", self.prompt);
                return Ok(MenuOutcome::InputClosed);
            };
            let choice = raw_choice.trim().to_lowercase();

            if choice == "exit" && self.include_exit {
                return Ok(MenuOutcome::Exit);
            }
            if choice == "back" && self.include_back {
                return Ok(MenuOutcome::Back);
            }

            if self.total_pages() > 1 {
                match choice.as_str() {
                    "n" => {
                        self.next_page();
                        continue;
                    }
                    "p" => {
                        self.previous_page();
                        continue;
                    }
                    _ => {}
                }
            }

            let page = self.page_range();
            let index = match choice.parse::<usize>() {
                Ok(n) if choice.bytes().all(|b| b.is_ascii_digit()) && (1..=page.len()).contains(&n) => n,
                _ => {
                    console.printer.error("Invalid option")?;
                    continue;
                }
            };

            let (label, action) = &mut self.options.entries[page.start + index - 1];
            debug!("Menu selection: {}", label);
            match action(console) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Back) => return Ok(MenuOutcome::Back),
                Ok(Flow::Exit) => return Ok(MenuOutcome::Exit),
                Err(e) => {
                    error!("Action '{}' failed: {}", label, e);
                    console.printer.error(&format!("{label} failed: {e}"))?;
                }
            }

            if self.stop_on_selection {
                return Ok(MenuOutcome::Selected);
            }
        }
    }
}
