//! # Services
//!
//! Long-lived helpers the screens call into. Each one is started before the
//! main menu opens and cleaned up after it closes.

pub mod export;
pub mod retrieval;

use std::io;

use log::debug;

pub use export::FileSaveService;
pub use retrieval::{DataRetrievalService, DatasetFilter};

pub trait Service {
    fn name(&self) -> &str;

    /// One-line description shown in logs.
    fn docs(&self) -> &str;

    fn startup(&mut self) -> io::Result<()> {
        debug!("{} started", self.name());
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        debug!("{} cleaned up", self.name());
        Ok(())
    }
}
