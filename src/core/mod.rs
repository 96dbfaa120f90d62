//! # Core Application Plumbing
//!
//! Settings, the activity log, and the context object the screens share.
//! Nothing here talks to the terminal directly.
//!
//! ## Modules
//!
//! - [`config`]: `~/.brainstem/config.toml` plus env/CLI overrides
//! - [`context`]: `AppContext`, built once in `main`
//! - [`format`]: number and duration formatting
//! - [`logger`]: the level-filtered activity log and its `log` bridge

pub mod config;
pub mod context;
pub mod format;
pub mod logger;
