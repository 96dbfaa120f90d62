//! Brainstem library exports for the binary and integration tests

pub mod atlas;
pub mod console;
pub mod core;
pub mod services;

#[cfg(test)]
pub mod test_support;
