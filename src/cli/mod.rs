//! Command-line interface helpers

pub mod commands;

pub use commands::*;
