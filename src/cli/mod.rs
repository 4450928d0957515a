//! CLI module - command-line interface for the application.

pub mod args;

pub use args::{Cli, Commands};
