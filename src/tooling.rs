//! Tooling
//!
//! Command-line front end for the order engine.

pub mod cli;

pub use cli::{Cli, CliContext, Commands, OutputFormat};
