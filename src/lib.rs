//! flutter-probe Library
//!
//! Settings, command-line parsing and command dispatch for the `fprobe`
//! binary. The device and driver logic lives in the `fprobe-*` crates.

pub mod cli;
pub mod commands;
pub mod config;
pub mod output;

// Re-export main entry points
pub use cli::Cli;
pub use commands::{execute, run};
pub use output::ProbeOutput;
