//! Command-line interface for tally
//!
//! This module contains CLI argument parsing and configuration

pub mod args;
pub mod config;

pub use args::Args;
pub use config::WatchConfig;
