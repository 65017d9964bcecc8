//! CLI module for cycler - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for running the configured
//! cycles and inspecting the effective configuration.

pub mod commands;
pub mod run;

pub use commands::Cli;
