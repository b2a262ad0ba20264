//! CLI module for cadence - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for capacity checks and
//! full campaign planning.

pub mod commands;

pub use commands::Cli;
