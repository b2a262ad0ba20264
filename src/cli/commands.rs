//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - capacity: feasible posts per week for an input's roster
//! - plan: full batch, timing and comment plan for an input

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cadence - A deterministic campaign scheduling engine
#[derive(Parser, Debug)]
#[command(name = "cadence")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute weekly posting capacity for an input file
    Capacity {
        /// Campaign input JSON (personas, channels, target, items)
        input: PathBuf,
    },

    /// Build the full campaign plan for an input file
    Plan {
        /// Campaign input JSON (personas, channels, target, items)
        input: PathBuf,

        /// Campaign start, e.g. 2026-04-06T09:00 (defaults to now)
        #[arg(short, long)]
        start: Option<String>,

        /// Write the plan here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit posts with nested comments
        #[arg(short, long)]
        nested: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_command() {
        let cli = Cli::parse_from([
            "cadence",
            "plan",
            "input.json",
            "--start",
            "2026-04-06T09:00",
            "--nested",
            "-v",
        ]);
        assert!(cli.is_verbose());
        match cli.command {
            Commands::Plan {
                input,
                start,
                output,
                nested,
            } => {
                assert_eq!(input, PathBuf::from("input.json"));
                assert_eq!(start.as_deref(), Some("2026-04-06T09:00"));
                assert!(output.is_none());
                assert!(nested);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_capacity_with_global_config() {
        let cli = Cli::parse_from(["cadence", "capacity", "in.json", "--config", "c.yml"]);
        assert_eq!(cli.config, Some(PathBuf::from("c.yml")));
        assert!(matches!(cli.command, Commands::Capacity { .. }));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["cadence"]).is_err());
    }
}
