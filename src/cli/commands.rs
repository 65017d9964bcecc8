//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: spawn the configured cycles and report their callbacks
//! - config: print the effective configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cycler - cooperative repeating timers
#[derive(Parser, Debug)]
#[command(name = "cycler")]
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
    pub command: Option<Commands>,
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
    /// Run the configured cycles, then kill them all
    Run {
        /// Seconds of clock time to run before teardown
        #[arg(short, long)]
        duration: Option<f32>,

        /// Clock speed relative to real time
        #[arg(short, long)]
        speed: Option<f64>,
    },

    /// Print the effective configuration as YAML
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        // No args falls back to running with config defaults
        let cli = Cli::try_parse_from(["cycler"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["cycler", "-v"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["cycler", "-c", "/path/to/cycler.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/cycler.yml")));
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::try_parse_from(["cycler", "run"]).unwrap();
        match cli.command {
            Some(Commands::Run { duration, speed }) => {
                assert!(duration.is_none());
                assert!(speed.is_none());
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_run_with_overrides() {
        let cli = Cli::try_parse_from(["cycler", "run", "-d", "3.5", "--speed", "10"]).unwrap();
        match cli.command {
            Some(Commands::Run { duration, speed }) => {
                assert_eq!(duration, Some(3.5));
                assert_eq!(speed, Some(10.0));
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_run_rejects_non_numeric_duration() {
        assert!(Cli::try_parse_from(["cycler", "run", "-d", "soon"]).is_err());
    }

    #[test]
    fn test_config_command_with_global_flag() {
        let cli = Cli::try_parse_from(["cycler", "config", "-c", "custom.yml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config)));
        assert_eq!(cli.config, Some(PathBuf::from("custom.yml")));
    }

    #[test]
    fn test_help_works() {
        // Verify help doesn't panic
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["cycler", "--version"]);
        // Version flag causes early exit with error (expected)
        assert!(result.is_err());
    }
}
