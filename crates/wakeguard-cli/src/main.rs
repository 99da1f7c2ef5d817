//! Wakeguard CLI - work-hours aware keep-awake daemon
//!
//! Main entry point and argument parsing.

mod app;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wakeguard_core::SimulationMode;

#[derive(Parser)]
#[command(name = "wakeguard", version, about = "Keep the system awake during work hours")]
struct Cli {
    /// Path to the configuration file (default: ~/.wakeguard/config.yaml)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the daemon in the foreground until interrupted
    Run,
    /// Show configuration, schedule, and current idle status
    Status,
    /// Perform a single activity simulation and exit
    Simulate {
        /// Override the configured simulation mode (key, mouse, mixed)
        #[arg(long)]
        mode: Option<SimulationMode>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run => commands::run::run(cli.config).await,
        Command::Status => commands::status::run(cli.config).await,
        Command::Simulate { mode } => commands::simulate::run(cli.config, mode).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["wakeguard", "status"]).unwrap();
        assert!(matches!(cli.command, Command::Status));

        let cli = Cli::try_parse_from(["wakeguard", "run", "--config", "/tmp/wg.yaml"]).unwrap();
        assert!(matches!(cli.command, Command::Run));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/wg.yaml")));

        let cli = Cli::try_parse_from(["wakeguard", "simulate", "--mode", "mouse"]).unwrap();
        match cli.command {
            Command::Simulate { mode } => assert_eq!(mode, Some(SimulationMode::Mouse)),
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        assert!(Cli::try_parse_from(["wakeguard", "simulate", "--mode", "wiggle"]).is_err());
    }
}
