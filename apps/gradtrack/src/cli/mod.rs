//! # GradTrack CLI Module
//!
//! This module implements the CLI interface for GradTrack.
//!
//! ## Available Commands
//!
//! - `allocate` - Run the allocation (optionally write results back)
//! - `status` - Show distribution progress per cohort
//! - `results` - List assigned teams of a cohort
//! - `reset` - Clear assignments
//! - `reset-selections` - Clear project selections of a cohort
//! - `server` - Start the HTTP admin API

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use gradtrack_core::{GradTrackError, StudyType, TieBreak};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// GradTrack - graduation project allocation
///
/// Assigns supervisor projects to student teams in order of each team's
/// best GPA, each team receiving its highest-ranked project still free.
#[derive(Parser, Debug)]
#[command(name = "gradtrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the JSON snapshot (overrides the configured path)
    #[arg(short = 'S', long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the project allocation
    Allocate {
        /// Only allocate teams of this cohort (morning, evening)
        #[arg(long)]
        cohort: Option<StudyType>,

        /// Order of teams with equal GPA (created_at, input_order)
        #[arg(short, long)]
        tie_break: Option<TieBreak>,

        /// Write assignments back to the snapshot
        #[arg(short, long)]
        apply: bool,
    },

    /// Show distribution progress
    Status,

    /// List assigned teams with project details
    Results {
        /// Cohort to list (morning, evening)
        #[arg(long)]
        cohort: StudyType,
    },

    /// Clear assignments (all cohorts unless one is given)
    Reset {
        /// Only reset teams of this cohort
        #[arg(long)]
        cohort: Option<StudyType>,
    },

    /// Clear the project selections of every team in a cohort
    ResetSelections {
        /// Cohort to clear (morning, evening)
        #[arg(long)]
        cohort: StudyType,
    },

    /// Start HTTP server
    Server {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Settings resolved from config file, environment, and global flags.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: AppConfig,
    pub json_mode: bool,
    pub verbose: bool,
}

impl Context {
    /// Load configuration and fold the global flags into it.
    pub fn from_cli(cli: &Cli) -> Result<Self, GradTrackError> {
        let mut config = AppConfig::load(cli.config.as_deref())?;
        if let Some(path) = &cli.snapshot {
            config.snapshot.path = path.clone();
        }
        Ok(Self {
            config,
            json_mode: cli.json_mode,
            verbose: cli.verbose,
        })
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), GradTrackError> {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        Some(Commands::Allocate {
            cohort,
            tie_break,
            apply,
        }) => cmd_allocate(&ctx, cohort, tie_break, apply),
        Some(Commands::Status) => cmd_status(&ctx),
        Some(Commands::Results { cohort }) => cmd_results(&ctx, cohort),
        Some(Commands::Reset { cohort }) => cmd_reset(&ctx, cohort),
        Some(Commands::ResetSelections { cohort }) => cmd_reset_selections(&ctx, cohort),
        Some(Commands::Server { host, port }) => cmd_server(ctx, host, port).await,
        None => {
            // No subcommand - show status by default
            cmd_status(&ctx)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn allocate_flags_parse() {
        let cli = Cli::try_parse_from([
            "gradtrack",
            "--snapshot",
            "records.json",
            "allocate",
            "--cohort",
            "مسائية",
            "--tie-break",
            "input-order",
            "--apply",
        ])
        .expect("parse");

        assert_eq!(cli.snapshot, Some(PathBuf::from("records.json")));
        match cli.command {
            Some(Commands::Allocate {
                cohort,
                tie_break,
                apply,
            }) => {
                assert_eq!(cohort, Some(StudyType::Evening));
                assert_eq!(tie_break, Some(TieBreak::InputOrder));
                assert!(apply);
            }
            other => unreachable!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn results_requires_cohort() {
        assert!(Cli::try_parse_from(["gradtrack", "results"]).is_err());
        assert!(Cli::try_parse_from(["gradtrack", "results", "--cohort", "night"]).is_err());
    }
}
