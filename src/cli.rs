//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Top-level CLI parser for `trackbridge`.
#[derive(Debug, Parser)]
#[command(
    name = "trackbridge",
    version,
    about = "Link quality findings and metrics to an issue tracker"
)]
pub struct Cli {
    /// YAML file of flat `key: value` settings, applied over the environment.
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Setting override, applied last. May be repeated.
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Analysis scope a collection runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    /// The top-level project.
    Root,
    /// A sub-module of the project.
    Module,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a tracker issue for a quality finding.
    CreateIssue {
        /// Finding identifier on the quality server.
        #[arg(long)]
        id: u64,
        /// Finding severity (BLOCKER, CRITICAL, MAJOR, MINOR, INFO).
        #[arg(long)]
        severity: Option<String>,
        /// Name of the violated rule.
        #[arg(long)]
        rule: String,
        /// Violation message.
        #[arg(long)]
        message: String,
        /// Reviewer comment to include in the description.
        #[arg(long)]
        comment: Option<String>,
        /// Current review status of the finding.
        #[arg(long)]
        status: Option<String>,
        /// Key of a tracker issue already linked to the finding.
        #[arg(long)]
        linked_issue: Option<String>,
    },
    /// Collect tracker issue counts by priority into a measure.
    Collect {
        /// Analysis scope of this run.
        #[arg(long, value_enum, default_value_t = Scope::Root)]
        scope: Scope,
    },
    /// Report which settings are missing.
    Check,
}
