//! CLI parse: clap types for fractal. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Fractal CLI - content-hashed directory snapshots and pruned diffs
#[derive(Parser, Debug)]
#[command(name = "fractal")]
#[command(about = "Content-hashed directory snapshots and pruned tree diffs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root used to locate config/config.toml
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a snapshot of a path
    Snapshot {
        /// Path to snapshot
        path: PathBuf,
        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Override the configured depth limit
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Compare two saved snapshots (JSON files)
    Diff {
        /// Earlier snapshot
        before: PathBuf,
        /// Later snapshot
        after: PathBuf,
        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Snapshot a path now and compare it with a saved snapshot
    Compare {
        /// Path to snapshot
        path: PathBuf,
        /// Saved snapshot to compare against
        #[arg(long)]
        against: PathBuf,
        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Run the host agent (WebSocket)
    Serve {
        /// Interface to bind (overrides config)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Poll paths and report changes
    Watch {
        /// Paths to watch
        #[arg(required = true)]
        paths: Vec<String>,
        /// Poll a remote host agent instead of the local filesystem
        #[arg(long)]
        remote: bool,
        /// Host agent url (overrides config; implies --remote)
        #[arg(long)]
        url: Option<String>,
        /// Poll interval in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Stop after this many updates
        #[arg(long)]
        count: Option<usize>,
    },
    /// Show the effective configuration
    Config {
        /// Output format (text renders TOML)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}
