//! Command naming for logs.

use crate::cli::parse::Commands;

/// Stable command name used in log fields
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Snapshot { .. } => "snapshot",
        Commands::Diff { .. } => "diff",
        Commands::Compare { .. } => "compare",
        Commands::Serve { .. } => "serve",
        Commands::Watch { .. } => "watch",
        Commands::Config { .. } => "config",
    }
}
