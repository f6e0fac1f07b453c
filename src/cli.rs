//! CLI domain: parse, route, help, output, and presentation only.
//! No domain logic; the route table dispatches to tree, host and client.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{format_changes, format_config, format_snapshot, format_sync_update};
pub use route::RunContext;
