//! Presentation: text and JSON renderings of snapshots, diffs and config.

use crate::cli::parse::OutputFormat;
use crate::client::{SyncEvent, SyncUpdate};
use crate::config::FractalConfig;
use crate::error::ApiError;
use crate::tree::{Change, ChangeKind, HashOutcome, TreeNode};
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

const SHORT_HASH_LEN: usize = 12;

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InvalidArgument(format!("Failed to render JSON: {}", e)))
}

/// Digest prefix, or the full sentinel string
fn short_hash(hash: &HashOutcome) -> String {
    match hash {
        HashOutcome::Digest(digest) => digest.chars().take(SHORT_HASH_LEN).collect(),
        sentinel => sentinel.as_str().to_string(),
    }
}

fn format_timestamp(millis: f64) -> String {
    if millis <= 0.0 {
        return "-".to_string();
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Render a snapshot: JSON is the full wire tree, text is a summary plus
/// a table of direct children.
pub fn format_snapshot(tree: &TreeNode, format: OutputFormat) -> Result<String, ApiError> {
    if format == OutputFormat::Json {
        return to_json(tree);
    }

    let mut out = format!(
        "{}\n  Type: {}\n  Hash: {}\n  Nodes: {}\n  Modified: {}\n",
        tree.path.bold(),
        tree.kind,
        tree.hash,
        tree.node_count(),
        format_timestamp(tree.last_modified)
    );

    if tree.is_dir() && !tree.children().is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Name", "Type", "Hash", "Modified"]);
        for child in tree.children() {
            table.add_row(vec![
                child.name().to_string(),
                child.kind.to_string(),
                short_hash(&child.hash),
                format_timestamp(child.last_modified),
            ]);
        }
        out.push_str(&format!("\n{}\n", table));
    }
    Ok(out)
}

fn change_marker(kind: ChangeKind) -> String {
    match kind {
        ChangeKind::Added => "+".green().to_string(),
        ChangeKind::Removed => "-".red().to_string(),
        ChangeKind::Modified => "~".yellow().to_string(),
    }
}

/// Render a diff result
pub fn format_changes(changes: &[Change], format: OutputFormat) -> Result<String, ApiError> {
    if format == OutputFormat::Json {
        return to_json(&json!({ "count": changes.len(), "changes": changes }));
    }

    if changes.is_empty() {
        return Ok("No differences.".to_string());
    }

    let mut lines: Vec<String> = changes
        .iter()
        .map(|c| format!("{} {}", change_marker(c.change), c.path))
        .collect();
    lines.push(format!("\n{} path(s) differ", changes.len()));
    Ok(lines.join("\n"))
}

/// One line per update for `fractal watch`
pub fn format_sync_update(update: &SyncUpdate) -> String {
    match update {
        SyncUpdate::Failed { path, error } => {
            format!("{} {}: {}", "error".red(), path, error)
        }
        SyncUpdate::Event { path, event } => match event {
            SyncEvent::Initial {
                root_hash,
                node_count,
                latency_ms,
            } => format!(
                "{} {} hash={} nodes={} ({:.1} ms)",
                "initial".cyan(),
                path,
                short_hash(root_hash),
                node_count,
                latency_ms
            ),
            SyncEvent::Unchanged {
                root_hash,
                latency_ms,
            } => format!(
                "{} {} hash={} ({:.1} ms)",
                "in-sync".dimmed(),
                path,
                short_hash(root_hash),
                latency_ms
            ),
            SyncEvent::Changed {
                previous_hash,
                root_hash,
                changes,
                latency_ms,
            } => {
                let mut out = format!(
                    "{} {} {} -> {} ({:.1} ms)",
                    "changed".yellow(),
                    path,
                    short_hash(previous_hash),
                    short_hash(root_hash),
                    latency_ms
                );
                for change in changes {
                    out.push_str(&format!("\n  {} {}", change_marker(change.change), change.path));
                }
                out
            }
        },
    }
}

/// Render the effective configuration
pub fn format_config(config: &FractalConfig, format: OutputFormat) -> Result<String, ApiError> {
    match format {
        OutputFormat::Json => to_json(config),
        OutputFormat::Text => toml::to_string_pretty(config)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e))),
    }
}
