//! Integration tests for Configuration System

use fractal_sync::cli::{Commands, OutputFormat, RunContext};
use fractal_sync::config::{ConfigLoader, FractalConfig};
use fractal_sync::host::HostAgent;
use fractal_sync::tree::{HashOutcome, TreeBuilder};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_workspace_config_file_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    fs::create_dir(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        r#"
[host]
port = 2024

[client]
poll_interval_ms = 250
"#,
    )
    .unwrap();

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert_eq!(config.host.port, 2024);
    assert_eq!(config.client.poll_interval_ms, 250);
    // untouched sections keep their defaults
    assert_eq!(config.client.request_timeout_ms, 30_000);
    assert_eq!(config.snapshot.max_depth, 15);
}

#[test]
fn test_snapshot_policy_from_config_drives_builder() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("fractal.toml");
    fs::write(
        &config_file,
        r#"
[snapshot]
max_depth = 1
ignored_names = ["secret"]
"#,
    )
    .unwrap();

    let data = temp_dir.path().join("data");
    fs::create_dir_all(data.join("secret")).unwrap();
    fs::create_dir_all(data.join("open").join("deeper")).unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(config.validate().is_ok());

    let tree = TreeBuilder::new(&data)
        .with_policy(config.snapshot.clone())
        .build();
    let open = tree.find(&format!("{}/open", tree.path)).unwrap();
    let secret = tree.find(&format!("{}/secret", tree.path)).unwrap();
    assert_eq!(secret.hash, HashOutcome::Ignored);
    assert_eq!(open.children()[0].hash, HashOutcome::MaxDepth);

    // the host agent applies the same policy
    let agent = HostAgent::new(config.snapshot);
    let response = agent.snapshot(&data.to_string_lossy());
    assert_eq!(response.tree.hash, tree.hash);
    assert_eq!(response.tree.node_count(), tree.node_count());
}

#[test]
fn test_missing_explicit_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml"));
    assert!(result.is_err());
}

#[test]
fn test_invalid_config_rejected_by_run_context() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("bad.toml");
    fs::write(
        &config_file,
        r#"
[client]
url = "http://localhost:1984"
"#,
    )
    .unwrap();

    let result = RunContext::new(temp_dir.path().to_path_buf(), Some(config_file));
    assert!(result.is_err());
}

#[test]
fn test_config_command_renders_effective_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("fractal.toml");
    fs::write(&config_file, "[host]\nport = 4000\n").unwrap();

    let ctx = RunContext::new(temp_dir.path().to_path_buf(), Some(config_file)).unwrap();
    let rendered = ctx
        .execute(&Commands::Config {
            format: OutputFormat::Json,
        })
        .unwrap();
    let parsed: FractalConfig = serde_json::from_str(&rendered).unwrap();
    assert_eq!(parsed.host.port, 4000);
    assert_eq!(&parsed, ctx.config());
}
