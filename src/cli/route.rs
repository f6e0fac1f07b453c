//! CLI route: single route table and run context.

use crate::cli::help::command_name;
use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{format_changes, format_config, format_snapshot, format_sync_update};
use crate::client::{LocalChannel, SnapshotChannel, SyncClient, WebSocketChannel};
use crate::config::{ConfigLoader, FractalConfig};
use crate::error::ApiError;
use crate::host::{HostAgent, HostServer};
use crate::tree::{self, TreeBuilder, TreeNode};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Runtime context for CLI execution: the effective configuration.
pub struct RunContext {
    config: FractalConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Self::from_config(config)
    }

    /// Create run context from an already loaded configuration.
    pub fn from_config(config: FractalConfig) -> Result<Self, ApiError> {
        config.ensure_valid()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FractalConfig {
        &self.config
    }

    /// Execute a command and return its rendered output
    #[instrument(skip(self, command), fields(command = command_name(command)))]
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let start = Instant::now();
        let result = match command {
            Commands::Snapshot {
                path,
                format,
                max_depth,
            } => self.handle_snapshot(path, *format, *max_depth),
            Commands::Diff {
                before,
                after,
                format,
            } => self.handle_diff(before, after, *format),
            Commands::Compare {
                path,
                against,
                format,
            } => self.handle_compare(path, against, *format),
            Commands::Serve { bind, port } => self.handle_serve(bind.clone(), *port),
            Commands::Watch {
                paths,
                remote,
                url,
                interval_ms,
                count,
            } => self.handle_watch(paths, *remote, url.clone(), *interval_ms, *count),
            Commands::Config { format } => format_config(&self.config, *format),
        };
        info!(
            duration_ms = start.elapsed().as_millis(),
            ok = result.is_ok(),
            "Command finished"
        );
        result
    }

    fn builder(&self, path: &Path) -> TreeBuilder {
        TreeBuilder::new(path).with_policy(self.config.snapshot.clone())
    }

    fn handle_snapshot(
        &self,
        path: &Path,
        format: OutputFormat,
        max_depth: Option<usize>,
    ) -> Result<String, ApiError> {
        let mut builder = self.builder(path);
        if let Some(max_depth) = max_depth {
            builder = builder.with_policy(self.config.snapshot.clone().with_max_depth(max_depth));
        }
        let tree = builder.build();
        format_snapshot(&tree, format)
    }

    fn handle_diff(
        &self,
        before: &Path,
        after: &Path,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let before = read_snapshot(before)?;
        let after = read_snapshot(after)?;
        format_changes(&tree::changes(&before, &after), format)
    }

    fn handle_compare(
        &self,
        path: &Path,
        against: &Path,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let saved = read_snapshot(against)?;
        let fresh = self.builder(path).build();
        format_changes(&tree::changes(&saved, &fresh), format)
    }

    fn handle_serve(&self, bind: Option<String>, port: Option<u16>) -> Result<String, ApiError> {
        let mut host_config = self.config.host.clone();
        if let Some(bind) = bind {
            host_config.bind = bind;
        }
        if let Some(port) = port {
            host_config.port = port;
        }
        host_config.validate().map_err(ApiError::ConfigError)?;

        let agent = HostAgent::new(self.config.snapshot.clone());
        runtime()?.block_on(async move {
            let server = HostServer::bind(agent, &host_config).await?;
            println!("Fractal host agent listening on ws://{}", server.local_addr()?);
            server
                .run(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;
            Ok::<_, ApiError>(())
        })?;
        Ok("Fractal host agent stopped.".to_string())
    }

    fn handle_watch(
        &self,
        paths: &[String],
        remote: bool,
        url: Option<String>,
        interval_ms: Option<u64>,
        count: Option<usize>,
    ) -> Result<String, ApiError> {
        let interval = interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.config.client.poll_interval());
        if interval.is_zero() {
            return Err(ApiError::InvalidArgument(
                "Poll interval must be greater than zero".to_string(),
            ));
        }
        let timeout = self.config.client.request_timeout();
        let paths = paths.to_vec();

        runtime()?.block_on(async move {
            if remote || url.is_some() {
                let url = url.unwrap_or_else(|| self.config.client.url.clone());
                let channel = WebSocketChannel::connect(&url, timeout).await?;
                watch_loop(SyncClient::new(channel), paths, interval, count).await
            } else {
                let channel = LocalChannel::new(HostAgent::new(self.config.snapshot.clone()));
                watch_loop(SyncClient::new(channel), paths, interval, count).await
            }
        })
    }
}

async fn watch_loop<C: SnapshotChannel + 'static>(
    client: SyncClient<C>,
    paths: Vec<String>,
    interval: Duration,
    count: Option<usize>,
) -> Result<String, ApiError> {
    let mut handle = client.spawn(paths, interval);
    let mut seen = 0usize;

    loop {
        tokio::select! {
            update = handle.next() => match update {
                Some(update) => {
                    println!("{}", format_sync_update(&update));
                    seen += 1;
                    if count.map(|limit| seen >= limit).unwrap_or(false) {
                        break;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.shutdown().await;
    Ok(format!("Watch stopped after {} update(s).", seen))
}

fn runtime() -> Result<tokio::runtime::Runtime, ApiError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ApiError::IoError)
}

/// Read a snapshot saved with `fractal snapshot --format json`
pub fn read_snapshot(path: &Path) -> Result<TreeNode, ApiError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ApiError::InvalidSnapshot {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| ApiError::InvalidSnapshot {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
