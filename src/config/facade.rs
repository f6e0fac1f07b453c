//! Config loading facade: assembles sources and deserializes the result.

use super::merge;
use super::sources::{environment, global_file, workspace_file};
use super::FractalConfig;
use config::{ConfigError, File};
use std::path::Path;
use tracing::debug;

/// Loads `FractalConfig` from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace: defaults, global file, workspace
    /// files, environment.
    pub fn load(workspace_root: &Path) -> Result<FractalConfig, ConfigError> {
        let builder = merge::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: FractalConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from an explicit file (required), then environment.
    pub fn load_from_file(path: &Path) -> Result<FractalConfig, ConfigError> {
        let builder = merge::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder);

        let config: FractalConfig = builder.build()?.try_deserialize()?;
        debug!(config_path = %path.display(), "Configuration loaded");
        Ok(config)
    }
}
