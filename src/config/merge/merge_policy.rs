//! Merge rules: defaults, override order, conflict handling.
//!
//! Scalars from a later source replace earlier ones. Lists replace whole:
//! setting `snapshot.ignored_names` drops the built-in names.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("snapshot.max_depth", crate::ignore::DEFAULT_MAX_DEPTH as i64)?
        .set_default("host.bind", "127.0.0.1")?
        .set_default("host.port", 1984)?
        .set_default("client.poll_interval_ms", 5_000)?
        .set_default("client.request_timeout_ms", 30_000)
}
