//! Environment source: `FRACTAL_HOST__PORT=2000` sets `host.port`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("FRACTAL")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
