mod settings;

use config::{Config, Environment, File};

use crate::utils::error::Result;
use settings::PartialSettings;

pub use settings::{BusSettings, LoggingSettings, Settings};

/// Prefix for environment overrides, e.g. `TOPICBUS__BUS__DEFAULT_QUEUE_LENGTH=64`.
pub const ENV_PREFIX: &str = "TOPICBUS";

/// Loads the configuration from `config/default` (any format the `config`
/// crate understands, optional) and `TOPICBUS__*` environment variables,
/// merged over the default values.
pub fn load_config() -> Result<Settings> {
    load_from("config/default", false)
}

/// Like [`load_config`] but reads the given file, which must exist.
pub fn load_config_from(path: &str) -> Result<Settings> {
    load_from(path, true)
}

fn load_from(file: &str, required: bool) -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name(file).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge_with_defaults())
}
