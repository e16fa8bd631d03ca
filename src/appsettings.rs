use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use roomreg_models::settings::Settings;

/// Reads `appsettings.toml` from the working directory, then the optional
/// `appsettings.local.toml`, then `APP_`-prefixed environment variables
/// (`APP_TELEGRAM__TOKEN`, `APP_DATABASE__URL`, ...).
pub fn load() -> Result<Settings, ConfigError> {
    load_from(Path::new("."))
}

pub fn load_from(dir: &Path) -> Result<Settings, ConfigError> {
    Config::builder()
        .add_source(File::from(dir.join("appsettings.toml")).required(true))
        .add_source(File::from(dir.join("appsettings.local.toml")).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
