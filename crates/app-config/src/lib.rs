// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::Settings;

/// Loads the layered application settings.
///
/// `config/base.toml` is always read; an environment-specific file (e.g.
/// `config/production.toml`) and environment variables (prefix `APP`,
/// separator `__`, e.g. `APP_TELEGRAM__BOT_TOKEN`) are merged on top, so
/// secrets like the Telegram token never need to live in a checked-in file.
pub fn load_settings() -> Result<Settings> {
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        .add_source(File::with_name("config/base"))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;

    Ok(settings)
}
