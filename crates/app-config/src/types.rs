// In crates/app-config/src/types.rs

use serde::Deserialize;

use indicators::IndicatorSettings;
use signals::ClassifierSettings;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Settings for the Bybit market-data API.
    pub bybit: BybitSettings,
    /// Settings for the Telegram notification channel.
    pub telegram: TelegramSettings,
    /// Settings for the dashboard HTTP server.
    pub server: ServerSettings,
    /// Settings for the JSON document store.
    pub store: StoreSettings,
    /// Settings for the polling engine.
    pub engine: EngineSettings,

    #[serde(default)]
    pub indicators: IndicatorSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BybitSettings {
    /// The REST API base URL, e.g. "https://api.bybit.com".
    pub rest_base_url: String,
    /// Market category for kline/ticker queries: "linear" or "spot".
    #[serde(default = "default_category")]
    pub category: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Attempts per fetch before the symbol enters the failure cache.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Pause between attempts, in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    /// How long a failing symbol is skipped before being retried, in seconds.
    #[serde(default = "default_failure_ttl")]
    pub failure_cache_ttl_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TelegramSettings {
    #[serde(default = "default_telegram_api")]
    pub api_base_url: String,
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StoreSettings {
    /// Directory holding the JSON state documents.
    pub data_dir: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EngineSettings {
    /// Wait between polling cycles, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// How many of the top-turnover pairs to scan each cycle.
    #[serde(default = "default_universe_size")]
    pub universe_size: usize,
    /// Duplicate-suppression window, in hours.
    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: i64,
}

/// Helper functions for serde defaults
fn default_category() -> String {
    "linear".to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    2
}
fn default_failure_ttl() -> u64 {
    3_600
}
fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}
fn default_poll_interval() -> u64 {
    300
}
fn default_universe_size() -> usize {
    20
}
fn default_cooldown_hours() -> i64 {
    3
}
