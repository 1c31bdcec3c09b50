// In crates/api-client/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request timed out")]
    Timeout,
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),
    #[error("Bybit API error: code {code}, msg: {msg}")]
    ApiError { code: i64, msg: String },
    #[error("no data returned for {0}")]
    NoData(String),
    #[error("{0} is cooling down after repeated failures")]
    CoolingDown(String),
}

pub type Result<T> = std::result::Result<T, Error>;
