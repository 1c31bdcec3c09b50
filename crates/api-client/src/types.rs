// In crates/api-client/src/types.rs

use core_types::Kline;
use serde::Deserialize;

/// The envelope every Bybit v5 response is wrapped in.
#[derive(Deserialize, Debug)]
pub struct BybitResponse {
    #[serde(rename = "retCode")]
    pub ret_code: i64,
    #[serde(rename = "retMsg")]
    pub ret_msg: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

/// The `result` payload of `GET /v5/market/kline`.
#[derive(Deserialize, Debug)]
pub struct KlineResult {
    #[serde(default)]
    pub list: Vec<RawKline>,
}

/// One kline row: [startTime, open, high, low, close, volume, turnover],
/// everything a decimal string. Bybit returns rows newest-first.
#[derive(Deserialize, Debug)]
pub struct RawKline(
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
);

impl RawKline {
    /// Converts the raw row into our clean, internal `Kline` type.
    pub fn into_kline(self) -> Kline {
        Kline {
            open_time: self.0.parse().unwrap_or_default(),
            open: self.1.parse().unwrap_or_default(),
            high: self.2.parse().unwrap_or_default(),
            low: self.3.parse().unwrap_or_default(),
            close: self.4.parse().unwrap_or_default(),
            volume: self.5.parse().unwrap_or_default(),
        }
    }
}

/// The `result` payload of `GET /v5/market/tickers`.
#[derive(Deserialize, Debug)]
pub struct TickerResult {
    #[serde(default)]
    pub list: Vec<RawTicker>,
}

#[derive(Deserialize, Debug)]
pub struct RawTicker {
    pub symbol: String,
    #[serde(rename = "turnover24h", default)]
    pub turnover_24h: String,
}

/// A discovered pair with its 24h quote turnover, used to rank the universe.
#[derive(Debug, Clone, PartialEq)]
pub struct TopPair {
    pub symbol: String,
    pub turnover_24h: f64,
}
