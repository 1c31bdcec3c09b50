// In crates/api-client/src/lib.rs

use app_config::types::BybitSettings;
use chrono::Utc;
use core_types::{Kline, Symbol, Timeframe};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

pub mod error;
pub mod failure_cache;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use failure_cache::FailureCache;
pub use types::*;

/// A client for the public Bybit v5 market endpoints.
///
/// Fetches retry on transport errors only; an answered-but-empty or rejected
/// request is final for the cycle. A symbol that exhausts its retries enters
/// the injected `FailureCache` and is skipped until the TTL lapses.
pub struct BybitClient {
    http_client: reqwest::Client,
    base_url: String,
    category: String,
    retry_attempts: u32,
    retry_delay: Duration,
    failures: Mutex<FailureCache>,
}

impl BybitClient {
    /// Constructs a new client from settings and an injected failure cache.
    pub fn new(settings: &BybitSettings, failures: FailureCache) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(Error::RequestFailed)?;

        Ok(Self {
            http_client,
            base_url: settings.rest_base_url.clone(),
            category: settings.category.clone(),
            retry_attempts: settings.retry_attempts.max(1),
            retry_delay: Duration::from_secs(settings.retry_delay_secs),
            failures: Mutex::new(failures),
        })
    }

    /// Fetches the candle history for one (symbol, timeframe), oldest first.
    ///
    /// Depth comes from `Timeframe::fetch_limit`.
    pub async fn get_klines(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<Vec<Kline>> {
        self.get_klines_with_limit(symbol, timeframe, timeframe.fetch_limit())
            .await
    }

    /// Fetches just enough bars to read the latest traded price.
    pub async fn get_latest_price(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<Decimal> {
        let klines = self.get_klines_with_limit(symbol, timeframe, 2).await?;
        klines
            .last()
            .map(|kline| kline.close)
            .ok_or_else(|| Error::NoData(symbol.0.clone()))
    }

    async fn get_klines_with_limit(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: u16,
    ) -> Result<Vec<Kline>> {
        {
            let mut failures = self.failures.lock().unwrap();
            let now = Utc::now();
            failures.expire(now);
            if failures.get(&symbol.0, now).is_some() {
                tracing::warn!(symbol = %symbol, "skipping: failed repeatedly within the TTL window");
                return Err(Error::CoolingDown(symbol.0.clone()));
            }
        }

        let mut last_error = Error::NoData(symbol.0.clone());
        for attempt in 1..=self.retry_attempts {
            match self.fetch_klines_once(symbol, timeframe, limit).await {
                Ok(klines) => return Ok(klines),
                // The exchange answered; retrying will not change the verdict.
                Err(err @ (Error::ApiError { .. } | Error::NoData(_))) => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        symbol = %symbol,
                        timeframe = %timeframe,
                        attempt,
                        retries = self.retry_attempts,
                        error = %err,
                        "kline fetch failed"
                    );
                    last_error = err;
                }
            }

            if attempt < self.retry_attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        tracing::error!(symbol = %symbol, "giving up after {} attempts", self.retry_attempts);
        self.failures.lock().unwrap().put(&symbol.0, Utc::now());
        Err(last_error)
    }

    async fn fetch_klines_once(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: u16,
    ) -> Result<Vec<Kline>> {
        let url = format!(
            "{}/v5/market/kline?category={}&symbol={}&interval={}&limit={}",
            self.base_url,
            self.category,
            symbol.0,
            timeframe.bybit_code(),
            limit.min(1000)
        );

        let result = self.request(&url).await?;
        let kline_result: KlineResult =
            serde_json::from_value(result).map_err(Error::DeserializationFailed)?;

        if kline_result.list.is_empty() {
            return Err(Error::NoData(symbol.0.clone()));
        }

        let mut klines: Vec<Kline> = kline_result
            .list
            .into_iter()
            .map(RawKline::into_kline)
            .collect();
        // Bybit returns rows newest-first; the indicator engine wants them
        // in chronological order.
        klines.sort_by_key(|kline| kline.open_time);

        Ok(klines)
    }

    /// Every symbol tradable in the configured category.
    pub async fn get_supported_pairs(&self) -> Result<HashSet<String>> {
        let tickers = self.fetch_tickers().await?;
        Ok(tickers
            .into_iter()
            .map(|ticker| ticker.symbol.to_uppercase())
            .collect())
    }

    /// The top USDT pairs by 24h quote turnover, highest first.
    pub async fn get_top_pairs(&self, limit: usize) -> Result<Vec<TopPair>> {
        let tickers = self.fetch_tickers().await?;

        let mut pairs: Vec<TopPair> = tickers
            .into_iter()
            .filter(|ticker| ticker.symbol.ends_with("USDT"))
            .map(|ticker| TopPair {
                turnover_24h: ticker.turnover_24h.parse().unwrap_or(0.0),
                symbol: ticker.symbol.to_uppercase(),
            })
            .collect();

        pairs.sort_by(|a, b| b.turnover_24h.total_cmp(&a.turnover_24h));
        pairs.truncate(limit);
        Ok(pairs)
    }

    async fn fetch_tickers(&self) -> Result<Vec<RawTicker>> {
        let url = format!(
            "{}/v5/market/tickers?category={}",
            self.base_url, self.category
        );
        let result = self.request(&url).await?;
        let ticker_result: TickerResult =
            serde_json::from_value(result).map_err(Error::DeserializationFailed)?;
        Ok(ticker_result.list)
    }

    /// Performs one GET and unwraps the Bybit response envelope.
    async fn request(&self, url: &str) -> Result<serde_json::Value> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let text = response.text().await.map_err(classify_reqwest_error)?;
        let envelope: BybitResponse =
            serde_json::from_str(&text).map_err(Error::DeserializationFailed)?;

        if envelope.ret_code != 0 {
            return Err(Error::ApiError {
                code: envelope.ret_code,
                msg: envelope.ret_msg,
            });
        }

        Ok(envelope.result)
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else {
        Error::RequestFailed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kline_envelope_parses_and_sorts_chronologically() {
        let body = r#"{
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "category": "linear",
                "symbol": "BTCUSDT",
                "list": [
                    ["1670612400000","17100","17120","17090","17110","250000","4.2"],
                    ["1670608800000","17071","17073","17027","17055.5","268611","4.5"]
                ]
            }
        }"#;

        let envelope: BybitResponse = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.ret_code, 0);

        let result: KlineResult = serde_json::from_value(envelope.result).unwrap();
        let mut klines: Vec<Kline> = result.list.into_iter().map(RawKline::into_kline).collect();
        klines.sort_by_key(|kline| kline.open_time);

        assert_eq!(klines.len(), 2);
        assert!(klines[0].open_time < klines[1].open_time);
        assert_eq!(klines[1].close, "17110".parse().unwrap());
    }

    #[test]
    fn rejected_envelope_carries_the_api_error() {
        let body = r#"{"retCode":10001,"retMsg":"params error","result":{}}"#;
        let envelope: BybitResponse = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.ret_code, 10001);
        assert_eq!(envelope.ret_msg, "params error");
    }

    #[test]
    fn top_pair_ranking_keeps_usdt_pairs_by_turnover() {
        let tickers = vec![
            RawTicker {
                symbol: "BTCUSDT".into(),
                turnover_24h: "900.5".into(),
            },
            RawTicker {
                symbol: "ETHBTC".into(),
                turnover_24h: "9999".into(),
            },
            RawTicker {
                symbol: "ETHUSDT".into(),
                turnover_24h: "1200".into(),
            },
        ];

        let mut pairs: Vec<TopPair> = tickers
            .into_iter()
            .filter(|ticker| ticker.symbol.ends_with("USDT"))
            .map(|ticker| TopPair {
                turnover_24h: ticker.turnover_24h.parse().unwrap_or(0.0),
                symbol: ticker.symbol,
            })
            .collect();
        pairs.sort_by(|a, b| b.turnover_24h.total_cmp(&a.turnover_24h));

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].symbol, "ETHUSDT");
        assert_eq!(pairs[1].symbol, "BTCUSDT");
    }
}
