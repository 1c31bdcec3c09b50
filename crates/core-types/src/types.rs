// In crates/core-types/src/types.rs

use crate::error::Error;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading pair symbol, e.g. "BTCUSDT".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candle aggregation interval.
///
/// The engine only ever works with this fixed set; Bybit interval codes and
/// per-timeframe history depth live here so every crate agrees on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timeframe {
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl Timeframe {
    /// All timeframes the engine scans, shortest first.
    pub const ALL: [Timeframe; 5] = [
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    /// The interval code used by the Bybit v5 kline endpoint.
    pub fn bybit_code(&self) -> &'static str {
        match self {
            Timeframe::M15 => "15",
            Timeframe::M30 => "30",
            Timeframe::H1 => "60",
            Timeframe::H4 => "240",
            Timeframe::D1 => "D",
        }
    }

    /// How many bars to request per fetch: ~30 days of history, clamped to
    /// the API maximum of 1000.
    pub fn fetch_limit(&self) -> u16 {
        match self {
            Timeframe::M15 => 1000,
            Timeframe::M30 => 1000,
            Timeframe::H1 => 720,
            Timeframe::H4 => 180,
            Timeframe::D1 => 30,
        }
    }

    /// The three shortest timeframes, the only ones futures rules fire on.
    pub fn is_short_horizon(&self) -> bool {
        matches!(self, Timeframe::M15 | Timeframe::M30 | Timeframe::H1)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "15m" => Ok(Timeframe::M15),
            "30m" => Ok(Timeframe::M30),
            "1h" => Ok(Timeframe::H1),
            "4h" => Ok(Timeframe::H4),
            "1d" => Ok(Timeframe::D1),
            other => Err(Error::UnknownTimeframe(other.to_string())),
        }
    }
}

impl Serialize for Timeframe {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Timeframe {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single OHLCV candle as returned by the exchange.
///
/// Prices stay `Decimal` until the indicator boundary; the exchange sends
/// them as decimal strings and we parse them losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// The direction a signal trades in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// The discrete outcome of classifying one (symbol, timeframe) snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    NoSignal,
    SpotLong,
    SpotShort,
    FuturesLong,
    FuturesShort,
}

impl SignalKind {
    /// Whether this kind opens a tracked position.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, SignalKind::NoSignal)
    }

    /// The direction of an actionable kind. `None` for `NoSignal`.
    pub fn side(&self) -> Option<Side> {
        match self {
            SignalKind::SpotLong | SignalKind::FuturesLong => Some(Side::Long),
            SignalKind::SpotShort | SignalKind::FuturesShort => Some(Side::Short),
            SignalKind::NoSignal => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::NoSignal => "NO SIGNAL",
            SignalKind::SpotLong => "LONG",
            SignalKind::SpotShort => "SHORT",
            SignalKind::FuturesLong => "FUTURES LONG",
            SignalKind::FuturesShort => "FUTURES SHORT",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The classifier's verdict for one snapshot: a kind plus the price targets
/// that bound the resulting position.
///
/// For Long kinds `tp > entry > sl`; for Short kinds `tp < entry < sl`;
/// all three are `None` for `NoSignal`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalDecision {
    pub kind: SignalKind,
    pub entry: Option<f64>,
    pub tp: Option<f64>,
    pub sl: Option<f64>,
}

impl SignalDecision {
    pub fn none() -> Self {
        Self {
            kind: SignalKind::NoSignal,
            entry: None,
            tp: None,
            sl: None,
        }
    }
}

/// Where a tracked position currently stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    /// Still open, neither target hit.
    Tracking,
    /// Take-profit reached.
    TpHit,
    /// Stop-loss reached.
    SlHit,
    /// The latest price could not be fetched this cycle; position retained.
    Error,
}

impl PositionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PositionStatus::TpHit | PositionStatus::SlHit)
    }
}

/// A virtual position created from an accepted signal and tracked until it
/// hits its take-profit or stop-loss.
///
/// Identity key is (symbol, timeframe): at most one open position per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPosition {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
    pub kind: SignalKind,
    pub entry: f64,
    pub tp: f64,
    pub sl: f64,
    pub current_price: f64,
    pub change_pct: f64,
    pub status: PositionStatus,
    pub opened_at: DateTime<Utc>,
    #[serde(default)]
    pub notified: bool,
    #[serde(default)]
    pub duration: Option<String>,
}

impl TrackedPosition {
    /// The ledger key, e.g. "BTCUSDT_1h".
    pub fn key(&self) -> String {
        position_key(&self.symbol, self.timeframe)
    }

    /// Human-readable status, e.g. "Tracking (-3.00%)" or "TP hit".
    pub fn status_label(&self) -> String {
        match self.status {
            PositionStatus::Tracking => format!("Tracking ({:+.2}%)", self.change_pct),
            PositionStatus::TpHit => "TP hit".to_string(),
            PositionStatus::SlHit => "SL hit".to_string(),
            PositionStatus::Error => "Update failed".to_string(),
        }
    }
}

/// Builds the identity key shared by the ledger and the suppressor history.
pub fn position_key(symbol: &Symbol, timeframe: Timeframe) -> String {
    format!("{}_{}", symbol.0, timeframe)
}

/// The most recent accepted signal for one (symbol, timeframe) key.
/// History depth is 1: a newer record overwrites the older one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalHistoryEntry {
    pub time: DateTime<Utc>,
    pub kind: SignalKind,
}

/// Win/loss tally for a single direction. `count == win + loss` after every
/// update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionStats {
    pub count: u32,
    pub win: u32,
    pub loss: u32,
}

impl DirectionStats {
    fn record(&mut self, won: bool) {
        if won {
            self.win += 1;
        } else {
            self.loss += 1;
        }
        self.count = self.win + self.loss;
    }
}

/// Aggregate win/loss accounting, one tally per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLossStats {
    #[serde(rename = "LONG")]
    pub long: DirectionStats,
    #[serde(rename = "SHORT")]
    pub short: DirectionStats,
}

impl WinLossStats {
    /// Records one terminal resolution for the given direction.
    pub fn record(&mut self, side: Side, won: bool) {
        match side {
            Side::Long => self.long.record(won),
            Side::Short => self.short.record(won),
        }
    }
}
