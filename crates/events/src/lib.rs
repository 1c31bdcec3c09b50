// --- Dashboard event structures, broadcast from the engine to the web server ---

use chrono::{DateTime, Utc};
use core_types::{Timeframe, TrackedPosition};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-cycle accounting pushed to the dashboard after a sweep finishes.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub finished_at: DateTime<Utc>,
    pub scanned_symbols: usize,
    pub new_signals: BTreeMap<Timeframe, u32>,
    pub open_positions: usize,
}

/// The top-level dashboard event enum.
/// `tag` and `content` are used by serde for clean JSON representation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum WsMessage {
    NewSignal(TrackedPosition),
    PositionUpdate(TrackedPosition),
    PositionResolved(TrackedPosition),
    CycleSummary(CycleSummary),
}
