// In crates/signals/src/suppressor.rs

use chrono::{DateTime, Duration, Utc};
use core_types::{position_key, SignalHistoryEntry, SignalKind, Symbol, Timeframe};
use std::collections::HashMap;

/// Suppresses re-raising the same signal kind for a key inside the cooldown
/// window.
///
/// History depth is 1 per (symbol, timeframe) key: `record` overwrites
/// whatever was there. Price is never considered, only kind and elapsed time.
/// The clock is injected so tests control it.
#[derive(Debug)]
pub struct DuplicateSuppressor {
    history: HashMap<String, SignalHistoryEntry>,
    cooldown: Duration,
}

impl DuplicateSuppressor {
    pub fn new(cooldown: Duration) -> Self {
        Self::from_history(HashMap::new(), cooldown)
    }

    /// Rebuilds the suppressor from persisted history.
    pub fn from_history(history: HashMap<String, SignalHistoryEntry>, cooldown: Duration) -> Self {
        Self { history, cooldown }
    }

    /// True iff the same kind was recorded for this key less than the
    /// cooldown ago. A different kind for the same key is never a duplicate.
    pub fn is_duplicate(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        kind: SignalKind,
        now: DateTime<Utc>,
    ) -> bool {
        match self.history.get(&position_key(symbol, timeframe)) {
            Some(entry) => entry.kind == kind && now - entry.time < self.cooldown,
            None => false,
        }
    }

    /// Records an accepted signal, overwriting the key's previous entry.
    pub fn record(
        &mut self,
        symbol: &Symbol,
        timeframe: Timeframe,
        kind: SignalKind,
        now: DateTime<Utc>,
    ) {
        self.history
            .insert(position_key(symbol, timeframe), SignalHistoryEntry { time: now, kind });
    }

    /// The full history map, for persistence.
    pub fn history(&self) -> &HashMap<String, SignalHistoryEntry> {
        &self.history
    }
}
