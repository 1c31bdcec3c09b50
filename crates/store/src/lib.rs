// In crates/store/src/lib.rs

use core_types::{SignalHistoryEntry, TrackedPosition, WinLossStats};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub mod error;

// Re-export the most important types for easy access.
pub use error::{Error, Result};

const LAST_SIGNALS_FILE: &str = "last_signals.json";
const POSITIONS_FILE: &str = "active_signals.json";
const STATS_FILE: &str = "win_loss_stats.json";

/// JSON-document persistence, one file per concern.
///
/// Loads tolerate a missing or corrupt file by substituting the empty
/// default; saves overwrite the whole document. Swapping this for a real
/// database only touches this crate.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Ensures the data directory exists before the first save.
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|source| Error::WriteFailed {
            path: self.root.display().to_string(),
            source,
        })
    }

    pub fn load_last_signals(&self) -> HashMap<String, SignalHistoryEntry> {
        self.load_or_default(LAST_SIGNALS_FILE)
    }

    pub fn save_last_signals(&self, signals: &HashMap<String, SignalHistoryEntry>) -> Result<()> {
        self.save(LAST_SIGNALS_FILE, signals)
    }

    pub fn load_positions(&self) -> Vec<TrackedPosition> {
        self.load_or_default(POSITIONS_FILE)
    }

    pub fn save_positions(&self, positions: &[TrackedPosition]) -> Result<()> {
        self.save(POSITIONS_FILE, &positions)
    }

    pub fn load_stats(&self) -> WinLossStats {
        self.load_or_default(STATS_FILE)
    }

    pub fn save_stats(&self, stats: &WinLossStats) -> Result<()> {
        self.save(STATS_FILE, stats)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.path(name);
        if !path.exists() {
            return T::default();
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(value) => value,
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "corrupt state file, using empty default");
                    T::default()
                }
            },
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "unreadable state file, using empty default");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.path(name);
        let json = serde_json::to_string_pretty(value).map_err(|source| Error::SerializeFailed {
            path: path.display().to_string(),
            source,
        })?;
        write_file(&path, &json)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| Error::WriteFailed {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{PositionStatus, SignalKind, Symbol, Timeframe, WinLossStats};

    fn temp_repository(tag: &str) -> Repository {
        let root = std::env::temp_dir().join(format!(
            "argus-store-{tag}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        let repository = Repository::new(&root);
        repository.prepare().unwrap();
        repository
    }

    fn sample_position() -> TrackedPosition {
        TrackedPosition {
            symbol: Symbol("BTCUSDT".to_string()),
            timeframe: Timeframe::H1,
            kind: SignalKind::SpotLong,
            entry: 100.0,
            tp: 110.0,
            sl: 95.0,
            current_price: 100.0,
            change_pct: 0.0,
            status: PositionStatus::Tracking,
            opened_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            notified: false,
            duration: None,
        }
    }

    #[test]
    fn missing_files_load_as_empty_defaults() {
        let repository = temp_repository("missing");
        assert!(repository.load_positions().is_empty());
        assert!(repository.load_last_signals().is_empty());
        assert_eq!(repository.load_stats(), WinLossStats::default());
    }

    #[test]
    fn positions_round_trip_through_the_document() {
        let repository = temp_repository("roundtrip");
        let position = sample_position();
        repository.save_positions(std::slice::from_ref(&position)).unwrap();

        let loaded = repository.load_positions();
        assert_eq!(loaded, vec![position]);
    }

    #[test]
    fn corrupt_documents_fall_back_to_the_default() {
        let repository = temp_repository("corrupt");
        std::fs::write(repository.path(POSITIONS_FILE), "{not json").unwrap();
        std::fs::write(repository.path(STATS_FILE), "[1,2,3]").unwrap();

        assert!(repository.load_positions().is_empty());
        assert_eq!(repository.load_stats(), WinLossStats::default());
    }

    #[test]
    fn saving_overwrites_the_whole_document() {
        let repository = temp_repository("overwrite");
        repository.save_positions(&[sample_position()]).unwrap();
        repository.save_positions(&[]).unwrap();
        assert!(repository.load_positions().is_empty());
    }
}
