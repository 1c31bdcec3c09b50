// In crates/web-server/src/types.rs

use core_types::{SignalKind, Timeframe, TrackedPosition};
use serde::Serialize;

/// An open position as the dashboard sees it: raw fields plus the rendered
/// status label.
#[derive(Debug, Serialize)]
pub struct PositionView {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub kind: SignalKind,
    pub signal: String,
    pub entry: f64,
    pub tp: f64,
    pub sl: f64,
    pub current_price: f64,
    pub change_pct: f64,
    pub status: String,
    pub opened_at: String,
    pub duration: Option<String>,
}

impl From<TrackedPosition> for PositionView {
    fn from(position: TrackedPosition) -> Self {
        Self {
            status: position.status_label(),
            signal: position.kind.to_string(),
            symbol: position.symbol.0,
            timeframe: position.timeframe,
            kind: position.kind,
            entry: position.entry,
            tp: position.tp,
            sl: position.sl,
            current_price: position.current_price,
            change_pct: position.change_pct,
            opened_at: position.opened_at.format("%Y-%m-%d %H:%M").to_string(),
            duration: position.duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{PositionStatus, Symbol};

    #[test]
    fn view_renders_the_status_label_and_timestamp() {
        let position = TrackedPosition {
            symbol: Symbol("BTCUSDT".to_string()),
            timeframe: Timeframe::H1,
            kind: SignalKind::SpotShort,
            entry: 100.0,
            tp: 95.0,
            sl: 103.0,
            current_price: 99.0,
            change_pct: 1.0,
            status: PositionStatus::Tracking,
            opened_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 15, 0).unwrap(),
            notified: false,
            duration: None,
        };

        let view = PositionView::from(position);
        assert_eq!(view.status, "Tracking (+1.00%)");
        assert_eq!(view.signal, "SHORT");
        assert_eq!(view.opened_at, "2025-06-01 09:15");
    }
}
