// In crates/engine/src/recorder.rs

use crate::format;
use crate::resolver::format_duration;
use chrono::{DateTime, Utc};
use core_types::{TrackedPosition, WinLossStats};
use notifier::Notify;
use std::sync::Arc;

/// Runs the terminal bookkeeping for a resolved position, exactly once.
///
/// The notified flag is the guard: once this unit has run, later calls are
/// no-ops, so stats can never be incremented twice and the channel never
/// sees the same resolution twice.
pub struct OutcomeRecorder {
    notifier: Arc<dyn Notify>,
}

impl OutcomeRecorder {
    pub fn new(notifier: Arc<dyn Notify>) -> Self {
        Self { notifier }
    }

    /// Returns true when the unit ran (stats changed, notification sent).
    pub async fn record(
        &self,
        position: &mut TrackedPosition,
        stats: &mut WinLossStats,
        now: DateTime<Utc>,
    ) -> bool {
        if position.notified || !position.status.is_terminal() {
            return false;
        }
        let Some(side) = position.kind.side() else {
            return false;
        };

        let duration = position
            .duration
            .clone()
            .unwrap_or_else(|| format_duration(position.opened_at, now));
        let won = matches!(position.status, core_types::PositionStatus::TpHit);

        let message = format::resolution_message(position, &duration);
        if let Err(error) = self.notifier.send(&message).await {
            tracing::warn!(sink = self.notifier.name(), %error, "resolution notification failed");
        }

        stats.record(side, won);
        position.notified = true;
        position.duration = Some(duration.clone());

        tracing::info!(
            symbol = %position.symbol,
            timeframe = %position.timeframe,
            kind = %position.kind,
            status = ?position.status,
            change_pct = position.change_pct,
            duration = %duration,
            "position resolved"
        );

        true
    }
}
