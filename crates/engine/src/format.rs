// In crates/engine/src/format.rs

use core_types::TrackedPosition;

/// The Telegram message announcing a freshly accepted signal.
pub fn new_signal_message(position: &TrackedPosition) -> String {
    format!(
        "📊 Coin: #{symbol} ({timeframe})\n\
         💰 Price: ${price:.4}\n\
         📈 TA: {kind}\n\
         🎯 Entry: ${entry:.4}\n\
         ✅ TP: ${tp:.4}\n\
         ❌ SL: ${sl:.4}\n\
         Status: {status}\n\
         🕒 Time: {time}",
        symbol = position.symbol,
        timeframe = position.timeframe,
        price = position.current_price,
        kind = position.kind,
        entry = position.entry,
        tp = position.tp,
        sl = position.sl,
        status = position.status_label(),
        time = position.opened_at.format("%Y-%m-%d %H:%M"),
    )
}

/// The Telegram message announcing a terminal TP/SL resolution.
pub fn resolution_message(position: &TrackedPosition, duration: &str) -> String {
    format!(
        "📊 Coin: #{symbol} ({timeframe})\n\
         📈 TA: {kind}\n\
         🎯 Entry: ${entry:.4}\n\
         ✅ TP: ${tp:.4}\n\
         ❌ SL: ${sl:.4}\n\
         📊 Change: {change:+.2}%\n\
         ⏳ Duration: {duration}\n\
         Status: {status}\n\
         💰 Current Price: ${price:.4}",
        symbol = position.symbol,
        timeframe = position.timeframe,
        kind = position.kind,
        entry = position.entry,
        tp = position.tp,
        sl = position.sl,
        change = position.change_pct,
        duration = duration,
        status = position.status_label(),
        price = position.current_price,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{PositionStatus, SignalKind, Symbol, Timeframe};

    fn position() -> TrackedPosition {
        TrackedPosition {
            symbol: Symbol("ETHUSDT".to_string()),
            timeframe: Timeframe::M30,
            kind: SignalKind::FuturesLong,
            entry: 2000.5,
            tp: 2010.0,
            sl: 1990.0,
            current_price: 2011.25,
            change_pct: 0.5373,
            status: PositionStatus::TpHit,
            opened_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap(),
            notified: false,
            duration: None,
        }
    }

    #[test]
    fn new_signal_message_names_the_key_and_targets() {
        let mut position = position();
        position.status = PositionStatus::Tracking;
        let message = new_signal_message(&position);
        assert!(message.contains("#ETHUSDT (30m)"));
        assert!(message.contains("FUTURES LONG"));
        assert!(message.contains("Entry: $2000.5000"));
        assert!(message.contains("TP: $2010.0000"));
        assert!(message.contains("2025-06-01 08:30"));
    }

    #[test]
    fn resolution_message_reports_change_and_duration() {
        let message = resolution_message(&position(), "2h 15m");
        assert!(message.contains("Change: +0.54%"));
        assert!(message.contains("Duration: 2h 15m"));
        assert!(message.contains("Status: TP hit"));
    }
}
