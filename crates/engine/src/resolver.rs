// In crates/engine/src/resolver.rs

use chrono::{DateTime, Utc};
use core_types::{PositionStatus, Side, TrackedPosition};

/// The outcome of one resolution pass over a tracked position.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Whether the position stays in the open set.
    pub still_open: bool,
    pub position: TrackedPosition,
}

/// Advances one position against the latest observed price.
///
/// Pure over its inputs: no clock reads, no I/O. `latest_price` is `None`
/// when the fetch failed this cycle; the position is marked `Error` and
/// retained, so a transient outage never silently drops it.
pub fn resolve(
    mut position: TrackedPosition,
    latest_price: Option<f64>,
    now: DateTime<Utc>,
) -> Resolution {
    // Already terminal and accounted for: leave it untouched so re-resolving
    // can never double-notify or double-count.
    if position.status.is_terminal() && position.notified {
        return Resolution {
            still_open: false,
            position,
        };
    }

    let Some(latest) = latest_price else {
        position.status = PositionStatus::Error;
        return Resolution {
            still_open: true,
            position,
        };
    };

    let Some(side) = position.kind.side() else {
        // A NoSignal kind can only appear through a corrupted document.
        position.status = PositionStatus::Error;
        return Resolution {
            still_open: true,
            position,
        };
    };

    position.current_price = latest;
    position.duration = Some(format_duration(position.opened_at, now));
    position.change_pct = match side {
        Side::Long => (latest - position.entry) / position.entry * 100.0,
        Side::Short => (position.entry - latest) / position.entry * 100.0,
    };

    let tp_hit = match side {
        Side::Long => latest >= position.tp,
        Side::Short => latest <= position.tp,
    };
    let sl_hit = match side {
        Side::Long => latest <= position.sl,
        Side::Short => latest >= position.sl,
    };

    if tp_hit {
        position.status = PositionStatus::TpHit;
        Resolution {
            still_open: false,
            position,
        }
    } else if sl_hit {
        position.status = PositionStatus::SlHit;
        Resolution {
            still_open: false,
            position,
        }
    } else {
        position.status = PositionStatus::Tracking;
        Resolution {
            still_open: true,
            position,
        }
    }
}

/// How long a position has been open, as "Xd Yh Zm" with the day part
/// omitted when zero.
pub fn format_duration(opened_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - opened_at).max(chrono::Duration::zero());
    let days = elapsed.num_days();
    let hours = elapsed.num_hours() % 24;
    let minutes = elapsed.num_minutes() % 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use core_types::{SignalKind, Symbol, Timeframe};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn long_position() -> TrackedPosition {
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
            opened_at: t0(),
            notified: false,
            duration: None,
        }
    }

    fn short_position() -> TrackedPosition {
        TrackedPosition {
            kind: SignalKind::SpotShort,
            tp: 95.0,
            sl: 103.0,
            ..long_position()
        }
    }

    #[test]
    fn long_reaching_tp_closes_the_position() {
        let resolution = resolve(long_position(), Some(111.0), t0() + Duration::hours(2));
        assert!(!resolution.still_open);
        assert_eq!(resolution.position.status, PositionStatus::TpHit);
        assert_eq!(resolution.position.current_price, 111.0);
        assert!((resolution.position.change_pct - 11.0).abs() < 1e-9);
    }

    #[test]
    fn long_between_targets_keeps_tracking_with_change_pct() {
        let resolution = resolve(long_position(), Some(97.0), t0() + Duration::hours(2));
        assert!(resolution.still_open);
        assert_eq!(resolution.position.status, PositionStatus::Tracking);
        assert!((resolution.position.change_pct + 3.0).abs() < 1e-9);
        assert_eq!(resolution.position.status_label(), "Tracking (-3.00%)");
        assert_eq!(resolution.position.duration.as_deref(), Some("2h 0m"));
    }

    #[test]
    fn long_hitting_sl_closes_the_position() {
        let resolution = resolve(long_position(), Some(94.5), t0());
        assert!(!resolution.still_open);
        assert_eq!(resolution.position.status, PositionStatus::SlHit);
    }

    #[test]
    fn short_comparisons_are_mirrored() {
        let tp = resolve(short_position(), Some(94.0), t0());
        assert_eq!(tp.position.status, PositionStatus::TpHit);
        assert!(!tp.still_open);
        assert!((tp.position.change_pct - 6.0).abs() < 1e-9);

        let sl = resolve(short_position(), Some(104.0), t0());
        assert_eq!(sl.position.status, PositionStatus::SlHit);
        assert!(!sl.still_open);

        let tracking = resolve(short_position(), Some(99.0), t0());
        assert!(tracking.still_open);
        assert_eq!(tracking.position.status, PositionStatus::Tracking);
    }

    #[test]
    fn fetch_failure_marks_error_but_keeps_the_position() {
        let resolution = resolve(long_position(), None, t0());
        assert!(resolution.still_open);
        assert_eq!(resolution.position.status, PositionStatus::Error);
        // Untouched price fields.
        assert_eq!(resolution.position.current_price, 100.0);
    }

    #[test]
    fn terminal_notified_positions_are_idempotent() {
        let mut position = long_position();
        position.status = PositionStatus::TpHit;
        position.notified = true;
        position.current_price = 111.0;

        // Any later price, even one through the stop, changes nothing.
        let resolution = resolve(position.clone(), Some(10.0), t0() + Duration::days(1));
        assert!(!resolution.still_open);
        assert_eq!(resolution.position, position);
    }

    #[test]
    fn duration_omits_the_day_part_when_zero() {
        let now = t0() + Duration::hours(5) + Duration::minutes(3);
        assert_eq!(format_duration(t0(), now), "5h 3m");

        let later = t0() + Duration::days(2) + Duration::hours(1);
        assert_eq!(format_duration(t0(), later), "2d 1h 0m");
    }
}
