use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Order Scheduling Metadata
// ============================================================================

/// Minutes between admission and the promised delivery time.
pub const PROMISED_DELIVERY_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSchedule {
    pub created_at: DateTime<Utc>,
    pub promised_delivery_at: DateTime<Utc>,
}

pub fn promised_delivery_offset() -> Duration {
    Duration::minutes(PROMISED_DELIVERY_MINUTES)
}

/// Timestamps for an order admitted at `now`. Flat wall-clock offset, no
/// calendar or timezone adjustment.
pub fn stamp(now: DateTime<Utc>) -> OrderSchedule {
    OrderSchedule {
        created_at: now,
        promised_delivery_at: now + promised_delivery_offset(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_promised_delivery_is_thirty_minutes_later() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let schedule = stamp(now);

        assert_eq!(schedule.created_at, now);
        assert_eq!(
            schedule.promised_delivery_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_offset_crosses_day_boundary_without_adjustment() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 45, 0).unwrap();
        let schedule = stamp(now);

        assert_eq!(
            schedule.promised_delivery_at,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 15, 0).unwrap()
        );
        assert_eq!(schedule.promised_delivery_at - schedule.created_at, Duration::minutes(30));
    }
}
