//! Timestamp utilities
//!
//! Record timestamps are stored as fixed-width RFC 3339 text (millisecond
//! precision, `Z` suffix) so that text comparison in SQL matches time order.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for storage
pub fn to_storage(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp
pub fn from_storage(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid stored timestamp '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[tokio::test]
    async fn test_now_successive_calls_advance() {
        let time1 = now();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let time2 = now();
        assert!(time2 > time1);
    }

    #[test]
    fn test_storage_format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        assert_eq!(to_storage(whole), "2024-03-01T08:00:00.000Z");

        let later = whole + chrono::Duration::milliseconds(1500);
        assert_eq!(to_storage(later), "2024-03-01T08:00:01.500Z");
        assert!(to_storage(whole) < to_storage(later));
    }

    #[test]
    fn test_storage_roundtrip_keeps_millis() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(from_storage(&to_storage(ts)).unwrap(), ts);
    }

    #[test]
    fn test_from_storage_rejects_garbage() {
        assert!(matches!(from_storage("yesterday"), Err(Error::Internal(_))));
    }
}
