//! Date and time helpers.
//!
//! - Serde support for `DateTime<Utc>` fields of persisted credentials:
//!   written as RFC3339, read from RFC3339 or a Unix timestamp
//! - Calendar ranges used by the report queries

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Date format Zoho Books uses for every date field and filter.
pub const ZOHO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Serializes `DateTime<Utc>` as an RFC3339 string.
pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

/// Deserializes `DateTime<Utc>` from RFC3339 or Unix seconds.
///
/// Hand-edited cache files sometimes carry a bare timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TimestampOrString {
        String(String),
        I64(i64),
    }

    match TimestampOrString::deserialize(deserializer)? {
        TimestampOrString::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::custom(format!("Invalid RFC3339 timestamp: {e}"))),
        TimestampOrString::I64(ts) => {
            DateTime::from_timestamp(ts, 0).ok_or_else(|| Error::custom("Invalid Unix timestamp"))
        }
    }
}

/// First day of `date`'s month.
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// `days` days before `date`, clamped to the earliest representable date.
#[must_use]
pub fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

/// Format a date the way Zoho expects it in query parameters.
#[must_use]
pub fn zoho_date(date: NaiveDate) -> String {
    date.format(ZOHO_DATE_FORMAT).to_string()
}
