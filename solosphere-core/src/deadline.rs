//! Deadline wire format
//!
//! Deadlines travel and are stored as RFC 3339 UTC strings with millisecond
//! precision (`2025-01-31T00:00:00.000Z`). The fixed width keeps the stored
//! text in chronological order under a byte-wise comparison, which is what
//! the stores sort on. Any RFC 3339 input is accepted and normalized.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Render a deadline in the canonical stored form
pub fn format(deadline: &DateTime<Utc>) -> String {
    deadline.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse any RFC 3339 timestamp into UTC
pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

/// Re-render a raw deadline string in canonical form
pub fn normalize(raw: &str) -> Result<String, chrono::ParseError> {
    parse(raw).map(|dt| format(&dt))
}

pub fn serialize<S>(deadline: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(deadline))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

/// Same format for optional deadlines (records created through an upsert
/// may not carry one)
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(deadline: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match deadline {
            Some(dt) => super::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(format(&whole), "2025-01-31T00:00:00.000Z");
    }

    #[test]
    fn test_normalize_converts_offsets_to_utc() {
        let normalized = normalize("2025-01-31T02:30:00+02:00").unwrap();
        assert_eq!(normalized, "2025-01-31T00:30:00.000Z");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize("next tuesday").is_err());
    }

    #[test]
    fn test_canonical_text_sorts_chronologically() {
        let earlier = normalize("2025-01-31T00:00:00.5Z").unwrap();
        let later = normalize("2025-01-31T00:00:01Z").unwrap();
        assert!(earlier < later);
    }
}
