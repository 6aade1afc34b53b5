//! Timestamp wire format.
//!
//! Beehive exchanges date-times as ISO-8601 with a numeric offset, e.g.
//! `2016-06-05T13:00:00+09:00`. Fractional seconds are written only when
//! non-zero. Use with `#[serde(with = "wire_time")]`, or
//! `#[serde(with = "wire_time::option")]` for nullable fields.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{de, Deserialize, Deserializer, Serializer};

/// Formats `value` the way the server expects.
pub fn format(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parses an offset date-time. Zone names and epoch numbers are rejected.
pub fn parse(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
}

pub fn serialize<S: Serializer>(value: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| de::Error::custom(format_args!("invalid date-time {raw:?}: {e}")))
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<FixedOffset>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                parse(&raw)
                    .map_err(|e| de::Error::custom(format_args!("invalid date-time {raw:?}: {e}")))
            })
            .transpose()
    }
}
