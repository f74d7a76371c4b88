use std::fmt;

use chrono::{DateTime, NaiveDateTime, ParseError, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Minute precision with a trailing UTC marker, as NVD sends for CPEs.
const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%MZ";
/// Second precision without a zone, as CIRCL sends for CVEs. Fractional
/// seconds are optional and only written when non-zero.
const SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Resolution of the source string a [`Timestamp`] was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    Minute,
    #[default]
    Second,
}

/// Date-time decoded from the upstream services.
///
/// NIST and CIRCL do not agree on one format, so two layouts are accepted:
/// `YYYY-MM-DDTHH:MMZ` and `YYYY-MM-DDTHH:MM:SS`. The zone-less layout is
/// read as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub instant: DateTime<Utc>,
    pub precision: Precision,
}

impl Timestamp {
    /// Parse a date-time string, with or without surrounding quotes.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let normalized = input.trim_matches('"');

        let (format, precision) = if normalized.ends_with('Z') {
            (MINUTE_FORMAT, Precision::Minute)
        } else {
            (SECOND_FORMAT, Precision::Second)
        };

        let parsed = NaiveDateTime::parse_from_str(normalized, format)?;
        Ok(Self {
            instant: parsed.and_utc(),
            precision,
        })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            Precision::Minute => write!(f, "{}", self.instant.format(MINUTE_FORMAT)),
            Precision::Second => write!(f, "{}", self.instant.format(SECOND_FORMAT)),
        }
    }
}

struct TimestampVisitor;

impl Visitor<'_> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a date-time string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Timestamp, E> {
        Timestamp::parse(value)
            .map_err(|e| E::custom(format!("invalid timestamp {value:?}: {e}")))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(TimestampVisitor)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
