//! `DateTime` scalar: an absolute UTC instant exchanged as ISO-8601 text.

use std::fmt;

use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};
use chrono::{NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An absolute timestamp with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(chrono::DateTime<Utc>);

impl DateTime {
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Wrap a chrono timestamp, dropping anything finer than a millisecond.
    pub fn from_utc(value: chrono::DateTime<Utc>) -> Self {
        Self(value.trunc_subsecs(3))
    }

    /// Parse the accepted textual forms.
    ///
    /// RFC 3339 with any offset is normalized to UTC. A naive date-time is read as UTC,
    /// and the date-only forms `YYYY-MM-DD` and `M-D-YYYY` become midnight UTC.
    pub fn parse_str(input: &str) -> Result<Self, String> {
        let input = input.trim();

        if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(input) {
            return Ok(Self::from_utc(parsed.with_timezone(&Utc)));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Self::from_utc(Utc.from_utc_datetime(&naive)));
        }

        for format in ["%Y-%m-%d", "%m-%d-%Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(input, format) {
                if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                    return Ok(Self::from_utc(Utc.from_utc_datetime(&midnight)));
                }
            }
        }

        Err(format!("Invalid DateTime value: {:?}", input))
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn from_timestamp_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Canonical ISO-8601 form, e.g. `2018-04-15T19:09:57.308Z`.
    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl Serialize for DateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// A valid time value
#[Scalar(name = "DateTime")]
impl ScalarType for DateTime {
    fn parse(value: Value) -> InputValueResult<Self> {
        match &value {
            Value::String(s) => DateTime::parse_str(s).map_err(InputValueError::custom),
            _ => Err(InputValueError::expected_type(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_iso_string())
    }
}
