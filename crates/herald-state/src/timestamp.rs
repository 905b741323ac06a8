// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unix-second (de)serializers for state timestamps.
//!
//! Timestamps are written as whole seconds. Reading also accepts the
//! fractional seconds older state files contain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
    Whole(i64),
    Fractional(f64),
}

impl Seconds {
    fn into_datetime(self) -> Option<DateTime<Utc>> {
        match self {
            Seconds::Whole(secs) => DateTime::from_timestamp(secs, 0),
            Seconds::Fractional(secs) if secs.is_finite() => {
                let whole = secs.floor();
                let nanos = ((secs - whole) * 1e9) as u32;
                DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
            }
            Seconds::Fractional(_) => None,
        }
    }
}

pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(dt.timestamp())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    Seconds::deserialize(deserializer)?
        .into_datetime()
        .ok_or_else(|| D::Error::custom("timestamp out of range"))
}

/// Same encoding for optional timestamps; `null` maps to `None`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        dt: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => serializer.serialize_some(&dt.timestamp()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<Seconds>::deserialize(deserializer)? {
            Some(secs) => secs
                .into_datetime()
                .map(Some)
                .ok_or_else(|| D::Error::custom("timestamp out of range")),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Stamp {
        #[serde(with = "super")]
        at: DateTime<Utc>,
        #[serde(with = "super::option", default)]
        until: Option<DateTime<Utc>>,
    }

    #[test]
    fn writes_whole_seconds() {
        let stamp = Stamp {
            at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            until: None,
        };
        let json = serde_json::to_string(&stamp).unwrap();
        assert_eq!(json, r#"{"at":1700000000,"until":null}"#);
    }

    #[test]
    fn reads_fractional_seconds() {
        let stamp: Stamp = serde_json::from_str(r#"{"at":1700000000.75,"until":1700000100.5}"#).unwrap();
        assert_eq!(stamp.at.timestamp(), 1_700_000_000);
        assert_eq!(stamp.at.timestamp_subsec_millis(), 750);
        assert_eq!(stamp.until.map(|u| u.timestamp()), Some(1_700_000_100));
    }

    #[test]
    fn missing_optional_is_none() {
        let stamp: Stamp = serde_json::from_str(r#"{"at":0}"#).unwrap();
        assert!(stamp.until.is_none());
    }
}
