//! The date-time value object and its null sentinel.
//!
//! Attributes whose name ends in `_at` or `_on` are never exposed as raw
//! scalars: reads yield a `DateTime`, and a missing value yields
//! `DateTime::Null`, which renders as nothing and is substitutable anywhere
//! a real date is expected.

use std::fmt;

use chrono::NaiveDateTime;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, TypeError};

/// Canonical storage format for date-time text.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed human-readable format used by `Display`.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %I:%M %P";

/// A point in time, or the null-date sentinel.
///
/// `Null` orders before every real date and formats to nothing, so calling
/// code never needs a special case for "no date".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateTime {
    /// The null-date sentinel: "no date".
    Null,
    /// A concrete point in time.
    At(NaiveDateTime),
}

impl DateTime {
    /// The current local time.
    pub fn now() -> Self {
        DateTime::At(chrono::Local::now().naive_local())
    }

    /// Parse date-time text.
    ///
    /// Accepts the canonical storage format, a bare date (midnight), and the
    /// `T`-separated variant. Blank input parses to the null sentinel;
    /// anything else unparseable is a type error.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(DateTime::Null);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, STORAGE_FORMAT) {
            return Ok(DateTime::At(dt));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
            return Ok(DateTime::At(dt));
        }
        if let Ok(d) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(DateTime::At(d.and_hms_opt(0, 0, 0).unwrap_or_default()));
        }
        Err(Error::Type(TypeError {
            expected: "date-time text",
            actual: raw.to_string(),
            field: None,
        }))
    }

    /// Check if this is the null sentinel.
    pub const fn is_null(&self) -> bool {
        matches!(self, DateTime::Null)
    }

    /// The underlying point in time, if any.
    pub const fn naive(&self) -> Option<NaiveDateTime> {
        match self {
            DateTime::Null => None,
            DateTime::At(dt) => Some(*dt),
        }
    }

    /// Render with a strftime format string; `None` for the null sentinel.
    pub fn format(&self, fmt: &str) -> Option<String> {
        self.naive().map(|dt| dt.format(fmt).to_string())
    }

    /// Render in the canonical storage format; `None` for the null sentinel.
    pub fn to_storage(&self) -> Option<String> {
        self.format(STORAGE_FORMAT)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format(DISPLAY_FORMAT) {
            Some(s) => f.write_str(&s),
            None => Ok(()),
        }
    }
}

impl From<NaiveDateTime> for DateTime {
    fn from(dt: NaiveDateTime) -> Self {
        DateTime::At(dt)
    }
}

impl Serialize for DateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_storage() {
            Some(s) => serializer.serialize_str(&s),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => DateTime::parse(&s).map_err(D::Error::custom),
            None => Ok(DateTime::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_storage_format() {
        let dt = DateTime::parse("2024-03-01 12:30:00").unwrap();
        assert_eq!(dt.to_storage().as_deref(), Some("2024-03-01 12:30:00"));
    }

    #[test]
    fn parse_bare_date_is_midnight() {
        let dt = DateTime::parse("2024-03-01").unwrap();
        assert_eq!(dt.to_storage().as_deref(), Some("2024-03-01 00:00:00"));
    }

    #[test]
    fn parse_blank_is_null() {
        assert!(DateTime::parse("").unwrap().is_null());
        assert!(DateTime::parse("   ").unwrap().is_null());
    }

    #[test]
    fn parse_garbage_is_error() {
        assert!(DateTime::parse("next tuesday").is_err());
    }

    #[test]
    fn null_formats_to_nothing() {
        assert_eq!(DateTime::Null.format(STORAGE_FORMAT), None);
        assert_eq!(DateTime::Null.to_storage(), None);
        assert_eq!(DateTime::Null.to_string(), "");
    }

    #[test]
    fn null_orders_before_any_date() {
        let dt = DateTime::parse("1970-01-01").unwrap();
        assert!(DateTime::Null < dt);
    }

    #[test]
    fn display_uses_fixed_format() {
        let dt = DateTime::parse("2024-03-01 18:05:00").unwrap();
        assert_eq!(dt.to_string(), "2024-03-01 06:05 pm");
    }

    #[test]
    fn serde_round_trip() {
        let dt = DateTime::parse("2024-03-01 12:00:00").unwrap();
        let json = serde_json::to_string(&dt).unwrap();
        assert_eq!(json, "\"2024-03-01 12:00:00\"");
        let back: DateTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dt);
    }
}
