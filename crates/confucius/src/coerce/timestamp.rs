//! Timestamp layouts.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Layout used to parse timestamp fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimeLayout {
    /// RFC 3339, e.g. `2020-01-01T12:00:00Z`.
    #[default]
    Rfc3339,
    /// A `chrono` strftime pattern, e.g. `%m-%d-%Y`.
    ///
    /// Patterns without an offset are read as UTC; date-only patterns yield
    /// midnight UTC.
    Format(String),
}

impl TimeLayout {
    /// Build a layout from a strftime pattern.
    pub fn format(pattern: impl Into<String>) -> Self {
        Self::Format(pattern.into())
    }

    /// Parse `raw` according to this layout.
    pub fn parse(&self, raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        let pattern = match self {
            Self::Rfc3339 => {
                return DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc));
            }
            Self::Format(pattern) => pattern.as_str(),
        };

        let offset_err = match DateTime::parse_from_str(raw, pattern) {
            Ok(dt) => return Ok(dt.with_timezone(&Utc)),
            Err(e) => e,
        };
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
        if let Some(midnight) = NaiveDate::parse_from_str(raw, pattern)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
        Err(offset_err)
    }
}

impl fmt::Display for TimeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rfc3339 => f.write_str("RFC 3339"),
            Self::Format(pattern) => write!(f, "{pattern:?}"),
        }
    }
}
