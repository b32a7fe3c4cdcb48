//! # Temporal Types
//!
//! Two notions of time appear in plan configuration:
//!
//! - **Audit instants** (`publishedAt`, `createdAt`, `generatedAt`) are
//!   [`Timestamp`]s: UTC-only, truncated to seconds, rendered as
//!   `YYYY-MM-DDTHH:MM:SSZ`.
//! - **Effective dates** are calendar days. A policy or plan version is in
//!   force over an [`EffectiveWindow`] `[from, to?]`, inclusive on both ends,
//!   open-ended when `to` is absent.

use chrono::{DateTime, NaiveDate, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string, converting any offset to UTC.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| ValidationError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The UTC calendar day this instant falls on.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ---------------------------------------------------------------------------
// EffectiveWindow
// ---------------------------------------------------------------------------

/// An inclusive calendar window `[from, to?]`.
///
/// Construction through [`EffectiveWindow::new`] rejects `to < from`.
/// Deserialization does not validate, so windows read from storage that
/// predate the check can still be loaded and reported on by readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveWindow {
    /// First day in force.
    pub effective_from: NaiveDate,
    /// Last day in force; open-ended when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
}

impl EffectiveWindow {
    /// Build a window, rejecting inverted ranges.
    pub fn new(from: NaiveDate, to: Option<NaiveDate>) -> Result<Self, ValidationError> {
        let window = Self {
            effective_from: from,
            effective_to: to,
        };
        window.validate()?;
        Ok(window)
    }

    /// An open-ended window starting at `from`.
    pub fn starting(from: NaiveDate) -> Self {
        Self {
            effective_from: from,
            effective_to: None,
        }
    }

    /// Check `to >= from` when both are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.effective_to {
            Some(to) if to < self.effective_from => Err(ValidationError::InvertedDateRange {
                from: self.effective_from,
                to,
            }),
            _ => Ok(()),
        }
    }

    /// Whether the window starts after `day`.
    pub fn starts_after(&self, day: NaiveDate) -> bool {
        self.effective_from > day
    }

    /// Whether the window ended before `day`.
    pub fn ended_before(&self, day: NaiveDate) -> bool {
        self.effective_to.map_or(false, |to| to < day)
    }
}
