//! # Error Types: Field-Level Validation
//!
//! Validation failures raised by the constructors in this crate. Service
//! crates wrap these in their own error enums; the API maps them to 422.

use chrono::NaiveDate;
use thiserror::Error;

/// A value failed structural validation at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An identifier was empty or whitespace-only.
    #[error("invalid {kind}: must be non-empty")]
    EmptyIdentifier {
        /// Which identifier namespace was being constructed.
        kind: &'static str,
    },

    /// An identifier exceeded the maximum permitted length.
    #[error("invalid {kind}: {len} characters exceeds maximum of {max}")]
    IdentifierTooLong {
        /// Which identifier namespace was being constructed.
        kind: &'static str,
        /// Actual length.
        len: usize,
        /// Maximum length.
        max: usize,
    },

    /// Plan version numbers start at 1.
    #[error("plan version must be a positive integer, got {0}")]
    NonPositiveVersion(i64),

    /// `effectiveTo` precedes `effectiveFrom`.
    #[error("effective to date {to} must not be before effective from date {from}")]
    InvertedDateRange {
        /// Window start.
        from: NaiveDate,
        /// Window end.
        to: NaiveDate,
    },

    /// A percentage field exceeded 100.
    #[error("{field} percentage cannot exceed 100%, got {value}")]
    PercentOutOfRange {
        /// Field name as seen by the caller.
        field: &'static str,
        /// Offending value.
        value: u32,
    },

    /// A numeric field was below its minimum.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        /// Field name as seen by the caller.
        field: &'static str,
        /// Minimum accepted value.
        min: u32,
        /// Offending value.
        value: u32,
    },

    /// Timestamp string is not valid RFC 3339.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
