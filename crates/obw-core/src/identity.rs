//! # Identity Newtypes
//!
//! Domain-primitive newtypes for the identifiers that cross the engine
//! boundary. Each identifier is a distinct type: a [`CategoryId`] cannot be
//! passed where a [`ServiceCode`] is expected.
//!
//! ## Validation
//!
//! String identifiers must be non-empty after trimming and at most 128
//! characters. Category ids follow the `CAT\d{3}` convention in reference
//! master data, but that is an external convention: this crate only checks
//! shape, existence is checked against master data by the engine.
//!
//! [`PlanVersionNumber`] is a positive integer; zero is rejected.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MAX_IDENTIFIER_LEN: usize = 128;

/// Deserialize through the validating constructor so that invalid values are
/// rejected at deserialization time, not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident, $raw:ty) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = <$raw>::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

macro_rules! string_identifier {
    ($(#[$meta:meta])* $ty:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $ty(String);

        impl_validating_deserialize!($ty, String);

        impl $ty {
            /// Construct from a string, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError`] if the value is empty or too long.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let raw = value.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::EmptyIdentifier { kind: $kind });
                }
                if trimmed.len() > MAX_IDENTIFIER_LEN {
                    return Err(ValidationError::IdentifierTooLong {
                        kind: $kind,
                        len: trimmed.len(),
                        max: MAX_IDENTIFIER_LEN,
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Access the identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

string_identifier!(
    /// Identifier of a corporate policy.
    PolicyId,
    "policy id"
);

string_identifier!(
    /// Identifier of a member (the user an assignment links to a policy).
    UserId,
    "user id"
);

string_identifier!(
    /// Identifier of a service category in master data (e.g. `CAT001`).
    CategoryId,
    "category id"
);

string_identifier!(
    /// Code of a service in master data (e.g. `CONSULT_GP`).
    ServiceCode,
    "service code"
);

// ---------------------------------------------------------------------------
// PlanVersionNumber
// ---------------------------------------------------------------------------

/// A plan version number within one policy.
///
/// Versions form a dense sequence starting at 1, assigned at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PlanVersionNumber(u32);

impl_validating_deserialize!(PlanVersionNumber, i64);

impl PlanVersionNumber {
    /// The first version of every policy.
    pub const FIRST: Self = Self(1);

    /// Construct a version number, rejecting zero and negatives.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value < 1 || value > i64::from(u32::MAX) {
            return Err(ValidationError::NonPositiveVersion(value));
        }
        Ok(Self(value as u32))
    }

    /// The raw number.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PlanVersionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PlanVersionNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::NonPositiveVersion(0))?;
        Self::new(n)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every positive value round-trips through the constructor.
        #[test]
        fn version_number_accepts_all_positive(n in 1i64..=i64::from(u32::MAX)) {
            let v = PlanVersionNumber::new(n).unwrap();
            prop_assert_eq!(i64::from(v.get()), n);
        }

        /// Non-positive values are always rejected.
        #[test]
        fn version_number_rejects_non_positive(n in i64::MIN..=0i64) {
            prop_assert!(PlanVersionNumber::new(n).is_err());
        }
    }
}
