//! # Benefit Kinds: Single Source of Truth
//!
//! Defines the `BenefitKind` enum with the eight outpatient benefit kinds a
//! plan version can enable, and the versioned reference table that maps each
//! kind to the master-data categories it brings into coverage scope.
//!
//! Every `match` on `BenefitKind` is exhaustive: adding a ninth kind is a
//! compile error until defaults, normalization and the category table all
//! handle it.
//!
//! ## Benefit → Category Table (v1)
//!
//! | Kind | Categories |
//! |------|------------|
//! | consultation | CAT001 (clinic consult), CAT005 (online consult) |
//! | pharmacy | CAT002 |
//! | diagnostics | CAT003 (diagnostic), CAT004 (laboratory) |
//! | ahc | CAT008 |
//! | vaccination | CAT008 |
//! | dental | CAT006 |
//! | vision | CAT007 |
//! | wellness | CAT008 |

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Outpatient benefit kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BenefitKind {
    /// Doctor consultations, in clinic or online.
    Consultation,
    /// Prescription and OTC medicines.
    Pharmacy,
    /// Diagnostic imaging and laboratory tests.
    Diagnostics,
    /// Annual health check.
    Ahc,
    /// Vaccinations.
    Vaccination,
    /// Dental care.
    Dental,
    /// Vision care.
    Vision,
    /// Wellness programmes.
    Wellness,
}

/// Number of benefit kinds.
pub const BENEFIT_KIND_COUNT: usize = 8;

/// Version tag of the benefit→category table below.
pub const BENEFIT_CATEGORY_TABLE_VERSION: &str = "v1";

/// The benefit→category reference table, version 1.
pub const BENEFIT_CATEGORY_TABLE_V1: [(BenefitKind, &[&str]); BENEFIT_KIND_COUNT] = [
    (BenefitKind::Consultation, &["CAT001", "CAT005"]),
    (BenefitKind::Pharmacy, &["CAT002"]),
    (BenefitKind::Diagnostics, &["CAT003", "CAT004"]),
    (BenefitKind::Ahc, &["CAT008"]),
    (BenefitKind::Vaccination, &["CAT008"]),
    (BenefitKind::Dental, &["CAT006"]),
    (BenefitKind::Vision, &["CAT007"]),
    (BenefitKind::Wellness, &["CAT008"]),
];

impl BenefitKind {
    /// All kinds, in canonical display order.
    pub fn all() -> &'static [BenefitKind; BENEFIT_KIND_COUNT] {
        &[
            Self::Consultation,
            Self::Pharmacy,
            Self::Diagnostics,
            Self::Ahc,
            Self::Vaccination,
            Self::Dental,
            Self::Vision,
            Self::Wellness,
        ]
    }

    /// Wire name (camelCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consultation => "consultation",
            Self::Pharmacy => "pharmacy",
            Self::Diagnostics => "diagnostics",
            Self::Ahc => "ahc",
            Self::Vaccination => "vaccination",
            Self::Dental => "dental",
            Self::Vision => "vision",
            Self::Wellness => "wellness",
        }
    }

    /// Category ids this kind brings into coverage scope (table v1).
    pub fn category_ids(&self) -> &'static [&'static str] {
        match self {
            Self::Consultation => BENEFIT_CATEGORY_TABLE_V1[0].1,
            Self::Pharmacy => BENEFIT_CATEGORY_TABLE_V1[1].1,
            Self::Diagnostics => BENEFIT_CATEGORY_TABLE_V1[2].1,
            Self::Ahc => BENEFIT_CATEGORY_TABLE_V1[3].1,
            Self::Vaccination => BENEFIT_CATEGORY_TABLE_V1[4].1,
            Self::Dental => BENEFIT_CATEGORY_TABLE_V1[5].1,
            Self::Vision => BENEFIT_CATEGORY_TABLE_V1[6].1,
            Self::Wellness => BENEFIT_CATEGORY_TABLE_V1[7].1,
        }
    }

    /// Whether the kind carries amount/visit limits and an Rx flag.
    pub fn has_limits(&self) -> bool {
        matches!(self, Self::Consultation | Self::Pharmacy | Self::Diagnostics)
    }
}

impl std::fmt::Display for BenefitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BenefitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown benefit kind: {s}"))
    }
}
