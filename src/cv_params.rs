//! Controlled Vocabulary (CV) parameter handling for mzML
//!
//! mzML annotates records with CV terms from the PSI-MS ontology. Each term
//! carries a human-readable name, a stable accession, an optional value and
//! an optional unit. Display names drift between CV releases, so every
//! lookup below exists in two flavors: by name (the primary path) and by
//! accession (the unambiguous fallback).

use serde::{Deserialize, Serialize};

/// A controlled vocabulary parameter from mzML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvParam {
    /// CV reference (e.g., "MS" for PSI-MS)
    pub cv_ref: String,

    /// Accession number (e.g., "MS:1000511")
    pub accession: String,

    /// Human-readable name
    pub name: String,

    /// Optional value
    pub value: Option<String>,

    /// Unit CV reference
    pub unit_cv_ref: Option<String>,

    /// Unit accession
    pub unit_accession: Option<String>,

    /// Unit name
    pub unit_name: Option<String>,
}

impl CvParam {
    /// Get the value as f64 if possible
    pub fn value_as_f64(&self) -> Option<f64> {
        self.value.as_ref()?.parse().ok()
    }

    /// Get the value as i64 if possible
    pub fn value_as_i64(&self) -> Option<i64> {
        self.value.as_ref()?.parse().ok()
    }

    /// Check if this is a boolean CV param (no value means true)
    pub fn is_flag(&self) -> bool {
        self.value.is_none()
    }
}

/// PSI-MS accessions understood by this crate
pub mod accessions {
    // Spectrum-level annotation

    /// MS level
    pub const MS_LEVEL: &str = "MS:1000511";

    /// Lowest observed m/z
    pub const LOWEST_OBSERVED_MZ: &str = "MS:1000528";

    /// Highest observed m/z
    pub const HIGHEST_OBSERVED_MZ: &str = "MS:1000527";

    /// Total ion current
    pub const TOTAL_ION_CURRENT: &str = "MS:1000285";

    /// Base peak m/z
    pub const BASE_PEAK_MZ: &str = "MS:1000504";

    /// Base peak intensity
    pub const BASE_PEAK_INTENSITY: &str = "MS:1000505";

    // Scan annotation

    /// Scan start time (retention time)
    pub const SCAN_START_TIME: &str = "MS:1000016";

    // Precursor / selected ion annotation

    /// Selected ion m/z
    pub const SELECTED_ION_MZ: &str = "MS:1000744";

    /// Peak intensity (of the selected ion)
    pub const PEAK_INTENSITY: &str = "MS:1000042";

    // Binary data encoding

    /// 32-bit float
    pub const FLOAT_32_BIT: &str = "MS:1000521";

    /// 64-bit float
    pub const FLOAT_64_BIT: &str = "MS:1000523";

    /// zlib compression
    pub const ZLIB_COMPRESSION: &str = "MS:1000574";

    /// No compression
    pub const NO_COMPRESSION: &str = "MS:1000576";

    // Binary array roles

    /// m/z array
    pub const MZ_ARRAY: &str = "MS:1000514";

    /// Intensity array
    pub const INTENSITY_ARRAY: &str = "MS:1000515";

    /// Time array
    pub const TIME_ARRAY: &str = "MS:1000595";
}

/// Find a parameter by display name. Duplicate names resolve to the
/// last occurrence in document order.
pub fn param_by_name<'a>(params: &'a [CvParam], name: &str) -> Option<&'a CvParam> {
    params.iter().rev().find(|p| p.name == name)
}

/// Find a parameter by accession (first occurrence in document order).
pub fn param_by_accession<'a>(params: &'a [CvParam], accession: &str) -> Option<&'a CvParam> {
    params.iter().find(|p| p.accession == accession)
}

/// Name-first lookup with an accession fallback for CV releases that
/// renamed the term.
pub fn lookup<'a>(params: &'a [CvParam], name: &str, accession: &str) -> Option<&'a CvParam> {
    param_by_name(params, name).or_else(|| param_by_accession(params, accession))
}

/// Extract a parameter value as f64 by accession
pub fn f64_by_accession(params: &[CvParam], accession: &str) -> Option<f64> {
    param_by_accession(params, accession).and_then(CvParam::value_as_f64)
}

/// Check whether a parameter with the given accession is present
pub fn has_param(params: &[CvParam], accession: &str) -> bool {
    params.iter().any(|p| p.accession == accession)
}
