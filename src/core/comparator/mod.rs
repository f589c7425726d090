//! # Comparator Module
//!
//! Decides whether two files are duplicates.
//!
//! ## Strategies
//! | Method      | Match when                                                     |
//! |-------------|----------------------------------------------------------------|
//! | `Exact`     | same size and same content digest                              |
//! | `Histogram` | aspect ratios within tolerance and histogram RMS below threshold |
//!
//! Both strategies read file attributes through the shared
//! [`AttributeCache`], so each file is stat'ed, digested or decoded at most
//! once per run no matter how many pairs it takes part in.

mod traits;

pub use traits::PairComparator;

use crate::core::cache::AttributeCache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Default RMS threshold for histogram matches
pub const DEFAULT_RMS_THRESHOLD: f64 = 0.001;

/// Default relative aspect-ratio tolerance
pub const DEFAULT_ASPECT_FUZZINESS: f64 = 0.05;

/// Tunable limits for the histogram strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Maximum relative difference in width/height ratio
    pub aspect_fuzziness: f64,
    /// Histograms match when their RMS deviation is strictly below this
    pub rms_threshold: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            aspect_fuzziness: DEFAULT_ASPECT_FUZZINESS,
            rms_threshold: DEFAULT_RMS_THRESHOLD,
        }
    }
}

/// Available comparison strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComparisonMethod {
    /// Byte-identical files
    #[default]
    Exact,
    /// Visually similar images
    Histogram,
}

impl ComparisonMethod {
    /// Compare two files with this strategy
    pub fn compare(
        self,
        first: &Path,
        second: &Path,
        tolerance: &Tolerance,
        cache: &AttributeCache,
    ) -> bool {
        match self {
            ComparisonMethod::Exact => compare_exactly(first, second, tolerance, cache),
            ComparisonMethod::Histogram => compare_histograms(first, second, tolerance, cache),
        }
    }

    /// Human-readable description of the strategy
    pub fn description(&self) -> &'static str {
        match self {
            ComparisonMethod::Exact => "Exact - same size and same content digest",
            ComparisonMethod::Histogram => {
                "Histogram - similar aspect ratio and color distribution"
            }
        }
    }
}

impl fmt::Display for ComparisonMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonMethod::Exact => write!(f, "exact"),
            ComparisonMethod::Histogram => write!(f, "histogram"),
        }
    }
}

/// True when both files have the same size and content digest.
///
/// Sizes are compared first so differing files are rejected without being read.
/// `tolerance` is unused; it keeps the signature shared with the histogram strategy.
pub fn compare_exactly(
    first: &Path,
    second: &Path,
    _tolerance: &Tolerance,
    cache: &AttributeCache,
) -> bool {
    let same_size = match (cache.size(first), cache.size(second)) {
        (Ok(a), Ok(b)) => a == b,
        (Err(e), _) | (_, Err(e)) => {
            debug!(error = %e, "size unavailable, treating pair as different");
            return false;
        }
    };

    if !same_size {
        return false;
    }

    match (cache.digest(first), cache.digest(second)) {
        (Ok(a), Ok(b)) => a == b,
        (Err(e), _) | (_, Err(e)) => {
            debug!(error = %e, "digest unavailable, treating pair as different");
            false
        }
    }
}

/// True when both images have roughly the same aspect ratio and their
/// histograms deviate by less than `tolerance.rms_threshold`.
///
/// Files that cannot be decoded never match.
pub fn compare_histograms(
    first: &Path,
    second: &Path,
    tolerance: &Tolerance,
    cache: &AttributeCache,
) -> bool {
    let (a, b) = match (cache.signature(first), cache.signature(second)) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            debug!(error = %e, "decode failed, treating pair as different");
            return false;
        }
    };

    if a.aspect_difference(&b) > tolerance.aspect_fuzziness {
        return false;
    }

    a.rms_deviation(&b) < tolerance.rms_threshold
}

/// A strategy bound to its parameters and the run's cache
pub struct Comparator<'a> {
    method: ComparisonMethod,
    tolerance: Tolerance,
    cache: &'a AttributeCache,
}

impl<'a> Comparator<'a> {
    pub fn new(method: ComparisonMethod, tolerance: Tolerance, cache: &'a AttributeCache) -> Self {
        Self {
            method,
            tolerance,
            cache,
        }
    }

    pub fn method(&self) -> ComparisonMethod {
        self.method
    }
}

impl PairComparator for Comparator<'_> {
    fn matches(&self, first: &Path, second: &Path) -> bool {
        self.method.compare(first, second, &self.tolerance, self.cache)
    }
}
