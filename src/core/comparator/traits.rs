//! Trait seam between the search engine and comparison strategies.

use std::path::Path;

/// Decides whether two files form a match.
///
/// Implementations are called from worker threads and must not fail:
/// anything that goes wrong while comparing a pair means "no match".
pub trait PairComparator: Sync {
    fn matches(&self, first: &Path, second: &Path) -> bool;
}

impl<F> PairComparator for F
where
    F: Fn(&Path, &Path) -> bool + Sync,
{
    fn matches(&self, first: &Path, second: &Path) -> bool {
        self(first, second)
    }
}
