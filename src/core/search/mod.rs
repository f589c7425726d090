//! # Search Module
//!
//! Evaluates every unordered pair of files through a [`PairComparator`].
//!
//! ## Execution Modes
//! - **Sequential** - nested loops on the calling thread, no allocation of
//!   the pair list
//! - **Parallel** - the pair list is materialized, split into fixed-size
//!   chunks and evaluated on a rayon pool with one worker per available
//!   core (or an explicit worker count)
//!
//! Both modes return matches in candidate-pair order, so their results are
//! identical for the same input. For `n` files exactly `n * (n - 1) / 2`
//! pairs are evaluated.

use crate::core::comparator::PairComparator;
use crate::error::SearchError;
use crate::events::{null_sender, CompareEvent, CompareProgress, Event, EventSender};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use std::cmp;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Pairs per work unit in parallel mode
pub const DEFAULT_CHUNK_SIZE: usize = 25;

/// How candidate pairs are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

/// Configuration for the pairwise search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub mode: ExecutionMode,
    /// Pairs per chunk in parallel mode; 0 selects [`DEFAULT_CHUNK_SIZE`]
    pub chunk_size: usize,
    /// Worker threads in parallel mode; `None` uses every available core
    pub workers: Option<usize>,
}

impl SearchConfig {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn parallel() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            ..Self::default()
        }
    }

    pub fn effective_chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }

    pub fn effective_workers(&self) -> usize {
        self.workers.filter(|&w| w > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: None,
        }
    }
}

/// Two files considered for comparison; `first` precedes `second` in the file list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePair<'a> {
    pub first: &'a Path,
    pub second: &'a Path,
}

impl CandidatePair<'_> {
    fn to_match(self) -> Match {
        Match {
            first: self.first.to_path_buf(),
            second: self.second.to_path_buf(),
        }
    }
}

/// A candidate pair the comparator accepted.
///
/// Ordering is lexicographic on `(first, second)`, comparing each path as a
/// plain byte string rather than component by component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub first: PathBuf,
    pub second: PathBuf,
}

impl Ord for Match {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.first
            .as_os_str()
            .cmp(other.first.as_os_str())
            .then_with(|| self.second.as_os_str().cmp(other.second.as_os_str()))
    }
}

impl PartialOrd for Match {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Number of unordered pairs among `files` files
pub fn pair_count(files: usize) -> usize {
    files * files.saturating_sub(1) / 2
}

/// Every unordered pair of `files`, outer index before inner index
pub fn candidate_pairs(files: &[PathBuf]) -> Vec<CandidatePair<'_>> {
    let mut pairs = Vec::with_capacity(pair_count(files.len()));
    for (i, first) in files.iter().enumerate() {
        for second in &files[i + 1..] {
            pairs.push(CandidatePair { first, second });
        }
    }
    pairs
}

/// Find all matching pairs without progress reporting
pub fn find_matches(
    files: &[PathBuf],
    comparator: &dyn PairComparator,
    config: &SearchConfig,
) -> Result<Vec<Match>, SearchError> {
    find_matches_with_events(files, comparator, config, &null_sender())
}

/// Find all matching pairs, emitting compare progress events
pub fn find_matches_with_events(
    files: &[PathBuf],
    comparator: &dyn PairComparator,
    config: &SearchConfig,
    events: &EventSender,
) -> Result<Vec<Match>, SearchError> {
    let total_pairs = pair_count(files.len());

    events.send(Event::Compare(CompareEvent::Started {
        total_files: files.len(),
        total_pairs,
    }));

    let matches = match config.mode {
        ExecutionMode::Sequential => find_sequential(files, comparator, events),
        ExecutionMode::Parallel => find_parallel(files, comparator, config, events)?,
    };

    info!(
        files = files.len(),
        pairs = total_pairs,
        matches = matches.len(),
        mode = ?config.mode,
        "pairwise search finished"
    );

    events.send(Event::Compare(CompareEvent::Completed {
        total_matches: matches.len(),
    }));

    Ok(matches)
}

fn find_sequential(
    files: &[PathBuf],
    comparator: &dyn PairComparator,
    events: &EventSender,
) -> Vec<Match> {
    let total_pairs = pair_count(files.len());
    // Every 1000 comparisons or 2% of total, whichever is smaller
    let update_interval = (total_pairs / 50).clamp(1, 1000);

    let mut matches = Vec::new();
    let mut pairs_evaluated = 0;

    for (i, first) in files.iter().enumerate() {
        for second in &files[i + 1..] {
            if comparator.matches(first, second) {
                matches.push(Match {
                    first: first.clone(),
                    second: second.clone(),
                });
            }

            pairs_evaluated += 1;
            if pairs_evaluated % update_interval == 0 || pairs_evaluated == total_pairs {
                events.send(Event::Compare(CompareEvent::Progress(CompareProgress {
                    pairs_evaluated,
                    total_pairs,
                })));
            }
        }
    }

    matches
}

fn find_parallel(
    files: &[PathBuf],
    comparator: &dyn PairComparator,
    config: &SearchConfig,
    events: &EventSender,
) -> Result<Vec<Match>, SearchError> {
    let pairs = candidate_pairs(files);
    let total_pairs = pairs.len();
    if pairs.is_empty() {
        return Ok(Vec::new());
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(config.effective_workers())
        .thread_name(|i| format!("compare-{i}"))
        .build()
        .map_err(|e| SearchError::WorkerPool(e.to_string()))?;

    let evaluated = AtomicUsize::new(0);

    // Chunk results come back in chunk order, so flattening keeps pair order
    let per_chunk: Vec<Vec<Match>> = pool.install(|| {
        pairs
            .par_chunks(config.effective_chunk_size())
            .map(|chunk| {
                let found: Vec<Match> = chunk
                    .iter()
                    .filter(|pair| comparator.matches(pair.first, pair.second))
                    .map(|pair| pair.to_match())
                    .collect();

                let pairs_evaluated =
                    evaluated.fetch_add(chunk.len(), Ordering::SeqCst) + chunk.len();
                events.send(Event::Compare(CompareEvent::Progress(CompareProgress {
                    pairs_evaluated,
                    total_pairs,
                })));

                found
            })
            .collect()
    });

    Ok(per_chunk.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use std::collections::HashSet;

    fn files(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("/img/{i:03}.png"))).collect()
    }

    fn index_of(path: &Path) -> usize {
        path.file_stem().unwrap().to_str().unwrap().parse().unwrap()
    }

    /// Matches pairs whose indices share a remainder mod 7
    fn same_bucket(a: &Path, b: &Path) -> bool {
        index_of(a) % 7 == index_of(b) % 7
    }

    fn parallel(chunk_size: usize, workers: Option<usize>) -> SearchConfig {
        SearchConfig {
            mode: ExecutionMode::Parallel,
            chunk_size,
            workers,
        }
    }

    #[test]
    fn candidate_pairs_cover_each_unordered_pair_once() {
        for n in 0..=9 {
            let list = files(n);
            let pairs = candidate_pairs(&list);

            assert_eq!(pairs.len(), n * n.saturating_sub(1) / 2);
            assert_eq!(pairs.len(), pair_count(n));

            let mut seen = HashSet::new();
            for pair in &pairs {
                assert_ne!(pair.first, pair.second);
                assert!(index_of(pair.first) < index_of(pair.second));
                assert!(seen.insert((pair.first, pair.second)));
            }
        }
    }

    #[test]
    fn empty_and_single_file_lists_have_no_matches() {
        let always = |_: &Path, _: &Path| true;
        for config in [SearchConfig::sequential(), SearchConfig::parallel()] {
            assert!(find_matches(&[], &always, &config).unwrap().is_empty());
            assert!(find_matches(&files(1), &always, &config).unwrap().is_empty());
        }
    }

    #[test]
    fn sequential_keeps_only_accepted_pairs() {
        let list = files(10);
        let matches = find_matches(&list, &same_bucket, &SearchConfig::sequential()).unwrap();

        // Indices 0/7, 1/8 and 2/9 share a bucket
        let expected: Vec<(usize, usize)> = vec![(0, 7), (1, 8), (2, 9)];
        let found: Vec<(usize, usize)> = matches
            .iter()
            .map(|m| (index_of(&m.first), index_of(&m.second)))
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn parallel_matches_sequential_exactly() {
        let list = files(60);
        let sequential = find_matches(&list, &same_bucket, &SearchConfig::sequential()).unwrap();

        for config in [
            parallel(1, Some(1)),
            parallel(3, Some(4)),
            parallel(0, None),
            parallel(25, Some(2)),
            parallel(10_000, None),
        ] {
            let result = find_matches(&list, &same_bucket, &config).unwrap();
            assert_eq!(result, sequential, "config {config:?}");
        }
    }

    #[test]
    fn every_pair_is_evaluated_exactly_once() {
        let list = files(23);
        for config in [SearchConfig::sequential(), parallel(4, Some(3))] {
            let calls = AtomicUsize::new(0);
            let counting = |_: &Path, _: &Path| {
                calls.fetch_add(1, Ordering::SeqCst);
                false
            };

            find_matches(&list, &counting, &config).unwrap();

            assert_eq!(calls.load(Ordering::SeqCst), pair_count(23));
        }
    }

    #[test]
    fn zero_chunk_size_falls_back_to_default() {
        assert_eq!(parallel(0, None).effective_chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(parallel(7, None).effective_chunk_size(), 7);
        assert!(parallel(0, None).effective_workers() >= 1);
        assert_eq!(parallel(0, Some(3)).effective_workers(), 3);
    }

    #[test]
    fn search_reports_progress_to_completion() {
        let list = files(12);
        for config in [SearchConfig::sequential(), parallel(5, Some(2))] {
            let (sender, receiver) = EventChannel::new();
            find_matches_with_events(&list, &same_bucket, &config, &sender).unwrap();
            drop(sender);

            let events: Vec<_> = receiver.iter().collect();
            match &events[0] {
                Event::Compare(CompareEvent::Started { total_pairs, .. }) => {
                    assert_eq!(*total_pairs, 66)
                }
                other => panic!("Expected Started event, got {other:?}"),
            }

            let max_progress = events
                .iter()
                .filter_map(|e| match e {
                    Event::Compare(CompareEvent::Progress(p)) => Some(p.pairs_evaluated),
                    _ => None,
                })
                .max();
            assert_eq!(max_progress, Some(66));

            match events.last().unwrap() {
                Event::Compare(CompareEvent::Completed { total_matches }) => {
                    assert_eq!(*total_matches, 5)
                }
                other => panic!("Expected Completed event, got {other:?}"),
            }
        }
    }

    #[test]
    fn matches_sort_lexicographically() {
        let mut matches = vec![
            Match {
                first: PathBuf::from("b"),
                second: PathBuf::from("c"),
            },
            Match {
                first: PathBuf::from("a"),
                second: PathBuf::from("z"),
            },
            Match {
                first: PathBuf::from("a"),
                second: PathBuf::from("b"),
            },
        ];
        matches.sort();

        let order: Vec<_> = matches
            .iter()
            .map(|m| format!("{}{}", m.first.display(), m.second.display()))
            .collect();
        assert_eq!(order, vec!["ab", "az", "bc"]);
    }

    #[test]
    fn matches_sort_on_path_bytes_not_components() {
        let pair = |first: &str, second: &str| Match {
            first: PathBuf::from(first),
            second: PathBuf::from(second),
        };
        let mut matches = vec![
            pair("/p/2020/x.jpg", "/p/2021/x.jpg"),
            pair("/p/2020-copy/x.jpg", "/p/2020/x.jpg"),
            pair("/p/2020-copy/x.jpg", "/p/2020-copy/y.jpg"),
        ];
        matches.sort();

        assert_eq!(
            matches,
            vec![
                pair("/p/2020-copy/x.jpg", "/p/2020-copy/y.jpg"),
                pair("/p/2020-copy/x.jpg", "/p/2020/x.jpg"),
                pair("/p/2020/x.jpg", "/p/2021/x.jpg"),
            ]
        );
    }
}
