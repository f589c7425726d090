//! Pipeline execution implementation.

use crate::core::cache::{AttributeCache, CacheStats};
use crate::core::comparator::{Comparator, ComparisonMethod, Tolerance};
use crate::core::scanner::{ImageFilter, ScanConfig, WalkDirScanner};
use crate::core::search::{find_matches_with_events, pair_count, ExecutionMode, Match, SearchConfig};
use crate::error::DedupError;
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Files accepted by the scanner, sorted
    pub files: Vec<PathBuf>,
    /// Matched pairs, sorted on (first, second)
    pub matches: Vec<Match>,
    /// Entries skipped during the scan (non-fatal)
    pub scan_errors: Vec<String>,
    /// Attribute cache population at the end of the run
    pub cache_stats: CacheStats,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn total_files(&self) -> usize {
        self.files.len()
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root of the scanned tree
    pub root: PathBuf,
    /// Comparison strategy
    pub method: ComparisonMethod,
    /// Histogram strategy limits
    pub tolerance: Tolerance,
    /// Sequential or parallel evaluation
    pub search: SearchConfig,
    /// Scanner configuration
    pub scan: ScanConfig,
}

impl PipelineConfig {
    /// Reject parameters no run could use
    pub fn validate(&self) -> Result<(), DedupError> {
        let check = |name: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(DedupError::Config(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )))
            }
        };
        check("fuzziness", self.tolerance.rms_threshold)?;
        check("aspect fuzziness", self.tolerance.aspect_fuzziness)?;

        if self.search.workers == Some(0) {
            return Err(DedupError::Config("worker count must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            method: ComparisonMethod::default(),
            tolerance: Tolerance::default(),
            search: SearchConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

/// Builder for pipeline configuration
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory to scan
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Set the comparison strategy
    pub fn method(mut self, method: ComparisonMethod) -> Self {
        self.config.method = method;
        self
    }

    /// Set the maximum histogram RMS deviation
    pub fn rms_threshold(mut self, threshold: f64) -> Self {
        self.config.tolerance.rms_threshold = threshold;
        self
    }

    /// Set the relative aspect-ratio tolerance
    pub fn aspect_fuzziness(mut self, fuzziness: f64) -> Self {
        self.config.tolerance.aspect_fuzziness = fuzziness;
        self
    }

    /// Evaluate pairs on a worker pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.search.mode = if parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Sequential
        };
        self
    }

    /// Pairs per work unit in parallel mode (0 = default)
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.search.chunk_size = chunk_size;
        self
    }

    /// Worker threads in parallel mode (None = one per core)
    pub fn workers(mut self, workers: Option<usize>) -> Self {
        self.config.search.workers = workers;
        self
    }

    /// Skip dot-files and dot-directories
    pub fn exclude_hidden(mut self, exclude: bool) -> Self {
        self.config.scan.exclude_hidden = exclude;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
        }
    }
}

/// Scan, compare and sort: everything up to (not including) the actions
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, DedupError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with a fresh attribute cache
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, DedupError> {
        let cache = AttributeCache::new();
        self.run_with_cache(&cache, events)
    }

    /// Run the pipeline against a caller-owned cache
    pub fn run_with_cache(
        &self,
        cache: &AttributeCache,
        events: &EventSender,
    ) -> Result<PipelineResult, DedupError> {
        self.config.validate()?;

        let start_time = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scanner = WalkDirScanner::new(self.config.scan.clone());
        let scan_result = scanner.scan_with_events(&self.config.root, &ImageFilter::new(), events)?;
        let files = scan_result.files;
        let scan_errors: Vec<String> = scan_result.errors.iter().map(|e| e.to_string()).collect();

        info!(
            root = %self.config.root.display(),
            files = files.len(),
            skipped = scan_errors.len(),
            "scan finished"
        );

        // Phase 2: Comparing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Comparing,
        }));

        let comparator = Comparator::new(self.config.method, self.config.tolerance, cache);
        let mut matches =
            find_matches_with_events(&files, &comparator, &self.config.search, events)?;
        matches.sort();

        let duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_files: files.len(),
                total_pairs: pair_count(files.len()),
                total_matches: matches.len(),
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            files,
            matches,
            scan_errors,
            cache_stats: cache.stats(),
            duration_ms,
        })
    }
}
