//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while finding and acting on duplicate pairs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// File enumeration events
    Scan(ScanEvent),
    /// Pairwise comparison events
    Compare(CompareEvent),
    /// Action dispatch events
    Action(ActionEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during file enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Enumeration has started
    Started { root: PathBuf },
    /// A candidate file was accepted
    FileFound { path: PathBuf },
    /// An entry could not be read and was skipped
    Skipped { path: PathBuf, message: String },
    /// Enumeration completed
    Completed { total_files: usize },
}

/// Events during pairwise comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompareEvent {
    /// Comparison has started
    Started { total_files: usize, total_pairs: usize },
    /// Progress update during comparison
    Progress(CompareProgress),
    /// Comparison completed
    Completed { total_matches: usize },
}

/// Progress information during comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareProgress {
    /// Number of candidate pairs evaluated so far
    pub pairs_evaluated: usize,
    /// Total number of candidate pairs
    pub total_pairs: usize,
}

/// Events during action dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActionEvent {
    /// The action was applied to a pair
    Applied { first: PathBuf, second: PathBuf },
    /// The action failed for a pair; dispatch continues
    Failed {
        first: PathBuf,
        second: PathBuf,
        message: String,
    },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Comparing,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Files accepted by the enumerator
    pub total_files: usize,
    /// Candidate pairs evaluated
    pub total_pairs: usize,
    /// Pairs the comparator accepted
    pub total_matches: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Comparing => write!(f, "Comparing"),
        }
    }
}
