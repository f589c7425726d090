//! # Core Module
//!
//! The duplicate detection engine.
//!
//! ## Modules
//! - `scanner` - Enumerates candidate files under a directory
//! - `cache` - Memoizes sizes, digests and image signatures per run
//! - `histogram` - Decodes images into dimensions plus color histogram
//! - `comparator` - Exact and histogram comparison strategies
//! - `search` - Pairwise search, sequential or on a worker pool
//! - `action` - Side effects applied to matched pairs
//! - `pipeline` - Orchestrates scan and search

pub mod action;
pub mod cache;
pub mod comparator;
pub mod histogram;
pub mod pipeline;
pub mod scanner;
pub mod search;

// Re-export commonly used types
pub use action::{Action, ActionDispatcher, DispatchReport, ViewerCommand};
pub use cache::AttributeCache;
pub use comparator::{ComparisonMethod, Tolerance};
pub use search::{ExecutionMode, Match, SearchConfig};
