//! # Pipeline Module
//!
//! Orchestrates a detection run.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Enumerate image files under the root, sorted
//! 2. **Compare** - Evaluate every pair with the configured strategy
//! 3. **Sort** - Order matches on (first, second)
//!
//! Actions are not part of the pipeline: they run on the finished, sorted
//! result, so detection and side effects never interleave.

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
