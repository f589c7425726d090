//! # Duplicate Image Pairs
//!
//! Finds pairs of identical or visually similar images under a directory tree
//! and applies a chosen action to every matched pair.
//!
//! ## Architecture
//! - `core` - The detection engine (enumeration, caching, comparison, search, actions)
//! - `events` - Progress reporting over channels
//! - `error` - Error taxonomy
//!
//! The command-line front end lives in the `dupe-pairs` binary.

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DedupError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise the level is derived from `verbosity`
/// (0 = warn, 1 = info, 2+ = debug). Calling this twice is harmless.
pub fn init_tracing(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
