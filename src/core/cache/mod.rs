//! # Cache Module
//!
//! Memoizes expensive per-file attributes for the lifetime of one run, so the
//! pairwise search reads each file at most once per attribute.
//!
//! ## Attributes
//! - Size in bytes (one `stat`)
//! - Content digest (128-bit xxh3 over the whole file)
//! - Image signature (decoded dimensions and histogram)
//!
//! Entries are keyed by path: two paths holding identical bytes get separate
//! entries. Nothing is ever invalidated, so files are assumed not to change
//! while a run is in progress.
//!
//! ## Concurrency
//! The cache is shared by reference across worker threads. Values are
//! computed outside the lock and inserted write-once: when two workers race on
//! the same key, the first insert wins and both callers see that value.
//! Failures are not cached.

mod file_bytes;

pub use file_bytes::{read_file_bytes, FileBytes};

use crate::core::histogram::{HistogramDecoder, ImageSignature, SignatureDecoder};
use crate::error::{AttributeError, DecodeError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use xxhash_rust::xxh3::xxh3_128;

/// Digest of a file's full contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(u128);

impl ContentDigest {
    /// Digest an in-memory buffer
    pub fn of(bytes: &[u8]) -> Self {
        Self(xxh3_128(bytes))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Number of memoized entries per attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub sizes: usize,
    pub digests: usize,
    pub signatures: usize,
}

/// Run-scoped, thread-safe memo of file attributes
pub struct AttributeCache {
    decoder: Box<dyn SignatureDecoder>,
    sizes: RwLock<HashMap<PathBuf, u64>>,
    digests: RwLock<HashMap<PathBuf, ContentDigest>>,
    signatures: RwLock<HashMap<PathBuf, Arc<ImageSignature>>>,
}

impl AttributeCache {
    /// Create an empty cache that decodes images with the `image` crate
    pub fn new() -> Self {
        Self::with_decoder(Box::new(HistogramDecoder))
    }

    /// Create an empty cache with a custom image decoder
    pub fn with_decoder(decoder: Box<dyn SignatureDecoder>) -> Self {
        Self {
            decoder,
            sizes: RwLock::new(HashMap::new()),
            digests: RwLock::new(HashMap::new()),
            signatures: RwLock::new(HashMap::new()),
        }
    }

    /// File size in bytes
    pub fn size(&self, path: &Path) -> Result<u64, AttributeError> {
        memoize(&self.sizes, path, || {
            fs::metadata(path)
                .map(|m| m.len())
                .map_err(|source| AttributeError::Io {
                    path: path.to_path_buf(),
                    source,
                })
        })
    }

    /// Digest of the file's full contents
    pub fn digest(&self, path: &Path) -> Result<ContentDigest, AttributeError> {
        memoize(&self.digests, path, || {
            read_file_bytes(path)
                .map(|bytes| ContentDigest::of(&bytes))
                .map_err(|source| AttributeError::Io {
                    path: path.to_path_buf(),
                    source,
                })
        })
    }

    /// Decoded image signature
    pub fn signature(&self, path: &Path) -> Result<Arc<ImageSignature>, DecodeError> {
        memoize(&self.signatures, path, || self.decoder.decode(path).map(Arc::new))
    }

    /// Current number of entries
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            sizes: read_len(&self.sizes),
            digests: read_len(&self.digests),
            signatures: read_len(&self.signatures),
        }
    }
}

impl Default for AttributeCache {
    fn default() -> Self {
        Self::new()
    }
}

fn memoize<T, E>(
    map: &RwLock<HashMap<PathBuf, T>>,
    path: &Path,
    compute: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    T: Clone,
{
    // Entries are write-once, so a poisoned map still holds consistent values
    if let Some(value) = map.read().unwrap_or_else(PoisonError::into_inner).get(path) {
        return Ok(value.clone());
    }

    let value = compute()?;

    let mut entries = map.write().unwrap_or_else(PoisonError::into_inner);
    Ok(entries.entry(path.to_path_buf()).or_insert(value).clone())
}

fn read_len<T>(map: &RwLock<HashMap<PathBuf, T>>) -> usize {
    map.read().unwrap_or_else(PoisonError::into_inner).len()
}
