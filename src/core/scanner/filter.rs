//! File acceptance predicates for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Decides whether a regular file found during the walk is a candidate.
///
/// Any `Fn(&Path) -> bool` closure is a filter, which keeps tests short.
pub trait FileFilter: Send + Sync {
    fn accepts(&self, path: &Path) -> bool;
}

impl<F> FileFilter for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn accepts(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Accepts files whose extension is a decodable image format
pub struct ImageFilter {
    extensions: HashSet<String>,
}

impl ImageFilter {
    /// Create a filter for the formats the histogram decoder can read
    pub fn new() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileFilter for ImageFilter {
    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}
