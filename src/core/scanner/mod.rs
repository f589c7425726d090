//! # Scanner Module
//!
//! Recursively enumerates candidate files under a root directory.
//!
//! Directories are always descended into; files are kept when the
//! [`FileFilter`] accepts them. Symbolic links are neither followed nor
//! accepted, and special files (sockets, fifos, devices) are skipped.
//! Entries that vanish or cannot be read mid-scan are recorded in
//! [`ScanResult::errors`] and otherwise ignored.
//!
//! ## Example
//! ```rust,ignore
//! use duplicate_image_pairs::core::scanner::{ImageFilter, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/home/me/Pictures"), &ImageFilter::new())?;
//! println!("{} images", result.files.len());
//! ```

mod filter;
mod walker;

pub use filter::{FileFilter, ImageFilter};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use std::path::PathBuf;

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Accepted files, sorted by path
    pub files: Vec<PathBuf>,
    /// Entries that could not be read (non-fatal)
    pub errors: Vec<ScanError>,
}
