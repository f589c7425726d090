//! Directory walking implementation using walkdir.

use super::{FileFilter, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Skip dot-files and do not descend into dot-directories
    pub exclude_hidden: bool,
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan `root` without progress reporting
    pub fn scan(&self, root: &Path, filter: &dyn FileFilter) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, filter, &crate::events::null_sender())
    }

    /// Scan `root`, reporting accepted and skipped entries.
    ///
    /// Fails only when `root` itself is missing or not a directory.
    pub fn scan_with_events(
        &self,
        root: &Path,
        filter: &dyn FileFilter,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        validate_root(root)?;

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut files = Vec::new();
        let mut errors = Vec::new();

        let exclude_hidden = self.config.exclude_hidden;
        let entries = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !exclude_hidden || entry.depth() == 0 || !is_hidden(entry));

        for entry_result in entries {
            match entry_result {
                Ok(entry) => {
                    // Symlinks report their own type since links are not followed
                    if !entry.file_type().is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if filter.accepts(path) {
                        events.send(Event::Scan(ScanEvent::FileFound {
                            path: path.to_path_buf(),
                        }));
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = match e.io_error().map(|io| io.kind()) {
                        Some(ErrorKind::PermissionDenied) => {
                            ScanError::PermissionDenied { path: path.clone() }
                        }
                        _ => ScanError::ReadEntry {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        },
                    };

                    debug!(path = %path.display(), error = %error, "skipping unreadable entry");
                    events.send(Event::Scan(ScanEvent::Skipped {
                        path,
                        message: error.to_string(),
                    }));

                    errors.push(error);
                }
            }
        }

        // Plain byte order of the full path, so "a-b/x" sorts before "a/x"
        files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        Ok(ScanResult { files, errors })
    }
}

fn validate_root(root: &Path) -> Result<(), ScanError> {
    match fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ScanError::DirectoryNotFound {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(ScanError::PermissionDenied {
            path: root.to_path_buf(),
        }),
        Err(e) => Err(ScanError::ReadEntry {
            path: root.to_path_buf(),
            source: e,
        }),
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
