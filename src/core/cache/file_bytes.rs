//! Whole-file reads, memory-mapped for large files.

use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::ops::Deref;
use std::path::Path;

/// Minimum file size to use memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// File bytes that may be either owned or memory-mapped.
pub enum FileBytes {
    Vec(Vec<u8>),
    Mmap(Mmap),
}

impl Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileBytes::Vec(v) => v,
            FileBytes::Mmap(m) => m,
        }
    }
}

/// Read the full contents of `path`.
///
/// Files of at least 1MB are mapped instead of copied; smaller files are
/// read with `fs::read`, which is cheaper at that size.
pub fn read_file_bytes(path: &Path) -> io::Result<FileBytes> {
    let file = File::open(path)?;

    if file.metadata()?.len() < MMAP_THRESHOLD {
        return std::fs::read(path).map(FileBytes::Vec);
    }

    // SAFETY: the mapping is read-only and only lives for one digest
    // computation; files are assumed not to change during a run.
    let mmap = unsafe { Mmap::map(&file) }?;
    Ok(FileBytes::Mmap(mmap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn small_files_are_read_into_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.bin");
        std::fs::write(&path, b"hello").unwrap();

        let bytes = read_file_bytes(&path).unwrap();

        assert!(matches!(bytes, FileBytes::Vec(_)));
        assert_eq!(&*bytes, b"hello");
    }

    #[test]
    fn large_files_are_mapped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("large.bin");
        let content = vec![7u8; MMAP_THRESHOLD as usize + 10];
        std::fs::write(&path, &content).unwrap();

        let bytes = read_file_bytes(&path).unwrap();

        assert!(matches!(bytes, FileBytes::Mmap(_)));
        assert_eq!(bytes.len(), content.len());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_file_bytes(Path::new("/nonexistent/file.bin")).is_err());
    }
}
