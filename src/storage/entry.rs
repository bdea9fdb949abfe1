//! Directory entries
//!
//! A storage entry is either a file or a directory; all type checks are
//! matches over the variant.

use std::fs::DirEntry;
use std::time::UNIX_EPOCH;

/// A single child of a stored directory.
///
/// `modified` is seconds since the Unix epoch, 0 when unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File { name: String, size: u64, modified: u64 },
    Directory { name: String, modified: u64 },
}

impl Entry {
    /// Build an entry from a raw directory entry.
    ///
    /// Falls back to a zero-metadata file entry when metadata cannot be
    /// read, so a single unreadable child does not fail the whole listing.
    pub fn from_dir_entry(entry: &DirEntry) -> Entry {
        let name = entry.file_name().to_string_lossy().to_string();

        match entry.metadata() {
            Ok(metadata) => {
                let modified = metadata
                    .modified()
                    .ok()
                    .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                    .map(|dur| dur.as_secs())
                    .unwrap_or(0);

                if metadata.is_dir() {
                    Entry::Directory { name, modified }
                } else {
                    Entry::File { name, size: metadata.len(), modified }
                }
            }
            Err(_) => Entry::File { name, size: 0, modified: 0 },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entry::File { name, .. } | Entry::Directory { name, .. } => name,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory { .. })
    }
}
