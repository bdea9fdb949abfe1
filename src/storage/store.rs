//! Root-confined file store
//!
//! All operations take a logical path relative to a fixed storage root and
//! either fail or act on a path at or beneath that root. The store keeps
//! no index: every call re-reads live filesystem state, and a check is not
//! atomic with the mutation that follows it.

use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::storage::entry::Entry;
use crate::storage::resource::FileResource;
use crate::storage::validation::{
    ensure_within_root, is_valid_entry_name, relative_from_logical, strip_trailing_dots,
};

/// Sentinel move target meaning "up one level".
///
/// Compared as a literal string, never resolved as a filesystem dot path.
pub const PARENT_TARGET: &str = ".";

/// File store scoped beneath a single root directory.
///
/// The root is fixed at construction and never reassigned.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `location`.
    pub fn new(location: &str) -> Result<FileStore, StoreError> {
        if location.trim().is_empty() {
            return Err(StoreError::Initialization(
                "storage root location cannot be empty".into(),
            ));
        }

        Ok(FileStore {
            root: PathBuf::from(location),
        })
    }

    /// Ensure the storage root exists, creating missing ancestors.
    pub fn init(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::Initialization(e.to_string()))?;
        info!("Storage root ready: {}", self.root.display());
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a logical path to an absolute path inside the root.
    ///
    /// An empty logical path denotes the root itself. Fails with
    /// `NotFound` when the entry does not exist and `InvalidRequest` when
    /// the path would escape the root.
    pub fn load(&self, logical: &str) -> Result<PathBuf, StoreError> {
        let relative = relative_from_logical(logical)?;
        let joined = self.root.join(relative);

        if !joined.exists() {
            return Err(StoreError::NotFound(logical.to_string()));
        }

        ensure_within_root(&self.root, &joined)
    }

    /// List the immediate children of a directory.
    ///
    /// Entries come back in filesystem enumeration order, which is not
    /// stable across platforms.
    pub fn list(&self, logical: &str) -> Result<Vec<Entry>, StoreError> {
        let dir = self.load(logical)?;
        if !dir.is_dir() {
            return Err(StoreError::InvalidRequest(format!(
                "cannot list non-directory: {}",
                logical
            )));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            entries.push(Entry::from_dir_entry(&entry?));
        }

        info!("Listed {} ({} entries)", dir.display(), entries.len());
        Ok(entries)
    }

    /// Open a stored file for streamed reads.
    pub fn load_resource(&self, logical: &str) -> Result<FileResource, StoreError> {
        let file = self.load(logical)?;
        if file.is_dir() {
            return Err(StoreError::InvalidRequest(format!(
                "cannot load a directory as a resource: {}",
                logical
            )));
        }

        Ok(FileResource::open(file)?)
    }

    /// Store `content` as `file_name` under a directory, overwriting any
    /// existing file of the same name.
    pub fn upload(
        &self,
        logical: &str,
        file_name: &str,
        content: &[u8],
    ) -> Result<PathBuf, StoreError> {
        if content.is_empty() {
            return Err(StoreError::InvalidRequest(
                "cannot store an empty file".into(),
            ));
        }
        if !is_valid_entry_name(file_name) {
            return Err(StoreError::InvalidRequest(format!(
                "invalid file name: {}",
                file_name
            )));
        }

        let parent = self.load(logical)?;
        if !parent.is_dir() {
            return Err(StoreError::InvalidRequest(format!(
                "upload target is not a directory: {}",
                logical
            )));
        }

        let destination = parent.join(file_name);
        if let Err(e) = fs::write(&destination, content) {
            error!("Failed to store {}: {}", destination.display(), e);
            return Err(StoreError::Storage(e));
        }

        info!("Stored {} ({} bytes)", destination.display(), content.len());
        Ok(destination)
    }

    /// Create a directory named `name` under a parent directory.
    ///
    /// Trailing dots are stripped from the name first. A collision or an
    /// otherwise unusable name is an `InvalidRequest`, not a fault.
    pub fn create_directory(&self, logical: &str, name: &str) -> Result<PathBuf, StoreError> {
        let name = strip_trailing_dots(name);
        if !is_valid_entry_name(name) {
            return Err(StoreError::InvalidRequest(format!(
                "invalid directory name: {:?}",
                name
            )));
        }

        let parent = self.load(logical)?;
        if !parent.is_dir() {
            return Err(StoreError::InvalidRequest(format!(
                "cannot create a directory inside a regular file: {}",
                logical
            )));
        }

        let destination = parent.join(name);
        if let Err(e) = fs::create_dir(&destination) {
            return Err(StoreError::InvalidRequest(format!(
                "could not create directory {}: {}",
                name, e
            )));
        }

        info!("Created directory {}", destination.display());
        Ok(destination)
    }

    /// Move an entry into another directory, overwriting a same-named
    /// entry at the destination.
    ///
    /// `new_directory` is resolved against the entry's parent; the literal
    /// [`PARENT_TARGET`] sentinel targets the parent's parent instead. The
    /// storage root itself is never a valid destination.
    pub fn move_entry(&self, logical: &str, new_directory: &str) -> Result<PathBuf, StoreError> {
        let file = self.load(logical)?;
        let root = self.root.canonicalize().map_err(StoreError::Storage)?;
        if file == root {
            return Err(StoreError::InvalidRequest(
                "the storage root itself cannot be moved".into(),
            ));
        }

        // file came out of load(), so it has a parent inside the root
        let parent = file.parent().unwrap_or(&root);
        let target = if new_directory == PARENT_TARGET {
            parent.parent().map(Path::to_path_buf)
        } else {
            Some(parent.join(new_directory))
        };

        let target = match target {
            Some(t) if t.exists() && t.is_dir() => ensure_within_root(&self.root, &t)?,
            _ => {
                return Err(StoreError::InvalidRequest(format!(
                    "invalid target folder: {}",
                    new_directory
                )));
            }
        };
        if target == root {
            return Err(StoreError::InvalidRequest(
                "the storage root cannot be a move destination".into(),
            ));
        }

        // file paths from load() are canonical, so file_name is present
        let new_path = match file.file_name() {
            Some(name) => target.join(name),
            None => {
                return Err(StoreError::InvalidRequest(format!(
                    "cannot move entry without a name: {}",
                    logical
                )));
            }
        };

        // Same replace semantics as upload: clear a same-named file or
        // empty directory at the destination before the rename.
        if new_path != file && new_path.exists() {
            let cleared = if new_path.is_dir() {
                fs::remove_dir(&new_path)
            } else {
                fs::remove_file(&new_path)
            };
            if let Err(e) = cleared {
                error!("Failed to replace {}: {}", new_path.display(), e);
                return Err(StoreError::Storage(e));
            }
        }

        if let Err(e) = fs::rename(&file, &new_path) {
            error!(
                "Failed to move {} to {}: {}",
                file.display(),
                new_path.display(),
                e
            );
            return Err(StoreError::Storage(e));
        }

        info!("Moved {} to {}", logical, new_path.display());
        Ok(new_path)
    }

    /// Rename an entry in place.
    ///
    /// Unlike `move_entry` and `upload`, an existing sibling with the new
    /// name is never overwritten.
    pub fn rename(&self, logical: &str, new_name: &str) -> Result<PathBuf, StoreError> {
        let file = self.load(logical)?;
        let root = self.root.canonicalize().map_err(StoreError::Storage)?;
        if file == root {
            return Err(StoreError::InvalidRequest(
                "the storage root itself cannot be renamed".into(),
            ));
        }

        let new_name = strip_trailing_dots(new_name);
        if !is_valid_entry_name(new_name) {
            return Err(StoreError::InvalidRequest(format!(
                "invalid name: {:?}",
                new_name
            )));
        }

        let parent = file.parent().unwrap_or(&root);
        let new_path = parent.join(new_name);
        if new_path == file {
            return Ok(new_path);
        }
        if new_path.exists() {
            return Err(StoreError::InvalidRequest(format!(
                "an entry named {} already exists",
                new_name
            )));
        }

        if let Err(e) = fs::rename(&file, &new_path) {
            return Err(StoreError::InvalidRequest(format!(
                "could not rename to {}: {}",
                new_name, e
            )));
        }

        info!("Renamed {} to {}", logical, new_path.display());
        Ok(new_path)
    }

    /// Recursively remove a file or directory tree.
    ///
    /// A failure partway leaves the partial state in place; nothing is
    /// rolled back.
    pub fn delete(&self, logical: &str) -> Result<(), StoreError> {
        let file = self.load(logical)?;
        let root = self.root.canonicalize().map_err(StoreError::Storage)?;
        if file == root {
            return Err(StoreError::InvalidRequest(
                "the storage root itself cannot be deleted".into(),
            ));
        }

        let removed = if file.is_dir() {
            fs::remove_dir_all(&file)
        } else {
            fs::remove_file(&file)
        };
        if let Err(e) = removed {
            error!("Failed to delete {}: {}", file.display(), e);
            return Err(StoreError::Storage(e));
        }

        info!("Deleted {}", file.display());
        Ok(())
    }
}
