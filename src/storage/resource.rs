//! Stored file resources
//!
//! A readable, seekable handle over a single stored file, suitable for
//! streamed and ranged reads. The underlying handle is released on drop
//! on every exit path.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct FileResource {
    path: PathBuf,
    file: File,
    len: u64,
}

impl FileResource {
    pub fn open(path: PathBuf) -> io::Result<FileResource> {
        let file = File::open(&path)?;
        let len = file.metadata()?.len();
        Ok(FileResource { path, file, len })
    }

    /// Absolute path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Read for FileResource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for FileResource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}
