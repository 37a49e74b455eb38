//! In-memory mock filesystem for testing collectors without real `/proc`.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores text and binary files in memory, allowing tests to simulate
/// `/proc`, `/etc` and `utmp` states without a matching host.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, Vec<u8>>,
    /// Set of directories, so `exists` works on them.
    directories: HashSet<PathBuf>,
    /// Paths that fail with the given error kind.
    errors: HashMap<PathBuf, io::ErrorKind>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text file. Parent directories are created automatically.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.add_binary(path, content.into().into_bytes());
    }

    /// Adds a file with raw bytes.
    pub fn add_binary(&mut self, path: impl AsRef<Path>, content: Vec<u8>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content);
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Makes reads of `path` fail with `kind`, e.g. `PermissionDenied`.
    pub fn fail(&mut self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        self.errors.insert(path.as_ref().to_path_buf(), kind);
    }

    /// Removes a file, leaving its directories in place.
    pub fn remove(&mut self, path: impl AsRef<Path>) {
        self.files.remove(path.as_ref());
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        if let Some(kind) = self.errors.get(path) {
            return Err(io::Error::new(*kind, format!("mock failure: {:?}", path)));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }
}
