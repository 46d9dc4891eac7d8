// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, bail};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory filesystem for tests.
///
/// Only files are stored. A directory exists when some file lives below it,
/// so removing the last file of a directory removes the directory too.
/// Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a file.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Remove a file, e.g. to simulate an ignore file being deleted.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files.lock().unwrap().remove(path.as_ref());
    }

    /// Remove a directory and everything below it.
    pub fn remove_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.files
            .lock()
            .unwrap()
            .retain(|file, _| !file.starts_with(path));
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let content = self.files.lock().unwrap().get(path).cloned();
        match content {
            Some(content) => Ok(content),
            None if self.is_dir(path) => bail!("is a directory: {:?}", path),
            None => bail!("no such file: {:?}", path),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .lock()
            .unwrap()
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // No symlinks here; absolute paths are already canonical.
        if !self.exists(path) {
            bail!("no such file or directory: {:?}", path);
        }
        Ok(path.to_path_buf())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap();
        let children: BTreeSet<PathBuf> = files
            .keys()
            .filter_map(|file| file.strip_prefix(path).ok())
            .filter_map(|rel| match rel.components().next() {
                Some(Component::Normal(name)) => Some(path.join(name)),
                _ => None,
            })
            .collect();

        if children.is_empty() {
            bail!("not a directory: {:?}", path);
        }
        Ok(children.into_iter().collect())
    }
}
