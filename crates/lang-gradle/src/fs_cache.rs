//! Directory cache on the local file system.

use dashmap::DashMap;
use ktdsl_api::{BoxError, CacheKeySpec, DirectoryCache};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::classpath::cache_dir_name;

/// Keeps one directory per key under `root`.
///
/// Population happens in a scratch directory next to the final location and
/// is renamed into place once complete, so a directory that exists is always
/// complete. Callers in this process populating the same key are serialized.
/// A key's lock is dropped once its directory exists, so `locks` only holds
/// keys that are being populated or whose population failed.
pub struct FsDirectoryCache {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FsDirectoryCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: DashMap::new(),
        }
    }

    /// `~/.ktdsl/accessors`
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ktdsl")
            .join("accessors")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for FsDirectoryCache {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

impl DirectoryCache for FsDirectoryCache {
    fn cache_dir_for(
        &self,
        key: &CacheKeySpec,
        populate: &mut dyn FnMut(&Path) -> Result<(), BoxError>,
    ) -> Result<PathBuf, BoxError> {
        let name = cache_dir_name(key);
        let target = self.root.join(&name);

        let lock = Arc::clone(&self.locks.entry(name.clone()).or_default());
        // A poisoned lock only means an earlier populate panicked before
        // renaming, which leaves nothing behind.
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if target.is_dir() {
            tracing::debug!("Reusing cache directory {}", target.display());
            self.release(&name, &lock);
            return Ok(target);
        }

        fs::create_dir_all(&self.root)?;
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}-", name))
            .tempdir_in(&self.root)?;
        populate(staging.path())?;

        match fs::rename(staging.path(), &target) {
            Ok(()) => tracing::debug!("Populated cache directory {}", target.display()),
            // Another process got there first.
            Err(_) if target.is_dir() => {}
            Err(e) => return Err(e.into()),
        }
        self.release(&name, &lock);
        Ok(target)
    }
}

impl FsDirectoryCache {
    /// Forgets the lock of a key whose directory exists. Later callers find
    /// the directory before they would need to populate.
    fn release(&self, name: &str, lock: &Arc<Mutex<()>>) {
        self.locks
            .remove_if(name, |_, current| Arc::ptr_eq(current, lock));
    }
}
