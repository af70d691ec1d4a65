// src/cache/mod.rs

//! Content-addressed cache for optimized images.
//!
//! Keys are derived from the optimizer identity plus the input bytes, so a
//! file is re-optimized only when its content or the optimizer settings
//! change. Entries live either in memory or under
//! `<root>/.assetflow/cache/images`.

pub mod hash;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use tracing::{debug, info};

use crate::fs::FileSystem;
use crate::types::CacheMode;

pub use hash::compute_content_hash;

/// Relative path (from the project root) of the on-disk cache.
pub const IMAGE_CACHE_DIR: &str = ".assetflow/cache/images";

/// Abstract storage for cached outputs.
pub trait CacheStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn save(&mut self, key: &str, contents: &[u8]) -> Result<()>;
}

/// Stores entries in memory only.
#[derive(Default)]
pub struct MemoryCacheStore {
    map: HashMap<String, Vec<u8>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.map.get(key).cloned())
    }

    fn save(&mut self, key: &str, contents: &[u8]) -> Result<()> {
        self.map.insert(key.to_string(), contents.to_vec());
        Ok(())
    }
}

/// Stores one file per entry under `<root>/.assetflow/cache/images`.
pub struct FileCacheStore {
    dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FileCacheStore {
    pub fn new(root: &Path, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            dir: root.join(IMAGE_CACHE_DIR),
            fs,
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(key);
        if !self.fs.is_file(&path) {
            return Ok(None);
        }
        self.fs.read(&path).map(Some)
    }

    fn save(&mut self, key: &str, contents: &[u8]) -> Result<()> {
        self.fs.write(&self.entry_path(key), contents)
    }
}

/// Hit/miss counters for one process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Shared image cache. Cloned into every run of the `images` task.
pub struct ImageCache {
    store: Mutex<Box<dyn CacheStore>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    pub fn new(store: Box<dyn CacheStore>) -> Self {
        Self {
            store: Mutex::new(store),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryCacheStore::new()))
    }

    /// Build the cache selected by `[images].cache`.
    pub fn for_mode(mode: CacheMode, root: &Path, fs: Arc<dyn FileSystem>) -> Self {
        match mode {
            CacheMode::Memory => Self::in_memory(),
            CacheMode::File => {
                info!(dir = %root.join(IMAGE_CACHE_DIR).display(), "using on-disk image cache");
                Self::new(Box::new(FileCacheStore::new(root, fs)))
            }
        }
    }

    /// Return the cached output for `key`, or compute, store and return it.
    pub fn get_or_insert_with<F>(&self, key: &str, compute: F) -> crate::errors::Result<Vec<u8>>
    where
        F: FnOnce() -> crate::errors::Result<Vec<u8>>,
    {
        if let Some(hit) = self.lock()?.load(key)? {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "image cache hit");
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let output = compute()?;
        self.lock()?.save(key, &output)?;
        debug!(key = %key, "image cache miss; stored");
        Ok(output)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Box<dyn CacheStore>>> {
        self.store
            .lock()
            .map_err(|_| anyhow!("image cache lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn second_lookup_is_a_hit() {
        let cache = ImageCache::in_memory();
        let mut calls = 0;
        for _ in 0..2 {
            let out = cache
                .get_or_insert_with("k", || {
                    calls += 1;
                    Ok(b"small".to_vec())
                })
                .unwrap();
            assert_eq!(out, b"small");
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn file_store_persists_across_instances() {
        let fs: Arc<dyn FileSystem> = Arc::new(MockFileSystem::new());
        let root = Path::new("/project");

        let first = ImageCache::for_mode(CacheMode::File, root, fs.clone());
        first.get_or_insert_with("abc", || Ok(vec![1, 2, 3])).unwrap();

        let second = ImageCache::for_mode(CacheMode::File, root, fs.clone());
        let out = second
            .get_or_insert_with("abc", || panic!("should be cached"))
            .unwrap();
        assert_eq!(out, vec![1, 2, 3]);
        assert_eq!(second.stats().misses, 0);
        assert!(fs.is_file(&root.join(IMAGE_CACHE_DIR).join("abc")));
    }
}
