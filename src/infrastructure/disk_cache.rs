//! Disk-backed content cache, persistent across sessions.
//!
//! Entries are keyed by the original source URL; the on-disk file name is a
//! digest of that URL. Capacity is a byte budget enforced by trimming the
//! least-recently-accessed files.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

use crate::domain::entities::TargetId;
use crate::domain::errors::LoadError;
use crate::domain::ports::ContentCachePort;

/// Default cache byte budget (200 MB).
pub const DEFAULT_MAX_CACHE_SIZE: u64 = 200 * 1024 * 1024;

/// Persistent byte store addressed by source URL.
pub struct DiskContentCache {
    cache_dir: PathBuf,
    max_size: u64,
    current_size: AtomicU64,
    item_count: AtomicUsize,
}

impl DiskContentCache {
    /// Creates a cache rooted at the given directory.
    ///
    /// # Errors
    /// Returns `LoadError::CacheUnavailable` if the directory cannot be
    /// created or scanned.
    pub async fn new(cache_dir: PathBuf, max_size: u64) -> Result<Self, LoadError> {
        fs::create_dir_all(&cache_dir)
            .await
            .map_err(|e| LoadError::cache(format!("failed to create cache dir: {e}")))?;

        let mut total_size = 0u64;
        let mut count = 0usize;

        let mut entries = fs::read_dir(&cache_dir)
            .await
            .map_err(|e| LoadError::cache(format!("failed to read cache dir: {e}")))?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "img")
                && let Ok(meta) = entry.metadata().await
            {
                total_size += meta.len();
                count += 1;
            }
        }

        let cache = Self {
            cache_dir,
            max_size,
            current_size: AtomicU64::new(total_size),
            item_count: AtomicUsize::new(count),
        };

        cache.cleanup_if_needed().await;

        Ok(cache)
    }

    /// Creates a cache under the user cache directory, namespaced.
    ///
    /// # Errors
    /// Returns `LoadError::CacheUnavailable` if the directory cannot be
    /// created.
    pub async fn default_location(namespace: &str) -> Result<Self, LoadError> {
        let cache_dir = default_cache_path(namespace);
        Self::new(cache_dir, DEFAULT_MAX_CACHE_SIZE).await
    }

    /// Returns the on-disk path for one URL key.
    fn cache_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.img", TargetId::digest(url)))
    }

    /// Returns the current cache size in bytes.
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size.load(Ordering::Relaxed)
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.item_count.load(Ordering::Relaxed)
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks if a URL has a cached entry.
    pub async fn contains(&self, url: &str) -> bool {
        fs::try_exists(&self.cache_path(url)).await.unwrap_or(false)
    }

    /// Trims least-recently-accessed entries once past the byte budget.
    async fn cleanup_if_needed(&self) {
        let current_size = self.current_size();
        if current_size <= self.max_size {
            return;
        }

        debug!(
            current_size = current_size,
            max_size = self.max_size,
            "content cache over budget, trimming"
        );

        let Ok(mut entries) = fs::read_dir(&self.cache_dir).await else {
            return;
        };

        let mut files: Vec<(PathBuf, std::time::SystemTime, u64)> = Vec::new();

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "img") {
                continue;
            }

            if let Ok(meta) = entry.metadata().await {
                let accessed = meta.accessed().unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                files.push((path, accessed, meta.len()));
            }
        }

        files.sort_by_key(|(_, time, _)| *time);

        let mut freed_size = 0u64;
        let mut freed_count = 0usize;
        // Free 10% headroom past the overage so trims stay infrequent.
        let target = current_size - self.max_size + (self.max_size / 10);

        for (path, _, size) in files {
            if freed_size >= target {
                break;
            }

            if let Err(e) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "failed to remove old cache file");
            } else {
                freed_size += size;
                freed_count += 1;
            }
        }
        self.current_size.fetch_sub(freed_size, Ordering::Relaxed);
        self.item_count.fetch_sub(freed_count, Ordering::Relaxed);

        debug!(
            freed_size = freed_size,
            freed_count = freed_count,
            "content cache trim complete"
        );
    }
}

#[async_trait::async_trait]
impl ContentCachePort for DiskContentCache {
    async fn lookup(&self, url: &str) -> Option<Bytes> {
        let path = self.cache_path(url);
        match fs::read(&path).await {
            Ok(bytes) => {
                trace!(url = %url, path = %path.display(), "cache hit");
                Some(Bytes::from(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!(url = %url, "cache miss");
                None
            }
            Err(e) => {
                // Read failures degrade to a miss; the loader falls through
                // to the network path.
                warn!(url = %url, error = %e, "cache read failed");
                None
            }
        }
    }

    async fn store(&self, url: &str, bytes: &[u8]) -> Result<(), LoadError> {
        let path = self.cache_path(url);

        let old_size = fs::metadata(&path).await.map(|m| m.len()).ok();

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| LoadError::cache(format!("failed to create cache file: {e}")))?;

        file.write_all(bytes)
            .await
            .map_err(|e| LoadError::cache(format!("failed to write cache file: {e}")))?;

        file.flush()
            .await
            .map_err(|e| LoadError::cache(format!("failed to flush cache file: {e}")))?;

        let new_size = bytes.len() as u64;
        if let Some(old) = old_size {
            if new_size > old {
                self.current_size
                    .fetch_add(new_size - old, Ordering::Relaxed);
            } else {
                self.current_size
                    .fetch_sub(old - new_size, Ordering::Relaxed);
            }
        } else {
            self.current_size.fetch_add(new_size, Ordering::Relaxed);
            self.item_count.fetch_add(1, Ordering::Relaxed);
        }

        debug!(url = %url, size = bytes.len(), "stored content in cache");

        self.cleanup_if_needed().await;

        Ok(())
    }

    async fn evict(&self, url: &str) {
        let path = self.cache_path(url);
        let size = fs::metadata(&path).await.map(|m| m.len()).ok();
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(url = %url, error = %e, "failed to evict cache entry");
            }
        } else if let Some(s) = size {
            self.current_size.fetch_sub(s, Ordering::Relaxed);
            self.item_count.fetch_sub(1, Ordering::Relaxed);
            debug!(url = %url, "evicted cache entry");
        }
    }

    async fn clear(&self) -> Result<(), LoadError> {
        let mut entries = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| LoadError::cache(format!("failed to read cache dir: {e}")))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LoadError::cache(format!("failed to read entry: {e}")))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "img")
                && fs::remove_file(&path).await.is_err()
            {
                warn!(path = %path.display(), "failed to remove cache file");
            }
        }
        self.current_size.store(0, Ordering::Relaxed);
        self.item_count.store(0, Ordering::Relaxed);
        debug!("cleared content cache");
        Ok(())
    }
}

/// Returns the default cache directory for a namespace.
fn default_cache_path(namespace: &str) -> PathBuf {
    directories::ProjectDirs::from("io", "imgqueue", crate::NAME).map_or_else(
        || std::env::temp_dir().join(crate::NAME).join(namespace),
        |dirs| dirs.cache_dir().join(namespace),
    )
}
