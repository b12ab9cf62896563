//! Content hashing for cache busting.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{GeneratorError, Result};

/// Hex digest of some content.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Per-process memo of file hashes.
#[derive(Debug, Default)]
pub struct HashCache {
    entries: Mutex<HashMap<PathBuf, String>>,
}

impl HashCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash of a file, read from disk on first request only.
    pub async fn file_hash(&self, path: &Path) -> Result<String> {
        if let Some(hash) = self.entries.lock().get(path) {
            return Ok(hash.clone());
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| GeneratorError::upstream(format!("hashing {}", path.display()), e))?;
        let hash = content_hash(&bytes);
        trace!(path = %path.display(), %hash, "file hashed");

        self.entries.lock().insert(path.to_path_buf(), hash.clone());
        Ok(hash)
    }

    /// Number of cached hashes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        let a = content_hash(b"body { color: red }");
        let b = content_hash(b"body { color: red }");
        let c = content_hash(b"body { color: blue }");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_file_hash_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.js");
        std::fs::write(&path, "console.log(1)").unwrap();

        let cache = HashCache::new();
        let first = cache.file_hash(&path).await.unwrap();
        assert_eq!(first, content_hash(b"console.log(1)"));

        // the cached value wins over the changed file
        std::fs::write(&path, "console.log(2)").unwrap();
        assert_eq!(cache.file_hash(&path).await.unwrap(), first);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_upstream_error() {
        let cache = HashCache::new();
        let err = cache
            .file_hash(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Upstream { .. }));
        assert!(cache.is_empty());
    }
}
