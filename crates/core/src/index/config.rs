//! Configuration for the index module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for building and caching the search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directories to index.
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Directory holding cached indexes. Caching is disabled when unset.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Age after which a cached index is rebuilt.
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    /// Whether to follow symbolic links while walking.
    #[serde(default)]
    pub follow_links: bool,

    /// Files smaller than this are not indexed (0 disables the filter).
    #[serde(default)]
    pub min_file_size_bytes: u64,

    /// Maximum directory depth below each root.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_cache_ttl_hours() -> u64 {
    24
}

fn default_max_depth() -> usize {
    20
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            cache_dir: None,
            cache_ttl_hours: default_cache_ttl_hours(),
            follow_links: false,
            min_file_size_bytes: 0,
            max_depth: default_max_depth(),
        }
    }
}

impl IndexConfig {
    /// Creates a config for the given roots.
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    /// Enables caching under `cache_dir`.
    pub fn with_cache_dir(mut self, cache_dir: PathBuf) -> Self {
        self.cache_dir = Some(cache_dir);
        self
    }

    /// Sets the cache staleness window.
    pub fn with_cache_ttl_hours(mut self, hours: u64) -> Self {
        self.cache_ttl_hours = hours;
        self
    }

    /// Sets the minimum indexed file size.
    pub fn with_min_file_size(mut self, bytes: u64) -> Self {
        self.min_file_size_bytes = bytes;
        self
    }
}
