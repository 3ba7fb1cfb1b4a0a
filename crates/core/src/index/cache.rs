//! On-disk persistence of a built index.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::config::IndexConfig;
use super::error::IndexError;
use super::search_index::SearchIndex;
use super::types::FileMetadata;

/// Upper bound on the staleness window.
const MAX_TTL_HOURS: u64 = 1_000_000;

/// Serialized form of a [`SearchIndex`].
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    roots: Vec<PathBuf>,
    built_at: DateTime<Utc>,
    entries: Vec<CachedEntry>,
    metadata: Vec<CachedFile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedEntry {
    key: String,
    paths: Vec<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedFile {
    path: PathBuf,
    #[serde(flatten)]
    metadata: FileMetadata,
}

/// Index cache keyed by the set of canonical root directories.
#[derive(Debug, Clone)]
pub struct IndexCache {
    dir: PathBuf,
    ttl: Duration,
}

impl IndexCache {
    /// Creates a cache stored under `dir` with the given staleness window.
    pub fn new(dir: impl Into<PathBuf>, ttl_hours: u64) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::hours(ttl_hours.min(MAX_TTL_HOURS) as i64),
        }
    }

    /// Cache described by `config`, if caching is enabled.
    pub fn from_config(config: &IndexConfig) -> Option<Self> {
        config
            .cache_dir
            .as_ref()
            .map(|dir| Self::new(dir.clone(), config.cache_ttl_hours))
    }

    /// Stable key for a root set: the first 16 hex chars of the SHA-256 of
    /// the sorted roots joined by `|`.
    pub fn cache_key(roots: &[PathBuf]) -> String {
        let mut sorted: Vec<String> = roots
            .iter()
            .map(|r| r.to_string_lossy().into_owned())
            .collect();
        sorted.sort();
        let digest = Sha256::digest(sorted.join("|").as_bytes());
        format!("{:x}", digest)[..16].to_string()
    }

    /// Cache file used for `roots`.
    pub fn path_for(&self, roots: &[PathBuf]) -> PathBuf {
        self.dir.join(format!("index_{}.json", Self::cache_key(roots)))
    }

    /// Loads the cached index for `roots`.
    ///
    /// Returns `Ok(None)` when there is no cache, when it is older than the
    /// staleness window, or when its recorded roots differ from `roots`.
    pub fn load(&self, roots: &[PathBuf]) -> Result<Option<SearchIndex>, IndexError> {
        let path = self.path_for(roots);
        if !path.exists() {
            debug!("No index cache at {}", path.display());
            return Ok(None);
        }

        let raw = fs::read(&path).map_err(|e| IndexError::CacheRead {
            path: path.clone(),
            source: e,
        })?;
        let cached: CacheFile =
            serde_json::from_slice(&raw).map_err(|e| IndexError::CacheFormat {
                path: path.clone(),
                source: e,
            })?;

        if !same_roots(&cached.roots, roots) {
            info!("Index cache {} covers different roots", path.display());
            return Ok(None);
        }

        let age = Utc::now() - cached.built_at;
        if age > self.ttl {
            info!(
                "Index cache {} is stale ({} hours old)",
                path.display(),
                age.num_hours()
            );
            return Ok(None);
        }

        let mut index = SearchIndex::with_timestamp(cached.roots, cached.built_at);
        for entry in cached.entries {
            for file in &entry.paths {
                index.insert(entry.key.clone(), file);
            }
        }
        for file in cached.metadata {
            index.record_metadata(file.path, file.metadata);
        }

        Ok(Some(index))
    }

    /// Writes `index` to its cache file and returns the file path.
    pub fn save(&self, index: &SearchIndex) -> Result<PathBuf, IndexError> {
        let path = self.path_for(index.roots());
        fs::create_dir_all(&self.dir).map_err(|e| IndexError::CacheWrite {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut metadata: Vec<CachedFile> = index
            .metadata_entries()
            .map(|(path, metadata)| CachedFile {
                path: path.clone(),
                metadata: metadata.clone(),
            })
            .collect();
        metadata.sort_by(|a, b| a.path.cmp(&b.path));

        let file = CacheFile {
            roots: index.roots().to_vec(),
            built_at: index.built_at(),
            entries: index
                .entries()
                .map(|(key, paths)| CachedEntry {
                    key: key.to_string(),
                    paths: paths.to_vec(),
                })
                .collect(),
            metadata,
        };

        let json = serde_json::to_vec(&file).map_err(|e| IndexError::CacheFormat {
            path: path.clone(),
            source: e,
        })?;

        let tmp = path.with_extension("json.tmp");
        write_then_rename(&tmp, &path, &json).map_err(|e| IndexError::CacheWrite {
            path: path.clone(),
            source: e,
        })?;

        Ok(path)
    }
}

fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::write(tmp, bytes)?;
    fs::rename(tmp, path)
}

fn same_roots(a: &[PathBuf], b: &[PathBuf]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::AudioTags;
    use tempfile::TempDir;

    fn sample_index(roots: Vec<PathBuf>) -> SearchIndex {
        sample_index_at(roots, Utc::now())
    }

    fn sample_index_at(roots: Vec<PathBuf>, built_at: DateTime<Utc>) -> SearchIndex {
        let mut index = SearchIndex::with_timestamp(roots, built_at);
        index.index_file(
            PathBuf::from("/music/A/Song One.mp3"),
            FileMetadata {
                size_bytes: 100,
                tags: Some(AudioTags {
                    title: Some("Song One".to_string()),
                    artist: Some("A".to_string()),
                    duration_secs: Some(180.0),
                    ..Default::default()
                }),
            },
        );
        index.index_file(
            PathBuf::from("/music/B/song_one.flac"),
            FileMetadata {
                size_bytes: 200,
                tags: None,
            },
        );
        index
    }

    #[test]
    fn test_cache_key_is_order_independent() {
        let a = vec![PathBuf::from("/x"), PathBuf::from("/y")];
        let b = vec![PathBuf::from("/y"), PathBuf::from("/x")];
        assert_eq!(IndexCache::cache_key(&a), IndexCache::cache_key(&b));
        assert_eq!(IndexCache::cache_key(&a).len(), 16);
        assert_ne!(
            IndexCache::cache_key(&a),
            IndexCache::cache_key(&[PathBuf::from("/x")])
        );
    }

    #[test]
    fn test_round_trip_preserves_mapping() {
        let dir = TempDir::new().unwrap();
        let cache = IndexCache::new(dir.path(), 24);
        let roots = vec![PathBuf::from("/music")];
        let index = sample_index(roots.clone());

        cache.save(&index).unwrap();
        let loaded = cache.load(&roots).unwrap().expect("cache should load");

        let original: Vec<(String, Vec<PathBuf>)> = index
            .entries()
            .map(|(k, p)| (k.to_string(), p.to_vec()))
            .collect();
        let restored: Vec<(String, Vec<PathBuf>)> = loaded
            .entries()
            .map(|(k, p)| (k.to_string(), p.to_vec()))
            .collect();
        assert_eq!(original, restored);
        assert_eq!(
            loaded.metadata(Path::new("/music/A/Song One.mp3")),
            index.metadata(Path::new("/music/A/Song One.mp3"))
        );
        assert_eq!(loaded.built_at(), index.built_at());
    }

    #[test]
    fn test_missing_cache_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = IndexCache::new(dir.path(), 24);
        assert!(cache.load(&[PathBuf::from("/music")]).unwrap().is_none());
    }

    #[test]
    fn test_stale_cache_is_rejected() {
        let dir = TempDir::new().unwrap();
        let cache = IndexCache::new(dir.path(), 24);
        let roots = vec![PathBuf::from("/music")];
        let index = sample_index_at(roots.clone(), Utc::now() - Duration::hours(25));

        cache.save(&index).unwrap();
        assert!(cache.load(&roots).unwrap().is_none());
    }

    #[test]
    fn test_mismatched_roots_are_rejected() {
        let dir = TempDir::new().unwrap();
        let cache = IndexCache::new(dir.path(), 24);
        let index = sample_index(vec![PathBuf::from("/music")]);
        let path = cache.save(&index).unwrap();

        // Same file name, different recorded roots.
        let other_roots = vec![PathBuf::from("/elsewhere")];
        fs::rename(&path, cache.path_for(&other_roots)).unwrap();
        assert!(cache.load(&other_roots).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_cache_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cache = IndexCache::new(dir.path(), 24);
        let roots = vec![PathBuf::from("/music")];
        fs::write(cache.path_for(&roots), b"{not json").unwrap();
        assert!(matches!(
            cache.load(&roots),
            Err(IndexError::CacheFormat { .. })
        ));
    }
}
