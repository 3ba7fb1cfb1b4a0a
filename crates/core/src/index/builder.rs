//! Directory walking and index construction.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::metadata::{AudioTags, MetadataReader};

use super::cache::IndexCache;
use super::config::IndexConfig;
use super::error::IndexError;
use super::search_index::SearchIndex;
use super::types::{is_audio_file, FileMetadata};

/// Log a progress line every this many files per root.
const PROGRESS_LOG_INTERVAL: usize = 1000;

/// An audio file found under one root.
struct ScannedFile {
    path: PathBuf,
    size_bytes: u64,
    tags: Option<AudioTags>,
}

/// Canonicalizes, sorts and deduplicates root directories.
///
/// Roots that cannot be resolved are logged and dropped.
pub fn canonical_roots(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut resolved: Vec<PathBuf> = roots
        .iter()
        .filter_map(|root| match std::fs::canonicalize(root) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping root {}: {}", root.display(), e);
                None
            }
        })
        .collect();
    resolved.sort();
    resolved.dedup();
    resolved
}

impl SearchIndex {
    /// Walks every root and indexes the audio files found.
    ///
    /// Roots are walked in parallel; their results are merged in sorted
    /// root order, and each root is walked in file-name order, so the
    /// resulting per-key order is deterministic.
    pub fn build(
        roots: &[PathBuf],
        config: &IndexConfig,
        reader: &dyn MetadataReader,
    ) -> Result<Self, IndexError> {
        if roots.is_empty() {
            return Err(IndexError::NoRoots);
        }

        let start = Instant::now();
        let roots = canonical_roots(roots);
        info!("Building search index over {} root(s)", roots.len());

        let scanned: Vec<Vec<ScannedFile>> = roots
            .par_iter()
            .map(|root| scan_root(root, config, reader))
            .collect();

        let mut index = SearchIndex::new(roots);
        for file in scanned.into_iter().flatten() {
            index.index_file(
                file.path,
                FileMetadata {
                    size_bytes: file.size_bytes,
                    tags: file.tags,
                },
            );
        }

        info!(
            "Indexed {} files under {} keys in {} ms",
            index.file_count(),
            index.key_count(),
            start.elapsed().as_millis()
        );

        Ok(index)
    }

    /// Returns a fresh cached index for `roots` if one exists, otherwise
    /// builds one and stores it in the cache.
    ///
    /// Cache problems never fail the call; they only force a rebuild.
    pub fn load_or_build(
        roots: &[PathBuf],
        config: &IndexConfig,
        reader: &dyn MetadataReader,
    ) -> Result<Self, IndexError> {
        let Some(cache) = IndexCache::from_config(config) else {
            return Self::build(roots, config, reader);
        };

        let canonical = canonical_roots(roots);
        match cache.load(&canonical) {
            Ok(Some(index)) => {
                info!(
                    "Using cached index ({} files, built {})",
                    index.file_count(),
                    index.built_at()
                );
                return Ok(index);
            }
            Ok(None) => info!("No usable index cache, rebuilding"),
            Err(e) => warn!("Ignoring index cache: {}", e),
        }

        let index = Self::build(roots, config, reader)?;
        match cache.save(&index) {
            Ok(path) => debug!("Saved index cache to {}", path.display()),
            Err(e) => warn!("Failed to save index cache: {}", e),
        }
        Ok(index)
    }
}

/// Walks one root and reads tags for every audio file under it.
fn scan_root(root: &Path, config: &IndexConfig, reader: &dyn MetadataReader) -> Vec<ScannedFile> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(config.follow_links)
        .max_depth(config.max_depth)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_audio_file(entry.path()) {
            continue;
        }

        let size_bytes = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!("Cannot stat {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if size_bytes < config.min_file_size_bytes {
            debug!("Skipping small file {} ({} bytes)", entry.path().display(), size_bytes);
            continue;
        }

        let tags = match reader.read(entry.path()) {
            Ok(tags) => Some(tags),
            Err(e) => {
                debug!("No tags for {}: {}", entry.path().display(), e);
                None
            }
        };

        files.push(ScannedFile {
            path: entry.into_path(),
            size_bytes,
            tags,
        });

        if files.len() % PROGRESS_LOG_INTERVAL == 0 {
            info!("Indexed {} files under {}", files.len(), root.display());
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockMetadataReader;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path, bytes: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; bytes]).unwrap();
    }

    #[test]
    fn test_build_requires_roots() {
        let reader = MockMetadataReader::new();
        let result = SearchIndex::build(&[], &IndexConfig::default(), &reader);
        assert!(matches!(result, Err(IndexError::NoRoots)));
    }

    #[test]
    fn test_build_indexes_audio_files_only() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("Artist/Album/01 Song.mp3"), 10);
        touch(&dir.path().join("Artist/Album/cover.jpg"), 10);
        touch(&dir.path().join("Other/Track.FLAC"), 10);

        let reader = MockMetadataReader::new();
        let index =
            SearchIndex::build(&[dir.path().to_path_buf()], &IndexConfig::default(), &reader)
                .unwrap();

        assert_eq!(index.file_count(), 2);
        assert_eq!(index.lookup("01 song").len(), 1);
        assert_eq!(index.lookup("track").len(), 1);
        assert!(index.lookup("cover").is_empty());
    }

    #[test]
    fn test_build_uses_tags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track07.mp3");
        touch(&path, 10);

        let reader = MockMetadataReader::new();
        reader.set_tags(
            fs::canonicalize(&path).unwrap(),
            AudioTags {
                title: Some("Blue in Green".to_string()),
                artist: Some("Miles Davis".to_string()),
                ..Default::default()
            },
        );

        let index =
            SearchIndex::build(&[dir.path().to_path_buf()], &IndexConfig::default(), &reader)
                .unwrap();

        assert_eq!(index.lookup("blue in green").len(), 1);
        assert_eq!(index.lookup("miles davis blue in green").len(), 1);
        assert_eq!(index.lookup("track07").len(), 1);
    }

    #[test]
    fn test_build_skips_small_files() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("tiny.mp3"), 10);
        touch(&dir.path().join("big.mp3"), 2048);

        let config = IndexConfig::default().with_min_file_size(1024);
        let reader = MockMetadataReader::new();
        let index = SearchIndex::build(&[dir.path().to_path_buf()], &config, &reader).unwrap();

        assert_eq!(index.file_count(), 1);
        assert!(index.lookup("tiny").is_empty());
    }

    #[test]
    fn test_build_tolerates_missing_root() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("song.mp3"), 10);

        let roots = vec![dir.path().join("missing"), dir.path().to_path_buf()];
        let reader = MockMetadataReader::new();
        let index = SearchIndex::build(&roots, &IndexConfig::default(), &reader).unwrap();

        assert_eq!(index.roots().len(), 1);
        assert_eq!(index.file_count(), 1);
    }

    #[test]
    fn test_merge_order_is_deterministic() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        touch(&a.path().join("x/song.mp3"), 10);
        touch(&a.path().join("a/song.mp3"), 10);
        touch(&b.path().join("song.mp3"), 10);

        let roots = vec![b.path().to_path_buf(), a.path().to_path_buf()];
        let reader = MockMetadataReader::new();
        let first = SearchIndex::build(&roots, &IndexConfig::default(), &reader).unwrap();
        let second = SearchIndex::build(&roots, &IndexConfig::default(), &reader).unwrap();

        assert_eq!(first.lookup("song").len(), 3);
        assert_eq!(first.lookup("song"), second.lookup("song"));

        let canonical_a = fs::canonicalize(a.path()).unwrap();
        let a_paths: Vec<&PathBuf> = first
            .lookup("song")
            .iter()
            .filter(|p| p.starts_with(&canonical_a))
            .collect();
        assert!(a_paths[0].ends_with("a/song.mp3"));
        assert!(a_paths[1].ends_with("x/song.mp3"));
    }
}
