//! The in-memory name index.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::types::{index_keys, CandidateFile, FileMetadata};

/// Mapping from normalized name to the files indexed under it.
///
/// Keys keep their first-insertion order and each key's paths keep
/// insertion order with duplicates suppressed; the search cascade depends
/// on both orders being deterministic.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    roots: Vec<PathBuf>,
    built_at: DateTime<Utc>,
    keys: Vec<String>,
    entries: HashMap<String, Vec<PathBuf>>,
    metadata: HashMap<PathBuf, FileMetadata>,
}

impl SearchIndex {
    /// Creates an empty index for the given (canonical) roots.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self::with_timestamp(roots, Utc::now())
    }

    pub(crate) fn with_timestamp(roots: Vec<PathBuf>, built_at: DateTime<Utc>) -> Self {
        Self {
            roots,
            built_at,
            keys: Vec::new(),
            entries: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// Root directories this index covers.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// When the index was built.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Number of distinct files.
    pub fn file_count(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Adds `path` under every key derived from its name and tags.
    pub fn index_file(&mut self, path: PathBuf, metadata: FileMetadata) {
        for key in index_keys(&path, metadata.tags.as_ref()) {
            self.insert(key, &path);
        }
        self.metadata.insert(path, metadata);
    }

    /// Adds `path` under a single key.
    pub fn insert(&mut self, key: String, path: &Path) {
        if key.is_empty() {
            return;
        }
        match self.entries.get_mut(&key) {
            Some(paths) => {
                if !paths.iter().any(|p| p == path) {
                    paths.push(path.to_path_buf());
                }
            }
            None => {
                self.entries.insert(key.clone(), vec![path.to_path_buf()]);
                self.keys.push(key);
            }
        }
    }

    pub(crate) fn record_metadata(&mut self, path: PathBuf, metadata: FileMetadata) {
        self.metadata.insert(path, metadata);
    }

    /// Paths indexed under exactly `key`.
    pub fn lookup(&self, key: &str) -> &[PathBuf] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All keys with their paths, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.keys
            .iter()
            .map(move |k| (k.as_str(), self.lookup(k)))
    }

    /// Cached metadata for an indexed path.
    pub fn metadata(&self, path: &Path) -> Option<&FileMetadata> {
        self.metadata.get(path)
    }

    /// All cached metadata.
    pub fn metadata_entries(&self) -> impl Iterator<Item = (&PathBuf, &FileMetadata)> {
        self.metadata.iter()
    }

    /// Candidate view of an indexed path; unknown paths get a zero size.
    pub fn candidate(&self, path: &Path) -> CandidateFile {
        match self.metadata.get(path) {
            Some(metadata) => CandidateFile::from_metadata(path.to_path_buf(), metadata),
            None => CandidateFile {
                path: path.to_path_buf(),
                size_bytes: 0,
                duration_secs: None,
                tags: None,
            },
        }
    }
}
