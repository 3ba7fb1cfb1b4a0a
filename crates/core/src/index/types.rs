//! Types for the index module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::metadata::AudioTags;
use crate::text::normalize;

/// File extensions recognized as audio, lowercase and without the dot.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "m4p", "aac", "flac", "wav", "ogg", "opus"];

/// Whether `path` has one of the [`AUDIO_EXTENSIONS`].
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.as_str()))
}

/// What the index remembers about a file so cache hits skip re-reading it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<AudioTags>,
}

/// A file discovered while indexing that might satisfy a wanted track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFile {
    /// Absolute path; the candidate's identity.
    pub path: PathBuf,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<AudioTags>,
}

impl CandidateFile {
    /// Builds a candidate from indexed metadata.
    pub fn from_metadata(path: PathBuf, metadata: &FileMetadata) -> Self {
        Self {
            duration_secs: metadata.tags.as_ref().and_then(|t| t.duration_secs),
            size_bytes: metadata.size_bytes,
            tags: metadata.tags.clone(),
            path,
        }
    }

    /// Builds a candidate by reading the file size from disk.
    pub fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let size_bytes = std::fs::metadata(&path)?.len();
        Ok(Self {
            path,
            size_bytes,
            duration_secs: None,
            tags: None,
        })
    }

    /// File name including the extension.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without the extension.
    pub fn stem(&self) -> String {
        file_stem(&self.path)
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Every key a file is indexed under, in insertion order, without
/// duplicates or empty keys.
///
/// 1. normalized tag title,
/// 2. normalized "artist title" when both tags exist,
/// 3. normalized filename stem,
/// 4. lowercased raw stem when it differs from (3).
pub fn index_keys(path: &Path, tags: Option<&AudioTags>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(4);
    let mut push = |key: String| {
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    };

    if let Some(tags) = tags {
        if let Some(title) = tags.title() {
            push(normalize(title));
            if let Some(artist) = tags.artist() {
                push(normalize(&format!("{} {}", artist, title)));
            }
        }
    }

    let stem = file_stem(path);
    push(normalize(&stem));
    push(stem.to_lowercase());

    keys
}
