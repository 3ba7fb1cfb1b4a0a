//! Trait definitions for the metadata module.

use std::path::Path;

use super::error::MetadataError;
use super::types::AudioTags;

/// Reads lightweight tags and stream properties from an audio file.
///
/// Implementations are called from worker threads while indexing, so they
/// must be `Send + Sync`. Reading is blocking.
pub trait MetadataReader: Send + Sync {
    /// Returns the name of this reader implementation.
    fn name(&self) -> &str;

    /// Reads tags and audio properties.
    ///
    /// A file that cannot be parsed yields an error; callers decide whether
    /// that means "no tags" (indexing) or "no metadata" (integrity).
    fn read(&self, path: &Path) -> Result<AudioTags, MetadataError>;
}
