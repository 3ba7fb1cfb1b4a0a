//! Tag reader backed by the `lofty` crate.

use lofty::config::ParseOptions;
use lofty::file::{AudioFile, FileType, TaggedFileExt};
use lofty::mp4::Mp4File;
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use super::error::MetadataError;
use super::traits::MetadataReader;
use super::types::AudioTags;

/// Reads tags with `lofty`, preferring the container's primary tag.
#[derive(Debug, Clone, Default)]
pub struct LoftyMetadataReader;

impl LoftyMetadataReader {
    pub fn new() -> Self {
        Self
    }

    /// Codec name of an MP4 container's audio track, as lofty reports it.
    ///
    /// lofty only names the codecs it can parse and reports everything else
    /// (protected `drms` entries included) as `Unknown`; the sample-entry
    /// fourcc comes from ffprobe in the integrity pipeline.
    fn mp4_codec(path: &Path) -> Option<String> {
        let mut file = File::open(path).ok()?;
        let mp4 = Mp4File::read_from(&mut file, ParseOptions::new().read_properties(true)).ok()?;
        Some(format!("{:?}", mp4.properties().codec()))
    }
}

impl MetadataReader for LoftyMetadataReader {
    fn name(&self) -> &str {
        "lofty"
    }

    fn read(&self, path: &Path) -> Result<AudioTags, MetadataError> {
        if !path.exists() {
            return Err(MetadataError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let tagged = Probe::open(path)
            .map_err(|e| MetadataError::unreadable(path, e.to_string()))?
            .options(ParseOptions::new().read_properties(true))
            .read()
            .map_err(|e| MetadataError::unreadable(path, e.to_string()))?;

        let properties = tagged.properties();
        let duration = properties.duration();
        let tag = tagged.primary_tag().or_else(|| tagged.first_tag());

        let codec = if tagged.file_type() == FileType::Mp4 {
            Self::mp4_codec(path)
        } else {
            None
        };

        let tags = AudioTags {
            title: tag.and_then(|t| t.title().map(|s| s.to_string())),
            artist: tag.and_then(|t| t.artist().map(|s| s.to_string())),
            album: tag.and_then(|t| t.album().map(|s| s.to_string())),
            track_number: tag.and_then(|t| t.track()),
            year: tag.and_then(|t| t.year()),
            duration_secs: (!duration.is_zero()).then(|| duration.as_secs_f64()),
            bitrate_kbps: properties.audio_bitrate(),
            codec,
            has_tags: !tagged.tags().is_empty(),
        };

        debug!(
            "Read tags from {}: title={:?}, artist={:?}, duration={:?}",
            path.display(),
            tags.title,
            tags.artist,
            tags.duration_secs
        );

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_reader_name() {
        assert_eq!(LoftyMetadataReader::new().name(), "lofty");
    }

    #[test]
    fn test_missing_file() {
        let reader = LoftyMetadataReader::new();
        let result = reader.read(Path::new("/nonexistent/track.mp3"));
        assert!(matches!(result, Err(MetadataError::NotFound { .. })));
    }

    #[test]
    fn test_garbage_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noise.flac");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"this is definitely not a flac stream").unwrap();

        let reader = LoftyMetadataReader::new();
        assert!(matches!(
            reader.read(&path),
            Err(MetadataError::Unreadable { .. })
        ));
    }
}
