//! Testing utilities and mock collaborators.
//!
//! The mocks stand in for the tag reader and the external ffmpeg tools so
//! the index, integrity and scanner code can be exercised without real
//! audio files.
//!
//! # Example
//!
//! ```rust,ignore
//! use trackmend_core::testing::{fixtures, MockDecoder, MockDurationProbe, MockMetadataReader};
//!
//! let reader = Arc::new(MockMetadataReader::new());
//! reader.set_default_tags(fixtures::audio_tags("Song", "Artist", 180.0));
//!
//! let probe = Arc::new(MockDurationProbe::new());
//! probe.set_duration("/music/song.mp3", 170.0).await;
//!
//! let checker = IntegrityChecker::new(config, reader, probe, Arc::new(MockDecoder::new()));
//! ```

mod mock_metadata_reader;
mod mock_tools;

pub use mock_metadata_reader::MockMetadataReader;
pub use mock_tools::{MockDecoder, MockDurationProbe};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;

    use crate::index::CandidateFile;
    use crate::matcher::TrackDescriptor;
    use crate::metadata::AudioTags;

    /// Tags with a title, artist and duration.
    pub fn audio_tags(title: &str, artist: &str, duration_secs: f64) -> AudioTags {
        AudioTags {
            title: Some(title.to_string()),
            artist: Some(artist.to_string()),
            duration_secs: Some(duration_secs),
            bitrate_kbps: Some(256),
            has_tags: true,
            ..Default::default()
        }
    }

    /// Tags for an album track.
    pub fn album_track_tags(artist: &str, album: &str, title: &str, track_number: u32) -> AudioTags {
        AudioTags {
            album: Some(album.to_string()),
            track_number: Some(track_number),
            ..audio_tags(title, artist, 180.0 + f64::from(track_number) * 10.0)
        }
    }

    /// A wanted track with an artist.
    pub fn track(name: &str, artist: &str) -> TrackDescriptor {
        TrackDescriptor::new(name).with_artist(artist)
    }

    /// A candidate file that does not need to exist on disk.
    pub fn candidate(path: &str, size_bytes: u64) -> CandidateFile {
        CandidateFile {
            path: PathBuf::from(path),
            size_bytes,
            duration_secs: None,
            tags: None,
        }
    }

    /// A candidate with a known duration.
    pub fn timed_candidate(path: &str, size_bytes: u64, duration_secs: f64) -> CandidateFile {
        CandidateFile {
            duration_secs: Some(duration_secs),
            ..candidate(path, size_bytes)
        }
    }
}
