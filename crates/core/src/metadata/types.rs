//! Types for the metadata module.

use serde::{Deserialize, Serialize};

/// Tags and stream properties read from one audio file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioTags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// Duration declared by the container headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
    /// Codec name, only filled for MP4 containers (e.g. "AAC", "ALAC").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// Whether the file carries at least one tag block.
    #[serde(default)]
    pub has_tags: bool,
}

impl AudioTags {
    /// Whether the file has any tag or basic stream info at all.
    pub fn has_metadata(&self) -> bool {
        self.has_tags
            || self.duration_secs.is_some()
            || self.bitrate_kbps.is_some()
            || self.codec.is_some()
    }

    /// Title, if present and not blank.
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Artist, if present and not blank.
    pub fn artist(&self) -> Option<&str> {
        non_blank(self.artist.as_deref())
    }

    /// Whether the MP4 codec identifier carries the protected-content marker.
    pub fn is_drm_codec(&self) -> bool {
        self.codec.as_deref().is_some_and(Self::is_drm_codec_name)
    }

    /// Whether a codec name or sample-entry fourcc marks protected content.
    pub fn is_drm_codec_name(codec: &str) -> bool {
        codec.to_lowercase().contains("drms")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_metadata() {
        assert!(!AudioTags::default().has_metadata());
    }

    #[test]
    fn test_stream_info_counts_as_metadata() {
        let tags = AudioTags {
            duration_secs: Some(12.0),
            ..Default::default()
        };
        assert!(tags.has_metadata());
    }

    #[test]
    fn test_blank_title_is_none() {
        let tags = AudioTags {
            title: Some("   ".to_string()),
            artist: Some(" Nina Simone ".to_string()),
            ..Default::default()
        };
        assert_eq!(tags.title(), None);
        assert_eq!(tags.artist(), Some("Nina Simone"));
    }

    #[test]
    fn test_drm_codec() {
        let drm = AudioTags {
            codec: Some("DRMS".to_string()),
            ..Default::default()
        };
        let aac = AudioTags {
            codec: Some("AAC".to_string()),
            ..Default::default()
        };
        assert!(drm.is_drm_codec());
        assert!(!aac.is_drm_codec());
        assert!(!AudioTags::default().is_drm_codec());
    }
}
