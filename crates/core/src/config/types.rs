use serde::{Deserialize, Serialize};

use crate::index::IndexConfig;
use crate::integrity::IntegrityConfig;
use crate::matcher::MatcherConfig;
use crate::quarantine::QuarantineConfig;
use crate::scanner::ScannerConfig;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub integrity: IntegrityConfig,
    #[serde(default)]
    pub quarantine: QuarantineConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.index.roots.is_empty());
        assert_eq!(config.index.cache_ttl_hours, 24);
        assert_eq!(config.matcher.auto_accept_threshold, 88);
        assert_eq!(config.integrity.probe_timeout_secs, 5);
        assert_eq!(config.quarantine.root, PathBuf::from("quarantine"));
        assert_eq!(config.scanner.max_parallel_checks, 4);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[index]
roots = ["/music", "/backup/music"]
cache_dir = "/var/cache/trackmend"
cache_ttl_hours = 12
min_file_size_bytes = 1024

[matcher]
auto_accept_threshold = 90
auto_replace_threshold = 60

[matcher.weights]
exact_track_name = 45

[matcher.penalties]
wrong_content_keywords = ["podcast", "karaoke"]

[integrity]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
decode_timeout_secs = 10

[quarantine]
root = "/music/.quarantine"

[scanner]
max_parallel_checks = 8
checkpoint_interval = 50
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.index.roots.len(), 2);
        assert_eq!(
            config.index.cache_dir,
            Some(PathBuf::from("/var/cache/trackmend"))
        );
        assert_eq!(config.index.cache_ttl_hours, 12);
        assert_eq!(config.matcher.auto_accept_threshold, 90);
        assert_eq!(config.matcher.single_candidate_threshold, 70);
        assert_eq!(config.matcher.weights.exact_track_name, 45);
        assert_eq!(config.matcher.weights.exact_size, 15);
        assert_eq!(
            config.matcher.penalties.wrong_content_keywords,
            vec!["podcast", "karaoke"]
        );
        assert_eq!(config.integrity.decode_timeout_secs, 10);
        assert_eq!(config.integrity.probe_timeout_secs, 5);
        assert_eq!(config.quarantine.root, PathBuf::from("/music/.quarantine"));
        assert_eq!(config.scanner.max_parallel_checks, 8);
    }
}
