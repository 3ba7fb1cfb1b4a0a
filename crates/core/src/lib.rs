pub mod config;
pub mod index;
pub mod integrity;
pub mod matcher;
pub mod metadata;
pub mod quarantine;
pub mod scanner;
pub mod testing;
pub mod text;

pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use index::{CandidateFile, IndexCache, IndexConfig, IndexError, SearchIndex};
pub use integrity::{
    DurationProbe, FailureReason, IntegrityChecker, IntegrityConfig, IntegrityVerdict,
    ProbeError, TailDecoder,
};
pub use matcher::{
    Decision, MatcherConfig, ScoreBreakdown, ScoredCandidate, TrackDescriptor, TrackMatcher,
};
pub use metadata::{AudioTags, LoftyMetadataReader, MetadataError, MetadataReader};
pub use quarantine::{
    QuarantineBucket, QuarantineConfig, QuarantineError, QuarantineRecord, QuarantineRouter,
};
pub use scanner::{
    Checkpoint, DirectoryScanner, ScanError, ScanOptions, ScanReport, ScanStats, ScannerConfig,
};
pub use text::normalize;
