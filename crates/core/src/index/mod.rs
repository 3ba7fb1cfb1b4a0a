//! Searchable name index over one or more music directories.
//!
//! Every audio file is written under several normalized keys (tag title,
//! "artist title", filename stem) so that lookups can trade precision for
//! recall through the cascade in [`SearchIndex::find_by_name`].
//!
//! # Example
//!
//! ```ignore
//! use trackmend_core::index::{IndexConfig, SearchIndex};
//! use trackmend_core::metadata::LoftyMetadataReader;
//!
//! let config = IndexConfig::default().with_cache_dir(PathBuf::from("/tmp/trackmend"));
//! let index = SearchIndex::load_or_build(&config.roots, &config, &LoftyMetadataReader::new())?;
//!
//! for candidate in index.find_by_name_and_size("Let It Be", Some(8_123_456), Some("The Beatles")) {
//!     println!("{}", candidate.path.display());
//! }
//! ```

mod builder;
mod cache;
mod config;
mod error;
mod search;
mod search_index;
mod types;

pub use builder::canonical_roots;
pub use cache::IndexCache;
pub use config::IndexConfig;
pub use error::IndexError;
pub use search::{PARTIAL_MATCH_CAP, WEAK_ARTIST_MATCH_LIMIT};
pub use search_index::SearchIndex;
pub use types::{index_keys, is_audio_file, CandidateFile, FileMetadata, AUDIO_EXTENSIONS};
