//! Embedded tag reading.
//!
//! The [`MetadataReader`] trait is the seam between the index/integrity
//! code and whatever library parses audio containers. Production code uses
//! [`LoftyMetadataReader`]; tests use `testing::MockMetadataReader`.

mod error;
mod lofty_reader;
mod traits;
mod types;

pub use error::MetadataError;
pub use lofty_reader::LoftyMetadataReader;
pub use traits::MetadataReader;
pub use types::AudioTags;
