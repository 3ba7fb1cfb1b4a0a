//! Moves failed files into reason-specific holding directories.
//!
//! Layout under the quarantine root:
//!
//! ```text
//! <root>/drm/
//! <root>/no_metadata/
//! <root>/truncated/
//! <root>/corrupted/
//! ```
//!
//! Colliding names get a numeric suffix (`song_1.mp3`, `song_2.mp3`, ...).
//! Every destination is checked to stay under the root before anything is
//! created or moved.

mod config;
mod error;
mod router;
mod types;

pub use config::QuarantineConfig;
pub use error::QuarantineError;
pub use router::QuarantineRouter;
pub use types::{QuarantineBucket, QuarantineRecord};
