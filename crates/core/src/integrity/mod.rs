//! Per-file integrity checking.
//!
//! [`IntegrityChecker`] runs a fixed sequence of checks against one audio
//! file and stops at the first failure:
//!
//! 1. existence
//! 2. metadata presence (`.m4p` files are always DRM)
//! 3. DRM codec marker for `.m4a`
//! 4. truncation, comparing tag duration against a [`DurationProbe`]
//! 5. end-of-file decode through a [`TailDecoder`]
//!
//! The external tools sit behind traits so the pipeline can be exercised
//! with the mocks in [`crate::testing`]. Decoder output is interpreted only
//! in [`diagnostics`].
//!
//! # Example
//!
//! ```ignore
//! use trackmend_core::integrity::{IntegrityChecker, IntegrityConfig};
//!
//! let checker = IntegrityChecker::with_system_tools(IntegrityConfig::default());
//! let verdict = checker.check(Path::new("/music/song.mp3")).await;
//! if !verdict.ok {
//!     println!("{}: {:?}", verdict.path.display(), verdict.failure);
//! }
//! ```

mod checker;
mod config;
pub mod diagnostics;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use checker::IntegrityChecker;
pub use config::IntegrityConfig;
pub use diagnostics::{classify_decode, DecodeClassification, CORRUPT_EXIT_CODE};
pub use error::ProbeError;
pub use ffmpeg::{FfmpegTailDecoder, FfprobeDurationProbe};
pub use traits::{DurationProbe, TailDecoder};
pub use types::{DecodeOutcome, FailureReason, IntegrityCheck, IntegrityVerdict};
