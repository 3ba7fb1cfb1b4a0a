//! Batch integrity scanning of a directory tree.
//!
//! [`DirectoryScanner`] walks a directory for audio files, runs the
//! integrity checks over them with bounded concurrency and optionally
//! quarantines the failures. Progress is written to a [`Checkpoint`] file
//! so an interrupted scan can resume where it stopped.

mod checkpoint;
mod config;
mod error;
mod scanner;
mod types;

pub use checkpoint::Checkpoint;
pub use config::ScannerConfig;
pub use error::ScanError;
pub use scanner::DirectoryScanner;
pub use types::{ScanOptions, ScanReport, ScanStats};
