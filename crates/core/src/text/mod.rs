//! Text canonicalization shared by the search index and the scoring engine.
//!
//! Both sides must compare strings produced by the same [`normalize`]
//! function, otherwise index keys and filename comparisons drift apart.

mod normalize;
mod similarity;

pub use normalize::{normalize, normalized_words};
pub use similarity::{contains_word, partial_ratio};
