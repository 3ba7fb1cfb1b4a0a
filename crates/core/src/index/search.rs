//! Name, size and combined lookups over a built index.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::text::normalize;

use super::search_index::SearchIndex;
use super::types::{file_stem, CandidateFile};

/// Maximum number of paths gathered by a substring or word match.
pub const PARTIAL_MATCH_CAP: usize = 100;

/// Maximum number of paths gathered by the artist-and-name substring match.
const ARTIST_PARTIAL_MATCH_CAP: usize = 50;

/// Queries of this many characters or fewer skip substring matching.
const MIN_PARTIAL_QUERY_CHARS: usize = 3;

/// Artist words shorter than this never count as a weak artist match.
const MIN_WEAK_ARTIST_WORD_CHARS: usize = 4;

/// Results kept when only weak artist matches exist.
pub const WEAK_ARTIST_MATCH_LIMIT: usize = 5;

/// Size tolerance used to rank name results by size.
const SIZE_TOLERANCE: f64 = 0.01;

impl SearchIndex {
    /// Finds candidates for a track name, best first.
    ///
    /// Tiers are tried in order and the first non-empty one wins:
    /// 1. exact normalized key,
    /// 2. the name with any parenthetical suffix removed,
    /// 3. substring containment in either direction, then all query words
    ///    present (both capped at [`PARTIAL_MATCH_CAP`] paths, queries longer
    ///    than three characters only),
    /// 4. with an artist: "artist name" and "name artist" keys, then keys
    ///    containing both artist and name.
    ///
    /// When an artist is given, the results are then filtered by artist
    /// evidence in the path (see [`Self::filter_by_artist`]).
    pub fn find_by_name(&self, name: &str, artist: Option<&str>) -> Vec<CandidateFile> {
        self.find_paths_by_name(name, artist)
            .into_iter()
            .map(|path| self.candidate(&path))
            .collect()
    }

    /// Like [`Self::find_by_name`], then orders results into exact-size,
    /// within-1%, and other tiers when a size is known and more than one
    /// result exists.
    pub fn find_by_name_and_size(
        &self,
        name: &str,
        size: Option<u64>,
        artist: Option<&str>,
    ) -> Vec<CandidateFile> {
        let results = self.find_by_name(name, artist);

        let size = match size {
            Some(size) if size > 0 && results.len() > 1 => size,
            _ => return results,
        };

        let tolerance = size as f64 * SIZE_TOLERANCE;
        let mut exact = Vec::new();
        let mut close = Vec::new();
        let mut other = Vec::new();
        for candidate in results {
            if candidate.size_bytes == size {
                exact.push(candidate);
            } else if (candidate.size_bytes as f64 - size as f64).abs() < tolerance {
                close.push(candidate);
            } else {
                other.push(candidate);
            }
        }

        exact.into_iter().chain(close).chain(other).collect()
    }

    /// Finds indexed files whose size is within `tolerance` (a fraction,
    /// 0.01 = 1%) of `size`, capped at [`PARTIAL_MATCH_CAP`] results.
    pub fn find_by_size(&self, size: u64, tolerance: f64) -> Vec<CandidateFile> {
        if size == 0 {
            return Vec::new();
        }

        let min = (size as f64 * (1.0 - tolerance)) as u64;
        let max = (size as f64 * (1.0 + tolerance)) as u64;

        let mut seen: HashSet<&Path> = HashSet::new();
        let mut results = Vec::new();
        for (_, paths) in self.entries() {
            for path in paths {
                if !seen.insert(path.as_path()) {
                    continue;
                }
                let Some(metadata) = self.metadata(path) else {
                    continue;
                };
                if (min..=max).contains(&metadata.size_bytes) {
                    results.push(CandidateFile::from_metadata(path.clone(), metadata));
                    if results.len() >= PARTIAL_MATCH_CAP {
                        debug!("Found {} size matches, stopping search", results.len());
                        return results;
                    }
                }
            }
        }

        results
    }

    fn find_paths_by_name(&self, name: &str, artist: Option<&str>) -> Vec<PathBuf> {
        let normalized_name = normalize(name);
        if normalized_name.is_empty() {
            return Vec::new();
        }
        let normalized_artist = artist.map(normalize).filter(|a| !a.is_empty());

        debug!(
            "Searching for '{}' (normalized '{}'), artist {:?}, {} keys indexed",
            name,
            normalized_name,
            normalized_artist,
            self.key_count()
        );

        let mut results: Vec<PathBuf> = self.lookup(&normalized_name).to_vec();

        if results.is_empty() && name.contains('(') {
            let base = normalize(name.split('(').next().unwrap_or_default());
            if !base.is_empty() {
                debug!("Retrying without parenthetical: '{}'", base);
                results.extend_from_slice(self.lookup(&base));
            }
        }

        if results.is_empty() && normalized_name.chars().count() > MIN_PARTIAL_QUERY_CHARS {
            results = self.collect_capped(PARTIAL_MATCH_CAP, |key| {
                key.contains(normalized_name.as_str()) || normalized_name.contains(key)
            });

            if results.is_empty() {
                let words: Vec<&str> = normalized_name.split(' ').collect();
                if words.len() >= 2 {
                    results = self.collect_capped(PARTIAL_MATCH_CAP, |key| {
                        words.iter().all(|word| key.contains(word))
                    });
                }
            }
        }

        if results.is_empty() {
            if let Some(artist) = normalized_artist.as_deref() {
                for combo in [
                    format!("{} {}", artist, normalized_name),
                    format!("{} {}", normalized_name, artist),
                ] {
                    results.extend_from_slice(self.lookup(&combo));
                }

                if results.is_empty() {
                    results = self.collect_capped(ARTIST_PARTIAL_MATCH_CAP, |key| {
                        key.contains(artist) && key.contains(normalized_name.as_str())
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        results.retain(|path| seen.insert(path.clone()));

        results.sort_by_key(|path| {
            let name_match = normalize(&file_stem(path)) == normalized_name;
            let artist_in_path = normalized_artist
                .as_deref()
                .is_some_and(|artist| normalized_path(path).contains(artist));
            (!name_match, !artist_in_path, path.components().count())
        });

        match normalized_artist.as_deref() {
            Some(artist) => Self::filter_by_artist(results, artist, &normalized_name),
            None => results,
        }
    }

    /// Applies artist evidence to name results.
    ///
    /// Strong matches (the whole artist appears in the path) win. Without
    /// any, weak matches (an artist word of four or more characters appears)
    /// are kept, at most [`WEAK_ARTIST_MATCH_LIMIT`]. Without either, the
    /// results survive only if the top one's filename is exactly the query.
    ///
    /// The last rule can drop a correct but oddly-filed track; it is a
    /// tuning knob, not a guarantee.
    fn filter_by_artist(results: Vec<PathBuf>, artist: &str, normalized_name: &str) -> Vec<PathBuf> {
        if results.is_empty() {
            return results;
        }

        let artist_words: Vec<&str> = artist
            .split(' ')
            .filter(|w| w.chars().count() >= MIN_WEAK_ARTIST_WORD_CHARS)
            .collect();

        let mut strong = Vec::new();
        let mut weak = Vec::new();
        for path in &results {
            let haystack = normalized_path(path);
            if haystack.contains(artist) {
                strong.push(path.clone());
            } else if artist_words.iter().any(|word| haystack.contains(word)) {
                weak.push(path.clone());
            }
        }

        if !strong.is_empty() {
            return strong;
        }
        if !weak.is_empty() {
            weak.truncate(WEAK_ARTIST_MATCH_LIMIT);
            return weak;
        }

        let top_is_exact = normalize(&file_stem(&results[0])) == normalized_name;
        if top_is_exact {
            results
        } else {
            info!(
                "Rejecting {} result(s) for '{}': no path mentions artist '{}'",
                results.len(),
                normalized_name,
                artist
            );
            Vec::new()
        }
    }

    /// Paths of every key matching `pred`, in key order, stopping before the
    /// next key once `cap` paths have been gathered.
    fn collect_capped(&self, cap: usize, pred: impl Fn(&str) -> bool) -> Vec<PathBuf> {
        let mut results = Vec::new();
        for (key, paths) in self.entries() {
            if results.len() >= cap {
                break;
            }
            if pred(key) {
                debug!("Partial match on key '{}' ({} files)", key, paths.len());
                results.extend_from_slice(paths);
            }
        }
        results
    }
}

fn normalized_path(path: &Path) -> String {
    normalize(&path.to_string_lossy())
}
