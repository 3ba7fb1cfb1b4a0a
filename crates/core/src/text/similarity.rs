//! Fuzzy and word-boundary matching over normalized strings.

/// Best similarity (0-100) between the shorter string and any equally long
/// window of the longer one.
///
/// Each window is compared with the normalized Levenshtein similarity, so an
/// exact substring scores 100.
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let window = shorter.chars().count();
    if window == 0 {
        return 0;
    }

    let longer: Vec<char> = longer.chars().collect();
    let mut best = 0.0f64;
    for start in 0..=(longer.len() - window) {
        let slice: String = longer[start..start + window].iter().collect();
        let ratio = strsim::normalized_levenshtein(shorter, &slice);
        if ratio > best {
            best = ratio;
            if ratio >= 1.0 {
                break;
            }
        }
    }

    (best * 100.0).round() as u32
}

/// Whether `needle` occurs in `haystack` with no alphanumeric character
/// directly before or after it.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(needle).any(|(idx, _)| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
