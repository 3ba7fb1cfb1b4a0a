//! Unicode-aware string canonicalization.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalizes a string for name comparisons.
///
/// Applies compatibility decomposition, drops combining marks (accents),
/// lowercases, turns every non-alphanumeric character (including `-` and
/// `_`) into a space, then collapses whitespace runs and trims.
///
/// ```
/// use trackmend_core::text::normalize;
///
/// assert_eq!(normalize("Beyoncé - Halo_(Live)"), "beyonce halo live");
/// ```
pub fn normalize(text: &str) -> String {
    let spaced: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes `text` and splits it into words.
pub fn normalized_words(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_strips_accents() {
        assert_eq!(normalize("Sigur Rós"), "sigur ros");
        assert_eq!(normalize("Motörhead"), "motorhead");
        assert_eq!(normalize("Café Tacvba"), "cafe tacvba");
    }

    #[test]
    fn test_punctuation_and_separators() {
        assert_eq!(normalize("01-Track_Name.mp3"), "01 track name mp3");
        assert_eq!(normalize("AC/DC"), "ac dc");
        assert_eq!(normalize("Don't Stop (Remastered)"), "don t stop remastered");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  a \t  b\n c  "), "a b c");
    }

    #[test]
    fn test_keeps_non_latin_letters() {
        assert_eq!(normalize("東京 Tokyo"), "東京 tokyo");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Beyoncé - Halo",
            "01 - Intro (Live @ Wembley) [2005]",
            "  ÀÉÎÕÜ ñ ç  ",
            "AC/DC -- Back_In_Black",
            "Ⅻ ﬁne ℌello",
            "東京 Tokyo",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_normalized_words() {
        assert_eq!(
            normalized_words("The Beatles - Let It Be"),
            vec!["the", "beatles", "let", "it", "be"]
        );
        assert!(normalized_words("--").is_empty());
    }
}
