//! Text normalization applied to every record before matching.
//!
//! Titles and drug names are case-folded here so that matching never has to
//! be case-insensitive itself. Journals keep their case because they are
//! graph keys shown to the reader.

use unicode_normalization::UnicodeNormalization;

/// Trims, lowercases and NFC-composes a publication title.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase().nfc().collect()
}

/// Drug names are normalized exactly like titles.
#[must_use]
pub fn normalize_drug(drug: &str) -> String {
    normalize_title(drug)
}

/// Trims and NFC-composes a journal name, preserving case.
#[must_use]
pub fn normalize_journal(journal: &str) -> String {
    journal.trim().nfc().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("  Aspirin For Headache\t", "aspirin for headache")]
    #[case("ÉTUDE", "étude")]
    // "e" followed by a combining acute accent
    #[case("Cafe\u{301}ine", "caf\u{e9}ine")]
    #[case("", "")]
    fn test_normalize_title(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_title(input), expected);
    }

    #[test]
    fn test_normalize_journal_keeps_case() {
        assert_eq!(
            normalize_journal(" Journal of Emergency Nursing "),
            "Journal of Emergency Nursing"
        );
        assert_eq!(normalize_journal("Journal de l'Ordre\u{301}"), "Journal de l'Ordr\u{e9}");
    }

    #[test]
    fn test_normalize_drug() {
        assert_eq!(normalize_drug(" BETAMETHASONE "), "betamethasone");
    }
}
