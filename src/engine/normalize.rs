use std::borrow::Cow;

use icu_normalizer::ComposingNormalizerBorrowed;

/// NFC form used whenever two display forms are compared.
pub fn canonical(text: &str) -> Cow<'_, str> {
    ComposingNormalizerBorrowed::new_nfc().normalize(text.trim())
}

/// Comparison key for a sentence word: NFC, surrounding punctuation removed, lowercased.
/// "Apples." and "apples" share a key; inner apostrophes ("don't") are kept.
pub fn token_key(token: &str) -> String {
    canonical(token)
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Whitespace-delimited words of a sentence, as displayed.
pub fn sentence_tokens(sentence: &str) -> Vec<&str> {
    sentence.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_key_strips_edge_punctuation() {
        assert_eq!(token_key("Apples."), "apples");
        assert_eq!(token_key("\"Hello,"), "hello");
        assert_eq!(token_key("don't"), "don't");
    }

    #[test]
    fn test_canonical_composes() {
        // "e" + combining acute vs precomposed "é"
        assert_eq!(canonical("cafe\u{0301}"), canonical("caf\u{00e9}"));
    }

    #[test]
    fn test_sentence_tokens_split_on_any_whitespace() {
        assert_eq!(sentence_tokens("The  cat\tsat."), vec!["The", "cat", "sat."]);
        assert!(sentence_tokens("   ").is_empty());
    }
}
