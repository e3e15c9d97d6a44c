//! Pulls domain-significant tokens out of a message.

use crate::lexicon::EXTRACTOR_VOCABULARY;
use crate::scope::contains_term;

/// Extract keywords from `text` in message order.
///
/// The text is lower-cased and split on whitespace. A token is kept when it
/// equals or contains any vocabulary entry, so "weddings" and "office-wear"
/// both survive. Duplicates are kept.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| {
            EXTRACTOR_VOCABULARY
                .iter()
                .any(|term| *word == *term || contains_term(word, term))
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keeps_order_and_duplicates() {
        let kws = extract_keywords("Red saree or red lehenga?");
        assert_eq!(kws, vec!["red", "saree", "red", "lehenga?"]);
    }

    #[test]
    fn test_extract_compound_tokens() {
        let kws = extract_keywords("officewear for weddings");
        assert_eq!(kws, vec!["officewear", "weddings"]);
    }

    #[test]
    fn test_extract_kannada() {
        let kws = extract_keywords("ಮದುವೆ ಸೀರೆ ಬೇಕು");
        assert_eq!(kws, vec!["ಮದುವೆ", "ಸೀರೆ"]);
    }

    #[test]
    fn test_extract_nothing() {
        assert!(extract_keywords("how do I cook rice").is_empty());
        assert!(extract_keywords("").is_empty());
    }
}
