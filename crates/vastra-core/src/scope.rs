//! Scope check — greeting, gratitude and in-domain detection.
//!
//! All term tests go through [`contains_term`], a plain substring match.
//! Swapping it for whole-word matching changes every caller at once.

use crate::lexicon::{GRATITUDE_TERMS, GREETING_TERMS, SCOPE_CONTEXT_TERMS, SCOPE_VOCABULARY};

/// Greetings only count when the message is this short.
pub const GREETING_MAX_WORDS: usize = 3;
/// Thanks only count when the message is this short.
pub const GRATITUDE_MAX_WORDS: usize = 5;
/// A message rides on fashion history only up to this length.
pub const CONTEXT_CARRY_MAX_WORDS: usize = 30;

/// Whether `term` occurs anywhere inside `text`.
#[inline]
pub fn contains_term(text: &str, term: &str) -> bool {
    text.contains(term)
}

/// Whether any of `terms` occurs inside `text`.
pub fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| contains_term(text, term))
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn normalise(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Message contains a greeting term, regardless of length.
pub fn mentions_greeting(text: &str) -> bool {
    contains_any(&normalise(text), GREETING_TERMS)
}

/// A short greeting such as "hi" or "hello there".
pub fn is_greeting(text: &str) -> bool {
    mentions_greeting(text) && word_count(text) <= GREETING_MAX_WORDS
}

/// A short thank-you in English, Hindi or Kannada.
pub fn is_gratitude(text: &str) -> bool {
    contains_any(&normalise(text), GRATITUDE_TERMS) && word_count(text) <= GRATITUDE_MAX_WORDS
}

/// Whether the message belongs to the fashion/beauty domain.
///
/// Recent history (the last `context_window` entries) keeps short
/// follow-ups in scope once the conversation has touched the domain.
/// Without such history the message must carry domain vocabulary itself.
pub fn is_fashion_related(text: &str, history: &[String], context_window: usize) -> bool {
    let lower = text.to_lowercase();

    if !history.is_empty() {
        let start = history.len().saturating_sub(context_window);
        let recent = history[start..].join(" ").to_lowercase();
        if contains_any(&recent, SCOPE_CONTEXT_TERMS) && word_count(&lower) <= CONTEXT_CARRY_MAX_WORDS {
            return true;
        }
    }

    contains_any(&lower, SCOPE_VOCABULARY)
}

/// Out of scope: not fashion related and not even mentioning a greeting.
pub fn is_out_of_scope(text: &str, history: &[String], context_window: usize) -> bool {
    !is_fashion_related(text, history, context_window) && !mentions_greeting(text)
}
