//! Small text helpers shared by the index, the scorer, and the topic gate.

/// English stop words excluded from index terms.
static STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "am", "be", "been", "being", "have", "has",
    "had", "do", "does", "did", "will", "would", "shall", "should", "may", "might", "must",
    "can", "could", "i", "me", "my", "we", "our", "you", "your", "he", "she", "it", "they",
    "them", "his", "her", "its", "their", "what", "which", "who", "whom", "this", "that",
    "these", "those", "of", "in", "to", "for", "with", "on", "at", "from", "by", "about", "as",
    "into", "through", "and", "but", "or", "not", "no", "so", "if", "then", "than", "too",
    "very", "just", "also", "up", "out", "all", "any", "some", "how", "when", "where", "why",
    "there", "here", "us",
];

/// Whether `word` (already lowercase) is a stop word.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Index terms: lowercase alphanumeric runs of at least two characters,
/// stop words removed.
pub fn index_terms(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2 && !is_stop_word(w))
        .map(str::to_string)
        .collect()
}

/// Whitespace tokens of `text` with surrounding punctuation trimmed, keeping
/// only tokens longer than one character. `text` is expected lowercase.
pub fn query_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Crude similarity: containment, or the share of the shorter word's
/// characters that occur anywhere in the longer one.
pub fn is_similar_word(a: &str, b: &str, threshold: f64) -> bool {
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    if a_len < 2 || b_len < 2 {
        return false;
    }
    let (longer, shorter, shorter_len) = if a_len > b_len {
        (a, b, b_len)
    } else {
        (b, a, a_len)
    };
    if longer.contains(shorter) {
        return true;
    }
    let matches = shorter.chars().filter(|c| longer.contains(*c)).count();
    matches as f64 / shorter_len as f64 >= threshold
}

/// Per-token partial-overlap score of `query` against `text`, capped at 1.0.
///
/// Each query token earns 0.6 for every text word it contains or is
/// contained in, and 0.4 for every other word it loosely resembles.
pub fn fuzzy_score(query: &str, text: &str) -> f64 {
    let query_words: Vec<&str> = query.split_whitespace().collect();
    if query_words.is_empty() {
        return 0.0;
    }
    let text_words: Vec<&str> = text.split_whitespace().collect();

    let mut total = 0.0;
    for word in query_words.iter().filter(|w| w.chars().count() > 1) {
        for text_word in &text_words {
            if text_word.contains(word) || word.contains(text_word) {
                total += 0.6;
            } else if is_similar_word(word, text_word, 0.5) {
                total += 0.4;
            }
        }
    }
    (total / query_words.len() as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_terms_drop_stop_words_and_punctuation() {
        let terms = index_terms("What are your HOURS? 9am-5pm, Mon-Fri");
        assert_eq!(terms, vec!["hours", "9am", "5pm", "mon", "fri"]);
    }

    #[test]
    fn test_index_terms_empty() {
        assert!(index_terms("").is_empty());
        assert!(index_terms("a I ?").is_empty());
    }

    #[test]
    fn test_query_tokens_trim_punctuation() {
        assert_eq!(
            query_tokens("where are you, exactly?"),
            vec!["where", "are", "you", "exactly"]
        );
    }

    #[test]
    fn test_query_tokens_skip_single_chars() {
        assert_eq!(query_tokens("a b cd ?"), vec!["cd"]);
    }

    #[test]
    fn test_similar_word_containment() {
        assert!(is_similar_word("price", "pricing", 0.6));
        assert!(is_similar_word("pricing", "price", 0.6));
    }

    #[test]
    fn test_similar_word_char_overlap() {
        // "rates" vs "tears": every char of the shorter word is in the longer
        assert!(is_similar_word("rates", "tears", 0.6));
        assert!(!is_similar_word("xyz", "hours", 0.6));
    }

    #[test]
    fn test_similar_word_too_short() {
        assert!(!is_similar_word("a", "apple", 0.1));
    }

    #[test]
    fn test_fuzzy_score_bounds() {
        assert_eq!(fuzzy_score("", "anything"), 0.0);
        let s = fuzzy_score("price list", "our price list is on the website");
        assert!(s > 0.0 && s <= 1.0);
    }

    #[test]
    fn test_fuzzy_score_no_overlap() {
        assert_eq!(fuzzy_score("zzz qqq", "abc def"), 0.0);
    }
}
