//! Query language normalization.
//!
//! Rewrites common Roman Urdu words into English so that the English
//! knowledge base can still be matched. Anything not in the glossary passes
//! through untouched.

use serde::Serialize;

/// Name reported for queries rewritten by the glossary.
pub const ROMAN_URDU: &str = "Roman Urdu";

/// Roman Urdu to English glossary, matched on whole lowercase words.
static GLOSSARY: &[(&str, &str)] = &[
    ("kya", "what"),
    ("kia", "what"),
    ("kahan", "where"),
    ("kidhar", "where"),
    ("kab", "when"),
    ("kaise", "how"),
    ("kitna", "how much"),
    ("kitne", "how much"),
    ("qeemat", "price"),
    ("keemat", "price"),
    ("daam", "price"),
    ("waqt", "time"),
    ("timing", "hours"),
    ("khulta", "open"),
    ("khulti", "open"),
    ("khula", "open"),
    ("band", "closed"),
    ("dukaan", "store"),
    ("daftar", "office"),
    ("pata", "address"),
    ("rabta", "contact"),
    ("number", "phone"),
    ("wapsi", "refund"),
    ("paise", "money"),
    ("khidmat", "services"),
    ("madad", "help"),
    ("aap", "you"),
    ("hai", "is"),
    ("hain", "are"),
];

/// Marker attached to a query that was rewritten before scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationNote {
    /// Language the caller appears to have written in.
    pub original_language: String,
    /// The query exactly as the caller sent it.
    pub original_text: String,
}

/// Result of normalizing one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalization {
    /// Text used for scoring.
    pub text: String,
    /// Present when the text differs from what the caller sent.
    pub note: Option<TranslationNote>,
}

impl Normalization {
    /// Whether normalization changed the query.
    pub fn altered(&self) -> bool {
        self.note.is_some()
    }
}

/// Glossary-driven query rewriter.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryNormalizer;

impl QueryNormalizer {
    pub fn normalize(&self, query: &str) -> Normalization {
        let mut rewritten = 0usize;
        let words: Vec<String> = query
            .split_whitespace()
            .map(|word| {
                let core = word.trim_matches(|c: char| !c.is_alphanumeric());
                let lower = core.to_lowercase();
                match GLOSSARY.iter().find(|(from, _)| *from == lower) {
                    Some((_, to)) => {
                        rewritten += 1;
                        word.replacen(core, to, 1)
                    }
                    None => word.to_string(),
                }
            })
            .collect();

        // A lone glossary hit among otherwise English words is more likely an
        // English word that happens to collide ("band", "number", "timing").
        if rewritten == 0 || (rewritten == 1 && words.len() > 2 && !has_urdu_marker(query)) {
            return Normalization {
                text: query.to_string(),
                note: None,
            };
        }

        Normalization {
            text: words.join(" "),
            note: Some(TranslationNote {
                original_language: ROMAN_URDU.to_string(),
                original_text: query.to_string(),
            }),
        }
    }
}

/// Words that only occur in Roman Urdu and settle an ambiguous single hit.
fn has_urdu_marker(query: &str) -> bool {
    const MARKERS: &[&str] = &["kya", "kia", "hai", "hain", "aap", "kahan", "kitna", "kitne"];
    query
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .any(|w| MARKERS.contains(&w.as_str()))
}
