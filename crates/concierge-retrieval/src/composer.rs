//! Renders ranked matches into the context block handed to the generator.

use crate::knowledge::KnowledgeBase;
use crate::normalize::TranslationNote;
use crate::scorer::{rank_matches, ScoredMatch};

/// Matches whose scores differ by less than this are ordered by priority.
pub const COMPOSE_TIE_EPSILON: f64 = 0.1;

const PREAMBLE: &str =
    "Here is verified information about the business to help you answer accurately:";

const POSTAMBLE: &str = "IMPORTANT: This information is verified. Use it to answer accurately \
and naturally. Do not mention a database, a lookup system, or that you are an AI. \
Respond in a professional, helpful, and human manner.";

/// Build the context message for `matches`, or `None` when there is nothing
/// to say.
///
/// Matches pointing outside `knowledge` are ignored.
pub fn compose(
    matches: &[ScoredMatch],
    knowledge: &KnowledgeBase,
    note: Option<&TranslationNote>,
) -> Option<String> {
    let mut ordered: Vec<ScoredMatch> = matches
        .iter()
        .filter(|m| knowledge.entry(m.entry_index).is_some())
        .cloned()
        .collect();
    if ordered.is_empty() {
        return None;
    }
    rank_matches(&mut ordered, knowledge.entries(), COMPOSE_TIE_EPSILON);

    let bullets: Vec<String> = ordered
        .iter()
        .filter_map(|m| knowledge.entry(m.entry_index))
        .map(|entry| format!("• {}", entry.answer.trim()))
        .collect();

    let mut message = format!("{}\n\n{}\n\n{}", PREAMBLE, bullets.join("\n\n"), POSTAMBLE);

    if let Some(note) = note {
        message.push_str(&format!(
            "\n\nNote: the customer wrote in {} (\"{}\"), so keep that context in mind and reply naturally.",
            note.original_language, note.original_text
        ));
    }

    Some(message)
}
