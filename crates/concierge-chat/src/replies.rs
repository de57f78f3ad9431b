//! Canned replies used when the generator is skipped or fails.

use concierge_core::ContactInfo;

use crate::business::BusinessContext;

/// Reply when nothing in the knowledge base is relevant enough.
pub fn no_context_reply(business: &BusinessContext) -> String {
    match business.profile.contact.preferred_channel() {
        Some(channel) => format!(
            "I don't have specific information about that. Please contact us at {} and our team will be happy to help.",
            channel
        ),
        None => "I don't have specific information about that. Please get in touch with our team directly and they will be happy to help.".to_string(),
    }
}

/// Local reply after a generator failure, built from the best matched answer
/// when there is one.
pub fn fallback_reply(business: &BusinessContext, best_answer: Option<&str>) -> String {
    match best_answer.map(str::trim).filter(|a| !a.is_empty()) {
        Some(answer) => format!(
            "{}\n\nIf you have any other questions about {}, just ask.",
            answer,
            business.display_name()
        ),
        None => format!(
            "I'm sorry, I'm having trouble answering right now. Please try again shortly{}.",
            contact_suffix(&business.profile.contact)
        ),
    }
}

/// Follow-up prompts offered alongside a reply.
const SUGGESTIONS: &[&str] = &[
    "Could you please elaborate?",
    "Would you like me to assist with that?",
    "Can you provide more details?",
    "Shall I look into that for you?",
    "Would you like further clarification on this topic?",
    "Is there a specific area you'd like to focus on?",
];

/// How many follow-up prompts accompany each reply.
pub const SUGGESTION_COUNT: usize = 3;

/// Three distinct follow-up prompts. The same message always gets the same
/// selection.
pub fn suggestions(message: &str) -> Vec<String> {
    let start = message.bytes().map(usize::from).sum::<usize>() % SUGGESTIONS.len();
    SUGGESTIONS
        .iter()
        .cycle()
        .skip(start)
        .take(SUGGESTION_COUNT)
        .map(|s| s.to_string())
        .collect()
}

/// Local reply to a greeting with nothing to ground it.
pub fn starter_reply(business: &BusinessContext) -> String {
    format!(
        "Hello! How can I help you with {} today?",
        business.display_name()
    )
}

fn contact_suffix(contact: &ContactInfo) -> String {
    contact
        .preferred_channel()
        .map(|c| format!(", or reach us at {}", c))
        .unwrap_or_default()
}
