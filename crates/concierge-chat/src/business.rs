//! Everything the engine needs to answer for one business.

use std::cmp::Reverse;

use concierge_core::{BusinessProfile, KnowledgeEntry};
use concierge_retrieval::KnowledgeBase;

/// Immutable per-business state shared across requests.
#[derive(Debug, Clone)]
pub struct BusinessContext {
    pub profile: BusinessProfile,
    /// Active entries, highest priority first, with their index.
    pub knowledge: KnowledgeBase,
    /// First system message of every generator prompt.
    pub system_instructions: String,
    /// Sent with the first reply of a new conversation.
    pub initial_greeting: String,
    /// Whether replies carry follow-up prompts for the customer.
    pub show_suggestions: bool,
}

impl BusinessContext {
    /// Build a context from raw entries.
    ///
    /// Inactive entries are dropped and the rest ordered by priority,
    /// highest first, keeping the given order among equal priorities. Blank
    /// prompt or greeting overrides fall back to the defaults.
    pub fn new(
        profile: BusinessProfile,
        entries: Vec<KnowledgeEntry>,
        system_prompt: Option<&str>,
        greeting: Option<&str>,
    ) -> Self {
        let mut entries: Vec<KnowledgeEntry> = entries.into_iter().filter(|e| e.active).collect();
        entries.sort_by_key(|e| Reverse(e.priority));

        let system_instructions = non_blank(system_prompt)
            .map(str::to_string)
            .unwrap_or_else(|| default_system_prompt(&profile));
        let initial_greeting = non_blank(greeting)
            .map(str::to_string)
            .unwrap_or_else(|| default_greeting(&profile.name));

        Self {
            profile,
            knowledge: KnowledgeBase::new(entries),
            system_instructions,
            initial_greeting,
            show_suggestions: true,
        }
    }

    /// Display name, or a neutral stand-in when the profile has none.
    pub fn display_name(&self) -> &str {
        match self.profile.name.trim() {
            "" => "our business",
            name => name,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Greeting used when a business has not configured one.
pub fn default_greeting(name: &str) -> String {
    format!("Welcome to {}! How can we assist you today?", name)
}

/// System instructions used when a business has not configured its own.
pub fn default_system_prompt(profile: &BusinessProfile) -> String {
    let or_na = |v: &Option<String>| {
        v.as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("N/A")
            .to_string()
    };
    let name = if profile.name.trim().is_empty() {
        "this business"
    } else {
        profile.name.as_str()
    };

    format!(
        "You are a virtual assistant for {name}.\n\
Your goal is to guide customers, answer their questions accurately, and help them solve problems in a simple and professional manner.\n\
\n\
Guidelines:\n\
- Always use information from the knowledge base when it is relevant.\n\
- Do not mention AI, databases, or internal systems.\n\
- Keep answers clear, short, and easy to follow.\n\
- If you are unsure, say so politely and offer to connect the customer with the team.\n\
- Be professional and friendly. Avoid slang and jargon.\n\
\n\
Business details:\n\
- Name: {name}\n\
- Location: {location}\n\
- Type: {kind}\n\
- Specialization: {specialization}",
        name = name,
        location = or_na(&profile.location),
        kind = or_na(&profile.kind),
        specialization = or_na(&profile.specialization),
    )
}
