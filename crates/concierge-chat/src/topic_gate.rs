//! Coarse on-topic / off-topic classifier.
//!
//! Runs before retrieval and only catches obvious general-knowledge
//! questions; anything it cannot classify is allowed through and left to the
//! relevance threshold.

use std::sync::LazyLock;

use concierge_retrieval::signals::IMPORTANT_KEYWORDS;
use concierge_retrieval::text::{is_stop_word, query_tokens};
use regex::Regex;

use crate::business::BusinessContext;

/// Longest message (in words) still treated as a follow-up to the previous
/// exchange.
const FOLLOW_UP_MAX_WORDS: usize = 6;

/// Longest message (in words) that can be a bare greeting or pleasantry.
const STARTER_MAX_WORDS: usize = 4;

static CONVERSATION_STARTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(hi+|hello|hey|hiya|yo|salam|salaam|assalam\w*|aoa|good (morning|afternoon|evening|day)|thanks?|thank you|thx|ok(ay)?|cool|great|bye|goodbye|see you|yes|no|sure|please)\b",
    )
    .expect("Invalid conversation starter regex")
});

static GENERAL_KNOWLEDGE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bcapital (city )?of\b",
        r"\bweather\b|\bforecast\b|\btemperature (in|outside|today)\b",
        r"\brecipes?\b|\bhow (do i|to) (cook|bake)\b",
        r"\b(president|prime minister|king|queen) of\b",
        r"\bcelebrit(y|ies)\b|\b(actor|actress|singer|rapper)\b",
        r"\b(score|scores|won|win|winner)\b.*\b(match|game|cup|league|final)\b|\bworld cup\b",
        r"\bpoems?\b|\bjokes?\b|\bsong lyrics\b|\bwrite (me )?a (story|song|essay)\b",
        r"\bpopulation of\b",
        r"\bwho (invented|discovered|wrote|painted)\b",
        r"\b(tallest|largest|biggest|longest|highest) (mountain|river|country|ocean|building|animal)\b",
        r"\bmeaning of life\b",
        r"\b(bitcoin|crypto(currency)?|stock market)\b",
        r"\b(movie|film|tv show|series) recommendations?\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid general-knowledge regex"))
    .collect()
});

/// Why a message was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// Greeting, thanks, or similar pleasantry.
    ConversationStarter,
    /// Mentions the business, its offering, or its knowledge base.
    BusinessTerm,
    /// Short message continuing an existing conversation.
    FollowUp,
    /// Nothing matched either way.
    Unclassified,
}

/// Outcome of classifying one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicDecision {
    Allow(AllowReason),
    Deny,
}

/// Rule-based topic classifier. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopicGate;

impl TopicGate {
    /// Classify `message` for `business`. `in_conversation` is true when the
    /// session already has history.
    pub fn classify(
        &self,
        message: &str,
        business: &BusinessContext,
        in_conversation: bool,
    ) -> TopicDecision {
        let lower = message.trim().to_lowercase();
        let word_count = lower.split_whitespace().count();

        if word_count <= STARTER_MAX_WORDS && CONVERSATION_STARTER.is_match(&lower) {
            return TopicDecision::Allow(AllowReason::ConversationStarter);
        }

        let mentions_business = self.mentions_business(&lower, business);
        if !mentions_business && GENERAL_KNOWLEDGE.iter().any(|re| re.is_match(&lower)) {
            return TopicDecision::Deny;
        }
        if mentions_business {
            return TopicDecision::Allow(AllowReason::BusinessTerm);
        }
        if in_conversation && word_count <= FOLLOW_UP_MAX_WORDS {
            return TopicDecision::Allow(AllowReason::FollowUp);
        }
        TopicDecision::Allow(AllowReason::Unclassified)
    }

    /// A polite redirect naming the business. The same message always gets
    /// the same wording.
    pub fn redirect_message(&self, message: &str, business_name: &str) -> String {
        let pick = message.bytes().map(usize::from).sum::<usize>() % 3;
        match pick {
            0 => format!(
                "I'm here to help with questions about {}. Is there anything about our services I can help you with?",
                business_name
            ),
            1 => format!(
                "That's outside what I can help with, but I'd be glad to answer anything about {}.",
                business_name
            ),
            _ => format!(
                "I can only assist with questions related to {}. What would you like to know about us?",
                business_name
            ),
        }
    }

    /// Whether the lowercase message uses a term tied to this business.
    fn mentions_business(&self, lower: &str, business: &BusinessContext) -> bool {
        let profile = &business.profile;
        let tokens: Vec<String> = query_tokens(lower)
            .into_iter()
            .filter(|t| t.chars().count() >= 3 && !is_stop_word(t))
            .collect();

        let curated = tokens.iter().any(|t| {
            IMPORTANT_KEYWORDS
                .iter()
                .any(|k| t.as_str() == *k || t.strip_suffix('s') == Some(*k))
        });
        if curated {
            return true;
        }

        let descriptive = [
            Some(&profile.name),
            profile.kind.as_ref(),
            profile.specialization.as_ref(),
        ];
        let profile_words: Vec<String> = descriptive
            .into_iter()
            .flatten()
            .flat_map(|s| query_tokens(&s.to_lowercase()))
            .filter(|w| w.chars().count() >= 3 && !is_stop_word(w))
            .collect();
        if tokens.iter().any(|t| profile_words.contains(t)) {
            return true;
        }

        if profile
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .any(|k| !k.is_empty() && lower.contains(&k))
        {
            return true;
        }

        let index = business.knowledge.index();
        tokens.iter().any(|t| index.contains_term(t))
    }
}

// =============================================================================
// Tests
// =============================================================================
