use serde::{Deserialize, Serialize};

// =============================================================================
// Knowledge
// =============================================================================

/// A single question/answer fact from a business's knowledge base.
///
/// Entries are immutable once loaded. Duplicates are legal and are scored
/// independently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Canonical question this entry answers.
    pub question: String,
    /// Answer text shown to the generator as grounding.
    pub answer: String,
    /// Free-form grouping such as "pricing" or "hours".
    #[serde(default)]
    pub category: Option<String>,
    /// Higher priority wins score ties.
    #[serde(default)]
    pub priority: i32,
    /// Where the entry came from (manual entry, uploaded document, ...).
    #[serde(default)]
    pub source: Option<String>,
    /// Inactive entries are dropped when a knowledge base is loaded.
    #[serde(default = "default_true")]
    pub active: bool,
}

impl KnowledgeEntry {
    /// Create an active entry with no category or source.
    pub fn new(question: impl Into<String>, answer: impl Into<String>, priority: i32) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            category: None,
            priority,
            source: None,
            active: true,
        }
    }

    /// The text indexed for this entry: question and answer joined by a space.
    pub fn document(&self) -> String {
        format!("{} {}", self.question, self.answer).trim().to_string()
    }
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Business profile
// =============================================================================

/// How customers can reach a business.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hours: Option<String>,
    pub website: Option<String>,
}

impl ContactInfo {
    /// Best single channel to point a customer at, phone first.
    pub fn preferred_channel(&self) -> Option<&str> {
        [&self.phone, &self.email]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
    }
}

/// Descriptive record of a tenant business.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Stable identifier used by callers to select the business.
    pub id: String,
    /// Display name, used in greetings and redirects.
    pub name: String,
    /// Kind of business ("dental clinic", "bakery", ...).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact: ContactInfo,
    /// Extra terms the topic gate should treat as on-topic.
    #[serde(default)]
    pub keywords: Vec<String>,
}

// =============================================================================
// Tests
// =============================================================================
