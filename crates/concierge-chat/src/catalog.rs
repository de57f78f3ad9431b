//! Business catalog: where business profiles and knowledge come from.
//!
//! The engine only sees the [`KnowledgeStore`] trait. [`BusinessCatalog`] is
//! the bundled implementation, loaded once from a TOML file:
//!
//! ```toml
//! [[business]]
//! id = "crumbs"
//! name = "Crumbs Bakery"
//! type = "bakery"
//!
//! [business.contact]
//! phone = "555-0100"
//!
//! [business.chatbot]
//! initial_message = "Hi! Fresh bread is out of the oven."
//!
//! [[business.knowledge]]
//! question = "What are your hours?"
//! answer = "7am-3pm daily"
//! priority = 2
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use concierge_core::{BusinessProfile, KnowledgeEntry};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::business::BusinessContext;
use crate::error::ChatError;

/// Source of per-business contexts.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Context for `business_id`, or `None` if no such business exists.
    async fn load_business_context(
        &self,
        business_id: &str,
    ) -> Result<Option<Arc<BusinessContext>>, ChatError>;

    /// Every available business.
    async fn list_businesses(&self) -> Result<Vec<BusinessSummary>, ChatError>;
}

/// Listing entry for one business.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessSummary {
    pub id: String,
    pub name: String,
    pub kind: Option<String>,
    pub knowledge_entries: usize,
}

// =============================================================================
// File format
// =============================================================================

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "business")]
    businesses: Vec<BusinessRecord>,
}

#[derive(Debug, Deserialize)]
struct BusinessRecord {
    #[serde(flatten)]
    profile: BusinessProfile,
    #[serde(default)]
    chatbot: ChatbotSettings,
    #[serde(default)]
    knowledge: Vec<KnowledgeEntry>,
    #[serde(default = "default_true")]
    active: bool,
}

/// Per-business overrides for the assistant's voice.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatbotSettings {
    system_prompt: Option<String>,
    initial_message: Option<String>,
    show_suggestions: Option<bool>,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// BusinessCatalog
// =============================================================================

/// Immutable in-memory catalog of business contexts.
#[derive(Debug, Default)]
pub struct BusinessCatalog {
    businesses: HashMap<String, Arc<BusinessContext>>,
    /// Ids in file order, for stable listings.
    order: Vec<String>,
}

impl BusinessCatalog {
    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ChatError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChatError::Catalog(format!("cannot read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            businesses = catalog.len(),
            "Business catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse a catalog from TOML text. Inactive businesses are skipped;
    /// blank or duplicate ids are rejected.
    pub fn from_toml_str(content: &str) -> Result<Self, ChatError> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| ChatError::Catalog(format!("invalid catalog: {}", e)))?;

        let mut catalog = Self::default();
        for record in file.businesses {
            if !record.active {
                info!(business = %record.profile.id, "Skipping inactive business");
                continue;
            }
            let mut context = BusinessContext::new(
                record.profile,
                record.knowledge,
                record.chatbot.system_prompt.as_deref(),
                record.chatbot.initial_message.as_deref(),
            );
            context.show_suggestions = record.chatbot.show_suggestions.unwrap_or(true);
            catalog.insert(context)?;
        }
        Ok(catalog)
    }

    /// Build a catalog from ready-made contexts.
    pub fn from_contexts(contexts: Vec<BusinessContext>) -> Result<Self, ChatError> {
        let mut catalog = Self::default();
        for context in contexts {
            catalog.insert(context)?;
        }
        Ok(catalog)
    }

    pub fn get(&self, business_id: &str) -> Option<Arc<BusinessContext>> {
        self.businesses.get(business_id).cloned()
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn insert(&mut self, context: BusinessContext) -> Result<(), ChatError> {
        let id = context.profile.id.trim().to_string();
        if id.is_empty() {
            return Err(ChatError::Catalog(format!(
                "business '{}' has no id",
                context.profile.name
            )));
        }
        if self.businesses.contains_key(&id) {
            return Err(ChatError::Catalog(format!("duplicate business id: {}", id)));
        }
        let skipped = context.knowledge.index().skipped().len();
        if skipped > 0 {
            warn!(business = %id, skipped, "Some knowledge entries were not indexed");
        }
        self.order.push(id.clone());
        self.businesses.insert(id, Arc::new(context));
        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for BusinessCatalog {
    async fn load_business_context(
        &self,
        business_id: &str,
    ) -> Result<Option<Arc<BusinessContext>>, ChatError> {
        Ok(self.get(business_id.trim()))
    }

    async fn list_businesses(&self) -> Result<Vec<BusinessSummary>, ChatError> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.businesses.get(id))
            .map(|ctx| BusinessSummary {
                id: ctx.profile.id.clone(),
                name: ctx.profile.name.clone(),
                kind: ctx.profile.kind.clone(),
                knowledge_entries: ctx.knowledge.len(),
            })
            .collect())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const SAMPLE: &str = r#"
[[business]]
id = "crumbs"
name = "Crumbs Bakery"
type = "bakery"
location = "Karachi"
keywords = ["sourdough"]

[business.contact]
phone = "555-0100"

[business.chatbot]
initial_message = "Hi! Fresh bread is out of the oven."
show_suggestions = false

[[business.knowledge]]
question = "What are your hours?"
answer = "7am-3pm daily"
priority = 1

[[business.knowledge]]
question = "Do you deliver?"
answer = "Within 5 km"
priority = 3

[[business.knowledge]]
question = "Old promo?"
answer = "Expired"
priority = 9
active = false

[[business]]
id = "closed-shop"
name = "Closed Shop"
active = false
"#;

    // ---- Parsing ----

    #[test]
    fn test_parse_sample_catalog() {
        let catalog = BusinessCatalog::from_toml_str(SAMPLE).unwrap();
        assert_eq!(catalog.ids(), &["crumbs".to_string()]);

        let ctx = catalog.get("crumbs").unwrap();
        assert_eq!(ctx.profile.name, "Crumbs Bakery");
        assert_eq!(ctx.profile.kind.as_deref(), Some("bakery"));
        assert_eq!(ctx.profile.contact.phone.as_deref(), Some("555-0100"));
        assert_eq!(ctx.profile.keywords, vec!["sourdough".to_string()]);
        assert_eq!(ctx.initial_greeting, "Hi! Fresh bread is out of the oven.");
        assert!(!ctx.show_suggestions);
        assert!(ctx.system_instructions.contains("Crumbs Bakery"));

        // Inactive entry dropped, rest ordered by priority
        assert_eq!(ctx.knowledge.len(), 2);
        assert_eq!(ctx.knowledge.entries()[0].question, "Do you deliver?");
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = BusinessCatalog::from_toml_str("").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let err = BusinessCatalog::from_toml_str("[[business]\nid=").unwrap_err();
        assert!(matches!(err, ChatError::Catalog(_)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let toml = r#"
[[business]]
id = "a"
name = "One"

[[business]]
id = "a"
name = "Two"
"#;
        let err = BusinessCatalog::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("duplicate business id: a"));
    }

    #[test]
    fn test_blank_id_rejected() {
        let toml = "[[business]]\nid = \"  \"\nname = \"Nameless\"\n";
        assert!(BusinessCatalog::from_toml_str(toml).is_err());
    }

    // ---- File loading ----

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let catalog = BusinessCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = BusinessCatalog::load(Path::new("/nonexistent/businesses.toml")).unwrap_err();
        assert!(matches!(err, ChatError::Catalog(_)));
    }

    // ---- KnowledgeStore ----

    #[tokio::test]
    async fn test_store_lookup() {
        let catalog = BusinessCatalog::from_toml_str(SAMPLE).unwrap();
        assert!(catalog.load_business_context("crumbs").await.unwrap().is_some());
        assert!(catalog.load_business_context("closed-shop").await.unwrap().is_none());
        assert!(catalog.load_business_context("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_businesses() {
        let catalog = BusinessCatalog::from_toml_str(SAMPLE).unwrap();
        let list = catalog.list_businesses().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "crumbs");
        assert_eq!(list[0].knowledge_entries, 2);
    }
}
