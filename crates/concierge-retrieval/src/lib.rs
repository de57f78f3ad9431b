//! Concierge retrieval crate - lexical index, query normalization, relevance
//! scoring, and context composition.
//!
//! Everything here is synchronous and deterministic: the same knowledge base
//! and query always produce the same ranked contexts.

pub mod composer;
pub mod index;
pub mod knowledge;
pub mod normalize;
pub mod scorer;
pub mod signals;
pub mod text;

pub use composer::compose;
pub use index::{LexicalIndex, SkipReason};
pub use knowledge::KnowledgeBase;
pub use normalize::{Normalization, QueryNormalizer, TranslationNote};
pub use scorer::{RelevanceScorer, Retrieval, ScoredMatch};
pub use signals::{Signal, SignalWeights};
