//! In-memory TF-IDF index over a business's knowledge entries.
//!
//! Each entry contributes one document (`question + " " + answer`). The index
//! is immutable once built; a changed entry set means a new index.

use std::collections::HashMap;

use concierge_core::KnowledgeEntry;
use tracing::{debug, warn};

use crate::text::index_terms;

/// Why an entry was left out of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Question and answer are both blank.
    EmptyDocument,
    /// The document has text but no indexable terms (only stop words or
    /// punctuation).
    NoTerms,
}

/// Term counts for one indexed document.
#[derive(Debug, Clone)]
struct Document {
    term_counts: HashMap<String, u32>,
}

/// TF-IDF index keyed by entry position.
#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    /// One slot per entry; `None` for skipped entries.
    documents: Vec<Option<Document>>,
    /// Number of indexed documents containing each term.
    document_frequency: HashMap<String, u32>,
    /// Entries left out of the index, with the reason.
    skipped: Vec<(usize, SkipReason)>,
}

impl LexicalIndex {
    /// Build an index over `entries`. Entries with no usable text are skipped
    /// and logged; the build itself never fails.
    pub fn build(entries: &[KnowledgeEntry]) -> Self {
        let mut documents = Vec::with_capacity(entries.len());
        let mut document_frequency: HashMap<String, u32> = HashMap::new();
        let mut skipped = Vec::new();

        for (idx, entry) in entries.iter().enumerate() {
            let text = entry.document();
            if text.is_empty() {
                warn!(entry = idx, "Skipping empty knowledge entry during index build");
                skipped.push((idx, SkipReason::EmptyDocument));
                documents.push(None);
                continue;
            }

            let terms = index_terms(&text);
            if terms.is_empty() {
                warn!(entry = idx, "Skipping knowledge entry with no indexable terms");
                skipped.push((idx, SkipReason::NoTerms));
                documents.push(None);
                continue;
            }

            let mut term_counts: HashMap<String, u32> = HashMap::new();
            for term in terms {
                *term_counts.entry(term).or_insert(0) += 1;
            }
            for term in term_counts.keys() {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
            documents.push(Some(Document { term_counts }));
        }

        let index = Self {
            documents,
            document_frequency,
            skipped,
        };
        debug!(
            documents = index.document_count(),
            vocabulary = index.vocabulary_size(),
            skipped = index.skipped.len(),
            "Lexical index built"
        );
        index
    }

    /// Number of indexed (non-skipped) documents.
    pub fn document_count(&self) -> usize {
        self.documents.iter().filter(|d| d.is_some()).count()
    }

    /// Number of distinct terms across all documents.
    pub fn vocabulary_size(&self) -> usize {
        self.document_frequency.len()
    }

    /// Entries that were left out of the index.
    pub fn skipped(&self) -> &[(usize, SkipReason)] {
        &self.skipped
    }

    /// Whether `term` (lowercase) occurs in any indexed document.
    pub fn contains_term(&self, term: &str) -> bool {
        self.document_frequency.contains_key(term)
    }

    /// Inverse document frequency, `1 + ln(N / (1 + df))`, floored at zero.
    pub fn idf(&self, term: &str) -> f64 {
        let n = self.document_count() as f64;
        if n == 0.0 {
            return 0.0;
        }
        let df = f64::from(self.document_frequency.get(term).copied().unwrap_or(0));
        (1.0 + (n / (1.0 + df)).ln()).max(0.0)
    }

    /// TF-IDF score of one entry against `query`. Skipped or out-of-range
    /// entries score zero, as do query terms outside the vocabulary.
    pub fn score_document(&self, entry_index: usize, query: &str) -> f64 {
        let Some(Some(doc)) = self.documents.get(entry_index) else {
            return 0.0;
        };
        index_terms(query)
            .iter()
            .map(|term| match doc.term_counts.get(term) {
                Some(&tf) => f64::from(tf) * self.idf(term),
                None => 0.0,
            })
            .sum()
    }

    /// TF-IDF score of every indexed entry against `query`.
    ///
    /// Returns an empty map when nothing is indexed.
    pub fn score(&self, query: &str) -> HashMap<usize, f64> {
        self.documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| doc.is_some())
            .map(|(idx, _)| (idx, self.score_document(idx, query)))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<KnowledgeEntry> {
        vec![
            KnowledgeEntry::new("What are your hours?", "We are open 9am-5pm Mon-Fri", 1),
            KnowledgeEntry::new("Where is the office?", "Our office is on Main Street", 1),
            KnowledgeEntry::new("Do you deliver?", "We deliver pizza within 5 miles", 0),
        ]
    }

    #[test]
    fn test_build_counts_documents() {
        let index = LexicalIndex::build(&entries());
        assert_eq!(index.document_count(), 3);
        assert!(index.skipped().is_empty());
        assert!(index.contains_term("office"));
        assert!(!index.contains_term("the"));
    }

    #[test]
    fn test_empty_entry_set() {
        let index = LexicalIndex::build(&[]);
        assert_eq!(index.document_count(), 0);
        assert!(index.score("anything at all").is_empty());
        assert_eq!(index.idf("anything"), 0.0);
    }

    #[test]
    fn test_empty_documents_skipped() {
        let mut list = entries();
        list.insert(1, KnowledgeEntry::new("  ", "", 0));
        let index = LexicalIndex::build(&list);
        assert_eq!(index.document_count(), 3);
        assert_eq!(index.skipped(), &[(1, SkipReason::EmptyDocument)]);
        // The skipped slot keeps entry positions aligned
        assert_eq!(index.score_document(1, "office"), 0.0);
        assert!(index.score_document(2, "office") > 0.0);
    }

    #[test]
    fn test_stop_word_only_document_skipped() {
        let index = LexicalIndex::build(&[KnowledgeEntry::new("what is it?", "it is", 0)]);
        assert_eq!(index.skipped(), &[(0, SkipReason::NoTerms)]);
    }

    #[test]
    fn test_score_prefers_matching_document() {
        let index = LexicalIndex::build(&entries());
        let scores = index.score("where is your office");
        assert_eq!(scores.len(), 3);
        assert!(scores[&1] > scores[&0]);
        assert!(scores[&1] > scores[&2]);
        assert_eq!(scores[&0], 0.0);
    }

    #[test]
    fn test_unknown_terms_contribute_zero() {
        let index = LexicalIndex::build(&entries());
        assert_eq!(index.score_document(0, "zebra quantum"), 0.0);
    }

    #[test]
    fn test_out_of_range_entry_scores_zero() {
        let index = LexicalIndex::build(&entries());
        assert_eq!(index.score_document(99, "office"), 0.0);
    }

    #[test]
    fn test_idf_unseen_terms_weigh_more_than_seen() {
        let index = LexicalIndex::build(&entries());
        let rare = index.idf("pizza");
        let missing = index.idf("never-seen");
        assert!(rare > 0.0);
        assert!(missing > rare);
    }

    #[test]
    fn test_idf_term_in_every_document_stays_positive() {
        let list = vec![
            KnowledgeEntry::new("pizza one", "pizza", 0),
            KnowledgeEntry::new("pizza two", "pizza", 0),
        ];
        let index = LexicalIndex::build(&list);
        assert!(index.idf("pizza") > 0.0);
    }

    #[test]
    fn test_repeated_terms_raise_term_frequency() {
        let list = vec![
            KnowledgeEntry::new("pizza", "pizza pizza", 0),
            KnowledgeEntry::new("pizza", "pasta", 0),
        ];
        let index = LexicalIndex::build(&list);
        assert!(index.score_document(0, "pizza") > index.score_document(1, "pizza"));
    }
}
