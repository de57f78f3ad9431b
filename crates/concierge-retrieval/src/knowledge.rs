//! A business's knowledge entries bundled with their lexical index.

use concierge_core::KnowledgeEntry;

use crate::index::LexicalIndex;

/// Ordered knowledge entries and the index derived from them.
///
/// The only constructor builds both together and there are no mutators, so
/// the index always describes exactly these entries.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    index: LexicalIndex,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        let index = LexicalIndex::build(&entries);
        Self { entries, index }
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&KnowledgeEntry> {
        self.entries.get(index)
    }

    pub fn index(&self) -> &LexicalIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
