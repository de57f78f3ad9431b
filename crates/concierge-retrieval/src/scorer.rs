//! Multi-signal relevance scoring over a knowledge base.
//!
//! Each entry's composite score is the plain sum of independent signals (see
//! [`crate::signals`]), so any single strong signal can surface an entry even
//! when the others are silent. Scoring is a pure function of
//! `(entry, query, index)`; ranking is a total order, so results are
//! reproducible.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use concierge_core::KnowledgeEntry;
use serde::Serialize;
use tracing::{debug, info};

use crate::index::LexicalIndex;
use crate::knowledge::KnowledgeBase;
use crate::normalize::{Normalization, QueryNormalizer};
use crate::signals::{Signal, SignalWeights, IMPORTANT_KEYWORDS, PATTERN_RULES};
use crate::text::{fuzzy_score, is_similar_word, is_stop_word, query_tokens};

/// Default width of a score tie for ranking purposes.
pub const DEFAULT_TIE_EPSILON: f64 = 1e-6;

/// One knowledge entry's relevance to one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    /// Position of the entry in its knowledge base.
    pub entry_index: usize,
    /// Composite score, never negative. Only comparable within one query.
    pub score: f64,
    /// Signals that contributed to the score.
    pub signals: BTreeSet<Signal>,
}

/// Ranked contexts for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Retrieval {
    /// Entries at or above the threshold, best first, at most `top_k`.
    pub contexts: Vec<ScoredMatch>,
    /// Best composite score over all entries, including those below the
    /// threshold. Zero for an empty knowledge base.
    pub max_score: f64,
    /// How the query was normalized before scoring.
    pub normalization: Normalization,
}

/// A query prepared once and scored against every entry.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    /// Lowercase normalized text.
    pub lower: String,
    /// Whitespace tokens longer than one character.
    pub tokens: Vec<String>,
    /// Whether normalization rewrote the caller's text.
    pub altered: bool,
}

impl PreparedQuery {
    pub fn new(text: &str, altered: bool) -> Self {
        let lower = text.trim().to_lowercase();
        let tokens = query_tokens(&lower);
        Self {
            lower,
            tokens,
            altered,
        }
    }
}

/// Score one entry against a prepared query.
///
/// Returns the composite score and the set of signals that fired.
pub fn score_entry(
    entry: &KnowledgeEntry,
    entry_index: usize,
    index: &LexicalIndex,
    query: &PreparedQuery,
    weights: &SignalWeights,
) -> (f64, BTreeSet<Signal>) {
    let question = entry.question.trim().to_lowercase();
    let answer = entry.answer.trim().to_lowercase();
    let combined = format!("{} {}", question, answer);

    let mut score = 0.0;
    let mut signals = BTreeSet::new();

    // 1. Literal phrase matches
    if !query.lower.is_empty() {
        if (!question.is_empty() && query.lower.contains(&question))
            || question.contains(&query.lower)
        {
            score += weights.exact_question;
            signals.insert(Signal::ExactQuestion);
        }
        if answer.contains(&query.lower) {
            score += weights.exact_answer;
            signals.insert(Signal::ExactAnswer);
        }
    }

    // 2. Per-token phrase overlap
    let partial_hits = query
        .tokens
        .iter()
        .filter(|t| question.contains(t.as_str()) || answer.contains(t.as_str()))
        .count();
    if partial_hits > 0 {
        score += partial_hits as f64 * weights.partial_phrase;
        signals.insert(Signal::PartialPhrase);
    }

    // 3. Keyword density plus curated business terms
    let found: Vec<&String> = query
        .tokens
        .iter()
        .filter(|t| combined.contains(t.as_str()))
        .collect();
    if !found.is_empty() {
        score += found.len() as f64 / query.tokens.len() as f64 * weights.keyword_density;
        signals.insert(Signal::Keywords);

        let important = found
            .iter()
            .filter(|t| !is_stop_word(t) && is_important_keyword(t, weights.important_similarity))
            .count();
        if important > 0 {
            score += important as f64 * weights.important_keyword;
            signals.insert(Signal::ImportantKeywords);
        }
    }

    // 4. Intent rules
    for rule in PATTERN_RULES.iter() {
        if rule.query.is_match(&query.lower) && rule.question.is_match(&question) {
            score += rule.bonus;
            signals.insert(Signal::Pattern);
        }
    }

    // 5. TF-IDF
    let tf_idf = index.score_document(entry_index, &query.lower);
    if tf_idf > 0.0 {
        score += tf_idf * weights.tf_idf;
        signals.insert(Signal::TfIdf);
    }

    // 6. Fuzzy overlap, only when normalization may have been imperfect
    if query.altered {
        let fuzzy = fuzzy_score(&query.lower, &combined);
        if fuzzy > weights.fuzzy_floor {
            score += fuzzy * weights.fuzzy;
            signals.insert(Signal::Fuzzy);
        }
    }

    (score, signals)
}

/// Whether `token` is, contains, or closely resembles a curated business term.
pub fn is_important_keyword(token: &str, similarity: f64) -> bool {
    IMPORTANT_KEYWORDS.iter().any(|imp| {
        token.contains(imp) || imp.contains(token) || is_similar_word(token, imp, similarity)
    })
}

/// Sort matches best first.
///
/// Matches are ordered by score, then split into runs whose scores lie within
/// `epsilon` of the run's best score. Each run is reordered by higher entry
/// priority, then by lower entry index.
pub fn rank_matches(matches: &mut [ScoredMatch], entries: &[KnowledgeEntry], epsilon: f64) {
    let priority = |m: &ScoredMatch| entries.get(m.entry_index).map_or(0, |e| e.priority);
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.entry_index.cmp(&b.entry_index))
    });

    let mut start = 0;
    while start < matches.len() {
        let leader = matches[start].score;
        let end = matches[start..]
            .iter()
            .position(|m| leader - m.score >= epsilon)
            .map_or(matches.len(), |offset| start + offset);
        matches[start..end].sort_by(|a, b| {
            priority(b)
                .cmp(&priority(a))
                .then_with(|| a.entry_index.cmp(&b.entry_index))
        });
        start = end;
    }
}

/// Ranks knowledge entries against free-text queries.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    weights: SignalWeights,
    normalizer: QueryNormalizer,
    tie_epsilon: f64,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(SignalWeights::default(), DEFAULT_TIE_EPSILON)
    }
}

impl RelevanceScorer {
    pub fn new(weights: SignalWeights, tie_epsilon: f64) -> Self {
        Self {
            weights,
            normalizer: QueryNormalizer,
            tie_epsilon,
        }
    }

    /// Score every entry, drop those below `threshold`, and return the best
    /// `top_k` together with the best score seen overall.
    pub fn retrieve(
        &self,
        query: &str,
        knowledge: &KnowledgeBase,
        top_k: usize,
        threshold: f64,
    ) -> Retrieval {
        let normalization = self.normalizer.normalize(query);
        if let Some(note) = &normalization.note {
            debug!(
                original = %note.original_text,
                normalized = %normalization.text,
                language = %note.original_language,
                "Query normalized before scoring"
            );
        }

        if knowledge.is_empty() {
            debug!("Knowledge base is empty; nothing to retrieve");
            return Retrieval {
                contexts: Vec::new(),
                max_score: 0.0,
                normalization,
            };
        }

        let prepared = PreparedQuery::new(&normalization.text, normalization.altered());
        let mut scored: Vec<ScoredMatch> = knowledge
            .entries()
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let (score, signals) =
                    score_entry(entry, idx, knowledge.index(), &prepared, &self.weights);
                ScoredMatch {
                    entry_index: idx,
                    score,
                    signals,
                }
            })
            .collect();

        let max_score = scored.iter().map(|m| m.score).fold(0.0, f64::max);

        scored.retain(|m| m.score >= threshold);
        rank_matches(&mut scored, knowledge.entries(), self.tie_epsilon);
        scored.truncate(top_k);

        for m in &scored {
            debug!(
                entry = m.entry_index,
                score = m.score,
                signals = ?m.signals,
                "Knowledge entry matched"
            );
        }
        info!(
            entries = knowledge.len(),
            matches = scored.len(),
            max_score,
            threshold,
            "Retrieval complete"
        );

        Retrieval {
            contexts: scored,
            max_score,
            normalization,
        }
    }

    /// Score and rank every entry with no threshold or limit.
    pub fn explain(&self, query: &str, knowledge: &KnowledgeBase) -> Retrieval {
        self.retrieve(query, knowledge, knowledge.len(), 0.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
