//! Benchmarks for knowledge-base retrieval.
//!
//! Uses 200 entries by default, roughly a large single-business FAQ. Set
//! `BENCH_FULL_SCALE=1` to run against 5,000 entries:
//!
//! ```bash
//! BENCH_FULL_SCALE=1 cargo bench -p concierge-retrieval
//! ```

use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};

use concierge_core::KnowledgeEntry;
use concierge_retrieval::composer::compose;
use concierge_retrieval::knowledge::KnowledgeBase;
use concierge_retrieval::scorer::RelevanceScorer;

const CI_ENTRY_COUNT: usize = 200;
const FULL_SCALE_ENTRY_COUNT: usize = 5_000;

const TOPICS: &[(&str, &str)] = &[
    ("What are your hours?", "We are open 9am-5pm Monday to Friday"),
    ("Where are you located?", "Our store is at 12 Main Street"),
    ("How much does a haircut cost?", "A standard haircut is $25"),
    ("What is your refund policy?", "Full refund within 30 days with a receipt"),
    ("Do you offer gift cards?", "Gift cards are available in any amount"),
    ("How can I contact support?", "Email support or call our front desk"),
];

fn entry_count() -> usize {
    if std::env::var("BENCH_FULL_SCALE").is_ok() {
        FULL_SCALE_ENTRY_COUNT
    } else {
        CI_ENTRY_COUNT
    }
}

fn build_knowledge(count: usize) -> KnowledgeBase {
    let entries = (0..count)
        .map(|i| {
            let (q, a) = TOPICS[i % TOPICS.len()];
            KnowledgeEntry::new(
                format!("{} (variant {})", q, i),
                format!("{} ref {}", a, i),
                (i % 5) as i32,
            )
        })
        .collect();
    KnowledgeBase::new(entries)
}

fn bench_index_build(c: &mut Criterion) {
    let count = entry_count();
    let entries: Vec<KnowledgeEntry> = build_knowledge(count).entries().to_vec();

    let mut group = c.benchmark_group("index_build");
    group.sample_size(50);
    group.bench_function(format!("build_{}entries", count), |b| {
        b.iter(|| KnowledgeBase::new(entries.clone()));
    });
    group.finish();
}

fn bench_retrieve(c: &mut Criterion) {
    let count = entry_count();
    let kb = build_knowledge(count);
    let scorer = RelevanceScorer::default();

    let mut group = c.benchmark_group("retrieve");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function(format!("paraphrase_top3_{}entries", count), |b| {
        b.iter(|| {
            let r = scorer.retrieve("what time are you open", &kb, 3, 0.05);
            assert!(!r.contexts.is_empty(), "Paraphrase should match hours entries");
            r
        });
    });

    group.bench_function(format!("roman_urdu_top3_{}entries", count), |b| {
        b.iter(|| scorer.retrieve("haircut ki qeemat kya hai", &kb, 3, 0.05));
    });

    group.bench_function(format!("retrieve_and_compose_{}entries", count), |b| {
        b.iter(|| {
            let r = scorer.retrieve("where is your store", &kb, 3, 0.05);
            compose(&r.contexts, &kb, r.normalization.note.as_ref())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_index_build, bench_retrieve);
criterion_main!(benches);
