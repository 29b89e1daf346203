use criterion::{black_box, criterion_group, criterion_main, Criterion};

use typeahead_rs::{QueryPipeline, SpellModel, TrieIndex};

fn bench_insert(c: &mut Criterion) {
    c.bench_function("insert 1k terms", |b| {
        b.iter(|| {
            let mut trie = TrieIndex::new();
            for i in 0..1000 {
                trie.insert(black_box(&format!("term{i}"))).unwrap();
            }
            trie
        })
    });
}

fn bench_rebuild(c: &mut Criterion) {
    let mut trie = TrieIndex::new();
    for i in 0..1000 {
        trie.insert(&format!("term{i}")).unwrap();
    }
    c.bench_function("rebuild 1k terms", |b| {
        b.iter(|| {
            let mut fresh = trie.clone();
            fresh.rebuild_top_results();
            fresh
        })
    });
}

fn bench_search(c: &mut Criterion) {
    let mut engine = QueryPipeline::with_spell(SpellModel::from_text("the quick brown fox"));
    for i in 0..100 {
        engine.search(&format!("term{i}")).unwrap();
    }
    c.bench_function("search warm engine", |b| {
        b.iter(|| engine.search(black_box("term50")).unwrap())
    });
}

criterion_group!(benches, bench_insert, bench_rebuild, bench_search);
criterion_main!(benches);
