//! Benchmark suite for tuvung-core
//!
//! Run with: cargo bench

use std::hint::black_box;

use chrono::Utc;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tuvung_core::{PartOfSpeech, QuestionGenerator, QuizMode, Status, VocabularyRecord};

fn corpus(size: usize) -> Vec<VocabularyRecord> {
    (0..size)
        .map(|i| VocabularyRecord {
            id: format!("id-{i}"),
            word: format!("word number {i}"),
            part_of_speech: PartOfSpeech::ALL[i % PartOfSpeech::ALL.len()],
            meaning: format!("meaning {i}"),
            status: Status::ToLearn,
            created_at: Utc::now(),
        })
        .collect()
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for size in [10usize, 100, 1000] {
        let records = corpus(size);
        for mode in [QuizMode::MultipleChoice, QuizMode::Writing] {
            group.bench_with_input(BenchmarkId::new(mode.as_str(), size), &records, |b, records| {
                let mut generator = QuestionGenerator::with_seed(7);
                b.iter(|| generator.generate(black_box(records), black_box(records), mode))
            });
        }
    }
    group.finish();
}

fn bench_reveal_scaffold(c: &mut Criterion) {
    let mut generator = QuestionGenerator::with_seed(7);
    c.bench_function("reveal_scaffold", |b| {
        b.iter(|| generator.reveal_scaffold(black_box("pneumonoultramicroscopic silicovolcano")))
    });
}

criterion_group!(benches, bench_generate, bench_reveal_scaffold);
criterion_main!(benches);
