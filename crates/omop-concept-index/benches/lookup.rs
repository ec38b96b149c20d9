use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use omop_concept_index::VocabularySnapshot;
use omop_concept_search::{ConceptIndex, ConceptSearcher, VocabularyFilter};
use omop_vocab::{Concept, Relationship, StandardFlag};

const WORDS: &[&str] = &[
    "acute", "chronic", "diabetes", "mellitus", "renal", "failure", "hypertension",
    "asthma", "fracture", "femur", "infection", "bacterial", "viral", "pneumonia",
];

fn build_snapshot(size: usize) -> VocabularySnapshot {
    let concepts = (0..size).map(|i| Concept {
        id: 1_000_000 + i as i64,
        name: format!(
            "{} {} {}",
            WORDS[i % WORDS.len()],
            WORDS[(i / 7) % WORDS.len()],
            WORDS[(i / 49) % WORDS.len()]
        ),
        code: format!("C{:06}", i),
        vocabulary: if i % 3 == 0 { "ICD10CM" } else { "SNOMED" }.to_string(),
        domain: "Condition".to_string(),
        class: "Clinical Finding".to_string(),
        standard_flag: if i % 3 == 0 {
            StandardFlag::None
        } else {
            StandardFlag::Standard
        },
    });
    let relationships = (0..size)
        .step_by(3)
        .map(|i| Relationship::maps_to(1_000_000 + i as i64, 1_000_001 + i as i64));
    VocabularySnapshot::build(concepts, relationships).unwrap()
}

fn bench_query_vs_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_vs_scan");
    let filter = VocabularyFilter::for_domain("Condition");

    for size in [1_000usize, 10_000, 100_000].iter() {
        let snapshot = build_snapshot(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("trigram", size), size, |b, _| {
            b.iter(|| {
                snapshot
                    .query("Condition", black_box("PNEUMONIA"), &filter)
                    .unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("scan", size), size, |b, _| {
            b.iter(|| snapshot.scan("Condition", black_box("PNEUMONIA"), &filter));
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_build");
    group.sample_size(10);

    for size in [10_000usize, 100_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| build_snapshot(black_box(size)));
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let snapshot = build_snapshot(100_000);
    let searcher = ConceptSearcher::new(&snapshot, &snapshot);

    c.bench_function("search_renal_failure", |b| {
        b.iter(|| searcher.search(black_box("renal failure"), "Condition").unwrap());
    });
}

criterion_group!(benches, bench_query_vs_scan, bench_build, bench_search);
criterion_main!(benches);
