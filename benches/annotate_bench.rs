use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use termtip::term_injector::{HeuristicLocator, TermIndex};
use termtip::{AnnotateOptions, Annotator, Term};

const SECTION: &str = "## Layers\n\
Each Layer on the Map can be styled. See [Layer docs](http://example.com/layer).\n\
A Map Server publishes tiles; <a href=\"x\">Map Server guide</a> explains a tier.\n";

fn glossary(extra: usize) -> Vec<Term> {
    let mut terms = vec![
        Term::new("Layer", "A map layer").with_aliases(["tier"]),
        Term::new("Map", "A map"),
        Term::new("Map Server", "Serves maps"),
    ];
    for i in 0..extra {
        terms.push(Term::new(format!("glossary entry {i}"), "filler"));
    }
    terms
}

fn bench_annotate(c: &mut Criterion) {
    let document = SECTION.repeat(200);
    let terms = glossary(200);
    let index = TermIndex::build(&terms);

    let automaton = Annotator::new(&terms);
    let linear = Annotator::with_locator(
        index.clone(),
        HeuristicLocator::linear(&index),
        AnnotateOptions::default(),
    );

    let mut group = c.benchmark_group("annotate");
    group.throughput(Throughput::Bytes(document.len() as u64));
    group.bench_function("automaton_locator", |b| {
        b.iter(|| automaton.annotate(black_box(&document)))
    });
    group.bench_function("linear_locator", |b| {
        b.iter(|| linear.annotate(black_box(&document)))
    });
    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let terms = glossary(2000);
    c.bench_function("term_index_build", |b| {
        b.iter(|| TermIndex::build(black_box(&terms)))
    });
}

criterion_group!(benches, bench_annotate, bench_index_build);
criterion_main!(benches);
