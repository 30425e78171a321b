use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ontograph::{Ontology, TermId};

/// A deep quaternary tree: term i is a child of term i / 4
fn build_ontology(n: usize) -> Ontology {
    let mut out = String::with_capacity(n * 64);
    out.push_str("format-version: 1.2\n");
    for i in 0..n {
        out.push_str(&format!("\n[Term]\nid: EX:{:07}\nname: term {}\n", i, i));
        if i > 0 {
            out.push_str(&format!("is_a: EX:{:07}\n", i / 4));
        }
    }
    Ontology::from_obo_str(&out).unwrap()
}

fn ancestors_benchmark(c: &mut Criterion) {
    let ontology = build_ontology(10_000);
    let deep = TermId::try_from("EX:0009999").unwrap();

    c.bench_function("ancestor closure", |b| {
        b.iter(|| black_box(&ontology).ancestor_terms(black_box(&deep), true))
    });
}

fn descendants_benchmark(c: &mut Criterion) {
    let ontology = build_ontology(10_000);
    let root = ontology.root().clone();

    c.bench_function("descendant closure from root", |b| {
        b.iter(|| black_box(&ontology).descendant_terms(black_box(&root)))
    });
}

fn path_benchmark(c: &mut Criterion) {
    let ontology = build_ontology(10_000);
    let root = ontology.root().clone();
    let deep = TermId::try_from("EX:0009999").unwrap();

    c.bench_function("exists_path leaf to root", |b| {
        b.iter(|| black_box(&ontology).exists_path(black_box(&deep), black_box(&root)))
    });
}

criterion_group!(
    ancestors,
    ancestors_benchmark,
    descendants_benchmark,
    path_benchmark
);
criterion_main!(ancestors);
