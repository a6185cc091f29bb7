//! Benchmarks for unification and forward chaining.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use seshat::kb::store::KnowledgeBase;
use seshat::kb::Item;
use seshat::statement::{Statement, Term};
use seshat::unify::unify;

fn c(value: &str) -> Term {
    Term::constant(value)
}

fn v(name: &str) -> Term {
    Term::variable(name)
}

fn bench_unify(bench: &mut Criterion) {
    let query = Statement::new("links", vec![v("a"), c("hub"), v("b"), v("c")]);
    let fact = Statement::new("links", vec![c("n1"), c("hub"), c("n2"), c("n3")]);

    bench.bench_function("unify_4_args", |b| {
        b.iter(|| black_box(unify(&query, &fact)))
    });
}

fn bench_chain_to_closure(bench: &mut Criterion) {
    // 32 parent facts in a chain, plus transitive grandparent derivation
    // through a two-antecedent rule.
    let names: Vec<String> = (0..33).map(|i| format!("p{i}")).collect();

    bench.bench_function("chain_32_facts_to_closure", |b| {
        b.iter(|| {
            let mut kb = KnowledgeBase::with_capacity(128, 64);
            kb.assert(Item::rule(
                vec![
                    Statement::new("parentof", vec![v("x"), v("y")]),
                    Statement::new("parentof", vec![v("y"), v("z")]),
                ],
                Statement::new("grandparentof", vec![v("x"), v("z")]),
            ))
            .unwrap();
            for pair in names.windows(2) {
                kb.assert(Item::fact(Statement::new(
                    "parentof",
                    vec![c(&pair[0]), c(&pair[1])],
                )))
                .unwrap();
            }
            black_box(kb.fact_count())
        })
    });
}

fn bench_ask(bench: &mut Criterion) {
    let mut kb = KnowledgeBase::new();
    for i in 0..256 {
        kb.assert(Item::fact(Statement::new(
            "knows",
            vec![c(&format!("a{i}")), c(&format!("b{i}"))],
        )))
        .unwrap();
    }
    let query = Item::fact(Statement::new("knows", vec![v("X"), c("b128")]));

    bench.bench_function("ask_over_256_facts", |b| {
        b.iter(|| black_box(kb.ask(&query).len()))
    });
}

criterion_group!(benches, bench_unify, bench_chain_to_closure, bench_ask);
criterion_main!(benches);
