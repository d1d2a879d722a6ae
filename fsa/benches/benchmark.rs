use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fsa::parser;
use lazy_static::lazy_static;

lazy_static! {
    static ref REGEXES: Vec<&'static str> = vec![
        "ab",
        "a*",
        "(a+b)*abb",
        "((a*(b+((c*+d)e*)*))*fg)*",
        "(a+b+c+d+e)*(a+b+c+d+e)*abcde",
        "a*b*c*d*e*",
        "(ab+ba)*(a+b)",
    ];

    static ref WORDS: Vec<&'static str> = vec![
        "abcde",
        "aabbccddeeabcde",
        "ababababab",
        "",
        "fgfgfgbfgaabfg",
    ];
}

pub fn regex_compile(c: &mut Criterion) {
    c.bench_function("parse + to_nfa + to_dfa", |b| {
        b.iter(|| {
            let input = black_box(&REGEXES[3]);
            let tree = parser::regex(input).unwrap();
            let nfa = tree.to_nfa();
            nfa.to_dfa()
        })
    });
}

pub fn nfa_simulation_modes(c: &mut Criterion) {
    let nfa = parser::regex(&REGEXES[3]).unwrap().to_nfa();

    c.bench_function("nfa multi-path simulation", |b| {
        b.iter(|| nfa.accepts(black_box(&WORDS[4])))
    });

    c.bench_function("nfa backtracking simulation", |b| {
        b.iter(|| nfa.accepts_backtrack(black_box(&WORDS[4])))
    });
}

pub fn dfa_minimize(c: &mut Criterion) {
    let dfa = parser::regex(&REGEXES[4]).unwrap().to_nfa().to_dfa();

    c.bench_function("dfa minimize", |b| {
        b.iter(|| {
            let mut clone = black_box(dfa.clone());
            clone.minimize();
            clone
        })
    });
}

pub fn gtg_synthesis(c: &mut Criterion) {
    let nfa = parser::regex(&REGEXES[3]).unwrap().to_nfa();

    c.bench_function("gtg regex synthesis", |b| b.iter(|| nfa.to_regex()));
}

criterion_group!(
    benches,
    regex_compile,
    nfa_simulation_modes,
    dfa_minimize,
    gtg_synthesis
);
criterion_main!(benches);
