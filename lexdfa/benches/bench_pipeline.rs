//! Compile pipeline sub-phase benchmarks.
//!
//! Benchmarks each stage independently:
//! 1. Grammar resolution
//! 2. NFA construction (Thompson's construction)
//! 3. Subset construction (NFA -> DFA)
//! 4. DFA minimization (table filling)
//! 5. Full pipeline
//! 6. Maximal-munch matching throughput
//! 7. Export / import
//! 8. Scaling with synthetic keyword grammars

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use lexdfa::automata::minimize::minimize_dfa;
use lexdfa::automata::nfa::build_nfa;
use lexdfa::automata::pattern::{Pattern, Symbol};
use lexdfa::automata::subset::subset_construction;
use lexdfa::automata::{Dfa, Nfa};
use lexdfa::{compile_grammar, Grammar};

const BINARY: &str = "bin -> (0|1)*1";

const IDENTIFIER: &str = "
    identifier -> (letter | _ ) (letter | digit | _ )*
    letter     -> lowercase | uppercase
    lowercase  -> a | b | c | d | e | f | g | h | i | j | k | l | m | n | o | p | q | r | s | t | u | v | w | x | y | z
    uppercase  -> A | B | C | D | E | F | G | H | I | J | K | L | M | N | O | P | Q | R | S | T | U | V | W | X | Y | Z
    digit      -> 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9
";

const CONSTANT: &str = r"
    constant    -> inte | frac
    inte        -> (bin_inte | oct_inte | dec_inte | hex_inte) opt_inte_suf
    bin_inte    -> 0(b|B) bin_digit+
    oct_inte    -> 0 oct_digit+
    dec_inte    -> (dec_digit_no_zero dec_digit*) | 0
    hex_inte    -> 0(x|X) hex_digit+
    opt_inte_suf     -> \0 | unsigned_suf | long_suf | (unsigned_suf long_suf) | (long_suf unsigned_suf)
    frac        -> (dec_frac | hex_frac) opt_frac_suf
    dec_frac    -> (dec_point dec_opt_exp) | (dec_digit+ dec_exp)
    hex_frac    -> 0(x|X) hex_base hex_opt_exp
    dec_point    -> (dec_digit+ \. dec_digit*) | (dec_digit* \. dec_digit+)
    dec_opt_exp -> \0 | ((e | E) opt_sign dec_digit+)
    dec_exp     -> (e | E) opt_sign dec_digit+
    hex_base    -> (hex_digit+ \. hex_digit*) | (hex_digit* \. hex_digit+) | (hex_digit+)
    hex_opt_exp -> \0 | ((p | P) opt_sign hex_digit+)
    opt_frac_suf    -> \0 | float_suf | long_double_suf
    unsigned_suf        -> u | U
    long_suf    -> l | L | ll | LL
    float_suf   -> f | F
    long_double_suf -> l | L
    opt_sign    -> \0 | \+ | -
    bin_digit   -> 0 | 1
    oct_digit   -> 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7
    dec_digit   -> 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9
    dec_digit_no_zero   -> 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9
    hex_digit   -> 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9 | a | b | c | d | e | f | A | B | C | D | E | F
";

const GRAMMARS: [(&str, &str); 3] = [("binary", BINARY), ("identifier", IDENTIFIER), ("constant", CONSTANT)];

/// Every intermediate product of the pipeline for one grammar.
struct Prepared {
    postfix: Vec<Symbol>,
    nfa: Nfa,
    raw: Dfa,
    min: Dfa,
}

fn prepare(grammar: &str) -> anyhow::Result<Prepared> {
    let pattern = Grammar::parse(grammar)?.resolve()?;
    let postfix = Pattern::parse(&pattern)?.to_postfix()?;
    let nfa = build_nfa(&postfix)?;
    let raw = subset_construction(&nfa, None)?;
    let min = minimize_dfa(&raw);
    Ok(Prepared { postfix, nfa, raw, min })
}

fn prepared_grammars() -> Vec<(&'static str, Prepared)> {
    GRAMMARS
        .iter()
        .map(|&(name, text)| (name, prepare(text).expect("bench grammar compiles")))
        .collect()
}

/// Union of `n` distinct five-letter keywords spelled with separators.
fn synthetic_keywords(n: usize) -> String {
    let letters: Vec<char> = ('a'..='z').collect();
    let words: Vec<String> = (0..n)
        .map(|i| {
            (0..5)
                .map(|k| letters[(i / 26usize.pow(k)) % 26].to_string())
                .collect::<Vec<_>>()
                .join(".")
        })
        .collect();
    format!("kw -> {}", words.join(" | "))
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/resolve");
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(200);

    for (name, text) in GRAMMARS {
        group.bench_with_input(BenchmarkId::from_parameter(name), &text, |b, text| {
            b.iter(|| Grammar::parse(text).and_then(|g| g.resolve()));
        });
    }

    group.finish();
}

fn bench_build_nfa(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/build_nfa");
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(200);

    for (name, prepared) in &prepared_grammars() {
        group.bench_with_input(BenchmarkId::from_parameter(name), prepared, |b, prepared| {
            b.iter(|| build_nfa(&prepared.postfix));
        });
    }

    group.finish();
}

fn bench_subset_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/subset_construction");
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(100);

    for (name, prepared) in &prepared_grammars() {
        group.bench_with_input(BenchmarkId::from_parameter(name), prepared, |b, prepared| {
            b.iter(|| subset_construction(&prepared.nfa, None));
        });
    }

    group.finish();
}

fn bench_minimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/minimize");
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(100);

    for (name, prepared) in &prepared_grammars() {
        group.bench_with_input(BenchmarkId::from_parameter(name), prepared, |b, prepared| {
            b.iter(|| minimize_dfa(&prepared.raw));
        });
    }

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/full");
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(100);

    for (name, text) in GRAMMARS {
        group.bench_with_input(BenchmarkId::from_parameter(name), &text, |b, text| {
            b.iter(|| compile_grammar(text));
        });
    }

    group.finish();
}

fn bench_longest_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/longest_match");
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(5));

    let input = "0x1F 42ull 3.25e+7 017 ".repeat(256);
    let chars: Vec<char> = input.chars().collect();
    let constant = prepare(CONSTANT).expect("bench grammar compiles").min;

    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("constants", |b| {
        b.iter(|| {
            let mut pos = 0;
            let mut tokens = 0usize;
            while pos < chars.len() {
                match constant.longest_match_chars(&chars, pos).unwrap_or(0) {
                    0 => pos += 1,
                    len => {
                        pos += len;
                        tokens += 1;
                    },
                }
            }
            tokens
        });
    });

    group.finish();
}

fn bench_persist(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/persist");
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(5));

    for (name, prepared) in &prepared_grammars() {
        let text = prepared.min.export();
        group.bench_with_input(BenchmarkId::new("export", name), prepared, |b, prepared| {
            b.iter(|| prepared.min.export());
        });
        group.bench_with_input(BenchmarkId::new("import", name), &text, |b, text| {
            b.iter(|| Dfa::import(text));
        });
    }

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/scaling");
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(8));
    group.sample_size(50);

    for n in [10usize, 50, 100, 200] {
        let grammar = synthetic_keywords(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &grammar, |b, grammar| {
            b.iter(|| compile_grammar(grammar));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_resolve,
    bench_build_nfa,
    bench_subset_construction,
    bench_minimize,
    bench_full_pipeline,
    bench_longest_match,
    bench_persist,
    bench_scaling,
);
criterion_main!(benches);
