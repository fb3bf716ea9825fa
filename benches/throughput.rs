//! Criterion benchmarks for combinator and expression-parser throughput.

use criterion::{criterion_group, criterion_main, Criterion};

use parsnip::{
    build_expression_parser, infix, prefix, text, Assoc, CharStream, OperatorTable, Parser,
    Recursive,
};

// ---------------------------------------------------------------------------
// Input generators
// ---------------------------------------------------------------------------

fn generate_expression(terms: usize) -> String {
    let ops = ['+', '-', '*', '/'];
    let mut input = String::from("1");
    for i in 0..terms {
        input.push(ops[i % ops.len()]);
        input.push_str("23");
    }
    input
}

fn generate_nested(depth: usize) -> String {
    let mut input = String::new();
    for _ in 0..depth {
        input.push_str("-(1+");
    }
    input.push('2');
    for _ in 0..depth {
        input.push(')');
    }
    input
}

// ---------------------------------------------------------------------------
// Parsers under test
// ---------------------------------------------------------------------------

fn expression_parser() -> impl Parser<CharStream, i64> + Clone {
    let expr = Recursive::<CharStream, i64>::new("expression");

    let number = text::digit()
        .many1()
        .map(|digits| digits.into_iter().collect::<String>().parse::<i64>().unwrap());
    let parens = parsnip::between(text::char('('), text::char(')'), expr.refn());
    let term = number.or(parens);

    let table = OperatorTable::new()
        .level(vec![
            infix(Assoc::Left, text::char('+'), |a: i64, b| a.wrapping_add(b)),
            infix(Assoc::Left, text::char('-'), |a: i64, b| a.wrapping_sub(b)),
        ])
        .level(vec![
            infix(Assoc::Left, text::char('*'), |a: i64, b| a.wrapping_mul(b)),
            infix(Assoc::Left, text::char('/'), |a: i64, b| {
                if b == 0 {
                    0
                } else {
                    a / b
                }
            }),
        ])
        .level(vec![prefix(text::char('-'), |n: i64| -n)]);

    expr.define(build_expression_parser(table, term))
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_repetition(c: &mut Criterion) {
    let digits: String = "9182736450".repeat(100);
    let parser = text::digit().many();

    c.bench_function("many_1000_digits", |b| {
        b.iter(|| {
            let result = parser.parse(CharStream::new("bench", &digits));
            assert!(result.is_success());
        })
    });
}

fn bench_expressions(c: &mut Criterion) {
    let parser = expression_parser();
    let flat_small = generate_expression(10);
    let flat_large = generate_expression(500);
    let nested = generate_nested(100);

    let mut group = c.benchmark_group("expression");
    group.bench_function("flat_small", |b| {
        b.iter(|| {
            let result = parser.parse(CharStream::new("bench", &flat_small));
            assert!(result.is_success());
        })
    });
    group.bench_function("flat_large", |b| {
        b.iter(|| {
            let result = parser.parse(CharStream::new("bench", &flat_large));
            assert!(result.is_success());
        })
    });
    group.bench_function("nested", |b| {
        b.iter(|| {
            let result = parser.parse(CharStream::new("bench", &nested));
            assert!(result.is_success());
        })
    });
    group.finish();
}

criterion_group!(benches, bench_repetition, bench_expressions);
criterion_main!(benches);
