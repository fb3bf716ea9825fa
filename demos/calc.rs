use parsnip::{
    build_expression_parser, eof, fail, infix, prefix, pure, text, Assoc, CharStream,
    OperatorTable, ParseResult, Parser, Recursive,
};

// > echo "(1 - 2 - 3) * sqrt(4) / 6" | cargo run --example calc
// -1.3333333333333333

fn make_calculator() -> impl Parser<CharStream, f64> + Clone {
    let expr = Recursive::<CharStream, f64>::new("arithmetic expression");

    let number = text::lexeme(
        text::regex("number", r"[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?").unwrap(),
    )
    .bind(|digits: String| -> Box<dyn Parser<CharStream, f64>> {
        match digits.parse::<f64>() {
            Ok(n) => Box::new(pure(n)),
            Err(_) => Box::new(fail("number out of range")),
        }
    });

    let parens = parsnip::between(text::symbol("("), text::symbol(")"), expr.refn());

    let sqrt = text::symbol("sqrt")
        .skip_then(parsnip::between(
            text::symbol("("),
            text::symbol(")"),
            expr.refn(),
        ))
        .map(f64::sqrt);

    let term = parsnip::choice(
        "numeric expression",
        vec![
            Box::new(number) as Box<dyn Parser<CharStream, f64>>,
            Box::new(parens),
            Box::new(sqrt),
        ],
    );

    let table = OperatorTable::new()
        .level(vec![
            infix(Assoc::Left, text::symbol("+"), |a: f64, b: f64| a + b),
            infix(Assoc::Left, text::symbol("-"), |a: f64, b: f64| a - b),
        ])
        .level(vec![
            infix(Assoc::Left, text::symbol("*"), |a: f64, b: f64| a * b),
            infix(Assoc::Left, text::symbol("/"), |a: f64, b: f64| a / b),
        ])
        .level(vec![infix(Assoc::Right, text::symbol("^"), f64::powf)])
        .level(vec![prefix(text::symbol("-"), |n: f64| -n)]);

    let expr = expr.define(build_expression_parser(table, term));
    text::spaces().skip_then(expr).then_skip(eof())
}

fn main() {
    use std::io;

    let parser = make_calculator();
    let input = io::read_to_string(io::stdin()).unwrap();
    match parser.parse(CharStream::new("stdin", &input)) {
        ParseResult::Success { value, .. } => println!("{}", value),
        ParseResult::Failure { error, .. } => println!("{}", error.render_with_source(&input)),
    }
}
