use parsnip::{eof, text, CharStream, ParseResult, Parser, Recursive};
use std::fmt;

// A small JSON parser. Does not handle string escapes beyond passing them
// through, as that would make this example more verbose without showing
// anything new about the combinators.

// cat some.json | cargo run --example json

#[derive(Debug, Clone)]
pub enum Json {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Json>),
    Object(Vec<(String, Json)>),
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Json::Null => write!(f, "null"),
            Json::Bool(b) => write!(f, "{}", b),
            Json::Number(n) => write!(f, "{}", n),
            Json::String(s) => write!(f, "\"{}\"", s),
            Json::Array(elems) => {
                write!(f, "[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            Json::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\": {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn make_json_parser() -> impl Parser<CharStream, Json> + Clone {
    let json = Recursive::<CharStream, Json>::new("json value");

    let null = text::symbol("null").map(|_| Json::Null);
    let boolean = text::symbol("true")
        .map(|_| Json::Bool(true))
        .or(text::symbol("false").map(|_| Json::Bool(false)));

    let number = text::lexeme(
        text::regex("number", r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][-+]?[0-9]+)?").unwrap(),
    )
    .map(|digits| Json::Number(digits.parse().unwrap_or(f64::NAN)));

    let quoted = text::lexeme(text::regex("string", r#""([^"\\]|\\.)*""#).unwrap())
        .map(|quoted| quoted[1..quoted.len() - 1].to_owned());
    let string = quoted.clone().map(Json::String);

    let array = parsnip::between(
        text::symbol("["),
        text::symbol("]"),
        json.refn().sep_by(text::symbol(",")),
    )
    .map(Json::Array)
    .with_context("array");

    let entry = quoted
        .then_skip(text::symbol(":"))
        .then(json.refn())
        .with_context("object entry");
    let object = parsnip::between(
        text::symbol("{"),
        text::symbol("}"),
        entry.sep_by(text::symbol(",")),
    )
    .map(Json::Object)
    .with_context("object");

    let json = json.define(parsnip::choice(
        "json value",
        vec![
            Box::new(null) as Box<dyn Parser<CharStream, Json>>,
            Box::new(boolean),
            Box::new(number),
            Box::new(string),
            Box::new(array),
            Box::new(object),
        ],
    ));

    text::spaces().skip_then(json).then_skip(eof())
}

fn main() {
    use std::io;

    let parser = make_json_parser();
    let input = io::read_to_string(io::stdin()).unwrap();
    match parser.parse(CharStream::new("stdin", &input)) {
        ParseResult::Success { value, .. } => println!("{}", value),
        ParseResult::Failure { error, .. } => println!("{}", error.render_with_source(&input)),
    }
}
