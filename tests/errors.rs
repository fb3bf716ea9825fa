//! The error model: merging, labelling, and rendering.

use parsnip::{
    attempt, eof, text, CharStream, ErrorMessage, ParseError, ParseResult, Parser, Position,
    Stream,
};

fn chars(input: &str) -> CharStream {
    CharStream::new("test", input)
}

fn advance_over(source: &str, n: usize) -> Position {
    let mut pos = Position::initial("test");
    for ch in source.chars().take(n) {
        pos = pos.advance(ch);
    }
    pos
}

#[test]
fn merge_prefers_furthest_position() {
    let near = ParseError::expected(advance_over("abc", 1), "one");
    let far = ParseError::expected(advance_over("abc", 2), "two");
    assert_eq!(near.clone().merge(far.clone()), far);
    assert_eq!(far.clone().merge(near), far);
}

#[test]
fn merge_unions_messages_at_equal_positions() {
    let a = ParseError::expected(advance_over("abc", 1), "one");
    let mut b = ParseError::expected(advance_over("abc", 1), "two");
    b.push(ErrorMessage::Expected("one".to_owned()));

    let merged = a.merge(b);
    // "one" is deduplicated; "two" is added.
    assert_eq!(merged.messages().len(), 2);
    assert!(merged
        .messages()
        .contains(&ErrorMessage::Expected("one".to_owned())));
    assert!(merged
        .messages()
        .contains(&ErrorMessage::Expected("two".to_owned())));
}

#[test]
fn error_equality_ignores_message_order() {
    let mut a = ParseError::expected(advance_over("x", 0), "one");
    a.push(ErrorMessage::Expected("two".to_owned()));
    let mut b = ParseError::expected(advance_over("x", 0), "two");
    b.push(ErrorMessage::Expected("one".to_owned()));
    assert_eq!(a, b);
}

#[test]
fn alternation_reports_deepest_attempt() {
    // Both alternatives die at column 3; the report names both.
    let parser = attempt(text::string("abc")).or(text::string("abd"));
    match parser.parse(chars("abx")) {
        ParseResult::Failure { error, .. } => {
            assert_eq!(error.position().column, 3);
            assert!(error
                .messages()
                .contains(&ErrorMessage::Expected("'abc'".to_owned())));
            assert!(error
                .messages()
                .contains(&ErrorMessage::Expected("'abd'".to_owned())));
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn success_carries_error_trail_for_later_failures() {
    // The trailing eof fails right where the optional sign was tried, so
    // the sign's expectation survives into the final report.
    let parser = text::digit()
        .then_skip(text::char('+').optional())
        .then_skip(eof());
    match parser.parse(chars("5x")) {
        ParseResult::Failure { error, .. } => {
            assert_eq!(error.position().column, 2);
            assert!(error
                .messages()
                .contains(&ErrorMessage::Expected("'+'".to_owned())));
            assert!(error
                .messages()
                .contains(&ErrorMessage::Expected("end of input".to_owned())));
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn error_positions_never_regress_across_sequencing() {
    let parser = text::char('a').then(text::char('b'));
    match parser.parse(chars("ax")) {
        ParseResult::Failure { error, .. } => assert_eq!(error.position().column, 2),
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn with_expected_replaces_messages_only() {
    let parser = text::digit().many1().with_expected("number");
    match parser.parse(chars("x")) {
        ParseResult::Failure { error, .. } => {
            assert_eq!(
                error.messages(),
                &[ErrorMessage::Expected("number".to_owned())]
            );
            assert_eq!(error.position().column, 1);
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn with_context_builds_innermost_first_breadcrumb() {
    colored::control::set_override(false);
    let parser = text::digit()
        .with_context("array element")
        .with_context("array");
    match parser.parse(chars("x")) {
        ParseResult::Failure { error, .. } => {
            assert_eq!(
                error.context(),
                &["array element".to_owned(), "array".to_owned()]
            );
            let rendered = format!("{}", error);
            assert!(
                rendered.contains("while parsing array element in array"),
                "{}",
                rendered
            );
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn terse_rendering_lists_alternatives_with_or() {
    colored::control::set_override(false);
    let mut error = ParseError::expected(advance_over("xy", 1), "cat");
    error.push(ErrorMessage::Expected("dog".to_owned()));
    error.push(ErrorMessage::Expected("fish".to_owned()));
    assert_eq!(
        format!("{}", error),
        "parse error at test:1:2: expected cat, dog, or fish"
    );

    let error = ParseError::expected(advance_over("xy", 0), "cat");
    assert_eq!(format!("{}", error), "parse error at test:1:1: expected cat");
}

#[test]
fn terse_rendering_of_end_of_input() {
    colored::control::set_override(false);
    let error = ParseError::end_of_input(advance_over("ab", 2));
    assert_eq!(
        format!("{}", error),
        "parse error at test:1:3: unexpected end of input"
    );
}

#[test]
fn detailed_rendering_points_at_the_failure_column() {
    colored::control::set_override(false);
    let source = "let x = 1\nlet y = ;\n";
    let parser = text::string("let y = ").skip_then(text::digit());
    // Line 2, column 9 is the ';'.
    let mut stream = chars(source);
    for _ in 0..10 {
        stream = stream.advance();
    }
    match parser.parse(stream) {
        ParseResult::Failure { error, .. } => {
            let rendered = error.render_with_source(source);
            let expected = concat!(
                "parse error at test:2:9: unexpected ';'; expected digit\n",
                " --> test:2:9\n",
                "  |\n",
                "2 | let y = ;\n",
                "  |         ^ expected digit\n",
                "  |",
            );
            assert_eq!(rendered, expected);
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn into_result_raises_the_structured_error() {
    let error = text::digit()
        .parse(chars("x"))
        .into_result()
        .unwrap_err();
    assert_eq!(error.position().column, 1);
    assert!(error
        .messages()
        .contains(&ErrorMessage::Expected("digit".to_owned())));
}
