//! Primitives, choice, backtracking, repetition, and sequencing.

use parsnip::{
    attempt, between, choice, eof, fail, get_position, lazy, look_ahead, not_followed_by, pure,
    text, token, CharStream, Context, ErrorMessage, ParseResult, Parser, Recursive,
    Stream, TokenStream, TraceCollector,
};
use std::cell::RefCell;
use std::rc::Rc;

fn chars(input: &str) -> CharStream {
    CharStream::new("test", input)
}

fn number() -> impl Parser<CharStream, i64> + Clone {
    text::digit()
        .many1()
        .map(|digits| digits.into_iter().collect::<String>().parse::<i64>().unwrap())
}

#[track_caller]
fn assert_success<T: PartialEq + std::fmt::Debug>(
    result: ParseResult<CharStream, T>,
    expected: T,
) -> CharStream {
    match result {
        ParseResult::Success {
            value, remaining, ..
        } => {
            assert_eq!(value, expected);
            remaining
        }
        ParseResult::Failure { error, .. } => panic!("expected success, got: {}", error),
    }
}

/*========================================*/
/*          Primitives                    */
/*========================================*/

#[test]
fn pure_consumes_nothing() {
    let input = chars("abc");
    let remaining = assert_success(pure(7).parse(input.clone()), 7);
    assert_eq!(remaining, input);
}

#[test]
fn fail_reports_message_at_current_position() {
    let input = chars("abc");
    let result = fail::<CharStream, ()>("custom failure").parse(input.clone());
    match result {
        ParseResult::Failure { error, remaining } => {
            assert_eq!(error.position().column, 1);
            assert_eq!(
                error.messages(),
                &[ErrorMessage::Message("custom failure".to_owned())]
            );
            assert_eq!(remaining, input);
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn eof_only_matches_at_end() {
    assert!(eof().parse(chars("")).is_success());

    let result = eof().parse(chars("x"));
    match result {
        ParseResult::Failure { error, .. } => {
            assert_eq!(
                error.messages(),
                &[ErrorMessage::Expected("end of input".to_owned())]
            );
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn any_token_advances_one() {
    let remaining = assert_success(parsnip::any_token().parse(chars("ab")), 'a');
    assert_eq!(remaining.position().column, 2);

    let result = parsnip::any_token::<CharStream>().parse(chars(""));
    match result {
        ParseResult::Failure { error, .. } => {
            assert_eq!(error.messages(), &[ErrorMessage::EndOfInput]);
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn satisfy_rejection_consumes_nothing() {
    let input = chars("x5");
    match text::digit().parse(input.clone()) {
        ParseResult::Failure { error, remaining } => {
            assert_eq!(remaining, input);
            assert!(error
                .messages()
                .contains(&ErrorMessage::Expected("digit".to_owned())));
            assert!(error
                .messages()
                .contains(&ErrorMessage::Unexpected("'x'".to_owned())));
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn get_position_mid_parse() {
    let parser = text::string("ab").skip_then(get_position());
    match parser.parse(chars("abc")) {
        ParseResult::Success { value, .. } => {
            assert_eq!(value.offset, 2);
            assert_eq!(value.column, 3);
        }
        ParseResult::Failure { .. } => panic!("expected success"),
    }
}

#[test]
fn token_matches_by_equality() {
    let stream = TokenStream::counting("toks", vec![10, 20, 30]);
    let parser = token(10).then(token(20));
    match parser.parse(stream) {
        ParseResult::Success { value, .. } => assert_eq!(value, (10, 20)),
        ParseResult::Failure { .. } => panic!("expected success"),
    }
}

/*========================================*/
/*          Choice & backtracking         */
/*========================================*/

// Scenario: "abc" and "abd" share the prefix "ab". Without attempt, the
// first alternative commits by consuming it.
#[test]
fn committed_choice_does_not_retry() {
    let parser = text::string("abc").or(text::string("abd"));
    match parser.parse(chars("abd")) {
        ParseResult::Failure { error, .. } => assert_eq!(error.position().column, 3),
        ParseResult::Success { .. } => panic!("expected failure"),
    }

    let parser = attempt(text::string("abc")).or(text::string("abd"));
    let remaining = assert_success(parser.parse(chars("abd")), "abd".to_owned());
    assert!(remaining.is_at_end());
}

#[test]
fn or_surfaces_committed_failure_verbatim() {
    // "ax" consumes 'a' on input "ab" and fails at column 2; "ab" would
    // succeed but must never be tried.
    let parser = text::string("ax").or(text::string("ab"));
    match parser.parse(chars("ab")) {
        ParseResult::Failure { error, remaining } => {
            assert_eq!(error.position().column, 2);
            assert_eq!(remaining.position().column, 2);
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn attempt_restores_position_on_failure() {
    let input = chars("abd");
    match attempt(text::string("abc")).parse(input.clone()) {
        ParseResult::Failure { error, remaining } => {
            assert_eq!(remaining, input);
            // The error itself keeps the furthest position reached.
            assert_eq!(error.position().column, 3);
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn look_ahead_consumes_nothing() {
    let input = chars("5");
    match look_ahead(text::digit()).parse(input.clone()) {
        ParseResult::Success {
            value, remaining, ..
        } => {
            assert_eq!(value, '5');
            assert_eq!(remaining, input);
            assert_eq!(remaining.position().column, 1);
        }
        ParseResult::Failure { .. } => panic!("expected success"),
    }
}

#[test]
fn not_followed_by_flips_outcome_without_consuming() {
    let input = chars("x");
    let remaining = assert_success(not_followed_by(text::digit()).parse(input.clone()), ());
    assert_eq!(remaining, input);

    let input = chars("5");
    match not_followed_by(text::digit()).parse(input.clone()) {
        ParseResult::Failure { remaining, .. } => assert_eq!(remaining, input),
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn choice_merges_zero_consume_failures() {
    let parser = choice(
        "animal",
        vec![
            Box::new(text::string("cat")) as Box<dyn Parser<CharStream, String>>,
            Box::new(text::string("dog")),
        ],
    );
    match parser.parse(chars("xyz")) {
        ParseResult::Failure { error, .. } => {
            assert_eq!(error.position().column, 1);
            assert!(error
                .messages()
                .contains(&ErrorMessage::Expected("'cat'".to_owned())));
            assert!(error
                .messages()
                .contains(&ErrorMessage::Expected("'dog'".to_owned())));
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

/*========================================*/
/*          Repetition                    */
/*========================================*/

#[test]
fn many_stops_at_first_zero_consume_failure() {
    let remaining = assert_success(text::digit().many().parse(chars("12a")), vec!['1', '2']);
    assert_eq!(remaining.position().column, 3);

    let input = chars("");
    let remaining = assert_success(text::digit().many().parse(input.clone()), vec![]);
    assert_eq!(remaining, input);
}

#[test]
fn many_rejects_zero_consume_success() {
    match pure(0).many().parse(chars("anything")) {
        ParseResult::Failure { error, .. } => match &error.messages()[0] {
            ErrorMessage::Message(message) => {
                assert!(message.contains("did not consume input"), "{}", message)
            }
            other => panic!("wrong message kind: {:?}", other),
        },
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn many_propagates_consumed_failure() {
    // Each element is 'a' followed by 'b'. "abaX" fails inside the second
    // element after consuming its 'a'.
    let element = text::char('a').then(text::char('b'));
    match element.many().parse(chars("abaX")) {
        ParseResult::Failure { error, .. } => assert_eq!(error.position().column, 4),
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn many1_requires_one() {
    assert!(!text::digit().many1().parse(chars("x")).is_success());
    assert_success(text::digit().many1().parse(chars("7x")), vec!['7']);
}

#[test]
fn count_is_exact() {
    assert_success(text::digit().count(3).parse(chars("123")), vec!['1', '2', '3']);
    assert!(!text::digit().count(3).parse(chars("12x")).is_success());
    let input = chars("xyz");
    let remaining = assert_success(text::digit().count(0).parse(input.clone()), vec![]);
    assert_eq!(remaining, input);
}

#[test]
fn sep_by_accepts_empty_input() {
    let input = chars("");
    let parser = text::digit().sep_by(text::char(','));
    let remaining = assert_success(parser.parse(input.clone()), vec![]);
    assert_eq!(remaining, input);
}

#[test]
fn sep_by_parses_separated_elements() {
    let parser = text::digit().sep_by(text::char(','));
    assert_success(parser.clone().parse(chars("1,2,3")), vec!['1', '2', '3']);
    // A separator must be followed by an element.
    assert!(!parser.parse(chars("1,2,")).is_success());
}

#[test]
fn sep_by1_requires_first_element() {
    let parser = text::digit().sep_by1(text::char(','));
    assert!(!parser.clone().parse(chars("")).is_success());
    assert_success(parser.parse(chars("4")), vec!['4']);
}

#[test]
fn sep_end_by_takes_one_trailing_separator() {
    let parser = text::digit().sep_end_by(text::char(','));

    let remaining = assert_success(parser.clone().parse(chars("1,2,")), vec!['1', '2']);
    assert!(remaining.is_at_end());

    // A second trailing separator is left unconsumed.
    let remaining = assert_success(parser.parse(chars("1,2,,")), vec!['1', '2']);
    assert_eq!(remaining.remaining(), ",");
}

#[test]
fn end_by_requires_terminators() {
    let parser = text::digit().end_by(text::char(';'));
    let remaining = assert_success(parser.clone().parse(chars("1;2;")), vec!['1', '2']);
    assert!(remaining.is_at_end());
    assert!(!parser.parse(chars("1;2")).is_success());
}

#[test]
fn chain_left_folds_left() {
    let parser = number().chain_left(text::char('-').map(|_| |a: i64, b: i64| a - b));
    assert_success(parser.parse(chars("10-5-2")), 3);
}

#[test]
fn chain_right_folds_right() {
    let parser =
        number().chain_right(text::char('^').map(|_| |a: i64, b: i64| a.pow(b as u32)));
    assert_success(parser.parse(chars("2^3^2")), 512);
}

#[test]
fn chain_left_propagates_failure_after_operator() {
    let parser = number().chain_left(text::char('-').map(|_| |a: i64, b: i64| a - b));
    // The '-' commits; a missing right operand is a failure, not a stop.
    assert!(!parser.parse(chars("10-")).is_success());
}

#[test]
fn optional_absorbs_zero_consume_failure_only() {
    let input = chars("x");
    let remaining = assert_success(text::digit().optional().parse(input.clone()), None);
    assert_eq!(remaining, input);

    assert_success(text::digit().optional().parse(chars("5")), Some('5'));

    // "ab" commits after 'a'; optional must not swallow that.
    assert!(!text::string("ab").optional().parse(chars("ax")).is_success());
}

#[test]
fn optional_or_returns_default() {
    let parser = text::digit().optional_or('0');
    assert_success(parser.parse(chars("")), '0');
}

#[test]
fn between_keeps_inner_value() {
    let parser = between(text::char('('), text::char(')'), number());
    assert_success(parser.parse(chars("(42)")), 42);
}

/*========================================*/
/*          Sequencing                    */
/*========================================*/

#[test]
fn then_pairs_then_skip_projects() {
    let pair = text::digit().then(text::letter());
    assert_success(pair.parse(chars("1a")), ('1', 'a'));

    let left = text::digit().then_skip(text::letter());
    assert_success(left.parse(chars("1a")), '1');

    let right = text::digit().skip_then(text::letter());
    assert_success(right.parse(chars("1a")), 'a');
}

#[test]
fn bind_feeds_value_forward() {
    // A digit telling how many 'a's follow.
    let parser = text::digit()
        .map(|d| d.to_digit(10).unwrap() as usize)
        .bind(|n| text::char('a').count(n));
    assert_success(parser.parse(chars("3aaa")), vec!['a', 'a', 'a']);
    assert!(!parser.parse(chars("2a")).is_success());
}

#[test]
fn filter_rejects_without_unconsuming() {
    let small = number().filter_expected(|n| *n < 100, "small number");
    assert_success(small.clone().parse(chars("42")), 42);
    match small.parse(chars("420")) {
        ParseResult::Failure { error, remaining } => {
            assert!(error
                .messages()
                .contains(&ErrorMessage::Expected("small number".to_owned())));
            // The digits stay consumed.
            assert_eq!(remaining.position().column, 4);
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

/*========================================*/
/*          Recursion                     */
/*========================================*/

#[test]
fn lazy_breaks_construction_cycles() {
    // Nesting depth of balanced parens: "((()))" has depth 3.
    fn parens() -> Box<dyn Parser<CharStream, usize>> {
        Box::new(between(
            text::char('('),
            text::char(')'),
            lazy(parens).optional().map(|inner| match inner {
                None => 1,
                Some(n) => n + 1,
            }),
        ))
    }
    assert_success(parens().parse(chars("((()))")), 3);
    assert!(!parens().parse(chars("((")).is_success());
}

#[test]
fn recursive_forward_declaration() {
    // value = digit | '[' value,* ']' ; count the leaves.
    let value = Recursive::<CharStream, usize>::new("value");
    let leaf = text::digit().map(|_| 1);
    let list = between(
        text::char('['),
        text::char(']'),
        value.refn().sep_by(text::char(',')),
    )
    .map(|leaves| leaves.into_iter().sum());
    let value = value.define(leaf.or(list));

    assert_success(value.parse(chars("[1,[2,3],[]]")), 3);
}

/*========================================*/
/*          Tracing                       */
/*========================================*/

#[test]
fn trace_records_preorder_and_postorder() {
    let collector = Rc::new(RefCell::new(TraceCollector::new()));
    let ctx = Context::with_trace(collector.clone());

    let parser = text::digit().many().named("digits");
    let result = parser.parse_with(chars("12x"), &ctx);
    assert!(result.is_success());

    let trace = collector.borrow();
    let entries = trace.entries();
    assert!(!entries.is_empty());

    // The outermost parser opens first at depth 0 and closes last.
    assert_eq!(entries[0].parser_name, "digits");
    assert_eq!(entries[0].depth, 0);
    assert!(entries[0].end.is_none());
    let last = entries.last().unwrap();
    assert_eq!(last.parser_name, "digits");
    assert!(last.end.is_some());
    assert!(last.success);

    let report = trace.to_report();
    assert!(report.contains("digits"));
    assert!(report.contains("✓"));
}

#[test]
fn tracing_disabled_records_nothing() {
    let parser = text::digit().many();
    // Default context: no collector to fill, parse still works.
    assert_success(parser.parse(chars("12")), vec!['1', '2']);
}
