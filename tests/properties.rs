//! Property tests for the quantified engine invariants.

use parsnip::{
    attempt, build_expression_parser, infix, look_ahead, pure, text, Assoc, CharStream,
    ErrorMessage, OperatorTable, ParseResult, Parser, Position, Stream,
};
use proptest::prelude::*;

fn chars(input: &str) -> CharStream {
    CharStream::new("prop", input)
}

fn number() -> impl Parser<CharStream, i64> + Clone {
    text::digit()
        .many1()
        .map(|digits| digits.into_iter().collect::<String>().parse::<i64>().unwrap())
}

fn is_guard_failure<T>(result: ParseResult<CharStream, T>) -> bool {
    match result {
        ParseResult::Failure { error, .. } => error.messages().iter().any(|message| {
            matches!(message, ErrorMessage::Message(text) if text.contains("did not consume input"))
        }),
        ParseResult::Success { .. } => false,
    }
}

proptest! {
    // Whatever a parser consumed before failing, attempt hands the next
    // alternative the original stream back.
    #[test]
    fn attempt_restores_position(
        pattern in "[ab]{1,6}",
        input in "[ab]{0,12}",
    ) {
        let stream = chars(&input);
        match attempt(text::string(&pattern)).parse(stream.clone()) {
            ParseResult::Failure { remaining, .. } => prop_assert!(remaining == stream),
            ParseResult::Success { .. } => prop_assert!(input.starts_with(&pattern)),
        }
    }

    // A committed failure is surfaced verbatim by `or`: the second
    // alternative never runs.
    #[test]
    fn committed_failure_is_final(
        pattern in "[ab]{2,6}",
        input in "[ab]{0,12}",
    ) {
        let stream = chars(&input);
        let alone = text::string(&pattern).parse(stream.clone());
        if let ParseResult::Failure { error, remaining } = alone {
            if remaining != stream {
                // `or` with an always-succeeding fallback must still fail.
                let choice = text::string(&pattern).or(pure("fallback".to_owned()));
                match choice.parse(stream) {
                    ParseResult::Failure { error: or_error, remaining: or_remaining } => {
                        prop_assert!(or_error == error);
                        prop_assert!(or_remaining == remaining);
                    }
                    ParseResult::Success { .. } => prop_assert!(false, "or retried after consumption"),
                }
            }
        }
    }

    // Lookahead observes without consuming, and observes exactly what the
    // inner parser would have produced.
    #[test]
    fn look_ahead_never_consumes(
        pattern in "[ab]{1,4}",
        input in "[ab]{0,8}",
    ) {
        let stream = chars(&input);
        let direct = text::string(&pattern).parse(stream.clone());
        match look_ahead(text::string(&pattern)).parse(stream.clone()) {
            ParseResult::Success { value, remaining, .. } => {
                prop_assert!(remaining == stream);
                match direct {
                    ParseResult::Success { value: direct_value, .. } => {
                        prop_assert_eq!(value, direct_value)
                    }
                    ParseResult::Failure { .. } => prop_assert!(false, "lookahead invented a success"),
                }
            }
            ParseResult::Failure { .. } => prop_assert!(!direct.is_success()),
        }
    }

    // merge(a, b) sits at max(position); equal positions pool messages.
    #[test]
    fn merge_is_furthest_wins(
        text_a in "[a-z\\n]{0,12}",
        n_a in 0usize..12,
        n_b in 0usize..12,
    ) {
        let pos = |n: usize| {
            let mut pos = Position::initial("prop");
            for ch in text_a.chars().take(n) {
                pos = pos.advance(ch);
            }
            pos
        };
        let a = parsnip::ParseError::expected(pos(n_a), "a");
        let b = parsnip::ParseError::expected(pos(n_b), "b");
        let merged = a.clone().merge(b.clone());
        prop_assert_eq!(
            merged.position().offset,
            a.position().offset.max(b.position().offset)
        );
        if a.position() == b.position() {
            prop_assert_eq!(merged.messages().len(), 2);
        }
    }

    // Offsets move one per char; lines count newlines; columns reset on
    // newline.
    #[test]
    fn position_tracking(input in "[a-c\\n]{0,24}") {
        let mut stream = chars(&input);
        while !stream.is_at_end() {
            stream = stream.advance();
        }
        let pos = stream.position();
        prop_assert_eq!(pos.offset, input.chars().count());
        let newlines = input.chars().filter(|c| *c == '\n').count() as u32;
        prop_assert_eq!(pos.line, 1 + newlines);
        let last_line_len = input.rsplit('\n').next().unwrap_or("").chars().count() as u32;
        prop_assert_eq!(pos.column, 1 + last_line_len);
    }

    // many consumes the maximal prefix and stops exactly where its inner
    // parser first fails without consuming.
    #[test]
    fn many_consumes_maximal_digit_prefix(input in "[0-9a-z]{0,16}") {
        let digits = input.chars().take_while(|c| c.is_ascii_digit()).count();
        match text::digit().many().parse(chars(&input)) {
            ParseResult::Success { value, remaining, .. } => {
                prop_assert_eq!(value.len(), digits);
                prop_assert_eq!(remaining.position().offset, digits);
            }
            ParseResult::Failure { .. } => prop_assert!(false, "many must not fail here"),
        }
    }

    // A zero-consume success inside many is always caught by the guard.
    #[test]
    fn zero_consume_guard_fires(input in "[a-z]{0,8}") {
        let result = pure('x').many().parse(chars(&input));
        prop_assert!(!result.is_success());
    }

    // A zero-consume operator in chain_right trips the guard instead of
    // recursing forever.
    #[test]
    fn zero_consume_guard_fires_in_chain_right(input in "[0-9]{1,8}[a-z]{0,4}") {
        let parser = number().chain_right(pure(|a: i64, b: i64| a + b));
        prop_assert!(is_guard_failure(parser.parse(chars(&input))));
    }

    // Likewise for a right-associative level in the expression builder.
    #[test]
    fn zero_consume_guard_fires_in_right_assoc_level(input in "[0-9]{1,8}") {
        let table = OperatorTable::new().level(vec![infix(
            Assoc::Right,
            pure(()),
            |a: i64, b: i64| a + b,
        )]);
        let expr = build_expression_parser(table, number());
        prop_assert!(is_guard_failure(expr.parse(chars(&input))));
    }
}
