//! Character-level primitives over a [`CharStream`], plus the
//! lexeme/symbol helpers grammars use to fix their token/whitespace
//! boundary.

use crate::context::Context;
use crate::error::{ErrorMessage, ParseError};
use crate::prim::satisfy;
use crate::result::ParseResult;
use crate::stream::{CharStream, Stream};
use crate::Parser;
use regex::Regex;

/// Match one specific character.
pub fn char(expected: char) -> impl Parser<CharStream, char> + Clone {
    let label = format!("'{}'", expected);
    satisfy::<CharStream>(move |c| *c == expected, &label)
}

/// Match an ASCII digit.
pub fn digit() -> impl Parser<CharStream, char> + Clone {
    satisfy::<CharStream>(|c| c.is_ascii_digit(), "digit")
}

/// Match an alphabetic character.
pub fn letter() -> impl Parser<CharStream, char> + Clone {
    satisfy::<CharStream>(|c| c.is_alphabetic(), "letter")
}

/// Match an alphanumeric character.
pub fn alpha_num() -> impl Parser<CharStream, char> + Clone {
    satisfy::<CharStream>(|c| c.is_alphanumeric(), "letter or digit")
}

/// Match one whitespace character.
pub fn space() -> impl Parser<CharStream, char> + Clone {
    satisfy::<CharStream>(|c| c.is_whitespace(), "whitespace")
}

/// Match a newline.
pub fn newline() -> impl Parser<CharStream, char> + Clone {
    satisfy::<CharStream>(|c| *c == '\n', "newline")
}

/// Skip zero or more whitespace characters.
pub fn spaces() -> impl Parser<CharStream, ()> + Clone {
    space().many().map(|_| ())
}

/// Match any character in `chars`.
pub fn one_of(chars: &str) -> impl Parser<CharStream, char> + Clone {
    let set = chars.to_owned();
    let label = format!("one of \"{}\"", chars);
    satisfy::<CharStream>(move |c| set.contains(*c), &label)
}

/// Match any character not in `chars`.
pub fn none_of(chars: &str) -> impl Parser<CharStream, char> + Clone {
    let set = chars.to_owned();
    let label = format!("none of \"{}\"", chars);
    satisfy::<CharStream>(move |c| !set.contains(*c), &label)
}

/*========================================*/
/*          Parser: String                */
/*========================================*/

#[derive(Clone)]
struct StringP {
    expected: String,
}

impl Parser<CharStream, String> for StringP {
    fn name(&self) -> String {
        format!("'{}'", self.expected)
    }

    fn run(&self, stream: CharStream, _ctx: &Context) -> ParseResult<CharStream, String> {
        let mut cur = stream;
        for expected in self.expected.chars() {
            match cur.current() {
                Some(found) if found == expected => cur = cur.advance(),
                Some(found) => {
                    let mut error =
                        ParseError::expected(cur.position(), &format!("'{}'", self.expected));
                    error.push(ErrorMessage::Unexpected(format!("'{}'", found)));
                    return ParseResult::failure(error, cur);
                }
                None => {
                    let mut error = ParseError::end_of_input(cur.position());
                    error.push(ErrorMessage::Expected(format!("'{}'", self.expected)));
                    return ParseResult::failure(error, cur);
                }
            }
        }
        ParseResult::success(self.expected.clone(), cur)
    }
}

/// Match `expected` character by character. Failing partway through leaves
/// the matched prefix consumed, so inside a choice this parser commits as
/// soon as it matches its first character; wrap it in
/// [`crate::Parser::attempt`] when alternatives share a prefix.
pub fn string(expected: &str) -> impl Parser<CharStream, String> + Clone {
    StringP {
        expected: expected.to_owned(),
    }
}

/*========================================*/
/*          Parser: Regex                 */
/*========================================*/

#[derive(Clone)]
struct RegexP {
    label: String,
    regex: Regex,
}

fn new_anchored(pattern: &str) -> Result<Regex, regex::Error> {
    match Regex::new(&format!("^(?:{})", pattern)) {
        Ok(regex) => Ok(regex),
        Err(err) => match Regex::new(pattern) {
            // This error message is better because it doesn't have the
            // ^(?:) wrapper in it.
            Err(err) => Err(err),
            Ok(_) => Err(err),
        },
    }
}

impl Parser<CharStream, String> for RegexP {
    fn name(&self) -> String {
        self.label.clone()
    }

    fn run(&self, stream: CharStream, _ctx: &Context) -> ParseResult<CharStream, String> {
        match self.regex.find(stream.remaining()) {
            Some(found) => {
                let matched = found.as_str().to_owned();
                let mut cur = stream;
                for _ in matched.chars() {
                    cur = cur.advance();
                }
                ParseResult::success(matched, cur)
            }
            None => {
                let mut error = ParseError::expected(stream.position(), &self.label);
                if let Some(found) = stream.current() {
                    error.push(ErrorMessage::Unexpected(format!("'{}'", found)));
                } else {
                    error.push(ErrorMessage::EndOfInput);
                }
                ParseResult::failure(error, stream)
            }
        }
    }
}

/// Match a regex at the current position and yield the matched text. The
/// syntax is that of the [regex](https://docs.rs/regex) crate; you do not
/// need to begin the pattern with a start-of-string `^`. `label` is used
/// in error messages.
pub fn regex(
    label: &str,
    pattern: &str,
) -> Result<impl Parser<CharStream, String> + Clone, regex::Error> {
    Ok(RegexP {
        label: label.to_owned(),
        regex: new_anchored(pattern)?,
    })
}

/*========================================*/
/*          Lexeme helpers                */
/*========================================*/

/// Run `parser`, then skip trailing whitespace. Grammars built from
/// lexemes never have to mention whitespace between tokens.
pub fn lexeme<T>(
    parser: impl Parser<CharStream, T> + Clone,
) -> impl Parser<CharStream, T> + Clone {
    parser.then_skip(spaces())
}

/// Match the literal `text`, then skip trailing whitespace.
pub fn symbol(text: &str) -> impl Parser<CharStream, String> + Clone {
    lexeme(string(text))
}

#[test]
fn test_string_commits_after_first_char() {
    let input = CharStream::new("test", "abd");
    match string("abc").parse(input.clone()) {
        ParseResult::Failure { error, remaining } => {
            assert_ne!(remaining, input);
            assert_eq!(error.position().column, 3);
        }
        ParseResult::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn test_regex_is_anchored() {
    let number = regex("number", "[0-9]+").unwrap();
    let result = number.parse(CharStream::new("test", "x42"));
    assert!(!result.is_success());
    // Zero-consume failure: the 'x' was not skipped over.
    assert_eq!(result.remaining().position().column, 1);

    let result = number.parse(CharStream::new("test", "42x"));
    assert_eq!(result.into_result(), Ok("42".to_owned()));
}

#[test]
fn test_symbol_skips_trailing_space() {
    let keyword = symbol("let");
    match keyword.parse(CharStream::new("test", "let  x")) {
        ParseResult::Success { remaining, .. } => assert_eq!(remaining.remaining(), "x"),
        ParseResult::Failure { .. } => panic!("expected success"),
    }
}
