//! Byte-level primitives over a [`ByteStream`].

use crate::context::Context;
use crate::error::{ErrorMessage, ParseError};
use crate::prim::satisfy;
use crate::result::ParseResult;
use crate::stream::{ByteStream, Stream};
use crate::Parser;

/// Match one specific byte.
pub fn byte(expected: u8) -> impl Parser<ByteStream, u8> + Clone {
    let label = format!("byte 0x{:02x}", expected);
    satisfy::<ByteStream>(move |b| *b == expected, &label)
}

/// Match one byte accepted by `pred`.
pub fn byte_where(
    pred: impl Fn(u8) -> bool + Clone,
    label: &str,
) -> impl Parser<ByteStream, u8> + Clone {
    satisfy::<ByteStream>(move |b| pred(*b), label)
}

/*========================================*/
/*          Parser: Literal               */
/*========================================*/

#[derive(Clone)]
struct LiteralP {
    expected: Vec<u8>,
}

impl Parser<ByteStream, Vec<u8>> for LiteralP {
    fn name(&self) -> String {
        format!("bytes {:02x?}", self.expected)
    }

    fn run(&self, stream: ByteStream, _ctx: &Context) -> ParseResult<ByteStream, Vec<u8>> {
        let mut cur = stream;
        for &expected in &self.expected {
            match cur.current() {
                Some(found) if found == expected => cur = cur.advance(),
                Some(found) => {
                    let mut error = ParseError::expected(
                        cur.position(),
                        &format!("byte 0x{:02x}", expected),
                    );
                    error.push(ErrorMessage::Unexpected(format!("byte 0x{:02x}", found)));
                    return ParseResult::failure(error, cur);
                }
                None => {
                    let mut error = ParseError::end_of_input(cur.position());
                    error.push(ErrorMessage::Expected(format!("byte 0x{:02x}", expected)));
                    return ParseResult::failure(error, cur);
                }
            }
        }
        ParseResult::success(self.expected.clone(), cur)
    }
}

/// Match `expected` byte by byte. Commits as soon as the first byte
/// matches, like [`crate::text::string`].
pub fn literal(expected: &[u8]) -> impl Parser<ByteStream, Vec<u8>> + Clone {
    LiteralP {
        expected: expected.to_vec(),
    }
}

/*========================================*/
/*          Parser: Take                  */
/*========================================*/

#[derive(Clone)]
struct TakeP {
    n: usize,
}

impl Parser<ByteStream, Vec<u8>> for TakeP {
    fn name(&self) -> String {
        format!("take({})", self.n)
    }

    fn run(&self, stream: ByteStream, _ctx: &Context) -> ParseResult<ByteStream, Vec<u8>> {
        match stream.slice(self.n) {
            Some(taken) => {
                let taken = taken.to_vec();
                let remaining = stream.advance_by(self.n);
                ParseResult::success(taken, remaining)
            }
            None => {
                let mut error = ParseError::end_of_input(stream.position());
                error.push(ErrorMessage::Expected(format!("{} bytes", self.n)));
                ParseResult::failure(error, stream)
            }
        }
    }
}

/// Take exactly `n` bytes in one bulk step; fail without consuming if
/// fewer remain.
pub fn take(n: usize) -> impl Parser<ByteStream, Vec<u8>> + Clone {
    TakeP { n }
}

#[test]
fn test_literal_and_take() {
    let stream = ByteStream::new("bytes", &[0x4d, 0x54, 0x68, 0x64, 1, 2, 3]);
    let header = literal(&[0x4d, 0x54, 0x68, 0x64]);
    match header.parse(stream) {
        ParseResult::Success { remaining, .. } => {
            assert_eq!(take(3).parse(remaining).into_result(), Ok(vec![1, 2, 3]));
        }
        ParseResult::Failure { .. } => panic!("expected success"),
    }
}

#[test]
fn test_take_past_end_consumes_nothing() {
    let stream = ByteStream::new("bytes", &[1, 2]);
    let result = take(4).parse(stream.clone());
    assert!(!result.is_success());
    assert_eq!(result.remaining(), &stream);
}
