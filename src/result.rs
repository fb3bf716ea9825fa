use crate::error::{merge_options, ParseError};
use crate::stream::Stream;

/// The outcome of running a parser.
///
/// A success may still carry a non-fatal error: the trail left by an
/// alternative that failed without consuming input. Keeping it around lets
/// a later failure at the same position report everything that was tried.
///
/// On failure, `remaining` marks the furthest point the attempt reached;
/// callers compare it with the input they passed in to tell whether the
/// parser consumed anything (the commit test).
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult<S: Stream, T> {
    Success {
        value: T,
        remaining: S,
        error: Option<ParseError>,
    },
    Failure {
        error: ParseError,
        remaining: S,
    },
}

impl<S: Stream, T> ParseResult<S, T> {
    pub fn success(value: T, remaining: S) -> ParseResult<S, T> {
        ParseResult::Success {
            value,
            remaining,
            error: None,
        }
    }

    pub fn failure(error: ParseError, remaining: S) -> ParseResult<S, T> {
        ParseResult::Failure { error, remaining }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }

    /// The stream left over after this attempt, successful or not.
    pub fn remaining(&self) -> &S {
        match self {
            ParseResult::Success { remaining, .. } => remaining,
            ParseResult::Failure { remaining, .. } => remaining,
        }
    }

    /// Transform the success value; the carried error is preserved.
    pub fn map<U>(self, func: impl FnOnce(T) -> U) -> ParseResult<S, U> {
        match self {
            ParseResult::Success {
                value,
                remaining,
                error,
            } => ParseResult::Success {
                value: func(value),
                remaining,
                error,
            },
            ParseResult::Failure { error, remaining } => {
                ParseResult::Failure { error, remaining }
            }
        }
    }

    /// Fold another error trail into this result.
    pub(crate) fn with_carried(self, carried: Option<ParseError>) -> ParseResult<S, T> {
        match self {
            ParseResult::Success {
                value,
                remaining,
                error,
            } => ParseResult::Success {
                value,
                remaining,
                error: merge_options(carried, error),
            },
            ParseResult::Failure { error, remaining } => ParseResult::Failure {
                error: match carried {
                    None => error,
                    Some(carried) => carried.merge(error),
                },
                remaining,
            },
        }
    }

    /// Reinterpret a failure at another value type. The value type is
    /// phantom on failures, so everything is preserved.
    ///
    /// # Panics
    ///
    /// Panics on a success; casting one is a bug in the caller.
    pub fn cast_failure<U>(self) -> ParseResult<S, U> {
        match self {
            ParseResult::Failure { error, remaining } => {
                ParseResult::Failure { error, remaining }
            }
            ParseResult::Success { .. } => panic!("Bug: cast_failure called on a success"),
        }
    }

    /// The value, or the structured error for the caller to propagate.
    /// The carried error trail of a success is dropped.
    pub fn into_result(self) -> Result<T, ParseError> {
        match self {
            ParseResult::Success { value, .. } => Ok(value),
            ParseResult::Failure { error, .. } => Err(error),
        }
    }
}

#[test]
fn test_map_preserves_carried_error() {
    use crate::position::Position;
    use crate::stream::CharStream;

    let stream = CharStream::new("t", "rest");
    let carried = ParseError::expected(Position::initial("t"), "other");
    let result = ParseResult::Success {
        value: 1,
        remaining: stream,
        error: Some(carried.clone()),
    };
    match result.map(|n| n + 1) {
        ParseResult::Success { value, error, .. } => {
            assert_eq!(value, 2);
            assert_eq!(error, Some(carried));
        }
        ParseResult::Failure { .. } => panic!("expected success"),
    }
}
