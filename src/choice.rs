//! Choice, lookahead, and the backtracking discipline.
//!
//! `or` is committed: an alternative that consumed input before failing is
//! final, and nothing after it is tried. `attempt` rewinds a failure's
//! stream to where it started, turning a committed failure back into one
//! the next alternative may recover from. Between them they give LL(∞)
//! parsing where every backtrack point is visible in the grammar.

use crate::context::Context;
use crate::error::ParseError;
use crate::result::ParseResult;
use crate::stream::Stream;
use crate::Parser;
use std::marker::PhantomData;

/*========================================*/
/*          Parser: Or                    */
/*========================================*/

pub(crate) struct OrP<S, T, P, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    Q: Parser<S, T> + Clone,
{
    pub(crate) left: P,
    pub(crate) right: Q,
    pub(crate) phantom: PhantomData<(S, T)>,
}

impl<S, T, P, Q> Clone for OrP<S, T, P, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    Q: Parser<S, T> + Clone,
{
    fn clone(&self) -> Self {
        OrP {
            left: self.left.clone(),
            right: self.right.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, T, P, Q> Parser<S, T> for OrP<S, T, P, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    Q: Parser<S, T> + Clone,
{
    fn name(&self) -> String {
        format!("{}.or({})", self.left.name(), self.right.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        let input = stream.clone();
        match self.left.parse_with(stream, ctx) {
            success @ ParseResult::Success { .. } => success,
            ParseResult::Failure { error, remaining } => {
                if remaining != input {
                    // The left alternative consumed input: committed.
                    return ParseResult::Failure { error, remaining };
                }
                match self.right.parse_with(input, ctx) {
                    ParseResult::Success {
                        value,
                        remaining,
                        error: carried,
                    } => ParseResult::Success {
                        value,
                        remaining,
                        error: Some(match carried {
                            None => error,
                            Some(carried) => error.merge(carried),
                        }),
                    },
                    ParseResult::Failure {
                        error: right_error,
                        remaining,
                    } => ParseResult::Failure {
                        error: error.merge(right_error),
                        remaining,
                    },
                }
            }
        }
    }
}

/*========================================*/
/*          Parser: Attempt               */
/*========================================*/

pub(crate) struct AttemptP<S, T, P>(pub(crate) P, pub(crate) PhantomData<(S, T)>)
where
    S: Stream,
    P: Parser<S, T> + Clone;

impl<S, T, P> Clone for AttemptP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn clone(&self) -> Self {
        AttemptP(self.0.clone(), PhantomData)
    }
}

impl<S, T, P> Parser<S, T> for AttemptP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn name(&self) -> String {
        format!("{}.attempt()", self.0.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        let input = stream.clone();
        match self.0.parse_with(stream, ctx) {
            success @ ParseResult::Success { .. } => success,
            ParseResult::Failure { error, .. } => {
                // Rewind. The error keeps its (furthest) position; only the
                // stream handed to the next alternative is restored.
                ParseResult::Failure {
                    error,
                    remaining: input,
                }
            }
        }
    }
}

/// On failure, rewind the stream to where `parser` started. See
/// [`Parser::attempt`].
pub fn attempt<S: Stream, T>(
    parser: impl Parser<S, T> + Clone,
) -> impl Parser<S, T> + Clone {
    parser.attempt()
}

/*========================================*/
/*          Parser: Choice                */
/*========================================*/

struct ChoiceP<S, T>
where
    S: Stream,
{
    name: String,
    parsers: Vec<Box<dyn Parser<S, T>>>,
}

impl<S: Stream, T> Clone for ChoiceP<S, T> {
    fn clone(&self) -> Self {
        ChoiceP {
            name: self.name.clone(),
            parsers: self.parsers.clone(),
        }
    }
}

impl<S: Stream, T> Parser<S, T> for ChoiceP<S, T> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        use crate::error::merge_options;

        let input = stream;
        let mut merged: Option<ParseError> = None;
        for parser in &self.parsers {
            match parser.parse_with(input.clone(), ctx) {
                ParseResult::Success {
                    value,
                    remaining,
                    error,
                } => {
                    return ParseResult::Success {
                        value,
                        remaining,
                        error: merge_options(merged, error),
                    }
                }
                ParseResult::Failure { error, remaining } => {
                    if remaining != input {
                        // Committed failure: later alternatives are not tried.
                        return ParseResult::Failure {
                            error: match merged {
                                None => error,
                                Some(merged) => merged.merge(error),
                            },
                            remaining,
                        };
                    }
                    merged = Some(match merged {
                        None => error,
                        Some(merged) => merged.merge(error),
                    });
                }
            }
        }
        let error = merged
            .unwrap_or_else(|| ParseError::message(input.position(), "empty choice"));
        ParseResult::Failure {
            error,
            remaining: input,
        }
    }
}

/// Try each parser in order with [`Parser::or`] semantics: a left fold of
/// committed choice. The first success wins; a failure that consumed input
/// is final; zero-consume failures accumulate into one merged error.
pub fn choice<S: Stream, T>(
    name: &str,
    parsers: Vec<Box<dyn Parser<S, T>>>,
) -> impl Parser<S, T> + Clone {
    ChoiceP {
        name: name.to_owned(),
        parsers,
    }
}

/*========================================*/
/*          Parser: Lookahead             */
/*========================================*/

struct LookAheadP<S, T, P>(P, PhantomData<(S, T)>)
where
    S: Stream,
    P: Parser<S, T> + Clone;

impl<S, T, P> Clone for LookAheadP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn clone(&self) -> Self {
        LookAheadP(self.0.clone(), PhantomData)
    }
}

impl<S, T, P> Parser<S, T> for LookAheadP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn name(&self) -> String {
        format!("look_ahead({})", self.0.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        let input = stream.clone();
        match self.0.parse_with(stream, ctx) {
            ParseResult::Success { value, error, .. } => ParseResult::Success {
                value,
                remaining: input,
                error,
            },
            failure @ ParseResult::Failure { .. } => failure,
        }
    }
}

/// Run `parser` and return its value without consuming anything: on
/// success the stream is rewound to where it started. Failure is
/// unchanged.
pub fn look_ahead<S: Stream, T>(
    parser: impl Parser<S, T> + Clone,
) -> impl Parser<S, T> + Clone {
    LookAheadP(parser, PhantomData)
}

/*========================================*/
/*          Parser: Negative Lookahead    */
/*========================================*/

struct NotFollowedByP<S, T, P>(P, PhantomData<(S, T)>)
where
    S: Stream,
    P: Parser<S, T> + Clone;

impl<S, T, P> Clone for NotFollowedByP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn clone(&self) -> Self {
        NotFollowedByP(self.0.clone(), PhantomData)
    }
}

impl<S, T, P> Parser<S, ()> for NotFollowedByP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn name(&self) -> String {
        format!("not_followed_by({})", self.0.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, ()> {
        let input = stream.clone();
        match self.0.parse_with(stream, ctx) {
            ParseResult::Success { .. } => ParseResult::Failure {
                error: ParseError::unexpected(
                    input.position(),
                    &format!("{} succeeded", self.0.name()),
                ),
                remaining: input,
            },
            ParseResult::Failure { .. } => ParseResult::success((), input),
        }
    }
}

/// Succeed with `()` exactly when `parser` fails. Never consumes input
/// either way.
pub fn not_followed_by<S: Stream, T>(
    parser: impl Parser<S, T> + Clone,
) -> impl Parser<S, ()> + Clone {
    NotFollowedByP(parser, PhantomData)
}
