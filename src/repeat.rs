//! Repetition and sequencing combinators.
//!
//! Every loop here obeys the same two rules. First, an iteration that
//! succeeds without consuming input is a hard failure: the grammar author
//! wrote a repetition that can never terminate, and the engine refuses to
//! spin on it. Second, an iteration that fails without consuming input
//! ends the loop normally, while a failure that consumed input propagates
//! (the commit discipline of [`crate::Parser::or`], applied to loops).

use crate::context::Context;
use crate::error::{merge_options, ParseError};
use crate::result::ParseResult;
use crate::stream::Stream;
use crate::Parser;
use std::marker::PhantomData;

pub(crate) fn zero_consume_guard<S: Stream, T>(name: &str, remaining: S) -> ParseResult<S, T> {
    let message = format!(
        "{} succeeded but did not consume input; this repetition would never terminate",
        name,
    );
    let error = ParseError::message(remaining.position(), &message);
    ParseResult::failure(error, remaining)
}

/*========================================*/
/*          Parser: Many                  */
/*========================================*/

/// The shared zero-or-more loop: append to `items` until the parser fails
/// without consuming input.
fn many_loop<S, T, P>(
    parser: &P,
    mut items: Vec<T>,
    mut carried: Option<ParseError>,
    stream: S,
    ctx: &Context,
) -> ParseResult<S, Vec<T>>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    let mut cur = stream;
    loop {
        let before = cur.clone();
        match parser.parse_with(before.clone(), ctx) {
            ParseResult::Success {
                value,
                remaining,
                error,
            } => {
                if remaining == before {
                    return zero_consume_guard(&parser.name(), remaining);
                }
                carried = merge_options(carried, error);
                items.push(value);
                cur = remaining;
            }
            ParseResult::Failure { error, remaining } => {
                if remaining != before {
                    return ParseResult::failure(error, remaining).with_carried(carried);
                }
                return ParseResult::Success {
                    value: items,
                    remaining: before,
                    error: merge_options(carried, Some(error)),
                };
            }
        }
    }
}

pub(crate) struct ManyP<S, T, P>(pub(crate) P, pub(crate) PhantomData<(S, T)>)
where
    S: Stream,
    P: Parser<S, T> + Clone;

impl<S, T, P> Clone for ManyP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn clone(&self) -> Self {
        ManyP(self.0.clone(), PhantomData)
    }
}

impl<S, T, P> Parser<S, Vec<T>> for ManyP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn name(&self) -> String {
        format!("{}.many()", self.0.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, Vec<T>> {
        many_loop(&self.0, Vec::new(), None, stream, ctx)
    }
}

pub(crate) struct Many1P<S, T, P>(pub(crate) P, pub(crate) PhantomData<(S, T)>)
where
    S: Stream,
    P: Parser<S, T> + Clone;

impl<S, T, P> Clone for Many1P<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn clone(&self) -> Self {
        Many1P(self.0.clone(), PhantomData)
    }
}

impl<S, T, P> Parser<S, Vec<T>> for Many1P<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn name(&self) -> String {
        format!("{}.many1()", self.0.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, Vec<T>> {
        match self.0.parse_with(stream, ctx) {
            failure @ ParseResult::Failure { .. } => failure.cast_failure(),
            ParseResult::Success {
                value,
                remaining,
                error,
            } => many_loop(&self.0, vec![value], error, remaining, ctx),
        }
    }
}

/*========================================*/
/*          Parser: Count                 */
/*========================================*/

pub(crate) struct CountP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    pub(crate) parser: P,
    pub(crate) n: usize,
    pub(crate) phantom: PhantomData<(S, T)>,
}

impl<S, T, P> Clone for CountP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn clone(&self) -> Self {
        CountP {
            parser: self.parser.clone(),
            n: self.n,
            phantom: PhantomData,
        }
    }
}

impl<S, T, P> Parser<S, Vec<T>> for CountP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn name(&self) -> String {
        format!("{}.count({})", self.parser.name(), self.n)
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, Vec<T>> {
        let mut items = Vec::with_capacity(self.n);
        let mut carried = None;
        let mut cur = stream;
        for _ in 0..self.n {
            match self.parser.parse_with(cur, ctx) {
                ParseResult::Success {
                    value,
                    remaining,
                    error,
                } => {
                    carried = merge_options(carried, error);
                    items.push(value);
                    cur = remaining;
                }
                ParseResult::Failure { error, remaining } => {
                    return ParseResult::failure(error, remaining).with_carried(carried);
                }
            }
        }
        ParseResult::Success {
            value: items,
            remaining: cur,
            error: carried,
        }
    }
}

/*========================================*/
/*          Parser: Separated             */
/*========================================*/

pub(crate) struct SepByP<S, T, P, U, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    Q: Parser<S, U> + Clone,
{
    pub(crate) elem: P,
    pub(crate) sep: Q,
    pub(crate) min_one: bool,
    pub(crate) trailing: bool,
    pub(crate) phantom: PhantomData<(S, T, U)>,
}

impl<S, T, P, U, Q> Clone for SepByP<S, T, P, U, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    Q: Parser<S, U> + Clone,
{
    fn clone(&self) -> Self {
        SepByP {
            elem: self.elem.clone(),
            sep: self.sep.clone(),
            min_one: self.min_one,
            trailing: self.trailing,
            phantom: PhantomData,
        }
    }
}

impl<S, T, P, U, Q> Parser<S, Vec<T>> for SepByP<S, T, P, U, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    Q: Parser<S, U> + Clone,
{
    fn name(&self) -> String {
        let method = match (self.min_one, self.trailing) {
            (false, false) => "sep_by",
            (true, false) => "sep_by1",
            (false, true) => "sep_end_by",
            (true, true) => "sep_end_by1",
        };
        format!("{}.{}({})", self.elem.name(), method, self.sep.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, Vec<T>> {
        let input = stream.clone();
        let (mut items, mut carried, mut cur) = match self.elem.parse_with(stream, ctx) {
            ParseResult::Success {
                value,
                remaining,
                error,
            } => (vec![value], error, remaining),
            ParseResult::Failure { error, remaining } => {
                if remaining != input || self.min_one {
                    return ParseResult::failure(error, remaining);
                }
                return ParseResult::Success {
                    value: Vec::new(),
                    remaining: input,
                    error: Some(error),
                };
            }
        };

        loop {
            let before = cur.clone();
            match self.sep.parse_with(before.clone(), ctx) {
                ParseResult::Failure { error, remaining } => {
                    if remaining != before {
                        return ParseResult::failure(error, remaining).with_carried(carried);
                    }
                    return ParseResult::Success {
                        value: items,
                        remaining: before,
                        error: merge_options(carried, Some(error)),
                    };
                }
                ParseResult::Success {
                    remaining: after_sep,
                    error: sep_error,
                    ..
                } => {
                    carried = merge_options(carried, sep_error);
                    match self.elem.parse_with(after_sep.clone(), ctx) {
                        ParseResult::Success {
                            value,
                            remaining,
                            error,
                        } => {
                            if remaining == before {
                                return zero_consume_guard(&self.name(), remaining);
                            }
                            carried = merge_options(carried, error);
                            items.push(value);
                            cur = remaining;
                        }
                        ParseResult::Failure { error, remaining } => {
                            if self.trailing && remaining == after_sep {
                                // One trailing separator stands; a second
                                // is left unconsumed for the caller.
                                return ParseResult::Success {
                                    value: items,
                                    remaining: after_sep,
                                    error: merge_options(carried, Some(error)),
                                };
                            }
                            if remaining == before {
                                return ParseResult::Success {
                                    value: items,
                                    remaining: before,
                                    error: merge_options(carried, Some(error)),
                                };
                            }
                            return ParseResult::failure(error, remaining)
                                .with_carried(carried);
                        }
                    }
                }
            }
        }
    }
}

/*========================================*/
/*          Parser: Chains                */
/*========================================*/

pub(crate) struct ChainLeftP<S, T, P, F, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    F: Fn(T, T) -> T,
    Q: Parser<S, F> + Clone,
{
    pub(crate) term: P,
    pub(crate) op: Q,
    pub(crate) phantom: PhantomData<(S, T, F)>,
}

impl<S, T, P, F, Q> Clone for ChainLeftP<S, T, P, F, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    F: Fn(T, T) -> T,
    Q: Parser<S, F> + Clone,
{
    fn clone(&self) -> Self {
        ChainLeftP {
            term: self.term.clone(),
            op: self.op.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, T, P, F, Q> Parser<S, T> for ChainLeftP<S, T, P, F, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    F: Fn(T, T) -> T,
    Q: Parser<S, F> + Clone,
{
    fn name(&self) -> String {
        format!("{}.chain_left({})", self.term.name(), self.op.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        let (mut acc, mut cur, mut carried) = match self.term.parse_with(stream, ctx) {
            failure @ ParseResult::Failure { .. } => return failure,
            ParseResult::Success {
                value,
                remaining,
                error,
            } => (value, remaining, error),
        };

        loop {
            let before = cur.clone();
            match self.op.parse_with(before.clone(), ctx) {
                ParseResult::Failure { error, remaining } => {
                    if remaining != before {
                        return ParseResult::failure(error, remaining).with_carried(carried);
                    }
                    return ParseResult::Success {
                        value: acc,
                        remaining: before,
                        error: merge_options(carried, Some(error)),
                    };
                }
                ParseResult::Success {
                    value: combine,
                    remaining: after_op,
                    error: op_error,
                } => {
                    carried = merge_options(carried, op_error);
                    match self.term.parse_with(after_op, ctx) {
                        ParseResult::Success {
                            value,
                            remaining,
                            error,
                        } => {
                            if remaining == before {
                                return zero_consume_guard(&self.name(), remaining);
                            }
                            acc = combine(acc, value);
                            carried = merge_options(carried, error);
                            cur = remaining;
                        }
                        ParseResult::Failure { error, remaining } => {
                            if remaining == before {
                                return ParseResult::Success {
                                    value: acc,
                                    remaining: before,
                                    error: merge_options(carried, Some(error)),
                                };
                            }
                            return ParseResult::failure(error, remaining)
                                .with_carried(carried);
                        }
                    }
                }
            }
        }
    }
}

pub(crate) struct ChainRightP<S, T, P, F, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    F: Fn(T, T) -> T,
    Q: Parser<S, F> + Clone,
{
    pub(crate) term: P,
    pub(crate) op: Q,
    pub(crate) phantom: PhantomData<(S, T, F)>,
}

impl<S, T, P, F, Q> Clone for ChainRightP<S, T, P, F, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    F: Fn(T, T) -> T,
    Q: Parser<S, F> + Clone,
{
    fn clone(&self) -> Self {
        ChainRightP {
            term: self.term.clone(),
            op: self.op.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, T, P, F, Q> Parser<S, T> for ChainRightP<S, T, P, F, Q>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    F: Fn(T, T) -> T,
    Q: Parser<S, F> + Clone,
{
    fn name(&self) -> String {
        format!("{}.chain_right({})", self.term.name(), self.op.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        let (first, cur, carried) = match self.term.parse_with(stream, ctx) {
            failure @ ParseResult::Failure { .. } => return failure,
            ParseResult::Success {
                value,
                remaining,
                error,
            } => (value, remaining, error),
        };

        match self.op.parse_with(cur.clone(), ctx) {
            ParseResult::Failure { error, remaining } => {
                if remaining != cur {
                    return ParseResult::failure(error, remaining).with_carried(carried);
                }
                ParseResult::Success {
                    value: first,
                    remaining: cur,
                    error: merge_options(carried, Some(error)),
                }
            }
            ParseResult::Success {
                value: combine,
                remaining: after_op,
                error: op_error,
            } => {
                // Check progress before recursing: a zero-consume operator
                // would re-enter this chain at the same position forever.
                if after_op == cur {
                    return zero_consume_guard(&self.name(), after_op);
                }
                let carried = merge_options(carried, op_error);
                match self.run(after_op, ctx) {
                    ParseResult::Success {
                        value: rest,
                        remaining,
                        error,
                    } => ParseResult::Success {
                        value: combine(first, rest),
                        remaining,
                        error: merge_options(carried, error),
                    },
                    ParseResult::Failure { error, remaining } => {
                        if remaining == cur {
                            return ParseResult::Success {
                                value: first,
                                remaining: cur,
                                error: merge_options(carried, Some(error)),
                            };
                        }
                        ParseResult::failure(error, remaining).with_carried(carried)
                    }
                }
            }
        }
    }
}

/*========================================*/
/*          Parser: Optional              */
/*========================================*/

pub(crate) struct OptionalP<S, T, P>(pub(crate) P, pub(crate) PhantomData<(S, T)>)
where
    S: Stream,
    P: Parser<S, T> + Clone;

impl<S, T, P> Clone for OptionalP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn clone(&self) -> Self {
        OptionalP(self.0.clone(), PhantomData)
    }
}

impl<S, T, P> Parser<S, Option<T>> for OptionalP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn name(&self) -> String {
        format!("{}.optional()", self.0.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, Option<T>> {
        let input = stream.clone();
        match self.0.parse_with(stream, ctx) {
            ParseResult::Success {
                value,
                remaining,
                error,
            } => ParseResult::Success {
                value: Some(value),
                remaining,
                error,
            },
            ParseResult::Failure { error, remaining } => {
                if remaining != input {
                    return ParseResult::failure(error, remaining);
                }
                ParseResult::Success {
                    value: None,
                    remaining: input,
                    error: Some(error),
                }
            }
        }
    }
}

/*========================================*/
/*          Between                       */
/*========================================*/

/// Parse `open`, then `inner`, then `close`, keeping only `inner`'s output.
pub fn between<S, A, B, T>(
    open: impl Parser<S, A> + Clone,
    close: impl Parser<S, B> + Clone,
    inner: impl Parser<S, T> + Clone,
) -> impl Parser<S, T> + Clone
where
    S: Stream,
{
    open.skip_then(inner).then_skip(close)
}
