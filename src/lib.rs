//! # parsnip
//!
//! **Parsec-style parser combinators with selective backtracking.**
//!
//! ```
//! use parsnip::{text, CharStream, Parser};
//!
//! let number = text::digit()
//!     .many1()
//!     .map(|digits| digits.into_iter().collect::<String>().parse::<i64>().unwrap());
//!
//! let sum = number.chain_left(text::char('+').map(|_| |a: i64, b: i64| a + b));
//!
//! assert_eq!(sum.parse(CharStream::new("doc", "1+2+3")).into_result(), Ok(6));
//!
//! let err = sum.parse(CharStream::new("doc", "x")).into_result().unwrap_err();
//! assert_eq!(
//!     format!("{}", err),
//!     "parse error at doc:1:1: unexpected 'x'; expected digit"
//! );
//! ```
//!
//! ## Overview
//!
//! This crate centers around the trait [`Parser<S, T>`](Parser): a parser
//! that reads tokens from a stream of type `S` and, if successful, produces
//! a value of type `T`. Small parsers are combined into larger ones with
//! _combinators_; running the result on a stream yields a
//! [`ParseResult`] — a value plus the remaining stream, or a structured
//! [`ParseError`].
//!
//! ### Streams
//!
//! Input is abstracted behind the [`Stream`] trait: an immutable cursor
//! that is cheap to copy and advances by returning a new stream. Three
//! concrete streams are provided: [`CharStream`] over text, [`ByteStream`]
//! over a byte buffer, and [`TokenStream`] over any ordered token
//! sequence.
//!
//! ### Choice and backtracking
//!
//! [`Parser::or`] is a *committed* choice: once the first alternative has
//! consumed input, its failure is final and the second alternative is never
//! tried. Wrap an alternative in [`attempt`] to rewind its consumption on
//! failure and opt back into full backtracking. This discipline — commit by
//! default, backtrack by request — keeps grammars linear-time by default
//! and makes commit points explicit in the grammar text.
//!
//! ### Errors
//!
//! Failures from competing alternatives merge: the error that reached
//! furthest into the input wins, and errors at the same position pool their
//! messages. See [`ParseError::merge`]. Successes carry the error trail of
//! alternatives that failed without consuming, so a later failure can still
//! name everything that was tried.
//!
//! ## Reference
//!
//! ```text
//! COMBINATOR              OUTPUT-TYPE    NOTES
//!
//! ~~ primitives ~~
//! pure(v)                 V
//! fail(msg)               T              always fails
//! get_position()          Position
//! eof()                   ()
//! any_token()             S::Token
//! satisfy(pred, label)    S::Token
//! token(t)                S::Token
//!
//! ~~ mapping ~~
//! P.map(f)                f(P)
//! P.bind(k)               output of k(P)
//! P.filter(pred)          P
//! P.filter_expected(pred, label)
//!
//! ~~ sequencing ~~
//! P.then(Q)               (P, Q)
//! P.then_skip(Q)          P
//! P.skip_then(Q)          Q
//! between(O, C, P)        P
//!
//! ~~ choice ~~
//! P.or(Q)                 P
//! choice(name, vec)       P
//! P.attempt()             P              rewinds consumption on failure
//! look_ahead(P)           P              never consumes
//! not_followed_by(P)      ()             never consumes
//!
//! ~~ repetition ~~
//! P.many()                Vec<P>
//! P.many1()               Vec<P>
//! P.count(n)              Vec<P>
//! P.sep_by(Q)             Vec<P>         also sep_by1, sep_end_by
//! P.end_by(Q)             Vec<P>         also end_by1
//! P.chain_left(OP)        P              OP outputs Fn(P, P) -> P
//! P.chain_right(OP)       P
//! P.optional()            Option<P>
//! P.optional_or(default)  P
//!
//! ~~ diagnostics ~~
//! P.named(name)           P              trace name only
//! P.with_expected(label)  P              rewrites failure messages
//! P.with_context(label)   P              pushes a context label
//!
//! ~~ recursion ~~
//! lazy(factory)           —              build on first use
//! see struct Recursive    —              forward declaration
//!
//! ~~ expressions ~~
//! see OperatorTable and build_expression_parser
//! ```

mod choice;
mod context;
mod error;
mod expr;
mod position;
mod prim;
mod recur;
mod repeat;
mod result;
mod stream;
mod trace;

pub mod bytes;
pub mod text;

use dyn_clone::{clone_box, DynClone};
use std::marker::PhantomData;
use std::time::Instant;

/*========================================*/
/*          Interface                     */
/*========================================*/

pub use choice::{attempt, choice, look_ahead, not_followed_by};
pub use context::Context;
pub use error::{ErrorMessage, ParseError};
pub use expr::{
    build_expression_parser, infix, postfix, prefix, Assoc, BinaryFn, Operator, OperatorTable,
    UnaryFn,
};
pub use position::Position;
pub use prim::{any_token, eof, fail, get_position, lazy, pure, satisfy, token};
pub use recur::Recursive;
pub use repeat::between;
pub use result::ParseResult;
pub use stream::{ByteStream, CharStream, Stream, TokenStream};
pub use trace::{TraceCollector, TraceEntry};

/// A parser that reads tokens from a stream `S` and outputs a `T` on
/// success.
///
/// Parsers are immutable values: composing them builds a tree, and running
/// one never mutates it, so a parser may be reused and shared freely.
pub trait Parser<S: Stream, T>: DynClone {
    /// A descriptive name for this parser. Used in traces, never in error
    /// messages.
    fn name(&self) -> String;

    /// The parsing function itself. Callers should go through
    /// [`Parser::parse`] or [`Parser::parse_with`], which handle tracing.
    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T>;

    /// Run this parser on `stream` with a default context (tracing
    /// disabled).
    fn parse(&self, stream: S) -> ParseResult<S, T> {
        self.run(stream, &Context::new())
    }

    /// Run this parser on `stream` in `ctx`. When the context carries a
    /// trace collector, an entry is recorded before delegation and an exit
    /// after; otherwise this is a plain call.
    fn parse_with(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        match ctx.trace() {
            None => self.run(stream, ctx),
            Some(trace) => {
                let name = self.name();
                let start = stream.position();
                trace.borrow_mut().enter(&name, start.clone());
                let timer = Instant::now();
                let result = self.run(stream, ctx);
                let elapsed = timer.elapsed();
                let (end, success, error_preview) = match &result {
                    ParseResult::Success { remaining, .. } => (remaining.position(), true, None),
                    ParseResult::Failure { error, remaining } => {
                        (remaining.position(), false, Some(format!("{}", error)))
                    }
                };
                trace.borrow_mut().exit(
                    &name,
                    start,
                    end,
                    success,
                    None,
                    error_preview,
                    Some(elapsed),
                );
                result
            }
        }
    }

    // ========== Diagnostics ========== //

    /// Rename this parser. Affects traces only, never error text.
    fn named(self, name: &str) -> impl Parser<S, T> + Clone
    where
        Self: Clone,
    {
        NamedP {
            name: name.to_owned(),
            parser: self,
            phantom: PhantomData,
        }
    }

    /// On failure, replace the error's messages with a single
    /// `Expected(label)`, preserving its position and context.
    fn with_expected(self, label: &str) -> impl Parser<S, T> + Clone
    where
        Self: Clone,
    {
        ExpectedP {
            label: label.to_owned(),
            parser: self,
            phantom: PhantomData,
        }
    }

    /// On failure, add `label` to the error's context stack. Labels
    /// accumulate as the failure bubbles outward, so the stack reads
    /// innermost first.
    fn with_context(self, label: &str) -> impl Parser<S, T> + Clone
    where
        Self: Clone,
    {
        ContextP {
            label: label.to_owned(),
            parser: self,
            phantom: PhantomData,
        }
    }

    // ========== Mapping ========== //

    /// Transform this parser's output with `func`. The carried error trail
    /// of a success is preserved.
    fn map<U>(self, func: impl Fn(T) -> U + Clone) -> impl Parser<S, U> + Clone
    where
        Self: Clone,
    {
        MapP {
            parser: self,
            func,
            phantom: PhantomData,
        }
    }

    /// Monadic sequencing: run this parser, feed its output to `func`, and
    /// run the parser `func` returns on the remaining input.
    ///
    /// This is the single point where errors accumulate across sequencing:
    /// whatever trail the first parser left is merged into the second
    /// parser's outcome, failure or success.
    fn bind<U, Q>(self, func: impl Fn(T) -> Q + Clone) -> impl Parser<S, U> + Clone
    where
        Q: Parser<S, U> + Clone,
        Self: Clone,
    {
        BindP {
            parser: self,
            func,
            phantom: PhantomData,
        }
    }

    /// Succeed only if `pred` accepts the output value.
    fn filter(self, pred: impl Fn(&T) -> bool + Clone) -> impl Parser<S, T> + Clone
    where
        Self: Clone,
    {
        FilterP {
            parser: self,
            pred,
            label: None,
            phantom: PhantomData,
        }
    }

    /// Like [`Parser::filter`], but a rejection reports `expected label`.
    fn filter_expected(
        self,
        pred: impl Fn(&T) -> bool + Clone,
        label: &str,
    ) -> impl Parser<S, T> + Clone
    where
        Self: Clone,
    {
        FilterP {
            parser: self,
            pred,
            label: Some(label.to_owned()),
            phantom: PhantomData,
        }
    }

    // ========== Sequencing ========== //

    /// Parse `self` followed by `next`, producing both outputs.
    fn then<U>(self, next: impl Parser<S, U> + Clone) -> impl Parser<S, (T, U)> + Clone
    where
        Self: Clone,
    {
        ThenP {
            first: self,
            second: next,
            phantom: PhantomData,
        }
    }

    /// Parse `self` followed by `next`, keeping only `self`'s output.
    fn then_skip<U>(self, next: impl Parser<S, U> + Clone) -> impl Parser<S, T> + Clone
    where
        Self: Clone,
    {
        self.then(next).map(|(value, _)| value)
    }

    /// Parse `self` followed by `next`, keeping only `next`'s output.
    fn skip_then<U>(self, next: impl Parser<S, U> + Clone) -> impl Parser<S, U> + Clone
    where
        Self: Clone,
    {
        self.then(next).map(|(_, value)| value)
    }

    // ========== Choice ========== //

    /// Committed choice. If `self` fails _without consuming input_, try
    /// `other`. If `self` consumed input before failing, the failure is
    /// final: `other` is never tried. Wrap `self` in [`attempt`] to lift
    /// that restriction.
    fn or(self, other: impl Parser<S, T> + Clone) -> impl Parser<S, T> + Clone
    where
        Self: Clone,
    {
        choice::OrP {
            left: self,
            right: other,
            phantom: PhantomData,
        }
    }

    /// On failure, rewind the stream to where this parser started. The
    /// opt-in backtracking primitive: `a.attempt().or(b)` tries `b` even
    /// when `a` failed midway through matching a shared prefix.
    fn attempt(self) -> impl Parser<S, T> + Clone
    where
        Self: Clone,
    {
        choice::AttemptP(self, PhantomData)
    }

    // ========== Repetition ========== //

    /// Parse `self` zero or more times, until it fails without consuming
    /// input. A repetition that succeeds without consuming input fails the
    /// whole parse: it would loop forever.
    fn many(self) -> impl Parser<S, Vec<T>> + Clone
    where
        Self: Clone,
    {
        repeat::ManyP(self, PhantomData)
    }

    /// Parse `self` one or more times.
    fn many1(self) -> impl Parser<S, Vec<T>> + Clone
    where
        Self: Clone,
    {
        repeat::Many1P(self, PhantomData)
    }

    /// Parse `self` exactly `n` times.
    fn count(self, n: usize) -> impl Parser<S, Vec<T>> + Clone
    where
        Self: Clone,
    {
        repeat::CountP {
            parser: self,
            n,
            phantom: PhantomData,
        }
    }

    /// Parse zero or more `self`, separated by `sep`.
    fn sep_by<U>(self, sep: impl Parser<S, U> + Clone) -> impl Parser<S, Vec<T>> + Clone
    where
        Self: Clone,
    {
        repeat::SepByP {
            elem: self,
            sep,
            min_one: false,
            trailing: false,
            phantom: PhantomData,
        }
    }

    /// Parse one or more `self`, separated by `sep`.
    fn sep_by1<U>(self, sep: impl Parser<S, U> + Clone) -> impl Parser<S, Vec<T>> + Clone
    where
        Self: Clone,
    {
        repeat::SepByP {
            elem: self,
            sep,
            min_one: true,
            trailing: false,
            phantom: PhantomData,
        }
    }

    /// Like [`Parser::sep_by`], but tolerates one trailing separator.
    /// A second trailing separator is left unconsumed.
    fn sep_end_by<U>(self, sep: impl Parser<S, U> + Clone) -> impl Parser<S, Vec<T>> + Clone
    where
        Self: Clone,
    {
        repeat::SepByP {
            elem: self,
            sep,
            min_one: false,
            trailing: true,
            phantom: PhantomData,
        }
    }

    /// Parse zero or more `self`, each terminated by `sep`.
    fn end_by<U>(self, sep: impl Parser<S, U> + Clone) -> impl Parser<S, Vec<T>> + Clone
    where
        Self: Clone,
    {
        self.then_skip(sep).many()
    }

    /// Parse one or more `self`, each terminated by `sep`.
    fn end_by1<U>(self, sep: impl Parser<S, U> + Clone) -> impl Parser<S, Vec<T>> + Clone
    where
        Self: Clone,
    {
        self.then_skip(sep).many1()
    }

    /// Parse `self (op self)*`, folding left: `a ⊕ b ⊕ c` groups as
    /// `(a ⊕ b) ⊕ c`. `op` outputs the binary combiner to fold with.
    /// Encodes left-associative operators without left-recursion.
    fn chain_left<F>(self, op: impl Parser<S, F> + Clone) -> impl Parser<S, T> + Clone
    where
        F: Fn(T, T) -> T,
        Self: Clone,
    {
        repeat::ChainLeftP {
            term: self,
            op,
            phantom: PhantomData,
        }
    }

    /// Right-recursive variant of [`Parser::chain_left`]: `a ⊕ b ⊕ c`
    /// groups as `a ⊕ (b ⊕ c)`.
    fn chain_right<F>(self, op: impl Parser<S, F> + Clone) -> impl Parser<S, T> + Clone
    where
        F: Fn(T, T) -> T,
        Self: Clone,
    {
        repeat::ChainRightP {
            term: self,
            op,
            phantom: PhantomData,
        }
    }

    /// Attempt `self`; a failure that consumed nothing yields `None`, a
    /// failure that consumed input propagates.
    fn optional(self) -> impl Parser<S, Option<T>> + Clone
    where
        Self: Clone,
    {
        repeat::OptionalP(self, PhantomData)
    }

    /// Like [`Parser::optional`], with a default instead of `None`.
    fn optional_or(self, default: T) -> impl Parser<S, T> + Clone
    where
        T: Clone,
        Self: Clone,
    {
        self.optional()
            .map(move |opt| opt.unwrap_or_else(|| default.clone()))
    }
}

impl<S: Stream, T> Clone for Box<dyn Parser<S, T>> {
    fn clone(&self) -> Self {
        clone_box(self.as_ref())
    }
}

impl<S: Stream, T> Parser<S, T> for Box<dyn Parser<S, T>> {
    fn name(&self) -> String {
        self.as_ref().name()
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        self.as_ref().run(stream, ctx)
    }
}

/*========================================*/
/*          Parser: Named                 */
/*========================================*/

struct NamedP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    name: String,
    parser: P,
    phantom: PhantomData<(S, T)>,
}

impl<S, T, P> Clone for NamedP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn clone(&self) -> Self {
        NamedP {
            name: self.name.clone(),
            parser: self.parser.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, T, P> Parser<S, T> for NamedP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        self.parser.run(stream, ctx)
    }
}

/*========================================*/
/*          Parser: Expected              */
/*========================================*/

struct ExpectedP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    label: String,
    parser: P,
    phantom: PhantomData<(S, T)>,
}

impl<S, T, P> Clone for ExpectedP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn clone(&self) -> Self {
        ExpectedP {
            label: self.label.clone(),
            parser: self.parser.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, T, P> Parser<S, T> for ExpectedP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn name(&self) -> String {
        self.parser.name()
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        match self.parser.parse_with(stream, ctx) {
            ParseResult::Failure { error, remaining } => ParseResult::Failure {
                error: error.with_expected(&self.label),
                remaining,
            },
            success => success,
        }
    }
}

/*========================================*/
/*          Parser: Context Label         */
/*========================================*/

struct ContextP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    label: String,
    parser: P,
    phantom: PhantomData<(S, T)>,
}

impl<S, T, P> Clone for ContextP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn clone(&self) -> Self {
        ContextP {
            label: self.label.clone(),
            parser: self.parser.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, T, P> Parser<S, T> for ContextP<S, T, P>
where
    S: Stream,
    P: Parser<S, T> + Clone,
{
    fn name(&self) -> String {
        self.parser.name()
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        match self.parser.parse_with(stream, ctx) {
            ParseResult::Failure { error, remaining } => ParseResult::Failure {
                error: error.with_context(&self.label),
                remaining,
            },
            success => success,
        }
    }
}

/*========================================*/
/*          Parser: Map                   */
/*========================================*/

struct MapP<S, T0, P0, T1, F>
where
    S: Stream,
    P0: Parser<S, T0> + Clone,
    F: Fn(T0) -> T1 + Clone,
{
    parser: P0,
    func: F,
    phantom: PhantomData<(S, T0, T1)>,
}

impl<S, T0, P0, T1, F> Clone for MapP<S, T0, P0, T1, F>
where
    S: Stream,
    P0: Parser<S, T0> + Clone,
    F: Fn(T0) -> T1 + Clone,
{
    fn clone(&self) -> Self {
        MapP {
            parser: self.parser.clone(),
            func: self.func.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, T0, P0, T1, F> Parser<S, T1> for MapP<S, T0, P0, T1, F>
where
    S: Stream,
    P0: Parser<S, T0> + Clone,
    F: Fn(T0) -> T1 + Clone,
{
    fn name(&self) -> String {
        self.parser.name()
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T1> {
        self.parser.parse_with(stream, ctx).map(&self.func)
    }
}

/*========================================*/
/*          Parser: Bind                  */
/*========================================*/

struct BindP<S, T0, P0, T1, Q, F>
where
    S: Stream,
    P0: Parser<S, T0> + Clone,
    Q: Parser<S, T1> + Clone,
    F: Fn(T0) -> Q + Clone,
{
    parser: P0,
    func: F,
    phantom: PhantomData<(S, T0, T1)>,
}

impl<S, T0, P0, T1, Q, F> Clone for BindP<S, T0, P0, T1, Q, F>
where
    S: Stream,
    P0: Parser<S, T0> + Clone,
    Q: Parser<S, T1> + Clone,
    F: Fn(T0) -> Q + Clone,
{
    fn clone(&self) -> Self {
        BindP {
            parser: self.parser.clone(),
            func: self.func.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, T0, P0, T1, Q, F> Parser<S, T1> for BindP<S, T0, P0, T1, Q, F>
where
    S: Stream,
    P0: Parser<S, T0> + Clone,
    Q: Parser<S, T1> + Clone,
    F: Fn(T0) -> Q + Clone,
{
    fn name(&self) -> String {
        format!("{}.bind(…)", self.parser.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T1> {
        match self.parser.parse_with(stream, ctx) {
            failure @ ParseResult::Failure { .. } => failure.cast_failure(),
            ParseResult::Success {
                value,
                remaining,
                error,
            } => {
                let next = (self.func)(value);
                next.parse_with(remaining, ctx).with_carried(error)
            }
        }
    }
}

/*========================================*/
/*          Parser: Then                  */
/*========================================*/

struct ThenP<S, T0, P0, T1, P1>
where
    S: Stream,
    P0: Parser<S, T0> + Clone,
    P1: Parser<S, T1> + Clone,
{
    first: P0,
    second: P1,
    phantom: PhantomData<(S, T0, T1)>,
}

impl<S, T0, P0, T1, P1> Clone for ThenP<S, T0, P0, T1, P1>
where
    S: Stream,
    P0: Parser<S, T0> + Clone,
    P1: Parser<S, T1> + Clone,
{
    fn clone(&self) -> Self {
        ThenP {
            first: self.first.clone(),
            second: self.second.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, T0, P0, T1, P1> Parser<S, (T0, T1)> for ThenP<S, T0, P0, T1, P1>
where
    S: Stream,
    P0: Parser<S, T0> + Clone,
    P1: Parser<S, T1> + Clone,
{
    fn name(&self) -> String {
        format!("{}.then({})", self.first.name(), self.second.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, (T0, T1)> {
        match self.first.parse_with(stream, ctx) {
            failure @ ParseResult::Failure { .. } => failure.cast_failure(),
            ParseResult::Success {
                value,
                remaining,
                error,
            } => self
                .second
                .parse_with(remaining, ctx)
                .map(|second| (value, second))
                .with_carried(error),
        }
    }
}

/*========================================*/
/*          Parser: Filter                */
/*========================================*/

struct FilterP<S, T, P, F>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    F: Fn(&T) -> bool + Clone,
{
    parser: P,
    pred: F,
    label: Option<String>,
    phantom: PhantomData<(S, T)>,
}

impl<S, T, P, F> Clone for FilterP<S, T, P, F>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    F: Fn(&T) -> bool + Clone,
{
    fn clone(&self) -> Self {
        FilterP {
            parser: self.parser.clone(),
            pred: self.pred.clone(),
            label: self.label.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, T, P, F> Parser<S, T> for FilterP<S, T, P, F>
where
    S: Stream,
    P: Parser<S, T> + Clone,
    F: Fn(&T) -> bool + Clone,
{
    fn name(&self) -> String {
        format!("{}.filter(…)", self.parser.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        match self.parser.parse_with(stream, ctx) {
            failure @ ParseResult::Failure { .. } => failure,
            ParseResult::Success {
                value,
                remaining,
                error,
            } => {
                if (self.pred)(&value) {
                    ParseResult::Success {
                        value,
                        remaining,
                        error,
                    }
                } else {
                    // Report at the post-parse position: error positions
                    // never move backwards.
                    let failure = match &self.label {
                        Some(label) => ParseError::expected(remaining.position(), label),
                        None => ParseError::message(
                            remaining.position(),
                            "value did not satisfy predicate",
                        ),
                    };
                    ParseResult::failure(failure, remaining).with_carried(error)
                }
            }
        }
    }
}
