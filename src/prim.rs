//! The primitive parsers everything else is built from.

use crate::context::Context;
use crate::error::{ErrorMessage, ParseError};
use crate::position::Position;
use crate::result::ParseResult;
use crate::stream::Stream;
use crate::Parser;
use std::cell::OnceCell;
use std::marker::PhantomData;

/*========================================*/
/*          Parser: Pure                  */
/*========================================*/

struct PureP<S, T>(T, PhantomData<S>)
where
    S: Stream,
    T: Clone;

impl<S: Stream, T: Clone> Clone for PureP<S, T> {
    fn clone(&self) -> Self {
        PureP(self.0.clone(), PhantomData)
    }
}

impl<S: Stream, T: Clone> Parser<S, T> for PureP<S, T> {
    fn name(&self) -> String {
        "pure".to_owned()
    }

    fn run(&self, stream: S, _ctx: &Context) -> ParseResult<S, T> {
        ParseResult::success(self.0.clone(), stream)
    }
}

/// Succeed with `value`, consuming nothing.
pub fn pure<S: Stream, T: Clone>(value: T) -> impl Parser<S, T> + Clone {
    PureP(value, PhantomData)
}

/*========================================*/
/*          Parser: Fail                  */
/*========================================*/

struct FailP<S, T>(String, PhantomData<(S, T)>)
where
    S: Stream;

impl<S: Stream, T> Clone for FailP<S, T> {
    fn clone(&self) -> Self {
        FailP(self.0.clone(), PhantomData)
    }
}

impl<S: Stream, T> Parser<S, T> for FailP<S, T> {
    fn name(&self) -> String {
        "fail".to_owned()
    }

    fn run(&self, stream: S, _ctx: &Context) -> ParseResult<S, T> {
        let error = ParseError::message(stream.position(), &self.0);
        ParseResult::failure(error, stream)
    }
}

/// Always fail with `message` at the current position, consuming nothing.
pub fn fail<S: Stream, T>(message: &str) -> impl Parser<S, T> + Clone {
    FailP(message.to_owned(), PhantomData)
}

/*========================================*/
/*          Parser: Position              */
/*========================================*/

#[derive(Clone)]
struct PositionP;

impl<S: Stream> Parser<S, Position> for PositionP {
    fn name(&self) -> String {
        "get_position".to_owned()
    }

    fn run(&self, stream: S, _ctx: &Context) -> ParseResult<S, Position> {
        let pos = stream.position();
        ParseResult::success(pos, stream)
    }
}

/// Succeed with the current position, consuming nothing.
pub fn get_position<S: Stream>() -> impl Parser<S, Position> + Clone {
    PositionP
}

/*========================================*/
/*          Parser: End of Input          */
/*========================================*/

#[derive(Clone)]
struct EofP;

impl<S: Stream> Parser<S, ()> for EofP {
    fn name(&self) -> String {
        "end of input".to_owned()
    }

    fn run(&self, stream: S, _ctx: &Context) -> ParseResult<S, ()> {
        if stream.is_at_end() {
            ParseResult::success((), stream)
        } else {
            let error = ParseError::expected(stream.position(), "end of input");
            ParseResult::failure(error, stream)
        }
    }
}

/// Succeed with `()` at the end of input; fail without consuming
/// otherwise.
pub fn eof<S: Stream>() -> impl Parser<S, ()> + Clone {
    EofP
}

/*========================================*/
/*          Parser: Any Token             */
/*========================================*/

struct AnyTokenP<S>(PhantomData<S>)
where
    S: Stream;

impl<S: Stream> Clone for AnyTokenP<S> {
    fn clone(&self) -> Self {
        AnyTokenP(PhantomData)
    }
}

impl<S: Stream> Parser<S, S::Token> for AnyTokenP<S> {
    fn name(&self) -> String {
        "any token".to_owned()
    }

    fn run(&self, stream: S, _ctx: &Context) -> ParseResult<S, S::Token> {
        match stream.current() {
            None => {
                let error = ParseError::end_of_input(stream.position());
                ParseResult::failure(error, stream)
            }
            Some(tok) => ParseResult::success(tok, stream.advance()),
        }
    }
}

/// Consume and return the next token; fail with `EndOfInput` at the end.
pub fn any_token<S: Stream>() -> impl Parser<S, S::Token> + Clone {
    AnyTokenP(PhantomData)
}

/*========================================*/
/*          Parser: Satisfy               */
/*========================================*/

struct SatisfyP<S, F>
where
    S: Stream,
    F: Fn(&S::Token) -> bool + Clone,
{
    label: String,
    pred: F,
    phantom: PhantomData<S>,
}

impl<S, F> Clone for SatisfyP<S, F>
where
    S: Stream,
    F: Fn(&S::Token) -> bool + Clone,
{
    fn clone(&self) -> Self {
        SatisfyP {
            label: self.label.clone(),
            pred: self.pred.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, F> Parser<S, S::Token> for SatisfyP<S, F>
where
    S: Stream,
    F: Fn(&S::Token) -> bool + Clone,
{
    fn name(&self) -> String {
        self.label.clone()
    }

    fn run(&self, stream: S, _ctx: &Context) -> ParseResult<S, S::Token> {
        match stream.current() {
            None => {
                let mut error = ParseError::end_of_input(stream.position());
                error.push(ErrorMessage::Expected(self.label.clone()));
                ParseResult::failure(error, stream)
            }
            Some(tok) => {
                if (self.pred)(&tok) {
                    ParseResult::success(tok, stream.advance())
                } else {
                    let mut error = ParseError::expected(stream.position(), &self.label);
                    error.push(ErrorMessage::Unexpected(format!("{:?}", tok)));
                    ParseResult::failure(error, stream)
                }
            }
        }
    }
}

/// Consume and return the next token if `pred` accepts it. A rejected
/// token fails with both `Expected(label)` and `Unexpected(token)`,
/// consuming nothing.
pub fn satisfy<S: Stream>(
    pred: impl Fn(&S::Token) -> bool + Clone,
    label: &str,
) -> impl Parser<S, S::Token> + Clone {
    SatisfyP {
        label: label.to_owned(),
        pred,
        phantom: PhantomData,
    }
}

/// Consume and return the next token if it equals `expected`.
pub fn token<S>(expected: S::Token) -> impl Parser<S, S::Token> + Clone
where
    S: Stream,
    S::Token: PartialEq,
{
    let label = format!("{:?}", expected);
    satisfy(move |tok| *tok == expected, &label)
}

/*========================================*/
/*          Parser: Lazy                  */
/*========================================*/

struct LazyP<S, T, R, F>
where
    S: Stream,
    R: Parser<S, T> + Clone,
    F: Fn() -> R + Clone,
{
    factory: F,
    cell: OnceCell<R>,
    phantom: PhantomData<(S, T)>,
}

impl<S, T, R, F> Clone for LazyP<S, T, R, F>
where
    S: Stream,
    R: Parser<S, T> + Clone,
    F: Fn() -> R + Clone,
{
    fn clone(&self) -> Self {
        LazyP {
            factory: self.factory.clone(),
            cell: self.cell.clone(),
            phantom: PhantomData,
        }
    }
}

impl<S, T, R, F> Parser<S, T> for LazyP<S, T, R, F>
where
    S: Stream,
    R: Parser<S, T> + Clone,
    F: Fn() -> R + Clone,
{
    fn name(&self) -> String {
        match self.cell.get() {
            Some(parser) => parser.name(),
            None => "lazy".to_owned(),
        }
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        let parser = self.cell.get_or_init(|| (self.factory)());
        parser.parse_with(stream, ctx)
    }
}

/// A parser whose body is built by `factory` on first use. Breaks
/// construction cycles in self-referential grammars: the factory may call
/// the function it is defined in.
///
/// For mutual recursion through a shared binding, see [`crate::Recursive`].
pub fn lazy<S, T, R>(factory: impl Fn() -> R + Clone) -> impl Parser<S, T> + Clone
where
    S: Stream,
    R: Parser<S, T> + Clone,
{
    LazyP {
        factory,
        cell: OnceCell::new(),
        phantom: PhantomData,
    }
}
