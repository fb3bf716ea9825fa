//! Building expression parsers from a declarative operator table.
//!
//! A table is an ordered list of precedence levels, lowest first. Each
//! level holds infix operators (left-, right-, or non-associative) and
//! prefix/postfix operators. [`build_expression_parser`] folds the table
//! into a parser: levels are applied from highest precedence down to
//! lowest, each level wrapping the expression parser of the levels above
//! it as its operand.

use crate::context::Context;
use crate::error::{merge_options, ParseError};
use crate::repeat::zero_consume_guard;
use crate::result::ParseResult;
use crate::stream::Stream;
use crate::Parser;
use std::rc::Rc;

/// A unary combiner produced by a prefix or postfix operator parser.
pub type UnaryFn<T> = Rc<dyn Fn(T) -> T>;

/// A binary combiner produced by an infix operator parser.
pub type BinaryFn<T> = Rc<dyn Fn(T, T) -> T>;

/// How identical-precedence infix operators group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// `a ⊕ b ⊕ c` groups as `(a ⊕ b) ⊕ c`.
    Left,
    /// `a ⊕ b ⊕ c` groups as `a ⊕ (b ⊕ c)`.
    Right,
    /// Two in a row is an error.
    None,
}

/// One operator in a precedence level. The wrapped parser matches the
/// operator itself and yields the combiner to apply.
pub enum Operator<S: Stream, T> {
    Infix(Assoc, Box<dyn Parser<S, BinaryFn<T>>>),
    Prefix(Box<dyn Parser<S, UnaryFn<T>>>),
    Postfix(Box<dyn Parser<S, UnaryFn<T>>>),
}

impl<S: Stream, T> Clone for Operator<S, T> {
    fn clone(&self) -> Self {
        match self {
            Operator::Infix(assoc, parser) => Operator::Infix(*assoc, parser.clone()),
            Operator::Prefix(parser) => Operator::Prefix(parser.clone()),
            Operator::Postfix(parser) => Operator::Postfix(parser.clone()),
        }
    }
}

/// An infix operator: `op` matches the operator, `combine` joins its two
/// operands.
pub fn infix<S, T, O>(
    assoc: Assoc,
    op: impl Parser<S, O> + Clone + 'static,
    combine: impl Fn(T, T) -> T + Clone + 'static,
) -> Operator<S, T>
where
    S: Stream + 'static,
    T: 'static,
    O: 'static,
{
    let parser = op.map(move |_| Rc::new(combine.clone()) as BinaryFn<T>);
    Operator::Infix(assoc, Box::new(parser))
}

/// A prefix operator: `op` matches the operator, `apply` transforms the
/// operand.
pub fn prefix<S, T, O>(
    op: impl Parser<S, O> + Clone + 'static,
    apply: impl Fn(T) -> T + Clone + 'static,
) -> Operator<S, T>
where
    S: Stream + 'static,
    T: 'static,
    O: 'static,
{
    let parser = op.map(move |_| Rc::new(apply.clone()) as UnaryFn<T>);
    Operator::Prefix(Box::new(parser))
}

/// A postfix operator: `op` matches the operator, `apply` transforms the
/// operand.
pub fn postfix<S, T, O>(
    op: impl Parser<S, O> + Clone + 'static,
    apply: impl Fn(T) -> T + Clone + 'static,
) -> Operator<S, T>
where
    S: Stream + 'static,
    T: 'static,
    O: 'static,
{
    let parser = op.map(move |_| Rc::new(apply.clone()) as UnaryFn<T>);
    Operator::Postfix(Box::new(parser))
}

/// An ordered list of precedence levels, lowest precedence first.
pub struct OperatorTable<S: Stream, T> {
    levels: Vec<Vec<Operator<S, T>>>,
}

impl<S: Stream, T> OperatorTable<S, T> {
    pub fn new() -> OperatorTable<S, T> {
        OperatorTable { levels: Vec::new() }
    }

    /// Append a precedence level. Levels are declared lowest precedence
    /// first: each `level` call binds tighter than the one before it.
    ///
    /// Operators within a level compete in declaration order. Mixing
    /// associativity classes in one level is permitted; the infix loop
    /// evaluates Left operators first, then Right, then None. Prefer one
    /// class per level.
    pub fn level(mut self, operators: Vec<Operator<S, T>>) -> OperatorTable<S, T> {
        self.levels.push(operators);
        self
    }
}

impl<S: Stream, T> Default for OperatorTable<S, T> {
    fn default() -> Self {
        OperatorTable::new()
    }
}

impl<S: Stream, T> Clone for OperatorTable<S, T> {
    fn clone(&self) -> Self {
        OperatorTable {
            levels: self.levels.clone(),
        }
    }
}

/// Transform `table` and a terminal-expression parser into a full
/// expression parser.
///
/// Levels are processed from highest precedence (last declared) to lowest:
/// at each level the running expression parser becomes
/// `(prefix)* operand (postfix)*` threaded through an infix loop. Prefix
/// operators collected left-to-right apply innermost-last (`- ! x` is
/// `-(!x)`); postfix operators bind tighter than prefix (`!x++` is
/// `!(x++)`).
pub fn build_expression_parser<S, T>(
    table: OperatorTable<S, T>,
    term: impl Parser<S, T> + Clone + 'static,
) -> impl Parser<S, T> + Clone
where
    S: Stream + 'static,
    T: 'static,
{
    let mut expr: Box<dyn Parser<S, T>> = Box::new(term);
    for operators in table.levels.into_iter().rev() {
        let mut level = LevelP {
            prefix: Vec::new(),
            postfix: Vec::new(),
            infix_left: Vec::new(),
            infix_right: Vec::new(),
            infix_none: Vec::new(),
            operand: expr,
        };
        for op in operators {
            match op {
                Operator::Prefix(parser) => level.prefix.push(parser),
                Operator::Postfix(parser) => level.postfix.push(parser),
                Operator::Infix(Assoc::Left, parser) => level.infix_left.push(parser),
                Operator::Infix(Assoc::Right, parser) => level.infix_right.push(parser),
                Operator::Infix(Assoc::None, parser) => level.infix_none.push(parser),
            }
        }
        expr = Box::new(level);
    }
    expr
}

/*========================================*/
/*          Parser: Operator Level        */
/*========================================*/

struct LevelP<S: Stream, T> {
    prefix: Vec<Box<dyn Parser<S, UnaryFn<T>>>>,
    postfix: Vec<Box<dyn Parser<S, UnaryFn<T>>>>,
    infix_left: Vec<Box<dyn Parser<S, BinaryFn<T>>>>,
    infix_right: Vec<Box<dyn Parser<S, BinaryFn<T>>>>,
    infix_none: Vec<Box<dyn Parser<S, BinaryFn<T>>>>,
    operand: Box<dyn Parser<S, T>>,
}

impl<S: Stream, T> Clone for LevelP<S, T> {
    fn clone(&self) -> Self {
        LevelP {
            prefix: self.prefix.clone(),
            postfix: self.postfix.clone(),
            infix_left: self.infix_left.clone(),
            infix_right: self.infix_right.clone(),
            infix_none: self.infix_none.clone(),
            operand: self.operand.clone(),
        }
    }
}

/// Try each operator parser in declaration order, attempt-backed: a failed
/// operator rewinds regardless of consumption, and its error joins the
/// carried trail. The first success wins.
fn try_operators<S: Stream, O>(
    operators: &[Box<dyn Parser<S, O>>],
    stream: &S,
    ctx: &Context,
    carried: &mut Option<ParseError>,
) -> Option<(O, S)> {
    for op in operators {
        match op.parse_with(stream.clone(), ctx) {
            ParseResult::Success {
                value,
                remaining,
                error,
            } => {
                *carried = merge_options(carried.take(), error);
                return Some((value, remaining));
            }
            ParseResult::Failure { error, .. } => {
                *carried = merge_options(carried.take(), Some(error));
            }
        }
    }
    None
}

impl<S: Stream, T> LevelP<S, T> {
    /// Parse `(prefix)* operand (postfix)*` and apply the collected
    /// combiners: postfix left-to-right around the operand, then prefix
    /// reversed (innermost first) around the result.
    fn parse_operand(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        let mut carried = None;
        let mut prefixes: Vec<UnaryFn<T>> = Vec::new();
        let mut cur = stream;
        loop {
            match try_operators(&self.prefix, &cur, ctx, &mut carried) {
                None => break,
                Some((apply, remaining)) => {
                    if remaining == cur {
                        return zero_consume_guard(&self.name(), remaining);
                    }
                    prefixes.push(apply);
                    cur = remaining;
                }
            }
        }

        let (mut value, mut cur, mut carried) = match self.operand.parse_with(cur, ctx) {
            failure @ ParseResult::Failure { .. } => return failure.with_carried(carried),
            ParseResult::Success {
                value,
                remaining,
                error,
            } => (value, remaining, merge_options(carried, error)),
        };

        loop {
            match try_operators(&self.postfix, &cur, ctx, &mut carried) {
                None => break,
                Some((apply, remaining)) => {
                    if remaining == cur {
                        return zero_consume_guard(&self.name(), remaining);
                    }
                    value = (*apply)(value);
                    cur = remaining;
                }
            }
        }
        for apply in prefixes.into_iter().rev() {
            value = (*apply)(value);
        }
        ParseResult::Success {
            value,
            remaining: cur,
            error: carried,
        }
    }
}

impl<S: Stream, T> Parser<S, T> for LevelP<S, T> {
    fn name(&self) -> String {
        format!("operators over {}", self.operand.name())
    }

    fn run(&self, stream: S, ctx: &Context) -> ParseResult<S, T> {
        let (mut acc, mut cur, mut carried) = match self.parse_operand(stream, ctx) {
            failure @ ParseResult::Failure { .. } => return failure,
            ParseResult::Success {
                value,
                remaining,
                error,
            } => (value, remaining, error),
        };

        loop {
            let before = cur.clone();

            // Left-associative operators fold in place.
            if let Some((combine, after_op)) =
                try_operators(&self.infix_left, &before, ctx, &mut carried)
            {
                match self.parse_operand(after_op, ctx) {
                    ParseResult::Success {
                        value,
                        remaining,
                        error,
                    } => {
                        if remaining == before {
                            return zero_consume_guard(&self.name(), remaining);
                        }
                        acc = (*combine)(acc, value);
                        carried = merge_options(carried, error);
                        cur = remaining;
                        continue;
                    }
                    ParseResult::Failure { error, remaining } => {
                        if remaining == before {
                            return ParseResult::Success {
                                value: acc,
                                remaining: before,
                                error: merge_options(carried, Some(error)),
                            };
                        }
                        return ParseResult::failure(error, remaining).with_carried(carried);
                    }
                }
            }

            // Right-associative operators recurse into the same level.
            if let Some((combine, after_op)) =
                try_operators(&self.infix_right, &before, ctx, &mut carried)
            {
                // Check progress before recursing: a zero-consume operator
                // would re-enter this level at the same position forever.
                if after_op == before {
                    return zero_consume_guard(&self.name(), after_op);
                }
                match self.run(after_op, ctx) {
                    ParseResult::Success {
                        value,
                        remaining,
                        error,
                    } => {
                        if remaining == before {
                            return zero_consume_guard(&self.name(), remaining);
                        }
                        acc = (*combine)(acc, value);
                        carried = merge_options(carried, error);
                        cur = remaining;
                        continue;
                    }
                    ParseResult::Failure { error, remaining } => {
                        if remaining == before {
                            return ParseResult::Success {
                                value: acc,
                                remaining: before,
                                error: merge_options(carried, Some(error)),
                            };
                        }
                        return ParseResult::failure(error, remaining).with_carried(carried);
                    }
                }
            }

            // Non-associative operators combine once; a repeat is an error.
            if let Some((combine, after_op)) =
                try_operators(&self.infix_none, &before, ctx, &mut carried)
            {
                match self.parse_operand(after_op, ctx) {
                    ParseResult::Success {
                        value,
                        remaining,
                        error,
                    } => {
                        if remaining == before {
                            return zero_consume_guard(&self.name(), remaining);
                        }
                        carried = merge_options(carried, error);
                        let mut probe = None;
                        if try_operators(&self.infix_none, &remaining, ctx, &mut probe)
                            .is_some()
                        {
                            let error = ParseError::message(
                                remaining.position(),
                                "operator is non-associative and cannot be chained",
                            );
                            return ParseResult::failure(error, remaining);
                        }
                        acc = (*combine)(acc, value);
                        cur = remaining;
                        continue;
                    }
                    ParseResult::Failure { error, remaining } => {
                        if remaining == before {
                            return ParseResult::Success {
                                value: acc,
                                remaining: before,
                                error: merge_options(carried, Some(error)),
                            };
                        }
                        return ParseResult::failure(error, remaining).with_carried(carried);
                    }
                }
            }

            // No operator matched: this level is done.
            return ParseResult::Success {
                value: acc,
                remaining: before,
                error: carried,
            };
        }
    }
}
