//! Parse errors: what went wrong, where, and how errors from competing
//! alternatives combine.
//!
//! The merge rule is the heart of the engine's diagnostics: between two
//! errors, the one that got further into the input wins outright; at the
//! same position their messages and context stacks union. This way the
//! final report always names the deepest point reached across everything
//! that was tried.

use crate::position::Position;
use std::fmt;

/*========================================*/
/*          Error Message                 */
/*========================================*/

/// One clause of a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorMessage {
    /// A specific token or construct was required.
    Expected(String),
    /// A token was present but wrong.
    Unexpected(String),
    /// A free-form diagnostic, from `fail`, filters, or engine guards.
    Message(String),
    /// Input ran out at a point requiring more.
    EndOfInput,
    /// A labelled grammar region the failure occurred inside.
    NestedContext(String),
}

/*========================================*/
/*          Parse Error                   */
/*========================================*/

/// An error encountered while parsing: a position, a deduplicated set of
/// messages in first-seen order, and a stack of context labels from
/// innermost to outermost.
#[derive(Debug, Clone)]
pub struct ParseError {
    position: Position,
    messages: Vec<ErrorMessage>,
    context: Vec<String>,
}

impl ParseError {
    pub fn new(position: Position, message: ErrorMessage) -> ParseError {
        ParseError {
            position,
            messages: vec![message],
            context: Vec::new(),
        }
    }

    pub fn expected(position: Position, what: &str) -> ParseError {
        ParseError::new(position, ErrorMessage::Expected(what.to_owned()))
    }

    pub fn unexpected(position: Position, what: &str) -> ParseError {
        ParseError::new(position, ErrorMessage::Unexpected(what.to_owned()))
    }

    pub fn message(position: Position, text: &str) -> ParseError {
        ParseError::new(position, ErrorMessage::Message(text.to_owned()))
    }

    pub fn end_of_input(position: Position) -> ParseError {
        ParseError::new(position, ErrorMessage::EndOfInput)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn messages(&self) -> &[ErrorMessage] {
        &self.messages
    }

    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Add a message, skipping exact duplicates.
    pub fn push(&mut self, message: ErrorMessage) {
        if !self.messages.contains(&message) {
            self.messages.push(message);
        }
    }

    /// Combine two errors. The one further into the input wins; at equal
    /// positions, messages and context stacks union (first-seen order,
    /// duplicates dropped). Positions never move backwards under merge.
    pub fn merge(self, other: ParseError) -> ParseError {
        if self.position > other.position {
            self
        } else if other.position > self.position {
            other
        } else {
            let mut merged = self;
            for message in other.messages {
                merged.push(message);
            }
            for label in other.context {
                if !merged.context.contains(&label) {
                    merged.context.push(label);
                }
            }
            merged
        }
    }

    /// A new error with `label` added to the context stack. Labels are
    /// added while a failure bubbles outward, so each new label is more
    /// outer than those already present and the stack reads innermost
    /// first.
    pub fn with_context(mut self, label: &str) -> ParseError {
        self.context.push(label.to_owned());
        self
    }

    /// A new error whose messages are replaced by a single `Expected`
    /// clause; position and context are preserved.
    pub fn with_expected(mut self, label: &str) -> ParseError {
        self.messages = vec![ErrorMessage::Expected(label.to_owned())];
        self
    }

    /// The clause text without the "parse error at pos:" prefix.
    fn clauses(&self) -> String {
        let mut expected = Vec::new();
        let mut parts = Vec::new();
        for message in &self.messages {
            match message {
                ErrorMessage::Unexpected(what) => parts.push(format!("unexpected {}", what)),
                ErrorMessage::EndOfInput => parts.push("unexpected end of input".to_owned()),
                ErrorMessage::Expected(what) => expected.push(what.as_str()),
                ErrorMessage::Message(text) => parts.push(text.clone()),
                ErrorMessage::NestedContext(label) => parts.push(format!("in {}", label)),
            }
        }
        if !expected.is_empty() {
            parts.push(format!("expected {}", join_with_or(&expected)));
        }
        if !self.context.is_empty() {
            parts.push(format!("while parsing {}", self.context.join(" in ")));
        }
        if parts.is_empty() {
            parts.push("unknown error".to_owned());
        }
        parts.join("; ")
    }

    /// The detailed rendering: the terse headline plus the offending source
    /// line with a caret at the failure column. `source` must be the text
    /// the failing stream was constructed over.
    pub fn render_with_source(&self, source: &str) -> String {
        use colored::Colorize;

        let line_contents = source
            .lines()
            .nth(self.position.line as usize - 1)
            .unwrap_or("");
        let line_num = format!("{}", self.position.line);
        let margin = line_num.len();
        let caret_message = self
            .messages
            .iter()
            .find_map(|m| match m {
                ErrorMessage::Expected(what) => Some(format!("expected {}", what)),
                _ => None,
            })
            .unwrap_or_else(|| "here".to_owned());

        let mut out = String::new();
        out.push_str(&format!("{}\n", self));
        out.push_str(&format!(
            "{:margin$}{} {}\n",
            "",
            "-->".blue().bold(),
            self.position,
        ));
        out.push_str(&format!("{:margin$} {}\n", "", "|".blue().bold()));
        out.push_str(&format!(
            "{} {} {}\n",
            line_num.blue().bold(),
            "|".blue().bold(),
            line_contents,
        ));
        out.push_str(&format!(
            "{:margin$} {} {:col$}{} {}\n",
            "",
            "|".blue().bold(),
            "",
            "^".red().bold(),
            caret_message.red().bold(),
            col = self.position.column as usize - 1,
        ));
        out.push_str(&format!("{:margin$} {}", "", "|".blue().bold()));
        out
    }
}

fn join_with_or(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => (*only).to_owned(),
        [first, second] => format!("{} or {}", first, second),
        [head @ .., last] => format!("{}, or {}", head.join(", "), last),
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use colored::Colorize;

        write!(
            f,
            "{} {} {}{} {}",
            "parse error".red().bold(),
            "at".bold(),
            self.position,
            ":".bold(),
            self.clauses().bold(),
        )
    }
}

impl std::error::Error for ParseError {}

/// Equality ignores ordering within the message set and the context stack.
impl PartialEq for ParseError {
    fn eq(&self, other: &ParseError) -> bool {
        self.position == other.position
            && self.messages.len() == other.messages.len()
            && self.messages.iter().all(|m| other.messages.contains(m))
            && self.context.len() == other.context.len()
            && self.context.iter().all(|c| other.context.contains(c))
    }
}

impl Eq for ParseError {}

/// Merge two optional error trails.
pub(crate) fn merge_options(
    a: Option<ParseError>,
    b: Option<ParseError>,
) -> Option<ParseError> {
    match (a, b) {
        (None, b) => b,
        (a, None) => a,
        (Some(a), Some(b)) => Some(a.merge(b)),
    }
}

#[test]
fn test_merge_furthest_wins() {
    let near = ParseError::expected(Position::initial("t"), "cat");
    let far = ParseError::expected(Position::initial("t").advance('x'), "dog");
    assert_eq!(near.clone().merge(far.clone()), far);
    assert_eq!(far.clone().merge(near), far);
}

#[test]
fn test_merge_unions_at_same_position() {
    let pos = Position::initial("t");
    let a = ParseError::expected(pos.clone(), "cat");
    let b = ParseError::expected(pos, "dog").with_context("animal");
    let merged = a.merge(b);
    assert_eq!(merged.messages().len(), 2);
    assert_eq!(merged.context(), &["animal".to_owned()]);
}

#[test]
fn test_terse_rendering() {
    colored::control::set_override(false);
    let pos = Position::initial("input").advance('a').advance('b');
    let mut err = ParseError::expected(pos, "cat");
    err.push(ErrorMessage::Expected("dog".to_owned()));
    err.push(ErrorMessage::Expected("fish".to_owned()));
    assert_eq!(
        format!("{}", err),
        "parse error at input:1:3: expected cat, dog, or fish"
    );
}

#[test]
fn test_detailed_rendering() {
    colored::control::set_override(false);
    let pos = Position::initial("input")
        .advance('1')
        .advance(' ')
        .advance('+');
    let err = ParseError::expected(pos, "number");
    let expected = concat!(
        "parse error at input:1:4: expected number\n",
        " --> input:1:4\n",
        "  |\n",
        "1 | 1 + + 2\n",
        "  |    ^ expected number\n",
        "  |",
    );
    assert_eq!(err.render_with_source("1 + + 2"), expected);
}
