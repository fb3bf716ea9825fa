use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

pub type Offset = usize;
pub type Line = u32;
pub type Col = u32;

/// A position in the input, _between_ two tokens (or at the start or end of
/// the input). For example, "xyz" has 4 possible positions.
///
/// `line` and `column` are 1-based. `offset` counts tokens, not bytes, and
/// increases by exactly one per token advanced. Positions are ordered and
/// compared by `offset` alone; `source_name` is carried for error messages.
#[derive(Debug, Clone)]
pub struct Position {
    /// Number of tokens before this position.
    pub offset: Offset,
    /// Line number, starting at 1.
    pub line: Line,
    /// Column number, starting at 1.
    pub column: Col,
    /// Name of the source, used only in error messages.
    pub source_name: Arc<str>,
}

impl Position {
    /// The position at the very start of a source.
    pub fn initial(source_name: &str) -> Position {
        Position {
            offset: 0,
            line: 1,
            column: 1,
            source_name: Arc::from(source_name),
        }
    }

    /// The position just after `ch`. A newline moves to the start of the
    /// next line; anything else moves one column right.
    pub fn advance(&self, ch: char) -> Position {
        if ch == '\n' {
            Position {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
                source_name: self.source_name.clone(),
            }
        } else {
            Position {
                offset: self.offset + 1,
                line: self.line,
                column: self.column + 1,
                source_name: self.source_name.clone(),
            }
        }
    }

    /// Advance over `n` non-textual tokens (bytes). No newline handling;
    /// line and column are a convention here, not a meaning.
    pub fn advance_bytes(&self, n: usize) -> Position {
        Position {
            offset: self.offset + n,
            line: self.line,
            column: self.column + n as Col,
            source_name: self.source_name.clone(),
        }
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Position) -> bool {
        self.offset == other.offset
    }
}

impl Eq for Position {}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Position) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Position) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_name, self.line, self.column)
    }
}

#[test]
fn test_advance() {
    let pos = Position::initial("test");
    assert_eq!((pos.offset, pos.line, pos.column), (0, 1, 1));

    let pos = pos.advance('a');
    assert_eq!((pos.offset, pos.line, pos.column), (1, 1, 2));

    let pos = pos.advance('\n');
    assert_eq!((pos.offset, pos.line, pos.column), (2, 2, 1));

    let pos = pos.advance('é');
    assert_eq!((pos.offset, pos.line, pos.column), (3, 2, 2));

    assert_eq!(format!("{}", pos), "test:2:2");
}

#[test]
fn test_ordering_by_offset() {
    let a = Position::initial("a").advance('x');
    let b = Position::initial("b").advance('\n');
    assert_eq!(a, b);
    assert!(a < b.advance('y'));
}
