//! Input streams: immutable cursors over a token sequence.
//!
//! A stream is a cheap-to-copy value `(buffer reference, index, position)`.
//! Advancing never mutates; it returns a new stream. Two streams are equal
//! iff they reference the same underlying buffer and sit at the same offset.

use crate::position::Position;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// An immutable cursor over a sequence of tokens.
pub trait Stream: Clone + PartialEq {
    /// The token type this stream yields.
    type Token: Clone + fmt::Debug;

    /// The position just before the current token.
    fn position(&self) -> Position;

    /// True iff there are no tokens left.
    fn is_at_end(&self) -> bool;

    /// The current token, or `None` at the end of input.
    fn current(&self) -> Option<Self::Token>;

    /// A new stream advanced by one token. At the end of input this is a
    /// no-op returning an identical stream.
    fn advance(&self) -> Self;

    /// A short rendering of the upcoming input for diagnostics, at most
    /// `max_len` tokens, with an ellipsis marker when truncated. Control
    /// characters are escaped; bytes are hex-encoded.
    fn preview(&self, max_len: usize) -> String;
}

/*========================================*/
/*          Char Stream                   */
/*========================================*/

/// A stream of `char`s over a string.
#[derive(Debug, Clone)]
pub struct CharStream {
    source: Arc<str>,
    byte_index: usize,
    position: Position,
}

impl CharStream {
    pub fn new(source_name: &str, text: &str) -> CharStream {
        CharStream {
            source: Arc::from(text),
            byte_index: 0,
            position: Position::initial(source_name),
        }
    }

    /// The unconsumed tail of the source text.
    pub fn remaining(&self) -> &str {
        &self.source[self.byte_index..]
    }

    /// The full source text, for error rendering.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl PartialEq for CharStream {
    fn eq(&self, other: &CharStream) -> bool {
        Arc::ptr_eq(&self.source, &other.source) && self.byte_index == other.byte_index
    }
}

impl Stream for CharStream {
    type Token = char;

    fn position(&self) -> Position {
        self.position.clone()
    }

    fn is_at_end(&self) -> bool {
        self.byte_index >= self.source.len()
    }

    fn current(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&self) -> CharStream {
        match self.current() {
            None => self.clone(),
            Some(ch) => CharStream {
                source: self.source.clone(),
                byte_index: self.byte_index + ch.len_utf8(),
                position: self.position.advance(ch),
            },
        }
    }

    fn preview(&self, max_len: usize) -> String {
        let mut out = String::new();
        let mut chars = self.remaining().chars();
        for _ in 0..max_len {
            match chars.next() {
                None => return out,
                Some(ch) => out.extend(ch.escape_debug()),
            }
        }
        if chars.next().is_some() {
            out.push('…');
        }
        out
    }
}

/*========================================*/
/*          Byte Stream                   */
/*========================================*/

/// A stream of bytes over a byte buffer. Positions advance one column per
/// byte; lines carry no meaning here.
#[derive(Debug, Clone)]
pub struct ByteStream {
    source: Arc<[u8]>,
    index: usize,
    position: Position,
}

impl ByteStream {
    pub fn new(source_name: &str, bytes: &[u8]) -> ByteStream {
        ByteStream {
            source: Arc::from(bytes),
            index: 0,
            position: Position::initial(source_name),
        }
    }

    /// The unconsumed tail of the buffer.
    pub fn remaining(&self) -> &[u8] {
        &self.source[self.index..]
    }

    /// The next `n` bytes, or `None` if fewer than `n` remain.
    pub fn slice(&self, n: usize) -> Option<&[u8]> {
        self.source.get(self.index..self.index + n)
    }

    /// A new stream advanced by `n` bytes (clamped to the end of input).
    pub fn advance_by(&self, n: usize) -> ByteStream {
        let n = n.min(self.source.len() - self.index);
        ByteStream {
            source: self.source.clone(),
            index: self.index + n,
            position: self.position.advance_bytes(n),
        }
    }
}

impl PartialEq for ByteStream {
    fn eq(&self, other: &ByteStream) -> bool {
        Arc::ptr_eq(&self.source, &other.source) && self.index == other.index
    }
}

impl Stream for ByteStream {
    type Token = u8;

    fn position(&self) -> Position {
        self.position.clone()
    }

    fn is_at_end(&self) -> bool {
        self.index >= self.source.len()
    }

    fn current(&self) -> Option<u8> {
        self.source.get(self.index).copied()
    }

    fn advance(&self) -> ByteStream {
        if self.is_at_end() {
            self.clone()
        } else {
            self.advance_by(1)
        }
    }

    fn preview(&self, max_len: usize) -> String {
        let rest = self.remaining();
        let shown = &rest[..rest.len().min(max_len)];
        let mut out = shown
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ");
        if rest.len() > max_len {
            out.push_str(" …");
        }
        out
    }
}

/*========================================*/
/*          Token Stream                  */
/*========================================*/

/// How a [`TokenStream`] advances its position over one token.
pub type AdvanceFn<Tok> = Rc<dyn Fn(&Position, &Tok) -> Position>;

/// A stream over an arbitrary ordered token sequence, with a user-provided
/// position-advance function.
#[derive(Clone)]
pub struct TokenStream<Tok: Clone + fmt::Debug> {
    items: Arc<[Tok]>,
    index: usize,
    position: Position,
    advance_fn: AdvanceFn<Tok>,
}

impl<Tok: Clone + fmt::Debug> TokenStream<Tok> {
    pub fn new(
        source_name: &str,
        tokens: Vec<Tok>,
        advance_fn: impl Fn(&Position, &Tok) -> Position + 'static,
    ) -> TokenStream<Tok> {
        TokenStream {
            items: Arc::from(tokens),
            index: 0,
            position: Position::initial(source_name),
            advance_fn: Rc::new(advance_fn),
        }
    }

    /// A `TokenStream` whose positions simply count tokens: offset and
    /// column move by one per token, the line never changes.
    pub fn counting(source_name: &str, tokens: Vec<Tok>) -> TokenStream<Tok> {
        TokenStream::new(source_name, tokens, |pos, _| pos.advance_bytes(1))
    }
}

impl<Tok: Clone + fmt::Debug> fmt::Debug for TokenStream<Tok> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TokenStream")
            .field("index", &self.index)
            .field("position", &self.position)
            .finish()
    }
}

impl<Tok: Clone + fmt::Debug> PartialEq for TokenStream<Tok> {
    fn eq(&self, other: &TokenStream<Tok>) -> bool {
        Arc::ptr_eq(&self.items, &other.items) && self.index == other.index
    }
}

impl<Tok: Clone + fmt::Debug> Stream for TokenStream<Tok> {
    type Token = Tok;

    fn position(&self) -> Position {
        self.position.clone()
    }

    fn is_at_end(&self) -> bool {
        self.index >= self.items.len()
    }

    fn current(&self) -> Option<Tok> {
        self.items.get(self.index).cloned()
    }

    fn advance(&self) -> TokenStream<Tok> {
        match self.items.get(self.index) {
            None => self.clone(),
            Some(tok) => TokenStream {
                items: self.items.clone(),
                index: self.index + 1,
                position: (self.advance_fn)(&self.position, tok),
                advance_fn: self.advance_fn.clone(),
            },
        }
    }

    fn preview(&self, max_len: usize) -> String {
        let rest = &self.items[self.index..];
        let shown = &rest[..rest.len().min(max_len)];
        let mut out = shown
            .iter()
            .map(|t| format!("{:?}", t))
            .collect::<Vec<_>>()
            .join(" ");
        if rest.len() > max_len {
            out.push_str(" …");
        }
        out
    }
}

#[test]
fn test_char_stream() {
    let stream = CharStream::new("test", "a\nb");
    assert!(!stream.is_at_end());
    assert_eq!(stream.current(), Some('a'));

    let stream = stream.advance().advance();
    assert_eq!(stream.current(), Some('b'));
    assert_eq!(stream.position().line, 2);
    assert_eq!(stream.position().column, 1);

    let end = stream.advance();
    assert!(end.is_at_end());
    assert_eq!(end.advance(), end);
}

#[test]
fn test_stream_equality() {
    let a = CharStream::new("test", "xyz");
    let b = a.clone();
    assert_eq!(a, b);
    assert_ne!(a, b.advance());
    // Same contents, different buffer: not equal.
    assert_ne!(a, CharStream::new("test", "xyz"));
}

#[test]
fn test_byte_stream_bulk() {
    let stream = ByteStream::new("bytes", &[1, 2, 3, 4]);
    assert_eq!(stream.slice(2), Some(&[1u8, 2][..]));
    let stream = stream.advance_by(3);
    assert_eq!(stream.current(), Some(4));
    assert_eq!(stream.position().offset, 3);
    assert_eq!(stream.slice(2), None);
}

#[test]
fn test_previews() {
    let text = CharStream::new("test", "ab\ncdef");
    assert_eq!(text.preview(4), "ab\\nc…");
    let bytes = ByteStream::new("bytes", &[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(bytes.preview(2), "de ad …");
}
