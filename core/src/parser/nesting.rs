//! Nesting pre-pass run before pest sees the source.
//!
//! pest, the Pratt parser and the tree builder recurse once per open bracket,
//! once per prefix operator and once per right-nested `?:`, `=>`, assignment
//! or `**`. The scan bounds all of these by `max_depth` so that oversized
//! input fails with a `ParseError` instead of exhausting the stack.

use crate::parser::{
    Span,
    error::{ParseError, ParseErrorKind},
};

/// Keywords that nest like prefix operators.
const PREFIX_KEYWORDS: [&str; 4] = ["typeof", "void", "delete", "new"];

#[derive(Debug, Clone, Copy)]
struct Frame {
    /// The bracket itself plus the prefix operators applied to it.
    base: usize,
    /// Right-nested operators seen since the last `,` or `;`.
    chain: usize,
}

struct Scanner<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    max_depth: usize,
    frames: Vec<Frame>,
    depth: usize,
    /// Prefix operators still waiting for their operand.
    prefix_run: usize,
}

/// Reject nesting beyond `max_depth` before pest recurses into it.
///
/// Brackets, prefix runs and right-nested operators inside string literals
/// and comments do not count.
pub(super) fn check_nesting(source: &str, max_depth: usize) -> Result<(), ParseError> {
    Scanner {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        max_depth,
        frames: vec![Frame { base: 0, chain: 0 }],
        depth: 0,
        prefix_run: 0,
    }
    .run()
}

impl<'s> Scanner<'s> {
    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn run(mut self) -> Result<(), ParseError> {
        while let Some(byte) = self.peek(0) {
            let start = self.pos;
            match byte {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment(),
                b'"' | b'\'' | b'`' => {
                    self.skip_string(byte);
                    self.prefix_run = 0;
                }
                b'(' | b'[' | b'{' => {
                    self.pos += 1;
                    let base = 1 + std::mem::take(&mut self.prefix_run);
                    self.frames.push(Frame { base, chain: 0 });
                    self.depth += base;
                    self.check(start)?;
                }
                b')' | b']' | b'}' => {
                    self.pos += 1;
                    self.prefix_run = 0;
                    if self.frames.len() > 1 {
                        if let Some(frame) = self.frames.pop() {
                            self.depth -= frame.base + frame.chain;
                        }
                    }
                }
                b',' | b';' => {
                    self.pos += 1;
                    self.prefix_run = 0;
                    if let Some(frame) = self.frames.last_mut() {
                        self.depth -= frame.chain;
                        frame.chain = 0;
                    }
                }
                b'!' if self.peek(1) == Some(b'=') => self.equality(),
                b'!' | b'~' | b'+' | b'-' => {
                    self.pos += 1;
                    self.prefix(start)?;
                }
                b'=' => match self.peek(1) {
                    Some(b'=') => self.equality(),
                    Some(b'>') => {
                        self.pos += 2;
                        self.chain(start)?;
                    }
                    _ => {
                        self.pos += 1;
                        self.chain(start)?;
                    }
                },
                b'*' if self.peek(1) == Some(b'*') => {
                    self.pos += 2;
                    self.chain(start)?;
                }
                b'?' => match self.peek(1) {
                    Some(b'?') | Some(b'.') => self.binary(2),
                    _ => {
                        self.pos += 1;
                        self.chain(start)?;
                    }
                },
                b'<' | b'>' => self.angle(start)?,
                b if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' => self.word(start)?,
                _ => self.binary(1),
            }
        }
        Ok(())
    }

    fn check(&self, start: usize) -> Result<(), ParseError> {
        let depth = self.depth + self.prefix_run;
        if depth > self.max_depth {
            return Err(ParseError::new(
                ParseErrorKind::MaxDepthExceeded {
                    depth,
                    max_depth: self.max_depth,
                },
                self.source,
                Span::new(start, self.pos),
            ));
        }
        Ok(())
    }

    fn prefix(&mut self, start: usize) -> Result<(), ParseError> {
        self.prefix_run += 1;
        self.check(start)
    }

    fn chain(&mut self, start: usize) -> Result<(), ParseError> {
        self.prefix_run = 0;
        if let Some(frame) = self.frames.last_mut() {
            frame.chain += 1;
            self.depth += 1;
        }
        self.check(start)
    }

    /// An operator or punctuation that closes any pending prefix run.
    fn binary(&mut self, len: usize) {
        self.pos += len;
        self.prefix_run = 0;
    }

    /// `==`, `===`, `!=` or `!==`.
    fn equality(&mut self) {
        let len = if self.peek(2) == Some(b'=') { 3 } else { 2 };
        self.binary(len);
    }

    /// `<`, `<=`, `<<`, `>>>` and friends. A shift followed by `=` assigns.
    fn angle(&mut self, start: usize) -> Result<(), ParseError> {
        while matches!(self.peek(0), Some(b'<') | Some(b'>')) {
            self.pos += 1;
        }
        if self.peek(0) != Some(b'=') {
            self.prefix_run = 0;
            return Ok(());
        }
        self.pos += 1;
        if self.pos - start == 2 {
            self.prefix_run = 0;
            Ok(())
        } else {
            self.chain(start)
        }
    }

    fn word(&mut self, start: usize) -> Result<(), ParseError> {
        while self
            .peek(0)
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
        {
            self.pos += 1;
        }
        if PREFIX_KEYWORDS.contains(&&self.source[start..self.pos]) {
            self.prefix(start)
        } else {
            self.prefix_run = 0;
            Ok(())
        }
    }

    fn skip_string(&mut self, quote: u8) {
        self.pos += 1;
        while let Some(byte) = self.peek(0) {
            self.pos += 1;
            match byte {
                b'\\' => self.pos = (self.pos + 1).min(self.bytes.len()),
                b'\n' => return,
                b if b == quote => return,
                _ => {}
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while self.peek(0).is_some_and(|b| b != b'\n') {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos = match self.source[self.pos + 2..].find("*/") {
            Some(end) => self.pos + 2 + end + 2,
            None => self.bytes.len(),
        };
    }
}
