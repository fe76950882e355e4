//! Unescaping of quoted string literals.
//!
//! Converts the raw text between the quotes of a source literal (e.g. `it\'s`
//! with a backslash) into the runtime string it denotes (`it's`).

use bumpalo::Bump;

/// Errors that can occur when unescaping string literals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnescapeError {
    #[error("invalid hex digit in '{seq}' at position {pos}")]
    InvalidHexDigit { pos: usize, seq: String },

    #[error("incomplete escape at position {pos}: expected {expected} digits, got {got}")]
    IncompleteEscape {
        pos: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid Unicode code point U+{value:X} at position {pos}")]
    InvalidCodePoint { pos: usize, value: u32 },
}

/// Unescape the body of a string literal into the arena.
///
/// Unknown escapes resolve to the escaped character itself, and lone UTF-16
/// surrogates become U+FFFD.
///
/// # Example
/// ```ignore
/// let arena = Bump::new();
/// assert_eq!(unescape_string(&arena, r"it\'s")?, "it's");
/// ```
pub fn unescape_string<'a>(arena: &'a Bump, input: &'a str) -> Result<&'a str, UnescapeError> {
    // Fast path: nothing to unescape, borrow the source directly
    if !input.contains('\\') {
        return Ok(input);
    }

    let mut output = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    let mut pending_high: Option<u16> = None;

    while let Some((pos, ch)) = chars.next() {
        if ch != '\\' {
            flush_surrogate(&mut output, &mut pending_high);
            output.push(ch);
            continue;
        }

        let Some((epos, esc)) = chars.next() else {
            break;
        };

        let unit = match esc {
            'u' => {
                if chars.peek().map(|(_, c)| *c) == Some('{') {
                    chars.next();
                    let mut value = 0u32;
                    let mut digits = 0;
                    loop {
                        match chars.next() {
                            Some((_, '}')) if digits > 0 => break,
                            Some((_, c)) => match c.to_digit(16) {
                                Some(d) if value <= 0x10FFFF => {
                                    value = (value << 4) | d;
                                    digits += 1;
                                }
                                _ => {
                                    return Err(UnescapeError::InvalidHexDigit {
                                        pos: epos,
                                        seq: format!("\\u{{{}", c),
                                    });
                                }
                            },
                            None => {
                                return Err(UnescapeError::IncompleteEscape {
                                    pos,
                                    expected: 1,
                                    got: digits,
                                });
                            }
                        }
                    }
                    let c = char::from_u32(value)
                        .ok_or(UnescapeError::InvalidCodePoint { pos, value })?;
                    flush_surrogate(&mut output, &mut pending_high);
                    output.push(c);
                    continue;
                }
                read_hex(&mut chars, pos, 4)? as u16
            }
            'x' => {
                flush_surrogate(&mut output, &mut pending_high);
                let value = read_hex(&mut chars, pos, 2)?;
                output.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
                continue;
            }
            '\r' => {
                // Line continuation, including CRLF
                if chars.peek().map(|(_, c)| *c) == Some('\n') {
                    chars.next();
                }
                continue;
            }
            '\n' | '\u{2028}' | '\u{2029}' => continue,
            other => {
                flush_surrogate(&mut output, &mut pending_high);
                output.push(match other {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'b' => '\u{0008}',
                    'f' => '\u{000C}',
                    'v' => '\u{000B}',
                    '0' => '\0',
                    c => c,
                });
                continue;
            }
        };

        // A \uXXXX escape: combine surrogate pairs.
        match unit {
            0xD800..=0xDBFF => {
                flush_surrogate(&mut output, &mut pending_high);
                pending_high = Some(unit);
            }
            0xDC00..=0xDFFF => match pending_high.take() {
                Some(high) => {
                    let decoded = char::decode_utf16([high, unit])
                        .next()
                        .and_then(Result::ok)
                        .unwrap_or('\u{FFFD}');
                    output.push(decoded);
                }
                None => output.push('\u{FFFD}'),
            },
            _ => {
                flush_surrogate(&mut output, &mut pending_high);
                output.push(char::from_u32(u32::from(unit)).unwrap_or('\u{FFFD}'));
            }
        }
    }
    flush_surrogate(&mut output, &mut pending_high);

    Ok(arena.alloc_str(&output))
}

fn flush_surrogate(output: &mut String, pending_high: &mut Option<u16>) {
    if pending_high.take().is_some() {
        output.push('\u{FFFD}');
    }
}

fn read_hex(
    chars: &mut core::iter::Peekable<core::str::CharIndices<'_>>,
    pos: usize,
    count: usize,
) -> Result<u32, UnescapeError> {
    let mut value = 0u32;
    for got in 0..count {
        match chars.next() {
            Some((_, c)) => match c.to_digit(16) {
                Some(d) => value = (value << 4) | d,
                None => {
                    return Err(UnescapeError::InvalidHexDigit {
                        pos,
                        seq: format!("\\{}", c),
                    });
                }
            },
            None => {
                return Err(UnescapeError::IncompleteEscape {
                    pos,
                    expected: count,
                    got,
                });
            }
        }
    }
    Ok(value)
}
