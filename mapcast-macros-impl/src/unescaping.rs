//! Turns string literal tokens back into the strings they denote.

use proc_macro2::Literal;

/// Errors that can occur while reading a string literal
#[derive(Debug, PartialEq, Eq)]
pub enum UnescapeError {
    /// The literal is not a string literal at all (a number, a byte string, ...)
    NotAString {
        /// The literal as written
        literal: String,
    },
    /// An illegal character was found following a backslash (e.g., `\a`)
    IllegalCharacterFollowingBackslash {
        /// Index of the backslash in the literal's contents
        character_index: usize,
        /// The illegal character found
        found: char,
    },
    /// Invalid hex digit in `\xNN`, or a value above `\x7f`
    InvalidHexEscape {
        /// Index of the escape start in the literal's contents
        character_index: usize,
    },
    /// Invalid unicode escape `\u{...}`
    InvalidUnicodeEscape {
        /// Index of the escape start in the literal's contents
        character_index: usize,
    },
}

impl std::fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnescapeError::NotAString { literal } => {
                write!(f, "expected a string literal, found `{literal}`")
            }
            UnescapeError::IllegalCharacterFollowingBackslash {
                character_index,
                found,
            } => write!(
                f,
                "illegal character following a backslash at index {character_index}: found '{found}'"
            ),
            UnescapeError::InvalidHexEscape { character_index } => {
                write!(f, "invalid \\x escape at index {character_index}")
            }
            UnescapeError::InvalidUnicodeEscape { character_index } => {
                write!(f, "invalid \\u{{...}} escape at index {character_index}")
            }
        }
    }
}

/// Returns the value of a string literal token, regular or raw.
pub fn string_value(literal: &Literal) -> Result<String, UnescapeError> {
    let repr = literal.to_string();

    if let Some(raw) = repr.strip_prefix('r') {
        let hashes = raw.len() - raw.trim_start_matches('#').len();
        let body = &raw[hashes..];
        if let Some(body) = body
            .strip_prefix('"')
            .and_then(|b| b.strip_suffix(&"#".repeat(hashes)))
            .and_then(|b| b.strip_suffix('"'))
        {
            return Ok(body.to_owned());
        }
    } else if let Some(body) = repr
        .strip_prefix('"')
        .and_then(|b| b.strip_suffix('"'))
    {
        return unescape(body);
    }

    Err(UnescapeError::NotAString { literal: repr })
}

/// Processes the escapes of a (non-raw) string literal's contents.
fn unescape(s: &str) -> Result<String, UnescapeError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some((_, '\\')) => out.push('\\'),
            Some((_, '"')) => out.push('"'),
            Some((_, '\'')) => out.push('\''),
            Some((_, 'n')) => out.push('\n'),
            Some((_, 'r')) => out.push('\r'),
            Some((_, 't')) => out.push('\t'),
            Some((_, '0')) => out.push('\0'),
            Some((_, 'x')) => {
                let hex: String = chars.by_ref().take(2).map(|(_, c)| c).collect();
                let byte = u8::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|b| *b <= 0x7f)
                    .ok_or(UnescapeError::InvalidHexEscape { character_index: i })?;
                out.push(char::from(byte));
            }
            Some((_, 'u')) => {
                let invalid = UnescapeError::InvalidUnicodeEscape { character_index: i };
                if chars.next().map(|(_, c)| c) != Some('{') {
                    return Err(invalid);
                }
                let mut hex = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, '_')) => {}
                        Some((_, c)) => hex.push(c),
                        None => return Err(invalid),
                    }
                }
                let c = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(invalid)?;
                out.push(c);
            }
            Some((_, '\n')) => {
                // line continuation: skip the newline and leading whitespace
                while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
            }
            Some((_, found)) => {
                return Err(UnescapeError::IllegalCharacterFollowingBackslash {
                    character_index: i,
                    found,
                });
            }
            None => {
                return Err(UnescapeError::IllegalCharacterFollowingBackslash {
                    character_index: i,
                    found: '"',
                });
            }
        }
    }
    Ok(out)
}
