//! Parsing of key annotations like `user_id,omitempty` or `created,format:'2006-01-02'`.

use core::fmt;

use indexmap::IndexMap;

/// A parsed key annotation: a name followed by options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// The first comma-separated item.
    pub name: String,

    /// The remaining items, as `key` or `key:value`.
    pub options: IndexMap<String, Option<String>>,
}

impl Tag {
    /// Returns true if the option `key` is present, with or without a value.
    pub fn has_option(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// Returns the value of option `key`, if it has one.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key)?.as_deref()
    }
}

/// Failure to parse an annotation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// A single quote was opened and never closed.
    #[error("unterminated quote in tag `{0}`")]
    UnterminatedQuote(String),

    /// An option such as `:value` had no key.
    #[error("empty option key in tag `{0}`")]
    EmptyOptionKey(String),
}

/// Turns a raw key annotation into a [`Tag`].
pub trait TagParser: fmt::Debug + Send + Sync {
    /// Parses `raw`.
    fn parse(&self, raw: &str) -> Result<Tag, TagError>;
}

/// Comma-separated `name,option,key:value` parser.
///
/// Single quotes protect commas inside a value and a backslash escapes the next
/// character.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTagParser;

impl TagParser for DefaultTagParser {
    fn parse(&self, raw: &str) -> Result<Tag, TagError> {
        parse(raw)
    }
}

/// Parses `raw` with the default grammar.
pub fn parse(raw: &str) -> Result<Tag, TagError> {
    let mut items = split(raw)?.into_iter();
    let name = items.next().unwrap_or_default().trim().to_owned();

    let mut options = IndexMap::new();
    for item in items {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (key, value) = match item.split_once(':') {
            Some((key, value)) => (key.trim(), Some(value.trim().to_owned())),
            None => (item, None),
        };
        if key.is_empty() {
            return Err(TagError::EmptyOptionKey(raw.to_owned()));
        }
        options.insert(key.to_owned(), value);
    }

    Ok(Tag { name, options })
}

fn split(raw: &str) -> Result<Vec<String>, TagError> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '\'' => quoted = !quoted,
            ',' if !quoted => items.push(core::mem::take(&mut current)),
            c => current.push(c),
        }
    }

    if quoted {
        return Err(TagError::UnterminatedQuote(raw.to_owned()));
    }
    items.push(current);
    Ok(items)
}
