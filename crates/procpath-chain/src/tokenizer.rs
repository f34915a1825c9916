//! Path tokenizer
//!
//! Splits a textual process chain such as `explorer.exe → cmd.exe → powershell.exe`
//! into ordered process identities.

use crate::error::{ChainError, InvalidPathReason};

/// Delimiter the scoring pipeline uses between hops
pub const PATH_DELIMITER: &str = " → ";

/// Parses delimited chains into process identities
///
/// Splits on the exact delimiter, then trims each segment. `"A→B"` has no
/// delimiter in it and stays a single identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTokenizer {
    delimiter: String,
}

impl PathTokenizer {
    /// Create a tokenizer for the given delimiter
    #[must_use]
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    /// The configured delimiter, as written between hops
    #[inline]
    #[must_use]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Validate `path` and return a restartable view over its tokens
    ///
    /// # Errors
    /// [`ChainError::InvalidPath`] when the path is blank or any hop is empty.
    pub fn tokenize<'a>(&'a self, path: &'a str) -> Result<TokenizedPath<'a>, ChainError> {
        if path.trim().is_empty() {
            return Err(ChainError::invalid_path(path, InvalidPathReason::Empty));
        }

        let mut len = 0;
        for (position, segment) in path.split(self.delimiter.as_str()).enumerate() {
            if segment.trim().is_empty() {
                return Err(ChainError::invalid_path(
                    path,
                    InvalidPathReason::EmptySegment { position },
                ));
            }
            len += 1;
        }

        Ok(TokenizedPath {
            source: path,
            delimiter: &self.delimiter,
            len,
        })
    }
}

impl Default for PathTokenizer {
    fn default() -> Self {
        Self::new(PATH_DELIMITER)
    }
}

/// A validated path whose tokens can be iterated any number of times
#[derive(Debug, Clone, Copy)]
pub struct TokenizedPath<'a> {
    source: &'a str,
    delimiter: &'a str,
    len: usize,
}

impl<'a> TokenizedPath<'a> {
    /// Lazily iterate the trimmed tokens in chain order
    #[inline]
    #[must_use]
    pub fn tokens(&self) -> Tokens<'a> {
        Tokens {
            inner: self.source.split(self.delimiter),
        }
    }

    /// Number of hops in the chain
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a validated path has at least one token
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The original path string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.source
    }
}

impl<'a> IntoIterator for &TokenizedPath<'a> {
    type Item = &'a str;
    type IntoIter = Tokens<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens()
    }
}

/// Iterator over the tokens of a [`TokenizedPath`]
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    inner: std::str::Split<'a, &'a str>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(str::trim)
    }
}
