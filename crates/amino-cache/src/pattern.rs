//! Glob patterns over cache keys.
//!
//! The syntax is the common subset of `globset` and SQLite `GLOB`: `*` matches
//! any run of characters (including `:` and `/`), `?` matches one character,
//! and `[...]` is a character class. Backslash is always a literal.

use std::fmt;

use globset::{GlobBuilder, GlobMatcher};

use crate::error::CacheError;

/// A validated key pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    glob: String,
}

impl KeyPattern {
    /// Validate a raw glob.
    pub fn parse(glob: &str) -> Result<Self, CacheError> {
        build(glob)?;
        Ok(Self {
            glob: glob.to_string(),
        })
    }

    /// Every key containing `fragment` verbatim: `*{fragment}*` with glob
    /// metacharacters in the fragment escaped.
    #[must_use]
    pub fn containing(fragment: &str) -> Self {
        let mut glob = String::with_capacity(fragment.len() + 2);
        glob.push('*');
        for ch in fragment.chars() {
            if matches!(ch, '*' | '?' | '[' | '{' | '}') {
                glob.push('[');
                glob.push(ch);
                glob.push(']');
            } else {
                glob.push(ch);
            }
        }
        glob.push('*');
        Self { glob }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.glob
    }

    pub fn matcher(&self) -> Result<GlobMatcher, CacheError> {
        Ok(build(&self.glob)?.compile_matcher())
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.glob)
    }
}

fn build(glob: &str) -> Result<globset::Glob, CacheError> {
    Ok(GlobBuilder::new(glob)
        .literal_separator(false)
        .backslash_escape(false)
        .build()?)
}
