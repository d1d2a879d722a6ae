//! # Regex parsing
//!
//! This module parses the regex grammar into a [`crate::regex::RegexTree`]:
//!
//! ```text
//! regex   := union
//! union   := cat ('+' cat)*
//! cat     := star (('.' | implicit) star)*
//! star    := atom '*'*
//! atom    := CHAR | LAMBDA | NULL | '(' regex ')'
//! ```
//!
//! `~` denotes the empty language (`Null`), `^` denotes the empty string (`Lambda`).
//! `+`, `.`, `*`, `(`, `)` are operator characters; every other printable character is a
//! literal. Concatenation may be written explicitly with `.` or left implicit by
//! juxtaposition (`ab` means `a.b`). `*` binds tighter than either `.`/implicit
//! concatenation or `+`; `+` binds the loosest.
//!
//! - `(a+b)*abb` accepts strings that are zero or more repetitions of `a` or `b`,
//!   followed by `abb`.
//! - `a*` accepts any number (including zero) of `a`s.
//!
//! Parsing never partially succeeds: on any malformed input, a [`RegexParseError`] is
//! returned describing the problem and, where applicable, the character position.

mod regex;

use crate::regex::RegexTree;
pub use regex::RegexParseError;

/// Parses a regex string into a [`RegexTree`]. The tree returned is not simplified —
/// call [`RegexTree::simplify`] if a normalized form is wanted.
pub fn regex(input: &str) -> Result<RegexTree, RegexParseError> {
    regex::full_regex(input)
}
