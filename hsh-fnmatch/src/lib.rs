// This file is part of hsh, a POSIX-style command shell.
// Copyright (C) 2024 the hsh authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! This crate provides pattern matching based on shell globbing patterns.
//!
//! A [`Pattern`] supports:
//!
//! - Any single character (`?`)
//! - Any character sequence (`*`)
//! - Bracket expressions (`[...]`) with character literals, ranges
//!   (`a-z`), and complement (`[!...]`)
//! - Backslash-escaped literal characters (`\*` matches `*`)
//!
//! Matching works by translating the pattern into an anchored regular
//! expression. An unmatched `[` is an ordinary character rather than an
//! error, so every string is a valid pattern; [`Pattern::parse`] only
//! fails if the translated expression exceeds the regex size limit.
//!
//! A pattern without any metacharacters is recognized as
//! [literal](Pattern::as_literal), letting callers take an exact-match
//! fast path.

use regex::Regex;
use thiserror::Error;

/// Error in pattern compilation
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// The translated regular expression failed to compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// Compiled glob pattern
#[derive(Clone, Debug)]
pub struct Pattern {
    regex: Regex,
    literal: Option<String>,
}

/// Appends a literal character to a regular expression body.
fn push_literal(body: &mut String, c: char) {
    let mut buffer = [0u8; 4];
    body.push_str(&regex_syntax::escape(c.encode_utf8(&mut buffer)));
}

/// Translates a bracket expression starting at the `[`.
///
/// Returns the regex character class and the pattern index just past the
/// closing `]`, or `None` when the bracket is unclosed.
fn translate_bracket(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut i = start + 1;
    let mut class = String::from("[");

    if chars.get(i) == Some(&'!') {
        class.push('^');
        i += 1;
    }
    // A `]` right after the opening (or the `!`) is a literal member.
    let body_start = i;

    let mut body = String::new();
    while let Some(&c) = chars.get(i) {
        if c == ']' && i > body_start {
            let mut result = class;
            result.push_str(&body);
            result.push(']');
            return Some((result, i + 1));
        }
        match c {
            // Range punctuation passes through.
            '-' => body.push('-'),
            // Everything else is a literal class member.
            '\\' | '^' | ']' | '[' | '&' | '~' => {
                body.push('\\');
                body.push(c);
            }
            _ => body.push(c),
        }
        i += 1;
    }
    None
}

impl Pattern {
    /// Compiles a glob pattern.
    pub fn parse(pattern: &str) -> Result<Pattern, Error> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut body = String::new();
        let mut literal = String::new();
        let mut is_literal = true;

        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '*' => {
                    body.push_str(".*");
                    is_literal = false;
                    i += 1;
                }
                '?' => {
                    body.push('.');
                    is_literal = false;
                    i += 1;
                }
                '[' => match translate_bracket(&chars, i) {
                    Some((class, next)) => {
                        body.push_str(&class);
                        is_literal = false;
                        i = next;
                    }
                    None => {
                        // Unmatched bracket: an ordinary character.
                        push_literal(&mut body, '[');
                        literal.push('[');
                        i += 1;
                    }
                },
                '\\' if i + 1 < chars.len() => {
                    push_literal(&mut body, chars[i + 1]);
                    literal.push(chars[i + 1]);
                    i += 2;
                }
                c => {
                    push_literal(&mut body, c);
                    literal.push(c);
                    i += 1;
                }
            }
        }

        let regex = Regex::new(&format!(r"\A(?s:{body})\z"))?;
        Ok(Pattern {
            regex,
            literal: is_literal.then_some(literal),
        })
    }

    /// Tests whether the whole of `text` matches the pattern.
    pub fn is_match(&self, text: &str) -> bool {
        match &self.literal {
            Some(literal) => literal == text,
            None => self.regex.is_match(text),
        }
    }

    /// Returns the string the pattern matches exactly, if the pattern has
    /// no metacharacters.
    pub fn as_literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }
}

/// Tests whether a pattern string contains any unescaped metacharacter.
///
/// Callers use this to decide whether pathname expansion applies at all.
pub fn has_metacharacters(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'*' | b'?' | b'[' => return true,
            _ => i += 1,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn matches(pattern: &str, text: &str) -> bool {
        Pattern::parse(pattern).unwrap().is_match(text)
    }

    #[test]
    fn literal_patterns() {
        assert!(matches("foo", "foo"));
        assert!(!matches("foo", "bar"));
        assert!(!matches("foo", "foobar"));
        assert!(!matches("foo", "Foo"));
        assert!(matches("", ""));
        assert!(!matches("", "x"));
    }

    #[test]
    fn literal_detection() {
        assert_matches!(Pattern::parse("foo").unwrap().as_literal(), Some("foo"));
        assert_matches!(Pattern::parse("a.b+c").unwrap().as_literal(), Some("a.b+c"));
        assert_matches!(Pattern::parse("f*o").unwrap().as_literal(), None);
        assert_matches!(Pattern::parse("f?o").unwrap().as_literal(), None);
        assert_matches!(Pattern::parse("[ab]").unwrap().as_literal(), None);
    }

    #[test]
    fn asterisk_matches_any_run() {
        assert!(matches("*", ""));
        assert!(matches("*", "anything"));
        assert!(matches("*.txt", "notes.txt"));
        assert!(!matches("*.txt", "notes.txt.bak"));
        assert!(matches("a*b", "ab"));
        assert!(matches("a*b", "axyzb"));
        assert!(!matches("a*b", "axyz"));
    }

    #[test]
    fn asterisk_matches_newline() {
        assert!(matches("a*b", "a\nb"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        assert!(matches("?", "x"));
        assert!(!matches("?", ""));
        assert!(!matches("?", "xy"));
        assert!(matches("f?le", "file"));
        assert!(matches("f?le", "fale"));
        assert!(!matches("f?le", "fle"));
    }

    #[test]
    fn bracket_expression() {
        assert!(matches("[abc]", "a"));
        assert!(matches("[abc]", "c"));
        assert!(!matches("[abc]", "d"));
        assert!(!matches("[abc]", "ab"));
        assert!(matches("x[ab]y", "xay"));
    }

    #[test]
    fn bracket_ranges() {
        assert!(matches("[a-z]", "m"));
        assert!(!matches("[a-z]", "M"));
        assert!(matches("[0-9a-f]", "c"));
        assert!(matches("[0-9a-f]", "7"));
        assert!(!matches("[0-9a-f]", "g"));
    }

    #[test]
    fn negated_bracket() {
        assert!(matches("[!abc]", "d"));
        assert!(!matches("[!abc]", "a"));
        assert!(matches("[!0-9]", "x"));
        assert!(!matches("[!0-9]", "5"));
    }

    #[test]
    fn bracket_with_literal_close_bracket_first() {
        assert!(matches("[]a]", "]"));
        assert!(matches("[]a]", "a"));
        assert!(!matches("[]a]", "b"));
    }

    #[test]
    fn unmatched_bracket_is_literal() {
        assert!(matches("a[b", "a[b"));
        assert!(!matches("a[b", "ab"));
        assert_matches!(Pattern::parse("a[b").unwrap().as_literal(), Some("a[b"));
    }

    #[test]
    fn backslash_escapes_metacharacters() {
        assert!(matches(r"\*", "*"));
        assert!(!matches(r"\*", "x"));
        assert!(matches(r"a\?b", "a?b"));
        assert!(!matches(r"a\?b", "axb"));
    }

    #[test]
    fn regex_metacharacters_are_not_special() {
        assert!(matches("a.b", "a.b"));
        assert!(!matches("a.b", "axb"));
        assert!(matches("x+y", "x+y"));
        assert!(matches("(paren)", "(paren)"));
        assert!(matches("^start", "^start"));
        assert!(matches("end$", "end$"));
    }

    #[test]
    fn combined_pattern() {
        assert!(matches("[a-c]?*.tmp", "b_file.tmp"));
        assert!(!matches("[a-c]?*.tmp", "d_file.tmp"));
        assert!(!matches("[a-c]?*.tmp", "b.tmp"));
    }

    #[test]
    fn metacharacter_detection() {
        assert!(has_metacharacters("*.txt"));
        assert!(has_metacharacters("f?le"));
        assert!(has_metacharacters("x[ab]"));
        assert!(!has_metacharacters("plain"));
        assert!(!has_metacharacters(r"\*escaped"));
        assert!(!has_metacharacters(""));
    }
}
