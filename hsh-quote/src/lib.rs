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

//! This crate provides a function that quotes a string according to
//! POSIX shell quoting rules, for re-display of stored values such as
//! alias definitions.
//!
//! The [`quote`] function single-quotes its argument. An embedded single
//! quote ends the quoted segment, inserts an escaped quote (`\'`), and
//! reopens it, which is the portable way to spell a single quote inside
//! a single-quoted string:
//!
//! ```
//! # use std::borrow::Cow::{Borrowed, Owned};
//! # use hsh_quote::quote;
//! assert_eq!(quote("foo"), Borrowed("foo"));
//! assert_eq!(quote("$foo"), Owned::<str>("'$foo'".to_owned()));
//! assert_eq!(quote("it's"), Owned::<str>(r"'it'\''s'".to_owned()));
//! ```

use std::borrow::Cow::{self, Borrowed, Owned};

/// Quotes the argument for safe re-use as a single shell word.
///
/// If the argument needs no quoting, the return value is `Borrowed(s)`.
/// Otherwise, it is `Owned(new_quoted_string)`.
pub fn quote(s: &str) -> Cow<str> {
    if !s.is_empty() && !s.chars().any(char_needs_quoting) {
        return Borrowed(s);
    }

    let mut result = String::with_capacity(s.len().saturating_add(2));
    result.push('\'');
    for c in s.chars() {
        if c == '\'' {
            result.push_str(r"'\''");
        } else {
            result.push(c);
        }
    }
    result.push('\'');
    Owned(result)
}

fn char_needs_quoting(c: char) -> bool {
    match c {
        ';' | '&' | '|' | '(' | ')' | '<' | '>' | '{' | '}' | '[' | ']' => true,
        '$' | '`' | '\\' | '"' | '\'' | '=' | '*' | '?' | '#' | '~' | '!' => true,
        _ => c.is_whitespace(),
    }
}
