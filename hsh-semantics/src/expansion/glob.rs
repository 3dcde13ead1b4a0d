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

//! Pathname expansion
//!
//! A field containing an unquoted `*`, `?`, or `[` is matched against
//! the directory named by everything up to its last `/` (or the current
//! directory). Hidden entries match only when the pattern itself starts
//! with a dot. Matches come back in lexicographic order; a pattern with
//! no matches yields the original word.

use super::{strip, AttrChar};
use hsh_fnmatch::Pattern;

/// Tests whether the field contains an unquoted glob metacharacter.
fn has_active_metachar(field: &[AttrChar]) -> bool {
    field
        .iter()
        .any(|c| !c.quoted && matches!(c.value, '*' | '?' | '['))
}

/// Builds pattern-matching syntax from a field, escaping quoted
/// characters so they match literally.
pub(super) fn to_pattern_string(field: &[AttrChar]) -> String {
    let mut pattern = String::new();
    for c in field {
        if c.quoted && matches!(c.value, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c.value);
    }
    pattern
}

/// Resolves a field against the filesystem.
pub(super) fn expand(field: &[AttrChar]) -> Vec<String> {
    if !has_active_metachar(field) {
        return vec![strip(field)];
    }

    // Only the final pathname component is matched; the directory part
    // is taken literally.
    let slash = field.iter().rposition(|c| c.value == '/');
    let (prefix, name_part) = match slash {
        Some(i) => (&field[..=i], &field[i + 1..]),
        None => (&field[..0], field),
    };
    let search_dir = match slash {
        None => ".".to_string(),
        Some(0) => "/".to_string(),
        Some(i) => strip(&field[..i]),
    };

    let Ok(pattern) = Pattern::parse(&to_pattern_string(name_part)) else {
        return vec![strip(field)];
    };
    let dot_pattern = name_part.first().map(|c| c.value) == Some('.');

    let Ok(entries) = std::fs::read_dir(&search_dir) else {
        return vec![strip(field)];
    };

    let prefix_text = strip(prefix);
    let mut matches: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| (dot_pattern || !name.starts_with('.')) && pattern.is_match(name))
        .map(|name| format!("{prefix_text}{name}"))
        .collect();

    if matches.is_empty() {
        return vec![strip(field)];
    }
    matches.sort_unstable();
    matches
}
