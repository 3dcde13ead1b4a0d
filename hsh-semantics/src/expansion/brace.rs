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

//! Brace expansion
//!
//! `{a,b,c}` alternation and `{x..y}` ranges (numeric or single
//! character, ascending or descending) generate one field per item.
//! Nested braces expand recursively; quoted braces and unmatched braces
//! are literal.

use super::AttrChar;

/// Expands the first unquoted brace pair, recursing over the results.
pub(super) fn expand(field: Vec<AttrChar>) -> Vec<Vec<AttrChar>> {
    let Some((open, close)) = first_active_pair(&field) else {
        return vec![field];
    };

    let prefix = &field[..open];
    let content = &field[open + 1..close];
    let suffix = &field[close + 1..];

    let alternatives = match range_items(content) {
        Some(items) => items,
        None => split_alternatives(content),
    };

    let mut result = Vec::new();
    for item in alternatives {
        let mut combined = prefix.to_vec();
        combined.extend(item);
        combined.extend_from_slice(suffix);
        result.extend(expand(combined));
    }
    result
}

/// Finds the first unquoted `{` with a matching unquoted `}`.
fn first_active_pair(field: &[AttrChar]) -> Option<(usize, usize)> {
    let open = field
        .iter()
        .position(|c| c.value == '{' && !c.quoted)?;
    let mut depth = 1;
    for (offset, c) in field[open + 1..].iter().enumerate() {
        if c.quoted {
            continue;
        }
        match c.value {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, open + 1 + offset));
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits brace content at unquoted top-level commas.
fn split_alternatives(content: &[AttrChar]) -> Vec<Vec<AttrChar>> {
    let mut result = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0;
    for &c in content {
        if !c.quoted {
            match c.value {
                '{' => depth += 1,
                '}' => depth -= 1,
                ',' if depth == 0 => {
                    result.push(std::mem::take(&mut current));
                    continue;
                }
                _ => {}
            }
        }
        current.push(c);
    }
    result.push(current);
    result
}

/// Recognizes `A..B` range content and generates its items.
fn range_items(content: &[AttrChar]) -> Option<Vec<Vec<AttrChar>>> {
    if content.iter().any(|c| c.quoted) {
        return None;
    }
    let text: String = content.iter().map(|c| c.value).collect();
    let dots = text.find("..")?;
    let (left, right) = (&text[..dots], &text[dots + 2..]);

    if let (Ok(from), Ok(to)) = (left.parse::<i64>(), right.parse::<i64>()) {
        let numbers: Vec<i64> = if from <= to {
            (from..=to).collect()
        } else {
            (to..=from).rev().collect()
        };
        return Some(numbers.iter().map(|n| plain(&n.to_string())).collect());
    }

    let mut left_chars = left.chars();
    let mut right_chars = right.chars();
    if let (Some(from), None, Some(to), None) = (
        left_chars.next(),
        left_chars.next(),
        right_chars.next(),
        right_chars.next(),
    ) {
        let (from, to) = (from as u32, to as u32);
        let codes: Vec<u32> = if from <= to {
            (from..=to).collect()
        } else {
            (to..=from).rev().collect()
        };
        return Some(
            codes
                .iter()
                .filter_map(|&code| char::from_u32(code))
                .map(|c| plain(&c.to_string()))
                .collect(),
        );
    }

    None
}

fn plain(text: &str) -> Vec<AttrChar> {
    text.chars()
        .map(|value| AttrChar {
            value,
            quoted: false,
        })
        .collect()
}
