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

//! Word expansion
//!
//! Expansion phases run in a fixed order per word: tilde, then parameter
//! and variable substitution, command substitution, and arithmetic in a
//! single left-to-right pass over the raw word text, then brace
//! expansion and pathname expansion over the result.
//!
//! The pass produces [`AttrChar`]s: each output character carries a flag
//! recording whether it came from a quoted context. Brace expansion and
//! globbing consult the flag so that quoted metacharacters stay inert,
//! and quote removal falls out of the representation for free.
//!
//! Words whose first character was quoted skip the tilde and arithmetic
//! phases entirely; single-quoted segments pass through every phase
//! untouched.

mod brace;
mod command_subst;
mod glob;
mod tilde;

pub(crate) use command_subst::capture;

use hsh_env::Env;
use hsh_syntax::syntax::Word;
use std::fmt;
use thiserror::Error;

/// Character tagged with its quoting context
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AttrChar {
    /// The character itself
    pub value: char,
    /// Whether the character came from inside quotes or an escape
    pub quoted: bool,
}

/// Description of an expansion error
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// Arithmetic evaluation failed.
    #[error("arithmetic error at offset {}: {}", .0.location.start, .0)]
    Arith(hsh_arith::Error),
}

/// Result of an expansion operation
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for AttrChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Drops the quoting attributes, keeping the characters.
pub fn strip(field: &[AttrChar]) -> String {
    field.iter().map(|c| c.value).collect()
}

fn push_str(out: &mut Vec<AttrChar>, text: &str, quoted: bool) {
    out.extend(text.chars().map(|value| AttrChar { value, quoted }));
}

/// Fully expands one word into zero or more fields.
///
/// All six phases apply; brace and pathname expansion may multiply the
/// word into several fields or none of the original text at all.
pub fn expand_word(env: &mut Env, word: &Word) -> Result<Vec<String>> {
    let field = expand_attrs(env, word, true)?;
    let mut result = Vec::new();
    for field in brace::expand(field) {
        result.extend(glob::expand(&field));
    }
    Ok(result)
}

/// Expands one word into exactly one string.
///
/// Used where the grammar requires a single value: assignment values,
/// redirection targets, and `case` subjects. Brace and pathname
/// expansion do not apply.
pub fn expand_single(env: &mut Env, word: &Word) -> Result<String> {
    let field = expand_attrs(env, word, true)?;
    Ok(strip(&field))
}

/// Expands a `case` pattern into matching syntax.
///
/// Quoted characters are backslash-escaped so the pattern matcher takes
/// them literally.
pub fn expand_pattern(env: &mut Env, word: &Word) -> Result<String> {
    let field = expand_attrs(env, word, false)?;
    Ok(glob::to_pattern_string(&field))
}

/// Runs the tilde phase and the combined parameter, command
/// substitution, and arithmetic pass.
fn expand_attrs(env: &mut Env, word: &Word, allow_tilde: bool) -> Result<Vec<AttrChar>> {
    let mut out = Vec::new();
    let text = word.text.as_str();

    let rest = if allow_tilde && !word.leading_quoted && text.starts_with('~') {
        match tilde::expand(env, text) {
            Some((base, rest)) => {
                // The substituted prefix takes no further part in
                // expansion.
                push_str(&mut out, &base, true);
                rest
            }
            None => text,
        }
    } else {
        text
    };

    walk(env, rest, &mut out, !word.leading_quoted)?;
    Ok(out)
}

/// One left-to-right pass applying quoting rules and the `$`-driven
/// expansions.
fn walk(env: &mut Env, text: &str, out: &mut Vec<AttrChar>, allow_arith: bool) -> Result<()> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                if i + 1 < chars.len() {
                    out.push(AttrChar {
                        value: chars[i + 1],
                        quoted: true,
                    });
                    i += 2;
                } else {
                    out.push(AttrChar {
                        value: '\\',
                        quoted: false,
                    });
                    i += 1;
                }
            }
            '\'' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j] != '\'' {
                    out.push(AttrChar {
                        value: chars[j],
                        quoted: true,
                    });
                    j += 1;
                }
                // The lexer guarantees the closing quote.
                i = j + 1;
            }
            '"' => i = walk_double(env, &chars, i, out, allow_arith)?,
            '`' => i = backquote(env, &chars, i, out, false),
            '$' => i = dollar(env, &chars, i, out, allow_arith, false)?,
            value => {
                out.push(AttrChar {
                    value,
                    quoted: false,
                });
                i += 1;
            }
        }
    }
    Ok(())
}

/// Processes a double-quoted segment starting at the opening quote.
///
/// Parameter, command, and arithmetic expansion still run inside double
/// quotes; their results are marked quoted. Backslash escapes are
/// limited to `$`, `` ` ``, `"`, `\`, and line continuations.
fn walk_double(
    env: &mut Env,
    chars: &[char],
    start: usize,
    out: &mut Vec<AttrChar>,
    allow_arith: bool,
) -> Result<usize> {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '"' => return Ok(i + 1),
            '\\' => match chars.get(i + 1) {
                Some('\n') => i += 2,
                Some('\r') if chars.get(i + 2) == Some(&'\n') => i += 3,
                Some(&c) if matches!(c, '$' | '`' | '"' | '\\') => {
                    out.push(AttrChar {
                        value: c,
                        quoted: true,
                    });
                    i += 2;
                }
                _ => {
                    out.push(AttrChar {
                        value: '\\',
                        quoted: true,
                    });
                    i += 1;
                }
            },
            '`' => i = backquote(env, chars, i, out, true),
            '$' => i = dollar(env, chars, i, out, allow_arith, true)?,
            value => {
                out.push(AttrChar {
                    value,
                    quoted: true,
                });
                i += 1;
            }
        }
    }
    // The lexer guarantees the closing quote.
    Ok(i)
}

/// Substitutes a backquoted command substitution starting at `i`.
fn backquote(
    env: &mut Env,
    chars: &[char],
    start: usize,
    out: &mut Vec<AttrChar>,
    quoted: bool,
) -> usize {
    let mut command = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '`' => {
                let output = capture(env, &command);
                push_str(out, &output, quoted);
                return i + 1;
            }
            '\\' if matches!(chars.get(i + 1), Some('`' | '\\')) => {
                command.push(chars[i + 1]);
                i += 2;
            }
            c => {
                command.push(c);
                i += 1;
            }
        }
    }
    // Unterminated backquote: keep the text as it was.
    out.push(AttrChar {
        value: '`',
        quoted,
    });
    start + 1
}

/// Substitutes a `$`-introduced expansion starting at `i`.
fn dollar(
    env: &mut Env,
    chars: &[char],
    start: usize,
    out: &mut Vec<AttrChar>,
    allow_arith: bool,
    quoted: bool,
) -> Result<usize> {
    let next = chars.get(start + 1).copied();
    match next {
        Some('(') if chars.get(start + 2) == Some(&'(') => {
            let Some(end) = find_arith_end(chars, start) else {
                out.push(AttrChar {
                    value: '$',
                    quoted,
                });
                return Ok(start + 1);
            };
            let expr: String = chars[start + 3..end - 2].iter().collect();
            if !allow_arith {
                // Arithmetic is disabled for leading-quoted words; the
                // text stays verbatim.
                for &value in &chars[start..end] {
                    out.push(AttrChar { value, quoted });
                }
                return Ok(end);
            }
            let expr = expand_params_in_text(env, &expr);
            let value = hsh_arith::eval(&expr, &ArithEnv(env)).map_err(Error::Arith)?;
            push_str(out, &value.to_string(), quoted);
            Ok(end)
        }
        Some('(') => {
            let Some(end) = find_matching_paren(chars, start + 1) else {
                out.push(AttrChar {
                    value: '$',
                    quoted,
                });
                return Ok(start + 1);
            };
            let command: String = chars[start + 2..end - 1].iter().collect();
            let output = capture(env, &command);
            push_str(out, &output, quoted);
            Ok(end)
        }
        Some('{') => {
            let Some(end) = find_matching_brace(chars, start + 1) else {
                // Unterminated: literal text.
                for &value in &chars[start..] {
                    out.push(AttrChar { value, quoted });
                }
                return Ok(chars.len());
            };
            let content: String = chars[start + 2..end - 1].iter().collect();
            braced_param(env, &content, out, allow_arith, quoted)?;
            Ok(end)
        }
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            let mut end = start + 2;
            while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                end += 1;
            }
            let name: String = chars[start + 1..end].iter().collect();
            let value = lookup(env, &name).unwrap_or_default();
            push_str(out, &value, quoted);
            Ok(end)
        }
        Some(c) if c.is_ascii_digit() => {
            let mut end = start + 2;
            while end < chars.len() && chars[end].is_ascii_digit() {
                end += 1;
            }
            let name: String = chars[start + 1..end].iter().collect();
            let value = lookup(env, &name).unwrap_or_default();
            push_str(out, &value, quoted);
            Ok(end)
        }
        Some(c @ ('?' | '$' | '!' | '#' | '*' | '@')) => {
            let value = lookup(env, &c.to_string()).unwrap_or_default();
            push_str(out, &value, quoted);
            Ok(start + 2)
        }
        _ => {
            out.push(AttrChar {
                value: '$',
                quoted,
            });
            Ok(start + 1)
        }
    }
}

/// Substitutes a `${…}` expansion given its brace content.
fn braced_param(
    env: &mut Env,
    content: &str,
    out: &mut Vec<AttrChar>,
    allow_arith: bool,
    quoted: bool,
) -> Result<()> {
    let (name, default) = match content.find(":-") {
        Some(pos) => (&content[..pos], Some(&content[pos + 2..])),
        None => (content, None),
    };

    if !is_valid_param_name(name) {
        // Not a parameter after all; the text stays literal.
        push_str(out, &format!("${{{content}}}"), quoted);
        return Ok(());
    }

    match lookup(env, name) {
        // A set-but-empty parameter yields the empty string, not the
        // default.
        Some(value) => push_str(out, &value, quoted),
        None => {
            if let Some(default) = default {
                let mut tmp = Vec::new();
                walk(env, default, &mut tmp, allow_arith)?;
                if quoted {
                    for c in &mut tmp {
                        c.quoted = true;
                    }
                }
                out.append(&mut tmp);
            }
        }
    }
    Ok(())
}

/// Resolves a parameter: special and positional parameters first, then
/// variables.
fn lookup(env: &Env, name: &str) -> Option<String> {
    env.special_parameter(name)
        .or_else(|| env.variables.get(name))
}

fn is_valid_param_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    if name.len() == 1 && matches!(name.as_bytes()[0], b'?' | b'$' | b'!' | b'#' | b'*' | b'@') {
        return true;
    }
    if name.bytes().all(|c| c.is_ascii_digit()) {
        return true;
    }
    hsh_env::variable::is_valid_name(name)
}

/// Replaces `$NAME`, `${NAME}`, and special parameters inside an
/// arithmetic expression before evaluation.
///
/// Bare identifiers are resolved later by the evaluator itself.
fn expand_params_in_text(env: &Env, text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '$' || i + 1 >= chars.len() {
            result.push(chars[i]);
            i += 1;
            continue;
        }
        let c = chars[i + 1];
        if c == '{' {
            if let Some(end) = find_matching_brace(&chars, i + 1) {
                let name: String = chars[i + 2..end - 1].iter().collect();
                if is_valid_param_name(&name) {
                    result.push_str(&lookup(env, &name).unwrap_or_default());
                    i = end;
                    continue;
                }
            }
            result.push('$');
            i += 1;
        } else if c.is_ascii_alphabetic() || c == '_' || c.is_ascii_digit() {
            let mut end = i + 2;
            while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                end += 1;
            }
            let name: String = chars[i + 1..end].iter().collect();
            result.push_str(&lookup(env, &name).unwrap_or_default());
            i = end;
        } else if matches!(c, '?' | '$' | '!' | '#') {
            result.push_str(&lookup(env, &c.to_string()).unwrap_or_default());
            i += 2;
        } else {
            result.push('$');
            i += 1;
        }
    }
    result
}

/// Adapter resolving arithmetic identifiers through the shell
/// environment.
struct ArithEnv<'a>(&'a Env);

impl hsh_arith::Env for ArithEnv<'_> {
    fn get_variable(&self, name: &str) -> Option<String> {
        self.0.variables.get(name)
    }
}

fn find_matching_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0;
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return Some(i + 1);
                }
                depth -= 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn find_matching_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 1;
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Position just past the `))` closing a `$((` at `dollar`.
fn find_arith_end(chars: &[char], dollar: usize) -> Option<usize> {
    let mut depth = 0;
    let mut i = dollar + 3;
    while i < chars.len() {
        match chars[i] {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return if chars.get(i + 1) == Some(&')') {
                        Some(i + 2)
                    } else {
                        None
                    };
                }
                depth -= 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsh_syntax::token::TokenKind;

    fn word(text: &str) -> Word {
        Word::literal(text)
    }

    fn quoted_word(text: &str) -> Word {
        Word {
            text: text.to_string(),
            token_kind: TokenKind::SingleQuoted,
            leading_quoted: true,
        }
    }

    fn expand(env: &mut Env, text: &str) -> Vec<String> {
        expand_word(env, &word(text)).unwrap()
    }

    #[test]
    fn plain_word_is_unchanged() {
        let mut env = Env::new();
        assert_eq!(expand(&mut env, "hello"), ["hello"]);
    }

    #[test]
    fn variable_expansion() {
        let mut env = Env::new();
        env.variables.set("GREETING", "hi");
        assert_eq!(expand(&mut env, "$GREETING"), ["hi"]);
        assert_eq!(expand(&mut env, "${GREETING}"), ["hi"]);
        assert_eq!(expand(&mut env, "say:$GREETING!"), ["say:hi!"]);
    }

    #[test]
    fn unset_variable_is_empty() {
        let mut env = Env::new();
        assert_eq!(expand(&mut env, "x${hsh_unset_var}y"), ["xy"]);
        assert_eq!(expand(&mut env, "$hsh_unset_var"), [""]);
    }

    #[test]
    fn default_applies_only_when_unset() {
        let mut env = Env::new();
        assert_eq!(expand(&mut env, "${hsh_unset_var:-fallback}"), ["fallback"]);
        env.variables.set("hsh_set_empty", "");
        // Set but empty: the default is NOT used.
        assert_eq!(expand(&mut env, "${hsh_set_empty:-fallback}"), [""]);
        env.variables.set("hsh_set_full", "value");
        assert_eq!(expand(&mut env, "${hsh_set_full:-fallback}"), ["value"]);
        env.variables.unset("hsh_set_empty");
        env.variables.unset("hsh_set_full");
    }

    #[test]
    fn default_is_itself_expanded() {
        let mut env = Env::new();
        env.variables.set("INNER", "deep");
        assert_eq!(expand(&mut env, "${hsh_unset_var:-$INNER}"), ["deep"]);
    }

    #[test]
    fn special_parameters() {
        let mut env = Env::new();
        env.exit_status = hsh_env::semantics::ExitStatus(3);
        env.positional_params = vec!["a".to_string(), "b".to_string()];
        assert_eq!(expand(&mut env, "$?"), ["3"]);
        assert_eq!(expand(&mut env, "$#"), ["2"]);
        assert_eq!(expand(&mut env, "$1"), ["a"]);
        assert_eq!(expand(&mut env, "$*"), ["a b"]);
        assert_eq!(expand(&mut env, "$@"), ["a b"]);
    }

    #[test]
    fn single_quotes_suppress_expansion() {
        let mut env = Env::new();
        env.variables.set("V", "value");
        let words = expand_word(&mut env, &quoted_word("'$V'")).unwrap();
        assert_eq!(words, ["$V"]);
        env.variables.unset("V");
    }

    #[test]
    fn double_quotes_allow_parameter_expansion() {
        let mut env = Env::new();
        env.variables.set("V", "a value");
        let w = Word {
            text: "\"$V\"".to_string(),
            token_kind: TokenKind::DoubleQuoted,
            leading_quoted: true,
        };
        assert_eq!(expand_word(&mut env, &w).unwrap(), ["a value"]);
        env.variables.unset("V");
    }

    #[test]
    fn double_quote_escapes() {
        let mut env = Env::new();
        let w = Word {
            text: r#""a\$b\\c\d""#.to_string(),
            token_kind: TokenKind::DoubleQuoted,
            leading_quoted: true,
        };
        assert_eq!(expand_word(&mut env, &w).unwrap(), [r"a$b\c\d"]);
    }

    #[test]
    fn backslash_escapes_dollar() {
        let mut env = Env::new();
        env.variables.set("V", "value");
        assert_eq!(expand(&mut env, r"\$V"), ["$V"]);
        env.variables.unset("V");
    }

    #[test]
    fn arithmetic_expansion() {
        let mut env = Env::new();
        assert_eq!(expand(&mut env, "$((2 + 3 * 4))"), ["14"]);
        assert_eq!(expand(&mut env, "x$((1+1))y"), ["x2y"]);
    }

    #[test]
    fn arithmetic_sees_variables() {
        let mut env = Env::new();
        env.variables.set("N", "6");
        assert_eq!(expand(&mut env, "$((N * 7))"), ["42"]);
        assert_eq!(expand(&mut env, "$(($N * 7))"), ["42"]);
        env.variables.unset("N");
    }

    #[test]
    fn arithmetic_division_by_zero_is_an_error() {
        let mut env = Env::new();
        let error = expand_word(&mut env, &word("$((1/0))")).unwrap_err();
        assert!(matches!(error, Error::Arith(_)));
    }

    #[test]
    fn arithmetic_skipped_for_leading_quoted_words() {
        let mut env = Env::new();
        let w = Word {
            text: "\"$((1+2))\"".to_string(),
            token_kind: TokenKind::DoubleQuoted,
            leading_quoted: true,
        };
        assert_eq!(expand_word(&mut env, &w).unwrap(), ["$((1+2))"]);
    }

    #[test]
    fn brace_expansion_multiplies() {
        let mut env = Env::new();
        assert_eq!(expand(&mut env, "{a,b}"), ["a", "b"]);
        let mut all = expand(&mut env, "{a,b}{1,2}");
        all.sort();
        assert_eq!(all, ["a1", "a2", "b1", "b2"]);
    }

    #[test]
    fn brace_ranges() {
        let mut env = Env::new();
        assert_eq!(expand(&mut env, "{1..3}"), ["1", "2", "3"]);
        assert_eq!(expand(&mut env, "{3..1}"), ["3", "2", "1"]);
        assert_eq!(expand(&mut env, "{a..c}"), ["a", "b", "c"]);
    }

    #[test]
    fn quoted_braces_stay_literal() {
        let mut env = Env::new();
        assert_eq!(expand(&mut env, r"\{a,b\}"), ["{a,b}"]);
    }

    #[test]
    fn pattern_expansion_escapes_quoted_chars() {
        let mut env = Env::new();
        let p = expand_pattern(&mut env, &word("*.txt")).unwrap();
        assert_eq!(p, "*.txt");
        let p = expand_pattern(&mut env, &quoted_word("'*.txt'")).unwrap();
        assert_eq!(p, r"\*.txt");
    }

    #[test]
    fn expand_single_keeps_one_field() {
        let mut env = Env::new();
        env.variables.set("V", "one two");
        assert_eq!(expand_single(&mut env, &word("$V")).unwrap(), "one two");
        // Brace expansion does not apply to single-field positions.
        assert_eq!(expand_single(&mut env, &word("{a,b}")).unwrap(), "{a,b}");
        env.variables.unset("V");
    }

    #[test]
    fn lone_dollar_is_literal() {
        let mut env = Env::new();
        assert_eq!(expand(&mut env, "a$"), ["a$"]);
        assert_eq!(expand(&mut env, "$%x"), ["$%x"]);
    }

    #[test]
    fn invalid_braced_name_is_literal() {
        let mut env = Env::new();
        assert_eq!(expand(&mut env, "${not a name}"), ["${not a name}"]);
    }

    #[test]
    fn tilde_expands_home() {
        let mut env = Env::new();
        env.variables.set("HOME", "/home/test");
        assert_eq!(expand(&mut env, "~"), ["/home/test"]);
        assert_eq!(expand(&mut env, "~/sub"), ["/home/test/sub"]);
        // Quoted tilde is not expanded.
        let words = expand_word(&mut env, &quoted_word("'~'")).unwrap();
        assert_eq!(words, ["~"]);
        // Mid-word tilde is not expanded.
        assert_eq!(expand(&mut env, "a~b"), ["a~b"]);
    }

    #[test]
    fn tilde_plus_and_minus() {
        let mut env = Env::new();
        env.variables.set("PWD", "/tmp/cur");
        env.variables.set("OLDPWD", "/tmp/old");
        assert_eq!(expand(&mut env, "~+"), ["/tmp/cur"]);
        assert_eq!(expand(&mut env, "~-"), ["/tmp/old"]);
        assert_eq!(expand(&mut env, "~+/x"), ["/tmp/cur/x"]);
    }

    #[test]
    fn tilde_of_unknown_user_is_verbatim() {
        let mut env = Env::new();
        assert_eq!(
            expand(&mut env, "~no_such_user_hopefully/x"),
            ["~no_such_user_hopefully/x"]
        );
    }
}
