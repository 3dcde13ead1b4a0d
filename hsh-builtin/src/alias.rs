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

//! Alias built-in
//!
//! Without operands, lists all aliases as `alias name='value'`. A
//! `name=value` operand defines an alias; a bare `name` prints that
//! alias, or fails when it is not defined. Listed values are quoted so
//! the output can be fed back to the shell.

use crate::{print_err, print_out, Result};
use hsh_env::semantics::ExitStatus;
use hsh_env::Env;
use hsh_quote::quote;
use std::borrow::Cow;

/// Quotes an alias value for listing; plain values still get quotes so
/// the output reads uniformly.
fn quoted_value(value: &str) -> Cow<'_, str> {
    match quote(value) {
        Cow::Borrowed(plain) => Cow::Owned(format!("'{plain}'")),
        quoted => quoted,
    }
}

pub fn main(env: &mut Env, args: &[String]) -> Result {
    if args.is_empty() {
        for (name, value) in env.aliases.sorted() {
            print_out(format!("alias {}={}", name, quoted_value(value)));
        }
        return ExitStatus::SUCCESS.into();
    }

    let mut status = ExitStatus::SUCCESS;
    for operand in args {
        match operand.find('=') {
            Some(eq) => {
                let name = &operand[..eq];
                let value = &operand[eq + 1..];
                env.aliases.define(name, value);
            }
            None => match env.aliases.get(operand) {
                Some(value) => {
                    print_out(format!("alias {}={}", operand, quoted_value(value)));
                }
                None => {
                    print_err(format!("alias: not found: {operand}"));
                    status = ExitStatus::FAILURE;
                }
            },
        }
    }
    status.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn define_then_query() {
        let mut env = Env::new();
        let result = main(&mut env, &args(&["gs=git status"]));
        assert_eq!(result.exit_status, ExitStatus::SUCCESS);
        assert_eq!(env.aliases.get("gs"), Some("git status"));

        let result = main(&mut env, &args(&["gs"]));
        assert_eq!(result.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn unknown_alias_fails() {
        let mut env = Env::new();
        let result = main(&mut env, &args(&["missing"]));
        assert_eq!(result.exit_status, ExitStatus::FAILURE);
    }

    #[test]
    fn listing_is_allowed_when_empty() {
        let mut env = Env::new();
        let result = main(&mut env, &[]);
        assert_eq!(result.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn value_quoting() {
        assert_eq!(quoted_value("ls"), "'ls'");
        assert_eq!(quoted_value("git status"), "'git status'");
        assert_eq!(quoted_value("it's"), r"'it'\''s'");
    }
}
