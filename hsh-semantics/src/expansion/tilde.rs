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

//! Tilde expansion
//!
//! The head of the word, up to the first `/`, selects the replacement:
//! a bare `~` means `$HOME` (or the passwd entry), `~+` means `$PWD`,
//! `~-` means `$OLDPWD`, and `~user` is that user's home directory. On
//! any lookup failure the word is left verbatim.

use hsh_env::system;
use hsh_env::variable::{HOME, OLDPWD, PWD};
use hsh_env::Env;

/// Classifies and substitutes the tilde prefix of `text`.
///
/// Returns the replacement and the remainder of the word (starting at
/// the first `/`, if any), or `None` when no expansion applies.
pub(super) fn expand<'a>(env: &Env, text: &'a str) -> Option<(String, &'a str)> {
    debug_assert!(text.starts_with('~'));
    let (head, rest) = match text.find('/') {
        Some(slash) => (&text[..slash], &text[slash..]),
        None => (text, ""),
    };

    let base = match head {
        "~" => match env.variables.get(HOME) {
            Some(home) if !home.is_empty() => Some(home),
            _ => system::current_user_home(),
        },
        "~+" => env.variables.get(PWD),
        "~-" => env.variables.get(OLDPWD),
        _ => system::home_for_user(&head[1..]),
    };

    base.map(|base| (base, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_head_at_first_slash() {
        let mut env = Env::new();
        env.variables.set("HOME", "/h");
        let (base, rest) = expand(&env, "~/a/b").unwrap();
        assert_eq!(base, "/h");
        assert_eq!(rest, "/a/b");
        let (base, rest) = expand(&env, "~").unwrap();
        assert_eq!(base, "/h");
        assert_eq!(rest, "");
    }

    #[test]
    fn unknown_user_yields_none() {
        let env = Env::new();
        assert_eq!(expand(&env, "~hsh_no_such_user"), None);
    }

    #[test]
    fn pwd_and_oldpwd_heads() {
        let mut env = Env::new();
        env.variables.set("PWD", "/cur");
        env.variables.set("OLDPWD", "/old");
        assert_eq!(expand(&env, "~+").unwrap().0, "/cur");
        assert_eq!(expand(&env, "~-").unwrap().0, "/old");
    }
}
