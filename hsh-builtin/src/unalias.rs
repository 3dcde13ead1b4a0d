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

//! Unalias built-in
//!
//! Removes alias definitions. `-a` removes all of them.

use crate::{print_err, Result};
use hsh_env::semantics::ExitStatus;
use hsh_env::Env;

pub fn main(env: &mut Env, args: &[String]) -> Result {
    if args.is_empty() {
        print_err("unalias: usage: unalias [-a] name [name ...]");
        return ExitStatus::FAILURE.into();
    }

    if args[0] == "-a" {
        env.aliases.clear();
        return ExitStatus::SUCCESS.into();
    }

    let mut status = ExitStatus::SUCCESS;
    for name in args {
        if !env.aliases.remove(name) {
            print_err(format!("unalias: not found: {name}"));
            status = ExitStatus::FAILURE;
        }
    }
    status.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_named_aliases() {
        let mut env = Env::new();
        env.aliases.define("a", "1");
        env.aliases.define("b", "2");
        let result = main(&mut env, &["a".to_string()]);
        assert_eq!(result.exit_status, ExitStatus::SUCCESS);
        assert_eq!(env.aliases.get("a"), None);
        assert_eq!(env.aliases.get("b"), Some("2"));
    }

    #[test]
    fn dash_a_clears_everything() {
        let mut env = Env::new();
        env.aliases.define("a", "1");
        env.aliases.define("b", "2");
        let result = main(&mut env, &["-a".to_string()]);
        assert_eq!(result.exit_status, ExitStatus::SUCCESS);
        assert!(env.aliases.is_empty());
    }

    #[test]
    fn unknown_name_fails() {
        let mut env = Env::new();
        let result = main(&mut env, &["missing".to_string()]);
        assert_eq!(result.exit_status, ExitStatus::FAILURE);
    }

    #[test]
    fn no_operands_is_a_usage_error() {
        let mut env = Env::new();
        let result = main(&mut env, &[]);
        assert_eq!(result.exit_status, ExitStatus::FAILURE);
    }
}
