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

//! Cd built-in
//!
//! The **`cd`** built-in changes the working directory.
//!
//! # Synopsis
//!
//! ```sh
//! cd [directory]
//! ```
//!
//! # Description
//!
//! With no operand, the target is `$HOME`. The operand `-` means
//! `$OLDPWD`, and the new working directory is printed after the
//! change. On success, `$OLDPWD` is set to the previous directory and
//! `$PWD` to the new one.
//!
//! # Errors
//!
//! It is an error when the target directory cannot be entered, when the
//! required variable (`$HOME` or `$OLDPWD`) is unset, or when more than
//! one operand is given.
//!
//! # Exit Status
//!
//! Zero on success, one on any error.

use crate::{print_err, print_out, Result};
use hsh_env::semantics::ExitStatus;
use hsh_env::variable::{HOME, OLDPWD, PWD};
use hsh_env::Env;

pub fn main(env: &mut Env, args: &[String]) -> Result {
    if args.len() > 1 {
        print_err("cd: too many arguments");
        return ExitStatus::FAILURE.into();
    }

    let mut print_target = false;
    let target = match args.first().map(String::as_str) {
        None => match env.variables.get(HOME) {
            Some(home) if !home.is_empty() => home,
            _ => {
                print_err("cd: HOME not set");
                return ExitStatus::FAILURE.into();
            }
        },
        Some("-") => match env.variables.get(OLDPWD) {
            Some(oldpwd) if !oldpwd.is_empty() => {
                print_target = true;
                oldpwd
            }
            _ => {
                print_err("cd: OLDPWD not set");
                return ExitStatus::FAILURE.into();
            }
        },
        Some(directory) => directory.to_string(),
    };

    let old_pwd = env.get_cwd();
    if let Err(errno) = env.set_cwd(&target) {
        print_err(format!("cd: {}: {}", target, errno.desc()));
        return ExitStatus::FAILURE.into();
    }

    let new_pwd = env.get_cwd();
    env.variables.set(OLDPWD, old_pwd);
    env.variables.set(PWD, new_pwd.clone());
    // cd writes both through to the environment for child processes.
    env.variables.export(OLDPWD, None);
    env.variables.export(PWD, None);

    if print_target {
        print_out(&new_pwd);
    }
    ExitStatus::SUCCESS.into()
}
