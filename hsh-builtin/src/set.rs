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

//! Set built-in
//!
//! # Synopsis
//!
//! ```sh
//! set -o option
//! set +o option
//! set -o
//! set +o
//! ```
//!
//! # Description
//!
//! `set -o option` enables a shell option, `set +o option` disables it.
//! `set -o` alone prints the state of every option in a human-readable
//! table; `set +o` prints it as `set` commands that would recreate the
//! current state.

use crate::{print_err, print_out, Result};
use hsh_env::option::ShellOption;
use hsh_env::semantics::ExitStatus;
use hsh_env::Env;
use std::str::FromStr;

pub fn main(env: &mut Env, args: &[String]) -> Result {
    match args {
        [] => ExitStatus::SUCCESS.into(),

        [flag] if flag == "-o" => {
            for (option, enabled) in env.options.all() {
                print_out(format!("{option}\t{}", if enabled { "on" } else { "off" }));
            }
            ExitStatus::SUCCESS.into()
        }

        [flag] if flag == "+o" => {
            for (option, enabled) in env.options.all() {
                print_out(format!("set {}o {option}", if enabled { "-" } else { "+" }));
            }
            ExitStatus::SUCCESS.into()
        }

        [flag, name] if flag == "-o" || flag == "+o" => match ShellOption::from_str(name) {
            Ok(option) => {
                env.options.set(option, flag == "-o");
                ExitStatus::SUCCESS.into()
            }
            Err(_) => {
                print_err(format!("set: invalid option name: {name}"));
                ExitStatus::FAILURE.into()
            }
        },

        _ => {
            print_err("usage: set [-o option] | [+o option]");
            ExitStatus::FAILURE.into()
        }
    }
}
