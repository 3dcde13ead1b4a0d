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

//! Export built-in
//!
//! # Synopsis
//!
//! ```sh
//! export [name[=value]…]
//! ```
//!
//! # Description
//!
//! Marks variables for export to the environment of subsequently
//! executed commands. A `name=value` operand assigns first; a bare
//! `name` exports the current value, or an empty string when the
//! variable is unset. Without operands, the current environment is
//! listed as `name=value` lines.
//!
//! # Exit Status
//!
//! Zero on success; one if any operand is not a valid identifier (the
//! remaining operands are still processed).

use crate::{print_err, print_out, Result};
use hsh_env::semantics::ExitStatus;
use hsh_env::variable::is_valid_name;
use hsh_env::Env;
use itertools::Itertools;

pub fn main(env: &mut Env, args: &[String]) -> Result {
    if args.is_empty() {
        for (name, value) in std::env::vars().sorted() {
            print_out(format!("{name}={value}"));
        }
        return ExitStatus::SUCCESS.into();
    }

    let mut status = ExitStatus::SUCCESS;
    for operand in args {
        let (name, value) = match operand.find('=') {
            Some(eq) => (&operand[..eq], Some(operand[eq + 1..].to_string())),
            None => (operand.as_str(), None),
        };
        if !is_valid_name(name) {
            print_err(format!("export: not a valid identifier: {name}"));
            status = ExitStatus::FAILURE;
            continue;
        }
        env.variables.export(name, value);
    }
    status.into()
}
