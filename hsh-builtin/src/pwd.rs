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

//! Pwd built-in
//!
//! Prints the current working directory.

use crate::{print_err, print_out, Result};
use hsh_env::semantics::ExitStatus;
use hsh_env::Env;

pub fn main(env: &mut Env, args: &[String]) -> Result {
    if !args.is_empty() {
        print_err("pwd: too many arguments");
        return ExitStatus::FAILURE.into();
    }
    print_out(env.get_cwd());
    ExitStatus::SUCCESS.into()
}
