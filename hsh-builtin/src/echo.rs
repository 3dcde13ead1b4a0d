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

//! Echo built-in
//!
//! Prints its operands separated by spaces, followed by a newline.
//! Leading `-n` operands are consumed greedily and suppress the
//! newline; the first operand that is not exactly `-n` ends option
//! processing.

use crate::{print_out_raw, Result};
use hsh_env::semantics::ExitStatus;
use hsh_env::Env;

pub fn main(_env: &mut Env, args: &[String]) -> Result {
    let mut operands = args;
    let mut newline = true;
    while let Some(first) = operands.first() {
        if first != "-n" {
            break;
        }
        newline = false;
        operands = &operands[1..];
    }

    let mut output = operands.join(" ");
    if newline {
        output.push('\n');
    }
    print_out_raw(output);
    ExitStatus::SUCCESS.into()
}
