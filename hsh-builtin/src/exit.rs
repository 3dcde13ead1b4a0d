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

//! Exit built-in
//!
//! # Synopsis
//!
//! ```sh
//! exit [status]
//! ```
//!
//! # Description
//!
//! Requests termination of the interpreter. The operand must parse as
//! an integer in full; the value is masked to its lowest 8 bits. With
//! no operand the interpreter exits with the current `$?`.
//!
//! # Exit Status
//!
//! A non-numeric operand is a usage error (status 2) and does not exit.
//! More than one operand is an error (status 1) and does not exit.

use crate::{print_err, Result};
use hsh_env::semantics::{Divert, ExitStatus};
use hsh_env::Env;

pub fn main(env: &mut Env, args: &[String]) -> Result {
    let status = match args.first() {
        None => env.exit_status,
        Some(operand) => match operand.parse::<i32>() {
            Ok(value) => ExitStatus(value & 0xFF),
            Err(_) => {
                print_err(format!("exit: numeric argument required: {operand}"));
                return ExitStatus::ERROR.into();
            }
        },
    };
    if args.len() > 1 {
        print_err("exit: too many arguments");
        return ExitStatus::FAILURE.into();
    }

    Result {
        exit_status: status,
        divert: Some(Divert::Exit(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn exit_without_operand_uses_last_status() {
        let mut env = Env::new();
        env.exit_status = ExitStatus(5);
        let result = main(&mut env, &[]);
        assert_eq!(result.exit_status, ExitStatus(5));
        assert_matches!(result.divert, Some(Divert::Exit(ExitStatus(5))));
    }

    #[test]
    fn numeric_operand_is_masked_to_8_bits() {
        let mut env = Env::new();
        let result = main(&mut env, &["259".to_string()]);
        assert_eq!(result.exit_status, ExitStatus(3));
        assert_matches!(result.divert, Some(Divert::Exit(ExitStatus(3))));

        let result = main(&mut env, &["0".to_string()]);
        assert_eq!(result.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn non_numeric_operand_is_a_usage_error() {
        let mut env = Env::new();
        for operand in ["abc", "1x", "", "0x10"] {
            let result = main(&mut env, &[operand.to_string()]);
            assert_eq!(result.exit_status, ExitStatus::ERROR, "for {operand:?}");
            assert_eq!(result.divert, None);
        }
    }

    #[test]
    fn too_many_operands_do_not_exit() {
        let mut env = Env::new();
        let result = main(&mut env, &["1".to_string(), "2".to_string()]);
        assert_eq!(result.exit_status, ExitStatus::FAILURE);
        assert_eq!(result.divert, None);
    }
}
