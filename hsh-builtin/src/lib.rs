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

//! Implementations of the built-in utilities
//!
//! Built-ins run in the interpreter process. They write through the raw
//! standard descriptors rather than Rust's buffered streams, because the
//! executor temporarily replaces fds 0–2 around a builtin invocation and
//! buffered output would escape the replacement window.
//!
//! [`builtins`] yields the full set for registration into an
//! [`Env`](hsh_env::Env) at startup.

pub mod alias;
pub mod bg;
pub mod cd;
pub mod echo;
pub mod exit;
pub mod export;
pub mod fg;
pub mod jobs;
pub mod pwd;
pub mod set;
pub mod unalias;

use hsh_env::builtin::Builtin;
use hsh_env::system;
use hsh_env::Env;

/// Result type common to all built-ins
pub type Result = hsh_env::builtin::Result;

/// All built-in utilities, for registration at startup.
pub fn builtins() -> impl Iterator<Item = (&'static str, Builtin)> {
    [
        ("alias", Builtin { execute: alias::main }),
        ("bg", Builtin { execute: bg::main }),
        ("cd", Builtin { execute: cd::main }),
        ("echo", Builtin { execute: echo::main }),
        ("exit", Builtin { execute: exit::main }),
        ("export", Builtin { execute: export::main }),
        ("fg", Builtin { execute: fg::main }),
        ("jobs", Builtin { execute: jobs::main }),
        ("pwd", Builtin { execute: pwd::main }),
        ("set", Builtin { execute: set::main }),
        ("unalias", Builtin { execute: unalias::main }),
    ]
    .into_iter()
}

/// Writes a line to standard output (fd 1).
pub(crate) fn print_out(text: impl AsRef<str>) {
    let mut line = text.as_ref().to_string();
    line.push('\n');
    let _ = system::write_all(1, line.as_bytes());
}

/// Writes text to standard output without a trailing newline.
pub(crate) fn print_out_raw(text: impl AsRef<str>) {
    let _ = system::write_all(1, text.as_ref().as_bytes());
}

/// Writes a diagnostic line to standard error (fd 2).
pub(crate) fn print_err(text: impl AsRef<str>) {
    let mut line = text.as_ref().to_string();
    line.push('\n');
    let _ = system::write_all(2, line.as_bytes());
}

/// Resolves the job a `fg` or `bg` invocation refers to.
///
/// With no argument the most recent job is chosen; otherwise the
/// argument is a job ID, optionally prefixed with `%`. Reports the
/// error and returns `Err` with the failing status when there is no
/// such job.
pub(crate) fn resolve_job_id(
    env: &Env,
    args: &[String],
    name: &str,
) -> std::result::Result<usize, hsh_env::semantics::ExitStatus> {
    use hsh_env::semantics::ExitStatus;

    if args.len() > 1 {
        print_err(format!("{name}: too many arguments"));
        return Err(ExitStatus::FAILURE);
    }

    let Some(argument) = args.first() else {
        return match env.jobs.newest_id() {
            Some(id) => Ok(id),
            None => {
                print_err(format!("{name}: no current job"));
                Err(ExitStatus::FAILURE)
            }
        };
    };

    let digits = argument.strip_prefix('%').unwrap_or(argument);
    match digits.parse() {
        Ok(id) if env.jobs.get(id).is_some() => Ok(id),
        Ok(id) => {
            print_err(format!("{name}: no such job: %{id}"));
            Err(ExitStatus::FAILURE)
        }
        Err(_) => {
            print_err(format!("{name}: invalid job specification: {argument}"));
            Err(ExitStatus::FAILURE)
        }
    }
}
