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

//! Command substitution
//!
//! `$(…)` and backquotes run the command in a forked subshell that
//! re-enters the parser and executor with its stdout captured through a
//! pipe. Trailing newlines are stripped from the captured output.

use crate::command::execute_program;
use hsh_env::semantics::Divert;
use hsh_env::system::{self, signal};
use hsh_env::Env;
use hsh_syntax::lex::Lexer;
use hsh_syntax::parser::Parser;
use nix::errno::Errno;
use nix::unistd::ForkResult;

/// Runs a command line in a capturing subshell and returns its output.
///
/// Failures to fork or read produce an empty result; the substituted
/// command's own exit status is reflected into `$?`.
pub(crate) fn capture(env: &mut Env, command: &str) -> String {
    let (read_end, write_end) = match system::pipe() {
        Ok(ends) => ends,
        Err(errno) => {
            eprintln!("hsh: pipe: {}", errno.desc());
            return String::new();
        }
    };

    match system::fork() {
        Err(errno) => {
            eprintln!("hsh: fork: {}", errno.desc());
            String::new()
        }
        Ok(ForkResult::Child) => {
            signal::restore_defaults();
            drop(read_end);
            if system::dup2(write_end.raw(), 1).is_err() {
                system::exit_process(126);
            }
            drop(write_end);

            let program = match Parser::new(Lexer::new(command)).parse_program() {
                Ok(program) => program,
                Err(error) => {
                    eprintln!("hsh: {error}");
                    system::exit_process(2);
                }
            };
            let status = match execute_program(env, &program) {
                Ok(status) => status,
                Err(Divert::Exit(status)) => status,
            };
            system::exit_process(status.0)
        }
        Ok(ForkResult::Parent { child }) => {
            drop(write_end);
            let output = system::read_to_end(&read_end).unwrap_or_default();
            loop {
                match system::wait_for(child) {
                    Err(Errno::EINTR) => continue,
                    Ok(status) => {
                        env.exit_status = status.into();
                        break;
                    }
                    Err(errno) => {
                        eprintln!("hsh: waitpid: {}", errno.desc());
                        break;
                    }
                }
            }

            let mut text = String::from_utf8_lossy(&output).into_owned();
            while text.ends_with('\n') {
                text.pop();
            }
            text
        }
    }
}
