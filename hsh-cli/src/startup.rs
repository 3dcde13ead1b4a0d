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

//! Startup: command-line parsing and environment preparation

use hsh_env::system;
use hsh_env::variable::SHELL;
use hsh_env::Env;
use thiserror::Error;

/// Parsed command line of the interpreter itself
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Invocation {
    /// Echo each command line to stderr before executing it (`-v`)
    pub verbose: bool,
    /// Print usage and exit (`-h`)
    pub help: bool,
    /// Print the version and exit (`-V`)
    pub version: bool,
    /// Command string to execute instead of reading stdin (`-c`)
    pub command: Option<String>,
    /// Remaining operands, becoming `$1` and up
    pub positional: Vec<String>,
}

/// Error in the interpreter's own command line
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InvocationError {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("-c requires a command argument")]
    MissingCommand,
}

/// Parses the arguments after `argv[0]`.
pub fn parse_arguments(args: &[String]) -> Result<Invocation, InvocationError> {
    let mut invocation = Invocation::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => invocation.verbose = true,
            "-h" | "--help" => invocation.help = true,
            "-V" | "--version" => invocation.version = true,
            "-c" => match iter.next() {
                Some(command) => {
                    invocation.command = Some(command.clone());
                    // Everything after the command string is positional.
                    invocation.positional.extend(iter.cloned());
                    break;
                }
                None => return Err(InvocationError::MissingCommand),
            },
            "--" => {
                invocation.positional.extend(iter.cloned());
                break;
            }
            option if option.starts_with('-') && option.len() > 1 => {
                return Err(InvocationError::UnknownOption(option.to_string()));
            }
            _ => {
                invocation.positional.push(arg.clone());
                invocation.positional.extend(iter.cloned());
                break;
            }
        }
    }
    Ok(invocation)
}

/// Prepares the environment for the session.
///
/// Registers the builtins, installs the signal handlers, seeds `$0` and
/// the positional parameters, applies `-v`, and exports `SHELL` as this
/// executable's path (from `/proc/self/exe`, falling back to `argv[0]`).
pub fn prepare_environment(env: &mut Env, invocation: &Invocation, argv0: &str) {
    env.builtins.extend(hsh_builtin::builtins());
    env.script_name = argv0.to_string();
    env.positional_params = invocation.positional.clone();
    env.options.verbose = invocation.verbose;

    let shell_path = system::executable_path().unwrap_or_else(|| argv0.to_string());
    env.variables.export(SHELL, Some(shell_path));

    if let Err(errno) = system::signal::install_handlers() {
        eprintln!("hsh: sigaction: {}", errno.desc());
    }
}
