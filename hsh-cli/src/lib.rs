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

//! Interpreter entry point and read-eval loop
//!
//! A command line flows linearly: input, lexer, parser, AST, and then
//! per-node expansion and execution. The loop itself only adds prompt
//! rendering, job-completion notices, and error reporting; everything
//! else lives in the library crates.

pub mod startup;

use hsh_env::semantics::{Divert, ExitStatus};
use hsh_env::system::{self, signal};
use hsh_env::Env;
use hsh_semantics::command::execute_program;
use hsh_syntax::lex::Lexer;
use hsh_syntax::parser::{ErrorCause, Parser};
use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use startup::{parse_arguments, prepare_environment};
use std::io::{BufRead, Write};

const USAGE: &str = "\
usage: hsh [-v|--verbose] [-h|--help] [-V|--version] [-c COMMAND] [arg...]

  -c COMMAND   parse and execute COMMAND, then exit
  -v           echo each command line to stderr before executing it
  -h           print this help and exit
  -V           print version information and exit
";

/// Parses and executes one command line against the environment.
///
/// Parse errors are reported on stderr and set `$?` without stopping
/// the interpreter; an `exit` request propagates as a `Divert`.
pub fn execute_source(env: &mut Env, source: &str) -> Result<ExitStatus, Divert> {
    let program = match Parser::new(Lexer::new(source)).parse_program() {
        Ok(program) => program,
        Err(error) => {
            eprintln!("{error}");
            let status = match error.cause {
                ErrorCause::Syntax(_) => ExitStatus::ERROR,
                ErrorCause::Lex(_) => ExitStatus::FAILURE,
            };
            env.exit_status = status;
            return Ok(status);
        }
    };
    execute_program(env, &program)
}

/// Reaps finished children and prints job-completion notices.
fn notify_finished_jobs(env: &mut Env) {
    if !signal::take_sigchld() && env.jobs.is_empty() {
        return;
    }
    loop {
        match system::wait_any_nohang() {
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
            Ok(status) => {
                env.jobs.apply_wait_status(status);
            }
            Err(_) => break,
        }
    }
    for (id, job) in env.jobs.take_finished() {
        eprintln!("[{id}]  {} {}", job.state, job.name);
    }
}

/// Runs the interactive read-eval loop until end of input or `exit`.
fn interactive_loop(env: &mut Env) -> ExitStatus {
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        notify_finished_jobs(env);
        // A pending interrupt only cancels the current line.
        if signal::take_sigint() {
            eprintln!();
        }

        eprint!("$ ");
        let _ = std::io::stderr().flush();

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => return env.exit_status,
            Ok(_) => {}
            Err(error) if error.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(error) => {
                eprintln!("hsh: read: {error}");
                return env.exit_status;
            }
        }

        if env.options.verbose {
            eprint!("{line}");
        }
        match execute_source(env, &line) {
            Ok(_) => {}
            Err(Divert::Exit(status)) => return status,
        }
    }
}

/// Entry point of the interpreter; returns the process exit code.
pub fn run() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    let argv0 = args.first().map(String::as_str).unwrap_or("hsh");

    let invocation = match parse_arguments(&args[1..]) {
        Ok(invocation) => invocation,
        Err(error) => {
            eprintln!("hsh: {error}");
            eprint!("{USAGE}");
            return 2;
        }
    };

    if invocation.help {
        print!("{USAGE}");
        return 0;
    }
    if invocation.version {
        println!("hsh {}", env!("CARGO_PKG_VERSION"));
        return 0;
    }

    let mut env = Env::new();
    prepare_environment(&mut env, &invocation, argv0);

    let status = match &invocation.command {
        Some(command) => {
            if invocation.verbose {
                eprintln!("{command}");
            }
            match execute_source(&mut env, command) {
                Ok(status) => status,
                Err(Divert::Exit(status)) => status,
            }
        }
        None => interactive_loop(&mut env),
    };
    status.0 & 0xFF
}
