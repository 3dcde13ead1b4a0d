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

//! Pipeline runner
//!
//! Expansion runs in the parent, strictly left to right, before any
//! process starts. Each pipeline leg then forks: pipe ends are `dup2`'d
//! first and per-command redirections after, so redirections override
//! the pipe wiring. The parent closes its copies of the pipe ends as
//! the forks proceed and reaps the children left to right.
//!
//! A builtin runs in-process when it is the sole command of a
//! foreground pipeline; inside a multi-command pipeline it is reported
//! as unsupported, since it would otherwise have to fork to get its own
//! stdout.

use crate::command::{execute_compound_command, execute_compound_statement};
use crate::redir::{self, ResolvedRedir};
use hsh_env::job::{Job, JobState};
use hsh_env::semantics::{Divert, ExitStatus};
use hsh_env::system::{self, signal, FdHandle};
use hsh_env::Env;
use hsh_syntax::syntax::{Command, CompoundCommand, CompoundStatement, Pipeline};
use itertools::Itertools;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use nix::unistd::{ForkResult, Pid};
use std::ffi::CString;
use std::os::unix::io::RawFd;

/// What a forked pipeline child becomes
enum ChildTask<'a> {
    /// Exec an external command.
    Exec { argv: Vec<CString>, name: String },
    /// Run interpreter code and exit with its status.
    Run(Box<dyn FnOnce(&mut Env) -> ExitStatus + 'a>),
}

/// Executes a pipeline node.
pub(crate) fn run(env: &mut Env, pipeline: &Pipeline) -> crate::Result<ExitStatus> {
    if pipeline.background {
        return Ok(spawn_background(env, pipeline));
    }
    if let [command] = &pipeline.commands[..] {
        match command {
            Command::Simple(simple) => super::simple_command::run_simple(env, simple),
            Command::Compound {
                command,
                redirections,
            } => run_compound(env, command, redirections),
        }
    } else {
        Ok(run_multi(env, pipeline))
    }
}

/// Executes a sole compound command, applying its redirections.
fn run_compound(
    env: &mut Env,
    command: &CompoundCommand,
    redirections: &[hsh_syntax::syntax::Redirection],
) -> crate::Result<ExitStatus> {
    let resolved = match redir::resolve_all(env, redirections) {
        Ok(resolved) => resolved,
        Err(error) => {
            eprintln!("hsh: {error}");
            return Ok(ExitStatus::FAILURE);
        }
    };

    if let CompoundCommand::Group {
        body,
        is_subshell: true,
    } = command
    {
        return Ok(fork_and_wait_body(env, body, resolved));
    }

    // Other compound commands run in the current process behind
    // temporarily replaced fds.
    let saved = match redir::apply_saving(&resolved) {
        Ok(saved) => saved,
        Err(error) => {
            eprintln!("hsh: {error}");
            return Ok(ExitStatus::FAILURE);
        }
    };
    let result = execute_compound_command(env, command);
    redir::restore(saved);
    drop(resolved);
    result
}

/// Executes a `(…)` subshell body in a forked child.
pub(crate) fn run_subshell(env: &mut Env, body: &CompoundStatement) -> crate::Result<ExitStatus> {
    Ok(fork_and_wait_body(env, body, Vec::new()))
}

fn fork_and_wait_body(
    env: &mut Env,
    body: &CompoundStatement,
    resolved: Vec<ResolvedRedir>,
) -> ExitStatus {
    let name = format!("({body})");
    let task = ChildTask::Run(Box::new(move |env: &mut Env| {
        match execute_compound_statement(env, body) {
            Ok(status) => status,
            Err(Divert::Exit(status)) => status,
        }
    }));
    match fork_child(env, None, None, None, &[], &resolved, task) {
        Err(errno) => {
            eprintln!("hsh: fork: {}", errno.desc());
            ExitStatus::FAILURE
        }
        Ok(pid) => {
            signal::set_foreground_pgid(pid);
            let status = wait_child(env, pid, &name);
            signal::clear_foreground_pgid();
            status
        }
    }
}

/// Runs an expanded external command in the foreground.
pub(crate) fn run_external_foreground(
    env: &mut Env,
    argv: Vec<String>,
    resolved: Vec<ResolvedRedir>,
) -> ExitStatus {
    let name = argv[0].clone();
    let Some(c_args) = to_cstrings(&argv) else {
        eprintln!("hsh: {name}: invalid argument");
        return ExitStatus::FAILURE;
    };
    let task = ChildTask::Exec {
        argv: c_args,
        name: name.clone(),
    };
    match fork_child(env, None, None, None, &[], &resolved, task) {
        Err(errno) => {
            eprintln!("hsh: fork: {}", errno.desc());
            ExitStatus::FAILURE
        }
        Ok(pid) => {
            signal::set_foreground_pgid(pid);
            let status = wait_child(env, pid, &name);
            signal::clear_foreground_pgid();
            status
        }
    }
}

/// Runs a multi-command foreground pipeline.
fn run_multi(env: &mut Env, pipeline: &Pipeline) -> ExitStatus {
    let legs = match prepare_legs(env, pipeline, false) {
        Ok(legs) => legs,
        Err(status) => return status,
    };
    let expected = legs.len();

    let pids = match spawn_legs(env, legs, true) {
        Ok(pids) => pids,
        Err(status) => return status,
    };

    let name = pipeline_name(pipeline);
    let mut statuses = Vec::with_capacity(pids.len());
    for pid in pids {
        statuses.push(wait_child(env, pid, &name));
    }
    signal::clear_foreground_pgid();

    if statuses.len() < expected {
        return ExitStatus::FAILURE;
    }
    overall_status(env.options.pipefail, &statuses)
}

/// Spawns a pipeline without awaiting it and records the job.
fn spawn_background(env: &mut Env, pipeline: &Pipeline) -> ExitStatus {
    let allow_builtin = pipeline.commands.len() == 1;
    let legs = match prepare_legs(env, pipeline, allow_builtin) {
        Ok(legs) => legs,
        Err(status) => return status,
    };

    let pids = match spawn_legs(env, legs, false) {
        Ok(pids) => pids,
        Err(status) => return status,
    };
    let Some(&primary) = pids.last() else {
        return ExitStatus::FAILURE;
    };

    let id = env.jobs.add(Job::new(primary, pipeline_name(pipeline)));
    eprintln!("[{id}] {}", primary.as_raw());
    ExitStatus::SUCCESS
}

fn pipeline_name(pipeline: &Pipeline) -> String {
    pipeline.commands.iter().map(Command::to_string).join(" | ")
}

/// Expands every leg and resolves its redirections, in pipeline order.
fn prepare_legs<'a>(
    env: &mut Env,
    pipeline: &'a Pipeline,
    allow_builtin: bool,
) -> Result<Vec<(ChildTask<'a>, Vec<ResolvedRedir>)>, ExitStatus> {
    let mut legs = Vec::with_capacity(pipeline.commands.len());
    for command in &pipeline.commands {
        match command {
            Command::Simple(simple) => {
                let expanded = match super::simple_command::expand_simple(env, simple) {
                    Ok(expanded) => expanded,
                    Err(error) => {
                        eprintln!("hsh: {error}");
                        return Err(ExitStatus::FAILURE);
                    }
                };
                super::simple_command::apply_assignments(env, &expanded);

                let resolved = match redir::resolve_all(env, &simple.redirections) {
                    Ok(resolved) => resolved,
                    Err(error) => {
                        eprintln!("hsh: {error}");
                        return Err(ExitStatus::FAILURE);
                    }
                };

                if expanded.argv.is_empty() {
                    legs.push((
                        ChildTask::Run(Box::new(|_: &mut Env| ExitStatus::SUCCESS)),
                        resolved,
                    ));
                    continue;
                }

                let name = expanded.argv[0].clone();
                if let Some(&builtin) = env.builtins.get(name.as_str()) {
                    if allow_builtin {
                        let args: Vec<String> = expanded.argv[1..].to_vec();
                        legs.push((
                            ChildTask::Run(Box::new(move |env: &mut Env| {
                                (builtin.execute)(env, &args).exit_status
                            })),
                            resolved,
                        ));
                        continue;
                    }
                    // A builtin cannot sit inside a multi-command
                    // pipeline without forking for its stdout. Fall back
                    // to the external counterpart when one exists.
                    if !found_in_path(&name) {
                        eprintln!("hsh: {name}: builtin in pipeline not supported");
                        return Err(ExitStatus::FAILURE);
                    }
                }

                let Some(c_args) = to_cstrings(&expanded.argv) else {
                    eprintln!("hsh: {name}: invalid argument");
                    return Err(ExitStatus::FAILURE);
                };
                legs.push((ChildTask::Exec { argv: c_args, name }, resolved));
            }
            Command::Compound {
                command,
                redirections,
            } => {
                let resolved = match redir::resolve_all(env, redirections) {
                    Ok(resolved) => resolved,
                    Err(error) => {
                        eprintln!("hsh: {error}");
                        return Err(ExitStatus::FAILURE);
                    }
                };
                legs.push((
                    ChildTask::Run(Box::new(move |env: &mut Env| {
                        match execute_compound_command(env, command) {
                            Ok(status) => status,
                            Err(Divert::Exit(status)) => status,
                        }
                    })),
                    resolved,
                ));
            }
        }
    }
    Ok(legs)
}

/// Forks every leg, wiring pipes between adjacent ones.
///
/// With `foreground` set, the first child's process group becomes the
/// target for forwarded terminal signals (the caller clears it after
/// reaping).
fn spawn_legs(
    env: &mut Env,
    legs: Vec<(ChildTask<'_>, Vec<ResolvedRedir>)>,
    foreground: bool,
) -> Result<Vec<Pid>, ExitStatus> {
    let n = legs.len();
    let mut pipes: Vec<(Option<FdHandle>, Option<FdHandle>)> = Vec::with_capacity(n.saturating_sub(1));
    for _ in 1..n {
        match system::pipe() {
            Ok((read_end, write_end)) => pipes.push((Some(read_end), Some(write_end))),
            Err(errno) => {
                eprintln!("hsh: pipe: {}", errno.desc());
                return Err(ExitStatus::FAILURE);
            }
        }
    }

    let mut pids = Vec::with_capacity(n);
    let mut pgid = None;
    for (i, (task, resolved)) in legs.into_iter().enumerate() {
        let stdin = (i > 0).then(|| pipes[i - 1].0.as_ref().unwrap().raw());
        let stdout = (i + 1 < n).then(|| pipes[i].1.as_ref().unwrap().raw());
        let close_in_child: Vec<RawFd> = pipes
            .iter()
            .flat_map(|(r, w)| [r.as_ref(), w.as_ref()])
            .flatten()
            .map(FdHandle::raw)
            .filter(|&fd| stdin != Some(fd) && stdout != Some(fd))
            .collect();

        match fork_child(env, pgid, stdin, stdout, &close_in_child, &resolved, task) {
            Ok(pid) => {
                if pgid.is_none() {
                    pgid = Some(pid);
                    if foreground {
                        signal::set_foreground_pgid(pid);
                    }
                }
                pids.push(pid);
            }
            Err(errno) => {
                eprintln!("hsh: fork: {}", errno.desc());
                for &pid in &pids {
                    let _ = system::kill(pid, Signal::SIGTERM);
                }
                if foreground {
                    signal::clear_foreground_pgid();
                }
                return Err(ExitStatus::FAILURE);
            }
        }

        // The parent is done with the write end child i inherited and,
        // now that child i is running, with the read end feeding it.
        if i > 0 {
            pipes[i - 1].0 = None;
        }
        if i + 1 < n {
            pipes[i].1 = None;
        }
        drop(resolved);
    }
    drop(pipes);
    Ok(pids)
}

/// Forks one child and sets it up.
///
/// In the child: signal dispositions are restored, the process joins
/// the pipeline's process group, pipe ends are wired, leftover pipe fds
/// are closed, redirections are applied on top, and the task runs. The
/// child never returns.
fn fork_child(
    env: &mut Env,
    pgid: Option<Pid>,
    stdin: Option<RawFd>,
    stdout: Option<RawFd>,
    close_in_child: &[RawFd],
    resolved: &[ResolvedRedir],
    task: ChildTask<'_>,
) -> Result<Pid, Errno> {
    match system::fork()? {
        ForkResult::Parent { child } => {
            // Both sides call setpgid so neither loses the race.
            let _ = system::setpgid(child, pgid.unwrap_or(child));
            Ok(child)
        }
        ForkResult::Child => {
            signal::restore_defaults();
            let zero = Pid::from_raw(0);
            let _ = system::setpgid(zero, pgid.unwrap_or(zero));

            if let Some(fd) = stdin {
                if system::dup2(fd, 0).is_err() {
                    system::exit_process(126);
                }
                system::close(fd);
            }
            if let Some(fd) = stdout {
                if system::dup2(fd, 1).is_err() {
                    system::exit_process(126);
                }
                system::close(fd);
            }
            for &fd in close_in_child {
                system::close(fd);
            }

            // Redirections override the pipe wiring.
            if let Err(error) = redir::apply(resolved) {
                eprintln!("hsh: {error}");
                system::exit_process(1);
            }

            match task {
                ChildTask::Exec { argv, name } => {
                    let errno = system::execvp(&argv);
                    if errno == Errno::ENOENT {
                        eprintln!("hsh: {name}: command not found");
                        system::exit_process(127);
                    } else {
                        eprintln!("hsh: {name}: {}", errno.desc());
                        system::exit_process(126);
                    }
                }
                ChildTask::Run(body) => {
                    let status = body(env);
                    system::exit_process(status.0);
                }
            }
        }
    }
}

/// Awaits one child, handling stops.
///
/// A child stopped by a signal is entered into the job table and
/// reported; its status is `128 + signal`.
fn wait_child(env: &mut Env, pid: Pid, name: &str) -> ExitStatus {
    loop {
        match system::wait_for_untraced(pid) {
            Ok(WaitStatus::Stopped(_, sig)) => {
                let id = env.jobs.add(Job {
                    pid,
                    name: name.to_string(),
                    state: JobState::Stopped,
                });
                eprintln!("[{id}]  Stopped {name}");
                return ExitStatus::from_signal(sig);
            }
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => {
                return status.into();
            }
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                eprintln!("hsh: waitpid: {}", errno.desc());
                return ExitStatus::FAILURE;
            }
        }
    }
}

/// Computes a pipeline's exit status from its commands' statuses.
pub(crate) fn overall_status(pipefail: bool, statuses: &[ExitStatus]) -> ExitStatus {
    if pipefail {
        statuses
            .iter()
            .rev()
            .find(|status| !status.is_successful())
            .copied()
            .unwrap_or(ExitStatus::SUCCESS)
    } else {
        statuses.last().copied().unwrap_or(ExitStatus::SUCCESS)
    }
}

fn to_cstrings(argv: &[String]) -> Option<Vec<CString>> {
    argv.iter()
        .map(|arg| CString::new(arg.as_str()).ok())
        .collect()
}

/// Tests whether `execvp` would find an executable for the name.
fn found_in_path(name: &str) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let executable = |path: &std::path::Path| {
        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    };

    if name.contains('/') {
        return executable(std::path::Path::new(name));
    }
    let Ok(path) = std::env::var("PATH") else {
        return false;
    };
    path.split(':')
        .filter(|dir| !dir.is_empty())
        .any(|dir| executable(&std::path::Path::new(dir).join(name)))
}
