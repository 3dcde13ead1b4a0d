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

//! Fg built-in
//!
//! # Synopsis
//!
//! ```sh
//! fg [%id]
//! ```
//!
//! # Description
//!
//! Brings a background job to the foreground: a stopped job is
//! continued with SIGCONT, terminal signals are forwarded to it, and
//! the interpreter waits for it to finish or stop again. The job's exit
//! status becomes `$?`. Without an operand the most recent job is used.

use crate::{print_err, print_out, resolve_job_id, Result};
use hsh_env::job::JobState;
use hsh_env::semantics::ExitStatus;
use hsh_env::system::{self, signal};
use hsh_env::Env;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;

pub fn main(env: &mut Env, args: &[String]) -> Result {
    let id = match resolve_job_id(env, args, "fg") {
        Ok(id) => id,
        Err(status) => return status.into(),
    };
    let job = env.jobs.get(id).unwrap();
    let pid = job.pid;
    let name = job.name.clone();
    print_out(&name);

    if job.state == JobState::Stopped {
        if let Err(errno) = system::kill(pid, Signal::SIGCONT) {
            print_err(format!("fg: kill: {}", errno.desc()));
            return ExitStatus::FAILURE.into();
        }
        env.jobs.get_mut(id).unwrap().state = JobState::Running;
    }

    signal::set_foreground_pgid(pid);
    let status = loop {
        match system::wait_for_untraced(pid) {
            Ok(WaitStatus::Stopped(_, signal)) => {
                env.jobs.get_mut(id).unwrap().state = JobState::Stopped;
                print_out(format!("[{id}]  Stopped {name}"));
                break ExitStatus::from_signal(signal);
            }
            Ok(WaitStatus::Continued(_)) => continue,
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => {
                env.jobs.remove(id);
                break ExitStatus::from(status);
            }
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                print_err(format!("fg: waitpid: {}", errno.desc()));
                env.jobs.remove(id);
                break ExitStatus::FAILURE;
            }
        }
    };
    signal::clear_foreground_pgid();

    status.into()
}
