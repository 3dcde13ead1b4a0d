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

//! Bg built-in
//!
//! Resumes a stopped job in the background with SIGCONT, without
//! waiting for it.

use crate::{print_err, print_out, resolve_job_id, Result};
use hsh_env::job::JobState;
use hsh_env::semantics::ExitStatus;
use hsh_env::system;
use hsh_env::Env;
use nix::sys::signal::Signal;

pub fn main(env: &mut Env, args: &[String]) -> Result {
    let id = match resolve_job_id(env, args, "bg") {
        Ok(id) => id,
        Err(status) => return status.into(),
    };
    let job = env.jobs.get(id).unwrap();

    if job.state != JobState::Stopped {
        print_err(format!("bg: job %{id} already in background"));
        return ExitStatus::SUCCESS.into();
    }

    if let Err(errno) = system::kill(job.pid, Signal::SIGCONT) {
        print_err(format!("bg: kill: {}", errno.desc()));
        return ExitStatus::FAILURE.into();
    }
    let job = env.jobs.get_mut(id).unwrap();
    job.state = JobState::Running;
    print_out(format!("[{}]  {} &", id, job.name));
    ExitStatus::SUCCESS.into()
}
