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

//! Type definitions for job management
//!
//! A [`Job`] tracks one background pipeline through the process ID of
//! its primary (last) process. Job states move `Running → {Stopped,
//! Done, Terminated}`; state changes are driven by `waitpid` results fed
//! into [`JobSet::apply_wait_status`].

use crate::semantics::ExitStatus;
use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use slab::Slab;
use std::fmt;

/// State of a job
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobState {
    /// The job is running.
    Running,
    /// The job was stopped by a signal.
    Stopped,
    /// The job exited with the given status.
    Done(ExitStatus),
    /// The job was killed by the given signal.
    Terminated(Signal),
}

impl JobState {
    /// Tests whether the job has finished (exited or was killed).
    pub fn is_finished(self) -> bool {
        matches!(self, JobState::Done(_) | JobState::Terminated(_))
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Running => "Running".fmt(f),
            JobState::Stopped => "Stopped".fmt(f),
            JobState::Done(_) => "Done".fmt(f),
            JobState::Terminated(_) => "Terminated".fmt(f),
        }
    }
}

/// Set of processes executing a background pipeline
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    /// Process ID of the primary (last) process of the pipeline
    pub pid: Pid,
    /// String representation of the command
    pub name: String,
    /// Current state
    pub state: JobState,
}

impl Job {
    /// Creates a running job.
    pub fn new(pid: Pid, name: impl Into<String>) -> Job {
        Job {
            pid,
            name: name.into(),
            state: JobState::Running,
        }
    }

    /// Exit status of a finished job.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self.state {
            JobState::Done(status) => Some(status),
            JobState::Terminated(signal) => Some(ExitStatus::from_signal(signal)),
            _ => None,
        }
    }
}

/// Collection of jobs
///
/// Job IDs are small positive integers that stay stable for the lifetime
/// of the job and are reused after the job leaves the table.
#[derive(Clone, Debug, Default)]
pub struct JobSet {
    jobs: Slab<Job>,
    last_async_pid: Option<Pid>,
}

impl JobSet {
    pub fn new() -> JobSet {
        JobSet::default()
    }

    /// Adds a job, returning its job ID.
    pub fn add(&mut self, job: Job) -> usize {
        self.last_async_pid = Some(job.pid);
        self.jobs.insert(job) + 1
    }

    /// Returns the job with the given ID.
    pub fn get(&self, id: usize) -> Option<&Job> {
        id.checked_sub(1).and_then(|key| self.jobs.get(key))
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut Job> {
        id.checked_sub(1).and_then(|key| self.jobs.get_mut(key))
    }

    /// Removes the job with the given ID.
    pub fn remove(&mut self, id: usize) -> Option<Job> {
        let key = id.checked_sub(1)?;
        self.jobs.try_remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Iterates over jobs in job-ID order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Job)> {
        self.jobs.iter().map(|(key, job)| (key + 1, job))
    }

    /// Returns the ID of the most recently added job, which `fg` and
    /// `bg` operate on by default.
    pub fn newest_id(&self) -> Option<usize> {
        self.jobs.iter().map(|(key, _)| key + 1).max()
    }

    /// Finds the job running the given process.
    pub fn find_by_pid(&self, pid: Pid) -> Option<usize> {
        self.jobs
            .iter()
            .find(|(_, job)| job.pid == pid)
            .map(|(key, _)| key + 1)
    }

    /// Records a `waitpid` result against the matching job, if any.
    ///
    /// Returns the ID of the updated job.
    pub fn apply_wait_status(&mut self, status: WaitStatus) -> Option<usize> {
        let (pid, state) = match status {
            WaitStatus::Exited(pid, code) => (pid, JobState::Done(ExitStatus(code))),
            WaitStatus::Signaled(pid, signal, _) => (pid, JobState::Terminated(signal)),
            WaitStatus::Stopped(pid, _) => (pid, JobState::Stopped),
            WaitStatus::Continued(pid) => (pid, JobState::Running),
            _ => return None,
        };
        let id = self.find_by_pid(pid)?;
        self.get_mut(id).unwrap().state = state;
        Some(id)
    }

    /// Removes and returns all finished jobs, in job-ID order.
    pub fn take_finished(&mut self) -> Vec<(usize, Job)> {
        let ids: Vec<usize> = self
            .iter()
            .filter(|(_, job)| job.state.is_finished())
            .map(|(id, _)| id)
            .collect();
        ids.into_iter()
            .map(|id| (id, self.remove(id).unwrap()))
            .collect()
    }

    /// Process ID of the most recently started asynchronous command, for
    /// `$!`.
    pub fn last_async_pid(&self) -> Option<Pid> {
        self.last_async_pid
    }
}
