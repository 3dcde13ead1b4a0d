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

//! Types to handle command execution results

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use std::fmt;

/// Resultant status of command execution
///
/// The value is the low byte the process would pass to `exit`, except
/// that a process killed by signal S reports `128 + S`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExitStatus(pub i32);

impl ExitStatus {
    /// Status of a command that successfully completed
    pub const SUCCESS: ExitStatus = ExitStatus(0);

    /// Generic failure status
    pub const FAILURE: ExitStatus = ExitStatus(1);

    /// Status for a built-in usage error
    pub const ERROR: ExitStatus = ExitStatus(2);

    /// Status when a command was found but could not be executed
    pub const NOT_EXECUTABLE: ExitStatus = ExitStatus(126);

    /// Status when a command was not found
    pub const NOT_FOUND: ExitStatus = ExitStatus(127);

    /// Tests whether the status is zero.
    pub fn is_successful(self) -> bool {
        self.0 == 0
    }

    /// Status of a process killed by the given signal.
    pub fn from_signal(signal: Signal) -> ExitStatus {
        ExitStatus(128 + signal as i32)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i32> for ExitStatus {
    fn from(value: i32) -> ExitStatus {
        ExitStatus(value)
    }
}

impl From<WaitStatus> for ExitStatus {
    fn from(status: WaitStatus) -> ExitStatus {
        match status {
            WaitStatus::Exited(_, code) => ExitStatus(code),
            WaitStatus::Signaled(_, signal, _) => ExitStatus::from_signal(signal),
            WaitStatus::Stopped(_, signal) => ExitStatus::from_signal(signal),
            _ => ExitStatus::SUCCESS,
        }
    }
}

/// Request to deviate from the normal flow of execution
///
/// A built-in returns a divert to make the interpreter leave its
/// read-eval loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Divert {
    /// Terminate the interpreter with the given status.
    Exit(ExitStatus),
}
