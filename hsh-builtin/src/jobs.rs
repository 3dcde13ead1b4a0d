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

//! Jobs built-in
//!
//! Lists the job table as `[id]  State command` lines.

use crate::{print_err, print_out, Result};
use hsh_env::semantics::ExitStatus;
use hsh_env::Env;

pub fn main(env: &mut Env, args: &[String]) -> Result {
    if !args.is_empty() {
        print_err("jobs: too many arguments");
        return ExitStatus::FAILURE.into();
    }

    for (id, job) in env.jobs.iter() {
        print_out(format!("[{}]  {} {}", id, job.state, job.name));
    }
    ExitStatus::SUCCESS.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsh_env::job::Job;
    use nix::unistd::Pid;

    #[test]
    fn empty_table_succeeds() {
        let mut env = Env::new();
        assert_eq!(main(&mut env, &[]).exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn listing_succeeds_with_jobs() {
        let mut env = Env::new();
        env.jobs.add(Job::new(Pid::from_raw(100), "sleep 10"));
        assert_eq!(main(&mut env, &[]).exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn arguments_are_an_error() {
        let mut env = Env::new();
        let result = main(&mut env, &["%1".to_string()]);
        assert_eq!(result.exit_status, ExitStatus::FAILURE);
    }
}
