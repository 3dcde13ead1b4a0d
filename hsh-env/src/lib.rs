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

//! Shell execution environment
//!
//! [`Env`] carries everything a command needs to run: variables,
//! aliases, options, the job table, the builtin registry, positional
//! parameters, and the last exit status. There are no mutable globals;
//! the environment is passed down the execution recursion explicitly, so
//! a forked subshell simply keeps working on its (process-copied) `Env`
//! and the parent never observes its mutations.

pub mod alias;
pub mod builtin;
pub mod job;
pub mod option;
pub mod semantics;
pub mod system;
pub mod variable;

use alias::AliasSet;
use builtin::Builtin;
use job::JobSet;
use nix::unistd::Pid;
use option::OptionSet;
use semantics::ExitStatus;
use std::collections::HashMap;
use variable::VariableSet;

/// Whole execution environment of the interpreter
#[derive(Debug)]
pub struct Env {
    /// Shell variables layered over the process environment
    pub variables: VariableSet,
    /// Alias definitions
    pub aliases: AliasSet,
    /// Shell options
    pub options: OptionSet,
    /// Background job table
    pub jobs: JobSet,
    /// Built-in utilities, registered at startup
    pub builtins: HashMap<&'static str, Builtin>,
    /// Exit status of the last command (`$?`)
    pub exit_status: ExitStatus,
    /// Positional parameters (`$1` and up)
    pub positional_params: Vec<String>,
    /// Name the interpreter was invoked as (`$0`)
    pub script_name: String,
    /// Process ID of the interpreter (`$$`)
    pub shell_pid: Pid,
    cwd_cache: Option<String>,
}

impl Env {
    /// Creates an environment for the current process.
    pub fn new() -> Env {
        Env {
            variables: VariableSet::new(),
            aliases: AliasSet::new(),
            options: OptionSet::new(),
            jobs: JobSet::new(),
            builtins: HashMap::new(),
            exit_status: ExitStatus::SUCCESS,
            positional_params: Vec::new(),
            script_name: "hsh".to_string(),
            shell_pid: system::getpid(),
            cwd_cache: None,
        }
    }

    /// Computes the value of a special parameter.
    ///
    /// `name` is the parameter text without the `$`. Returns `None` when
    /// the name is not a special or positional parameter.
    pub fn special_parameter(&self, name: &str) -> Option<String> {
        match name {
            "?" => return Some(self.exit_status.to_string()),
            "$" => return Some(self.shell_pid.as_raw().to_string()),
            "!" => {
                let value = match self.jobs.last_async_pid() {
                    Some(pid) => pid.as_raw().to_string(),
                    None => String::new(),
                };
                return Some(value);
            }
            "#" => return Some(self.positional_params.len().to_string()),
            "*" | "@" => return Some(self.positional_params.join(" ")),
            "0" => return Some(self.script_name.clone()),
            _ => {}
        }

        // Positional parameters: any all-digit name.
        if !name.is_empty() && name.bytes().all(|c| c.is_ascii_digit()) {
            let index: usize = name.parse().ok()?;
            let value = if index == 0 {
                self.script_name.clone()
            } else {
                self.positional_params
                    .get(index - 1)
                    .cloned()
                    .unwrap_or_default()
            };
            return Some(value);
        }

        None
    }

    /// Returns the current working directory, cached until [`set_cwd`]
    /// invalidates it.
    ///
    /// [`set_cwd`]: Self::set_cwd
    pub fn get_cwd(&mut self) -> String {
        if self.cwd_cache.is_none() {
            self.cwd_cache = Some(system::getcwd().unwrap_or_else(|_| "/".to_string()));
        }
        self.cwd_cache.clone().unwrap()
    }

    /// Changes the working directory and invalidates the cache.
    pub fn set_cwd(&mut self, path: &str) -> Result<(), nix::errno::Errno> {
        system::chdir(path)?;
        self.cwd_cache = None;
        Ok(())
    }
}

impl Default for Env {
    fn default() -> Env {
        Env::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Job;

    #[test]
    fn exit_status_parameter() {
        let mut env = Env::new();
        env.exit_status = ExitStatus(42);
        assert_eq!(env.special_parameter("?"), Some("42".to_string()));
    }

    #[test]
    fn shell_pid_parameter() {
        let env = Env::new();
        let pid = env.special_parameter("$").unwrap();
        assert_eq!(pid, system::getpid().as_raw().to_string());
    }

    #[test]
    fn last_async_pid_parameter() {
        let mut env = Env::new();
        assert_eq!(env.special_parameter("!"), Some(String::new()));
        env.jobs.add(Job::new(Pid::from_raw(4321), "sleep"));
        assert_eq!(env.special_parameter("!"), Some("4321".to_string()));
    }

    #[test]
    fn positional_parameters() {
        let mut env = Env::new();
        env.script_name = "hsh".to_string();
        env.positional_params = vec!["one".to_string(), "two".to_string()];
        assert_eq!(env.special_parameter("#"), Some("2".to_string()));
        assert_eq!(env.special_parameter("*"), Some("one two".to_string()));
        assert_eq!(env.special_parameter("@"), Some("one two".to_string()));
        assert_eq!(env.special_parameter("0"), Some("hsh".to_string()));
        assert_eq!(env.special_parameter("1"), Some("one".to_string()));
        assert_eq!(env.special_parameter("2"), Some("two".to_string()));
        assert_eq!(env.special_parameter("3"), Some(String::new()));
    }

    #[test]
    fn ordinary_names_are_not_special() {
        let env = Env::new();
        assert_eq!(env.special_parameter("HOME"), None);
        assert_eq!(env.special_parameter("x1"), None);
        assert_eq!(env.special_parameter(""), None);
    }

    #[test]
    fn cwd_cache_round_trip() {
        let mut env = Env::new();
        let cwd = env.get_cwd();
        assert!(cwd.starts_with('/'));
        // Cached value is stable.
        assert_eq!(env.get_cwd(), cwd);
    }
}
