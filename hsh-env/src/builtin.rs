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

//! Type definitions for built-in utilities
//!
//! The registry lives in the [`Env`](crate::Env) so that builtin lookup
//! is an ordinary map access. Implementations are registered at startup;
//! this crate only defines their shape.

use crate::semantics::{Divert, ExitStatus};
use crate::Env;
use std::fmt;

/// Result of a built-in execution
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Result {
    /// Exit status, which becomes `$?`
    pub exit_status: ExitStatus,
    /// Optional request to leave the read-eval loop
    pub divert: Option<Divert>,
}

impl From<ExitStatus> for Result {
    fn from(exit_status: ExitStatus) -> Result {
        Result {
            exit_status,
            divert: None,
        }
    }
}

/// Type of functions that implement a built-in
///
/// The arguments do not include the command name.
pub type Main = fn(&mut Env, &[String]) -> Result;

/// Built-in utility definition
#[derive(Clone, Copy)]
pub struct Builtin {
    /// Function that executes the built-in
    pub execute: Main,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").finish_non_exhaustive()
    }
}
