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

//! Interface between the arithmetic evaluator and the shell context

use std::collections::HashMap;

/// Provider of variable values for arithmetic evaluation
///
/// The evaluator resolves identifiers through this trait so that it does
/// not depend on any particular shell context representation. Values are
/// returned owned because a context may have to synthesize them (for
/// example from the process environment). A `HashMap<String, String>`
/// implements the trait for use in tests.
pub trait Env {
    /// Returns the value of the named variable, if set.
    fn get_variable(&self, name: &str) -> Option<String>;
}

impl Env for HashMap<String, String> {
    fn get_variable(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: Env> Env for &T {
    fn get_variable(&self, name: &str) -> Option<String> {
        (**self).get_variable(name)
    }
}
