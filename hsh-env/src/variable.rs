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

//! Shell variables
//!
//! A [`VariableSet`] layers shell-local variables over the process
//! environment. Exported variables live in the process environment so
//! that spawned commands and forked subshells inherit them without any
//! further bookkeeping; shell-local variables shadow them on lookup.

use std::collections::HashMap;

/// Well-known variable names
pub const HOME: &str = "HOME";
pub const PWD: &str = "PWD";
pub const OLDPWD: &str = "OLDPWD";
pub const USER: &str = "USER";
pub const SHELL: &str = "SHELL";

/// Tests whether a string is a valid variable name.
pub fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(c) if c.is_ascii_alphabetic() || c == b'_' => {}
        _ => return false,
    }
    bytes.all(|c| c.is_ascii_alphanumeric() || c == b'_')
}

/// Collection of shell variables layered over the process environment
#[derive(Clone, Debug, Default)]
pub struct VariableSet {
    locals: HashMap<String, String>,
}

impl VariableSet {
    pub fn new() -> VariableSet {
        VariableSet::default()
    }

    /// Returns the value of a variable.
    ///
    /// Shell-local variables take precedence over the process
    /// environment.
    pub fn get(&self, name: &str) -> Option<String> {
        match self.locals.get(name) {
            Some(value) => Some(value.clone()),
            None => std::env::var(name).ok(),
        }
    }

    /// Tests whether a variable is set at all.
    pub fn is_set(&self, name: &str) -> bool {
        self.locals.contains_key(name) || std::env::var_os(name).is_some()
    }

    /// Assigns a variable.
    ///
    /// An assignment to a variable that is already exported (and not
    /// shadowed by a local) updates the process environment so children
    /// keep seeing the new value; any other assignment stays shell-local.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if !self.locals.contains_key(name) && std::env::var_os(name).is_some() {
            std::env::set_var(name, value);
        } else {
            self.locals.insert(name.to_string(), value);
        }
    }

    /// Exports a variable to the process environment.
    ///
    /// The current value is used when `value` is `None`; an entirely
    /// unset variable exports as empty.
    pub fn export(&mut self, name: &str, value: Option<String>) {
        let value = value
            .or_else(|| self.get(name))
            .unwrap_or_default();
        self.locals.remove(name);
        std::env::set_var(name, value);
    }

    /// Tests whether a variable is in the process environment.
    pub fn is_exported(&self, name: &str) -> bool {
        !self.locals.contains_key(name) && std::env::var_os(name).is_some()
    }

    /// Removes a variable from both layers.
    pub fn unset(&mut self, name: &str) {
        self.locals.remove(name);
        std::env::remove_var(name);
    }

    /// Returns all variables, locals shadowing the environment.
    pub fn all(&self) -> Vec<(String, String)> {
        let mut result: Vec<(String, String)> = self
            .locals
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (name, value) in std::env::vars() {
            if !self.locals.contains_key(&name) {
                result.push((name, value));
            }
        }
        result
    }
}
