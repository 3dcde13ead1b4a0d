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

//! Alias definitions
//!
//! Alias values are stored as the raw replacement text; they are re-lexed
//! at use, not at definition.

use std::collections::HashMap;

/// Collection of alias definitions
#[derive(Clone, Debug, Default)]
pub struct AliasSet {
    aliases: HashMap<String, String>,
}

/// Maximum number of substitutions applied to the first word of a
/// command, to break alias cycles.
pub const MAX_EXPANSION_DEPTH: usize = 16;

impl AliasSet {
    pub fn new() -> AliasSet {
        AliasSet::default()
    }

    /// Defines or replaces an alias.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.aliases.insert(name.into(), value.into());
    }

    /// Returns the replacement text of an alias.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// Removes an alias. Returns false if it was not defined.
    pub fn remove(&mut self, name: &str) -> bool {
        self.aliases.remove(name).is_some()
    }

    /// Removes all aliases.
    pub fn clear(&mut self) {
        self.aliases.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Returns all definitions sorted by name.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut result: Vec<(&str, &str)> = self
            .aliases
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        result.sort_unstable_by_key(|&(name, _)| name);
        result
    }
}
