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

//! Shell options
//!
//! Options are toggled with `set -o NAME` and `set +o NAME` and queried
//! with `set -o`.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Option names accepted by `set -o`
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum ShellOption {
    /// A pipeline's exit status is its rightmost non-zero component.
    Pipefail,
    /// Echo each command line to stderr before executing it.
    Verbose,
}

/// Current state of all shell options
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OptionSet {
    pub pipefail: bool,
    pub verbose: bool,
}

impl OptionSet {
    pub fn new() -> OptionSet {
        OptionSet::default()
    }

    /// Returns whether the given option is enabled.
    pub fn get(&self, option: ShellOption) -> bool {
        match option {
            ShellOption::Pipefail => self.pipefail,
            ShellOption::Verbose => self.verbose,
        }
    }

    /// Enables or disables the given option.
    pub fn set(&mut self, option: ShellOption, value: bool) {
        match option {
            ShellOption::Pipefail => self.pipefail = value,
            ShellOption::Verbose => self.verbose = value,
        }
    }

    /// Returns the state of every option, for `set -o` listings.
    pub fn all(&self) -> Vec<(ShellOption, bool)> {
        ShellOption::iter().map(|o| (o, self.get(o))).collect()
    }
}
