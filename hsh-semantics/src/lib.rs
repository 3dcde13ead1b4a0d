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

//! Shell language semantics
//!
//! This crate implements the two halves of command interpretation that
//! sit between the parser and the operating system:
//!
//! - [`expansion`] turns a syntactic [`Word`](hsh_syntax::syntax::Word)
//!   into zero or more argument strings, applying tilde, parameter,
//!   command substitution, arithmetic, brace, and pathname expansion in
//!   that order while honoring quoting.
//! - [`command`] executes AST nodes: it drives control-flow constructs
//!   in-process and hands pipelines to a fork-based runner with explicit
//!   file-descriptor wiring.
//!
//! Execution returns `Result<ExitStatus, Divert>`; a
//! [`Divert`](hsh_env::semantics::Divert) bubbles an `exit` request up
//! to the read-eval loop without unwinding through it.

pub mod command;
pub mod expansion;
pub mod redir;

/// Result of executing an AST node
pub type Result<T> = std::result::Result<T, hsh_env::semantics::Divert>;
