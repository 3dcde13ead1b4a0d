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

//! Shell command language syntax
//!
//! This crate turns shell source code into an abstract syntax tree in two
//! stages. The [lexer](lex::Lexer) converts a byte stream into a stream of
//! [tokens](token::Token), keeping composite words (quoted segments and
//! embedded expansions) together as single tokens. The
//! [parser](parser::Parser) consumes the token stream by recursive descent
//! and produces the AST types in [`syntax`].
//!
//! Most AST types implement `Display`, rendering single-line source code,
//! and the top-level [`CompoundStatement`](syntax::CompoundStatement)
//! implements `FromStr` so a full command line can be parsed with
//! `str::parse`.

pub mod lex;
pub mod parser;
pub mod syntax;
pub mod token;
