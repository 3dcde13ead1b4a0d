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

//! Syntax parser for while, until, and for loops

use super::simple_command::is_word_in_context;
use super::{Parser, Result, SyntaxError};
use crate::syntax::{CompoundCommand, LoopKind, LoopStatement};
use crate::token::{Keyword, TokenKind};

impl Parser<'_> {
    /// Parses a `while` or `until` command. The current token is the
    /// keyword.
    pub(crate) fn loop_clause(&mut self, keyword: Keyword) -> Result<CompoundCommand> {
        self.take()?; // `while` or `until`

        let condition = self.compound_list()?;
        self.require_nonempty(&condition)?;
        self.expect_keyword(Keyword::Do, SyntaxError::MissingDo)?;
        let body = self.compound_list()?;
        self.require_nonempty(&body)?;
        self.expect_keyword(Keyword::Done, SyntaxError::MissingDone)?;

        let kind = match keyword {
            Keyword::While => LoopKind::While,
            Keyword::Until => LoopKind::Until,
            _ => unreachable!("not a loop keyword: {keyword:?}"),
        };
        Ok(CompoundCommand::Loop(LoopStatement {
            kind,
            condition: Some(condition),
            variable: None,
            items: Vec::new(),
            has_in: false,
            body,
        }))
    }

    /// Parses a `for` command. The current token is the `for` keyword.
    ///
    /// The `in` clause is optional; without it the loop iterates over the
    /// positional parameters.
    pub(crate) fn for_clause(&mut self) -> Result<CompoundCommand> {
        self.take()?; // `for`

        let token = self.peek()?;
        if !token.kind.is_word_like() {
            return Err(self.error(SyntaxError::MissingForVariable, &token));
        }
        let variable = Self::word_from(self.take()?);

        self.skip_newlines()?;

        let mut items = Vec::new();
        let has_in = self.take_keyword(Keyword::In)?;
        if has_in {
            // The word list runs to the next `;` or newline; reserved
            // words in it are ordinary words.
            loop {
                let token = self.peek()?;
                if !is_word_in_context(token.kind) {
                    break;
                }
                items.push(Self::word_from(self.take()?));
            }
        }

        // The word list ends at `;` or a newline before `do`.
        if self.peek()?.kind == TokenKind::Semicolon {
            self.take()?;
        }
        self.skip_newlines()?;
        self.expect_keyword(Keyword::Do, SyntaxError::MissingDo)?;
        let body = self.compound_list()?;
        self.require_nonempty(&body)?;
        self.expect_keyword(Keyword::Done, SyntaxError::MissingDone)?;

        Ok(CompoundCommand::Loop(LoopStatement {
            kind: LoopKind::For,
            condition: None,
            variable: Some(variable),
            items,
            has_in,
            body,
        }))
    }
}
