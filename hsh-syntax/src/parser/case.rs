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

//! Syntax parser for the case command

use super::simple_command::is_word_in_context;
use super::{Parser, Result, SyntaxError};
use crate::syntax::{CaseClause, CaseStatement, CompoundCommand};
use crate::token::{Keyword, TokenKind};

impl Parser<'_> {
    /// Parses a `case` command. The current token is the `case` keyword.
    pub(crate) fn case_clause(&mut self) -> Result<CompoundCommand> {
        self.take()?; // `case`

        let token = self.peek()?;
        if !token.kind.is_word_like() {
            return Err(self.error(SyntaxError::UnexpectedToken(token.text.clone()), &token));
        }
        let expression = Self::word_from(self.take()?);

        self.skip_newlines()?;
        self.expect_keyword(Keyword::In, SyntaxError::MissingIn)?;
        self.skip_newlines()?;

        let mut clauses = Vec::new();
        loop {
            if self.take_keyword(Keyword::Esac)? {
                break;
            }
            if self.peek()?.kind == TokenKind::EndOfFile {
                let token = self.peek()?;
                return Err(self.error(SyntaxError::MissingEsac, &token));
            }

            // The opening parenthesis before the pattern list is optional.
            if self.peek()?.kind == TokenKind::LParen {
                self.take()?;
            }

            let mut patterns = Vec::new();
            loop {
                let token = self.peek()?;
                if !is_word_in_context(token.kind) {
                    return Err(self.error(SyntaxError::EmptyCasePattern, &token));
                }
                patterns.push(Self::word_from(self.take()?));
                if self.peek()?.kind == TokenKind::Pipe {
                    self.take()?;
                } else {
                    break;
                }
            }

            let token = self.peek()?;
            if token.kind != TokenKind::RParen {
                return Err(self.error(SyntaxError::MissingCaseParen, &token));
            }
            self.take()?;

            let body = self.compound_list()?;
            clauses.push(CaseClause { patterns, body });

            let token = self.peek()?;
            match token.kind {
                TokenKind::DSemi => {
                    self.take()?;
                    self.skip_newlines()?;
                }
                TokenKind::Keyword(Keyword::Esac) => {
                    self.take()?;
                    break;
                }
                _ => return Err(self.error(SyntaxError::MissingEsac, &token)),
            }
        }

        Ok(CompoundCommand::Case(CaseStatement {
            expression,
            clauses,
        }))
    }
}
