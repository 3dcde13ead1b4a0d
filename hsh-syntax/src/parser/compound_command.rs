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

//! Syntax parser for commands, groups, and subshells

use super::{Parser, Result, SyntaxError};
use crate::syntax::{Command, CompoundCommand, CompoundStatement};
use crate::token::{Keyword, TokenKind};

impl Parser<'_> {
    /// Parses a command: a compound command with optional trailing
    /// redirections, or a simple command.
    ///
    /// Returns `Ok(None)` without consuming anything when the current
    /// token cannot start a command.
    pub fn command(&mut self) -> Result<Option<Command>> {
        let token = self.peek()?;
        let compound = match token.kind {
            TokenKind::LParen => self.subshell()?,
            TokenKind::LBrace => self.group()?,
            TokenKind::Keyword(Keyword::If) => self.if_clause()?,
            TokenKind::Keyword(Keyword::While) => self.loop_clause(Keyword::While)?,
            TokenKind::Keyword(Keyword::Until) => self.loop_clause(Keyword::Until)?,
            TokenKind::Keyword(Keyword::For) => self.for_clause()?,
            TokenKind::Keyword(Keyword::Case) => self.case_clause()?,
            TokenKind::Error => {
                return Err(
                    self.error(SyntaxError::UnexpectedToken(token.text.clone()), &token)
                );
            }
            _ => return Ok(self.simple_command()?.map(Command::Simple)),
        };

        let redirections = self.trailing_redirections()?;
        Ok(Some(Command::Compound {
            command: compound,
            redirections,
        }))
    }

    /// Requires the list just parsed for a compound command to be
    /// non-empty.
    pub(crate) fn require_nonempty(&mut self, body: &CompoundStatement) -> Result<()> {
        if body.statements.is_empty() {
            let token = self.peek()?;
            Err(self.error(SyntaxError::UnexpectedToken(token.text.clone()), &token))
        } else {
            Ok(())
        }
    }

    /// Parses a `(…)` subshell. The current token is the `(`.
    fn subshell(&mut self) -> Result<CompoundCommand> {
        let open = self.take()?;
        let body = self.compound_list()?;
        self.require_nonempty(&body)?;
        let token = self.peek()?;
        if token.kind == TokenKind::RParen {
            self.take()?;
            Ok(CompoundCommand::Group {
                body,
                is_subshell: true,
            })
        } else {
            Err(self.error(SyntaxError::UnclosedSubshell, &open))
        }
    }

    /// Parses a `{ … }` group. The current token is the `{`.
    fn group(&mut self) -> Result<CompoundCommand> {
        let open = self.take()?;
        let body = self.compound_list()?;
        self.require_nonempty(&body)?;
        let token = self.peek()?;
        if token.kind == TokenKind::RBrace {
            self.take()?;
            Ok(CompoundCommand::Group {
                body,
                is_subshell: false,
            })
        } else {
            Err(self.error(SyntaxError::UnclosedGroup, &open))
        }
    }
}
