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

//! Syntax parser for pipelines and and-or chains

use super::{Parser, Result, SyntaxError};
use crate::syntax::{AndOr, AndOrOp, LogicalExpression, Pipeline};
use crate::token::TokenKind;

impl Parser<'_> {
    /// Parses a pipeline.
    ///
    /// If there is no command at the current position, this function
    /// returns `Ok(None)` without consuming anything.
    pub fn pipeline(&mut self) -> Result<Option<Pipeline>> {
        let Some(first) = self.command()? else {
            return Ok(None);
        };

        let mut commands = vec![first];
        while self.peek()?.kind == TokenKind::Pipe {
            let bar = self.take()?;
            self.skip_newlines()?;
            match self.command()? {
                Some(next) => commands.push(next),
                None => return Err(self.error(SyntaxError::MissingCommandAfterBar, &bar)),
            }
        }

        Ok(Some(Pipeline {
            commands,
            background: false,
        }))
    }

    /// Parses an and-or chain: pipelines joined by `&&` and `||`.
    ///
    /// Both operators share one precedence level and associate to the
    /// left.
    pub fn and_or(&mut self) -> Result<Option<AndOr>> {
        let Some(first) = self.pipeline()? else {
            return Ok(None);
        };

        let mut result = AndOr::Pipeline(first);
        loop {
            let op = match self.peek()?.kind {
                TokenKind::AndAnd => AndOrOp::And,
                TokenKind::OrOr => AndOrOp::Or,
                _ => break,
            };
            let op_token = self.take()?;
            self.skip_newlines()?;
            match self.pipeline()? {
                Some(next) => {
                    result = AndOr::Logical(Box::new(LogicalExpression {
                        left: result,
                        op,
                        right: AndOr::Pipeline(next),
                    }));
                }
                None => {
                    let cause = match op {
                        AndOrOp::And => SyntaxError::MissingCommandAfterAnd,
                        AndOrOp::Or => SyntaxError::MissingCommandAfterOr,
                    };
                    return Err(self.error(cause, &op_token));
                }
            }
        }
        Ok(Some(result))
    }
}
