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

//! Syntax parser for the if command

use super::{Parser, Result, SyntaxError};
use crate::syntax::{CompoundCommand, ConditionalStatement};
use crate::token::Keyword;

impl Parser<'_> {
    /// Parses an `if` command. The current token is the `if` keyword.
    pub(crate) fn if_clause(&mut self) -> Result<CompoundCommand> {
        self.take()?; // `if`

        let condition = self.compound_list()?;
        self.require_nonempty(&condition)?;
        self.expect_keyword(Keyword::Then, SyntaxError::MissingThen)?;
        let then_body = self.compound_list()?;
        self.require_nonempty(&then_body)?;

        let mut elif_clauses = Vec::new();
        while self.take_keyword(Keyword::Elif)? {
            let condition = self.compound_list()?;
            self.require_nonempty(&condition)?;
            self.expect_keyword(Keyword::Then, SyntaxError::MissingThen)?;
            let body = self.compound_list()?;
            self.require_nonempty(&body)?;
            elif_clauses.push((condition, body));
        }

        let else_body = if self.take_keyword(Keyword::Else)? {
            let body = self.compound_list()?;
            self.require_nonempty(&body)?;
            Some(body)
        } else {
            None
        };

        self.expect_keyword(Keyword::Fi, SyntaxError::MissingFi)?;

        Ok(CompoundCommand::If(ConditionalStatement {
            condition,
            then_body,
            elif_clauses,
            else_body,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::ErrorCause;
    use super::*;
    use crate::syntax::{AndOr, Command, CompoundStatement};
    use assert_matches::assert_matches;

    fn parse_if(src: &str) -> ConditionalStatement {
        let mut list: CompoundStatement = src.parse().unwrap();
        assert_eq!(list.statements.len(), 1);
        let AndOr::Pipeline(mut pipeline) = list.statements.pop().unwrap() else {
            panic!("not a pipeline")
        };
        let Command::Compound {
            command: CompoundCommand::If(statement),
            ..
        } = pipeline.commands.pop().unwrap()
        else {
            panic!("not an if command")
        };
        statement
    }

    #[test]
    fn if_then_fi() {
        let statement = parse_if("if true; then echo y; fi");
        assert_eq!(statement.condition.to_string(), "true");
        assert_eq!(statement.then_body.to_string(), "echo y");
        assert_eq!(statement.elif_clauses.len(), 0);
        assert_eq!(statement.else_body, None);
    }

    #[test]
    fn if_then_else() {
        let statement = parse_if("if true; then echo y; else echo n; fi");
        assert_eq!(statement.else_body.unwrap().to_string(), "echo n");
    }

    #[test]
    fn elif_chain() {
        let statement = parse_if("if a; then x; elif b; then y; elif c; then z; else w; fi");
        assert_eq!(statement.elif_clauses.len(), 2);
        assert_eq!(statement.elif_clauses[0].0.to_string(), "b");
        assert_eq!(statement.elif_clauses[0].1.to_string(), "y");
        assert_eq!(statement.elif_clauses[1].0.to_string(), "c");
        assert_eq!(statement.elif_clauses[1].1.to_string(), "z");
        assert_eq!(statement.else_body.unwrap().to_string(), "w");
    }

    #[test]
    fn newlines_instead_of_semicolons() {
        let statement = parse_if("if true\nthen\necho y\nfi");
        assert_eq!(statement.condition.to_string(), "true");
        assert_eq!(statement.then_body.to_string(), "echo y");
    }

    #[test]
    fn multi_command_condition() {
        let statement = parse_if("if a; b; then c; fi");
        assert_eq!(statement.condition.statements.len(), 2);
    }

    #[test]
    fn missing_then() {
        let error = "if true; fi".parse::<CompoundStatement>().unwrap_err();
        assert_eq!(error.cause, ErrorCause::Syntax(SyntaxError::MissingThen));
    }

    #[test]
    fn missing_fi() {
        let error = "if true; then x;".parse::<CompoundStatement>().unwrap_err();
        assert_eq!(error.cause, ErrorCause::Syntax(SyntaxError::MissingFi));
    }

    #[test]
    fn empty_condition_is_an_error() {
        let error = "if ; then x; fi".parse::<CompoundStatement>().unwrap_err();
        assert_matches!(
            error.cause,
            ErrorCause::Syntax(SyntaxError::UnexpectedToken(t)) if t == "then"
        );
    }

    #[test]
    fn nested_if() {
        let statement = parse_if("if a; then if b; then c; fi; fi");
        assert_eq!(statement.then_body.to_string(), "if b; then c; fi");
    }
}
