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

//! Shell command language abstract syntax trees
//!
//! The AST type that represents a whole command line is
//! [`CompoundStatement`], a sequence of [`AndOr`] items. An `AndOr` is
//! either a plain [`Pipeline`] or a [`LogicalExpression`] chaining
//! pipelines with `&&` and `||`. A `Pipeline` is a sequence of
//! [`Command`]s separated by `|`.
//!
//! Every node exclusively owns its children; subtrees are passed down the
//! execution recursion by reference.
//!
//! Most types implement `Display`, producing single-line source code, and
//! `CompoundStatement` implements [`FromStr`] so that
//! `"a | b && c".parse()` yields an AST directly.

use crate::lex::Lexer;
use crate::parser::{Error, Parser};
use crate::token::TokenKind;
use std::fmt;
use std::str::FromStr;

/// Single syntactic word, to be expanded at execution time
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    /// Raw source text, quotes and expansions included
    pub text: String,
    /// Kind of the token the word was read from
    pub token_kind: TokenKind,
    /// Whether the first character originated inside quotes or after a
    /// backslash
    pub leading_quoted: bool,
}

impl Word {
    /// Creates an unquoted plain word, mainly for tests.
    pub fn literal(text: impl Into<String>) -> Word {
        Word {
            text: text.into(),
            token_kind: TokenKind::Word,
            leading_quoted: false,
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Type of a redirection
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirKind {
    /// `<`
    Input,
    /// `>` and `>|`
    Output,
    /// `>>`
    Append,
    /// `<&`
    InputFd,
    /// `>&`
    OutputFd,
    /// `<>`
    InputOutput,
    /// `<<`
    HereDoc,
    /// `<<-`
    HereDocDash,
}

impl RedirKind {
    /// Default file descriptor the redirection applies to when no explicit
    /// one is given.
    pub fn default_fd(self) -> i32 {
        use RedirKind::*;
        match self {
            Input | InputFd | HereDoc | HereDocDash => 0,
            Output | Append | OutputFd | InputOutput => 1,
        }
    }

    fn operator(self) -> &'static str {
        use RedirKind::*;
        match self {
            Input => "<",
            Output => ">",
            Append => ">>",
            InputFd => "<&",
            OutputFd => ">&",
            InputOutput => "<>",
            HereDoc => "<<",
            HereDocDash => "<<-",
        }
    }
}

/// Redirection of a file descriptor
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redirection {
    /// Type of the redirection
    pub kind: RedirKind,
    /// Explicit file descriptor, if the redirection was prefixed with one
    pub fd: Option<i32>,
    /// Redirection target (a pathname, fd number, or here-doc delimiter)
    pub target: Word,
}

impl Redirection {
    /// File descriptor this redirection applies to, explicit or default.
    pub fn fd_or_default(&self) -> i32 {
        self.fd.unwrap_or_else(|| self.kind.default_fd())
    }
}

impl fmt::Display for Redirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fd) = self.fd {
            write!(f, "{}", fd)?;
        }
        write!(f, "{}{}", self.kind.operator(), self.target)
    }
}

/// Variable assignment preceding the command words
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment {
    /// Variable name
    pub name: Word,
    /// Value, still in composite (unexpanded) form
    pub value: Word,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Command that is not a compound command
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SimpleCommand {
    pub assignments: Vec<Assignment>,
    pub words: Vec<Word>,
    pub redirections: Vec<Redirection>,
}

impl SimpleCommand {
    /// Tests whether the command has nothing in it.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.words.is_empty() && self.redirections.is_empty()
    }
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut space = |f: &mut fmt::Formatter<'_>| {
            if first {
                first = false;
                Ok(())
            } else {
                f.write_str(" ")
            }
        };
        for assignment in &self.assignments {
            space(f)?;
            write!(f, "{}", assignment)?;
        }
        for word in &self.words {
            space(f)?;
            write!(f, "{}", word)?;
        }
        for redirection in &self.redirections {
            space(f)?;
            write!(f, "{}", redirection)?;
        }
        Ok(())
    }
}

/// Kind of a loop statement
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopKind {
    While,
    Until,
    For,
}

/// `if` command with optional `elif` and `else` parts
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConditionalStatement {
    pub condition: CompoundStatement,
    pub then_body: CompoundStatement,
    pub elif_clauses: Vec<(CompoundStatement, CompoundStatement)>,
    pub else_body: Option<CompoundStatement>,
}

impl fmt::Display for ConditionalStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if {}; then {}; ", self.condition, self.then_body)?;
        for (condition, body) in &self.elif_clauses {
            write!(f, "elif {}; then {}; ", condition, body)?;
        }
        if let Some(else_body) = &self.else_body {
            write!(f, "else {}; ", else_body)?;
        }
        f.write_str("fi")
    }
}

/// `while`, `until`, or `for` command
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoopStatement {
    pub kind: LoopKind,
    /// Loop condition (`while`/`until` only)
    pub condition: Option<CompoundStatement>,
    /// Loop variable (`for` only)
    pub variable: Option<Word>,
    /// Words to iterate over; empty with no `in` clause means the
    /// positional parameters
    pub items: Vec<Word>,
    /// Whether an `in` clause was present
    pub has_in: bool,
    pub body: CompoundStatement,
}

impl fmt::Display for LoopStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LoopKind::While => write!(f, "while {}; ", self.condition.as_ref().unwrap())?,
            LoopKind::Until => write!(f, "until {}; ", self.condition.as_ref().unwrap())?,
            LoopKind::For => {
                write!(f, "for {}", self.variable.as_ref().unwrap())?;
                if self.has_in {
                    f.write_str(" in")?;
                    for item in &self.items {
                        write!(f, " {}", item)?;
                    }
                }
                f.write_str("; ")?;
            }
        }
        write!(f, "do {}; done", self.body)
    }
}

/// One clause of a `case` command
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseClause {
    pub patterns: Vec<Word>,
    pub body: CompoundStatement,
}

impl fmt::Display for CaseClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, pattern) in self.patterns.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", pattern)?;
        }
        write!(f, ") {};;", self.body)
    }
}

/// `case` command
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseStatement {
    pub expression: Word,
    pub clauses: Vec<CaseClause>,
}

impl fmt::Display for CaseStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "case {} in", self.expression)?;
        for clause in &self.clauses {
            write!(f, " {}", clause)?;
        }
        f.write_str(" esac")
    }
}

/// Compound command
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompoundCommand {
    /// `{ … }` when `is_subshell` is false, `( … )` when true
    Group {
        body: CompoundStatement,
        is_subshell: bool,
    },
    If(ConditionalStatement),
    Loop(LoopStatement),
    Case(CaseStatement),
}

impl fmt::Display for CompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundCommand::Group { body, is_subshell } => {
                if *is_subshell {
                    write!(f, "({})", body)
                } else {
                    write!(f, "{{ {}; }}", body)
                }
            }
            CompoundCommand::If(statement) => statement.fmt(f),
            CompoundCommand::Loop(statement) => statement.fmt(f),
            CompoundCommand::Case(statement) => statement.fmt(f),
        }
    }
}

/// Element of a pipeline
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Simple(SimpleCommand),
    Compound {
        command: CompoundCommand,
        redirections: Vec<Redirection>,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Simple(command) => command.fmt(f),
            Command::Compound {
                command,
                redirections,
            } => {
                command.fmt(f)?;
                for redirection in redirections {
                    write!(f, " {}", redirection)?;
                }
                Ok(())
            }
        }
    }
}

/// Commands connected by `|`
///
/// A pipeline always contains at least one command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pipeline {
    pub commands: Vec<Command>,
    /// Whether the pipeline runs asynchronously (trailing `&`)
    pub background: bool,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", command)?;
        }
        if self.background {
            f.write_str(" &")?;
        }
        Ok(())
    }
}

/// Operator of a logical expression
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AndOrOp {
    /// `&&`
    And,
    /// `||`
    Or,
}

impl fmt::Display for AndOrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AndOrOp::And => "&&",
            AndOrOp::Or => "||",
        })
    }
}

/// Two and-or operands joined by `&&` or `||`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogicalExpression {
    pub left: AndOr,
    pub op: AndOrOp,
    pub right: AndOr,
}

impl fmt::Display for LogicalExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// Pipeline or chain of pipelines
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AndOr {
    Pipeline(Pipeline),
    Logical(Box<LogicalExpression>),
}

impl AndOr {
    /// Marks the final pipeline of the chain as a background pipeline.
    pub fn set_background(&mut self) {
        match self {
            AndOr::Pipeline(pipeline) => pipeline.background = true,
            AndOr::Logical(expression) => expression.right.set_background(),
        }
    }

    /// Tests whether the final pipeline of the chain runs in the
    /// background.
    pub fn is_background(&self) -> bool {
        match self {
            AndOr::Pipeline(pipeline) => pipeline.background,
            AndOr::Logical(expression) => expression.right.is_background(),
        }
    }
}

impl fmt::Display for AndOr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AndOr::Pipeline(pipeline) => pipeline.fmt(f),
            AndOr::Logical(expression) => expression.fmt(f),
        }
    }
}

/// Sequence of and-or items; the top-level AST node
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CompoundStatement {
    pub statements: Vec<AndOr>,
}

impl fmt::Display for CompoundStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl FromStr for CompoundStatement {
    type Err = Error;

    fn from_str(s: &str) -> Result<CompoundStatement, Error> {
        Parser::new(Lexer::new(s)).parse_program()
    }
}
