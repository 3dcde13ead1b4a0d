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

//! Command execution
//!
//! Control-flow constructs are interpreted here, in-process; pipelines
//! and everything that needs a child process go through
//! [`pipeline`](self::pipeline). The executor re-invokes itself for
//! subtrees (branch bodies, loop bodies, subshell bodies), threading the
//! environment down the recursion.

pub(crate) mod pipeline;
pub(crate) mod simple_command;

use crate::expansion;
use crate::Result;
use hsh_env::semantics::ExitStatus;
use hsh_env::system::signal;
use hsh_env::Env;
use hsh_fnmatch::Pattern;
use hsh_syntax::syntax::{
    AndOr, AndOrOp, CaseStatement, CompoundCommand, CompoundStatement, ConditionalStatement,
    LoopKind, LoopStatement,
};

/// Executes a whole parsed program.
///
/// `$?` is updated after every completed and-or item; the returned
/// status is that of the last one (or the unchanged previous status for
/// an empty program).
pub fn execute_program(env: &mut Env, program: &CompoundStatement) -> Result<ExitStatus> {
    execute_compound_statement(env, program)
}

pub(crate) fn execute_compound_statement(
    env: &mut Env,
    list: &CompoundStatement,
) -> Result<ExitStatus> {
    let mut status = env.exit_status;
    for item in &list.statements {
        status = execute_and_or(env, item)?;
        env.exit_status = status;
    }
    Ok(status)
}

/// Executes a pipeline or logical chain.
pub fn execute_and_or(env: &mut Env, item: &AndOr) -> Result<ExitStatus> {
    match item {
        AndOr::Pipeline(p) => pipeline::run(env, p),
        AndOr::Logical(expression) => {
            let left = execute_and_or(env, &expression.left)?;
            env.exit_status = left;
            let run_right = match expression.op {
                AndOrOp::And => left.is_successful(),
                AndOrOp::Or => !left.is_successful(),
            };
            if run_right {
                let right = execute_and_or(env, &expression.right)?;
                env.exit_status = right;
                Ok(right)
            } else {
                Ok(left)
            }
        }
    }
}

/// Executes a compound command (redirections already in effect).
pub(crate) fn execute_compound_command(
    env: &mut Env,
    command: &CompoundCommand,
) -> Result<ExitStatus> {
    match command {
        CompoundCommand::Group {
            body,
            is_subshell: false,
        } => execute_compound_statement(env, body),
        CompoundCommand::Group {
            body,
            is_subshell: true,
        } => pipeline::run_subshell(env, body),
        CompoundCommand::If(statement) => execute_conditional(env, statement),
        CompoundCommand::Loop(statement) => execute_loop(env, statement),
        CompoundCommand::Case(statement) => execute_case(env, statement),
    }
}

fn execute_conditional(env: &mut Env, statement: &ConditionalStatement) -> Result<ExitStatus> {
    let condition = execute_compound_statement(env, &statement.condition)?;
    if condition.is_successful() {
        return execute_compound_statement(env, &statement.then_body);
    }
    for (condition, body) in &statement.elif_clauses {
        let condition = execute_compound_statement(env, condition)?;
        if condition.is_successful() {
            return execute_compound_statement(env, body);
        }
    }
    if let Some(else_body) = &statement.else_body {
        return execute_compound_statement(env, else_body);
    }
    Ok(ExitStatus::SUCCESS)
}

fn execute_loop(env: &mut Env, statement: &LoopStatement) -> Result<ExitStatus> {
    match statement.kind {
        LoopKind::While | LoopKind::Until => {
            let condition = statement.condition.as_ref().unwrap();
            let mut status = ExitStatus::SUCCESS;
            loop {
                // A pending interrupt cancels the loop at the iteration
                // boundary.
                if signal::take_sigint() {
                    break;
                }
                let result = execute_compound_statement(env, condition)?;
                let proceed = match statement.kind {
                    LoopKind::While => result.is_successful(),
                    _ => !result.is_successful(),
                };
                if !proceed {
                    break;
                }
                status = execute_compound_statement(env, &statement.body)?;
            }
            Ok(status)
        }
        LoopKind::For => execute_for(env, statement),
    }
}

fn execute_for(env: &mut Env, statement: &LoopStatement) -> Result<ExitStatus> {
    let variable = statement.variable.as_ref().unwrap();

    let items: Vec<String> = if statement.has_in {
        let mut items = Vec::new();
        for word in &statement.items {
            match expansion::expand_word(env, word) {
                Ok(fields) => items.extend(fields),
                Err(error) => {
                    eprintln!("hsh: {error}");
                    return Ok(ExitStatus::FAILURE);
                }
            }
        }
        items
    } else {
        // Without `in`, the loop iterates over the positional
        // parameters.
        env.positional_params.clone()
    };

    let previous = env.variables.get(&variable.text);
    let mut status = ExitStatus::SUCCESS;
    for item in items {
        if signal::take_sigint() {
            break;
        }
        env.variables.set(&variable.text, item);
        status = execute_compound_statement(env, &statement.body)?;
    }
    match previous {
        Some(value) => env.variables.set(&variable.text, value),
        None => env.variables.unset(&variable.text),
    }
    Ok(status)
}

fn execute_case(env: &mut Env, statement: &CaseStatement) -> Result<ExitStatus> {
    let subject = match expansion::expand_single(env, &statement.expression) {
        Ok(subject) => subject,
        Err(error) => {
            eprintln!("hsh: {error}");
            return Ok(ExitStatus::FAILURE);
        }
    };

    for clause in &statement.clauses {
        for word in &clause.patterns {
            let text = match expansion::expand_pattern(env, word) {
                Ok(text) => text,
                Err(error) => {
                    eprintln!("hsh: {error}");
                    return Ok(ExitStatus::FAILURE);
                }
            };
            let Ok(pattern) = Pattern::parse(&text) else {
                continue;
            };
            if pattern.is_match(&subject) {
                return execute_compound_statement(env, &clause.body);
            }
        }
    }
    Ok(ExitStatus::SUCCESS)
}
