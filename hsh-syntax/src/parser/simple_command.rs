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

//! Syntax parser for simple commands and redirections

use super::{Parser, Result, SyntaxError};
use crate::syntax::{Assignment, Redirection, RedirKind, SimpleCommand, Word};
use crate::token::{Token, TokenKind};

/// Tokens that may serve as a word when the grammar does not expect a
/// reserved word: redirection targets, arguments after the first command
/// word, case patterns, and for-loop items.
pub(crate) fn is_word_in_context(kind: TokenKind) -> bool {
    kind.is_word_like()
        || matches!(kind, TokenKind::Keyword(_) | TokenKind::Assignment)
}

impl Parser<'_> {
    /// Parses a simple command.
    ///
    /// Returns `Ok(None)` without consuming anything when the current
    /// token cannot start a simple command.
    pub fn simple_command(&mut self) -> Result<Option<SimpleCommand>> {
        let mut command = SimpleCommand::default();
        loop {
            let token = self.peek()?;
            match token.kind {
                // Assignments apply only before the first command word.
                TokenKind::Assignment if command.words.is_empty() => {
                    let token = self.take()?;
                    command.assignments.push(split_assignment(token));
                }
                TokenKind::Assignment => {
                    let token = self.take()?;
                    command.words.push(Self::word_from(token));
                }
                TokenKind::Number => {
                    // A digits-only word immediately preceding a
                    // redirection operator is its fd.
                    let number = self.take()?;
                    let next = self.peek()?;
                    if next.kind.is_redirection_operator()
                        && next.position == number.position + number.text.len()
                    {
                        let fd = number
                            .text
                            .parse()
                            .map_err(|_| self.error(SyntaxError::FdOutOfRange, &number))?;
                        let redirection = self.redirection_body(Some(fd))?;
                        command.redirections.push(redirection);
                    } else {
                        command.words.push(Self::word_from(number));
                    }
                }
                kind if kind.is_redirection_operator() => {
                    let redirection = self.redirection_body(None)?;
                    command.redirections.push(redirection);
                }
                kind if kind.is_word_like() => {
                    let token = self.take()?;
                    command.words.push(Self::word_from(token));
                }
                // Reserved words are ordinary words after the first
                // command word.
                TokenKind::Keyword(_) if !command.words.is_empty() => {
                    let token = self.take()?;
                    command.words.push(Self::word_from(token));
                }
                _ => break,
            }
        }

        if command.is_empty() {
            Ok(None)
        } else {
            Ok(Some(command))
        }
    }

    /// Parses one redirection: the operator and its target word.
    ///
    /// The current token must be a redirection operator; an fd prefix, if
    /// any, has already been consumed by the caller.
    pub(crate) fn redirection_body(&mut self, fd: Option<i32>) -> Result<Redirection> {
        let op = self.take()?;
        let kind = match op.kind {
            TokenKind::Less => RedirKind::Input,
            TokenKind::Great | TokenKind::GreaterPipe => RedirKind::Output,
            TokenKind::DGreat => RedirKind::Append,
            TokenKind::DLess => RedirKind::HereDoc,
            TokenKind::DLessDash => RedirKind::HereDocDash,
            TokenKind::LessAnd => RedirKind::InputFd,
            TokenKind::GreatAnd => RedirKind::OutputFd,
            TokenKind::LessGreat => RedirKind::InputOutput,
            _ => unreachable!("not a redirection operator: {:?}", op.kind),
        };

        let target = self.peek()?;
        if is_word_in_context(target.kind) {
            let target = self.take()?;
            Ok(Redirection {
                kind,
                fd,
                target: Self::word_from(target),
            })
        } else {
            Err(self.error(SyntaxError::MissingRedirTarget, &target))
        }
    }

    /// Parses redirections following a compound command.
    pub(crate) fn trailing_redirections(&mut self) -> Result<Vec<Redirection>> {
        let mut redirections = Vec::new();
        loop {
            let token = self.peek()?;
            match token.kind {
                kind if kind.is_redirection_operator() => {
                    redirections.push(self.redirection_body(None)?);
                }
                TokenKind::Number => {
                    let number = self.take()?;
                    let next = self.peek()?;
                    if next.kind.is_redirection_operator()
                        && next.position == number.position + number.text.len()
                    {
                        let fd = number
                            .text
                            .parse()
                            .map_err(|_| self.error(SyntaxError::FdOutOfRange, &number))?;
                        redirections.push(self.redirection_body(Some(fd))?);
                    } else {
                        // A stray word after a compound command.
                        return Err(
                            self.error(SyntaxError::UnexpectedToken(number.text.clone()), &number)
                        );
                    }
                }
                _ => return Ok(redirections),
            }
        }
    }
}

/// Splits a `NAME=value` token at its first `=`.
fn split_assignment(token: Token) -> Assignment {
    let eq = token.text.find('=').unwrap();
    let name = token.text[..eq].to_string();
    let value = token.text[eq + 1..].to_string();
    Assignment {
        name: Word {
            text: name,
            token_kind: TokenKind::Word,
            leading_quoted: false,
        },
        value: Word {
            text: value,
            token_kind: TokenKind::Word,
            leading_quoted: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::ErrorCause;
    use super::*;
    use crate::syntax::{AndOr, Command, CompoundStatement};
    use assert_matches::assert_matches;

    fn parse_simple(src: &str) -> SimpleCommand {
        let mut list: CompoundStatement = src.parse().unwrap();
        assert_eq!(list.statements.len(), 1);
        let AndOr::Pipeline(mut pipeline) = list.statements.pop().unwrap() else {
            panic!("not a pipeline")
        };
        assert_eq!(pipeline.commands.len(), 1);
        let Command::Simple(command) = pipeline.commands.pop().unwrap() else {
            panic!("not a simple command")
        };
        command
    }

    #[test]
    fn words_only() {
        let command = parse_simple("echo hello world");
        assert_eq!(command.assignments.len(), 0);
        assert_eq!(command.redirections.len(), 0);
        let words: Vec<&str> = command.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, ["echo", "hello", "world"]);
    }

    #[test]
    fn assignments_before_words() {
        let command = parse_simple("A=1 B=2 make all");
        assert_eq!(command.assignments.len(), 2);
        assert_eq!(command.assignments[0].name.text, "A");
        assert_eq!(command.assignments[0].value.text, "1");
        assert_eq!(command.assignments[1].name.text, "B");
        assert_eq!(command.assignments[1].value.text, "2");
        let words: Vec<&str> = command.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, ["make", "all"]);
    }

    #[test]
    fn assignment_after_word_is_a_word() {
        let command = parse_simple("env A=1");
        assert_eq!(command.assignments.len(), 0);
        let words: Vec<&str> = command.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, ["env", "A=1"]);
    }

    #[test]
    fn assignment_only_line() {
        let command = parse_simple("VAR=hello");
        assert_eq!(command.assignments.len(), 1);
        assert_eq!(command.words.len(), 0);
    }

    #[test]
    fn assignment_value_with_equals() {
        let command = parse_simple("VAR=a=b");
        assert_eq!(command.assignments[0].name.text, "VAR");
        assert_eq!(command.assignments[0].value.text, "a=b");
    }

    #[test]
    fn output_redirection() {
        let command = parse_simple("echo hi >out.txt");
        assert_eq!(command.redirections.len(), 1);
        assert_eq!(command.redirections[0].kind, RedirKind::Output);
        assert_eq!(command.redirections[0].fd, None);
        assert_eq!(command.redirections[0].fd_or_default(), 1);
        assert_eq!(command.redirections[0].target.text, "out.txt");
    }

    #[test]
    fn fd_prefixed_redirection() {
        let command = parse_simple("cmd 2>err.log");
        assert_eq!(command.redirections.len(), 1);
        assert_eq!(command.redirections[0].kind, RedirKind::Output);
        assert_eq!(command.redirections[0].fd, Some(2));
    }

    #[test]
    fn spaced_digits_are_an_argument() {
        let command = parse_simple("echo 2 >out");
        let words: Vec<&str> = command.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, ["echo", "2"]);
        assert_eq!(command.redirections.len(), 1);
        assert_eq!(command.redirections[0].fd, None);
    }

    #[test]
    fn fd_duplication_redirections() {
        let command = parse_simple("cmd 2>&1 3<&0");
        assert_eq!(command.redirections.len(), 2);
        assert_eq!(command.redirections[0].kind, RedirKind::OutputFd);
        assert_eq!(command.redirections[0].fd, Some(2));
        assert_eq!(command.redirections[0].target.text, "1");
        assert_eq!(command.redirections[1].kind, RedirKind::InputFd);
        assert_eq!(command.redirections[1].fd, Some(3));
    }

    #[test]
    fn redirection_before_command_word() {
        let command = parse_simple("<input sort");
        assert_eq!(command.redirections.len(), 1);
        assert_eq!(command.redirections[0].kind, RedirKind::Input);
        let words: Vec<&str> = command.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, ["sort"]);
    }

    #[test]
    fn heredoc_operator_lexes_with_target() {
        let command = parse_simple("cat << EOF");
        assert_eq!(command.redirections.len(), 1);
        assert_eq!(command.redirections[0].kind, RedirKind::HereDoc);
        assert_eq!(command.redirections[0].target.text, "EOF");
    }

    #[test]
    fn reserved_word_as_argument() {
        let command = parse_simple("echo if then done");
        let words: Vec<&str> = command.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, ["echo", "if", "then", "done"]);
    }

    #[test]
    fn reserved_word_as_redirection_target() {
        let command = parse_simple("echo x >if");
        assert_eq!(command.redirections[0].target.text, "if");
    }

    #[test]
    fn missing_redirection_target() {
        let error = "echo >".parse::<CompoundStatement>().unwrap_err();
        assert_eq!(
            error.cause,
            ErrorCause::Syntax(SyntaxError::MissingRedirTarget)
        );
    }

    #[test]
    fn missing_redirection_target_before_newline() {
        let error = "echo > \n".parse::<CompoundStatement>().unwrap_err();
        assert_eq!(
            error.cause,
            ErrorCause::Syntax(SyntaxError::MissingRedirTarget)
        );
    }

    #[test]
    fn fd_out_of_range() {
        let error = "cmd 99999999999999999999>x"
            .parse::<CompoundStatement>()
            .unwrap_err();
        assert_eq!(error.cause, ErrorCause::Syntax(SyntaxError::FdOutOfRange));
    }

    #[test]
    fn quoted_words_keep_their_kind() {
        let command = parse_simple("echo 'a b' \"c d\"");
        assert_eq!(command.words[1].token_kind, TokenKind::SingleQuoted);
        assert!(command.words[1].leading_quoted);
        assert_eq!(command.words[2].token_kind, TokenKind::DoubleQuoted);
    }
}
