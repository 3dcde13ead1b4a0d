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

//! Tokenization of arithmetic expressions

use crate::{Error, ErrorCause, Term, Value};
use std::iter::FusedIterator;
use std::ops::Range;
use thiserror::Error;

/// Cause of a tokenization error
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum TokenError {
    /// A numeric constant contains an invalid character.
    #[error("invalid numeric constant")]
    InvalidNumericConstant,

    /// The expression contains a character that is not a whitespace,
    /// operator, number, or identifier.
    #[error("invalid character")]
    InvalidCharacter,
}

/// Operator token
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// `||`
    BarBar,
    /// `&&`
    AndAnd,
    /// `|`
    Bar,
    /// `^`
    Caret,
    /// `&`
    And,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<<`
    LessLess,
    /// `>>`
    GreaterGreater,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `**`
    AsteriskAsterisk,
    /// `!`
    Bang,
    /// `~`
    Tilde,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
}

impl Operator {
    /// Precedence of this operator used as a binary operator
    ///
    /// Returns `None` for operators that are not binary. Higher numbers
    /// bind tighter. `**` is the only right-associative operator.
    pub fn binary_precedence(self) -> Option<u8> {
        use Operator::*;
        match self {
            BarBar => Some(1),
            AndAnd => Some(2),
            Bar => Some(3),
            Caret => Some(4),
            And => Some(5),
            EqualEqual | BangEqual => Some(6),
            Less | LessEqual | Greater | GreaterEqual => Some(7),
            LessLess | GreaterGreater => Some(8),
            Plus | Minus => Some(9),
            Asterisk | Slash | Percent => Some(10),
            AsteriskAsterisk => Some(11),
            Bang | Tilde | OpenParen | CloseParen => None,
        }
    }
}

/// Value of a [`Token`]
#[derive(Clone, Debug, PartialEq)]
pub enum TokenValue<'a> {
    /// Term (number or variable)
    Term(Term<'a>),
    /// Operator
    Operator(Operator),
}

/// Atomic lexical element of an arithmetic expression
#[derive(Clone, Debug, PartialEq)]
pub struct Token<'a> {
    /// Token value
    pub value: TokenValue<'a>,
    /// Range of the substring where the token occurs in the parsed
    /// expression
    pub location: Range<usize>,
}

fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Iterator over the tokens of an expression
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    source: &'a str,
    index: usize,
}

impl<'a> Tokens<'a> {
    /// Creates a tokenizer for the given expression.
    pub fn new(source: &'a str) -> Tokens<'a> {
        Tokens { source, index: 0 }
    }

    fn parse_number(&mut self, start: usize) -> Result<Token<'a>, Error> {
        let bytes = self.source.as_bytes();
        let mut end = start;
        let mut has_decimal = false;
        while end < bytes.len() {
            match bytes[end] {
                c if c.is_ascii_digit() => end += 1,
                b'.' if !has_decimal => {
                    has_decimal = true;
                    end += 1;
                }
                // A digit run followed by name characters is malformed.
                c if is_name_char(c) || c == b'.' => {
                    while end < bytes.len() && (is_name_char(bytes[end]) || bytes[end] == b'.') {
                        end += 1;
                    }
                    self.index = end;
                    return Err(Error {
                        cause: ErrorCause::TokenError(TokenError::InvalidNumericConstant),
                        location: start..end,
                    });
                }
                _ => break,
            }
        }
        self.index = end;

        let text = &self.source[start..end];
        let value = if has_decimal {
            text.parse().map(Value::Float).ok()
        } else {
            text.parse().map(Value::Integer).ok()
        };
        match value {
            Some(value) => Ok(Token {
                value: TokenValue::Term(Term::Value(value)),
                location: start..end,
            }),
            None => Err(Error {
                cause: ErrorCause::TokenError(TokenError::InvalidNumericConstant),
                location: start..end,
            }),
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.source.as_bytes();
        while self.index < bytes.len() && bytes[self.index].is_ascii_whitespace() {
            self.index += 1;
        }
        if self.index >= bytes.len() {
            return None;
        }

        let start = self.index;
        let c = bytes[start];

        if c.is_ascii_digit()
            || (c == b'.' && bytes.get(start + 1).is_some_and(u8::is_ascii_digit))
        {
            return Some(self.parse_number(start));
        }

        if is_name_start(c) {
            let mut end = start + 1;
            while end < bytes.len() && is_name_char(bytes[end]) {
                end += 1;
            }
            self.index = end;
            return Some(Ok(Token {
                value: TokenValue::Term(Term::Variable {
                    name: &self.source[start..end],
                    location: start..end,
                }),
                location: start..end,
            }));
        }

        use Operator::*;
        let two_char = match (c, bytes.get(start + 1)) {
            (b'*', Some(b'*')) => Some(AsteriskAsterisk),
            (b'=', Some(b'=')) => Some(EqualEqual),
            (b'!', Some(b'=')) => Some(BangEqual),
            (b'<', Some(b'=')) => Some(LessEqual),
            (b'>', Some(b'=')) => Some(GreaterEqual),
            (b'&', Some(b'&')) => Some(AndAnd),
            (b'|', Some(b'|')) => Some(BarBar),
            (b'<', Some(b'<')) => Some(LessLess),
            (b'>', Some(b'>')) => Some(GreaterGreater),
            _ => None,
        };
        if let Some(operator) = two_char {
            self.index = start + 2;
            return Some(Ok(Token {
                value: TokenValue::Operator(operator),
                location: start..start + 2,
            }));
        }

        let one_char = match c {
            b'+' => Some(Plus),
            b'-' => Some(Minus),
            b'*' => Some(Asterisk),
            b'/' => Some(Slash),
            b'%' => Some(Percent),
            b'(' => Some(OpenParen),
            b')' => Some(CloseParen),
            b'<' => Some(Less),
            b'>' => Some(Greater),
            b'!' => Some(Bang),
            b'&' => Some(And),
            b'|' => Some(Bar),
            b'^' => Some(Caret),
            b'~' => Some(Tilde),
            _ => None,
        };
        match one_char {
            Some(operator) => {
                self.index = start + 1;
                Some(Ok(Token {
                    value: TokenValue::Operator(operator),
                    location: start..start + 1,
                }))
            }
            None => {
                self.index = start + 1;
                Some(Err(Error {
                    cause: ErrorCause::TokenError(TokenError::InvalidCharacter),
                    location: start..start + 1,
                }))
            }
        }
    }
}

impl FusedIterator for Tokens<'_> {}
