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

//! This crate implements shell arithmetic expansion.
//!
//! The [`eval`] function evaluates an expression found inside `$((…))`.
//! Values are [integers or floats](Value); mixed operands promote to
//! float, and an integer division that does not divide evenly promotes
//! to float as well. `**` is right-associative and always computed in
//! floating point. `&&` and `||` short-circuit: the skipped side is
//! parsed but not evaluated.
//!
//! Identifiers resolve through the [`Env`] trait; an unset variable or a
//! value that does not parse as a number evaluates to 0.

use std::fmt::Display;
use std::iter::Peekable;
use std::ops::Range;

mod env;
mod token;

pub use env::Env;
pub use token::TokenError;
use token::{Operator, Token, TokenValue, Tokens};

/// Result of arithmetic expansion
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
}

impl Value {
    fn as_i64(self) -> i64 {
        match self {
            Value::Integer(i) => i,
            Value::Float(f) => f as i64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Value::Integer(i) => i as f64,
            Value::Float(f) => f,
        }
    }

    fn is_integer(self) -> bool {
        matches!(self, Value::Integer(_))
    }

    fn truth(self) -> bool {
        self.as_f64() != 0.0
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => i.fmt(f),
            // A float with no fractional part renders as an integer.
            Value::Float(x) if x.is_finite() && *x == x.trunc() => (*x as i64).fmt(f),
            Value::Float(x) => x.fmt(f),
        }
    }
}

/// Intermediate result of evaluating part of an expression
#[derive(Clone, Debug, PartialEq)]
pub enum Term<'a> {
    /// Value
    Value(Value),
    /// Variable occurrence, not yet resolved
    Variable {
        /// Variable name
        name: &'a str,
        /// Range of the substring where the variable occurs
        location: Range<usize>,
    },
}

/// Cause of an arithmetic expansion error
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ErrorCause {
    /// Error in tokenization
    TokenError(TokenError),
    /// Division by zero
    DivisionByZero,
    /// Modulo by zero
    ModuloByZero,
    /// A token appeared where the grammar does not allow it
    UnexpectedToken,
    /// The expression ended where an operand was expected
    MissingOperand,
    /// A parenthesized subexpression is missing its `)`
    MissingClosingParen,
}

impl Display for ErrorCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorCause::*;
        match self {
            TokenError(e) => e.fmt(f),
            DivisionByZero => "division by zero".fmt(f),
            ModuloByZero => "modulo by zero".fmt(f),
            UnexpectedToken => "unexpected token".fmt(f),
            MissingOperand => "missing operand".fmt(f),
            MissingClosingParen => "missing closing parenthesis".fmt(f),
        }
    }
}

/// Description of an error that occurred during expansion
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Error {
    /// Cause of the error
    pub cause: ErrorCause,
    /// Range of the substring in the evaluated expression string where
    /// the error occurred
    pub location: Range<usize>,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.cause.fmt(f)
    }
}

impl std::error::Error for Error {}

/// Specifies the behavior of parse functions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    /// Evaluate the (sub)expression parsed.
    Eval,
    /// Just parse a (sub)expression; don't evaluate.
    Skip,
}

/// Resolves a variable to its numeric value.
fn resolve_variable<E: Env>(name: &str, env: &E) -> Value {
    let Some(text) = env.get_variable(name) else {
        return Value::Integer(0);
    };
    let text = text.trim();
    if let Ok(i) = text.parse() {
        return Value::Integer(i);
    }
    if let Ok(f) = text.parse() {
        return Value::Float(f);
    }
    Value::Integer(0)
}

impl Term<'_> {
    fn into_value<E: Env>(self, mode: Mode, env: &E) -> Value {
        match mode {
            Mode::Eval => match self {
                Term::Value(value) => value,
                Term::Variable { name, .. } => resolve_variable(name, env),
            },
            Mode::Skip => Value::Integer(0),
        }
    }
}

/// Applies a binary operator.
fn apply_binary(
    op: Operator,
    lhs: Value,
    rhs: Value,
    location: Range<usize>,
) -> Result<Value, Error> {
    use Operator::*;
    let float = !lhs.is_integer() || !rhs.is_integer();
    Ok(match op {
        BarBar => Value::Integer((lhs.truth() || rhs.truth()) as i64),
        AndAnd => Value::Integer((lhs.truth() && rhs.truth()) as i64),
        Bar => Value::Integer(lhs.as_i64() | rhs.as_i64()),
        Caret => Value::Integer(lhs.as_i64() ^ rhs.as_i64()),
        And => Value::Integer(lhs.as_i64() & rhs.as_i64()),
        EqualEqual => Value::Integer((lhs.as_f64() == rhs.as_f64()) as i64),
        BangEqual => Value::Integer((lhs.as_f64() != rhs.as_f64()) as i64),
        Less => Value::Integer((lhs.as_f64() < rhs.as_f64()) as i64),
        LessEqual => Value::Integer((lhs.as_f64() <= rhs.as_f64()) as i64),
        Greater => Value::Integer((lhs.as_f64() > rhs.as_f64()) as i64),
        GreaterEqual => Value::Integer((lhs.as_f64() >= rhs.as_f64()) as i64),
        LessLess => Value::Integer(lhs.as_i64().wrapping_shl(rhs.as_i64() as u32)),
        GreaterGreater => Value::Integer(lhs.as_i64().wrapping_shr(rhs.as_i64() as u32)),
        Plus => {
            if float {
                Value::Float(lhs.as_f64() + rhs.as_f64())
            } else {
                Value::Integer(lhs.as_i64().wrapping_add(rhs.as_i64()))
            }
        }
        Minus => {
            if float {
                Value::Float(lhs.as_f64() - rhs.as_f64())
            } else {
                Value::Integer(lhs.as_i64().wrapping_sub(rhs.as_i64()))
            }
        }
        Asterisk => {
            if float {
                Value::Float(lhs.as_f64() * rhs.as_f64())
            } else {
                Value::Integer(lhs.as_i64().wrapping_mul(rhs.as_i64()))
            }
        }
        Slash => {
            if rhs.as_f64() == 0.0 {
                return Err(Error {
                    cause: ErrorCause::DivisionByZero,
                    location,
                });
            }
            if float {
                Value::Float(lhs.as_f64() / rhs.as_f64())
            } else if lhs.as_i64().wrapping_rem(rhs.as_i64()) != 0 {
                // Inexact integer quotient promotes to float.
                Value::Float(lhs.as_i64() as f64 / rhs.as_i64() as f64)
            } else {
                Value::Integer(lhs.as_i64().wrapping_div(rhs.as_i64()))
            }
        }
        Percent => {
            if rhs.as_i64() == 0 {
                return Err(Error {
                    cause: ErrorCause::ModuloByZero,
                    location,
                });
            }
            Value::Integer(lhs.as_i64().wrapping_rem(rhs.as_i64()))
        }
        AsteriskAsterisk => Value::Float(lhs.as_f64().powf(rhs.as_f64())),
        Bang | Tilde | OpenParen | CloseParen => {
            panic!("not a binary operator: {op:?}")
        }
    })
}

/// Parses a leaf expression.
///
/// A leaf expression is a constant number, variable, or parenthesized
/// expression, optionally modified by a unary operator.
fn parse_leaf<'a, E: Env>(
    tokens: &mut Peekable<Tokens<'a>>,
    mode: Mode,
    env: &E,
    end: usize,
) -> Result<Term<'a>, Error> {
    let Some(token) = tokens.next().transpose()? else {
        return Err(Error {
            cause: ErrorCause::MissingOperand,
            location: end..end,
        });
    };
    match token.value {
        TokenValue::Term(term) => Ok(term),

        TokenValue::Operator(Operator::OpenParen) => {
            let inner = parse_binary(tokens, 1, mode, env, end)?;
            match tokens.next().transpose()? {
                Some(Token {
                    value: TokenValue::Operator(Operator::CloseParen),
                    ..
                }) => Ok(inner),
                _ => Err(Error {
                    cause: ErrorCause::MissingClosingParen,
                    location: token.location,
                }),
            }
        }

        TokenValue::Operator(Operator::Plus) => {
            let operand = parse_leaf(tokens, mode, env, end)?.into_value(mode, env);
            Ok(Term::Value(operand))
        }

        TokenValue::Operator(Operator::Minus) => {
            let operand = parse_leaf(tokens, mode, env, end)?.into_value(mode, env);
            let negated = match operand {
                Value::Integer(i) => Value::Integer(i.wrapping_neg()),
                Value::Float(f) => Value::Float(-f),
            };
            Ok(Term::Value(negated))
        }

        TokenValue::Operator(Operator::Bang) => {
            let operand = parse_leaf(tokens, mode, env, end)?.into_value(mode, env);
            Ok(Term::Value(Value::Integer(!operand.truth() as i64)))
        }

        TokenValue::Operator(Operator::Tilde) => {
            let operand = parse_leaf(tokens, mode, env, end)?.into_value(mode, env);
            Ok(Term::Value(Value::Integer(!operand.as_i64())))
        }

        TokenValue::Operator(_) => Err(Error {
            cause: ErrorCause::UnexpectedToken,
            location: token.location,
        }),
    }
}

/// Parses an expression that may contain binary operators.
///
/// This function consumes binary operators with precedence equal to or
/// greater than the given minimum precedence, which must be greater
/// than 0.
fn parse_binary<'a, E: Env>(
    tokens: &mut Peekable<Tokens<'a>>,
    min_precedence: u8,
    mode: Mode,
    env: &E,
    end: usize,
) -> Result<Term<'a>, Error> {
    let mut term = parse_leaf(tokens, mode, env, end)?;

    while let Some(Ok(Token {
        value: TokenValue::Operator(operator),
        ..
    })) = tokens.peek()
    {
        let operator = *operator;
        let Some(precedence) = operator.binary_precedence() else {
            break;
        };
        if precedence < min_precedence {
            break;
        }

        let location = tokens.next().unwrap().unwrap().location;

        // `**` is right-associative; everything else associates left.
        let next_min = if operator == Operator::AsteriskAsterisk {
            precedence
        } else {
            precedence + 1
        };

        match operator {
            Operator::BarBar | Operator::AndAnd => {
                let lhs = term.into_value(mode, env);
                let skip_rhs = match operator {
                    Operator::BarBar => lhs.truth(),
                    Operator::AndAnd => !lhs.truth(),
                    _ => unreachable!(),
                };
                let rhs_mode = if skip_rhs || mode == Mode::Skip {
                    Mode::Skip
                } else {
                    mode
                };
                let rhs = parse_binary(tokens, next_min, rhs_mode, env, end)?
                    .into_value(rhs_mode, env);
                term = if mode == Mode::Skip {
                    Term::Value(Value::Integer(0))
                } else {
                    Term::Value(apply_binary(operator, lhs, rhs, location)?)
                };
            }
            _ => {
                let rhs = parse_binary(tokens, next_min, mode, env, end)?;
                if mode == Mode::Skip {
                    term = Term::Value(Value::Integer(0));
                } else {
                    let lhs = term.into_value(mode, env);
                    let rhs = rhs.into_value(mode, env);
                    term = Term::Value(apply_binary(operator, lhs, rhs, location)?);
                }
            }
        }
    }

    Ok(term)
}

/// Performs arithmetic expansion.
pub fn eval<E: Env>(expression: &str, env: &E) -> Result<Value, Error> {
    let end = expression.len();
    let mut tokens = Tokens::new(expression).peekable();
    let term = parse_binary(&mut tokens, 1, Mode::Eval, env, end)?;
    match tokens.next().transpose()? {
        None => Ok(term.into_value(Mode::Eval, env)),
        Some(token) => Err(Error {
            cause: ErrorCause::UnexpectedToken,
            location: token.location,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn eval_str(expression: &str) -> Result<Value, Error> {
        eval(expression, &HashMap::new())
    }

    #[test]
    fn integer_constants() {
        assert_eq!(eval_str("1"), Ok(Value::Integer(1)));
        assert_eq!(eval_str("42"), Ok(Value::Integer(42)));
        assert_eq!(eval_str(" 12 "), Ok(Value::Integer(12)));
    }

    #[test]
    fn float_constants() {
        assert_eq!(eval_str("1.5"), Ok(Value::Float(1.5)));
        assert_eq!(eval_str(".5"), Ok(Value::Float(0.5)));
    }

    #[test]
    fn additive_operators() {
        assert_eq!(eval_str("1+2"), Ok(Value::Integer(3)));
        assert_eq!(eval_str(" 42 - 15 "), Ok(Value::Integer(27)));
        assert_eq!(eval_str("10 - 7 - 5"), Ok(Value::Integer(-2)));
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        assert_eq!(eval_str("2+3*4"), Ok(Value::Integer(14)));
        assert_eq!(eval_str("2*3+4"), Ok(Value::Integer(10)));
    }

    #[test]
    fn parentheses() {
        assert_eq!(eval_str("(2+3)*4"), Ok(Value::Integer(20)));
        assert_eq!(eval_str("2*(3+4)"), Ok(Value::Integer(14)));
        assert_eq!(eval_str("(6-(7-3))*2"), Ok(Value::Integer(4)));
    }

    #[test]
    fn exact_integer_division() {
        assert_eq!(eval_str("6/2"), Ok(Value::Integer(3)));
        assert_eq!(eval_str("120/10/5"), Ok(Value::Integer(2)));
    }

    #[test]
    fn inexact_division_promotes_to_float() {
        assert_eq!(eval_str("7/2"), Ok(Value::Float(3.5)));
        assert_eq!(eval_str("1/3"), Ok(Value::Float(1.0 / 3.0)));
    }

    #[test]
    fn mixed_operands_promote_to_float() {
        assert_eq!(eval_str("1+0.5"), Ok(Value::Float(1.5)));
        assert_eq!(eval_str("2.0*3"), Ok(Value::Float(6.0)));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            eval_str("1/0"),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 1..2,
            })
        );
        assert_eq!(
            eval_str("1/0.0"),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 1..2,
            })
        );
    }

    #[test]
    fn modulo() {
        assert_eq!(eval_str("17 % 5"), Ok(Value::Integer(2)));
        assert_eq!(
            eval_str("1%0"),
            Err(Error {
                cause: ErrorCause::ModuloByZero,
                location: 1..2,
            })
        );
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(eval_str("2**3"), Ok(Value::Float(8.0)));
        // 2 ** (3 ** 2) = 512, not (2 ** 3) ** 2 = 64
        assert_eq!(eval_str("2**3**2"), Ok(Value::Float(512.0)));
    }

    #[test]
    fn comparisons_yield_zero_or_one() {
        assert_eq!(eval_str("1 < 2"), Ok(Value::Integer(1)));
        assert_eq!(eval_str("2 < 1"), Ok(Value::Integer(0)));
        assert_eq!(eval_str("5 <= 5"), Ok(Value::Integer(1)));
        assert_eq!(eval_str("5 >= 6"), Ok(Value::Integer(0)));
        assert_eq!(eval_str("5 == 5"), Ok(Value::Integer(1)));
        assert_eq!(eval_str("5 != 5"), Ok(Value::Integer(0)));
        assert_eq!(eval_str("1.5 > 1"), Ok(Value::Integer(1)));
    }

    #[test]
    fn logical_operators() {
        assert_eq!(eval_str("0||0"), Ok(Value::Integer(0)));
        assert_eq!(eval_str("2 || 0"), Ok(Value::Integer(1)));
        assert_eq!(eval_str("0&&1"), Ok(Value::Integer(0)));
        assert_eq!(eval_str("2 && 3"), Ok(Value::Integer(1)));
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The skipped side would otherwise divide by zero.
        assert_eq!(eval_str("1 || 1/0"), Ok(Value::Integer(1)));
        assert_eq!(eval_str("0 && 1/0"), Ok(Value::Integer(0)));
        // Not skipped: the error surfaces.
        assert_eq!(
            eval_str("0 || 1/0").unwrap_err().cause,
            ErrorCause::DivisionByZero
        );
    }

    #[test]
    fn bitwise_operators() {
        assert_eq!(eval_str("3|5"), Ok(Value::Integer(7)));
        assert_eq!(eval_str("3^5"), Ok(Value::Integer(6)));
        assert_eq!(eval_str("3&5"), Ok(Value::Integer(1)));
        assert_eq!(eval_str("5<<3"), Ok(Value::Integer(40)));
        assert_eq!(eval_str("64>>3"), Ok(Value::Integer(8)));
    }

    #[test]
    fn unary_operators() {
        assert_eq!(eval_str("-5"), Ok(Value::Integer(-5)));
        assert_eq!(eval_str("- - 49"), Ok(Value::Integer(49)));
        assert_eq!(eval_str("+10"), Ok(Value::Integer(10)));
        assert_eq!(eval_str("!0"), Ok(Value::Integer(1)));
        assert_eq!(eval_str("!3"), Ok(Value::Integer(0)));
        assert_eq!(eval_str("~0"), Ok(Value::Integer(-1)));
        assert_eq!(eval_str("-1.5"), Ok(Value::Float(-1.5)));
    }

    #[test]
    fn unset_variables_are_zero() {
        assert_eq!(eval_str("foo"), Ok(Value::Integer(0)));
        assert_eq!(eval_str("foo + 3"), Ok(Value::Integer(3)));
    }

    #[test]
    fn integer_variables() {
        let mut env = HashMap::new();
        env.insert("foo".to_string(), "42".to_string());
        assert_eq!(eval("foo", &env), Ok(Value::Integer(42)));
        assert_eq!(eval("foo * 2", &env), Ok(Value::Integer(84)));
    }

    #[test]
    fn float_variables() {
        let mut env = HashMap::new();
        env.insert("x".to_string(), "1.5".to_string());
        assert_eq!(eval("x + x", &env), Ok(Value::Float(3.0)));
    }

    #[test]
    fn non_numeric_variables_are_zero() {
        let mut env = HashMap::new();
        env.insert("junk".to_string(), "hello".to_string());
        assert_eq!(eval("junk + 1", &env), Ok(Value::Integer(1)));
    }

    #[test]
    fn missing_operand() {
        assert_eq!(eval_str("").unwrap_err().cause, ErrorCause::MissingOperand);
        assert_eq!(
            eval_str("1 +").unwrap_err().cause,
            ErrorCause::MissingOperand
        );
    }

    #[test]
    fn missing_closing_paren() {
        assert_eq!(
            eval_str("(1 + 2").unwrap_err().cause,
            ErrorCause::MissingClosingParen
        );
    }

    #[test]
    fn trailing_garbage() {
        assert_eq!(
            eval_str("1 2").unwrap_err().cause,
            ErrorCause::UnexpectedToken
        );
        assert_eq!(
            eval_str("1 )").unwrap_err().cause,
            ErrorCause::UnexpectedToken
        );
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Integer(14).to_string(), "14");
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Float(3.5).to_string(), "3.5");
        assert_eq!(Value::Integer(-7).to_string(), "-7");
    }
}
