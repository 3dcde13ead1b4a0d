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

//! Lexical analysis
//!
//! The [`Lexer`] consumes a byte slice and yields [`Token`]s until end of
//! input. It maintains a position cursor and produces one token per call;
//! a single-token lookahead is available through [`peek_token`] and
//! [`skip_token`].
//!
//! A word token keeps its raw source text, including quote characters and
//! backslashes. Composite expansions (`$VAR`, `${…}`, `$(…)`, `$((…))`,
//! backquotes) are absorbed verbatim into the surrounding word so that
//! later expansion sees them in context. Line continuations are the only
//! construct dropped during word assembly.
//!
//! [`peek_token`]: Lexer::peek_token
//! [`skip_token`]: Lexer::skip_token

use crate::token::Keyword;
use crate::token::LexError;
use crate::token::LexErrorCause;
use crate::token::Token;
use crate::token::TokenKind;

/// Result of lexing one token
pub type Result<T> = std::result::Result<T, LexError>;

fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn is_special_param(c: u8) -> bool {
    matches!(c, b'?' | b'$' | b'!' | b'#' | b'*' | b'@')
}

/// Characters that terminate an unquoted run inside a word.
///
/// Quotes, backslashes, and expansion introducers are listed here because
/// the word scanner handles them specially; they do not necessarily end
/// the word itself.
fn is_word_break(c: u8) -> bool {
    matches!(
        c,
        b' ' | b'\t' | b'\n' | b'\r' | b'|' | b'&' | b';' | b'(' | b')' | b'<' | b'>' | b'\''
            | b'"' | b'\\' | b'$' | b'`' | b'{' | b'}'
    )
}

/// Kind of a segment absorbed into a word
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Segment {
    Plain,
    Escape,
    Single,
    Double,
    Backtick,
    DollarParen,
    DollarBrace,
    Variable,
}

/// Tests whether a valid assignment name precedes a `=` in the word text.
fn assignment_name(text: &str) -> Option<usize> {
    let eq = text.find('=')?;
    if eq == 0 {
        return None;
    }
    let name = text[..eq].as_bytes();
    if !is_name_start(name[0]) {
        return None;
    }
    if name.iter().all(|&c| is_name_char(c)) {
        Some(eq)
    } else {
        None
    }
}

/// Tokenizer for the shell command language
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    peeked: Option<Result<Token>>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer that reads the given source string.
    pub fn new(src: &'a str) -> Lexer<'a> {
        Lexer {
            src,
            pos: 0,
            peeked: None,
        }
    }

    /// Returns the next token, consuming it.
    ///
    /// After the end of input, this function keeps returning
    /// [`TokenKind::EndOfFile`] tokens.
    pub fn next_token(&mut self) -> Result<Token> {
        match self.peeked.take() {
            Some(result) => result,
            None => self.read_token(),
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Token> {
        if self.peeked.is_none() {
            self.peeked = Some(self.read_token());
        }
        self.peeked.clone().unwrap()
    }

    /// Discards the next token.
    pub fn skip_token(&mut self) {
        let _ = self.next_token();
    }

    /// Tests whether the whole input has been consumed.
    pub fn at_end(&self) -> bool {
        self.peeked.is_none() && self.pos >= self.src.len()
    }

    fn read_token(&mut self) -> Result<Token> {
        loop {
            let token = self.scan_token()?;
            if token.kind != TokenKind::Comment {
                return Ok(token);
            }
        }
    }

    fn current(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn skip_blanks(&mut self) {
        while let Some(c) = self.current() {
            if is_blank(c) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn scan_token(&mut self) -> Result<Token> {
        self.skip_blanks();
        let start = self.pos;

        let Some(c) = self.current() else {
            return Ok(Token::new(TokenKind::EndOfFile, "", start));
        };

        if c == b'\n' {
            self.pos += 1;
            return Ok(Token::new(TokenKind::Newline, "\n", start));
        }
        // CRLF normalizes to a single newline token.
        if c == b'\r' && self.byte_at(1) == Some(b'\n') {
            self.pos += 2;
            return Ok(Token::new(TokenKind::Newline, "\n", start));
        }

        if c == b'#' {
            while let Some(c) = self.current() {
                if c == b'\n' || (c == b'\r' && self.byte_at(1) == Some(b'\n')) {
                    break;
                }
                self.pos += 1;
            }
            let text = &self.src[start..self.pos];
            return Ok(Token::new(TokenKind::Comment, text, start));
        }

        if let Some(token) = self.scan_operator() {
            return Ok(token);
        }

        self.scan_word()
    }

    /// Recognizes an operator token at the current position.
    ///
    /// Three-character operators are matched before two-character ones,
    /// which are matched before single characters.
    fn scan_operator(&mut self) -> Option<Token> {
        let start = self.pos;
        let rest = &self.src.as_bytes()[self.pos..];

        if rest.starts_with(b"<<-") {
            self.pos += 3;
            return Some(Token::new(TokenKind::DLessDash, "<<-", start));
        }

        let two_char: Option<TokenKind> = match rest {
            [b'&', b'&', ..] => Some(TokenKind::AndAnd),
            [b'|', b'|', ..] => Some(TokenKind::OrOr),
            [b'>', b'>', ..] => Some(TokenKind::DGreat),
            [b'<', b'<', ..] => Some(TokenKind::DLess),
            [b';', b';', ..] => Some(TokenKind::DSemi),
            [b'<', b'&', ..] => Some(TokenKind::LessAnd),
            [b'>', b'&', ..] => Some(TokenKind::GreatAnd),
            [b'<', b'>', ..] => Some(TokenKind::LessGreat),
            [b'>', b'|', ..] => Some(TokenKind::GreaterPipe),
            _ => None,
        };
        if let Some(kind) = two_char {
            let text = &self.src[start..start + 2];
            self.pos += 2;
            return Some(Token::new(kind, text, start));
        }

        let one_char: Option<TokenKind> = match rest.first()? {
            b'|' => Some(TokenKind::Pipe),
            b'&' => Some(TokenKind::Ampersand),
            b';' => Some(TokenKind::Semicolon),
            b'(' => Some(TokenKind::LParen),
            b')' => Some(TokenKind::RParen),
            b'<' => Some(TokenKind::Less),
            b'>' => Some(TokenKind::Great),
            b'{' => {
                // `{a,b}` and `{x..y}` are brace expansion, not a group.
                if self.looks_like_brace_expansion(start) {
                    None
                } else {
                    Some(TokenKind::LBrace)
                }
            }
            b'}' => Some(TokenKind::RBrace),
            b'[' => Some(TokenKind::LBracket),
            b']' => Some(TokenKind::RBracket),
            _ => None,
        };
        let kind = one_char?;
        let text = &self.src[start..start + 1];
        self.pos += 1;
        Some(Token::new(kind, text, start))
    }

    /// Scans forward from an opening brace to decide whether it starts a
    /// brace expansion.
    ///
    /// The brace does when a matching `}` exists and a `,` or `..` occurs
    /// at the same nesting depth.
    fn looks_like_brace_expansion(&self, open: usize) -> bool {
        let bytes = self.src.as_bytes();
        let mut depth = 1;
        let mut has_comma = false;
        let mut has_range = false;
        let mut i = open + 1;
        while i < bytes.len() && depth > 0 {
            match bytes[i] {
                b'{' => depth += 1,
                b'}' => depth -= 1,
                b',' if depth == 1 => has_comma = true,
                b'.' if depth == 1 && bytes.get(i + 1) == Some(&b'.') => has_range = true,
                // Same horizon as the word scanner's matching-brace scan.
                b'\n' => return false,
                _ => {}
            }
            i += 1;
        }
        depth == 0 && (has_comma || has_range)
    }

    /// Assembles a word token starting at the current position.
    fn scan_word(&mut self) -> Result<Token> {
        let start = self.pos;
        let mut accum = String::new();
        let mut segments: Vec<Segment> = Vec::new();

        loop {
            // Unquoted run up to the next special character.
            let run_start = self.pos;
            while let Some(c) = self.current() {
                if is_word_break(c) {
                    break;
                }
                self.pos += 1;
            }
            if self.pos > run_start {
                accum.push_str(&self.src[run_start..self.pos]);
                segments.push(Segment::Plain);
            }

            let Some(c) = self.current() else { break };
            match c {
                b'\r' => {
                    if self.byte_at(1) == Some(b'\n') {
                        break; // CRLF is a newline token
                    }
                    accum.push('\r');
                    segments.push(Segment::Plain);
                    self.pos += 1;
                }
                b'\\' => match self.byte_at(1) {
                    // Line continuation: dropped, not emitted.
                    Some(b'\n') => self.pos += 2,
                    Some(b'\r') if self.byte_at(2) == Some(b'\n') => self.pos += 3,
                    Some(_) => {
                        accum.push_str(&self.src[self.pos..self.pos + 2]);
                        segments.push(Segment::Escape);
                        self.pos += 2;
                    }
                    None => {
                        accum.push('\\');
                        segments.push(Segment::Plain);
                        self.pos += 1;
                    }
                },
                b'\'' => {
                    let quote_start = self.pos;
                    let mut i = self.pos + 1;
                    let bytes = self.src.as_bytes();
                    while i < bytes.len() && bytes[i] != b'\'' {
                        i += 1;
                    }
                    if i >= bytes.len() {
                        return Err(LexError {
                            cause: LexErrorCause::UnterminatedSingleQuote,
                            position: quote_start,
                        });
                    }
                    accum.push_str(&self.src[quote_start..i + 1]);
                    segments.push(Segment::Single);
                    self.pos = i + 1;
                }
                b'"' => {
                    let quote_start = self.pos;
                    let bytes = self.src.as_bytes();
                    let mut i = self.pos + 1;
                    let mut closed = false;
                    while i < bytes.len() {
                        match bytes[i] {
                            b'"' => {
                                closed = true;
                                i += 1;
                                break;
                            }
                            b'\\' if i + 1 < bytes.len() => i += 2,
                            _ => i += 1,
                        }
                    }
                    if !closed {
                        return Err(LexError {
                            cause: LexErrorCause::UnterminatedDoubleQuote,
                            position: quote_start,
                        });
                    }
                    accum.push_str(&self.src[quote_start..i]);
                    segments.push(Segment::Double);
                    self.pos = i;
                }
                b'`' => {
                    if let Some(end) = self.find_backquote_end(self.pos) {
                        accum.push_str(&self.src[self.pos..end]);
                        segments.push(Segment::Backtick);
                        self.pos = end;
                    } else if accum.is_empty() {
                        // Nothing better to do with a lone backquote.
                        self.pos += 1;
                        return Ok(Token::new(TokenKind::Error, "`", start));
                    } else {
                        break;
                    }
                }
                b'$' => {
                    if !self.absorb_dollar(&mut accum, &mut segments) {
                        break;
                    }
                }
                b'{' => {
                    if let Some(end) = self.find_matching_brace(self.pos) {
                        accum.push_str(&self.src[self.pos..end]);
                        segments.push(Segment::Plain);
                        self.pos = end;
                    } else {
                        break;
                    }
                }
                // Blank, newline, operator, or unmatched `}`: the word ends.
                _ => break,
            }
        }

        if accum.is_empty() {
            // Only line continuations were consumed; scan again.
            return self.scan_token();
        }

        let leading_quoted = matches!(
            segments.first(),
            Some(Segment::Escape | Segment::Single | Segment::Double)
        );

        let kind = Self::classify_word(&accum, &segments, leading_quoted);
        Ok(Token {
            kind,
            text: accum,
            position: start,
            leading_quoted,
        })
    }

    /// Absorbs a `$`-introduced expansion into the word.
    ///
    /// Returns false when the word should end at the `$` instead (the `$`
    /// itself has then been consumed into the accumulator if appropriate).
    fn absorb_dollar(&mut self, accum: &mut String, segments: &mut Vec<Segment>) -> bool {
        let bytes = self.src.as_bytes();
        match self.byte_at(1) {
            Some(b'(') if self.byte_at(2) == Some(b'(') => {
                if let Some(end) = self.find_arith_end(self.pos) {
                    accum.push_str(&self.src[self.pos..end]);
                    segments.push(Segment::DollarParen);
                    self.pos = end;
                    return true;
                }
                // Not a complete arithmetic expansion; `(` ends the word.
                accum.push('$');
                segments.push(Segment::Plain);
                self.pos += 1;
                false
            }
            Some(b'(') => {
                if let Some(end) = self.find_matching_paren(self.pos + 1) {
                    accum.push_str(&self.src[self.pos..end]);
                    segments.push(Segment::DollarParen);
                    self.pos = end;
                    return true;
                }
                accum.push('$');
                segments.push(Segment::Plain);
                self.pos += 1;
                false
            }
            Some(b'{') => {
                // Balanced braces; an unterminated `${` runs to end of input.
                let mut depth = 1;
                let mut i = self.pos + 2;
                while i < bytes.len() && depth > 0 {
                    match bytes[i] {
                        b'{' => depth += 1,
                        b'}' => depth -= 1,
                        _ => {}
                    }
                    i += 1;
                }
                accum.push_str(&self.src[self.pos..i]);
                segments.push(Segment::DollarBrace);
                self.pos = i;
                true
            }
            Some(c) if is_name_start(c) => {
                let mut i = self.pos + 2;
                while i < bytes.len() && is_name_char(bytes[i]) {
                    i += 1;
                }
                accum.push_str(&self.src[self.pos..i]);
                segments.push(Segment::Variable);
                self.pos = i;
                true
            }
            Some(c) if c.is_ascii_digit() => {
                let mut i = self.pos + 2;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                accum.push_str(&self.src[self.pos..i]);
                segments.push(Segment::Variable);
                self.pos = i;
                true
            }
            Some(c) if is_special_param(c) => {
                accum.push_str(&self.src[self.pos..self.pos + 2]);
                segments.push(Segment::Variable);
                self.pos += 2;
                true
            }
            _ => {
                accum.push('$');
                segments.push(Segment::Plain);
                self.pos += 1;
                true
            }
        }
    }

    /// Finds the position just past the backquote closing the one at `open`.
    fn find_backquote_end(&self, open: usize) -> Option<usize> {
        let bytes = self.src.as_bytes();
        let mut i = open + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'`' => return Some(i + 1),
                b'\\' if i + 1 < bytes.len() => i += 2,
                _ => i += 1,
            }
        }
        None
    }

    /// Finds the position just past the `)` matching the `(` at `open`.
    fn find_matching_paren(&self, open: usize) -> Option<usize> {
        let bytes = self.src.as_bytes();
        let mut depth = 0;
        let mut i = open + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => {
                    if depth == 0 {
                        return Some(i + 1);
                    }
                    depth -= 1;
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// Finds the position just past the `))` closing a `$((` at `dollar`.
    fn find_arith_end(&self, dollar: usize) -> Option<usize> {
        let bytes = self.src.as_bytes();
        let mut depth = 0;
        let mut i = dollar + 3;
        while i < bytes.len() {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => {
                    if depth == 0 {
                        return if bytes.get(i + 1) == Some(&b')') {
                            Some(i + 2)
                        } else {
                            None
                        };
                    }
                    depth -= 1;
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// Finds the position just past the `}` matching the `{` at `open`.
    ///
    /// The scan does not cross a newline, so an unmatched brace cannot
    /// swallow the rest of a script.
    fn find_matching_brace(&self, open: usize) -> Option<usize> {
        let bytes = self.src.as_bytes();
        let mut depth = 1;
        let mut i = open + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                b'\n' => return None,
                _ => {}
            }
            i += 1;
        }
        None
    }

    fn classify_word(text: &str, segments: &[Segment], leading_quoted: bool) -> TokenKind {
        if !leading_quoted {
            if assignment_name(text).is_some() {
                return TokenKind::Assignment;
            }
            if let [single] = segments {
                match single {
                    Segment::Single => return TokenKind::SingleQuoted,
                    Segment::Double => return TokenKind::DoubleQuoted,
                    Segment::Backtick => return TokenKind::Backtick,
                    Segment::DollarParen => return TokenKind::DollarParen,
                    Segment::DollarBrace => return TokenKind::DollarBrace,
                    Segment::Variable => return TokenKind::Variable,
                    Segment::Plain => {
                        if text.bytes().all(|c| c.is_ascii_digit()) {
                            return TokenKind::Number;
                        }
                        if let Some(keyword) = Keyword::from_word(text) {
                            return TokenKind::Keyword(keyword);
                        }
                    }
                    Segment::Escape => {}
                }
            }
        } else if let [single] = segments {
            match single {
                Segment::Single => return TokenKind::SingleQuoted,
                Segment::Double => return TokenKind::DoubleQuoted,
                _ => {}
            }
        }
        TokenKind::Word
    }
}
