//! Strict literal grammar for option values.
//!
//! Accepts constants only: numbers, strings, `True`/`False`, `None`/`null`,
//! lists, tuples and mappings. There is no expression evaluation; any other
//! name or operator is a parse error. Callers that need a total function use
//! [`crate::core::evaluate::evaluate`], which degrades failures to a fallback.
//!
//! Whitespace and newlines are free inside brackets. At the top level a bare
//! comma-separated sequence is a tuple and only leading/trailing newlines are
//! allowed. `#` comments run to end of line.
use std::fmt;

use crate::core::value::Value;

const MAX_DEPTH: usize = 100;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiteralError {
    offset: usize,
    reason: &'static str,
}

impl LiteralError {
    fn new(offset: usize, reason: &'static str) -> Self {
        Self { offset, reason }
    }

    /// Byte offset into the input where parsing stopped.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.reason, self.offset)
    }
}

impl std::error::Error for LiteralError {}

pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
        end: input.len(),
    };
    parser.parse_top()
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Int(u128),
    Float(f64),
    Str(String),
    Name(String),
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Plus,
    Minus,
    Newline,
}

#[derive(Debug)]
struct Spanned {
    token: Token,
    offset: usize,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
    out: Vec<Spanned>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
            out: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, skip: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(skip)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn push(&mut self, token: Token, offset: usize) {
        self.out.push(Spanned { token, offset });
    }

    fn tokenize(mut self) -> Result<Vec<Spanned>, LiteralError> {
        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                ' ' | '\t' | '\r' | '\x0c' => {
                    self.bump();
                }
                '\n' => {
                    self.bump();
                    if self.depth == 0 {
                        self.push(Token::Newline, start);
                    }
                }
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some('\n') => {}
                        Some('\r') if self.peek() == Some('\n') => {
                            self.bump();
                        }
                        _ => return Err(LiteralError::new(start, "unexpected backslash")),
                    }
                }
                '[' | '(' | '{' => {
                    self.bump();
                    self.depth += 1;
                    let token = match ch {
                        '[' => Token::LBracket,
                        '(' => Token::LParen,
                        _ => Token::LBrace,
                    };
                    self.push(token, start);
                }
                ']' | ')' | '}' => {
                    self.bump();
                    self.depth = self.depth.saturating_sub(1);
                    let token = match ch {
                        ']' => Token::RBracket,
                        ')' => Token::RParen,
                        _ => Token::RBrace,
                    };
                    self.push(token, start);
                }
                ',' => {
                    self.bump();
                    self.push(Token::Comma, start);
                }
                ':' => {
                    self.bump();
                    self.push(Token::Colon, start);
                }
                '+' => {
                    self.bump();
                    self.push(Token::Plus, start);
                }
                '-' => {
                    self.bump();
                    self.push(Token::Minus, start);
                }
                '\'' | '"' => {
                    let token = self.lex_string(false)?;
                    self.push(token, start);
                }
                '0'..='9' => {
                    let token = self.lex_number()?;
                    self.push(token, start);
                }
                '.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                    let token = self.lex_number()?;
                    self.push(token, start);
                }
                c if is_name_start(c) => {
                    let token = self.lex_name_or_prefixed_string()?;
                    self.push(token, start);
                }
                _ => return Err(LiteralError::new(start, "unexpected character")),
            }
        }
        Ok(self.out)
    }

    fn lex_name_or_prefixed_string(&mut self) -> Result<Token, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(is_name_continue) {
            self.bump();
        }
        let input = self.input;
        let name = &input[start..self.pos];
        if matches!(self.peek(), Some('\'' | '"')) {
            return match name.to_ascii_lowercase().as_str() {
                "r" => self.lex_string(true),
                "u" => self.lex_string(false),
                _ => Err(LiteralError::new(start, "unsupported string prefix")),
            };
        }
        Ok(Token::Name(name.to_string()))
    }

    fn lex_string(&mut self, raw: bool) -> Result<Token, LiteralError> {
        let start = self.pos;
        let quote = match self.bump() {
            Some(q) => q,
            None => return Err(LiteralError::new(start, "expected string")),
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        let mut out = String::new();
        loop {
            let ch = match self.bump() {
                Some(ch) => ch,
                None => return Err(LiteralError::new(start, "unterminated string")),
            };
            if ch == quote {
                if !triple {
                    break;
                }
                if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                    self.bump();
                    self.bump();
                    break;
                }
                out.push(ch);
                continue;
            }
            match ch {
                '\n' if !triple => {
                    return Err(LiteralError::new(start, "unterminated string"));
                }
                '\\' if raw => {
                    out.push('\\');
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                }
                '\\' => self.lex_escape(&mut out)?,
                c => out.push(c),
            }
        }
        Ok(Token::Str(out))
    }

    fn lex_escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let at = self.pos;
        let ch = match self.bump() {
            Some(ch) => ch,
            None => return Err(LiteralError::new(at, "unterminated string")),
        };
        match ch {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut code = ch.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.bump();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).ok_or(LiteralError::new(at, "bad escape"))?);
            }
            'x' => out.push(self.lex_hex_escape(at, 2)?),
            'u' => out.push(self.lex_hex_escape(at, 4)?),
            'U' => out.push(self.lex_hex_escape(at, 8)?),
            'N' => return Err(LiteralError::new(at, "named escapes are not supported")),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn lex_hex_escape(&mut self, at: usize, len: usize) -> Result<char, LiteralError> {
        let mut code = 0u32;
        for _ in 0..len {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or(LiteralError::new(at, "truncated escape"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(LiteralError::new(at, "bad escape"))
    }

    fn lex_number(&mut self) -> Result<Token, LiteralError> {
        let start = self.pos;
        if self.peek() == Some('0') {
            let radix = match self.peek_at(1) {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.bump();
                self.bump();
                let mut digits = String::new();
                if self.peek() == Some('_') {
                    self.bump();
                }
                self.lex_digits(radix, &mut digits)?;
                if digits.is_empty() {
                    return Err(LiteralError::new(start, "missing digits after prefix"));
                }
                self.reject_suffix(start)?;
                let value = u128::from_str_radix(&digits, radix)
                    .map_err(|_| LiteralError::new(start, "integer out of range"))?;
                return Ok(Token::Int(value));
            }
        }

        let mut int_part = String::new();
        self.lex_digits(10, &mut int_part)?;
        let mut is_float = false;
        let mut frac_part = String::new();
        let mut exp_part = String::new();

        if self.peek() == Some('.') {
            is_float = true;
            self.bump();
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.lex_digits(10, &mut frac_part)?;
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = self.peek_at(1);
            let has_sign = matches!(sign, Some('+' | '-'));
            let first_digit = if has_sign { self.peek_at(2) } else { sign };
            if first_digit.is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.bump();
                if has_sign && self.bump() == Some('-') {
                    exp_part.push('-');
                }
                self.lex_digits(10, &mut exp_part)?;
            }
        }
        self.reject_suffix(start)?;

        if is_float {
            let mut text = if int_part.is_empty() {
                "0".to_string()
            } else {
                int_part
            };
            text.push('.');
            text.push_str(if frac_part.is_empty() { "0" } else { &frac_part });
            if !exp_part.is_empty() {
                text.push('e');
                text.push_str(&exp_part);
            }
            let value: f64 = text
                .parse()
                .map_err(|_| LiteralError::new(start, "malformed float"))?;
            return Ok(Token::Float(value));
        }

        if int_part.len() > 1 && int_part.starts_with('0') && int_part.bytes().any(|b| b != b'0')
        {
            return Err(LiteralError::new(start, "leading zeros in integer"));
        }
        let value: u128 = int_part
            .parse()
            .map_err(|_| LiteralError::new(start, "integer out of range"))?;
        Ok(Token::Int(value))
    }

    /// Consumes `digit ('_'? digit)*`, appending the digits without separators.
    fn lex_digits(&mut self, radix: u32, out: &mut String) -> Result<(), LiteralError> {
        while let Some(ch) = self.peek() {
            if ch.is_digit(radix) {
                out.push(ch);
                self.bump();
            } else if ch == '_' && !out.is_empty() {
                let next = self.peek_at(1);
                if !next.is_some_and(|c| c.is_digit(radix)) {
                    return Err(LiteralError::new(self.pos, "misplaced digit separator"));
                }
                self.bump();
            } else {
                break;
            }
        }
        Ok(())
    }

    fn reject_suffix(&self, start: usize) -> Result<(), LiteralError> {
        match self.peek() {
            Some('j' | 'J') => Err(LiteralError::new(start, "complex numbers are not supported")),
            Some(c) if is_name_continue(c) => Err(LiteralError::new(start, "malformed number")),
            _ => Ok(()),
        }
    }
}

fn is_name_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_name_continue(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// A parsed value plus whether it may key a mapping. Lists and mappings may
/// not; tuples may when all their elements may.
struct Term {
    value: Value,
    hashable: bool,
}

impl Term {
    fn hashable(value: Value) -> Self {
        Self {
            value,
            hashable: true,
        }
    }

    fn unhashable(value: Value) -> Self {
        Self {
            value,
            hashable: false,
        }
    }
}

struct Parser<'t> {
    tokens: &'t [Spanned],
    pos: usize,
    depth: usize,
    end: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.offset)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos).map(|t| &t.token);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, reason: &'static str) -> Result<(), LiteralError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(LiteralError::new(self.offset(), reason))
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(&Token::Newline) {}
    }

    fn at_top_end(&self) -> bool {
        matches!(self.peek(), None | Some(Token::Newline))
    }

    fn parse_top(&mut self) -> Result<Value, LiteralError> {
        self.skip_newlines();
        if self.peek().is_none() {
            return Err(LiteralError::new(self.end, "empty input"));
        }
        let first = self.parse_value()?;
        let value = if self.peek() == Some(&Token::Comma) {
            let mut items = vec![first];
            while self.eat(&Token::Comma) {
                if self.at_top_end() {
                    break;
                }
                items.push(self.parse_value()?);
            }
            Value::List(items)
        } else {
            first
        };
        self.skip_newlines();
        if self.peek().is_some() {
            return Err(LiteralError::new(self.offset(), "unexpected trailing input"));
        }
        Ok(value)
    }

    fn enter(&mut self) -> Result<(), LiteralError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(LiteralError::new(self.offset(), "nesting too deep"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        self.parse_term().map(|term| term.value)
    }

    fn parse_term(&mut self) -> Result<Term, LiteralError> {
        let at = self.offset();
        let token = match self.next() {
            Some(token) => token.clone(),
            None => return Err(LiteralError::new(at, "unexpected end of input")),
        };
        let value = match token {
            Token::Int(n) => int_value(n, false, at)?,
            Token::Float(n) => Value::Float(n),
            Token::Plus | Token::Minus => {
                let negative = token == Token::Minus;
                let operand_at = self.offset();
                match self.next() {
                    Some(Token::Int(n)) => int_value(*n, negative, operand_at)?,
                    Some(Token::Float(n)) => Value::Float(if negative { -n } else { *n }),
                    _ => return Err(LiteralError::new(operand_at, "sign must precede a number")),
                }
            }
            Token::Str(s) => {
                let mut out = s;
                while let Some(Token::Str(next)) = self.peek() {
                    out.push_str(next);
                    self.pos += 1;
                }
                Value::Str(out)
            }
            Token::Name(name) => match name.as_str() {
                "True" => Value::Bool(true),
                "False" => Value::Bool(false),
                "None" | "null" => Value::None,
                _ => return Err(LiteralError::new(at, "names are not literals")),
            },
            Token::LBracket => {
                self.enter()?;
                let (items, _) = self.parse_sequence(&Token::RBracket)?;
                self.leave();
                return Ok(Term::unhashable(Value::List(items)));
            }
            Token::LParen => {
                self.enter()?;
                let term = self.parse_parenthesised()?;
                self.leave();
                return Ok(term);
            }
            Token::LBrace => {
                self.enter()?;
                let value = self.parse_mapping()?;
                self.leave();
                return Ok(Term::unhashable(value));
            }
            _ => return Err(LiteralError::new(at, "unexpected token")),
        };
        Ok(Term::hashable(value))
    }

    /// Items up to `close`, and whether every item is hashable.
    fn parse_sequence(&mut self, close: &Token) -> Result<(Vec<Value>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut hashable = true;
        if self.eat(close) {
            return Ok((items, hashable));
        }
        loop {
            let term = self.parse_term()?;
            hashable &= term.hashable;
            items.push(term.value);
            if self.eat(&Token::Comma) {
                if self.eat(close) {
                    return Ok((items, hashable));
                }
                continue;
            }
            self.expect(close, "expected closing bracket")?;
            return Ok((items, hashable));
        }
    }

    /// `()` and `(a, ...)` are tuples; `(a)` is just `a`.
    fn parse_parenthesised(&mut self) -> Result<Term, LiteralError> {
        if self.eat(&Token::RParen) {
            return Ok(Term::hashable(Value::List(Vec::new())));
        }
        let first = self.parse_term()?;
        if self.eat(&Token::RParen) {
            return Ok(first);
        }
        self.expect(&Token::Comma, "expected ',' or ')'")?;
        let (rest, rest_hashable) = self.parse_sequence(&Token::RParen)?;
        let mut items = vec![first.value];
        items.extend(rest);
        Ok(Term {
            value: Value::List(items),
            hashable: first.hashable && rest_hashable,
        })
    }

    fn parse_mapping(&mut self) -> Result<Value, LiteralError> {
        let mut entries: Vec<(Value, Value)> = Vec::new();
        if self.eat(&Token::RBrace) {
            return Ok(Value::Map(entries));
        }
        loop {
            let key_at = self.offset();
            let key = self.parse_term()?;
            if matches!(self.peek(), Some(Token::Comma | Token::RBrace)) {
                return Err(LiteralError::new(key_at, "set literals are not supported"));
            }
            self.expect(&Token::Colon, "expected ':' in mapping")?;
            let value = self.parse_value()?;
            if !key.hashable {
                return Err(LiteralError::new(key_at, "unhashable mapping key"));
            }
            let key = key.value;
            match entries.iter_mut().find(|(k, _)| k.key_eq(&key)) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }

            if self.eat(&Token::Comma) {
                if self.eat(&Token::RBrace) {
                    return Ok(Value::Map(entries));
                }
                continue;
            }
            self.expect(&Token::RBrace, "expected closing brace")?;
            return Ok(Value::Map(entries));
        }
    }
}

fn int_value(magnitude: u128, negative: bool, at: usize) -> Result<Value, LiteralError> {
    let signed = i128::try_from(magnitude)
        .map_err(|_| LiteralError::new(at, "integer out of range"))?;
    let signed = if negative { -signed } else { signed };
    i64::try_from(signed)
        .map(Value::Int)
        .map_err(|_| LiteralError::new(at, "integer out of range"))
}
