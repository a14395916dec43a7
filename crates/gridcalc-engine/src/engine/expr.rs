//! Evaluation of fully substituted formula text.
//!
//! By the time text reaches this module every reference and function call has
//! been replaced by a literal, so the language is tiny:
//!
//! ```text
//! expression     --> additive EOF
//! additive       --> multiplicative ( ("+" | "-") multiplicative )*
//! multiplicative --> unary ( ("*" | "/") unary )*
//! unary          --> ("-" | "+") unary | primary
//! primary        --> NUMBER | STRING | "(" additive ")"
//! ```
//!
//! Strings are double-quoted with no escapes. They may appear on their own
//! but never as an operand: there is no concatenation.

use super::error::FormulaError;

/// Result of evaluating an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprValue {
    Number(f64),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Evaluate an arithmetic expression over numbers and string literals.
pub fn evaluate_expression(text: &str) -> Result<ExprValue, FormulaError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(invalid("empty expression"));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.additive()?;
    if let Some(token) = parser.peek() {
        return Err(invalid(format!("unexpected {:?}", token)));
    }
    Ok(value)
}

fn invalid(message: impl Into<String>) -> FormulaError {
    FormulaError::InvalidExpression(message.into())
}

fn tokenize(text: &str) -> Result<Vec<Token>, FormulaError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            b'-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            b'*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            b'/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            b'(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            b')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            b'"' => {
                let start = i + 1;
                let end = text[start..]
                    .find('"')
                    .map(|offset| start + offset)
                    .ok_or_else(|| invalid("unterminated string literal"))?;
                tokens.push(Token::Text(text[start..end].to_string()));
                i = end + 1;
            }
            b'0'..=b'9' | b'.' => {
                let end = scan_number(bytes, i);
                let literal = &text[i..end];
                let n = literal
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("malformed number {literal:?}")))?;
                tokens.push(Token::Number(n));
                i = end;
            }
            _ => {
                let rest = &text[i..];
                let word: String = rest
                    .chars()
                    .take_while(|c| !c.is_whitespace() && !"+-*/()\"".contains(*c))
                    .collect();
                let shown = if word.is_empty() {
                    rest.chars().next().map(String::from).unwrap_or_default()
                } else {
                    word
                };
                return Err(invalid(format!("unexpected token {shown:?}")));
            }
        }
    }

    Ok(tokens)
}

/// End offset of the number literal starting at `start`: digits, an optional
/// fraction, and an optional exponent.
fn scan_number(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn additive(&mut self) -> Result<ExprValue, FormulaError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => Token::Plus,
                Some(Token::Minus) => Token::Minus,
                _ => break,
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            let (l, r) = (number(left)?, number(right)?);
            left = ExprValue::Number(if op == Token::Plus { l + r } else { l - r });
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<ExprValue, FormulaError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => Token::Star,
                Some(Token::Slash) => Token::Slash,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary()?;
            let (l, r) = (number(left)?, number(right)?);
            left = ExprValue::Number(if op == Token::Star { l * r } else { l / r });
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<ExprValue, FormulaError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(ExprValue::Number(-number(self.unary()?)?))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                Ok(ExprValue::Number(number(self.unary()?)?))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<ExprValue, FormulaError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(ExprValue::Number(n)),
            Some(Token::Text(s)) => Ok(ExprValue::Text(s)),
            Some(Token::LParen) => {
                let value = self.additive()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(invalid("expected ')'")),
                }
            }
            Some(token) => Err(invalid(format!("unexpected {:?}", token))),
            None => Err(invalid("unexpected end of expression")),
        }
    }
}

fn number(value: ExprValue) -> Result<f64, FormulaError> {
    match value {
        ExprValue::Number(n) => Ok(n),
        ExprValue::Text(s) => Err(invalid(format!("string operand {s:?} in arithmetic"))),
    }
}
