//! Expression parser.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := signed (('*' | '/') signed)*
//! signed  := ('-' | '+') signed | power
//! power   := atom ('^' signed)?          // `**` is accepted for `^`
//! atom    := number | name | name '(' sum ')' | '(' sum ')'
//! ```
//!
//! Bare names are value variables except `pi` and `E`. Negation binds
//! looser than powers, so `-x^2` is `-(x^2)` while `x^-1` needs no
//! parentheses.

use super::expr::{BinaryOperator, Constant, Expr, Function, UnaryOperator, Var};
use thiserror::Error;

/// Parse error with location info
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the input
    pub position: usize,
}

impl ParseError {
    fn at(position: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Num(f64),
    Name(&'a str),
    Op(char),
    Open,
    Close,
    End,
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::Num(n) => format!("number {}", n),
            Token::Name(name) => format!("'{}'", name),
            Token::Op(c) => format!("'{}'", c),
            Token::Open => "'('".to_string(),
            Token::Close => "')'".to_string(),
            Token::End => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Spanned<'a> {
    token: Token<'a>,
    start: usize,
}

/// End of the numeric literal beginning at `start`.
///
/// An exponent marker is only consumed when digits follow it, so in `2E`
/// the `E` is left for the next token.
fn scan_number(src: &str, start: usize) -> usize {
    let bytes = src.as_bytes();
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = digits(start);
    if bytes.get(end) == Some(&b'.') {
        end = digits(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            end = digits(exp);
        }
    }
    end
}

fn scan_name(src: &str, start: usize) -> usize {
    src[start..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .map_or(src.len(), |len| start + len)
}

fn tokenize(src: &str) -> Result<Vec<Spanned<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while let Some(c) = src[i..].chars().next() {
        let start = i;
        let token = match c {
            c if c.is_whitespace() => {
                i += c.len_utf8();
                continue;
            }
            '*' if src[i..].starts_with("**") => {
                i += 2;
                Token::Op('^')
            }
            '+' | '-' | '*' | '/' | '^' => {
                i += 1;
                Token::Op(c)
            }
            '(' => {
                i += 1;
                Token::Open
            }
            ')' => {
                i += 1;
                Token::Close
            }
            c if c.is_ascii_digit() || c == '.' => {
                i = scan_number(src, i);
                let text = &src[start..i];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ParseError::at(start, format!("Invalid number: '{}'", text)))?;
                Token::Num(value)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                i = scan_name(src, i);
                Token::Name(&src[start..i])
            }
            other => {
                return Err(ParseError::at(start, format!("Unexpected character: '{}'", other)));
            }
        };
        tokens.push(Spanned { token, start });
    }

    tokens.push(Spanned {
        token: Token::End,
        start: src.len(),
    });
    Ok(tokens)
}

fn node(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Left-associative operators with their binding strength.
fn infix(token: Token<'_>) -> Option<(BinaryOperator, u8)> {
    match token {
        Token::Op('+') => Some((BinaryOperator::Add, 1)),
        Token::Op('-') => Some((BinaryOperator::Sub, 1)),
        Token::Op('*') => Some((BinaryOperator::Mul, 2)),
        Token::Op('/') => Some((BinaryOperator::Div, 2)),
        _ => None,
    }
}

struct Parser<'a> {
    tokens: Vec<Spanned<'a>>,
    cursor: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Token<'a> {
        self.tokens[self.cursor].token
    }

    fn position(&self) -> usize {
        self.tokens[self.cursor].start
    }

    /// Consume the current token. `End` is never consumed.
    fn bump(&mut self) -> Token<'a> {
        let token = self.peek();
        if token != Token::End {
            self.cursor += 1;
        }
        token
    }

    fn unexpected<T>(&self, context: &str) -> Result<T, ParseError> {
        Err(ParseError::at(
            self.position(),
            format!("Unexpected {} {}", self.peek().describe(), context),
        ))
    }

    fn close(&mut self, context: &str) -> Result<(), ParseError> {
        if self.peek() == Token::Close {
            self.bump();
            Ok(())
        } else {
            Err(ParseError::at(
                self.position(),
                format!("Expected ')' {}, found {}", context, self.peek().describe()),
            ))
        }
    }

    fn sum(&mut self) -> Result<Expr, ParseError> {
        self.binary(1)
    }

    fn binary(&mut self, min_strength: u8) -> Result<Expr, ParseError> {
        let mut left = self.signed()?;
        while let Some((op, strength)) = infix(self.peek()) {
            if strength < min_strength {
                break;
            }
            self.bump();
            let right = self.binary(strength + 1)?;
            left = node(op, left, right);
        }
        Ok(left)
    }

    fn signed(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Token::Op('-') => {
                self.bump();
                Ok(Expr::UnaryOp {
                    op: UnaryOperator::Neg,
                    operand: Box::new(self.signed()?),
                })
            }
            Token::Op('+') => {
                self.bump();
                self.signed()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.atom()?;
        if self.peek() != Token::Op('^') {
            return Ok(base);
        }
        self.bump();
        let exponent = self.signed()?;
        Ok(node(BinaryOperator::Pow, base, exponent))
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        let start = self.position();
        match self.peek() {
            Token::Num(n) => {
                self.bump();
                Ok(Expr::Number(n))
            }
            Token::Name(name) => {
                self.bump();
                if self.peek() != Token::Open {
                    return Ok(match name {
                        "pi" => Expr::Constant(Constant::Pi),
                        "E" => Expr::Constant(Constant::E),
                        _ => Expr::Var(Var::value(name)),
                    });
                }
                let func = Function::from_name(name)
                    .ok_or_else(|| ParseError::at(start, format!("Unknown function: '{}'", name)))?;
                self.bump();
                let arg = self.sum()?;
                self.close("after function argument")?;
                Ok(Expr::FnCall {
                    func,
                    arg: Box::new(arg),
                })
            }
            Token::Open => {
                self.bump();
                let inner = self.sum()?;
                self.close("to match '('")?;
                Ok(inner)
            }
            _ => self.unexpected("where an operand was expected"),
        }
    }
}

/// Parse an expression string into an AST
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::at(0, "Empty expression"));
    }
    let mut parser = Parser {
        tokens: tokenize(input)?,
        cursor: 0,
    };
    let expr = parser.sum()?;
    if parser.peek() != Token::End {
        return parser.unexpected("after expression");
    }
    Ok(expr)
}
