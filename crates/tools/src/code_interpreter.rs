//! Code interpreter tool — sandboxed arithmetic evaluation.
//!
//! Models wrap code in markdown fences and conversational filler, so the
//! input is cleaned first: fences stripped, `print(...)` unwrapped, and the
//! last non-comment line taken as the expression. Evaluation is a
//! recursive-descent arithmetic interpreter running entirely in process —
//! the sandbox boundary is "there is no interpreter to escape".

use async_trait::async_trait;
use memoclaw_core::error::ToolError;
use memoclaw_core::tool::Tool;

pub struct CodeInterpreterTool;

#[async_trait]
impl Tool for CodeInterpreterTool {
    fn name(&self) -> &str {
        "code_interpreter"
    }

    fn usage(&self) -> &str {
        "Evaluate an arithmetic expression, optionally inside a markdown code block. Supports +, -, *, /, parentheses, and decimal numbers."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let cleaned = clean_code(input);
        if cleaned.is_empty() {
            return Err(ToolError::InvalidInput(
                "no expression found in the input".into(),
            ));
        }

        match evaluate(&cleaned) {
            Ok(value) => {
                // Format nicely: remove trailing .0 for integers.
                let formatted = if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", value as i64)
                } else {
                    format!("{value}")
                };
                Ok(formatted)
            }
            Err(e) => Err(ToolError::ExecutionFailed {
                tool_name: "code_interpreter".into(),
                reason: e,
            }),
        }
    }
}

/// Strip markdown fences and conversational text around the expression.
///
/// Handles ```python … ``` and bare ``` … ``` blocks; outside a fence the
/// whole input is treated as code. Comment lines and a wrapping
/// `print(...)` are removed, and the last remaining line wins.
fn clean_code(input: &str) -> String {
    let trimmed = input.trim();

    // Extract the body of the first fenced block, if any.
    let body = match trimmed.find("```") {
        Some(start) => {
            let after = &trimmed[start + 3..];
            // Skip a language tag like "python" on the fence line
            let after = match after.find('\n') {
                Some(nl) if after[..nl].chars().all(|c| c.is_alphanumeric() || c.is_whitespace()) => {
                    &after[nl + 1..]
                }
                _ => after,
            };
            match after.find("```") {
                Some(end) => &after[..end],
                None => after,
            }
        }
        None => trimmed,
    };

    let line = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .next_back()
        .unwrap_or("");

    // Unwrap print(...)
    let line = line
        .strip_prefix("print(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(line);

    line.trim().to_string()
}

// ── Recursive-descent expression evaluator ────────────────────────────────

/// Evaluate an arithmetic expression string.
pub fn evaluate(expr: &str) -> Result<f64, String> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser::new(&tokens);
    let result = parser.parse_expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(format!(
            "Unexpected token at position {}: {:?}",
            parser.pos, parser.tokens[parser.pos]
        ));
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let num_str: String = chars[start..i].iter().collect();
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| format!("Invalid number: {num_str}"))?;
                tokens.push(Token::Number(num));
            }
            c => return Err(format!("Unexpected character: '{c}'")),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, String> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.consume();
                    left += self.parse_term()?;
                }
                Token::Minus => {
                    self.consume();
                    left -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // term = unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<f64, String> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.consume();
                    left *= self.parse_unary()?;
                }
                Token::Slash => {
                    self.consume();
                    let right = self.parse_unary()?;
                    if right == 0.0 {
                        return Err("Division by zero".into());
                    }
                    left /= right;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // unary = '-' unary | primary
    fn parse_unary(&mut self) -> Result<f64, String> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            let val = self.parse_unary()?;
            return Ok(-val);
        }
        self.parse_primary()
    }

    // primary = NUMBER | '(' expr ')'
    fn parse_primary(&mut self) -> Result<f64, String> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(*n),
            Some(Token::LParen) => {
                let val = self.parse_expr()?;
                match self.consume() {
                    Some(Token::RParen) => Ok(val),
                    _ => Err("Expected closing parenthesis".into()),
                }
            }
            Some(tok) => Err(format!("Unexpected token: {tok:?}")),
            None => Err("Unexpected end of expression".into()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
