//! Arithmetic calculator tool.
//!
//! Evaluates `+ - * /` expressions with parentheses and unary sign via a
//! small recursive-descent parser:
//!
//! ```text
//! expr   := term   (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := ('+' | '-') factor | number | '(' expr ')'
//! ```

use async_trait::async_trait;

use axle_core::{
    CoreError, ParameterDefinition, ParameterType, Result, ToolDefinition, ToolHandler,
    validate_arguments,
};

/// Evaluates arithmetic expressions.
pub struct CalculatorTool;

impl CalculatorTool {
    /// The tool's catalog entry.
    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            "calculate",
            "Evaluate an arithmetic expression with +, -, *, / and parentheses",
        )
        .with_parameter(ParameterDefinition::new(
            "expression",
            "The expression to evaluate, e.g. \"2 * (3 + 4)\"",
            ParameterType::String,
            true,
        ))
    }
}

#[async_trait]
impl ToolHandler for CalculatorTool {
    async fn call(&self, args: &str) -> Result<String> {
        let args = validate_arguments(&Self::definition(), args)?;
        let expression = args["expression"].as_str().unwrap_or_default();

        let value = evaluate(expression).map_err(|reason| CoreError::tool("calculate", reason))?;
        Ok(render(value))
    }
}

/// Integer-valued results render without a decimal point.
fn render(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Evaluate an expression, returning a reason string on failure.
pub fn evaluate(input: &str) -> std::result::Result<f64, String> {
    let mut parser = Parser {
        input: input.as_bytes(),
        pos: 0,
    };
    let value = parser.expr()?;
    parser.skip_whitespace();
    if parser.pos < parser.input.len() {
        return Err(format!(
            "unexpected character `{}` at position {}",
            parser.input[parser.pos] as char, parser.pos
        ));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.input.get(self.pos).copied()
    }

    fn expr(&mut self) -> std::result::Result<f64, String> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> std::result::Result<f64, String> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> std::result::Result<f64, String> {
        match self.peek() {
            Some(b'+') => {
                self.pos += 1;
                self.factor()
            }
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some(b'(') => {
                self.pos += 1;
                let value = self.expr()?;
                match self.peek() {
                    Some(b')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            Some(c) => Err(format!(
                "unexpected character `{}` at position {}",
                c as char, self.pos
            )),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn number(&mut self) -> std::result::Result<f64, String> {
        self.skip_whitespace();
        let start = self.pos;
        while self.pos < self.input.len()
            && (self.input[self.pos].is_ascii_digit() || self.input[self.pos] == b'.')
        {
            self.pos += 1;
        }

        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| "invalid number".to_string())?;
        text.parse::<f64>()
            .map_err(|_| format!("invalid number `{text}`"))
    }
}
