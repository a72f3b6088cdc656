//! Constraint expression language.
//!
//! A bounded subset of the XPath-style predicate grammar used by XLSForm
//! constraints, implemented as a recursive-descent parser over a small token
//! stream and an evaluator over a row's normalized values.
//!
//! Grammar:
//!
//! ```text
//! expr     := and_expr ( 'or' and_expr )*
//! and_expr := cmp_expr ( 'and' cmp_expr )*
//! cmp_expr := primary ( ('=' | '!=' | '<' | '<=' | '>' | '>=') primary )?
//! primary  := '.' | '${' name '}' | number | string
//!           | '(' expr ')' | 'not' '(' expr ')' | 'regex' '(' expr ',' string ')'
//! ```
//!
//! Evaluation is fail-closed: parse failures, undeclared references, and
//! references to cells that failed their own type check all surface as
//! `EvalError`, never as a silently satisfied constraint.

use std::collections::BTreeMap;

use regex::Regex;
use thiserror::Error;

use xform_model::FormSchema;

use crate::checks::Normalized;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("could not parse expression: {0}")]
    Parse(String),
    #[error("reference to undeclared question '{0}'")]
    UnknownReference(String),
    #[error("referenced question '{0}' has no usable value in this row")]
    InvalidReference(String),
    #[error("ordering comparison '{0}' requires numeric operands")]
    NonNumericOrdering(&'static str),
    #[error("invalid regex pattern '{pattern}': {message}")]
    BadPattern { pattern: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The candidate value of the question under validation.
    Dot,
    /// `${name}`: a sibling question's value in the same row.
    Ref(String),
    Number(f64),
    Str(String),
    Cmp {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Regex {
        arg: Box<Expr>,
        pattern: String,
    },
}

/// Outcome of validating one sibling cell, as seen by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum CellState {
    /// Passed type validation; carries the normalized value.
    Valid(Normalized),
    /// Failed type validation; any reference to it is an evaluation error.
    Invalid,
    /// Blank cell; references resolve to the empty string.
    Missing,
}

/// Row context for one constraint evaluation.
pub struct EvalContext<'a> {
    pub schema: &'a FormSchema,
    /// Normalized candidate value (the cell already passed type checks).
    pub candidate: &'a Normalized,
    /// Original raw text of the candidate, used by `regex(., ...)`.
    pub candidate_raw: &'a str,
    /// Sibling cell states keyed by question name.
    pub row: &'a BTreeMap<String, CellState>,
}

/// Parse and evaluate an expression against a row context.
pub fn evaluate(expression: &str, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
    let expr = parse(expression)?;
    let value = eval_expr(&expr, ctx)?;
    Ok(truthy(&value))
}

/// Parse an expression into a tree without evaluating it.
pub fn parse(expression: &str) -> Result<Expr, EvalError> {
    let tokens = lex(expression)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(EvalError::Parse(format!(
            "unexpected trailing input in '{expression}'"
        )));
    }
    Ok(expr)
}

// ---------------------------------------------------------------------------
// Lexer

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Dot,
    LParen,
    RParen,
    Comma,
    And,
    Or,
    Not,
    Regex,
    Number(f64),
    Str(String),
    Ref(String),
    Op(CmpOp),
}

fn lex(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&ch) = chars.peek() {
        match ch {
            ch if ch.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Op(CmpOp::Eq));
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err(EvalError::Parse("expected '=' after '!'".to_string()));
                }
                tokens.push(Token::Op(CmpOp::Ne));
            }
            '<' => {
                chars.next();
                let op = if chars.next_if_eq(&'=').is_some() {
                    CmpOp::Le
                } else {
                    CmpOp::Lt
                };
                tokens.push(Token::Op(op));
            }
            '>' => {
                chars.next();
                let op = if chars.next_if_eq(&'=').is_some() {
                    CmpOp::Ge
                } else {
                    CmpOp::Gt
                };
                tokens.push(Token::Op(op));
            }
            '\'' | '"' => {
                let quote = ch;
                chars.next();
                let mut literal = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == quote {
                        closed = true;
                        break;
                    }
                    literal.push(next);
                }
                if !closed {
                    return Err(EvalError::Parse("unterminated string literal".to_string()));
                }
                tokens.push(Token::Str(literal));
            }
            '$' => {
                chars.next();
                if chars.next_if_eq(&'{').is_none() {
                    return Err(EvalError::Parse("expected '{' after '$'".to_string()));
                }
                let mut name = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    name.push(next);
                }
                if !closed || name.trim().is_empty() {
                    return Err(EvalError::Parse("unterminated question reference".to_string()));
                }
                tokens.push(Token::Ref(name.trim().to_string()));
            }
            '.' => {
                chars.next();
                // `.5` is a number; a bare `.` is the candidate value.
                if chars.peek().is_some_and(char::is_ascii_digit) {
                    let mut text = String::from("0.");
                    while let Some(digit) = chars.next_if(char::is_ascii_digit) {
                        text.push(digit);
                    }
                    tokens.push(number_token(&text)?);
                } else {
                    tokens.push(Token::Dot);
                }
            }
            ch if ch.is_ascii_digit() || ch == '-' || ch == '+' => {
                chars.next();
                let mut text = String::from(ch);
                let mut seen_point = false;
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() || (next == '.' && !seen_point) {
                        seen_point |= next == '.';
                        text.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(number_token(&text)?);
            }
            ch if ch.is_ascii_alphabetic() || ch == '_' => {
                let mut word = String::new();
                while let Some(next) =
                    chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_')
                {
                    word.push(next);
                }
                match word.as_str() {
                    "and" => tokens.push(Token::And),
                    "or" => tokens.push(Token::Or),
                    "not" => tokens.push(Token::Not),
                    "regex" => tokens.push(Token::Regex),
                    other => {
                        return Err(EvalError::Parse(format!(
                            "unexpected identifier '{other}' (question references use ${{name}})"
                        )));
                    }
                }
            }
            other => {
                return Err(EvalError::Parse(format!("unexpected character '{other}'")));
            }
        }
    }
    Ok(tokens)
}

fn number_token(text: &str) -> Result<Token, EvalError> {
    text.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| EvalError::Parse(format!("invalid number literal '{text}'")))
}

// ---------------------------------------------------------------------------
// Parser

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
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), EvalError> {
        match self.next() {
            Some(token) if token == *expected => Ok(()),
            _ => Err(EvalError::Parse(format!("expected {what}"))),
        }
    }

    fn or_expr(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.next();
            let rhs = self.and_expr()?;
            expr = Expr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.cmp_expr()?;
        while self.peek() == Some(&Token::And) {
            self.next();
            let rhs = self.cmp_expr()?;
            expr = Expr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn cmp_expr(&mut self) -> Result<Expr, EvalError> {
        let lhs = self.primary()?;
        if let Some(Token::Op(op)) = self.peek().cloned() {
            self.next();
            let rhs = self.primary()?;
            return Ok(Expr::Cmp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.next() {
            Some(Token::Dot) => Ok(Expr::Dot),
            Some(Token::Ref(name)) => Ok(Expr::Ref(name)),
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Str(value)) => Ok(Expr::Str(value)),
            Some(Token::LParen) => {
                let expr = self.or_expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(expr)
            }
            Some(Token::Not) => {
                self.expect(&Token::LParen, "'(' after 'not'")?;
                let inner = self.or_expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(Expr::Not(Box::new(inner)))
            }
            Some(Token::Regex) => {
                self.expect(&Token::LParen, "'(' after 'regex'")?;
                let arg = self.primary()?;
                self.expect(&Token::Comma, "',' in regex()")?;
                let pattern = match self.next() {
                    Some(Token::Str(pattern)) => pattern,
                    _ => {
                        return Err(EvalError::Parse(
                            "regex() pattern must be a string literal".to_string(),
                        ));
                    }
                };
                self.expect(&Token::RParen, "')'")?;
                Ok(Expr::Regex {
                    arg: Box::new(arg),
                    pattern,
                })
            }
            other => Err(EvalError::Parse(format!(
                "expected a value, found {other:?}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluator

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
}

fn eval_expr(expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    match expr {
        Expr::Dot => Ok(value_of(ctx.candidate)),
        Expr::Ref(name) => resolve_reference(name, ctx),
        Expr::Number(value) => Ok(Value::Number(*value)),
        Expr::Str(value) => Ok(Value::Text(value.clone())),
        Expr::Cmp { op, lhs, rhs } => {
            let lhs = eval_expr(lhs, ctx)?;
            let rhs = eval_expr(rhs, ctx)?;
            compare(*op, &lhs, &rhs).map(Value::Bool)
        }
        Expr::And(lhs, rhs) => {
            if !truthy(&eval_expr(lhs, ctx)?) {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(truthy(&eval_expr(rhs, ctx)?)))
        }
        Expr::Or(lhs, rhs) => {
            if truthy(&eval_expr(lhs, ctx)?) {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(truthy(&eval_expr(rhs, ctx)?)))
        }
        Expr::Not(inner) => Ok(Value::Bool(!truthy(&eval_expr(inner, ctx)?))),
        Expr::Regex { arg, pattern } => {
            // regex() matches the textual form; for `.` that is the raw cell
            // text, so numeric normalization never changes what the pattern
            // sees.
            let text = match arg.as_ref() {
                Expr::Dot => ctx.candidate_raw.to_string(),
                other => text_of(&eval_expr(other, ctx)?),
            };
            let full = format!("^(?:{pattern})$");
            let compiled = Regex::new(&full).map_err(|error| EvalError::BadPattern {
                pattern: pattern.clone(),
                message: error.to_string(),
            })?;
            Ok(Value::Bool(compiled.is_match(&text)))
        }
    }
}

fn resolve_reference(name: &str, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    if ctx.schema.question(name).is_none() {
        return Err(EvalError::UnknownReference(name.to_string()));
    }
    match ctx.row.get(name) {
        Some(CellState::Valid(normalized)) => Ok(value_of(normalized)),
        Some(CellState::Invalid) => Err(EvalError::InvalidReference(name.to_string())),
        // Blank cell, or the question has no column in this dataset.
        Some(CellState::Missing) | None => Ok(Value::Text(String::new())),
    }
}

fn value_of(normalized: &Normalized) -> Value {
    match normalized {
        Normalized::Integer(value) => Value::Number(*value as f64),
        Normalized::Decimal(value) => Value::Number(*value),
        Normalized::Text(value) => Value::Text(value.clone()),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => *number != 0.0,
        Value::Text(text) => !text.is_empty(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => Some(*number),
        Value::Text(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Number(number) => {
            if number.fract() == 0.0 && number.abs() < 1e15 {
                format!("{}", *number as i64)
            } else {
                number.to_string()
            }
        }
        Value::Text(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
    }
}

fn compare(op: CmpOp, lhs: &Value, rhs: &Value) -> Result<bool, EvalError> {
    // Numeric comparison whenever both sides coerce to numbers; equality
    // falls back to string comparison, ordering does not.
    if let (Some(left), Some(right)) = (as_number(lhs), as_number(rhs)) {
        return Ok(match op {
            CmpOp::Eq => left == right,
            CmpOp::Ne => left != right,
            CmpOp::Lt => left < right,
            CmpOp::Le => left <= right,
            CmpOp::Gt => left > right,
            CmpOp::Ge => left >= right,
        });
    }
    match op {
        CmpOp::Eq => Ok(text_of(lhs) == text_of(rhs)),
        CmpOp::Ne => Ok(text_of(lhs) != text_of(rhs)),
        other => Err(EvalError::NonNumericOrdering(other.symbol())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xform_model::{Question, QuestionType};

    fn schema() -> FormSchema {
        FormSchema::new(
            vec![
                Question::new("age", QuestionType::Integer),
                Question::new("weight", QuestionType::Decimal),
                Question::new("name", QuestionType::Text),
            ],
            vec![],
        )
        .expect("schema")
    }

    fn eval_with(
        expression: &str,
        candidate: Normalized,
        raw: &str,
        row: BTreeMap<String, CellState>,
    ) -> Result<bool, EvalError> {
        let schema = schema();
        let ctx = EvalContext {
            schema: &schema,
            candidate: &candidate,
            candidate_raw: raw,
            row: &row,
        };
        evaluate(expression, &ctx)
    }

    fn eval_simple(expression: &str, candidate: Normalized, raw: &str) -> Result<bool, EvalError> {
        eval_with(expression, candidate, raw, BTreeMap::new())
    }

    #[test]
    fn numeric_comparisons_use_normalized_values() {
        assert_eq!(eval_simple(". > 0", Normalized::Decimal(-5.0), "-5"), Ok(false));
        assert_eq!(eval_simple(". > 0", Normalized::Decimal(0.5), "0.5"), Ok(true));
        assert_eq!(eval_simple(". >= 0 and . < 120", Normalized::Integer(30), "30"), Ok(true));
        assert_eq!(
            eval_simple(". >= 0 and . < 120", Normalized::Integer(150), "150"),
            Ok(false)
        );
    }

    #[test]
    fn string_equality_and_boolean_combinators() {
        assert_eq!(
            eval_simple(". = 'yes' or . = 'no'", Normalized::Text("no".to_string()), "no"),
            Ok(true)
        );
        assert_eq!(
            eval_simple(". = 'yes' or . = 'no'", Normalized::Text("maybe".to_string()), "maybe"),
            Ok(false)
        );
        assert_eq!(
            eval_simple("not(. = 'yes')", Normalized::Text("no".to_string()), "no"),
            Ok(true)
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        // Parsed as (. = 1 and . = 2) or . = 3, which is true for 3.
        assert_eq!(
            eval_simple(". = 1 and . = 2 or . = 3", Normalized::Integer(3), "3"),
            Ok(true)
        );
        assert_eq!(
            eval_simple(". = 1 and (. = 2 or . = 3)", Normalized::Integer(3), "3"),
            Ok(false)
        );
    }

    #[test]
    fn sibling_references_resolve_normalized_values() {
        let mut row = BTreeMap::new();
        row.insert("age".to_string(), CellState::Valid(Normalized::Integer(40)));
        assert_eq!(
            eval_with(". < ${age}", Normalized::Integer(30), "30", row),
            Ok(true)
        );
    }

    #[test]
    fn invalid_sibling_is_an_evaluation_error() {
        let mut row = BTreeMap::new();
        row.insert("age".to_string(), CellState::Invalid);
        assert_eq!(
            eval_with(". < ${age}", Normalized::Integer(30), "30", row),
            Err(EvalError::InvalidReference("age".to_string()))
        );
    }

    #[test]
    fn missing_sibling_resolves_to_empty_string() {
        let mut row = BTreeMap::new();
        row.insert("name".to_string(), CellState::Missing);
        assert_eq!(
            eval_with("${name} = ''", Normalized::Integer(1), "1", row),
            Ok(true)
        );
    }

    #[test]
    fn undeclared_reference_is_an_evaluation_error() {
        assert_eq!(
            eval_simple(". < ${bogus}", Normalized::Integer(30), "30"),
            Err(EvalError::UnknownReference("bogus".to_string()))
        );
    }

    #[test]
    fn parse_errors_are_reported_not_swallowed() {
        assert!(matches!(
            eval_simple(". >", Normalized::Integer(1), "1"),
            Err(EvalError::Parse(_))
        ));
        assert!(matches!(
            eval_simple(". ! 3", Normalized::Integer(1), "1"),
            Err(EvalError::Parse(_))
        ));
        assert!(matches!(
            eval_simple("frobnicate(.)", Normalized::Integer(1), "1"),
            Err(EvalError::Parse(_))
        ));
    }

    #[test]
    fn ordering_non_numeric_operands_is_an_error() {
        assert_eq!(
            eval_simple(". < 'abc'", Normalized::Text("xyz".to_string()), "xyz"),
            Err(EvalError::NonNumericOrdering("<"))
        );
    }

    #[test]
    fn regex_matches_raw_text_fully() {
        assert_eq!(
            eval_simple(
                "regex(., '[0-9]{4}')",
                Normalized::Text("1234".to_string()),
                "1234"
            ),
            Ok(true)
        );
        assert_eq!(
            eval_simple(
                "regex(., '[0-9]{4}')",
                Normalized::Text("12345".to_string()),
                "12345"
            ),
            Ok(false)
        );
        // Pattern sees the raw text, not the normalized number.
        assert_eq!(
            eval_simple("regex(., '0[0-9]')", Normalized::Integer(1), "01"),
            Ok(true)
        );
        assert!(matches!(
            eval_simple("regex(., '[')", Normalized::Integer(1), "1"),
            Err(EvalError::BadPattern { .. })
        ));
    }

    #[test]
    fn decimal_point_literals_parse() {
        assert_eq!(eval_simple(". > .5", Normalized::Decimal(0.75), "0.75"), Ok(true));
        assert_eq!(eval_simple(". > 0.5", Normalized::Decimal(0.25), "0.25"), Ok(false));
    }
}
