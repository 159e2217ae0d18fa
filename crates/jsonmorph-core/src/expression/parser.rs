//! Expression parser
//!
//! Recursive descent parser for the expression language used by `$condition`
//! and `$apply`. Precedence from lowest to highest: ternary, `||`, `&&`,
//! equality, comparison, additive, multiplicative, unary, primary.
//!
//! A program may be wrapped as a function body: `return value * 2;` parses
//! the same as `value * 2`.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use super::error::ExpressionError;
use super::ExpressionResult;
use serde_json::{Number, Value};
use std::iter::Peekable;
use std::str::Chars;

/// Deepest nesting of parentheses, unary operators and ternaries accepted
pub const MAX_NESTING_DEPTH: usize = 64;

/// Expression parser
pub struct Parser<'a> {
    /// Input string being parsed
    input: &'a str,
    /// Character iterator
    chars: Peekable<Chars<'a>>,
    /// Current position in input (characters consumed)
    position: usize,
    /// Current nesting depth
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> ExpressionResult<Self> {
        if input.trim().is_empty() {
            return Err(ExpressionError::parse("Empty expression", 0, input));
        }

        Ok(Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
            depth: 0,
        })
    }

    /// Parse the whole input into an expression
    pub fn parse(mut self) -> ExpressionResult<Expression> {
        self.skip_whitespace();
        self.match_keyword("return");

        let expression = self.parse_conditional()?;

        self.skip_whitespace();
        if self.current_char() == Some(';') {
            self.advance();
            self.skip_whitespace();
        }

        if let Some(ch) = self.current_char() {
            return Err(self.unexpected(ch));
        }

        Ok(expression)
    }

    /// Parse ternary conditional (right associative)
    fn parse_conditional(&mut self) -> ExpressionResult<Expression> {
        let condition = self.parse_logical_or()?;

        self.skip_whitespace();
        if self.current_char() != Some('?') {
            return Ok(condition);
        }
        self.advance();

        let then_branch = self.nested(Self::parse_conditional)?;
        self.skip_whitespace();
        self.expect_char(':')?;
        let else_branch = self.nested(Self::parse_conditional)?;

        Ok(Expression::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// Parse logical OR expression
    fn parse_logical_or(&mut self) -> ExpressionResult<Expression> {
        let mut left = self.parse_logical_and()?;

        loop {
            self.skip_whitespace();
            if self.match_operator("||") {
                let right = self.parse_logical_and()?;
                left = Expression::binary(left, BinaryOperator::Or, right);
            } else {
                break;
            }
        }

        Ok(left)
    }

    /// Parse logical AND expression
    fn parse_logical_and(&mut self) -> ExpressionResult<Expression> {
        let mut left = self.parse_equality()?;

        loop {
            self.skip_whitespace();
            if self.match_operator("&&") {
                let right = self.parse_equality()?;
                left = Expression::binary(left, BinaryOperator::And, right);
            } else {
                break;
            }
        }

        Ok(left)
    }

    /// Parse equality expression
    fn parse_equality(&mut self) -> ExpressionResult<Expression> {
        let mut left = self.parse_comparison()?;

        loop {
            self.skip_whitespace();
            // Longest operators first so `===` is not read as `==` followed by `=`
            let operator = if self.match_operator("===") {
                BinaryOperator::StrictEqual
            } else if self.match_operator("==") {
                BinaryOperator::Equal
            } else if self.match_operator("!==") {
                BinaryOperator::StrictNotEqual
            } else if self.match_operator("!=") {
                BinaryOperator::NotEqual
            } else {
                break;
            };

            let right = self.parse_comparison()?;
            left = Expression::binary(left, operator, right);
        }

        Ok(left)
    }

    /// Parse comparison expression
    fn parse_comparison(&mut self) -> ExpressionResult<Expression> {
        let mut left = self.parse_additive()?;

        loop {
            self.skip_whitespace();
            let operator = if self.match_operator("<=") {
                BinaryOperator::LessThanOrEqual
            } else if self.match_operator(">=") {
                BinaryOperator::GreaterThanOrEqual
            } else if self.match_operator("<") {
                BinaryOperator::LessThan
            } else if self.match_operator(">") {
                BinaryOperator::GreaterThan
            } else {
                break;
            };

            let right = self.parse_additive()?;
            left = Expression::binary(left, operator, right);
        }

        Ok(left)
    }

    /// Parse additive expression
    fn parse_additive(&mut self) -> ExpressionResult<Expression> {
        let mut left = self.parse_multiplicative()?;

        loop {
            self.skip_whitespace();
            let operator = match self.current_char() {
                Some('+') => BinaryOperator::Add,
                Some('-') => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();

            let right = self.parse_multiplicative()?;
            left = Expression::binary(left, operator, right);
        }

        Ok(left)
    }

    /// Parse multiplicative expression
    fn parse_multiplicative(&mut self) -> ExpressionResult<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            self.skip_whitespace();
            let operator = match self.current_char() {
                Some('*') => BinaryOperator::Multiply,
                Some('/') => BinaryOperator::Divide,
                Some('%') => BinaryOperator::Remainder,
                _ => break,
            };
            self.advance();

            let right = self.parse_unary()?;
            left = Expression::binary(left, operator, right);
        }

        Ok(left)
    }

    /// Parse unary expression
    fn parse_unary(&mut self) -> ExpressionResult<Expression> {
        self.skip_whitespace();

        let operator = match self.current_char() {
            Some('!') => UnaryOperator::Not,
            Some('-') => UnaryOperator::Negate,
            Some('+') => UnaryOperator::Plus,
            _ => return self.parse_primary(),
        };
        self.advance();

        let operand = self.nested(Self::parse_unary)?;
        Ok(Expression::Unary {
            operator,
            operand: Box::new(operand),
        })
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> ExpressionResult<Expression> {
        self.skip_whitespace();

        match self.current_char() {
            Some('(') => {
                self.advance();
                let expr = self.nested(Self::parse_conditional)?;
                self.skip_whitespace();
                self.expect_char(')')?;
                Ok(expr)
            }
            Some('"') | Some('\'') => {
                let string = self.parse_quoted_string()?;
                Ok(Expression::Literal(Value::String(string)))
            }
            Some(ch) if ch.is_ascii_digit() || ch == '.' => {
                let number = self.parse_number()?;
                Ok(Expression::Literal(Value::Number(number)))
            }
            Some(ch) if is_identifier_start(ch) => {
                let identifier = self.parse_identifier();
                Ok(match identifier.as_str() {
                    "true" => Expression::Literal(Value::Bool(true)),
                    "false" => Expression::Literal(Value::Bool(false)),
                    "null" | "undefined" => Expression::Literal(Value::Null),
                    _ => Expression::Identifier(identifier),
                })
            }
            Some(ch) => Err(self.unexpected(ch)),
            None => Err(ExpressionError::parse(
                "Unexpected end of expression",
                self.position,
                self.input,
            )),
        }
    }

    /// Run a nested rule, failing once the nesting limit is reached
    fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> ExpressionResult<T>,
    ) -> ExpressionResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ExpressionError::parse(
                format!("Expression nested deeper than {} levels", MAX_NESTING_DEPTH),
                self.position,
                self.input,
            ));
        }

        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Parse identifier
    fn parse_identifier(&mut self) -> String {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char() {
            if is_identifier_part(ch) {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        identifier
    }

    /// Parse quoted string literal
    fn parse_quoted_string(&mut self) -> ExpressionResult<String> {
        let quote_char = match self.advance() {
            Some(ch) => ch,
            None => {
                return Err(ExpressionError::parse(
                    "Expected string literal",
                    self.position,
                    self.input,
                ))
            }
        };

        let mut string = String::new();
        let mut escaped = false;

        while let Some(ch) = self.current_char() {
            if escaped {
                match ch {
                    'n' => string.push('\n'),
                    'r' => string.push('\r'),
                    't' => string.push('\t'),
                    '\\' => string.push('\\'),
                    '\'' => string.push('\''),
                    '"' => string.push('"'),
                    _ => {
                        string.push('\\');
                        string.push(ch);
                    }
                }
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote_char {
                self.advance();
                return Ok(string);
            } else {
                string.push(ch);
            }
            self.advance();
        }

        Err(ExpressionError::parse(
            "Unterminated string literal",
            self.position,
            self.input,
        ))
    }

    /// Parse number literal; integers stay exact when they fit in an i64
    fn parse_number(&mut self) -> ExpressionResult<Number> {
        let start = self.position;
        let mut number_str = String::new();
        let mut is_float = false;

        self.take_digits(&mut number_str);

        if self.current_char() == Some('.') {
            is_float = true;
            number_str.push('.');
            self.advance();
            self.take_digits(&mut number_str);
        }

        if let Some(ch) = self.current_char() {
            if ch == 'e' || ch == 'E' {
                is_float = true;
                number_str.push(ch);
                self.advance();

                if let Some(sign) = self.current_char() {
                    if sign == '+' || sign == '-' {
                        number_str.push(sign);
                        self.advance();
                    }
                }

                self.take_digits(&mut number_str);
            }
        }

        let invalid = || {
            ExpressionError::parse(
                format!("Invalid number: {}", number_str),
                start,
                self.input,
            )
        };

        if !is_float {
            if let Ok(integer) = number_str.parse::<i64>() {
                return Ok(Number::from(integer));
            }
        }

        number_str
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(invalid)
    }

    fn take_digits(&mut self, into: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                into.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Try to match a multi-character operator
    fn match_operator(&mut self, op: &str) -> bool {
        let remaining: String = self.chars.clone().take(op.chars().count()).collect();
        if remaining == op {
            for _ in op.chars() {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    /// Try to match a keyword that is not followed by further identifier characters
    fn match_keyword(&mut self, keyword: &str) -> bool {
        let mut lookahead = self.chars.clone();
        for expected in keyword.chars() {
            if lookahead.next() != Some(expected) {
                return false;
            }
        }
        if lookahead.next().is_some_and(is_identifier_part) {
            return false;
        }
        self.match_operator(keyword)
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Get current character without advancing
    fn current_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if ch.is_some() {
            self.position += 1;
        }
        ch
    }

    /// Expect a specific character
    fn expect_char(&mut self, expected: char) -> ExpressionResult<()> {
        match self.current_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ExpressionError::parse(
                format!("Expected '{}', found '{}'", expected, ch),
                self.position,
                self.input,
            )),
            None => Err(ExpressionError::parse(
                format!("Expected '{}', found end of expression", expected),
                self.position,
                self.input,
            )),
        }
    }

    fn unexpected(&self, ch: char) -> ExpressionError {
        ExpressionError::parse(
            format!("Unexpected character '{}'", ch),
            self.position,
            self.input,
        )
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(input: &str) -> Expression {
        Parser::new(input).unwrap().parse().unwrap()
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("42"), Expression::literal(json!(42)));
        assert_eq!(parse("1.5"), Expression::literal(json!(1.5)));
        assert_eq!(parse("'hi'"), Expression::literal("hi"));
        assert_eq!(parse("\"a\\\"b\""), Expression::literal("a\"b"));
        assert_eq!(parse("true"), Expression::literal(true));
        assert_eq!(parse("null"), Expression::Literal(Value::Null));
    }

    #[test]
    fn test_parse_precedence() {
        assert_eq!(parse("1 + 2 * 3").to_string(), "(1 + (2 * 3))");
        assert_eq!(parse("(1 + 2) * 3").to_string(), "((1 + 2) * 3)");
        assert_eq!(
            parse("from > 1 && from < 5 || x").to_string(),
            "(((from > 1) && (from < 5)) || x)"
        );
        assert_eq!(parse("a - b - c").to_string(), "((a - b) - c)");
    }

    #[test]
    fn test_parse_equality_variants() {
        let strict = parse("from === 'x'");
        assert_eq!(strict.to_string(), "(from === \"x\")");
        assert_ne!(strict, parse("from == 'x'"));
        assert_eq!(parse("from !== 'x'").to_string(), "(from !== \"x\")");
        assert_eq!(parse("from != 'x'").to_string(), "(from != \"x\")");
    }

    #[test]
    fn test_parse_comparison_operators() {
        assert_eq!(parse("a <= 1").to_string(), "(a <= 1)");
        assert_eq!(parse("a >= 1").to_string(), "(a >= 1)");
        assert_eq!(parse("a<1").to_string(), "(a < 1)");
    }

    #[test]
    fn test_parse_unary() {
        assert_eq!(parse("!value").to_string(), "!value");
        assert_eq!(parse("-value * 2").to_string(), "(-value * 2)");
        assert_eq!(parse("from > -5").to_string(), "(from > -5)");
    }

    #[test]
    fn test_parse_ternary_is_right_associative() {
        assert_eq!(
            parse("a ? 1 : b ? 2 : 3").to_string(),
            "(a ? 1 : (b ? 2 : 3))"
        );
    }

    #[test]
    fn test_parse_function_body_form() {
        assert_eq!(parse("return value * 2;"), parse("value * 2"));
        assert_eq!(parse("  return value  "), parse("value"));
        // `returned` is an identifier, not the keyword
        assert_eq!(parse("returned"), Expression::identifier("returned"));
    }

    #[test]
    fn test_parse_error_empty_input() {
        assert!(Parser::new("").is_err());
        assert!(Parser::new("   ").is_err());
    }

    #[test]
    fn test_parse_error_single_equals() {
        let err = Parser::new("from = 5").unwrap().parse().unwrap_err();
        assert!(matches!(err, ExpressionError::Parse { position: 5, .. }));
    }

    #[test]
    fn test_parse_error_unterminated() {
        assert!(Parser::new("'abc").unwrap().parse().is_err());
        assert!(Parser::new("(1 + 2").unwrap().parse().is_err());
        assert!(Parser::new("a ? b").unwrap().parse().is_err());
        assert!(Parser::new("1 +").unwrap().parse().is_err());
    }

    #[test]
    fn test_parse_nesting_limit() {
        let shallow = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(parse(&shallow), Expression::literal(json!(1)));
        assert_eq!(parse(&format!("{}true", "!".repeat(20))).to_string().len(), 24);

        let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let err = Parser::new(&deep).unwrap().parse().unwrap_err();
        assert!(err.to_string().contains("nested deeper than 64 levels"));

        let negations = format!("{}true", "!".repeat(10_000));
        assert!(Parser::new(&negations).unwrap().parse().is_err());

        let ternaries = format!("{}1{}", "a ? ".repeat(10_000), " : 2".repeat(10_000));
        assert!(Parser::new(&ternaries).unwrap().parse().is_err());
    }

    #[test]
    fn test_parse_rejects_calls_and_member_access() {
        assert!(Parser::new("value.length").unwrap().parse().is_err());
        assert!(Parser::new("process(1)").unwrap().parse().is_err());
        assert!(Parser::new("value[0]").unwrap().parse().is_err());
    }
}
