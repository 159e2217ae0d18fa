//! Restricted expression language
//!
//! Used by `$condition` tests and `$apply` transforms. Expressions are parsed
//! once when a mapper is compiled and evaluated against explicit bindings
//! (`from` for conditions, `value` for apply), so nothing outside those
//! bindings is reachable.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

pub mod ast;
pub mod error;
pub mod eval;
pub mod parser;

pub use ast::{BinaryOperator, Expression, UnaryOperator};
pub use error::ExpressionError;
pub use eval::{
    is_truthy, loosely_equal, type_of, value_type_name, values_equal, Bindings, Evaluator,
};
pub use parser::Parser;

use serde_json::Value;

/// Result type for expression parsing and evaluation
pub type ExpressionResult<T> = std::result::Result<T, ExpressionError>;

/// Parse an expression string
pub fn parse(source: &str) -> ExpressionResult<Expression> {
    Parser::new(source)?.parse()
}

/// Parse an expression and check that it only references the allowed names
pub fn compile(source: &str, allowed: &[&str]) -> ExpressionResult<Expression> {
    let expression = parse(source)?;

    if let Some(unknown) = expression
        .identifiers()
        .into_iter()
        .find(|name| !allowed.contains(name))
    {
        return Err(ExpressionError::unknown_identifier(unknown));
    }

    Ok(expression)
}

/// Parse and evaluate an expression in one step
pub fn evaluate(source: &str, bindings: &Bindings) -> ExpressionResult<Value> {
    let expression = parse(source)?;
    Evaluator::new(bindings).evaluate(&expression)
}
