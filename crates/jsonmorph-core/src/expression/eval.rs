//! Expression evaluator
//!
//! Evaluates a parsed [`Expression`] against a fixed set of named bindings.
//! Values follow JSON semantics with the loose rules of scripting languages:
//!
//! - `+` concatenates when either side is a string
//! - `&&` and `||` yield the operand that decided the result, not a boolean
//! - `==` and ordering coerce numbers, numeric strings and booleans; `===`
//!   compares structurally without coercion
//! - objects and arrays are always truthy
//!
//! Ordering values that cannot be coerced yields `false` instead of an error.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use super::ast::{BinaryOperator, Expression, UnaryOperator};
use super::error::ExpressionError;
use super::ExpressionResult;
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Largest magnitude at which every whole f64 is an exact integer
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Named values an expression may reference
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    /// Create an empty binding set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, returning the updated set
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Set a binding in place
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Look up a binding
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// Expression evaluator over a binding set
pub struct Evaluator<'b> {
    bindings: &'b Bindings,
}

impl<'b> Evaluator<'b> {
    /// Create an evaluator for the given bindings
    pub fn new(bindings: &'b Bindings) -> Self {
        Self { bindings }
    }

    /// Evaluate an expression to a JSON value
    pub fn evaluate(&self, expression: &Expression) -> ExpressionResult<Value> {
        match expression {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Identifier(name) => self
                .bindings
                .get(name)
                .cloned()
                .ok_or_else(|| ExpressionError::unknown_identifier(name)),
            Expression::Unary { operator, operand } => {
                let value = self.evaluate(operand)?;
                apply_unary_operator(*operator, &value)
            }
            Expression::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, *operator, right),
            Expression::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
        }
    }

    /// Evaluate binary expression, short-circuiting the logical operators
    fn evaluate_binary(
        &self,
        left: &Expression,
        operator: BinaryOperator,
        right: &Expression,
    ) -> ExpressionResult<Value> {
        match operator {
            BinaryOperator::And => {
                let left_val = self.evaluate(left)?;
                if !is_truthy(&left_val) {
                    return Ok(left_val);
                }
                self.evaluate(right)
            }
            BinaryOperator::Or => {
                let left_val = self.evaluate(left)?;
                if is_truthy(&left_val) {
                    return Ok(left_val);
                }
                self.evaluate(right)
            }
            _ => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                apply_binary_operator(&left_val, operator, &right_val)
            }
        }
    }
}

/// Apply a non-logical binary operator to two evaluated operands
fn apply_binary_operator(
    left: &Value,
    operator: BinaryOperator,
    right: &Value,
) -> ExpressionResult<Value> {
    match operator {
        BinaryOperator::Equal => Ok(Value::Bool(loosely_equal(left, right))),
        BinaryOperator::NotEqual => Ok(Value::Bool(!loosely_equal(left, right))),
        BinaryOperator::StrictEqual => Ok(Value::Bool(values_equal(left, right))),
        BinaryOperator::StrictNotEqual => Ok(Value::Bool(!values_equal(left, right))),
        BinaryOperator::LessThan => {
            Ok(Value::Bool(compare(left, right, |ord| ord == Ordering::Less)))
        }
        BinaryOperator::LessThanOrEqual => {
            Ok(Value::Bool(compare(left, right, |ord| ord != Ordering::Greater)))
        }
        BinaryOperator::GreaterThan => {
            Ok(Value::Bool(compare(left, right, |ord| ord == Ordering::Greater)))
        }
        BinaryOperator::GreaterThanOrEqual => {
            Ok(Value::Bool(compare(left, right, |ord| ord != Ordering::Less)))
        }
        BinaryOperator::Add if left.is_string() || right.is_string() => Ok(Value::String(
            format!("{}{}", concat_text(left), concat_text(right)),
        )),
        BinaryOperator::Add
        | BinaryOperator::Subtract
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Remainder => match (left, right) {
            (Value::Number(a), Value::Number(b)) => apply_arithmetic(operator, a, b),
            _ => Err(ExpressionError::type_mismatch(
                operator.symbol(),
                value_type_name(left),
                value_type_name(right),
            )),
        },
        BinaryOperator::And if is_truthy(left) => Ok(right.clone()),
        BinaryOperator::Or if !is_truthy(left) => Ok(right.clone()),
        BinaryOperator::And | BinaryOperator::Or => Ok(left.clone()),
    }
}

/// Integer arithmetic stays exact; anything else falls back to f64
fn apply_arithmetic(operator: BinaryOperator, a: &Number, b: &Number) -> ExpressionResult<Value> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        let exact = match operator {
            BinaryOperator::Add => x.checked_add(y),
            BinaryOperator::Subtract => x.checked_sub(y),
            BinaryOperator::Multiply => x.checked_mul(y),
            BinaryOperator::Divide => {
                if y == 0 {
                    return Err(ExpressionError::DivisionByZero);
                }
                match x.checked_rem(y) {
                    Some(0) => x.checked_div(y),
                    _ => None,
                }
            }
            BinaryOperator::Remainder => {
                if y == 0 {
                    return Err(ExpressionError::DivisionByZero);
                }
                x.checked_rem(y)
            }
            _ => None,
        };

        if let Some(result) = exact {
            return Ok(Value::from(result));
        }
    }

    let x = a.as_f64().ok_or(ExpressionError::NonFinite)?;
    let y = b.as_f64().ok_or(ExpressionError::NonFinite)?;

    let result = match operator {
        BinaryOperator::Add => x + y,
        BinaryOperator::Subtract => x - y,
        BinaryOperator::Multiply => x * y,
        BinaryOperator::Divide | BinaryOperator::Remainder if y == 0.0 => {
            return Err(ExpressionError::DivisionByZero)
        }
        BinaryOperator::Divide => x / y,
        BinaryOperator::Remainder => x % y,
        _ => {
            return Err(ExpressionError::type_mismatch(
                operator.symbol(),
                "number",
                "number",
            ))
        }
    };

    number_value(result)
}

fn apply_unary_operator(operator: UnaryOperator, value: &Value) -> ExpressionResult<Value> {
    match (operator, value) {
        (UnaryOperator::Not, _) => Ok(Value::Bool(!is_truthy(value))),
        (UnaryOperator::Plus, Value::Number(_)) => Ok(value.clone()),
        (UnaryOperator::Negate, Value::Number(n)) => {
            if let Some(negated) = n.as_i64().and_then(i64::checked_neg) {
                return Ok(Value::from(negated));
            }
            number_value(-n.as_f64().ok_or(ExpressionError::NonFinite)?)
        }
        _ => Err(ExpressionError::invalid_operand(
            operator.symbol(),
            value_type_name(value),
        )),
    }
}

/// Convert an f64 result into a JSON number, normalising whole values to integers
pub fn number_value(result: f64) -> ExpressionResult<Value> {
    if !result.is_finite() {
        return Err(ExpressionError::NonFinite);
    }

    if result.fract() == 0.0 && result.abs() <= MAX_SAFE_INTEGER {
        return Ok(Value::from(result as i64));
    }

    Number::from_f64(result)
        .map(Value::Number)
        .ok_or(ExpressionError::NonFinite)
}

/// Order two values; pairs with no common ordering never compare
fn compare<F>(left: &Value, right: &Value, predicate: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    value_ordering(left, right).is_some_and(predicate)
}

/// Two strings order lexically; anything else orders numerically after coercion
fn value_ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => number_ordering(a, b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => coerce_number(left)?.partial_cmp(&coerce_number(right)?),
    }
}

fn number_ordering(a: &Number, b: &Number) -> Option<Ordering> {
    match (a.as_i64(), b.as_i64()) {
        (Some(ai), Some(bi)) => Some(ai.cmp(&bi)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// Numeric view of a scalar for loose comparison
///
/// Booleans count as 0 and 1. A string counts when its trimmed text is a
/// finite decimal number, and a blank string is 0. `null`, arrays and objects
/// have no numeric view.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let text = s.trim();
            if text.is_empty() {
                return Some(0.0);
            }
            // Rust also accepts `inf` and `nan`, which are not numeric text here
            if !text
                .chars()
                .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-'))
            {
                return None;
            }
            text.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Equality with coercion between numbers, numeric strings and booleans
///
/// Values of the same type compare as [`values_equal`] does. `null` only
/// equals `null`.
pub fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => left.is_null() && right.is_null(),
        (Value::Number(_), Value::String(_))
        | (Value::String(_), Value::Number(_))
        | (Value::Bool(_), _)
        | (_, Value::Bool(_))
            if std::mem::discriminant(left) != std::mem::discriminant(right) =>
        {
            match (coerce_number(left), coerce_number(right)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        _ => values_equal(left, right),
    }
}

fn concat_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Check if a value is truthy
///
/// Empty strings, zero, `false` and `null` are falsy. Arrays and objects are
/// truthy even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Structural equality where numbers compare by value (`1 == 1.0`)
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(ai), Some(bi)) => ai == bi,
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(af), Some(bf)) => af == bf,
                _ => a == b,
            },
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => false,
    }
}

/// Script-style type tag of a possibly missing value
///
/// Arrays and objects (and `null`) are all `"object"`; a missing value is
/// `"undefined"`.
pub fn type_of(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Null) | Some(Value::Array(_)) | Some(Value::Object(_)) => "object",
    }
}

/// Get JSON type name for error messages
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
