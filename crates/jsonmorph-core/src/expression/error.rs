//! Error types for the expression language
//!
//! Parse failures carry the byte position and the offending input so that
//! mapping definition errors can point at the exact spot in a `$condition`
//! or `$apply` string.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Errors raised while parsing or evaluating an expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Parse errors with position information
    #[error("Parse error at position {position}: {message} (in `{input}`)")]
    Parse {
        message: String,
        position: usize,
        input: String,
    },

    /// Reference to a name that is not bound for this expression
    #[error("Unknown identifier '{name}'")]
    UnknownIdentifier { name: String },

    /// Operator applied to operands it does not support
    #[error("Type mismatch: cannot apply '{operator}' to {left} and {right}")]
    TypeMismatch {
        operator: String,
        left: String,
        right: String,
    },

    /// Unary operator applied to an operand it does not support
    #[error("Type mismatch: cannot apply unary '{operator}' to {operand}")]
    InvalidOperand { operator: String, operand: String },

    /// Division or remainder with a zero divisor
    #[error("Division by zero")]
    DivisionByZero,

    /// Arithmetic produced a value JSON cannot represent
    #[error("Arithmetic result is not a finite number")]
    NonFinite,
}

impl ExpressionError {
    /// Create a parse error with position and input
    pub fn parse(message: impl Into<String>, position: usize, input: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            position,
            input: input.into(),
        }
    }

    /// Create a type mismatch error for a binary operator
    pub fn type_mismatch(
        operator: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            operator: operator.into(),
            left: left.into(),
            right: right.into(),
        }
    }

    /// Create an invalid operand error for a unary operator
    pub fn invalid_operand(operator: impl Into<String>, operand: impl Into<String>) -> Self {
        Self::InvalidOperand {
            operator: operator.into(),
            operand: operand.into(),
        }
    }

    /// Create an unknown identifier error
    pub fn unknown_identifier(name: impl Into<String>) -> Self {
        Self::UnknownIdentifier { name: name.into() }
    }

    /// Whether this error was raised before evaluation started
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::UnknownIdentifier { .. })
    }
}
