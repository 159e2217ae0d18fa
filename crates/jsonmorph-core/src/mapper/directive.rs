//! Directive node evaluation
//!
//! A directive leaf is resolved in four fixed steps:
//!
//! 1. `$from` with `$default` as fallback, or `$default` alone
//! 2. `$if` conditions, then `$then` / `$else`
//! 3. `$rename` substitution of the first matching source entry
//! 4. `$apply` on a truthy value
//!
//! A `None` result means the key produced no value.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use super::context::{TransformContext, WarningKind};
use super::node::{
    ApplyExpression, Branch, Condition, ConditionKind, ConditionTest, Directive, Rename,
    FROM_BINDING, REFERENCE_BINDING, VALUE_BINDING,
};
use crate::expression::{is_truthy, type_of, values_equal, Bindings, Evaluator, ExpressionError};
use crate::{Error, Result};
use serde_json::Value;
use tracing::{trace, warn};

/// Evaluates directive leaves against the context's source document
pub struct DirectiveEvaluator<'c, 'a> {
    context: &'c mut TransformContext<'a>,
}

impl<'c, 'a> DirectiveEvaluator<'c, 'a> {
    /// Create an evaluator over a transform context
    pub fn new(context: &'c mut TransformContext<'a>) -> Self {
        Self { context }
    }

    /// Produce the output value for one directive leaf
    pub fn evaluate(&mut self, key: &str, directive: &Directive) -> Result<Option<Value>> {
        let resolver = self.context.resolver();
        let source = self.context.source();

        // Step 1: $from / $default
        let mut output = match (&directive.from, &directive.default) {
            (Some(from), default) => resolver.resolve_or(source, from, default.as_ref()).cloned(),
            (None, Some(default)) => Some(default.clone()),
            (None, None) => None,
        };

        // Step 2: $if / $then / $else
        if let Some(conditions) = &directive.conditions {
            let aggregate = self.evaluate_conditions(key, conditions, directive.default.as_ref())?;
            trace!(key, aggregate, "Evaluated conditions");

            match (&directive.then_branch, &directive.else_branch) {
                (None, _) => output = Some(Value::Bool(aggregate)),
                (Some(then_branch), _) if aggregate => output = self.resolve_branch(then_branch),
                (Some(_), Some(else_branch)) => output = self.resolve_branch(else_branch),
                (Some(_), None) => {}
            }
        }

        // Step 3: $rename
        if let Some(rename) = &directive.rename {
            if let Some(renamed) = apply_rename(rename, output.as_ref()) {
                output = Some(renamed);
            }
        }

        // Step 4: $apply
        if let Some(apply) = &directive.apply {
            if let Some(current) = output.as_ref().filter(|value| is_truthy(value)) {
                match run_apply(apply, current) {
                    Ok(transformed) => output = Some(transformed),
                    Err(e) => {
                        warn!(key, expression = %apply.source, error = %e, "$apply failed; keeping value");
                        self.context.warn(
                            key,
                            WarningKind::ApplyFailed,
                            format!("$apply \"{}\" failed: {}", apply.source, e),
                        );
                    }
                }
            }
        }

        trace!(key, defined = output.is_some(), "Evaluated directive");
        Ok(output)
    }

    /// Evaluate every condition; the aggregate holds only when all of them do
    fn evaluate_conditions(
        &self,
        key: &str,
        conditions: &[Condition],
        default: Option<&Value>,
    ) -> Result<bool> {
        let mut outcomes = Vec::with_capacity(conditions.len());
        for condition in conditions {
            outcomes.push(self.test_condition(key, condition, default)?);
        }

        // Any disagreement resolves to false
        Ok(!outcomes.is_empty() && outcomes.iter().all(|outcome| *outcome))
    }

    fn test_condition(
        &self,
        key: &str,
        condition: &Condition,
        default: Option<&Value>,
    ) -> Result<bool> {
        let resolver = self.context.resolver();
        let source = self.context.source();
        let value = resolver.resolve_or(source, &condition.from, default);

        match &condition.test {
            ConditionTest::Is(set) => {
                Ok(value.is_some_and(|v| set.iter().any(|candidate| values_equal(v, candidate))))
            }
            ConditionTest::TypeOf(tag) => {
                Ok(!matches!(value, Some(Value::Null)) && type_of(value) == tag.as_str())
            }
            ConditionTest::Expression { kind, compiled, .. } => {
                let mut bindings =
                    Bindings::new().with(FROM_BINDING, value.cloned().unwrap_or(Value::Null));

                if let ConditionKind::From { reference } = kind {
                    let referenced = resolver.resolve(source, reference).cloned();
                    bindings.insert(REFERENCE_BINDING, referenced.unwrap_or(Value::Null));
                }

                let result = Evaluator::new(&bindings)
                    .evaluate(compiled)
                    .map_err(|e| Error::expression(key, e))?;
                Ok(is_truthy(&result))
            }
        }
    }

    fn resolve_branch(&self, branch: &Branch) -> Option<Value> {
        match branch {
            Branch::From(path) => self
                .context
                .resolver()
                .resolve(self.context.source(), path)
                .cloned(),
            Branch::Value(value) => Some(value.clone()),
        }
    }
}

/// Substitute the first `$source` entry equal to the current string value
fn apply_rename(rename: &Rename, current: Option<&Value>) -> Option<Value> {
    let current = current?.as_str()?;
    rename
        .pairs
        .iter()
        .find(|(from, _)| from == current)
        .map(|(from, to)| Value::String(current.replacen(from.as_str(), to, 1)))
}

fn run_apply(apply: &ApplyExpression, current: &Value) -> std::result::Result<Value, ExpressionError> {
    let expression = apply.compiled.as_ref().map_err(Clone::clone)?;
    let bindings = Bindings::new().with(VALUE_BINDING, current.clone());
    Evaluator::new(&bindings).evaluate(expression)
}
