// SPDX-License-Identifier: MIT

//! Evaluate facade
//!
//! Entry points used by workflow steps: one-shot [`evaluate`], reusable
//! [`Condition`]s and an [`Engine`] carrying loaded options.

use super::ast::Predicate;
use super::parser::Parser;
use crate::config::EngineOptions;
use crate::error::{CriteriaError, EvaluationError};
use crate::state::State;

/// Parse `expression` and apply it to `state` once.
///
/// An empty expression yields `default_result` without parsing; whitespace
/// alone is still parsed and fails. Errors carry `label` so callers can tell which step failed.
pub fn evaluate(
    state: &dyn State,
    expression: &str,
    label: &str,
    default_result: bool,
) -> Result<bool, EvaluationError> {
    evaluate_with(&Parser::default(), state, expression, label, default_result)
}

fn evaluate_with(
    parser: &Parser,
    state: &dyn State,
    expression: &str,
    label: &str,
    default_result: bool,
) -> Result<bool, EvaluationError> {
    if expression.is_empty() {
        return Ok(default_result);
    }
    let result = parser
        .parse(expression)
        .and_then(|predicate| predicate.apply_or(state, default_result))
        .map_err(|e| EvaluationError::new(label, e))?;
    log::debug!("{}: '{}' -> {}", label, expression, result);
    Ok(result)
}

/// An expression parsed once and evaluated many times
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    expression: String,
    /// `None` for an empty expression
    predicate: Option<Predicate>,
}

impl Condition {
    pub fn compile(expression: &str) -> Result<Self, CriteriaError> {
        Self::compile_with(&Parser::default(), expression)
    }

    fn compile_with(parser: &Parser, expression: &str) -> Result<Self, CriteriaError> {
        let predicate = if expression.is_empty() {
            None
        } else {
            Some(parser.parse(expression)?)
        };
        Ok(Self {
            expression: expression.to_string(),
            predicate,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.predicate.is_none()
    }

    pub fn evaluate(
        &self,
        state: &dyn State,
        label: &str,
        default_result: bool,
    ) -> Result<bool, EvaluationError> {
        match &self.predicate {
            None => Ok(default_result),
            Some(predicate) => predicate
                .apply_or(state, default_result)
                .map_err(|e| EvaluationError::new(label, e)),
        }
    }
}

/// Parser and evaluator bound to [`EngineOptions`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    options: EngineOptions,
    parser: Parser,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            parser: Parser::new(options.parser),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn parse(&self, expression: &str) -> Result<Predicate, CriteriaError> {
        self.parser.parse(expression)
    }

    pub fn compile(&self, expression: &str) -> Result<Condition, CriteriaError> {
        Condition::compile_with(&self.parser, expression)
    }

    /// Evaluate with the configured default result
    pub fn evaluate(
        &self,
        state: &dyn State,
        expression: &str,
        label: &str,
    ) -> Result<bool, EvaluationError> {
        evaluate_with(
            &self.parser,
            state,
            expression,
            label,
            self.options.default_result,
        )
    }
}
