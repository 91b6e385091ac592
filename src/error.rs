// SPDX-License-Identifier: MIT

//! Typed error handling for criteria-rs
//!
//! Every stage of the engine has its own error enum; `CriteriaError` is the
//! umbrella returned by parsing and evaluation, and `EvaluationError` adds the
//! caller-supplied label at the facade.

use thiserror::Error;

/// Lexical errors, positioned by byte offset in the expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// A character that cannot start any token
    #[error("illegal character '{character}' at {offset}")]
    IllegalCharacter { offset: usize, character: char },

    /// A quoted, grouped or JSON body that is never closed
    #[error("unterminated body starting at {offset}, expected closing '{closing}'")]
    Unterminated { offset: usize, closing: char },
}

/// Structural errors raised while building the predicate tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A token of the wrong kind was found
    #[error("illegal token at {offset}, expected {expected}")]
    Expected { offset: usize, expected: String },

    /// Input ended where a token was required
    #[error("unexpected end of expression at {offset}, expected {expected}")]
    UnexpectedEof { offset: usize, expected: String },

    /// Grouping or operator switches nested past the configured limit
    #[error("expression nesting exceeds maximum depth of {max_depth} at {offset}")]
    TooDeep { offset: usize, max_depth: usize },
}

impl ParseError {
    /// Byte offset the error points at
    pub fn offset(&self) -> usize {
        match self {
            Self::Expected { offset, .. }
            | Self::UnexpectedEof { offset, .. }
            | Self::TooDeep { offset, .. } => *offset,
        }
    }
}

/// Structural matcher failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// The expected value carries a regular expression that does not compile
    #[error("invalid pattern '{pattern}' at {path}: {reason}")]
    InvalidPattern {
        path: String,
        pattern: String,
        reason: String,
    },

    /// A `/[...]/` directive that is neither a range nor a set
    #[error("malformed directive '{directive}' at {path}")]
    MalformedDirective { path: String, directive: String },
}

/// Errors raised while applying a parsed predicate to state
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Ordering comparison on an operand that is not a number
    #[error("undefined or non-numeric operand '{operand}' in expression: {expression}")]
    NotNumeric { operand: String, expression: String },

    /// Ordering comparison without a right operand
    #[error("missing right operand in expression: {expression}")]
    MissingOperand { expression: String },

    /// Structural matcher failure
    #[error(transparent)]
    Match(#[from] MatchError),

    /// A tree the parser could not have produced
    #[error("internal error: {0}")]
    Internal(String),
}

/// Umbrella error for parsing and evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("eval error: {0}")]
    Eval(#[from] EvalError),
}

impl From<MatchError> for CriteriaError {
    fn from(err: MatchError) -> Self {
        Self::Eval(EvalError::Match(err))
    }
}

/// Error returned by the evaluate facade, annotated with the caller's label
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to evaluate {label}: {source}")]
pub struct EvaluationError {
    pub label: String,
    #[source]
    pub source: CriteriaError,
}

impl EvaluationError {
    pub fn new(label: impl Into<String>, source: CriteriaError) -> Self {
        Self {
            label: label.into(),
            source,
        }
    }
}

/// Errors loading engine options
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// Failure inside a user-defined function called from an interpolated reference
#[derive(Debug, Clone, PartialEq, Error)]
#[error("function {name} failed: {message}")]
pub struct FunctionError {
    pub name: String,
    pub message: String,
}

impl FunctionError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}
