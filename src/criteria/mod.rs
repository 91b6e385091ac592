// SPDX-License-Identifier: MIT

//! Conditional expressions gating workflow steps
//!
//! This module provides lexing, parsing and evaluation of criteria such as:
//! - `$exitCode = 0`
//! - `$responses[0].Body:/ok/ && $responses[1].StatusCode = 404`
//! - `$counter > 10 || ($retry && $attempts < 3)`

mod ast;
mod criterion;
mod evaluator;
mod lexer;
mod parser;
mod predicate;
mod token;

pub use ast::{CompareOp, Criterion, LogicalOp, Operand, Predicate};
pub use evaluator::{evaluate, Condition, Engine};
pub use lexer::Lexer;
pub use parser::{parse, Parser};
pub use token::{Token, TokenKind};
