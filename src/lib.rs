// SPDX-License-Identifier: MIT

//! criteria-rs: conditional-expression engine for workflow automation
//!
//! Expressions are parsed into a [`Predicate`] tree and applied to an
//! [`ExecutionState`]:
//!
//! ```
//! use criteria_rs::{evaluate, ExecutionState};
//!
//! let mut state = ExecutionState::empty();
//! state.put("counter", 21);
//! assert!(evaluate(&state, "$counter > 10", "gate", false).unwrap());
//! ```

pub mod config;
pub mod criteria;
pub mod error;
pub mod matcher;
pub mod state;

pub use config::{EngineOptions, ParserOptions};
pub use criteria::{
    evaluate, parse, CompareOp, Condition, Criterion, Engine, LogicalOp, Operand, Parser,
    Predicate,
};
pub use error::{CriteriaError, EvalError, EvaluationError, LexError, MatchError, ParseError};
pub use matcher::{Matcher, StructuralMatcher};
pub use state::{ExecutionState, State};
