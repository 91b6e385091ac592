// SPDX-License-Identifier: MIT

//! Execution state for criteria evaluation
//!
//! This module provides:
//! - `State` - the interpolation contract the evaluator consumes
//! - `ExecutionState` - a path-addressable store implementing it
//! - built-in functions callable as `$Fn(args)` from expressions

mod expand;
mod store;
pub mod udf;

pub use store::ExecutionState;
pub use udf::Function;

use serde_json::Value;

/// Interpolation capability the evaluator needs from a state container.
///
/// `$`-prefixed references are resolved against the state; text without
/// references comes back unchanged.
pub trait State {
    /// Expand references, keeping the JSON type when `text` is a single reference
    fn expand(&self, text: &str) -> Value;

    /// Expand references and render the result as text
    fn expand_as_text(&self, text: &str) -> String {
        value_to_text(&self.expand(text))
    }
}

/// Text form of a value: strings raw, null empty, everything else as JSON
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
