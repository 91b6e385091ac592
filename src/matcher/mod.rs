// SPDX-License-Identifier: MIT

//! Structural matching for `=`, `:` and `!=` criteria
//!
//! The matcher compares an expected value against an actual one and counts
//! mismatches. Scalars on the expected side may carry directives (regular
//! expressions, ranges, sets, negation); objects and arrays are compared
//! recursively, with extra keys on the actual side ignored.

mod directive;

pub use directive::Directive;
pub(crate) use directive::as_number;

use serde_json::Value;
use std::fmt;

use crate::error::MatchError;
use crate::state::value_to_text;

/// Deep-equality oracle backing the equality operators
pub trait Matcher {
    /// Number of mismatches between `expected` and `actual`
    fn assert_equals(&self, expected: &Value, actual: &Value) -> Result<usize, MatchError>;
}

/// A single failed check
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Location in the actual value, e.g. `/responses/0/Body`
    pub path: String,
    pub expected: Value,
    pub actual: Value,
    pub reason: MismatchReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchReason {
    NotEqual,
    MissingKey,
    LengthDiffers,
    TypeDiffers,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            MismatchReason::NotEqual => "not equal",
            MismatchReason::MissingKey => "missing key",
            MismatchReason::LengthDiffers => "length differs",
            MismatchReason::TypeDiffers => "type differs",
        };
        write!(
            f,
            "{} at {}: expected {}, actual {}",
            reason, self.path, self.expected, self.actual
        )
    }
}

/// Default matcher with directive support and recursive comparison
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralMatcher;

impl StructuralMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Collect every mismatch between `expected` and `actual`
    pub fn assert_values(
        &self,
        expected: &Value,
        actual: &Value,
    ) -> Result<Vec<Mismatch>, MatchError> {
        let mut mismatches = vec![];
        check("/", expected, actual, &mut mismatches)?;
        Ok(mismatches)
    }
}

impl Matcher for StructuralMatcher {
    fn assert_equals(&self, expected: &Value, actual: &Value) -> Result<usize, MatchError> {
        self.assert_values(expected, actual).map(|m| m.len())
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path == "/" {
        format!("/{}", key)
    } else {
        format!("{}/{}", path, key)
    }
}

/// Decode JSON text when the other side is structured
fn decode_if_structured(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

fn mismatch(
    path: &str,
    expected: &Value,
    actual: &Value,
    reason: MismatchReason,
    out: &mut Vec<Mismatch>,
) {
    out.push(Mismatch {
        path: path.to_string(),
        expected: expected.clone(),
        actual: actual.clone(),
        reason,
    });
}

fn check(
    path: &str,
    expected: &Value,
    actual: &Value,
    out: &mut Vec<Mismatch>,
) -> Result<(), MatchError> {
    match (expected, actual) {
        (Value::String(text), Value::Object(_) | Value::Array(_)) => {
            match decode_if_structured(text) {
                Some(decoded) => check(path, &decoded, actual, out),
                None => scalar(path, text, expected, actual, out),
            }
        }
        (Value::Object(_) | Value::Array(_), Value::String(text)) => {
            match decode_if_structured(text) {
                Some(decoded) => check(path, expected, &decoded, out),
                None => {
                    mismatch(path, expected, actual, MismatchReason::TypeDiffers, out);
                    Ok(())
                }
            }
        }
        (Value::String(text), Value::String(actual_text)) => {
            match (decode_if_structured(text), decode_if_structured(actual_text)) {
                (Some(decoded), Some(actual_decoded)) => check(path, &decoded, &actual_decoded, out),
                _ => scalar(path, text, expected, actual, out),
            }
        }
        (Value::String(text), _) => scalar(path, text, expected, actual, out),
        (Value::Object(expected_map), Value::Object(actual_map)) => {
            for (key, expected_value) in expected_map {
                let key_path = child_path(path, key);
                match actual_map.get(key) {
                    Some(actual_value) => check(&key_path, expected_value, actual_value, out)?,
                    None => mismatch(
                        &key_path,
                        expected_value,
                        &Value::Null,
                        MismatchReason::MissingKey,
                        out,
                    ),
                }
            }
            Ok(())
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            if expected_items.len() != actual_items.len() {
                mismatch(path, expected, actual, MismatchReason::LengthDiffers, out);
                return Ok(());
            }
            for (i, (e, a)) in expected_items.iter().zip(actual_items).enumerate() {
                check(&child_path(path, &i.to_string()), e, a, out)?;
            }
            Ok(())
        }
        (Value::Object(_) | Value::Array(_), _) => {
            mismatch(path, expected, actual, MismatchReason::TypeDiffers, out);
            Ok(())
        }
        (Value::Number(_), _) => {
            let equal = match (as_number(expected), as_number(actual)) {
                (Some(e), Some(a)) => e == a,
                _ => false,
            };
            if !equal {
                mismatch(path, expected, actual, MismatchReason::NotEqual, out);
            }
            Ok(())
        }
        (Value::Bool(_) | Value::Null, _) => {
            let equal = expected == actual || value_to_text(expected) == value_to_text(actual);
            if !equal {
                mismatch(path, expected, actual, MismatchReason::NotEqual, out);
            }
            Ok(())
        }
    }
}

fn scalar(
    path: &str,
    text: &str,
    expected: &Value,
    actual: &Value,
    out: &mut Vec<Mismatch>,
) -> Result<(), MatchError> {
    let directive = Directive::parse(text, path)?;
    if !directive.matches(actual) {
        mismatch(path, expected, actual, MismatchReason::NotEqual, out);
    }
    Ok(())
}
