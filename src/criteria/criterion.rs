// SPDX-License-Identifier: MIT

//! Criterion evaluation

use serde_json::Value;

use super::ast::{CompareOp, Criterion, Operand};
use crate::error::{CriteriaError, EvalError};
use crate::matcher::{as_number, Matcher, StructuralMatcher};
use crate::state::{value_to_text, State};

/// Operand text as it stands at evaluation time.
///
/// Text without references stays raw; only referenced text goes through the
/// state container, and the operator decides how either form is read.
#[derive(Debug, Clone, PartialEq)]
enum Resolved {
    Raw(String),
    Interpolated(Value),
}

impl Resolved {
    fn resolve(operand: &Operand, state: &dyn State) -> Self {
        if operand.is_reference() {
            Resolved::Interpolated(state.expand(operand.as_str()))
        } else {
            Resolved::Raw(operand.as_str().to_string())
        }
    }

    fn into_value(self) -> Value {
        match self {
            Resolved::Raw(text) => Value::String(text),
            Resolved::Interpolated(value) => value,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Resolved::Raw(text) => text.trim().parse::<f64>().ok(),
            Resolved::Interpolated(value) => as_number(value),
        }
    }

    fn text(&self) -> String {
        match self {
            Resolved::Raw(text) => text.clone(),
            Resolved::Interpolated(value) => value_to_text(value),
        }
    }
}

/// Truthiness of a bare operand; any non-empty text is true
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

impl Criterion {
    /// Evaluate against `state` with the default structural matcher.
    ///
    /// `$`-prefixed operands are expanded before evaluation.
    pub fn apply(&self, state: &dyn State) -> Result<bool, CriteriaError> {
        self.apply_with(state, &StructuralMatcher)
    }

    /// Evaluate against `state` using `matcher` for the equality operators
    pub fn apply_with(&self, state: &dyn State, matcher: &dyn Matcher) -> Result<bool, CriteriaError> {
        let (left, op, right) = match self {
            Criterion::Group(predicate) => return predicate.apply_with(state, matcher),
            Criterion::Compare { left, op, right } => (left, op, right),
        };

        let left = left.as_ref().map(|operand| Resolved::resolve(operand, state));
        let right = right.as_ref().map(|operand| Resolved::resolve(operand, state));

        let result = if self.is_uni_operand() {
            left.map(|l| is_truthy(&l.into_value())).unwrap_or(false)
        } else {
            match op {
                Some(ordering) if ordering.is_ordering() => {
                    self.compare_numbers(*ordering, left.as_ref(), right.as_ref())?
                }
                _ => {
                    let expected = right.map(Resolved::into_value).unwrap_or(Value::Null);
                    let actual = left.map(Resolved::into_value).unwrap_or(Value::Null);
                    let mismatches = matcher.assert_equals(&expected, &actual)?;
                    match op {
                        Some(CompareOp::Equal | CompareOp::Assert) => mismatches == 0,
                        _ => mismatches > 0,
                    }
                }
            }
        };

        log::trace!("criterion {} -> {}", self, result);
        Ok(result)
    }

    fn compare_numbers(
        &self,
        op: CompareOp,
        left: Option<&Resolved>,
        right: Option<&Resolved>,
    ) -> Result<bool, EvalError> {
        let number = |operand: Option<&Resolved>| -> Result<f64, EvalError> {
            let operand = operand.ok_or_else(|| EvalError::MissingOperand {
                expression: self.to_string(),
            })?;
            operand.as_number().ok_or_else(|| EvalError::NotNumeric {
                operand: operand.text(),
                expression: self.to_string(),
            })
        };
        let left = number(left)?;
        let right = number(right)?;
        Ok(match op {
            CompareOp::Greater => left > right,
            CompareOp::GreaterOrEqual => left >= right,
            CompareOp::Less => left < right,
            CompareOp::LessOrEqual => left <= right,
            CompareOp::Equal | CompareOp::Assert | CompareOp::NotEqual => {
                return Err(EvalError::Internal(format!(
                    "'{}' is not an ordering operator in expression: {}",
                    op, self
                )))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::ast::Predicate;
    use crate::error::MatchError;
    use crate::state::ExecutionState;
    use serde_json::json;

    fn apply(criterion: Criterion) -> Result<bool, CriteriaError> {
        criterion.apply(&ExecutionState::empty())
    }

    #[test]
    fn test_malformed_directive_is_an_error() {
        let result = apply(Criterion::compare("123", CompareOp::Assert, "/[12.13]/"));
        assert!(matches!(
            result,
            Err(CriteriaError::Eval(EvalError::Match(MatchError::MalformedDirective { .. })))
        ));
    }

    #[test]
    fn test_numeric_comparisons() {
        assert!(apply(Criterion::compare("21", CompareOp::Greater, "10")).unwrap());
        assert!(apply(Criterion::compare("12", CompareOp::GreaterOrEqual, "12")).unwrap());
        assert!(!apply(Criterion::compare("12", CompareOp::Greater, "12")).unwrap());
        assert!(apply(Criterion::compare("12", CompareOp::LessOrEqual, "12")).unwrap());
        assert!(!apply(Criterion::compare("12", CompareOp::Less, "12")).unwrap());
        assert!(apply(Criterion::compare("-1.5", CompareOp::Less, "+2")).unwrap());
    }

    #[test]
    fn test_equality() {
        assert!(apply(Criterion::compare("12", CompareOp::Assert, "12")).unwrap());
        assert!(apply(Criterion::compare("a", CompareOp::Equal, "a")).unwrap());
        assert!(!apply(Criterion::compare("12", CompareOp::NotEqual, "12")).unwrap());
        assert!(apply(Criterion::compare("1", CompareOp::NotEqual, "0")).unwrap());
        assert!(apply(Criterion::compare("1", CompareOp::Assert, "!0")).unwrap());
    }

    #[test]
    fn test_non_numeric_ordering_is_an_error() {
        let err = apply(Criterion::compare("abc", CompareOp::Greater, "1")).unwrap_err();
        assert_eq!(
            err,
            CriteriaError::Eval(EvalError::NotNumeric {
                operand: "abc".to_string(),
                expression: "abc > 1".to_string(),
            })
        );

        let err = apply(Criterion::new(Some("1".into()), Some(CompareOp::Less), None)).unwrap_err();
        assert!(matches!(err, CriteriaError::Eval(EvalError::MissingOperand { .. })));
    }

    #[test]
    fn test_equality_operator_is_not_compared_numerically() {
        let criterion = Criterion::compare("1", CompareOp::Equal, "1");
        let one = Resolved::Raw("1".to_string());
        let err = criterion
            .compare_numbers(CompareOp::Equal, Some(&one), Some(&one))
            .unwrap_err();
        assert!(matches!(err, EvalError::Internal(_)));
        assert!(criterion
            .compare_numbers(CompareOp::GreaterOrEqual, Some(&one), Some(&one))
            .unwrap());
    }

    #[test]
    fn test_undefined_reference_in_ordering_is_an_error() {
        let err = apply(Criterion::compare("$counter", CompareOp::Greater, "10")).unwrap_err();
        assert!(matches!(
            err,
            CriteriaError::Eval(EvalError::NotNumeric { ref operand, .. }) if operand == "$counter"
        ));
    }

    #[test]
    fn test_uni_operand() {
        // an unresolved reference stays as non-empty text
        assert!(apply(Criterion::uni("$ok")).unwrap());
        assert!(!apply(Criterion::uni("")).unwrap());

        let mut state = ExecutionState::empty();
        state.put("yes", json!(true));
        state.put("no", json!(false));
        state.put("noText", json!("false"));
        state.put("f", json!("f"));
        state.put("blank", json!(""));
        state.put("zero", json!(0));
        state.put("empty", json!([]));
        state.put("name", json!("x"));
        state.put("nothing", json!(null));

        for (name, expected) in [
            ("$yes", true),
            ("$no", false),
            ("$noText", true),
            ("$f", true),
            ("$blank", false),
            ("$zero", false),
            ("$empty", false),
            ("$name", true),
            ("$nothing", false),
        ] {
            assert_eq!(
                Criterion::uni(name).apply(&state).unwrap(),
                expected,
                "{}",
                name
            );
            let relabeled = Criterion::new(Some(name.into()), Some(CompareOp::NotEqual), None);
            assert_eq!(relabeled.apply(&state).unwrap(), expected, "{} !=", name);
        }
    }

    #[test]
    fn test_interpolated_operands() {
        let mut state = ExecutionState::empty();
        state.put("counter", json!(21));
        state.put("a", json!({"x": 1}));
        state.put("b", json!({"x": 1}));
        state.put("c", json!({"x": 2}));

        assert!(Criterion::compare("$counter", CompareOp::Greater, "10").apply(&state).unwrap());
        assert!(Criterion::compare("$a", CompareOp::Equal, "$b").apply(&state).unwrap());
        assert!(!Criterion::compare("$a", CompareOp::Equal, "$c").apply(&state).unwrap());
        assert!(Criterion::compare("$a", CompareOp::NotEqual, "$c").apply(&state).unwrap());
    }

    #[test]
    fn test_empty_left_operand() {
        let mut state = ExecutionState::empty();
        state.put("value", json!("x"));
        let criterion = Criterion::new(None, Some(CompareOp::Assert), Some("!$value".into()));
        assert!(criterion.apply(&state).unwrap());
    }

    #[test]
    fn test_group_delegates() {
        let criterion = Criterion::group(Predicate::or(vec![
            Criterion::compare("1", CompareOp::Equal, "2"),
            Criterion::compare("2", CompareOp::Equal, "2"),
        ]));
        assert!(apply(criterion).unwrap());
    }

    struct AlwaysMismatch;

    impl Matcher for AlwaysMismatch {
        fn assert_equals(&self, _expected: &Value, _actual: &Value) -> Result<usize, MatchError> {
            Ok(1)
        }
    }

    #[test]
    fn test_custom_matcher() {
        let criterion = Criterion::compare("a", CompareOp::Equal, "a");
        let state = ExecutionState::empty();
        assert!(!criterion.apply_with(&state, &AlwaysMismatch).unwrap());
    }
}
