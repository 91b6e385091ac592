// SPDX-License-Identifier: MIT

//! Predicate evaluation

use super::ast::{LogicalOp, Predicate};
use crate::error::CriteriaError;
use crate::matcher::{Matcher, StructuralMatcher};
use crate::state::State;

impl Predicate {
    /// Evaluate against `state`; an empty predicate is `false`
    pub fn apply(&self, state: &dyn State) -> Result<bool, CriteriaError> {
        self.apply_or(state, false)
    }

    /// Evaluate against `state`; an empty predicate yields `default`
    pub fn apply_or(&self, state: &dyn State, default: bool) -> Result<bool, CriteriaError> {
        if self.is_empty() {
            return Ok(default);
        }
        self.apply_with(state, &StructuralMatcher)
    }

    /// Reduce children left to right.
    ///
    /// The first deciding child (`false` under `&&`, `true` under `||`) fixes
    /// the result, but every child is still applied so that an error anywhere
    /// in the list is returned rather than hidden behind the short-circuit.
    pub fn apply_with(&self, state: &dyn State, matcher: &dyn Matcher) -> Result<bool, CriteriaError> {
        let operator = match (self.operator, self.criteria.as_slice()) {
            (_, []) => return Ok(false),
            (None, [only]) => return only.apply_with(state, matcher),
            (None, _) => LogicalOp::And,
            (Some(op), _) => op,
        };
        let deciding = operator == LogicalOp::Or;

        let mut decided = false;
        for criterion in &self.criteria {
            let value = criterion.apply_with(state, matcher)?;
            if value == deciding {
                decided = true;
            }
        }
        let result = if decided { deciding } else { !deciding };
        log::trace!("predicate {} -> {}", self, result);
        Ok(result)
    }
}
