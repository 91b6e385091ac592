// SPDX-License-Identifier: MIT

//! Predicate tree for criteria expressions

use std::fmt;

/// Raw operand text as written in the expression, quotes removed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operand(String);

impl Operand {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the text references state and needs interpolation
    pub fn is_reference(&self) -> bool {
        self.0.contains('$')
    }
}

impl From<&str> for Operand {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Operand {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// =
    Equal,
    /// : (assertion, free-form expected value)
    Assert,
    /// != and <>
    NotEqual,
    /// >
    Greater,
    /// >=
    GreaterOrEqual,
    /// <
    Less,
    /// <=
    LessOrEqual,
}

impl CompareOp {
    /// Map an operator keyword to its operator
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "=" => Some(CompareOp::Equal),
            ":" => Some(CompareOp::Assert),
            "!=" | "<>" => Some(CompareOp::NotEqual),
            ">" => Some(CompareOp::Greater),
            ">=" => Some(CompareOp::GreaterOrEqual),
            "<" => Some(CompareOp::Less),
            "<=" => Some(CompareOp::LessOrEqual),
            _ => None,
        }
    }

    /// The complementary operator, used to fold a `!` written before an operator
    pub fn negate(self) -> Self {
        match self {
            CompareOp::Equal | CompareOp::Assert => CompareOp::NotEqual,
            CompareOp::NotEqual => CompareOp::Equal,
            CompareOp::Greater => CompareOp::LessOrEqual,
            CompareOp::GreaterOrEqual => CompareOp::Less,
            CompareOp::Less => CompareOp::GreaterOrEqual,
            CompareOp::LessOrEqual => CompareOp::Greater,
        }
    }

    /// Whether the operator compares numerically
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            CompareOp::Greater
                | CompareOp::GreaterOrEqual
                | CompareOp::Less
                | CompareOp::LessOrEqual
        )
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Equal => write!(f, "="),
            CompareOp::Assert => write!(f, ":"),
            CompareOp::NotEqual => write!(f, "!="),
            CompareOp::Greater => write!(f, ">"),
            CompareOp::GreaterOrEqual => write!(f, ">="),
            CompareOp::Less => write!(f, "<"),
            CompareOp::LessOrEqual => write!(f, "<="),
        }
    }
}

/// Logical operator joining the children of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// &&
    And,
    /// ||
    Or,
}

impl LogicalOp {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "&&" => Some(LogicalOp::And),
            "||" => Some(LogicalOp::Or),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "&&"),
            LogicalOp::Or => write!(f, "||"),
        }
    }
}

/// A leaf comparison or a wrapper around a nested predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Compare {
        left: Option<Operand>,
        op: Option<CompareOp>,
        right: Option<Operand>,
    },
    Group(Predicate),
}

impl Criterion {
    pub fn new(left: Option<Operand>, op: Option<CompareOp>, right: Option<Operand>) -> Self {
        Criterion::Compare { left, op, right }
    }

    /// `left op right`
    pub fn compare(left: impl Into<Operand>, op: CompareOp, right: impl Into<Operand>) -> Self {
        Criterion::new(Some(left.into()), Some(op), Some(right.into()))
    }

    /// Bare truthy test on a single operand
    pub fn uni(left: impl Into<Operand>) -> Self {
        Criterion::new(Some(left.into()), None, None)
    }

    pub fn group(predicate: Predicate) -> Self {
        Criterion::Group(predicate)
    }

    /// Whether the criterion tests the truthiness of its left operand only.
    ///
    /// Both the unlabeled form and `!=` without a right operand qualify.
    pub fn is_uni_operand(&self) -> bool {
        matches!(
            self,
            Criterion::Compare {
                op: None | Some(CompareOp::NotEqual),
                right: None,
                ..
            }
        )
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Group(predicate) => write!(f, "({})", predicate),
            Criterion::Compare { left, op, right } => {
                let mut parts = vec![];
                if let Some(left) = left {
                    parts.push(left.to_string());
                }
                if let Some(op) = op {
                    parts.push(op.to_string());
                }
                if let Some(right) = right {
                    parts.push(right.to_string());
                }
                f.write_str(&parts.join(" "))
            }
        }
    }
}

/// Ordered criteria joined by a single logical operator
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    pub operator: Option<LogicalOp>,
    pub criteria: Vec<Criterion>,
}

impl Predicate {
    pub fn new(operator: Option<LogicalOp>, criteria: Vec<Criterion>) -> Self {
        Self { operator, criteria }
    }

    pub fn and(criteria: Vec<Criterion>) -> Self {
        Self::new(Some(LogicalOp::And), criteria)
    }

    pub fn or(criteria: Vec<Criterion>) -> Self {
        Self::new(Some(LogicalOp::Or), criteria)
    }

    /// Predicate holding one criterion and no logical operator
    pub fn single(criterion: Criterion) -> Self {
        Self::new(None, vec![criterion])
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Number of predicate levels, counting this one
    pub fn depth(&self) -> usize {
        1 + self
            .criteria
            .iter()
            .filter_map(|c| match c {
                Criterion::Group(p) => Some(p.depth()),
                Criterion::Compare { .. } => None,
            })
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = match self.operator {
            Some(op) => format!(" {} ", op),
            None => " ".to_string(),
        };
        let parts: Vec<String> = self.criteria.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join(&separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_op_display() {
        assert_eq!(format!("{}", CompareOp::Equal), "=");
        assert_eq!(format!("{}", CompareOp::Assert), ":");
        assert_eq!(format!("{}", CompareOp::NotEqual), "!=");
        assert_eq!(format!("{}", CompareOp::Greater), ">");
        assert_eq!(format!("{}", CompareOp::GreaterOrEqual), ">=");
        assert_eq!(format!("{}", CompareOp::Less), "<");
        assert_eq!(format!("{}", CompareOp::LessOrEqual), "<=");
    }

    #[test]
    fn test_from_keyword() {
        assert_eq!(CompareOp::from_keyword("<>"), Some(CompareOp::NotEqual));
        assert_eq!(CompareOp::from_keyword("!="), Some(CompareOp::NotEqual));
        assert_eq!(CompareOp::from_keyword(":"), Some(CompareOp::Assert));
        assert_eq!(CompareOp::from_keyword("=="), None);
        assert_eq!(LogicalOp::from_keyword("||"), Some(LogicalOp::Or));
    }

    #[test]
    fn test_negate_is_complement() {
        assert_eq!(CompareOp::Equal.negate(), CompareOp::NotEqual);
        assert_eq!(CompareOp::Assert.negate(), CompareOp::NotEqual);
        assert_eq!(CompareOp::NotEqual.negate(), CompareOp::Equal);
        assert_eq!(CompareOp::Greater.negate(), CompareOp::LessOrEqual);
        assert_eq!(CompareOp::LessOrEqual.negate(), CompareOp::Greater);
        assert_eq!(CompareOp::Less.negate(), CompareOp::GreaterOrEqual);
    }

    #[test]
    fn test_uni_operand_forms() {
        assert!(Criterion::uni("$ok").is_uni_operand());
        assert!(Criterion::new(Some("$ok".into()), Some(CompareOp::NotEqual), None).is_uni_operand());
        assert!(!Criterion::compare("$ok", CompareOp::NotEqual, "1").is_uni_operand());
        assert!(!Criterion::group(Predicate::single(Criterion::uni("$ok"))).is_uni_operand());
    }

    #[test]
    fn test_display_round_trips_structure() {
        let predicate = Predicate::and(vec![
            Criterion::uni("$k0"),
            Criterion::group(Predicate::or(vec![
                Criterion::compare("$k1", CompareOp::Greater, "1"),
                Criterion::uni("$k2"),
            ])),
        ]);
        assert_eq!(predicate.to_string(), "$k0 && ($k1 > 1 || $k2)");
        assert_eq!(predicate.depth(), 2);
    }
}
