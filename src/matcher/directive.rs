// SPDX-License-Identifier: MIT

//! Expected-value directives
//!
//! Text on the expected side of a comparison may carry a directive:
//! - `!x` negates any directive
//! - `/body/` searches the actual text with the regular expression `body`
//! - `~/regex/` is an explicit regular expression
//! - `/[1..10]/` is an inclusive numeric range, `/[a,b,c]/` a one-of set
//! - anything else is a literal

use regex::Regex;
use serde_json::Value;

use crate::error::MatchError;
use crate::state::value_to_text;

#[derive(Debug, Clone)]
pub enum Directive {
    Not(Box<Directive>),
    Pattern(Regex),
    Range(f64, f64),
    OneOf(Vec<String>),
    Literal(String),
}

impl Directive {
    pub fn parse(text: &str, path: &str) -> Result<Self, MatchError> {
        if let Some(rest) = text.strip_prefix('!') {
            if !rest.is_empty() {
                return Ok(Directive::Not(Box::new(Directive::parse(rest, path)?)));
            }
        }
        if let Some(body) = text
            .strip_prefix("~/")
            .and_then(|rest| rest.strip_suffix('/'))
        {
            return compile(body, path);
        }
        if text.len() >= 2 && text.starts_with('/') && text.ends_with('/') {
            let body = &text[1..text.len() - 1];
            if let Some(inner) = body.strip_prefix('[').and_then(|b| b.strip_suffix(']')) {
                return bracketed(inner, text, path);
            }
            return compile(body, path);
        }
        Ok(Directive::Literal(text.to_string()))
    }

    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Directive::Not(inner) => !inner.matches(actual),
            Directive::Pattern(regex) => regex.is_match(&value_to_text(actual)),
            Directive::Range(low, high) => {
                as_number(actual).is_some_and(|n| *low <= n && n <= *high)
            }
            Directive::OneOf(items) => items.iter().any(|item| literal_matches(item, actual)),
            Directive::Literal(expected) => literal_matches(expected, actual),
        }
    }
}

fn compile(body: &str, path: &str) -> Result<Directive, MatchError> {
    Regex::new(body)
        .map(Directive::Pattern)
        .map_err(|e| MatchError::InvalidPattern {
            path: path.to_string(),
            pattern: body.to_string(),
            reason: e.to_string(),
        })
}

fn bracketed(inner: &str, directive: &str, path: &str) -> Result<Directive, MatchError> {
    let malformed = || MatchError::MalformedDirective {
        path: path.to_string(),
        directive: directive.to_string(),
    };
    if let Some((low, high)) = inner.split_once("..") {
        let low = low.trim().parse::<f64>().map_err(|_| malformed())?;
        let high = high.trim().parse::<f64>().map_err(|_| malformed())?;
        return Ok(Directive::Range(low, high));
    }
    if inner.contains(',') {
        return Ok(Directive::OneOf(
            inner.split(',').map(|item| item.trim().to_string()).collect(),
        ));
    }
    Err(malformed())
}

/// Numeric view of a value: numbers and numeric text
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Literal comparison with coercion towards the actual value's type
pub(crate) fn literal_matches(expected: &str, actual: &Value) -> bool {
    match actual {
        Value::Null => expected.is_empty() || expected == "null",
        Value::Bool(b) => expected.eq_ignore_ascii_case(if *b { "true" } else { "false" }),
        Value::Number(_) => numbers_equal(expected, actual) || expected == value_to_text(actual),
        Value::String(s) => s == expected || numbers_equal(expected, actual),
        Value::Array(_) | Value::Object(_) => expected == value_to_text(actual),
    }
}

fn numbers_equal(expected: &str, actual: &Value) -> bool {
    match (expected.trim().parse::<f64>(), as_number(actual)) {
        (Ok(e), Some(a)) => e == a,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(directive: &str, actual: Value) -> bool {
        Directive::parse(directive, "/").unwrap().matches(&actual)
    }

    #[test]
    fn test_literal_coercion() {
        assert!(check("12", json!(12)));
        assert!(check("12", json!("12")));
        assert!(check("12", json!(12.0)));
        assert!(check("1.0", json!("1")));
        assert!(check("true", json!(true)));
        assert!(check("TRUE", json!(true)));
        assert!(!check("true", json!(false)));
        assert!(check("", json!(null)));
        assert!(!check("abc", json!("abcd")));
    }

    #[test]
    fn test_negation() {
        assert!(check("!0", json!(1)));
        assert!(!check("!0", json!(0)));
        assert!(check("!/16.2.1/", json!("3")));
        assert!(check("!", json!("!")));
    }

    #[test]
    fn test_pattern() {
        assert!(check("/abc/", json!("xxabcxx")));
        assert!(check("/(END)/", json!("output END")));
        assert!(check("//auctionwon/", json!("http://auctionwon/")));
        assert!(check("~/^[0-9]+$/", json!("123")));
        assert!(!check("~/^[0-9]+$/", json!("12a")));
        assert!(check("/^2\\d\\d$/", json!(204)));
    }

    #[test]
    fn test_range_and_set() {
        assert!(check("/[1..10]/", json!(5)));
        assert!(check("/[1..10]/", json!("10")));
        assert!(!check("/[1..10]/", json!(11)));
        assert!(!check("/[1..10]/", json!("x")));
        assert!(check("/[a, b, c]/", json!("b")));
        assert!(!check("/[a,b]/", json!("d")));
    }

    #[test]
    fn test_malformed_bracket_directive() {
        let err = Directive::parse("/[12.13]/", "/").unwrap_err();
        assert!(matches!(err, MatchError::MalformedDirective { .. }));

        let err = Directive::parse("/[a..b]/", "/").unwrap_err();
        assert!(matches!(err, MatchError::MalformedDirective { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Directive::parse("/(unclosed/", "/a").unwrap_err();
        match err {
            MatchError::InvalidPattern { path, pattern, .. } => {
                assert_eq!(path, "/a");
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("Expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_single_slash_is_literal() {
        assert!(check("/", json!("/")));
    }
}
