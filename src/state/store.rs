// SPDX-License-Identifier: MIT

//! Runtime state storage for criteria evaluation

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::expand;
use super::udf::{self, Function};
use super::State;
use crate::error::{ConfigError, FunctionError};

/// One step of a state path
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Key(String),
    Index(usize),
}

/// Split `a.b[0]['c']` into navigation segments
pub(crate) fn path_segments(path: &str) -> Vec<Segment> {
    let mut segments = vec![];
    let mut key = String::new();
    let mut chars = path.chars();

    let flush = |key: &mut String, segments: &mut Vec<Segment>| {
        if !key.is_empty() {
            segments.push(Segment::Key(std::mem::take(key)));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '.' => flush(&mut key, &mut segments),
            '[' => {
                flush(&mut key, &mut segments);
                let mut inner = String::new();
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    inner.push(c);
                }
                let inner = inner.trim().trim_matches(|c: char| c == '\'' || c == '"');
                match inner.parse::<usize>() {
                    Ok(index) => segments.push(Segment::Index(index)),
                    Err(_) if !inner.is_empty() => segments.push(Segment::Key(inner.to_string())),
                    Err(_) => {}
                }
            }
            _ => key.push(c),
        }
    }
    flush(&mut key, &mut segments);
    segments
}

/// Mutable, path-addressable workflow state with user-defined functions
#[derive(Clone, Default)]
pub struct ExecutionState {
    /// Current state values
    fields: Map<String, Value>,
    /// Functions callable as `$Name(args)`
    functions: HashMap<String, Function>,
}

impl ExecutionState {
    /// Create an empty ExecutionState
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build state from a JSON object
    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                functions: HashMap::new(),
            }),
            Value::Null => Ok(Self::empty()),
            other => Err(ConfigError::Invalid(format!(
                "state must be an object, got {}",
                other
            ))),
        }
    }

    /// Build state from a YAML mapping
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(content)?;
        Self::from_json(value)
    }

    /// Set a top-level field, replacing any previous value
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Get a top-level field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a nested value using dot and bracket notation (e.g. `responses[0].Body`).
    ///
    /// A key stored verbatim under the full path wins over navigation.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(path) {
            return Some(value);
        }
        let segments = path_segments(path);
        let (first, rest) = segments.split_first()?;
        let mut current = match first {
            Segment::Key(key) => self.fields.get(key)?,
            Segment::Index(_) => return None,
        };
        for segment in rest {
            current = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key)?,
                (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Register a function callable as `$name(args)`; it shadows a built-in of the same name
    pub fn register_function<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    /// Look up a registered or built-in function
    pub fn function(&self, name: &str) -> Option<Function> {
        self.functions
            .get(name)
            .cloned()
            .or_else(|| udf::builtin(name))
    }

    /// Convert state to JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Get all field names
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }
}

impl State for ExecutionState {
    fn expand(&self, text: &str) -> Value {
        expand::expand(self, text)
    }
}

impl fmt::Debug for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("ExecutionState")
            .field("fields", &self.fields)
            .field("functions", &names)
            .finish()
    }
}
