// SPDX-License-Identifier: MIT

//! Built-in functions callable from expressions as `$Name(args)`

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::value_to_text;
use crate::error::FunctionError;

/// A function invoked with already-expanded arguments
pub type Function = Arc<dyn Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync>;

type Builtin = fn(&[Value]) -> Result<Value, FunctionError>;

static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    let mut functions: HashMap<&'static str, Builtin> = HashMap::new();
    functions.insert("Len", len);
    functions.insert("Lower", lower);
    functions.insert("Upper", upper);
    functions.insert("Trim", trim);
    functions.insert("Keys", keys);
    functions.insert("Values", values);
    functions.insert("Join", join);
    functions.insert("Contains", contains);
    functions.insert("IsEmpty", is_empty);
    functions
});

/// Look up a built-in by name
pub fn builtin(name: &str) -> Option<Function> {
    BUILTINS
        .get(name)
        .map(|f| -> Function { Arc::new(*f) })
}

/// Names of all built-ins
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BUILTINS.keys().copied().collect();
    names.sort_unstable();
    names
}

fn arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a Value, FunctionError> {
    args.get(index).ok_or_else(|| {
        FunctionError::new(name, format!("expected argument at position {}", index))
    })
}

fn len(args: &[Value]) -> Result<Value, FunctionError> {
    let size = match arg("Len", args, 0)? {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::Null => 0,
        other => {
            return Err(FunctionError::new(
                "Len",
                format!("unsupported argument {}", other),
            ))
        }
    };
    Ok(Value::from(size))
}

fn lower(args: &[Value]) -> Result<Value, FunctionError> {
    Ok(Value::String(value_to_text(arg("Lower", args, 0)?).to_lowercase()))
}

fn upper(args: &[Value]) -> Result<Value, FunctionError> {
    Ok(Value::String(value_to_text(arg("Upper", args, 0)?).to_uppercase()))
}

fn trim(args: &[Value]) -> Result<Value, FunctionError> {
    Ok(Value::String(value_to_text(arg("Trim", args, 0)?).trim().to_string()))
}

fn keys(args: &[Value]) -> Result<Value, FunctionError> {
    match arg("Keys", args, 0)? {
        Value::Object(map) => Ok(Value::Array(
            map.keys().map(|k| Value::String(k.clone())).collect(),
        )),
        other => Err(FunctionError::new(
            "Keys",
            format!("expected object, got {}", other),
        )),
    }
}

fn values(args: &[Value]) -> Result<Value, FunctionError> {
    match arg("Values", args, 0)? {
        Value::Object(map) => Ok(Value::Array(map.values().cloned().collect())),
        other => Err(FunctionError::new(
            "Values",
            format!("expected object, got {}", other),
        )),
    }
}

fn join(args: &[Value]) -> Result<Value, FunctionError> {
    let separator = args.get(1).map(value_to_text).unwrap_or_else(|| ",".to_string());
    match arg("Join", args, 0)? {
        Value::Array(items) => Ok(Value::String(
            items
                .iter()
                .map(value_to_text)
                .collect::<Vec<_>>()
                .join(&separator),
        )),
        other => Err(FunctionError::new(
            "Join",
            format!("expected array, got {}", other),
        )),
    }
}

fn contains(args: &[Value]) -> Result<Value, FunctionError> {
    let needle = arg("Contains", args, 1)?;
    let found = match arg("Contains", args, 0)? {
        Value::String(s) => s.contains(&value_to_text(needle)),
        Value::Array(items) => items
            .iter()
            .any(|item| item == needle || value_to_text(item) == value_to_text(needle)),
        Value::Object(map) => map.contains_key(&value_to_text(needle)),
        _ => false,
    };
    Ok(Value::Bool(found))
}

fn is_empty(args: &[Value]) -> Result<Value, FunctionError> {
    let empty = match args.first() {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    };
    Ok(Value::Bool(empty))
}
