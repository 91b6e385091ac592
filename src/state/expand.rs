// SPDX-License-Identifier: MIT

//! `$reference` interpolation
//!
//! Supported forms: `$name`, `${name}`, `$a.b[0].c`, `${a.b[0]}` and function
//! calls `$Fn(arg, ...)`. A text that is exactly one reference expands to the
//! referenced value with its type preserved; references embedded in longer
//! text are substituted as text. Unresolved references are left untouched.

use serde_json::Value;

use super::store::ExecutionState;
use super::value_to_text;

#[derive(Debug, Clone, PartialEq)]
enum Reference<'a> {
    Path(&'a str),
    Call { name: &'a str, args: &'a str },
}

#[derive(Debug, Clone, PartialEq)]
struct Span<'a> {
    start: usize,
    end: usize,
    reference: Reference<'a>,
}

pub(crate) fn expand(state: &ExecutionState, text: &str) -> Value {
    let spans = scan(text);
    if spans.is_empty() {
        return Value::String(text.to_string());
    }

    if let [span] = spans.as_slice() {
        if span.start == 0 && span.end == text.len() {
            return resolve(state, &span.reference).unwrap_or_else(|| {
                log::debug!("unresolved reference {}", text);
                Value::String(text.to_string())
            });
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in &spans {
        out.push_str(&text[cursor..span.start]);
        match resolve(state, &span.reference) {
            Some(value) => out.push_str(&value_to_text(&value)),
            None => {
                log::debug!("unresolved reference {}", &text[span.start..span.end]);
                out.push_str(&text[span.start..span.end]);
            }
        }
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    Value::String(out)
}

fn resolve(state: &ExecutionState, reference: &Reference<'_>) -> Option<Value> {
    match reference {
        Reference::Path(path) => state.get_path(path).cloned(),
        Reference::Call { name, args } => {
            let function = state.function(name)?;
            let values: Vec<Value> = split_args(args)
                .into_iter()
                .map(|arg| expand_arg(state, arg))
                .collect();
            match function(&values) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::debug!("{}", e);
                    None
                }
            }
        }
    }
}

fn expand_arg(state: &ExecutionState, arg: &str) -> Value {
    let quoted = arg.len() >= 2
        && ((arg.starts_with('\'') && arg.ends_with('\''))
            || (arg.starts_with('"') && arg.ends_with('"')));
    if quoted {
        return Value::String(arg[1..arg.len() - 1].to_string());
    }
    expand(state, arg)
}

/// Split function arguments on top-level commas
fn split_args(args: &str) -> Vec<&str> {
    if args.trim().is_empty() {
        return vec![];
    }
    let mut parts = vec![];
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(args[start..].trim());
    parts
}

fn scan(text: &str) -> Vec<Span<'_>> {
    let mut spans = vec![];
    let mut pos = 0;
    while let Some(found) = text[pos..].find('$') {
        let start = pos + found;
        match reference_at(text, start) {
            Some((reference, end)) => {
                spans.push(Span {
                    start,
                    end,
                    reference,
                });
                pos = end;
            }
            None => pos = start + 1,
        }
    }
    spans
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn ident_len(text: &str) -> usize {
    match text.chars().next() {
        Some(c) if is_ident_start(c) => text
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(text.len()),
        _ => 0,
    }
}

fn balanced_len(text: &str, open: char, close: char) -> Option<usize> {
    if !text.starts_with(open) {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i + 1);
            }
        }
    }
    None
}

/// Parse the reference whose `$` sits at `start`; returns it with its end offset
fn reference_at(text: &str, start: usize) -> Option<(Reference<'_>, usize)> {
    let body_start = start + 1;
    let rest = &text[body_start..];

    if rest.starts_with('{') {
        let len = balanced_len(rest, '{', '}')?;
        let inner = rest[1..len - 1].trim();
        if inner.is_empty() {
            return None;
        }
        return Some((classify(inner), body_start + len));
    }

    let name_len = ident_len(rest);
    if name_len == 0 {
        return None;
    }
    let after = &rest[name_len..];
    if after.starts_with('(') {
        let len = balanced_len(after, '(', ')')?;
        let reference = Reference::Call {
            name: &rest[..name_len],
            args: &after[1..len - 1],
        };
        return Some((reference, body_start + name_len + len));
    }

    let mut end = name_len;
    loop {
        let tail = &rest[end..];
        if let Some(segment) = tail.strip_prefix('.') {
            let len = segment
                .char_indices()
                .find(|(_, c)| !is_ident_char(*c))
                .map(|(i, _)| i)
                .unwrap_or(segment.len());
            if len == 0 {
                break;
            }
            end += 1 + len;
        } else if tail.starts_with('[') {
            match balanced_len(tail, '[', ']') {
                Some(len) => end += len,
                None => break,
            }
        } else {
            break;
        }
    }
    Some((Reference::Path(&rest[..end]), body_start + end))
}

/// `${Fn(args)}` is a call, anything else inside braces is a path
fn classify(inner: &str) -> Reference<'_> {
    let name_len = ident_len(inner);
    let after = &inner[name_len..];
    if name_len > 0 && after.starts_with('(') {
        if let Some(len) = balanced_len(after, '(', ')') {
            if len == after.len() {
                return Reference::Call {
                    name: &inner[..name_len],
                    args: &after[1..len - 1],
                };
            }
        }
    }
    Reference::Path(inner)
}
