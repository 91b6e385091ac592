// SPDX-License-Identifier: MIT

//! Token types produced by the criteria lexer

/// Kinds of tokens the lexer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Illegal,
    Whitespace,
    /// `$a.b[0]`, `/regex/`, signed numerics, bare words
    Operand,
    /// `=`, `>=`, `<=`, `<>`, `>`, `<`, `!=`, `:`
    Operator,
    /// `&&`, `||`
    LogicalOperator,
    /// `'...'`
    Quoted,
    /// `{...}`
    JsonObject,
    /// `[...]`
    JsonArray,
    /// `(...)`
    Grouping,
    /// Free-form right side of `:`, up to the next logical operator
    AssertTail,
}

impl TokenKind {
    /// Human readable name used in "expected ..." diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Eof => "end of expression",
            TokenKind::Illegal => "illegal token",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Operand => "operand",
            TokenKind::Operator => "operator",
            TokenKind::LogicalOperator => "logical operator",
            TokenKind::Quoted => "quoted text",
            TokenKind::JsonObject => "JSON object",
            TokenKind::JsonArray => "JSON array",
            TokenKind::Grouping => "grouping expression",
            TokenKind::AssertTail => "expected value",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// A lexed token, borrowing its text from the expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the token in the expression
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str, offset: usize) -> Self {
        Self { kind, text, offset }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Body of a delimited token without its delimiters
    pub fn body(&self) -> &'a str {
        match self.kind {
            TokenKind::Quoted | TokenKind::Grouping | TokenKind::JsonObject | TokenKind::JsonArray
                if self.text.len() >= 2 =>
            {
                &self.text[1..self.text.len() - 1]
            }
            _ => self.text,
        }
    }
}
