// SPDX-License-Identifier: MIT

//! Criteria lexer
//!
//! The lexer is pulled by the parser, which names the token kinds it accepts
//! at each step. Matchers run in the caller's order and the first one that
//! matches a non-empty run wins, so `>=` is tried before `>` and quoted or
//! bracketed bodies are tried before bare operands.

use super::token::{Token, TokenKind};
use crate::error::LexError;

/// Operator keywords, longest first
const OPERATORS: [&str; 8] = [">=", "<=", "<>", "!=", "=", ">", "<", ":"];

const LOGICAL_OPERATORS: [&str; 2] = ["&&", "||"];

const OPERAND_SYMBOLS: &str = "._$[]{}!-/\\+*";

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_operand_char(c: char) -> bool {
    c.is_alphanumeric() || OPERAND_SYMBOLS.contains(c)
}

/// On-demand tokenizer over a single expression
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Offset of `input` inside the outermost expression
    base: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_offset(input, 0)
    }

    /// Lexer over a fragment that starts `base` bytes into the full expression
    pub fn with_offset(input: &'a str, base: usize) -> Self {
        Self {
            input,
            pos: 0,
            base,
        }
    }

    /// Absolute offset of the cursor
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Consume the first of `expected` that matches at the cursor.
    ///
    /// Returns an `Eof` token at the end of input when nothing else matched
    /// and an `Illegal` token (cursor unchanged) otherwise.
    pub fn next(&mut self, expected: &[TokenKind]) -> Token<'a> {
        for kind in expected {
            if let Some(token) = self.next_if(*kind) {
                return token;
            }
        }
        let offset = self.offset();
        if self.is_at_end() {
            return Token::new(TokenKind::Eof, "", offset);
        }
        let rest = &self.input[self.pos..];
        let width = rest.chars().next().map(char::len_utf8).unwrap_or(0);
        Token::new(TokenKind::Illegal, &rest[..width], offset)
    }

    /// Consume a token of `kind` if one starts at the cursor
    pub fn next_if(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        let len = self.match_len(kind)?;
        let offset = self.offset();
        let text = &self.input[self.pos..self.pos + len];
        self.pos += len;
        Some(Token::new(kind, text, offset))
    }

    /// Skip a whitespace run, if any
    pub fn skip_whitespace(&mut self) {
        let _ = self.next_if(TokenKind::Whitespace);
    }

    /// Classify the character under the cursor after every expected matcher failed.
    ///
    /// Returns `None` when the cursor is on a well-formed token of some other kind,
    /// which the parser reports as an unexpected token instead.
    pub fn diagnose(&self) -> Option<LexError> {
        let c = self.input[self.pos..].chars().next()?;
        let offset = self.offset();
        let closing = match c {
            '\'' => Some('\''),
            '(' => Some(')'),
            '{' => Some('}'),
            '[' => Some(']'),
            _ => None,
        };
        if let Some(closing) = closing {
            let kind = match c {
                '\'' => TokenKind::Quoted,
                '(' => TokenKind::Grouping,
                '{' => TokenKind::JsonObject,
                _ => TokenKind::JsonArray,
            };
            if self.match_len(kind).is_none() {
                return Some(LexError::Unterminated { offset, closing });
            }
        }
        let legal = [
            TokenKind::Whitespace,
            TokenKind::Operator,
            TokenKind::LogicalOperator,
            TokenKind::Operand,
        ]
        .iter()
        .any(|kind| self.match_len(*kind).is_some());
        if legal || closing.is_some() {
            None
        } else {
            Some(LexError::IllegalCharacter {
                offset,
                character: c,
            })
        }
    }

    fn match_len(&self, kind: TokenKind) -> Option<usize> {
        let rest = &self.input[self.pos..];
        let len = match kind {
            TokenKind::Eof => return rest.is_empty().then_some(0),
            TokenKind::Illegal => return None,
            TokenKind::Whitespace => run_len(rest, is_whitespace),
            TokenKind::Operand => run_len(rest, is_operand_char),
            TokenKind::Operator => keyword_len(rest, &OPERATORS),
            TokenKind::LogicalOperator => keyword_len(rest, &LOGICAL_OPERATORS),
            TokenKind::Quoted => quoted_len(rest),
            TokenKind::Grouping => body_len(rest, '(', ')'),
            TokenKind::JsonObject => body_len(rest, '{', '}'),
            TokenKind::JsonArray => body_len(rest, '[', ']'),
            TokenKind::AssertTail => assert_tail_len(rest),
        };
        (len > 0).then_some(len)
    }
}

fn run_len(rest: &str, accept: fn(char) -> bool) -> usize {
    rest.char_indices()
        .find(|(_, c)| !accept(*c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len())
}

fn keyword_len(rest: &str, keywords: &[&str]) -> usize {
    keywords
        .iter()
        .find(|keyword| {
            rest.get(..keyword.len())
                .map(|prefix| prefix.eq_ignore_ascii_case(keyword))
                .unwrap_or(false)
        })
        .map(|keyword| keyword.len())
        .unwrap_or(0)
}

fn quoted_len(rest: &str) -> usize {
    if !rest.starts_with('\'') {
        return 0;
    }
    rest[1..].find('\'').map(|end| end + 2).unwrap_or(0)
}

fn body_len(rest: &str, open: char, close: char) -> usize {
    if !rest.starts_with(open) {
        return 0;
    }
    let mut depth = 0usize;
    for (i, c) in rest.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return i + c.len_utf8();
            }
        }
    }
    0
}

/// Everything up to the next logical operator, trailing whitespace excluded
fn assert_tail_len(rest: &str) -> usize {
    let end = LOGICAL_OPERATORS
        .iter()
        .filter_map(|op| rest.find(op))
        .min()
        .unwrap_or(rest.len());
    rest[..end].trim_end_matches(is_whitespace).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str, expected: &[TokenKind]) -> Vec<(TokenKind, String)> {
        let mut lexer = Lexer::new(input);
        let mut out = vec![];
        loop {
            lexer.skip_whitespace();
            let token = lexer.next(expected);
            out.push((token.kind, token.text.to_string()));
            if token.is(TokenKind::Eof) || token.is(TokenKind::Illegal) {
                return out;
            }
        }
    }

    #[test]
    fn test_operand_operator_operand() {
        let all = [
            TokenKind::Operand,
            TokenKind::Operator,
            TokenKind::LogicalOperator,
        ];
        assert_eq!(
            kinds("$counter > 10", &all),
            vec![
                (TokenKind::Operand, "$counter".to_string()),
                (TokenKind::Operator, ">".to_string()),
                (TokenKind::Operand, "10".to_string()),
                (TokenKind::Eof, "".to_string()),
            ]
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        let mut lexer = Lexer::new(">=12");
        let token = lexer.next(&[TokenKind::Operator]);
        assert_eq!(token.text, ">=");

        let mut lexer = Lexer::new("<>1");
        assert_eq!(lexer.next(&[TokenKind::Operator]).text, "<>");
    }

    #[test]
    fn test_operand_charset() {
        let mut lexer = Lexer::new("$responses[0].Body:/ok/");
        let token = lexer.next(&[TokenKind::Operand]);
        assert_eq!(token.text, "$responses[0].Body");
        assert_eq!(lexer.next(&[TokenKind::Operator]).text, ":");

        let mut lexer = Lexer::new("-1.5e+3*2 ");
        assert_eq!(lexer.next(&[TokenKind::Operand]).text, "-1.5e+3*2");

        let mut lexer = Lexer::new("foo!=1");
        assert_eq!(lexer.next(&[TokenKind::Operand]).text, "foo!");
        assert_eq!(lexer.next(&[TokenKind::Operator]).text, "=");
    }

    #[test]
    fn test_balanced_bodies() {
        let mut lexer = Lexer::new("(a && (b || c)) && d");
        let token = lexer.next(&[TokenKind::Grouping]);
        assert_eq!(token.text, "(a && (b || c))");
        assert_eq!(token.body(), "a && (b || c)");

        let mut lexer = Lexer::new(r#"{"a":{"b":1}} = x"#);
        assert_eq!(
            lexer.next(&[TokenKind::JsonObject]).text,
            r#"{"a":{"b":1}}"#
        );

        let mut lexer = Lexer::new("[1,[2,3]]");
        assert_eq!(lexer.next(&[TokenKind::JsonArray]).text, "[1,[2,3]]");
    }

    #[test]
    fn test_quoted_keeps_inner_whitespace() {
        let mut lexer = Lexer::new("'hello world' = x");
        let token = lexer.next(&[TokenKind::Quoted, TokenKind::Operand]);
        assert_eq!(token.kind, TokenKind::Quoted);
        assert_eq!(token.body(), "hello world");
    }

    #[test]
    fn test_assert_tail_stops_at_logical_operator() {
        let mut lexer = Lexer::new("123 3 && $b");
        let token = lexer.next(&[TokenKind::AssertTail]);
        assert_eq!(token.text, "123 3");
        lexer.skip_whitespace();
        assert_eq!(lexer.next(&[TokenKind::LogicalOperator]).text, "&&");

        let mut lexer = Lexer::new("/(END)/");
        assert_eq!(lexer.next(&[TokenKind::AssertTail]).text, "/(END)/");
    }

    #[test]
    fn test_offsets_are_absolute() {
        let mut lexer = Lexer::with_offset("$a = 1", 10);
        let token = lexer.next(&[TokenKind::Operand]);
        assert_eq!(token.offset, 10);
        lexer.skip_whitespace();
        assert_eq!(lexer.next(&[TokenKind::Operator]).offset, 13);
    }

    #[test]
    fn test_illegal_and_eof() {
        let mut lexer = Lexer::new("#");
        let token = lexer.next(&[TokenKind::Operand]);
        assert_eq!(token.kind, TokenKind::Illegal);
        assert_eq!(
            lexer.diagnose(),
            Some(LexError::IllegalCharacter {
                offset: 0,
                character: '#'
            })
        );

        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next(&[TokenKind::Operand]).kind, TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_body() {
        let lexer = Lexer::new("'abc");
        assert_eq!(
            lexer.diagnose(),
            Some(LexError::Unterminated {
                offset: 0,
                closing: '\''
            })
        );

        let lexer = Lexer::new("($a || $b");
        assert_eq!(
            lexer.diagnose(),
            Some(LexError::Unterminated {
                offset: 0,
                closing: ')'
            })
        );
    }

    #[test]
    fn test_legal_but_unexpected_is_not_a_lex_error() {
        let lexer = Lexer::new("&& $a");
        assert_eq!(lexer.diagnose(), None);
    }
}
