// SPDX-License-Identifier: MIT

//! Criteria parser
//!
//! Builds a [`Predicate`] tree from expressions like:
//! - `$exitCode = 0`
//! - `$responses[0].Body:/ok/ && $responses[1].StatusCode = 404`
//! - `$k0 && ($k1 || $k2)`
//!
//! There is no fixed precedence between `&&` and `||`. The first logical
//! operator of a predicate binds it; a different operator later in the stream
//! opens a nested predicate holding everything that follows, so
//! `a && b || c || d` reads as `a && b && (c || d)`.

use super::ast::{CompareOp, Criterion, LogicalOp, Operand, Predicate};
use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use crate::config::ParserOptions;
use crate::error::{CriteriaError, ParseError};

/// Tokens that can start a criterion
const START: [TokenKind; 6] = [
    TokenKind::Quoted,
    TokenKind::Grouping,
    TokenKind::JsonObject,
    TokenKind::JsonArray,
    TokenKind::Operator,
    TokenKind::Operand,
];

/// Tokens that can stand on the right of a comparison
const RIGHT: [TokenKind; 4] = [
    TokenKind::Quoted,
    TokenKind::JsonObject,
    TokenKind::JsonArray,
    TokenKind::Operand,
];

const EXPECT_OPERAND: &str = "operand";
const EXPECT_OPERATOR: &str = "operator or logical operator";
const EXPECT_RIGHT: &str = "right operand";
const EXPECT_LOGICAL: &str = "logical operator";

/// Parse `expression` with default options
pub fn parse(expression: &str) -> Result<Predicate, CriteriaError> {
    Parser::default().parse(expression)
}

/// Recursive-descent parser producing [`Predicate`] trees
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn parse(&self, expression: &str) -> Result<Predicate, CriteriaError> {
        let predicate = self.parse_fragment(Lexer::new(expression), 0)?;
        log::debug!("parsed '{}' into {:?}", expression, predicate);
        Ok(predicate)
    }

    /// Parse one grouping level. `depth` counts the predicate levels enclosing it.
    fn parse_fragment(&self, mut lexer: Lexer<'_>, depth: usize) -> Result<Predicate, CriteriaError> {
        self.check_depth(depth, lexer.offset())?;

        // Outer levels are closed for appends once an operator switch opens an inner one
        let mut outer: Vec<Predicate> = vec![];
        let mut current = Predicate::default();

        loop {
            lexer.skip_whitespace();
            let token = required(&mut lexer, &START, EXPECT_OPERAND)?;
            let expected = if token.is(TokenKind::Grouping) {
                let body = Lexer::with_offset(token.body(), token.offset + 1);
                let inner = self.parse_fragment(body, depth + outer.len() + 1)?;
                // A group opening an empty predicate becomes that predicate, operator included
                if current.criteria.is_empty() {
                    current = inner;
                } else {
                    current.criteria.push(Criterion::Group(inner));
                }
                EXPECT_LOGICAL
            } else {
                let criterion = self.parse_criterion(&mut lexer, token)?;
                let expected = if criterion.is_uni_operand() {
                    EXPECT_OPERATOR
                } else {
                    EXPECT_LOGICAL
                };
                current.criteria.push(criterion);
                expected
            };

            lexer.skip_whitespace();
            let token = lexer.next(&[TokenKind::LogicalOperator]);
            if token.is(TokenKind::Eof) {
                break;
            }
            let op = match LogicalOp::from_keyword(token.text) {
                Some(op) if token.is(TokenKind::LogicalOperator) => op,
                _ => return Err(unexpected(&lexer, expected)),
            };

            match current.operator {
                None => current.operator = Some(op),
                Some(existing) if existing == op => {}
                Some(_) => {
                    self.check_depth(depth + outer.len() + 1, token.offset)?;
                    let inner = Predicate::new(Some(op), vec![]);
                    outer.push(std::mem::replace(&mut current, inner));
                }
            }
        }

        let mut predicate = current;
        while let Some(mut parent) = outer.pop() {
            parent.criteria.push(Criterion::Group(predicate));
            predicate = parent;
        }
        Ok(predicate)
    }

    /// Parse a comparison starting at `first`, stopping before any logical operator
    fn parse_criterion<'a>(
        &self,
        lexer: &mut Lexer<'a>,
        first: Token<'a>,
    ) -> Result<Criterion, CriteriaError> {
        let (left, op_token) = if first.is(TokenKind::Operator) {
            (None, first)
        } else {
            let left = operand_text(lexer, first);
            lexer.skip_whitespace();
            match lexer.next_if(TokenKind::Operator) {
                Some(op_token) => (Some(left), op_token),
                None => return Ok(Criterion::uni(left)),
            }
        };

        let mut op = CompareOp::from_keyword(op_token.text).ok_or_else(|| ParseError::Expected {
            offset: op_token.offset,
            expected: "operator".to_string(),
        })?;

        // `foo!=` lexes as `foo!` and `=`
        let left = match left {
            Some(text) if first.is(TokenKind::Operand) && text.ends_with('!') => {
                op = op.negate();
                let text = &text[..text.len() - 1];
                (!text.is_empty()).then(|| Operand::new(text))
            }
            other => other.map(Operand::from),
        };

        lexer.skip_whitespace();
        let right = if op_token.text == ":" {
            let tail = required(lexer, &[TokenKind::AssertTail], EXPECT_RIGHT)?;
            unquote(tail.text).to_string()
        } else {
            let token = required(lexer, &RIGHT, EXPECT_RIGHT)?;
            operand_text(lexer, token)
        };

        Ok(Criterion::new(left, Some(op), Some(Operand::new(right))))
    }

    fn check_depth(&self, depth: usize, offset: usize) -> Result<(), ParseError> {
        if depth >= self.options.max_depth {
            return Err(ParseError::TooDeep {
                offset,
                max_depth: self.options.max_depth,
            });
        }
        Ok(())
    }
}

/// Pull one of `expected`, failing on end of input as well as on a mismatch
fn required<'a>(
    lexer: &mut Lexer<'a>,
    expected: &[TokenKind],
    description: &str,
) -> Result<Token<'a>, CriteriaError> {
    let token = lexer.next(expected);
    match token.kind {
        TokenKind::Eof | TokenKind::Illegal => Err(unexpected(lexer, description)),
        _ => Ok(token),
    }
}

/// Error for the cursor position after every expected matcher failed
fn unexpected(lexer: &Lexer<'_>, description: &str) -> CriteriaError {
    let offset = lexer.offset();
    if lexer.is_at_end() {
        return ParseError::UnexpectedEof {
            offset,
            expected: description.to_string(),
        }
        .into();
    }
    match lexer.diagnose() {
        Some(err) => err.into(),
        None => ParseError::Expected {
            offset,
            expected: description.to_string(),
        }
        .into(),
    }
}

/// Operand text of `token`; a call like `$Fn(args)` keeps its argument list
fn operand_text<'a>(lexer: &mut Lexer<'a>, token: Token<'a>) -> String {
    match token.kind {
        TokenKind::Quoted => token.body().to_string(),
        TokenKind::Operand => {
            let mut text = token.text.to_string();
            while let Some(args) = lexer.next_if(TokenKind::Grouping) {
                text.push_str(args.text);
                if let Some(rest) = lexer.next_if(TokenKind::Operand) {
                    text.push_str(rest.text);
                }
            }
            text
        }
        _ => token.text.to_string(),
    }
}

fn unquote(text: &str) -> &str {
    match text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        Some(inner) if !inner.contains('\'') => inner,
        _ => text,
    }
}
