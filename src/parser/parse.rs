//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: function declarations, variable declarations, directives
//! - `statements`: statements (if, while, for, return, assignment, call)
//! - `expressions`: expressions with one left-folding loop per precedence tier
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! A parse error is fatal for the whole unit: there is no resynchronization.

use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind};
use thiserror::Error;

/// Maximum nesting depth of an accepted tree.
///
/// Blocks, `else if` arms, unary operands and call arguments each take one
/// level on the way down. A finished expression must also fit under the limit
/// with its own height added, which catches long operator chains built by the
/// left-folding loops. Parentheses add no tree level and get their own
/// allowance of the same size. Generated text never nests parentheses deeper
/// than the expression they wrap, so any accepted tree regenerates to text
/// that parses again.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

/// Parse a token stream into a `Program` node.
pub fn parse(tokens: Vec<Token>) -> Result<AstNode, ParseError> {
    Parser::new(tokens).parse_program()
}

/// Recursive descent parser for the C subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    depth: usize,
    groups: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let loc = tokens
                .last()
                .map(|t| t.location)
                .unwrap_or_else(|| SourceLocation::new(1, 1));
            tokens.push(Token::new(TokenKind::Eof, "", loc));
        }
        Self {
            tokens,
            position: 0,
            depth: 0,
            groups: 0,
        }
    }

    /// Parse the entire program: `(preprocessor | statement)* EOF`
    pub fn parse_program(&mut self) -> Result<AstNode, ParseError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            let node = if self.check(&TokenKind::Preprocessor) {
                self.parse_preprocessor_directive()?
            } else {
                self.parse_statement()?
            };
            statements.push(node);
        }

        log::debug!("parsed {} top-level nodes", statements.len());
        Ok(program(statements))
    }

    // ===== Helper methods =====

    /// Run `f` one nesting level deeper, failing once the limit is exceeded.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.too_deep(self.current_location()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Run `f` inside one more pair of parentheses.
    pub(crate) fn grouped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.groups >= MAX_NESTING_DEPTH {
            return Err(self.too_deep(self.current_location()));
        }
        self.groups += 1;
        let result = f(self);
        self.groups -= 1;
        result
    }

    /// Fail if an expression of `height` at the current depth passes the limit.
    pub(crate) fn check_height(&self, height: usize, at: SourceLocation) -> Result<(), ParseError> {
        if self.depth + height > MAX_NESTING_DEPTH {
            return Err(self.too_deep(at));
        }
        Ok(())
    }

    fn too_deep(&self, location: SourceLocation) -> ParseError {
        ParseError {
            message: format!("Nesting deeper than {} levels", MAX_NESTING_DEPTH),
            location,
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn check_op(&self, op: &str) -> bool {
        self.peek().is_op(op)
    }

    /// Current token is an operator from `ops`.
    pub(crate) fn check_any_op(&self, ops: &[&str]) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Op && ops.contains(&token.lexeme.as_str())
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn peek(&self) -> &Token {
        self.peek_ahead(0)
    }

    /// Token `n` positions ahead; clamps to the trailing `Eof`.
    pub(crate) fn peek_ahead(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn error(&self, message: impl AsRef<str>) -> ParseError {
        ParseError {
            message: format!("{}, found {}", message.as_ref(), self.peek()),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, ctx: &str) -> Result<Token, ParseError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {} {}", kind, ctx)))
        }
    }

    pub(crate) fn expect_op(&mut self, op: &str, ctx: &str) -> Result<Token, ParseError> {
        if self.check_op(op) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected '{}' {}", op, ctx)))
        }
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> Result<String, ParseError> {
        Ok(self.expect(TokenKind::Ident, ctx)?.lexeme)
    }

    pub(crate) fn expect_type(&mut self, ctx: &str) -> Result<String, ParseError> {
        if self.peek().kind.is_type_keyword() {
            Ok(self.advance().lexeme)
        } else {
            Err(self.error(format!("Expected type {}", ctx)))
        }
    }
}
