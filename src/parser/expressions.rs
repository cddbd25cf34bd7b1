//! Expression parsing implementation
//!
//! Precedence, lowest to highest:
//!
//! | Tier | Operators | Node kind |
//! |---|---|---|
//! | logical or | `\|\|` | `LogicalOr` |
//! | logical and | `&&` | `LogicalAnd` |
//! | equality | `==` `!=` | `Equality` |
//! | relational | `<` `>` `<=` `>=` | `Relational` |
//! | additive | `+` `-` | `Additive` |
//! | multiplicative | `*` `/` `%` | `Multiplicative` |
//! | unary (prefix, right-assoc) | `-` `!` | `UnaryOp` |
//! | primary | number, string, identifier, call, `( expr )` | |
//!
//! Each binary tier is a left-folding loop that emits one node per operator
//! occurrence, so `a - b - c` parses as `(a - b) - c`.
//!
//! Every tier returns the subtree together with its height, which is what
//! the nesting limit is checked against.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

/// A parsed subtree and its height (a leaf has height 1).
type Measured = (AstNode, usize);

type TierFn = fn(&mut Parser) -> Result<Measured, ParseError>;

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.expression().map(|(node, _)| node)
    }

    fn expression(&mut self) -> Result<Measured, ParseError> {
        self.parse_logical_or()
    }

    /// Left-fold `next (op next)*` into `kind` nodes.
    ///
    /// Each fold deepens the left spine by one, so the height is checked per
    /// fold and a runaway chain stops at the first operator past the limit.
    fn fold_binary(&mut self, kind: NodeKind, ops: &[&str], next: TierFn) -> Result<Measured, ParseError> {
        let (mut left, mut height) = next(self)?;

        while self.check_any_op(ops) {
            let at = self.current_location();
            let op = self.advance().lexeme;
            let (right, right_height) = next(self)?;
            height = 1 + height.max(right_height);
            self.check_height(height, at)?;
            left = AstNode::leaf(kind, op).with_children(vec![left, right]);
        }

        Ok((left, height))
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<Measured, ParseError> {
        self.fold_binary(NodeKind::LogicalOr, &["||"], Parser::parse_logical_and)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<Measured, ParseError> {
        self.fold_binary(NodeKind::LogicalAnd, &["&&"], Parser::parse_equality)
    }

    /// Parse equality (== !=)
    fn parse_equality(&mut self) -> Result<Measured, ParseError> {
        self.fold_binary(NodeKind::Equality, &["==", "!="], Parser::parse_relational)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<Measured, ParseError> {
        self.fold_binary(
            NodeKind::Relational,
            &["<", ">", "<=", ">="],
            Parser::parse_additive,
        )
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<Measured, ParseError> {
        self.fold_binary(NodeKind::Additive, &["+", "-"], Parser::parse_multiplicative)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<Measured, ParseError> {
        self.fold_binary(NodeKind::Multiplicative, &["*", "/", "%"], Parser::parse_unary)
    }

    /// Parse unary prefix operators (- !), right-associative
    fn parse_unary(&mut self) -> Result<Measured, ParseError> {
        if self.check_any_op(&["-", "!"]) {
            let at = self.current_location();
            let op = self.advance().lexeme;
            let (operand, height) = self.nested(|p| p.parse_unary())?;
            self.check_height(height + 1, at)?;
            return Ok((AstNode::leaf(NodeKind::UnaryOp, op).with_child(operand), height + 1));
        }

        self.parse_primary()
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> Result<Measured, ParseError> {
        let kind = self.peek().kind.clone();
        match kind {
            TokenKind::Number(_) => Ok((AstNode::leaf(NodeKind::Number, self.advance().lexeme), 1)),
            TokenKind::Str => Ok((AstNode::leaf(NodeKind::String, self.advance().lexeme), 1)),
            TokenKind::Ident => {
                if self.peek_ahead(1).kind == TokenKind::LParen {
                    self.function_call()
                } else {
                    Ok((AstNode::leaf(NodeKind::Identifier, self.advance().lexeme), 1))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.grouped(|p| p.expression())?;
                self.expect(TokenKind::RParen, "after parenthesized expression")?;
                Ok(expr)
            }
            _ => Err(self.error("Expected expression")),
        }
    }

    /// Parse function call: name(arg, arg, ...)
    pub(crate) fn parse_function_call(&mut self) -> Result<AstNode, ParseError> {
        self.function_call().map(|(node, _)| node)
    }

    fn function_call(&mut self) -> Result<Measured, ParseError> {
        let at = self.current_location();
        let name = self.expect_identifier("as function name")?;
        self.expect(TokenKind::LParen, "after function name")?;

        let mut args = Vec::new();
        let mut height = 1;
        if !self.check(&TokenKind::RParen) {
            loop {
                let (arg, arg_height) = self.nested(|p| p.expression())?;
                height = height.max(arg_height + 1);
                args.push(arg);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen, "after arguments")?;
        self.check_height(height, at)?;
        Ok((AstNode::leaf(NodeKind::FunctionCall, name).with_children(args), height))
    }
}
