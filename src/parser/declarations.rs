//! Declaration parsing implementation
//!
//! This module handles parsing of:
//!
//! - Function declarations: `int add(int a, int b) { ... }`
//! - Variable declarations: `float x = 1.5;`
//! - Preprocessor directives: `#include <stdio.h>`, `#define MAX 10`
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INCLUDE_RE: Regex =
        Regex::new(r#"^#\s*include\s*([<"][^<>"]*[>"])\s*$"#).expect("valid include pattern");
    static ref DEFINE_RE: Regex =
        Regex::new(r"^#\s*define\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s+(.*))?$")
            .expect("valid define pattern");
}

/// Classify a raw directive line into `(directive, payload)`.
///
/// `#include` keeps its delimiters (`<x>` or `"x"`). `#define` yields
/// `NAME body`. Anything else is `unknown` with the text preserved verbatim.
pub fn classify_directive(text: &str) -> (&'static str, String) {
    let text = text.trim();

    if let Some(caps) = INCLUDE_RE.captures(text) {
        return ("include", caps[1].to_string());
    }

    if let Some(caps) = DEFINE_RE.captures(text) {
        let name = &caps[1];
        let payload = match caps.get(2).map(|m| m.as_str().trim()) {
            Some(body) if !body.is_empty() => format!("{} {}", name, body),
            _ => name.to_string(),
        };
        return ("define", payload);
    }

    ("unknown", text.to_string())
}

impl Parser {
    /// Parse a preprocessor directive token into
    /// `PreprocessorDirective(kind){DirectiveValue(payload)}`
    pub(crate) fn parse_preprocessor_directive(&mut self) -> Result<AstNode, ParseError> {
        let token = self.expect(TokenKind::Preprocessor, "at start of directive")?;
        let (directive, payload) = classify_directive(&token.lexeme);

        Ok(AstNode::leaf(NodeKind::PreprocessorDirective, directive)
            .with_child(AstNode::leaf(NodeKind::DirectiveValue, payload)))
    }

    /// Parse function declaration: type name(params) { body }
    pub(crate) fn parse_function_declaration(&mut self) -> Result<AstNode, ParseError> {
        let return_type = self.expect_type("as function return type")?;
        let name = self.expect_identifier("as function name")?;

        self.expect(TokenKind::LParen, "after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect(TokenKind::RParen, "after parameters")?;

        let body = self.parse_block("function body")?;

        Ok(AstNode::leaf(NodeKind::FunctionDeclaration, name).with_children(vec![
            AstNode::leaf(NodeKind::ReturnType, return_type),
            AstNode::new(NodeKind::Parameters).with_children(params),
            AstNode::new(NodeKind::Body).with_children(body),
        ]))
    }

    /// Parse parameter list: type name, type name, ...
    ///
    /// An empty list (or a lone `void`) yields no parameters.
    fn parse_parameter_list(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut params = Vec::new();

        // Special case: (void) means no parameters in C
        if self.check(&TokenKind::Void) && self.peek_ahead(1).kind == TokenKind::RParen {
            self.advance();
            return Ok(params);
        }

        if !self.peek().kind.is_type_keyword() {
            return Ok(params);
        }

        loop {
            let param_type = self.expect_type("in parameter list")?;
            let param_name = self.expect_identifier("as parameter name")?;
            params.push(
                AstNode::leaf(NodeKind::Parameter, param_name)
                    .with_child(AstNode::leaf(NodeKind::Type, param_type)),
            );

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse variable declaration: type name [= expr];
    pub(crate) fn parse_declaration(&mut self) -> Result<AstNode, ParseError> {
        let decl = self.parse_declaration_clause()?;
        self.expect(TokenKind::Semicolon, "after declaration")?;
        Ok(decl)
    }

    /// Declaration without the trailing `;`, shared with `for` initializers.
    pub(crate) fn parse_declaration_clause(&mut self) -> Result<AstNode, ParseError> {
        let var_type = self.expect_type("in declaration")?;
        let name = self.expect_identifier("after type in declaration")?;

        let mut decl = AstNode::leaf(NodeKind::Declaration, name)
            .with_child(AstNode::leaf(NodeKind::Type, var_type));

        if self.check_op("=") {
            self.advance();
            let init = self.parse_expression()?;
            decl.children
                .push(AstNode::new(NodeKind::Assignment).with_child(init));
        }

        Ok(decl)
    }
}
