//! Statement parsing implementation
//!
//! # Grammar
//!
//! ```text
//! statement ::= declaration | function_decl | call_stmt | assignment
//!             | if_stmt | while_stmt | for_stmt | return_stmt | ';'
//! ```
//!
//! A type keyword needs two tokens of lookahead (`ident (` means a function);
//! an identifier needs one (`(` means a call statement, anything else an
//! assignment). A bare `;` parses to `NoOp`, which is how inserted
//! placeholders survive regeneration.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse `{ statement* }`, returning the inner statements.
    pub(crate) fn parse_block(&mut self, ctx: &str) -> Result<Vec<AstNode>, ParseError> {
        self.expect(TokenKind::LBrace, &format!("before {}", ctx))?;

        let statements = self.nested(|p| {
            let mut statements = Vec::new();
            while !p.check(&TokenKind::RBrace) && !p.is_at_end() {
                statements.push(p.parse_statement()?);
            }
            Ok(statements)
        })?;

        self.expect(TokenKind::RBrace, &format!("after {}", ctx))?;
        Ok(statements)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        let token = self.peek().clone();

        match token.kind {
            _ if token.kind.is_type_keyword() => {
                if self.peek_ahead(1).kind != TokenKind::Ident {
                    self.advance();
                    return Err(self.error(format!("Expected identifier after '{}'", token.lexeme)));
                }
                if self.peek_ahead(2).kind == TokenKind::LParen {
                    self.parse_function_declaration()
                } else {
                    self.parse_declaration()
                }
            }
            TokenKind::Ident => {
                if self.peek_ahead(1).kind == TokenKind::LParen {
                    self.parse_call_statement()
                } else {
                    let stmt = self.parse_assignment_clause()?;
                    self.expect(TokenKind::Semicolon, "after assignment")?;
                    Ok(stmt)
                }
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Semicolon => {
                self.advance();
                Ok(AstNode::new(NodeKind::NoOp))
            }
            _ => Err(self.error("Expected statement")),
        }
    }

    /// `name = expr` without the trailing `;`
    pub(crate) fn parse_assignment_clause(&mut self) -> Result<AstNode, ParseError> {
        let name = self.expect_identifier("as assignment target")?;
        self.expect_op("=", "in assignment")?;
        let expr = self.parse_expression()?;

        Ok(AstNode::leaf(NodeKind::AssignmentStatement, name).with_child(expr))
    }

    /// `name(args);`
    fn parse_call_statement(&mut self) -> Result<AstNode, ParseError> {
        let call = self.parse_function_call()?;
        self.expect(TokenKind::Semicolon, "after function call")?;
        Ok(AstNode::new(NodeKind::ExpressionStatement).with_child(call))
    }

    /// Parse if statement with optional `else { ... }` / `else if ...`
    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        self.expect(TokenKind::If, "")?;
        self.expect(TokenKind::LParen, "after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "after if condition")?;

        let then_branch = self.parse_block("if body")?;
        let mut node = AstNode::new(NodeKind::IfStatement).with_children(vec![
            condition,
            AstNode::new(NodeKind::Then).with_children(then_branch),
        ]);

        if self.match_token(&TokenKind::Else) {
            let else_branch = if self.check(&TokenKind::If) {
                vec![self.nested(|p| p.parse_if_statement())?]
            } else {
                self.parse_block("else body")?
            };
            node.children
                .push(AstNode::new(NodeKind::Else).with_children(else_branch));
        }

        Ok(node)
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<AstNode, ParseError> {
        self.expect(TokenKind::While, "")?;
        self.expect(TokenKind::LParen, "after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "after while condition")?;

        let body = self.parse_block("while body")?;

        Ok(AstNode::new(NodeKind::WhileStatement).with_children(vec![
            condition,
            AstNode::new(NodeKind::Body).with_children(body),
        ]))
    }

    /// Parse for statement: `for (init; cond; update) { body }`, each clause optional
    fn parse_for_statement(&mut self) -> Result<AstNode, ParseError> {
        self.expect(TokenKind::For, "")?;
        self.expect(TokenKind::LParen, "after 'for'")?;

        let mut init = AstNode::new(NodeKind::ForInit);
        if self.peek().kind.is_type_keyword() {
            init.children.push(self.parse_declaration_clause()?);
        } else if self.check(&TokenKind::Ident) {
            init.children.push(self.parse_assignment_clause()?);
        }
        self.expect(TokenKind::Semicolon, "after for initializer")?;

        let mut condition = AstNode::new(NodeKind::ForCondition);
        if !self.check(&TokenKind::Semicolon) {
            condition.children.push(self.parse_expression()?);
        }
        self.expect(TokenKind::Semicolon, "after for condition")?;

        let mut update = AstNode::new(NodeKind::ForUpdate);
        if !self.check(&TokenKind::RParen) {
            let is_assignment =
                self.check(&TokenKind::Ident) && self.peek_ahead(1).is_op("=");
            update.children.push(if is_assignment {
                self.parse_assignment_clause()?
            } else {
                self.parse_expression()?
            });
        }
        self.expect(TokenKind::RParen, "after for clauses")?;

        let body = self.parse_block("for body")?;

        Ok(AstNode::new(NodeKind::ForStatement).with_children(vec![
            init,
            condition,
            update,
            AstNode::new(NodeKind::Body).with_children(body),
        ]))
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        self.expect(TokenKind::Return, "")?;
        let mut node = AstNode::new(NodeKind::ReturnStatement);

        if !self.check(&TokenKind::Semicolon) {
            node.children.push(self.parse_expression()?);
        }

        self.expect(TokenKind::Semicolon, "after return")?;
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::lexer::tokenize;
    use crate::parser::parse::{parse, ParseError};

    fn parse_str(source: &str) -> Result<AstNode, ParseError> {
        parse(tokenize(source).unwrap())
    }

    #[test]
    fn test_assignment_statement() {
        let ast = parse_str("a = 5 + 3;").unwrap();
        let assign = &ast.children[0];

        assert_eq!(assign.kind, NodeKind::AssignmentStatement);
        assert_eq!(assign.value_str(), Some("a"));
        assert_eq!(assign.children[0].kind, NodeKind::Additive);
        assert_eq!(assign.children[0].value_str(), Some("+"));
    }

    #[test]
    fn test_call_statement() {
        let ast = parse_str("printf(\"%d\", x);").unwrap();
        let stmt = &ast.children[0];

        assert_eq!(stmt.kind, NodeKind::ExpressionStatement);
        let call = &stmt.children[0];
        assert_eq!(call.kind, NodeKind::FunctionCall);
        assert_eq!(call.value_str(), Some("printf"));
        assert_eq!(call.children.len(), 2);
        assert_eq!(call.children[0], AstNode::leaf(NodeKind::String, "%d"));
    }

    #[test]
    fn test_if_else_chain() {
        let ast = parse_str(
            "if (a > 1) { a = 1; } else if (a < 0) { a = 0; } else { a = 2; }",
        )
        .unwrap();
        let stmt = &ast.children[0];

        assert_eq!(stmt.kind, NodeKind::IfStatement);
        assert_eq!(stmt.children.len(), 3);
        assert_eq!(stmt.children[1].kind, NodeKind::Then);
        let else_branch = &stmt.children[2];
        assert_eq!(else_branch.kind, NodeKind::Else);
        assert_eq!(else_branch.children[0].kind, NodeKind::IfStatement);
        assert_eq!(else_branch.children[0].children.len(), 3);
    }

    #[test]
    fn test_while_statement() {
        let ast = parse_str("while (i < 10) { i = i + 1; }").unwrap();
        let stmt = &ast.children[0];

        assert_eq!(stmt.kind, NodeKind::WhileStatement);
        assert_eq!(stmt.children[0].kind, NodeKind::Relational);
        assert_eq!(stmt.children[1].kind, NodeKind::Body);
        assert_eq!(stmt.children[1].children.len(), 1);
    }

    #[test]
    fn test_for_statement_full() {
        let ast = parse_str("for (int i = 0; i < n; i = i + 1) { total = total + i; }").unwrap();
        let stmt = &ast.children[0];

        assert_eq!(stmt.kind, NodeKind::ForStatement);
        assert_eq!(stmt.children.len(), 4);
        assert_eq!(stmt.children[0].children[0].kind, NodeKind::Declaration);
        assert_eq!(stmt.children[1].children[0].kind, NodeKind::Relational);
        assert_eq!(
            stmt.children[2].children[0].kind,
            NodeKind::AssignmentStatement
        );
        assert_eq!(stmt.children[3].kind, NodeKind::Body);
    }

    #[test]
    fn test_for_statement_empty_clauses() {
        let ast = parse_str("for (;;) { }").unwrap();
        let stmt = &ast.children[0];

        assert_eq!(stmt.children.len(), 4);
        assert!(stmt.children[..3].iter().all(|c| c.children.is_empty()));
    }

    #[test]
    fn test_return_without_value() {
        let ast = parse_str("void f() { return; }").unwrap();
        let ret = &ast.children[0].children[2].children[0];
        assert_eq!(ret.kind, NodeKind::ReturnStatement);
        assert!(ret.children.is_empty());
    }

    #[test]
    fn test_empty_statement_is_noop() {
        let ast = parse_str("; int a;").unwrap();
        assert_eq!(ast.children[0].kind, NodeKind::NoOp);
        assert_eq!(ast.children[1].kind, NodeKind::Declaration);
    }

    #[test]
    fn test_type_without_identifier() {
        let err = parse_str("int 5;").unwrap_err();
        assert!(err.message.contains("Expected identifier after 'int'"), "{}", err.message);
    }

    #[test]
    fn test_unexpected_token() {
        let err = parse_str("else { }").unwrap_err();
        assert!(err.message.contains("Expected statement"), "{}", err.message);
        assert!(err.message.contains("'else'"), "{}", err.message);
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse_str("int main() { return 0;").unwrap_err();
        assert!(err.message.contains("Expected '}'"), "{}", err.message);
    }
}
