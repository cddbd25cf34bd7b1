//! Source regeneration
//!
//! Renders a tree back to text in the supported subset. Output re-lexes and
//! re-parses to a structurally equal tree; original whitespace and comments
//! are not preserved.
//!
//! Statements are emitted line by line with four-space indentation.
//! Expressions render to strings, and every binary operator node is wrapped
//! in parentheses so precedence never depends on the reader.

use crate::parser::ast::{AstNode, NodeKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("malformed {kind} node: {reason}")]
    MalformedNode { kind: NodeKind, reason: String },

    #[error("{kind} node cannot appear in {context} position")]
    Misplaced {
        kind: NodeKind,
        context: &'static str,
    },
}

/// Render a tree (or any statement or expression subtree) to source text.
pub fn generate(node: &AstNode) -> Result<String, RenderError> {
    Generator::new().generate(node)
}

pub struct Generator {
    buf: String,
    indent: usize,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Generator {
            buf: String::new(),
            indent: 0,
        }
    }

    pub fn generate(mut self, node: &AstNode) -> Result<String, RenderError> {
        if is_expression(node.kind) {
            return self.expr(node);
        }
        self.emit(node)?;
        Ok(self.buf)
    }

    fn line(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
        self.buf.push_str(s);
        self.buf.push('\n');
    }

    fn empty(&mut self) {
        self.buf.push('\n');
    }

    fn push(&mut self) {
        self.indent += 1;
    }

    fn pop(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Indented statement list; the braces belong to the caller.
    fn block(&mut self, statements: &[AstNode]) -> Result<(), RenderError> {
        self.push();
        let result = statements.iter().try_for_each(|s| self.emit(s));
        self.pop();
        result
    }

    // ------------------------------------------------------------------ //
    // Statements
    // ------------------------------------------------------------------ //

    fn emit(&mut self, node: &AstNode) -> Result<(), RenderError> {
        match node.kind {
            NodeKind::Program => {
                for (i, item) in node.children.iter().enumerate() {
                    if i > 0 && node.children[i - 1].kind == NodeKind::FunctionDeclaration {
                        self.empty();
                    }
                    self.emit(item)?;
                }
            }
            NodeKind::PreprocessorDirective => {
                let text = directive_text(node)?;
                self.line(&text);
            }
            NodeKind::FunctionDeclaration => self.emit_function(node)?,
            NodeKind::Declaration => {
                let text = self.declaration_clause(node)?;
                self.line(&format!("{};", text));
            }
            NodeKind::AssignmentStatement => {
                let text = self.assignment_clause(node)?;
                self.line(&format!("{};", text));
            }
            NodeKind::ExpressionStatement => {
                let expr = self.expr(child(node, 0)?)?;
                self.line(&format!("{};", expr));
            }
            NodeKind::IfStatement => self.emit_if(node, "")?,
            NodeKind::WhileStatement => {
                let cond = self.expr(child(node, 0)?)?;
                let body = child_of_kind(node, 1, NodeKind::Body)?;
                self.line(&format!("while ({}) {{", cond));
                self.block(&body.children)?;
                self.line("}");
            }
            NodeKind::ForStatement => self.emit_for(node)?,
            NodeKind::ReturnStatement => match node.children.first() {
                Some(value) => {
                    let value = self.expr(value)?;
                    self.line(&format!("return {};", value));
                }
                None => self.line("return;"),
            },
            NodeKind::NoOp => self.line(";"),
            NodeKind::Body | NodeKind::Then | NodeKind::Else => {
                for statement in &node.children {
                    self.emit(statement)?;
                }
            }
            NodeKind::DirectiveValue
            | NodeKind::ReturnType
            | NodeKind::Parameters
            | NodeKind::Parameter
            | NodeKind::Type
            | NodeKind::Assignment
            | NodeKind::ForInit
            | NodeKind::ForCondition
            | NodeKind::ForUpdate
            | NodeKind::Identifier
            | NodeKind::Number
            | NodeKind::String
            | NodeKind::UnaryOp
            | NodeKind::LogicalOr
            | NodeKind::LogicalAnd
            | NodeKind::Equality
            | NodeKind::Relational
            | NodeKind::Additive
            | NodeKind::Multiplicative
            | NodeKind::FunctionCall => {
                return Err(RenderError::Misplaced {
                    kind: node.kind,
                    context: "statement",
                })
            }
        }
        Ok(())
    }

    fn emit_function(&mut self, node: &AstNode) -> Result<(), RenderError> {
        let name = value(node)?;
        let return_type = value(child_of_kind(node, 0, NodeKind::ReturnType)?)?;
        let params = child_of_kind(node, 1, NodeKind::Parameters)?;
        let body = child_of_kind(node, 2, NodeKind::Body)?;

        let params = params
            .children
            .iter()
            .map(parameter)
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");

        self.line(&format!("{} {}({}) {{", return_type, name, params));
        self.block(&body.children)?;
        self.line("}");
        Ok(())
    }

    /// `if (c) {` ... with `else if` chains flattened onto the closing brace.
    fn emit_if(&mut self, node: &AstNode, lead: &str) -> Result<(), RenderError> {
        let cond = self.expr(child(node, 0)?)?;
        let then_branch = child_of_kind(node, 1, NodeKind::Then)?;

        self.line(&format!("{}if ({}) {{", lead, cond));
        self.block(&then_branch.children)?;

        let Some(else_branch) = node.children.get(2) else {
            self.line("}");
            return Ok(());
        };
        if else_branch.kind != NodeKind::Else {
            return Err(malformed(node, "third child must be Else"));
        }

        match else_branch.children.as_slice() {
            [nested] if nested.kind == NodeKind::IfStatement => self.emit_if(nested, "} else "),
            statements => {
                self.line("} else {");
                self.block(statements)?;
                self.line("}");
                Ok(())
            }
        }
    }

    fn emit_for(&mut self, node: &AstNode) -> Result<(), RenderError> {
        let init = child_of_kind(node, 0, NodeKind::ForInit)?;
        let cond = child_of_kind(node, 1, NodeKind::ForCondition)?;
        let update = child_of_kind(node, 2, NodeKind::ForUpdate)?;
        let body = child_of_kind(node, 3, NodeKind::Body)?;

        let init = match init.children.first() {
            Some(c) if c.kind == NodeKind::Declaration => self.declaration_clause(c)?,
            Some(c) if c.kind == NodeKind::AssignmentStatement => self.assignment_clause(c)?,
            Some(_) => return Err(malformed(node, "initializer must be a declaration or assignment")),
            None => String::new(),
        };
        let cond = match cond.children.first() {
            Some(c) => format!(" {}", self.expr(c)?),
            None => String::new(),
        };
        let update = match update.children.first() {
            Some(c) if c.kind == NodeKind::AssignmentStatement => {
                format!(" {}", self.assignment_clause(c)?)
            }
            Some(c) => format!(" {}", self.expr(c)?),
            None => String::new(),
        };

        self.line(&format!("for ({};{};{}) {{", init, cond, update));
        self.block(&body.children)?;
        self.line("}");
        Ok(())
    }

    /// `type name [= expr]`
    fn declaration_clause(&mut self, node: &AstNode) -> Result<String, RenderError> {
        let name = value(node)?;
        let ty = value(child_of_kind(node, 0, NodeKind::Type)?)?;

        match node.children.get(1) {
            None => Ok(format!("{} {}", ty, name)),
            Some(init) if init.kind == NodeKind::Assignment => {
                let expr = self.expr(child(init, 0)?)?;
                Ok(format!("{} {} = {}", ty, name, expr))
            }
            Some(_) => Err(malformed(node, "second child must be Assignment")),
        }
    }

    /// `name = expr`
    fn assignment_clause(&mut self, node: &AstNode) -> Result<String, RenderError> {
        let name = value(node)?;
        let expr = self.expr(child(node, 0)?)?;
        Ok(format!("{} = {}", name, expr))
    }

    // ------------------------------------------------------------------ //
    // Expressions
    // ------------------------------------------------------------------ //

    fn expr(&mut self, node: &AstNode) -> Result<String, RenderError> {
        match node.kind {
            NodeKind::Identifier | NodeKind::Number => Ok(value(node)?.to_string()),
            NodeKind::String => Ok(format!("\"{}\"", value(node)?)),
            NodeKind::UnaryOp => {
                let op = value(node)?;
                let operand = child(node, 0)?;
                let inner = self.expr(operand)?;
                if operand.kind == NodeKind::UnaryOp {
                    Ok(format!("{}({})", op, inner))
                } else {
                    Ok(format!("{}{}", op, inner))
                }
            }
            NodeKind::LogicalOr
            | NodeKind::LogicalAnd
            | NodeKind::Equality
            | NodeKind::Relational
            | NodeKind::Additive
            | NodeKind::Multiplicative => {
                let op = value(node)?;
                if node.children.len() != 2 {
                    return Err(malformed(node, "binary operator needs two operands"));
                }
                let left = self.expr(&node.children[0])?;
                let right = self.expr(&node.children[1])?;
                Ok(format!("({} {} {})", left, op, right))
            }
            NodeKind::FunctionCall => {
                let name = value(node)?;
                let args = node
                    .children
                    .iter()
                    .map(|arg| self.expr(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("{}({})", name, args.join(", ")))
            }
            _ => Err(RenderError::Misplaced {
                kind: node.kind,
                context: "expression",
            }),
        }
    }
}

fn is_expression(kind: NodeKind) -> bool {
    kind.is_binary()
        || matches!(
            kind,
            NodeKind::Identifier
                | NodeKind::Number
                | NodeKind::String
                | NodeKind::UnaryOp
                | NodeKind::FunctionCall
        )
}

/// Full directive line for a `PreprocessorDirective` node.
fn directive_text(node: &AstNode) -> Result<String, RenderError> {
    let payload = value(child_of_kind(node, 0, NodeKind::DirectiveValue)?)?;
    match value(node)? {
        "include" => Ok(format!("#include {}", payload)),
        "define" => Ok(format!("#define {}", payload)),
        _ => Ok(payload.to_string()),
    }
}

fn parameter(node: &AstNode) -> Result<String, RenderError> {
    if node.kind != NodeKind::Parameter {
        return Err(malformed(node, "expected Parameter"));
    }
    let ty = value(child_of_kind(node, 0, NodeKind::Type)?)?;
    Ok(format!("{} {}", ty, value(node)?))
}

fn malformed(node: &AstNode, reason: impl Into<String>) -> RenderError {
    RenderError::MalformedNode {
        kind: node.kind,
        reason: reason.into(),
    }
}

fn value(node: &AstNode) -> Result<&str, RenderError> {
    node.value_str()
        .ok_or_else(|| malformed(node, "missing value"))
}

fn child(node: &AstNode, index: usize) -> Result<&AstNode, RenderError> {
    node.children
        .get(index)
        .ok_or_else(|| malformed(node, format!("missing child {}", index)))
}

fn child_of_kind(node: &AstNode, index: usize, kind: NodeKind) -> Result<&AstNode, RenderError> {
    let c = child(node, index)?;
    if c.kind != kind {
        return Err(malformed(
            node,
            format!("child {} is {}, expected {}", index, c.kind, kind),
        ));
    }
    Ok(c)
}
