// AST (Abstract Syntax Tree) definitions for the masking pipeline

use serde::Serialize;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Closed set of node kinds.
///
/// Binary expressions are split by precedence tier so the tree records which
/// grammar rule produced each operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Program,
    PreprocessorDirective,
    DirectiveValue,
    FunctionDeclaration,
    ReturnType,
    Parameters,
    Parameter,
    Body,
    Declaration,
    Type,
    Assignment,
    AssignmentStatement,
    ExpressionStatement,
    IfStatement,
    Then,
    Else,
    WhileStatement,
    ForStatement,
    ForInit,
    ForCondition,
    ForUpdate,
    ReturnStatement,
    Identifier,
    Number,
    String,
    UnaryOp,
    LogicalOr,
    LogicalAnd,
    Equality,
    Relational,
    Additive,
    Multiplicative,
    FunctionCall,
    NoOp,
}

impl NodeKind {
    /// Binary-operator tiers, lowest precedence first.
    pub const BINARY_TIERS: [NodeKind; 6] = [
        NodeKind::LogicalOr,
        NodeKind::LogicalAnd,
        NodeKind::Equality,
        NodeKind::Relational,
        NodeKind::Additive,
        NodeKind::Multiplicative,
    ];

    pub fn is_binary(self) -> bool {
        Self::BINARY_TIERS.contains(&self)
    }

    /// Kinds whose `value` is a user-chosen name.
    pub fn carries_name(self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration
                | NodeKind::Parameter
                | NodeKind::Declaration
                | NodeKind::AssignmentStatement
                | NodeKind::Identifier
                | NodeKind::FunctionCall
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A node of the syntax tree.
///
/// Nodes own their children outright; later passes overwrite `value` and
/// splice `children` in place instead of rebuilding the tree. Equality is
/// structural (kind, value, children) and ignores source positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub value: Option<String>,
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(kind: NodeKind) -> Self {
        AstNode {
            kind,
            value: None,
            children: Vec::new(),
        }
    }

    /// Leaf node carrying a value.
    pub fn leaf(kind: NodeKind, value: impl Into<String>) -> Self {
        AstNode {
            kind,
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<AstNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn value_str(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(AstNode::node_count).sum::<usize>()
    }

    /// Pre-order visit of every node in this subtree.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a AstNode)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

/// Build an empty `Program` root.
pub fn program(children: Vec<AstNode>) -> AstNode {
    AstNode::new(NodeKind::Program).with_children(children)
}
