//! C-subset source code parser
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), extended by `declarations`,
//!   `statements` and `expressions`
//! - [`ast`]: AST node definitions
//!
//! # Supported C Subset
//!
//! - Types: `int`, `float`, `double`, `char`, `void` (no pointers, arrays or structs)
//! - Statements: declarations, assignments, call statements, `if`/`else`,
//!   `while`, `for`, `return`, empty `;`
//! - Expressions: `|| && == != < > <= >= + - * / %`, prefix `-` and `!`,
//!   calls, number and string literals
//! - Preprocessor: `#include` and `#define` are classified; other directives
//!   are carried through verbatim
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one left-folding loop per
//! binary precedence tier. No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use ast::{AstNode, NodeKind, SourceLocation};
pub use declarations::classify_directive;
pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use parse::{parse, ParseError, Parser, MAX_NESTING_DEPTH};
