//! # Introduction
//!
//! cmask renames the identifiers of a small C subset to opaque names and
//! records every rename in a bijective map, so the masked program can later be
//! restored exactly. Placeholder statements can be scattered through the
//! program as light noise; the reverse run strips them again.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Obfuscator (+ map) → Generator → Source
//! Source → Lexer → Parser → AST → Deobfuscator (map⁻¹) → Generator → Source
//! ```
//!
//! 1. [`parser`] tokenises the source and builds an AST of generic
//!    `(kind, value, children)` nodes.
//! 2. [`transform`] renames bindings against an [`transform::IdentifierMap`],
//!    inserts or strips placeholders, and inverts a map.
//! 3. [`codegen`] renders a tree back to source that re-parses to the same
//!    tree.
//! 4. [`pipeline`] chains the stages for one source unit; [`batch`] drives
//!    many files against one shared map.
//!
//! ## Supported C subset
//!
//! Types: `int`, `float`, `double`, `char`, `void`.
//! Control flow: `if/else`, `while`, `for`, `return`.
//! Expressions: logical, equality, relational and arithmetic operators,
//! prefix `-`/`!`, calls, number and string literals.
//! Preprocessor: `#include` and `#define` (object-like) are understood;
//! other directives pass through verbatim.

pub mod batch;
pub mod codegen;
pub mod error;
pub mod options;
pub mod parser;
pub mod pipeline;
pub mod transform;

pub use error::{Error, Result};
