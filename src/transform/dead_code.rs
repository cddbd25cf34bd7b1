//! Placeholder statements
//!
//! Inserted placeholders are `NoOp` nodes placed directly under the program
//! root. They render as a lone `;`, parse back to `NoOp`, and are the only
//! thing [`remove_dead_code`] strips, so user statements never disappear.

use crate::parser::ast::{AstNode, NodeKind};
use log::debug;
use rand::Rng;

pub fn is_dead_code(node: &AstNode) -> bool {
    node.kind == NodeKind::NoOp
}

/// Insert `count` placeholders at random top-level positions.
///
/// Returns the number inserted; zero when `root` is not a program.
pub fn insert_dead_code<R: Rng + ?Sized>(root: &mut AstNode, count: usize, rng: &mut R) -> usize {
    if root.kind != NodeKind::Program {
        return 0;
    }

    for _ in 0..count {
        let at = rng.gen_range(0..=root.children.len());
        root.children.insert(at, AstNode::new(NodeKind::NoOp));
    }

    debug!("inserted {} placeholder statements", count);
    count
}

/// Drop every placeholder directly under the program root. Returns how many
/// were removed.
pub fn remove_dead_code(root: &mut AstNode) -> usize {
    if root.kind != NodeKind::Program {
        return 0;
    }

    let before = root.children.len();
    root.children.retain(|child| !is_dead_code(child));
    let removed = before - root.children.len();

    debug!("removed {} placeholder statements", removed);
    removed
}
