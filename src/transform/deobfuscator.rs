//! Reverse renaming pass
//!
//! Builds the opaque → original index once and rewrites every name-bearing
//! node whose value is an opaque name. Literal nodes keep their text even if
//! it happens to spell an opaque name.

use crate::parser::ast::{AstNode, NodeKind};
use crate::transform::mapping::IdentifierMap;
use crate::transform::obfuscator::split_macro;
use log::debug;
use rustc_hash::FxHashMap;

pub struct Deobfuscator {
    inverse: FxHashMap<String, String>,
}

impl Deobfuscator {
    pub fn new(map: &IdentifierMap) -> Self {
        Deobfuscator {
            inverse: map.inverse(),
        }
    }

    /// Restore original names in place. Returns the number of values rewritten.
    pub fn deobfuscate(&self, root: &mut AstNode) -> usize {
        let mut restored = 0;
        self.visit(root, &mut restored);
        debug!("restored {} names", restored);
        restored
    }

    fn visit(&self, node: &mut AstNode, restored: &mut usize) {
        if node.kind.carries_name() {
            if let Some(original) = node.value_str().and_then(|v| self.inverse.get(v)) {
                node.value = Some(original.clone());
                *restored += 1;
            }
        } else if node.kind == NodeKind::PreprocessorDirective
            && node.value_str() == Some("define")
        {
            for payload in node
                .children
                .iter_mut()
                .filter(|c| c.kind == NodeKind::DirectiveValue)
            {
                if let Some(text) = self.restore_macro(payload.value_str()) {
                    payload.value = Some(text);
                    *restored += 1;
                }
            }
        }

        for child in &mut node.children {
            self.visit(child, restored);
        }
    }

    fn restore_macro(&self, payload: Option<&str>) -> Option<String> {
        let (name, rest) = split_macro(payload?);
        self.inverse
            .get(name)
            .map(|original| format!("{}{}", original, rest))
    }
}

/// Restore `root` in place against `map`.
pub fn deobfuscate(root: &mut AstNode, map: &IdentifierMap) -> usize {
    Deobfuscator::new(map).deobfuscate(root)
}
