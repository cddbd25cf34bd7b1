//! Identifier renaming pass
//!
//! A single pre-order walk. Binding sites (declarations, assignment targets,
//! function names, parameters and `#define` macro names) get a mapping entry
//! the first time their name is seen. Use sites (identifiers and call names)
//! are rewritten only when their name is already mapped, so library calls
//! such as `printf` pass through untouched. The exception is an unmapped use
//! spelled like an opaque name the map already hands out: left alone, the
//! reverse pass would turn it into that entry's original, so it is bound like
//! a declaration instead.
//!
//! Replacement names never collide with a mapped name on either side, a
//! reserved keyword, or any name spelled anywhere in the tree being renamed.
//! That last rule is what keeps the reverse pass exact.

use crate::parser::ast::{AstNode, NodeKind};
use crate::parser::lexer::is_keyword;
use crate::transform::mapping::IdentifierMap;
use crate::transform::names::{is_valid_identifier, NameSource};
use log::{debug, warn};
use rustc_hash::FxHashSet;

/// Renames bindings in place, extending the supplied map.
pub struct Obfuscator<'a> {
    map: &'a mut IdentifierMap,
    names: &'a mut dyn NameSource,
    taken: FxHashSet<String>,
    renamed: usize,
}

impl<'a> Obfuscator<'a> {
    pub fn new(map: &'a mut IdentifierMap, names: &'a mut dyn NameSource) -> Self {
        Obfuscator {
            map,
            names,
            taken: FxHashSet::default(),
            renamed: 0,
        }
    }

    /// Rename every binding and mapped use in `root`. Returns the number of
    /// node values rewritten.
    pub fn obfuscate(&mut self, root: &mut AstNode) -> usize {
        collect_spellings(root, &mut self.taken);
        let before = self.map.len();

        self.visit(root);

        debug!(
            "renamed {} names ({} new mapping entries)",
            self.renamed,
            self.map.len() - before
        );
        self.renamed
    }

    fn visit(&mut self, node: &mut AstNode) {
        match node.kind {
            NodeKind::NoOp => return,
            NodeKind::Declaration
            | NodeKind::AssignmentStatement
            | NodeKind::FunctionDeclaration
            | NodeKind::Parameter => self.bind(node),
            NodeKind::Identifier | NodeKind::FunctionCall => self.rename_use(node),
            NodeKind::PreprocessorDirective if node.value_str() == Some("define") => {
                self.bind_macro(node)
            }
            _ => {}
        }

        for child in &mut node.children {
            self.visit(child);
        }
    }

    fn bind(&mut self, node: &mut AstNode) {
        let Some(name) = node.value.as_deref() else {
            return;
        };
        if let Some(opaque) = self.binding_for(name) {
            node.value = Some(opaque);
            self.renamed += 1;
        }
    }

    fn rename_use(&mut self, node: &mut AstNode) {
        let Some(name) = node.value_str() else {
            return;
        };
        if let Some(opaque) = self.map.get(name) {
            node.value = Some(opaque.to_string());
            self.renamed += 1;
        } else if self.map.contains_value(name) {
            debug!("'{}' is spelled like a mapped name, binding it", name);
            self.bind(node);
        }
    }

    /// `#define NAME body`: only the macro name is a binding.
    fn bind_macro(&mut self, node: &mut AstNode) {
        let Some(payload) = node
            .children
            .iter_mut()
            .find(|c| c.kind == NodeKind::DirectiveValue)
        else {
            return;
        };
        let Some(text) = payload.value.as_deref() else {
            return;
        };

        let (name, rest) = split_macro(text);
        if let Some(opaque) = self.binding_for(name) {
            payload.value = Some(format!("{}{}", opaque, rest));
            self.renamed += 1;
        }
    }

    /// Existing opaque name for `name`, or a fresh one recorded in the map.
    fn binding_for(&mut self, name: &str) -> Option<String> {
        if let Some(opaque) = self.map.get(name) {
            return Some(opaque.to_string());
        }
        if is_keyword(name) {
            return None;
        }
        if !is_valid_identifier(name) {
            warn!("skipping binding with invalid name '{}'", name);
            return None;
        }

        let opaque = self.fresh_name();
        match self.map.insert(name, opaque.clone()) {
            Ok(()) => Some(opaque),
            Err(err) => {
                warn!("could not record mapping for '{}': {}", name, err);
                None
            }
        }
    }

    fn fresh_name(&mut self) -> String {
        loop {
            let candidate = self.names.candidate();
            if self.is_free(&candidate) {
                self.taken.insert(candidate.clone());
                return candidate;
            }
            debug!("name candidate '{}' collides, retrying", candidate);
        }
    }

    fn is_free(&self, candidate: &str) -> bool {
        is_valid_identifier(candidate)
            && !is_keyword(candidate)
            && !self.map.contains_value(candidate)
            && !self.map.contains_key(candidate)
            && !self.taken.contains(candidate)
    }
}

/// Rename `root` in place against `map`, drawing new names from `names`.
pub fn obfuscate(root: &mut AstNode, map: &mut IdentifierMap, names: &mut dyn NameSource) -> usize {
    Obfuscator::new(map, names).obfuscate(root)
}

/// Split a define payload into the macro name and the remainder
/// (remainder keeps its leading space).
pub(crate) fn split_macro(payload: &str) -> (&str, &str) {
    match payload.find(char::is_whitespace) {
        Some(i) => payload.split_at(i),
        None => (payload, ""),
    }
}

/// Every identifier-shaped word appearing in a node value.
fn collect_spellings(root: &AstNode, out: &mut FxHashSet<String>) {
    root.walk(&mut |node| {
        if let Some(value) = node.value_str() {
            for word in value
                .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .filter(|w| is_valid_identifier(w))
            {
                out.insert(word.to_string());
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, tokenize};
    use crate::transform::names::RandomNames;
    use std::collections::VecDeque;

    /// Replays a fixed list of candidates.
    struct Scripted(VecDeque<&'static str>);

    impl NameSource for Scripted {
        fn candidate(&mut self) -> String {
            self.0.pop_front().expect("script exhausted").to_string()
        }
    }

    fn parse_str(source: &str) -> AstNode {
        parse(tokenize(source).unwrap()).unwrap()
    }

    #[test]
    fn test_binds_declaration_and_renames_use() {
        let mut ast = parse_str("int a = 5; int b = a + 3;");
        let mut map = IdentifierMap::new();
        let mut names = Scripted(VecDeque::from(["Qa11", "Qb22"]));

        obfuscate(&mut ast, &mut map, &mut names);

        assert_eq!(map.get("a"), Some("Qa11"));
        assert_eq!(map.get("b"), Some("Qb22"));
        assert_eq!(ast.children[0].value_str(), Some("Qa11"));
        let init = &ast.children[1].children[1].children[0];
        assert_eq!(init.children[0], AstNode::leaf(NodeKind::Identifier, "Qa11"));
    }

    #[test]
    fn test_unbound_calls_untouched() {
        let mut ast = parse_str("int main() { printf(\"%d\", 1); return 0; }");
        let mut map = IdentifierMap::new();
        let mut names = Scripted(VecDeque::from(["Mmmm"]));

        obfuscate(&mut ast, &mut map, &mut names);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("main"), Some("Mmmm"));
        let call = &ast.children[0].children[2].children[0].children[0];
        assert_eq!(call.value_str(), Some("printf"));
    }

    #[test]
    fn test_bound_function_calls_renamed() {
        let mut ast = parse_str("int add(int x, int y) { return x + y; } int r = add(1, 2);");
        let mut map = IdentifierMap::new();
        let mut names = RandomNames::seeded(3, 8);

        obfuscate(&mut ast, &mut map, &mut names);

        let call = &ast.children[1].children[1].children[0];
        assert_eq!(call.kind, NodeKind::FunctionCall);
        assert_eq!(call.value_str(), map.get("add"));
    }

    #[test]
    fn test_collision_with_existing_spelling_retries() {
        // "Zzzz" is already spelled in the program, "Aaaa" is fine.
        let mut ast = parse_str("int x = Zzzz;");
        let mut map = IdentifierMap::new();
        let mut names = Scripted(VecDeque::from(["Zzzz", "int", "Aaaa"]));

        obfuscate(&mut ast, &mut map, &mut names);

        assert_eq!(map.get("x"), Some("Aaaa"));
        assert!(names.0.is_empty());
    }

    #[test]
    fn test_existing_mapping_reused() {
        let mut ast = parse_str("count = count + 1;");
        let mut map = IdentifierMap::from_pairs([("count", "Kkkk")]).unwrap();
        let mut names = Scripted(VecDeque::new());

        obfuscate(&mut ast, &mut map, &mut names);

        assert_eq!(ast.children[0].value_str(), Some("Kkkk"));
        assert_eq!(ast.children[0].children[0].children[0].value_str(), Some("Kkkk"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_define_macro_name_bound() {
        let mut ast = parse_str("#define LIMIT 10\nint a = LIMIT;");
        let mut map = IdentifierMap::new();
        let mut names = Scripted(VecDeque::from(["Llll", "Aaaa"]));

        obfuscate(&mut ast, &mut map, &mut names);

        assert_eq!(
            ast.children[0].children[0],
            AstNode::leaf(NodeKind::DirectiveValue, "Llll 10")
        );
        assert_eq!(ast.children[1].children[1].children[0].value_str(), Some("Llll"));
    }

    #[test]
    fn test_literals_never_renamed() {
        let mut ast = parse_str("int a = 1; printf(\"a\");");
        let mut map = IdentifierMap::new();
        let mut names = Scripted(VecDeque::from(["Bbbb"]));

        obfuscate(&mut ast, &mut map, &mut names);

        let literal = &ast.children[1].children[0].children[0];
        assert_eq!(*literal, AstNode::leaf(NodeKind::String, "a"));
    }

    #[test]
    fn test_split_macro() {
        assert_eq!(split_macro("MAX 10"), ("MAX", " 10"));
        assert_eq!(split_macro("DEBUG"), ("DEBUG", ""));
    }

    #[test]
    fn test_unbound_use_spelled_like_opaque_name_is_bound() {
        let mut ast = parse_str("int y = Qabc1234;");
        let original = ast.clone();
        let mut map = IdentifierMap::from_pairs([("x", "Qabc1234")]).unwrap();
        let mut names = Scripted(VecDeque::from(["Yyyy", "Rrrr"]));

        obfuscate(&mut ast, &mut map, &mut names);

        assert_eq!(map.get("Qabc1234"), Some("Rrrr"));
        let init = &ast.children[0].children[1].children[0];
        assert_eq!(*init, AstNode::leaf(NodeKind::Identifier, "Rrrr"));

        crate::transform::deobfuscate(&mut ast, &map);
        assert_eq!(ast, original);
    }
}
