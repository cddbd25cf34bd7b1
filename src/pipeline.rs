//! One-call entry points over the stages
//!
//! Each function runs a single source unit through lexer, parser, the
//! relevant transform and the generator, stopping at the first failure.

use crate::codegen::generate;
use crate::error::Result;
use crate::options::ObfuscateOptions;
use crate::parser::ast::AstNode;
use crate::parser::{parse, tokenize};
use crate::transform::{
    insert_dead_code, remove_dead_code, Deobfuscator, IdentifierMap, NameSource, Obfuscator,
};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Keeps placeholder positions independent of the name stream for one seed.
const LAYOUT_SEED_SALT: u64 = 0x5eed_0f_c0de_1a70;

/// Source text → tree.
pub fn parse_source(source: &str) -> Result<AstNode> {
    let tokens = tokenize(source)?;
    debug!("lexed {} tokens", tokens.len());

    let ast = parse(tokens)?;
    debug!("parsed {} nodes", ast.node_count());
    Ok(ast)
}

/// Source text → regenerated source text, no transforms.
pub fn normalize_source(source: &str) -> Result<String> {
    let ast = parse_source(source)?;
    Ok(generate(&ast)?)
}

/// Rename bindings, insert placeholders and regenerate.
///
/// `map` is extended with any new bindings; existing entries are reused so
/// one map can serve a whole batch.
pub fn obfuscate_source(
    source: &str,
    map: &mut IdentifierMap,
    options: &ObfuscateOptions,
    names: &mut dyn NameSource,
) -> Result<String> {
    let mut ast = parse_source(source)?;

    Obfuscator::new(map, names).obfuscate(&mut ast);

    if options.dead_code > 0 {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ LAYOUT_SEED_SALT),
            None => StdRng::from_entropy(),
        };
        insert_dead_code(&mut ast, options.dead_code, &mut rng);
    }

    Ok(generate(&ast)?)
}

/// Strip placeholders, restore original names and regenerate.
pub fn deobfuscate_source(source: &str, map: &IdentifierMap) -> Result<String> {
    let mut ast = parse_source(source)?;

    remove_dead_code(&mut ast);
    Deobfuscator::new(map).deobfuscate(&mut ast);

    Ok(generate(&ast)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transform::RandomNames;

    #[test]
    fn test_parse_source_reports_stage() {
        assert!(matches!(parse_source("int @ = 5;"), Err(Error::Lex(_))));
        assert!(matches!(parse_source("int = 5;"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_normalize_is_fixed_point() {
        let once = normalize_source("int  a=5 ;  // note\nfloat b = a+3;").unwrap();
        assert_eq!(once, "int a = 5;\nfloat b = (a + 3);\n");
        assert_eq!(normalize_source(&once).unwrap(), once);
    }

    #[test]
    fn test_obfuscate_then_deobfuscate() {
        let source = "int a; float b = a + 3;";
        let mut map = IdentifierMap::new();
        let mut names = RandomNames::seeded(11, 8);
        let options = ObfuscateOptions::default().with_seed(11).with_dead_code(3);

        let masked = obfuscate_source(source, &mut map, &options, &mut names).unwrap();
        assert!(!masked.contains(" a;"), "{}", masked);
        assert_eq!(masked.matches(";\n").count(), 5);

        let restored = deobfuscate_source(&masked, &map).unwrap();
        assert_eq!(parse_source(&restored).unwrap(), parse_source(source).unwrap());
    }
}
