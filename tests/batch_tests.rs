// Multi-file batch tests

use std::fs;
use std::path::PathBuf;

use cmask::batch::{deobfuscate_files, load_map, obfuscate_files, save_map};
use cmask::error::Error;
use cmask::options::{BatchOptions, ObfuscateOptions};
use cmask::pipeline::parse_source;
use cmask::transform::{IdentifierMap, RandomNames};
use tempfile::tempdir;

const UTIL: &str = "int helper(int n) {\n    return (n * 2);\n}\n";
const MAIN: &str = "int main() {\n    int total = helper(21);\n    return total;\n}\n";

#[test]
fn test_batch_obfuscate_then_deobfuscate() {
    let dir = tempdir().unwrap();
    let util = dir.path().join("util.c");
    let main = dir.path().join("main.c");
    fs::write(&util, UTIL).unwrap();
    fs::write(&main, MAIN).unwrap();

    let masked_dir = dir.path().join("masked");
    let batch = BatchOptions {
        output_dir: Some(masked_dir.clone()),
        map_path: None,
    };
    let mut map = IdentifierMap::new();
    let mut names = RandomNames::seeded(12, 8);

    let report = obfuscate_files(
        &[util.clone(), main.clone()],
        &batch,
        &ObfuscateOptions::default().with_seed(12).with_dead_code(2),
        &mut map,
        &mut names,
    )
    .unwrap();
    assert!(!report.has_failures());

    let masked_util = masked_dir.join("util.obf.c");
    let masked_main = masked_dir.join("main.obf.c");
    let map_path = masked_dir.join("identifier_map.json");
    assert!(masked_util.exists() && masked_main.exists() && map_path.exists());

    // One map across files: the call in main.c uses helper's opaque name.
    let opaque = map.get("helper").unwrap().to_string();
    assert!(fs::read_to_string(&masked_main).unwrap().contains(&opaque));
    assert!(!fs::read_to_string(&masked_main).unwrap().contains("helper"));

    let loaded = load_map(&map_path).unwrap();
    assert_eq!(loaded, map);

    let restored_dir = dir.path().join("restored");
    let report = deobfuscate_files(
        &[masked_util, masked_main],
        &BatchOptions {
            output_dir: Some(restored_dir.clone()),
            map_path: Some(map_path),
        },
        &loaded,
    );
    assert!(!report.has_failures());

    let restored_main = fs::read_to_string(restored_dir.join("main.obf.deobf.c")).unwrap();
    assert_eq!(parse_source(&restored_main).unwrap(), parse_source(MAIN).unwrap());
    let restored_util = fs::read_to_string(restored_dir.join("util.obf.deobf.c")).unwrap();
    assert_eq!(restored_util, UTIL);
}

#[test]
fn test_bad_file_is_skipped() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.c");
    let bad = dir.path().join("bad.c");
    let missing = dir.path().join("missing.c");
    fs::write(&good, "int a = 1;").unwrap();
    fs::write(&bad, "int a = $;").unwrap();

    let batch = BatchOptions {
        output_dir: Some(dir.path().join("out")),
        map_path: Some(dir.path().join("names.json")),
    };
    let mut map = IdentifierMap::new();
    let mut names = RandomNames::seeded(3, 8);

    let inputs: Vec<PathBuf> = vec![bad.clone(), missing.clone(), good.clone()];
    let report = obfuscate_files(
        &inputs,
        &batch,
        &ObfuscateOptions::default(),
        &mut map,
        &mut names,
    )
    .unwrap();

    assert!(report.has_failures());
    assert_eq!(report.succeeded().count(), 1);

    let failures: Vec<_> = report.failed().collect();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].input, bad);
    assert!(matches!(failures[0].result, Err(Error::Lex(_))));
    assert_eq!(failures[1].input, missing);
    assert!(matches!(failures[1].result, Err(Error::Io { .. })));

    assert!(dir.path().join("out/good.obf.c").exists());
    assert!(!dir.path().join("out/bad.obf.c").exists());
    assert!(dir.path().join("names.json").exists());
    assert_eq!(map.len(), 1);
}

#[test]
fn test_outputs_written_beside_inputs_by_default() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("prog.c");
    fs::write(&input, "int x = 1;").unwrap();

    let batch = BatchOptions {
        output_dir: None,
        map_path: Some(dir.path().join("identifier_map.json")),
    };
    let mut map = IdentifierMap::new();
    let mut names = RandomNames::seeded(1, 8);
    obfuscate_files(
        &[input],
        &batch,
        &ObfuscateOptions::default(),
        &mut map,
        &mut names,
    )
    .unwrap();

    assert!(dir.path().join("prog.obf.c").exists());
}

#[test]
fn test_extending_an_existing_map() {
    let dir = tempdir().unwrap();
    let map_path = dir.path().join("identifier_map.json");
    let earlier = IdentifierMap::from_pairs([("x", "Keep_me1")]).unwrap();
    save_map(&map_path, &earlier).unwrap();

    let input = dir.path().join("later.c");
    fs::write(&input, "int x = 1; int y = x;").unwrap();

    let mut map = load_map(&map_path).unwrap();
    let mut names = RandomNames::seeded(6, 8);
    obfuscate_files(
        &[input],
        &BatchOptions {
            output_dir: Some(dir.path().to_path_buf()),
            map_path: Some(map_path.clone()),
        },
        &ObfuscateOptions::default(),
        &mut map,
        &mut names,
    )
    .unwrap();

    let masked = fs::read_to_string(dir.path().join("later.obf.c")).unwrap();
    assert!(masked.starts_with("int Keep_me1 = 1;\n"), "{}", masked);

    let saved = load_map(&map_path).unwrap();
    let pairs: Vec<_> = saved.iter().collect();
    assert_eq!(pairs[0], ("x", "Keep_me1"));
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[1].0, "y");
}

#[test]
fn test_corrupt_map_rejected() {
    let dir = tempdir().unwrap();
    let map_path = dir.path().join("identifier_map.json");
    fs::write(&map_path, r#"{"a": "Same", "b": "Same"}"#).unwrap();

    let err = load_map(&map_path).unwrap_err();
    assert!(matches!(err, Error::Mapping(_)));
    assert!(err.is_input_error());
}

#[test]
fn test_same_stem_in_one_output_dir_is_not_overwritten() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("a/main.c");
    let second = dir.path().join("b/main.c");
    fs::create_dir_all(first.parent().unwrap()).unwrap();
    fs::create_dir_all(second.parent().unwrap()).unwrap();
    fs::write(&first, "int first = 1;").unwrap();
    fs::write(&second, "int second = 2;").unwrap();

    let out_dir = dir.path().join("out");
    let batch = BatchOptions {
        output_dir: Some(out_dir.clone()),
        map_path: None,
    };
    let mut map = IdentifierMap::new();
    let mut names = RandomNames::seeded(9, 8);

    let report = obfuscate_files(
        &[first.clone(), second.clone()],
        &batch,
        &ObfuscateOptions::default(),
        &mut map,
        &mut names,
    )
    .unwrap();

    assert!(report.has_failures());
    assert_eq!(report.succeeded().count(), 1);
    let failure = report.failed().next().unwrap();
    assert_eq!(failure.input, second);
    match &failure.result {
        Err(Error::OutputCollision { output, first: earlier }) => {
            assert_eq!(*output, out_dir.join("main.obf.c"));
            assert_eq!(*earlier, first);
        }
        other => panic!("expected an output collision, got {:?}", other),
    }

    // The rejected input was never transformed.
    assert!(map.contains_key("first"));
    assert!(!map.contains_key("second"));
    let restored = deobfuscate_files(
        &[out_dir.join("main.obf.c")],
        &BatchOptions {
            output_dir: Some(dir.path().join("restored")),
            map_path: None,
        },
        &map,
    );
    assert!(!restored.has_failures());
    let text = fs::read_to_string(dir.path().join("restored/main.obf.deobf.c")).unwrap();
    assert_eq!(text, "int first = 1;\n");
}
