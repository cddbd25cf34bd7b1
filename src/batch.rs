//! Multi-file driver
//!
//! Files are processed one at a time against a single [`IdentifierMap`], so a
//! name keeps the same opaque spelling across the whole batch. A file that
//! fails to read, lex, parse or write is logged and skipped; the rest of the
//! batch still runs. An input whose output path was already written earlier
//! in the same batch is skipped too, before anything is transformed.

use crate::error::{Error, Result};
use crate::options::{BatchOptions, ObfuscateOptions};
use crate::pipeline::{deobfuscate_source, obfuscate_source};
use crate::transform::{IdentifierMap, NameSource};
use log::{error, info};
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of one input file.
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    /// Path written on success.
    pub result: Result<PathBuf>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }
}

pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| Error::io(path, e))
}

/// Load a mapping document from disk.
pub fn load_map(path: &Path) -> Result<IdentifierMap> {
    let text = read_source(path)?;
    Ok(IdentifierMap::from_json(&text)?)
}

/// Write a mapping document to disk.
pub fn save_map(path: &Path, map: &IdentifierMap) -> Result<()> {
    write_output(path, &map.to_json())
}

/// Obfuscate every input, writing `<stem>.obf.c` for each, then save `map`.
///
/// The map is saved even when some inputs failed, so the outputs that were
/// written can always be reversed.
pub fn obfuscate_files(
    inputs: &[PathBuf],
    batch: &BatchOptions,
    options: &ObfuscateOptions,
    map: &mut IdentifierMap,
    names: &mut dyn NameSource,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    let mut written = FxHashMap::default();

    for input in inputs {
        let result = claim_output(&written, batch, input, "obf")
            .and_then(|out| obfuscate_file(input, out, options, map, names));
        record_output(&mut written, input, &result);

        log_outcome(input, &result);
        report.outcomes.push(FileOutcome {
            input: input.clone(),
            result,
        });
    }

    let map_path = batch.resolved_map_path();
    save_map(&map_path, map)?;
    info!("wrote mapping with {} entries to {}", map.len(), map_path.display());

    Ok(report)
}

/// Restore every input against `map`, writing `<stem>.deobf.c` for each.
pub fn deobfuscate_files(
    inputs: &[PathBuf],
    batch: &BatchOptions,
    map: &IdentifierMap,
) -> BatchReport {
    let mut report = BatchReport::default();
    let mut written = FxHashMap::default();

    for input in inputs {
        let result = claim_output(&written, batch, input, "deobf")
            .and_then(|out| deobfuscate_file(input, out, map));
        record_output(&mut written, input, &result);

        log_outcome(input, &result);
        report.outcomes.push(FileOutcome {
            input: input.clone(),
            result,
        });
    }

    report
}

/// Output path for `input`, unless an earlier input of this batch wrote it.
fn claim_output(
    written: &FxHashMap<PathBuf, PathBuf>,
    batch: &BatchOptions,
    input: &Path,
    suffix: &str,
) -> Result<PathBuf> {
    let out = batch.output_path(input, suffix);
    match written.get(&out) {
        Some(first) => Err(Error::OutputCollision {
            output: out,
            first: first.clone(),
        }),
        None => Ok(out),
    }
}

fn record_output(written: &mut FxHashMap<PathBuf, PathBuf>, input: &Path, result: &Result<PathBuf>) {
    if let Ok(out) = result {
        written.insert(out.clone(), input.to_path_buf());
    }
}

fn obfuscate_file(
    input: &Path,
    out: PathBuf,
    options: &ObfuscateOptions,
    map: &mut IdentifierMap,
    names: &mut dyn NameSource,
) -> Result<PathBuf> {
    let source = read_source(input)?;
    let masked = obfuscate_source(&source, map, options, names)?;
    write_output(&out, &masked)?;
    Ok(out)
}

fn deobfuscate_file(input: &Path, out: PathBuf, map: &IdentifierMap) -> Result<PathBuf> {
    let source = read_source(input)?;
    let restored = deobfuscate_source(&source, map)?;
    write_output(&out, &restored)?;
    Ok(out)
}

fn log_outcome(input: &Path, result: &Result<PathBuf>) {
    match result {
        Ok(out) => info!("{} -> {}", input.display(), out.display()),
        Err(e) => error!("skipping {}: {}", input.display(), e),
    }
}
