//! Run configuration
//!
//! Plain structs filled from the command line; library callers build them
//! directly.

use std::path::{Path, PathBuf};

pub const DEFAULT_NAME_LENGTH: usize = 8;

/// Default mapping file name, written next to the outputs.
pub const DEFAULT_MAP_FILE: &str = "identifier_map.json";

/// Knobs for the forward transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObfuscateOptions {
    /// Length of generated names (clamped to a small minimum).
    pub name_length: usize,
    /// Number of placeholder statements inserted per file.
    pub dead_code: usize,
    /// Seed for names and placeholder positions. `None` draws OS entropy.
    pub seed: Option<u64>,
}

impl Default for ObfuscateOptions {
    fn default() -> Self {
        ObfuscateOptions {
            name_length: DEFAULT_NAME_LENGTH,
            dead_code: 0,
            seed: None,
        }
    }
}

impl ObfuscateOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_dead_code(mut self, count: usize) -> Self {
        self.dead_code = count;
        self
    }
}

/// Where a batch writes its outputs and mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Output directory; `None` writes next to each input.
    pub output_dir: Option<PathBuf>,
    /// Mapping file; `None` uses [`DEFAULT_MAP_FILE`] in the output directory.
    pub map_path: Option<PathBuf>,
}

impl BatchOptions {
    pub fn resolved_map_path(&self) -> PathBuf {
        match (&self.map_path, &self.output_dir) {
            (Some(path), _) => path.clone(),
            (None, Some(dir)) => dir.join(DEFAULT_MAP_FILE),
            (None, None) => PathBuf::from(DEFAULT_MAP_FILE),
        }
    }

    /// `<dir>/<stem>.<suffix>.c`, where `<dir>` is the output directory or
    /// the input's own directory.
    pub fn output_path(&self, input: &Path, suffix: &str) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("output"));
        let file_name = format!("{}.{}.c", stem, suffix);

        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => input.with_file_name(file_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ObfuscateOptions::default();
        assert_eq!(options.name_length, 8);
        assert_eq!(options.dead_code, 0);
        assert_eq!(options.seed, None);
    }

    #[test]
    fn test_output_path() {
        let batch = BatchOptions {
            output_dir: Some(PathBuf::from("out")),
            map_path: None,
        };
        assert_eq!(
            batch.output_path(Path::new("src/main.c"), "obf"),
            PathBuf::from("out/main.obf.c")
        );
        assert_eq!(batch.resolved_map_path(), PathBuf::from("out/identifier_map.json"));

        let beside = BatchOptions::default();
        assert_eq!(
            beside.output_path(Path::new("src/main.c"), "deobf"),
            PathBuf::from("src/main.deobf.c")
        );
    }
}
