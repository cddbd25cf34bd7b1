// cmask: reversible identifier masking for a C subset

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use log::{info, warn, LevelFilter};

use cmask::batch::{self, BatchReport};
use cmask::options::{BatchOptions, ObfuscateOptions, DEFAULT_NAME_LENGTH};
use cmask::parser::tokenize;
use cmask::pipeline::parse_source;
use cmask::transform::{IdentifierMap, RandomNames};

#[derive(Parser)]
#[command(
    name = "cmask",
    version,
    about = "Reversible identifier masking for a C subset"
)]
struct Cli {
    /// More output (-v for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename identifiers and write <stem>.obf.c plus a mapping file
    Obfuscate {
        /// Input C files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory (defaults to each input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Where to write the mapping (defaults to identifier_map.json in the output directory)
        #[arg(long)]
        map: Option<PathBuf>,

        /// Existing mapping to extend so names stay consistent with an earlier run
        #[arg(long)]
        extend_map: Option<PathBuf>,

        /// Seed for reproducible names and placeholder positions
        #[arg(long)]
        seed: Option<u64>,

        /// Placeholder statements to insert per file
        #[arg(long, default_value_t = 0)]
        dead_code: usize,

        /// Length of generated names
        #[arg(long, default_value_t = DEFAULT_NAME_LENGTH)]
        name_length: usize,
    },

    /// Restore original identifiers and write <stem>.deobf.c
    Deobfuscate {
        /// Masked C files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Mapping written by the obfuscate run
        #[arg(long)]
        map: PathBuf,

        /// Output directory (defaults to each input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the token stream as JSON
    Tokens { file: PathBuf },

    /// Print the parse tree as JSON
    Ast { file: PathBuf },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn finish(report: &BatchReport) -> anyhow::Result<()> {
    let failed = report.failed().count();
    info!(
        "{} file(s) processed, {} failed",
        report.outcomes.len(),
        failed
    );
    if failed > 0 {
        bail!("{} of {} input file(s) failed", failed, report.outcomes.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Obfuscate {
            files,
            output_dir,
            map,
            extend_map,
            seed,
            dead_code,
            name_length,
        } => {
            let options = ObfuscateOptions {
                name_length,
                dead_code,
                seed,
            };
            let batch_options = BatchOptions {
                output_dir,
                map_path: map,
            };

            let mut identifiers = match &extend_map {
                Some(path) => {
                    let loaded = batch::load_map(path)
                        .with_context(|| format!("loading mapping {}", path.display()))?;
                    info!("extending mapping with {} entries", loaded.len());
                    loaded
                }
                None => IdentifierMap::new(),
            };

            let mut names = match seed {
                Some(seed) => RandomNames::seeded(seed, name_length),
                None => RandomNames::from_entropy(name_length),
            };
            if names.length() != name_length {
                warn!("name length raised to {}", names.length());
            }

            let report = batch::obfuscate_files(
                &files,
                &batch_options,
                &options,
                &mut identifiers,
                &mut names,
            )?;
            finish(&report)
        }

        Commands::Deobfuscate {
            files,
            map,
            output_dir,
        } => {
            let identifiers = batch::load_map(&map)
                .with_context(|| format!("loading mapping {}", map.display()))?;
            let batch_options = BatchOptions {
                output_dir,
                map_path: Some(map),
            };

            let report = batch::deobfuscate_files(&files, &batch_options, &identifiers);
            finish(&report)
        }

        Commands::Tokens { file } => {
            let source = batch::read_source(&file)?;
            let tokens = tokenize(&source)?;
            println!("{}", serde_json::to_string_pretty(&tokens)?);
            Ok(())
        }

        Commands::Ast { file } => {
            let source = batch::read_source(&file)?;
            let ast = parse_source(&source)?;
            println!("{}", serde_json::to_string_pretty(&ast)?);
            Ok(())
        }
    }
}
