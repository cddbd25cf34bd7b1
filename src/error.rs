use crate::codegen::RenderError;
use crate::parser::{LexError, ParseError};
use crate::transform::MappingError;
use std::path::PathBuf;
use thiserror::Error;

/// Any failure surfaced by the pipeline or the batch driver.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} was already written for {}", .output.display(), .first.display())]
    OutputCollision { output: PathBuf, first: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the caller's input is at fault rather than a tree invariant.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Error::Render(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
