//! Dictionary compilers for letter transducers.
//!
//! A dictionary source is either a structured markup dictionary or a flat,
//! tab-separated transition list. [`dispatch`] decides which one it is and
//! runs the matching front-end; both produce a [`lettertrans_fst::Artifact`].
//!
//! # Architecture
//!
//! - [`options`] -- Direction, variants and front-end switches
//! - [`dispatch`] -- Format sniffing and front-end selection
//! - [`flat`] -- Flat transition-list front-end
//! - [`markup`] -- Markup dictionary reader and compiler
//! - [`acx`] -- Analysis-chars (restriction) file

pub mod acx;
pub mod dispatch;
pub mod flat;
pub mod markup;
pub mod options;

use std::fs;
use std::path::{Path, PathBuf};

pub use dispatch::{Compiled, SourceFormat, compile_file, compile_source, detect_format};
pub use options::{CompileOptions, Direction};

/// Error type for dictionary compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("cannot open file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("file '{}' is not valid UTF-8 (at byte {position})", path.display())]
    Encoding { path: PathBuf, position: usize },

    #[error("{option} specified, but direction is {direction}")]
    VariantConflict {
        option: &'static str,
        direction: Direction,
    },

    #[error("malformed markup at byte {position}: {message}")]
    Markup { position: u64, message: String },

    #[error("unexpected element <{element}> in <{parent}>")]
    UnexpectedElement { element: String, parent: String },

    #[error("missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("<{0}> is not supported")]
    Unsupported(String),

    #[error("undefined tag <{0}>")]
    UndefinedTag(String),

    #[error("undefined paradigm '{0}'")]
    UndefinedParadigm(String),

    #[error("paradigm '{0}' refers to itself")]
    ParadigmCycle(String),

    #[error("line {line}: {message}")]
    Flat { line: usize, message: String },

    #[error("invalid analysis-chars file: {0}")]
    Restriction(String),

    #[error(transparent)]
    Fst(#[from] lettertrans_fst::LtError),
}

/// Read a text source. Unreadable files and invalid UTF-8 are reported
/// separately, both naming the path.
pub(crate) fn read_source(path: &Path) -> Result<String, CompileError> {
    let bytes = fs::read(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|e| CompileError::Encoding {
        path: path.to_path_buf(),
        position: e.utf8_error().valid_up_to(),
    })
}
