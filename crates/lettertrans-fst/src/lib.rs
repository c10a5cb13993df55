//! Letter transducer binary format.
//!
//! This crate provides the in-memory model of a compiled dictionary (one
//! shared alphabet plus any number of named transducers) together with the
//! binary codec used to store it and a text exporter for inspection.
//!
//! # Architecture
//!
//! - [`compression`] -- Variable-length integers, strings and weights
//! - [`alphabet`] -- Letters, tags and the symbol-pair code table
//! - [`transducer`] -- States, labelled transitions and finals
//! - [`format`] -- Magic marker, feature flags and layout detection
//! - [`artifact`] -- The complete binary file (alphabet + named automata)
//! - [`print`] -- Tab-separated text export

pub mod alphabet;
pub mod artifact;
pub mod compression;
pub mod format;
pub mod print;
pub mod transducer;

pub use alphabet::{Alphabet, Symbol};
pub use artifact::Artifact;
pub use format::FormatVersion;
pub use print::Escaping;
pub use transducer::Transducer;

/// Error type for reading and writing letter transducer artifacts.
#[derive(Debug, thiserror::Error)]
pub enum LtError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of data while reading {0}")]
    Truncated(&'static str),
    #[error("variable-length integer does not fit in 64 bits")]
    VarIntOverflow,
    #[error("invalid character code point {0:#x}")]
    InvalidCodePoint(u64),
    #[error(
        "transducer uses features ({features:#x}) that are unknown to this version of lettertrans - upgrade!"
    )]
    UpgradeRequired { features: u64 },
    #[error("corrupt transducer data: {0}")]
    Corrupt(String),
}

impl LtError {
    /// Map an I/O failure to `Truncated` when it means the data ran out.
    pub(crate) fn from_read(err: std::io::Error, what: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            LtError::Truncated(what)
        } else {
            LtError::Io(err)
        }
    }
}

/// State identifier within one transducer. State 0 is the initial state.
pub type StateId = u32;

/// Transition weight. Unweighted dictionaries use `0.0` everywhere.
pub type Weight = f64;
