// Source format detection and front-end selection.

use std::fmt;
use std::path::Path;

use lettertrans_fst::Artifact;

use crate::options::CompileOptions;
use crate::{CompileError, flat, markup, read_source};

/// Dictionary source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Structured markup dictionary.
    Markup,
    /// Tab-separated transition list.
    Flat,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Markup => write!(f, "markup"),
            SourceFormat::Flat => write!(f, "flat"),
        }
    }
}

/// Result of a compilation: the artifact and the front-end that built it.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub format: SourceFormat,
    pub artifact: Artifact,
}

/// Decide which front-end reads `source`.
///
/// A well-formed markup document with a single root is markup; anything
/// else is a flat transition list. Probing never logs.
pub fn detect_format(source: &str) -> SourceFormat {
    if markup::reader::probe(source) {
        SourceFormat::Markup
    } else {
        SourceFormat::Flat
    }
}

/// Compile an in-memory dictionary source.
pub fn compile_source(source: &str, options: &CompileOptions) -> Result<Compiled, CompileError> {
    options.validate()?;
    let format = detect_format(source);
    log::info!("compiling {format} dictionary ({} direction)", options.direction);

    let artifact = match format {
        SourceFormat::Markup => markup::compile(source, options)?,
        SourceFormat::Flat => flat::compile(source, options)?,
    };

    log::info!(
        "{} automata, {} letters, {} tags, {} symbol pairs",
        artifact.automata.len(),
        artifact.alphabet.letters().len(),
        artifact.alphabet.tag_count(),
        artifact.alphabet.pair_count()
    );
    if options.verbose {
        for (name, transducer) in &artifact.automata {
            log::info!(
                "{name}: {} states, {} transitions",
                transducer.state_count(),
                transducer.transition_count()
            );
        }
    }
    Ok(Compiled { format, artifact })
}

/// Read and compile a dictionary file.
pub fn compile_file(path: &Path, options: &CompileOptions) -> Result<Compiled, CompileError> {
    options.validate()?;
    let source = read_source(path)?;
    compile_source(&source, options)
}
