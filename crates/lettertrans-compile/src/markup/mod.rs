// Markup dictionary front-end.
//
// `reader` wraps the event stream, `parser` builds the dictionary model and
// `compiler` turns the model into automata.

pub mod compiler;
pub mod parser;
pub mod reader;

use lettertrans_fst::Artifact;

use crate::CompileError;
use crate::acx::AnalysisChars;
use crate::options::{CompileOptions, Direction};

/// Compile a markup dictionary.
///
/// With a restriction file set and forward direction, the analysis-chars
/// equivalences are applied to every automaton after compilation.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Artifact, CompileError> {
    let dictionary = parser::parse(source, reader::Diagnostics::Enabled)?;
    log::debug!(
        "markup dictionary: {} tags, {} paradigms, {} sections",
        dictionary.tags.len(),
        dictionary.pardefs.len(),
        dictionary.sections.len()
    );
    let mut artifact = compiler::DictionaryCompiler::new(&dictionary, options).compile()?;

    if let Some(path) = &options.restriction {
        match options.direction {
            Direction::Forward => AnalysisChars::read_file(path)?.apply(&mut artifact),
            Direction::Reverse => {
                log::warn!(
                    "analysis-chars file '{}' ignored in reverse direction",
                    path.display()
                );
            }
        }
    }
    Ok(artifact)
}
