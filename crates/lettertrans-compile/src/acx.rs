// Analysis-chars file: character equivalences for the forward analyser.
//
//   <analysis-chars>
//     <char value="a"><equiv-char value="á"/></char>
//   </analysis-chars>

use std::collections::BTreeMap;
use std::path::Path;

use lettertrans_fst::Artifact;
use quick_xml::events::{BytesStart, Event};

use crate::{CompileError, read_source};
use crate::markup::reader::{Diagnostics, MarkupReader, element_name, is_blank};

/// Parsed analysis-chars file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisChars {
    equivalents: BTreeMap<char, Vec<char>>,
}

impl AnalysisChars {
    pub fn parse(source: &str) -> Result<Self, CompileError> {
        let mut reader = MarkupReader::new(source, Diagnostics::Enabled);
        let mut equivalents: BTreeMap<char, Vec<char>> = BTreeMap::new();
        let mut current: Option<char> = None;
        let mut in_root = false;

        loop {
            match reader.next_event().map_err(restriction)? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"analysis-chars" => {
                    in_root = true;
                }
                Event::Start(e) if in_root && e.name().as_ref() == b"char" => {
                    current = Some(char_value(&reader, &e)?);
                }
                Event::Empty(e) if in_root && e.name().as_ref() == b"char" => {
                    char_value(&reader, &e)?;
                }
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"equiv-char" => {
                    let Some(base) = current else {
                        return Err(CompileError::Restriction(
                            "<equiv-char> outside <char>".to_string(),
                        ));
                    };
                    let equiv = char_value(&reader, &e)?;
                    let list = equivalents.entry(base).or_default();
                    if !list.contains(&equiv) {
                        list.push(equiv);
                    }
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(CompileError::Restriction(format!(
                        "unexpected element <{}>",
                        element_name(&e)
                    )));
                }
                Event::End(e) if e.name().as_ref() == b"char" => current = None,
                Event::Text(t) if !is_blank(&t) => {
                    return Err(CompileError::Restriction("unexpected text".to_string()));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !in_root {
            return Err(CompileError::Restriction(
                "no <analysis-chars> element".to_string(),
            ));
        }
        Ok(Self { equivalents })
    }

    pub fn read_file(path: &Path) -> Result<Self, CompileError> {
        Self::parse(&read_source(path)?)
    }

    /// Equivalent characters keyed by the character they stand in for.
    pub fn equivalents(&self) -> &BTreeMap<char, Vec<char>> {
        &self.equivalents
    }

    /// Add equivalent transitions to every automaton of `artifact`.
    ///
    /// Equivalents of alphabet letters become letters too.
    pub fn apply(&self, artifact: &mut Artifact) {
        let Artifact {
            alphabet, automata, ..
        } = artifact;
        for (base, chars) in &self.equivalents {
            if alphabet.letters().contains(base) {
                for &ch in chars {
                    alphabet.add_letter(ch);
                }
            }
        }
        for (name, transducer) in automata.iter_mut() {
            let before = transducer.transition_count();
            transducer.add_equivalent_transitions(alphabet, &self.equivalents);
            log::debug!(
                "{name}: {} equivalent transitions added",
                transducer.transition_count() - before
            );
        }
    }
}

fn restriction(err: CompileError) -> CompileError {
    CompileError::Restriction(err.to_string())
}

fn char_value(reader: &MarkupReader<'_>, element: &BytesStart<'_>) -> Result<char, CompileError> {
    let value = reader
        .required_attribute(element, "value")
        .map_err(restriction)?;
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(CompileError::Restriction(format!(
            "value '{value}' on <{}> is not a single character",
            element_name(element)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettertrans_fst::{Symbol, Transducer};

    const ACX: &str = r#"<?xml version="1.0"?>
<analysis-chars>
  <char value="a">
    <equiv-char value="á"/>
    <equiv-char value="à"/>
  </char>
  <char value="n"><equiv-char value="ñ"/></char>
</analysis-chars>
"#;

    #[test]
    fn parse_equivalents() {
        let acx = AnalysisChars::parse(ACX).unwrap();
        assert_eq!(acx.equivalents()[&'a'], vec!['á', 'à']);
        assert_eq!(acx.equivalents()[&'n'], vec!['ñ']);
    }

    #[test]
    fn reject_malformed_files() {
        assert!(matches!(
            AnalysisChars::parse("<chars/>"),
            Err(CompileError::Restriction(_))
        ));
        assert!(matches!(
            AnalysisChars::parse("<analysis-chars><char value=\"ab\"/></analysis-chars>"),
            Err(CompileError::Restriction(_))
        ));
        assert!(matches!(
            AnalysisChars::parse("<analysis-chars><equiv-char value=\"a\"/></analysis-chars>"),
            Err(CompileError::Restriction(_))
        ));
    }

    #[test]
    fn apply_adds_parallel_transitions() {
        let mut artifact = Artifact::new();
        artifact.alphabet.add_letter('a');
        let n = artifact.alphabet.intern_tag("n");
        let a = artifact.alphabet.pair_code(Symbol::Char('a'), Symbol::Char('a'));
        let tag = artifact.alphabet.pair_code(Symbol::Epsilon, n);
        let mut t = Transducer::new();
        let s1 = t.add_state();
        let s2 = t.add_state();
        t.add_transition(0, a, s1, 0.0);
        t.add_transition(s1, tag, s2, 0.0);
        t.set_final(s2, 0.0);
        artifact.automata.insert("main@standard".to_string(), t);

        AnalysisChars::parse(ACX).unwrap().apply(&mut artifact);

        let t = &artifact.automata["main@standard"];
        let from_initial: Vec<(Symbol, Symbol)> = t
            .transitions(0)
            .iter()
            .map(|tr| artifact.alphabet.decode(tr.label).unwrap())
            .collect();
        assert_eq!(from_initial.len(), 3);
        assert!(from_initial.contains(&(Symbol::Char('á'), Symbol::Char('a'))));
        assert!(from_initial.contains(&(Symbol::Char('à'), Symbol::Char('a'))));
        assert_eq!(t.transitions(s1).len(), 1);
        assert!(artifact.alphabet.letters().contains(&'á'));
        assert!(!artifact.alphabet.letters().contains(&'ñ'));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = AnalysisChars::read_file(Path::new("/nonexistent/restriction.acx")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/restriction.acx"));
    }
}
