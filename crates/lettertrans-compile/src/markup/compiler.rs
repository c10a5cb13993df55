// Dictionary model to artifact.
//
// Every selected entry expands to a set of label paths (sequences of pair
// codes). Paradigms expand once and are shared. Paths are inserted into the
// section's automaton as a prefix tree; the end of each path is final.

use std::rc::Rc;

use hashbrown::{HashMap, HashSet};
use lettertrans_fst::{Alphabet, Artifact, Symbol, Transducer};

use crate::CompileError;
use crate::markup::parser::{Dictionary, Entry, Item, Pardef, Piece};
use crate::options::{CompileOptions, Direction};

/// A sequence of pair codes.
type Path = Vec<u32>;

pub struct DictionaryCompiler<'d> {
    dictionary: &'d Dictionary,
    options: &'d CompileOptions,
    alphabet: Alphabet,
    pardefs: HashMap<&'d str, &'d Pardef>,
    expanded: HashMap<&'d str, Rc<Vec<Path>>>,
    in_progress: HashSet<&'d str>,
}

impl<'d> DictionaryCompiler<'d> {
    pub fn new(dictionary: &'d Dictionary, options: &'d CompileOptions) -> Self {
        let mut alphabet = Alphabet::new();
        for &ch in &dictionary.letters {
            alphabet.add_letter(ch);
        }
        for tag in &dictionary.tags {
            alphabet.intern_tag(tag);
        }

        let mut pardefs = HashMap::new();
        for pardef in &dictionary.pardefs {
            if pardefs.insert(pardef.name.as_str(), pardef).is_some() {
                log::warn!("paradigm '{}' defined twice, using the last one", pardef.name);
            }
        }

        Self {
            dictionary,
            options,
            alphabet,
            pardefs,
            expanded: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Compile every section into its own automaton, named `id@type`.
    pub fn compile(mut self) -> Result<Artifact, CompileError> {
        let mut artifact = Artifact::new();
        let dictionary = self.dictionary;
        for section in &dictionary.sections {
            let name = format!("{}@{}", section.id, section.kind);
            let mut paths = Vec::new();
            for entry in &section.entries {
                if self.selected(entry) {
                    paths.extend(self.expand_entry(entry)?);
                }
            }
            paths.sort_unstable();
            paths.dedup();

            let transducer = artifact.automata.entry(name).or_insert_with(Transducer::new);
            for path in &paths {
                if path.is_empty() {
                    log::warn!("section '{}': skipping entry with empty content", section.id);
                    continue;
                }
                let mut state = transducer.initial();
                for &label in path {
                    state = transducer.insert_single(state, label);
                }
                transducer.set_final(state, 0.0);
            }
            log::debug!(
                "section {}@{}: {} paths, {} states",
                section.id,
                section.kind,
                paths.len(),
                transducer.state_count()
            );
        }
        artifact.alphabet = self.alphabet;
        Ok(artifact)
    }

    /// Whether `entry` takes part in this compilation.
    ///
    /// An entry carrying a selector attribute is kept only when the matching
    /// option is set to the same value.
    fn selected(&self, entry: &Entry) -> bool {
        fn accepts(attribute: &Option<String>, option: &Option<String>) -> bool {
            attribute.is_none() || attribute == option
        }
        let options = self.options;
        !entry.ignore
            && entry.restriction.is_none_or(|d| d == options.direction)
            && accepts(&entry.variant, &options.variant)
            && accepts(&entry.alt, &options.alt)
            && accepts(&entry.variant_left, &options.variant_left)
            && accepts(&entry.variant_right, &options.variant_right)
    }

    /// All paths of one entry: the concatenation of its items' alternatives.
    fn expand_entry(&mut self, entry: &'d Entry) -> Result<Vec<Path>, CompileError> {
        let mut paths: Vec<Path> = vec![Vec::new()];
        for item in &entry.items {
            let alternatives = match item {
                Item::Identity(pieces) => {
                    let symbols = self.symbols(pieces)?;
                    let path: Path = symbols
                        .into_iter()
                        .map(|s| self.alphabet.pair_code(s, s))
                        .collect();
                    Rc::new(vec![path])
                }
                Item::Pair { left, right } => {
                    let left = self.symbols(left)?;
                    let right = self.symbols(right)?;
                    Rc::new(vec![self.pair_path(left, right)])
                }
                Item::Paradigm(name) => self.expand_paradigm(name)?,
            };
            paths = concatenate(&paths, &alternatives);
        }
        Ok(paths)
    }

    fn expand_paradigm(&mut self, name: &'d str) -> Result<Rc<Vec<Path>>, CompileError> {
        if let Some(paths) = self.expanded.get(name) {
            return Ok(Rc::clone(paths));
        }
        let pardef = *self
            .pardefs
            .get(name)
            .ok_or_else(|| CompileError::UndefinedParadigm(name.to_string()))?;
        if !self.in_progress.insert(name) {
            return Err(CompileError::ParadigmCycle(name.to_string()));
        }

        let mut paths = Vec::new();
        for entry in &pardef.entries {
            if self.selected(entry) {
                paths.extend(self.expand_entry(entry)?);
            }
        }
        paths.sort_unstable();
        paths.dedup();

        self.in_progress.remove(name);
        let paths = Rc::new(paths);
        self.expanded.insert(name, Rc::clone(&paths));
        Ok(paths)
    }

    /// Resolve pieces to symbols. Boundaries become `>` only when kept.
    fn symbols(&self, pieces: &[Piece]) -> Result<Vec<Symbol>, CompileError> {
        let mut symbols = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match piece {
                Piece::Char(ch) => symbols.push(Symbol::Char(*ch)),
                Piece::Tag(name) => symbols.push(
                    self.alphabet
                        .tag(name)
                        .ok_or_else(|| CompileError::UndefinedTag(name.clone()))?,
                ),
                Piece::Boundary if self.options.keep_boundaries => symbols.push(Symbol::Char('>')),
                Piece::Boundary => {}
            }
        }
        Ok(symbols)
    }

    /// Align two sides, padding the shorter one with epsilon. The input side
    /// follows the compile direction.
    fn pair_path(&mut self, left: Vec<Symbol>, right: Vec<Symbol>) -> Path {
        let (input, output) = match self.options.direction {
            Direction::Forward => (left, right),
            Direction::Reverse => (right, left),
        };
        let len = input.len().max(output.len());
        (0..len)
            .map(|i| {
                let a = input.get(i).copied().unwrap_or(Symbol::Epsilon);
                let b = output.get(i).copied().unwrap_or(Symbol::Epsilon);
                self.alphabet.pair_code(a, b)
            })
            .collect()
    }
}

fn concatenate(prefixes: &[Path], suffixes: &[Path]) -> Vec<Path> {
    let mut out = Vec::with_capacity(prefixes.len() * suffixes.len());
    for prefix in prefixes {
        for suffix in suffixes {
            let mut path = prefix.clone();
            path.extend_from_slice(suffix);
            out.push(path);
        }
    }
    out
}
