// Flat front-end: tab-separated transition lists.
//
// Line forms:
//   from<TAB>to<TAB>input<TAB>output[<TAB>weight]   transition
//   state[<TAB>weight]                               final state
//   --                                               end of automaton
//
// The first state mentioned in a block is its initial state. State numbers
// are renumbered densely in order of appearance.

use hashbrown::HashMap;
use lettertrans_fst::{Alphabet, Artifact, StateId, Symbol, Transducer, Weight};

use crate::CompileError;
use crate::options::{CompileOptions, Direction};

/// Name given to the first automaton of a flat source.
pub const FIRST_AUTOMATON: &str = "main@standard";

fn automaton_name(index: usize) -> String {
    if index == 0 {
        FIRST_AUTOMATON.to_string()
    } else {
        format!("main-{}@standard", index + 1)
    }
}

/// One automaton being read, with its source-to-dense state mapping.
struct Block {
    transducer: Transducer,
    states: HashMap<u64, StateId>,
    lines: usize,
}

impl Block {
    fn new() -> Self {
        Self {
            transducer: Transducer::new(),
            states: HashMap::new(),
            lines: 0,
        }
    }

    fn state(&mut self, number: u64) -> StateId {
        if let Some(&id) = self.states.get(&number) {
            return id;
        }
        // The initial state already exists; map the first number onto it.
        let id = if self.states.is_empty() {
            self.transducer.initial()
        } else {
            self.transducer.add_state()
        };
        self.states.insert(number, id);
        id
    }
}

/// Compile a flat source into an artifact.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Artifact, CompileError> {
    let mut artifact = Artifact::new();
    let mut block = Block::new();
    let mut index = 0;

    for (number, raw) in source.lines().enumerate() {
        let line = number + 1;
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        if text.trim().is_empty() {
            continue;
        }
        if text.trim() == "--" {
            if block.lines > 0 {
                finish_block(&mut artifact, block, index);
                index += 1;
            }
            block = Block::new();
            continue;
        }

        let fields: Vec<&str> = text.split('\t').collect();
        match fields.len() {
            1 | 2 => {
                let state = parse_state(fields[0], line)?;
                let weight = parse_weight(fields.get(1).copied(), line)?;
                let id = block.state(state);
                block.transducer.set_final(id, weight);
            }
            4 | 5 => {
                let from = block.state(parse_state(fields[0], line)?);
                let to = block.state(parse_state(fields[1], line)?);
                let left = parse_symbol(fields[2], &mut artifact.alphabet, options, line)?;
                let right = parse_symbol(fields[3], &mut artifact.alphabet, options, line)?;
                let weight = parse_weight(fields.get(4).copied(), line)?;
                let (input, output) = match options.direction {
                    Direction::Forward => (left, right),
                    Direction::Reverse => (right, left),
                };
                let label = artifact.alphabet.pair_code(input, output);
                block.transducer.add_transition(from, label, to, weight);
            }
            n => {
                return Err(CompileError::Flat {
                    line,
                    message: format!("expected 1, 2, 4 or 5 tab-separated fields, found {n}"),
                });
            }
        }
        block.lines += 1;
    }

    if block.lines > 0 {
        finish_block(&mut artifact, block, index);
    }
    Ok(artifact)
}

fn finish_block(artifact: &mut Artifact, block: Block, index: usize) {
    let name = automaton_name(index);
    log::debug!(
        "flat automaton {name}: {} states, {} transitions",
        block.transducer.state_count(),
        block.transducer.transition_count()
    );
    artifact.automata.insert(name, block.transducer);
}

fn parse_state(field: &str, line: usize) -> Result<u64, CompileError> {
    field.trim().parse().map_err(|_| CompileError::Flat {
        line,
        message: format!("invalid state number '{field}'"),
    })
}

fn parse_weight(field: Option<&str>, line: usize) -> Result<Weight, CompileError> {
    match field.map(str::trim) {
        None | Some("") => Ok(0.0),
        Some(text) => text.parse().map_err(|_| CompileError::Flat {
            line,
            message: format!("invalid weight '{text}'"),
        }),
    }
}

/// Parse one symbol field.
///
/// `@0@` is epsilon, and so is `ε` unless `extended_symbols` is set, in
/// which case `ε` is a literal letter. `@_SPACE_@`/`@_TAB_@` are blanks,
/// `<name>` is a tag, a single character is a literal. Other multi-character
/// symbols are tags only with `extended_symbols`.
fn parse_symbol(
    field: &str,
    alphabet: &mut Alphabet,
    options: &CompileOptions,
    line: usize,
) -> Result<Symbol, CompileError> {
    match field {
        "@0@" => return Ok(Symbol::Epsilon),
        "\u{03b5}" if !options.extended_symbols => return Ok(Symbol::Epsilon),
        "@_SPACE_@" => return Ok(Symbol::Char(' ')),
        "@_TAB_@" => return Ok(Symbol::Char('\t')),
        _ => {}
    }

    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err(CompileError::Flat {
            line,
            message: "empty symbol".to_string(),
        }),
        (Some(ch), None) => {
            if ch.is_alphabetic() {
                alphabet.add_letter(ch);
            }
            Ok(Symbol::Char(ch))
        }
        _ if field.len() > 2 && field.starts_with('<') && field.ends_with('>') => {
            Ok(alphabet.intern_tag(&field[1..field.len() - 1]))
        }
        _ if options.extended_symbols => Ok(alphabet.intern_tag(field)),
        _ => Err(CompileError::Flat {
            line,
            message: format!("multi-character symbol '{field}' is not a <tag>"),
        }),
    }
}
