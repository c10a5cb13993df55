// Tab-separated text export of compiled transducers.
//
// Each transition is one line `from\tto\tinput\toutput\tweight`, followed
// by one `state\tweight` line per accepting state. Automata are printed in
// ascending name order and separated by a `--` line.

use std::io::Write;

use crate::alphabet::{Alphabet, Symbol};
use crate::artifact::Artifact;
use crate::transducer::Transducer;
use crate::{LtError, Weight};

/// Line printed between two automata.
pub const SEPARATOR: &str = "--";

/// How symbols that clash with the notation are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escaping {
    /// Epsilon as `ε`; only tabs are escaped.
    #[default]
    Plain,
    /// Epsilon as `@0@`, spaces and tabs as `@_SPACE_@` / `@_TAB_@`.
    Extended,
}

impl Escaping {
    pub fn from_extended(extended: bool) -> Self {
        if extended {
            Escaping::Extended
        } else {
            Escaping::Plain
        }
    }
}

/// Render one symbol for the text notation.
pub fn symbol_to_text(alphabet: &Alphabet, symbol: Symbol, escaping: Escaping) -> String {
    match (symbol, escaping) {
        (Symbol::Epsilon, Escaping::Plain) => "\u{03b5}".to_string(),
        (Symbol::Epsilon, Escaping::Extended) => "@0@".to_string(),
        (Symbol::Char('\t'), _) => "@_TAB_@".to_string(),
        (Symbol::Char(' '), Escaping::Extended) => "@_SPACE_@".to_string(),
        _ => alphabet.symbol_text(symbol),
    }
}

fn format_weight(weight: Weight) -> String {
    format!("{weight:.6}")
}

/// Print a single transducer.
pub fn print_transducer<W: Write + ?Sized>(
    out: &mut W,
    alphabet: &Alphabet,
    transducer: &Transducer,
    escaping: Escaping,
) -> Result<(), LtError> {
    let transducer = transducer.normalized();
    for from in 0..transducer.state_count() as u32 {
        for t in transducer.transitions(from) {
            let (input, output) = alphabet
                .decode(t.label)
                .ok_or_else(|| LtError::Corrupt(format!("unknown label {}", t.label)))?;
            writeln!(
                out,
                "{from}\t{}\t{}\t{}\t{}",
                t.target,
                symbol_to_text(alphabet, input, escaping),
                symbol_to_text(alphabet, output, escaping),
                format_weight(t.weight)
            )?;
        }
    }
    for (state, weight) in transducer.join_finals() {
        writeln!(out, "{state}\t{}", format_weight(weight))?;
    }
    Ok(())
}

/// Print every automaton of `artifact`, separated by [`SEPARATOR`] lines.
pub fn print_artifact<W: Write + ?Sized>(
    out: &mut W,
    artifact: &Artifact,
    escaping: Escaping,
) -> Result<(), LtError> {
    for (i, transducer) in artifact.automata.values().enumerate() {
        if i > 0 {
            writeln!(out, "{SEPARATOR}")?;
        }
        print_transducer(out, &artifact.alphabet, transducer, escaping)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn single_path(alphabet: &mut Alphabet, pairs: &[(Symbol, Symbol)]) -> Transducer {
        let mut t = Transducer::new();
        let mut state = t.initial();
        for &(input, output) in pairs {
            let label = alphabet.pair_code(input, output);
            state = t.insert_single(state, label);
        }
        t.set_final(state, 0.0);
        t
    }

    fn render(artifact: &Artifact, escaping: Escaping) -> String {
        let mut out = Vec::new();
        print_artifact(&mut out, artifact, escaping).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn print_single_automaton() {
        let mut alphabet = Alphabet::new();
        let n = alphabet.intern_tag("n");
        let t = single_path(
            &mut alphabet,
            &[(Symbol::Char('a'), Symbol::Char('a')), (Symbol::Epsilon, n)],
        );
        let artifact = Artifact::from_parts(alphabet, BTreeMap::from([("main".to_string(), t)]));
        assert_eq!(
            render(&artifact, Escaping::Plain),
            "0\t1\ta\ta\t0.000000\n1\t2\t\u{03b5}\t<n>\t0.000000\n2\t0.000000\n"
        );
        assert_eq!(
            render(&artifact, Escaping::Extended),
            "0\t1\ta\ta\t0.000000\n1\t2\t@0@\t<n>\t0.000000\n2\t0.000000\n"
        );
    }

    #[test]
    fn automata_sorted_by_name_with_separators() {
        let mut alphabet = Alphabet::new();
        let mut automata = BTreeMap::new();
        for name in ["b", "a", "c"] {
            let ch = name.chars().next().unwrap();
            let t = single_path(&mut alphabet, &[(Symbol::Char(ch), Symbol::Char(ch))]);
            automata.insert(name.to_string(), t);
        }
        let artifact = Artifact::from_parts(alphabet, automata);
        let text = render(&artifact, Escaping::Plain);
        assert_eq!(
            text,
            "0\t1\ta\ta\t0.000000\n1\t0.000000\n--\n\
             0\t1\tb\tb\t0.000000\n1\t0.000000\n--\n\
             0\t1\tc\tc\t0.000000\n1\t0.000000\n"
        );
        assert!(!text.ends_with("--\n"));
    }

    #[test]
    fn escapes_blank_characters() {
        let mut alphabet = Alphabet::new();
        let t = single_path(&mut alphabet, &[(Symbol::Char(' '), Symbol::Char('\t'))]);
        let artifact = Artifact::from_parts(alphabet, BTreeMap::from([("x".to_string(), t)]));
        assert!(render(&artifact, Escaping::Plain).starts_with("0\t1\t \t@_TAB_@\t"));
        assert!(render(&artifact, Escaping::Extended).starts_with("0\t1\t@_SPACE_@\t@_TAB_@\t"));
    }

    #[test]
    fn printing_twice_is_identical() {
        let mut alphabet = Alphabet::new();
        let mut t = single_path(&mut alphabet, &[(Symbol::Char('x'), Symbol::Epsilon)]);
        t.set_final(0, 2.0);
        let artifact = Artifact::from_parts(alphabet, BTreeMap::from([("x".to_string(), t)]));
        let first = render(&artifact, Escaping::Plain);
        let second = render(&artifact, Escaping::Plain);
        assert_eq!(first, second);
        assert!(first.ends_with("0\t2.000000\n1\t0.000000\n"));
    }

    #[test]
    fn empty_artifact_prints_nothing() {
        assert_eq!(render(&Artifact::new(), Escaping::Plain), "");
    }
}
