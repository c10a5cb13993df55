// Alphabet: letters, interned tags and the symbol-pair code table.
//
// Transition labels are pair codes: dense indices into a table of
// (input symbol, output symbol) pairs. The table is shared by every
// transducer of one artifact.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use hashbrown::HashMap;

use crate::LtError;
use crate::compression::{
    read_char, read_string, read_varint, read_varint_u32, write_string, write_varint,
};

/// One side of a transition label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// The empty symbol.
    Epsilon,
    /// A literal character.
    Char(char),
    /// A tag, identified by its index in the alphabet's tag list.
    Tag(u32),
}

/// Symbol tables for one artifact.
///
/// Serialized layout:
/// 1. VarInt letter count, then one VarInt code point per letter
/// 2. VarInt tag count, then each tag name as a string (no angle brackets)
/// 3. VarInt pair count, then each pair as two VarInt symbol codes
///
/// Symbol codes: `0` is epsilon, `1 + i` is tag `i`, and
/// `1 + tag_count + code_point` is a character.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alphabet {
    letters: BTreeSet<char>,
    tags: Vec<String>,
    tag_index: HashMap<String, u32>,
    pairs: Vec<(Symbol, Symbol)>,
    pair_index: HashMap<(Symbol, Symbol), u32>,
}

impl Alphabet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a character as a letter of the dictionary's alphabet.
    pub fn add_letter(&mut self, ch: char) {
        self.letters.insert(ch);
    }

    /// The declared letters, in code point order.
    pub fn letters(&self) -> &BTreeSet<char> {
        &self.letters
    }

    /// Return the tag symbol for `name`, interning it on first use.
    ///
    /// `name` is the bare tag name (`n`, not `<n>`).
    pub fn intern_tag(&mut self, name: &str) -> Symbol {
        if let Some(&id) = self.tag_index.get(name) {
            return Symbol::Tag(id);
        }
        let id = self.tags.len() as u32;
        self.tags.push(name.to_string());
        self.tag_index.insert(name.to_string(), id);
        Symbol::Tag(id)
    }

    /// Look up an already interned tag.
    pub fn tag(&self, name: &str) -> Option<Symbol> {
        self.tag_index.get(name).map(|&id| Symbol::Tag(id))
    }

    pub fn tag_name(&self, id: u32) -> Option<&str> {
        self.tags.get(id as usize).map(String::as_str)
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Return the code for the pair `(input, output)`, interning it on first use.
    pub fn pair_code(&mut self, input: Symbol, output: Symbol) -> u32 {
        if let Some(&code) = self.pair_index.get(&(input, output)) {
            return code;
        }
        let code = self.pairs.len() as u32;
        self.pairs.push((input, output));
        self.pair_index.insert((input, output), code);
        code
    }

    pub fn lookup_pair(&self, input: Symbol, output: Symbol) -> Option<u32> {
        self.pair_index.get(&(input, output)).copied()
    }

    /// Decode a transition label back into its symbol pair.
    pub fn decode(&self, code: u32) -> Option<(Symbol, Symbol)> {
        self.pairs.get(code as usize).copied()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Textual form of a symbol: tags as `<name>`, epsilon as the empty string.
    pub fn symbol_text(&self, symbol: Symbol) -> String {
        match symbol {
            Symbol::Epsilon => String::new(),
            Symbol::Char(ch) => ch.to_string(),
            Symbol::Tag(id) => match self.tag_name(id) {
                Some(name) => format!("<{name}>"),
                None => format!("<#{id}>"),
            },
        }
    }

    fn symbol_code(&self, symbol: Symbol) -> u64 {
        match symbol {
            Symbol::Epsilon => 0,
            Symbol::Tag(id) => 1 + u64::from(id),
            Symbol::Char(ch) => 1 + self.tags.len() as u64 + u64::from(u32::from(ch)),
        }
    }

    fn symbol_from_code(&self, code: u64) -> Result<Symbol, LtError> {
        let tag_count = self.tags.len() as u64;
        if code == 0 {
            Ok(Symbol::Epsilon)
        } else if code <= tag_count {
            Ok(Symbol::Tag((code - 1) as u32))
        } else {
            let cp = code - 1 - tag_count;
            u32::try_from(cp)
                .ok()
                .and_then(char::from_u32)
                .map(Symbol::Char)
                .ok_or(LtError::InvalidCodePoint(cp))
        }
    }

    /// Write the alphabet in the layout described on [`Alphabet`].
    pub fn write<W: Write + ?Sized>(&self, w: &mut W) -> Result<(), LtError> {
        write_varint(w, self.letters.len() as u64)?;
        for &ch in &self.letters {
            write_varint(w, u64::from(u32::from(ch)))?;
        }

        write_varint(w, self.tags.len() as u64)?;
        for name in &self.tags {
            write_string(w, name)?;
        }

        write_varint(w, self.pairs.len() as u64)?;
        for &(input, output) in &self.pairs {
            write_varint(w, self.symbol_code(input))?;
            write_varint(w, self.symbol_code(output))?;
        }
        Ok(())
    }

    /// Read an alphabet written by [`Alphabet::write`].
    pub fn read<R: Read + ?Sized>(r: &mut R) -> Result<Self, LtError> {
        let mut alphabet = Alphabet::new();

        let letter_count = read_varint(r)?;
        for _ in 0..letter_count {
            alphabet.add_letter(read_char(r)?);
        }

        let tag_count = read_varint(r)?;
        for _ in 0..tag_count {
            let name = read_string(r)?;
            if alphabet.tag(&name).is_some() {
                return Err(LtError::Corrupt(format!("duplicate tag <{name}>")));
            }
            alphabet.intern_tag(&name);
        }

        let pair_count = read_varint_u32(r, "pair count")?;
        for _ in 0..pair_count {
            let input = alphabet.symbol_from_code(read_varint(r)?)?;
            let output = alphabet.symbol_from_code(read_varint(r)?)?;
            if alphabet.lookup_pair(input, output).is_some() {
                return Err(LtError::Corrupt("duplicate symbol pair".to_string()));
            }
            alphabet.pair_code(input, output);
        }

        Ok(alphabet)
    }
}
