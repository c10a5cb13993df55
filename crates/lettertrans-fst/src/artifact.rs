// Artifact: the complete binary file, one alphabet shared by named automata.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};

use crate::LtError;
use crate::alphabet::Alphabet;
use crate::compression::{read_string, read_varint, write_string, write_varint};
use crate::format::{CURRENT_FEATURES, FormatVersion};
use crate::transducer::Transducer;

/// A compiled dictionary.
///
/// Stream layout:
/// 1. optional header (see [`FormatVersion`])
/// 2. the [`Alphabet`]
/// 3. VarInt automaton count, then `(name, transducer)` entries in
///    ascending name order
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Layout the artifact was read with. Writing always uses the current one.
    pub format: FormatVersion,
    pub alphabet: Alphabet,
    pub automata: BTreeMap<String, Transducer>,
}

impl Default for Artifact {
    fn default() -> Self {
        Self::new()
    }
}

impl Artifact {
    pub fn new() -> Self {
        Self {
            format: FormatVersion::Versioned {
                features: CURRENT_FEATURES,
            },
            alphabet: Alphabet::new(),
            automata: BTreeMap::new(),
        }
    }

    pub fn from_parts(alphabet: Alphabet, automata: BTreeMap<String, Transducer>) -> Self {
        Self {
            alphabet,
            automata,
            ..Self::new()
        }
    }

    /// Read a complete artifact from the current stream position.
    ///
    /// Unknown feature flags are rejected before any of the body is read.
    pub fn read<R: Read + Seek>(r: &mut R) -> Result<Self, LtError> {
        let format = FormatVersion::detect(r)?;
        let features = format.features();
        log::debug!("artifact layout {format:?}");

        let alphabet = Alphabet::read(r)?;

        let count = read_varint(r)?;
        let mut automata = BTreeMap::new();
        for _ in 0..count {
            let name = read_string(r)?;
            let transducer = Transducer::read(r, &alphabet, features)?;
            log::debug!(
                "read automaton {name}: {} states, {} transitions",
                transducer.state_count(),
                transducer.transition_count()
            );
            if automata.insert(name.clone(), transducer).is_some() {
                return Err(LtError::Corrupt(format!("duplicate automaton name {name}")));
            }
        }

        Ok(Self {
            format,
            alphabet,
            automata,
        })
    }

    /// Parse an artifact held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self, LtError> {
        Self::read(&mut Cursor::new(data))
    }

    /// Write the artifact with the current header and feature set.
    pub fn write<W: Write + ?Sized>(&self, w: &mut W) -> Result<(), LtError> {
        self.write_as(
            w,
            FormatVersion::Versioned {
                features: CURRENT_FEATURES,
            },
        )
    }

    pub(crate) fn write_as<W: Write + ?Sized>(
        &self,
        w: &mut W,
        format: FormatVersion,
    ) -> Result<(), LtError> {
        format.write(w)?;
        self.alphabet.write(w)?;
        write_varint(w, self.automata.len() as u64)?;
        for (name, transducer) in &self.automata {
            write_string(w, name)?;
            transducer.write(w, format.features())?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LtError> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(buf)
    }
}
