// Letter transducer: states, labelled transitions and final states.
//
// Labels are pair codes of the artifact's shared `Alphabet`. The transducer
// never owns symbol tables; every operation that needs them borrows one.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::alphabet::{Alphabet, Symbol};
use crate::compression::{read_varint_u32, read_weight, write_varint, write_weight};
use crate::format::FEATURE_WEIGHTS;
use crate::{LtError, StateId, Weight};

/// One outgoing transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Pair code in the shared alphabet.
    pub label: u32,
    pub target: StateId,
    pub weight: Weight,
}

/// A finite-state letter transducer.
///
/// State 0 is always the initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct Transducer {
    states: Vec<Vec<Transition>>,
    finals: BTreeMap<StateId, Weight>,
}

impl Default for Transducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transducer {
    /// Create a transducer holding only the initial state.
    pub fn new() -> Self {
        Self {
            states: vec![Vec::new()],
            finals: BTreeMap::new(),
        }
    }

    pub fn initial(&self) -> StateId {
        0
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Add a new state with no transitions and return its id.
    pub fn add_state(&mut self) -> StateId {
        self.states.push(Vec::new());
        (self.states.len() - 1) as StateId
    }

    /// Add a transition. Both endpoints must already exist.
    ///
    /// Adding an identical transition twice is a no-op.
    pub fn add_transition(&mut self, from: StateId, label: u32, to: StateId, weight: Weight) {
        debug_assert!((to as usize) < self.states.len());
        let list = &mut self.states[from as usize];
        let t = Transition {
            label,
            target: to,
            weight,
        };
        if !list.contains(&t) {
            list.push(t);
        }
    }

    /// Target of the first transition from `from` labelled `label`.
    pub fn transition_target(&self, from: StateId, label: u32) -> Option<StateId> {
        self.states[from as usize]
            .iter()
            .find(|t| t.label == label)
            .map(|t| t.target)
    }

    /// Follow `label` from `from`, creating a fresh target state if no
    /// transition exists yet. Used to insert paths as a prefix tree.
    pub fn insert_single(&mut self, from: StateId, label: u32) -> StateId {
        if let Some(target) = self.transition_target(from, label) {
            return target;
        }
        let target = self.add_state();
        self.add_transition(from, label, target, 0.0);
        target
    }

    pub fn transitions(&self, state: StateId) -> &[Transition] {
        &self.states[state as usize]
    }

    /// Mark `state` as final. A later call overrides the weight.
    pub fn set_final(&mut self, state: StateId, weight: Weight) {
        self.finals.insert(state, weight);
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains_key(&state)
    }

    pub fn finals(&self) -> &BTreeMap<StateId, Weight> {
        &self.finals
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(Vec::len).sum()
    }

    /// Accepting states as they are rendered on export.
    ///
    /// Every final state appears once, in ascending order, with its weight,
    /// whether or not it is reachable from the initial state. The transducer
    /// is left untouched, so calling this any number of times yields the
    /// same result.
    pub fn join_finals(&self) -> Vec<(StateId, Weight)> {
        self.finals
            .iter()
            .map(|(&state, &weight)| (state, weight))
            .collect()
    }

    /// For every transition whose input is a character listed in
    /// `equivalents`, add a parallel transition on each equivalent
    /// character with the same output, target and weight.
    pub fn add_equivalent_transitions(
        &mut self,
        alphabet: &mut Alphabet,
        equivalents: &BTreeMap<char, Vec<char>>,
    ) {
        for state in 0..self.states.len() {
            let existing = self.states[state].clone();
            for t in existing {
                let Some((Symbol::Char(ch), output)) = alphabet.decode(t.label) else {
                    continue;
                };
                let Some(chars) = equivalents.get(&ch) else {
                    continue;
                };
                for &equiv in chars {
                    let label = alphabet.pair_code(Symbol::Char(equiv), output);
                    self.add_transition(state as StateId, label, t.target, t.weight);
                }
            }
        }
    }

    /// Write the transducer body.
    ///
    /// Layout: VarInt state count; per state a VarInt transition count and,
    /// sorted by `(label, target)`, the label as a delta from the previous
    /// label, the absolute target and (with `FEATURE_WEIGHTS`) the weight;
    /// then a VarInt final count and each final as a delta from the previous
    /// final, followed by its weight when weighted.
    pub fn write<W: Write + ?Sized>(&self, w: &mut W, features: u64) -> Result<(), LtError> {
        let weighted = features & FEATURE_WEIGHTS != 0;

        write_varint(w, self.states.len() as u64)?;
        for list in &self.states {
            let mut sorted = list.clone();
            sorted.sort_by(|a, b| (a.label, a.target).cmp(&(b.label, b.target)));

            write_varint(w, sorted.len() as u64)?;
            let mut base = 0u32;
            for t in &sorted {
                write_varint(w, u64::from(t.label - base))?;
                base = t.label;
                write_varint(w, u64::from(t.target))?;
                if weighted {
                    write_weight(w, t.weight)?;
                }
            }
        }

        write_varint(w, self.finals.len() as u64)?;
        let mut base = 0u32;
        for (&state, &weight) in &self.finals {
            write_varint(w, u64::from(state - base))?;
            base = state;
            if weighted {
                write_weight(w, weight)?;
            }
        }
        Ok(())
    }

    /// Read a transducer body written by [`Transducer::write`].
    ///
    /// Labels are checked against `alphabet`; targets and finals against the
    /// state count. Unweighted data reads back with weight `0.0`.
    pub fn read<R: Read + ?Sized>(
        r: &mut R,
        alphabet: &Alphabet,
        features: u64,
    ) -> Result<Self, LtError> {
        let weighted = features & FEATURE_WEIGHTS != 0;
        let pair_count = alphabet.pair_count() as u64;

        let state_count = read_varint_u32(r, "state count")?;
        if state_count == 0 {
            return Err(LtError::Corrupt("transducer without states".to_string()));
        }

        let mut states = Vec::with_capacity(state_count.min(1 << 16) as usize);
        for _ in 0..state_count {
            let transition_count = read_varint_u32(r, "transition count")?;
            let mut list = Vec::with_capacity(transition_count.min(1 << 12) as usize);
            let mut base = 0u64;
            for _ in 0..transition_count {
                let label = base + u64::from(read_varint_u32(r, "label")?);
                if label >= pair_count {
                    return Err(LtError::Corrupt(format!("unknown label {label}")));
                }
                base = label;
                let target = read_varint_u32(r, "target state")?;
                if target >= state_count {
                    return Err(LtError::Corrupt(format!("target state {target} out of range")));
                }
                let weight = if weighted { read_weight(r)? } else { 0.0 };
                list.push(Transition {
                    label: label as u32,
                    target,
                    weight,
                });
            }
            states.push(list);
        }

        let final_count = read_varint_u32(r, "final count")?;
        let mut finals = BTreeMap::new();
        let mut base = 0u64;
        for _ in 0..final_count {
            let state = base + u64::from(read_varint_u32(r, "final state")?);
            if state >= u64::from(state_count) {
                return Err(LtError::Corrupt(format!("final state {state} out of range")));
            }
            base = state;
            let weight = if weighted { read_weight(r)? } else { 0.0 };
            finals.insert(state as StateId, weight);
        }

        Ok(Self { states, finals })
    }

    /// Return a copy with every state's transitions in `(label, target)`
    /// order, the order in which they are written and read back.
    pub fn normalized(&self) -> Self {
        let mut copy = self.clone();
        for list in &mut copy.states {
            list.sort_by(|a, b| (a.label, a.target).cmp(&(b.label, b.target)));
        }
        copy
    }
}
