// Search network: transition table with targets re-indexed to positions.

use bytemuck::Zeroable;
use hashbrown::HashMap;

use crate::ModelError;
use crate::format::Reader;
use crate::transition::{END_STATE, RawTransition, Target, Transition, UNDEF_STATE};

/// Weighted FST search network.
///
/// Transitions are grouped contiguously by start state. Each target is stored
/// as the position of the first transition of the target state, so moving to
/// a state and enumerating its outgoing edges is a single index.
///
/// The network must not contain a cycle made only of epsilon-input
/// transitions; the decoder follows epsilon edges recursively.
#[derive(Debug, Clone, Default)]
pub struct Network {
    transitions: Vec<Transition>,
}

impl Network {
    /// Build a network from records whose targets are state numbers.
    ///
    /// State 0 always resolves to position 0. A target state that starts no
    /// transition is rejected.
    pub fn from_raw(raw: &[RawTransition]) -> Result<Self, ModelError> {
        let mut first_position: HashMap<u32, usize> = HashMap::new();
        let mut current = 0u32;
        first_position.insert(current, 0);
        for (position, t) in raw.iter().enumerate() {
            if t.start != current {
                current = t.start;
                first_position.insert(current, position);
            }
        }

        let transitions = raw
            .iter()
            .enumerate()
            .map(|(position, t)| {
                let target = match t.end {
                    END_STATE => Target::End,
                    UNDEF_STATE => Target::Unlinked,
                    state => match first_position.get(&state) {
                        Some(&p) => Target::Position(p),
                        None => return Err(ModelError::DanglingState { position, state }),
                    },
                };
                Ok(Transition {
                    start: t.start,
                    target,
                    input: t.input,
                    output: t.output,
                    weight: t.weight,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { transitions })
    }

    /// Convert back to records whose targets are state numbers.
    pub fn to_raw(&self) -> Vec<RawTransition> {
        self.transitions
            .iter()
            .map(|t| {
                let end = match t.target {
                    Target::End => END_STATE,
                    Target::Unlinked => UNDEF_STATE,
                    Target::Position(p) => self.transitions[p].start,
                };
                RawTransition::new(t.start, end, t.input, t.output, t.weight)
            })
            .collect()
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self, ModelError> {
        let count = reader.read_u32()? as usize;
        let bytes = reader.take_records(count, size_of::<RawTransition>())?;

        // Copy into an aligned Vec; the records sit at an arbitrary offset.
        let mut raw = vec![RawTransition::zeroed(); count];
        bytemuck::cast_slice_mut::<RawTransition, u8>(&mut raw).copy_from_slice(bytes);

        Self::from_raw(&raw)
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>) {
        let raw = self.to_raw();
        buf.extend_from_slice(&(raw.len() as u32).to_le_bytes());
        buf.extend_from_slice(bytemuck::cast_slice::<RawTransition, u8>(raw.as_slice()));
    }

    /// Number of transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Transition at `position`.
    ///
    /// Panics if `position` is out of range.
    #[inline]
    pub fn transition(&self, position: usize) -> &Transition {
        &self.transitions[position]
    }

    /// Highest start state number, or `None` for an empty network.
    pub fn max_start_state(&self) -> Option<u32> {
        self.transitions.iter().map(|t| t.start).max()
    }

    /// Iterate the transitions leaving the state that starts at `position`.
    ///
    /// Yields `(position, transition)` pairs for the contiguous run sharing
    /// the start state of `position`, including unlinked ones.
    pub fn outgoing(&self, position: usize) -> Outgoing<'_> {
        let start = self.transitions.get(position).map(|t| t.start);
        Outgoing {
            transitions: &self.transitions,
            position,
            start,
        }
    }
}

/// Iterator over one state's outgoing transitions. See [`Network::outgoing`].
pub struct Outgoing<'a> {
    transitions: &'a [Transition],
    position: usize,
    start: Option<u32>,
}

impl<'a> Iterator for Outgoing<'a> {
    type Item = (usize, &'a Transition);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.start?;
        let t = self.transitions.get(self.position)?;
        if t.start != start {
            self.start = None;
            return None;
        }
        let item = (self.position, t);
        self.position += 1;
        Some(item)
    }
}
