// Transition records: packed file layout and the typed in-memory form.

use bytemuck::{Pod, Zeroable};
use ear_core::symbol::is_epsilon;

/// File value of a target that is the global virtual acceptor.
pub const END_STATE: u32 = u32::MAX;

/// File value of a transition that was never linked to a target state.
pub const UNDEF_STATE: u32 = u32::MAX - 1;

/// Transition record as stored in the model file (20 bytes).
///
/// - `start` (u32): source state number
/// - `end` (u32): target state number, [`END_STATE`] or [`UNDEF_STATE`]
/// - `input` (u32): acoustic state symbol, 0 for epsilon
/// - `output` (u32): event symbol, 0 for none
/// - `weight` (f32): log weight with the sign inverted by the assembler
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RawTransition {
    pub start: u32,
    pub end: u32,
    pub input: u32,
    pub output: u32,
    pub weight: f32,
}

impl RawTransition {
    pub fn new(start: u32, end: u32, input: u32, output: u32, weight: f32) -> Self {
        Self {
            start,
            end,
            input,
            output,
            weight,
        }
    }
}

const _: () = assert!(size_of::<RawTransition>() == 20);

/// Where a transition leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The virtual acceptor shared by every final state.
    End,
    /// Not linked to any state; traversal skips it.
    Unlinked,
    /// Index of the first transition of the target state.
    Position(usize),
}

/// Transition with its target resolved to a position in the network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub start: u32,
    pub target: Target,
    pub input: u32,
    pub output: u32,
    pub weight: f32,
}

impl Transition {
    /// Returns `true` if crossing this transition consumes no feature vector.
    #[inline]
    pub fn is_epsilon(&self) -> bool {
        is_epsilon(self.input)
    }

    /// Returns `true` if this transition carries an event symbol.
    #[inline]
    pub fn emits(&self) -> bool {
        !is_epsilon(self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_transition_size() {
        assert_eq!(size_of::<RawTransition>(), 20);
    }

    #[test]
    fn sentinels_are_distinct() {
        assert_ne!(END_STATE, UNDEF_STATE);
    }

    #[test]
    fn zero_copy_cast() {
        let mut raw = Vec::new();
        for v in [3u32, 4, 5, 6] {
            raw.extend_from_slice(&v.to_le_bytes());
        }
        raw.extend_from_slice(&(-2.5f32).to_le_bytes());

        let mut records = vec![RawTransition::zeroed(); 1];
        bytemuck::cast_slice_mut::<RawTransition, u8>(&mut records).copy_from_slice(&raw);
        assert_eq!(records[0], RawTransition::new(3, 4, 5, 6, -2.5));
    }

    #[test]
    fn epsilon_and_emitting() {
        let t = Transition {
            start: 0,
            target: Target::End,
            input: 0,
            output: 4,
            weight: 0.0,
        };
        assert!(t.is_epsilon());
        assert!(t.emits());

        let t = Transition {
            input: 2,
            output: 0,
            ..t
        };
        assert!(!t.is_epsilon());
        assert!(!t.emits());
    }
}
