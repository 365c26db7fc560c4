//! Token-passing Viterbi decoder for acoustic event detection.
//!
//! Feature vectors are decoded one frame at a time against a weighted FST
//! whose input symbols name Gaussian-mixture acoustic states. The decoder
//! keeps the best token per network state and reconstructs the detected
//! events by walking the predecessor links of the token at the virtual end
//! state.
//!
//! # Architecture
//!
//! - [`scorer`] -- Per-frame acoustic scoring with a state score cache
//! - [`token`] -- Search lattice nodes and their reference-counted arena
//! - [`search`] -- Double-buffered Viterbi search and result backtrace
//! - [`session`] -- Streaming driver that reports events and bounds memory
//!
//! The decoder is single-threaded and performs no logging.

pub mod scorer;
pub mod search;
pub mod session;
pub mod token;

#[cfg(test)]
mod fixtures;

pub use scorer::AcousticScorer;
pub use search::Search;
pub use session::{DetectorSession, SessionOptions};

/// Error type for decoding.
///
/// End of input and a malformed vector are distinct variants; callers that
/// treat an empty vector as the end of the stream match on
/// [`SearchError::EndOfInput`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The feature vector does not match the acoustic model dimensionality.
    #[error("feature vector has {actual} dimensions, acoustic model expects {expected}")]
    ModelMismatch { expected: usize, actual: usize },
    /// An empty feature vector was supplied.
    #[error("end of input")]
    EndOfInput,
    /// The search network has no transitions to decode against.
    #[error("search network has no transitions")]
    InvalidNetwork,
    /// A transition consumes an acoustic state the model does not define.
    #[error("input symbol {symbol} does not name one of the {states} acoustic states")]
    UnknownAcousticState { symbol: u32, states: usize },
}
