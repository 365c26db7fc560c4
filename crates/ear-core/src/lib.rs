//! Shared value types for the EAR acoustic event detector.
//!
//! - [`symbol`] -- reserved symbol and state numbers of the search network
//! - [`detection`] -- event hypotheses reported by the decoder

pub mod detection;
pub mod symbol;

pub use detection::Detection;
