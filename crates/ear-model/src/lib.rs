//! Binary model codec for the EAR acoustic event detector.
//!
//! A model file bundles the Gaussian-mixture acoustic model and the weighted
//! FST search network produced by the offline assembler. A side index file
//! maps output symbols to event names.
//!
//! # Architecture
//!
//! - [`format`] -- Header parsing and little-endian field access
//! - [`transition`] -- Zero-copy transition record layout and typed targets
//! - [`acoustic`] -- Gaussian mixture states and their components
//! - [`network`] -- Search network with targets re-indexed to positions
//! - [`index`] -- Event name index

pub mod acoustic;
pub mod format;
pub mod index;
pub mod network;
pub mod transition;

use acoustic::AcousticModel;
use network::Network;

/// Error type for model parsing and validation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("file too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("state {state} refers to pdf {index}, but the model has {count} pdfs")]
    PdfOutOfRange {
        state: usize,
        index: u32,
        count: usize,
    },
    #[error("pdf {pdf} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        pdf: usize,
        expected: usize,
        actual: usize,
    },
    #[error("transition {position} leads to state {state}, which has no outgoing transitions")]
    DanglingState { position: usize, state: u32 },
    #[error("invalid event index entry on line {line}")]
    InvalidIndexLine { line: usize },
}

/// Acoustic model and search network loaded from one binary model file.
#[derive(Debug)]
pub struct ModelFile {
    pub acoustic: AcousticModel,
    pub network: Network,
}

impl ModelFile {
    /// Parse a binary model file.
    ///
    /// Layout (little-endian, no padding):
    /// header, per-state pdf indices, pdf table, transition count, transitions.
    /// Trailing bytes after the last transition are ignored.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ModelError> {
        let header = format::parse_header(data)?;
        let mut reader = format::Reader::new(data);
        reader.skip(format::HEADER_SIZE)?;

        let acoustic = AcousticModel::read(&mut reader, &header)?;
        let network = Network::read(&mut reader)?;

        tracing::debug!(
            vector_size = acoustic.vector_size(),
            states = acoustic.state_count(),
            pdfs = acoustic.pdf_count(),
            transitions = network.len(),
            "loaded model file"
        );

        Ok(Self { acoustic, network })
    }

    /// Serialize into the binary model layout accepted by [`ModelFile::from_bytes`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.acoustic.header().write(&mut buf);
        self.acoustic.write(&mut buf);
        self.network.write(&mut buf);
        buf
    }
}
