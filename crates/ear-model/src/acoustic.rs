// Gaussian mixture acoustic model: states and their diagonal-covariance pdfs.

use crate::ModelError;
use crate::format::{ModelHeader, Reader};

/// File value of an empty pdf slot (a component dropped during training).
pub const NO_PDF: u32 = u32::MAX;

/// One diagonal-covariance Gaussian component.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdf {
    /// Inverted variance per dimension.
    pub inv_variance: Vec<f32>,
    pub mean: Vec<f32>,
    /// Precomputed normalisation term, `ln((2π)^n |Σ|)`.
    pub gconst: f32,
    /// Mixture weight among the components of a state.
    pub weight: f32,
}

impl Pdf {
    pub fn new(inv_variance: Vec<f32>, mean: Vec<f32>, gconst: f32, weight: f32) -> Self {
        Self {
            inv_variance,
            mean,
            gconst,
            weight,
        }
    }
}

/// Acoustic model referenced by the input symbols of the search network.
///
/// Input symbol `s` of the network scores state `s - 1`; symbol 0 is epsilon.
#[derive(Debug, Clone)]
pub struct AcousticModel {
    vector_size: usize,
    pdfs_per_state: usize,
    /// Pdf slots per state, 0-based; `None` marks a missing component.
    states: Vec<Vec<Option<usize>>>,
    pdfs: Vec<Pdf>,
}

impl AcousticModel {
    /// Build a model, checking pdf dimensions and slot references.
    ///
    /// States may list fewer slots than the widest state; the file form pads
    /// them with empty slots.
    pub fn new(
        vector_size: usize,
        states: Vec<Vec<Option<usize>>>,
        pdfs: Vec<Pdf>,
    ) -> Result<Self, ModelError> {
        for (i, pdf) in pdfs.iter().enumerate() {
            for len in [pdf.inv_variance.len(), pdf.mean.len()] {
                if len != vector_size {
                    return Err(ModelError::DimensionMismatch {
                        pdf: i,
                        expected: vector_size,
                        actual: len,
                    });
                }
            }
        }
        for (state, slots) in states.iter().enumerate() {
            if let Some(&index) = slots.iter().flatten().find(|&&p| p >= pdfs.len()) {
                return Err(ModelError::PdfOutOfRange {
                    state,
                    index: index as u32 + 1,
                    count: pdfs.len(),
                });
            }
        }
        let pdfs_per_state = states.iter().map(Vec::len).max().unwrap_or(0);
        Ok(Self {
            vector_size,
            pdfs_per_state,
            states,
            pdfs,
        })
    }

    pub(crate) fn read(reader: &mut Reader<'_>, header: &ModelHeader) -> Result<Self, ModelError> {
        let vector_size = header.vector_size as usize;
        let state_count = header.state_count as usize;
        let pdf_count = header.pdf_count as usize;
        let per_state = header.pdfs_per_state as usize;

        // Pdf indices in the file are 1-based.
        let table = reader.take_records(state_count, per_state.saturating_mul(4))?;
        let mut states = Vec::with_capacity(state_count);
        for (state, row) in table.chunks_exact(per_state.max(1) * 4).enumerate() {
            let mut slots = Vec::with_capacity(per_state);
            for b in row.chunks_exact(4) {
                let index = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
                if index == NO_PDF {
                    slots.push(None);
                } else if index == 0 || index as usize > pdf_count {
                    return Err(ModelError::PdfOutOfRange {
                        state,
                        index,
                        count: pdf_count,
                    });
                } else {
                    slots.push(Some(index as usize - 1));
                }
            }
            states.push(slots);
        }
        // A zero slot width leaves the table empty; keep one (empty) row per state.
        states.resize_with(state_count, Vec::new);

        let record = vector_size.saturating_mul(8).saturating_add(8);
        let mut pdf_reader = Reader::new(reader.take_records(pdf_count, record)?);
        let mut pdfs = Vec::with_capacity(pdf_count);
        for _ in 0..pdf_count {
            let inv_variance = pdf_reader.read_f32s(vector_size)?;
            let mean = pdf_reader.read_f32s(vector_size)?;
            let gconst = pdf_reader.read_f32()?;
            let weight = pdf_reader.read_f32()?;
            pdfs.push(Pdf::new(inv_variance, mean, gconst, weight));
        }

        Ok(Self {
            vector_size,
            pdfs_per_state: per_state,
            states,
            pdfs,
        })
    }

    /// Header describing this model in the file layout.
    pub fn header(&self) -> ModelHeader {
        ModelHeader {
            vector_size: self.vector_size as u16,
            state_count: self.states.len() as u32,
            pdf_count: self.pdfs.len() as u32,
            pdfs_per_state: self.pdfs_per_state as u32,
        }
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>) {
        for slots in &self.states {
            for i in 0..self.pdfs_per_state {
                let index = match slots.get(i).copied().flatten() {
                    Some(p) => p as u32 + 1,
                    None => NO_PDF,
                };
                buf.extend_from_slice(&index.to_le_bytes());
            }
        }
        for pdf in &self.pdfs {
            for v in pdf.inv_variance.iter().chain(&pdf.mean) {
                buf.extend_from_slice(&v.to_le_bytes());
            }
            buf.extend_from_slice(&pdf.gconst.to_le_bytes());
            buf.extend_from_slice(&pdf.weight.to_le_bytes());
        }
    }

    /// Feature vector dimensionality.
    pub fn vector_size(&self) -> usize {
        self.vector_size
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn pdf_count(&self) -> usize {
        self.pdfs.len()
    }

    /// Width of the per-state slot table.
    pub fn pdfs_per_state(&self) -> usize {
        self.pdfs_per_state
    }

    /// Slots of `state`, 0-based.
    pub fn state(&self, state: usize) -> &[Option<usize>] {
        &self.states[state]
    }

    pub fn pdf(&self, index: usize) -> &Pdf {
        &self.pdfs[index]
    }

    /// Present mixture components of `state`, skipping empty slots.
    pub fn components(&self, state: usize) -> impl Iterator<Item = &Pdf> + '_ {
        self.states[state].iter().flatten().map(|&p| &self.pdfs[p])
    }
}
