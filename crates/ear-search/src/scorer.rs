// Per-frame acoustic scoring with a state-indexed score cache.

use ear_model::acoustic::AcousticModel;

use crate::SearchError;

/// Score of a state that has no mixture component left.
const NO_COMPONENT_SCORE: f32 = -1.0e10;

/// Scores acoustic states against the current feature vector.
///
/// A state's score is the best of its mixture components,
/// `-0.5 * (gconst + Σ (x_j - mean_j)² * invVar_j) + ln(weight)`, summed over
/// dimensions from `strip_offset` on. Components are combined by maximum,
/// not by summing their likelihoods. Each state is computed at most once per
/// frame.
pub struct AcousticScorer<'m> {
    model: &'m AcousticModel,
    strip_offset: usize,
    vector: Vec<f32>,
    /// `None` until the state has been scored against the current vector.
    cache: Vec<Option<f32>>,
}

impl<'m> AcousticScorer<'m> {
    /// Bind `model`. The leading `strip_offset` coefficients of every vector
    /// (e.g. C0 or energy) stay in the vector but are excluded from scoring.
    ///
    /// Until [`set_vector`](Self::set_vector) is called, states score against
    /// an all-zero vector.
    pub fn new(model: &'m AcousticModel, strip_offset: usize) -> Self {
        Self {
            model,
            strip_offset,
            vector: vec![0.0; model.vector_size()],
            cache: vec![None; model.state_count()],
        }
    }

    pub fn model(&self) -> &'m AcousticModel {
        self.model
    }

    pub fn strip_offset(&self) -> usize {
        self.strip_offset
    }

    /// Make `vector` the current frame and invalidate the score cache.
    ///
    /// On a dimensionality mismatch nothing changes.
    pub fn set_vector(&mut self, vector: &[f32]) -> Result<(), SearchError> {
        if vector.len() != self.model.vector_size() {
            return Err(SearchError::ModelMismatch {
                expected: self.model.vector_size(),
                actual: vector.len(),
            });
        }
        self.vector.copy_from_slice(vector);
        self.cache.fill(None);
        Ok(())
    }

    /// Score of the acoustic state named by input `symbol` for the current
    /// vector. Symbols are 1-based; 0 is epsilon and never scored.
    pub fn score(&mut self, symbol: u32) -> f32 {
        debug_assert!(symbol != 0, "epsilon has no acoustic score");
        let state = symbol as usize - 1;
        if let Some(score) = self.cache[state] {
            return score;
        }
        let score = self.compute(state);
        self.cache[state] = Some(score);
        score
    }

    /// Whether `symbol` has been scored since the last vector was set.
    pub fn is_cached(&self, symbol: u32) -> bool {
        symbol != 0 && self.cache[symbol as usize - 1].is_some()
    }

    fn compute(&self, state: usize) -> f32 {
        let dims = self.strip_offset.min(self.vector.len())..self.vector.len();
        let mut best = NO_COMPONENT_SCORE;
        for pdf in self.model.components(state) {
            let mut sx = pdf.gconst;
            for j in dims.clone() {
                let xmu = self.vector[j] - pdf.mean[j];
                sx += xmu * xmu * pdf.inv_variance[j];
            }
            let score = -0.5 * sx + pdf.weight.ln();
            if score > best {
                best = score;
            }
        }
        best
    }
}
