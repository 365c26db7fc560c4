// Small models and networks shared by unit tests.

use ear_model::acoustic::{AcousticModel, Pdf};
use ear_model::network::Network;
use ear_model::transition::RawTransition;

/// One-dimensional model with one unit-variance component per state.
pub fn gaussian_model(means: &[f32], gconst: f32) -> AcousticModel {
    let states = (0..means.len()).map(|i| vec![Some(i)]).collect();
    let pdfs = means
        .iter()
        .map(|&m| Pdf::new(vec![1.0], vec![m], gconst, 1.0))
        .collect();
    AcousticModel::new(1, states, pdfs).unwrap()
}

/// Network from `(start, end, input, output, weight)` rows.
pub fn network(rows: &[(u32, u32, u32, u32, f32)]) -> Network {
    let raw: Vec<RawTransition> = rows
        .iter()
        .map(|&(s, e, i, o, w)| RawTransition::new(s, e, i, o, w))
        .collect();
    Network::from_raw(&raw).unwrap()
}
