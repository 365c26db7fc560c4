// Criterion benchmarks for ear-search.
//
// The model is synthetic: a background loop plus `EVENTS` event loops, each
// backed by a diagonal Gaussian mixture over `DIMS` coefficients. Inputs
// cycle through background and event segments so the decoder keeps
// switching hypotheses.
//
// Run:
//   cargo bench -p ear-search

use criterion::{Criterion, criterion_group, criterion_main};
use ear_model::acoustic::{AcousticModel, Pdf};
use ear_model::network::Network;
use ear_model::transition::{END_STATE, RawTransition};
use ear_search::{AcousticScorer, DetectorSession, Search, SessionOptions};

const DIMS: usize = 13;
const EVENTS: u32 = 8;
const MIXTURES: usize = 4;
const FRAMES: usize = 1000;

// ---------------------------------------------------------------------------
// Synthetic model
// ---------------------------------------------------------------------------

fn centre(state: u32) -> Vec<f32> {
    (0..DIMS)
        .map(|j| ((state as usize * 7 + j * 3) % 11) as f32 - 5.0)
        .collect()
}

/// Acoustic states 1..=EVENTS+1; state 1 is the background.
fn build_acoustic() -> AcousticModel {
    let mut pdfs = Vec::new();
    let mut states = Vec::new();
    for state in 0..=EVENTS {
        let base = centre(state);
        let mut slots = Vec::new();
        for m in 0..MIXTURES {
            let mean = base.iter().map(|&v| v + m as f32 * 0.25).collect();
            slots.push(Some(pdfs.len()));
            pdfs.push(Pdf::new(vec![1.0; DIMS], mean, DIMS as f32, 0.25));
        }
        states.push(slots);
    }
    AcousticModel::new(DIMS, states, pdfs).expect("acoustic model")
}

/// Start state 0, hub state 1, one self-looping state per event from 2 on.
fn build_network() -> Network {
    let mut raw = Vec::new();
    for event in 0..=EVENTS {
        raw.push(RawTransition::new(0, event + 2, event + 1, event + 1, 0.0));
    }
    raw.push(RawTransition::new(1, END_STATE, 0, 0, 0.0));
    raw.push(RawTransition::new(1, 0, 0, 0, 0.0));
    for event in 0..=EVENTS {
        let state = event + 2;
        raw.push(RawTransition::new(state, state, event + 1, 0, 0.1));
        raw.push(RawTransition::new(state, 1, 0, 0, 0.0));
    }
    Network::from_raw(&raw).expect("network")
}

fn build_inputs() -> Vec<Vec<f32>> {
    (0..FRAMES)
        .map(|i| {
            // 30 frames of background, then 10 of one event
            let state = if i % 40 < 30 { 0 } else { 1 + (i / 40) as u32 % EVENTS };
            centre(state)
                .into_iter()
                .enumerate()
                .map(|(j, v)| v + ((i * 31 + j * 17) % 13) as f32 * 0.05)
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Raw Viterbi search without resets.
fn bench_search(c: &mut Criterion) {
    let acoustic = build_acoustic();
    let network = build_network();
    let inputs = build_inputs();

    c.bench_function("search_1000_frames", |b| {
        b.iter(|| {
            let scorer = AcousticScorer::new(&acoustic, 0);
            let mut search = Search::new(&network, scorer, -2.0).expect("search");
            for (frame, v) in inputs.iter().enumerate() {
                search.process(v, frame as i64).expect("process");
            }
            std::hint::black_box(search.results())
        });
    });
}

/// Streaming session, including result collection after every frame.
fn bench_session(c: &mut Criterion) {
    let acoustic = build_acoustic();
    let network = build_network();
    let inputs = build_inputs();

    c.bench_function("session_1000_frames", |b| {
        b.iter(|| {
            let scorer = AcousticScorer::new(&acoustic, 0);
            let search = Search::new(&network, scorer, -2.0).expect("search");
            let mut session = DetectorSession::new(search, SessionOptions::default());
            let mut reported = 0;
            for v in &inputs {
                reported += session.push(v).expect("push").len();
            }
            std::hint::black_box(reported)
        });
    });
}

/// Acoustic scoring alone, every state once per frame.
fn bench_scorer(c: &mut Criterion) {
    let acoustic = build_acoustic();
    let inputs = build_inputs();

    c.bench_function("score_all_states_1000_frames", |b| {
        b.iter(|| {
            let mut scorer = AcousticScorer::new(&acoustic, 0);
            let mut total = 0.0f32;
            for v in &inputs {
                scorer.set_vector(v).expect("vector");
                for symbol in 1..=EVENTS + 1 {
                    total += scorer.score(symbol);
                }
            }
            std::hint::black_box(total)
        });
    });
}

criterion_group!(benches, bench_search, bench_session, bench_scorer);
criterion_main!(benches);
