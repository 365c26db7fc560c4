// Event hypothesis produced by backtracking through the search lattice.

use serde::Serialize;

/// One detected acoustic event.
///
/// Frame numbers count consumed feature vectors. `score` is the difference of
/// the accumulated path scores at the end and at the start of the event, so
/// the scores of consecutive detections along one hypothesis add up to the
/// score gained over the whole span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    /// Frame at which the event boundary was crossed.
    pub start_frame: i64,
    /// Number of frames until the next boundary (or the end of the hypothesis).
    pub duration: i64,
    /// Output symbol of the event, as listed in the event index.
    pub event: u32,
    /// Log-domain score accumulated over the event.
    pub score: f32,
}

impl Detection {
    /// Frame at which the event ends (exclusive).
    pub fn end_frame(&self) -> i64 {
        self.start_frame + self.duration
    }

    /// Start of the event in seconds for a frontend with the given frame shift.
    pub fn start_secs(&self, frame_shift_ms: f32) -> f32 {
        frames_to_secs(self.start_frame, frame_shift_ms)
    }

    /// Duration of the event in seconds for a frontend with the given frame shift.
    pub fn duration_secs(&self, frame_shift_ms: f32) -> f32 {
        frames_to_secs(self.duration, frame_shift_ms)
    }
}

/// Convert a frame count to seconds.
#[inline]
pub fn frames_to_secs(frames: i64, frame_shift_ms: f32) -> f32 {
    frames as f32 * frame_shift_ms / 1000.0
}
