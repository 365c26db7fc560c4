// Streaming driver: frame numbering, event reporting, periodic reset.

use ear_core::Detection;

use crate::SearchError;
use crate::search::Search;

/// Reporting policy of a [`DetectorSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Event symbol of the background model. Background detections are
    /// never reported.
    pub background_event: u32,
    /// Frames the best hypothesis must dwell in the background before the
    /// events preceding it are reported.
    pub background_frames: i64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            background_event: 1,
            background_frames: 10,
        }
    }
}

/// Decodes an unbounded stream of feature vectors and reports events.
///
/// Events are reported once the best hypothesis has settled in the background
/// event for longer than [`SessionOptions::background_frames`]. The decoder
/// is reset at that point, so memory stays bounded however long the stream.
pub struct DetectorSession<'m> {
    search: Search<'m>,
    options: SessionOptions,
    frames: i64,
    results: Vec<Detection>,
}

impl<'m> DetectorSession<'m> {
    pub fn new(search: Search<'m>, options: SessionOptions) -> Self {
        Self {
            search,
            options,
            frames: 0,
            results: Vec::new(),
        }
    }

    /// Decode the next vector. Returns the events decided by it, oldest
    /// first, or an empty list if none were.
    pub fn push(&mut self, vector: &[f32]) -> Result<Vec<Detection>, SearchError> {
        self.search.process(vector, self.frames)?;
        self.frames += 1;

        self.search.collect_results(&mut self.results);
        let settled = self.results.last().is_some_and(|last| {
            last.event == self.options.background_event
                && last.duration > self.options.background_frames
        });
        if !settled {
            return Ok(Vec::new());
        }
        let events = self.foreground();
        self.search.reset();
        Ok(events)
    }

    /// Report the events of the current best hypothesis regardless of the
    /// background dwell time, and reset the decoder.
    pub fn flush(&mut self) -> Vec<Detection> {
        self.search.collect_results(&mut self.results);
        let events = self.foreground();
        self.search.reset();
        events
    }

    /// Vectors decoded so far.
    pub fn frames(&self) -> i64 {
        self.frames
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn search(&self) -> &Search<'m> {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut Search<'m> {
        &mut self.search
    }

    pub fn into_search(self) -> Search<'m> {
        self.search
    }

    fn foreground(&self) -> Vec<Detection> {
        self.results
            .iter()
            .filter(|d| d.event != self.options.background_event)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{gaussian_model, network};
    use crate::scorer::AcousticScorer;
    use ear_model::acoustic::AcousticModel;
    use ear_model::network::Network;
    use ear_model::transition::END_STATE;

    /// Background loop (state 2, event 1) and foreground loop (state 3,
    /// event 2), both returning to the start through hub state 1.
    fn loops() -> Network {
        network(&[
            (0, 2, 1, 1, 0.0),
            (0, 3, 2, 2, 0.0),
            (1, END_STATE, 0, 0, 0.0),
            (1, 0, 0, 0, 0.0),
            (2, 2, 1, 0, 0.0),
            (2, 1, 0, 0, 0.0),
            (3, 3, 2, 0, 0.0),
            (3, 1, 0, 0, 0.0),
        ])
    }

    fn model() -> AcousticModel {
        gaussian_model(&[0.0, 5.0], 0.0)
    }

    fn session<'m>(net: &'m Network, model: &'m AcousticModel) -> DetectorSession<'m> {
        let search = Search::new(net, AcousticScorer::new(model, 0), 0.0).unwrap();
        DetectorSession::new(search, SessionOptions::default())
    }

    fn stream() -> Vec<f32> {
        let mut xs = vec![0.0; 5];
        xs.extend([5.0; 4]);
        xs.extend([0.0; 15]);
        xs
    }

    #[test]
    fn event_reported_after_background_dwell() {
        let net = loops();
        let model = model();
        let mut session = session(&net, &model);

        let mut reports = Vec::new();
        for (i, x) in stream().into_iter().enumerate() {
            let events = session.push(&[x]).unwrap();
            if !events.is_empty() {
                reports.push((i, events));
            }
        }

        assert_eq!(reports.len(), 1);
        let (index, events) = &reports[0];
        assert_eq!(*index, 20);
        assert_eq!(events.len(), 1);
        let d = events[0];
        assert_eq!((d.event, d.start_frame, d.duration), (2, 5, 4));
        assert!(d.score.abs() < 1e-5);
        assert_eq!(session.frames(), 24);
    }

    #[test]
    fn frames_keep_counting_across_reset() {
        let net = loops();
        let model = model();
        let mut session = session(&net, &model);
        for x in stream().into_iter().take(21) {
            session.push(&[x]).unwrap();
        }
        session.push(&[5.0]).unwrap();
        let results = session.search().results();
        // the reset happened after frame 20
        assert!(results.iter().all(|d| d.start_frame >= 21));
        assert_eq!(results.last().map(|d| d.event), Some(2));
    }

    #[test]
    fn flush_reports_pending_events() {
        let net = loops();
        let model = model();
        let mut session = session(&net, &model);
        for x in stream().into_iter().take(9) {
            assert!(session.push(&[x]).unwrap().is_empty());
        }

        let events = session.flush();
        assert_eq!(events.len(), 1);
        assert_eq!((events[0].event, events[0].start_frame, events[0].duration), (2, 5, 3));
        assert!(session.search().results().is_empty());
        assert!(session.flush().is_empty());
    }

    #[test]
    fn errors_do_not_advance_frames() {
        let net = loops();
        let model = model();
        let mut session = session(&net, &model);
        session.push(&[0.0]).unwrap();
        assert_eq!(session.push(&[]), Err(SearchError::EndOfInput));
        assert!(session.push(&[0.0, 1.0]).is_err());
        assert_eq!(session.frames(), 1);
    }

    #[test]
    fn long_background_stream_stays_in_one_holder() {
        let net = loops();
        let model = model();
        let mut session = session(&net, &model);
        for _ in 0..1000 {
            assert!(session.push(&[0.0]).unwrap().is_empty());
        }
        assert_eq!(session.search().pool().holders(), 1);
    }

    #[test]
    fn custom_background_event() {
        let net = loops();
        let model = model();
        let search = Search::new(&net, AcousticScorer::new(&model, 0), 0.0).unwrap();
        let options = SessionOptions {
            background_event: 2,
            background_frames: 3,
        };
        let mut session = DetectorSession::new(search, options);

        let mut reported = Vec::new();
        for x in [0.0, 0.0, 5.0, 5.0, 5.0, 5.0, 5.0] {
            reported.extend(session.push(&[x]).unwrap());
        }
        // event 1 is foreground now; it is reported once event 2 dwells > 3 frames
        assert_eq!(reported.len(), 1);
        assert_eq!((reported[0].event, reported[0].start_frame, reported[0].duration), (1, 0, 2));
    }
}
