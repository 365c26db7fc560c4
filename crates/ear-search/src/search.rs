// Token-passing Viterbi search over the FST network, with result backtrace.

use ear_core::Detection;
use ear_core::symbol::{EPSILON, START_STATE};
use ear_model::network::Network;
use ear_model::transition::Target;

use crate::SearchError;
use crate::scorer::AcousticScorer;
use crate::token::{PathScore, Position, Token, TokenId, TokenPool};

/// Tokens preallocated per network transition. The pool grows past this on
/// demand.
const POOL_HEADROOM: usize = 10;

/// Which transitions a propagation step follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    /// Epsilon-input transitions, within the current frame.
    Epsilon,
    /// Transitions that consume the current feature vector.
    Consume,
}

/// Viterbi decoder over a search network.
///
/// Two halves of the Viterbi stack hold the best token per state for the
/// previous and the current frame. Every network state has a slot, plus one
/// for the virtual end state that collects all final hypotheses.
pub struct Search<'m> {
    network: &'m Network,
    scorer: AcousticScorer<'m>,
    penalty: f32,
    /// Virtual end state number: one past the highest start state.
    end_state: usize,
    state_count: usize,
    pool: TokenPool,
    stack: Vec<Option<TokenId>>,
    /// Offset of the previous-frame half.
    src: usize,
    /// Offset of the current-frame half.
    dst: usize,
    frame: i64,
}

impl<'m> Search<'m> {
    /// Prepare a decoder and seed it with the start state.
    ///
    /// `penalty` is added whenever a hypothesis crosses into a new event.
    /// Higher values yield more, shorter detections.
    pub fn new(
        network: &'m Network,
        scorer: AcousticScorer<'m>,
        penalty: f32,
    ) -> Result<Self, SearchError> {
        let max_start = network.max_start_state().ok_or(SearchError::InvalidNetwork)?;

        let states = scorer.model().state_count();
        if let Some(t) = network
            .transitions()
            .iter()
            .find(|t| !t.is_epsilon() && t.input as usize > states)
        {
            return Err(SearchError::UnknownAcousticState {
                symbol: t.input,
                states,
            });
        }

        let end_state = max_start as usize + 1;
        let state_count = end_state + 1;
        let mut search = Self {
            network,
            scorer,
            penalty,
            end_state,
            state_count,
            pool: TokenPool::new(POOL_HEADROOM * network.len()),
            stack: vec![None; 2 * state_count],
            src: 0,
            dst: state_count,
            frame: 0,
        };
        search.reset();
        Ok(search)
    }

    /// Drop every hypothesis and start over from the start state.
    ///
    /// Tokens return to the pool; the pool keeps its storage. Calling this
    /// periodically bounds lattice growth on an unbounded stream.
    pub fn reset(&mut self) {
        for slot in 0..self.stack.len() {
            if let Some(id) = self.stack[slot].take() {
                self.pool.release(id);
            }
        }

        let root = self.pool.acquire(None);
        self.insert(root, START_STATE as usize);
        self.propagate(root, Sweep::Epsilon, 0);
    }

    /// Consume one feature vector.
    ///
    /// Every token of the previous frame crosses each vector-consuming
    /// transition of its state, is closed over epsilon transitions, and
    /// competes for its target state. On error the stacks are untouched.
    pub fn process(&mut self, vector: &[f32], frame: i64) -> Result<(), SearchError> {
        if vector.is_empty() {
            return Err(SearchError::EndOfInput);
        }
        self.scorer.set_vector(vector)?;
        self.frame = frame;

        self.next_time();
        for state in 0..self.state_count {
            let Some(id) = self.stack[self.src + state].take() else {
                continue;
            };
            if self.pool.get(id).position != Position::End {
                self.propagate(id, Sweep::Consume, 0);
            }
            // Successors keep it alive through their predecessor link.
            self.pool.release(id);
        }
        Ok(())
    }

    /// Set the insertion penalty for subsequent frames.
    pub fn change_penalty(&mut self, penalty: f32) {
        self.penalty = penalty;
    }

    pub fn penalty(&self) -> f32 {
        self.penalty
    }

    /// Fill `out` with the events along the best hypothesis reaching the end
    /// state, oldest first. Leaves `out` empty if no event was decided yet.
    pub fn collect_results(&self, out: &mut Vec<Detection>) {
        out.clear();
        let Some(mut id) = self.stack[self.dst + self.end_state] else {
            return;
        };
        while let Some(prev) = self.pool.get(id).predecessor() {
            let token = self.pool.get(id);
            let ancestor = self.pool.get(prev);
            out.push(Detection {
                start_frame: ancestor.frame,
                duration: token.frame - ancestor.frame,
                event: ancestor.symbol,
                score: token.total_score() - ancestor.total_score(),
            });
            id = prev;
        }
        out.reverse();
    }

    /// Events along the best hypothesis reaching the end state.
    pub fn results(&self) -> Vec<Detection> {
        let mut out = Vec::new();
        self.collect_results(&mut out);
        out
    }

    /// Best token of the current frame at `state`.
    pub fn best_token(&self, state: usize) -> Option<&Token> {
        self.current(state).map(|id| self.pool.get(id))
    }

    /// Best token of the current frame at the virtual end state.
    pub fn end_token(&self) -> Option<&Token> {
        self.best_token(self.end_state)
    }

    /// Token by handle, e.g. to follow [`Token::predecessor`].
    pub fn token(&self, id: TokenId) -> &Token {
        self.pool.get(id)
    }

    /// Number assigned to the virtual end state.
    pub fn end_state(&self) -> usize {
        self.end_state
    }

    /// Number of Viterbi stack slots per frame, end state included.
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// Frame index passed to the last successful [`process`](Self::process).
    pub fn frame(&self) -> i64 {
        self.frame
    }

    pub fn pool(&self) -> &TokenPool {
        &self.pool
    }

    pub fn network(&self) -> &'m Network {
        self.network
    }

    fn current(&self, state: usize) -> Option<TokenId> {
        if state >= self.state_count {
            return None;
        }
        self.stack[self.dst + state]
    }

    fn next_time(&mut self) {
        std::mem::swap(&mut self.src, &mut self.dst);
        let current = &mut self.stack[self.dst..self.dst + self.state_count];
        debug_assert!(current.iter().all(Option::is_none));
        current.fill(None);
    }

    /// Viterbi stack slot of a token position.
    fn state_of(&self, position: Position) -> usize {
        match position {
            Position::End => self.end_state,
            Position::Transition(p) => self.network.transition(p).start as usize,
        }
    }

    /// Spawn a successor of `id` across every transition of its state
    /// selected by `sweep`, close it over epsilon transitions, and insert it.
    fn propagate(&mut self, id: TokenId, sweep: Sweep, depth: usize) {
        let network = self.network;
        debug_assert!(depth <= network.len(), "epsilon cycle in search network");

        // The parent may be evicted from its slot while its successors are
        // inserted; work from a snapshot.
        let parent = *self.pool.get(id);
        let Position::Transition(first) = parent.position else {
            return;
        };

        // A token without a symbol continues the event of its predecessor.
        let carried = match (parent.symbol, parent.predecessor()) {
            (EPSILON, Some(p)) => self.pool.get(p).symbol,
            (symbol, _) => symbol,
        };
        let link = if parent.symbol != EPSILON {
            Some(id)
        } else {
            parent.predecessor()
        };

        for (_, transition) in network.outgoing(first) {
            let position = match transition.target {
                Target::Unlinked => continue,
                Target::End => Position::End,
                Target::Position(p) => Position::Transition(p),
            };
            if transition.is_epsilon() != (sweep == Sweep::Epsilon) {
                continue;
            }

            let child = self.pool.acquire(link);
            let mut score = PathScore::inherit(&parent.score);
            let mut symbol = EPSILON;
            // Stored weights carry an inverted sign.
            if transition.emits() && transition.output != carried {
                score.add_aux(-transition.weight + self.penalty);
                symbol = transition.output;
            } else {
                score.add_aux(-transition.weight);
            }
            let frame = match sweep {
                Sweep::Epsilon => parent.frame,
                Sweep::Consume => {
                    score.add_main(self.scorer.score(transition.input));
                    self.frame
                }
            };

            let token = self.pool.get_mut(child);
            token.position = position;
            token.symbol = symbol;
            token.frame = frame;
            token.score = score;

            if position != Position::End {
                self.propagate(child, Sweep::Epsilon, depth + 1);
            }
            let state = self.state_of(position);
            self.insert(child, state);
        }
    }

    /// Keep `id` at `state` unless the slot holds a strictly better token.
    fn insert(&mut self, id: TokenId, state: usize) {
        if state >= self.state_count {
            self.pool.release(id);
            return;
        }
        let slot = self.dst + state;
        if let Some(existing) = self.stack[slot] {
            if self.pool.get(existing).total_score() > self.pool.get(id).total_score() {
                self.pool.release(id);
                return;
            }
            self.pool.release(existing);
        }
        self.stack[slot] = Some(id);
    }
}
