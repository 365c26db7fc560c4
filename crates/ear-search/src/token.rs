// Search lattice nodes and the reference-counted arena that recycles them.

use ear_core::symbol::EPSILON;

/// Handle of a token inside a [`TokenPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(u32);

impl TokenId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a token sits in the search network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// First transition of the token's state.
    Transition(usize),
    /// The virtual acceptor; a token here has no outgoing edges.
    End,
}

/// Score accumulators of a token.
///
/// The acoustic score of a crossed transition becomes known one propagation
/// step after the crossing, so it is staged in `pending` before being settled
/// into `main`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PathScore {
    main: f32,
    pending: f32,
    aux: f32,
}

impl PathScore {
    /// Scores of a successor spawned from `parent`: the parent's pending
    /// acoustic score is settled and a fresh pending window is opened.
    #[inline]
    pub fn inherit(parent: &PathScore) -> Self {
        Self {
            main: parent.main + parent.pending,
            pending: 0.0,
            aux: parent.aux,
        }
    }

    /// Add transition weight or insertion penalty.
    #[inline]
    pub fn add_aux(&mut self, delta: f32) {
        self.aux += delta;
    }

    /// Settle the staged acoustic score and stage `delta` in its place.
    #[inline]
    pub fn add_main(&mut self, delta: f32) {
        self.main += self.pending;
        self.pending = delta;
    }

    pub fn main(&self) -> f32 {
        self.main
    }

    pub fn pending(&self) -> f32 {
        self.pending
    }

    pub fn aux(&self) -> f32 {
        self.aux
    }

    /// Score used for Viterbi comparison and reporting.
    #[inline]
    pub fn total(&self) -> f32 {
        self.main + self.pending + self.aux
    }
}

/// Node of the search lattice.
///
/// `predecessor` points at the most recent ancestor that crossed an event
/// boundary; tokens without a symbol are never linked to. A token is alive
/// while `usage > 0`.
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub position: Position,
    /// Output symbol crossed by this token, [`EPSILON`] if none.
    pub symbol: u32,
    /// Frame index at which the token was created.
    pub frame: i64,
    pub score: PathScore,
    usage: u32,
    predecessor: Option<TokenId>,
}

impl Token {
    fn fresh(predecessor: Option<TokenId>) -> Self {
        Self {
            position: Position::Transition(0),
            symbol: EPSILON,
            frame: 0,
            score: PathScore::default(),
            usage: 1,
            predecessor,
        }
    }

    pub fn predecessor(&self) -> Option<TokenId> {
        self.predecessor
    }

    /// Number of live references: the owning stack slot or caller, plus
    /// one per successor linked to this token.
    pub fn usage(&self) -> u32 {
        self.usage
    }

    #[inline]
    pub fn total_score(&self) -> f32 {
        self.score.total()
    }
}

/// Arena of tokens with reference-counted recycling.
///
/// Storage grows in holders of a fixed size and is never returned to the
/// allocator; released tokens go to a free list and are reused. Memory is
/// therefore bounded by the largest number of tokens alive at once.
#[derive(Debug)]
pub struct TokenPool {
    tokens: Vec<Token>,
    free: Vec<TokenId>,
    holder_size: usize,
    holders: usize,
}

impl TokenPool {
    /// Create a pool with one holder of `holder_size` tokens.
    pub fn new(holder_size: usize) -> Self {
        let mut pool = Self {
            tokens: Vec::new(),
            free: Vec::new(),
            holder_size: holder_size.max(1),
            holders: 0,
        };
        pool.grow();
        pool
    }

    fn grow(&mut self) {
        let first = self.tokens.len();
        let last = first + self.holder_size;
        self.tokens.resize(last, Token::fresh(None));
        // Reversed so that tokens are handed out in storage order.
        self.free.extend((first..last).rev().map(|i| TokenId(i as u32)));
        for token in &mut self.tokens[first..last] {
            token.usage = 0;
        }
        self.holders += 1;
    }

    /// Take a fresh token linked to `predecessor`.
    ///
    /// The new token starts with a usage of one; the predecessor gains one.
    pub fn acquire(&mut self, predecessor: Option<TokenId>) -> TokenId {
        if let Some(p) = predecessor {
            self.tokens[p.index()].usage += 1;
        }
        if self.free.is_empty() {
            self.grow();
        }
        let Some(id) = self.free.pop() else {
            unreachable!("grow always adds at least one token");
        };
        self.tokens[id.index()] = Token::fresh(predecessor);
        id
    }

    /// Drop one reference to `id`.
    ///
    /// A token whose usage reaches zero is recycled and the release cascades
    /// to its predecessor, until an ancestor that is still referenced is
    /// reached or the chain ends.
    pub fn release(&mut self, id: TokenId) {
        let mut next = Some(id);
        while let Some(current) = next {
            let token = &mut self.tokens[current.index()];
            debug_assert!(token.usage > 0, "token {current:?} released while free");
            if token.usage == 0 {
                return;
            }
            token.usage -= 1;
            if token.usage > 0 {
                return;
            }
            next = token.predecessor.take();
            self.free.push(current);
        }
    }

    #[inline]
    pub fn get(&self, id: TokenId) -> &Token {
        &self.tokens[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: TokenId) -> &mut Token {
        &mut self.tokens[id.index()]
    }

    /// Total tokens allocated across all holders.
    pub fn capacity(&self) -> usize {
        self.tokens.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Tokens currently in use.
    pub fn live_count(&self) -> usize {
        self.tokens.len() - self.free.len()
    }

    pub fn holders(&self) -> usize {
        self.holders
    }

    pub fn holder_size(&self) -> usize {
        self.holder_size
    }
}
