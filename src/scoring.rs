/// Scoring model: translates oracle outcomes into persistent per-item scores.
///
/// Index-addressed. The session owns the mapping from indices back to items;
/// strategies only ever see indices. Feeding an out-of-range index is a
/// programming error and panics, it is never reported as a recoverable error.
///
/// The board performs no de-duplication. A strategy that submits the same
/// comparison outcome twice gets it counted twice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreBoard {
    scores: Vec<f64>,
    win_increment: f64,
}

pub const DEFAULT_WIN_INCREMENT: f64 = 1.0;

impl ScoreBoard {
    pub fn new(num_items: usize) -> Self {
        Self::with_increment(num_items, DEFAULT_WIN_INCREMENT)
    }

    pub fn with_increment(num_items: usize, win_increment: f64) -> Self {
        ScoreBoard {
            scores: vec![0.0; num_items],
            win_increment,
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Credit `winner` with one increment per defeated item. Losers are
    /// untouched.
    pub fn record_winner(&mut self, winner: usize, losers: &[usize]) {
        for &loser in losers {
            assert!(loser < self.scores.len(), "unknown item index: {}", loser);
            assert_ne!(winner, loser, "item cannot defeat itself: {}", winner);
        }
        self.scores[winner] += self.win_increment * losers.len() as f64;
    }

    /// Set (not accumulate) an item's score.
    pub fn record_rating(&mut self, item: usize, rating: f64) {
        self.scores[item] = rating;
    }

    /// Credit an uncontested advancement, one increment with no loser.
    /// Bracket byes use this so that a champion seeded through byes still
    /// outranks the runner-up.
    pub fn record_bye(&mut self, item: usize) {
        self.scores[item] += self.win_increment;
    }

    /// Current scores in item-insertion order. Unscored items are 0.
    pub fn snapshot(&self) -> &[f64] {
        &self.scores
    }
}
