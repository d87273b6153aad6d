/// What a single oracle query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueryKind {
    /// Order the whole group, best first. Group size >= 2.
    TotalOrder,
    /// Pick exactly one winner out of the group. Group size >= 2.
    SingleWinner,
    /// Rate every group member numerically. Group size >= 1.
    NumericRating,
}

/// An oracle's answer to a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict<T> {
    /// The group in preference order, best first. Answers `TotalOrder`.
    Order(Vec<T>),
    /// The single preferred item. Answers `SingleWinner`.
    Winner(T),
    /// One rating per group member, parallel to the queried group.
    /// Answers `NumericRating`.
    Ratings(Vec<f64>),
    /// The human cancelled. Terminal for the whole session.
    Abandoned,
}

/// The judge of last resort: whoever (or whatever) answers comparison queries.
///
/// The call is synchronous from the engine's point of view and may block for
/// as long as a human takes to decide. Implemented automatically for closures:
///
/// ```rust
/// use tourney::{Oracle, QueryKind, Verdict};
///
/// let mut first_wins = |group: &[&'static str], _kind: QueryKind| Verdict::Winner(group[0]);
/// let verdict = first_wins.compare(&["a", "b"], QueryKind::SingleWinner);
/// assert_eq!(verdict, Verdict::Winner("a"));
/// ```
pub trait Oracle<T> {
    fn compare(&mut self, group: &[T], kind: QueryKind) -> Verdict<T>;
}

impl<T, F> Oracle<T> for F
where
    F: FnMut(&[T], QueryKind) -> Verdict<T>,
{
    fn compare(&mut self, group: &[T], kind: QueryKind) -> Verdict<T> {
        self(group, kind)
    }
}

/// An item paired with its current score.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredItem<T> {
    pub item: T,
    pub score: f64,
}

/// Final output of a completed session.
///
/// `rankings` is sorted by non-increasing score; items with equal scores keep
/// their relative playlist order. `playlist_order` is the original input
/// order, verbatim, for presentation collaborators that replay the items in
/// the order they were supplied.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standings<T> {
    pub rankings: Vec<ScoredItem<T>>,
    pub playlist_order: Vec<T>,
}

impl<T> Standings<T> {
    /// The top-ranked entry. Sessions are never empty, so neither is this.
    pub fn winner(&self) -> &ScoredItem<T> {
        &self.rankings[0]
    }

    pub fn len(&self) -> usize {
        self.rankings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rankings.is_empty()
    }
}

/// How the item set is ordered before the strategy is constructed.
///
/// Applied exactly once at session creation; the order is fixed afterwards.
/// `Randomized` is an explicit seeded shuffle so runs are reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderPolicy {
    Sequential,
    Randomized { seed: u64 },
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionStatus {
    /// Created, no query answered yet.
    Pending,
    /// At least one query answered, more remain.
    InProgress,
    /// Every query answered and every item scored.
    Complete,
    /// The oracle cancelled. Terminal, no standings.
    Abandoned,
    /// The caller cancelled. Terminal, no standings.
    Aborted,
    /// The oracle violated the query contract. Terminal, no standings.
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Complete
                | SessionStatus::Abandoned
                | SessionStatus::Aborted
                | SessionStatus::Failed
        )
    }
}
