use crate::bracket::Bracket;
use crate::partition::{Partition, PartitionConfig};
use crate::round_robin::RoundRobin;
use crate::scoring::ScoreBoard;
use crate::sort::ComparatorSort;
use crate::types::QueryKind;

/// Which ranking algorithm drives the oracle. Selected at session creation,
/// fixed for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrategyKind {
    /// Single-elimination bracket seeded by the initial order.
    Bracket,
    /// Every unordered pair compared exactly once; score = win count.
    RoundRobin,
    /// Fixed-size groups ordered per round, winners advance.
    Partition(PartitionConfig),
    /// Quicksort with the oracle as comparator; strict total order out.
    ComparatorSort,
}

/// One outstanding oracle query, in engine index space.
///
/// Strategies re-derive the current query from their state, so calling
/// `next_query` repeatedly without submitting is harmless and always returns
/// the same query. That property is what makes snapshots resumable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Query {
    pub kind: QueryKind,
    pub group: Vec<usize>,
}

/// An oracle verdict already validated and translated into index space by the
/// session. Strategies can trust its shape matches the query they issued.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum IndexedVerdict {
    Order(Vec<usize>),
    Winner(usize),
    Ratings(Vec<f64>),
}

/// The closed set of strategy states, enum-dispatched.
///
/// Each variant owns its progress structure exclusively; the session only
/// ever talks to this interface.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) enum StrategyState {
    Bracket(Bracket),
    RoundRobin(RoundRobin),
    Partition(Partition),
    ComparatorSort(ComparatorSort),
}

impl StrategyState {
    /// Build the strategy over `order`, a permutation of `0..n` reflecting
    /// the session's initial order policy. Strategies that auto-advance
    /// items without a query (byes, singleton groups) may score during
    /// construction, hence the board.
    pub fn new(kind: StrategyKind, order: Vec<usize>, board: &mut ScoreBoard) -> Self {
        match kind {
            StrategyKind::Bracket => StrategyState::Bracket(Bracket::new(order, board)),
            StrategyKind::RoundRobin => StrategyState::RoundRobin(RoundRobin::new(order)),
            StrategyKind::Partition(config) => {
                StrategyState::Partition(Partition::new(order, config, board))
            }
            StrategyKind::ComparatorSort => {
                StrategyState::ComparatorSort(ComparatorSort::new(order, board))
            }
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyState::Bracket(_) => StrategyKind::Bracket,
            StrategyState::RoundRobin(_) => StrategyKind::RoundRobin,
            StrategyState::Partition(p) => StrategyKind::Partition(p.config()),
            StrategyState::ComparatorSort(_) => StrategyKind::ComparatorSort,
        }
    }

    pub fn next_query(&self) -> Option<Query> {
        match self {
            StrategyState::Bracket(s) => s.next_query(),
            StrategyState::RoundRobin(s) => s.next_query(),
            StrategyState::Partition(s) => s.next_query(),
            StrategyState::ComparatorSort(s) => s.next_query(),
        }
    }

    pub fn submit(&mut self, query: &Query, verdict: IndexedVerdict, board: &mut ScoreBoard) {
        match self {
            StrategyState::Bracket(s) => s.submit(query, verdict, board),
            StrategyState::RoundRobin(s) => s.submit(query, verdict, board),
            StrategyState::Partition(s) => s.submit(query, verdict, board),
            StrategyState::ComparatorSort(s) => s.submit(query, verdict, board),
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            StrategyState::Bracket(s) => s.is_complete(),
            StrategyState::RoundRobin(s) => s.is_complete(),
            StrategyState::Partition(s) => s.is_complete(),
            StrategyState::ComparatorSort(s) => s.is_complete(),
        }
    }

    /// Advisory. Exact for bracket, round-robin, and partition; a lower
    /// bound for comparator sort.
    pub fn estimated_remaining_queries(&self) -> usize {
        match self {
            StrategyState::Bracket(s) => s.estimated_remaining_queries(),
            StrategyState::RoundRobin(s) => s.estimated_remaining_queries(),
            StrategyState::Partition(s) => s.estimated_remaining_queries(),
            StrategyState::ComparatorSort(s) => s.estimated_remaining_queries(),
        }
    }
}
