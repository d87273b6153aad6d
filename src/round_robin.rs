use crate::scoring::ScoreBoard;
use crate::strategy::{IndexedVerdict, Query};
use crate::types::QueryKind;

/// Round-robin quantification: every unordered pair exactly once.
///
/// Pairs are visited in lexicographic order over positions in the initial
/// ordering, tracked by a single cursor. The sequence is stable, so a
/// resumed snapshot continues exactly where it stopped and no pair is ever
/// asked twice. C(n, 2) queries total; score = win count.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct RoundRobin {
    order: Vec<usize>,
    cursor: usize,
}

impl RoundRobin {
    pub fn new(order: Vec<usize>) -> Self {
        RoundRobin { order, cursor: 0 }
    }

    fn total_pairs(&self) -> usize {
        let n = self.order.len();
        n * (n - 1) / 2
    }

    /// Decode the cursor into the (i, j) position pair it denotes, i < j.
    fn pair_at(&self, mut index: usize) -> (usize, usize) {
        let n = self.order.len();
        for i in 0..n {
            let row = n - 1 - i;
            if index < row {
                return (i, i + 1 + index);
            }
            index -= row;
        }
        unreachable!("pair cursor out of range")
    }

    pub fn next_query(&self) -> Option<Query> {
        if self.cursor >= self.total_pairs() {
            return None;
        }
        let (i, j) = self.pair_at(self.cursor);
        Some(Query {
            kind: QueryKind::SingleWinner,
            group: vec![self.order[i], self.order[j]],
        })
    }

    pub fn submit(&mut self, query: &Query, verdict: IndexedVerdict, board: &mut ScoreBoard) {
        let winner = match verdict {
            IndexedVerdict::Winner(w) => w,
            other => panic!("round robin expects a winner verdict, got {:?}", other),
        };
        let loser = if query.group[0] == winner {
            query.group[1]
        } else {
            query.group[0]
        };
        board.record_winner(winner, &[loser]);
        self.cursor += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.total_pairs()
    }

    /// Exact.
    pub fn estimated_remaining_queries(&self) -> usize {
        self.total_pairs() - self.cursor
    }
}
