use crate::scoring::ScoreBoard;
use crate::strategy::{IndexedVerdict, Query};
use crate::types::QueryKind;

pub const DEFAULT_GROUP_SIZE: usize = 5;

/// Configuration for the recursive partition strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionConfig {
    /// Items per group. Must be at least 2 or the ladder never shrinks.
    pub group_size: usize,
    /// Elicit per-item `NumericRating`s instead of a full intra-group
    /// `TotalOrder`. Ratings only pick the local order; the persistent score
    /// is always the depth-scaled rank below. Rating ties keep group order.
    pub rate_groups: bool,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        PartitionConfig {
            group_size: DEFAULT_GROUP_SIZE,
            rate_groups: false,
        }
    }
}

/// Recursive partition rating.
///
/// The pool is chunked into fixed-size groups; one query orders each group;
/// group winners advance into a fresh, smaller pool until a single group
/// remains. Each item's persistent score is set from its local rank,
/// offset by `round * group_size`, so anything that reached round k + 1
/// strictly outscores everything eliminated in round k. Items eliminated
/// early share coarser scores by design; the trade is O(n log n) group
/// queries instead of round-robin's C(n, 2).
///
/// Singleton trailing groups advance without a query, like a bracket bye.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct Partition {
    config: PartitionConfig,
    /// Items still in contention, in current-round order.
    pool: Vec<usize>,
    /// Group winners advancing to the next round.
    winners: Vec<usize>,
    /// Index of the group currently awaiting a verdict.
    group_cursor: usize,
    /// 0-based round depth, scales the local rank into a global score.
    round: usize,
    done: bool,
}

impl Partition {
    pub fn new(order: Vec<usize>, config: PartitionConfig, board: &mut ScoreBoard) -> Self {
        assert!(config.group_size >= 2, "partition group size must be at least 2");
        let mut partition = Partition {
            config,
            pool: order,
            winners: Vec::new(),
            group_cursor: 0,
            round: 0,
            done: false,
        };
        partition.advance(board);
        partition
    }

    pub fn config(&self) -> PartitionConfig {
        self.config
    }

    fn groups_in_round(&self) -> usize {
        let g = self.config.group_size;
        (self.pool.len() + g - 1) / g
    }

    fn current_group(&self) -> &[usize] {
        let g = self.config.group_size;
        let start = self.group_cursor * g;
        &self.pool[start..(start + g).min(self.pool.len())]
    }

    pub fn next_query(&self) -> Option<Query> {
        if self.done {
            return None;
        }
        let kind = if self.config.rate_groups {
            QueryKind::NumericRating
        } else {
            QueryKind::TotalOrder
        };
        Some(Query {
            kind,
            group: self.current_group().to_vec(),
        })
    }

    pub fn submit(&mut self, query: &Query, verdict: IndexedVerdict, board: &mut ScoreBoard) {
        let local_order = match verdict {
            IndexedVerdict::Order(order) => order,
            IndexedVerdict::Ratings(ratings) => rank_by_rating(&query.group, &ratings),
            other => panic!("partition expects an order or ratings verdict, got {:?}", other),
        };

        self.score_group(&local_order, board);
        self.winners.push(local_order[0]);
        self.group_cursor += 1;
        self.advance(board);
    }

    pub fn is_complete(&self) -> bool {
        self.done
    }

    /// Exact: simulates the remaining ladder shape.
    pub fn estimated_remaining_queries(&self) -> usize {
        if self.done {
            return 0;
        }
        let g = self.config.group_size;
        let groups_total = self.groups_in_round();

        let mut count = self
            .pool
            .chunks(g)
            .skip(self.group_cursor)
            .filter(|chunk| chunk.len() >= 2)
            .count();

        if groups_total == 1 {
            return count;
        }

        let mut advancing = self.winners.len() + (groups_total - self.group_cursor);
        loop {
            if advancing <= g {
                if advancing >= 2 {
                    count += 1;
                }
                return count;
            }
            let full = advancing / g;
            let rem = advancing % g;
            count += full + usize::from(rem >= 2);
            advancing = full + usize::from(rem >= 1);
        }
    }

    /// Depth-scaled rank: round k scores live in `[k * g, (k + 1) * g)`.
    fn score_group(&self, local_order: &[usize], board: &mut ScoreBoard) {
        let g = self.config.group_size;
        for (pos, &item) in local_order.iter().enumerate() {
            let rating = (self.round * g + (g - 1 - pos)) as f64;
            board.record_rating(item, rating);
        }
    }

    /// Skip singleton groups and roll the round over until a group of two or
    /// more awaits the oracle, or the ladder collapses to a final group.
    fn advance(&mut self, board: &mut ScoreBoard) {
        loop {
            let groups_total = self.groups_in_round();

            while self.group_cursor < groups_total {
                let group = self.current_group();
                if group.len() >= 2 {
                    return;
                }
                let solo = group[0];
                self.score_group(&[solo], board);
                self.winners.push(solo);
                self.group_cursor += 1;
            }

            if groups_total <= 1 {
                self.done = true;
                return;
            }
            self.pool = std::mem::take(&mut self.winners);
            self.group_cursor = 0;
            self.round += 1;
        }
    }
}

/// Positions sorted by rating, best first, stable on ties.
fn rank_by_rating(group: &[usize], ratings: &[f64]) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..group.len()).collect();
    positions.sort_by(|&a, &b| {
        ratings[b]
            .partial_cmp(&ratings[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    positions.into_iter().map(|p| group[p]).collect()
}
