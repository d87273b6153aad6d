use crate::scoring::ScoreBoard;
use crate::strategy::{IndexedVerdict, Query};
use crate::types::QueryKind;

/// Single-elimination bracket.
///
/// Round 1 is seeded directly from the initial order and padded with byes up
/// to the next power of two. A bye slot is `None`; whatever faces a bye
/// advances without an oracle query and collects bye credit on the board, so
/// an item's score always equals the number of rounds it survived. That keeps
/// the champion strictly on top even when it was seeded through byes.
///
/// Every real match is one `SingleWinner` query; the winner is credited
/// against that round's loser only. Items eliminated in deeper rounds
/// therefore rank above items eliminated earlier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct Bracket {
    /// Slots of the round currently in play. `None` is a bye.
    round: Vec<Option<usize>>,
    /// Advancers collected for the next round.
    next: Vec<Option<usize>>,
    /// Pair currently being played: slots `2 * cursor` and `2 * cursor + 1`.
    cursor: usize,
    /// 1-based round counter.
    round_number: usize,
    champion: Option<usize>,
}

impl Bracket {
    pub fn new(order: Vec<usize>, board: &mut ScoreBoard) -> Self {
        let padded = order.len().next_power_of_two();
        let mut round: Vec<Option<usize>> = order.into_iter().map(Some).collect();
        round.resize(padded, None);

        let mut bracket = Bracket {
            round,
            next: Vec::new(),
            cursor: 0,
            round_number: 1,
            champion: None,
        };
        bracket.advance(board);
        bracket
    }

    pub fn next_query(&self) -> Option<Query> {
        if self.champion.is_some() {
            return None;
        }
        // advance() leaves the cursor on a pair of two real competitors.
        let a = self.round[2 * self.cursor].expect("bracket not normalized");
        let b = self.round[2 * self.cursor + 1].expect("bracket not normalized");
        Some(Query {
            kind: QueryKind::SingleWinner,
            group: vec![a, b],
        })
    }

    pub fn submit(&mut self, query: &Query, verdict: IndexedVerdict, board: &mut ScoreBoard) {
        let winner = match verdict {
            IndexedVerdict::Winner(w) => w,
            other => panic!("bracket expects a winner verdict, got {:?}", other),
        };
        let loser = if query.group[0] == winner {
            query.group[1]
        } else {
            query.group[0]
        };

        board.record_winner(winner, &[loser]);
        self.next.push(Some(winner));
        self.cursor += 1;
        self.advance(board);
    }

    pub fn is_complete(&self) -> bool {
        self.champion.is_some()
    }

    /// Exact: each remaining match eliminates exactly one live competitor.
    pub fn estimated_remaining_queries(&self) -> usize {
        if self.champion.is_some() {
            return 0;
        }
        let alive = self.round[2 * self.cursor..]
            .iter()
            .chain(self.next.iter())
            .filter(|slot| slot.is_some())
            .count();
        alive.saturating_sub(1)
    }

    pub fn champion(&self) -> Option<usize> {
        self.champion
    }

    #[cfg(test)]
    pub fn rounds_played(&self) -> usize {
        self.round_number
    }

    /// Resolve byes and round boundaries until the cursor rests on a real
    /// match or a champion emerges.
    fn advance(&mut self, board: &mut ScoreBoard) {
        loop {
            if self.round.len() == 1 {
                self.champion = self.round[0];
                debug_assert!(self.champion.is_some(), "bracket ended on a bye");
                return;
            }

            while self.cursor < self.round.len() / 2 {
                let a = self.round[2 * self.cursor];
                let b = self.round[2 * self.cursor + 1];
                match (a, b) {
                    (Some(_), Some(_)) => return,
                    (Some(x), None) | (None, Some(x)) => {
                        board.record_bye(x);
                        self.next.push(Some(x));
                    }
                    (None, None) => self.next.push(None),
                }
                self.cursor += 1;
            }

            self.round = std::mem::take(&mut self.next);
            self.cursor = 0;
            self.round_number += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the bracket with a rule: the lower index always wins.
    fn play_out(n: usize) -> (Bracket, ScoreBoard, usize) {
        let mut board = ScoreBoard::new(n);
        let mut bracket = Bracket::new((0..n).collect(), &mut board);
        let mut queries = 0;
        while let Some(query) = bracket.next_query() {
            queries += 1;
            let winner = *query.group.iter().min().unwrap();
            bracket.submit(&query, IndexedVerdict::Winner(winner), &mut board);
        }
        (bracket, board, queries)
    }

    #[test]
    fn four_items_two_rounds_one_champion() {
        let (bracket, board, queries) = play_out(4);
        assert_eq!(bracket.champion(), Some(0));
        assert_eq!(bracket.rounds_played(), 2);
        assert_eq!(queries, 3);
        assert_eq!(board.snapshot(), &[2.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn five_items_pad_to_eight_with_three_byes() {
        let (bracket, _board, queries) = play_out(5);
        assert_eq!(bracket.champion(), Some(0));
        // ceil(log2(5)) rounds, byes never reach the oracle.
        assert_eq!(bracket.rounds_played(), 3);
        assert_eq!(queries, 4);
    }

    #[test]
    fn bye_credit_keeps_late_seed_above_runner_up() {
        // Index 4 rides byes into the final and wins everything there.
        let n = 5;
        let mut board = ScoreBoard::new(n);
        let mut bracket = Bracket::new((0..n).collect(), &mut board);
        while let Some(query) = bracket.next_query() {
            let winner = *query.group.iter().max().unwrap();
            bracket.submit(&query, IndexedVerdict::Winner(winner), &mut board);
        }
        assert_eq!(bracket.champion(), Some(4));
        let scores = board.snapshot();
        let runner_up_best = scores[..4].iter().cloned().fold(f64::MIN, f64::max);
        assert!(scores[4] > runner_up_best);
    }

    #[test]
    fn single_item_is_champion_without_queries() {
        let (bracket, board, queries) = play_out(1);
        assert_eq!(bracket.champion(), Some(0));
        assert_eq!(queries, 0);
        assert_eq!(board.snapshot(), &[0.0]);
    }

    #[test]
    fn remaining_query_estimate_is_exact() {
        let n = 6;
        let mut board = ScoreBoard::new(n);
        let mut bracket = Bracket::new((0..n).collect(), &mut board);
        let mut actual_remaining = 0;
        {
            let mut probe = bracket.clone();
            let mut probe_board = board.clone();
            while let Some(query) = probe.next_query() {
                actual_remaining += 1;
                let winner = query.group[0];
                probe.submit(&query, IndexedVerdict::Winner(winner), &mut probe_board);
            }
        }
        assert_eq!(bracket.estimated_remaining_queries(), actual_remaining);

        let query = bracket.next_query().unwrap();
        bracket.submit(&query, IndexedVerdict::Winner(query.group[0]), &mut board);
        assert_eq!(bracket.estimated_remaining_queries(), actual_remaining - 1);
    }
}
