use crate::scoring::ScoreBoard;
use crate::strategy::{IndexedVerdict, Query};
use crate::types::QueryKind;

/// Quicksort with a human comparator.
///
/// Iterative Lomuto partitioning, descending (best item first). The pivot is
/// the last element of the *current* sub-range, and each element-vs-pivot
/// comparison is one `SingleWinner` query: the group is `[element, pivot]`
/// and the element moves ahead of the pivot only when it wins outright, so
/// an oracle that keeps favouring one side of equals still terminates.
/// Sub-ranges of length < 2 are never pushed.
///
/// On completion, position `p` (0-based, best first) gets score `n - p` via
/// `record_rating`, a strict total order with no ties.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct ComparatorSort {
    /// Current arrangement; fully sorted best-first once done.
    order: Vec<usize>,
    /// Sub-ranges (lo, hi), inclusive, awaiting partitioning.
    stack: Vec<(usize, usize)>,
    /// Partition scan currently consulting the oracle.
    scan: Option<Scan>,
    done: bool,
}

/// One in-flight Lomuto partition pass over `[lo, hi]` with pivot
/// `order[hi]`. `store` is the boundary of the beats-pivot prefix; `probe`
/// walks `lo..hi`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Scan {
    lo: usize,
    hi: usize,
    store: usize,
    probe: usize,
}

impl ComparatorSort {
    pub fn new(order: Vec<usize>, board: &mut ScoreBoard) -> Self {
        let n = order.len();
        let mut sort = ComparatorSort {
            order,
            stack: if n > 1 { vec![(0, n - 1)] } else { Vec::new() },
            scan: None,
            done: false,
        };
        sort.advance(board);
        sort
    }

    pub fn next_query(&self) -> Option<Query> {
        let scan = self.scan.as_ref()?;
        Some(Query {
            kind: QueryKind::SingleWinner,
            group: vec![self.order[scan.probe], self.order[scan.hi]],
        })
    }

    pub fn submit(&mut self, query: &Query, verdict: IndexedVerdict, board: &mut ScoreBoard) {
        let winner = match verdict {
            IndexedVerdict::Winner(w) => w,
            other => panic!("comparator sort expects a winner verdict, got {:?}", other),
        };
        let scan = self.scan.as_mut().expect("no partition scan in flight");

        // query.group[0] is the probed element; a pivot win leaves it in place.
        if winner == query.group[0] {
            self.order.swap(scan.store, scan.probe);
            scan.store += 1;
        }
        scan.probe += 1;

        if scan.probe == scan.hi {
            self.order.swap(scan.store, scan.hi);
            let (lo, hi, pivot_at) = (scan.lo, scan.hi, scan.store);
            self.scan = None;
            if pivot_at > lo + 1 {
                self.stack.push((lo, pivot_at - 1));
            }
            if pivot_at + 1 < hi {
                self.stack.push((pivot_at + 1, hi));
            }
            self.advance(board);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.done
    }

    /// Advisory lower bound: the active scan's remaining probes plus one
    /// full partition pass per pending sub-range.
    pub fn estimated_remaining_queries(&self) -> usize {
        let active = self.scan.as_ref().map_or(0, |scan| scan.hi - scan.probe);
        active + self.stack.iter().map(|&(lo, hi)| hi - lo).sum::<usize>()
    }

    fn advance(&mut self, board: &mut ScoreBoard) {
        if self.scan.is_some() || self.done {
            return;
        }
        match self.stack.pop() {
            Some((lo, hi)) => {
                self.scan = Some(Scan {
                    lo,
                    hi,
                    store: lo,
                    probe: lo,
                });
            }
            None => {
                let n = self.order.len();
                for (pos, &item) in self.order.iter().enumerate() {
                    board.record_rating(item, (n - pos) as f64);
                }
                self.done = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the sort with a pure comparator: lower index is better.
    fn play_out(initial: Vec<usize>) -> (ComparatorSort, ScoreBoard, usize) {
        let n = initial.len();
        let mut board = ScoreBoard::new(n);
        let mut sort = ComparatorSort::new(initial, &mut board);
        let mut queries = 0;
        while let Some(query) = sort.next_query() {
            queries += 1;
            let winner = *query.group.iter().min().unwrap();
            sort.submit(&query, IndexedVerdict::Winner(winner), &mut board);
        }
        (sort, board, queries)
    }

    #[test]
    fn sorts_reversed_input() {
        let (sort, board, _) = play_out(vec![4, 3, 2, 1, 0]);
        assert!(sort.is_complete());
        assert_eq!(sort.order, vec![0, 1, 2, 3, 4]);
        assert_eq!(board.snapshot(), &[5.0, 4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn sorts_interleaved_input() {
        let (sort, board, queries) = play_out(vec![3, 0, 5, 1, 4, 2, 6]);
        assert_eq!(sort.order, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(board.snapshot()[0], 7.0);
        assert_eq!(board.snapshot()[6], 1.0);
        assert!(queries >= 6, "quicksort needs at least n - 1 comparisons");
    }

    #[test]
    fn scores_form_a_strict_total_order() {
        let (_, board, _) = play_out(vec![2, 4, 0, 3, 1]);
        let mut scores = board.snapshot().to_vec();
        scores.sort_by(|a, b| a.partial_cmp(b).unwrap());
        scores.dedup();
        assert_eq!(scores.len(), 5);
    }

    #[test]
    fn single_item_completes_without_queries() {
        let (sort, board, queries) = play_out(vec![0]);
        assert!(sort.is_complete());
        assert_eq!(queries, 0);
        assert_eq!(board.snapshot(), &[1.0]);
    }

    #[test]
    fn pivot_biased_oracle_terminates() {
        // An "everything ties" oracle that always hands the win to the pivot.
        let n = 6;
        let mut board = ScoreBoard::new(n);
        let mut sort = ComparatorSort::new((0..n).collect(), &mut board);
        let mut queries = 0;
        while let Some(query) = sort.next_query() {
            queries += 1;
            assert!(queries <= n * n, "sort failed to terminate");
            sort.submit(&query, IndexedVerdict::Winner(query.group[1]), &mut board);
        }
        assert!(sort.is_complete());
    }

    #[test]
    fn estimate_never_exceeds_actual_queries() {
        let initial = vec![5, 2, 7, 0, 6, 1, 4, 3];
        let mut board = ScoreBoard::new(initial.len());
        let mut sort = ComparatorSort::new(initial, &mut board);
        while let Some(query) = sort.next_query() {
            let estimate = sort.estimated_remaining_queries();
            let mut probe = sort.clone();
            let mut probe_board = board.clone();
            let mut actual = 0;
            while let Some(q) = probe.next_query() {
                actual += 1;
                let winner = *q.group.iter().min().unwrap();
                probe.submit(&q, IndexedVerdict::Winner(winner), &mut probe_board);
            }
            assert!(estimate <= actual);
            let winner = *query.group.iter().min().unwrap();
            sort.submit(&query, IndexedVerdict::Winner(winner), &mut board);
        }
    }
}
