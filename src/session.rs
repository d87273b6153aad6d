use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::scoring::ScoreBoard;
use crate::strategy::{IndexedVerdict, Query, StrategyKind, StrategyState};
use crate::types::{
    OrderPolicy, Oracle, QueryKind, ScoredItem, SessionStatus, Standings, Verdict,
};
use crate::TourneyError;

/// Version tag embedded in serialized session snapshots.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// An in-progress ranking of one item set by one strategy.
///
/// The session owns the item set (read-only after creation), the strategy
/// state, and the score board, and drives exactly one oracle query at a
/// time. Independent sessions share nothing, so several may run side by
/// side without locks.
///
/// ```rust
/// use tourney::{OrderPolicy, QueryKind, Session, StrategyKind, Verdict};
///
/// let items = vec!["a.png", "b.png", "c.png"];
/// let mut session = Session::new(items, StrategyKind::RoundRobin, OrderPolicy::Sequential)
///     .unwrap();
///
/// // A scripted oracle that always prefers the first item shown.
/// let mut oracle = |group: &[&'static str], _: QueryKind| Verdict::Winner(group[0]);
/// session.run(&mut oracle).unwrap();
///
/// let standings = session.finalize().unwrap();
/// assert_eq!(standings.rankings.len(), 3);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound(
    serialize = "T: serde::Serialize",
    deserialize = "T: serde::de::DeserializeOwned"
)))]
pub struct Session<T> {
    /// Playlist order: the items exactly as supplied.
    items: Vec<T>,
    board: ScoreBoard,
    state: StrategyState,
    status: SessionStatus,
    queries_asked: usize,
}

impl<T: Clone + Eq + Hash + Debug> Session<T> {
    /// Create a session, or fail fast with `InvalidConfiguration` without
    /// partially constructing anything.
    pub fn new(
        items: Vec<T>,
        kind: StrategyKind,
        policy: OrderPolicy,
    ) -> Result<Self, TourneyError<T>> {
        if items.is_empty() {
            return Err(TourneyError::InvalidConfiguration(
                "item set is empty".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item) {
                return Err(TourneyError::InvalidConfiguration(format!(
                    "duplicate item: {:?}",
                    item
                )));
            }
        }
        if let StrategyKind::Partition(config) = kind {
            if config.group_size < 2 {
                return Err(TourneyError::InvalidConfiguration(format!(
                    "partition group size must be at least 2, got {}",
                    config.group_size
                )));
            }
        }

        let mut order: Vec<usize> = (0..items.len()).collect();
        if let OrderPolicy::Randomized { seed } = policy {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }

        let mut board = ScoreBoard::new(items.len());
        let state = StrategyState::new(kind, order, &mut board);
        let status = if state.is_complete() {
            SessionStatus::Complete
        } else {
            SessionStatus::Pending
        };

        debug!(?kind, num_items = items.len(), ?policy, "session created");
        Ok(Session {
            items,
            board,
            state,
            status,
            queries_asked: 0,
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.state.kind()
    }

    /// The item set in playlist order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn queries_asked(&self) -> usize {
        self.queries_asked
    }

    /// Advisory count of queries still to come. Exact for bracket,
    /// round-robin, and partition; a lower bound for comparator sort.
    pub fn estimated_remaining_queries(&self) -> usize {
        self.state.estimated_remaining_queries()
    }

    /// Ask the oracle one query and feed the verdict back to the strategy.
    ///
    /// Returns the status after the exchange. Stepping a `Complete` session
    /// is a no-op; stepping an `Abandoned` one returns `Err(Abandoned)`.
    /// Stepping an aborted or failed session is a caller bug and panics.
    pub fn step(&mut self, oracle: &mut impl Oracle<T>) -> Result<SessionStatus, TourneyError<T>> {
        match self.status {
            SessionStatus::Complete => return Ok(SessionStatus::Complete),
            SessionStatus::Abandoned => return Err(TourneyError::Abandoned),
            SessionStatus::Aborted | SessionStatus::Failed => {
                panic!("stepped a session in terminal state {:?}", self.status)
            }
            SessionStatus::Pending | SessionStatus::InProgress => {}
        }

        let query = match self.state.next_query() {
            Some(query) => query,
            None => {
                // A strategy with no queries left must have declared completion.
                debug_assert!(self.state.is_complete());
                self.status = SessionStatus::Complete;
                return Ok(SessionStatus::Complete);
            }
        };
        self.status = SessionStatus::InProgress;

        let group: Vec<T> = query.group.iter().map(|&i| self.items[i].clone()).collect();
        debug!(kind = ?query.kind, group_size = group.len(), "issuing oracle query");
        let verdict = oracle.compare(&group, query.kind);

        if matches!(verdict, Verdict::Abandoned) {
            debug!(queries_asked = self.queries_asked, "oracle abandoned the session");
            self.status = SessionStatus::Abandoned;
            return Err(TourneyError::Abandoned);
        }

        let indexed = match self.validate(&query, &group, verdict) {
            Ok(indexed) => indexed,
            Err(err) => {
                debug!(error = %err, "oracle contract violation");
                self.status = SessionStatus::Failed;
                return Err(err);
            }
        };

        self.state.submit(&query, indexed, &mut self.board);
        self.queries_asked += 1;

        if self.state.is_complete() {
            debug!(queries_asked = self.queries_asked, "session complete");
            self.status = SessionStatus::Complete;
        }
        Ok(self.status)
    }

    /// Step until the strategy completes. Terminal failures (abandonment,
    /// contract violations) surface as errors and leave the session in the
    /// matching terminal state.
    pub fn run(&mut self, oracle: &mut impl Oracle<T>) -> Result<(), TourneyError<T>> {
        while self.step(&mut *oracle)? != SessionStatus::Complete {}
        Ok(())
    }

    /// Caller cancellation: terminal, discards progress. Standings can no
    /// longer be produced.
    pub fn abort(&mut self) {
        debug!(queries_asked = self.queries_asked, "session aborted by caller");
        self.status = SessionStatus::Aborted;
    }

    /// Extract final standings.
    ///
    /// Fails with `SessionNotComplete` while queries remain (keep stepping)
    /// or after `abort` (terminal, do not step), and with `Abandoned` after
    /// oracle cancellation. Never returns partial standings.
    pub fn finalize(&self) -> Result<Standings<T>, TourneyError<T>> {
        match self.status {
            SessionStatus::Complete => {}
            SessionStatus::Abandoned => return Err(TourneyError::Abandoned),
            _ => return Err(TourneyError::SessionNotComplete),
        }

        let mut rankings: Vec<ScoredItem<T>> = self
            .items
            .iter()
            .zip(self.board.snapshot())
            .map(|(item, &score)| ScoredItem {
                item: item.clone(),
                score,
            })
            .collect();
        // Stable sort: equal scores keep playlist order.
        rankings.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(Standings {
            rankings,
            playlist_order: self.items.clone(),
        })
    }

    /// Map a raw verdict into index space, enforcing the oracle contract.
    fn validate(
        &self,
        query: &Query,
        group: &[T],
        verdict: Verdict<T>,
    ) -> Result<IndexedVerdict, TourneyError<T>> {
        match (query.kind, verdict) {
            (QueryKind::SingleWinner, Verdict::Winner(winner)) => {
                let pos = group
                    .iter()
                    .position(|item| *item == winner)
                    .ok_or(TourneyError::ForeignItem(winner))?;
                Ok(IndexedVerdict::Winner(query.group[pos]))
            }
            (QueryKind::TotalOrder, Verdict::Order(order)) => {
                if order.len() != group.len() {
                    return Err(TourneyError::MalformedOrder);
                }
                let mut used = vec![false; group.len()];
                let mut indexed = Vec::with_capacity(order.len());
                for item in order {
                    let pos = group
                        .iter()
                        .position(|member| *member == item)
                        .ok_or(TourneyError::ForeignItem(item))?;
                    if used[pos] {
                        return Err(TourneyError::MalformedOrder);
                    }
                    used[pos] = true;
                    indexed.push(query.group[pos]);
                }
                Ok(IndexedVerdict::Order(indexed))
            }
            (QueryKind::NumericRating, Verdict::Ratings(ratings)) => {
                if ratings.len() != group.len() {
                    return Err(TourneyError::RatingCountMismatch {
                        expected: group.len(),
                        got: ratings.len(),
                    });
                }
                if ratings.iter().any(|r| !r.is_finite()) {
                    return Err(TourneyError::NonFiniteRating);
                }
                Ok(IndexedVerdict::Ratings(ratings))
            }
            (expected, verdict) => Err(TourneyError::ResponseKindMismatch {
                expected,
                got: verdict_name(&verdict),
            }),
        }
    }
}

fn verdict_name<T>(verdict: &Verdict<T>) -> &'static str {
    match verdict {
        Verdict::Order(_) => "order",
        Verdict::Winner(_) => "winner",
        Verdict::Ratings(_) => "ratings",
        Verdict::Abandoned => "abandoned",
    }
}

#[cfg(feature = "serde")]
impl<T> Session<T>
where
    T: Clone + Eq + Hash + Debug + serde::Serialize + serde::de::DeserializeOwned,
{
    /// Serialize the session for pause/resume. The blob carries the strategy
    /// kind tag and a schema version; storage is the caller's concern.
    pub fn to_json(&self) -> Result<String, TourneyError<T>> {
        let envelope = SnapshotRef {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            strategy: self.strategy_kind(),
            session: self,
        };
        serde_json::to_string(&envelope)
            .map_err(|e| TourneyError::Snapshot(format!("failed to serialize: {}", e)))
    }

    /// Restore a session snapshot produced by [`Session::to_json`].
    pub fn from_json(json: &str) -> Result<Self, TourneyError<T>> {
        let envelope: SnapshotOwned<T> = serde_json::from_str(json)
            .map_err(|e| TourneyError::Snapshot(format!("failed to deserialize: {}", e)))?;
        if envelope.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(TourneyError::Snapshot(format!(
                "unsupported snapshot schema version: {}",
                envelope.schema_version
            )));
        }
        if envelope.strategy != envelope.session.strategy_kind() {
            return Err(TourneyError::Snapshot(
                "snapshot strategy tag does not match its session state".to_string(),
            ));
        }
        Ok(envelope.session)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize)]
#[serde(bound(serialize = "T: serde::Serialize"))]
struct SnapshotRef<'a, T> {
    schema_version: u32,
    strategy: StrategyKind,
    session: &'a Session<T>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
struct SnapshotOwned<T> {
    schema_version: u32,
    strategy: StrategyKind,
    session: Session<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_listed_wins(group: &[u32], kind: QueryKind) -> Verdict<u32> {
        match kind {
            QueryKind::SingleWinner => Verdict::Winner(group[0]),
            QueryKind::TotalOrder => Verdict::Order(group.to_vec()),
            QueryKind::NumericRating => {
                Verdict::Ratings((0..group.len()).map(|i| -(i as f64)).collect())
            }
        }
    }

    #[test]
    fn empty_item_set_is_rejected() {
        let result = Session::<u32>::new(vec![], StrategyKind::RoundRobin, OrderPolicy::Sequential);
        assert!(matches!(
            result,
            Err(TourneyError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn duplicate_items_are_rejected() {
        let result = Session::new(vec![1u32, 2, 1], StrategyKind::Bracket, OrderPolicy::Sequential);
        assert!(matches!(
            result,
            Err(TourneyError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn degenerate_partition_group_size_is_rejected() {
        for group_size in [0, 1] {
            let config = crate::PartitionConfig {
                group_size,
                rate_groups: false,
            };
            let result = Session::new(
                vec![1u32, 2, 3],
                StrategyKind::Partition(config),
                OrderPolicy::Sequential,
            );
            assert!(
                matches!(result, Err(TourneyError::InvalidConfiguration(_))),
                "group_size = {}",
                group_size
            );
        }
    }

    #[test]
    fn status_moves_pending_to_in_progress_to_complete() {
        let mut session =
            Session::new(vec![1u32, 2, 3], StrategyKind::RoundRobin, OrderPolicy::Sequential)
                .unwrap();
        assert_eq!(session.status(), SessionStatus::Pending);
        let mut oracle = first_listed_wins;
        session.step(&mut oracle).unwrap();
        assert_eq!(session.status(), SessionStatus::InProgress);
        session.run(&mut oracle).unwrap();
        assert_eq!(session.status(), SessionStatus::Complete);
        assert_eq!(session.queries_asked(), 3);
    }

    #[test]
    fn finalize_before_completion_is_recoverable() {
        let mut session =
            Session::new(vec![1u32, 2, 3], StrategyKind::RoundRobin, OrderPolicy::Sequential)
                .unwrap();
        assert!(matches!(
            session.finalize(),
            Err(TourneyError::SessionNotComplete)
        ));
        let mut oracle = first_listed_wins;
        session.run(&mut oracle).unwrap();
        assert!(session.finalize().is_ok());
    }

    #[test]
    fn abort_is_terminal() {
        let mut session =
            Session::new(vec![1u32, 2, 3], StrategyKind::Bracket, OrderPolicy::Sequential)
                .unwrap();
        session.abort();
        assert_eq!(session.status(), SessionStatus::Aborted);
        assert!(matches!(
            session.finalize(),
            Err(TourneyError::SessionNotComplete)
        ));
    }

    #[test]
    fn single_item_session_is_born_complete() {
        let session =
            Session::new(vec![42u32], StrategyKind::Bracket, OrderPolicy::Sequential).unwrap();
        assert_eq!(session.status(), SessionStatus::Complete);
        let standings = session.finalize().unwrap();
        assert_eq!(standings.winner().item, 42);
    }

    #[test]
    fn foreign_winner_fails_the_session() {
        let mut session =
            Session::new(vec![1u32, 2, 3], StrategyKind::RoundRobin, OrderPolicy::Sequential)
                .unwrap();
        let mut oracle = |_: &[u32], _: QueryKind| Verdict::Winner(99u32);
        let err = session.step(&mut oracle).unwrap_err();
        assert!(matches!(err, TourneyError::ForeignItem(99)));
        assert!(err.is_contract_violation());
        assert_eq!(session.status(), SessionStatus::Failed);
    }

    #[test]
    fn kind_mismatch_fails_the_session() {
        let mut session =
            Session::new(vec![1u32, 2, 3], StrategyKind::RoundRobin, OrderPolicy::Sequential)
                .unwrap();
        let mut oracle = |group: &[u32], _: QueryKind| Verdict::Order(group.to_vec());
        let err = session.step(&mut oracle).unwrap_err();
        assert!(matches!(
            err,
            TourneyError::ResponseKindMismatch {
                expected: QueryKind::SingleWinner,
                ..
            }
        ));
        assert_eq!(session.status(), SessionStatus::Failed);
    }

    #[test]
    fn malformed_order_fails_the_session() {
        let config = crate::PartitionConfig {
            group_size: 3,
            rate_groups: false,
        };
        let mut session = Session::new(
            vec![1u32, 2, 3],
            StrategyKind::Partition(config),
            OrderPolicy::Sequential,
        )
        .unwrap();
        // Duplicates one member, omits another.
        let mut oracle =
            |group: &[u32], _: QueryKind| Verdict::Order(vec![group[0], group[0], group[1]]);
        let err = session.step(&mut oracle).unwrap_err();
        assert!(matches!(err, TourneyError::MalformedOrder));
    }

    #[test]
    fn rating_count_mismatch_fails_the_session() {
        let config = crate::PartitionConfig {
            group_size: 3,
            rate_groups: true,
        };
        let mut session = Session::new(
            vec![1u32, 2, 3],
            StrategyKind::Partition(config),
            OrderPolicy::Sequential,
        )
        .unwrap();
        // One rating short for a group of three.
        let mut oracle = |group: &[u32], _: QueryKind| {
            Verdict::Ratings(vec![1.0; group.len() - 1])
        };
        let err = session.step(&mut oracle).unwrap_err();
        assert!(matches!(
            err,
            TourneyError::RatingCountMismatch {
                expected: 3,
                got: 2
            }
        ));
        assert!(err.is_contract_violation());
        assert_eq!(session.status(), SessionStatus::Failed);
    }

    #[test]
    fn non_finite_rating_fails_the_session() {
        let config = crate::PartitionConfig {
            group_size: 3,
            rate_groups: true,
        };
        let mut session = Session::new(
            vec![1u32, 2, 3],
            StrategyKind::Partition(config),
            OrderPolicy::Sequential,
        )
        .unwrap();
        let mut oracle =
            |group: &[u32], _: QueryKind| Verdict::Ratings(vec![f64::NAN; group.len()]);
        let err = session.step(&mut oracle).unwrap_err();
        assert!(matches!(err, TourneyError::NonFiniteRating));
    }

    #[test]
    #[should_panic(expected = "terminal state")]
    fn stepping_an_aborted_session_panics() {
        let mut session =
            Session::new(vec![1u32, 2], StrategyKind::Bracket, OrderPolicy::Sequential).unwrap();
        session.abort();
        let mut oracle = first_listed_wins;
        let _ = session.step(&mut oracle);
    }

    #[test]
    fn randomized_policy_is_reproducible() {
        let items: Vec<u32> = (0..8).collect();
        let mut run_with = |seed: u64| {
            let mut session = Session::new(
                items.clone(),
                StrategyKind::Bracket,
                OrderPolicy::Randomized { seed },
            )
            .unwrap();
            let mut oracle = first_listed_wins;
            session.run(&mut oracle).unwrap();
            session.finalize().unwrap()
        };
        assert_eq!(run_with(7), run_with(7));
    }
}
