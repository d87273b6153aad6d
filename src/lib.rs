//! tourney: human-in-the-loop tournament ranking engine.
//!
//! Ranks a fixed set of opaque items by asking an [`Oracle`], typically a
//! person looking at two pictures, which one they prefer, and aggregating
//! the answers into scored [`Standings`]. Oracle queries are expensive, so
//! each [`StrategyKind`] trades query count against ranking resolution:
//!
//! - [`StrategyKind::Bracket`]: single elimination, n - 1 queries, coarse
//!   order below the champion.
//! - [`StrategyKind::RoundRobin`]: every pair once, C(n, 2) queries, win
//!   counts as scores.
//! - [`StrategyKind::Partition`]: groups per round, winners advance,
//!   O(n log n) group queries.
//! - [`StrategyKind::ComparatorSort`]: quicksort with the oracle as
//!   comparator, a strict total order.
//!
//! No IO, no rendering, no image handling. Bring your own oracle.
//!
//! # Quick start
//!
//! ```rust
//! use tourney::{OrderPolicy, QueryKind, Session, StrategyKind, Verdict};
//!
//! let items = vec!["adams.png", "baker.png", "clark.png", "davis.png"];
//! let mut session = Session::new(items, StrategyKind::Bracket, OrderPolicy::Sequential)
//!     .expect("non-empty item set");
//!
//! // Stand-in for a human: always prefers the first item presented.
//! let mut oracle = |group: &[&'static str], _kind: QueryKind| Verdict::Winner(group[0]);
//! session.run(&mut oracle).unwrap();
//!
//! let standings = session.finalize().unwrap();
//! assert_eq!(standings.winner().item, "adams.png");
//! for ranked in &standings.rankings {
//!     println!("{} scored {}", ranked.item, ranked.score);
//! }
//! ```

use std::fmt::Debug;
use thiserror::Error;

mod bracket;
mod partition;
mod round_robin;
mod scoring;
mod session;
mod sort;
mod strategy;
mod types;

pub use partition::{PartitionConfig, DEFAULT_GROUP_SIZE};
pub use scoring::{ScoreBoard, DEFAULT_WIN_INCREMENT};
pub use session::{Session, SNAPSHOT_SCHEMA_VERSION};
pub use strategy::StrategyKind;
pub use types::{
    OrderPolicy, Oracle, QueryKind, ScoredItem, SessionStatus, Standings, Verdict,
};

/// Everything that can go wrong while ranking.
///
/// The `ResponseKindMismatch` / `ForeignItem` / `MalformedOrder` /
/// `RatingCountMismatch` / `NonFiniteRating` variants are oracle contract
/// violations: fatal to the session, surfaced immediately, never coerced
/// into a usable answer.
#[derive(Error, Debug, PartialEq)]
pub enum TourneyError<T: Debug> {
    /// Bad session setup. Nothing was constructed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// `finalize` called before completion. Recoverable by stepping while
    /// queries remain; terminal if the session was aborted.
    #[error("session is not complete")]
    SessionNotComplete,
    /// The oracle cancelled. Terminal; no standings exist.
    #[error("oracle abandoned the session")]
    Abandoned,
    #[error("oracle answered a {expected:?} query with a {got} response")]
    ResponseKindMismatch {
        expected: QueryKind,
        got: &'static str,
    },
    #[error("oracle response references an item outside the queried group: {0:?}")]
    ForeignItem(T),
    #[error("oracle ordering must contain each queried item exactly once")]
    MalformedOrder,
    #[error("oracle returned {got} ratings for a group of {expected}")]
    RatingCountMismatch { expected: usize, got: usize },
    #[error("oracle returned a non-finite rating")]
    NonFiniteRating,
    /// Snapshot (de)serialization or version trouble.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl<T: Debug> TourneyError<T> {
    /// True for the family of errors caused by an oracle response that does
    /// not match its query.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            TourneyError::ResponseKindMismatch { .. }
                | TourneyError::ForeignItem(_)
                | TourneyError::MalformedOrder
                | TourneyError::RatingCountMismatch { .. }
                | TourneyError::NonFiniteRating
        )
    }
}
