//! Cricket tournament prediction engines.
//!
//! Four deterministic heuristic engines (live win probability, pre-match
//! outcome, player performance, injury risk) plus a style-rotating
//! ball-by-ball commentary generator. Each engine reads recent history
//! through injected store traits and appends one immutable record per
//! computation; the engines never call each other.

pub mod commentary;
pub mod db;
pub mod engine;
pub mod error;
pub mod store;

pub use engine::{
    InjuryRiskEngine, MatchOutcomeEngine, Outcome, PerformanceEngine, WinProbabilityEngine,
};
