//! Repository traits consumed by the prediction engines.
//!
//! Each engine takes the stores it needs by constructor injection; tests run
//! the same engines against an in-memory [`Database`].
//!
//! [`Database`]: crate::db::Database

use crate::db::models::*;
use crate::error::StoreError;

/// Read-only view over match records.
pub trait MatchStore: Send + Sync {
    /// Fetch a match with nested teams and innings.
    fn get_match(&self, id: i64) -> Result<Option<Match>, StoreError>;

    /// Most recent completed matches involving `team_id`, newest first.
    fn list_recent_completed(&self, team_id: i64, limit: u32) -> Result<Vec<Match>, StoreError>;

    /// All completed meetings between the two teams, in either home/away order.
    fn list_completed_meetings(&self, team_a: i64, team_b: i64)
        -> Result<Vec<Match>, StoreError>;
}

/// Read-only view over player records.
pub trait PlayerStore: Send + Sync {
    /// Fetch a player with recent batting/bowling entries, newest first.
    fn get_player(&self, id: i64) -> Result<Option<Player>, StoreError>;
}

/// Append-only sinks for computed prediction records. Every insert returns
/// the created row with a store-assigned id and timestamp; rows are never
/// updated in place, and `latest_*` lookups order by descending timestamp.
pub trait PredictionStore: Send + Sync {
    fn insert_win_probability(
        &self,
        sample: WinProbabilitySample,
    ) -> Result<WinProbabilitySample, StoreError>;

    /// Time-series for a match, ordered by (over_number, ball_number).
    fn list_win_probabilities(&self, match_id: i64)
        -> Result<Vec<WinProbabilitySample>, StoreError>;

    fn latest_win_probability(
        &self,
        match_id: i64,
    ) -> Result<Option<WinProbabilitySample>, StoreError>;

    fn insert_match_prediction(
        &self,
        prediction: MatchPrediction,
    ) -> Result<MatchPrediction, StoreError>;

    fn latest_match_prediction(&self, match_id: i64)
        -> Result<Option<MatchPrediction>, StoreError>;

    fn insert_performance_prediction(
        &self,
        prediction: PerformancePrediction,
    ) -> Result<PerformancePrediction, StoreError>;

    fn latest_performance_prediction(
        &self,
        match_id: i64,
        player_id: i64,
    ) -> Result<Option<PerformancePrediction>, StoreError>;

    fn insert_injury_assessment(
        &self,
        assessment: InjuryRiskAssessment,
    ) -> Result<InjuryRiskAssessment, StoreError>;

    fn latest_injury_assessment(
        &self,
        player_id: i64,
    ) -> Result<Option<InjuryRiskAssessment>, StoreError>;
}
