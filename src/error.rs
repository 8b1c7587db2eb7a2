use thiserror::Error;

/// Data-store failures. Propagated unchanged: the engines perform no retry
/// or recovery on a failed read or write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid stored factors payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the prediction engines.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("match {0} not found")]
    MatchNotFound(i64),

    #[error("innings {number} of match {match_id} not found")]
    InningsNotFound { match_id: i64, number: i64 },

    #[error("player {0} not found")]
    PlayerNotFound(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}
