//! Prediction engines.
//!
//! Each engine is an independent calculator over its own slice of match or
//! player history: none of them call each other, and all state lives in the
//! injected stores. Every computation is request-triggered and either
//! persists exactly one row or nothing.

pub mod injury_risk;
pub mod match_outcome;
pub mod performance;
pub mod win_probability;

pub use injury_risk::InjuryRiskEngine;
pub use match_outcome::MatchOutcomeEngine;
pub use performance::PerformanceEngine;
pub use win_probability::WinProbabilityEngine;

use serde::Serialize;
use tracing::warn;

use crate::error::PredictError;

/// Result envelope returned across the service boundary. Callers branch on
/// `success` rather than on errors; engine failures are captured into
/// `message` instead of propagating.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Outcome {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Outcome {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    pub(crate) fn capture(result: Result<T, PredictError>, what: &str) -> Self {
        match result {
            Ok(data) => Outcome::ok(data),
            Err(e) => {
                warn!("{} failed: {}", what, e);
                Outcome::err(e.to_string())
            }
        }
    }
}
