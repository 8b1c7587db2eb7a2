//! Bowling workload and injury risk scoring.
//!
//! The score is additive over independent workload signals (overs per match,
//! rest days, age, career volume, pace-bowler profile), capped at 100. The
//! risk level is a pure threshold function of the score, and the rest
//! recommendation is a lookup keyed by level, trend and recent rest.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::db::models::{BowlingEntry, InjuryRiskAssessment, Player, RiskLevel, WorkloadTrend};
use crate::error::PredictError;
use crate::store::{PlayerStore, PredictionStore};

use super::win_probability::overs_to_balls;
use super::Outcome;

/// Bowling entries considered for the total-workload figure.
const WORKLOAD_WINDOW: usize = 20;
/// Bowling entries averaged for the overs-per-match figure.
const AVERAGING_WINDOW: usize = 10;
/// Minimum entries before a workload trend is reported.
const TREND_WINDOW: usize = 6;
/// Assumed rest when a player has no recorded matches.
const DEFAULT_REST_DAYS: i64 = 30;
/// Relative change in recent overs that flips the trend away from STABLE.
const TREND_BAND: f64 = 0.2;

/// Computes and persists [`InjuryRiskAssessment`] rows.
pub struct InjuryRiskEngine {
    players: Arc<dyn PlayerStore>,
    predictions: Arc<dyn PredictionStore>,
}

impl InjuryRiskEngine {
    pub fn new(players: Arc<dyn PlayerStore>, predictions: Arc<dyn PredictionStore>) -> Self {
        InjuryRiskEngine {
            players,
            predictions,
        }
    }

    /// Compute a fresh assessment and append it to the player's history.
    pub fn assess(&self, player_id: i64) -> Result<InjuryRiskAssessment, PredictError> {
        let player = self
            .players
            .get_player(player_id)?
            .ok_or(PredictError::PlayerNotFound(player_id))?;
        let assessment = assess_player(&player, Utc::now());
        debug!(
            player_id,
            risk_score = assessment.risk_score,
            risk_level = assessment.risk_level.as_str(),
            trend = assessment.workload_trend.as_str(),
            "injury risk assessed"
        );
        Ok(self.predictions.insert_injury_assessment(assessment)?)
    }

    /// Service entry point: errors become `{success:false, message}`.
    pub fn generate(&self, player_id: i64) -> Outcome<InjuryRiskAssessment> {
        Outcome::capture(self.assess(player_id), "injury risk assessment")
    }

    /// Most recent assessment for the player, if any.
    pub fn latest(&self, player_id: i64) -> Result<Option<InjuryRiskAssessment>, PredictError> {
        Ok(self.predictions.latest_injury_assessment(player_id)?)
    }

    /// Read path: newest stored assessment, generating one on a miss.
    pub fn latest_or_generate(&self, player_id: i64) -> Outcome<InjuryRiskAssessment> {
        match self.latest(player_id) {
            Ok(Some(assessment)) => Outcome::ok(assessment),
            Ok(None) => self.generate(player_id),
            Err(e) => Outcome::capture(Err(e), "injury risk lookup"),
        }
    }
}

/// Pure assessment over an already-loaded player at a fixed instant.
fn assess_player(player: &Player, now: DateTime<Utc>) -> InjuryRiskAssessment {
    let recent: Vec<&BowlingEntry> = player
        .bowling_entries
        .iter()
        .take(WORKLOAD_WINDOW)
        .collect();

    let balls_bowled: i64 = recent.iter().map(|e| overs_to_balls(e.overs)).sum();
    let averaging = &recent[..recent.len().min(AVERAGING_WINDOW)];
    let overs_per_match = if averaging.is_empty() {
        0.0
    } else {
        averaging
            .iter()
            .map(|e| overs_to_balls(e.overs) as f64 / 6.0)
            .sum::<f64>()
            / averaging.len() as f64
    };

    let rest_days = rest_days(player, now);
    let age = player.age_at(now);
    let risk_score = risk_score(player, overs_per_match, rest_days, age);
    let risk_level = RiskLevel::from_score(risk_score);
    let workload_trend = workload_trend(&recent);
    let (recommendation, days_to_rest) =
        recommendation(risk_level, workload_trend, rest_days);

    InjuryRiskAssessment {
        id: None,
        player_id: player.id,
        risk_level,
        risk_score,
        balls_bowled,
        overs_per_match,
        matches_played: player.matches_played,
        rest_days,
        age,
        injury_history: "no recorded injuries; workload-based assessment".into(),
        workload_trend,
        recommendation,
        days_to_rest,
        assessed_at: now,
    }
}

/// Days since the player's most recent recorded match (batting or bowling).
fn rest_days(player: &Player, now: DateTime<Utc>) -> i64 {
    let last_bowled = player.bowling_entries.first().map(|e| e.match_date);
    let last_batted = player.batting_entries.first().map(|e| e.match_date);
    match last_bowled.into_iter().chain(last_batted).max() {
        Some(last) => (now - last).num_days().max(0),
        None => DEFAULT_REST_DAYS,
    }
}

fn risk_score(player: &Player, overs_per_match: f64, rest_days: i64, age: Option<i64>) -> f64 {
    let mut score: f64 = 0.0;

    if overs_per_match > 10.0 {
        score += 30.0;
    } else if overs_per_match > 8.0 {
        score += 20.0;
    } else if overs_per_match > 6.0 {
        score += 10.0;
    }

    if rest_days < 3 {
        score += 25.0;
    } else if rest_days < 7 {
        score += 15.0;
    } else if rest_days < 14 {
        score += 5.0;
    }

    if let Some(age) = age {
        if age > 35 {
            score += 20.0;
        } else if age > 30 {
            score += 10.0;
        } else if age < 20 {
            score += 5.0;
        }
    }

    if player.matches_played > 50 {
        score += 15.0;
    } else if player.matches_played > 30 {
        score += 10.0;
    } else if player.matches_played > 15 {
        score += 5.0;
    }

    // Pace-bowler profile: high strain per over.
    if player.bowling_average > 0.0 && player.economy_rate < 6.0 {
        score += 10.0;
    }

    score.min(100.0)
}

/// Most-recent-3 average overs against the 3 before them, with a ±20% band.
fn workload_trend(recent: &[&BowlingEntry]) -> WorkloadTrend {
    if recent.len() < TREND_WINDOW {
        return WorkloadTrend::InsufficientData;
    }
    let overs = |e: &&BowlingEntry| overs_to_balls(e.overs) as f64 / 6.0;
    let latest: f64 = recent[..3].iter().map(overs).sum::<f64>() / 3.0;
    let previous: f64 = recent[3..6].iter().map(overs).sum::<f64>() / 3.0;
    if previous <= 0.0 {
        return if latest > 0.0 {
            WorkloadTrend::Increasing
        } else {
            WorkloadTrend::Stable
        };
    }
    let change = (latest - previous) / previous;
    if change > TREND_BAND {
        WorkloadTrend::Increasing
    } else if change < -TREND_BAND {
        WorkloadTrend::Decreasing
    } else {
        WorkloadTrend::Stable
    }
}

fn recommendation(
    level: RiskLevel,
    trend: WorkloadTrend,
    rest_days: i64,
) -> (String, i64) {
    let trend_note = match trend {
        WorkloadTrend::Increasing => " Recent workload is climbing; cut back bowling volume now.",
        WorkloadTrend::Decreasing => " Workload is already tapering; keep the reduced schedule.",
        _ => "",
    };
    match level {
        RiskLevel::Critical => (
            format!(
                "Mandatory rest: stop bowling immediately and schedule a full fitness review.{}",
                trend_note
            ),
            21,
        ),
        RiskLevel::High => (
            format!(
                "High strain: withdraw from the next fixtures and limit net sessions.{}",
                trend_note
            ),
            14,
        ),
        RiskLevel::Medium => {
            let days = if rest_days < 7 { 7 } else { 3 };
            (
                format!(
                    "Elevated load: rotate out where possible and monitor between matches.{}",
                    trend_note
                ),
                days,
            )
        }
        RiskLevel::Low => (
            format!("Workload is sustainable; no rest required.{}", trend_note),
            0,
        ),
    }
}
