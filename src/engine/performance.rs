//! Expected batting/bowling output for a player in a specific match.
//!
//! Both sub-models work over the player's five most recent entries with a
//! windowed form trend: the latest two entries are compared against the two
//! before them, and the relative change (clamped to ±30%) scales the
//! expectation. Players with no recent history fall back to career
//! aggregates, then to flat tournament defaults.

use std::sync::Arc;
use tracing::debug;

use crate::db::models::{
    BattingEntry, BowlingEntry, PerformanceFactors, PerformancePrediction, Player,
};
use crate::error::PredictError;
use crate::store::{MatchStore, PlayerStore, PredictionStore};

use super::win_probability::overs_to_balls;
use super::Outcome;

/// Entries considered "recent form" for both sub-models.
const RECENT_WINDOW: usize = 5;
/// Form-trend clamp: recent output never moves an expectation more than ±30%.
const TREND_CLAMP: f64 = 0.3;

// Flat defaults for players with neither recent entries nor career numbers.
const DEFAULT_RUNS: f64 = 20.0;
const DEFAULT_BALLS: f64 = 15.0;
const DEFAULT_STRIKE_RATE: f64 = 120.0;
const DEFAULT_BOUNDARY_PROB: f64 = 30.0;
const DEFAULT_WICKETS: f64 = 1.5;
const DEFAULT_OVERS: f64 = 4.0;
const DEFAULT_ECONOMY: f64 = 7.5;
const DEFAULT_WICKET_PROB: f64 = 40.0;

/// Computes and persists [`PerformancePrediction`] rows.
pub struct PerformanceEngine {
    matches: Arc<dyn MatchStore>,
    players: Arc<dyn PlayerStore>,
    predictions: Arc<dyn PredictionStore>,
}

struct BattingForecast {
    expected_runs: f64,
    expected_balls: f64,
    expected_strike_rate: f64,
    boundary_probability: f64,
    trend: f64,
}

struct BowlingForecast {
    expected_wickets: f64,
    expected_overs: f64,
    expected_economy: f64,
    wicket_probability: f64,
    trend: f64,
}

impl PerformanceEngine {
    pub fn new(
        matches: Arc<dyn MatchStore>,
        players: Arc<dyn PlayerStore>,
        predictions: Arc<dyn PredictionStore>,
    ) -> Self {
        PerformanceEngine {
            matches,
            players,
            predictions,
        }
    }

    /// Compute a fresh prediction and append it to the player/match history.
    pub fn predict(
        &self,
        match_id: i64,
        player_id: i64,
    ) -> Result<PerformancePrediction, PredictError> {
        if self.matches.get_match(match_id)?.is_none() {
            return Err(PredictError::MatchNotFound(match_id));
        }
        let player = self
            .players
            .get_player(player_id)?
            .ok_or(PredictError::PlayerNotFound(player_id))?;

        let recent_batting: Vec<&BattingEntry> =
            player.batting_entries.iter().take(RECENT_WINDOW).collect();
        let recent_bowling: Vec<&BowlingEntry> =
            player.bowling_entries.iter().take(RECENT_WINDOW).collect();

        let batting = batting_forecast(&player, &recent_batting);
        let bowling = bowling_forecast(&player, &recent_bowling);
        let confidence = confidence(&player, &recent_batting, &recent_bowling);

        let prediction = PerformancePrediction {
            id: None,
            match_id,
            player_id,
            expected_runs: batting.expected_runs,
            expected_balls: batting.expected_balls,
            expected_strike_rate: batting.expected_strike_rate,
            boundary_probability: batting.boundary_probability,
            expected_wickets: bowling.expected_wickets,
            expected_overs: bowling.expected_overs,
            expected_economy: bowling.expected_economy,
            wicket_probability: bowling.wicket_probability,
            confidence,
            factors: PerformanceFactors {
                batting_trend: batting.trend,
                bowling_trend: bowling.trend,
                recent_batting_entries: recent_batting.len() as i64,
                recent_bowling_entries: recent_bowling.len() as i64,
            },
            predicted_at: chrono::Utc::now(),
        };
        debug!(
            match_id,
            player_id,
            expected_runs = prediction.expected_runs,
            expected_wickets = prediction.expected_wickets,
            confidence,
            "performance predicted"
        );
        Ok(self.predictions.insert_performance_prediction(prediction)?)
    }

    /// Service entry point: errors become `{success:false, message}`.
    pub fn generate(&self, match_id: i64, player_id: i64) -> Outcome<PerformancePrediction> {
        Outcome::capture(self.predict(match_id, player_id), "performance prediction")
    }

    /// Most recent prediction for the (match, player) pair, if any.
    pub fn latest(
        &self,
        match_id: i64,
        player_id: i64,
    ) -> Result<Option<PerformancePrediction>, PredictError> {
        Ok(self
            .predictions
            .latest_performance_prediction(match_id, player_id)?)
    }

    /// Read path: newest stored prediction, generating one on a miss.
    pub fn latest_or_generate(
        &self,
        match_id: i64,
        player_id: i64,
    ) -> Outcome<PerformancePrediction> {
        match self.latest(match_id, player_id) {
            Ok(Some(prediction)) => Outcome::ok(prediction),
            Ok(None) => self.generate(match_id, player_id),
            Err(e) => Outcome::capture(Err(e), "performance prediction lookup"),
        }
    }
}

fn batting_forecast(player: &Player, recent: &[&BattingEntry]) -> BattingForecast {
    if recent.is_empty() {
        return BattingForecast {
            expected_runs: positive_or(player.batting_average, DEFAULT_RUNS),
            expected_balls: DEFAULT_BALLS,
            expected_strike_rate: positive_or(player.strike_rate, DEFAULT_STRIKE_RATE),
            boundary_probability: DEFAULT_BOUNDARY_PROB,
            trend: 0.0,
        };
    }

    let n = recent.len() as f64;
    let avg_runs = recent.iter().map(|e| e.runs as f64).sum::<f64>() / n;
    let avg_balls = recent.iter().map(|e| e.balls_faced as f64).sum::<f64>() / n;
    let avg_sr = recent.iter().map(|e| e.strike_rate).sum::<f64>() / n;

    let boundaries: i64 = recent.iter().map(|e| e.fours + e.sixes).sum();
    let balls: i64 = recent.iter().map(|e| e.balls_faced).sum();
    let boundary_probability = if balls > 0 {
        (boundaries as f64 / balls as f64 * 100.0).clamp(10.0, 60.0)
    } else {
        DEFAULT_BOUNDARY_PROB
    };

    let runs: Vec<f64> = recent.iter().map(|e| e.runs as f64).collect();
    let trend = windowed_trend(&runs);

    BattingForecast {
        expected_runs: avg_runs * (1.0 + trend),
        expected_balls: avg_balls,
        expected_strike_rate: avg_sr * (1.0 + trend * 0.5),
        boundary_probability,
        trend,
    }
}

fn bowling_forecast(player: &Player, recent: &[&BowlingEntry]) -> BowlingForecast {
    if recent.is_empty() {
        let expected_wickets = if player.career_wickets > 0 {
            DEFAULT_WICKETS
        } else {
            0.0
        };
        return BowlingForecast {
            expected_wickets,
            expected_overs: DEFAULT_OVERS,
            expected_economy: positive_or(player.economy_rate, DEFAULT_ECONOMY),
            wicket_probability: DEFAULT_WICKET_PROB,
            trend: 0.0,
        };
    }

    let n = recent.len() as f64;
    let avg_wickets = recent.iter().map(|e| e.wickets as f64).sum::<f64>() / n;
    let avg_overs = recent
        .iter()
        .map(|e| overs_to_balls(e.overs) as f64 / 6.0)
        .sum::<f64>()
        / n;
    let avg_economy = recent.iter().map(|e| e.economy).sum::<f64>() / n;

    let wickets: Vec<f64> = recent.iter().map(|e| e.wickets as f64).collect();
    let trend = windowed_trend(&wickets);

    let strike_matches = recent.iter().filter(|e| e.wickets >= 1).count() as f64;
    let wicket_probability =
        (strike_matches / n * 100.0 * (1.0 + trend)).clamp(20.0, 80.0);

    BowlingForecast {
        expected_wickets: avg_wickets * (1.0 + trend),
        expected_overs: avg_overs,
        // Improving form lowers the expected economy.
        expected_economy: avg_economy * (1.0 - trend * 0.3),
        wicket_probability,
        trend,
    }
}

/// Relative change between the latest two values and the two before them,
/// clamped to ±30%. Values are newest first; fewer than 3 gives no trend.
fn windowed_trend(values: &[f64]) -> f64 {
    if values.len() < 3 {
        return 0.0;
    }
    let recent_avg = (values[0] + values[1]) / 2.0;
    let older = &values[2..values.len().min(4)];
    let older_avg = older.iter().sum::<f64>() / older.len() as f64;
    if older_avg <= 0.0 {
        return 0.0;
    }
    ((recent_avg - older_avg) / older_avg).clamp(-TREND_CLAMP, TREND_CLAMP)
}

fn confidence(player: &Player, batting: &[&BattingEntry], bowling: &[&BowlingEntry]) -> f64 {
    let mut confidence: f64 = 50.0;
    if player.matches_played > 20 {
        confidence += 20.0;
    } else if player.matches_played > 10 {
        confidence += 10.0;
    }
    if batting.len() >= RECENT_WINDOW {
        confidence += 10.0;
    }
    if bowling.len() >= RECENT_WINDOW {
        confidence += 10.0;
    }
    if !batting.is_empty() {
        let runs: Vec<f64> = batting.iter().map(|e| e.runs as f64).collect();
        if population_std_dev(&runs) < 20.0 {
            confidence += 10.0;
        }
    }
    confidence.min(90.0)
}

fn population_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        fallback
    }
}
