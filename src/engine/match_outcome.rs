//! Pre-match outcome prediction from team form, venue, head-to-head record
//! and recorded weather.
//!
//! Form is a 0–100 summary of the last five completed matches. The venue
//! term is a fixed home-side bonus rather than anything derived from venue
//! history, and tie/draw probability is always 0: this predictor only
//! models limited-overs matches with a decisive result.

use std::sync::Arc;
use tracing::debug;

use crate::db::models::{HeadToHead, Match, MatchFactors, MatchPrediction};
use crate::error::PredictError;
use crate::store::{MatchStore, PredictionStore};

use super::Outcome;

/// Fixed home-team venue bonus (probability weight, not points).
const VENUE_ADVANTAGE: f64 = 0.2;
/// How many completed matches feed each team's form score.
const FORM_WINDOW: u32 = 5;
/// Form score when a team has no completed-match history.
const NEUTRAL_FORM: f64 = 50.0;

/// Computes and persists pre-match [`MatchPrediction`] rows.
pub struct MatchOutcomeEngine {
    matches: Arc<dyn MatchStore>,
    predictions: Arc<dyn PredictionStore>,
}

impl MatchOutcomeEngine {
    pub fn new(matches: Arc<dyn MatchStore>, predictions: Arc<dyn PredictionStore>) -> Self {
        MatchOutcomeEngine {
            matches,
            predictions,
        }
    }

    /// Compute a fresh prediction and append it to the match's history.
    pub fn predict(&self, match_id: i64) -> Result<MatchPrediction, PredictError> {
        let mat = self
            .matches
            .get_match(match_id)?
            .ok_or(PredictError::MatchNotFound(match_id))?;

        let team1 = mat.home_team.id;
        let team2 = mat.away_team.id;

        let team1_form = form_score(
            &self.matches.list_recent_completed(team1, FORM_WINDOW)?,
            team1,
        );
        let team2_form = form_score(
            &self.matches.list_recent_completed(team2, FORM_WINDOW)?,
            team2,
        );

        let meetings = self.matches.list_completed_meetings(team1, team2)?;
        let head_to_head = head_to_head(&meetings, team1, team2);
        let h2h_factor = if head_to_head.total > 0 {
            (head_to_head.team1_wins - head_to_head.team2_wins) as f64 / head_to_head.total as f64
        } else {
            0.0
        };

        let weather_impact = weather_impact(mat.weather.as_deref());

        // Linear combination; the venue bonus goes to the home side only,
        // the h2h and weather terms flip sign for the away side.
        let raw1 = team1_form + VENUE_ADVANTAGE * 10.0 + h2h_factor * 5.0 + weather_impact * 3.0;
        let raw2 = team2_form - h2h_factor * 5.0 - weather_impact * 3.0;
        let (team1_win_prob, team2_win_prob) = two_pass_normalize(raw1, raw2);

        let confidence = confidence(team1_form, team2_form, head_to_head.total);

        let prediction = MatchPrediction {
            id: None,
            match_id,
            team1_win_prob,
            team2_win_prob,
            tie_draw_prob: 0.0,
            team1_form,
            team2_form,
            venue_advantage: VENUE_ADVANTAGE,
            toss_advantage: 0.0,
            weather_impact,
            head_to_head,
            confidence,
            factors: MatchFactors {
                form_difference: team1_form - team2_form,
                venue_impact: VENUE_ADVANTAGE * 10.0,
                h2h_factor,
            },
            predicted_at: chrono::Utc::now(),
        };
        debug!(
            match_id,
            team1 = team1_win_prob,
            team2 = team2_win_prob,
            confidence,
            "match outcome predicted"
        );
        Ok(self.predictions.insert_match_prediction(prediction)?)
    }

    /// Service entry point: errors become `{success:false, message}`.
    pub fn generate(&self, match_id: i64) -> Outcome<MatchPrediction> {
        Outcome::capture(self.predict(match_id), "match prediction")
    }

    /// Most recent prediction for the match, if one exists.
    pub fn latest(&self, match_id: i64) -> Result<Option<MatchPrediction>, PredictError> {
        Ok(self.predictions.latest_match_prediction(match_id)?)
    }

    /// Read path: newest stored prediction, generating one on a miss.
    pub fn latest_or_generate(&self, match_id: i64) -> Outcome<MatchPrediction> {
        match self.latest(match_id) {
            Ok(Some(prediction)) => Outcome::ok(prediction),
            Ok(None) => self.generate(match_id),
            Err(e) => Outcome::capture(Err(e), "match prediction lookup"),
        }
    }
}

/// Average outcome score over a team's recent completed matches:
/// win 100, no-result/tie 50, loss 0. Neutral 50 with no history.
fn form_score(recent: &[Match], team_id: i64) -> f64 {
    if recent.is_empty() {
        return NEUTRAL_FORM;
    }
    let total: f64 = recent
        .iter()
        .map(|m| match m.winner_team_id {
            Some(winner) if winner == team_id => 100.0,
            Some(_) => 0.0,
            None => 50.0,
        })
        .sum();
    total / recent.len() as f64
}

fn head_to_head(meetings: &[Match], team1: i64, team2: i64) -> HeadToHead {
    let mut h2h = HeadToHead {
        total: meetings.len() as i64,
        ..HeadToHead::default()
    };
    for m in meetings {
        match m.winner_team_id {
            Some(w) if w == team1 => h2h.team1_wins += 1,
            Some(w) if w == team2 => h2h.team2_wins += 1,
            _ => h2h.draws += 1,
        }
    }
    h2h
}

/// Impact of the recorded conditions on the home side's chances.
fn weather_impact(condition: Option<&str>) -> f64 {
    match condition.map(|c| c.to_lowercase()) {
        Some(c) if c == "overcast" || c == "cloudy" => 0.3,
        Some(c) if c == "humid" => 0.2,
        Some(c) if c == "rain" || c == "drizzle" => -0.5,
        _ => 0.0,
    }
}

/// Normalize to 100, clamp each side to [5, 95], then renormalize.
/// Both passes are required: the clamp can push the pair off 100 again.
fn two_pass_normalize(raw1: f64, raw2: f64) -> (f64, f64) {
    let sum = raw1 + raw2;
    let (p1, p2) = if sum <= 0.0 {
        (50.0, 50.0)
    } else {
        (raw1 / sum * 100.0, raw2 / sum * 100.0)
    };
    let p1 = p1.clamp(5.0, 95.0);
    let p2 = p2.clamp(5.0, 95.0);
    let sum = p1 + p2;
    (p1 / sum * 100.0, p2 / sum * 100.0)
}

fn confidence(team1_form: f64, team2_form: f64, h2h_total: i64) -> f64 {
    let mut confidence: f64 = 50.0;
    if team1_form != NEUTRAL_FORM && team2_form != NEUTRAL_FORM {
        confidence += 20.0;
    }
    if h2h_total >= 5 {
        confidence += 20.0;
    } else if h2h_total >= 2 {
        confidence += 10.0;
    }
    if (team1_form - team2_form).abs() < 10.0 {
        confidence -= 10.0;
    }
    confidence.clamp(30.0, 90.0)
}
