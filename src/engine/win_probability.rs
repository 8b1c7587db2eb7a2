//! Live ball-by-ball win probability for a two-innings limited-overs match.
//!
//! The model is a deterministic heuristic, not a fitted curve:
//! - **First innings** (no target yet): project the final total from the
//!   current run rate, dampen it by wickets already lost, and compare the
//!   projection against a fixed par score.
//! - **Second innings**: map the required run rate onto a piecewise-linear
//!   chase curve, then scale by wickets in hand and balls remaining.
//!
//! Both team probabilities are clamped to [0, 100] and renormalized so they
//! sum to exactly 100 on every sample, including the short-circuit cases.

use std::sync::Arc;
use tracing::debug;

use crate::db::models::{Innings, Match, WinProbabilitySample};
use crate::error::PredictError;
use crate::store::{MatchStore, PredictionStore};

use super::Outcome;

/// Par first-innings total the projection is compared against.
const AVERAGE_FIRST_INNINGS_TOTAL: f64 = 160.0;

/// Computes and persists one [`WinProbabilitySample`] per ball event.
pub struct WinProbabilityEngine {
    matches: Arc<dyn MatchStore>,
    predictions: Arc<dyn PredictionStore>,
}

impl WinProbabilityEngine {
    pub fn new(matches: Arc<dyn MatchStore>, predictions: Arc<dyn PredictionStore>) -> Self {
        WinProbabilityEngine {
            matches,
            predictions,
        }
    }

    /// Compute the sample for the given ball and append it to the history.
    pub fn compute(
        &self,
        match_id: i64,
        innings_number: i64,
        over_number: i64,
        ball_number: i64,
    ) -> Result<WinProbabilitySample, PredictError> {
        let mat = self
            .matches
            .get_match(match_id)?
            .ok_or(PredictError::MatchNotFound(match_id))?;
        let innings = mat
            .innings_by_number(innings_number)
            .ok_or(PredictError::InningsNotFound {
                match_id,
                number: innings_number,
            })?;

        let sample = build_sample(&mat, innings, over_number, ball_number);
        debug!(
            match_id,
            innings_number,
            over_number,
            ball_number,
            team1 = sample.team1_probability,
            team2 = sample.team2_probability,
            "win probability computed"
        );
        Ok(self.predictions.insert_win_probability(sample)?)
    }

    /// Service entry point: errors become `{success:false, message}`.
    pub fn generate(
        &self,
        match_id: i64,
        innings_number: i64,
        over_number: i64,
        ball_number: i64,
    ) -> Outcome<WinProbabilitySample> {
        Outcome::capture(
            self.compute(match_id, innings_number, over_number, ball_number),
            "win probability",
        )
    }

    /// Most recent sample for the match, if any has been computed.
    pub fn latest(&self, match_id: i64) -> Result<Option<WinProbabilitySample>, PredictError> {
        Ok(self.predictions.latest_win_probability(match_id)?)
    }

    /// Full ball-by-ball series for a match, ordered by (over, ball).
    pub fn series(&self, match_id: i64) -> Result<Vec<WinProbabilitySample>, PredictError> {
        Ok(self.predictions.list_win_probabilities(match_id)?)
    }

    /// Read path: return the cached latest sample, computing one on a miss.
    pub fn latest_or_generate(
        &self,
        match_id: i64,
        innings_number: i64,
        over_number: i64,
        ball_number: i64,
    ) -> Outcome<WinProbabilitySample> {
        match self.latest(match_id) {
            Ok(Some(sample)) => Outcome::ok(sample),
            Ok(None) => self.generate(match_id, innings_number, over_number, ball_number),
            Err(e) => Outcome::capture(Err(e), "win probability lookup"),
        }
    }
}

/// Pure computation over already-loaded match state.
fn build_sample(
    mat: &Match,
    innings: &Innings,
    over_number: i64,
    ball_number: i64,
) -> WinProbabilitySample {
    let balls_total = mat.overs_per_innings * 6;
    let balls_bowled = overs_to_balls(innings.overs).min(balls_total);
    let balls_remaining = balls_total - balls_bowled;
    let score = innings.total_runs;
    let wickets = innings.total_wickets;

    let (batting_prob, target, required_run_rate) = if innings.number <= 1 {
        (
            first_innings_probability(score, wickets, balls_bowled, balls_remaining),
            None,
            None,
        )
    } else {
        // Target is set by the first innings; fall back to a fresh chase if
        // the first innings row is somehow absent.
        let target = mat
            .innings_by_number(1)
            .map(|first| first.total_runs + 1)
            .unwrap_or(1);
        let runs_needed = target - score;
        let rrr = if balls_remaining > 0 {
            runs_needed as f64 * 6.0 / balls_remaining as f64
        } else {
            0.0
        };
        let prob = chase_probability(score, target, 10 - wickets, balls_remaining);
        (prob, Some(target), Some(rrr))
    };

    // The batting side's complement is taken before clamping.
    let other_prob = 100.0 - batting_prob;
    let (batting_prob, other_prob) = normalize_pair(batting_prob, other_prob);

    // team1 is the home team regardless of who is batting.
    let (team1_probability, team2_probability) = if innings.batting_team_id == mat.home_team.id {
        (batting_prob, other_prob)
    } else {
        (other_prob, batting_prob)
    };

    WinProbabilitySample {
        id: None,
        match_id: mat.id,
        innings_id: innings.id,
        over_number,
        ball_number,
        team1_probability,
        team2_probability,
        current_score: score,
        wickets_lost: wickets,
        target,
        balls_remaining,
        required_run_rate,
        calculated_at: chrono::Utc::now(),
    }
}

/// Convert X.Y overs notation to a legal-ball count.
/// 4.3 means 4 completed overs plus 3 balls, not a decimal fraction.
pub fn overs_to_balls(overs: f64) -> i64 {
    let completed = overs.floor();
    let balls = (overs - completed) * 10.0;
    completed as i64 * 6 + balls.round() as i64
}

/// Batting-side win probability in the first innings (0–100, pre-clamp).
fn first_innings_probability(
    score: i64,
    wickets_lost: i64,
    balls_bowled: i64,
    balls_remaining: i64,
) -> f64 {
    if balls_bowled == 0 {
        return 50.0;
    }
    let current_run_rate = score as f64 / balls_bowled as f64 * 6.0;
    let projected_total = score as f64 + current_run_rate * balls_remaining as f64 / 6.0;
    let wicket_factor = (10 - wickets_lost) as f64 / 10.0;
    let adjusted_projection = projected_total * (0.7 + 0.3 * wicket_factor);
    // One probability point per run above or below the par score.
    let shift = adjusted_projection - AVERAGE_FIRST_INNINGS_TOTAL;
    50.0 + shift
}

/// Chasing-side win probability in the second innings (0–100, pre-clamp).
fn chase_probability(
    current_score: i64,
    target: i64,
    wickets_in_hand: i64,
    balls_remaining: i64,
) -> f64 {
    if current_score >= target {
        return 100.0;
    }
    if wickets_in_hand <= 0 {
        return 0.0;
    }
    if balls_remaining <= 0 {
        return 0.0;
    }

    let runs_needed = (target - current_score) as f64;
    let required_run_rate = runs_needed * 6.0 / balls_remaining as f64;
    let base = chase_base_probability(required_run_rate);

    let wicket_scale = 0.5 + 0.5 * (wickets_in_hand as f64 / 10.0);
    let balls_scale = 0.7 + 0.3 * (balls_remaining as f64 / 60.0).min(1.0);
    base * wicket_scale * balls_scale
}

/// Piecewise-linear mapping from required run rate to chase probability.
/// Breakpoints at 6, 10, 12 and 15 runs per over.
fn chase_base_probability(rrr: f64) -> f64 {
    if rrr <= 6.0 {
        90.0 - (6.0 - rrr) * 2.0
    } else if rrr <= 10.0 {
        70.0 - (rrr - 6.0) * 5.0
    } else if rrr <= 12.0 {
        50.0 - (rrr - 10.0) * 10.0
    } else if rrr <= 15.0 {
        30.0 - (rrr - 12.0) * 6.67
    } else {
        10.0 - ((rrr - 15.0) * 2.0).min(10.0)
    }
}

/// Clamp both probabilities to [0, 100], then rescale so they sum to
/// exactly 100. Applied unconditionally, even when nothing was clamped.
fn normalize_pair(a: f64, b: f64) -> (f64, f64) {
    let a = a.clamp(0.0, 100.0);
    let b = b.clamp(0.0, 100.0);
    let sum = a + b;
    if sum <= 0.0 {
        return (50.0, 50.0);
    }
    (a / sum * 100.0, b / sum * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{MatchStatus, Team};
    use approx::assert_relative_eq;
    use chrono::Utc;

    fn make_match(innings: Vec<Innings>) -> Match {
        Match {
            id: 1,
            home_team: Team {
                id: 10,
                name: "Home".into(),
            },
            away_team: Team {
                id: 20,
                name: "Away".into(),
            },
            venue: "Eden".into(),
            match_date: Utc::now(),
            status: MatchStatus::Live,
            winner_team_id: None,
            weather: None,
            overs_per_innings: 20,
            innings,
        }
    }

    fn innings(number: i64, batting_team_id: i64, runs: i64, wickets: i64, overs: f64) -> Innings {
        Innings {
            id: number,
            match_id: 1,
            number,
            batting_team_id,
            total_runs: runs,
            total_wickets: wickets,
            overs,
        }
    }

    // ── Overs notation ───────────────────────────────────────────────────────

    #[test]
    fn overs_notation_converts_to_balls() {
        assert_eq!(overs_to_balls(0.0), 0);
        assert_eq!(overs_to_balls(4.3), 27);
        assert_eq!(overs_to_balls(10.0), 60);
        assert_eq!(overs_to_balls(19.5), 119);
        assert_eq!(overs_to_balls(20.0), 120);
    }

    // ── First innings ────────────────────────────────────────────────────────

    #[test]
    fn no_balls_bowled_is_even_money() {
        let mat = make_match(vec![innings(1, 10, 0, 0, 0.0)]);
        let sample = build_sample(&mat, &mat.innings[0], 0, 0);
        assert_relative_eq!(sample.team1_probability, 50.0, epsilon = 1e-9);
        assert_relative_eq!(sample.team2_probability, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn first_innings_worked_example() {
        // 75/2 after 10.0 of 20 overs: projection 150, damped to 141,
        // 19 below par → 31% for the batting (home) side.
        let mat = make_match(vec![innings(1, 10, 75, 2, 10.0)]);
        let sample = build_sample(&mat, &mat.innings[0], 10, 0);
        assert_eq!(sample.balls_remaining, 60);
        assert_relative_eq!(sample.team1_probability, 31.0, epsilon = 1e-6);
        assert_relative_eq!(sample.team2_probability, 69.0, epsilon = 1e-6);
        assert!(sample.target.is_none());
        assert!(sample.required_run_rate.is_none());
    }

    #[test]
    fn away_side_batting_first_flips_team_columns() {
        let mat = make_match(vec![innings(1, 20, 75, 2, 10.0)]);
        let sample = build_sample(&mat, &mat.innings[0], 10, 0);
        assert_relative_eq!(sample.team2_probability, 31.0, epsilon = 1e-6);
        assert_relative_eq!(sample.team1_probability, 69.0, epsilon = 1e-6);
    }

    #[test]
    fn big_first_innings_start_caps_at_hundred() {
        // 140/0 off 6 overs projects far beyond par; clamp + normalize must
        // keep the pair at exactly 100.
        let mat = make_match(vec![innings(1, 10, 140, 0, 6.0)]);
        let sample = build_sample(&mat, &mat.innings[0], 6, 0);
        assert_relative_eq!(
            sample.team1_probability + sample.team2_probability,
            100.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(sample.team1_probability, 100.0, epsilon = 1e-9);
    }

    // ── Second innings ───────────────────────────────────────────────────────

    fn chase_match(runs: i64, wickets: i64, overs: f64, first_total: i64) -> Match {
        make_match(vec![
            innings(1, 10, first_total, 7, 20.0),
            innings(2, 20, runs, wickets, overs),
        ])
    }

    #[test]
    fn chase_worked_example() {
        // Chasing 150: 120/4 with 30 balls left → RRR 6.0, base 90,
        // scaled by 0.8 (wickets) and 0.85 (balls) → 61.2 for the chasers.
        let mat = chase_match(120, 4, 15.0, 149);
        let sample = build_sample(&mat, &mat.innings[1], 15, 0);
        assert_eq!(sample.target, Some(150));
        assert_eq!(sample.balls_remaining, 30);
        assert_relative_eq!(sample.required_run_rate.unwrap(), 6.0, epsilon = 1e-9);
        // Chasing side is the away team here.
        assert_relative_eq!(sample.team2_probability, 61.2, epsilon = 1e-6);
        assert_relative_eq!(sample.team1_probability, 38.8, epsilon = 1e-6);
    }

    #[test]
    fn chase_already_complete_is_certain() {
        let mat = chase_match(151, 9, 18.0, 149);
        let sample = build_sample(&mat, &mat.innings[1], 18, 0);
        assert_relative_eq!(sample.team2_probability, 100.0, epsilon = 1e-9);
        assert_relative_eq!(sample.team1_probability, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn all_out_while_chasing_is_lost() {
        let mat = chase_match(120, 10, 17.2, 149);
        let sample = build_sample(&mat, &mat.innings[1], 17, 2);
        assert_relative_eq!(sample.team2_probability, 0.0, epsilon = 1e-9);
        assert_relative_eq!(sample.team1_probability, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn no_balls_left_short_of_target_is_lost() {
        let mat = chase_match(140, 6, 20.0, 149);
        let sample = build_sample(&mat, &mat.innings[1], 20, 0);
        assert_eq!(sample.balls_remaining, 0);
        assert_relative_eq!(sample.team2_probability, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn chase_curve_left_continuous_at_breakpoints() {
        for breakpoint in [6.0, 10.0, 12.0, 15.0] {
            let at = chase_base_probability(breakpoint);
            let below = chase_base_probability(breakpoint - 1e-9);
            assert!(
                (at - below).abs() < 1e-6,
                "discontinuity approaching rrr={}: {} vs {}",
                breakpoint,
                below,
                at
            );
        }
    }

    #[test]
    fn chase_curve_non_increasing_above_six() {
        let mut prev = chase_base_probability(6.01);
        let mut rrr = 6.01;
        while rrr < 22.0 {
            rrr += 0.1;
            let p = chase_base_probability(rrr);
            assert!(
                p <= prev + 1e-9,
                "chase curve increased at rrr={}: {} > {}",
                rrr,
                p,
                prev
            );
            prev = p;
        }
        // Floors at 0 for hopeless chases.
        assert_relative_eq!(chase_base_probability(25.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn normalization_invariant_over_grid() {
        for runs in [0, 40, 90, 140, 160] {
            for wickets in [0, 3, 6, 10] {
                for overs in [0.0, 4.3, 9.5, 15.0, 20.0] {
                    let mat = chase_match(runs, wickets, overs, 159);
                    let sample = build_sample(&mat, &mat.innings[1], overs as i64, 0);
                    assert_relative_eq!(
                        sample.team1_probability + sample.team2_probability,
                        100.0,
                        epsilon = 1e-9
                    );
                }
            }
        }
    }

    // ── Service layer ────────────────────────────────────────────────────────

    #[test]
    fn generate_reports_missing_match_without_persisting() {
        let db = Arc::new(crate::db::Database::open_in_memory().unwrap());
        let engine = WinProbabilityEngine::new(db.clone(), db.clone());
        let outcome = engine.generate(42, 1, 0, 1);
        assert!(!outcome.success);
        assert!(outcome.message.unwrap().contains("match 42 not found"));
        assert!(engine.latest(42).unwrap().is_none());
    }

    #[test]
    fn latest_or_generate_computes_on_miss_then_serves_cached() {
        let db = Arc::new(crate::db::Database::open_in_memory().unwrap());
        let home = db.insert_team("Home").unwrap();
        let away = db.insert_team("Away").unwrap();
        let mut mat = make_match(vec![]);
        mat.home_team.id = home;
        mat.away_team.id = away;
        let match_id = db.insert_match(&mat).unwrap();
        let mut first_innings = innings(1, home, 75, 2, 10.0);
        first_innings.match_id = match_id;
        db.insert_innings(&first_innings).unwrap();
        let engine = WinProbabilityEngine::new(db.clone(), db.clone());

        let first = engine.latest_or_generate(match_id, 1, 10, 0);
        assert!(first.success, "{:?}", first.message);
        let second = engine.latest_or_generate(match_id, 1, 10, 1);
        assert!(second.success);
        // Cache hit: no second row appended.
        assert_eq!(engine.series(match_id).unwrap().len(), 1);
        assert_eq!(
            first.data.unwrap().id,
            second.data.unwrap().id
        );
    }
}
