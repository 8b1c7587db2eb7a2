use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A team taking part in a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

/// A registered player with career aggregates and (separately loaded)
/// recent per-match batting/bowling entries, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    /// "batsman" | "bowler" | "all_rounder" | "wicket_keeper"
    pub role: String,
    pub date_of_birth: Option<NaiveDate>,
    pub matches_played: i64,
    pub batting_average: f64,
    pub strike_rate: f64,
    pub career_wickets: i64,
    pub bowling_average: f64,
    pub economy_rate: f64,
    /// Recent batting entries, newest first
    pub batting_entries: Vec<BattingEntry>,
    /// Recent bowling entries, newest first
    pub bowling_entries: Vec<BowlingEntry>,
}

impl Player {
    /// Age in whole years at the given instant. `None` if no birth date on record.
    pub fn age_at(&self, now: DateTime<Utc>) -> Option<i64> {
        let dob = self.date_of_birth?;
        Some(now.date_naive().years_since(dob)? as i64)
    }
}

/// One player's batting line from a single match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattingEntry {
    pub match_id: i64,
    pub match_date: DateTime<Utc>,
    pub runs: i64,
    pub balls_faced: i64,
    pub fours: i64,
    pub sixes: i64,
    pub strike_rate: f64,
}

/// One player's bowling line from a single match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BowlingEntry {
    pub match_id: i64,
    pub match_date: DateTime<Utc>,
    /// X.Y notation: completed overs + legal balls in the current over
    pub overs: f64,
    pub runs_conceded: i64,
    pub wickets: i64,
    pub economy: f64,
}

/// Scheduling/result state of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Completed,
    Abandoned,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
            MatchStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> MatchStatus {
        match s {
            "live" => MatchStatus::Live,
            "completed" => MatchStatus::Completed,
            "abandoned" => MatchStatus::Abandoned,
            _ => MatchStatus::Scheduled,
        }
    }
}

/// A limited-overs match with nested innings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub home_team: Team,
    pub away_team: Team,
    pub venue: String,
    pub match_date: DateTime<Utc>,
    pub status: MatchStatus,
    /// Winner of a completed match; `None` for a no-result/tie
    pub winner_team_id: Option<i64>,
    /// Recorded conditions, e.g. "clear", "overcast", "humid", "rain"
    pub weather: Option<String>,
    /// Overs per innings (20 unless the tournament overrides it)
    pub overs_per_innings: i64,
    /// Innings in chronological order (first innings at index 0)
    pub innings: Vec<Innings>,
}

impl Match {
    pub fn innings_by_number(&self, number: i64) -> Option<&Innings> {
        self.innings.iter().find(|i| i.number == number)
    }
}

/// One innings of a match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Innings {
    pub id: i64,
    pub match_id: i64,
    /// 1 or 2
    pub number: i64,
    pub batting_team_id: i64,
    pub total_runs: i64,
    pub total_wickets: i64,
    /// X.Y notation (4.3 = 4 overs + 3 legal balls)
    pub overs: f64,
}

// ── Derived, append-only records ─────────────────────────────────────────────

/// Live ball-by-ball win probability sample. One row per ball processed,
/// never updated; ordered by (over_number, ball_number) within an innings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinProbabilitySample {
    pub id: Option<i64>,
    pub match_id: i64,
    pub innings_id: i64,
    pub over_number: i64,
    pub ball_number: i64,
    /// 0–100; `team1` is the home team
    pub team1_probability: f64,
    /// 0–100; sums with team1_probability to 100
    pub team2_probability: f64,
    pub current_score: i64,
    pub wickets_lost: i64,
    /// First-innings total + 1 once the chase has started
    pub target: Option<i64>,
    pub balls_remaining: i64,
    pub required_run_rate: Option<f64>,
    pub calculated_at: DateTime<Utc>,
}

/// Head-to-head record between the two teams of a match
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub team1_wins: i64,
    pub team2_wins: i64,
    pub draws: i64,
    pub total: i64,
}

/// Diagnostic breakdown persisted alongside a match prediction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchFactors {
    pub form_difference: f64,
    pub venue_impact: f64,
    pub h2h_factor: f64,
}

/// Pre-match outcome prediction. Append-only; reads return the newest row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPrediction {
    pub id: Option<i64>,
    pub match_id: i64,
    pub team1_win_prob: f64,
    pub team2_win_prob: f64,
    pub tie_draw_prob: f64,
    pub team1_form: f64,
    pub team2_form: f64,
    pub venue_advantage: f64,
    pub toss_advantage: f64,
    pub weather_impact: f64,
    pub head_to_head: HeadToHead,
    /// 30–90
    pub confidence: f64,
    pub factors: MatchFactors,
    pub predicted_at: DateTime<Utc>,
}

/// Inputs that shaped a performance prediction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PerformanceFactors {
    pub batting_trend: f64,
    pub bowling_trend: f64,
    pub recent_batting_entries: i64,
    pub recent_bowling_entries: i64,
}

/// Expected batting/bowling output for one player in one match.
/// The batting and bowling sub-predictions are independent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformancePrediction {
    pub id: Option<i64>,
    pub match_id: i64,
    pub player_id: i64,
    pub expected_runs: f64,
    pub expected_balls: f64,
    pub expected_strike_rate: f64,
    /// 10–60
    pub boundary_probability: f64,
    pub expected_wickets: f64,
    pub expected_overs: f64,
    pub expected_economy: f64,
    /// 20–80
    pub wicket_probability: f64,
    /// Capped at 90
    pub confidence: f64,
    pub factors: PerformanceFactors,
    pub predicted_at: DateTime<Utc>,
}

/// Risk bucket; a pure function of the risk score (≥70/≥50/≥30)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> RiskLevel {
        if score >= 70.0 {
            RiskLevel::Critical
        } else if score >= 50.0 {
            RiskLevel::High
        } else if score >= 30.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> RiskLevel {
        match s {
            "CRITICAL" => RiskLevel::Critical,
            "HIGH" => RiskLevel::High,
            "MEDIUM" => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

/// Direction of a player's recent bowling workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkloadTrend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

impl WorkloadTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadTrend::Increasing => "INCREASING",
            WorkloadTrend::Decreasing => "DECREASING",
            WorkloadTrend::Stable => "STABLE",
            WorkloadTrend::InsufficientData => "INSUFFICIENT_DATA",
        }
    }

    pub fn parse(s: &str) -> WorkloadTrend {
        match s {
            "INCREASING" => WorkloadTrend::Increasing,
            "DECREASING" => WorkloadTrend::Decreasing,
            "STABLE" => WorkloadTrend::Stable,
            _ => WorkloadTrend::InsufficientData,
        }
    }
}

/// Workload/injury risk assessment for one player. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjuryRiskAssessment {
    pub id: Option<i64>,
    pub player_id: i64,
    pub risk_level: RiskLevel,
    /// 0–100
    pub risk_score: f64,
    pub balls_bowled: i64,
    pub overs_per_match: f64,
    pub matches_played: i64,
    pub rest_days: i64,
    pub age: Option<i64>,
    pub injury_history: String,
    pub workload_trend: WorkloadTrend,
    pub recommendation: String,
    pub days_to_rest: i64,
    pub assessed_at: DateTime<Utc>,
}
