use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub mod models;
use models::*;

use crate::error::StoreError;
use crate::store::{MatchStore, PlayerStore, PredictionStore};

/// How many recent batting/bowling entries are loaded with a player.
/// The engines slice this down further (5 for form, 20 for workload).
const RECENT_ENTRY_LIMIT: i64 = 20;

/// Thread-safe SQLite handle (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory database (tests, throwaway runs)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Seeding ──────────────────────────────────────────────────────────────

    pub fn insert_team(&self, name: &str) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("INSERT INTO teams (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert a player record; `player.id` is ignored and the new rowid returned.
    pub fn insert_player(&self, player: &Player) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO players (
                name, role, date_of_birth, matches_played, batting_average,
                strike_rate, career_wickets, bowling_average, economy_rate
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
            params![
                player.name,
                player.role,
                player.date_of_birth,
                player.matches_played,
                player.batting_average,
                player.strike_rate,
                player.career_wickets,
                player.bowling_average,
                player.economy_rate,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert a match record; `mat.id` and nested innings are ignored.
    pub fn insert_match(&self, mat: &Match) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO matches (
                home_team_id, away_team_id, venue, match_date, status,
                winner_team_id, weather, overs_per_innings
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            params![
                mat.home_team.id,
                mat.away_team.id,
                mat.venue,
                mat.match_date,
                mat.status.as_str(),
                mat.winner_team_id,
                mat.weather,
                mat.overs_per_innings,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_innings(&self, innings: &Innings) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO innings (
                match_id, number, batting_team_id, total_runs, total_wickets, overs
             ) VALUES (?1,?2,?3,?4,?5,?6)",
            params![
                innings.match_id,
                innings.number,
                innings.batting_team_id,
                innings.total_runs,
                innings.total_wickets,
                innings.overs,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_batting_entry(
        &self,
        player_id: i64,
        entry: &BattingEntry,
    ) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO batting_entries (
                player_id, match_id, match_date, runs, balls_faced, fours, sixes, strike_rate
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            params![
                player_id,
                entry.match_id,
                entry.match_date,
                entry.runs,
                entry.balls_faced,
                entry.fours,
                entry.sixes,
                entry.strike_rate,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_bowling_entry(
        &self,
        player_id: i64,
        entry: &BowlingEntry,
    ) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO bowling_entries (
                player_id, match_id, match_date, overs, runs_conceded, wickets, economy
             ) VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                player_id,
                entry.match_id,
                entry.match_date,
                entry.overs,
                entry.runs_conceded,
                entry.wickets,
                entry.economy,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ── Internal readers ─────────────────────────────────────────────────────

    /// Base SELECT shared by every match query; teams joined in, innings not.
    const MATCH_SELECT: &'static str = "SELECT m.id, m.home_team_id, t1.name, m.away_team_id, t2.name,
                m.venue, m.match_date, m.status, m.winner_team_id,
                m.weather, m.overs_per_innings
         FROM matches m
         JOIN teams t1 ON t1.id = m.home_team_id
         JOIN teams t2 ON t2.id = m.away_team_id";

    fn load_innings(&self, conn: &Connection, match_id: i64) -> Result<Vec<Innings>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT id, match_id, number, batting_team_id, total_runs, total_wickets, overs
             FROM innings WHERE match_id = ?1 ORDER BY number ASC",
        )?;
        let innings = stmt
            .query_map(params![match_id], map_innings)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(innings)
    }
}

// ── Store trait implementations ──────────────────────────────────────────────

impl MatchStore for Database {
    fn get_match(&self, id: i64) -> Result<Option<Match>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{} WHERE m.id = ?1", Self::MATCH_SELECT);
        let mat = conn
            .query_row(&sql, params![id], map_match)
            .optional()?;
        match mat {
            Some(mut mat) => {
                mat.innings = self.load_innings(&conn, id)?;
                Ok(Some(mat))
            }
            None => Ok(None),
        }
    }

    fn list_recent_completed(&self, team_id: i64, limit: u32) -> Result<Vec<Match>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "{} WHERE m.status = 'completed'
               AND (m.home_team_id = ?1 OR m.away_team_id = ?1)
             ORDER BY m.match_date DESC LIMIT ?2",
            Self::MATCH_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let matches = stmt
            .query_map(params![team_id, limit], map_match)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }

    fn list_completed_meetings(
        &self,
        team_a: i64,
        team_b: i64,
    ) -> Result<Vec<Match>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "{} WHERE m.status = 'completed'
               AND ((m.home_team_id = ?1 AND m.away_team_id = ?2)
                 OR (m.home_team_id = ?2 AND m.away_team_id = ?1))
             ORDER BY m.match_date DESC",
            Self::MATCH_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let matches = stmt
            .query_map(params![team_a, team_b], map_match)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }
}

impl PlayerStore for Database {
    fn get_player(&self, id: i64) -> Result<Option<Player>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let player = conn
            .query_row(
                "SELECT id, name, role, date_of_birth, matches_played, batting_average,
                        strike_rate, career_wickets, bowling_average, economy_rate
                 FROM players WHERE id = ?1",
                params![id],
                map_player,
            )
            .optional()?;
        let mut player = match player {
            Some(p) => p,
            None => return Ok(None),
        };

        let mut stmt = conn.prepare(
            "SELECT match_id, match_date, runs, balls_faced, fours, sixes, strike_rate
             FROM batting_entries WHERE player_id = ?1
             ORDER BY match_date DESC, id DESC LIMIT ?2",
        )?;
        player.batting_entries = stmt
            .query_map(params![id, RECENT_ENTRY_LIMIT], map_batting_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
            "SELECT match_id, match_date, overs, runs_conceded, wickets, economy
             FROM bowling_entries WHERE player_id = ?1
             ORDER BY match_date DESC, id DESC LIMIT ?2",
        )?;
        player.bowling_entries = stmt
            .query_map(params![id, RECENT_ENTRY_LIMIT], map_bowling_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(player))
    }
}

impl PredictionStore for Database {
    fn insert_win_probability(
        &self,
        mut sample: WinProbabilitySample,
    ) -> Result<WinProbabilitySample, StoreError> {
        let conn = self.conn.lock().unwrap();
        sample.calculated_at = Utc::now();
        conn.execute(
            "INSERT INTO win_probability_samples (
                match_id, innings_id, over_number, ball_number,
                team1_probability, team2_probability, current_score, wickets_lost,
                target, balls_remaining, required_run_rate, calculated_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
            params![
                sample.match_id,
                sample.innings_id,
                sample.over_number,
                sample.ball_number,
                sample.team1_probability,
                sample.team2_probability,
                sample.current_score,
                sample.wickets_lost,
                sample.target,
                sample.balls_remaining,
                sample.required_run_rate,
                sample.calculated_at,
            ],
        )?;
        sample.id = Some(conn.last_insert_rowid());
        Ok(sample)
    }

    fn list_win_probabilities(
        &self,
        match_id: i64,
    ) -> Result<Vec<WinProbabilitySample>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, match_id, innings_id, over_number, ball_number,
                    team1_probability, team2_probability, current_score, wickets_lost,
                    target, balls_remaining, required_run_rate, calculated_at
             FROM win_probability_samples WHERE match_id = ?1
             ORDER BY innings_id ASC, over_number ASC, ball_number ASC",
        )?;
        let samples = stmt
            .query_map(params![match_id], map_win_probability)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(samples)
    }

    fn latest_win_probability(
        &self,
        match_id: i64,
    ) -> Result<Option<WinProbabilitySample>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let sample = conn
            .query_row(
                "SELECT id, match_id, innings_id, over_number, ball_number,
                        team1_probability, team2_probability, current_score, wickets_lost,
                        target, balls_remaining, required_run_rate, calculated_at
                 FROM win_probability_samples WHERE match_id = ?1
                 ORDER BY calculated_at DESC, id DESC LIMIT 1",
                params![match_id],
                map_win_probability,
            )
            .optional()?;
        Ok(sample)
    }

    fn insert_match_prediction(
        &self,
        mut prediction: MatchPrediction,
    ) -> Result<MatchPrediction, StoreError> {
        let factors = serde_json::to_string(&prediction.factors)?;
        let conn = self.conn.lock().unwrap();
        prediction.predicted_at = Utc::now();
        conn.execute(
            "INSERT INTO match_predictions (
                match_id, team1_win_prob, team2_win_prob, tie_draw_prob,
                team1_form, team2_form, venue_advantage, toss_advantage, weather_impact,
                h2h_team1_wins, h2h_team2_wins, h2h_draws, h2h_total,
                confidence, factors, predicted_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
            params![
                prediction.match_id,
                prediction.team1_win_prob,
                prediction.team2_win_prob,
                prediction.tie_draw_prob,
                prediction.team1_form,
                prediction.team2_form,
                prediction.venue_advantage,
                prediction.toss_advantage,
                prediction.weather_impact,
                prediction.head_to_head.team1_wins,
                prediction.head_to_head.team2_wins,
                prediction.head_to_head.draws,
                prediction.head_to_head.total,
                prediction.confidence,
                factors,
                prediction.predicted_at,
            ],
        )?;
        prediction.id = Some(conn.last_insert_rowid());
        Ok(prediction)
    }

    fn latest_match_prediction(
        &self,
        match_id: i64,
    ) -> Result<Option<MatchPrediction>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT id, match_id, team1_win_prob, team2_win_prob, tie_draw_prob,
                        team1_form, team2_form, venue_advantage, toss_advantage, weather_impact,
                        h2h_team1_wins, h2h_team2_wins, h2h_draws, h2h_total,
                        confidence, factors, predicted_at
                 FROM match_predictions WHERE match_id = ?1
                 ORDER BY predicted_at DESC, id DESC LIMIT 1",
                params![match_id],
                map_match_prediction_raw,
            )
            .optional()?;
        row.map(finish_match_prediction).transpose()
    }

    fn insert_performance_prediction(
        &self,
        mut prediction: PerformancePrediction,
    ) -> Result<PerformancePrediction, StoreError> {
        let factors = serde_json::to_string(&prediction.factors)?;
        let conn = self.conn.lock().unwrap();
        prediction.predicted_at = Utc::now();
        conn.execute(
            "INSERT INTO performance_predictions (
                match_id, player_id, expected_runs, expected_balls, expected_strike_rate,
                boundary_probability, expected_wickets, expected_overs, expected_economy,
                wicket_probability, confidence, factors, predicted_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
            params![
                prediction.match_id,
                prediction.player_id,
                prediction.expected_runs,
                prediction.expected_balls,
                prediction.expected_strike_rate,
                prediction.boundary_probability,
                prediction.expected_wickets,
                prediction.expected_overs,
                prediction.expected_economy,
                prediction.wicket_probability,
                prediction.confidence,
                factors,
                prediction.predicted_at,
            ],
        )?;
        prediction.id = Some(conn.last_insert_rowid());
        Ok(prediction)
    }

    fn latest_performance_prediction(
        &self,
        match_id: i64,
        player_id: i64,
    ) -> Result<Option<PerformancePrediction>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT id, match_id, player_id, expected_runs, expected_balls,
                        expected_strike_rate, boundary_probability, expected_wickets,
                        expected_overs, expected_economy, wicket_probability,
                        confidence, factors, predicted_at
                 FROM performance_predictions WHERE match_id = ?1 AND player_id = ?2
                 ORDER BY predicted_at DESC, id DESC LIMIT 1",
                params![match_id, player_id],
                map_performance_prediction_raw,
            )
            .optional()?;
        row.map(finish_performance_prediction).transpose()
    }

    fn insert_injury_assessment(
        &self,
        mut assessment: InjuryRiskAssessment,
    ) -> Result<InjuryRiskAssessment, StoreError> {
        let conn = self.conn.lock().unwrap();
        assessment.assessed_at = Utc::now();
        conn.execute(
            "INSERT INTO injury_assessments (
                player_id, risk_level, risk_score, balls_bowled, overs_per_match,
                matches_played, rest_days, age, injury_history, workload_trend,
                recommendation, days_to_rest, assessed_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
            params![
                assessment.player_id,
                assessment.risk_level.as_str(),
                assessment.risk_score,
                assessment.balls_bowled,
                assessment.overs_per_match,
                assessment.matches_played,
                assessment.rest_days,
                assessment.age,
                assessment.injury_history,
                assessment.workload_trend.as_str(),
                assessment.recommendation,
                assessment.days_to_rest,
                assessment.assessed_at,
            ],
        )?;
        assessment.id = Some(conn.last_insert_rowid());
        Ok(assessment)
    }

    fn latest_injury_assessment(
        &self,
        player_id: i64,
    ) -> Result<Option<InjuryRiskAssessment>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let assessment = conn
            .query_row(
                "SELECT id, player_id, risk_level, risk_score, balls_bowled, overs_per_match,
                        matches_played, rest_days, age, injury_history, workload_trend,
                        recommendation, days_to_rest, assessed_at
                 FROM injury_assessments WHERE player_id = ?1
                 ORDER BY assessed_at DESC, id DESC LIMIT 1",
                params![player_id],
                map_injury_assessment,
            )
            .optional()?;
        Ok(assessment)
    }
}

// ── SQL helpers ──────────────────────────────────────────────────────────────

fn map_match(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    let status: String = row.get(7)?;
    Ok(Match {
        id: row.get(0)?,
        home_team: Team {
            id: row.get(1)?,
            name: row.get(2)?,
        },
        away_team: Team {
            id: row.get(3)?,
            name: row.get(4)?,
        },
        venue: row.get(5)?,
        match_date: row.get(6)?,
        status: MatchStatus::parse(&status),
        winner_team_id: row.get(8)?,
        weather: row.get(9)?,
        overs_per_innings: row.get(10)?,
        innings: Vec::new(),
    })
}

fn map_innings(row: &rusqlite::Row) -> rusqlite::Result<Innings> {
    Ok(Innings {
        id: row.get(0)?,
        match_id: row.get(1)?,
        number: row.get(2)?,
        batting_team_id: row.get(3)?,
        total_runs: row.get(4)?,
        total_wickets: row.get(5)?,
        overs: row.get(6)?,
    })
}

fn map_player(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        date_of_birth: row.get(3)?,
        matches_played: row.get(4)?,
        batting_average: row.get(5)?,
        strike_rate: row.get(6)?,
        career_wickets: row.get(7)?,
        bowling_average: row.get(8)?,
        economy_rate: row.get(9)?,
        batting_entries: Vec::new(),
        bowling_entries: Vec::new(),
    })
}

fn map_batting_entry(row: &rusqlite::Row) -> rusqlite::Result<BattingEntry> {
    Ok(BattingEntry {
        match_id: row.get(0)?,
        match_date: row.get(1)?,
        runs: row.get(2)?,
        balls_faced: row.get(3)?,
        fours: row.get(4)?,
        sixes: row.get(5)?,
        strike_rate: row.get(6)?,
    })
}

fn map_bowling_entry(row: &rusqlite::Row) -> rusqlite::Result<BowlingEntry> {
    Ok(BowlingEntry {
        match_id: row.get(0)?,
        match_date: row.get(1)?,
        overs: row.get(2)?,
        runs_conceded: row.get(3)?,
        wickets: row.get(4)?,
        economy: row.get(5)?,
    })
}

fn map_win_probability(row: &rusqlite::Row) -> rusqlite::Result<WinProbabilitySample> {
    Ok(WinProbabilitySample {
        id: row.get(0)?,
        match_id: row.get(1)?,
        innings_id: row.get(2)?,
        over_number: row.get(3)?,
        ball_number: row.get(4)?,
        team1_probability: row.get(5)?,
        team2_probability: row.get(6)?,
        current_score: row.get(7)?,
        wickets_lost: row.get(8)?,
        target: row.get(9)?,
        balls_remaining: row.get(10)?,
        required_run_rate: row.get(11)?,
        calculated_at: row.get(12)?,
    })
}

/// The factors column is JSON; deserialization happens outside the rusqlite
/// row mapper so its error surfaces as [`StoreError::Json`].
fn map_match_prediction_raw(
    row: &rusqlite::Row,
) -> rusqlite::Result<(MatchPrediction, String)> {
    let prediction = MatchPrediction {
        id: row.get(0)?,
        match_id: row.get(1)?,
        team1_win_prob: row.get(2)?,
        team2_win_prob: row.get(3)?,
        tie_draw_prob: row.get(4)?,
        team1_form: row.get(5)?,
        team2_form: row.get(6)?,
        venue_advantage: row.get(7)?,
        toss_advantage: row.get(8)?,
        weather_impact: row.get(9)?,
        head_to_head: HeadToHead {
            team1_wins: row.get(10)?,
            team2_wins: row.get(11)?,
            draws: row.get(12)?,
            total: row.get(13)?,
        },
        confidence: row.get(14)?,
        factors: MatchFactors {
            form_difference: 0.0,
            venue_impact: 0.0,
            h2h_factor: 0.0,
        },
        predicted_at: row.get(16)?,
    };
    let factors: String = row.get(15)?;
    Ok((prediction, factors))
}

fn finish_match_prediction(
    (mut prediction, factors): (MatchPrediction, String),
) -> Result<MatchPrediction, StoreError> {
    prediction.factors = serde_json::from_str(&factors)?;
    Ok(prediction)
}

fn map_performance_prediction_raw(
    row: &rusqlite::Row,
) -> rusqlite::Result<(PerformancePrediction, String)> {
    let prediction = PerformancePrediction {
        id: row.get(0)?,
        match_id: row.get(1)?,
        player_id: row.get(2)?,
        expected_runs: row.get(3)?,
        expected_balls: row.get(4)?,
        expected_strike_rate: row.get(5)?,
        boundary_probability: row.get(6)?,
        expected_wickets: row.get(7)?,
        expected_overs: row.get(8)?,
        expected_economy: row.get(9)?,
        wicket_probability: row.get(10)?,
        confidence: row.get(11)?,
        factors: PerformanceFactors {
            batting_trend: 0.0,
            bowling_trend: 0.0,
            recent_batting_entries: 0,
            recent_bowling_entries: 0,
        },
        predicted_at: row.get(13)?,
    };
    let factors: String = row.get(12)?;
    Ok((prediction, factors))
}

fn finish_performance_prediction(
    (mut prediction, factors): (PerformancePrediction, String),
) -> Result<PerformancePrediction, StoreError> {
    prediction.factors = serde_json::from_str(&factors)?;
    Ok(prediction)
}

fn map_injury_assessment(row: &rusqlite::Row) -> rusqlite::Result<InjuryRiskAssessment> {
    let level: String = row.get(2)?;
    let trend: String = row.get(10)?;
    Ok(InjuryRiskAssessment {
        id: row.get(0)?,
        player_id: row.get(1)?,
        risk_level: RiskLevel::parse(&level),
        risk_score: row.get(3)?,
        balls_bowled: row.get(4)?,
        overs_per_match: row.get(5)?,
        matches_played: row.get(6)?,
        rest_days: row.get(7)?,
        age: row.get(8)?,
        injury_history: row.get(9)?,
        workload_trend: WorkloadTrend::parse(&trend),
        recommendation: row.get(11)?,
        days_to_rest: row.get(12)?,
        assessed_at: row.get(13)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT    NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS players (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT    NOT NULL,
    role            TEXT    NOT NULL DEFAULT 'batsman',
    date_of_birth   TEXT,
    matches_played  INTEGER NOT NULL DEFAULT 0,
    batting_average REAL    NOT NULL DEFAULT 0,
    strike_rate     REAL    NOT NULL DEFAULT 0,
    career_wickets  INTEGER NOT NULL DEFAULT 0,
    bowling_average REAL    NOT NULL DEFAULT 0,
    economy_rate    REAL    NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS matches (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    home_team_id      INTEGER NOT NULL,
    away_team_id      INTEGER NOT NULL,
    venue             TEXT    NOT NULL DEFAULT '',
    match_date        TEXT    NOT NULL,
    status            TEXT    NOT NULL DEFAULT 'scheduled',
    winner_team_id    INTEGER,
    weather           TEXT,
    overs_per_innings INTEGER NOT NULL DEFAULT 20,
    FOREIGN KEY (home_team_id) REFERENCES teams(id),
    FOREIGN KEY (away_team_id) REFERENCES teams(id)
);

CREATE TABLE IF NOT EXISTS innings (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id        INTEGER NOT NULL,
    number          INTEGER NOT NULL,
    batting_team_id INTEGER NOT NULL,
    total_runs      INTEGER NOT NULL DEFAULT 0,
    total_wickets   INTEGER NOT NULL DEFAULT 0,
    overs           REAL    NOT NULL DEFAULT 0,
    FOREIGN KEY (match_id) REFERENCES matches(id)
);

CREATE TABLE IF NOT EXISTS batting_entries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id   INTEGER NOT NULL,
    match_id    INTEGER NOT NULL,
    match_date  TEXT    NOT NULL,
    runs        INTEGER NOT NULL,
    balls_faced INTEGER NOT NULL,
    fours       INTEGER NOT NULL DEFAULT 0,
    sixes       INTEGER NOT NULL DEFAULT 0,
    strike_rate REAL    NOT NULL DEFAULT 0,
    FOREIGN KEY (player_id) REFERENCES players(id)
);

CREATE TABLE IF NOT EXISTS bowling_entries (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id     INTEGER NOT NULL,
    match_id      INTEGER NOT NULL,
    match_date    TEXT    NOT NULL,
    overs         REAL    NOT NULL DEFAULT 0,
    runs_conceded INTEGER NOT NULL DEFAULT 0,
    wickets       INTEGER NOT NULL DEFAULT 0,
    economy       REAL    NOT NULL DEFAULT 0,
    FOREIGN KEY (player_id) REFERENCES players(id)
);

CREATE TABLE IF NOT EXISTS win_probability_samples (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id          INTEGER NOT NULL,
    innings_id        INTEGER NOT NULL,
    over_number       INTEGER NOT NULL,
    ball_number       INTEGER NOT NULL,
    team1_probability REAL    NOT NULL,
    team2_probability REAL    NOT NULL,
    current_score     INTEGER NOT NULL,
    wickets_lost      INTEGER NOT NULL,
    target            INTEGER,
    balls_remaining   INTEGER NOT NULL,
    required_run_rate REAL,
    calculated_at     TEXT    NOT NULL,
    FOREIGN KEY (match_id) REFERENCES matches(id)
);

CREATE TABLE IF NOT EXISTS match_predictions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id        INTEGER NOT NULL,
    team1_win_prob  REAL    NOT NULL,
    team2_win_prob  REAL    NOT NULL,
    tie_draw_prob   REAL    NOT NULL DEFAULT 0,
    team1_form      REAL    NOT NULL,
    team2_form      REAL    NOT NULL,
    venue_advantage REAL    NOT NULL,
    toss_advantage  REAL    NOT NULL DEFAULT 0,
    weather_impact  REAL    NOT NULL DEFAULT 0,
    h2h_team1_wins  INTEGER NOT NULL DEFAULT 0,
    h2h_team2_wins  INTEGER NOT NULL DEFAULT 0,
    h2h_draws       INTEGER NOT NULL DEFAULT 0,
    h2h_total       INTEGER NOT NULL DEFAULT 0,
    confidence      REAL    NOT NULL,
    factors         TEXT    NOT NULL,
    predicted_at    TEXT    NOT NULL,
    FOREIGN KEY (match_id) REFERENCES matches(id)
);

CREATE TABLE IF NOT EXISTS performance_predictions (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id             INTEGER NOT NULL,
    player_id            INTEGER NOT NULL,
    expected_runs        REAL    NOT NULL,
    expected_balls       REAL    NOT NULL,
    expected_strike_rate REAL    NOT NULL,
    boundary_probability REAL    NOT NULL,
    expected_wickets     REAL    NOT NULL,
    expected_overs       REAL    NOT NULL,
    expected_economy     REAL    NOT NULL,
    wicket_probability   REAL    NOT NULL,
    confidence           REAL    NOT NULL,
    factors              TEXT    NOT NULL,
    predicted_at         TEXT    NOT NULL,
    FOREIGN KEY (match_id) REFERENCES matches(id),
    FOREIGN KEY (player_id) REFERENCES players(id)
);

CREATE TABLE IF NOT EXISTS injury_assessments (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id       INTEGER NOT NULL,
    risk_level      TEXT    NOT NULL,
    risk_score      REAL    NOT NULL,
    balls_bowled    INTEGER NOT NULL,
    overs_per_match REAL    NOT NULL,
    matches_played  INTEGER NOT NULL,
    rest_days       INTEGER NOT NULL,
    age             INTEGER,
    injury_history  TEXT    NOT NULL DEFAULT '',
    workload_trend  TEXT    NOT NULL,
    recommendation  TEXT    NOT NULL,
    days_to_rest    INTEGER NOT NULL,
    assessed_at     TEXT    NOT NULL,
    FOREIGN KEY (player_id) REFERENCES players(id)
);

CREATE INDEX IF NOT EXISTS idx_innings_match ON innings(match_id);
CREATE INDEX IF NOT EXISTS idx_batting_player ON batting_entries(player_id);
CREATE INDEX IF NOT EXISTS idx_bowling_player ON bowling_entries(player_id);
CREATE INDEX IF NOT EXISTS idx_winprob_match ON win_probability_samples(match_id);
CREATE INDEX IF NOT EXISTS idx_match_pred_match ON match_predictions(match_id);
CREATE INDEX IF NOT EXISTS idx_perf_pred_match ON performance_predictions(match_id, player_id);
CREATE INDEX IF NOT EXISTS idx_injury_player ON injury_assessments(player_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed_match(db: &Database, status: MatchStatus, winner: Option<i64>) -> (i64, i64, i64) {
        let t1 = db.insert_team("Chennai Kings").unwrap();
        let t2 = db.insert_team("Mumbai Titans").unwrap();
        let mat = Match {
            id: 0,
            home_team: Team {
                id: t1,
                name: "Chennai Kings".into(),
            },
            away_team: Team {
                id: t2,
                name: "Mumbai Titans".into(),
            },
            venue: "Chepauk".into(),
            match_date: Utc.with_ymd_and_hms(2025, 4, 12, 14, 0, 0).unwrap(),
            status,
            winner_team_id: winner.map(|w| if w == 1 { t1 } else { t2 }),
            weather: Some("clear".into()),
            overs_per_innings: 20,
            innings: vec![],
        };
        let match_id = db.insert_match(&mat).unwrap();
        (match_id, t1, t2)
    }

    #[test]
    fn match_round_trip_includes_teams_and_innings() {
        let db = test_db();
        let (match_id, t1, t2) = seed_match(&db, MatchStatus::Live, None);
        db.insert_innings(&Innings {
            id: 0,
            match_id,
            number: 1,
            batting_team_id: t1,
            total_runs: 158,
            total_wickets: 6,
            overs: 20.0,
        })
        .unwrap();
        db.insert_innings(&Innings {
            id: 0,
            match_id,
            number: 2,
            batting_team_id: t2,
            total_runs: 75,
            total_wickets: 2,
            overs: 10.0,
        })
        .unwrap();

        let mat = db.get_match(match_id).unwrap().unwrap();
        assert_eq!(mat.home_team.name, "Chennai Kings");
        assert_eq!(mat.away_team.name, "Mumbai Titans");
        assert_eq!(mat.innings.len(), 2);
        assert_eq!(mat.innings[0].number, 1);
        assert_eq!(mat.innings[1].total_runs, 75);
        assert_eq!(mat.status, MatchStatus::Live);
    }

    #[test]
    fn get_match_missing_returns_none() {
        let db = test_db();
        assert!(db.get_match(999).unwrap().is_none());
    }

    #[test]
    fn win_probability_rows_are_append_only_and_ordered() {
        let db = test_db();
        let (match_id, _, _) = seed_match(&db, MatchStatus::Live, None);
        for (over, ball) in [(0, 1), (0, 2), (1, 1)] {
            db.insert_win_probability(WinProbabilitySample {
                id: None,
                match_id,
                innings_id: 1,
                over_number: over,
                ball_number: ball,
                team1_probability: 50.0,
                team2_probability: 50.0,
                current_score: over * 8,
                wickets_lost: 0,
                target: None,
                balls_remaining: 120 - (over * 6 + ball),
                required_run_rate: None,
                calculated_at: Utc::now(),
            })
            .unwrap();
        }
        let series = db.list_win_probabilities(match_id).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(
            series
                .iter()
                .map(|s| (s.over_number, s.ball_number))
                .collect::<Vec<_>>(),
            vec![(0, 1), (0, 2), (1, 1)]
        );
    }

    #[test]
    fn latest_match_prediction_returns_newest_row() {
        let db = test_db();
        let (match_id, _, _) = seed_match(&db, MatchStatus::Scheduled, None);
        let template = MatchPrediction {
            id: None,
            match_id,
            team1_win_prob: 60.0,
            team2_win_prob: 40.0,
            tie_draw_prob: 0.0,
            team1_form: 70.0,
            team2_form: 50.0,
            venue_advantage: 0.2,
            toss_advantage: 0.0,
            weather_impact: 0.0,
            head_to_head: HeadToHead::default(),
            confidence: 60.0,
            factors: MatchFactors {
                form_difference: 20.0,
                venue_impact: 2.0,
                h2h_factor: 0.0,
            },
            predicted_at: Utc::now(),
        };
        let first = db.insert_match_prediction(template.clone()).unwrap();
        let mut second = template;
        second.team1_win_prob = 55.0;
        second.team2_win_prob = 45.0;
        let second = db.insert_match_prediction(second).unwrap();

        assert_ne!(first.id, second.id);
        let latest = db.latest_match_prediction(match_id).unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(latest.team1_win_prob, 55.0);
        assert_eq!(latest.factors.form_difference, 20.0);
    }

    #[test]
    fn player_entries_come_back_newest_first() {
        let db = test_db();
        let player = Player {
            id: 0,
            name: "R. Sharma".into(),
            role: "batsman".into(),
            date_of_birth: None,
            matches_played: 40,
            batting_average: 38.5,
            strike_rate: 135.0,
            career_wickets: 0,
            bowling_average: 0.0,
            economy_rate: 0.0,
            batting_entries: vec![],
            bowling_entries: vec![],
        };
        let player_id = db.insert_player(&player).unwrap();
        for (day, runs) in [(1, 12), (5, 48), (9, 30)] {
            db.insert_batting_entry(
                player_id,
                &BattingEntry {
                    match_id: day,
                    match_date: Utc.with_ymd_and_hms(2025, 3, day as u32, 14, 0, 0).unwrap(),
                    runs,
                    balls_faced: runs,
                    fours: 2,
                    sixes: 1,
                    strike_rate: 100.0,
                },
            )
            .unwrap();
        }
        let loaded = db.get_player(player_id).unwrap().unwrap();
        assert_eq!(
            loaded
                .batting_entries
                .iter()
                .map(|e| e.runs)
                .collect::<Vec<_>>(),
            vec![30, 48, 12]
        );
    }

    #[test]
    fn latest_injury_assessment_round_trips_enums() {
        let db = test_db();
        let player_id = db
            .insert_player(&Player {
                id: 0,
                name: "J. Bumrah".into(),
                role: "bowler".into(),
                date_of_birth: None,
                matches_played: 60,
                batting_average: 4.0,
                strike_rate: 60.0,
                career_wickets: 90,
                bowling_average: 22.0,
                economy_rate: 5.4,
                batting_entries: vec![],
                bowling_entries: vec![],
            })
            .unwrap();
        db.insert_injury_assessment(InjuryRiskAssessment {
            id: None,
            player_id,
            risk_level: RiskLevel::High,
            risk_score: 55.0,
            balls_bowled: 240,
            overs_per_match: 4.0,
            matches_played: 60,
            rest_days: 2,
            age: Some(31),
            injury_history: "no recorded injuries".into(),
            workload_trend: WorkloadTrend::Increasing,
            recommendation: "reduce workload".into(),
            days_to_rest: 14,
            assessed_at: Utc::now(),
        })
        .unwrap();
        let latest = db.latest_injury_assessment(player_id).unwrap().unwrap();
        assert_eq!(latest.risk_level, RiskLevel::High);
        assert_eq!(latest.workload_trend, WorkloadTrend::Increasing);
        assert_eq!(latest.days_to_rest, 14);
    }

    #[test]
    fn completed_meetings_cover_both_home_away_orders() {
        let db = test_db();
        let t1 = db.insert_team("A").unwrap();
        let t2 = db.insert_team("B").unwrap();
        let t3 = db.insert_team("C").unwrap();
        let mk = |home: i64, away: i64, status: MatchStatus| {
            let mat = Match {
                id: 0,
                home_team: Team {
                    id: home,
                    name: String::new(),
                },
                away_team: Team {
                    id: away,
                    name: String::new(),
                },
                venue: String::new(),
                match_date: Utc::now(),
                status,
                winner_team_id: None,
                weather: None,
                overs_per_innings: 20,
                innings: vec![],
            };
            db.insert_match(&mat).unwrap()
        };
        mk(t1, t2, MatchStatus::Completed);
        mk(t2, t1, MatchStatus::Completed);
        mk(t1, t3, MatchStatus::Completed);
        mk(t1, t2, MatchStatus::Scheduled);

        let meetings = db.list_completed_meetings(t1, t2).unwrap();
        assert_eq!(meetings.len(), 2);
        let recent = db.list_recent_completed(t1, 5).unwrap();
        assert_eq!(recent.len(), 3);
    }
}
