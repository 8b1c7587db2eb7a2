use anyhow::Result;
use chrono::{Duration, Utc};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

mod config;

use config::{Command, Config};
use cricket_predictor::commentary::{BallContext, CommentaryEngine, StyleRotation};
use cricket_predictor::db::models::*;
use cricket_predictor::db::Database;
use cricket_predictor::{
    InjuryRiskEngine, MatchOutcomeEngine, PerformanceEngine, WinProbabilityEngine,
};

fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let db = Arc::new(Database::open(&config.database_path)?);
    info!("Database opened: {}", config.database_path);

    match config.command {
        Command::WinProb {
            match_id,
            innings,
            over,
            ball,
            cached,
        } => {
            let engine = WinProbabilityEngine::new(db.clone(), db.clone());
            let outcome = if cached {
                engine.latest_or_generate(match_id, innings, over, ball)
            } else {
                engine.generate(match_id, innings, over, ball)
            };
            print_json(&outcome)?;
        }
        Command::PredictMatch { match_id, cached } => {
            let engine = MatchOutcomeEngine::new(db.clone(), db.clone());
            let outcome = if cached {
                engine.latest_or_generate(match_id)
            } else {
                engine.generate(match_id)
            };
            print_json(&outcome)?;
        }
        Command::PredictPerformance {
            match_id,
            player_id,
            cached,
        } => {
            let engine = PerformanceEngine::new(db.clone(), db.clone(), db.clone());
            let outcome = if cached {
                engine.latest_or_generate(match_id, player_id)
            } else {
                engine.generate(match_id, player_id)
            };
            print_json(&outcome)?;
        }
        Command::InjuryRisk { player_id, cached } => {
            let engine = InjuryRiskEngine::new(db.clone(), db.clone());
            let outcome = if cached {
                engine.latest_or_generate(player_id)
            } else {
                engine.generate(player_id)
            };
            print_json(&outcome)?;
        }
        Command::Commentary {
            batsman,
            bowler,
            runs,
            wicket,
            extra,
            required_run_rate,
        } => {
            let engine = CommentaryEngine::new(Arc::new(StyleRotation::new()));
            let ctx = BallContext {
                batsman,
                bowler,
                runs,
                is_wicket: wicket,
                is_extra: extra.is_some(),
                extra_type: extra,
                team_score: 0,
                team_wickets: 0,
                required_run_rate,
            };
            println!("{}", engine.generate(&ctx, None));
        }
        Command::Seed => seed_demo(&db)?,
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Insert a small, self-consistent demo dataset: two teams with history,
/// a live match mid-chase, and a couple of players with recent entries.
fn seed_demo(db: &Database) -> Result<()> {
    let home = db.insert_team("Chennai Kings")?;
    let away = db.insert_team("Mumbai Titans")?;

    let mut when = Utc::now() - Duration::days(90);
    for winner in [Some(home), Some(home), Some(away), Some(home), None] {
        db.insert_match(&Match {
            id: 0,
            home_team: Team {
                id: home,
                name: String::new(),
            },
            away_team: Team {
                id: away,
                name: String::new(),
            },
            venue: "Chepauk".into(),
            match_date: when,
            status: MatchStatus::Completed,
            winner_team_id: winner,
            weather: Some("clear".into()),
            overs_per_innings: 20,
            innings: vec![],
        })?;
        when += Duration::days(14);
    }

    let live = db.insert_match(&Match {
        id: 0,
        home_team: Team {
            id: home,
            name: String::new(),
        },
        away_team: Team {
            id: away,
            name: String::new(),
        },
        venue: "Chepauk".into(),
        match_date: Utc::now(),
        status: MatchStatus::Live,
        winner_team_id: None,
        weather: Some("overcast".into()),
        overs_per_innings: 20,
        innings: vec![],
    })?;
    db.insert_innings(&Innings {
        id: 0,
        match_id: live,
        number: 1,
        batting_team_id: home,
        total_runs: 158,
        total_wickets: 6,
        overs: 20.0,
    })?;
    db.insert_innings(&Innings {
        id: 0,
        match_id: live,
        number: 2,
        batting_team_id: away,
        total_runs: 97,
        total_wickets: 3,
        overs: 12.4,
    })?;

    let batsman = db.insert_player(&Player {
        id: 0,
        name: "R. Sharma".into(),
        role: "batsman".into(),
        date_of_birth: chrono::NaiveDate::from_ymd_opt(1994, 4, 30),
        matches_played: 42,
        batting_average: 36.2,
        strike_rate: 139.0,
        career_wickets: 0,
        bowling_average: 0.0,
        economy_rate: 0.0,
        batting_entries: vec![],
        bowling_entries: vec![],
    })?;
    for (days_ago, runs, balls, fours, sixes) in
        [(4, 61, 41, 6, 2), (9, 34, 28, 3, 1), (15, 8, 10, 1, 0), (21, 47, 33, 5, 1), (27, 22, 19, 2, 0)]
    {
        db.insert_batting_entry(
            batsman,
            &BattingEntry {
                match_id: 0,
                match_date: Utc::now() - Duration::days(days_ago),
                runs,
                balls_faced: balls,
                fours,
                sixes,
                strike_rate: runs as f64 / balls as f64 * 100.0,
            },
        )?;
    }

    let bowler = db.insert_player(&Player {
        id: 0,
        name: "J. Malhotra".into(),
        role: "bowler".into(),
        date_of_birth: chrono::NaiveDate::from_ymd_opt(1991, 12, 3),
        matches_played: 57,
        batting_average: 9.1,
        strike_rate: 88.0,
        career_wickets: 74,
        bowling_average: 23.8,
        economy_rate: 5.7,
        batting_entries: vec![],
        bowling_entries: vec![],
    })?;
    for (days_ago, overs, wickets, economy) in [
        (2, 4.0, 2, 6.2),
        (5, 4.0, 1, 7.0),
        (8, 4.0, 3, 5.5),
        (12, 3.2, 0, 8.1),
        (16, 4.0, 1, 6.8),
        (20, 4.0, 2, 6.0),
        (24, 3.0, 0, 7.4),
    ] {
        db.insert_bowling_entry(
            bowler,
            &BowlingEntry {
                match_id: 0,
                match_date: Utc::now() - Duration::days(days_ago),
                overs,
                runs_conceded: (overs.floor() * economy) as i64,
                wickets,
                economy,
            },
        )?;
    }

    info!(
        "Seeded demo data: teams {}/{}, live match {}, players {}/{}",
        home, away, live, batsman, bowler
    );
    println!(
        "Seeded: live match id {} (teams {} vs {}), batsman id {}, bowler id {}",
        live, home, away, batsman, bowler
    );
    Ok(())
}
