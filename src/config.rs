use clap::{Parser, Subcommand};

/// Cricket prediction engine
#[derive(Parser, Debug, Clone)]
#[command(name = "cricket-predictor", version, about)]
pub struct Config {
    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "cricket.db")]
    pub database_path: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compute a live win-probability sample for one ball
    WinProb {
        #[arg(long)]
        match_id: i64,
        /// Innings currently being played (1 or 2)
        #[arg(long, default_value = "1")]
        innings: i64,
        /// Completed overs at this ball
        #[arg(long)]
        over: i64,
        /// Legal ball within the over (1–6)
        #[arg(long)]
        ball: i64,
        /// Serve the latest stored sample when one exists
        #[arg(long)]
        cached: bool,
    },
    /// Pre-match outcome prediction for a scheduled match
    PredictMatch {
        #[arg(long)]
        match_id: i64,
        /// Serve the latest stored prediction when one exists
        #[arg(long)]
        cached: bool,
    },
    /// Expected batting/bowling output for one player in one match
    PredictPerformance {
        #[arg(long)]
        match_id: i64,
        #[arg(long)]
        player_id: i64,
        /// Serve the latest stored prediction when one exists
        #[arg(long)]
        cached: bool,
    },
    /// Bowling workload and injury risk assessment
    InjuryRisk {
        #[arg(long)]
        player_id: i64,
        /// Serve the latest stored assessment when one exists
        #[arg(long)]
        cached: bool,
    },
    /// Generate a commentary line for a single ball event
    Commentary {
        #[arg(long)]
        batsman: String,
        #[arg(long)]
        bowler: String,
        /// Runs off the bat for this ball
        #[arg(long, default_value = "0")]
        runs: i64,
        #[arg(long)]
        wicket: bool,
        /// Extra kind when the delivery was illegal ("wide", "no_ball", ...)
        #[arg(long)]
        extra: Option<String>,
        /// Required run rate, when a chase is in progress
        #[arg(long)]
        required_run_rate: Option<f64>,
    },
    /// Seed a small demo dataset into the database
    Seed,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::WinProb {
                innings, over, ball, ..
            } => {
                if !(1..=2).contains(innings) {
                    anyhow::bail!("innings must be 1 or 2");
                }
                if *over < 0 || !(0..=6).contains(ball) {
                    anyhow::bail!("over must be non-negative and ball within 0-6");
                }
            }
            Command::Commentary { runs, .. } => {
                if !(0..=6).contains(runs) {
                    anyhow::bail!("runs per ball must be within 0-6");
                }
            }
            _ => {}
        }
        Ok(())
    }
}
