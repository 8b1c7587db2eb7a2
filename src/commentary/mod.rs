//! Ball-by-ball commentary generation.
//!
//! This is a content-variety device, not a scoring model. Every ball event
//! is classified into exactly one category (precedence: wicket → six → four
//! → extra → dot → runs), and a line is picked uniformly at random from the
//! pre-authored templates for that category and the active style.
//!
//! Styles rotate round-robin through a single shared counter whenever the
//! caller does not pin one explicitly. The counter is process-wide rather
//! than per-match, so concurrent matches interleave the rotation; that is
//! accepted behavior, and the counter is injected so tests can reset it.

use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Tone of a generated commentary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentaryStyle {
    Excited,
    Analytical,
    Neutral,
    Dramatic,
}

const STYLES: [CommentaryStyle; 4] = [
    CommentaryStyle::Excited,
    CommentaryStyle::Analytical,
    CommentaryStyle::Neutral,
    CommentaryStyle::Dramatic,
];

/// Shared round-robin style counter. One instance per process; advanced on
/// every call that does not supply an explicit style.
#[derive(Debug, Default)]
pub struct StyleRotation {
    next: AtomicUsize,
}

impl StyleRotation {
    pub fn new() -> Self {
        StyleRotation::default()
    }

    /// Take the current style and advance the counter.
    pub fn advance(&self) -> CommentaryStyle {
        let idx = self.next.fetch_add(1, Ordering::Relaxed);
        STYLES[idx % STYLES.len()]
    }

    /// Rewind to the first style (tests).
    pub fn reset(&self) {
        self.next.store(0, Ordering::Relaxed);
    }
}

/// Everything known about one ball event when the line is generated.
#[derive(Debug, Clone)]
pub struct BallContext {
    pub batsman: String,
    pub bowler: String,
    /// Runs scored off the bat on this ball
    pub runs: i64,
    pub is_wicket: bool,
    pub is_extra: bool,
    /// "wide" | "no_ball" | "bye" | "leg_bye" when `is_extra`
    pub extra_type: Option<String>,
    /// Batting side's running total after this ball
    pub team_score: i64,
    pub team_wickets: i64,
    /// Set during a chase; drives the pressure note on dot balls
    pub required_run_rate: Option<f64>,
}

/// Ball event category; first matching rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallCategory {
    Wicket,
    Six,
    Four,
    Extra,
    Dot,
    Runs,
}

pub(crate) fn classify(ctx: &BallContext) -> BallCategory {
    if ctx.is_wicket {
        BallCategory::Wicket
    } else if ctx.runs == 6 {
        BallCategory::Six
    } else if ctx.runs == 4 {
        BallCategory::Four
    } else if ctx.is_extra {
        BallCategory::Extra
    } else if ctx.runs == 0 {
        BallCategory::Dot
    } else {
        BallCategory::Runs
    }
}

/// Batting/bowling milestone detected by the scoring flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    FiftyRuns,
    HundredRuns,
    FiveWickets,
    HatTrick,
}

/// Generates one line of commentary per ball or milestone event.
pub struct CommentaryEngine {
    rotation: Arc<StyleRotation>,
}

impl CommentaryEngine {
    pub fn new(rotation: Arc<StyleRotation>) -> Self {
        CommentaryEngine { rotation }
    }

    /// Generate a line for a ball event. When `style` is `None`, the shared
    /// rotation advances and supplies the tone.
    pub fn generate(&self, ctx: &BallContext, style: Option<CommentaryStyle>) -> String {
        let style = style.unwrap_or_else(|| self.rotation.advance());
        let candidates = match classify(ctx) {
            BallCategory::Wicket => wicket_lines(ctx, style),
            BallCategory::Six => six_lines(ctx, style),
            BallCategory::Four => four_lines(ctx, style),
            BallCategory::Extra => extra_lines(ctx, style),
            BallCategory::Dot => dot_lines(ctx, style),
            BallCategory::Runs => run_lines(ctx, style),
        };
        pick(candidates)
    }

    /// Generate a line for a detected milestone.
    pub fn milestone(&self, milestone: Milestone, player_name: &str) -> String {
        let style = self.rotation.advance();
        pick(milestone_lines(milestone, player_name, style))
    }
}

fn pick(candidates: Vec<String>) -> String {
    let mut rng = rand::thread_rng();
    candidates
        .choose(&mut rng)
        .cloned()
        .unwrap_or_default()
}

fn wicket_lines(ctx: &BallContext, style: CommentaryStyle) -> Vec<String> {
    let b = &ctx.batsman;
    let bw = &ctx.bowler;
    match style {
        CommentaryStyle::Excited => vec![
            format!("GONE! {} has to go, {} strikes! Huge moment in this game!", b, bw),
            format!("WICKET! {} cannot believe it, {} gets the breakthrough!", b, bw),
        ],
        CommentaryStyle::Analytical => vec![
            format!(
                "{} departs; {} earned that one with a subtle change of pace. {}/{} now.",
                b, bw, ctx.team_score, ctx.team_wickets
            ),
            format!(
                "Smart bowling from {}. {} was cramped for room and paid for it.",
                bw, b
            ),
        ],
        CommentaryStyle::Neutral => vec![
            format!("{} is out, bowled by {}. Score {}/{}.", b, bw, ctx.team_score, ctx.team_wickets),
            format!("{} dismisses {}. The batting side slips to {}/{}.", bw, b, ctx.team_score, ctx.team_wickets),
        ],
        CommentaryStyle::Dramatic => vec![
            format!("The stage swallows {} whole. {} stands triumphant!", b, bw),
            format!("A hush, then a roar. {} walks back and {} has changed the story.", b, bw),
        ],
    }
}

fn six_lines(ctx: &BallContext, style: CommentaryStyle) -> Vec<String> {
    let b = &ctx.batsman;
    match style {
        CommentaryStyle::Excited => vec![
            format!("SIX! {} launches it into the crowd, what a hit!", b),
            format!("Massive SIX from {}! That ball is not coming back!", b),
        ],
        CommentaryStyle::Analytical => vec![
            format!("{} picked the length early and lifted it for six with a full swing of the bat.", b),
            format!("A clean six; {} used the depth of the crease perfectly.", b),
        ],
        CommentaryStyle::Neutral => vec![
            format!("{} hits a six. {}/{}.", b, ctx.team_score, ctx.team_wickets),
            format!("Six runs for {}.", b),
        ],
        CommentaryStyle::Dramatic => vec![
            format!("{} sends it into the night sky, a six to be remembered!", b),
            format!("Six! The crowd rises as one for {}!", b),
        ],
    }
}

fn four_lines(ctx: &BallContext, style: CommentaryStyle) -> Vec<String> {
    let b = &ctx.batsman;
    match style {
        CommentaryStyle::Excited => vec![
            format!("FOUR! {} finds the gap, brilliant placement!", b),
            format!("Cracking shot from {}! Four more to the total!", b),
        ],
        CommentaryStyle::Analytical => vec![
            format!("{} threaded the field for four; the sweeper had no chance.", b),
            format!("A controlled four from {}; soft hands, late contact.", b),
        ],
        CommentaryStyle::Neutral => vec![
            format!("{} hits a four. {}/{}.", b, ctx.team_score, ctx.team_wickets),
            format!("Boundary four for {}.", b),
        ],
        CommentaryStyle::Dramatic => vec![
            format!("Four! {} carves the ball away and the rope accepts its tribute.", b),
            format!("{} strokes a four that silences the bowler's glare.", b),
        ],
    }
}

fn extra_lines(ctx: &BallContext, style: CommentaryStyle) -> Vec<String> {
    let bw = &ctx.bowler;
    let kind = ctx
        .extra_type
        .as_deref()
        .unwrap_or("extra")
        .replace('_', " ");
    match style {
        CommentaryStyle::Excited => vec![
            format!("A {} from {}! Free runs on offer!", kind, bw),
            format!("{} strays, that's a {} and the batting side will take it!", bw, kind),
        ],
        CommentaryStyle::Analytical => vec![
            format!("A {} there; {} is losing the line under pressure.", kind, bw),
            format!("{} concedes a {}; the field placements forced the error.", bw, kind),
        ],
        CommentaryStyle::Neutral => vec![
            format!("{} bowls a {}. {}/{}.", bw, kind, ctx.team_score, ctx.team_wickets),
            format!("A {} signalled.", kind),
        ],
        CommentaryStyle::Dramatic => vec![
            format!("A wayward {} from {} and the umpire's arms spread wide.", kind, bw),
            format!("The {} creeps onto the scoreboard and {} grimaces.", kind, bw),
        ],
    }
}

fn dot_lines(ctx: &BallContext, style: CommentaryStyle) -> Vec<String> {
    let b = &ctx.batsman;
    let bw = &ctx.bowler;
    // Under a steep chase a dot ball is an event in itself.
    let pressure = match ctx.required_run_rate {
        Some(rrr) if rrr > 8.0 => format!(
            " Dot balls hurt with the required rate at {:.1}.",
            rrr
        ),
        _ => String::new(),
    };
    match style {
        CommentaryStyle::Excited => vec![
            format!("Dot ball! {} beats the bat and {} has nowhere to go!{}", bw, b, pressure),
            format!("No run! {} is pinned down by {}!{}", b, bw, pressure),
        ],
        CommentaryStyle::Analytical => vec![
            format!("A dot; {} keeps the ball on a good length and {} respects it.{}", bw, b, pressure),
            format!("No run there; {} defends with a straight bat.{}", b, pressure),
        ],
        CommentaryStyle::Neutral => vec![
            format!("Dot ball from {} to {}.{}", bw, b, pressure),
            format!("No run.{}", pressure),
        ],
        CommentaryStyle::Dramatic => vec![
            format!("A dot, and the silence stretches between {} and {}.{}", bw, b, pressure),
            format!("Nothing given. {} stares down the pitch at {}.{}", bw, b, pressure),
        ],
    }
}

fn run_lines(ctx: &BallContext, style: CommentaryStyle) -> Vec<String> {
    let b = &ctx.batsman;
    let runs = ctx.runs;
    let word = match runs {
        1 => "single",
        2 => "couple",
        _ => "three",
    };
    match style {
        CommentaryStyle::Excited => vec![
            format!("{} scampers through for a quick {}!", b, word),
            format!("Good running! {} turns it into a {}!", b, word),
        ],
        CommentaryStyle::Analytical => vec![
            format!("{} works it into the gap for a {}; smart rotation of strike.", b, word),
            format!("A {} for {}; placement over power this time.", word, b),
        ],
        CommentaryStyle::Neutral => vec![
            format!("{} takes a {}. {}/{}.", b, word, ctx.team_score, ctx.team_wickets),
            format!("{} run{} added by {}.", runs, if runs == 1 { "" } else { "s" }, b),
        ],
        CommentaryStyle::Dramatic => vec![
            format!("{} steals a {} from under the fielder's nose.", b, word),
            format!("The scoreboard ticks over; a {} to {}.", word, b),
        ],
    }
}

fn milestone_lines(milestone: Milestone, player: &str, style: CommentaryStyle) -> Vec<String> {
    match milestone {
        Milestone::FiftyRuns => match style {
            CommentaryStyle::Excited => vec![
                format!("FIFTY for {}! Raise that bat!", player),
                format!("{} brings up a fantastic fifty!", player),
            ],
            CommentaryStyle::Analytical => vec![format!(
                "Fifty for {}; an innings built on placement and sharp running.",
                player
            )],
            CommentaryStyle::Neutral => vec![format!("{} reaches fifty.", player)],
            CommentaryStyle::Dramatic => vec![format!(
                "{} lifts the bat to the sky; fifty, and the innings has an author.",
                player
            )],
        },
        Milestone::HundredRuns => match style {
            CommentaryStyle::Excited => vec![
                format!("HUNDRED! A magnificent century for {}!", player),
                format!("{} gets to three figures! Take a bow!", player),
            ],
            CommentaryStyle::Analytical => vec![format!(
                "A century for {}; chanceless, paced to the situation throughout.",
                player
            )],
            CommentaryStyle::Neutral => vec![format!("{} reaches a hundred.", player)],
            CommentaryStyle::Dramatic => vec![format!(
                "One hundred runs, and {} owns this night completely.",
                player
            )],
        },
        Milestone::FiveWickets => match style {
            CommentaryStyle::Excited => vec![format!(
                "FIVE-FOR! {} has ripped through the batting order!",
                player
            )],
            CommentaryStyle::Analytical => vec![format!(
                "Five wickets for {}; relentless lines, and the rewards followed.",
                player
            )],
            CommentaryStyle::Neutral => vec![format!("{} takes a fifth wicket.", player)],
            CommentaryStyle::Dramatic => vec![format!(
                "Five wickets. {} walks off with the ball held high.",
                player
            )],
        },
        Milestone::HatTrick => match style {
            CommentaryStyle::Excited => vec![format!(
                "HAT-TRICK! Unbelievable scenes, {} has a hat-trick!",
                player
            )],
            CommentaryStyle::Analytical => vec![format!(
                "A hat-trick for {}; three different dismissals, one perfect over.",
                player
            )],
            CommentaryStyle::Neutral => vec![format!("{} completes a hat-trick.", player)],
            CommentaryStyle::Dramatic => vec![format!(
                "Three in three. {} is written into tournament legend.",
                player
            )],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball() -> BallContext {
        BallContext {
            batsman: "Kohli".into(),
            bowler: "Starc".into(),
            runs: 0,
            is_wicket: false,
            is_extra: false,
            extra_type: None,
            team_score: 92,
            team_wickets: 3,
            required_run_rate: None,
        }
    }

    #[test]
    fn wicket_takes_precedence_over_six() {
        let mut ctx = ball();
        ctx.is_wicket = true;
        ctx.runs = 6;
        assert_eq!(classify(&ctx), BallCategory::Wicket);
    }

    #[test]
    fn category_precedence_chain() {
        let mut ctx = ball();
        ctx.runs = 6;
        assert_eq!(classify(&ctx), BallCategory::Six);
        ctx.runs = 4;
        assert_eq!(classify(&ctx), BallCategory::Four);
        ctx.runs = 0;
        ctx.is_extra = true;
        ctx.extra_type = Some("wide".into());
        assert_eq!(classify(&ctx), BallCategory::Extra);
        ctx.is_extra = false;
        assert_eq!(classify(&ctx), BallCategory::Dot);
        ctx.runs = 2;
        assert_eq!(classify(&ctx), BallCategory::Runs);
    }

    #[test]
    fn rotation_cycles_through_all_four_styles() {
        let rotation = StyleRotation::new();
        let seen: Vec<CommentaryStyle> = (0..4).map(|_| rotation.advance()).collect();
        assert_eq!(
            seen,
            vec![
                CommentaryStyle::Excited,
                CommentaryStyle::Analytical,
                CommentaryStyle::Neutral,
                CommentaryStyle::Dramatic,
            ]
        );
        // Wraps around.
        assert_eq!(rotation.advance(), CommentaryStyle::Excited);
        rotation.reset();
        assert_eq!(rotation.advance(), CommentaryStyle::Excited);
    }

    #[test]
    fn explicit_style_does_not_advance_rotation() {
        let rotation = Arc::new(StyleRotation::new());
        let engine = CommentaryEngine::new(rotation.clone());
        let mut ctx = ball();
        ctx.runs = 4;
        let _ = engine.generate(&ctx, Some(CommentaryStyle::Neutral));
        let _ = engine.generate(&ctx, Some(CommentaryStyle::Neutral));
        // The next unpinned call still starts the cycle.
        assert_eq!(rotation.advance(), CommentaryStyle::Excited);
    }

    #[test]
    fn rotation_is_shared_across_engines() {
        // Two "matches" sharing the process-wide counter interleave styles.
        let rotation = Arc::new(StyleRotation::new());
        let engine_a = CommentaryEngine::new(rotation.clone());
        let engine_b = CommentaryEngine::new(rotation.clone());
        let ctx = ball();
        let _ = engine_a.generate(&ctx, None);
        let _ = engine_b.generate(&ctx, None);
        assert_eq!(rotation.advance(), CommentaryStyle::Neutral);
    }

    #[test]
    fn wicket_line_names_the_batsman() {
        let engine = CommentaryEngine::new(Arc::new(StyleRotation::new()));
        let mut ctx = ball();
        ctx.is_wicket = true;
        ctx.runs = 6;
        for style in STYLES {
            let line = engine.generate(&ctx, Some(style));
            assert!(
                line.contains("Kohli"),
                "wicket line should name the batsman: {}",
                line
            );
            let lower = line.to_lowercase();
            assert!(
                !lower.contains("six"),
                "wicket must win over six: {}",
                line
            );
        }
    }

    #[test]
    fn dot_ball_under_pressure_mentions_required_rate() {
        let engine = CommentaryEngine::new(Arc::new(StyleRotation::new()));
        let mut ctx = ball();
        ctx.required_run_rate = Some(11.4);
        for style in STYLES {
            let line = engine.generate(&ctx, Some(style));
            assert!(
                line.contains("11.4"),
                "pressure dot ball should cite the rate: {}",
                line
            );
        }
        // No pressure note early in an innings.
        ctx.required_run_rate = Some(5.0);
        let line = engine.generate(&ctx, Some(CommentaryStyle::Neutral));
        assert!(!line.contains("5.0"));
    }

    #[test]
    fn extras_name_their_kind() {
        let engine = CommentaryEngine::new(Arc::new(StyleRotation::new()));
        let mut ctx = ball();
        ctx.is_extra = true;
        ctx.extra_type = Some("no_ball".into());
        ctx.runs = 1;
        for style in STYLES {
            let line = engine.generate(&ctx, Some(style));
            assert!(
                line.contains("no ball"),
                "extra line should name the kind: {}",
                line
            );
        }
    }

    #[test]
    fn milestones_name_the_player() {
        let engine = CommentaryEngine::new(Arc::new(StyleRotation::new()));
        for milestone in [
            Milestone::FiftyRuns,
            Milestone::HundredRuns,
            Milestone::FiveWickets,
            Milestone::HatTrick,
        ] {
            let line = engine.milestone(milestone, "Ashwini");
            assert!(
                line.contains("Ashwini"),
                "milestone line should name the player: {}",
                line
            );
        }
    }
}
