use chrono::{SecondsFormat, Utc};
use clap::Parser;
use maze_chase_engine::constants::{AUTOMATION_BATCH, DEFAULT_MAX_TURNS_PER_ROUND};
use maze_chase_engine::engine::{reduce, GameState, Signal};
use maze_chase_engine::logging::{now_ms, LogLevel, StructuredLogLine};
use maze_chase_engine::types::{FinishReason, GameEvent, GameMode};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;

/// Headless autoplay benchmark: runs a batch of automated rounds.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Rounds to record (the automation batch plus its final round at most).
    #[arg(long)]
    rounds: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Turns after which a stuck round is restarted.
    #[arg(long)]
    max_turns: Option<u64>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum RoundOutcome {
    Caught,
    TurnLimit,
}

impl From<FinishReason> for RoundOutcome {
    fn from(reason: FinishReason) -> Self {
        match reason {
            FinishReason::Caught => Self::Caught,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct RoundResultLine {
    round: u32,
    iteration: u64,
    outcome: RoundOutcome,
    score: i32,
    turns: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    seed: u32,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "roundCount")]
    round_count: usize,
    #[serde(rename = "totalScore")]
    total_score: i64,
    #[serde(rename = "averageScore")]
    average_score: f64,
    #[serde(rename = "bestScore")]
    best_score: i32,
    #[serde(rename = "averageTurns")]
    average_turns: u64,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    rounds: Vec<RoundResultLine>,
}

fn main() {
    let cli = Cli::parse();
    let seed = normalize_seed(cli.seed.unwrap_or_else(now_ms));
    let target_rounds = resolve_target_rounds(cli.rounds);
    let max_turns = cli.max_turns.unwrap_or(DEFAULT_MAX_TURNS_PER_ROUND).max(1);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, now_ms()));
    let started_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    StructuredLogLine::new(
        LogLevel::Info,
        "run_started",
        json!({
            "seed": seed,
            "targetRounds": target_rounds,
            "maxTurns": max_turns,
        }),
    )
    .run_id(&run_id)
    .emit();

    let rounds = run_batch(seed, target_rounds, max_turns, |round| {
        if round.outcome == RoundOutcome::TurnLimit {
            StructuredLogLine::new(
                LogLevel::Warn,
                "turn_limit_reached",
                json!({ "score": round.score }),
            )
            .run_id(&run_id)
            .at(round.iteration, round.turns)
            .emit();
        }
        match serde_json::to_string(round) {
            Ok(line) => println!("{line}"),
            Err(error) => eprintln!("[simulate] failed to serialize round {}: {error}", round.round),
        }
    });

    let finished_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let summary = build_run_summary(run_id.clone(), seed, started_at, finished_at, rounds);

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            StructuredLogLine::new(
                LogLevel::Error,
                "summary_write_failed",
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            )
            .run_id(&run_id)
            .emit();
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    StructuredLogLine::new(
        LogLevel::Info,
        "run_finished",
        json!({
            "roundCount": summary.round_count,
            "averageScore": summary.average_score,
            "bestScore": summary.best_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    )
    .run_id(&run_id)
    .emit();
}

/// Arms the automation batch and ticks until `target_rounds` rounds are recorded
/// or the batch is exhausted.
fn run_batch(
    seed: u32,
    target_rounds: u32,
    max_turns: u64,
    mut on_round: impl FnMut(&RoundResultLine),
) -> Vec<RoundResultLine> {
    let mut state = reduce(GameState::new(seed), Signal::SetAutomationRounds);
    let mut results: Vec<RoundResultLine> = Vec::new();

    while (results.len() as u32) < target_rounds {
        let iteration = state.iteration();
        state = reduce(state, Signal::Tick);
        let snapshot = state.build_snapshot(true);

        for event in &snapshot.events {
            if let GameEvent::RoundFinished {
                reason,
                score,
                turn,
            } = event
            {
                let line = RoundResultLine {
                    round: results.len() as u32 + 1,
                    iteration,
                    outcome: RoundOutcome::from(*reason),
                    score: *score,
                    turns: *turn,
                };
                on_round(&line);
                results.push(line);
            }
        }

        if state.mode() == GameMode::Finished {
            break;
        }
        if state.turn() >= max_turns && (results.len() as u32) < target_rounds {
            let line = RoundResultLine {
                round: results.len() as u32 + 1,
                iteration,
                outcome: RoundOutcome::TurnLimit,
                score: state.score(),
                turns: state.turn(),
            };
            on_round(&line);
            results.push(line);
            state = reduce(state, Signal::Initialize);
        }
    }
    results
}

fn resolve_target_rounds(requested: Option<u32>) -> u32 {
    let batch_with_final = AUTOMATION_BATCH + 1;
    requested.unwrap_or(batch_with_final).clamp(1, batch_with_final)
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn outcome_key(outcome: RoundOutcome) -> String {
    match outcome {
        RoundOutcome::Caught => "caught",
        RoundOutcome::TurnLimit => "turn_limit",
    }
    .to_string()
}

fn build_run_summary(
    run_id: String,
    seed: u32,
    started_at: String,
    finished_at: String,
    rounds: Vec<RoundResultLine>,
) -> RunSummary {
    let round_count = rounds.len();
    let total_score: i64 = rounds.iter().map(|round| round.score as i64).sum();
    let total_turns: u64 = rounds.iter().map(|round| round.turns).sum();
    let mut outcome_counts = BTreeMap::new();
    for round in &rounds {
        *outcome_counts.entry(outcome_key(round.outcome)).or_insert(0) += 1;
    }
    let (average_score, average_turns) = if round_count == 0 {
        (0.0, 0)
    } else {
        (
            total_score as f64 / round_count as f64,
            total_turns / round_count as u64,
        )
    };
    RunSummary {
        run_id,
        seed,
        started_at,
        finished_at,
        round_count,
        total_score,
        average_score,
        best_score: rounds.iter().map(|round| round.score).max().unwrap_or(0),
        average_turns,
        outcome_counts,
        rounds,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
