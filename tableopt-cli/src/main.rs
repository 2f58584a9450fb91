//! tableopt-cli: command-line interface for the tableopt schedule optimizer.
//!
//! # Commands
//!
//! - `solve`: run the optimizer on a problem file and print the schedule
//! - `validate`: check a problem file for construction-time errors without solving

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;
use tableopt_core::catalog::Catalog;
use tableopt_core::models::{GameRecord, Player, Schedule, ScheduleConfig, Session};
use tableopt_core::solve_schedule;

#[derive(Parser)]
#[command(name = "tableopt")]
#[command(version = "0.1.0")]
#[command(about = "Optimal board-game table assignment via mixed-integer programming", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the optimizer on a problem file
    Solve {
        /// Input JSON file path (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Read input from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a problem file without solving
    Validate {
        /// Input JSON file path
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Read input from stdin instead of a file
        #[arg(long)]
        stdin: bool,
    },
}

/// The on-disk/stdin problem document: a catalog plus a roster, session
/// list, and optional config, all in one file so the CLI has a single
/// input shape to read. Mirrors the combination `solve_schedule` takes as
/// separate arguments.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct ProblemInput {
    games: Vec<GameRecord>,
    players: Vec<Player>,
    sessions: Vec<Session>,
    #[serde(default)]
    config: ScheduleConfig,
}

#[derive(Serialize, Debug)]
struct SolveReport {
    status: &'static str,
    elapsed_ms: u128,
    schedule: Schedule,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            input,
            stdin,
            output,
            pretty,
        } => solve(input, stdin, output, pretty),
        Commands::Validate { input, stdin } => validate(input, stdin),
    }
}

fn read_input(input: Option<PathBuf>, stdin: bool) -> Result<String> {
    if stdin {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read problem from stdin")?;
        Ok(buf)
    } else {
        let path = input.context("either a FILE argument or --stdin is required")?;
        fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

fn parse_input(raw: &str) -> Result<ProblemInput> {
    serde_json::from_str(raw).context("failed to parse problem JSON")
}

fn solve(input: Option<PathBuf>, stdin: bool, output: Option<PathBuf>, pretty: bool) -> Result<()> {
    let raw = read_input(input, stdin)?;
    let problem = parse_input(&raw)?;

    let catalog = Catalog::new(&problem.games).context("invalid game catalog")?;

    log::debug!(
        "solving: {} players, {} sessions, table_limit {}",
        problem.players.len(),
        problem.sessions.len(),
        problem.config.table_limit
    );

    let started = Instant::now();
    let result = solve_schedule(&catalog, &problem.players, &problem.sessions, &problem.config);
    let elapsed_ms = started.elapsed().as_millis();

    let report = match result {
        Ok(schedule) => {
            log::info!("solved in {elapsed_ms}ms");
            SolveReport {
                status: "optimal",
                elapsed_ms,
                schedule,
            }
        }
        Err(err) => {
            log::warn!("solve failed after {elapsed_ms}ms: {err}");
            anyhow::bail!("solve failed: {err}");
        }
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize schedule")?;

    write_output(output, &rendered)
}

fn validate(input: Option<PathBuf>, stdin: bool) -> Result<()> {
    let raw = read_input(input, stdin)?;
    let problem = parse_input(&raw)?;

    match Catalog::new(&problem.games) {
        Ok(_) => {
            println!(
                "valid: {} game(s), {} player(s), {} session(s)",
                problem.games.len(),
                problem.players.len(),
                problem.sessions.len()
            );
            Ok(())
        }
        Err(err) => {
            anyhow::bail!("invalid catalog: {err}");
        }
    }
}

fn write_output(output: Option<PathBuf>, rendered: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout();
            writeln!(stdout, "{rendered}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_minimal_problem() {
        let raw = r#"{
            "games": [{"name": "1817", "min_players": 3, "max_players": 6, "min_playtime": 360, "max_playtime": 540}],
            "players": [{"name": "Alice", "owns": ["1817"], "interests": ["1817"]}],
            "sessions": [{"name": "Friday", "length": 600}]
        }"#;
        let problem = parse_input(raw).unwrap();
        assert_eq!(problem.games.len(), 1);
        assert_eq!(problem.config.table_limit, 10);
    }

    /// Exercises `solve`'s real file I/O end to end: an input file on disk,
    /// an output file on disk, the solve pipeline running between them.
    #[test]
    fn solve_reads_input_file_and_writes_output_file() {
        let mut input_file = NamedTempFile::new().expect("create temp input file");
        write!(
            input_file,
            r#"{{
                "games": [{{"name": "1817", "min_players": 3, "max_players": 6, "min_playtime": 360, "max_playtime": 540}}],
                "players": [
                    {{"name": "Alice", "owns": [], "interests": ["1817"]}},
                    {{"name": "Bob", "owns": ["1817"], "interests": ["1817"]}}
                ],
                "sessions": [{{"name": "Friday", "length": 600}}]
            }}"#
        )
        .expect("write temp input file");

        let output_file = NamedTempFile::new().expect("create temp output file");

        solve(
            Some(input_file.path().to_path_buf()),
            false,
            Some(output_file.path().to_path_buf()),
            false,
        )
        .expect("solve should succeed on a feasible problem");

        let written = fs::read_to_string(output_file.path()).expect("read temp output file");
        let report: serde_json::Value =
            serde_json::from_str(&written).expect("output file should contain valid JSON");
        assert_eq!(report["status"], "optimal");
        assert_eq!(report["schedule"].as_array().unwrap().len(), 1);
    }

    /// `validate` only reads the input file; no output file is produced.
    #[test]
    fn validate_reads_input_file() {
        let mut input_file = NamedTempFile::new().expect("create temp input file");
        write!(
            input_file,
            r#"{{
                "games": [{{"name": "1817", "min_players": 3, "max_players": 6, "min_playtime": 360, "max_playtime": 540}}],
                "players": [],
                "sessions": [{{"name": "Friday", "length": 600}}]
            }}"#
        )
        .expect("write temp input file");

        validate(Some(input_file.path().to_path_buf()), false).expect("catalog should be valid");
    }
}
