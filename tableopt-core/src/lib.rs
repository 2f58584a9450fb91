//! # tableopt-core: optimal board-game table assignment
//!
//! This crate is the schedule optimizer described for small-to-mid-size
//! conventions and club meetups: given a frozen catalog of games, a
//! roster of attendees with ownership and interest lists, and an ordered
//! list of sessions, it produces an assignment of (session × game
//! instance × player subset) that maximizes satisfied interests (and,
//! as a secondary nudge, well-sized tables) subject to hard game,
//! ownership, and venue constraints.
//!
//! Control flow is linear and single-threaded: build a [`Catalog`], build
//! a [`Problem`] from it plus a roster and session list, solve, done.
//! There is no streaming and no incremental state — a fresh `solve_schedule`
//! call is the unit of work, and independent calls share no mutable
//! state, so callers solving multiple scenarios may do so in parallel.
//!
//! ## Quick example
//!
//! ```
//! use tableopt_core::models::{GameRecord, Player, Session, ScheduleConfig};
//! use tableopt_core::catalog::Catalog;
//! use tableopt_core::solve_schedule;
//! use std::collections::HashMap;
//!
//! let games = vec![GameRecord {
//!     name: "1817".to_string(),
//!     min_players: 3,
//!     max_players: 6,
//!     min_playtime: 360,
//!     max_playtime: 540,
//!     popularity: HashMap::new(),
//! }];
//! let catalog = Catalog::new(&games).unwrap();
//!
//! let players = vec![
//!     Player { name: "Alice".into(), owns: vec![], interests: vec!["1817".into()], sessions: None },
//!     Player { name: "Bob".into(), owns: vec!["1817".into()], interests: vec!["1817".into()], sessions: None },
//! ];
//! let sessions = vec![Session { name: "Friday".into(), length: 600 }];
//!
//! let schedule = solve_schedule(&catalog, &players, &sessions, &ScheduleConfig::default()).unwrap();
//! assert_eq!(schedule.len(), 1);
//! ```

pub mod catalog;
pub mod error;
pub mod models;
pub mod problem;
pub mod solver;

pub use error::OptimizerError;
pub use models::Schedule;

use catalog::Catalog;
use models::{Player, ScheduleConfig, Session};
use problem::Problem;

/// Runs the optimizer end to end: build the problem from the catalog,
/// roster, and session list, solve it, and return the resulting
/// [`Schedule`]. This is the crate's main entry point — see spec.md §2
/// for the pipeline this wraps (`build catalog → construct problem →
/// solve → extract`).
///
/// # Errors
///
/// Returns [`OptimizerError::Infeasible`] if the solver cannot find an
/// optimal assignment (spec.md §7) — common triggers are a `table_limit`
/// too small for the attendee count, or every candidate game filtered out
/// by short sessions with no shared games provided.
pub fn solve_schedule(
    catalog: &Catalog,
    players: &[Player],
    sessions: &[Session],
    config: &ScheduleConfig,
) -> Result<Schedule, OptimizerError> {
    Problem::build(catalog, players, sessions, config).solve()
}
