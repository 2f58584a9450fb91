//! Errors surfaced at the optimizer boundary.
//!
//! Three kinds of failure are observable here: a catalog entry that cannot
//! be preprocessed, a solver run that terminates without an optimal
//! solution, and (not an error at all, but worth documenting) an unknown
//! game reference, which silently resolves to the catalog default rather
//! than failing — see [`crate::catalog::Catalog::game`].

use thiserror::Error;

/// Errors that can occur while building or solving a schedule.
#[derive(Error, Debug)]
pub enum OptimizerError {
    /// A catalog entry has an empty player-count or playtime range
    /// (`min_players > max_players` or `min_playtime > max_playtime`).
    #[error("malformed catalog entry {game:?}: {reason}")]
    InvalidCatalogEntry { game: String, reason: String },

    /// The solver terminated without finding an optimal solution.
    ///
    /// Covers infeasible, unbounded, and solver-internal-error statuses
    /// alike; the optimizer does not attempt relaxation, warm restart, or
    /// partial assignment recovery, so the caller only ever sees "not
    /// solvable".
    #[error("Problem not solvable")]
    Infeasible,
}
