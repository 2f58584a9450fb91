//! Thin façade over a mixed-integer-programming backend.
//!
//! See spec.md §4.3. The contract is deliberately narrow: submit a
//! formulated problem, wait for termination, report status. No tuning
//! parameters are part of the contract — the backend's default
//! branch-and-bound behavior is assumed adequate for the problem sizes
//! involved (sub-second to seconds, per spec.md §5).
//!
//! Backed by [`good_lp`]'s `highs` solver, a branch-and-bound MIP solver
//! capable of proving optimality over the binary `X`/`G` variables this
//! formulation needs — the same backend the corpus reaches for whenever
//! it poses a binary-ILP problem through `good_lp` (see DESIGN.md). A
//! pure-LP solver would relax the binary variables' integrality and
//! could return a fractional "half a player at a table" solution, which
//! has no meaning here.

use good_lp::{Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolverModel};
use log::{debug, warn};

/// Termination status of a solver run, independent of the backend that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Error,
}

/// Result of handing a formulated problem to the backend.
///
/// Only [`SolveStatus::Optimal`] carries a usable `solution`; callers that
/// see anything else treat the run as failed (spec.md §7) — the adapter
/// itself does not collapse the distinction, so a caller that does care
/// which kind of non-optimality occurred still can.
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub solution: Option<Box<dyn Solution>>,
}

/// Submits a maximization problem — variables, objective, constraints —
/// to the backend and waits for termination.
pub fn solve_maximize(
    vars: ProblemVariables,
    objective: Expression,
    constraints: Vec<Constraint>,
) -> SolveOutcome {
    debug!(
        "submitting MIP: {} variables, {} constraints",
        vars.len(),
        constraints.len()
    );

    let mut model = vars
        .maximise(objective)
        .using(good_lp::solvers::highs::highs);
    for constraint in constraints {
        model = model.with(constraint);
    }

    match model.solve() {
        Ok(solution) => SolveOutcome {
            status: SolveStatus::Optimal,
            solution: Some(Box::new(solution)),
        },
        Err(ResolutionError::Infeasible) => {
            warn!("solver reported infeasible problem");
            SolveOutcome {
                status: SolveStatus::Infeasible,
                solution: None,
            }
        }
        Err(ResolutionError::Unbounded) => {
            warn!("solver reported unbounded problem");
            SolveOutcome {
                status: SolveStatus::Unbounded,
                solution: None,
            }
        }
        Err(other) => {
            warn!("solver error: {other}");
            SolveOutcome {
                status: SolveStatus::Error,
                solution: None,
            }
        }
    }
}
