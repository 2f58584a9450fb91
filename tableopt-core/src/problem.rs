//! Problem construction: materializes the decision-variable tensor, the
//! objective function, and the constraint set from a roster, a session
//! list, and a catalog. See spec.md §4.2 — the bulk of this crate's logic
//! lives here.

use crate::catalog::Catalog;
use crate::error::OptimizerError;
use crate::models::{Player, ScheduleConfig, ScheduledTable, Schedule, Session, SessionSchedule};
use crate::solver::{self, SolveStatus};
use good_lp::{constraint, variable, variables, Expression, ProblemVariables, Solution, Variable};
use log::{debug, info};
use std::collections::HashMap;
use std::time::Instant;

/// A single physical copy of a game: either a shared, event-provided copy
/// or a specific player's own copy. Two players owning the same title
/// yield two distinct instances — see spec.md §3.
#[derive(Debug, Clone)]
struct Instance {
    game_name: String,
    owner: Option<usize>,
}

/// A fully materialized MIP formulation, ready to hand to the solver
/// adapter. Built once per `solve` call; nothing here survives past it.
pub struct Problem<'a> {
    catalog: &'a Catalog,
    players: &'a [Player],
    sessions: &'a [Session],
    config: &'a ScheduleConfig,
    instances: Vec<Instance>,
    session_players: Vec<Vec<usize>>,
    session_games: Vec<Vec<usize>>,
    max_c: HashMap<(usize, usize), u32>,
}

impl<'a> Problem<'a> {
    /// Enumerates instances and per-session availability (spec.md
    /// §4.2.1–§4.2.2); does not yet create any decision variables.
    pub fn build(
        catalog: &'a Catalog,
        players: &'a [Player],
        sessions: &'a [Session],
        config: &'a ScheduleConfig,
    ) -> Self {
        let instances = Self::enumerate_instances(players, &config.shared_games);
        let session_players = Self::session_players(players, sessions.len());
        let session_games = Self::session_games(&instances, &session_players, sessions, catalog);
        let max_c = Self::compute_max_c(&instances, &session_games, sessions, catalog);

        debug!(
            "problem built: {} instances, {} sessions",
            instances.len(),
            sessions.len()
        );

        Problem {
            catalog,
            players,
            sessions,
            config,
            instances,
            session_players,
            session_games,
            max_c,
        }
    }

    /// `all_games[]`: shared games followed by each player's `owns`, in
    /// player order. Duplicates are preserved deliberately — ownership is
    /// a multiset (spec.md §4.2.1, §9 "per-player ownership multiplicity").
    fn enumerate_instances(players: &[Player], shared_games: &[String]) -> Vec<Instance> {
        let mut instances: Vec<Instance> = shared_games
            .iter()
            .map(|name| Instance {
                game_name: name.clone(),
                owner: None,
            })
            .collect();

        for (player_idx, player) in players.iter().enumerate() {
            for name in &player.owns {
                instances.push(Instance {
                    game_name: name.clone(),
                    owner: Some(player_idx),
                });
            }
        }

        instances
    }

    fn session_players(players: &[Player], num_sessions: usize) -> Vec<Vec<usize>> {
        (0..num_sessions)
            .map(|s| {
                players
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.attends(s))
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .collect()
    }

    /// An instance is available in a session iff it's shared (or its
    /// owner attends) and its minimum playtime fits — fixed-length games
    /// too long for the session are filtered out entirely here;
    /// variable-length games are capped instead, via `max_players` at
    /// variable-creation time (spec.md §4.2.2).
    fn session_games(
        instances: &[Instance],
        session_players: &[Vec<usize>],
        sessions: &[Session],
        catalog: &Catalog,
    ) -> Vec<Vec<usize>> {
        sessions
            .iter()
            .enumerate()
            .map(|(s, session)| {
                instances
                    .iter()
                    .enumerate()
                    .filter(|(_, inst)| {
                        let owner_present = match inst.owner {
                            None => true,
                            Some(owner) => session_players[s].contains(&owner),
                        };
                        owner_present && catalog.min_playtime(&inst.game_name) <= session.length
                    })
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .collect()
    }

    fn compute_max_c(
        instances: &[Instance],
        session_games: &[Vec<usize>],
        sessions: &[Session],
        catalog: &Catalog,
    ) -> HashMap<(usize, usize), u32> {
        let mut max_c = HashMap::new();
        for (s, session) in sessions.iter().enumerate() {
            for &g in &session_games[s] {
                let name = &instances[g].game_name;
                let min_p = catalog.min_players(name);
                let max_p = catalog.max_players(name, Some(session));
                max_c.insert((s, g), max_p.saturating_sub(min_p));
            }
        }
        max_c
    }

    /// Materializes variables, objective, and constraints, then hands the
    /// formulation to the solver adapter and extracts a [`Schedule`] from
    /// the result (spec.md §4.2.3–§4.2.5, §4.4).
    pub fn solve(&self) -> Result<Schedule, OptimizerError> {
        let mut vars: ProblemVariables = variables!();
        let x_vars = self.make_x_variables(&mut vars);
        let g_vars = self.make_g_variables(&mut vars);

        let objective = self.build_objective(&x_vars, &g_vars);
        let constraints = self.build_constraints(&x_vars, &g_vars);

        info!(
            "solving schedule: {} X-variables, {} G-variables, {} constraints",
            x_vars.len(),
            g_vars.len(),
            constraints.len()
        );

        let started = Instant::now();
        let outcome = solver::solve_maximize(vars, objective, constraints);
        let elapsed = started.elapsed();

        match outcome.status {
            SolveStatus::Optimal => {
                let solution = outcome
                    .solution
                    .expect("Optimal status always carries a solution");
                let schedule = self.extract(solution.as_ref(), &x_vars);
                let objective_value = recompute_objective(self.catalog, &schedule);
                info!(
                    "solve complete: status=Optimal objective={objective_value:.3} elapsed={:.3}s",
                    elapsed.as_secs_f64()
                );
                Ok(schedule)
            }
            _ => {
                info!(
                    "solve complete: status={:?} elapsed={:.3}s",
                    outcome.status,
                    elapsed.as_secs_f64()
                );
                Err(OptimizerError::Infeasible)
            }
        }
    }

    fn make_x_variables(&self, vars: &mut ProblemVariables) -> HashMap<(usize, usize, usize), Variable> {
        let mut x_vars = HashMap::new();
        for (s, players) in self.session_players.iter().enumerate() {
            for &p in players {
                for &g in &self.session_games[s] {
                    let var = vars.add(variable().binary().name(format!("X_{s}_{p}_{g}")));
                    x_vars.insert((s, p, g), var);
                }
            }
        }
        x_vars
    }

    fn make_g_variables(&self, vars: &mut ProblemVariables) -> HashMap<(usize, usize, usize), Variable> {
        let mut g_vars = HashMap::new();
        for s in 0..self.sessions.len() {
            for &g in &self.session_games[s] {
                let max_c = self.max_c[&(s, g)];
                for c in 0..=max_c {
                    let var = vars.add(variable().binary().name(format!("G_{s}_{g}_{c}")));
                    g_vars.insert((s, g, c as usize), var);
                }
            }
        }
        g_vars
    }

    /// Maximize interest satisfaction plus the (deliberately much
    /// smaller) popularity term — spec.md §4.2.4.
    fn build_objective(
        &self,
        x_vars: &HashMap<(usize, usize, usize), Variable>,
        g_vars: &HashMap<(usize, usize, usize), Variable>,
    ) -> Expression {
        let mut objective = Expression::default();

        for (&(_, p, g), &var) in x_vars {
            if self.players[p].interested_in(&self.instances[g].game_name) {
                objective += var;
            }
        }

        for (&(_, g, c), &var) in g_vars {
            let weight = self.catalog.game(&self.instances[g].game_name).popularity_at(c);
            if weight != 0.0 {
                objective += var * weight;
            }
        }

        objective
    }

    fn build_constraints(
        &self,
        x_vars: &HashMap<(usize, usize, usize), Variable>,
        g_vars: &HashMap<(usize, usize, usize), Variable>,
    ) -> Vec<good_lp::Constraint> {
        let mut constraints = Vec::new();

        // C1 — exactly one game per attending player per session.
        for (s, players) in self.session_players.iter().enumerate() {
            for &p in players {
                let total: Expression = self.session_games[s]
                    .iter()
                    .map(|&g| x_vars[&(s, p, g)])
                    .sum();
                constraints.push(constraint!(total == 1));
            }
        }

        // C2 — monotonicity: G[s,g,·] is a prefix of 1s.
        for s in 0..self.sessions.len() {
            for &g in &self.session_games[s] {
                let max_c = self.max_c[&(s, g)];
                for c in 1..=max_c {
                    let prev = g_vars[&(s, g, (c - 1) as usize)];
                    let cur = g_vars[&(s, g, c as usize)];
                    constraints.push(constraint!(prev >= cur));
                }
            }
        }

        // C3 — table limit per session.
        for s in 0..self.sessions.len() {
            let total: Expression = self.session_games[s]
                .iter()
                .map(|&g| g_vars[&(s, g, 0)])
                .sum();
            constraints.push(constraint!(total <= self.config.table_limit as f64));
        }

        // C4 — player count matches table size exactly.
        for s in 0..self.sessions.len() {
            for &g in &self.session_games[s] {
                let min_p = self.catalog.min_players(&self.instances[g].game_name);
                let max_c = self.max_c[&(s, g)];

                let seated: Expression = self.session_players[s]
                    .iter()
                    .map(|&p| x_vars[&(s, p, g)])
                    .sum();

                let mut table_size: Expression = g_vars[&(s, g, 0)] * min_p as f64;
                for c in 1..=max_c {
                    table_size += g_vars[&(s, g, c as usize)];
                }

                constraints.push(constraint!(seated == table_size));
            }
        }

        // C5 — each player plays each title at most once across the
        // entire schedule. Grouped by title, not by instance — two
        // copies of the same title still count as one title (spec.md §9).
        let mut per_player_title: HashMap<(usize, &str), Vec<Variable>> = HashMap::new();
        for (&(_, p, g), &var) in x_vars {
            per_player_title
                .entry((p, self.instances[g].game_name.as_str()))
                .or_default()
                .push(var);
        }
        for vars_for_title in per_player_title.values() {
            if vars_for_title.len() >= 2 {
                let total: Expression = vars_for_title.iter().copied().sum();
                constraints.push(constraint!(total <= 1));
            }
        }

        constraints
    }

    /// Reads the solved variable values, reconstructs a per-session list
    /// of `(game, players)` tuples, and enforces result ordering
    /// (spec.md §4.4).
    fn extract(
        &self,
        solution: &dyn Solution,
        x_vars: &HashMap<(usize, usize, usize), Variable>,
    ) -> Schedule {
        let mut schedule: Schedule = Vec::with_capacity(self.sessions.len());

        for s in 0..self.sessions.len() {
            let mut tables: SessionSchedule = Vec::new();

            for &g in &self.session_games[s] {
                let seated: Vec<Player> = self.session_players[s]
                    .iter()
                    .filter(|&&p| solution.value(x_vars[&(s, p, g)]) > 0.5)
                    .map(|&p| self.players[p].clone())
                    .collect();

                if !seated.is_empty() {
                    tables.push(ScheduledTable {
                        game_name: self.instances[g].game_name.clone(),
                        players: seated,
                    });
                }
            }

            tables.sort_by(|a, b| a.game_name.cmp(&b.game_name));
            schedule.push(tables);
        }

        schedule
    }
}

/// Independently recomputes the objective value of a solved [`Schedule`]
/// from first principles — the interest term plus the popularity term,
/// exactly as defined in spec.md §4.2.4. Used to check P7 (the solver's
/// objective matches a from-scratch recomputation) and P8 (permuting the
/// roster doesn't change the objective) without any access to the
/// solver's internal variables.
pub fn recompute_objective(catalog: &Catalog, schedule: &Schedule) -> f64 {
    let mut total = 0.0;

    for session_schedule in schedule {
        for table in session_schedule {
            let game = catalog.game(&table.game_name);

            for player in &table.players {
                if player.interested_in(&table.game_name) {
                    total += 1.0;
                }
            }

            let size = table.players.len() as u32;
            if size >= game.min_players {
                let c = (size - game.min_players) as usize;
                for k in 0..=c {
                    total += game.popularity_at(k);
                }
            }
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameRecord;
    use std::collections::HashMap as StdHashMap;

    fn game(name: &str, min_p: u32, max_p: u32, min_t: u32, max_t: u32) -> GameRecord {
        GameRecord {
            name: name.to_string(),
            min_players: min_p,
            max_players: max_p,
            min_playtime: min_t,
            max_playtime: max_t,
            popularity: StdHashMap::new(),
        }
    }

    fn player(name: &str, owns: &[&str], interests: &[&str]) -> Player {
        Player {
            name: name.to_string(),
            owns: owns.iter().map(|s| s.to_string()).collect(),
            interests: interests.iter().map(|s| s.to_string()).collect(),
            sessions: None,
        }
    }

    #[test]
    fn instances_preserve_ownership_multiplicity() {
        let players = vec![
            player("Alice", &["1830"], &[]),
            player("Bob", &["1830"], &[]),
        ];
        let instances = Problem::enumerate_instances(&players, &[]);
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].owner, Some(0));
        assert_eq!(instances[1].owner, Some(1));
    }

    #[test]
    fn shared_instances_have_no_owner() {
        let players: Vec<Player> = vec![];
        let instances = Problem::enumerate_instances(&players, &["1817".to_string()]);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].owner, None);
    }

    #[test]
    fn unsatisfiable_table_limit_is_infeasible() {
        let catalog = Catalog::new(&[game("1817", 3, 6, 360, 540)]).unwrap();
        let players: Vec<Player> = (0..12)
            .map(|i| player(&format!("p{i}"), &[], &["1817"]))
            .collect();
        let sessions = vec![Session {
            name: "s".into(),
            length: 600,
        }];
        let config = ScheduleConfig {
            shared_games: vec!["1817".to_string()],
            table_limit: 1,
        };

        let problem = Problem::build(&catalog, &players, &sessions, &config);
        // 12 attendees, one shared instance capped at 6 players and a
        // table limit of 1: nobody past the first 6 can be seated.
        assert!(problem.solve().is_err());
    }

    /// P7: the solver's own reported objective value, evaluated on its
    /// solution, equals `recompute_objective` applied to the extracted
    /// schedule — not just two formulas that happen to agree on paper.
    #[test]
    fn solver_objective_matches_recomputed_objective() {
        let catalog = Catalog::new(&[
            game("1817", 3, 6, 360, 540),
            game("1830", 3, 6, 180, 360),
        ])
        .unwrap();
        let players = vec![
            player("Alice", &[], &["1817"]),
            player("Bob", &["1817"], &["1817"]),
            player("Charles", &["1830"], &["1830"]),
        ];
        let sessions = vec![Session {
            name: "s".into(),
            length: 600,
        }];
        let config = ScheduleConfig::default();

        let problem = Problem::build(&catalog, &players, &sessions, &config);

        let mut vars: ProblemVariables = variables!();
        let x_vars = problem.make_x_variables(&mut vars);
        let g_vars = problem.make_g_variables(&mut vars);
        let objective = problem.build_objective(&x_vars, &g_vars);
        let constraints = problem.build_constraints(&x_vars, &g_vars);

        let objective_for_eval = objective.clone();
        let outcome = solver::solve_maximize(vars, objective, constraints);
        let solution = outcome.solution.expect("problem is feasible and optimal");
        let solver_objective = solution.eval(objective_for_eval);

        let schedule = problem.extract(solution.as_ref(), &x_vars);
        let recomputed = recompute_objective(&catalog, &schedule);

        assert!(
            (solver_objective - recomputed).abs() < 1e-6,
            "solver objective {solver_objective} != recomputed objective {recomputed}"
        );
    }
}
