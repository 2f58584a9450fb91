//! Immutable game lookup with deterministic defaults.
//!
//! See spec.md §4.1. The catalog is built once, preprocesses every entry's
//! popularity table into the "thermometer" coefficients the problem
//! builder needs (§4.2.6), and is read-only afterwards — safe to share
//! across concurrent [`crate::problem::Problem::build`] calls.

use crate::error::OptimizerError;
use crate::models::{GameRecord, Session};
use log::warn;
use std::collections::HashMap;

/// Popularity values at or above this are clamped down to it, so a single
/// extremely popular table size can't dominate the objective relative to
/// players' declared interests.
const POPULARITY_CAP: f64 = 0.9;
/// Popularity used for any player count not present in the input table.
const POPULARITY_FALLBACK: f64 = 0.9;
/// Keeps popularity terms below the `1.0` weight of a satisfied interest.
const POPULARITY_SCALE: f64 = 0.1;

fn default_game_record() -> GameRecord {
    GameRecord {
        name: String::new(),
        min_players: 3,
        max_players: 4,
        min_playtime: 240,
        max_playtime: 240,
        popularity: HashMap::new(),
    }
}

/// A catalog entry after popularity preprocessing.
///
/// `adjusted_popularity[k]` is the marginal popularity gain of growing a
/// table from `min_players + k - 1` players to `min_players + k` players
/// (and `adjusted_popularity[0]` is the weight of the minimum table size
/// itself). Summing along an active prefix reproduces the absolute
/// popularity weight for that table size — see spec.md §4.2.6.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogGame {
    pub min_players: u32,
    pub max_players: u32,
    pub min_playtime: u32,
    pub max_playtime: u32,
    pub adjusted_popularity: Vec<f64>,
}

impl CatalogGame {
    fn from_record(record: &GameRecord) -> Result<Self, OptimizerError> {
        if record.min_players > record.max_players {
            return Err(OptimizerError::InvalidCatalogEntry {
                game: record.name.clone(),
                reason: format!(
                    "min_players ({}) > max_players ({})",
                    record.min_players, record.max_players
                ),
            });
        }
        if record.min_playtime > record.max_playtime {
            return Err(OptimizerError::InvalidCatalogEntry {
                game: record.name.clone(),
                reason: format!(
                    "min_playtime ({}) > max_playtime ({})",
                    record.min_playtime, record.max_playtime
                ),
            });
        }

        let mut weights = Vec::with_capacity((record.max_players - record.min_players + 1) as usize);
        for n in record.min_players..=record.max_players {
            let raw = record.popularity.get(&n).copied().unwrap_or(POPULARITY_FALLBACK);
            let clamped = raw.min(POPULARITY_CAP);
            weights.push(clamped * POPULARITY_SCALE * n as f64);
        }

        let mut adjusted_popularity = Vec::with_capacity(weights.len());
        for (k, w) in weights.iter().enumerate() {
            if k == 0 {
                adjusted_popularity.push(*w);
            } else {
                adjusted_popularity.push(w - weights[k - 1]);
            }
        }

        Ok(CatalogGame {
            min_players: record.min_players,
            max_players: record.max_players,
            min_playtime: record.min_playtime,
            max_playtime: record.max_playtime,
            adjusted_popularity,
        })
    }

    /// Effective max player count for a table of this game within a
    /// session of the given length — see spec.md §4.1. Fixed-length and
    /// fixed-size games just return the stored `max_players`; the
    /// session is only consulted for genuinely variable games.
    pub fn effective_max_players(&self, session: Option<&Session>) -> u32 {
        let Some(session) = session else {
            return self.max_players;
        };
        if self.min_players == self.max_players || self.min_playtime == self.max_playtime {
            return self.max_players;
        }

        let slope = (self.max_playtime - self.min_playtime) as f64
            / (self.max_players - self.min_players) as f64;
        let beyond_minimum =
            ((session.length as f64 - self.min_playtime as f64) / slope).floor();
        if beyond_minimum < 0.0 {
            return self.min_players;
        }
        self.max_players.min(self.min_players + beyond_minimum as u32)
    }

    /// `adjusted_popularity[c]` for `c = n - min_players`, or `0.0` if `n`
    /// is out of the catalog's player-count range entirely.
    pub fn popularity_at(&self, c: usize) -> f64 {
        self.adjusted_popularity.get(c).copied().unwrap_or(0.0)
    }
}

/// Name -> game lookup, with the deterministic default for unknown names.
pub struct Catalog {
    games: HashMap<String, CatalogGame>,
    default: CatalogGame,
}

impl Catalog {
    /// Builds the catalog, preprocessing every entry's popularity table.
    /// The default game's `adjusted_popularity` is derived through the
    /// same pass rather than hard-coded (spec.md §9's open question).
    pub fn new(records: &[GameRecord]) -> Result<Self, OptimizerError> {
        let mut games = HashMap::with_capacity(records.len());
        for record in records {
            games.insert(record.name.clone(), CatalogGame::from_record(record)?);
        }
        let default = CatalogGame::from_record(&default_game_record())
            .expect("built-in default record is always well-formed");

        Ok(Catalog { games, default })
    }

    /// Looks up a game by name, falling back to the shared default entry
    /// for names not present in the catalog. Unknown names are never an
    /// error — per spec.md §7 this is deliberate, since rosters routinely
    /// reference titles the catalog hasn't indexed yet.
    pub fn game(&self, name: &str) -> &CatalogGame {
        self.games.get(name).unwrap_or_else(|| {
            warn!("unknown game {name:?}, falling back to the default catalog entry");
            &self.default
        })
    }

    pub fn min_players(&self, name: &str) -> u32 {
        self.game(name).min_players
    }

    pub fn min_playtime(&self, name: &str) -> u32 {
        self.game(name).min_playtime
    }

    pub fn max_players(&self, name: &str, session: Option<&Session>) -> u32 {
        self.game(name).effective_max_players(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, min_p: u32, max_p: u32, min_t: u32, max_t: u32) -> GameRecord {
        GameRecord {
            name: name.to_string(),
            min_players: min_p,
            max_players: max_p,
            min_playtime: min_t,
            max_playtime: max_t,
            popularity: HashMap::new(),
        }
    }

    #[test]
    fn unknown_game_resolves_to_default() {
        let catalog = Catalog::new(&[]).unwrap();
        let g = catalog.game("nonexistent");
        assert_eq!(g.min_players, 3);
        assert_eq!(g.max_players, 4);
        assert_eq!(g.min_playtime, 240);
        assert_eq!(g.max_playtime, 240);
    }

    #[test]
    fn default_popularity_matches_fully_popular_game() {
        let catalog = Catalog::new(&[]).unwrap();
        let default = catalog.game("anything");
        // 0.9 popularity at both 3 and 4 players, per the same transform
        // as an explicit catalog entry.
        assert!((default.adjusted_popularity[0] - 0.27).abs() < 1e-9);
        assert!((default.adjusted_popularity[1] - 0.09).abs() < 1e-9);
    }

    #[test]
    fn popularity_is_clamped_and_incremental() {
        let mut popularity = HashMap::new();
        popularity.insert(3, 1.0); // clamped to 0.9
        popularity.insert(4, 0.5);
        let mut rec = record("1817", 3, 4, 360, 540);
        rec.popularity = popularity;
        let catalog = Catalog::new(&[rec]).unwrap();
        let g = catalog.game("1817");
        // w[3] = 0.9 * 0.1 * 3 = 0.27, w[4] = 0.5 * 0.1 * 4 = 0.2
        assert!((g.adjusted_popularity[0] - 0.27).abs() < 1e-9);
        assert!((g.adjusted_popularity[1] - (0.2 - 0.27)).abs() < 1e-9);
    }

    #[test]
    fn invalid_range_is_rejected() {
        let rec = record("broken", 5, 3, 100, 200);
        let err = Catalog::new(&[rec]).unwrap_err();
        assert!(matches!(err, OptimizerError::InvalidCatalogEntry { .. }));
    }

    #[test]
    fn short_session_caps_variable_length_game() {
        let rec = record("1817", 3, 6, 360, 540);
        let catalog = Catalog::new(&[rec]).unwrap();
        let session = Session {
            name: "s".into(),
            length: 420,
        };
        // slope = (540-360)/(6-3) = 60; beyond_minimum = floor((420-360)/60) = 1
        assert_eq!(catalog.max_players("1817", Some(&session)), 4);
    }

    #[test]
    fn fixed_length_game_ignores_session() {
        let rec = record("1860", 3, 4, 240, 240);
        let catalog = Catalog::new(&[rec]).unwrap();
        let session = Session {
            name: "s".into(),
            length: 100,
        };
        assert_eq!(catalog.max_players("1860", Some(&session)), 4);
    }
}
