//! Input and output data types for the schedule optimizer.
//!
//! These mirror the external interfaces in spec.md §6: catalog entries,
//! roster entries, and session entries are plain serializable records, and
//! the optimizer hands back an ordered [`Schedule`] of the same shape
//! regardless of how the input was sourced (file, stdin, test fixture).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single catalog entry as supplied by the game database ingestion step.
///
/// Extra fields such as `full_name`, `id`, or ownership-popularity data are
/// not represented here at all — per spec.md §6 they are ignored by the
/// optimizer, so there is nothing to deserialize them into.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub name: String,
    pub min_players: u32,
    pub max_players: u32,
    pub min_playtime: u32,
    pub max_playtime: u32,
    /// Player count -> popularity in `[0, 1]`. Keys may be stringified
    /// integers on the wire, hence the custom (de)serialization.
    #[serde(default, with = "popularity_map")]
    pub popularity: HashMap<u32, f64>,
}

mod popularity_map {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<S: Serializer>(
        map: &HashMap<u32, f64>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        let stringified: HashMap<String, f64> =
            map.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        stringified.serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<HashMap<u32, f64>, D::Error> {
        let stringified: HashMap<String, f64> = HashMap::deserialize(de)?;
        stringified
            .into_iter()
            .map(|(k, v)| {
                k.parse::<u32>()
                    .map(|k| (k, v))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

/// A roster entry: one attendee's ownership, interests, and attendance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    /// Multiset of owned game names; duplicates are significant (two
    /// copies of a title are two distinct instances).
    #[serde(default)]
    pub owns: Vec<String>,
    /// Set of game names this player wants to play.
    #[serde(default)]
    pub interests: Vec<String>,
    /// Sessions (by index) this player attends. `None` means every
    /// session.
    #[serde(default)]
    pub sessions: Option<Vec<usize>>,
}

impl Player {
    pub fn interested_in(&self, game: &str) -> bool {
        self.interests.iter().any(|g| g == game)
    }

    pub fn attends(&self, session: usize) -> bool {
        match &self.sessions {
            None => true,
            Some(sessions) => sessions.contains(&session),
        }
    }
}

/// An ordered time slot during which one round of play happens.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub name: String,
    /// Minutes available in this session.
    pub length: u32,
}

/// Optional parameters controlling how the problem is built.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScheduleConfig {
    /// Game titles provided by the event rather than any attendee; these
    /// are available in every session regardless of attendance.
    #[serde(default)]
    pub shared_games: Vec<String>,
    /// Maximum number of concurrent game instances per session.
    #[serde(default = "default_table_limit")]
    pub table_limit: u32,
}

fn default_table_limit() -> u32 {
    10
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            shared_games: Vec::new(),
            table_limit: default_table_limit(),
        }
    }
}

/// A single table in a single session: a game instance and its seated
/// players, in roster order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScheduledTable {
    pub game_name: String,
    pub players: Vec<Player>,
}

/// The per-session slice of a [`Schedule`]: tables sorted by game name.
pub type SessionSchedule = Vec<ScheduledTable>;

/// The complete optimizer result: one entry per session, in session order.
pub type Schedule = Vec<SessionSchedule>;
