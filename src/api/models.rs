// Data models for the board API
//
// Rows come from a SQLite-backed server that serializes booleans as 0/1
// integers and optional text columns as null, so the deserializers here are
// deliberately tolerant.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

/// Which list a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Mission,
    Goal,
    Habit,
    Subgoal,
}

impl RowKind {
    /// REST collection segment for this kind.
    pub fn collection(self) -> &'static str {
        match self {
            RowKind::Mission => "missions",
            RowKind::Goal => "goals",
            RowKind::Habit => "habits",
            RowKind::Subgoal => "subgoals",
        }
    }

    /// Sub-goals are deleted through their edit flow, not by swiping.
    pub fn swipeable(self) -> bool {
        !matches!(self, RowKind::Subgoal)
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RowKind::Mission => "mission",
            RowKind::Goal => "goal",
            RowKind::Habit => "habit",
            RowKind::Subgoal => "subgoal",
        })
    }
}

/// Opaque row identifier. The server hands out integers, but rows are
/// addressed as strings in the UI layer; order payloads coerce back to
/// integers and silently drop anything non-numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Integer form, if the identifier is numeric.
    pub fn as_int(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }
}

impl From<i64> for RowId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully qualified row address: kind plus identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowRef {
    pub kind: RowKind,
    pub id: RowId,
}

impl RowRef {
    pub fn new(kind: RowKind, id: impl Into<RowId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Accepts true/false, 0/1, or null where the API promises a boolean.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null,
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Null => false,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mission {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub is_completed: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_example: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Goal {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// 1 = low, 2 = medium, 3 = high
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub is_completed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Habit {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub today_count: i64,
    #[serde(default)]
    pub streak: i64,
    #[serde(default)]
    pub total_completions: i64,
    #[serde(default, deserialize_with = "flag")]
    pub reminders_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subgoal {
    pub id: i64,
    #[serde(default)]
    pub mission_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "flag")]
    pub is_completed: bool,
}

/// The full fetched state. Local edits are provisional; every mutation is
/// followed by a refetch, and the next snapshot supersedes whatever the UI
/// assumed in the meantime.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub missions: Vec<Mission>,
    pub goals: Vec<Goal>,
    pub habits: Vec<Habit>,
    /// Sub-goals keyed by owning mission id, in server order.
    pub subgoals: HashMap<i64, Vec<Subgoal>>,
}

impl Snapshot {
    pub fn subgoals_of(&self, mission_id: i64) -> &[Subgoal] {
        self.subgoals
            .get(&mission_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_sqlite_integers_and_null() {
        let m: Mission = serde_json::from_str(
            r#"{"id": 7, "title": "Run a marathon", "is_completed": 1, "is_example": null}"#,
        )
        .unwrap();
        assert!(m.is_completed);
        assert!(!m.is_example);
        assert_eq!(m.description, "");

        let g: Goal =
            serde_json::from_str(r#"{"id": 3, "title": "Read", "is_completed": false}"#).unwrap();
        assert!(!g.is_completed);
    }

    #[test]
    fn habit_counters_default_to_zero() {
        let h: Habit = serde_json::from_str(r#"{"id": 42, "title": "Stretch"}"#).unwrap();
        assert_eq!(h.today_count, 0);
        assert_eq!(h.streak, 0);
    }

    #[test]
    fn row_id_coercion() {
        assert_eq!(RowId::new("42").as_int(), Some(42));
        assert_eq!(RowId::from(7).as_int(), Some(7));
        assert_eq!(RowId::new(" 13 ").as_int(), Some(13));
        assert_eq!(RowId::new("placeholder").as_int(), None);
        assert_eq!(RowId::new("").as_int(), None);
    }
}
