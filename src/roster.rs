//! Team and player values handed to the core by the roster collaborator.
//!
//! The core attaches these to a match and to events by id only; it never
//! edits them.

use serde::{Deserialize, Serialize};

use crate::types::{PlayerId, TeamId};

/// Squad member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player handle.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Jersey number.
    pub jersey_number: u32,
    /// Playing position, e.g. "Full Back".
    pub position: Option<String>,
}

/// One side with its squad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team handle.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Squad.
    pub players: Vec<Player>,
}

impl Team {
    /// Team with an empty squad.
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            players: Vec::new(),
        }
    }

    /// Squad member with `id`.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Players ordered by jersey number.
    pub fn sorted_players(&self) -> Vec<&Player> {
        let mut out: Vec<&Player> = self.players.iter().collect();
        out.sort_by_key(|p| (p.jersey_number, p.id));
        out
    }
}
