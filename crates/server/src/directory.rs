//! Team and player directory.
//!
//! One canonical membership model: a team owns its capacity and member
//! set, every player belongs to exactly one team, and players stay
//! globally addressable by id for cross-team operations.

use crate::entity::{Player, Team};
use protocol::Orientation;
use rand::Rng;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

/// Why a team-join request was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("team {0} is full")]
    TeamFull(String),
}

/// Outcome of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinInfo {
    pub player_id: u32,
    /// Open slots left on the team after this join.
    pub remaining_slots: u32,
}

/// Directory of all teams and live players.
#[derive(Debug)]
pub struct Directory {
    teams: Vec<Team>,
    players: HashMap<u32, Player>,
    next_player_id: u32,
}

impl Directory {
    /// Build the directory from startup configuration. Team names are
    /// fixed for the process lifetime.
    pub fn new(team_names: &[String], capacity: u32) -> Self {
        Self {
            teams: team_names.iter().map(|n| Team::new(n, capacity)).collect(),
            players: HashMap::new(),
            next_player_id: 1,
        }
    }

    /// Teams in configuration order (the order `tna` reports).
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    fn team_mut(&mut self, name: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.name == name)
    }

    #[inline]
    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.get(&id)
    }

    #[inline]
    pub fn player_mut(&mut self, id: u32) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Ids of every player standing on a tile.
    pub fn players_at(&self, x: u32, y: u32) -> Vec<u32> {
        self.players
            .values()
            .filter(|p| p.x == x && p.y == y)
            .map(|p| p.id)
            .collect()
    }

    /// Create a player on a team, capacity-checked. The spawn tile
    /// comes from a hatched egg (or a random tile when the queue is
    /// empty); orientation is drawn at random.
    pub fn join(&mut self, team_name: &str, x: u32, y: u32) -> Result<JoinInfo, JoinError> {
        let team = self
            .team(team_name)
            .ok_or_else(|| JoinError::UnknownTeam(team_name.to_string()))?;
        if team.is_full() {
            return Err(JoinError::TeamFull(team_name.to_string()));
        }

        let id = self.next_player_id;
        self.next_player_id += 1;

        let orientation = Orientation::from_index(rand::rng().random_range(0..4));
        let player = Player::new(id, team_name, x, y, orientation);
        self.players.insert(id, player);

        let team = self.team_mut(team_name).expect("team exists");
        team.add_member(id);
        let remaining_slots = team.remaining_slots();

        info!("player #{id} joined team {team_name} at ({x}, {y})");
        Ok(JoinInfo {
            player_id: id,
            remaining_slots,
        })
    }

    /// Remove a player and its team membership. Returns the record if
    /// it existed.
    pub fn remove_player(&mut self, id: u32) -> Option<Player> {
        let player = self.players.remove(&id)?;
        if let Some(team) = self.team_mut(&player.team) {
            team.remove_member(id);
        }
        info!("player #{id} left team {}", player.team);
        Some(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_teams() -> Directory {
        Directory::new(&["alpha".to_string(), "beta".to_string()], 2)
    }

    #[test]
    fn test_join_capacity() {
        let mut dir = two_teams();

        let first = dir.join("alpha", 0, 0).unwrap();
        assert_eq!(first.remaining_slots, 1);
        let second = dir.join("alpha", 1, 1).unwrap();
        assert_eq!(second.remaining_slots, 0);

        assert_eq!(
            dir.join("alpha", 2, 2),
            Err(JoinError::TeamFull("alpha".to_string()))
        );
        // The other team is unaffected.
        assert!(dir.join("beta", 0, 0).is_ok());
    }

    #[test]
    fn test_join_unknown_team() {
        let mut dir = two_teams();
        assert_eq!(
            dir.join("gamma", 0, 0),
            Err(JoinError::UnknownTeam("gamma".to_string()))
        );
    }

    #[test]
    fn test_remove_player_frees_slot() {
        let mut dir = two_teams();
        let info = dir.join("alpha", 0, 0).unwrap();
        dir.join("alpha", 0, 0).unwrap();
        assert!(dir.team("alpha").unwrap().is_full());

        let removed = dir.remove_player(info.player_id).unwrap();
        assert_eq!(removed.team, "alpha");
        assert_eq!(dir.team("alpha").unwrap().remaining_slots(), 1);
        assert!(dir.player(info.player_id).is_none());
        assert!(dir.remove_player(info.player_id).is_none());
    }

    #[test]
    fn test_player_ids_not_reused() {
        let mut dir = two_teams();
        let a = dir.join("alpha", 0, 0).unwrap().player_id;
        dir.remove_player(a);
        let b = dir.join("alpha", 0, 0).unwrap().player_id;
        assert!(b > a);
    }

    #[test]
    fn test_players_at_tile() {
        let mut dir = two_teams();
        let a = dir.join("alpha", 3, 3).unwrap().player_id;
        let b = dir.join("beta", 3, 3).unwrap().player_id;
        dir.join("beta", 4, 3).unwrap();

        let mut here = dir.players_at(3, 3);
        here.sort_unstable();
        assert_eq!(here, vec![a, b]);
    }
}
