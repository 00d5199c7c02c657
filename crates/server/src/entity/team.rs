//! Team entity.

use std::collections::HashSet;

/// A named team with a fixed client capacity.
///
/// The team owns the membership relation; player lifetime is owned by
/// the directory so players stay addressable by id across teams.
#[derive(Debug, Clone)]
pub struct Team {
    pub name: String,
    pub capacity: u32,
    members: HashSet<u32>,
}

impl Team {
    pub fn new(name: &str, capacity: u32) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            members: HashSet::new(),
        }
    }

    /// Open slots left on this team.
    pub fn remaining_slots(&self) -> u32 {
        self.capacity.saturating_sub(self.members.len() as u32)
    }

    pub fn is_full(&self) -> bool {
        self.remaining_slots() == 0
    }

    /// Add a player id; fails when the team is at capacity.
    pub fn add_member(&mut self, player_id: u32) -> bool {
        if self.is_full() {
            return false;
        }
        self.members.insert(player_id)
    }

    pub fn remove_member(&mut self, player_id: u32) -> bool {
        self.members.remove(&player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_gate() {
        let mut team = Team::new("alpha", 2);
        assert_eq!(team.remaining_slots(), 2);

        assert!(team.add_member(1));
        assert!(team.add_member(2));
        assert_eq!(team.remaining_slots(), 0);
        assert!(!team.add_member(3));

        assert!(team.remove_member(1));
        assert_eq!(team.remaining_slots(), 1);
        assert!(team.add_member(3));
    }
}
