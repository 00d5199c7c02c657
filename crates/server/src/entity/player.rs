//! Player entity.

use protocol::commands::ActionKind;
use protocol::{Orientation, Resource};
use std::collections::HashMap;
use std::time::Instant;

/// Starting food units in a fresh inventory.
pub const STARTING_FOOD: u32 = 10;

/// Maximum player level.
pub const MAX_LEVEL: u32 = 8;

/// A connected, team-bound player.
///
/// Cooldown timestamps live inline on the record so the gate survives
/// being consulted from either server loop under the lock discipline.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub x: u32,
    pub y: u32,
    pub orientation: Orientation,
    pub level: u32,
    /// Resource counts, indexed in wire order.
    pub inventory: [u32; Resource::COUNT],
    /// Name of the one team this player belongs to.
    pub team: String,
    /// Set while an incantation ritual is in effect.
    pub praying: bool,
    /// Last armed monotonic timestamp, one slot per action kind.
    pub cooldowns: HashMap<ActionKind, Instant>,
}

impl Player {
    pub fn new(id: u32, team: &str, x: u32, y: u32, orientation: Orientation) -> Self {
        let mut inventory = [0; Resource::COUNT];
        inventory[Resource::Food.index()] = STARTING_FOOD;
        Self {
            id,
            x,
            y,
            orientation,
            level: 1,
            inventory,
            team: team.to_string(),
            praying: false,
            cooldowns: HashMap::new(),
        }
    }

    /// Step one tile along the given direction, wrapping both
    /// coordinates modulo the map dimensions.
    pub fn step(&mut self, direction: Orientation, width: u32, height: u32) {
        let (dx, dy) = direction.delta();
        self.x = wrap(self.x as i64 + dx, width);
        self.y = wrap(self.y as i64 + dy, height);
    }

    /// Step one tile in the facing direction.
    pub fn step_forward(&mut self, width: u32, height: u32) {
        self.step(self.orientation, width, height);
    }

    /// Inventory count for one resource kind.
    #[inline]
    pub fn held(&self, kind: Resource) -> u32 {
        self.inventory[kind.index()]
    }

    /// Add resources to the inventory.
    pub fn gain(&mut self, kind: Resource, amount: u32) {
        self.inventory[kind.index()] += amount;
    }

    /// Remove up to `amount` resources, clamping at zero. Returns the
    /// amount actually removed.
    pub fn spend(&mut self, kind: Resource, amount: u32) -> u32 {
        let held = self.inventory[kind.index()];
        let removed = held.min(amount);
        self.inventory[kind.index()] = held - removed;
        removed
    }
}

fn wrap(value: i64, modulus: u32) -> u32 {
    let m = modulus as i64;
    (((value % m) + m) % m) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_inventory() {
        let player = Player::new(1, "alpha", 0, 0, Orientation::North);
        assert_eq!(player.held(Resource::Food), STARTING_FOOD);
        assert_eq!(player.held(Resource::Linemate), 0);
        assert_eq!(player.level, 1);
        assert!(!player.praying);
    }

    #[test]
    fn test_step_forward_wraps_negative() {
        let mut player = Player::new(1, "alpha", 0, 0, Orientation::North);
        player.step_forward(10, 10);
        assert_eq!((player.x, player.y), (0, 9));

        player.orientation = Orientation::West;
        player.step_forward(10, 10);
        assert_eq!((player.x, player.y), (9, 9));
    }

    #[test]
    fn test_step_forward_wraps_positive() {
        let mut player = Player::new(1, "alpha", 9, 9, Orientation::South);
        player.step_forward(10, 10);
        assert_eq!((player.x, player.y), (9, 0));

        player.orientation = Orientation::East;
        player.step_forward(10, 10);
        assert_eq!((player.x, player.y), (0, 0));
    }

    #[test]
    fn test_spend_clamps_at_zero() {
        let mut player = Player::new(1, "alpha", 0, 0, Orientation::North);
        assert_eq!(player.spend(Resource::Sibur, 5), 0);
        assert_eq!(player.held(Resource::Sibur), 0);

        player.gain(Resource::Sibur, 2);
        assert_eq!(player.spend(Resource::Sibur, 5), 2);
        assert_eq!(player.held(Resource::Sibur), 0);
    }
}
