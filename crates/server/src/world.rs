//! World state management.
//!
//! Owns the map grid with its resource counts and the egg queue. The
//! team/player directory lives separately so the two structures can sit
//! behind independent locks.

use crate::entity::{Egg, SERVER_FATHER};
use protocol::Resource;
use rand::Rng;
use std::collections::VecDeque;

/// Ticks a fork-laid egg incubates before it becomes hatchable.
pub const EGG_HATCH_DELAY_TICKS: u64 = 600;

/// Maintenance passes between resource top-ups.
pub const RESOURCE_RESPAWN_TICKS: u64 = 20;

/// Resource counts for one map tile. Counts never go negative;
/// subtraction clamps at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tile {
    counts: [u32; Resource::COUNT],
}

impl Tile {
    #[inline]
    pub fn count(&self, kind: Resource) -> u32 {
        self.counts[kind.index()]
    }

    /// All counts in wire order.
    #[inline]
    pub fn counts(&self) -> &[u32; Resource::COUNT] {
        &self.counts
    }

    pub fn add(&mut self, kind: Resource, amount: u32) {
        self.counts[kind.index()] += amount;
    }

    /// Remove up to `amount`, clamping at zero. Returns the amount
    /// actually removed.
    pub fn remove(&mut self, kind: Resource, amount: u32) -> u32 {
        let held = self.counts[kind.index()];
        let removed = held.min(amount);
        self.counts[kind.index()] = held - removed;
        removed
    }
}

/// The width x height tile grid, row-major. Exclusive owner of all
/// tiles for the process lifetime.
#[derive(Debug, Clone)]
pub struct Map {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Map {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::default(); (width * height) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    pub fn tile(&self, x: u32, y: u32) -> &Tile {
        &self.tiles[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn tile_mut(&mut self, x: u32, y: u32) -> &mut Tile {
        &mut self.tiles[(y * self.width + x) as usize]
    }

    /// Iterate tiles in row-major order with their coordinates.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (u32, u32, &Tile)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| (i as u32 % self.width, i as u32 / self.width, tile))
    }

    /// Uniformly random tile coordinates.
    pub fn random_coords(&self) -> (u32, u32) {
        let mut rng = rand::rng();
        (
            rng.random_range(0..self.width),
            rng.random_range(0..self.height),
        )
    }

    /// Total units of one kind summed over all tiles.
    pub fn resource_total(&self, kind: Resource) -> u64 {
        self.tiles.iter().map(|t| t.count(kind) as u64).sum()
    }

    /// Placement target for one kind: floor(coefficient x width x height).
    pub fn placement_target(&self, kind: Resource) -> u64 {
        (kind.density() * self.width as f64 * self.height as f64).floor() as u64
    }

    /// Initial placement, run once at startup. Each unit lands on an
    /// independently drawn uniform random tile; tiles may receive
    /// several units of the same or different kinds.
    pub fn place_resources(&mut self) {
        for kind in Resource::ALL {
            let target = self.placement_target(kind);
            for _ in 0..target {
                let (x, y) = self.random_coords();
                self.tile_mut(x, y).add(kind, 1);
            }
        }
    }

    /// Top each kind back up to its placement target, one unit per
    /// random tile. Run periodically by the simulation loop.
    pub fn respawn_resources(&mut self) {
        for kind in Resource::ALL {
            let target = self.placement_target(kind);
            let current = self.resource_total(kind);
            for _ in current..target {
                let (x, y) = self.random_coords();
                self.tile_mut(x, y).add(kind, 1);
            }
        }
    }
}

/// An egg laid by Fork, counting down to hatchability.
#[derive(Debug, Clone, Copy)]
struct IncubatingEgg {
    egg: Egg,
    laid_tick: u64,
}

/// The world: map grid, egg lifecycle, tick counter.
#[derive(Debug)]
pub struct World {
    map: Map,
    /// Hatchable eggs, oldest first.
    eggs: VecDeque<Egg>,
    /// Fork-laid eggs not yet hatchable.
    incubating: Vec<IncubatingEgg>,
    next_egg_id: u32,
    tick: u64,
}

impl World {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            map: Map::new(width, height),
            eggs: VecDeque::new(),
            incubating: Vec::new(),
            next_egg_id: 1,
            tick: 0,
        }
    }

    #[inline]
    pub fn map(&self) -> &Map {
        &self.map
    }

    #[inline]
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    fn next_egg_id(&mut self) -> u32 {
        let id = self.next_egg_id;
        self.next_egg_id += 1;
        id
    }

    /// Seed `capacity x team_count` server-spawned eggs on uniformly
    /// random tiles. Run once at startup.
    pub fn seed_eggs(&mut self, capacity: u32, team_count: u32) {
        for _ in 0..capacity * team_count {
            let (x, y) = self.map.random_coords();
            let id = self.next_egg_id();
            self.eggs.push_back(Egg {
                id,
                father: SERVER_FATHER,
                x,
                y,
            });
        }
    }

    /// Lay an egg on a tile (Fork). It enters the hatchable FIFO after
    /// the incubation delay.
    pub fn lay_egg(&mut self, father: i64, x: u32, y: u32) -> u32 {
        let id = self.next_egg_id();
        self.incubating.push(IncubatingEgg {
            egg: Egg { id, father, x, y },
            laid_tick: self.tick,
        });
        id
    }

    /// Pop the oldest hatchable egg.
    pub fn pop_egg(&mut self) -> Option<Egg> {
        self.eggs.pop_front()
    }

    /// Number of hatchable eggs.
    pub fn hatchable_eggs(&self) -> usize {
        self.eggs.len()
    }

    /// Destroy every egg sitting on a tile (Eject). Returns how many
    /// were removed.
    pub fn remove_eggs_at(&mut self, x: u32, y: u32) -> usize {
        let before = self.eggs.len() + self.incubating.len();
        self.eggs.retain(|e| e.x != x || e.y != y);
        self.incubating.retain(|e| e.egg.x != x || e.egg.y != y);
        before - (self.eggs.len() + self.incubating.len())
    }

    /// One world-maintenance pass: advance the tick, move matured eggs
    /// into the hatchable queue, and periodically respawn resources.
    pub fn advance_tick(&mut self) {
        self.tick += 1;

        let tick = self.tick;
        let mut i = 0;
        while i < self.incubating.len() {
            if tick - self.incubating[i].laid_tick >= EGG_HATCH_DELAY_TICKS {
                let hatched = self.incubating.swap_remove(i);
                self.eggs.push_back(hatched.egg);
            } else {
                i += 1;
            }
        }

        if tick % RESOURCE_RESPAWN_TICKS == 0 {
            self.map.respawn_resources();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_remove_clamps() {
        let mut tile = Tile::default();
        tile.add(Resource::Food, 2);
        assert_eq!(tile.remove(Resource::Food, 5), 2);
        assert_eq!(tile.count(Resource::Food), 0);
        assert_eq!(tile.remove(Resource::Food, 1), 0);
        assert_eq!(tile.count(Resource::Food), 0);
    }

    #[test]
    fn test_placement_totals() {
        let mut map = Map::new(10, 10);
        map.place_resources();
        for kind in Resource::ALL {
            let expected = (kind.density() * 100.0).floor() as u64;
            assert_eq!(map.resource_total(kind), expected, "{}", kind.name());
        }
        // Concretely: 50 food, 5 thystame on a 10x10 map.
        assert_eq!(map.resource_total(Resource::Food), 50);
        assert_eq!(map.resource_total(Resource::Thystame), 5);
    }

    #[test]
    fn test_respawn_tops_up_to_target() {
        let mut map = Map::new(5, 5);
        map.place_resources();
        let target = map.placement_target(Resource::Food);

        // Strip some food, then respawn.
        let mut to_remove = 7;
        'outer: for y in 0..5 {
            for x in 0..5 {
                to_remove -= map.tile_mut(x, y).remove(Resource::Food, to_remove);
                if to_remove == 0 {
                    break 'outer;
                }
            }
        }
        assert!(map.resource_total(Resource::Food) < target);

        map.respawn_resources();
        assert_eq!(map.resource_total(Resource::Food), target);
    }

    #[test]
    fn test_seed_eggs() {
        let mut world = World::new(10, 10);
        world.seed_eggs(3, 2);
        assert_eq!(world.hatchable_eggs(), 6);

        let egg = world.pop_egg().unwrap();
        assert_eq!(egg.father, SERVER_FATHER);
        assert!(egg.x < 10 && egg.y < 10);
    }

    #[test]
    fn test_egg_ids_monotonic_fifo() {
        let mut world = World::new(4, 4);
        world.seed_eggs(2, 1);
        let first = world.pop_egg().unwrap();
        let second = world.pop_egg().unwrap();
        assert!(second.id > first.id);
        assert!(world.pop_egg().is_none());
    }

    #[test]
    fn test_fork_egg_incubation() {
        let mut world = World::new(4, 4);
        let id = world.lay_egg(7, 1, 2);
        assert_eq!(world.hatchable_eggs(), 0);

        for _ in 0..EGG_HATCH_DELAY_TICKS {
            world.advance_tick();
        }
        assert_eq!(world.hatchable_eggs(), 1);

        let egg = world.pop_egg().unwrap();
        assert_eq!((egg.id, egg.father, egg.x, egg.y), (id, 7, 1, 2));
    }

    #[test]
    fn test_remove_eggs_at_tile() {
        let mut world = World::new(4, 4);
        world.lay_egg(1, 2, 2);
        world.lay_egg(1, 2, 2);
        world.lay_egg(1, 3, 3);
        assert_eq!(world.remove_eggs_at(2, 2), 2);
        assert_eq!(world.remove_eggs_at(2, 2), 0);
    }

    #[test]
    fn test_row_major_iteration() {
        let map = Map::new(3, 2);
        let coords: Vec<(u32, u32)> = map.iter_tiles().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(
            coords,
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );
    }
}
