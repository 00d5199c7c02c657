//! Shared game state and the simulation loop.

use crate::config::Config;
use crate::directory::Directory;
use crate::shutdown::Shutdown;
use crate::world::World;
use protocol::Resource;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info};

/// Upper bound on how long either loop sleeps before re-checking the
/// shutdown token.
pub const SHUTDOWN_POLL: Duration = Duration::from_millis(20);

/// All state shared between the connection loop and the simulation
/// loop. The map/egg world and the team/player directory sit behind
/// independent coarse locks; when a command needs both, the directory
/// lock is taken first.
pub struct Game {
    pub config: Config,
    pub directory: RwLock<Directory>,
    pub world: RwLock<World>,
    frequency: AtomicU32,
}

impl Game {
    /// Build the world from startup configuration: empty grid, initial
    /// resource placement, and one server egg per potential client.
    pub fn new(config: Config) -> Self {
        let mut world = World::new(config.width, config.height);
        world.map_mut().place_resources();
        world.seed_eggs(config.capacity, config.teams.len() as u32);

        let placed: u64 = Resource::ALL
            .iter()
            .map(|&k| world.map().resource_total(k))
            .sum();
        info!(
            "world initialized: {}x{} tiles, {} resource units, {} eggs",
            config.width,
            config.height,
            placed,
            world.hatchable_eggs()
        );

        let directory = Directory::new(&config.teams, config.capacity);
        let frequency = AtomicU32::new(config.frequency);
        Self {
            config,
            directory: RwLock::new(directory),
            world: RwLock::new(world),
            frequency,
        }
    }

    /// Current server frequency in actions per second.
    #[inline]
    pub fn frequency(&self) -> u32 {
        self.frequency.load(Ordering::Relaxed)
    }

    /// Update the frequency (`sst`). Takes effect on the next cooldown
    /// check and the next simulation tick.
    pub fn set_frequency(&self, frequency: u32) {
        self.frequency.store(frequency, Ordering::Relaxed);
        info!("frequency set to {frequency}");
    }
}

/// Fixed-tick driver for world-level time effects (egg hatching,
/// resource respawn). Runs until the shutdown token is triggered.
///
/// The base tick interval is derived from the current frequency on
/// every iteration, so `sst` changes take effect live.
pub async fn run_simulation_loop(game: Arc<Game>, shutdown: Shutdown) {
    let mut anchor = Instant::now();
    info!("simulation loop started");

    loop {
        if shutdown.is_triggered() {
            break;
        }

        let interval = Duration::from_secs_f64(1.0 / game.frequency() as f64);
        let elapsed = anchor.elapsed();
        if elapsed >= interval {
            let mut world = game.world.write().await;
            world.advance_tick();
            if world.tick() % 1000 == 0 {
                debug!(
                    "tick {}: {} hatchable eggs",
                    world.tick(),
                    world.hatchable_eggs()
                );
            }
            anchor = Instant::now();
        } else {
            sleep((interval - elapsed).min(SHUTDOWN_POLL)).await;
        }
    }

    info!("simulation loop stopped");
}
