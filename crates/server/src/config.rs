//! Server configuration.
//!
//! All parameters come from the command line. Flag parsing failures
//! exit nonzero with a usage message before any socket is opened;
//! semantic validation happens in [`Config::validate`].

use clap::Parser;
use thiserror::Error;

/// Command-line configuration for the server process.
#[derive(Debug, Clone, Parser)]
#[command(name = "zappy_server", about = "Zappy authoritative game server")]
pub struct Config {
    /// Port to listen on.
    #[arg(short, long)]
    pub port: u16,

    /// Bind address.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Map width in tiles.
    #[arg(short = 'x', long)]
    pub width: u32,

    /// Map height in tiles.
    #[arg(short = 'y', long)]
    pub height: u32,

    /// Team names (repeat or list: -n alpha beta).
    #[arg(short = 'n', long = "name", num_args = 1.., required = true)]
    pub teams: Vec<String>,

    /// Client capacity per team.
    #[arg(short, long)]
    pub capacity: u32,

    /// Simulation frequency in actions per second.
    #[arg(short, long, default_value_t = 100)]
    pub frequency: u32,
}

/// Startup configuration errors. All of them are fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("map dimensions must be positive, got {0}x{1}")]
    EmptyMap(u32, u32),

    #[error("at least one team is required")]
    NoTeams,

    #[error("duplicate team name: {0}")]
    DuplicateTeam(String),

    #[error("team capacity must be positive")]
    ZeroCapacity,

    #[error("frequency must be positive")]
    ZeroFrequency,
}

impl Config {
    /// Semantic checks clap cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyMap(self.width, self.height));
        }
        if self.teams.is_empty() {
            return Err(ConfigError::NoTeams);
        }
        for (i, name) in self.teams.iter().enumerate() {
            if self.teams[..i].contains(name) {
                return Err(ConfigError::DuplicateTeam(name.clone()));
            }
        }
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.frequency == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        Ok(())
    }
}
