//! Zappy game server library.

pub mod config;
pub mod directory;
pub mod entity;
pub mod scheduler;
pub mod server;
pub mod shutdown;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use server::run;
pub use shutdown::Shutdown;
