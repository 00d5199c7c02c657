//! Command parsing for both protocol dialects.
//!
//! The player dialect covers the twelve autonomous-client actions; the
//! observer dialect covers the read-only world queries. Both parsers
//! are total lookups over the command token.

pub mod observer;
pub mod player;

pub use observer::ObserverCommand;
pub use player::{ActionKind, PlayerCommand};
