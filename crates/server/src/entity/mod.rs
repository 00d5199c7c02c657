//! World entities: eggs, players, teams.

mod egg;
mod player;
mod team;

pub use egg::{Egg, SERVER_FATHER};
pub use player::{MAX_LEVEL, Player, STARTING_FOOD};
pub use team::Team;
