//! Egg entity.

/// Father id for eggs seeded by the server at world init, as opposed to
/// eggs laid by a player's Fork.
pub const SERVER_FATHER: i64 = -1;

/// A placeholder world entity that later hatches into a player.
///
/// Ids are assigned monotonically and never reused while the egg is
/// alive. Hatchable eggs sit in the world's FIFO queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Egg {
    pub id: u32,
    /// Laying player's id, or [`SERVER_FATHER`].
    pub father: i64,
    pub x: u32,
    pub y: u32,
}
