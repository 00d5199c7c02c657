//! Shared protocol crate for the zappy server.
//!
//! This crate contains:
//! - The two command dialects (player and observer) and their parsers
//! - Reply-line builders for the observer dialect
//! - Shared types (Resource, Orientation) and wire literals

mod error;
pub mod commands;

pub use error::ProtocolError;

/// Greeting line sent to every client immediately after accept.
pub const GREETING: &str = "BIENVENUE";

/// Literal a client sends instead of a team name to register as a
/// read-only observer. Observer registration is never capacity-gated.
pub const OBSERVER_KEYWORD: &str = "GRAPHIC";

/// Generic success reply (player dialect).
pub const REPLY_OK: &str = "ok";
/// Generic failure reply.
pub const REPLY_KO: &str = "ko";
/// Observer-dialect sentinel for an unknown command.
pub const REPLY_UNKNOWN: &str = "suc";
/// Observer-dialect sentinel for a recognized command with bad arguments.
pub const REPLY_BAD_PARAMETER: &str = "sbp";
/// Reply to a team-join attempt on a session that is already bound.
pub const REPLY_ALREADY_JOINED: &str = "already joined";

/// The seven resource kinds, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Food,
    Linemate,
    Deraumere,
    Sibur,
    Mendiane,
    Phiras,
    Thystame,
}

impl Resource {
    /// Number of resource kinds.
    pub const COUNT: usize = 7;

    /// All kinds in wire order (the order of `bct`/`pin` counts).
    pub const ALL: [Resource; Resource::COUNT] = [
        Resource::Food,
        Resource::Linemate,
        Resource::Deraumere,
        Resource::Sibur,
        Resource::Mendiane,
        Resource::Phiras,
        Resource::Thystame,
    ];

    /// Index of this kind in wire order.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Spawn density coefficient, used only at initial placement.
    pub const fn density(self) -> f64 {
        match self {
            Resource::Food => 0.5,
            Resource::Linemate => 0.3,
            Resource::Deraumere => 0.15,
            Resource::Sibur => 0.1,
            Resource::Mendiane => 0.1,
            Resource::Phiras => 0.08,
            Resource::Thystame => 0.05,
        }
    }

    /// Lowercase wire name, as used by `Take`/`Set` arguments.
    pub const fn name(self) -> &'static str {
        match self {
            Resource::Food => "food",
            Resource::Linemate => "linemate",
            Resource::Deraumere => "deraumere",
            Resource::Sibur => "sibur",
            Resource::Mendiane => "mendiane",
            Resource::Phiras => "phiras",
            Resource::Thystame => "thystame",
        }
    }

    /// Parse a wire name.
    pub fn from_name(name: &str) -> Option<Resource> {
        Resource::ALL.iter().copied().find(|r| r.name() == name)
    }
}

/// Cardinal orientation of a player, cyclic over N/E/S/W.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Orientation {
    /// All orientations in rotation order.
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    /// Orientation from a rotation index, modulo 4.
    pub const fn from_index(i: usize) -> Orientation {
        Orientation::ALL[i % 4]
    }

    /// One step clockwise: N -> E -> S -> W -> N.
    pub const fn turn_right(self) -> Orientation {
        Orientation::from_index(self as usize + 1)
    }

    /// One step counter-clockwise: N -> W -> S -> E -> N.
    pub const fn turn_left(self) -> Orientation {
        Orientation::from_index(self as usize + 3)
    }

    /// The opposite direction.
    pub const fn opposite(self) -> Orientation {
        Orientation::from_index(self as usize + 2)
    }

    /// Unit step along this direction. North is -y, matching the
    /// row-major map layout.
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Orientation::North => (0, -1),
            Orientation::East => (1, 0),
            Orientation::South => (0, 1),
            Orientation::West => (-1, 0),
        }
    }

    /// Single-letter wire form used by `ppo`.
    pub const fn as_char(self) -> char {
        match self {
            Orientation::North => 'N',
            Orientation::East => 'E',
            Orientation::South => 'S',
            Orientation::West => 'W',
        }
    }
}
