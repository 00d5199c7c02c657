//! Player-dialect commands and their scheduler costs.

use crate::{ProtocolError, Resource};

/// A parsed player-dialect command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Forward,
    Right,
    Left,
    Look,
    Inventory,
    Broadcast,
    ConnectNbr,
    Fork,
    Eject,
    Take(Resource),
    Set(Resource),
    Incantation,
}

/// Action kinds for the cooldown gate. One gate slot exists per kind
/// per player, independent of the argument (`Take food` and
/// `Take sibur` share one slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Forward,
    Right,
    Left,
    Look,
    Inventory,
    Broadcast,
    ConnectNbr,
    Fork,
    Eject,
    Take,
    Set,
    Incantation,
}

impl ActionKind {
    /// Fixed cost in time units. Real-world wait is cost divided by the
    /// current server frequency.
    pub const fn cost(self) -> u32 {
        match self {
            ActionKind::Forward => 7,
            ActionKind::Right => 7,
            ActionKind::Left => 7,
            ActionKind::Look => 7,
            ActionKind::Inventory => 1,
            ActionKind::Broadcast => 7,
            ActionKind::ConnectNbr => 0,
            ActionKind::Fork => 42,
            ActionKind::Eject => 7,
            ActionKind::Take => 7,
            ActionKind::Set => 7,
            ActionKind::Incantation => 300,
        }
    }
}

impl PlayerCommand {
    /// The cooldown slot this command fires through.
    pub const fn kind(self) -> ActionKind {
        match self {
            PlayerCommand::Forward => ActionKind::Forward,
            PlayerCommand::Right => ActionKind::Right,
            PlayerCommand::Left => ActionKind::Left,
            PlayerCommand::Look => ActionKind::Look,
            PlayerCommand::Inventory => ActionKind::Inventory,
            PlayerCommand::Broadcast => ActionKind::Broadcast,
            PlayerCommand::ConnectNbr => ActionKind::ConnectNbr,
            PlayerCommand::Fork => ActionKind::Fork,
            PlayerCommand::Eject => ActionKind::Eject,
            PlayerCommand::Take(_) => ActionKind::Take,
            PlayerCommand::Set(_) => ActionKind::Set,
            PlayerCommand::Incantation => ActionKind::Incantation,
        }
    }

    /// Parse one line of the player dialect. Only the first
    /// whitespace-delimited token selects the command; `Take` and `Set`
    /// consume a resource-name argument.
    pub fn parse(line: &str) -> Result<PlayerCommand, ProtocolError> {
        let mut parts = line.split_whitespace();
        let token = parts.next().unwrap_or("");

        let cmd = match token {
            "Forward" => PlayerCommand::Forward,
            "Right" => PlayerCommand::Right,
            "Left" => PlayerCommand::Left,
            "Look" => PlayerCommand::Look,
            "Inventory" => PlayerCommand::Inventory,
            "Broadcast" => PlayerCommand::Broadcast,
            "Connect_nbr" => PlayerCommand::ConnectNbr,
            "Fork" => PlayerCommand::Fork,
            "Eject" => PlayerCommand::Eject,
            "Take" => PlayerCommand::Take(parse_resource("Take", parts.next())?),
            "Set" => PlayerCommand::Set(parse_resource("Set", parts.next())?),
            "Incantation" => PlayerCommand::Incantation,
            other => return Err(ProtocolError::UnknownCommand(other.to_string())),
        };
        Ok(cmd)
    }
}

fn parse_resource(command: &'static str, arg: Option<&str>) -> Result<Resource, ProtocolError> {
    let arg = arg.ok_or(ProtocolError::MissingArgument(command))?;
    Resource::from_name(arg).ok_or_else(|| ProtocolError::BadArgument {
        command,
        argument: arg.to_string(),
    })
}
