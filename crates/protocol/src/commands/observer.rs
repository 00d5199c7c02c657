//! Observer-dialect commands and reply-line builders.
//!
//! Observers are read-only clients watching the world. Every command
//! produces exactly one reply line, except `mct` which produces one
//! `bct`-formatted line per tile in row-major order.

use crate::{Orientation, ProtocolError, Resource};

/// A parsed observer-dialect command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverCommand {
    /// `msz` - map size.
    MapSize,
    /// `bct X Y` - content of one tile. Coordinates are kept signed so
    /// an out-of-range query can be answered `ko` rather than `sbp`.
    TileContent { x: i64, y: i64 },
    /// `mct` - content of every tile.
    MapContent,
    /// `tna` - team names.
    TeamNames,
    /// `ppo #n` - player position and orientation.
    PlayerPosition(u32),
    /// `plv #n` - player level.
    PlayerLevel(u32),
    /// `pin #n` - player inventory.
    PlayerInventory(u32),
    /// `sgt` - current frequency.
    TimeUnitGet,
    /// `sst F` - set frequency.
    TimeUnitSet(u32),
}

impl ObserverCommand {
    /// Parse one line of the observer dialect. The line splits on the
    /// first space; everything after is the raw argument string.
    pub fn parse(line: &str) -> Result<ObserverCommand, ProtocolError> {
        let (token, args) = match line.split_once(' ') {
            Some((t, a)) => (t, a.trim()),
            None => (line.trim(), ""),
        };

        let cmd = match token {
            "msz" => ObserverCommand::MapSize,
            "bct" => {
                let (x, y) = parse_coords("bct", args)?;
                ObserverCommand::TileContent { x, y }
            }
            "mct" => ObserverCommand::MapContent,
            "tna" => ObserverCommand::TeamNames,
            "ppo" => ObserverCommand::PlayerPosition(parse_player_id("ppo", args)?),
            "plv" => ObserverCommand::PlayerLevel(parse_player_id("plv", args)?),
            "pin" => ObserverCommand::PlayerInventory(parse_player_id("pin", args)?),
            "sgt" => ObserverCommand::TimeUnitGet,
            "sst" => {
                let freq: u32 = args.parse().map_err(|_| ProtocolError::BadArgument {
                    command: "sst",
                    argument: args.to_string(),
                })?;
                // Frequency zero would make every cooldown infinite.
                if freq == 0 {
                    return Err(ProtocolError::BadArgument {
                        command: "sst",
                        argument: args.to_string(),
                    });
                }
                ObserverCommand::TimeUnitSet(freq)
            }
            other => return Err(ProtocolError::UnknownCommand(other.to_string())),
        };
        Ok(cmd)
    }
}

fn parse_coords(command: &'static str, args: &str) -> Result<(i64, i64), ProtocolError> {
    let mut parts = args.split_whitespace();
    let x = parts
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ProtocolError::BadArgument {
            command,
            argument: args.to_string(),
        })?;
    let y = parts
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ProtocolError::BadArgument {
            command,
            argument: args.to_string(),
        })?;
    Ok((x, y))
}

/// Player ids appear on the wire as `#n`; a bare `n` is accepted too.
fn parse_player_id(command: &'static str, args: &str) -> Result<u32, ProtocolError> {
    let raw = args.split_whitespace().next().unwrap_or("");
    raw.strip_prefix('#')
        .unwrap_or(raw)
        .parse()
        .map_err(|_| ProtocolError::BadArgument {
            command,
            argument: args.to_string(),
        })
}

/// `msz W H`
pub fn msz_line(width: u32, height: u32) -> String {
    format!("msz {width} {height}")
}

/// `bct X Y r0 r1 r2 r3 r4 r5 r6`
pub fn bct_line(x: u32, y: u32, counts: &[u32; Resource::COUNT]) -> String {
    let mut line = format!("bct {x} {y}");
    for count in counts {
        line.push(' ');
        line.push_str(&count.to_string());
    }
    line
}

/// `tna <name>`
pub fn tna_line(name: &str) -> String {
    format!("tna {name}")
}

/// `ppo #n x y o`
pub fn ppo_line(id: u32, x: u32, y: u32, orientation: Orientation) -> String {
    format!("ppo #{id} {x} {y} {}", orientation.as_char())
}

/// `plv #n L`
pub fn plv_line(id: u32, level: u32) -> String {
    format!("plv #{id} {level}")
}

/// `pin #n x y r0 r1 r2 r3 r4 r5 r6`
pub fn pin_line(id: u32, x: u32, y: u32, counts: &[u32; Resource::COUNT]) -> String {
    let mut line = format!("pin #{id} {x} {y}");
    for count in counts {
        line.push(' ');
        line.push_str(&count.to_string());
    }
    line
}

/// `sgt F`
pub fn sgt_line(frequency: u32) -> String {
    format!("sgt {frequency}")
}
