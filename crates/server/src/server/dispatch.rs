//! Command dispatch for both protocol dialects.
//!
//! Player-dialect lines pass through the cooldown gate before mutating
//! the world; observer-dialect lines read the world and reply with a
//! formatted snapshot. Every line resolves to a reply (or teardown);
//! nothing is queued for later.

use crate::entity::MAX_LEVEL;
use crate::scheduler;
use crate::server::game::Game;
use crate::server::session::{Session, SessionState};
use protocol::commands::observer::{
    bct_line, msz_line, pin_line, plv_line, ppo_line, sgt_line, tna_line,
};
use protocol::commands::{ObserverCommand, PlayerCommand};
use protocol::{
    OBSERVER_KEYWORD, ProtocolError, REPLY_ALREADY_JOINED, REPLY_BAD_PARAMETER, REPLY_KO,
    REPLY_OK, REPLY_UNKNOWN,
};
use std::time::Instant;
use tracing::{debug, warn};

/// What the connection loop should do after one dispatched line.
#[derive(Debug, PartialEq, Eq)]
pub enum LineOutcome {
    /// Queue these reply lines and keep the connection open.
    Replies(Vec<String>),
    /// Tear the connection down.
    Disconnect,
}

fn reply(line: impl Into<String>) -> LineOutcome {
    LineOutcome::Replies(vec![line.into()])
}

/// Route one complete line according to the session's join state.
pub async fn handle_line(game: &Game, session: &mut Session, line: &str) -> LineOutcome {
    let line = line.trim();
    if line == "exit" {
        return LineOutcome::Disconnect;
    }

    match session.state {
        SessionState::AwaitingTeam => handle_join(game, session, line).await,
        SessionState::Player(id) => handle_player_command(game, session, id, line).await,
        SessionState::Observer => handle_observer_command(game, line).await,
    }
}

/// First line of a fresh session: a team name, or the observer
/// registration keyword (never capacity-gated).
async fn handle_join(game: &Game, session: &mut Session, line: &str) -> LineOutcome {
    if line == OBSERVER_KEYWORD {
        session.state = SessionState::Observer;
        debug!("{} registered as observer", session.addr);

        // Observers start from a snapshot: map size, frequency, teams.
        let directory = game.directory.read().await;
        let world = game.world.read().await;
        let mut replies = vec![
            msz_line(world.map().width(), world.map().height()),
            sgt_line(game.frequency()),
        ];
        replies.extend(directory.teams().iter().map(|t| tna_line(&t.name)));
        return LineOutcome::Replies(replies);
    }

    let mut directory = game.directory.write().await;
    let mut world = game.world.write().await;

    // Capacity is pre-checked so a refused join never consumes an egg.
    match directory.team(line) {
        None => {
            debug!("{} asked to join unknown team {line:?}", session.addr);
            return reply(REPLY_KO);
        }
        Some(team) if team.is_full() => {
            debug!("{} refused: team {line} is full", session.addr);
            return reply(REPLY_KO);
        }
        Some(_) => {}
    }

    let (x, y) = match world.pop_egg() {
        Some(egg) => (egg.x, egg.y),
        None => world.map().random_coords(),
    };

    match directory.join(line, x, y) {
        Ok(info) => {
            session.state = SessionState::Player(info.player_id);
            LineOutcome::Replies(vec![
                info.remaining_slots.to_string(),
                format!("{} {}", world.map().width(), world.map().height()),
            ])
        }
        Err(err) => {
            warn!("join failed after capacity check: {err}");
            reply(REPLY_KO)
        }
    }
}

/// A player-dialect line: cooldown gate first, then the world effect.
async fn handle_player_command(
    game: &Game,
    session: &mut Session,
    player_id: u32,
    line: &str,
) -> LineOutcome {
    let cmd = match PlayerCommand::parse(line) {
        Ok(cmd) => cmd,
        Err(err) => {
            // A second join attempt on a bound session gets an explicit
            // answer instead of the generic sentinel.
            if line == OBSERVER_KEYWORD || game.directory.read().await.team(line).is_some() {
                return reply(REPLY_ALREADY_JOINED);
            }
            debug!("{}: {err}", session.addr);
            return reply(REPLY_KO);
        }
    };

    let (width, height) = (game.config.width, game.config.height);
    let frequency = game.frequency();
    let mut directory = game.directory.write().await;

    // Gate check; on refusal the player is left entirely unchanged.
    let (x, y, facing) = match directory.player_mut(player_id) {
        Some(player) => {
            if !scheduler::try_fire(&mut player.cooldowns, cmd.kind(), frequency, Instant::now()) {
                return reply(REPLY_KO);
            }
            if !matches!(cmd, PlayerCommand::Incantation) {
                player.praying = false;
            }
            (player.x, player.y, player.orientation)
        }
        None => {
            warn!("session {} bound to missing player #{player_id}", session.addr);
            return reply(REPLY_KO);
        }
    };

    match cmd {
        PlayerCommand::Forward => {
            if let Some(player) = directory.player_mut(player_id) {
                player.step_forward(width, height);
            }
        }
        PlayerCommand::Right => {
            if let Some(player) = directory.player_mut(player_id) {
                player.orientation = player.orientation.turn_right();
            }
        }
        PlayerCommand::Left => {
            if let Some(player) = directory.player_mut(player_id) {
                player.orientation = player.orientation.turn_left();
            }
        }
        PlayerCommand::Take(kind) => {
            let mut world = game.world.write().await;
            let taken = world.map_mut().tile_mut(x, y).remove(kind, 1);
            if let Some(player) = directory.player_mut(player_id) {
                player.gain(kind, taken);
            }
        }
        PlayerCommand::Set(kind) => {
            let dropped = directory
                .player_mut(player_id)
                .map(|p| p.spend(kind, 1))
                .unwrap_or(0);
            let mut world = game.world.write().await;
            world.map_mut().tile_mut(x, y).add(kind, dropped);
        }
        PlayerCommand::Fork => {
            let mut world = game.world.write().await;
            let egg_id = world.lay_egg(player_id as i64, x, y);
            debug!("player #{player_id} laid egg #{egg_id} at ({x}, {y})");
        }
        PlayerCommand::Eject => {
            for other in directory.players_at(x, y) {
                if other == player_id {
                    continue;
                }
                if let Some(victim) = directory.player_mut(other) {
                    victim.step(facing, width, height);
                }
            }
            let mut world = game.world.write().await;
            let crushed = world.remove_eggs_at(x, y);
            if crushed > 0 {
                debug!("player #{player_id} crushed {crushed} eggs at ({x}, {y})");
            }
        }
        PlayerCommand::Incantation => {
            // Ritual internals (participants, stones) live outside this
            // core; the scheduler and level effect are modeled here.
            if let Some(player) = directory.player_mut(player_id) {
                player.level = (player.level + 1).min(MAX_LEVEL);
                player.praying = true;
            }
        }
        // Pass-through stubs: payload replies are a future extension.
        PlayerCommand::Look
        | PlayerCommand::Inventory
        | PlayerCommand::Broadcast
        | PlayerCommand::ConnectNbr => {}
    }

    reply(REPLY_OK)
}

/// An observer-dialect line: read-only world queries plus `sst`.
async fn handle_observer_command(game: &Game, line: &str) -> LineOutcome {
    let cmd = match ObserverCommand::parse(line) {
        Ok(cmd) => cmd,
        Err(ProtocolError::UnknownCommand(_)) => return reply(REPLY_UNKNOWN),
        Err(err) => {
            debug!("observer: {err}");
            return reply(REPLY_BAD_PARAMETER);
        }
    };

    match cmd {
        ObserverCommand::MapSize => {
            let world = game.world.read().await;
            reply(msz_line(world.map().width(), world.map().height()))
        }
        ObserverCommand::TileContent { x, y } => {
            let world = game.world.read().await;
            if !world.map().in_bounds(x, y) {
                return reply(REPLY_KO);
            }
            let (x, y) = (x as u32, y as u32);
            reply(bct_line(x, y, world.map().tile(x, y).counts()))
        }
        ObserverCommand::MapContent => {
            let world = game.world.read().await;
            LineOutcome::Replies(
                world
                    .map()
                    .iter_tiles()
                    .map(|(x, y, tile)| bct_line(x, y, tile.counts()))
                    .collect(),
            )
        }
        ObserverCommand::TeamNames => {
            let directory = game.directory.read().await;
            LineOutcome::Replies(
                directory
                    .teams()
                    .iter()
                    .map(|t| tna_line(&t.name))
                    .collect(),
            )
        }
        ObserverCommand::PlayerPosition(id) => {
            with_player(game, id, |p| ppo_line(p.id, p.x, p.y, p.orientation)).await
        }
        ObserverCommand::PlayerLevel(id) => {
            with_player(game, id, |p| plv_line(p.id, p.level)).await
        }
        ObserverCommand::PlayerInventory(id) => {
            with_player(game, id, |p| pin_line(p.id, p.x, p.y, &p.inventory)).await
        }
        ObserverCommand::TimeUnitGet => reply(sgt_line(game.frequency())),
        ObserverCommand::TimeUnitSet(frequency) => {
            game.set_frequency(frequency);
            reply(sgt_line(frequency))
        }
    }
}

/// Look a player up for an observer query; an unknown id is logged and
/// answered `ko` without disturbing any other connection.
async fn with_player(
    game: &Game,
    id: u32,
    format: impl FnOnce(&crate::entity::Player) -> String,
) -> LineOutcome {
    let directory = game.directory.read().await;
    match directory.player(id) {
        Some(player) => reply(format(player)),
        None => {
            debug!("observer queried unknown player #{id}");
            reply(REPLY_KO)
        }
    }
}
