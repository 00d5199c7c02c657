//! Connection handling.
//!
//! One task owns the whole connection set. Each cycle it drains pending
//! accepts without blocking, scans every open socket for readable
//! bytes, dispatches complete lines, flushes outbound replies, and
//! sleeps a bounded interval when idle so the shutdown token is always
//! observed promptly. No per-connection task is spawned.

use crate::config::Config;
use crate::shutdown::Shutdown;
use futures_util::FutureExt;
use std::io;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub mod dispatch;
pub mod game;
pub mod session;

pub use game::{Game, run_simulation_loop};

use dispatch::{LineOutcome, handle_line};
use game::SHUTDOWN_POLL;
use session::{Session, SessionState};

/// One open socket with its session state.
struct Connection {
    stream: TcpStream,
    session: Session,
}

/// Run the game server until the shutdown token is triggered.
pub async fn run(config: Config, shutdown: Shutdown) -> anyhow::Result<()> {
    config.validate()?;

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");

    let game = Arc::new(Game::new(config));

    let simulation = tokio::spawn(run_simulation_loop(
        Arc::clone(&game),
        shutdown.clone(),
    ));

    connection_loop(listener, Arc::clone(&game), shutdown).await;

    simulation.await?;
    info!("server stopped");
    Ok(())
}

/// The single loop multiplexing the listener and every open connection.
async fn connection_loop(listener: TcpListener, game: Arc<Game>, shutdown: Shutdown) {
    let mut connections: Vec<Connection> = Vec::new();
    let mut buf = [0u8; 1024];

    loop {
        if shutdown.is_triggered() {
            info!("connection loop stopping ({} open)", connections.len());
            break;
        }

        let mut progressed = false;

        // Drain pending accepts without blocking the scan.
        while let Some(accepted) = listener.accept().now_or_never() {
            match accepted {
                Ok((stream, addr)) => {
                    info!("new connection from {addr}");
                    let mut session = Session::new(addr);
                    session.push_line(protocol::GREETING);
                    connections.push(Connection { stream, session });
                    progressed = true;
                }
                Err(e) => {
                    warn!("accept failed: {e}");
                    break;
                }
            }
        }

        for conn in connections.iter_mut() {
            if read_available(conn, &mut buf) {
                progressed = true;
            }
            if conn.session.closing {
                continue;
            }

            for line in conn.session.take_lines() {
                progressed = true;
                match handle_line(&game, &mut conn.session, &line).await {
                    LineOutcome::Replies(replies) => {
                        for reply in replies {
                            conn.session.push_line(&reply);
                        }
                    }
                    LineOutcome::Disconnect => {
                        debug!("{} requested disconnect", conn.session.addr);
                        conn.session.closing = true;
                        break;
                    }
                }
            }

            flush_outbound(conn);
        }

        // Tear down closed connections: session destroyed, bound player
        // removed from its team, socket dropped.
        let mut i = 0;
        while i < connections.len() {
            if connections[i].session.closing {
                let conn = connections.swap_remove(i);
                if let SessionState::Player(id) = conn.session.state {
                    game.directory.write().await.remove_player(id);
                }
                info!("connection closed: {}", conn.session.addr);
            } else {
                i += 1;
            }
        }

        if !progressed {
            sleep(SHUTDOWN_POLL).await;
        }
    }
}

/// Pull whatever bytes the socket has ready. Returns true when any
/// bytes arrived; marks the connection closing on EOF or a hard error.
fn read_available(conn: &mut Connection, buf: &mut [u8]) -> bool {
    let mut got_bytes = false;
    loop {
        match conn.stream.try_read(buf) {
            Ok(0) => {
                debug!("{} closed by peer", conn.session.addr);
                conn.session.closing = true;
                break;
            }
            Ok(n) => {
                conn.session.ingest(&buf[..n]);
                got_bytes = true;
                if conn.session.inbound_overflow() {
                    warn!("{} exceeded input buffer, dropping", conn.session.addr);
                    conn.session.closing = true;
                    break;
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) => {
                warn!("read error from {}: {e}", conn.session.addr);
                conn.session.closing = true;
                break;
            }
        }
    }
    got_bytes
}

/// Write as much of the outbound queue as the socket accepts. A send
/// failure tears down only this connection.
fn flush_outbound(conn: &mut Connection) {
    while !conn.session.outbound.is_empty() {
        match conn.stream.try_write(&conn.session.outbound) {
            Ok(0) => {
                conn.session.closing = true;
                break;
            }
            Ok(n) => {
                conn.session.outbound.drain(..n);
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) => {
                warn!("write error to {}: {e}", conn.session.addr);
                conn.session.closing = true;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn test_config(port: u16) -> Config {
        Config {
            port,
            bind: "127.0.0.1".to_string(),
            width: 10,
            height: 10,
            teams: vec!["A".to_string()],
            capacity: 2,
            frequency: 100,
        }
    }

    async fn read_line(reader: &mut BufReader<TcpStream>) -> String {
        let mut line = String::new();
        tokio::time::timeout(Duration::from_secs(2), reader.read_line(&mut line))
            .await
            .expect("reply within deadline")
            .expect("readable stream");
        line.trim_end().to_string()
    }

    #[tokio::test]
    async fn test_greeting_join_and_command_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let game = Arc::new(Game::new(test_config(addr.port())));
        let shutdown = Shutdown::new();
        let loop_handle = tokio::spawn(connection_loop(
            listener,
            Arc::clone(&game),
            shutdown.clone(),
        ));

        let stream = TcpStream::connect(addr).await.unwrap();
        let mut reader = BufReader::new(stream);
        assert_eq!(read_line(&mut reader).await, protocol::GREETING);

        reader.get_mut().write_all(b"A\n").await.unwrap();
        assert_eq!(read_line(&mut reader).await, "1");
        assert_eq!(read_line(&mut reader).await, "10 10");

        reader.get_mut().write_all(b"Forward\n").await.unwrap();
        assert_eq!(read_line(&mut reader).await, "ok");

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), loop_handle)
            .await
            .expect("loop exits after shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_frees_team_slot() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let game = Arc::new(Game::new(test_config(addr.port())));
        let shutdown = Shutdown::new();
        let loop_handle = tokio::spawn(connection_loop(
            listener,
            Arc::clone(&game),
            shutdown.clone(),
        ));

        let stream = TcpStream::connect(addr).await.unwrap();
        let mut reader = BufReader::new(stream);
        read_line(&mut reader).await; // greeting
        reader.get_mut().write_all(b"A\n").await.unwrap();
        read_line(&mut reader).await; // remaining slots
        read_line(&mut reader).await; // dimensions

        drop(reader);

        // Give the loop a few cycles to observe the EOF.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let free = game
                .directory
                .read()
                .await
                .team("A")
                .unwrap()
                .remaining_slots();
            if free == 2 {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "player slot was not released"
            );
            sleep(Duration::from_millis(10)).await;
        }

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), loop_handle)
            .await
            .expect("loop exits after shutdown")
            .unwrap();
    }
}
