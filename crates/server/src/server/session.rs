//! Per-connection session state.

use std::net::SocketAddr;

/// Largest buffered input without a newline before the connection is
/// considered hostile and torn down.
pub const MAX_INBOUND_BUFFER: usize = 8 * 1024;

/// Join state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Connected, greeting sent, first line not yet received.
    #[default]
    AwaitingTeam,
    /// Bound 1:1 to a live player.
    Player(u32),
    /// Registered read-only observer.
    Observer,
}

/// A connected client session. Created on accept, destroyed on
/// disconnect; the bound player (if any) is removed with it.
#[derive(Debug)]
pub struct Session {
    pub addr: SocketAddr,
    pub state: SessionState,
    /// Bytes received but not yet terminated by a newline.
    inbound: Vec<u8>,
    /// Bytes queued for sending.
    pub outbound: Vec<u8>,
    /// Marked for teardown on the next cycle.
    pub closing: bool,
}

impl Session {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            state: SessionState::default(),
            inbound: Vec::new(),
            outbound: Vec::new(),
            closing: false,
        }
    }

    /// Queue one newline-terminated reply line.
    pub fn push_line(&mut self, line: &str) {
        self.outbound.extend_from_slice(line.as_bytes());
        self.outbound.push(b'\n');
    }

    /// Append raw bytes read from the socket.
    pub fn ingest(&mut self, bytes: &[u8]) {
        self.inbound.extend_from_slice(bytes);
    }

    /// Whether the unterminated inbound buffer has grown past bounds.
    pub fn inbound_overflow(&self) -> bool {
        self.inbound.len() > MAX_INBOUND_BUFFER
    }

    /// Drain every complete line from the inbound buffer. Partial lines
    /// stay buffered across reads; a trailing carriage return is
    /// stripped.
    pub fn take_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(pos) = self.inbound.iter().position(|&b| b == b'\n') {
            let mut raw: Vec<u8> = self.inbound.drain(..=pos).collect();
            raw.pop(); // newline
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            lines.push(String::from_utf8_lossy(&raw).into_owned());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("127.0.0.1:4242".parse().unwrap())
    }

    #[test]
    fn test_partial_lines_buffer_across_reads() {
        let mut s = session();
        s.ingest(b"For");
        assert!(s.take_lines().is_empty());

        s.ingest(b"ward\nRight\nLe");
        assert_eq!(s.take_lines(), vec!["Forward", "Right"]);

        s.ingest(b"ft\n");
        assert_eq!(s.take_lines(), vec!["Left"]);
    }

    #[test]
    fn test_carriage_return_stripped() {
        let mut s = session();
        s.ingest(b"msz\r\n");
        assert_eq!(s.take_lines(), vec!["msz"]);
    }

    #[test]
    fn test_push_line_terminates() {
        let mut s = session();
        s.push_line("ok");
        s.push_line("ko");
        assert_eq!(s.outbound, b"ok\nko\n");
    }

    #[test]
    fn test_overflow_detection() {
        let mut s = session();
        s.ingest(&[b'a'; MAX_INBOUND_BUFFER + 1]);
        assert!(s.inbound_overflow());
    }
}
