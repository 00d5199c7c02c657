//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while parsing a command line.
///
/// Lookup is total: an unrecognized token or a malformed argument is an
/// explicit variant, never a panic, so every line resolves to either a
/// command or the dialect-appropriate sentinel reply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing argument for {0}")]
    MissingArgument(&'static str),

    #[error("bad argument for {command}: {argument}")]
    BadArgument {
        command: &'static str,
        argument: String,
    },
}
