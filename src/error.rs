//! Error types for yangfetch.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for yangfetch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// NETCONF framing/handshake/parsing errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Schema store write errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Transport layer errors (SSH connection, authentication, channel I/O).
///
/// Any transport failure is fatal to the session it belongs to. The core
/// never retries; reconnection policy lives with the caller.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged {
        host: String,
        port: u16,
        line: usize,
    },

    /// Host not present in known_hosts under strict verification
    #[error("Unknown host key for {host}:{port}")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts file could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// NETCONF protocol errors (framing, handshake, response parsing).
///
/// These are fatal to the session: a violated framing or parsing contract
/// leaves the stream position unknowable, so no further requests are issued.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The transport closed before the `]]>]]>` end-of-message marker
    #[error("Connection closed before end-of-message marker")]
    Incomplete,

    /// No complete message arrived within the read deadline
    #[error("No end-of-message marker within {0:?}")]
    Timeout(Duration),

    /// The device hello does not advertise ietf-netconf-monitoring
    #[error("Device does not advertise ietf-netconf-monitoring")]
    CapabilityMissing,

    /// A response was missing required structure
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },
}

impl ProtocolError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}

/// Schema store errors (writing fetched modules to disk).
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Output directory could not be created
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Module file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias using yangfetch's Error.
pub type Result<T> = std::result::Result<T, Error>;
