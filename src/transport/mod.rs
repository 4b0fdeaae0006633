//! SSH transport layer wrapping russh.
//!
//! Connection setup, authentication, and the `netconf` subsystem channel.
//! The session layer only ever sees the resulting duplex byte stream.

pub mod config;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
