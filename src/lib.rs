//! # Yangfetch
//!
//! Async NETCONF client that downloads YANG schema modules from network
//! devices over the SSH `netconf` subsystem.
//!
//! A session performs the NETCONF capability handshake, enumerates the
//! schemas the device advertises through ietf-netconf-monitoring, fetches the
//! raw YANG text of each module with `get-schema`, and persists one file per
//! module as `{identifier}@{version}.yang` under a per-device directory.
//!
//! ## Features
//!
//! - Async SSH connections via russh
//! - NETCONF 1.0 `]]>]]>` framing with automatic byte-wise/line-wise mode
//!   detection for devices with differing channel buffering
//! - Namespace-aware XML extraction of schema lists and module bodies
//! - Concurrent multi-device runs, one independent session per host
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use yangfetch::{AuthMethod, DirStore, SshConfig, fetch_all};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut config = SshConfig::new("192.168.1.1", "admin");
//!     config.auth = AuthMethod::Password("secret".into());
//!
//!     let store = Arc::new(DirStore::new("./yang"));
//!     for outcome in fetch_all(vec![config], store).await {
//!         match outcome.result {
//!             Ok(report) => println!("{report}"),
//!             Err(e) => eprintln!("{}: {e}", outcome.host),
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod extract;
pub mod fetch;
pub mod schema;
pub mod session;
pub mod store;
pub mod transport;

// Re-export main types for convenience
pub use error::{Error, PersistenceError, ProtocolError, TransportError};
pub use fetch::{DeviceResult, FetchReport, fetch_all, fetch_device, run_session};
pub use schema::{SchemaContent, SchemaDescriptor};
pub use session::{FramingMode, Session};
pub use store::{DirStore, SchemaStore};
pub use transport::{AuthMethod, HostKeyVerification, SshConfig, SshTransport};
