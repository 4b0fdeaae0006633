//! NETCONF session protocol.
//!
//! A [`Session`] owns one duplex byte stream to one device's `netconf`
//! subsystem and drives the fixed exchange this crate needs: capability
//! handshake, schema enumeration, schema fetch. The exchange is strictly
//! request-then-block-for-response — the stream is a single ordered duplex
//! channel and nothing here trusts message-ids for demultiplexing, so a new
//! request is never issued before the prior response is fully de-framed.

mod framing;
pub(crate) mod messages;

pub use framing::{FrameReader, FramingMode, MESSAGE_TERMINATOR};

use std::time::Duration;

use log::debug;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::time::timeout;

use crate::error::{ProtocolError, Result, TransportError};
use crate::extract;
use crate::schema::{SchemaContent, SchemaDescriptor};

/// One NETCONF session over one device channel.
///
/// Constructed by [`Session::open`], which performs the capability handshake;
/// a `Session` value therefore always represents a session whose hello
/// exchange is complete. The framing mode is decided during that handshake
/// and never changes.
///
/// Dropping the session closes the stream, which is the supported way to
/// abort: any peer left mid-write observes the close instead of blocking.
#[derive(Debug)]
pub struct Session<S> {
    reader: FrameReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    mode: FramingMode,
    peer: String,
    timeout: Duration,

    /// Requests issued so far, for log correlation.
    seq: u64,
}

impl<S: AsyncRead + AsyncWrite + Send + Unpin> Session<S> {
    /// Open a session: read the device hello, verify the monitoring
    /// capability, and answer with the client hello.
    ///
    /// Exactly one hello is read and one is sent, before anything else. If
    /// the device does not advertise `ietf-netconf-monitoring` this fails
    /// with [`ProtocolError::CapabilityMissing`] and no client hello is sent
    /// — without the monitoring capability, schema enumeration is impossible.
    pub async fn open(stream: S, peer: impl Into<String>, timeout: Duration) -> Result<Self> {
        let peer = peer.into();
        let (read_half, writer) = tokio::io::split(stream);
        let mut reader = FrameReader::new(read_half);

        debug!("[{peer}] reading device hello");
        let (hello, mode) = reader.read_initial(timeout).await?;

        if !extract::hello_has_monitoring(&hello)? {
            return Err(ProtocolError::CapabilityMissing.into());
        }
        debug!("[{peer}] device hello ok, {mode:?} framing");

        let mut session = Self {
            reader,
            writer,
            mode,
            peer,
            timeout,
            seq: 0,
        };
        session.send(messages::CLIENT_HELLO).await?;

        Ok(session)
    }

    /// The framing mode decided during the handshake.
    pub fn framing_mode(&self) -> FramingMode {
        self.mode
    }

    /// The device this session is connected to.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Enumerate the schemas the device advertises, filtered to YANG format,
    /// in device order.
    pub async fn list_schemas(&mut self) -> Result<Vec<SchemaDescriptor>> {
        let reply = self.rpc(messages::SCHEMA_LIST_RPC, "get netconf-state/schemas").await?;
        let schemas = extract::schema_list(&reply)?;

        debug!("[{}] device advertises {} yang schemas", self.peer, schemas.len());
        Ok(schemas)
    }

    /// Fetch the raw YANG text of one module.
    pub async fn fetch_schema(&mut self, identifier: &str, version: &str) -> Result<SchemaContent> {
        let request = messages::get_schema_rpc(identifier, version);
        let reply = self.rpc(&request, "get-schema").await?;
        let text = extract::schema_text(&reply)?;

        Ok(SchemaContent {
            identifier: identifier.to_string(),
            version: version.to_string(),
            text,
        })
    }

    /// Send one request and block for its complete response.
    async fn rpc(&mut self, body: &str, what: &str) -> Result<String> {
        self.seq += 1;
        debug!("[{}] rpc #{}: {what}", self.peer, self.seq);

        self.send(body).await?;
        self.reader.read_message(self.mode, self.timeout).await
    }

    /// Write a message body followed by the end-of-message marker on its own
    /// trailing line.
    async fn send(&mut self, body: &str) -> Result<()> {
        let deadline = self.timeout;
        let writer = &mut self.writer;
        let write = async move {
            writer.write_all(body.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.write_all(MESSAGE_TERMINATOR.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await
        };

        timeout(deadline, write)
            .await
            .map_err(|_| TransportError::Timeout(deadline))?
            .map_err(TransportError::Io)?;
        Ok(())
    }
}
