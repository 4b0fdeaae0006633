//! Per-device fetch runs and the multi-device supervisor.
//!
//! One device maps to one independent session run end-to-end: connect,
//! handshake, enumerate, then fetch and persist each module in device order.
//! Across devices the supervisor fans out one task each; devices share
//! nothing, so a failed handshake on one host yields an error entry for that
//! host and zero schemas, without touching the others.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinSet;

use crate::error::Result;
use crate::session::Session;
use crate::store::SchemaStore;
use crate::transport::{SshConfig, SshTransport};

/// Statistics for one device's completed run.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Device the run was against.
    pub host: String,

    /// Number of YANG modules fetched and written.
    pub modules: usize,

    /// Total bytes of module text written.
    pub total_bytes: usize,

    /// Largest module: `identifier@version` and size.
    pub largest: Option<(String, usize)>,

    /// Smallest module: `identifier@version` and size.
    pub smallest: Option<(String, usize)>,

    /// Wall-clock time spent fetching (excludes connect and handshake).
    pub elapsed: Duration,
}

impl FetchReport {
    fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            modules: 0,
            total_bytes: 0,
            largest: None,
            smallest: None,
            elapsed: Duration::ZERO,
        }
    }

    fn record(&mut self, name: &str, size: usize) {
        self.modules += 1;
        self.total_bytes += size;

        if self.largest.as_ref().is_none_or(|(_, s)| size > *s) {
            self.largest = Some((name.to_string(), size));
        }
        if self.smallest.as_ref().is_none_or(|(_, s)| size < *s) {
            self.smallest = Some((name.to_string(), size));
        }
    }
}

impl std::fmt::Display for FetchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "({}) YANG Modules: {}", self.host, self.modules)?;
        if let Some((name, size)) = &self.largest {
            writeln!(f, "({}) YANG Largest: {name} ({size} bytes)", self.host)?;
        }
        if let Some((name, size)) = &self.smallest {
            writeln!(f, "({}) YANG Smallest: {name} ({size} bytes)", self.host)?;
        }
        writeln!(f, "({}) Total YANG size: {} bytes", self.host, self.total_bytes)?;
        write!(f, "({}) Duration: {:.2} seconds", self.host, self.elapsed.as_secs_f64())
    }
}

/// Outcome of one device in a multi-device run.
#[derive(Debug)]
pub struct DeviceResult {
    pub host: String,
    pub result: Result<FetchReport>,
}

/// Drive one ready session to completion: enumerate, then fetch and persist
/// every advertised YANG module in device order.
///
/// Fetches are strictly sequential within the session; the transport is a
/// single ordered stream and the next request must wait for the prior
/// response to be fully de-framed.
pub async fn run_session<S, St>(
    session: &mut Session<S>,
    store: &St,
) -> Result<FetchReport>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
    St: SchemaStore,
{
    let host = session.peer().to_string();
    let mut report = FetchReport::new(&host);
    let start = Instant::now();

    let schemas = session.list_schemas().await?;
    for descriptor in &schemas {
        let content = session
            .fetch_schema(&descriptor.identifier, &descriptor.version)
            .await?;
        store.write(&host, &content).await?;
        report.record(&descriptor.name(), content.len());
    }

    report.elapsed = start.elapsed();
    info!(
        "({host}) fetched {} modules, {} bytes, in {:?}",
        report.modules, report.total_bytes, report.elapsed
    );
    Ok(report)
}

/// Fetch all YANG modules from one device.
pub async fn fetch_device<St: SchemaStore>(config: SshConfig, store: &St) -> Result<FetchReport> {
    let transport = SshTransport::connect(config).await?;
    let mut session = transport.open_session().await?;

    let report = run_session(&mut session, store).await?;

    drop(session);
    transport.close().await?;
    Ok(report)
}

/// Fetch from every device concurrently, one independent session per host.
///
/// Results arrive in completion order. A failing device is reported in its
/// `DeviceResult` and never aborts the others.
pub async fn fetch_all<St>(configs: Vec<SshConfig>, store: Arc<St>) -> Vec<DeviceResult>
where
    St: SchemaStore + 'static,
{
    let mut tasks = JoinSet::new();
    for config in configs {
        let store = store.clone();
        tasks.spawn(async move {
            let host = config.host.clone();
            let result = fetch_device(config, store.as_ref()).await;
            if let Err(ref e) = result {
                warn!("({host}) fetch failed: {e}");
            }
            DeviceResult { host, result }
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            // A panicked task loses its host attribution; log and move on.
            Err(e) => warn!("device task failed to join: {e}"),
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DirStore;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!(
            "yangfetch-fetch-test-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ))
    }

    /// Minimal scripted device: serves a hello, a one-entry schema list, and
    /// one schema body whose text embeds the device name.
    async fn scripted_device(mut stream: DuplexStream, name: &str) {
        let hello = "<hello xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\n\
            <capabilities>\n\
            <capability>urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring</capability>\n\
            </capabilities>\n</hello>\n]]>]]>\n";
        let list_reply = "<rpc-reply xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\n\
            <data><netconf-state xmlns=\"urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring\">\n\
            <schemas><schema>\n\
            <identifier>ietf-yang-types</identifier><version>2013-07-15</version><format>yang</format>\n\
            </schema></schemas></netconf-state></data></rpc-reply>\n]]>]]>\n";
        let schema_reply = format!(
            "<rpc-reply xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\n\
            <data xmlns=\"urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring\">\n\
            module ietf-yang-types {{ /* from {name} */ }}\n\
            </data></rpc-reply>\n]]>]]>\n"
        );

        stream.write_all(hello.as_bytes()).await.unwrap();
        read_frame(&mut stream).await; // client hello
        read_frame(&mut stream).await; // schema list request
        stream.write_all(list_reply.as_bytes()).await.unwrap();
        read_frame(&mut stream).await; // get-schema request
        stream.write_all(schema_reply.as_bytes()).await.unwrap();
    }

    /// Reads byte-by-byte so bytes past this frame's marker stay in the
    /// stream for the next call instead of being swallowed here.
    async fn read_frame(stream: &mut DuplexStream) {
        let mut data = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            let n = stream.read(&mut byte).await.unwrap();
            assert!(n > 0);
            data.push(byte[0]);
            if data.ends_with(b"]]>]]>") {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_run_session_fetches_and_persists() {
        let root = scratch_dir();
        let store = DirStore::new(&root);
        let (client, device) = tokio::io::duplex(64 * 1024);

        let device_task = tokio::spawn(scripted_device(device, "lab1"));

        let mut session = Session::open(client, "lab1", Duration::from_secs(5))
            .await
            .unwrap();
        let report = run_session(&mut session, &store).await.unwrap();

        assert_eq!(report.modules, 1);
        assert_eq!(
            report.largest.as_ref().unwrap().0,
            "ietf-yang-types@2013-07-15"
        );
        assert_eq!(report.largest, report.smallest);

        let written = root.join("lab1").join("ietf-yang-types@2013-07-15.yang");
        let text = tokio::fs::read_to_string(&written).await.unwrap();
        assert_eq!(text, "module ietf-yang-types { /* from lab1 */ }");
        assert_eq!(report.total_bytes, text.len());

        device_task.await.unwrap();
        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_devices_write_disjoint_sets() {
        let root = scratch_dir();
        let store = Arc::new(DirStore::new(&root));

        let mut tasks = JoinSet::new();
        for name in ["router1", "router2"] {
            let store = store.clone();
            let (client, device) = tokio::io::duplex(64 * 1024);
            tokio::spawn(scripted_device(device, name));
            tasks.spawn(async move {
                let mut session = Session::open(client, name, Duration::from_secs(5))
                    .await
                    .unwrap();
                run_session(&mut session, store.as_ref()).await.unwrap()
            });
        }

        let mut hosts = Vec::new();
        while let Some(report) = tasks.join_next().await {
            let report = report.unwrap();
            assert_eq!(report.modules, 1);
            hosts.push(report.host);
        }
        hosts.sort();
        assert_eq!(hosts, ["router1", "router2"]);

        for name in ["router1", "router2"] {
            let path = root.join(name).join("ietf-yang-types@2013-07-15.yang");
            let text = tokio::fs::read_to_string(&path).await.unwrap();
            assert_eq!(text, format!("module ietf-yang-types {{ /* from {name} */ }}"));
        }

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[test]
    fn test_report_records_extremes() {
        let mut report = FetchReport::new("r1");
        report.record("a@1", 10);
        report.record("b@1", 3);
        report.record("c@1", 20);

        assert_eq!(report.modules, 3);
        assert_eq!(report.total_bytes, 33);
        assert_eq!(report.largest, Some(("c@1".into(), 20)));
        assert_eq!(report.smallest, Some(("b@1".into(), 3)));
    }
}
