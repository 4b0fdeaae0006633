//! Persisting fetched YANG modules.

use std::future::Future;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{PersistenceError, Result};
use crate::schema::SchemaContent;

/// Destination for fetched schema modules.
///
/// One file per schema, grouped per device. Implementations must tolerate
/// concurrent writers for *different* hosts without coordination; the fetch
/// supervisor runs one writer per device and their file sets are disjoint.
pub trait SchemaStore: Send + Sync {
    /// Persist one module for `host`, returning the path written.
    fn write(
        &self,
        host: &str,
        schema: &SchemaContent,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// Directory-backed store: `{root}/{host}/{identifier}@{version}.yang`.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output root this store writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SchemaStore for DirStore {
    async fn write(&self, host: &str, schema: &SchemaContent) -> Result<PathBuf> {
        let dir = self.root.join(host);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| PersistenceError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let path = dir.join(schema.file_name());
        debug!("writing {} ({} bytes)", path.display(), schema.len());

        tokio::fs::write(&path, &schema.text)
            .await
            .map_err(|source| PersistenceError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}
