//! history.rs — append-only log of fetched observations.
//!
//! Writes are best-effort: the pipeline logs a failed append and moves on.
//! Duplicate rows (e.g. two concurrent cache misses) are tolerated.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::PersistError;
use crate::weather::Observation;

pub const DEFAULT_HISTORY_CAP: usize = 2000;

#[async_trait::async_trait]
pub trait HistorySink: Send + Sync {
    async fn append(&self, obs: &Observation) -> Result<(), PersistError>;
}

/// Bounded in-memory history; oldest rows are dropped past `cap`.
#[derive(Debug)]
pub struct MemoryHistory {
    inner: Mutex<Vec<Observation>>,
    cap: usize,
}

impl MemoryHistory {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(10_000))),
            cap: cap.min(10_000),
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<Observation> {
        let v = self.inner.lock();
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAP)
    }
}

#[async_trait::async_trait]
impl HistorySink for MemoryHistory {
    async fn append(&self, obs: &Observation) -> Result<(), PersistError> {
        let mut v = self.inner.lock();
        v.push(obs.clone());
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
        Ok(())
    }
}

/// One JSON object per line, appended to a file.
#[derive(Debug, Clone)]
pub struct JsonlHistory {
    path: PathBuf,
}

impl JsonlHistory {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl HistorySink for JsonlHistory {
    async fn append(&self, obs: &Observation) -> Result<(), PersistError> {
        let mut line = serde_json::to_vec(obs)?;
        line.push(b'\n');

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let mut f = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        f.write_all(&line).await?;
        f.flush().await?;
        Ok(())
    }
}
