//! Trace recorder implementations

use crate::error::{LabError, LabResult};
use crate::trace::entry::TraceEntry;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only sink for trace entries.
///
/// The runner awaits every `record` call so tests see deterministic ordering,
/// but recorder failures are downgraded to warnings: losing a trace line must
/// never fail an experiment.
#[async_trait]
pub trait TraceRecorder: Send + Sync {
    /// Append one entry
    async fn record(&self, entry: TraceEntry) -> LabResult<()>;
}

/// JSONL file recorder: one JSON object per line, appended in arrival order
pub struct JsonlTraceRecorder {
    path: PathBuf,
    // Serializes writers so concurrent scenario executions can't interleave lines
    write_lock: Mutex<()>,
}

impl JsonlTraceRecorder {
    /// Create a recorder appending to the given file, creating parent
    /// directories as needed
    pub fn new<P: AsRef<Path>>(path: P) -> LabResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the trace file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TraceRecorder for JsonlTraceRecorder {
    async fn record(&self, entry: TraceEntry) -> LabResult<()> {
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// In-memory recorder for tests and dry runs
#[derive(Default)]
pub struct MemoryTraceRecorder {
    entries: Mutex<Vec<TraceEntry>>,
}

impl MemoryTraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub async fn entries(&self) -> Vec<TraceEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl TraceRecorder for MemoryTraceRecorder {
    async fn record(&self, entry: TraceEntry) -> LabResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }
}

/// Recorder that always fails; used to verify that trace failures never
/// abort a run
pub struct FailingTraceRecorder;

#[async_trait]
impl TraceRecorder for FailingTraceRecorder {
    async fn record(&self, _entry: TraceEntry) -> LabResult<()> {
        Err(LabError::trace("trace sink unavailable"))
    }
}
