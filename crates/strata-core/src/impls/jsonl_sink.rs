//! JsonLinesSink - appends one JSON object per violation to a file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::{SinkError, Violation};
use crate::ports::ViolationSink;

pub struct JsonLinesSink {
    path: PathBuf,
    /// Serializes appends so concurrent publishers never interleave lines.
    write_lock: Mutex<()>,
}

impl JsonLinesSink {
    /// The file is created on first publish if it does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ViolationSink for JsonLinesSink {
    async fn publish(&self, violation: &Violation) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(violation)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
