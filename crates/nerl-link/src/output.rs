//! Output sink
//!
//! Append-only TSV file of linked mentions. Writes are serialized behind
//! an async mutex so parallel workers interleave whole lines only; no
//! ordering is guaranteed across documents.

use std::path::Path;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use nerl_core::{LinkedMention, NerlError, Result};

/// Shared append-only sink for linked-mention lines
pub struct OutputSink {
    file: Mutex<File>,
}

impl OutputSink {
    /// Open (or create) the output file in append mode
    pub async fn append(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| NerlError::Output(format!("cannot open {}: {e}", path.display())))?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Append a batch of linked mentions under one lock acquisition
    pub async fn write_all(&self, mentions: &[LinkedMention]) -> Result<()> {
        if mentions.is_empty() {
            return Ok(());
        }
        let mut file = self.file.lock().await;
        for mention in mentions {
            file.write_all(mention.to_tsv().as_bytes()).await?;
        }
        Ok(())
    }

    /// Flush buffered bytes to disk
    pub async fn flush(&self) -> Result<()> {
        let mut file = self.file.lock().await;
        file.flush().await?;
        Ok(())
    }
}
