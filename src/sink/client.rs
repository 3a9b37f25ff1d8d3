//! Concrete submission sinks

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::submission::Submission;
use super::traits::SubmissionSink;

/// Writes each submission to the log and nowhere else
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl SubmissionSink for LogSink {
    async fn submit(&self, submission: &Submission) -> Result<()> {
        let customer = serde_json::to_string(&submission.customer)?;
        tracing::info!(id = %submission.id, valid = submission.valid, "Saved: {customer}");
        Ok(())
    }
}

/// Stores each submission as `<id>.json` inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a submission is written to
    pub fn path_for(&self, submission: &Submission) -> PathBuf {
        self.dir.join(format!("{}.json", submission.id))
    }
}

#[async_trait]
impl SubmissionSink for JsonFileSink {
    async fn submit(&self, submission: &Submission) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path_for(submission);
        let content = serde_json::to_string_pretty(submission)?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(id = %submission.id, path = %path.display(), "submission written");
        Ok(())
    }
}
