//! Trait abstraction for submission sinks to enable mocking in tests

use anyhow::Result;
use async_trait::async_trait;

use super::submission::Submission;

/// Passive destination for saved form snapshots. No acknowledgement is
/// modelled beyond the returned `Result`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Hand over one saved submission
    async fn submit(&self, submission: &Submission) -> Result<()>;
}
