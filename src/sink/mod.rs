//! Output sinks for saved sign-ups

mod client;
mod submission;
mod traits;

pub use client::{JsonFileSink, LogSink};
pub use submission::Submission;
pub use traits::SubmissionSink;

#[cfg(test)]
pub use traits::MockSubmissionSink;
