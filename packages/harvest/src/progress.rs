//! Progress reporting trait for harvest runs.
//!
//! Decouples the scheduler from any rendering backend; the CLI plugs in
//! `indicatif` bars, tests use [`NullProgress`].

use std::sync::Arc;

/// Trait for reporting harvest progress.
///
/// Implementations must be `Send + Sync`; the scheduler reports from a
/// single draining task but callers may share the handle.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected day tasks (enables percentage/ETA).
    fn set_total(&self, total: u64);

    /// Advance by `delta` completed tasks.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark the run as complete with a final message.
    fn finish(&self, msg: String);
}

/// A no-op [`ProgressCallback`] for tests and headless runs.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
