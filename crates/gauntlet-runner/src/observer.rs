use crate::suite::TestId;

/// Callbacks around individual test executions.
///
/// Passed into the orchestrator explicitly; this replaces a runner subclass
/// with overridable notification hooks.
pub trait RunObserver {
    fn test_started(&mut self, _id: &TestId) {}

    /// Called after a test finished, with its failure if it had one.
    fn test_finished(&mut self, _id: &TestId, _failure: Option<&anyhow::Error>) {}

    fn test_ignored(&mut self, _id: &TestId, _reason: &str) {}
}

/// An observer that reports test progress through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn test_started(&mut self, id: &TestId) {
        tracing::info!(test = %id, "test started");
    }

    fn test_finished(&mut self, id: &TestId, failure: Option<&anyhow::Error>) {
        match failure {
            None => tracing::info!(test = %id, "test passed"),
            Some(err) => tracing::warn!(test = %id, error = %err, "test failed"),
        }
    }

    fn test_ignored(&mut self, id: &TestId, reason: &str) {
        tracing::info!(test = %id, reason, "test ignored");
    }
}
