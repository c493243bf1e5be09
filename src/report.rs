use crate::QueueError;

/// Sink for failures of `FileQueue::open`.
///
/// The queue calls `report` exactly once per failed open attempt, before returning the same error to the caller.
pub trait ErrorReporter {
    fn report(&self, error: &QueueError);
}

/// Reporter that emits failures as `tracing` events
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &QueueError) {
        tracing::error!(
            code = error.code(),
            path = %error.path().display(),
            errno = error.errno(),
            "{error}"
        );
    }
}
