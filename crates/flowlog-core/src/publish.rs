//! Forwarding of event records to an external publisher.

use crate::record::LogRecord;

/// Receives event records built with the `emit` flag set.
///
/// Called synchronously on the logging thread after the record has been
/// written to its sink.
pub trait EventPublisher: Send + Sync {
    /// Publish one event record
    fn publish(&self, record: &LogRecord);
}

impl<F> EventPublisher for F
where
    F: Fn(&LogRecord) + Send + Sync,
{
    fn publish(&self, record: &LogRecord) {
        self(record)
    }
}
