//! Change stream abstraction consumed by the mirror.

use async_trait::async_trait;
use thiserror::Error;

use super::change_event::ChangeEvent;

/// Failures raised by change stream adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Failed to connect to change stream: {0}")]
    Connect(String),

    #[error("Failed to read from change stream: {0}")]
    Read(String),

    #[error("Failed to decode change event: {0}")]
    Decode(String),

    #[error("Change stream consumer lagged, {0} event(s) skipped")]
    Lagged(u64),
}

impl StreamError {
    /// Connection-level failures; the stream must be re-established.
    pub fn requires_reconnect(&self) -> bool {
        matches!(self, StreamError::Connect(_) | StreamError::Read(_))
    }
}

/// An open subscription delivering change events in stream order.
#[async_trait]
pub trait ChangeStream: Send {
    /// Waits for the next event. `None` once the stream has ended.
    ///
    /// Tombstones (empty messages) are skipped by the adapter.
    async fn next_event(&mut self) -> Option<Result<ChangeEvent, StreamError>>;
}

/// Opens subscriptions on one change topic.
///
/// Subscriptions start at the latest offset: events published before
/// `connect` returns are not replayed.
#[async_trait]
pub trait ChangeStreamConnector: Send + Sync {
    fn topic(&self) -> &str;

    async fn connect(&self) -> Result<Box<dyn ChangeStream>, StreamError>;

    /// Topics visible on the broker (diagnostics only).
    async fn list_topics(&self) -> Result<Vec<String>, StreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_classification() {
        assert!(StreamError::Connect("refused".into()).requires_reconnect());
        assert!(StreamError::Read("reset".into()).requires_reconnect());
        assert!(!StreamError::Decode("bad json".into()).requires_reconnect());
        assert!(!StreamError::Lagged(3).requires_reconnect());
    }
}
