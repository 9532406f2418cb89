//! The change stream consume loop.
//!
//! For every event delivered by the stream the mirror appends it to its
//! bounded history, re-reads the full job order snapshot from the store and
//! publishes both to the [`ViewState`](super::ViewState). The payload of the
//! event is never applied to the view directly; the store stays the source of
//! truth.

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use super::backoff::ReconnectPolicy;
use super::change_event::ChangeEvent;
use super::history::MirrorHistory;
use super::refresher::SnapshotRefresher;
use super::stream::{ChangeStream, ChangeStreamConnector, StreamError};
use crate::constants::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub history_capacity: usize,
    pub reconnect: ReconnectPolicy,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// Why [`EventMirror::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorExit {
    Cancelled,
    StreamEnded,
    ReconnectExhausted { attempts: u32 },
}

enum ConsumeOutcome {
    Cancelled,
    Ended,
    Failed(StreamError),
}

pub struct EventMirror {
    connector: Arc<dyn ChangeStreamConnector>,
    refresher: SnapshotRefresher,
    history: MirrorHistory,
    reconnect: ReconnectPolicy,
}

impl EventMirror {
    pub fn new(
        connector: Arc<dyn ChangeStreamConnector>,
        refresher: SnapshotRefresher,
        config: MirrorConfig,
    ) -> Self {
        Self {
            connector,
            refresher,
            history: MirrorHistory::new(config.history_capacity),
            reconnect: config.reconnect,
        }
    }

    pub fn history(&self) -> &MirrorHistory {
        &self.history
    }

    /// Consumes the stream until it ends, the reconnect budget runs out, or
    /// `cancel` fires.
    pub async fn run(&mut self, cancel: CancellationToken) -> MirrorExit {
        let topic = self.connector.topic().to_string();
        let mut failures: u32 = 0;

        loop {
            let connected = tokio::select! {
                _ = cancel.cancelled() => return MirrorExit::Cancelled,
                result = self.connector.connect() => result,
            };

            let failure = match connected {
                Ok(stream) => {
                    failures = 0;
                    info!("Change stream consumer started on {}", topic);
                    self.record(ChangeEvent::info(format!(
                        "Change stream consumer started on {}",
                        topic
                    )));
                    // Events committed while disconnected are not replayed.
                    self.resync().await;
                    match self.consume(stream, &cancel).await {
                        ConsumeOutcome::Cancelled => return MirrorExit::Cancelled,
                        ConsumeOutcome::Ended => {
                            info!("Change stream on {} ended", topic);
                            return MirrorExit::StreamEnded;
                        }
                        ConsumeOutcome::Failed(err) => err,
                    }
                }
                Err(err) => err,
            };

            warn!("Change stream consumer error on {}: {}", topic, failure);
            self.record(ChangeEvent::error(format!(
                "Change stream consumer error: {}",
                failure
            )));

            failures += 1;
            if self.reconnect.exhausted(failures) {
                error!(
                    "Giving up on change stream {} after {} failed attempt(s)",
                    topic, failures
                );
                self.record(ChangeEvent::error(format!(
                    "Change stream consumer stopped after {} failed attempt(s)",
                    failures
                )));
                return MirrorExit::ReconnectExhausted { attempts: failures };
            }

            let delay = self.reconnect.delay_for(failures - 1);
            debug!("Reconnecting to {} in {:?}", topic, delay);
            tokio::select! {
                _ = cancel.cancelled() => return MirrorExit::Cancelled,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn consume(
        &mut self,
        mut stream: Box<dyn ChangeStream>,
        cancel: &CancellationToken,
    ) -> ConsumeOutcome {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return ConsumeOutcome::Cancelled,
                next = stream.next_event() => next,
            };

            match next {
                None => return ConsumeOutcome::Ended,
                Some(Ok(event)) => self.apply(event).await,
                Some(Err(err)) if err.requires_reconnect() => {
                    return ConsumeOutcome::Failed(err);
                }
                Some(Err(err)) => {
                    warn!("Skipping change event: {}", err);
                    self.record(ChangeEvent::error(err.to_string()));
                    if matches!(err, StreamError::Lagged(_)) {
                        self.resync().await;
                    }
                }
            }
        }
    }

    /// Records a received event and publishes it with a fresh store read.
    async fn apply(&mut self, event: ChangeEvent) {
        debug!(
            "Change event {} for {}",
            event.operation,
            event.order_number().unwrap_or("<unknown>")
        );
        self.history.push(event);
        self.resync().await;
    }

    /// Re-reads the store and publishes it with the current history.
    async fn resync(&mut self) {
        if let Err(err) = self
            .refresher
            .refresh_with_history(self.history.snapshot())
            .await
        {
            warn!("Snapshot refresh failed: {}", err);
            self.record(ChangeEvent::error(format!(
                "Snapshot refresh failed: {}",
                err
            )));
        }
    }

    /// Appends a synthetic entry and publishes the history alone.
    fn record(&mut self, entry: ChangeEvent) {
        self.history.push(entry);
        self.refresher
            .view()
            .publish_history(self.history.snapshot());
    }
}
