//! In-process change feed.
//!
//! SQLite has no CDC connector, so the server feeds its own mirror: the
//! feed is registered as a [`DomainEventSink`], turns every committed job
//! order change into a Debezium envelope and broadcasts the raw bytes to all
//! open subscriptions. A subscription only sees messages published after it
//! was opened.

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, warn};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use orderwatch_core::events::{DomainEvent, DomainEventSink};
use orderwatch_core::mirror::{ChangeEvent, ChangeStream, ChangeStreamConnector, StreamError};

use crate::envelope::{decode_envelope, encode_domain_event};

pub const DEFAULT_FEED_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct LoopbackChangeFeed {
    topic: String,
    sender: broadcast::Sender<Vec<u8>>,
}

impl LoopbackChangeFeed {
    pub fn new(topic: impl Into<String>) -> Self {
        Self::with_capacity(topic, DEFAULT_FEED_CAPACITY)
    }

    /// `capacity` is the number of messages a slow subscription may fall
    /// behind before it starts losing them.
    pub fn with_capacity(topic: impl Into<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            topic: topic.into(),
            sender,
        }
    }

    /// Publishes a raw message. Returns the number of subscriptions reached.
    pub fn publish_raw(&self, message: Vec<u8>) -> usize {
        self.sender.send(message).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl DomainEventSink for LoopbackChangeFeed {
    fn emit(&self, event: DomainEvent) {
        match encode_domain_event(&event) {
            Ok(message) => {
                let reached = self.publish_raw(message);
                debug!(
                    "Loopback feed published change for {} to {} subscriber(s)",
                    event.order_number(),
                    reached
                );
            }
            Err(e) => warn!("Failed to encode change for {}: {}", event.order_number(), e),
        }
    }
}

#[async_trait]
impl ChangeStreamConnector for LoopbackChangeFeed {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn connect(&self) -> Result<Box<dyn ChangeStream>, StreamError> {
        Ok(Box::new(LoopbackStream {
            messages: BroadcastStream::new(self.sender.subscribe()),
        }))
    }

    async fn list_topics(&self) -> Result<Vec<String>, StreamError> {
        Ok(vec![self.topic.clone()])
    }
}

struct LoopbackStream {
    messages: BroadcastStream<Vec<u8>>,
}

#[async_trait]
impl ChangeStream for LoopbackStream {
    async fn next_event(&mut self) -> Option<Result<ChangeEvent, StreamError>> {
        loop {
            match self.messages.next().await? {
                Ok(message) => match decode_envelope(&message) {
                    Ok(Some(event)) => return Some(Ok(event)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                },
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    return Some(Err(StreamError::Lagged(skipped)))
                }
            }
        }
    }
}
