//! Kafka consumer for Debezium topics (`kafka` feature).

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};

use orderwatch_core::mirror::{ChangeEvent, ChangeStream, ChangeStreamConnector, StreamError};

use crate::envelope::decode_envelope;

const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaSettings {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
}

pub struct KafkaChangeStreamConnector {
    settings: KafkaSettings,
}

impl KafkaChangeStreamConnector {
    pub fn new(settings: KafkaSettings) -> Self {
        Self { settings }
    }

    /// Consumer group settings: start at the latest offset, commit automatically.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.settings.brokers)
            .set("group.id", &self.settings.group_id)
            .set("auto.offset.reset", "latest")
            .set("enable.auto.commit", "true")
            .set("session.timeout.ms", "6000");
        config
    }

    /// Fetches broker metadata on a blocking thread.
    async fn fetch_topics(&self, topic: Option<String>) -> Result<Vec<String>, StreamError> {
        let config = self.client_config();
        tokio::task::spawn_blocking(move || {
            let consumer: BaseConsumer = config
                .create()
                .map_err(|e| StreamError::Connect(e.to_string()))?;
            let metadata = consumer
                .fetch_metadata(topic.as_deref(), METADATA_TIMEOUT)
                .map_err(|e| StreamError::Connect(e.to_string()))?;
            Ok(metadata
                .topics()
                .iter()
                .map(|t| t.name().to_string())
                .collect())
        })
        .await
        .map_err(|e| StreamError::Connect(e.to_string()))?
    }
}

#[async_trait]
impl ChangeStreamConnector for KafkaChangeStreamConnector {
    fn topic(&self) -> &str {
        &self.settings.topic
    }

    async fn connect(&self) -> Result<Box<dyn ChangeStream>, StreamError> {
        // Creating a consumer does not touch the network; probe the broker so
        // an unreachable cluster surfaces as a connect failure.
        self.fetch_topics(Some(self.settings.topic.clone())).await?;

        let consumer: StreamConsumer = self
            .client_config()
            .create()
            .map_err(|e| StreamError::Connect(e.to_string()))?;
        consumer
            .subscribe(&[self.settings.topic.as_str()])
            .map_err(|e| StreamError::Connect(e.to_string()))?;
        info!(
            "Subscribed to {} on {} as {}",
            self.settings.topic, self.settings.brokers, self.settings.group_id
        );
        Ok(Box::new(KafkaStream { consumer }))
    }

    async fn list_topics(&self) -> Result<Vec<String>, StreamError> {
        self.fetch_topics(None).await
    }
}

struct KafkaStream {
    consumer: StreamConsumer,
}

fn decode_message(message: &BorrowedMessage<'_>) -> Option<Result<ChangeEvent, StreamError>> {
    let payload = message.payload()?;
    debug!(
        "Message at {}/{}@{}",
        message.topic(),
        message.partition(),
        message.offset()
    );
    decode_envelope(payload).transpose()
}

#[async_trait]
impl ChangeStream for KafkaStream {
    async fn next_event(&mut self) -> Option<Result<ChangeEvent, StreamError>> {
        loop {
            let decoded = match self.consumer.recv().await {
                Ok(message) => decode_message(&message),
                Err(e) => Some(Err(StreamError::Read(e.to_string()))),
            };
            if decoded.is_some() {
                return decoded;
            }
        }
    }
}
