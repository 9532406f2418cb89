use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use orderwatch_core::constants::{
    DEFAULT_CHANGE_TOPIC, DEFAULT_CONSUMER_GROUP, DEFAULT_HISTORY_CAPACITY,
};
use orderwatch_core::mirror::{MirrorConfig, ReconnectPolicy};

/// Where the mirror reads change events from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    /// In-process feed of this server's own writes.
    Loopback,
    /// Debezium topic on a Kafka cluster (`kafka` feature).
    Kafka,
}

impl FromStr for StreamSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loopback" => Ok(StreamSource::Loopback),
            "kafka" => Ok(StreamSource::Kafka),
            other => bail!("Unknown stream source '{}' (expected loopback or kafka)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub history_capacity: usize,
    pub stream_source: StreamSource,
    pub kafka: KafkaConfig,
    pub reconnect: ReconnectPolicy,
}

impl Config {
    /// Reads `OW_*` variables, after loading a `.env` file if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let listen_addr: SocketAddr = var("OW_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid OW_LISTEN_ADDR")?;
        let db_path = var("OW_DB_PATH", "./db/orderwatch.db");
        let cors_allow = var("OW_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = var("OW_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .context("Invalid OW_REQUEST_TIMEOUT_MS")?;
        let history_capacity: usize = var(
            "OW_HISTORY_CAPACITY",
            &DEFAULT_HISTORY_CAPACITY.to_string(),
        )
        .parse()
        .context("Invalid OW_HISTORY_CAPACITY")?;
        let stream_source: StreamSource = var("OW_STREAM_SOURCE", "loopback").parse()?;

        let kafka = KafkaConfig {
            brokers: var("OW_KAFKA_BROKERS", "kafka:9092"),
            topic: var("OW_KAFKA_TOPIC", DEFAULT_CHANGE_TOPIC),
            group_id: var("OW_KAFKA_GROUP_ID", DEFAULT_CONSUMER_GROUP),
        };

        let initial_ms: u64 = var("OW_RECONNECT_INITIAL_MS", "500")
            .parse()
            .context("Invalid OW_RECONNECT_INITIAL_MS")?;
        let max_ms: u64 = var("OW_RECONNECT_MAX_MS", "30000")
            .parse()
            .context("Invalid OW_RECONNECT_MAX_MS")?;
        let max_attempts = match lookup("OW_RECONNECT_MAX_ATTEMPTS") {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u32>()
                    .context("Invalid OW_RECONNECT_MAX_ATTEMPTS")?,
            ),
            _ => None,
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            history_capacity,
            stream_source,
            kafka,
            reconnect: ReconnectPolicy::new(
                Duration::from_millis(initial_ms),
                Duration::from_millis(max_ms),
                max_attempts,
            ),
        })
    }

    pub fn mirror_config(&self) -> MirrorConfig {
        MirrorConfig {
            history_capacity: self.history_capacity,
            reconnect: self.reconnect.clone(),
        }
    }
}
