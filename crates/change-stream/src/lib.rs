//! Change stream adapters for Orderwatch.
//!
//! - [`envelope`]: Debezium JSON envelope decoding and encoding.
//! - [`loopback`]: in-process feed driven by the service's domain events.
//! - `kafka` (feature `kafka`): consumer for a Debezium topic on a Kafka cluster.

pub mod envelope;
pub mod loopback;

#[cfg(feature = "kafka")]
pub mod kafka;

pub use envelope::{decode_envelope, encode_domain_event, DebeziumEnvelope};
pub use loopback::LoopbackChangeFeed;

#[cfg(feature = "kafka")]
pub use kafka::{KafkaChangeStreamConnector, KafkaSettings};
