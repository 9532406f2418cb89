use std::sync::Arc;

use crate::{
    config::{Config, StreamSource},
    domain_events::WebDomainEventSink,
    events::EventBus,
    supervisor::MirrorSupervisor,
};
use orderwatch_change_stream::LoopbackChangeFeed;
use orderwatch_core::{
    events::{DomainEventSink, FanoutDomainEventSink},
    job_orders::{JobOrderRepositoryTrait, JobOrderService, JobOrderServiceTrait},
    mirror::{ChangeStreamConnector, MirrorExit, SnapshotRefresher, ViewState},
};
use orderwatch_storage_sqlite::{db, job_orders::JobOrderRepository};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub job_order_service: Arc<dyn JobOrderServiceTrait>,
    pub view: ViewState,
    pub refresher: SnapshotRefresher,
    pub connector: Arc<dyn ChangeStreamConnector>,
    pub event_bus: EventBus,
    pub db_path: String,
    /// Fired when the server begins shutting down; ends open SSE streams.
    pub shutdown_token: CancellationToken,
    supervisor: Mutex<Option<MirrorSupervisor>>,
}

impl AppState {
    /// Stops the background mirror. Safe to call more than once.
    pub async fn shutdown(&self) -> Option<MirrorExit> {
        self.shutdown_token.cancel();
        let supervisor = self.supervisor.lock().await.take()?;
        supervisor.shutdown().await
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("OW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

#[cfg(feature = "kafka")]
fn kafka_connector(config: &Config) -> anyhow::Result<Arc<dyn ChangeStreamConnector>> {
    use orderwatch_change_stream::{KafkaChangeStreamConnector, KafkaSettings};

    Ok(Arc::new(KafkaChangeStreamConnector::new(KafkaSettings {
        brokers: config.kafka.brokers.clone(),
        topic: config.kafka.topic.clone(),
        group_id: config.kafka.group_id.clone(),
    })))
}

#[cfg(not(feature = "kafka"))]
fn kafka_connector(_config: &Config) -> anyhow::Result<Arc<dyn ChangeStreamConnector>> {
    anyhow::bail!("OW_STREAM_SOURCE=kafka requires a build with the `kafka` feature")
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer(pool.as_ref().clone());
    let repository: Arc<dyn JobOrderRepositoryTrait> =
        Arc::new(JobOrderRepository::new(pool.clone(), writer));

    let event_bus = EventBus::new(256);
    let web_sink: Arc<dyn DomainEventSink> = Arc::new(WebDomainEventSink::new(event_bus.clone()));

    let (connector, sinks): (Arc<dyn ChangeStreamConnector>, Vec<Arc<dyn DomainEventSink>>) =
        match config.stream_source {
            StreamSource::Loopback => {
                let feed = Arc::new(LoopbackChangeFeed::new(config.kafka.topic.clone()));
                let connector: Arc<dyn ChangeStreamConnector> = feed.clone();
                let feed_sink: Arc<dyn DomainEventSink> = feed;
                (connector, vec![feed_sink, web_sink])
            }
            StreamSource::Kafka => (kafka_connector(config)?, vec![web_sink]),
        };
    tracing::info!(
        "Change stream source: {:?} (topic {})",
        config.stream_source,
        connector.topic()
    );

    let event_sink: Arc<dyn DomainEventSink> = Arc::new(FanoutDomainEventSink::new(sinks));
    let job_order_service: Arc<dyn JobOrderServiceTrait> =
        Arc::new(JobOrderService::new(repository.clone(), event_sink));

    let view = ViewState::new();
    let refresher = SnapshotRefresher::new(repository, view.clone());
    if let Err(err) = refresher.refresh().await {
        tracing::warn!("Initial snapshot read failed: {}", err);
    }

    let shutdown_token = CancellationToken::new();
    let supervisor = MirrorSupervisor::start(
        connector.clone(),
        refresher.clone(),
        config.mirror_config(),
        event_bus.clone(),
        shutdown_token.child_token(),
    );

    Ok(Arc::new(AppState {
        job_order_service,
        view,
        refresher,
        connector,
        event_bus,
        db_path,
        shutdown_token,
        supervisor: Mutex::new(Some(supervisor)),
    }))
}
