//! Background tasks owned by the server: the event mirror and the bridge that
//! pushes every published view to SSE clients.

use std::sync::Arc;

use orderwatch_core::mirror::{
    ChangeStreamConnector, EventMirror, MirrorConfig, MirrorExit, SnapshotRefresher, ViewState,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::{EventBus, ServerEvent, VIEW_UPDATED};

pub struct MirrorSupervisor {
    cancel: CancellationToken,
    mirror: JoinHandle<MirrorExit>,
    bridge: JoinHandle<()>,
}

impl MirrorSupervisor {
    /// Spawns both tasks. They stop when `cancel` fires.
    pub fn start(
        connector: Arc<dyn ChangeStreamConnector>,
        refresher: SnapshotRefresher,
        config: MirrorConfig,
        event_bus: EventBus,
        cancel: CancellationToken,
    ) -> Self {
        let bridge = spawn_view_bridge(refresher.view().clone(), event_bus, cancel.clone());

        let mut mirror = EventMirror::new(connector, refresher, config);
        let token = cancel.clone();
        let mirror = tokio::spawn(async move {
            let exit = mirror.run(token).await;
            match &exit {
                MirrorExit::Cancelled => tracing::info!("Event mirror cancelled"),
                other => tracing::warn!("Event mirror stopped: {:?}", other),
            }
            exit
        });

        Self {
            cancel,
            mirror,
            bridge,
        }
    }

    /// Cancels both tasks and waits for them. `None` if the mirror task panicked.
    pub async fn shutdown(self) -> Option<MirrorExit> {
        self.cancel.cancel();
        if let Err(err) = self.bridge.await {
            tracing::error!("View bridge task failed: {}", err);
        }
        match self.mirror.await {
            Ok(exit) => Some(exit),
            Err(err) => {
                tracing::error!("Event mirror task failed: {}", err);
                None
            }
        }
    }
}

fn spawn_view_bridge(
    view: ViewState,
    event_bus: EventBus,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut updates = view.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            let snapshot = updates.borrow_and_update().clone();
            match serde_json::to_value(snapshot.as_ref()) {
                Ok(payload) => event_bus.publish(ServerEvent::with_payload(VIEW_UPDATED, payload)),
                Err(err) => tracing::error!("Failed to serialize view snapshot: {}", err),
            }
        }
    })
}
