use std::sync::Arc;

use log::debug;
use tokio::sync::Mutex;

use super::change_event::ChangeEvent;
use super::view_state::{ViewSnapshot, ViewState};
use crate::errors::{Error, Result};
use crate::job_orders::{JobOrder, JobOrderRepositoryTrait};

/// Re-reads the full snapshot from the store and publishes it.
///
/// Every refresh holds one shared gate from the store read until the publish,
/// so publishes land in the order their reads were taken and an older read
/// never overwrites a newer one. On a failed read nothing is published.
#[derive(Clone)]
pub struct SnapshotRefresher {
    store: Arc<dyn JobOrderRepositoryTrait>,
    view: ViewState,
    gate: Arc<Mutex<()>>,
}

impl SnapshotRefresher {
    pub fn new(store: Arc<dyn JobOrderRepositoryTrait>, view: ViewState) -> Self {
        Self {
            store,
            view,
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Publishes fresh orders, keeping the current history.
    pub async fn refresh(&self) -> Result<Arc<ViewSnapshot>> {
        let _guard = self.gate.lock().await;
        let orders = self.read_orders().await?;
        let version = self.view.publish_orders(orders);
        debug!("View refreshed from store (version {})", version);
        Ok(self.view.read())
    }

    /// Publishes fresh orders together with `history`.
    pub async fn refresh_with_history(&self, history: Vec<ChangeEvent>) -> Result<u64> {
        let _guard = self.gate.lock().await;
        let orders = self.read_orders().await?;
        Ok(self.view.publish(orders, history))
    }

    /// Store reads block on the connection pool, so they run off the async workers.
    async fn read_orders(&self) -> Result<Vec<JobOrder>> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.list_job_orders())
            .await
            .map_err(|e| Error::Unexpected(format!("Snapshot read task failed: {}", e)))?
    }
}
