use std::sync::Arc;

use server_api::{snapshot_event, ApiContext};
use shared::protocol::ServerEvent;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{debug, error};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    pub(crate) events: broadcast::Sender<ServerEvent>,
    // Held from a mutation until its snapshot is broadcast.
    commit: Arc<Mutex<()>>,
}

impl AppState {
    pub(crate) fn new(api: ApiContext, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            api,
            events,
            commit: Arc::new(Mutex::new(())),
        }
    }

    /// Snapshots leave in commit order as long as every mutation runs under
    /// this guard and publishes before dropping it.
    pub(crate) async fn begin_commit(&self) -> MutexGuard<'_, ()> {
        self.commit.lock().await
    }

    /// Pushes the current full item set to every live query subscriber.
    pub(crate) async fn publish_snapshot(&self) {
        let event = match snapshot_event(&self.api).await {
            Ok(event) => event,
            Err(err) => {
                error!(%err, "failed to build snapshot after mutation");
                ServerEvent::Error(err)
            }
        };
        if self.events.send(event).is_err() {
            debug!("no live query subscribers");
        }
    }
}
