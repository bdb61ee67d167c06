use std::sync::{Arc, Mutex, PoisonError};

use futures::StreamExt;
use shared::domain::Todo;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, error};

use crate::{error::ClientError, service::TodoService};

/// A live query held open against a [`TodoService`].
///
/// Released at most once, either through [`Subscription::release`] or on drop.
/// Once `release` returns, no callback runs again.
pub struct Subscription {
    // Held by the delivery task while a callback runs.
    gate: Arc<Mutex<bool>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Subscription {
    pub fn activate<F>(service: Arc<dyn TodoService>, runtime: &Handle, on_snapshot: F) -> Self
    where
        F: FnMut(Vec<Todo>) + Send + 'static,
    {
        Self::activate_with(service, runtime, on_snapshot, |_: &ClientError| {})
    }

    /// Delivery errors are always logged; `on_error` additionally sees them.
    pub fn activate_with<F, E>(
        service: Arc<dyn TodoService>,
        runtime: &Handle,
        mut on_snapshot: F,
        on_error: E,
    ) -> Self
    where
        F: FnMut(Vec<Todo>) + Send + 'static,
        E: Fn(&ClientError) + Send + 'static,
    {
        let gate = Arc::new(Mutex::new(true));
        let task_gate = Arc::clone(&gate);

        let task = runtime.spawn(async move {
            let mut deliveries = match service.observe_query().await {
                Ok(deliveries) => deliveries,
                Err(err) => {
                    error!(%err, "failed to open todo live query");
                    if is_open(&task_gate) {
                        on_error(&err);
                    }
                    return;
                }
            };

            while let Some(delivery) = deliveries.next().await {
                let open = task_gate.lock().unwrap_or_else(PoisonError::into_inner);
                if !*open {
                    break;
                }
                match delivery {
                    Ok(items) => {
                        debug!(count = items.len(), "todo snapshot delivered");
                        on_snapshot(items);
                    }
                    Err(err) => {
                        error!(%err, "error observing todos");
                        on_error(&err);
                    }
                }
            }
            debug!("todo live query ended");
        });

        Self {
            gate,
            task: Mutex::new(Some(task)),
        }
    }

    pub fn is_active(&self) -> bool {
        is_open(&self.gate)
    }

    /// Returns `true` only for the call that actually released the query.
    pub fn release(&self) -> bool {
        {
            let mut open = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            if !*open {
                return false;
            }
            *open = false;
        }
        if let Some(task) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
        debug!("todo live query released");
        true
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

fn is_open(gate: &Mutex<bool>) -> bool {
    *gate.lock().unwrap_or_else(PoisonError::into_inner)
}
