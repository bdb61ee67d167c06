//! Backend worker thread owning the tokio runtime.

use std::thread;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::bounded;
use tokio::{runtime::Handle, sync::oneshot};
use tracing::{error, info};

/// Keeps the backend runtime alive; dropping it shuts the worker down.
pub struct BackendRuntime {
    handle: Handle,
    shutdown: Option<oneshot::Sender<()>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl BackendRuntime {
    pub fn start() -> Result<Self> {
        let (handle_tx, handle_rx) = bounded::<Result<Handle, String>>(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let worker = thread::Builder::new()
            .name("todo-backend".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        error!("failed to build backend runtime: {err}");
                        let _ = handle_tx.send(Err(err.to_string()));
                        return;
                    }
                };
                let _ = handle_tx.send(Ok(runtime.handle().clone()));
                runtime.block_on(async move {
                    let _ = shutdown_rx.await;
                });
                info!("backend worker stopped");
            })
            .context("failed to spawn backend worker thread")?;

        let handle = handle_rx
            .recv()
            .context("backend worker exited before reporting its runtime")?
            .map_err(|err| anyhow!("backend worker startup failure: {err}"))?;

        info!("backend worker ready");
        Ok(Self {
            handle,
            shutdown: Some(shutdown_tx),
            worker: Some(worker),
        })
    }

    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }
}

impl Drop for BackendRuntime {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
