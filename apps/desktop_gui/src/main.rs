use std::sync::Arc;

mod backend_bridge;
mod controller;
mod ui;

use anyhow::anyhow;
use clap::Parser;
use client_core::{InMemoryTodoService, RemoteTodoService, TodoList, TodoService};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use backend_bridge::runtime::BackendRuntime;
use controller::events::UiEvent;
use ui::{StartupConfig, TodoApp};

const WINDOW_TITLE: &str = "To-Do List";
const UI_EVENT_QUEUE_CAPACITY: usize = 256;

#[derive(Parser, Debug)]
#[command(about = "Desktop to-do list backed by a live todo service")]
struct Args {
    /// Base URL of the todo service.
    #[arg(long, env = "TODO_SERVER_URL", default_value = "http://127.0.0.1:8443")]
    server_url: String,
    /// Keep todos in memory instead of talking to a server.
    #[arg(long)]
    offline: bool,
}

fn build_service(args: &Args) -> anyhow::Result<(Arc<dyn TodoService>, String)> {
    if args.offline {
        return Ok((
            Arc::new(InMemoryTodoService::new()),
            "local memory".to_string(),
        ));
    }
    let service = RemoteTodoService::new(&args.server_url)?;
    let label = service.server_url().to_string();
    Ok((Arc::new(service), label))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let (service, source_label) = build_service(&args)?;
    let backend = BackendRuntime::start()?;
    info!(source = %source_label, "starting todo desktop");

    let (ui_tx, ui_rx) = bounded::<UiEvent>(UI_EVENT_QUEUE_CAPACITY);
    let runtime = backend.handle();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([720.0, 640.0])
            .with_min_inner_size([420.0, 360.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            let list = TodoList::new(service, runtime.clone());
            Ok(Box::new(TodoApp::new(
                &cc.egui_ctx,
                list,
                runtime,
                ui_tx,
                ui_rx,
                StartupConfig { source_label },
            )))
        }),
    );

    // The app (and its live query) is gone by now; stop the worker last.
    drop(backend);
    result.map_err(|err| {
        error!("desktop ui failed: {err}");
        anyhow!("desktop ui failed: {err}")
    })
}
