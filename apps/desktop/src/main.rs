use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client_core::{Dispatched, ListView, RemoteTodoService, TodoList, TodoService};
use shared::domain::{Todo, TodoId};
use tokio::runtime::Handle;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Command line client for the live to-do list")]
struct Args {
    /// Base URL of the todo service.
    #[arg(long, env = "TODO_SERVER_URL", default_value = "http://127.0.0.1:8443")]
    server_url: String,
    /// Print items as JSON instead of text rows.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current list once.
    List,
    /// Create a todo and wait for the service to acknowledge it.
    Add { content: String },
    /// Delete a todo by id.
    Delete { id: i64 },
    /// Follow the live query and reprint the list after every delivery.
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let remote = Arc::new(RemoteTodoService::new(&args.server_url)?);

    match args.command {
        Command::List => {
            let items = remote.list().await?;
            print_items(&items, args.json)?;
        }
        Command::Add { content } => {
            let list = TodoList::new(remote, Handle::current());
            let dispatched = list
                .create(Some(&content))
                .ok_or_else(|| anyhow!("nothing to add: content is empty"))?;
            finish(dispatched).await?;
        }
        Command::Delete { id } => {
            let list = TodoList::new(remote, Handle::current());
            finish(list.delete(TodoId(id))).await?;
        }
        Command::Watch => watch(remote, args.json).await?,
    }

    Ok(())
}

async fn finish(dispatched: Dispatched) -> Result<()> {
    let Dispatched { notice, pending } = dispatched;
    let kind = pending.kind();
    pending.outcome().await?;
    info!(command = kind.as_str(), "acknowledged by service");
    println!("{}", notice.text);
    Ok(())
}

async fn watch(service: Arc<dyn TodoService>, json: bool) -> Result<()> {
    let list = TodoList::new(service, Handle::current());
    let store = list.store().clone();
    let mut list = list.with_change_hook(move || {
        let printed = if json {
            serde_json::to_string(&store.items()).map_err(anyhow::Error::from)
        } else {
            Ok(render_text(&store.render()))
        };
        match printed {
            Ok(text) => println!("{text}"),
            Err(err) => tracing::error!("failed to print delivery: {err}"),
        }
    });

    list.mount();
    info!("watching live query; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    list.unmount();
    Ok(())
}

fn print_items(items: &[Todo], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        println!("{}", render_text(&ListView::from_items(items)));
    }
    Ok(())
}

fn render_text(view: &ListView) -> String {
    match view {
        ListView::Empty { message } => (*message).to_string(),
        ListView::Rows(rows) => rows
            .iter()
            .map(|row| format!("{:>6}  {}", row.id, row.content))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
