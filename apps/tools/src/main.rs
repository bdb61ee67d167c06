use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::domain::TodoId;
use storage::Storage;

/// Direct database maintenance. Changes made here skip the server's live
/// query broadcast; connected clients see them with the next mutation.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/todos.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every stored todo.
    List,
    /// Insert one todo per argument.
    Seed { contents: Vec<String> },
    /// Remove a single todo.
    Remove { id: i64 },
    /// Remove every todo.
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::List => {
            for todo in storage.list_todos().await? {
                println!("{}\t{}\t{}", todo.id, todo.created_at.to_rfc3339(), todo.content);
            }
        }
        Command::Seed { contents } => {
            for content in contents.iter().filter(|content| !content.is_empty()) {
                let todo = storage.insert_todo(content).await?;
                println!("created todo_id={}", todo.id);
            }
        }
        Command::Remove { id } => {
            if !storage.delete_todo(TodoId(id)).await? {
                bail!("todo {id} not found");
            }
            println!("removed todo_id={id}");
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to clear all todos without --yes");
            }
            let removed = storage.clear_todos().await?;
            println!("removed {removed} todos");
        }
    }

    Ok(())
}
