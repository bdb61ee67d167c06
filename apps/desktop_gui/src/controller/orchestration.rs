//! Routes UI commands into the todo list dispatchers and forwards their real
//! outcomes back to the UI event queue.

use client_core::{Notice, TodoList};
use crossbeam_channel::{Sender, TrySendError};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Returns the optimistic notice to show right away, or `None` when the
/// command issued no request.
pub fn dispatch_backend_command(
    list: &TodoList,
    runtime: &Handle,
    ui_tx: &Sender<UiEvent>,
    cmd: BackendCommand,
) -> Option<Notice> {
    let cmd_name = cmd.name();
    let dispatched = match cmd {
        BackendCommand::Create { content } => list.create(content.as_deref()),
        BackendCommand::Delete { id } => Some(list.delete(id)),
    };
    let Some(dispatched) = dispatched else {
        debug!(command = cmd_name, "command issued no request");
        return None;
    };
    debug!(command = cmd_name, "dispatched ui command");

    let ui_tx = ui_tx.clone();
    let pending = dispatched.pending;
    runtime.spawn(async move {
        let kind = pending.kind();
        let outcome = pending.outcome().await;
        match ui_tx.try_send(UiEvent::CommandFinished { kind, outcome }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(command = cmd_name, "ui event queue is full; dropping outcome");
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(command = cmd_name, "ui closed before command finished");
            }
        }
    });

    Some(dispatched.notice)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use client_core::{CommandKind, InMemoryTodoService, NoticeLevel};
    use crossbeam_channel::bounded;
    use shared::domain::TodoId;

    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn create_reports_optimistic_notice_then_real_outcome() {
        let list = TodoList::new(Arc::new(InMemoryTodoService::new()), Handle::current());
        let (ui_tx, ui_rx) = bounded(8);

        let notice = dispatch_backend_command(
            &list,
            &Handle::current(),
            &ui_tx,
            BackendCommand::Create {
                content: Some("Buy milk".to_string()),
            },
        )
        .expect("notice");
        assert_eq!(notice.level, NoticeLevel::Success);

        let event = tokio::task::spawn_blocking(move || ui_rx.recv_timeout(Duration::from_secs(2)))
            .await
            .expect("join")
            .expect("event");
        let UiEvent::CommandFinished { kind, outcome } = event else {
            panic!("expected command outcome");
        };
        assert_eq!(kind, CommandKind::Create);
        assert!(outcome.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancelled_prompt_dispatches_nothing() {
        let list = TodoList::new(Arc::new(InMemoryTodoService::new()), Handle::current());
        let (ui_tx, ui_rx) = bounded(8);

        let notice = dispatch_backend_command(
            &list,
            &Handle::current(),
            &ui_tx,
            BackendCommand::Create { content: None },
        );
        assert!(notice.is_none());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(ui_rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_delete_still_notifies_but_reports_failure() {
        let list = TodoList::new(Arc::new(InMemoryTodoService::new()), Handle::current());
        let (ui_tx, ui_rx) = bounded(8);

        let notice = dispatch_backend_command(
            &list,
            &Handle::current(),
            &ui_tx,
            BackendCommand::Delete { id: TodoId(42) },
        )
        .expect("notice");
        assert_eq!(notice.text, "Todo deleted!");

        let event = tokio::task::spawn_blocking(move || ui_rx.recv_timeout(Duration::from_secs(2)))
            .await
            .expect("join")
            .expect("event");
        let UiEvent::CommandFinished { outcome, .. } = event else {
            panic!("expected command outcome");
        };
        assert!(outcome.is_err());
    }
}
