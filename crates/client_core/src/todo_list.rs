use std::{future::Future, sync::Arc};

use shared::domain::TodoId;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::{
    dispatch::{
        prompt_content, CommandFailure, CommandKind, Dispatched, Notice, PendingCommand,
        CREATED_NOTICE, DELETED_NOTICE,
    },
    error::ClientError,
    service::TodoService,
    subscription::Subscription,
    view::{ListView, ViewStore},
};

type ChangeHook = Arc<dyn Fn() + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&ClientError) + Send + Sync>;

/// The to-do list component.
///
/// Commands never touch the store. The only writer is the live query
/// acquired by [`TodoList::mount`], so the view always equals the most
/// recent snapshot the service delivered.
pub struct TodoList {
    service: Arc<dyn TodoService>,
    runtime: Handle,
    store: ViewStore,
    subscription: Option<Subscription>,
    on_change: Option<ChangeHook>,
    on_error: Option<ErrorHook>,
}

impl TodoList {
    pub fn new(service: Arc<dyn TodoService>, runtime: Handle) -> Self {
        Self {
            service,
            runtime,
            store: ViewStore::new(),
            subscription: None,
            on_change: None,
            on_error: None,
        }
    }

    /// Called after each applied snapshot, e.g. to request a repaint.
    pub fn with_change_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(hook));
        self
    }

    pub fn with_error_hook(mut self, hook: impl Fn(&ClientError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    pub fn store(&self) -> &ViewStore {
        &self.store
    }

    pub fn view(&self) -> ListView {
        self.store.render()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    pub fn mount(&mut self) {
        if self.is_mounted() {
            return;
        }
        let store = self.store.clone();
        let on_change = self.on_change.clone();
        let on_error = self.on_error.clone();
        self.subscription = Some(Subscription::activate_with(
            Arc::clone(&self.service),
            &self.runtime,
            move |items| {
                store.replace(items);
                if let Some(hook) = &on_change {
                    hook();
                }
            },
            move |err| {
                if let Some(hook) = &on_error {
                    hook(err);
                }
            },
        ));
        debug!("todo list mounted");
    }

    /// Releases the live query. Returns `false` if nothing was mounted.
    pub fn unmount(&mut self) -> bool {
        match self.subscription.take() {
            Some(subscription) => subscription.release(),
            None => false,
        }
    }

    /// Empty or cancelled input issues no request and returns `None`.
    pub fn create(&self, input: Option<&str>) -> Option<Dispatched> {
        let content = prompt_content(input)?;
        let service = Arc::clone(&self.service);
        let pending = self.spawn_command(CommandKind::Create, async move {
            let todo = service.create(&content).await?;
            debug!(todo_id = todo.id.0, "create acknowledged");
            Ok(())
        });
        Some(Dispatched {
            notice: Notice::success(CREATED_NOTICE),
            pending,
        })
    }

    pub fn delete(&self, id: TodoId) -> Dispatched {
        let service = Arc::clone(&self.service);
        let pending = self.spawn_command(CommandKind::Delete, async move {
            service.delete(id).await?;
            debug!(todo_id = id.0, "delete acknowledged");
            Ok(())
        });
        Dispatched {
            notice: Notice::info(DELETED_NOTICE),
            pending,
        }
    }

    fn spawn_command<Fut>(&self, kind: CommandKind, request: Fut) -> PendingCommand
    where
        Fut: Future<Output = Result<(), ClientError>> + Send + 'static,
    {
        let handle = self.runtime.spawn(async move {
            request.await.map_err(|err| {
                warn!(command = kind.as_str(), %err, "todo command failed");
                CommandFailure {
                    kind,
                    reason: err.to_string(),
                }
            })
        });
        PendingCommand::new(kind, handle)
    }
}
