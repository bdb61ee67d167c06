//! View-state store: the latest full snapshot, replaced wholesale on every
//! delivery and read by the renderer.

use std::sync::{Arc, PoisonError, RwLock};

use shared::domain::{Todo, TodoId};

pub const EMPTY_STATE_MESSAGE: &str = "No Todos yet. Click 'New Todo' to start!";

/// Cloning yields another handle onto the same state.
#[derive(Clone, Default)]
pub struct ViewStore {
    inner: Arc<RwLock<ViewState>>,
}

#[derive(Default)]
struct ViewState {
    items: Vec<Todo>,
    version: u64,
}

impl ViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the live query callback writes here.
    pub(crate) fn replace(&self, snapshot: Vec<Todo>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.items = snapshot;
        guard.version += 1;
    }

    pub fn items(&self) -> Vec<Todo> {
        self.read(|state| state.items.clone())
    }

    pub fn len(&self) -> usize {
        self.read(|state| state.items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|state| state.items.is_empty())
    }

    /// Number of deliveries applied so far.
    pub fn version(&self) -> u64 {
        self.read(|state| state.version)
    }

    pub fn render(&self) -> ListView {
        self.read(|state| ListView::from_items(&state.items))
    }

    fn read<T>(&self, f: impl FnOnce(&ViewState) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: TodoId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Empty { message: &'static str },
    Rows(Vec<Row>),
}

impl ListView {
    pub fn from_items(items: &[Todo]) -> Self {
        if items.is_empty() {
            return Self::Empty {
                message: EMPTY_STATE_MESSAGE,
            };
        }
        Self::Rows(
            items
                .iter()
                .map(|todo| Row {
                    id: todo.id,
                    content: todo.content.clone(),
                })
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Empty { .. } => &[],
            Self::Rows(rows) => rows,
        }
    }
}
