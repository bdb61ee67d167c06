//! Client side of the live to-do list: the data service seam, its remote and
//! in-process implementations, and the view synchronization component.

pub mod dispatch;
pub mod error;
mod memory;
mod remote;
pub mod service;
mod subscription;
mod todo_list;
pub mod view;

pub use dispatch::{
    CommandFailure, CommandKind, CommandOutcome, Dispatched, Notice, NoticeLevel, PendingCommand,
};
pub use error::ClientError;
pub use memory::InMemoryTodoService;
pub use remote::RemoteTodoService;
pub use service::{SnapshotStream, TodoService};
pub use subscription::Subscription;
pub use todo_list::TodoList;
pub use view::{ListView, Row, ViewStore, EMPTY_STATE_MESSAGE};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
