//! Commands issued from UI widgets.

use shared::domain::TodoId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Text from the "New Todo" prompt; `None` when the prompt was cancelled.
    Create { content: Option<String> },
    Delete { id: TodoId },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Create { .. } => "create_todo",
            BackendCommand::Delete { .. } => "delete_todo",
        }
    }
}
