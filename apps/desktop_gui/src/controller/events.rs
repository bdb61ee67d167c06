//! Backend-to-UI events and error modeling for the desktop controller.

use client_core::{CommandKind, CommandOutcome};

pub enum UiEvent {
    CommandFinished {
        kind: CommandKind,
        outcome: CommandOutcome,
    },
    LiveQueryError(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    NotFound,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    LiveQuery,
    CreateTodo,
    DeleteTodo,
}

impl From<CommandKind> for UiErrorContext {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::Create => UiErrorContext::CreateTodo,
            CommandKind::Delete => UiErrorContext::DeleteTodo,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        // A frame the client could not decode is a link problem, not a rejection.
        let category = if message_lower.contains("invalid server event") {
            UiErrorCategory::Transport
        } else if message_lower.contains("not_found")
            || message_lower.contains("not found")
            || message_lower.contains("404")
        {
            UiErrorCategory::NotFound
        } else if message_lower.contains("validation")
            || message_lower.contains("invalid")
            || message_lower.contains("must not be empty")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("connect")
            || message_lower.contains("websocket")
            || message_lower.contains("unavailable")
            || message_lower.contains("lagged")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn summary(&self) -> String {
        let action = match self.context {
            UiErrorContext::LiveQuery => "Live updates",
            UiErrorContext::CreateTodo => "Creating a todo",
            UiErrorContext::DeleteTodo => "Deleting a todo",
        };
        let label = match self.category {
            UiErrorCategory::Transport => "connection problem",
            UiErrorCategory::NotFound => "item no longer exists",
            UiErrorCategory::Validation => "rejected by the service",
            UiErrorCategory::Unknown => "unexpected error",
        };
        format!("{action} failed ({label}): {}", self.message)
    }
}
