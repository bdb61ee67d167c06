//! Command dispatch results: the optimistic notice shown right away, and the
//! real outcome for callers that want it.

use std::fmt;

use thiserror::Error;
use tokio::task::JoinHandle;

pub const CREATED_NOTICE: &str = "Todo created!";
pub const DELETED_NOTICE: &str = "Todo deleted!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Create,
    Delete,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failed: {reason}")]
pub struct CommandFailure {
    pub kind: CommandKind,
    pub reason: String,
}

pub type CommandOutcome = Result<(), CommandFailure>;

/// An in-flight create or delete. Dropping it does not cancel the request.
pub struct PendingCommand {
    kind: CommandKind,
    handle: JoinHandle<CommandOutcome>,
}

impl PendingCommand {
    pub(crate) fn new(kind: CommandKind, handle: JoinHandle<CommandOutcome>) -> Self {
        Self { kind, handle }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn outcome(self) -> CommandOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => Err(CommandFailure {
                kind: self.kind,
                reason: format!("command task did not complete: {err}"),
            }),
        }
    }
}

pub struct Dispatched {
    pub notice: Notice,
    pub pending: PendingCommand,
}

/// Prompt text to create from. Cancelled (`None`) and empty input create nothing.
pub fn prompt_content(input: Option<&str>) -> Option<String> {
    match input {
        Some(text) if !text.is_empty() => Some(text.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_and_empty_prompts_yield_nothing() {
        assert_eq!(prompt_content(None), None);
        assert_eq!(prompt_content(Some("")), None);
        assert_eq!(
            prompt_content(Some("Buy milk")),
            Some("Buy milk".to_string())
        );
    }

    #[test]
    fn failure_message_names_the_command() {
        let failure = CommandFailure {
            kind: CommandKind::Delete,
            reason: "not_found: todo 3 not found".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "delete failed: not_found: todo 3 not found"
        );
    }
}
