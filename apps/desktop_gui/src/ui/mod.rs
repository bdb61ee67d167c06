//! UI layer: the single to-do page and its notice board.

pub mod app;
pub mod notices;

pub use app::{StartupConfig, TodoApp};
