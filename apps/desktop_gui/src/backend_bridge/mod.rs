//! Bridge between the UI thread and the async runtime that talks to the data service.

pub mod commands;
pub mod runtime;
