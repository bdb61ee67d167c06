//! Controller layer: backend-to-UI events, error modeling, and command orchestration.

pub mod events;
pub mod orchestration;
