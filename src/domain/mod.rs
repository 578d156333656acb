//! Domain layer - pure business logic, no I/O beyond the AI gateway port.

pub mod conversation;
pub mod foundation;
pub mod gateway;
pub mod jobs;
pub mod matching;
