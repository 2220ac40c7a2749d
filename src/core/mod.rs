//! Core domain types.
//!
//! The project/feature/task records and the model configuration they are
//! generated from. Everything here is plain data; I/O lives in [`crate::store`]
//! and [`crate::ai`].

mod config;
mod project;

pub use config::{ModelConfig, ModelSelection, ModelType};
pub use project::{Feature, Priority, Project, Task, TaskStatus};
