//! # Ideaboard
//!
//! Turn a one-line idea into a structured project - PRD, feature list and
//! task breakdown - with your favorite LLM, then manage it as a kanban
//! board from the terminal.
//!
//! ## Features
//!
//! - **Four-stage generation**: PRD, features, tasks, assembled project
//! - **Local or hosted models**: Ollama out of the box, plus OpenAI,
//!   Anthropic, DeepSeek and other hosted providers
//! - **Graceful degradation**: unusable model output degrades to
//!   deterministic placeholders instead of failing the run
//! - **Optimistic board mutations**: changes persist before they become
//!   visible; a failed write never leaves a half-applied board
//!
//! ## Quick Start
//!
//! ```bash
//! # Install
//! cargo install ideaboard
//!
//! # Generate a project from an idea (uses local Ollama by default)
//! ideaboard generate "habit tracker web app"
//!
//! # Work the board
//! ideaboard board <project>
//! ideaboard move <project> task-1-1 doing
//! ```

#![forbid(unsafe_code)]

pub mod ai;
pub mod board;
pub mod core;
pub mod providers;
pub mod store;

pub use ai::{
    extract_json, CancelToken, Completer, CompletionClient, CompletionError, GeneratedProject,
    GenerationPipeline, GenerationStep, JsonShape, Locale, PipelineError, StepStatus,
};
pub use board::{apply_mutation, BoardEngine, Mutation, PersistError, UNASSIGNED_FID};
pub use core::{Feature, ModelConfig, ModelSelection, ModelType, Priority, Project, Task, TaskStatus};
pub use store::{JsonFileStore, MemoryStore, ProjectStore, StoreError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "ideaboard";
