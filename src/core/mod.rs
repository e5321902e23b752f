//! 核心编排层：错误类型、状态投影、主控循环

pub mod error;
pub mod orchestrator;
pub mod state;

pub use error::AgentError;
pub use orchestrator::{create_console, spawn_console, Command};
pub use state::{AgentPhase, UiState};
