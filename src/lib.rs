//! Taskflow - scripted agent task-run simulator
//!
//! The core is a small client-side state machine: a submitted prompt drives
//! a deterministic, time-scheduled sequence of status transitions, reasoning
//! log entries, simulated tool calls, and token accounting. The TUI and the
//! HTTP transport client are collaborators around that contract.

pub mod client;
pub mod controller;
pub mod demo;
pub mod error;
pub mod script;
pub mod state;
pub mod store;
pub mod tools;
pub mod tui;

pub use client::{TaskRequest, TaskflowClient};
pub use controller::RunController;
pub use demo::DemoModeSettings;
pub use error::{FixSuggestion, TaskflowError};
pub use script::{build_script, ScriptAction, ScriptEvent};
pub use state::{LogEntry, LogEntryType, ReasoningLog, RunState, RunStatus, TokenUsage};
pub use store::StateStore;
pub use tools::{ToolCall, ToolCallStatus, ToolId, ToolStatus, ToolStatusKind};
