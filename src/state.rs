//! Run state data model
//!
//! Exactly one `RunState` is live per task run. It is created on submission,
//! mutated exclusively by the run controller, and discarded (reset to idle)
//! on explicit reset. Everything is `Clone` so the state store can hand out
//! atomic snapshots to readers.

use serde::{Deserialize, Serialize};

use crate::demo::DemoModeSettings;
use crate::tools::{default_registry, ToolCall, ToolId, ToolStatus};

// ─────────────────────────────────────────────────────────────────────────────
// Run status
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token usage
// ─────────────────────────────────────────────────────────────────────────────

/// Token accounting for a run. Field names match the backend wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub estimated_cost: f64,
}

impl TokenUsage {
    /// Flat per-token estimate, mirroring the reference backend.
    pub const COST_PER_TOKEN: f64 = 0.00001;

    pub fn accumulate(&mut self, prompt: u32, completion: u32) {
        self.prompt_tokens += prompt;
        self.completion_tokens += completion;
        self.total_tokens = self.prompt_tokens + self.completion_tokens;
        self.estimated_cost = f64::from(self.total_tokens) * Self::COST_PER_TOKEN;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reasoning log
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEntryType {
    Info,
    Success,
    Error,
    Warning,
    Action,
    Reflection,
}

/// One step in the run narrative. Immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Unique within a log, monotonic in insertion order.
    pub id: u64,
    pub emoji: String,
    pub message: String,
    /// Milliseconds since run start.
    pub timestamp_ms: u64,
    pub kind: LogEntryType,
    pub details: Option<String>,
    pub tool_called: Option<String>,
    pub result: Option<String>,
}

/// Ordered, append-only narrative of a run's steps.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningLog {
    /// Opaque identifier, unique per run.
    pub task_id: String,
    pub entries: Vec<LogEntry>,
    pub current_step: String,
    /// True while the run's scripted timeline has pending events.
    pub is_active: bool,
    next_id: u64,
}

impl ReasoningLog {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            entries: Vec::new(),
            current_step: String::new(),
            is_active: true,
            next_id: 0,
        }
    }

    /// Inactive empty log used before any run has started.
    pub fn inactive() -> Self {
        Self {
            is_active: false,
            ..Self::new("")
        }
    }

    /// Append an entry, assigning the next monotonic id.
    #[allow(clippy::too_many_arguments)]
    pub fn append(
        &mut self,
        timestamp_ms: u64,
        kind: LogEntryType,
        emoji: impl Into<String>,
        message: impl Into<String>,
        details: Option<String>,
        tool_called: Option<String>,
        result: Option<String>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(LogEntry {
            id,
            emoji: emoji.into(),
            message: message.into(),
            timestamp_ms,
            kind,
            details,
            tool_called,
            result,
        });
        id
    }

    pub fn count_of(&self, kind: LogEntryType) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Run state
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of one task run. Single-writer (the controller), read-by-many.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub status: RunStatus,
    /// 0–100.
    pub progress: u8,
    pub message: Option<String>,
    pub token_usage: Option<TokenUsage>,
    pub log: ReasoningLog,
    /// Fixed identity set, dashboard display order.
    pub tools: Vec<ToolStatus>,
    pub tool_calls: Vec<ToolCall>,
    pub demo_mode: DemoModeSettings,
}

impl RunState {
    pub fn idle(demo_mode: DemoModeSettings) -> Self {
        let demo_mode = demo_mode.normalized();
        let tools = default_registry(demo_mode.enabled);
        Self {
            status: RunStatus::Idle,
            progress: 0,
            message: None,
            token_usage: None,
            log: ReasoningLog::inactive(),
            tools,
            tool_calls: Vec::new(),
            demo_mode,
        }
    }

    /// Reset to a fresh running baseline for a new task. Demo-mode settings
    /// survive; everything else starts over.
    pub fn begin_run(&mut self, task_id: impl Into<String>) {
        self.status = RunStatus::Running;
        self.progress = 0;
        self.message = Some("Starting task...".to_string());
        self.token_usage = Some(TokenUsage::default());
        self.log = ReasoningLog::new(task_id);
        self.tools = default_registry(self.demo_mode.enabled);
        self.tool_calls.clear();
    }

    /// Back to idle. Cancellation of pending timeline events is the
    /// controller's job; this only clears the state.
    pub fn reset_idle(&mut self) {
        let demo_mode = self.demo_mode.clone();
        *self = Self::idle(demo_mode);
    }

    /// Setup/scheduling failure: terminal error, log deactivated.
    pub fn fail_setup(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.log.append(
            0,
            LogEntryType::Error,
            "❌",
            format!("Task failed: {error}"),
            None,
            None,
            None,
        );
        self.log.is_active = false;
        self.status = RunStatus::Error;
        self.message = Some(error);
    }

    /// Replace demo-mode settings and propagate the flag to every tool.
    pub fn apply_demo_mode(&mut self, settings: DemoModeSettings) {
        let settings = settings.normalized();
        for tool in &mut self.tools {
            tool.is_demo_mode = settings.enabled;
        }
        self.demo_mode = settings;
    }

    pub fn tool_mut(&mut self, id: ToolId) -> Option<&mut ToolStatus> {
        self.tools.iter_mut().find(|t| t.id == id)
    }

    pub fn tool(&self, id: ToolId) -> Option<&ToolStatus> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Holds after every controller mutation; checked in tests.
    pub fn counters_consistent(&self) -> bool {
        self.tools.iter().all(|t| t.success_count <= t.call_count)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::idle(DemoModeSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_state_is_empty() {
        let state = RunState::default();
        assert_eq!(state.status, RunStatus::Idle);
        assert_eq!(state.progress, 0);
        assert!(state.log.entries.is_empty());
        assert!(!state.log.is_active);
        assert!(state.tool_calls.is_empty());
    }

    #[test]
    fn begin_run_resets_everything_but_demo_mode() {
        let mut state = RunState::default();
        state.progress = 80;
        state.tool_mut(ToolId::Github).unwrap().begin_call(100);

        state.begin_run("task-1");
        assert_eq!(state.status, RunStatus::Running);
        assert_eq!(state.progress, 0);
        assert_eq!(state.log.task_id, "task-1");
        assert!(state.log.is_active);
        assert_eq!(state.token_usage, Some(TokenUsage::default()));
        assert_eq!(state.tool(ToolId::Github).unwrap().call_count, 0);
        assert!(state.demo_mode.enabled);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut state = RunState::default();
        state.begin_run("task-1");
        state.reset_idle();
        let once = state.clone();
        state.reset_idle();
        assert_eq!(state, once);
        assert_eq!(state.status, RunStatus::Idle);
    }

    #[test]
    fn log_ids_are_monotonic() {
        let mut log = ReasoningLog::new("task-1");
        let a = log.append(0, LogEntryType::Info, "🤖", "start", None, None, None);
        let b = log.append(10, LogEntryType::Info, "📝", "prompt", None, None, None);
        assert!(a < b);
        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.entries[0].id, a);
    }

    #[test]
    fn token_usage_total_is_sum() {
        let mut usage = TokenUsage::default();
        usage.accumulate(30, 70);
        usage.accumulate(10, 20);
        assert_eq!(usage.prompt_tokens, 40);
        assert_eq!(usage.completion_tokens, 90);
        assert_eq!(usage.total_tokens, 130);
        assert!((usage.estimated_cost - 130.0 * TokenUsage::COST_PER_TOKEN).abs() < f64::EPSILON);
    }

    #[test]
    fn apply_demo_mode_propagates_flag_to_tools() {
        let mut state = RunState::default();
        state.apply_demo_mode(DemoModeSettings::live());
        assert!(state.tools.iter().all(|t| !t.is_demo_mode));
        assert!(state.demo_mode.external_call_permitted());
    }

    #[test]
    fn fail_setup_is_terminal_and_deactivates_log() {
        let mut state = RunState::default();
        state.begin_run("task-1");
        state.fail_setup("boom");
        assert_eq!(state.status, RunStatus::Error);
        assert!(!state.log.is_active);
        assert_eq!(state.log.count_of(LogEntryType::Error), 1);
        assert_eq!(state.message.as_deref(), Some("boom"));
    }
}
