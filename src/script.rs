//! Scripted run timeline
//!
//! The simulation is a declarative, ordered queue of `{offset, action}`
//! events built once per submission and drained by a single driver loop.
//! Offsets are strictly increasing, so log order is deterministic regardless
//! of timer jitter — there are no chained timers that could reorder under
//! load. The script tells a fixed failure-and-recovery story: the GitHub
//! call succeeds, the Slack call fails on authentication, the agent reflects
//! and routes around it, then OpenAI and the local filesystem finish the
//! degraded plan.

use std::time::Duration;

use rand::Rng;

use crate::demo::DemoModeSettings;
use crate::error::TaskflowError;
use crate::state::{LogEntryType, RunState, RunStatus, TokenUsage};
use crate::tools::{ToolCall, ToolId};

/// How long a full scripted run takes.
pub const SCRIPT_DURATION: Duration = Duration::from_millis(8000);

/// Prompt echo is clipped to this many characters in the log.
const PROMPT_ECHO_LIMIT: usize = 50;

/// Progress/token cadence period.
const TICK_MS: u64 = 400;

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// One log entry to append, plus an optional current-step label.
#[derive(Debug, Clone)]
pub struct Narration {
    pub kind: LogEntryType,
    pub emoji: &'static str,
    pub message: String,
    pub details: Option<String>,
    pub tool_called: Option<String>,
    pub result: Option<String>,
    pub step: Option<&'static str>,
}

impl Narration {
    fn new(kind: LogEntryType, emoji: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            emoji,
            message: message.into(),
            details: None,
            tool_called: None,
            result: None,
            step: None,
        }
    }

    fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn tool_called(mut self, label: impl Into<String>) -> Self {
        self.tool_called = Some(label.into());
        self
    }

    fn result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    fn step(mut self, step: &'static str) -> Self {
        self.step = Some(step);
        self
    }
}

/// A scheduled mutation of the run state.
#[derive(Debug, Clone)]
pub enum ScriptAction {
    Narrate(Narration),
    ToolBegin {
        tool: ToolId,
        action: String,
        narration: Narration,
    },
    ToolSuccess {
        tool: ToolId,
        result: String,
        narration: Narration,
    },
    /// A call that begins and fails in one step: the attempt is still
    /// counted and recorded in the append-only call list.
    ToolFailure {
        tool: ToolId,
        action: String,
        error: String,
        narration: Narration,
    },
    /// Periodic progress/token cadence; usage snapshots are accumulated at
    /// build time so applying an event stays O(1).
    Tick { progress: u8, usage: TokenUsage },
    Finish {
        narration: Narration,
        usage: TokenUsage,
    },
}

#[derive(Debug, Clone)]
pub struct ScriptEvent {
    pub offset: Duration,
    pub action: ScriptAction,
}

impl ScriptAction {
    /// Apply this event to the live run state. `now_ms` is the event's own
    /// offset from run start, which keeps replays deterministic.
    pub fn apply(self, state: &mut RunState, now_ms: u64) {
        match self {
            Self::Narrate(n) => narrate(state, n, now_ms),
            Self::ToolBegin {
                tool,
                action,
                narration,
            } => {
                if let Some(status) = state.tool_mut(tool) {
                    status.begin_call(now_ms);
                }
                state.tool_calls.push(ToolCall::pending(tool, action, now_ms));
                narrate(state, narration, now_ms);
            }
            Self::ToolSuccess {
                tool,
                result,
                narration,
            } => {
                if let Some(call) = last_call_mut(state, tool) {
                    call.succeed(result, now_ms);
                }
                if let Some(status) = state.tool_mut(tool) {
                    status.record_success(now_ms);
                }
                narrate(state, narration, now_ms);
            }
            Self::ToolFailure {
                tool,
                action,
                error,
                narration,
            } => {
                if let Some(status) = state.tool_mut(tool) {
                    status.begin_call(now_ms);
                    status.record_failure(now_ms, error.clone());
                }
                let mut call = ToolCall::pending(tool, action, now_ms);
                call.fail(error, now_ms);
                state.tool_calls.push(call);
                narrate(state, narration, now_ms);
            }
            Self::Tick { progress, usage } => {
                state.progress = state.progress.max(progress);
                state.token_usage = Some(usage);
                state.message = Some(format!("Processing... {}%", state.progress));
            }
            Self::Finish { narration, usage } => {
                narrate(state, narration, now_ms);
                state.status = RunStatus::Completed;
                state.progress = 100;
                state.token_usage = Some(usage);
                state.message = Some("Task completed with adjustments".to_string());
                state.log.is_active = false;
            }
        }
    }
}

fn narrate(state: &mut RunState, n: Narration, now_ms: u64) {
    if let Some(step) = n.step {
        state.log.current_step = step.to_string();
    }
    state
        .log
        .append(now_ms, n.kind, n.emoji, n.message, n.details, n.tool_called, n.result);
}

fn last_call_mut(state: &mut RunState, tool: ToolId) -> Option<&mut ToolCall> {
    state
        .tool_calls
        .iter_mut()
        .rev()
        .find(|c| c.tool_id == tool)
}

// ─────────────────────────────────────────────────────────────────────────────
// Script builder
// ─────────────────────────────────────────────────────────────────────────────

/// Build the fixed timeline for one submission. Wording (the SIMULATED
/// suffixes) is decided here from the demo-mode settings in force at
/// submission time.
pub fn build_script(
    prompt: &str,
    demo: &DemoModeSettings,
) -> Result<Vec<ScriptEvent>, TaskflowError> {
    let mut events = Vec::with_capacity(40);
    let mut at = |ms: u64, action: ScriptAction| {
        events.push(ScriptEvent {
            offset: Duration::from_millis(ms),
            action,
        });
    };

    // Narrative track. None of these offsets may land on a TICK_MS multiple.
    at(
        300,
        ScriptAction::Narrate(
            Narration::new(LogEntryType::Info, "🤖", "Agent starting...").step("Starting"),
        ),
    );
    at(
        700,
        ScriptAction::Narrate(
            Narration::new(LogEntryType::Info, "📝", "Prompt received")
                .details(truncate_prompt(prompt))
                .step("Reading prompt"),
        ),
    );
    if demo.enabled {
        at(
            1000,
            ScriptAction::Narrate(Narration::new(
                LogEntryType::Info,
                "🛡️",
                "Demo mode active - external actions will be simulated",
            )),
        );
    }
    at(
        1500,
        ScriptAction::Narrate(
            Narration::new(LogEntryType::Info, "🧠", "Planning approach...").step("Planning"),
        ),
    );
    at(
        1900,
        ScriptAction::Narrate(
            Narration::new(LogEntryType::Success, "📋", "Plan created").details(
                "1. Create GitHub repository\n\
                 2. Generate content with OpenAI\n\
                 3. Post notification to Slack",
            ),
        ),
    );

    at(
        2500,
        ScriptAction::ToolBegin {
            tool: ToolId::Github,
            action: "create_repository".to_string(),
            narration: Narration::new(LogEntryType::Action, "🐙", "Creating GitHub repository")
                .tool_called(demo.mark("GitHub API"))
                .step("Executing plan"),
        },
    );
    at(
        3000,
        ScriptAction::ToolSuccess {
            tool: ToolId::Github,
            result: "Repository 'taskflow-demo' created".to_string(),
            narration: Narration::new(LogEntryType::Success, "✅", "GitHub repository created")
                .result(demo.mark("Repository 'taskflow-demo' created")),
        },
    );

    at(
        3500,
        ScriptAction::ToolFailure {
            tool: ToolId::Slack,
            action: "post_notification".to_string(),
            error: "Authentication failed: invalid webhook token".to_string(),
            narration: Narration::new(LogEntryType::Warning, "⚠️", "Slack notification failed")
                .details("Authentication failed: invalid webhook token")
                .tool_called("Slack webhook".to_string()),
        },
    );
    at(
        4100,
        ScriptAction::Narrate(
            Narration::new(LogEntryType::Reflection, "🤔", "Reflection: analyzing failure")
                .details(
                    "The Slack call failed because the webhook token is not \
                     configured. The failure is recoverable: the notification \
                     is not on the critical path.",
                )
                .step("Reflecting"),
        ),
    );
    at(
        4700,
        ScriptAction::Narrate(
            Narration::new(LogEntryType::Reflection, "🔄", "Adjusting plan").details(
                "1. Create GitHub repository - done\n\
                 2. Generate content with OpenAI - next\n\
                 3. Post notification to Slack - skipped (authentication failed)\n\
                 Added: write a summary to a local file instead",
            ),
        ),
    );

    at(
        5300,
        ScriptAction::ToolBegin {
            tool: ToolId::Openai,
            action: "generate_content".to_string(),
            narration: Narration::new(LogEntryType::Action, "🤖", "Generating content with OpenAI")
                .tool_called("OpenAI API".to_string())
                .step("Generating content"),
        },
    );
    at(
        5900,
        ScriptAction::ToolSuccess {
            tool: ToolId::Openai,
            result: "Content generated (412 words)".to_string(),
            narration: Narration::new(LogEntryType::Success, "✨", "Content generated")
                .result("Content generated (412 words)".to_string()),
        },
    );

    at(
        6300,
        ScriptAction::ToolBegin {
            tool: ToolId::Filesystem,
            action: "write_summary".to_string(),
            narration: Narration::new(LogEntryType::Action, "📁", "Writing summary to local file")
                .tool_called(demo.mark("File System"))
                .step("Writing summary"),
        },
    );
    at(
        6900,
        ScriptAction::ToolSuccess {
            tool: ToolId::Filesystem,
            result: "Summary written to ./taskflow-summary.md".to_string(),
            narration: Narration::new(LogEntryType::Success, "💾", "Summary written")
                .result(demo.mark("Summary written to ./taskflow-summary.md")),
        },
    );

    // Progress/token cadence, interleaved on its own period.
    let mut rng = rand::thread_rng();
    let mut usage = TokenUsage::default();
    let ticks = (SCRIPT_DURATION.as_millis() as u64 / TICK_MS) - 1;
    for k in 1..=ticks {
        usage.accumulate(rng.gen_range(20..80), rng.gen_range(60..180));
        at(
            k * TICK_MS,
            ScriptAction::Tick {
                progress: (k * 5).min(95) as u8,
                usage,
            },
        );
    }

    at(
        SCRIPT_DURATION.as_millis() as u64,
        ScriptAction::Finish {
            narration: Narration::new(
                LogEntryType::Success,
                "🎉",
                "Task completed with adjustments",
            )
            .details(
                "The plan was adjusted after the Slack failure; all remaining \
                 steps completed successfully.",
            )
            .step("Completed"),
            usage,
        },
    );

    events.sort_by_key(|e| e.offset);
    for pair in events.windows(2) {
        if pair[1].offset <= pair[0].offset {
            return Err(TaskflowError::Schedule(format!(
                "timeline offsets must strictly increase ({:?} then {:?})",
                pair[0].offset, pair[1].offset
            )));
        }
    }
    Ok(events)
}

fn truncate_prompt(prompt: &str) -> String {
    let mut echo: String = prompt.chars().take(PROMPT_ECHO_LIMIT).collect();
    if prompt.chars().count() > PROMPT_ECHO_LIMIT {
        echo.push_str("...");
    }
    echo
}
