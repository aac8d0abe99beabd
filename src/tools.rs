//! Tool registry
//!
//! The simulated external tools are a fixed identity set. Per-tool usage
//! counters reset at the start of every run; `is_configured` is fixed per
//! identity (Slack is permanently unconfigured in the reference scenario,
//! which is what makes its scripted failure plausible).

// ─────────────────────────────────────────────────────────────────────────────
// Tool identity
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolId {
    Github,
    Slack,
    Openai,
    Filesystem,
}

impl ToolId {
    /// All tools, in dashboard display order.
    pub const ALL: [ToolId; 4] = [
        ToolId::Github,
        ToolId::Slack,
        ToolId::Openai,
        ToolId::Filesystem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Slack => "slack",
            Self::Openai => "openai",
            Self::Filesystem => "filesystem",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Github => "GitHub",
            Self::Slack => "Slack",
            Self::Openai => "OpenAI",
            Self::Filesystem => "File System",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Github => "🐙",
            Self::Slack => "💬",
            Self::Openai => "🤖",
            Self::Filesystem => "📁",
        }
    }

    /// Fixed per identity; never reset between runs.
    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::Slack)
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool status
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatusKind {
    Available,
    InUse,
    Success,
    Error,
    Disabled,
    NotConfigured,
}

impl ToolStatusKind {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Available | Self::Success => "✅",
            Self::InUse => "🔄",
            Self::Error => "❌",
            Self::Disabled => "⏸️",
            Self::NotConfigured => "⚠️",
        }
    }
}

/// Per-tool aggregate usage/health record, reset each run.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolStatus {
    pub id: ToolId,
    pub status: ToolStatusKind,
    pub call_count: u32,
    pub success_count: u32,
    pub is_configured: bool,
    pub is_demo_mode: bool,
    /// Milliseconds since run start.
    pub last_used_ms: Option<u64>,
    pub error_message: Option<String>,
}

impl ToolStatus {
    /// Fresh start-of-run baseline for one tool.
    pub fn baseline(id: ToolId, is_demo_mode: bool) -> Self {
        let status = if id.is_configured() {
            ToolStatusKind::Available
        } else {
            ToolStatusKind::NotConfigured
        };
        Self {
            id,
            status,
            call_count: 0,
            success_count: 0,
            is_configured: id.is_configured(),
            is_demo_mode,
            last_used_ms: None,
            error_message: None,
        }
    }

    /// A call has started: counts one attempt and marks the tool busy.
    pub fn begin_call(&mut self, now_ms: u64) {
        self.status = ToolStatusKind::InUse;
        self.call_count += 1;
        self.last_used_ms = Some(now_ms);
        self.error_message = None;
    }

    pub fn record_success(&mut self, now_ms: u64) {
        self.status = ToolStatusKind::Success;
        self.success_count += 1;
        self.last_used_ms = Some(now_ms);
        debug_assert!(self.success_count <= self.call_count);
    }

    pub fn record_failure(&mut self, now_ms: u64, error: impl Into<String>) {
        self.status = ToolStatusKind::Error;
        self.last_used_ms = Some(now_ms);
        self.error_message = Some(error.into());
    }

    /// Success rate in percent, 0 when the tool was never called.
    pub fn success_rate(&self) -> u32 {
        if self.call_count == 0 {
            return 0;
        }
        (self.success_count * 100) / self.call_count
    }
}

/// The fixed registry in display order, reset to baseline.
pub fn default_registry(is_demo_mode: bool) -> Vec<ToolStatus> {
    ToolId::ALL
        .iter()
        .map(|id| ToolStatus::baseline(*id, is_demo_mode))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool calls
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallStatus {
    Pending,
    Running,
    Success,
    Error,
}

/// One simulated tool invocation, append-only per run.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub tool_id: ToolId,
    pub tool_name: String,
    pub action: String,
    pub timestamp_ms: u64,
    pub status: ToolCallStatus,
    pub result: Option<String>,
    pub error: Option<String>,
    pub duration_ms: Option<u64>,
}

impl ToolCall {
    pub fn pending(tool_id: ToolId, action: impl Into<String>, now_ms: u64) -> Self {
        Self {
            tool_id,
            tool_name: tool_id.name().to_string(),
            action: action.into(),
            timestamp_ms: now_ms,
            status: ToolCallStatus::Pending,
            result: None,
            error: None,
            duration_ms: None,
        }
    }

    pub fn succeed(&mut self, result: impl Into<String>, now_ms: u64) {
        self.status = ToolCallStatus::Success;
        self.result = Some(result.into());
        self.duration_ms = Some(now_ms.saturating_sub(self.timestamp_ms));
    }

    pub fn fail(&mut self, error: impl Into<String>, now_ms: u64) {
        self.status = ToolCallStatus::Error;
        self.error = Some(error.into());
        self.duration_ms = Some(now_ms.saturating_sub(self.timestamp_ms));
    }
}
