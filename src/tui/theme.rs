//! Dashboard theme
//!
//! Neutral dark palette; entry and tool colors follow the reference UI
//! (green success, red error, yellow warning, blue action, purple
//! reflection).

use ratatui::style::{Color, Modifier, Style};

use crate::state::{LogEntryType, RunStatus};
use crate::tools::ToolStatusKind;

pub struct TaskflowTheme {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub action: Color,
    pub reflection: Color,
}

impl Default for TaskflowTheme {
    fn default() -> Self {
        Self {
            text: Color::Rgb(230, 237, 243),
            dim: Color::Rgb(128, 128, 128),
            accent: Color::Rgb(0, 180, 216),
            success: Color::Rgb(63, 185, 80),
            warning: Color::Rgb(210, 153, 34),
            error: Color::Rgb(248, 81, 73),
            action: Color::Rgb(88, 166, 255),
            reflection: Color::Rgb(163, 113, 247),
        }
    }
}

impl TaskflowTheme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn dimmed(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn header(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn entry_style(&self, kind: LogEntryType) -> Style {
        let color = match kind {
            LogEntryType::Info => self.text,
            LogEntryType::Success => self.success,
            LogEntryType::Error => self.error,
            LogEntryType::Warning => self.warning,
            LogEntryType::Action => self.action,
            LogEntryType::Reflection => self.reflection,
        };
        Style::default().fg(color)
    }

    pub fn status_style(&self, status: RunStatus) -> Style {
        let style = match status {
            RunStatus::Idle => Style::default().fg(self.dim),
            RunStatus::Running => Style::default().fg(self.accent),
            RunStatus::Completed => Style::default().fg(self.success),
            RunStatus::Error => Style::default().fg(self.error),
        };
        style.add_modifier(Modifier::BOLD)
    }

    pub fn tool_style(&self, kind: ToolStatusKind) -> Style {
        let color = match kind {
            ToolStatusKind::Available | ToolStatusKind::Success => self.success,
            ToolStatusKind::InUse => self.action,
            ToolStatusKind::Error => self.error,
            ToolStatusKind::Disabled => self.dim,
            ToolStatusKind::NotConfigured => self.warning,
        };
        Style::default().fg(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_styles_distinguish_reflection() {
        let theme = TaskflowTheme::new();
        assert_ne!(
            theme.entry_style(LogEntryType::Reflection),
            theme.entry_style(LogEntryType::Info)
        );
    }

    #[test]
    fn unconfigured_tools_render_as_warning() {
        let theme = TaskflowTheme::new();
        assert_eq!(
            theme.tool_style(ToolStatusKind::NotConfigured).fg,
            Some(theme.warning)
        );
    }
}
