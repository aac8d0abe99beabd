//! TUI application - main entry point and run loop

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::watch;

use super::theme::TaskflowTheme;
use crate::controller::RunController;
use crate::demo::DemoModeSettings;
use crate::state::RunState;

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Quit,
    Submit,
    Reset,
    ToggleDemo,
    Edited,
    None,
}

/// Translate a key event into a UI action, editing the prompt buffer in
/// place. Pure with respect to everything else, so it is unit-testable.
pub fn handle_key(key: KeyEvent, input: &mut String) -> UiAction {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Esc) => UiAction::Quit,
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => UiAction::Reset,
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => UiAction::ToggleDemo,
        (_, KeyCode::Enter) => UiAction::Submit,
        (_, KeyCode::Backspace) => {
            input.pop();
            UiAction::Edited
        }
        (mods, KeyCode::Char(c)) if !mods.contains(KeyModifiers::CONTROL) => {
            input.push(c);
            UiAction::Edited
        }
        _ => UiAction::None,
    }
}

/// Flip demo mode between the two canonical presets, so the toggle and the
/// `--live` flag always agree on what "live" means.
fn toggle_demo(current: &DemoModeSettings) -> DemoModeSettings {
    if current.enabled {
        DemoModeSettings::live()
    } else {
        DemoModeSettings::default()
    }
}

pub struct TuiApp {
    controller: RunController,
    rx: watch::Receiver<RunState>,
    input: String,
    theme: TaskflowTheme,
}

impl TuiApp {
    pub fn new(demo: DemoModeSettings) -> Self {
        let controller = RunController::new(demo);
        let rx = controller.subscribe();
        Self {
            controller,
            rx,
            input: String::new(),
            theme: TaskflowTheme::new(),
        }
    }

    /// Run the dashboard, submitting `initial_prompt` immediately.
    pub async fn run(mut self, initial_prompt: &str) -> anyhow::Result<()> {
        let mut terminal = setup_terminal()?;
        self.controller.submit(initial_prompt);

        let result = self.main_loop(&mut terminal).await;
        restore_terminal(&mut terminal)?;
        result
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let tick_rate = Duration::from_millis(33);

        loop {
            let snapshot = self.rx.borrow().clone();
            terminal.draw(|frame| self.render(frame, &snapshot))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    match handle_key(key, &mut self.input) {
                        UiAction::Quit => break,
                        UiAction::Submit => {
                            if !self.input.trim().is_empty() {
                                let prompt = std::mem::take(&mut self.input);
                                self.controller.submit(&prompt);
                            }
                        }
                        UiAction::Reset => self.controller.reset(),
                        UiAction::ToggleDemo => {
                            self.controller
                                .update_demo_mode(toggle_demo(&snapshot.demo_mode));
                        }
                        UiAction::Edited | UiAction::None => {}
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&self, frame: &mut Frame, state: &RunState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Prompt input
                Constraint::Min(10),   // Content
                Constraint::Length(3), // Status bar
                Constraint::Length(1), // Footer
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0], state);
        self.render_input(frame, chunks[1]);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(chunks[2]);

        self.render_log(frame, content[0], state);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(6)])
            .split(content[1]);

        self.render_session(frame, right[0], state);
        self.render_tools(frame, right[1], state);

        self.render_status_bar(frame, chunks[3], state);
        self.render_footer(frame, chunks[4]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, state: &RunState) {
        let demo_label = if state.demo_mode.enabled {
            Span::styled("DEMO MODE", self.theme.entry_style(crate::state::LogEntryType::Warning))
        } else {
            Span::styled("LIVE", self.theme.dimmed())
        };

        let header = Line::from(vec![
            Span::styled("🛡 TASKFLOW", self.theme.header()),
            Span::raw("  │  "),
            Span::styled(
                state.status.to_string().to_uppercase(),
                self.theme.status_style(state.status),
            ),
            Span::raw("  │  "),
            demo_label,
            Span::raw("  │  "),
            Span::styled(
                if state.log.task_id.is_empty() {
                    "no task".to_string()
                } else {
                    state.log.task_id.clone()
                },
                self.theme.accent(),
            ),
        ]);

        let block = Block::default().borders(Borders::ALL).title(" AGENT DASHBOARD ");
        frame.render_widget(Paragraph::new(header).block(block), area);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let input = Line::from(vec![
            Span::styled("> ", self.theme.accent()),
            Span::styled(&self.input, self.theme.text()),
            Span::styled("█", self.theme.dimmed()),
        ]);
        let block = Block::default().borders(Borders::ALL).title(" NEW TASK ");
        frame.render_widget(Paragraph::new(input).block(block), area);
    }

    fn render_log(&self, frame: &mut Frame, area: Rect, state: &RunState) {
        let capacity = area.height.saturating_sub(2) as usize;
        let entries = &state.log.entries;
        let skip = entries.len().saturating_sub(capacity);

        let lines: Vec<Line> = entries
            .iter()
            .skip(skip)
            .map(|entry| {
                let mut spans = vec![
                    Span::styled(format!("{:>6}ms ", entry.timestamp_ms), self.theme.dimmed()),
                    Span::raw(format!("{} ", entry.emoji)),
                    Span::styled(entry.message.clone(), self.theme.entry_style(entry.kind)),
                ];
                if let Some(tool) = &entry.tool_called {
                    spans.push(Span::styled(format!("  [{tool}]"), self.theme.dimmed()));
                }
                Line::from(spans)
            })
            .collect();

        let title = if state.log.is_active {
            " 🧠 REASONING LOG ● LIVE "
        } else {
            " 🧠 REASONING LOG "
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_session(&self, frame: &mut Frame, area: Rect, state: &RunState) {
        let usage = state.token_usage.unwrap_or_default();
        let lines = vec![
            Line::from(vec![
                Span::raw("  Step:   "),
                Span::styled(state.log.current_step.clone(), self.theme.accent()),
            ]),
            Line::from(vec![
                Span::raw("  Tokens: "),
                Span::styled(
                    format!(
                        "{} ({} + {})",
                        usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
                    ),
                    self.theme.text(),
                ),
            ]),
            Line::from(vec![
                Span::raw("  Cost:   "),
                Span::styled(format!("${:.4}", usage.estimated_cost), self.theme.text()),
            ]),
            Line::from(vec![
                Span::raw("  Calls:  "),
                Span::styled(format!("{}", state.tool_calls.len()), self.theme.text()),
            ]),
        ];

        let block = Block::default().borders(Borders::ALL).title(" 📊 SESSION ");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_tools(&self, frame: &mut Frame, area: Rect, state: &RunState) {
        let mut lines = Vec::with_capacity(state.tools.len() * 2);
        for tool in &state.tools {
            let mut spans = vec![
                Span::raw(format!("  {} ", tool.id.icon())),
                Span::styled(format!("{:<12}", tool.id.name()), self.theme.text()),
                Span::styled(tool.status.icon(), self.theme.tool_style(tool.status)),
                Span::styled(
                    format!("  {}/{} ok", tool.success_count, tool.call_count),
                    self.theme.dimmed(),
                ),
            ];
            if !tool.is_configured {
                spans.push(Span::styled("  not configured", self.theme.dimmed()));
            }
            lines.push(Line::from(spans));
            if let Some(error) = &tool.error_message {
                lines.push(Line::from(Span::styled(
                    format!("      {error}"),
                    self.theme.tool_style(crate::tools::ToolStatusKind::Error),
                )));
            }
        }

        let block = Block::default().borders(Borders::ALL).title(" 🔧 TOOLS ");
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, state: &RunState) {
        let label = state
            .message
            .clone()
            .unwrap_or_else(|| "Waiting for a task...".to_string());
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" STATUS "))
            .gauge_style(self.theme.status_style(state.status))
            .percent(u16::from(state.progress))
            .label(format!("{label} ({}%)", state.progress));
        frame.render_widget(gauge, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let help = Line::from(vec![
            Span::styled(" [Enter]", self.theme.accent()),
            Span::styled(" submit  ", self.theme.dimmed()),
            Span::styled("[Ctrl+R]", self.theme.accent()),
            Span::styled(" reset  ", self.theme.dimmed()),
            Span::styled("[Ctrl+D]", self.theme.accent()),
            Span::styled(" demo mode  ", self.theme.dimmed()),
            Span::styled("[Esc]", self.theme.accent()),
            Span::styled(" quit", self.theme.dimmed()),
        ]);
        frame.render_widget(Paragraph::new(help), area);
    }
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
