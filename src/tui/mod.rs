//! TUI module - agent run dashboard
//!
//! Presentation layer over the run controller. Strictly a reader of the
//! state store: every user intent (submit, reset, toggle demo mode) flows
//! back through controller operations, never by mutating state directly.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │   UI (app.rs)  - renders RunState snapshots      │
//! └──────────────────────────────────────────────────┘
//!              ▲ watch::Receiver<RunState>
//! ┌──────────────────────────────────────────────────┐
//! │   RunController - owns all mutation + scheduling │
//! └──────────────────────────────────────────────────┘
//! ```

mod app;
mod theme;

pub use app::{handle_key, TuiApp, UiAction};
pub use theme::TaskflowTheme;

use crate::demo::DemoModeSettings;

/// Run the dashboard for a prompt.
pub async fn run(prompt: &str, demo: DemoModeSettings) -> anyhow::Result<()> {
    let app = TuiApp::new(demo);
    app.run(prompt).await
}
