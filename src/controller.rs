//! Run controller
//!
//! Drives one task run from submission to a terminal state. All mutation of
//! the live `RunState` flows through here; the presentation layer only ever
//! holds read subscriptions.
//!
//! Cancellation uses a monotonic run generation: `submit` and `reset` bump
//! the counter, and the driver re-checks it inside the store mutation before
//! applying each event. A superseded run's pending events can therefore
//! never corrupt a newer run's state — that is the one real race in the
//! system, and it is covered by integration tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::demo::DemoModeSettings;
use crate::script::{build_script, ScriptEvent};
use crate::state::RunState;
use crate::store::StateStore;

pub struct RunController {
    store: Arc<StateStore>,
    generation: Arc<AtomicU64>,
    run_seq: AtomicU64,
}

impl RunController {
    pub fn new(demo: DemoModeSettings) -> Self {
        Self {
            store: Arc::new(StateStore::new(RunState::idle(demo))),
            generation: Arc::new(AtomicU64::new(0)),
            run_seq: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> RunState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.store.subscribe()
    }

    /// Start a run for `prompt`. Empty submissions are ignored, not errors.
    /// A submit while a run is in flight supersedes it: the previous
    /// timeline's pending events are cancelled before the new baseline is
    /// written. Must be called from within a tokio runtime.
    pub fn submit(&self, prompt: &str) {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let task_id = format!("task-{}", self.run_seq.fetch_add(1, Ordering::SeqCst) + 1);
        info!(task_id = %task_id, "submitting run");

        let demo = self.store.snapshot().demo_mode;
        self.store.update(|state| state.begin_run(task_id));

        match build_script(prompt, &demo) {
            Ok(script) => {
                let store = Arc::clone(&self.store);
                let guard = Arc::clone(&self.generation);
                tokio::spawn(drive(store, guard, generation, script));
            }
            Err(err) => {
                // Setup failure is the only path to a terminal error state.
                self.store.update(|state| state.fail_setup(err.to_string()));
            }
        }
    }

    /// Cancel any in-flight timeline and return to idle. Never errors.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        debug!("run reset");
        self.store.update(|state| state.reset_idle());
    }

    /// Replace the demo-mode configuration. Pure state update; no
    /// scheduling side effects.
    pub fn update_demo_mode(&self, settings: DemoModeSettings) {
        self.store.update(|state| state.apply_demo_mode(settings));
    }
}

/// Single driver loop: pops the next due event, sleeps until its offset,
/// and applies it unless the run has been superseded. The generation check
/// happens inside the store mutation, so check-and-apply is atomic with
/// respect to other mutations.
async fn drive(
    store: Arc<StateStore>,
    generation: Arc<AtomicU64>,
    run_generation: u64,
    script: Vec<ScriptEvent>,
) {
    let start = Instant::now();
    for event in script {
        tokio::time::sleep_until(start + event.offset).await;
        if generation.load(Ordering::SeqCst) != run_generation {
            debug!(run_generation, "run superseded, dropping pending events");
            return;
        }
        let now_ms = event.offset.as_millis() as u64;
        let action = event.action;
        let guard = Arc::clone(&generation);
        store.update(move |state| {
            if guard.load(Ordering::SeqCst) != run_generation {
                return;
            }
            action.apply(state, now_ms);
            debug_assert!(state.counters_consistent());
        });
    }
}

impl std::fmt::Debug for RunController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunController")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RunStatus;

    #[tokio::test]
    async fn empty_prompt_is_ignored() {
        let controller = RunController::new(DemoModeSettings::default());
        controller.submit("   ");
        assert_eq!(controller.snapshot().status, RunStatus::Idle);
    }

    #[tokio::test]
    async fn submit_moves_to_running_before_any_event_fires() {
        let controller = RunController::new(DemoModeSettings::default());
        controller.submit("Build me a landing page");

        let snap = controller.snapshot();
        assert_eq!(snap.status, RunStatus::Running);
        assert_eq!(snap.progress, 0);
        assert!(snap.log.entries.is_empty());
        assert!(snap.log.is_active);
    }

    #[tokio::test]
    async fn demo_mode_update_enforces_invariant() {
        let controller = RunController::new(DemoModeSettings::default());
        controller.update_demo_mode(DemoModeSettings {
            enabled: true,
            external_actions_disabled: false,
            mock_external_calls: true,
            safety_message: None,
        });

        let snap = controller.snapshot();
        assert!(snap.demo_mode.external_actions_disabled);
        assert!(snap.tools.iter().all(|t| t.is_demo_mode));
    }
}
