//! Demo-mode policy
//!
//! Demo mode is a safety configuration, not a cosmetic toggle: while
//! `external_actions_disabled` is true, no component may perform a genuine
//! network call to GitHub/Slack/OpenAI or touch the real filesystem. The
//! simulation engine performs none by construction; the wording helpers here
//! decide how simulated outcomes are labelled.

/// Marker appended to tool-call labels when external actions are disabled.
pub const SIMULATED_MARKER: &str = "(SIMULATED)";

/// Safety / demo-mode configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoModeSettings {
    pub enabled: bool,
    pub external_actions_disabled: bool,
    pub mock_external_calls: bool,
    pub safety_message: Option<String>,
}

impl Default for DemoModeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            external_actions_disabled: true,
            mock_external_calls: true,
            safety_message: Some(
                "Demo mode enabled - external actions will be simulated".to_string(),
            ),
        }
    }
}

impl DemoModeSettings {
    /// Settings with demo mode off: external actions permitted.
    pub fn live() -> Self {
        Self {
            enabled: false,
            external_actions_disabled: false,
            mock_external_calls: false,
            safety_message: None,
        }
    }

    /// Apply the safety invariant: enabling demo mode forces
    /// `external_actions_disabled` on. Every settings update goes through
    /// here before it reaches the state store.
    pub fn normalized(mut self) -> Self {
        if self.enabled {
            self.external_actions_disabled = true;
        }
        self
    }

    /// Whether a genuine external call may be attempted at all.
    pub fn external_call_permitted(&self) -> bool {
        !self.external_actions_disabled
    }

    /// Whether simulated tool outcomes should carry the SIMULATED marker.
    pub fn simulated(&self) -> bool {
        self.external_actions_disabled
    }

    /// Suffix a tool-call label with the SIMULATED marker when applicable.
    pub fn mark(&self, label: &str) -> String {
        if self.simulated() {
            format!("{label} {SIMULATED_MARKER}")
        } else {
            label.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabling_forces_external_actions_disabled() {
        let settings = DemoModeSettings {
            enabled: true,
            external_actions_disabled: false,
            mock_external_calls: false,
            safety_message: None,
        }
        .normalized();

        assert!(settings.external_actions_disabled);
        assert!(!settings.external_call_permitted());
    }

    #[test]
    fn disabled_demo_mode_keeps_external_actions() {
        let settings = DemoModeSettings::live().normalized();
        assert!(!settings.enabled);
        assert!(settings.external_call_permitted());
    }

    #[test]
    fn mark_appends_marker_only_when_simulated() {
        let demo = DemoModeSettings::default();
        assert_eq!(demo.mark("GitHub API"), "GitHub API (SIMULATED)");

        let live = DemoModeSettings::live();
        assert_eq!(live.mark("GitHub API"), "GitHub API");
    }
}
