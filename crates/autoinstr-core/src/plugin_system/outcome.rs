use std::fmt;

/// What happened to one instrumentor during an activation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    Activated,
    SkippedExcluded,
    SkippedIncompatible,
    SkippedMissingDependency,
    SkippedEnvironmentMismatch,
    /// Fatal; the pass stopped here
    Failed,
}

impl ActivationOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            ActivationOutcome::SkippedExcluded
                | ActivationOutcome::SkippedIncompatible
                | ActivationOutcome::SkippedMissingDependency
                | ActivationOutcome::SkippedEnvironmentMismatch
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationOutcome::Activated => "activated",
            ActivationOutcome::SkippedExcluded => "skipped (excluded)",
            ActivationOutcome::SkippedIncompatible => "skipped (incompatible)",
            ActivationOutcome::SkippedMissingDependency => "skipped (missing dependency)",
            ActivationOutcome::SkippedEnvironmentMismatch => "skipped (environment mismatch)",
            ActivationOutcome::Failed => "failed",
        }
    }
}

impl fmt::Display for ActivationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one named instrumentor, with optional diagnostic text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOutcome {
    pub plugin: String,
    pub outcome: ActivationOutcome,
    pub detail: Option<String>,
}

/// Audit trail of an activation pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    outcomes: Vec<PluginOutcome>,
}

impl ActivationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, plugin: &str, outcome: ActivationOutcome, detail: Option<String>) {
        self.outcomes.push(PluginOutcome {
            plugin: plugin.to_string(),
            outcome,
            detail,
        });
    }

    pub fn outcomes(&self) -> &[PluginOutcome] {
        &self.outcomes
    }

    /// Outcome recorded for `plugin`, if it was attempted.
    pub fn outcome_for(&self, plugin: &str) -> Option<ActivationOutcome> {
        self.outcomes.iter().find(|o| o.plugin == plugin).map(|o| o.outcome)
    }

    /// Names of the instrumentors that were activated.
    pub fn activated(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == ActivationOutcome::Activated)
            .map(|o| o.plugin.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl fmt::Display for ActivationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.outcomes.is_empty() {
            return writeln!(f, "No instrumentors attempted.");
        }
        for o in &self.outcomes {
            match &o.detail {
                Some(detail) => writeln!(f, "  - {}: {} ({})", o.plugin, o.outcome, detail)?,
                None => writeln!(f, "  - {}: {}", o.plugin, o.outcome)?,
            }
        }
        Ok(())
    }
}
