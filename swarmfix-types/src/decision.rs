use crate::Domain;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one patch action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchResult {
    /// True if any file touched by the action received new content.
    pub changed: bool,
}

impl PatchResult {
    pub const UNCHANGED: PatchResult = PatchResult { changed: false };
    pub const CHANGED: PatchResult = PatchResult { changed: true };

    pub fn from_changed(changed: bool) -> Self {
        Self { changed }
    }
}

impl std::ops::BitOr for PatchResult {
    type Output = PatchResult;

    fn bitor(self, rhs: Self) -> Self::Output {
        PatchResult {
            changed: self.changed || rhs.changed,
        }
    }
}

impl std::ops::BitOrAssign for PatchResult {
    fn bitor_assign(&mut self, rhs: Self) {
        self.changed |= rhs.changed;
    }
}

impl std::ops::BitOrAssign<bool> for PatchResult {
    fn bitor_assign(&mut self, rhs: bool) {
        self.changed |= rhs;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleState {
    /// Predicate matched; the action was (or will be) invoked.
    Fired,
    /// Predicate evaluated to false.
    Idle,
    /// Filtered out by the rule selection policy; never evaluated.
    Disabled,
}

impl RuleState {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleState::Fired => "fired",
            RuleState::Idle => "idle",
            RuleState::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDecision {
    pub rule: String,
    pub domain: Domain,
    pub state: RuleState,
}

/// Per-rule decisions of one dispatch, in registration order.
///
/// Computed in full before any action runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchDecision {
    #[serde(default)]
    pub rules: Vec<RuleDecision>,
}

impl DispatchDecision {
    pub fn get(&self, rule: &str) -> Option<&RuleDecision> {
        self.rules.iter().find(|d| d.rule == rule)
    }

    /// Whether `rule` fired. Unknown and disabled rules did not.
    pub fn fired(&self, rule: &str) -> bool {
        self.get(rule)
            .map(|d| d.state == RuleState::Fired)
            .unwrap_or(false)
    }

    pub fn any_fired(&self) -> bool {
        self.rules.iter().any(|d| d.state == RuleState::Fired)
    }

    pub fn fired_rules(&self) -> impl Iterator<Item = &RuleDecision> {
        self.rules.iter().filter(|d| d.state == RuleState::Fired)
    }

    /// Rule name → fired, for callers that only care about the yes/no view.
    pub fn as_map(&self) -> BTreeMap<String, bool> {
        self.rules
            .iter()
            .map(|d| (d.rule.clone(), d.state == RuleState::Fired))
            .collect()
    }
}
