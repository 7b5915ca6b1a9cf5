use crate::layout::RepoLayout;
use crate::rules::{Rule, RuleContext, builtin_rules};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use swarmfix_edit::Workspace;
use swarmfix_logs::LogBuffers;
use swarmfix_types::Domain;
use swarmfix_types::decision::{DispatchDecision, PatchResult, RuleDecision, RuleState};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Rule selection policy: glob patterns (`*`, `?`) over rule names.
///
/// A rule matching any `deny` pattern is disabled. A non-empty `allow` list disables every
/// rule it does not match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

impl DispatcherConfig {
    pub fn is_enabled(&self, rule: &str) -> bool {
        if self.deny.iter().any(|pat| glob_match(pat, rule)) {
            return false;
        }
        self.allow.is_empty() || self.allow.iter().any(|pat| glob_match(pat, rule))
    }
}

/// Result of one fired rule's action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRun {
    pub rule: String,
    pub result: PatchResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub decision: DispatchDecision,
    pub runs: Vec<RuleRun>,
}

impl DispatchOutcome {
    pub fn actions_ran(&self) -> bool {
        !self.runs.is_empty()
    }

    pub fn any_changed(&self) -> bool {
        self.runs.iter().any(|r| r.result.changed)
    }
}

/// A rule's action failed. The run stops at the failing rule.
///
/// Carries the full decision set (computed before any action ran) and the actions that
/// completed before the failure.
#[derive(Debug, Error)]
#[error("rule `{rule}` failed: {source:#}")]
pub struct DispatchError {
    pub rule: String,
    pub decision: DispatchDecision,
    pub completed: Vec<RuleRun>,
    #[source]
    pub source: anyhow::Error,
}

/// Two fired rules declaring overlapping paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub first: String,
    pub second: String,
    pub path: Utf8PathBuf,
}

pub struct Dispatcher {
    rules: Vec<Box<dyn Rule>>,
    config: DispatcherConfig,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            rules: builtin_rules(),
            config: DispatcherConfig::default(),
        }
    }

    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            rules,
            config: DispatcherConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.as_ref())
    }

    /// Evaluate every enabled rule against its own domain's buffer. Pure.
    pub fn decide(&self, buffers: &LogBuffers) -> DispatchDecision {
        let rules = self
            .rules
            .iter()
            .map(|rule| {
                let state = if !self.config.is_enabled(rule.name()) {
                    RuleState::Disabled
                } else if rule.wants(buffers.get(rule.domain()).text()) {
                    RuleState::Fired
                } else {
                    RuleState::Idle
                };
                debug!(rule = rule.name(), domain = %rule.domain(), state = state.as_str(), "evaluated rule");
                RuleDecision {
                    rule: rule.name().to_string(),
                    domain: rule.domain(),
                    state,
                }
            })
            .collect();
        DispatchDecision { rules }
    }

    /// Decide, then run the action of every fired rule in registration order.
    ///
    /// An action error aborts the dispatch; actions already applied stay applied.
    pub fn dispatch(
        &self,
        buffers: &LogBuffers,
        ctx: &RuleContext<'_>,
        ws: &mut Workspace,
    ) -> Result<DispatchOutcome, DispatchError> {
        let decision = self.decide(buffers);

        for overlap in self.overlaps(&decision, ctx.layout) {
            warn!(
                first = %overlap.first,
                second = %overlap.second,
                path = %overlap.path,
                "fired rules declare overlapping paths; running in registration order"
            );
        }

        let mut runs = Vec::new();
        for (rule, d) in self.rules.iter().zip(&decision.rules) {
            if d.state != RuleState::Fired {
                continue;
            }
            info!(rule = rule.name(), domain = %rule.domain(), "rule fired");

            ws.set_rule(Some(rule.name()));
            let result = rule.run(ctx, ws);
            ws.set_rule(None);

            match result {
                Ok(result) => {
                    info!(rule = rule.name(), changed = result.changed, "rule action finished");
                    runs.push(RuleRun {
                        rule: rule.name().to_string(),
                        result,
                    });
                }
                Err(source) => {
                    return Err(DispatchError {
                        rule: rule.name().to_string(),
                        decision: decision.clone(),
                        completed: runs,
                        source,
                    });
                }
            }
        }

        Ok(DispatchOutcome { decision, runs })
    }

    /// Pairs of fired rules whose declared paths are equal or nested.
    pub fn overlaps(&self, decision: &DispatchDecision, layout: &RepoLayout) -> Vec<Overlap> {
        let fired: Vec<(&str, Vec<Utf8PathBuf>)> = self
            .rules
            .iter()
            .filter(|r| decision.fired(r.name()))
            .map(|r| (r.name(), r.owns(layout)))
            .collect();

        let mut out = Vec::new();
        for (i, (first, first_paths)) in fired.iter().enumerate() {
            for (second, second_paths) in &fired[i + 1..] {
                let shared = first_paths.iter().find_map(|a| {
                    second_paths
                        .iter()
                        .find(|b| a.starts_with(b) || b.starts_with(a))
                        .map(|b| if a.starts_with(b) { a.clone() } else { b.clone() })
                });
                if let Some(path) = shared {
                    out.push(Overlap {
                        first: first.to_string(),
                        second: second.to_string(),
                        path,
                    });
                }
            }
        }
        out
    }

    /// Rule, domain and byte offset of the earliest trigger match among the fired rules that
    /// attach excerpts. Ties go to the rule registered first.
    pub fn excerpt_anchor(
        &self,
        decision: &DispatchDecision,
        buffers: &LogBuffers,
    ) -> Option<(String, Domain, usize)> {
        self.rules
            .iter()
            .filter(|r| r.excerpt() && decision.fired(r.name()))
            .filter_map(|r| {
                let text = buffers.get(r.domain()).text();
                r.triggers()
                    .first_match(text)
                    .map(|offset| (r.name().to_string(), r.domain(), offset))
            })
            .min_by_key(|(_, _, offset)| *offset)
    }
}

fn glob_match(pat: &str, text: &str) -> bool {
    let p = pat.as_bytes();
    let t = text.as_bytes();
    let mut dp = vec![vec![false; t.len() + 1]; p.len() + 1];
    dp[0][0] = true;

    for i in 1..=p.len() {
        if p[i - 1] == b'*' {
            dp[i][0] = dp[i - 1][0];
        }
    }

    for i in 1..=p.len() {
        for j in 1..=t.len() {
            dp[i][j] = match p[i - 1] {
                b'*' => dp[i - 1][j] || dp[i][j - 1],
                b'?' => dp[i - 1][j - 1],
                c => dp[i - 1][j - 1] && c == t[j - 1],
            };
        }
    }

    dp[p.len()][t.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_match_handles_star_and_question() {
        assert!(glob_match("*", "scheme"));
        assert!(glob_match("build-*", "build-config"));
        assert!(!glob_match("build-?", "build-config"));
        assert!(glob_match("sch?me", "scheme"));
        assert!(!glob_match("scheme", "scheme-x"));
    }

    #[test]
    fn deny_wins_over_allow() {
        let config = DispatcherConfig {
            allow: vec!["*".to_string()],
            deny: vec!["workflow-*".to_string()],
        };
        assert!(config.is_enabled("build-config"));
        assert!(!config.is_enabled("workflow-guard"));
    }

    #[test]
    fn allow_list_restricts() {
        let config = DispatcherConfig {
            allow: vec!["scheme".to_string()],
            deny: vec![],
        };
        assert!(config.is_enabled("scheme"));
        assert!(!config.is_enabled("project-format"));
        assert!(DispatcherConfig::default().is_enabled("anything"));
    }
}
