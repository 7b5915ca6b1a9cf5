use super::build_config::BUNDLE_DIR_TRIGGERS;
use super::templates::{
    CHECKOUT_ANCHOR, CMAKE_GUARD_MARKER, CMAKE_GUARD_STEP, SWIFTC_GUARD_MARKER, SWIFTC_GUARD_STEP,
};
use super::{Rule, RuleContext};
use crate::layout::RepoLayout;
use crate::triggers::TriggerSet;
use camino::Utf8PathBuf;
use swarmfix_edit::Workspace;
use swarmfix_types::Domain;
use swarmfix_types::decision::PatchResult;
use tracing::debug;

/// Inserts CI guard steps that stop the two known regressions from landing again.
///
/// Fires on the same plugin signatures as `build-config`.
pub struct WorkflowGuardRule {
    triggers: TriggerSet,
}

impl WorkflowGuardRule {
    pub const NAME: &'static str = "workflow-guard";

    pub fn new() -> Self {
        Self {
            triggers: TriggerSet::contains(BUNDLE_DIR_TRIGGERS),
        }
    }
}

impl Rule for WorkflowGuardRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn domain(&self) -> Domain {
        Domain::Plugin
    }

    fn title(&self) -> &'static str {
        "Add CI guard steps to the build workflow"
    }

    fn description(&self) -> &'static str {
        "Inserts two steps after checkout in the build workflow: one rejecting raw compiler \
         invocation scripts, one rejecting the bundle-only generator expression in the build \
         configuration. Each is added only when its marker is absent."
    }

    fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    fn owns(&self, layout: &RepoLayout) -> Vec<Utf8PathBuf> {
        vec![layout.workflow.clone()]
    }

    fn run(&self, ctx: &RuleContext<'_>, ws: &mut Workspace) -> anyhow::Result<PatchResult> {
        let workflow = &ctx.layout.workflow;
        let changed = ws.rewrite(workflow, insert_guard_steps)?;
        if !changed {
            debug!(path = %workflow, "workflow guards present or workflow absent");
        }
        Ok(PatchResult::from_changed(changed))
    }
}

/// Insert each missing guard step right after the checkout step.
pub(crate) fn insert_guard_steps(text: &str) -> Option<String> {
    if text.is_empty() || !text.contains(CHECKOUT_ANCHOR) {
        return None;
    }
    let mut out = text.to_string();
    for (marker, step) in [
        (SWIFTC_GUARD_MARKER, SWIFTC_GUARD_STEP),
        (CMAKE_GUARD_MARKER, CMAKE_GUARD_STEP),
    ] {
        if !out.contains(marker) {
            out = out.replacen(CHECKOUT_ANCHOR, &format!("{CHECKOUT_ANCHOR}\n{step}"), 1);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKFLOW: &str = "jobs:\n  build:\n    steps:\n      - uses: actions/checkout@v4\n      - run: make\n";

    #[test]
    fn inserts_both_guards_once() {
        let out = insert_guard_steps(WORKFLOW).expect("rewritten");
        assert_eq!(out.matches(SWIFTC_GUARD_MARKER).count(), 1);
        assert_eq!(out.matches(CMAKE_GUARD_MARKER).count(), 1);
        assert!(out.ends_with("      - run: make\n"));

        let again = insert_guard_steps(&out).expect("anchor still present");
        assert_eq!(again, out);
    }

    #[test]
    fn missing_anchor_is_noop() {
        assert_eq!(insert_guard_steps("name: ci\n"), None);
        assert_eq!(insert_guard_steps(""), None);
    }
}
