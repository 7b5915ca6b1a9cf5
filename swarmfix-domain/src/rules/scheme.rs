use super::generator::regenerate_project;
use super::{Rule, RuleContext};
use crate::layout::RepoLayout;
use crate::triggers::{Trigger, TriggerSet};
use camino::Utf8PathBuf;
use regex::Regex;
use std::sync::LazyLock;
use swarmfix_edit::Workspace;
use swarmfix_types::Domain;
use swarmfix_types::decision::PatchResult;

static NOT_CONFIGURED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)scheme \S+ is not currently configured for the build action")
        .expect("valid scheme regex")
});

static NO_SHARED_SCHEMES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)no shared schemes found").expect("valid scheme regex"));

static BUILD_TOOL_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"xcodebuild: error:").expect("valid scheme regex"));

/// Regenerates the project so the generator emits a shared scheme.
pub struct SchemeRule {
    triggers: TriggerSet,
}

impl SchemeRule {
    pub const NAME: &'static str = "scheme";

    pub fn new() -> Self {
        Self {
            triggers: TriggerSet::new(vec![
                Trigger::Matches(&NOT_CONFIGURED),
                Trigger::Matches(&NO_SHARED_SCHEMES),
                Trigger::Matches(&BUILD_TOOL_ERROR),
            ]),
        }
    }
}

impl Rule for SchemeRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn domain(&self) -> Domain {
        Domain::App
    }

    fn title(&self) -> &'static str {
        "Regenerate the app project to restore its shared scheme"
    }

    fn description(&self) -> &'static str {
        "The build tool found no usable scheme. Schemes are emitted by the project generator, \
         so this runs the same regeneration as project-format; no-op without a manifest."
    }

    fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    fn owns(&self, layout: &RepoLayout) -> Vec<Utf8PathBuf> {
        vec![layout.generated_project.clone()]
    }

    fn excerpt(&self) -> bool {
        true
    }

    fn run(&self, ctx: &RuleContext<'_>, ws: &mut Workspace) -> anyhow::Result<PatchResult> {
        regenerate_project(ctx, ws)
    }
}
