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

static MISSING_PROJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.xcodeproj'? (?:does not exist|cannot be opened)")
        .expect("valid missing-project regex")
});

/// Regenerates the app project when the build tool refuses to read it.
pub struct ProjectFormatRule {
    triggers: TriggerSet,
}

impl ProjectFormatRule {
    pub const NAME: &'static str = "project-format";

    pub fn new() -> Self {
        Self {
            triggers: TriggerSet::new(vec![
                Trigger::Contains("future Xcode project file format"),
                Trigger::Contains("Unable to read project"),
                Trigger::Matches(&MISSING_PROJECT),
            ]),
        }
    }
}

impl Rule for ProjectFormatRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn domain(&self) -> Domain {
        Domain::App
    }

    fn title(&self) -> &'static str {
        "Regenerate the app project from its manifest"
    }

    fn description(&self) -> &'static str {
        "The project file was written by a newer toolchain or cannot be read. Ensures the \
         project generator is installed and regenerates the project in place when a \
         generator manifest exists."
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
