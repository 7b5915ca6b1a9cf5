use crate::layout::RepoLayout;
use crate::triggers::TriggerSet;
use camino::Utf8PathBuf;
use swarmfix_edit::{ToolRunner, Workspace};
use swarmfix_types::decision::PatchResult;
use swarmfix_types::{Domain, RuleMeta};

mod build_config;
mod generator;
mod project_format;
mod scheme;
mod source_unification;
pub mod templates;
mod workflow_guard;

/// Collaborators available to a rule's action.
pub struct RuleContext<'a> {
    pub layout: &'a RepoLayout,
    pub tools: &'a dyn ToolRunner,
}

/// A named predicate over one domain's log text paired with an idempotent patch action.
pub trait Rule {
    fn name(&self) -> &'static str;
    fn domain(&self) -> Domain;
    fn title(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn triggers(&self) -> &TriggerSet;

    /// Paths the action may write or delete.
    fn owns(&self, layout: &RepoLayout) -> Vec<Utf8PathBuf>;

    /// Whether a firing attaches a log excerpt to the report.
    fn excerpt(&self) -> bool {
        false
    }

    fn wants(&self, log: &str) -> bool {
        self.triggers().is_match(log)
    }

    fn run(&self, ctx: &RuleContext<'_>, ws: &mut Workspace) -> anyhow::Result<PatchResult>;

    fn meta(&self, layout: &RepoLayout) -> RuleMeta {
        RuleMeta {
            name: self.name().to_string(),
            domain: self.domain(),
            title: self.title().to_string(),
            description: self.description().to_string(),
            triggers: self.triggers().describe(),
            owns: self
                .owns(layout)
                .into_iter()
                .map(|p| p.into_string())
                .collect(),
            excerpt: self.excerpt(),
        }
    }
}

/// Built-in rules in registration order.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(project_format::ProjectFormatRule::new()),
        Box::new(scheme::SchemeRule::new()),
        Box::new(source_unification::SourceUnificationRule::new()),
        Box::new(build_config::BuildConfigRule::new()),
        Box::new(workflow_guard::WorkflowGuardRule::new()),
    ]
}

/// Catalogue of the built-in rules, in registration order.
pub fn builtin_rule_metas(layout: &RepoLayout) -> Vec<RuleMeta> {
    builtin_rules().iter().map(|r| r.meta(layout)).collect()
}
