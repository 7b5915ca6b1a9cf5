use super::templates::BUILD_CONFIG;
use super::{Rule, RuleContext};
use crate::layout::RepoLayout;
use crate::triggers::TriggerSet;
use camino::Utf8PathBuf;
use swarmfix_edit::Workspace;
use swarmfix_types::Domain;
use swarmfix_types::decision::PatchResult;
use tracing::info;

pub(crate) const BUNDLE_DIR_TRIGGERS: &[&str] = &[
    "$<TARGET_BUNDLE_DIR:MoreMojoPlugin>",
    "TARGET_BUNDLE_DIR is allowed only for Bundle targets",
];

/// Resets the plugin build configuration to the known-good template.
pub struct BuildConfigRule {
    triggers: TriggerSet,
}

impl BuildConfigRule {
    pub const NAME: &'static str = "build-config";

    pub fn new() -> Self {
        Self {
            triggers: TriggerSet::contains(BUNDLE_DIR_TRIGGERS),
        }
    }
}

impl Rule for BuildConfigRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn domain(&self) -> Domain {
        Domain::Plugin
    }

    fn title(&self) -> &'static str {
        "Reset the plugin build configuration"
    }

    fn description(&self) -> &'static str {
        "A bundle-only generator expression broke the configure step. Overwrites the build \
         configuration with the known-good template and, only when that changed the file, \
         deletes the build cache that may still carry the bad expression."
    }

    fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    fn owns(&self, layout: &RepoLayout) -> Vec<Utf8PathBuf> {
        vec![layout.build_config.clone(), layout.build_cache.clone()]
    }

    fn run(&self, ctx: &RuleContext<'_>, ws: &mut Workspace) -> anyhow::Result<PatchResult> {
        let layout = ctx.layout;
        if !ws.write_if_changed(&layout.build_config, BUILD_CONFIG)? {
            return Ok(PatchResult::UNCHANGED);
        }
        if ws.remove_dir_all(&layout.build_cache)? {
            info!(path = %layout.build_cache, "purged stale build cache");
        }
        Ok(PatchResult::CHANGED)
    }
}
