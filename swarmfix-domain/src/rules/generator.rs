use super::RuleContext;
use swarmfix_edit::{ToolInvocation, ToolOutcome, Workspace};
use swarmfix_types::decision::PatchResult;
use tracing::{debug, info, warn};

pub(crate) const GENERATOR: &str = "xcodegen";

/// Make sure the generator is installed, then regenerate the project from its manifest.
///
/// Tool outcomes are logged and never escalated. The generated project is snapshotted
/// around the run; only files whose content actually differs count as a change, and those
/// are journaled.
pub(crate) fn regenerate_project(
    ctx: &RuleContext<'_>,
    ws: &mut Workspace,
) -> anyhow::Result<PatchResult> {
    if !ctx.tools.is_available(GENERATOR) {
        for invocation in [
            ToolInvocation::new("brew", ["update"], ws.root()),
            ToolInvocation::new("brew", ["install", GENERATOR], ws.root()),
        ] {
            log_outcome(&invocation, &ctx.tools.run(&invocation));
        }
    }

    let manifest = &ctx.layout.generator_manifest;
    if !ws.exists(manifest) {
        debug!(manifest = %manifest, "no generator manifest; skipping regeneration");
        return Ok(PatchResult::UNCHANGED);
    }

    let project = &ctx.layout.generated_project;
    let before = ws.snapshot(project)?;

    let cwd = ws.root().join(&ctx.layout.app_dir);
    let generate = ToolInvocation::new(GENERATOR, ["generate"], &cwd);
    let outcome = ctx.tools.run(&generate);
    log_outcome(&generate, &outcome);
    if !outcome.is_success() {
        return Ok(PatchResult::UNCHANGED);
    }

    let after = ws.snapshot(project)?;
    let changed = ws.record_external(&before, &after);
    if !changed {
        debug!(project = %project, "regenerated project is identical");
    }
    Ok(PatchResult::from_changed(changed))
}

fn log_outcome(invocation: &ToolInvocation, outcome: &ToolOutcome) {
    match outcome {
        ToolOutcome::Succeeded => info!(command = %invocation.command_line(), "tool succeeded"),
        ToolOutcome::Skipped => debug!(command = %invocation.command_line(), "tool skipped"),
        ToolOutcome::Unavailable => {
            warn!(program = %invocation.program, "tool unavailable; continuing")
        }
        ToolOutcome::Failed { code } => {
            warn!(command = %invocation.command_line(), code = ?code, "tool failed; continuing")
        }
    }
}
