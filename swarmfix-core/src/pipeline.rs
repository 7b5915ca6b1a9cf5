//! The swarm pipeline, extracted from the CLI.
//!
//! Loader → Dispatcher → Change Reporter. Filesystem reads of the repository go through the
//! edit workspace; artifacts, version control, tools and report output go through ports.

use crate::ports::{VcsPort, WritePort};
use crate::settings::SwarmSettings;
use anyhow::Context;
use camino::Utf8Path;
use swarmfix_domain::{DispatchError, Dispatcher, DispatcherConfig, RuleContext};
use swarmfix_edit::{DryRunToolRunner, ToolRunner, Workspace, WorkspaceOptions};
use swarmfix_logs::{ArtifactSource, load_all};
use swarmfix_render::{log_excerpt, render_report_md, render_report_text};
use swarmfix_types::report::{ChangeReport, ToolInfo};
use tracing::{debug, info, warn};

pub const SUMMARY_TXT: &str = "summary.txt";
pub const SUMMARY_MD: &str = "summary.md";
pub const SUMMARY_JSON: &str = "summary.json";
pub const PATCH_DIFF: &str = "patch.diff";

/// Error type for pipeline results. Every variant maps to exit code 1.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{0}")]
    Dispatch(#[from] DispatchError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Outcome of `run_swarm`.
#[derive(Debug, Clone)]
pub struct SwarmOutcome {
    pub report: ChangeReport,
    /// Plain-text rendering of `report`.
    pub text: String,
    pub markdown: String,
    /// Unified diff of every text change the rules made (or would make, in dry-run).
    pub patch: String,
}

impl SwarmOutcome {
    pub fn changed(&self) -> bool {
        !self.report.changes.is_empty()
    }
}

/// Run the swarm once: load both log buffers, dispatch the rules, stage and report.
///
/// The caller is responsible for persisting the outcome, via `WritePort` or
/// [`write_report_artifacts`].
pub fn run_swarm(
    settings: &SwarmSettings,
    artifacts: &dyn ArtifactSource,
    vcs: &dyn VcsPort,
    tools: &dyn ToolRunner,
    tool: ToolInfo,
) -> Result<SwarmOutcome, ToolError> {
    let root = &settings.repo_root;
    let buffers = load_all(&settings.logs, root, artifacts).context("load log buffers")?;

    let dispatcher = Dispatcher::new().with_config(DispatcherConfig {
        allow: settings.allow.clone(),
        deny: settings.deny.clone(),
    });

    let dry_tools = DryRunToolRunner::new(tools);
    let tools: &dyn ToolRunner = if settings.dry_run { &dry_tools } else { tools };
    let ctx = RuleContext {
        layout: &settings.layout,
        tools,
    };
    let mut ws = Workspace::new(
        root.clone(),
        WorkspaceOptions {
            dry_run: settings.dry_run,
        },
    );

    let outcome = dispatcher.dispatch(&buffers, &ctx, &mut ws)?;
    let changed = outcome.any_changed();

    let files_staged = if changed && !settings.dry_run {
        let exclude: Vec<_> = settings.report_dir_in_repo().into_iter().collect();
        if let Err(e) = vcs.stage_all(root, &exclude) {
            warn!(error = %format!("{e:#}"), "staging failed; continuing");
        }
        matches!(vcs.has_changes(root, &exclude), Ok(Some(true)))
    } else {
        false
    };

    let excerpt = dispatcher
        .excerpt_anchor(&outcome.decision, &buffers)
        .map(|(rule, domain, offset)| {
            log_excerpt(
                domain,
                &rule,
                buffers.get(domain).text(),
                offset,
                settings.context_lines,
            )
        });

    let patch = ws.render_patch().context("render patch")?;

    let mut report = ChangeReport::new(tool, outcome.decision.clone());
    report.buffer_sizes = buffers.sizes();
    report.excerpt = excerpt;
    report.files_staged = files_staged;
    report.actions_ran = outcome.actions_ran();
    report.dry_run = settings.dry_run;
    report.changes = ws.into_journal();

    info!(
        actions_ran = report.actions_ran,
        files_staged,
        changes = report.changes.len(),
        dry_run = settings.dry_run,
        "swarm finished"
    );

    let text = render_report_text(&report);
    let markdown = render_report_md(&report);
    Ok(SwarmOutcome {
        report,
        text,
        markdown,
        patch,
    })
}

/// Write the report files (text, markdown, JSON, diff) to `out_dir`, each write-if-changed.
pub fn write_report_artifacts(
    outcome: &SwarmOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    writer.write_if_changed(&out_dir.join(SUMMARY_TXT), outcome.text.as_bytes())?;
    writer.write_if_changed(&out_dir.join(SUMMARY_MD), outcome.markdown.as_bytes())?;

    let json = serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_if_changed(&out_dir.join(SUMMARY_JSON), json.as_bytes())?;

    writer.write_if_changed(&out_dir.join(PATCH_DIFF), outcome.patch.as_bytes())?;

    debug!(dir = %out_dir, "wrote report artifacts");
    Ok(())
}
