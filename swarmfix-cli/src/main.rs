mod config;
mod explain;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{ConfigMerger, RunOverrides};
use std::process::ExitCode;
use swarmfix_core::adapters::{FsWritePort, ShellGitPort};
use swarmfix_core::pipeline::{run_swarm, write_report_artifacts};
use swarmfix_core::settings::SwarmSettings;
use swarmfix_core::{FsArtifactSource, ProcessToolRunner};
use swarmfix_types::report::ToolInfo;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Exit code for `--fail-on-changes` when the run staged changes.
const EXIT_CHANGES: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "swarmfix",
    version,
    about = "Reads failed CI build logs and applies idempotent repair patches."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load the build logs, run every rule that fires and write the report.
    Run(RunArgs),
    /// List the built-in rules.
    ListRules(ListRulesArgs),
    /// Explain what a rule matches and which files it writes.
    Explain(ExplainArgs),
}

#[derive(Debug, Parser)]
struct RunArgs {
    /// Repository root, or any directory below it (default: current directory).
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Directory holding extracted artifact bundles (default: <repo_root>/failed_artifacts).
    #[arg(long, env = "SWARMFIX_ARTIFACTS_DIR")]
    artifacts_dir: Option<Utf8PathBuf>,

    /// Report output directory (default: <repo_root>/artifacts/swarmfix).
    #[arg(long)]
    report_dir: Option<Utf8PathBuf>,

    /// Allowlist patterns for rule names.
    #[arg(long)]
    allow: Vec<String>,

    /// Denylist patterns for rule names.
    #[arg(long)]
    deny: Vec<String>,

    /// Log lines shown on each side of the excerpt's matching line.
    #[arg(long)]
    context_lines: Option<usize>,

    /// Compute changes and the patch without touching the tree.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Exit with code 2 when the run staged changes.
    #[arg(long, default_value_t = false)]
    fail_on_changes: bool,
}

#[derive(Debug, Parser)]
struct ListRulesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Rule name to explain (e.g., "scheme", "build-config").
    rule: String,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::ListRules(args) => cmd_list_rules(args).map(|()| ExitCode::SUCCESS),
        Command::Explain(args) => cmd_explain(args).map(|()| ExitCode::SUCCESS),
    }
}

fn resolve_root(start: &Utf8Path) -> Utf8PathBuf {
    let start = start
        .canonicalize_utf8()
        .unwrap_or_else(|_| start.to_path_buf());
    config::detect_repo_root(&start)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let repo_root = resolve_root(&args.repo_root);

    // Load config file and merge with CLI arguments
    let file_config = config::load_or_default(&repo_root).context("load swarmfix.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_run_args(&RunOverrides {
        allow: args.allow,
        deny: args.deny,
        artifacts_dir: args.artifacts_dir,
        report_dir: args.report_dir,
        context_lines: args.context_lines,
    });
    debug!(
        "merged config: allow={:?}, deny={:?}, logs={:?}",
        merged.allow, merged.deny, merged.logs
    );

    let defaults = SwarmSettings::default();
    let settings = SwarmSettings {
        repo_root: repo_root.clone(),
        layout: merged.layout,
        logs: merged.logs,
        allow: merged.allow,
        deny: merged.deny,
        report_dir: merged.report_dir.unwrap_or(defaults.report_dir),
        context_lines: merged.context_lines.unwrap_or(defaults.context_lines),
        dry_run: args.dry_run,
    };

    let artifacts = FsArtifactSource::new(repo_root.join(&settings.logs.artifacts_dir));
    let outcome = run_swarm(
        &settings,
        &artifacts,
        &ShellGitPort,
        &ProcessToolRunner,
        tool_info(),
    )?;

    let out_dir = settings.report_dir_abs();
    write_report_artifacts(&outcome, &out_dir, &FsWritePort)?;

    print!("{}", outcome.text);
    println!(
        "swarmfix finished. changes_staged={} actions_ran={}",
        outcome.report.files_staged, outcome.report.actions_ran
    );
    info!("wrote report to {}", out_dir);

    if args.fail_on_changes && outcome.report.files_staged {
        return Ok(ExitCode::from(EXIT_CHANGES));
    }
    Ok(ExitCode::SUCCESS)
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "swarmfix".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}

fn layout_for_cwd() -> anyhow::Result<swarmfix_domain::RepoLayout> {
    let root = resolve_root(Utf8Path::new("."));
    Ok(config::load_or_default(&root)
        .context("load swarmfix.toml config")?
        .paths)
}

fn cmd_list_rules(args: ListRulesArgs) -> anyhow::Result<()> {
    let layout = layout_for_cwd()?;
    let metas = explain::catalogue(&layout);

    match args.format {
        OutputFormat::Text => print!("{}", explain::render_rule_list(&metas)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metas)?),
    }
    Ok(())
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    let layout = layout_for_cwd()?;
    let Some(meta) = explain::lookup_rule(&layout, &args.rule) else {
        let available = explain::list_rule_names(&layout).join(", ");
        anyhow::bail!(
            "Unknown rule: '{}'\n\nAvailable rules: {}",
            args.rule,
            available
        );
    };
    print!("{}", explain::render_explanation(&meta));
    Ok(())
}
