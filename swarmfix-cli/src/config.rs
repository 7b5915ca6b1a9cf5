//! Configuration file loading for swarmfix.
//!
//! Discovers and loads `swarmfix.toml` from the repository root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use swarmfix_domain::RepoLayout;
use swarmfix_logs::LogSources;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "swarmfix.toml";

/// Top-level configuration from swarmfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SwarmfixConfig {
    /// Overrides for the repo-relative paths the rules touch.
    pub paths: RepoLayout,

    /// Where log text is read from.
    pub logs: LogSources,

    pub rules: RulesConfig,

    pub report: ReportConfig,
}

/// Rule selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Allowlist patterns over rule names. If non-empty, only matching rules are evaluated.
    pub allow: Vec<String>,

    /// Denylist patterns over rule names.
    pub deny: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Report output directory, relative to the repo root.
    pub dir: Option<Utf8PathBuf>,

    /// Log lines kept on each side of the excerpt's matching line.
    pub context_lines: Option<usize>,
}

/// Walk up from `start` to the first directory holding `.git` or a config file.
///
/// Falls back to `start` itself when neither is found.
pub fn detect_repo_root(start: &Utf8Path) -> Utf8PathBuf {
    for dir in start.ancestors() {
        if dir.join(".git").exists() || dir.join(CONFIG_FILE_NAME).is_file() {
            debug!("detected repo root at {}", dir);
            return dir.to_path_buf();
        }
    }
    debug!("no repo marker above {}; using it as the root", start);
    start.to_path_buf()
}

/// Discover the swarmfix.toml config file.
///
/// Returns `None` if no config file is found at the repository root.
pub fn discover_config(repo_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = repo_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a swarmfix.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<SwarmfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<SwarmfixConfig> {
    let config: SwarmfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from repo root, or return default if not found.
pub fn load_or_default(repo_root: &Utf8Path) -> anyhow::Result<SwarmfixConfig> {
    match discover_config(repo_root) {
        Some(path) => load_config(&path),
        None => Ok(SwarmfixConfig::default()),
    }
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub layout: RepoLayout,
    pub logs: LogSources,

    /// Allow patterns (from config file, extended by CLI).
    pub allow: Vec<String>,

    /// Deny patterns (from config file, extended by CLI).
    pub deny: Vec<String>,

    pub report_dir: Option<Utf8PathBuf>,
    pub context_lines: Option<usize>,
}

/// CLI values that take part in the merge.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
    pub artifacts_dir: Option<Utf8PathBuf>,
    pub report_dir: Option<Utf8PathBuf>,
    pub context_lines: Option<usize>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: SwarmfixConfig,
}

impl ConfigMerger {
    pub fn new(config: SwarmfixConfig) -> Self {
        Self { config }
    }

    /// Merge with `run` command arguments.
    ///
    /// CLI `allow` and `deny` lists extend the config file lists; scalar CLI values win.
    pub fn merge_run_args(self, cli: &RunOverrides) -> MergedConfig {
        let SwarmfixConfig {
            paths,
            mut logs,
            rules,
            report,
        } = self.config;

        let mut allow = rules.allow;
        let mut deny = rules.deny;
        for pattern in &cli.allow {
            if !allow.contains(pattern) {
                allow.push(pattern.clone());
            }
        }
        for pattern in &cli.deny {
            if !deny.contains(pattern) {
                deny.push(pattern.clone());
            }
        }

        if let Some(dir) = &cli.artifacts_dir {
            logs.artifacts_dir = dir.clone();
        }

        MergedConfig {
            layout: paths,
            logs,
            allow,
            deny,
            report_dir: cli.report_dir.clone().or(report.dir),
            context_lines: cli.context_lines.or(report.context_lines),
        }
    }
}
