//! Clap-free settings for the swarm pipeline.

use camino::{Utf8Component, Utf8PathBuf};
use swarmfix_domain::RepoLayout;
use swarmfix_logs::LogSources;
use swarmfix_render::DEFAULT_CONTEXT_LINES;

/// Settings for one swarm run.
#[derive(Debug, Clone)]
pub struct SwarmSettings {
    pub repo_root: Utf8PathBuf,
    pub layout: RepoLayout,
    pub logs: LogSources,

    // Rule selection
    pub allow: Vec<String>,
    pub deny: Vec<String>,

    // Report
    /// Relative to `repo_root`.
    pub report_dir: Utf8PathBuf,
    pub context_lines: usize,

    pub dry_run: bool,
}

impl SwarmSettings {
    pub fn report_dir_abs(&self) -> Utf8PathBuf {
        self.repo_root.join(&self.report_dir)
    }

    /// The report directory relative to `repo_root`, when it lies inside the repository.
    ///
    /// Kept out of staging so report files never count as fix changes.
    pub fn report_dir_in_repo(&self) -> Option<Utf8PathBuf> {
        let rel = if self.report_dir.is_absolute() {
            self.report_dir.strip_prefix(&self.repo_root).ok()?
        } else {
            self.report_dir.as_path()
        };
        let normal = rel
            .components()
            .all(|c| matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir));
        let rel: Utf8PathBuf = rel
            .components()
            .filter(|c| matches!(c, Utf8Component::Normal(_)))
            .collect();
        (normal && !rel.as_str().is_empty()).then_some(rel)
    }
}

impl Default for SwarmSettings {
    fn default() -> Self {
        Self {
            repo_root: Utf8PathBuf::from("."),
            layout: RepoLayout::default(),
            logs: LogSources::default(),
            allow: Vec::new(),
            deny: Vec::new(),
            report_dir: Utf8PathBuf::from("artifacts/swarmfix"),
            context_lines: DEFAULT_CONTEXT_LINES,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(report_dir: &str) -> SwarmSettings {
        SwarmSettings {
            repo_root: Utf8PathBuf::from("/repo"),
            report_dir: Utf8PathBuf::from(report_dir),
            ..SwarmSettings::default()
        }
    }

    #[test]
    fn report_dir_inside_repo_is_relative() {
        assert_eq!(
            settings("artifacts/swarmfix").report_dir_in_repo(),
            Some(Utf8PathBuf::from("artifacts/swarmfix"))
        );
        assert_eq!(
            settings("./out").report_dir_in_repo(),
            Some(Utf8PathBuf::from("out"))
        );
        assert_eq!(
            settings("/repo/out/reports").report_dir_in_repo(),
            Some(Utf8PathBuf::from("out/reports"))
        );
    }

    #[test]
    fn report_dir_outside_repo_is_none() {
        assert_eq!(settings("/tmp/reports").report_dir_in_repo(), None);
        assert_eq!(settings("../reports").report_dir_in_repo(), None);
        assert_eq!(settings(".").report_dir_in_repo(), None);
    }
}
