use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// `-- . :(exclude)<path>...`: the whole tree minus `exclude` (repo-relative paths).
fn pathspec(exclude: &[Utf8PathBuf]) -> Vec<String> {
    let mut spec = vec!["--".to_string(), ".".to_string()];
    spec.extend(exclude.iter().map(|p| format!(":(exclude){p}")));
    spec
}

/// Stage every change in the working tree (`git add -A`) outside `exclude`.
pub fn stage_all(repo_root: &Utf8Path, exclude: &[Utf8PathBuf]) -> anyhow::Result<()> {
    let status = Command::new("git")
        .args(["add", "-A"])
        .args(pathspec(exclude))
        .current_dir(repo_root)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .context("run git add")?;
    if !status.success() {
        bail!("git add -A failed with {:?}", status.code());
    }
    debug!(root = %repo_root, excluded = ?exclude, "staged all changes");
    Ok(())
}

/// Whether `git status --porcelain` reports anything outside `exclude`.
///
/// Untracked files are listed one by one so an exclusion inside a new directory applies.
pub fn has_changes(repo_root: &Utf8Path, exclude: &[Utf8PathBuf]) -> anyhow::Result<bool> {
    let output = Command::new("git")
        .args(["status", "--porcelain", "--untracked-files=all"])
        .args(pathspec(exclude))
        .current_dir(repo_root)
        .stderr(Stdio::null())
        .output()
        .context("run git status")?;
    if !output.status.success() {
        bail!("git status failed with {:?}", output.status.code());
    }
    Ok(!output.stdout.iter().all(u8::is_ascii_whitespace))
}
