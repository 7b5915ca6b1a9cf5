//! Port traits abstracting version control and report output away from the pipeline.

use camino::{Utf8Path, Utf8PathBuf};

/// Version-control sink.
pub trait VcsPort {
    /// Stage every pending change outside `exclude` (repo-relative paths).
    fn stage_all(&self, repo_root: &Utf8Path, exclude: &[Utf8PathBuf]) -> anyhow::Result<()>;

    /// Whether anything outside `exclude` is pending. `None` when the state cannot be
    /// determined (no repository, no git binary).
    fn has_changes(
        &self,
        repo_root: &Utf8Path,
        exclude: &[Utf8PathBuf],
    ) -> anyhow::Result<Option<bool>>;
}

/// File-system write operations for run artifacts.
pub trait WritePort {
    /// Returns whether the file was (re)written.
    fn write_if_changed(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<bool>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
