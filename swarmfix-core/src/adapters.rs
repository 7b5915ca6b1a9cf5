//! Default filesystem- and git-backed port implementations.

use crate::ports::{VcsPort, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::cell::{Cell, RefCell};
use std::io::ErrorKind;
use tracing::debug;

/// Git operations via the `swarmfix_edit` shell helpers.
///
/// Staging errors propagate so the pipeline can log them; status errors map to `None`.
#[derive(Debug, Clone, Default)]
pub struct ShellGitPort;

impl VcsPort for ShellGitPort {
    fn stage_all(&self, repo_root: &Utf8Path, exclude: &[Utf8PathBuf]) -> anyhow::Result<()> {
        swarmfix_edit::stage_all(repo_root, exclude)
    }

    fn has_changes(
        &self,
        repo_root: &Utf8Path,
        exclude: &[Utf8PathBuf],
    ) -> anyhow::Result<Option<bool>> {
        match swarmfix_edit::has_changes(repo_root, exclude) {
            Ok(dirty) => Ok(Some(dirty)),
            Err(e) => {
                debug!(root = %repo_root, error = %e, "git status unavailable");
                Ok(None)
            }
        }
    }
}

/// In-memory VCS for embedding and testing.
///
/// `stage_all` only counts calls; `has_changes` answers with the configured value.
#[derive(Debug, Default)]
pub struct InMemoryVcs {
    dirty: Option<bool>,
    fail_staging: bool,
    staged: Cell<usize>,
    excluded: RefCell<Vec<Utf8PathBuf>>,
}

impl InMemoryVcs {
    pub fn new(dirty: Option<bool>) -> Self {
        Self {
            dirty,
            ..Self::default()
        }
    }

    pub fn failing_staging(mut self) -> Self {
        self.fail_staging = true;
        self
    }

    pub fn stage_calls(&self) -> usize {
        self.staged.get()
    }

    /// Exclusions passed to the last `stage_all` call.
    pub fn last_excluded(&self) -> Vec<Utf8PathBuf> {
        self.excluded.borrow().clone()
    }
}

impl VcsPort for InMemoryVcs {
    fn stage_all(&self, _repo_root: &Utf8Path, exclude: &[Utf8PathBuf]) -> anyhow::Result<()> {
        self.staged.set(self.staged.get() + 1);
        *self.excluded.borrow_mut() = exclude.to_vec();
        if self.fail_staging {
            anyhow::bail!("staging disabled");
        }
        Ok(())
    }

    fn has_changes(
        &self,
        _repo_root: &Utf8Path,
        _exclude: &[Utf8PathBuf],
    ) -> anyhow::Result<Option<bool>> {
        Ok(self.dirty)
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_if_changed(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<bool> {
        match fs::read(path) {
            Ok(existing) if existing == contents => {
                debug!(path = %path, "unchanged");
                return Ok(false);
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("read {}", path)),
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))?;
        Ok(true)
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}

/// Collects written files in memory.
#[derive(Debug, Default)]
pub struct InMemoryWritePort {
    files: RefCell<Vec<(Utf8PathBuf, Vec<u8>)>>,
}

impl InMemoryWritePort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Utf8Path) -> Option<Vec<u8>> {
        self.files
            .borrow()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, bytes)| bytes.clone())
    }

    pub fn paths(&self) -> Vec<Utf8PathBuf> {
        self.files.borrow().iter().map(|(p, _)| p.clone()).collect()
    }
}

impl WritePort for InMemoryWritePort {
    fn write_if_changed(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<bool> {
        let mut files = self.files.borrow_mut();
        match files.iter_mut().find(|(p, _)| p == path) {
            Some((_, existing)) if existing.as_slice() == contents => Ok(false),
            Some((_, existing)) => {
                *existing = contents.to_vec();
                Ok(true)
            }
            None => {
                files.push((path.to_path_buf(), contents.to_vec()));
                Ok(true)
            }
        }
    }

    fn create_dir_all(&self, _path: &Utf8Path) -> anyhow::Result<()> {
        Ok(())
    }
}
