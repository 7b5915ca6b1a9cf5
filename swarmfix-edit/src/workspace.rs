use crate::error::{EditError, EditResult};
use crate::hash::sha256_hex;
use anyhow::Context;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use fs_err as fs;
use glob::Pattern;
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use swarmfix_types::change::{ChangeKind, FileChange};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceOptions {
    /// Keep every mutation in memory instead of touching the tree.
    pub dry_run: bool,
}

/// Mutable view of the repository tree used by patch actions.
///
/// Every mutation goes through write-if-changed semantics and is journaled. In dry-run mode
/// mutations land in an in-memory overlay that later reads observe, so multi-step actions
/// behave the same as they would against the real tree.
#[derive(Debug)]
pub struct Workspace {
    root: Utf8PathBuf,
    opts: WorkspaceOptions,
    overlay: BTreeMap<Utf8PathBuf, Option<String>>,
    removed_dirs: BTreeSet<Utf8PathBuf>,
    originals: BTreeMap<Utf8PathBuf, Option<String>>,
    journal: Vec<FileChange>,
    rule: Option<String>,
}

impl Workspace {
    pub fn new(root: Utf8PathBuf, opts: WorkspaceOptions) -> Self {
        Self {
            root,
            opts,
            overlay: BTreeMap::new(),
            removed_dirs: BTreeSet::new(),
            originals: BTreeMap::new(),
            journal: Vec::new(),
            rule: None,
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn is_dry_run(&self) -> bool {
        self.opts.dry_run
    }

    /// Attribute subsequent journal entries to `rule`.
    pub fn set_rule(&mut self, rule: Option<&str>) {
        self.rule = rule.map(str::to_string);
    }

    pub fn journal(&self) -> &[FileChange] {
        &self.journal
    }

    pub fn into_journal(self) -> Vec<FileChange> {
        self.journal
    }

    /// Absolute path for a repo-relative one. Rejects paths that leave the root.
    pub fn abs(&self, rel: &Utf8Path) -> EditResult<Utf8PathBuf> {
        check_relative(rel)?;
        Ok(self.root.join(rel))
    }

    pub fn exists(&self, rel: &Utf8Path) -> bool {
        if self.opts.dry_run {
            if let Some(entry) = self.overlay.get(rel) {
                return entry.is_some();
            }
            if self.in_removed_dir(rel) {
                return false;
            }
        }
        self.root.join(rel).exists()
    }

    /// Current text of `rel`, or `None` when it does not exist.
    pub fn read_to_string(&self, rel: &Utf8Path) -> EditResult<Option<String>> {
        match self.current_bytes(rel)? {
            None => Ok(None),
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| EditError::NotUtf8 {
                    path: rel.to_path_buf(),
                }),
        }
    }

    /// Write `contents` unless the file already holds exactly those bytes.
    ///
    /// Returns whether anything changed. Parent directories are created as needed.
    pub fn write_if_changed(&mut self, rel: &Utf8Path, contents: &str) -> EditResult<bool> {
        let abs = self.abs(rel)?;
        let current = self.current_bytes(rel)?;
        if current.as_deref() == Some(contents.as_bytes()) {
            debug!(path = %rel, "unchanged");
            return Ok(false);
        }

        self.note_original(rel, current.as_deref());
        if self.opts.dry_run {
            self.overlay
                .insert(rel.to_path_buf(), Some(contents.to_string()));
        } else {
            if let Some(parent) = abs.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create parent dir for {}", abs))?;
            }
            fs::write(&abs, contents).with_context(|| format!("write {}", abs))?;
        }

        let kind = if current.is_some() {
            ChangeKind::Modified
        } else {
            ChangeKind::Created
        };
        self.record(
            rel,
            kind,
            current.as_deref().map(sha256_hex),
            Some(sha256_hex(contents.as_bytes())),
        );
        info!(path = %rel, rule = self.rule.as_deref().unwrap_or("-"), dry_run = self.opts.dry_run, "wrote");
        Ok(true)
    }

    /// Read `rel`, let `edit` produce new text, and write it if it differs.
    ///
    /// A missing file or an `edit` returning `None` is a no-op.
    pub fn rewrite<F>(&mut self, rel: &Utf8Path, edit: F) -> EditResult<bool>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let Some(current) = self.read_to_string(rel)? else {
            debug!(path = %rel, "rewrite target absent");
            return Ok(false);
        };
        match edit(&current) {
            Some(next) if next != current => self.write_if_changed(rel, &next),
            _ => Ok(false),
        }
    }

    /// Delete a file. Missing files are a no-op.
    pub fn remove_file(&mut self, rel: &Utf8Path) -> EditResult<bool> {
        let abs = self.abs(rel)?;
        let Some(current) = self.current_bytes(rel)? else {
            return Ok(false);
        };

        self.note_original(rel, Some(&current));
        if self.opts.dry_run {
            self.overlay.insert(rel.to_path_buf(), None);
        } else {
            fs::remove_file(&abs).with_context(|| format!("remove {}", abs))?;
        }
        self.record(rel, ChangeKind::Deleted, Some(sha256_hex(&current)), None);
        info!(path = %rel, rule = self.rule.as_deref().unwrap_or("-"), dry_run = self.opts.dry_run, "deleted");
        Ok(true)
    }

    /// Move `from` to `to`, prefixing its content with `marker` on its own line.
    ///
    /// The original is deleted. Missing `from` is a no-op.
    pub fn quarantine(&mut self, from: &Utf8Path, to: &Utf8Path, marker: &str) -> EditResult<bool> {
        let Some(content) = self.read_to_string(from)? else {
            return Ok(false);
        };
        let labelled = format!("{marker}\n{content}");
        let wrote = self.write_if_changed(to, &labelled)?;
        let removed = self.remove_file(from)?;
        Ok(wrote || removed)
    }

    /// Delete a directory tree. Missing directories are a no-op.
    pub fn remove_dir_all(&mut self, rel: &Utf8Path) -> EditResult<bool> {
        let abs = self.abs(rel)?;
        if self.opts.dry_run && self.in_removed_dir(rel) {
            return Ok(false);
        }
        if !abs.is_dir() {
            return Ok(false);
        }

        if self.opts.dry_run {
            self.overlay.retain(|path, _| !path.starts_with(rel));
            self.removed_dirs.insert(rel.to_path_buf());
        } else {
            fs::remove_dir_all(&abs).with_context(|| format!("remove {}", abs))?;
        }
        self.record(rel, ChangeKind::DirRemoved, None, None);
        info!(path = %rel, rule = self.rule.as_deref().unwrap_or("-"), dry_run = self.opts.dry_run, "removed directory");
        Ok(true)
    }

    /// Files directly inside `dir` whose extension is `ext`, as sorted repo-relative paths.
    pub fn list_files(&self, dir: &Utf8Path, ext: &str) -> EditResult<Vec<Utf8PathBuf>> {
        let abs = self.abs(dir)?;
        let mut out = BTreeSet::new();

        let dir_removed = self.opts.dry_run && self.in_removed_dir(dir);
        if !dir_removed && abs.is_dir() {
            for entry in fs::read_dir(&abs).with_context(|| format!("list {}", abs))? {
                let entry = entry.with_context(|| format!("list {}", abs))?;
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                let rel = dir.join(&name);
                if Utf8Path::new(&name).extension() == Some(ext) && self.root.join(&rel).is_file() {
                    out.insert(rel);
                }
            }
        }

        if self.opts.dry_run {
            for (path, entry) in &self.overlay {
                if path.parent() != Some(dir) || path.extension() != Some(ext) {
                    continue;
                }
                if entry.is_some() {
                    out.insert(path.clone());
                } else {
                    out.remove(path);
                }
            }
        }

        Ok(out.into_iter().collect())
    }

    /// Unified diff of every text file touched so far (original state vs now).
    pub fn render_patch(&self) -> EditResult<String> {
        let mut out = String::new();
        let formatter = PatchFormatter::new();
        for (path, original) in &self.originals {
            let now = self
                .current_bytes(path)?
                .map(|b| String::from_utf8_lossy(&b).into_owned());
            if &now == original {
                continue;
            }
            let before = original.as_deref().unwrap_or("");
            let after = now.as_deref().unwrap_or("");
            let patch = diffy::create_patch(before, after);
            let rendered = formatter.fmt_patch(&patch).to_string();
            // Drop diffy's generic "--- original / +++ modified" header lines.
            let body = rendered.splitn(3, '\n').nth(2).unwrap_or("");

            let old = if original.is_some() {
                format!("a/{}", path)
            } else {
                "/dev/null".to_string()
            };
            let new = if now.is_some() {
                format!("b/{}", path)
            } else {
                "/dev/null".to_string()
            };
            out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
            out.push_str(&format!("--- {}\n+++ {}\n{}", old, new, body));
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
        Ok(out)
    }

    /// sha256 of every file under the paths matching `pattern`, keyed by repo-relative path.
    ///
    /// Matched directories are walked recursively. Always reads the real tree: this is for
    /// output of external tools, which never goes through the overlay.
    pub fn snapshot(&self, pattern: &Utf8Path) -> EditResult<BTreeMap<Utf8PathBuf, String>> {
        check_relative(pattern)?;
        let full = format!(
            "{}/{}",
            Pattern::escape(self.root.as_str()).trim_end_matches('/'),
            pattern
        );
        let paths = glob::glob(&full).with_context(|| format!("glob {}", pattern))?;

        let mut out = BTreeMap::new();
        for entry in paths {
            let path = entry.with_context(|| format!("glob {}", pattern))?;
            let Ok(path) = Utf8PathBuf::from_path_buf(path) else {
                continue;
            };
            self.hash_tree(&path, &mut out)?;
        }
        Ok(out)
    }

    /// Journal how the files in `before` turned into `after`, as taken by [`Self::snapshot`]
    /// around an external tool run. Returns whether anything differs.
    pub fn record_external(
        &mut self,
        before: &BTreeMap<Utf8PathBuf, String>,
        after: &BTreeMap<Utf8PathBuf, String>,
    ) -> bool {
        let paths: BTreeSet<&Utf8PathBuf> = before.keys().chain(after.keys()).collect();
        let mut changed = false;
        for path in paths {
            let (old, new) = (before.get(path), after.get(path));
            let kind = match (old, new) {
                (None, Some(_)) => ChangeKind::Created,
                (Some(_), None) => ChangeKind::Deleted,
                (Some(a), Some(b)) if a != b => ChangeKind::Modified,
                _ => continue,
            };
            self.record(path, kind, old.cloned(), new.cloned());
            info!(path = %path, rule = self.rule.as_deref().unwrap_or("-"), kind = kind.as_str(), "regenerated");
            changed = true;
        }
        changed
    }

    fn hash_tree(
        &self,
        path: &Utf8Path,
        out: &mut BTreeMap<Utf8PathBuf, String>,
    ) -> EditResult<()> {
        if path.is_dir() {
            for entry in fs::read_dir(path).with_context(|| format!("list {}", path))? {
                let entry = entry.with_context(|| format!("list {}", path))?;
                let Ok(child) = Utf8PathBuf::from_path_buf(entry.path()) else {
                    continue;
                };
                self.hash_tree(&child, out)?;
            }
        } else if path.is_file() {
            let bytes = fs::read(path).with_context(|| format!("read {}", path))?;
            let rel = path.strip_prefix(&self.root).unwrap_or(path);
            out.insert(rel.to_path_buf(), sha256_hex(&bytes));
        }
        Ok(())
    }

    fn in_removed_dir(&self, rel: &Utf8Path) -> bool {
        self.removed_dirs.iter().any(|d| rel.starts_with(d))
    }

    fn current_bytes(&self, rel: &Utf8Path) -> EditResult<Option<Vec<u8>>> {
        let abs = self.abs(rel)?;
        if self.opts.dry_run {
            if let Some(entry) = self.overlay.get(rel) {
                return Ok(entry.as_ref().map(|s| s.as_bytes().to_vec()));
            }
            if self.in_removed_dir(rel) {
                return Ok(None);
            }
        }
        match fs::read(&abs) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EditError::Runtime(
                anyhow::Error::new(e).context(format!("read {}", abs)),
            )),
        }
    }

    fn note_original(&mut self, rel: &Utf8Path, current: Option<&[u8]>) {
        self.originals
            .entry(rel.to_path_buf())
            .or_insert_with(|| current.map(|b| String::from_utf8_lossy(b).into_owned()));
    }

    fn record(
        &mut self,
        rel: &Utf8Path,
        kind: ChangeKind,
        sha256_before: Option<String>,
        sha256_after: Option<String>,
    ) {
        self.journal.push(FileChange {
            path: rel.as_str().replace('\\', "/"),
            kind,
            rule: self.rule.clone(),
            sha256_before,
            sha256_after,
        });
    }
}

fn check_relative(rel: &Utf8Path) -> EditResult<()> {
    let escapes = rel.is_absolute()
        || rel.components().any(|c| {
            matches!(
                c,
                Utf8Component::ParentDir | Utf8Component::RootDir | Utf8Component::Prefix(_)
            )
        });
    if escapes {
        return Err(EditError::PathEscapesRoot {
            path: rel.to_path_buf(),
        });
    }
    Ok(())
}
