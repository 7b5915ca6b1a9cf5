use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::{MatchOptions, Pattern, glob_with};
use tracing::debug;

/// A named file pulled out of an artifact bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBlob {
    /// Path relative to the artifacts root, `/`-separated (e.g. `app-build-logs/xcodebuild_app_stdout.log`).
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedBlob {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Source of downloaded (already extracted) artifact files.
///
/// Fetching and unpacking the bundles is someone else's job; swarmfix only needs the
/// files whose names match a domain's glob patterns.
pub trait ArtifactSource {
    /// Blobs matching any of `patterns`, grouped by pattern in the given order.
    /// Within one pattern blobs are sorted by name.
    fn fetch(&self, patterns: &[String]) -> anyhow::Result<Vec<NamedBlob>>;
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    }
}

/// Reads artifact files from a directory tree (e.g. `failed_artifacts/`).
#[derive(Debug, Clone)]
pub struct FsArtifactSource {
    root: Utf8PathBuf,
}

impl FsArtifactSource {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn relative_name(&self, path: &Utf8Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .as_str()
            .replace('\\', "/")
    }
}

impl ArtifactSource for FsArtifactSource {
    fn fetch(&self, patterns: &[String]) -> anyhow::Result<Vec<NamedBlob>> {
        if !self.root.is_dir() {
            debug!(root = %self.root, "artifacts root absent; nothing to fetch");
            return Ok(vec![]);
        }

        let escaped_root = Pattern::escape(self.root.as_str());
        let mut out = Vec::new();
        for pattern in patterns {
            let full = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);
            debug!(pattern = %full, "scanning artifacts");

            let mut paths = Vec::new();
            for entry in glob_with(&full, match_options())
                .with_context(|| format!("glob artifacts pattern {pattern}"))?
            {
                let path = match entry {
                    Ok(p) => p,
                    Err(e) => {
                        debug!(error = %e, "skipping unreadable artifact entry");
                        continue;
                    }
                };
                let Ok(path) = Utf8PathBuf::from_path_buf(path) else {
                    debug!("skipping non-utf8 artifact path");
                    continue;
                };
                if path.is_file() {
                    paths.push(path);
                }
            }

            // Deterministic order matters.
            paths.sort();
            for path in paths {
                match fs::read(&path) {
                    Ok(bytes) => out.push(NamedBlob {
                        name: self.relative_name(&path),
                        bytes,
                    }),
                    Err(e) => debug!(path = %path, error = %e, "skipping unreadable artifact"),
                }
            }
        }
        Ok(out)
    }
}

/// In-memory artifact source for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactSource {
    blobs: Vec<NamedBlob>,
}

impl InMemoryArtifactSource {
    pub fn new(blobs: Vec<NamedBlob>) -> Self {
        Self { blobs }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl ArtifactSource for InMemoryArtifactSource {
    fn fetch(&self, patterns: &[String]) -> anyhow::Result<Vec<NamedBlob>> {
        let mut out = Vec::new();
        for raw in patterns {
            let pattern =
                Pattern::new(raw).with_context(|| format!("invalid artifact pattern {raw}"))?;
            let mut matched: Vec<&NamedBlob> = self
                .blobs
                .iter()
                .filter(|b| pattern.matches_with(&b.name, match_options()))
                .collect();
            matched.sort_by(|a, b| a.name.cmp(&b.name));
            out.extend(matched.into_iter().cloned());
        }
        Ok(out)
    }
}
