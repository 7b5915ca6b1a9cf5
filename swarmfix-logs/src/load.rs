use crate::buffer::{LogBuffers, TextBuffer};
use crate::source::ArtifactSource;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use swarmfix_types::Domain;
use tracing::{debug, warn};

/// Candidate sources for one domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainSources {
    /// Log captured inline by the CI job, relative to the repo root.
    pub inline: Option<Utf8PathBuf>,

    /// Glob patterns matched against file names under the artifacts root.
    pub patterns: Vec<String>,
}

/// Where each domain's log text comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSources {
    /// Root of the downloaded, extracted artifact bundles (relative to the repo root).
    pub artifacts_dir: Utf8PathBuf,

    pub app: DomainSources,
    pub plugin: DomainSources,

    /// Optional per-buffer cap. When exceeded, only the trailing bytes are kept,
    /// since build tools print their fatal errors last.
    pub max_buffer_bytes: Option<u64>,
}

impl Default for LogSources {
    fn default() -> Self {
        Self {
            artifacts_dir: Utf8PathBuf::from("failed_artifacts"),
            app: DomainSources {
                inline: Some(Utf8PathBuf::from("ci_logs/xcodebuild_app_stdout.log")),
                patterns: vec![
                    "**/app_preflight.txt".to_string(),
                    "**/xcodebuild_app_stdout.log".to_string(),
                ],
            },
            plugin: DomainSources {
                inline: Some(Utf8PathBuf::from("ci_logs/cmake_configure.log")),
                patterns: vec![
                    "**/cmake_configure.log".to_string(),
                    "**/cmake_build.log".to_string(),
                ],
            },
            max_buffer_bytes: None,
        }
    }
}

impl LogSources {
    pub fn for_domain(&self, domain: Domain) -> &DomainSources {
        match domain {
            Domain::App => &self.app,
            Domain::Plugin => &self.plugin,
        }
    }
}

fn append_fragment(text: &mut String, bytes: &[u8]) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&String::from_utf8_lossy(bytes));
}

fn keep_tail(text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}

/// Build the text buffer of one domain.
///
/// The inline log comes first, then matching artifact files in discovery order.
/// A fragment that does not end in a newline gets one before the next fragment, so the
/// buffer can be longer than the sources' combined size by one byte per such join.
/// Missing or unreadable sources are skipped; this only fails on a malformed pattern.
pub fn load_domain(
    domain: Domain,
    sources: &LogSources,
    repo_root: &Utf8Path,
    artifacts: &dyn ArtifactSource,
) -> anyhow::Result<TextBuffer> {
    let wanted = sources.for_domain(domain);
    let mut text = String::new();
    let mut names = Vec::new();

    if let Some(inline) = &wanted.inline {
        let path = repo_root.join(inline);
        match fs::read(&path) {
            Ok(bytes) => {
                append_fragment(&mut text, &bytes);
                names.push(inline.to_string());
            }
            Err(e) => debug!(%domain, path = %path, error = %e, "inline log unavailable"),
        }
    }

    for blob in artifacts.fetch(&wanted.patterns)? {
        append_fragment(&mut text, &blob.bytes);
        names.push(blob.name);
    }

    if let Some(max) = sources.max_buffer_bytes {
        let max = usize::try_from(max).unwrap_or(usize::MAX);
        if text.len() > max {
            warn!(
                %domain,
                bytes = text.len(),
                cap = max,
                "log buffer exceeds cap; keeping the trailing bytes"
            );
            text = keep_tail(text, max);
        }
    }

    debug!(%domain, bytes = text.len(), fragments = names.len(), "loaded log buffer");
    Ok(TextBuffer::new(domain, text, names))
}

/// Build both domain buffers.
pub fn load_all(
    sources: &LogSources,
    repo_root: &Utf8Path,
    artifacts: &dyn ArtifactSource,
) -> anyhow::Result<LogBuffers> {
    Ok(LogBuffers {
        app: load_domain(Domain::App, sources, repo_root, artifacts)?,
        plugin: load_domain(Domain::Plugin, sources, repo_root, artifacts)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{InMemoryArtifactSource, NamedBlob};

    #[test]
    fn fragments_are_newline_separated() {
        let mut text = String::new();
        append_fragment(&mut text, b"first");
        append_fragment(&mut text, b"second\n");
        append_fragment(&mut text, b"third");
        assert_eq!(text, "first\nsecond\nthird");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut text = String::new();
        append_fragment(&mut text, &[b'o', b'k', 0xff, b'!']);
        assert_eq!(text, "ok\u{fffd}!");
    }

    #[test]
    fn joins_add_one_byte_per_unterminated_fragment() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        fs::create_dir_all(root.join("ci_logs")).unwrap();
        fs::write(root.join("ci_logs/cmake_configure.log"), "abc").unwrap();
        let artifacts = InMemoryArtifactSource::new(vec![
            NamedBlob::new("x/cmake_configure.log", "def\n"),
            NamedBlob::new("x/cmake_build.log", "ghi"),
        ]);

        let buffer =
            load_domain(Domain::Plugin, &LogSources::default(), &root, &artifacts).unwrap();

        assert_eq!(buffer.text(), "abc\ndef\nghi");
        assert_eq!(buffer.len(), 3 + 4 + 3 + 1);
        assert_eq!(
            buffer.sources(),
            ["ci_logs/cmake_configure.log", "x/cmake_configure.log", "x/cmake_build.log"]
        );
    }

    #[test]
    fn keep_tail_respects_char_boundaries() {
        let text = "ééé".to_string(); // 6 bytes
        assert_eq!(keep_tail(text.clone(), 3), "é");
        assert_eq!(keep_tail(text.clone(), 4), "éé");
        assert_eq!(keep_tail(text, 10), "ééé");
    }
}
