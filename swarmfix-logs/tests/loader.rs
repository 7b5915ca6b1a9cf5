//! Log corpus loader tests against a temporary repository tree.

use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use std::fs;
use swarmfix_logs::{
    DomainSources, FsArtifactSource, InMemoryArtifactSource, LogSources, NamedBlob, load_all,
    load_domain,
};
use swarmfix_types::Domain;
use tempfile::TempDir;

fn repo_root(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8")
}

fn write(root: &Utf8PathBuf, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn missing_everything_yields_empty_buffers() {
    let temp = tempfile::tempdir().unwrap();
    let root = repo_root(&temp);
    let sources = LogSources::default();
    let artifacts = FsArtifactSource::new(root.join(&sources.artifacts_dir));

    let buffers = load_all(&sources, &root, &artifacts).unwrap();
    assert!(buffers.app.is_empty());
    assert!(buffers.plugin.is_empty());
    assert!(buffers.app.sources().is_empty());
}

#[test]
fn inline_log_and_artifacts_are_concatenated_in_order() {
    let temp = tempfile::tempdir().unwrap();
    let root = repo_root(&temp);
    write(&root, "ci_logs/xcodebuild_app_stdout.log", b"inline app\n");
    write(
        &root,
        "failed_artifacts/app-build-logs/app_preflight.txt",
        b"preflight\n",
    );
    write(
        &root,
        "failed_artifacts/app-build-logs/xcodebuild_app_stdout.log",
        b"downloaded app\n",
    );

    let sources = LogSources::default();
    let artifacts = FsArtifactSource::new(root.join(&sources.artifacts_dir));
    let app = load_domain(Domain::App, &sources, &root, &artifacts).unwrap();

    assert_eq!(app.text(), "inline app\npreflight\ndownloaded app\n");
    assert_eq!(
        app.sources(),
        &[
            "ci_logs/xcodebuild_app_stdout.log".to_string(),
            "app-build-logs/app_preflight.txt".to_string(),
            "app-build-logs/xcodebuild_app_stdout.log".to_string(),
        ]
    );
}

#[test]
fn domains_only_see_their_own_sources() {
    let temp = tempfile::tempdir().unwrap();
    let root = repo_root(&temp);
    write(
        &root,
        "failed_artifacts/plugin-logs/cmake_configure.log",
        b"configure output",
    );

    let sources = LogSources::default();
    let artifacts = FsArtifactSource::new(root.join(&sources.artifacts_dir));
    let buffers = load_all(&sources, &root, &artifacts).unwrap();

    assert!(buffers.app.is_empty());
    assert_eq!(buffers.plugin.text(), "configure output");
}

#[test]
fn undecodable_bytes_never_fail_the_load() {
    let temp = tempfile::tempdir().unwrap();
    let root = repo_root(&temp);
    write(&root, "ci_logs/cmake_configure.log", &[0xfe, 0xff, b'x']);

    let sources = LogSources::default();
    let plugin =
        load_domain(Domain::Plugin, &sources, &root, &InMemoryArtifactSource::empty()).unwrap();
    assert!(plugin.text().ends_with('x'));
    assert!(plugin.text().contains('\u{fffd}'));
}

#[test]
fn cap_keeps_trailing_bytes() {
    let temp = tempfile::tempdir().unwrap();
    let root = repo_root(&temp);
    let sources = LogSources {
        app: DomainSources {
            inline: None,
            patterns: vec!["*.log".to_string()],
        },
        max_buffer_bytes: Some(5),
        ..LogSources::default()
    };
    let artifacts =
        InMemoryArtifactSource::new(vec![NamedBlob::new("build.log", "noise... error")]);

    let app = load_domain(Domain::App, &sources, &root, &artifacts).unwrap();
    assert_eq!(app.text(), "error");
}
