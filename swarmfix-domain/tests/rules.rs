//! Rule behavior against temporary repository trees.

use camino::{Utf8Path, Utf8PathBuf};
use pretty_assertions::assert_eq;
use std::fs;
use swarmfix_domain::templates::{BUILD_CONFIG, QUARANTINE_MARKER, SHARED_TYPES, SHARED_TYPES_EXT};
use swarmfix_domain::{Dispatcher, RepoLayout, RuleContext};
use swarmfix_edit::{
    RecordingToolRunner, ToolInvocation, ToolOutcome, ToolRunner, Workspace, WorkspaceOptions,
};
use swarmfix_logs::LogBuffers;
use swarmfix_types::change::ChangeKind;
use tempfile::TempDir;

struct Repo {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl Repo {
    fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        Self { _temp: temp, root }
    }

    fn write(&self, rel: &str, contents: &str) {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).unwrap()
    }

    fn exists(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }

    fn workspace(&self) -> Workspace {
        Workspace::new(self.root.clone(), WorkspaceOptions::default())
    }
}

fn dispatch(repo: &Repo, buffers: &LogBuffers, tools: &RecordingToolRunner) -> Workspace {
    let layout = RepoLayout::default();
    let ctx = RuleContext {
        layout: &layout,
        tools,
    };
    let mut ws = repo.workspace();
    Dispatcher::new()
        .dispatch(buffers, &ctx, &mut ws)
        .expect("dispatch");
    ws
}

const SOURCE_ERROR: &str = "error: cannot find type 'ProcessorParams' in scope";
const BUNDLE_DIR_ERROR: &str =
    "CMake Error: $<TARGET_BUNDLE_DIR:MoreMojoPlugin> TARGET_BUNDLE_DIR is allowed only for Bundle targets";

#[test]
fn source_unification_quarantines_legacy_duplicate() {
    let repo = Repo::new();
    let legacy = "import Foundation\npublic struct ProcessorParams { var drive: Float }\n";
    repo.write("app/Sources/ProcessorParams.swift", legacy);

    let ws = dispatch(&repo, &LogBuffers::new(SOURCE_ERROR, ""), &RecordingToolRunner::new());

    assert!(!repo.exists("app/Sources/ProcessorParams.swift"));
    assert_eq!(
        repo.read("app/Quarantine/ProcessorParams_DEPRECATED.swift"),
        format!("{QUARANTINE_MARKER}\n{legacy}")
    );
    assert_eq!(repo.read("app/Sources/SharedTypes.swift"), SHARED_TYPES);
    assert_eq!(repo.read("app/Sources/ProcessorParams+Ext.swift"), SHARED_TYPES_EXT);
    assert!(ws.journal().iter().all(|c| c.rule.as_deref() == Some("source-unification")));
}

#[test]
fn legacy_file_without_duplicates_is_left_alone() {
    let repo = Repo::new();
    let legacy = "import Foundation\nextension ProcessorParams { public enum MojoLevel { case a } }\n";
    repo.write("app/Sources/ProcessorParams.swift", legacy);

    dispatch(&repo, &LogBuffers::new(SOURCE_ERROR, ""), &RecordingToolRunner::new());

    assert_eq!(repo.read("app/Sources/ProcessorParams.swift"), legacy);
    assert!(!repo.exists("app/Quarantine/ProcessorParams_DEPRECATED.swift"));
}

#[test]
fn source_unification_sweeps_every_source_file() {
    let repo = Repo::new();
    repo.write(
        "app/Sources/MojoMacro.swift",
        "var m: ProcessorParams.InterpMode = .liveHB4x\nlet a = MojoMacroMode.app\nlet s = MojoMacroMode.steal\n",
    );
    repo.write(
        "app/Sources/AudioEngine.swift",
        "import AVFoundation\n\nclass AudioEngine {\n    var params = ProcessorParams()\n}\n",
    );
    repo.write(
        "app/Sources/StealMojoSwift.swift",
        "func match() {\n    bands.append(.init(lo: 0, hi: 1, gain_dB: 2))\n}\n",
    );

    dispatch(&repo, &LogBuffers::new(SOURCE_ERROR, ""), &RecordingToolRunner::new());

    assert_eq!(
        repo.read("app/Sources/MojoMacro.swift"),
        "var m: InterpMode = .liveHB4x\nlet a = MojoMacroMode.appDecides\nlet s = MojoMacroMode.stealMacro\n"
    );
    assert!(repo
        .read("app/Sources/AudioEngine.swift")
        .contains("class AudioEngine: ObservableObject {"));
    assert_eq!(
        repo.read("app/Sources/StealMojoSwift.swift"),
        "func match() {\n    var bands: [MojoEQBand] = []\n    bands.append(MojoEQBand(lo: 0, hi: 1, gain_dB: 2))\n}\n"
    );
}

#[test]
fn build_config_purges_cache_only_when_config_changed() {
    let repo = Repo::new();
    repo.write("plugin/CMakeLists.txt", "add_custom_command($<TARGET_BUNDLE_DIR:MoreMojoPlugin>)\n");
    repo.write("plugin/build/CMakeCache.txt", "stale");

    let buffers = LogBuffers::new("", BUNDLE_DIR_ERROR);
    dispatch(&repo, &buffers, &RecordingToolRunner::new());
    assert_eq!(repo.read("plugin/CMakeLists.txt"), BUILD_CONFIG);
    assert!(!repo.exists("plugin/build"));

    // Config already correct: a fresh cache must survive.
    repo.write("plugin/build/CMakeCache.txt", "fresh");
    let ws = dispatch(&repo, &buffers, &RecordingToolRunner::new());
    assert!(repo.exists("plugin/build/CMakeCache.txt"));
    assert!(ws.journal().is_empty());
}

#[test]
fn plugin_signature_resets_config_and_removes_cache() {
    let repo = Repo::new();
    repo.write("plugin/build/junk.o", "x");

    dispatch(
        &repo,
        &LogBuffers::new("", "$<TARGET_BUNDLE_DIR:MoreMojoPlugin>"),
        &RecordingToolRunner::new(),
    );

    assert_eq!(repo.read("plugin/CMakeLists.txt"), BUILD_CONFIG);
    assert!(!repo.exists("plugin/build"));
}

#[test]
fn workflow_guard_inserts_steps_once() {
    let repo = Repo::new();
    repo.write(
        ".github/workflows/build_with_logs.yml",
        "jobs:\n  build:\n    runs-on: macos-14\n    steps:\n      - uses: actions/checkout@v4\n      - run: ./build.sh\n",
    );
    let buffers = LogBuffers::new("", BUNDLE_DIR_ERROR);

    dispatch(&repo, &buffers, &RecordingToolRunner::new());
    let once = repo.read(".github/workflows/build_with_logs.yml");
    assert!(once.contains("Guard against raw swiftc usage"));
    assert!(once.contains("Guard CMake for forbidden commands"));

    let ws = dispatch(&repo, &buffers, &RecordingToolRunner::new());
    assert_eq!(repo.read(".github/workflows/build_with_logs.yml"), once);
    assert!(ws.journal().is_empty());
}

#[test]
fn regeneration_installs_generator_and_runs_it_with_manifest() {
    let repo = Repo::new();
    repo.write("app/project.yml", "name: MoreMojo\n");
    let tools = RecordingToolRunner::new();

    dispatch(
        &repo,
        &LogBuffers::new("The project is in a future Xcode project file format", ""),
        &tools,
    );

    assert_eq!(
        tools.command_lines(),
        vec!["brew update", "brew install xcodegen", "xcodegen generate"]
    );
    assert_eq!(tools.calls()[2].cwd, repo.root.join("app"));
}

#[test]
fn regeneration_without_manifest_only_attempts_install() {
    let repo = Repo::new();
    let tools = RecordingToolRunner::new()
        .with_outcome(ToolOutcome::Failed { code: Some(1) });

    let ws = dispatch(&repo, &LogBuffers::new("No shared schemes found", ""), &tools);

    assert_eq!(
        tools.command_lines(),
        vec!["brew update", "brew install xcodegen"]
    );
    assert!(ws.journal().is_empty());
}

#[test]
fn generator_already_installed_is_not_reinstalled() {
    let repo = Repo::new();
    repo.write("app/project.yml", "name: MoreMojo\n");
    let tools = RecordingToolRunner::new().with_available("xcodegen");

    dispatch(&repo, &LogBuffers::new("No shared schemes found", ""), &tools);

    assert_eq!(tools.command_lines(), vec!["xcodegen generate"]);
}

/// Stands in for the project generator: `xcodegen generate` writes a fixed project bundle.
struct ProjectWriter {
    root: Utf8PathBuf,
    contents: &'static str,
}

impl ToolRunner for ProjectWriter {
    fn is_available(&self, _program: &str) -> bool {
        true
    }

    fn run(&self, invocation: &ToolInvocation) -> ToolOutcome {
        let bundle = self.root.join("app/MoreMojo.xcodeproj");
        fs::create_dir_all(&bundle).unwrap();
        fs::write(bundle.join("project.pbxproj"), self.contents).unwrap();
        assert_eq!(invocation.command_line(), "xcodegen generate");
        ToolOutcome::Succeeded
    }
}

fn dispatch_changed(
    repo: &Repo,
    buffers: &LogBuffers,
    tools: &dyn ToolRunner,
) -> (bool, Workspace) {
    let layout = RepoLayout::default();
    let ctx = RuleContext {
        layout: &layout,
        tools,
    };
    let mut ws = repo.workspace();
    let outcome = Dispatcher::new()
        .dispatch(buffers, &ctx, &mut ws)
        .expect("dispatch");
    (outcome.any_changed(), ws)
}

#[test]
fn identical_regeneration_reports_no_change() {
    let repo = Repo::new();
    repo.write("app/project.yml", "name: MoreMojo\n");
    repo.write("app/MoreMojo.xcodeproj/project.pbxproj", "// generated\n");
    let tools = RecordingToolRunner::new().with_available("xcodegen");
    let buffers = LogBuffers::new("No shared schemes found", "");

    for _ in 0..2 {
        let (changed, ws) = dispatch_changed(&repo, &buffers, &tools);
        assert!(!changed);
        assert!(ws.journal().is_empty());
    }
    assert_eq!(tools.command_lines(), vec!["xcodegen generate"; 2]);
}

#[test]
fn regenerated_project_is_journaled_once() {
    let repo = Repo::new();
    repo.write("app/project.yml", "name: MoreMojo\n");
    repo.write("app/MoreMojo.xcodeproj/project.pbxproj", "// stale\n");
    let tools = ProjectWriter {
        root: repo.root.clone(),
        contents: "// generated\n",
    };
    // Fires both project-format and scheme; the second regeneration finds nothing new.
    let buffers = LogBuffers::new(
        "xcodebuild: error: Unable to read project 'MoreMojo.xcodeproj'",
        "",
    );

    let (changed, ws) = dispatch_changed(&repo, &buffers, &tools);
    assert!(changed);
    assert_eq!(ws.journal().len(), 1);
    let change = &ws.journal()[0];
    assert_eq!(change.path, "app/MoreMojo.xcodeproj/project.pbxproj");
    assert_eq!(change.kind, ChangeKind::Modified);
    assert_eq!(change.rule.as_deref(), Some("project-format"));

    let (changed, ws) = dispatch_changed(&repo, &buffers, &tools);
    assert!(!changed);
    assert!(ws.journal().is_empty(), "{:?}", ws.journal());
}

#[test]
fn full_dispatch_is_idempotent() {
    let repo = Repo::new();
    repo.write(
        "app/Sources/ProcessorParams.swift",
        "public enum InterpMode: Int { case a }\n",
    );
    repo.write(
        "app/Sources/StealMojoPanel_SwiftOnly.swift",
        "import SwiftUI\nimport AVFoundation\n\nlet b = Button(\"go\"){}.buttonStyle(.borderedProminent)\n",
    );
    repo.write("app/Sources/AudioEngine.swift", "final class AudioEngine: NSObject {}\n");
    repo.write("plugin/CMakeLists.txt", "broken\n");
    repo.write(
        ".github/workflows/build_with_logs.yml",
        "on: push\njobs:\n  b:\n    steps:\n      - uses: actions/checkout@v4\n",
    );
    let buffers = LogBuffers::new(
        format!("{SOURCE_ERROR}\nNo shared schemes found"),
        BUNDLE_DIR_ERROR,
    );

    let first = dispatch(&repo, &buffers, &RecordingToolRunner::new());
    assert!(!first.journal().is_empty());
    let before = snapshot(&repo.root);

    let second = dispatch(&repo, &buffers, &RecordingToolRunner::new());
    assert!(second.journal().is_empty(), "{:?}", second.journal());
    assert_eq!(snapshot(&repo.root), before);
}

#[test]
fn dry_run_leaves_the_tree_untouched() {
    let repo = Repo::new();
    repo.write("plugin/CMakeLists.txt", "broken\n");
    repo.write("plugin/build/cache", "x");
    let before = snapshot(&repo.root);

    let layout = RepoLayout::default();
    let tools = RecordingToolRunner::new();
    let ctx = RuleContext {
        layout: &layout,
        tools: &tools,
    };
    let mut ws = Workspace::new(repo.root.clone(), WorkspaceOptions { dry_run: true });
    let outcome = Dispatcher::new()
        .dispatch(&LogBuffers::new("", BUNDLE_DIR_ERROR), &ctx, &mut ws)
        .expect("dispatch");

    assert!(outcome.any_changed());
    assert_eq!(ws.journal().len(), 2);
    assert_eq!(snapshot(&repo.root), before);
    assert!(ws.render_patch().unwrap().contains("+cmake_minimum_required"));
}

fn snapshot(root: &Utf8Path) -> Vec<(String, String)> {
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

fn walk(root: &Utf8Path, dir: &Utf8Path, out: &mut Vec<(String, String)>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = Utf8PathBuf::from_path_buf(entry.unwrap().path()).unwrap();
        if path.is_dir() {
            walk(root, &path, out);
        } else {
            let rel = path.strip_prefix(root).unwrap().to_string();
            out.push((rel, fs::read_to_string(&path).unwrap_or_default()));
        }
    }
}
