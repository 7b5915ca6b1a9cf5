//! Property-based tests for write-if-changed semantics.

use camino::{Utf8Path, Utf8PathBuf};
use proptest::prelude::*;
use swarmfix_edit::{Workspace, WorkspaceOptions};
use tempfile::TempDir;

fn workspace(temp: &TempDir, dry_run: bool) -> Workspace {
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
    Workspace::new(root, WorkspaceOptions { dry_run })
}

fn arb_text() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[a-zA-Z0-9 .:(){}\n]{0,64}").unwrap()
}

proptest! {
    /// Writing the same content twice changes the tree at most once.
    #[test]
    fn second_write_is_noop(initial in arb_text(), next in arb_text(), dry_run in any::<bool>()) {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("f.txt"), &initial).unwrap();
        let mut ws = workspace(&temp, dry_run);
        let rel = Utf8Path::new("f.txt");

        let first = ws.write_if_changed(rel, &next).unwrap();
        prop_assert_eq!(first, initial != next);
        prop_assert!(!ws.write_if_changed(rel, &next).unwrap());
        prop_assert_eq!(ws.journal().len(), usize::from(first));
        prop_assert_eq!(ws.read_to_string(rel).unwrap(), Some(next.clone()));
    }

    /// A rewrite that returns its input untouched never journals anything.
    #[test]
    fn identity_rewrite_is_noop(initial in arb_text()) {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("f.txt"), &initial).unwrap();
        let mut ws = workspace(&temp, false);

        let changed = ws
            .rewrite(Utf8Path::new("f.txt"), |s| Some(s.to_string()))
            .unwrap();
        prop_assert!(!changed);
        prop_assert!(ws.journal().is_empty());
        prop_assert!(ws.render_patch().unwrap().is_empty());
    }
}
