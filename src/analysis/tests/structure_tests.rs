use super::write_file;
use crate::analysis::structure::summarize;
use std::fs;
use tempfile::TempDir;

fn setup_test_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write_file(root, "package.json", r#"{"name": "demo"}"#);
    write_file(root, "src/index.js", "console.log('hi');");
    write_file(root, "src/App.JSX", "export default () => null;");
    write_file(root, "src/lib/util.js", "module.exports = {};");
    write_file(root, "Makefile", "all:\n\techo ok\n");
    write_file(root, "node_modules/react/index.js", "module.exports = {};");
    write_file(root, "node_modules/react/package.json", "{}");
    write_file(root, "debug.log", "noise");

    temp_dir
}

#[test]
fn test_counts_non_excluded_entries() {
    let temp_dir = setup_test_project();
    let summary = summarize(temp_dir.path(), 10);

    // package.json, index.js, App.JSX, util.js, Makefile
    assert_eq!(summary.files, 5);
    // src, src/lib
    assert_eq!(summary.directories, 2);
}

#[test]
fn test_histogram_uses_lowercase_extensions() {
    let temp_dir = setup_test_project();
    let summary = summarize(temp_dir.path(), 10);

    assert_eq!(summary.languages.get(".js"), Some(&2));
    assert_eq!(summary.languages.get(".jsx"), Some(&1));
    assert_eq!(summary.languages.get(".json"), Some(&1));
    assert!(summary.languages.keys().all(|ext| ext.starts_with('.')));
    // Makefile has no extension and is counted only as a file
    assert_eq!(summary.languages.values().sum::<usize>(), 4);
}

#[test]
fn test_depth_cap_truncates_silently() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "a/b/c/d/deep.txt", "deep");
    write_file(temp_dir.path(), "top.txt", "top");

    let summary = summarize(temp_dir.path(), 1);

    // a (depth 1), a/b (depth 2, seen from a) ; nothing below a/b is visited
    assert_eq!(summary.directories, 2);
    assert_eq!(summary.files, 1);
}

#[test]
fn test_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let summary = summarize(temp_dir.path(), 10);

    assert_eq!(summary.files, 0);
    assert_eq!(summary.directories, 0);
    assert!(summary.languages.is_empty());
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_does_not_abort_walk() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "locked/secret.txt", "hidden");
    write_file(temp_dir.path(), "open/visible.txt", "shown");

    let locked = temp_dir.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let summary = summarize(temp_dir.path(), 10);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(summary.directories, 2);
    assert!(summary.files >= 1);
}
