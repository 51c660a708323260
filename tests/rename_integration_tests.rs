//! End-to-end rename runs against temporary directory trees.

use std::fs::{self, File};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use mass_rename::mass_rename::{MassRename, RenameRequest, RenameStats};
use mass_rename::prompt::Prompt;
use tempfile::TempDir;

/// Create the test tree:
///
/// ```text
/// testdir/
///   another file.txt
///   file1.txt
///   file2.log
///   subdir/
///     subfile1.txt
/// ```
fn create_test_dir() -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path().join("testdir");
    fs::create_dir(&root).expect("Failed to create test dir");
    for name in ["file1.txt", "file2.log", "another file.txt"] {
        File::create(root.join(name)).expect("Failed to create file");
    }
    let subdir = root.join("subdir");
    fs::create_dir(&subdir).expect("Failed to create subdir");
    File::create(subdir.join("subfile1.txt")).expect("Failed to create file");
    (temp_dir, root)
}

fn forced_request(directory: &Path, pattern: &str, replacement: &str) -> RenameRequest {
    RenameRequest {
        directory: directory.to_path_buf(),
        pattern: pattern.to_string(),
        replacement: replacement.to_string(),
        force: true,
        ..Default::default()
    }
}

fn run(request: RenameRequest) -> RenameStats {
    let mut output = Vec::new();
    let mut prompt = Prompt::new(Cursor::new(&b""[..]), &mut output);
    MassRename::new(request)
        .expect("request should be valid")
        .run_with_prompt(&mut prompt)
        .expect("run should succeed")
}

fn names_in(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(directory)
        .expect("Failed to read dir")
        .map(|entry| entry.expect("Failed to read entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn basic_rename() {
    let (_temp_dir, root) = create_test_dir();
    let stats = run(forced_request(&root, r"file(.*)\.txt", r"newfile\1.txt"));

    assert_eq!(stats.renamed, 1);
    assert!(!root.join("file1.txt").exists());
    assert!(root.join("newfile1.txt").exists());
    assert!(root.join("file2.log").exists());
    assert!(root.join("another file.txt").exists());
    assert!(root.join("subdir").join("subfile1.txt").exists());
}

#[test]
fn recursive_rename() {
    let (_temp_dir, root) = create_test_dir();
    let mut request = forced_request(&root, r"(.*)\.txt", r"\1.bak");
    request.recursive = true;
    let stats = run(request);

    assert_eq!(stats.renamed, 3);
    assert_eq!(stats.directories, 2);
    assert_eq!(names_in(&root), vec!["another file.bak", "file1.bak", "file2.log", "subdir"]);
    assert_eq!(names_in(&root.join("subdir")), vec!["subfile1.bak"]);
}

#[test]
fn non_recursive_rename_only_touches_direct_children() {
    let (_temp_dir, root) = create_test_dir();
    let stats = run(forced_request(&root, r"(.*)\.txt", r"\1.bak"));

    assert_eq!(stats.renamed, 2);
    assert_eq!(stats.directories, 1);
    assert_eq!(names_in(&root.join("subdir")), vec!["subfile1.txt"]);
}

#[test]
fn ignore_case() {
    let (_temp_dir, root) = create_test_dir();
    File::create(root.join("FILE3.TXT")).expect("Failed to create file");
    let mut request = forced_request(&root, r"file(.*)\.txt", r"newfile\1.txt");
    request.ignorecase = true;
    run(request);

    assert!(!root.join("file1.txt").exists());
    assert!(root.join("newfile1.txt").exists());
    assert!(!root.join("FILE3.TXT").exists());
    assert!(root.join("newfile3.txt").exists());
}

#[test]
fn collision_keeps_single_winner() {
    let (_temp_dir, root) = create_test_dir();
    File::create(root.join("a.txt")).expect("Failed to create file");
    File::create(root.join("b.txt")).expect("Failed to create file");
    let mut request = forced_request(&root, r".*\.txt", "c.txt");
    request.verbose = true;
    let stats = run(request);

    assert_eq!(stats.renamed, 1);
    assert_eq!(stats.rejected, 3);

    let txt_files: Vec<String> = names_in(&root)
        .into_iter()
        .filter(|name| name.ends_with(".txt"))
        .collect();
    assert!(txt_files.contains(&"c.txt".to_string()));
    assert!(txt_files.len() > 1);
    // First in name order gets the destination.
    assert_eq!(txt_files, vec!["another file.txt", "b.txt", "c.txt", "file1.txt"]);
}

#[test]
fn collision_with_existing_file_keeps_both() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path();
    fs::write(root.join("draft.md"), "draft").expect("Failed to write file");
    fs::write(root.join("final.md"), "final").expect("Failed to write file");

    let stats = run(forced_request(root, r"draft\.md", "final.md"));

    assert_eq!(stats.renamed, 0);
    assert_eq!(stats.rejected, 1);
    assert_eq!(fs::read_to_string(root.join("draft.md")).expect("read"), "draft");
    assert_eq!(fs::read_to_string(root.join("final.md")).expect("read"), "final");
}

#[test]
fn unmatched_files_are_never_renamed() {
    let (_temp_dir, root) = create_test_dir();
    let mut request = forced_request(&root, r"nothing_(\d+)", r"\1");
    request.recursive = true;
    let stats = run(request);

    assert_eq!(stats.renamed, 0);
    assert_eq!(stats.planned, 0);
    assert_eq!(
        names_in(&root),
        vec!["another file.txt", "file1.txt", "file2.log", "subdir"]
    );
    assert_eq!(names_in(&root.join("subdir")), vec!["subfile1.txt"]);
}

#[test]
fn directories_are_renamed_and_recursed() {
    let (_temp_dir, root) = create_test_dir();
    let mut request = forced_request(&root, r"sub(.*)", r"nested\1");
    request.recursive = true;
    run(request);

    assert_eq!(
        names_in(&root),
        vec!["another file.txt", "file1.txt", "file2.log", "nesteddir"]
    );
    assert_eq!(names_in(&root.join("nesteddir")), vec!["nestedfile1.txt"]);
}

#[test]
fn invalid_pattern_fails_before_any_rename() {
    let (_temp_dir, root) = create_test_dir();
    let result = MassRename::new(forced_request(&root, r"file(.*\.txt", r"newfile\1.txt"));

    assert!(result.is_err());
    assert!(root.join("file1.txt").exists());
}

#[test]
fn missing_directory_is_error() {
    let (_temp_dir, root) = create_test_dir();
    let result = MassRename::new(forced_request(&root.join("missing"), r"(.*)", r"\1"));
    assert!(result.is_err());
}
