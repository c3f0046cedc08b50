//! Integration tests for repository acquisition against a throwaway local origin

use code_assistant::{acquire_repository, AccessError, CloneOptions, ListOptions};
use git2::{Commit, Repository, Signature};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) {
    let workdir = repo.workdir().expect("workdir");
    fs::write(workdir.join(name), content).expect("write file");

    let mut index = repo.index().expect("index");
    index.add_path(Path::new(name)).expect("add path");
    index.write().expect("write index");
    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");

    let sig = Signature::now("Test", "test@example.com").expect("signature");
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents).expect("commit");
}

fn head_branch(repo: &Repository) -> String {
    repo.head().expect("head").shorthand().expect("utf8").to_string()
}

/// A non-bare repository named `origin` with one commit.
fn init_origin(temp: &TempDir) -> (Repository, String) {
    let dir = temp.path().join("origin");
    fs::create_dir_all(&dir).expect("mkdir origin");
    let repo = Repository::init(&dir).expect("init");
    commit_file(&repo, "README.md", "hello\n", "initial");
    let url = format!("file://{}", dir.canonicalize().expect("canonical").display());
    (repo, url)
}

fn workspace(temp: &TempDir) -> PathBuf {
    temp.path().join("workspace")
}

#[test]
fn second_acquire_reports_existing_copy() {
    let temp = TempDir::new().expect("tmp");
    let (_origin, url) = init_origin(&temp);
    let options = CloneOptions::default();

    let first = acquire_repository(&url, &workspace(&temp), &options, 1024).expect("clone");
    assert!(!first.already_existed);
    assert!(first.local_path.ends_with("origin"));
    assert!(first.local_path.join("README.md").is_file());

    let second = acquire_repository(&url, &workspace(&temp), &options, 1024).expect("pull");
    assert!(second.already_existed);
    assert_eq!(first.local_path, second.local_path);
}

#[test]
fn acquire_refreshes_existing_copy() {
    let temp = TempDir::new().expect("tmp");
    let (origin, url) = init_origin(&temp);
    let options = CloneOptions { depth: 0, ..CloneOptions::default() };

    let first = acquire_repository(&url, &workspace(&temp), &options, 1024).expect("clone");
    assert!(!first.local_path.join("CHANGELOG.md").exists());

    commit_file(&origin, "CHANGELOG.md", "v2\n", "second");
    let second = acquire_repository(&url, &workspace(&temp), &options, 1024).expect("pull");
    assert!(second.already_existed);
    assert_eq!(fs::read_to_string(second.local_path.join("CHANGELOG.md")).expect("read"), "v2\n");
}

#[test]
fn clone_reports_checked_out_branch() {
    let temp = TempDir::new().expect("tmp");
    let (origin, url) = init_origin(&temp);

    let handle = acquire_repository(&url, &workspace(&temp), &CloneOptions::default(), 1024)
        .expect("clone");
    assert_eq!(handle.default_branch.as_deref(), Some(head_branch(&origin).as_str()));
    assert_eq!(handle.depth, 1);
    assert_eq!(handle.max_file_bytes, 1024);
}

#[test]
fn single_branch_clone_of_named_branch() {
    let temp = TempDir::new().expect("tmp");
    let (origin, url) = init_origin(&temp);
    {
        let head = origin.head().expect("head").peel_to_commit().expect("commit");
        origin.branch("feature", &head, false).expect("branch");
    }
    commit_file(&origin, "extra.txt", "only on default branch\n", "extra");

    let options = CloneOptions {
        depth: 0,
        branch: Some("feature".to_string()),
        single_branch: true,
    };
    let handle = acquire_repository(&url, &workspace(&temp), &options, 1024).expect("clone");
    assert_eq!(handle.default_branch.as_deref(), Some("feature"));
    assert!(handle.local_path.join("README.md").is_file());
    assert!(!handle.local_path.join("extra.txt").exists());
}

#[test]
fn concurrent_acquires_clone_once() {
    let temp = TempDir::new().expect("tmp");
    let (_origin, url) = init_origin(&temp);
    let url = Arc::new(url);
    let root = Arc::new(workspace(&temp));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let url = Arc::clone(&url);
            let root = Arc::clone(&root);
            std::thread::spawn(move || {
                acquire_repository(&url, &root, &CloneOptions::default(), 1024)
                    .expect("acquire")
                    .already_existed
            })
        })
        .collect();

    let fresh = handles.into_iter().map(|h| h.join().expect("join")).filter(|existed| !existed);
    assert_eq!(fresh.count(), 1, "exactly one caller should clone");
}

#[test]
fn failed_clone_leaves_nothing_behind() {
    let temp = TempDir::new().expect("tmp");
    let missing = temp.path().join("does-not-exist");
    let url = format!("file://{}/repo.git", missing.display());

    let err = acquire_repository(&url, &workspace(&temp), &CloneOptions::default(), 1024)
        .expect_err("clone should fail");
    assert!(matches!(err, AccessError::Clone { .. }), "got {err:?}");
    assert!(!workspace(&temp).join("repo").exists());
}

#[test]
fn diverged_copy_is_a_pull_error() {
    let temp = TempDir::new().expect("tmp");
    let (origin, url) = init_origin(&temp);
    let options = CloneOptions { depth: 0, ..CloneOptions::default() };

    let handle = acquire_repository(&url, &workspace(&temp), &options, 1024).expect("clone");
    let local = Repository::open(&handle.local_path).expect("open clone");
    commit_file(&local, "local.txt", "mine\n", "local change");
    commit_file(&origin, "remote.txt", "theirs\n", "remote change");

    let err = acquire_repository(&url, &workspace(&temp), &options, 1024)
        .expect_err("diverged pull should fail");
    assert!(matches!(err, AccessError::Pull { .. }), "got {err:?}");
    assert!(handle.local_path.join("local.txt").is_file());
}

#[test]
fn pull_keeps_uncommitted_edits() {
    let temp = TempDir::new().expect("tmp");
    let (origin, url) = init_origin(&temp);
    let options = CloneOptions { depth: 0, ..CloneOptions::default() };

    let handle = acquire_repository(&url, &workspace(&temp), &options, 1024).expect("clone");
    let readme = handle.local_path.join("README.md");
    fs::write(&readme, "local edit\n").expect("edit");
    let before = Repository::open(&handle.local_path)
        .expect("open clone")
        .head()
        .expect("head")
        .target();

    commit_file(&origin, "README.md", "upstream edit\n", "upstream");
    let err = acquire_repository(&url, &workspace(&temp), &options, 1024)
        .expect_err("checkout over local edits should fail");
    assert!(matches!(err, AccessError::Pull { .. }), "got {err:?}");

    assert_eq!(fs::read_to_string(&readme).expect("read"), "local edit\n");
    let after = Repository::open(&handle.local_path)
        .expect("open clone")
        .head()
        .expect("head")
        .target();
    assert_eq!(before, after, "branch must not move when checkout fails");
}

#[test]
fn unreachable_remote_is_a_clone_error() {
    let temp = TempDir::new().expect("tmp");
    let err = acquire_repository(
        "http://127.0.0.1:1/owner/unreachable.git",
        &workspace(&temp),
        &CloneOptions::default(),
        1024,
    )
    .expect_err("nothing listens on port 1");
    assert!(matches!(err, AccessError::Clone { .. }), "got {err:?}");
    assert!(!workspace(&temp).join("unreachable").exists());
}

#[test]
fn local_directory_is_used_in_place() {
    let temp = TempDir::new().expect("tmp");
    let (origin, _url) = init_origin(&temp);
    let workdir = origin.workdir().expect("workdir").to_path_buf();
    fs::create_dir_all(workdir.join("src")).expect("mkdir src");

    let locator = workdir.join("src").display().to_string();
    let handle = acquire_repository(&locator, &workspace(&temp), &CloneOptions::default(), 1024)
        .expect("local");
    assert!(handle.already_existed);
    assert_eq!(handle.local_path, workdir.canonicalize().expect("canonical"));
    assert_eq!(handle.default_branch.as_deref(), Some(head_branch(&origin).as_str()));
    assert!(!workspace(&temp).exists(), "nothing is cloned for local paths");
}

#[test]
fn missing_local_directory_is_an_error() {
    let temp = TempDir::new().expect("tmp");
    let locator = temp.path().join("nope").display().to_string();

    let err = acquire_repository(&locator, &workspace(&temp), &CloneOptions::default(), 1024)
        .expect_err("missing path");
    assert!(matches!(err, AccessError::NotADirectory(_)));
}

#[test]
fn handle_lists_and_reads_working_copy() {
    let temp = TempDir::new().expect("tmp");
    let (_origin, url) = init_origin(&temp);

    let handle = acquire_repository(&url, &workspace(&temp), &CloneOptions::default(), 1024)
        .expect("clone");
    let files = handle.list_files(&ListOptions::default()).expect("list");
    let names: Vec<String> = files.iter().filter_map(|f| handle.relative_path(f)).collect();
    assert_eq!(names, vec!["README.md"]);

    let content = handle.read_file(Path::new("README.md"));
    assert_eq!(content.text(), Some("hello\n"));
    assert_eq!(content.encoding(), Some("utf-8"));
}
