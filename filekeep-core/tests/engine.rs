//! End-to-end behaviour against a real `git` in a temporary repository.
//! Every test is skipped when no `git` executable is available.

use filekeep_core::{normalize_keyword, ChangeRecord, ChangeStatus, Error, Repository};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn init_repo() -> Option<TempDir> {
    if !git_available() {
        eprintln!("git not available, skipping");
        return None;
    }
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "-q"]);
    git(dir.path(), &["config", "user.name", "Filekeep Test"]);
    git(dir.path(), &["config", "user.email", "filekeep@example.com"]);
    git(dir.path(), &["config", "commit.gpgsign", "false"]);
    Some(dir)
}

fn last_message(dir: &Path) -> String {
    git(dir, &["log", "-1", "--format=%s"])
}

fn status(dir: &Path) -> String {
    git(dir, &["status", "--short", "--untracked-files=all"])
}

/// Commit three versions of notes.txt: "one", "two", "three".
fn with_three_versions(dir: &Path, repo: &Repository) {
    for content in ["one", "two", "three"] {
        std::fs::write(dir.join("notes.txt"), content).unwrap();
        assert_eq!(repo.store_changes().unwrap().committed, vec!["notes.txt"]);
    }
}

#[test]
fn test_open_rejects_plain_directory() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();

    let err = Repository::open(dir.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidDirectory(_)));
}

#[test]
fn test_store_changes_is_idempotent() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    std::fs::write(dir.path().join("a.txt"), "a").unwrap();
    std::fs::write(dir.path().join("b.txt"), "b").unwrap();

    let report = repo.store_changes().unwrap();
    assert_eq!(report.committed, vec!["a.txt", "b.txt"]);
    assert!(report.failed.is_empty());

    let again = repo.store_changes().unwrap();
    assert!(again.is_empty());
    assert_eq!(status(dir.path()), "");
}

#[test]
fn test_untracked_file_is_committed_as_add() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    std::fs::write(dir.path().join("draft.docx"), "draft").unwrap();

    assert_eq!(
        repo.scan().unwrap(),
        vec![ChangeRecord::untracked("draft.docx")]
    );

    repo.store_changes().unwrap();
    assert_eq!(last_message(dir.path()), "Add draft.docx");
}

#[test]
fn test_added_then_modified_message() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "first").unwrap();
    git(dir.path(), &["add", "notes.txt"]);
    std::fs::write(dir.path().join("notes.txt"), "second").unwrap();

    assert_eq!(
        repo.scan().unwrap()[0].codes,
        vec![ChangeStatus::Added, ChangeStatus::Modified]
    );

    repo.store_changes().unwrap();
    assert_eq!(last_message(dir.path()), "Add and modify notes.txt");
    assert_eq!(git(dir.path(), &["show", "HEAD:notes.txt"]), "second");
}

#[test]
fn test_deleted_file_is_committed() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    std::fs::write(dir.path().join("old.txt"), "old").unwrap();
    repo.store_changes().unwrap();

    std::fs::remove_file(dir.path().join("old.txt")).unwrap();
    repo.store_changes().unwrap();

    assert_eq!(last_message(dir.path()), "Delete old.txt");
    assert_eq!(status(dir.path()), "");
}

#[test]
fn test_path_with_spaces() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    std::fs::write(dir.path().join("my notes.txt"), "hello").unwrap();

    assert_eq!(repo.store_changes().unwrap().committed, vec!["my notes.txt"]);
    assert_eq!(repo.versions(dir.path().join("my notes.txt")).unwrap().len(), 1);
}

#[test]
fn test_versions_newest_first_and_head_is_version_one() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    with_three_versions(dir.path(), &repo);

    let versions = repo.versions(dir.path().join("notes.txt")).unwrap();

    assert_eq!(versions.len(), 3);
    assert!(versions.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp));
    assert_eq!(versions[2].message, "Add notes.txt");
    assert_eq!(
        git(dir.path(), &["rev-parse", &versions[0].revision]),
        git(dir.path(), &["rev-parse", "HEAD"])
    );
}

#[test]
fn test_versions_outside_workdir() {
    let Some(dir) = init_repo() else { return };
    let other = TempDir::new().unwrap();
    std::fs::write(other.path().join("x.txt"), "x").unwrap();
    let repo = Repository::open(dir.path()).unwrap();

    assert!(matches!(
        repo.versions(other.path().join("x.txt")),
        Err(Error::Version(_))
    ));
}

#[test]
fn test_versions_follow_renames() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    std::fs::write(dir.path().join("a.txt"), "some reasonably long content\n").unwrap();
    repo.store_changes().unwrap();
    git(dir.path(), &["mv", "a.txt", "b.txt"]);
    git(dir.path(), &["commit", "-q", "-m", "Rename a.txt"]);

    let versions = repo.versions(dir.path().join("b.txt")).unwrap();

    assert_eq!(versions.len(), 2);
    assert_eq!(versions[1].message, "Add a.txt");
}

#[test]
fn test_resolve_target_bounds() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    with_three_versions(dir.path(), &repo);
    let path = dir.path().join("notes.txt");

    assert!(matches!(repo.resolve_target(&path, 0), Err(Error::Version(_))));
    assert!(matches!(repo.resolve_target(&path, 4), Err(Error::Version(_))));
    assert!(matches!(repo.resolve_target("notes.txt", 1), Err(Error::Version(_))));
    assert!(repo.resolve_target(&path, 3).is_ok());
}

#[test]
fn test_open_version_leaves_status_unchanged() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    with_three_versions(dir.path(), &repo);
    std::fs::write(dir.path().join("unrelated.txt"), "pending").unwrap();
    let view_dir = TempDir::new().unwrap();
    let before = status(dir.path());

    for number in 1..=3 {
        let copy = repo
            .open_version(dir.path().join("notes.txt"), number, view_dir.path())
            .unwrap();
        let expected = ["three", "two", "one"][number - 1];
        assert_eq!(std::fs::read_to_string(copy).unwrap(), expected);
    }

    similar_asserts::assert_eq!(before, status(dir.path()));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
        "three"
    );
}

#[test]
fn test_open_version_refuses_unsaved_edits() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    with_three_versions(dir.path(), &repo);
    std::fs::write(dir.path().join("notes.txt"), "unsaved").unwrap();
    let view_dir = TempDir::new().unwrap();

    let err = repo
        .open_version(dir.path().join("notes.txt"), 2, view_dir.path())
        .unwrap_err();

    assert!(matches!(err, Error::Version(_)));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
        "unsaved"
    );
}

#[test]
fn test_restore_adds_one_version() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    with_three_versions(dir.path(), &repo);
    let path = dir.path().join("notes.txt");

    let restored = repo.restore_version(&path, 3).unwrap();

    assert!(restored.is_some());
    let versions = repo.versions(&path).unwrap();
    assert_eq!(versions.len(), 4);
    assert_eq!(versions[0].message, "Restore \"Add notes.txt\"");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "one");
    assert_eq!(status(dir.path()), "");
}

#[test]
fn test_restore_current_version_is_noop() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    with_three_versions(dir.path(), &repo);
    let path = dir.path().join("notes.txt");

    assert!(repo.restore_version(&path, 1).unwrap().is_none());
    assert_eq!(repo.versions(&path).unwrap().len(), 3);
}

#[test]
fn test_ignore_list_excludes_matching_files() {
    let Some(dir) = init_repo() else { return };
    let repo = Repository::open(dir.path()).unwrap();
    let pattern = normalize_keyword(".log").unwrap();

    assert!(repo.add_ignored(&pattern).unwrap());
    assert!(!repo.add_ignored(&pattern).unwrap());
    assert_eq!(repo.ignored().unwrap().len(), 1);
    assert_eq!(last_message(dir.path()), "Add .gitignore");

    std::fs::write(dir.path().join("debug.log"), "noise").unwrap();
    assert!(repo.scan().unwrap().is_empty());

    assert!(repo.remove_ignored("*.log").unwrap());
    assert!(repo.ignored().unwrap().is_empty());
    // removing the pattern stores the ignore file and the now-visible log
    assert_eq!(status(dir.path()), "");
}
