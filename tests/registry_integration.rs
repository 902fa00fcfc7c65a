//! Integration tests for the repository registry.
//!
//! These tests exercise the registry's end-to-end semantics against real
//! git repositories: idempotent open/clone, the uniform not-registered
//! policy, checkout through the cached handle, and timestamp lookup.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use git_registry::core::types::{RepoLocation, TagName};
use git_registry::git::GitError;
use git_registry::registry::{RegistryError, RepositoryRegistry};

/// Test fixture that creates a real git repository.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository with an initial commit.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);

        std::fs::write(dir.path().join("README.md"), "# Test Repo\n").unwrap();
        run_git(dir.path(), &["add", "README.md"]);
        run_git(dir.path(), &["commit", "-m", "Initial commit"]);

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Registry key for this repository.
    fn location(&self) -> RepoLocation {
        RepoLocation::new(self.path()).unwrap()
    }

    /// Create a file and commit it.
    fn commit_file(&self, path: &str, content: &str, message: &str) {
        std::fs::write(self.dir.path().join(path), content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-m", message]);
    }

    /// Create a lightweight tag at the current HEAD.
    fn tag(&self, name: &str) {
        run_git(self.path(), &["tag", name]);
    }

    /// Get HEAD OID using git directly.
    fn head_oid_raw(&self) -> String {
        git_stdout(self.path(), &["rev-parse", "HEAD"])
    }

    /// Get the committer time of a ref as seconds since epoch.
    fn commit_time_raw(&self, refname: &str) -> i64 {
        git_stdout(self.path(), &["log", "-1", "--format=%ct", refname])
            .parse()
            .expect("not a unix timestamp")
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Run a git command and capture trimmed stdout.
fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

fn tag(name: &str) -> TagName {
    TagName::new(name).unwrap()
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn open_registers_repository() {
    let repo = TestRepo::new();
    let mut registry = RepositoryRegistry::new();

    registry.open(&repo.location()).unwrap();

    assert!(registry.is_registered(&repo.location()));
    assert_eq!(registry.len(), 1);
}

#[test]
fn open_is_idempotent() {
    let repo = TestRepo::new();
    let mut registry = RepositoryRegistry::new();

    registry.open(&repo.location()).unwrap();
    registry.open(&repo.location()).unwrap();

    assert_eq!(registry.len(), 1);
}

#[test]
fn open_failure_registers_nothing() {
    let empty = TempDir::new().unwrap();
    let location = RepoLocation::new(empty.path()).unwrap();
    let mut registry = RepositoryRegistry::new();

    let result = registry.open(&location);
    assert!(matches!(
        result,
        Err(RegistryError::Git(GitError::NotARepo { .. }))
    ));
    assert!(!registry.is_registered(&location));
}

#[test]
fn equivalent_spellings_share_one_handle() {
    let repo = TestRepo::new();
    let mut registry = RepositoryRegistry::new();

    // Same path spelled with a trailing slash and a `.` component
    let spelled = format!("{}/./", repo.path().display());
    let alias = RepoLocation::new(spelled).unwrap();

    registry.open(&repo.location()).unwrap();
    registry.open(&alias).unwrap();

    assert_eq!(registry.len(), 1);
    assert!(registry.is_registered(&alias));
}

// =============================================================================
// Clone Tests
// =============================================================================

#[test]
fn clone_registers_repository() {
    let source = TestRepo::new();
    source.tag("v1.0");

    let dest = TempDir::new().unwrap();
    let location = RepoLocation::new(dest.path().join("clone")).unwrap();
    let mut registry = RepositoryRegistry::new();

    registry
        .clone(source.path().to_str().unwrap(), &location)
        .unwrap();

    assert!(registry.is_registered(&location));
    assert_eq!(registry.list_tags(&location).unwrap(), vec![tag("v1.0")]);
}

#[test]
fn clone_is_idempotent_and_preserves_first_clone() {
    let source = TestRepo::new();
    let dest = TempDir::new().unwrap();
    let location = RepoLocation::new(dest.path().join("clone")).unwrap();
    let mut registry = RepositoryRegistry::new();

    let url = source.path().to_str().unwrap().to_string();
    registry.clone(&url, &location).unwrap();

    // Leave a marker in the first clone's working tree; a re-clone into the
    // same directory would fail or wipe it.
    let marker = location.as_path().join("marker.txt");
    std::fs::write(&marker, "untouched\n").unwrap();

    registry.clone(&url, &location).unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "untouched\n");
}

#[test]
fn clone_failure_registers_nothing() {
    let dest = TempDir::new().unwrap();
    let location = RepoLocation::new(dest.path().join("clone")).unwrap();
    let mut registry = RepositoryRegistry::new();

    let result = registry.clone("/definitely/not/a/real/source", &location);
    assert!(result.is_err());
    assert!(!registry.is_registered(&location));
    assert!(registry.is_empty());
}

// =============================================================================
// Uniform Not-Registered Policy
// =============================================================================

#[test]
fn every_operation_on_unregistered_location_fails_uniformly() {
    let repo = TestRepo::new();
    repo.tag("v1.0");
    let location = repo.location();

    // Repository exists on disk but was never opened or cloned
    let mut registry = RepositoryRegistry::new();

    assert!(matches!(
        registry.list_tags(&location),
        Err(RegistryError::NotRegistered { .. })
    ));
    assert!(matches!(
        registry.checkout_tag(&location, &tag("v1.0")),
        Err(RegistryError::NotRegistered { .. })
    ));
    assert!(matches!(
        registry.tag_commit_date(&location, &tag("v1.0")),
        Err(RegistryError::NotRegistered { .. })
    ));
    assert!(matches!(
        registry.resolve_tag(&location, &tag("v1.0")),
        Err(RegistryError::NotRegistered { .. })
    ));
    assert!(matches!(
        registry.close(&location),
        Err(RegistryError::NotRegistered { .. })
    ));
}

// =============================================================================
// Tag Listing Tests
// =============================================================================

#[test]
fn list_tags_of_registered_repository() {
    let repo = TestRepo::new();
    repo.tag("v1.0");
    let mut registry = RepositoryRegistry::new();
    registry.open(&repo.location()).unwrap();

    assert_eq!(
        registry.list_tags(&repo.location()).unwrap(),
        vec![tag("v1.0")]
    );
}

#[test]
fn list_tags_empty_when_repository_has_none() {
    let repo = TestRepo::new();
    let mut registry = RepositoryRegistry::new();
    registry.open(&repo.location()).unwrap();

    assert!(registry.list_tags(&repo.location()).unwrap().is_empty());
}

#[test]
fn tags_created_after_registration_are_visible() {
    let repo = TestRepo::new();
    let mut registry = RepositoryRegistry::new();
    registry.open(&repo.location()).unwrap();

    repo.tag("after");

    assert_eq!(
        registry.list_tags(&repo.location()).unwrap(),
        vec![tag("after")]
    );
}

// =============================================================================
// Commit Date Tests
// =============================================================================

#[test]
fn tag_commit_date_matches_git() {
    let repo = TestRepo::new();
    repo.tag("v1.0");
    let mut registry = RepositoryRegistry::new();
    registry.open(&repo.location()).unwrap();

    let expected = repo.commit_time_raw("refs/tags/v1.0");
    let date = registry
        .tag_commit_date(&repo.location(), &tag("v1.0"))
        .unwrap();
    assert_eq!(date.timestamp(), expected);
}

#[test]
fn tag_commit_date_missing_tag_is_git_error() {
    let repo = TestRepo::new();
    let mut registry = RepositoryRegistry::new();
    registry.open(&repo.location()).unwrap();

    let result = registry.tag_commit_date(&repo.location(), &tag("ghost"));
    assert!(matches!(
        result,
        Err(RegistryError::Git(GitError::TagNotFound { .. }))
    ));
}

// =============================================================================
// Checkout Tests
// =============================================================================

#[test]
fn checkout_tag_through_cached_handle() {
    let repo = TestRepo::new();
    repo.commit_file("data.txt", "version one\n", "Add data");
    repo.tag("v1.0");
    let tagged = repo.head_oid_raw();
    repo.commit_file("data.txt", "version two\n", "Update data");

    let mut registry = RepositoryRegistry::new();
    registry.open(&repo.location()).unwrap();

    registry.checkout_tag(&repo.location(), &tag("v1.0")).unwrap();

    assert_eq!(repo.head_oid_raw(), tagged);
    let content = std::fs::read_to_string(repo.path().join("data.txt")).unwrap();
    assert_eq!(content, "version one\n");
}

#[test]
fn release_scenario() {
    // Spec scenario: one commit tagged v1.0; list, date, and checkout all
    // agree with the underlying repository.
    let repo = TestRepo::new();
    repo.tag("v1.0");
    let initial = repo.head_oid_raw();

    let mut registry = RepositoryRegistry::new();
    registry.open(&repo.location()).unwrap();

    assert_eq!(
        registry.list_tags(&repo.location()).unwrap(),
        vec![tag("v1.0")]
    );

    let date = registry
        .tag_commit_date(&repo.location(), &tag("v1.0"))
        .unwrap();
    assert_eq!(date.timestamp(), repo.commit_time_raw(&initial));

    registry.checkout_tag(&repo.location(), &tag("v1.0")).unwrap();
    assert_eq!(repo.head_oid_raw(), initial);
    assert_eq!(
        std::fs::read_to_string(repo.path().join("README.md")).unwrap(),
        "# Test Repo\n"
    );
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn close_removes_registration() {
    let repo = TestRepo::new();
    let mut registry = RepositoryRegistry::new();
    registry.open(&repo.location()).unwrap();

    registry.close(&repo.location()).unwrap();

    assert!(!registry.is_registered(&repo.location()));
    assert!(matches!(
        registry.list_tags(&repo.location()),
        Err(RegistryError::NotRegistered { .. })
    ));
}

#[test]
fn close_then_reopen_works() {
    let repo = TestRepo::new();
    repo.tag("v1.0");
    let mut registry = RepositoryRegistry::new();

    registry.open(&repo.location()).unwrap();
    registry.close(&repo.location()).unwrap();
    registry.open(&repo.location()).unwrap();

    assert_eq!(
        registry.list_tags(&repo.location()).unwrap(),
        vec![tag("v1.0")]
    );
}

#[test]
fn close_leaves_working_tree_intact() {
    let repo = TestRepo::new();
    let mut registry = RepositoryRegistry::new();
    registry.open(&repo.location()).unwrap();
    registry.close(&repo.location()).unwrap();

    assert!(repo.path().join("README.md").exists());
    assert!(repo.path().join(".git").exists());
}

// =============================================================================
// Multiple Repositories
// =============================================================================

#[test]
fn registry_keeps_repositories_separate() {
    let first = TestRepo::new();
    first.tag("from-first");
    let second = TestRepo::new();
    second.tag("from-second");

    let mut registry = RepositoryRegistry::new();
    registry.open(&first.location()).unwrap();
    registry.open(&second.location()).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.list_tags(&first.location()).unwrap(),
        vec![tag("from-first")]
    );
    assert_eq!(
        registry.list_tags(&second.location()).unwrap(),
        vec![tag("from-second")]
    );

    let locations: Vec<_> = registry.locations().collect();
    assert_eq!(locations.len(), 2);
}
