//! git::interface
//!
//! Git engine implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in the
//! crate. All Git interactions flow through this interface, which provides
//! structured results and normalizes errors into typed failure categories.
//!
//! # Architecture
//!
//! The `GitRepo` struct is the only way to interact with a Git repository.
//! No other module should import `git2` directly. This ensures:
//!
//! - Consistent error handling across all Git operations
//! - Strong type guarantees at the boundary
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants so callers can branch on
//! failure category instead of inspecting an opaque wrapped cause:
//! - [`GitError::NotARepo`]: Path is not a Git repository
//! - [`GitError::InvalidRemote`] / [`GitError::Transport`]: Clone failures
//! - [`GitError::TagNotFound`]: Requested tag does not exist
//! - [`GitError::CheckoutConflict`]: Checkout blocked by local changes
//!
//! # Example
//!
//! ```ignore
//! use git_registry::core::types::TagName;
//! use git_registry::git::GitRepo;
//! use std::path::Path;
//!
//! let repo = GitRepo::open(Path::new("/srv/repos/project"))?;
//! for tag in repo.list_tags()? {
//!     println!("{} -> {}", tag, repo.resolve_tag(&tag)?.short(7));
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::types::{Oid, TagName, TypeError, TAG_REF_PREFIX};

/// Errors from Git operations.
///
/// These error types cover all categories of Git failures that embedders
/// need to handle distinctly: unreachable remotes, missing tags, checkout
/// conflicts, and filesystem-level access problems.
#[derive(Debug, Error)]
pub enum GitError {
    /// Path is not a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Remote URL is invalid or names no repository.
    #[error("invalid remote '{url}': {message}")]
    InvalidRemote {
        /// The remote URL
        url: String,
        /// Description of the problem
        message: String,
    },

    /// Network or transport failure talking to a remote.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the failure
        message: String,
    },

    /// Requested tag does not exist.
    #[error("tag not found: {tag}")]
    TagNotFound {
        /// The short tag name that was looked up
        tag: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Checkout blocked by conflicting local changes.
    #[error("checkout conflict: {message}")]
    CheckoutConflict {
        /// Description of the conflict
        message: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if let Some(tag) = context.strip_prefix(TAG_REF_PREFIX) {
                    GitError::TagNotFound {
                        tag: tag.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::Conflict => GitError::CheckoutConflict {
                message: err.message().to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => match err.class() {
                git2::ErrorClass::Checkout => GitError::CheckoutConflict {
                    message: err.message().to_string(),
                },
                git2::ErrorClass::Net | git2::ErrorClass::Http | git2::ErrorClass::Ssh => {
                    GitError::Transport {
                        message: err.message().to_string(),
                    }
                }
                _ => GitError::Internal {
                    message: format!("{}: {}", context, err.message()),
                },
            },
        }
    }

    /// Categorize a git2::Error raised during clone.
    ///
    /// Clone failures carry the remote URL so callers can tell "the URL is
    /// bad" from "the network is down".
    fn from_clone(err: git2::Error, url: &str) -> Self {
        match err.class() {
            git2::ErrorClass::Net | git2::ErrorClass::Http | git2::ErrorClass::Ssh => {
                // libgit2 reports both unresolvable hosts and malformed URLs
                // under the Net class; NotFound means the URL parsed but
                // named nothing.
                if err.code() == git2::ErrorCode::NotFound {
                    GitError::InvalidRemote {
                        url: url.to_string(),
                        message: err.message().to_string(),
                    }
                } else {
                    GitError::Transport {
                        message: err.message().to_string(),
                    }
                }
            }
            git2::ErrorClass::Invalid | git2::ErrorClass::Config => GitError::InvalidRemote {
                url: url.to_string(),
                message: err.message().to_string(),
            },
            git2::ErrorClass::Os | git2::ErrorClass::Filesystem => GitError::AccessError {
                message: err.message().to_string(),
            },
            _ => {
                if err.code() == git2::ErrorCode::NotFound
                    || err.code() == git2::ErrorCode::Exists
                {
                    GitError::InvalidRemote {
                        url: url.to_string(),
                        message: err.message().to_string(),
                    }
                } else {
                    GitError::Internal {
                        message: err.message().to_string(),
                    }
                }
            }
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidTagName(msg) => GitError::InvalidRefName { message: msg },
            TypeError::InvalidLocation(msg) => GitError::AccessError { message: msg },
        }
    }
}

/// An open connection to a Git repository.
///
/// This is the **single point of interaction** with Git. All repository
/// reads and writes flow through this interface. No other module should
/// import `git2` directly.
///
/// All operations are synchronous and blocking: clone performs network I/O,
/// everything else performs disk I/O. Nothing suspends cooperatively, and
/// no operation defines a cancellation or timeout contract.
///
/// # Example
///
/// ```ignore
/// use git_registry::core::types::TagName;
/// use git_registry::git::GitRepo;
/// use std::path::Path;
///
/// let repo = GitRepo::open(Path::new("/srv/repos/project"))?;
/// let tag = TagName::new("v1.0")?;
/// let when = repo.tag_commit_time(&tag)?;
/// repo.checkout_tag(&tag)?;
/// ```
pub struct GitRepo {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl GitRepo {
    // =========================================================================
    // Opening and Cloning
    // =========================================================================

    /// Open an existing repository at the given path.
    ///
    /// The path must be the repository root (or its `.git` directory);
    /// unlike discovery-based opening, parent directories are not searched,
    /// so the opened repository corresponds exactly to the location it is
    /// registered under.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if the path is not a valid repository
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        // Checkout needs a working tree
        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        tracing::debug!(path = %path.display(), "opened repository");
        Ok(Self { repo })
    }

    /// Clone a remote repository into the given directory.
    ///
    /// Blocking network I/O; returns only when the clone has fully
    /// completed. The destination directory is created if needed.
    ///
    /// # Errors
    ///
    /// - [`GitError::InvalidRemote`] if the URL is malformed or names no
    ///   repository
    /// - [`GitError::Transport`] on network failures
    /// - [`GitError::AccessError`] if the destination is not writable
    pub fn clone(url: &str, path: &Path) -> Result<Self, GitError> {
        tracing::info!(url, path = %path.display(), "cloning repository");

        let repo = git2::build::RepoBuilder::new()
            .clone(url, path)
            .map_err(|e| GitError::from_clone(e, url))?;

        tracing::info!(path = %path.display(), "clone completed");
        Ok(Self { repo })
    }

    /// Get the path to the working directory.
    pub fn workdir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    /// Get the path to the .git directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    // =========================================================================
    // Tag Enumeration
    // =========================================================================

    /// List all tags in the repository.
    ///
    /// Enumerates refs under `refs/tags/`, strips the namespace prefix, and
    /// preserves libgit2's enumeration order. Refs with names that are not
    /// valid UTF-8 or not valid tag names are skipped.
    ///
    /// # Errors
    ///
    /// - [`GitError::Internal`] on I/O errors reading the ref database
    pub fn list_tags(&self) -> Result<Vec<TagName>, GitError> {
        let pattern = format!("{}*", TAG_REF_PREFIX);
        let refs = self
            .repo
            .references_glob(&pattern)
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

        let mut tags = Vec::new();
        for reference in refs {
            let reference = reference.map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

            // Skip refs with non-UTF8 names
            let name = match reference.name() {
                Some(n) => n,
                None => continue,
            };

            // Skip anything that doesn't parse as a tag name
            if let Some(tag) = TagName::from_full_ref(name) {
                tags.push(tag);
            }
        }

        Ok(tags)
    }

    // =========================================================================
    // Tag Resolution
    // =========================================================================

    /// Resolve a tag to its target commit OID.
    ///
    /// Peels through annotated tag objects to the commit they point to.
    ///
    /// # Errors
    ///
    /// - [`GitError::TagNotFound`] if the tag doesn't exist
    pub fn resolve_tag(&self, tag: &TagName) -> Result<Oid, GitError> {
        let commit = self.tag_commit(tag)?;
        Oid::new(commit.id().to_string()).map_err(|e| e.into())
    }

    /// Get the committer time of the commit a tag points to.
    ///
    /// Annotated tags are peeled to their target commit first. The result
    /// has second precision, as recorded in the commit object.
    ///
    /// # Errors
    ///
    /// - [`GitError::TagNotFound`] if the tag doesn't exist
    /// - [`GitError::Internal`] if the commit object cannot be parsed
    pub fn tag_commit_time(&self, tag: &TagName) -> Result<DateTime<Utc>, GitError> {
        let commit = self.tag_commit(tag)?;

        let time = DateTime::from_timestamp(commit.time().seconds(), 0)
            .unwrap_or(DateTime::UNIX_EPOCH)
            .with_timezone(&Utc);

        Ok(time)
    }

    /// Find a tag's ref and peel it to the commit it points to.
    fn tag_commit(&self, tag: &TagName) -> Result<git2::Commit<'_>, GitError> {
        let refname = tag.full_ref();

        let reference = self
            .repo
            .find_reference(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        reference
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, &refname))
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Check out the commit a tag points to.
    ///
    /// Rewrites the working tree to match the tagged commit's tree and
    /// detaches HEAD at that commit. The checkout is safe (non-force):
    /// local modifications that would be overwritten fail the operation
    /// with [`GitError::CheckoutConflict`] instead of being clobbered.
    ///
    /// # Errors
    ///
    /// - [`GitError::TagNotFound`] if the tag doesn't exist
    /// - [`GitError::CheckoutConflict`] if local changes block the checkout
    pub fn checkout_tag(&self, tag: &TagName) -> Result<(), GitError> {
        let refname = tag.full_ref();
        let commit = self.tag_commit(tag)?;

        tracing::debug!(tag = %tag, commit = %commit.id(), "checking out tag");

        // Safe checkout: refuses to overwrite local modifications
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.safe();

        self.repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))
            .map_err(|e| GitError::from_git2(e, &refname))?;

        self.repo
            .set_head_detached(commit.id())
            .map_err(|e| GitError::from_git2(e, &refname))?;

        tracing::info!(tag = %tag, "checked out tag");
        Ok(())
    }
}
