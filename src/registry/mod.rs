//! registry
//!
//! The repository registry: a map from [`RepoLocation`] to an open
//! [`GitRepo`] handle, brokering every operation through it.
//!
//! # Semantics
//!
//! - [`open`](RepositoryRegistry::open) and
//!   [`clone`](RepositoryRegistry::clone) are idempotent: a repeated call
//!   for an already-registered location is a silent no-op.
//! - Every other operation requires the location to be registered first and
//!   fails with [`RegistryError::NotRegistered`] otherwise. There is no
//!   empty-result or silent-no-op fallback; callers must `open` or `clone`
//!   before they read.
//! - [`checkout_tag`](RepositoryRegistry::checkout_tag) operates on the
//!   cached handle; the repository is never re-opened from disk for a
//!   mutation.
//! - A failed clone or open leaves the registry unchanged.
//!
//! # Concurrency
//!
//! The registry is single-owner and unsynchronized: mutations take
//! `&mut self`, reads take `&self`, and all operations block on disk or
//! network I/O. Callers that need shared access across threads wrap the
//! registry in their own `Mutex`; given the low expected call frequency a
//! single coarse lock is adequate.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::types::{Oid, RepoLocation, TagName};
use crate::git::{GitError, GitRepo};

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The location is not registered.
    ///
    /// Call [`RepositoryRegistry::open`] or [`RepositoryRegistry::clone`]
    /// for the location first.
    #[error("repository not registered: {location}")]
    NotRegistered {
        /// The location that was addressed
        location: RepoLocation,
    },

    /// The underlying Git engine reported a failure.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// A registry of open Git repositories, keyed by filesystem location.
///
/// Owns the mapping from [`RepoLocation`] to [`GitRepo`] and brokers every
/// operation through it. The registry never holds two handles for the same
/// location: keys are normalized paths with structural equality, and
/// repeated `open`/`clone` calls are no-ops.
///
/// Handles live until [`close`](Self::close) removes them or the registry
/// itself is dropped.
///
/// # Example
///
/// ```no_run
/// use git_registry::core::types::{RepoLocation, TagName};
/// use git_registry::registry::RepositoryRegistry;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = RepositoryRegistry::new();
/// let location = RepoLocation::new("/srv/repos/project")?;
///
/// registry.clone("https://example.com/project.git", &location)?;
///
/// for tag in registry.list_tags(&location)? {
///     let when = registry.tag_commit_date(&location, &tag)?;
///     println!("{tag} committed at {when}");
/// }
///
/// registry.checkout_tag(&location, &TagName::new("v1.0")?)?;
/// registry.close(&location)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RepositoryRegistry {
    /// Open repository handles, keyed by normalized location
    repos: HashMap<RepoLocation, GitRepo>,
}

impl RepositoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            repos: HashMap::new(),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Clone a remote repository into `destination` and register it.
    ///
    /// Idempotent: if the destination is already registered, this is a
    /// no-op and the existing handle is kept (callers who want a fresh
    /// clone call [`close`](Self::close) first). On failure nothing is
    /// registered.
    ///
    /// Blocking network I/O.
    ///
    /// # Errors
    ///
    /// - [`GitError::InvalidRemote`] if the URL is malformed or names no
    ///   repository
    /// - [`GitError::Transport`] on network failure
    /// - [`GitError::AccessError`] if the destination is not writable
    pub fn clone(&mut self, url: &str, destination: &RepoLocation) -> Result<(), RegistryError> {
        if self.repos.contains_key(destination) {
            tracing::debug!(location = %destination, "already registered, skipping clone");
            return Ok(());
        }

        let repo = GitRepo::clone(url, destination.as_path())?;
        self.repos.insert(destination.clone(), repo);

        tracing::info!(location = %destination, url, "registered cloned repository");
        Ok(())
    }

    /// Open a local repository at `location` and register it.
    ///
    /// Idempotent: if the location is already registered, this is a no-op.
    /// On failure nothing is registered.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if the path is not a valid repository
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(&mut self, location: &RepoLocation) -> Result<(), RegistryError> {
        if self.repos.contains_key(location) {
            tracing::debug!(location = %location, "already registered, skipping open");
            return Ok(());
        }

        let repo = GitRepo::open(location.as_path())?;
        self.repos.insert(location.clone(), repo);

        tracing::info!(location = %location, "registered opened repository");
        Ok(())
    }

    /// Close a registered repository and drop its handle.
    ///
    /// The working tree on disk is untouched; only the registry entry and
    /// the open connection go away.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the location is not registered
    pub fn close(&mut self, location: &RepoLocation) -> Result<(), RegistryError> {
        match self.repos.remove(location) {
            Some(_) => {
                tracing::info!(location = %location, "closed repository");
                Ok(())
            }
            None => Err(RegistryError::NotRegistered {
                location: location.clone(),
            }),
        }
    }

    // =========================================================================
    // Operations on Registered Repositories
    // =========================================================================

    /// List all tags of a registered repository.
    ///
    /// Tag names are the short form (no `refs/tags/` prefix), in the
    /// engine's enumeration order.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the location is not registered
    /// - [`GitError::Internal`] on I/O errors reading the ref database
    pub fn list_tags(&self, location: &RepoLocation) -> Result<Vec<TagName>, RegistryError> {
        Ok(self.lookup(location)?.list_tags()?)
    }

    /// Check out a tag in a registered repository.
    ///
    /// Rewrites the working tree to the tagged commit's tree and detaches
    /// HEAD there, using the cached handle. The checkout is safe
    /// (non-force): conflicting local changes fail the operation.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the location is not registered
    /// - [`GitError::TagNotFound`] if the tag doesn't exist
    /// - [`GitError::CheckoutConflict`] if local changes block the checkout
    pub fn checkout_tag(
        &self,
        location: &RepoLocation,
        tag: &TagName,
    ) -> Result<(), RegistryError> {
        self.lookup(location)?.checkout_tag(tag)?;
        Ok(())
    }

    /// Get the committer time of the commit a tag points to.
    ///
    /// Second precision, as recorded in the commit object. Annotated tags
    /// are peeled to their target commit.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the location is not registered
    /// - [`GitError::TagNotFound`] if the tag doesn't exist
    pub fn tag_commit_date(
        &self,
        location: &RepoLocation,
        tag: &TagName,
    ) -> Result<DateTime<Utc>, RegistryError> {
        Ok(self.lookup(location)?.tag_commit_time(tag)?)
    }

    /// Resolve a tag to its target commit OID.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the location is not registered
    /// - [`GitError::TagNotFound`] if the tag doesn't exist
    pub fn resolve_tag(
        &self,
        location: &RepoLocation,
        tag: &TagName,
    ) -> Result<Oid, RegistryError> {
        Ok(self.lookup(location)?.resolve_tag(tag)?)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Check whether a location is registered.
    pub fn is_registered(&self, location: &RepoLocation) -> bool {
        self.repos.contains_key(location)
    }

    /// Get the handle for a registered location, if any.
    pub fn get(&self, location: &RepoLocation) -> Option<&GitRepo> {
        self.repos.get(location)
    }

    /// Iterate over all registered locations.
    ///
    /// Order is unspecified.
    pub fn locations(&self) -> impl Iterator<Item = &RepoLocation> {
        self.repos.keys()
    }

    /// Number of registered repositories.
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Look up the handle for a location or fail with `NotRegistered`.
    fn lookup(&self, location: &RepoLocation) -> Result<&GitRepo, RegistryError> {
        self.repos
            .get(location)
            .ok_or_else(|| RegistryError::NotRegistered {
                location: location.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(path: &str) -> RepoLocation {
        RepoLocation::new(path).unwrap()
    }

    fn tag(name: &str) -> TagName {
        TagName::new(name).unwrap()
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = RepositoryRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.locations().count(), 0);
    }

    #[test]
    fn unregistered_location_is_not_registered() {
        let registry = RepositoryRegistry::new();
        assert!(!registry.is_registered(&location("/nowhere")));
        assert!(registry.get(&location("/nowhere")).is_none());
    }

    #[test]
    fn list_tags_unregistered_fails() {
        let registry = RepositoryRegistry::new();
        let result = registry.list_tags(&location("/nowhere"));
        assert!(matches!(
            result,
            Err(RegistryError::NotRegistered { .. })
        ));
    }

    #[test]
    fn checkout_tag_unregistered_fails() {
        let registry = RepositoryRegistry::new();
        let result = registry.checkout_tag(&location("/nowhere"), &tag("v1.0"));
        assert!(matches!(
            result,
            Err(RegistryError::NotRegistered { .. })
        ));
    }

    #[test]
    fn tag_commit_date_unregistered_fails() {
        let registry = RepositoryRegistry::new();
        let result = registry.tag_commit_date(&location("/nowhere"), &tag("v1.0"));
        assert!(matches!(
            result,
            Err(RegistryError::NotRegistered { .. })
        ));
    }

    #[test]
    fn resolve_tag_unregistered_fails() {
        let registry = RepositoryRegistry::new();
        let result = registry.resolve_tag(&location("/nowhere"), &tag("v1.0"));
        assert!(matches!(
            result,
            Err(RegistryError::NotRegistered { .. })
        ));
    }

    #[test]
    fn close_unregistered_fails() {
        let mut registry = RepositoryRegistry::new();
        let result = registry.close(&location("/nowhere"));
        assert!(matches!(
            result,
            Err(RegistryError::NotRegistered { .. })
        ));
    }

    #[test]
    fn open_nonexistent_path_fails_and_registers_nothing() {
        let mut registry = RepositoryRegistry::new();
        let loc = location("/definitely/not/a/repo");

        let result = registry.open(&loc);
        assert!(matches!(
            result,
            Err(RegistryError::Git(GitError::NotARepo { .. }))
        ));
        assert!(!registry.is_registered(&loc));
        assert!(registry.is_empty());
    }

    #[test]
    fn not_registered_error_names_the_location() {
        let registry = RepositoryRegistry::new();
        let err = registry.list_tags(&location("/srv/repos/project")).unwrap_err();
        assert!(err.to_string().contains("/srv/repos/project"));
        assert!(err.to_string().contains("not registered"));
    }
}
