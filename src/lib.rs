//! git-registry - An embeddable registry of open Git repositories
//!
//! This crate gives host environments (interpreters, metaprogramming
//! systems, analysis tools) a small, typed surface over a handful of Git
//! operations: clone, open, list tags, check out a tag, and read a tag's
//! commit timestamp. All Git mechanics are delegated to libgit2 via the
//! `git2` crate; this crate owns the registry bookkeeping, the strong
//! types, and error translation.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`registry`] - The repository registry (the embedding API)
//! - [`git`] - Single interface for all Git operations
//! - [`core`] - Strong domain types
//!
//! # Correctness Invariants
//!
//! 1. The registry never holds two handles for the same location
//! 2. `open` and `clone` are idempotent; repeated calls are no-ops
//! 3. Every other operation requires prior registration and fails with
//!    a `NotRegistered` error otherwise
//! 4. A failed clone or open leaves the registry unchanged
//!
//! # Example
//!
//! ```no_run
//! use git_registry::{RepoLocation, RepositoryRegistry, TagName};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = RepositoryRegistry::new();
//! let location = RepoLocation::new("/srv/repos/project")?;
//!
//! registry.open(&location)?;
//! let tags = registry.list_tags(&location)?;
//! registry.checkout_tag(&location, &TagName::new("v1.0")?)?;
//! registry.close(&location)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod git;
pub mod registry;

pub use crate::core::types::{Oid, RepoLocation, TagName, TypeError};
pub use crate::git::{GitError, GitRepo};
pub use crate::registry::{RegistryError, RepositoryRegistry};
