//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and
//! writes flow through this interface. No other module should import
//! `git2`. We use the `git2` crate exclusively (no shelling out to the
//! git CLI).
//!
//! # Responsibilities
//!
//! - Repository opening and cloning
//! - Tag enumeration under `refs/tags/`
//! - Tag-to-commit resolution (peeling annotated tags)
//! - Commit timestamp lookup
//! - Tag checkout (working tree + detached HEAD)
//!
//! # Invariants
//!
//! - No other module calls git2 directly
//! - All operations return strong types (Oid, TagName)
//! - Errors are normalized into typed [`GitError`] categories

mod interface;

pub use interface::{GitError, GitRepo};
