//! core
//!
//! Core domain types for the registry.
//!
//! # Modules
//!
//! - [`types`] - Strong types: RepoLocation, TagName, Oid
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Registry keys have structural equality: two locations naming the same
//!   path compare equal regardless of how the caller spelled them

pub mod types;
