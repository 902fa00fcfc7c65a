//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`RepoLocation`] - Normalized filesystem path used as the registry key
//! - [`TagName`] - Validated Git tag name
//! - [`Oid`] - Git object identifier (SHA)
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use git_registry::core::types::{Oid, RepoLocation, TagName};
//!
//! // Valid constructions
//! let location = RepoLocation::new("/srv/repos/project").unwrap();
//! let tag = TagName::new("v1.0").unwrap();
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//!
//! // Invalid constructions fail at creation time
//! assert!(TagName::new("invalid..name").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The ref namespace under which tags live.
pub const TAG_REF_PREFIX: &str = "refs/tags/";

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid tag name: {0}")]
    InvalidTagName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid repository location: {0}")]
    InvalidLocation(String),
}

/// A repository location: the filesystem path used as the registry key.
///
/// Locations are lexically normalized at construction (`.` components and
/// redundant separators removed) so that two values naming the same path
/// compare equal and hash identically. Normalization is purely lexical;
/// symlinks are not resolved, and the path is not required to exist yet
/// (clone destinations are created by the clone itself).
///
/// # Example
///
/// ```
/// use git_registry::core::types::RepoLocation;
///
/// let a = RepoLocation::new("/srv/repos/project").unwrap();
/// let b = RepoLocation::new("/srv/repos/./project/").unwrap();
/// assert_eq!(a, b);
///
/// assert!(RepoLocation::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PathBuf", into = "PathBuf")]
pub struct RepoLocation(PathBuf);

impl RepoLocation {
    /// Create a new normalized repository location.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidLocation` if the path is empty.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, TypeError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(TypeError::InvalidLocation(
                "location cannot be empty".into(),
            ));
        }
        Ok(Self(Self::normalize(&path)))
    }

    /// Lexically normalize a path: drop `.` components and redundant
    /// separators. `..` components are kept as-is; resolving them would
    /// require hitting the filesystem.
    fn normalize(path: &Path) -> PathBuf {
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    }

    /// Get the location as a path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl TryFrom<PathBuf> for RepoLocation {
    type Error = TypeError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<RepoLocation> for PathBuf {
    fn from(location: RepoLocation) -> Self {
        location.0
    }
}

impl AsRef<Path> for RepoLocation {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for RepoLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A validated Git tag name.
///
/// Tag names are the short form (no `refs/tags/` prefix) and must conform
/// to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
/// - Cannot be exactly `@`
///
/// # Example
///
/// ```
/// use git_registry::core::types::TagName;
///
/// let tag = TagName::new("v1.0").unwrap();
/// assert_eq!(tag.as_str(), "v1.0");
/// assert_eq!(tag.full_ref(), "refs/tags/v1.0");
///
/// assert!(TagName::new("").is_err());
/// assert!(TagName::new("has space").is_err());
/// assert!(TagName::new("release..final").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Create a new validated tag name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidTagName` if the name violates Git's
    /// refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Validate a tag name against Git's refname rules.
    fn validate(name: &str) -> Result<(), TypeError> {
        // Cannot be empty
        if name.is_empty() {
            return Err(TypeError::InvalidTagName("tag name cannot be empty".into()));
        }

        // Cannot be exactly "@" (reserved)
        if name == "@" {
            return Err(TypeError::InvalidTagName(
                "tag name cannot be '@' (reserved)".into(),
            ));
        }

        // Cannot start with '.' or '-'
        if name.starts_with('.') {
            return Err(TypeError::InvalidTagName(
                "tag name cannot start with '.'".into(),
            ));
        }
        if name.starts_with('-') {
            return Err(TypeError::InvalidTagName(
                "tag name cannot start with '-'".into(),
            ));
        }

        // Cannot end with ".lock" or "/"
        if name.ends_with(".lock") {
            return Err(TypeError::InvalidTagName(
                "tag name cannot end with '.lock'".into(),
            ));
        }
        if name.ends_with('/') {
            return Err(TypeError::InvalidTagName(
                "tag name cannot end with '/'".into(),
            ));
        }

        // Cannot contain "..", "@{", or "//"
        if name.contains("..") {
            return Err(TypeError::InvalidTagName(
                "tag name cannot contain '..'".into(),
            ));
        }
        if name.contains("@{") {
            return Err(TypeError::InvalidTagName(
                "tag name cannot contain '@{'".into(),
            ));
        }
        if name.contains("//") {
            return Err(TypeError::InvalidTagName(
                "tag name cannot contain '//'".into(),
            ));
        }

        // Cannot contain certain special characters
        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidTagName(format!(
                    "tag name cannot contain '{c}'"
                )));
            }
        }

        // Cannot contain ASCII control characters (0x00-0x1F or 0x7F)
        for c in name.chars() {
            if c.is_ascii_control() {
                return Err(TypeError::InvalidTagName(
                    "tag name cannot contain control characters".into(),
                ));
            }
        }

        // Check each component (split by /) for component-specific rules
        for component in name.split('/') {
            if component.is_empty() {
                // This would mean "//" which is already caught, or leading/trailing "/"
                continue;
            }
            if component.starts_with('.') {
                return Err(TypeError::InvalidTagName(
                    "path component cannot start with '.'".into(),
                ));
            }
            if component.ends_with(".lock") {
                return Err(TypeError::InvalidTagName(
                    "path component cannot end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the tag name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the full ref name for this tag (`refs/tags/<name>`).
    ///
    /// # Example
    ///
    /// ```
    /// use git_registry::core::types::TagName;
    ///
    /// let tag = TagName::new("releases/v2.1").unwrap();
    /// assert_eq!(tag.full_ref(), "refs/tags/releases/v2.1");
    /// ```
    pub fn full_ref(&self) -> String {
        format!("{}{}", TAG_REF_PREFIX, self.0)
    }

    /// Extract a tag name from a full ref under `refs/tags/`.
    ///
    /// Returns `None` if the ref is not under the tag namespace or the
    /// remainder is not a valid tag name.
    ///
    /// # Example
    ///
    /// ```
    /// use git_registry::core::types::TagName;
    ///
    /// let tag = TagName::from_full_ref("refs/tags/v1.0").unwrap();
    /// assert_eq!(tag.as_str(), "v1.0");
    /// assert!(TagName::from_full_ref("refs/heads/main").is_none());
    /// ```
    pub fn from_full_ref(refname: &str) -> Option<Self> {
        let short = refname.strip_prefix(TAG_REF_PREFIX)?;
        Self::new(short).ok()
    }
}

impl TryFrom<String> for TagName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<TagName> for String {
    fn from(tag: TagName) -> Self {
        tag.0
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use git_registry::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Validate an object id.
    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
