//! Remote fetch boundary.
//!
//! The synchronization core consumes paged collections of items through the
//! [`ItemFetcher`] trait. A GitHub-backed implementation lives in
//! [`github`]; tests substitute scripted fetchers. Pagination cursors,
//! conditional-request caching, and authentication are the transport's
//! concern; the core only assumes paged collections that may report
//! "unchanged since last fetch".

pub mod error;
pub mod github;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpyglassError};
use crate::types::Item;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u8 = 100;

/// A repository reference, parsed from `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Parse from a string like `owner/repo`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 {
            return Err(SpyglassError::InvalidRepoRef(
                s.to_string(),
                "expected format: owner/repo".to_string(),
            ));
        }

        let owner = parts[0].to_string();
        let repo = parts[1].to_string();
        if owner.is_empty() || repo.is_empty() {
            return Err(SpyglassError::InvalidRepoRef(
                s.to_string(),
                "owner and repo cannot be empty".to_string(),
            ));
        }

        Ok(RepoRef { owner, repo })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoRef {
    type Err = SpyglassError;

    fn from_str(s: &str) -> Result<Self> {
        RepoRef::parse(s)
    }
}

/// One mirroring session against a single repository.
///
/// All session-scoped state lives here and is passed by reference to the
/// synchronization core, so multiple repositories can be mirrored
/// concurrently from one process.
#[derive(Debug, Clone)]
pub struct RepoSession {
    pub repo: RepoRef,
    /// Items requested per page from the remote.
    pub page_size: u8,
}

impl RepoSession {
    pub fn new(repo: RepoRef) -> Self {
        RepoSession {
            repo,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A repository label, as offered in the filter's selectable set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: Option<String>,
}

/// A user the repository's items can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub name: Option<String>,
}

/// One page of a paged item fetch.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub items: Vec<Item>,
    /// The transport's conditional request short-circuited: nothing changed
    /// since the last fetch of this page. `items` carries the transport's
    /// cached copy when it has one, and is empty otherwise. An empty cached
    /// page must never be read as "this page is now empty remotely".
    pub is_cached: bool,
    /// Total pages in the collection, as reported by the remote. At least 1.
    pub total_pages: u32,
}

/// Paged fetch primitive the synchronization core polls against.
#[async_trait]
pub trait ItemFetcher: Send + Sync {
    /// Fetch one page (1-based) of the repository's items.
    async fn fetch_page(&self, page: u32) -> Result<FetchedPage>;

    /// Fetch the users that items can be assigned to. Supplies candidate
    /// groups for the assignee grouping strategy.
    async fn fetch_assignable_users(&self) -> Result<Vec<User>>;

    /// Fetch the repository's labels. Backs the lighter auxiliary label poll.
    async fn fetch_labels(&self) -> Result<Vec<Label>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo_ref() {
        let r = RepoRef::parse("octo-org/widgets").unwrap();
        assert_eq!(r.owner, "octo-org");
        assert_eq!(r.repo, "widgets");
    }

    #[test]
    fn test_parse_repo_ref_trims_whitespace() {
        let r = RepoRef::parse("  octo-org/widgets ").unwrap();
        assert_eq!(r.to_string(), "octo-org/widgets");
    }

    #[test]
    fn test_parse_invalid_repo_ref() {
        assert!(RepoRef::parse("widgets").is_err());
        assert!(RepoRef::parse("a/b/c").is_err());
        assert!(RepoRef::parse("/widgets").is_err());
        assert!(RepoRef::parse("octo-org/").is_err());
        assert!(RepoRef::parse("").is_err());
    }

    #[test]
    fn test_repo_ref_roundtrip() {
        let original = RepoRef::parse("octo-org/widgets").unwrap();
        let parsed: RepoRef = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_session_defaults() {
        let session = RepoSession::new(RepoRef::parse("octo-org/widgets").unwrap());
        assert_eq!(session.page_size, DEFAULT_PAGE_SIZE);
    }
}
