use std::fmt;

use jiff::Timestamp;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Body text used when a remote item has no description.
pub const NO_DESCRIPTION: &str = "No details provided.";

/// Lifecycle state of a mirrored item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    #[default]
    Open,
    Closed,
    Merged,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemState::Open => write!(f, "open"),
            ItemState::Closed => write!(f, "closed"),
            ItemState::Merged => write!(f, "merged"),
        }
    }
}

/// Sub-reason attached to a state transition, when the remote reports one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateReason {
    Completed,
    NotPlanned,
    Reopened,
}

/// Whether an item is an issue or a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Issue,
    PullRequest,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Issue => write!(f, "issue"),
            ItemKind::PullRequest => write!(f, "pull request"),
        }
    }
}

/// Combined state + kind of an item, as selectable in a status filter.
///
/// Variant order is the sort precedence: under an ascending status sort,
/// open pull requests come first and closed pull requests last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    OpenPullRequest,
    OpenIssue,
    MergedPullRequest,
    ClosedIssue,
    ClosedPullRequest,
}

impl ItemStatus {
    /// Fixed precedence used by the status comparator. Lower sorts first
    /// under ascending direction.
    pub fn precedence(self) -> u8 {
        match self {
            ItemStatus::OpenPullRequest => 0,
            ItemStatus::OpenIssue => 1,
            ItemStatus::MergedPullRequest => 2,
            ItemStatus::ClosedIssue => 3,
            ItemStatus::ClosedPullRequest => 4,
        }
    }
}

enum_display_fromstr!(
    ItemStatus,
    crate::error::SpyglassError::InvalidStatus,
    {
        OpenPullRequest => "open pull request",
        OpenIssue => "open issue",
        MergedPullRequest => "merged pull request",
        ClosedIssue => "closed issue",
        ClosedPullRequest => "closed pull request",
    }
);

/// Review verdict reported for a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    Approved,
    ChangesRequested,
    ReviewRequired,
}

/// State of a single submitted review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

/// Summary of one review on a pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub author: String,
    pub state: ReviewState,
}

/// Milestone value object.
///
/// An item always carries a milestone. Absence is represented by one of two
/// well-known sentinel instances (one per item kind) so that group-by and
/// filter code can treat "no milestone" as an ordinary group. The sentinel
/// titles are distinct per kind so their selection is independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    /// Remote milestone state ("open" / "closed"); sentinels carry none.
    pub state: Option<String>,
}

static NO_MILESTONE_FOR_ISSUE: Lazy<Milestone> = Lazy::new(|| Milestone {
    title: "Issue without a milestone".to_string(),
    state: None,
});

static NO_MILESTONE_FOR_PR: Lazy<Milestone> = Lazy::new(|| Milestone {
    title: "PR without a milestone".to_string(),
    state: None,
});

impl Milestone {
    /// Create a milestone from a remote title and state.
    pub fn new(title: impl Into<String>, state: Option<String>) -> Self {
        Milestone {
            title: title.into(),
            state,
        }
    }

    /// The "no milestone" sentinel for the given item kind.
    pub fn sentinel_for(kind: ItemKind) -> &'static Milestone {
        match kind {
            ItemKind::Issue => &NO_MILESTONE_FOR_ISSUE,
            ItemKind::PullRequest => &NO_MILESTONE_FOR_PR,
        }
    }

    /// Whether a milestone title names one of the "no milestone" sentinels.
    pub fn is_sentinel_title(title: &str) -> bool {
        title == NO_MILESTONE_FOR_ISSUE.title || title == NO_MILESTONE_FOR_PR.title
    }
}

/// A single mirrored issue or pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Display-facing number, unique within one repository's store.
    pub id: u64,
    /// Stable opaque backend identifier. Survives renumbering; never used
    /// as a store key.
    pub global_id: String,
    pub title: String,
    /// Sanitized body text; never empty (see [`NO_DESCRIPTION`]).
    pub description: String,
    pub state: ItemState,
    pub state_reason: Option<StateReason>,
    pub kind: ItemKind,
    pub created_at: String,
    pub updated_at: String,
    pub closed_at: Option<String>,
    pub author: String,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    pub milestone: Milestone,
    pub is_draft: bool,
    pub review_decision: Option<ReviewDecision>,
    pub reviews: Vec<ReviewSummary>,
}

impl Item {
    /// Combined status of this item for filtering and sorting.
    pub fn status(&self) -> ItemStatus {
        match (self.state, self.kind) {
            (ItemState::Open, ItemKind::PullRequest) => ItemStatus::OpenPullRequest,
            (ItemState::Open, ItemKind::Issue) => ItemStatus::OpenIssue,
            (ItemState::Merged, ItemKind::PullRequest) => ItemStatus::MergedPullRequest,
            (ItemState::Closed, ItemKind::Issue) => ItemStatus::ClosedIssue,
            (ItemState::Closed, ItemKind::PullRequest) => ItemStatus::ClosedPullRequest,
            // The remote never reports a merged issue; fold it into closed.
            (ItemState::Merged, ItemKind::Issue) => ItemStatus::ClosedIssue,
        }
    }

    /// Normalize an optional remote body into a guaranteed non-empty description.
    pub fn description_or_default(body: Option<String>) -> String {
        match body {
            Some(b) if !b.trim().is_empty() => b,
            _ => NO_DESCRIPTION.to_string(),
        }
    }

    /// The updated-at field parsed as a timestamp, if well-formed.
    pub fn updated_timestamp(&self) -> Option<Timestamp> {
        self.updated_at.parse().ok()
    }
}
