//! Grouping of filtered items.
//!
//! A grouping strategy partitions the filtered item list along one
//! dimension without the pipeline knowing the concrete group type. The
//! set of dimensions is the closed [`GroupBy`] enum, so adding a new one
//! is checked for exhaustiveness at compile time.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::remote::ItemFetcher;
use crate::store::ItemStore;
use crate::types::{Item, ItemKind, Milestone};

/// A partition key. Groups expose equality only; buckets are computed by
/// the owning strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Group {
    /// One user's bucket: issues assigned to them plus pull requests they
    /// authored.
    User(String),
    /// Issues with no assignee. Pull requests never land here since they
    /// always have an author.
    Unassigned,
    /// Items under one milestone title, sentinels included.
    Milestone(String),
}

/// Grouping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    Assignee,
    Milestone,
}

enum_display_fromstr!(
    GroupBy,
    crate::error::SpyglassError::InvalidGroupBy,
    {
        Assignee => "assignee",
        Milestone => "milestone",
    }
);

/// Partitions items along one dimension.
#[async_trait]
pub trait GroupingStrategy: Send + Sync {
    /// Candidate groups for the current repository. Async because group
    /// membership may require a remote call (e.g. assignable users).
    async fn groups(&self) -> Result<Vec<Group>>;

    /// The subset of `items` belonging to `group`, in input order.
    fn items_for_group(&self, items: &[Item], group: &Group) -> Vec<Item>;

    /// Whether this group may be collapsed into a "hidden groups"
    /// affordance when it has no items, rather than always shown.
    fn is_hideable_when_empty(&self, group: &Group) -> bool;
}

/// Build the strategy for a grouping dimension.
pub fn strategy_for(
    key: GroupBy,
    fetcher: Arc<dyn ItemFetcher>,
    store: Arc<ItemStore>,
) -> Box<dyn GroupingStrategy> {
    match key {
        GroupBy::Assignee => Box::new(AssigneeGrouping::new(fetcher)),
        GroupBy::Milestone => Box::new(MilestoneGrouping::new(store)),
    }
}

/// Groups items by the user responsible for them.
///
/// Issues belong to each user in their assignee list; pull requests belong
/// to their author, since they carry no independent assignees in this
/// model. Issues with nobody assigned collect in the synthetic
/// [`Group::Unassigned`] bucket, which is always shown even when empty.
pub struct AssigneeGrouping {
    fetcher: Arc<dyn ItemFetcher>,
}

impl AssigneeGrouping {
    pub fn new(fetcher: Arc<dyn ItemFetcher>) -> Self {
        AssigneeGrouping { fetcher }
    }
}

#[async_trait]
impl GroupingStrategy for AssigneeGrouping {
    async fn groups(&self) -> Result<Vec<Group>> {
        let users = self.fetcher.fetch_assignable_users().await?;
        let mut groups: Vec<Group> = users.into_iter().map(|u| Group::User(u.login)).collect();
        groups.push(Group::Unassigned);
        Ok(groups)
    }

    fn items_for_group(&self, items: &[Item], group: &Group) -> Vec<Item> {
        items
            .iter()
            .filter(|item| match group {
                Group::User(login) => match item.kind {
                    ItemKind::Issue => item.assignees.iter().any(|a| a == login),
                    ItemKind::PullRequest => item.author == *login,
                },
                Group::Unassigned => item.kind == ItemKind::Issue && item.assignees.is_empty(),
                Group::Milestone(_) => false,
            })
            .cloned()
            .collect()
    }

    fn is_hideable_when_empty(&self, group: &Group) -> bool {
        match group {
            Group::User(_) => true,
            Group::Unassigned => false,
            Group::Milestone(_) => false,
        }
    }
}

/// Groups items by milestone title, derived from the store's current
/// contents. The per-kind "no milestone" sentinels appear as ordinary
/// groups and, like the unassigned bucket, are never hidden.
pub struct MilestoneGrouping {
    store: Arc<ItemStore>,
}

impl MilestoneGrouping {
    pub fn new(store: Arc<ItemStore>) -> Self {
        MilestoneGrouping { store }
    }
}

#[async_trait]
impl GroupingStrategy for MilestoneGrouping {
    async fn groups(&self) -> Result<Vec<Group>> {
        let titles: BTreeSet<String> = self
            .store
            .snapshot()
            .into_iter()
            .map(|item| item.milestone.title)
            .collect();
        Ok(titles.into_iter().map(Group::Milestone).collect())
    }

    fn items_for_group(&self, items: &[Item], group: &Group) -> Vec<Item> {
        items
            .iter()
            .filter(|item| match group {
                Group::Milestone(title) => item.milestone.title == *title,
                _ => false,
            })
            .cloned()
            .collect()
    }

    fn is_hideable_when_empty(&self, group: &Group) -> bool {
        match group {
            Group::Milestone(title) => !Milestone::is_sentinel_title(title),
            _ => false,
        }
    }
}
