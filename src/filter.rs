//! Presentation filtering of mirrored items.
//!
//! A [`Filter`] is an immutable value object; one current value lives in a
//! single point of truth and every mutation replaces it wholesale through
//! [`Filter::clone_with`], so downstream consumers can rely on simple
//! change detection. Filtering itself is a pipeline of independent
//! predicate stages, each a pure function over the items surviving the
//! earlier stages.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::sort::Sort;
use crate::types::{Item, ItemKind, ItemStatus};

/// Default page size for new filters.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Which item kinds the status/type stage admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindSelector {
    Issue,
    PullRequest,
    #[default]
    All,
}

impl KindSelector {
    pub fn admits(self, kind: ItemKind) -> bool {
        match self {
            KindSelector::Issue => kind == ItemKind::Issue,
            KindSelector::PullRequest => kind == ItemKind::PullRequest,
            KindSelector::All => true,
        }
    }
}

enum_display_fromstr!(
    KindSelector,
    crate::error::SpyglassError::InvalidKind,
    {
        Issue => "issue",
        PullRequest => "pull request",
        All => "all",
    }
);

/// Current presentation filter.
///
/// Empty selection sets place no restriction: an empty `status` set admits
/// every status and an empty `milestones` set admits every milestone. The
/// `hidden_labels` and `deselected_labels` sets suppress label chips in the
/// presentation layer without removing them from the selectable set; they
/// do not participate in the predicate pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Free-text search string.
    pub title: String,
    pub status: HashSet<ItemStatus>,
    pub kind: KindSelector,
    pub sort: Sort,
    /// Labels an item must carry, all of them, to pass the label stage.
    pub labels: Vec<String>,
    /// Milestone titles admitted by the milestone stage.
    pub milestones: Vec<String>,
    pub hidden_labels: HashSet<String>,
    pub deselected_labels: HashSet<String>,
    pub items_per_page: usize,
    pub assignees: Vec<String>,
}

impl Default for Filter {
    fn default() -> Self {
        Filter {
            title: String::new(),
            status: HashSet::new(),
            kind: KindSelector::All,
            sort: Sort::default(),
            labels: Vec::new(),
            milestones: Vec::new(),
            hidden_labels: HashSet::new(),
            deselected_labels: HashSet::new(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            assignees: Vec::new(),
        }
    }
}

/// Partial update applied by [`Filter::clone_with`]. Unset fields keep the
/// current value.
#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub title: Option<String>,
    pub status: Option<HashSet<ItemStatus>>,
    pub kind: Option<KindSelector>,
    pub sort: Option<Sort>,
    pub labels: Option<Vec<String>>,
    pub milestones: Option<Vec<String>>,
    pub hidden_labels: Option<HashSet<String>>,
    pub deselected_labels: Option<HashSet<String>>,
    pub items_per_page: Option<usize>,
    pub assignees: Option<Vec<String>>,
}

impl Filter {
    /// Produce a new filter with the given fields replaced. The receiver is
    /// never mutated.
    pub fn clone_with(&self, update: FilterUpdate) -> Filter {
        Filter {
            title: update.title.unwrap_or_else(|| self.title.clone()),
            status: update.status.unwrap_or_else(|| self.status.clone()),
            kind: update.kind.unwrap_or(self.kind),
            sort: update.sort.unwrap_or(self.sort),
            labels: update.labels.unwrap_or_else(|| self.labels.clone()),
            milestones: update.milestones.unwrap_or_else(|| self.milestones.clone()),
            hidden_labels: update
                .hidden_labels
                .unwrap_or_else(|| self.hidden_labels.clone()),
            deselected_labels: update
                .deselected_labels
                .unwrap_or_else(|| self.deselected_labels.clone()),
            items_per_page: update.items_per_page.unwrap_or(self.items_per_page),
            assignees: update.assignees.unwrap_or_else(|| self.assignees.clone()),
        }
    }

    /// Parse a status selection from strings, e.g. persisted session state.
    /// Unrecognized values contribute nothing instead of failing, so stale
    /// sessions can never crash the pipeline.
    pub fn statuses_from_strs<'a>(values: impl IntoIterator<Item = &'a str>) -> HashSet<ItemStatus> {
        values
            .into_iter()
            .filter_map(|raw| match raw.parse() {
                Ok(status) => Some(status),
                Err(_) => {
                    tracing::debug!("ignoring unrecognized status '{raw}' in filter state");
                    None
                }
            })
            .collect()
    }
}

/// Columns the free-text search stage may match against. Label and assignee
/// columns match any element of the array rather than a joined string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchColumn {
    Id,
    Title,
    Description,
    Author,
    Labels,
    Assignees,
    Milestone,
}

/// Column set used by the standard item list view.
pub const DEFAULT_SEARCH_COLUMNS: &[SearchColumn] = &[
    SearchColumn::Id,
    SearchColumn::Title,
    SearchColumn::Author,
    SearchColumn::Labels,
    SearchColumn::Assignees,
    SearchColumn::Milestone,
];

/// Stage 1: keep items whose state + kind pair is selected.
pub fn filter_by_status(filter: &Filter, items: Vec<Item>) -> Vec<Item> {
    items
        .into_iter()
        .filter(|item| {
            filter.kind.admits(item.kind)
                && (filter.status.is_empty() || filter.status.contains(&item.status()))
        })
        .collect()
}

/// Stage 2: keep items whose milestone title is among the selected set.
/// The per-kind "no milestone" sentinels participate like any real
/// milestone, so selecting one is independent of the other.
pub fn filter_by_milestone(filter: &Filter, items: Vec<Item>) -> Vec<Item> {
    if filter.milestones.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| filter.milestones.iter().any(|m| *m == item.milestone.title))
        .collect()
}

/// Stage 3: keep items carrying every selected label. This is a
/// required-superset test, not an any-match test.
pub fn filter_by_labels(filter: &Filter, items: Vec<Item>) -> Vec<Item> {
    items
        .into_iter()
        .filter(|item| {
            filter
                .labels
                .iter()
                .all(|wanted| item.labels.iter().any(|l| l == wanted))
        })
        .collect()
}

/// Stage 4: keep items where the search string is a case-insensitive
/// substring of any of the given columns. An empty search string matches
/// every item.
pub fn filter_by_search(filter: &Filter, columns: &[SearchColumn], items: Vec<Item>) -> Vec<Item> {
    if filter.title.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            columns
                .iter()
                .any(|column| column_matches(item, *column, &filter.title))
        })
        .collect()
}

/// Apply all predicate stages in order. Later stages only see the items
/// surviving earlier stages.
pub fn apply_filter(filter: &Filter, columns: &[SearchColumn], items: Vec<Item>) -> Vec<Item> {
    let items = filter_by_status(filter, items);
    let items = filter_by_milestone(filter, items);
    let items = filter_by_labels(filter, items);
    filter_by_search(filter, columns, items)
}

fn column_matches(item: &Item, column: SearchColumn, needle: &str) -> bool {
    match column {
        SearchColumn::Id => contains_fold(&item.id.to_string(), needle),
        SearchColumn::Title => contains_fold(&item.title, needle),
        SearchColumn::Description => contains_fold(&item.description, needle),
        SearchColumn::Author => contains_fold(&item.author, needle),
        SearchColumn::Labels => item.labels.iter().any(|l| contains_fold(l, needle)),
        SearchColumn::Assignees => item.assignees.iter().any(|a| contains_fold(a, needle)),
        SearchColumn::Milestone => contains_fold(&item.milestone.title, needle),
    }
}

/// Case-insensitive substring match.
///
/// Uses `unicase` for correct Unicode case folding rather than ASCII
/// lowercasing.
fn contains_fold(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let haystack_folded = unicase::UniCase::new(haystack).to_folded_case();
    let needle_folded = unicase::UniCase::new(needle).to_folded_case();
    haystack_folded.contains(&needle_folded)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::types::{ItemState, Milestone, NO_DESCRIPTION};

    fn item(id: u64, state: ItemState, kind: ItemKind) -> Item {
        Item {
            id,
            global_id: format!("node-{id}"),
            title: format!("Item {id}"),
            description: NO_DESCRIPTION.to_string(),
            state,
            state_reason: None,
            kind,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-02T00:00:00Z".to_string(),
            closed_at: None,
            author: "alice".to_string(),
            assignees: vec![],
            labels: vec![],
            milestone: Milestone::sentinel_for(kind).clone(),
            is_draft: false,
            review_decision: None,
            reviews: vec![],
        }
    }

    fn ids(items: &[Item]) -> Vec<u64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_status_stage_selects_state_kind_pairs() {
        let filter = Filter {
            status: HashSet::from([ItemStatus::OpenIssue]),
            kind: KindSelector::Issue,
            ..Default::default()
        };

        let items = vec![
            item(1, ItemState::Open, ItemKind::Issue),
            item(2, ItemState::Closed, ItemKind::Issue),
            item(3, ItemState::Open, ItemKind::PullRequest),
        ];

        assert_eq!(ids(&filter_by_status(&filter, items)), vec![1]);
    }

    #[test]
    fn test_status_stage_empty_selection_admits_all() {
        let filter = Filter::default();
        let items = vec![
            item(1, ItemState::Open, ItemKind::Issue),
            item(2, ItemState::Merged, ItemKind::PullRequest),
        ];
        assert_eq!(filter_by_status(&filter, items).len(), 2);
    }

    #[test]
    fn test_kind_selector_restricts_without_status() {
        let filter = Filter {
            kind: KindSelector::PullRequest,
            ..Default::default()
        };
        let items = vec![
            item(1, ItemState::Open, ItemKind::Issue),
            item(2, ItemState::Open, ItemKind::PullRequest),
        ];
        assert_eq!(ids(&filter_by_status(&filter, items)), vec![2]);
    }

    #[test]
    fn test_milestone_stage_with_sentinels() {
        let mut with_milestone = item(1, ItemState::Open, ItemKind::Issue);
        with_milestone.milestone = Milestone::new("v1.0", Some("open".to_string()));
        let bare_issue = item(2, ItemState::Open, ItemKind::Issue);
        let bare_pr = item(3, ItemState::Open, ItemKind::PullRequest);

        // Selecting the issue sentinel keeps milestone-less issues only;
        // the PR sentinel is a distinct title and stays unselected.
        let filter = Filter {
            milestones: vec![Milestone::sentinel_for(ItemKind::Issue).title.clone()],
            ..Default::default()
        };

        let kept = filter_by_milestone(&filter, vec![with_milestone, bare_issue, bare_pr]);
        assert_eq!(ids(&kept), vec![2]);
    }

    #[test]
    fn test_milestone_stage_empty_selection_admits_all() {
        let filter = Filter::default();
        let items = vec![item(1, ItemState::Open, ItemKind::Issue)];
        assert_eq!(filter_by_milestone(&filter, items).len(), 1);
    }

    #[test]
    fn test_label_stage_is_conjunctive() {
        let filter = Filter {
            labels: vec!["x".to_string(), "y".to_string()],
            ..Default::default()
        };

        let mut both = item(1, ItemState::Open, ItemKind::Issue);
        both.labels = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        let mut only_x = item(2, ItemState::Open, ItemKind::Issue);
        only_x.labels = vec!["x".to_string()];

        let kept = filter_by_labels(&filter, vec![both, only_x]);
        assert_eq!(ids(&kept), vec![1]);
    }

    #[test]
    fn test_search_stage_is_case_insensitive_substring() {
        let filter = Filter {
            title: "ITEM 1".to_string(),
            ..Default::default()
        };
        let items = vec![
            item(1, ItemState::Open, ItemKind::Issue),
            item(2, ItemState::Open, ItemKind::Issue),
        ];
        let kept = filter_by_search(&filter, DEFAULT_SEARCH_COLUMNS, items);
        assert_eq!(ids(&kept), vec![1]);
    }

    #[test]
    fn test_search_stage_matches_array_columns_per_element() {
        let mut labeled = item(1, ItemState::Open, ItemKind::Issue);
        labeled.labels = vec!["backend".to_string(), "bug".to_string()];
        let mut assigned = item(2, ItemState::Open, ItemKind::Issue);
        assigned.assignees = vec!["backstop".to_string()];
        let plain = item(3, ItemState::Open, ItemKind::Issue);

        let filter = Filter {
            title: "back".to_string(),
            ..Default::default()
        };
        let kept = filter_by_search(
            &filter,
            &[SearchColumn::Labels, SearchColumn::Assignees],
            vec![labeled, assigned, plain],
        );
        assert_eq!(ids(&kept), vec![1, 2]);
    }

    #[test]
    fn test_search_stage_empty_query_is_identity() {
        let filter = Filter::default();
        let items = vec![item(1, ItemState::Open, ItemKind::Issue)];
        assert_eq!(
            filter_by_search(&filter, DEFAULT_SEARCH_COLUMNS, items).len(),
            1
        );
    }

    #[test]
    fn test_statuses_from_strs_ignores_unknown() {
        let parsed = Filter::statuses_from_strs(["open issue", "bogus state", "merged pull request"]);
        assert_eq!(
            parsed,
            HashSet::from([ItemStatus::OpenIssue, ItemStatus::MergedPullRequest])
        );
    }

    #[test]
    fn test_clone_with_replaces_fields_wholesale() {
        let original = Filter::default();
        let updated = original.clone_with(FilterUpdate {
            title: Some("query".to_string()),
            items_per_page: Some(50),
            ..Default::default()
        });

        assert_eq!(updated.title, "query");
        assert_eq!(updated.items_per_page, 50);
        assert_eq!(original.title, "");
        assert_eq!(original.items_per_page, DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(updated.kind, original.kind);
    }

    #[test]
    fn test_kind_selector_from_str() {
        assert_eq!(
            KindSelector::from_str("pull request").unwrap(),
            KindSelector::PullRequest
        );
        assert_eq!(KindSelector::from_str("all").unwrap(), KindSelector::All);
        assert!(KindSelector::from_str("gist").is_err());
    }

    #[test]
    fn test_apply_filter_stage_order() {
        // Status, milestone, and label stages run before search; an item
        // matching the search text but failing an earlier stage is gone.
        let mut open = item(1, ItemState::Open, ItemKind::Issue);
        open.title = "needle".to_string();
        let mut closed = item(2, ItemState::Closed, ItemKind::Issue);
        closed.title = "needle".to_string();

        let filter = Filter {
            status: HashSet::from([ItemStatus::OpenIssue]),
            title: "needle".to_string(),
            ..Default::default()
        };

        let kept = apply_filter(&filter, DEFAULT_SEARCH_COLUMNS, vec![open, closed]);
        assert_eq!(ids(&kept), vec![1]);
    }
}
