#[macro_use]
mod macros;

pub mod config;
pub mod error;
pub mod filter;
pub mod group;
pub mod paginate;
pub mod remote;
pub mod sort;
pub mod store;
pub mod sync;
pub mod types;
pub mod view;

pub use config::Config;
pub use error::{Result, SpyglassError};
pub use filter::{
    DEFAULT_SEARCH_COLUMNS, Filter, FilterUpdate, KindSelector, SearchColumn, apply_filter,
    filter_by_labels, filter_by_milestone, filter_by_search, filter_by_status,
};
pub use group::{
    AssigneeGrouping, Group, GroupBy, GroupingStrategy, MilestoneGrouping, strategy_for,
};
pub use paginate::Paginator;
pub use remote::{
    FetchedPage, ItemFetcher, Label, RepoRef, RepoSession, User, github::GitHubFetcher,
};
pub use sort::{Sort, SortDirection, SortField, sort_items};
pub use store::ItemStore;
pub use sync::labels::{LabelStore, LabelSync};
pub use sync::poller::{PollTask, Poller};
pub use sync::{CycleOutcome, SyncEngine, stale_ids};
pub use types::{
    Item, ItemKind, ItemState, ItemStatus, Milestone, ReviewDecision, ReviewState, ReviewSummary,
    StateReason,
};
pub use view::ItemListView;
