//! Sort functions for mirrored items.
//!
//! Each sort field has its own comparator; the active field and direction
//! come from the current filter. All sorts are stable: items with equal
//! sort keys keep their pre-sort relative order, which downstream grouping
//! affordances rely on.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicase::UniCase;

use crate::types::Item;

/// Sort field for item listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Id,
    /// Updated timestamp, compared calendar-aware rather than as strings.
    Date,
    Status,
    Title,
}

enum_display_fromstr!(
    SortField,
    crate::error::SpyglassError::InvalidSortField,
    {
        Id => "id",
        Date => "date",
        Status => "status",
        Title => "title",
    }
);

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Apply this direction to a comparator result: ascending keeps it,
    /// descending reverses it.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

enum_display_fromstr!(
    SortDirection,
    crate::error::SpyglassError::InvalidSortDirection,
    {
        Asc => "asc",
        Desc => "desc",
    }
);

/// Active sort: field plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Sort { field, direction }
    }
}

/// Sort items in place by the given field and direction.
pub fn sort_items(items: &mut [Item], sort: Sort) {
    items.sort_by(|a, b| sort.direction.apply(compare_by_field(a, b, sort.field)));
}

fn compare_by_field(a: &Item, b: &Item, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Date => compare_by_date(a, b),
        SortField::Status => compare_by_status(a, b),
        SortField::Title => compare_titles(a, b),
    }
}

/// Chronological comparison of the updated timestamp. Items whose timestamp
/// does not parse sort after items whose timestamp does.
fn compare_by_date(a: &Item, b: &Item) -> Ordering {
    match (a.updated_timestamp(), b.updated_timestamp()) {
        (Some(ta), Some(tb)) => ta.cmp(&tb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Fixed precedence: open PR, open issue, merged PR, closed issue, closed PR.
/// Items sharing precedence tie-break alphabetically by title.
fn compare_by_status(a: &Item, b: &Item) -> Ordering {
    let pa = a.status().precedence();
    let pb = b.status().precedence();
    if pa != pb {
        pa.cmp(&pb)
    } else {
        compare_titles(a, b)
    }
}

fn compare_titles(a: &Item, b: &Item) -> Ordering {
    UniCase::new(&a.title).cmp(&UniCase::new(&b.title))
}
