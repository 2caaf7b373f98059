// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! In-memory filtering, sorting and paging shared by every list page.
//!
//! Each entity describes its searchable fields, filterable fields and sort
//! keys through [`Listable`]; the functions here never look at concrete
//! entity types. Output rows always borrow from the input slice, so a result
//! can reorder and drop items but never invent or duplicate them.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

use crate::state::ListView;

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// A named key with a fixed set of values, such as a filter or sort column.
pub trait ListKey: Copy + Ord + fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.as_str() == value)
    }
}

/// Field accessors that let the list utilities work on an entity.
pub trait Listable {
    type Filter: ListKey;
    type Sort: ListKey;

    const DEFAULT_SORT: Self::Sort;

    /// Fields checked by the free-text query. Absent values are empty strings.
    fn searchable_fields(&self) -> Vec<&str>;

    /// Values compared against a filter selection. Set-valued fields return
    /// every member; the filter admits the item when any member matches.
    fn filter_values(&self, filter: Self::Filter) -> Vec<&str>;

    fn sort_value(&self, sort: Self::Sort) -> SortValue<'_>;
}

/// A discrete filter selection. `All` places no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Both spellings of the sentinel used by the filter dropdowns disable
    /// the filter.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "All" | "all" => Self::All,
            value => Self::Only(value.to_owned()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn admits(&self, values: &[&str]) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => values.iter().any(|value| *value == wanted),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(value) => f.write_str(value),
        }
    }
}

/// The value an item exposes for one sort key. The variant decides the
/// direction: text ascends, timestamps and numbers descend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Timestamp(Option<OffsetDateTime>),
    Number(i64),
}

pub fn compare_sort_values(left: &SortValue<'_>, right: &SortValue<'_>) -> Ordering {
    match (left, right) {
        (SortValue::Text(left), SortValue::Text(right)) => locale_cmp(left, right),
        (SortValue::Timestamp(left), SortValue::Timestamp(right)) => match (left, right) {
            (Some(left), Some(right)) => right.cmp(left),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        (SortValue::Number(left), SortValue::Number(right)) => right.cmp(left),
        _ => Ordering::Equal,
    }
}

/// Case-insensitive ordering with a case-sensitive tiebreak. On a
/// difference of case alone the lowercase spelling sorts first.
///
/// This is code-point order after folding, not collation: accented letters
/// sort after `z` ("Émile" after "Zoe"), and letters are not grouped with
/// their unaccented base the way a locale-aware collator would group them.
pub fn locale_cmp(left: &str, right: &str) -> Ordering {
    let folded_left = left.chars().flat_map(char::to_lowercase);
    let folded_right = right.chars().flat_map(char::to_lowercase);
    folded_left.cmp(folded_right).then_with(|| right.cmp(left))
}

pub fn matches_query<T: Listable>(item: &T, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    item.searchable_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn matches_filters<T: Listable>(item: &T, filters: &BTreeMap<T::Filter, Selection>) -> bool {
    filters
        .iter()
        .filter(|(_, selection)| !selection.is_all())
        .all(|(filter, selection)| selection.admits(&item.filter_values(*filter)))
}

pub fn filter_items<'a, T: Listable>(
    items: &'a [T],
    query: &str,
    filters: &BTreeMap<T::Filter, Selection>,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| matches_query(*item, query) && matches_filters(*item, filters))
        .collect()
}

/// Stable: rows with equal keys keep their relative order.
pub fn sort_rows<T: Listable>(rows: &mut [&T], sort: T::Sort) {
    rows.sort_by(|left, right| {
        compare_sort_values(&left.sort_value(sort), &right.sort_value(sort))
    });
}

/// Filtered and fully sorted rows, before any paging.
pub fn ordered_rows<'a, T: Listable>(
    items: &'a [T],
    query: &str,
    filters: &BTreeMap<T::Filter, Selection>,
    sort: T::Sort,
) -> Vec<&'a T> {
    let mut rows = filter_items(items, query, filters);
    sort_rows(&mut rows, sort);
    rows
}

/// One-based page slice. Page 0 reads as page 1; pages past the end and a
/// zero page size give an empty slice.
pub fn paginate<R>(rows: &[R], page: usize, page_size: usize) -> &[R] {
    if page_size == 0 {
        return &[];
    }
    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}

pub fn total_pages(total_rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_rows.div_ceil(page_size)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<'a, T> {
    pub rows: Vec<&'a T>,
    pub page: usize,
    pub page_size: usize,
    pub total_matches: usize,
    pub total_pages: usize,
}

impl<T> PageSlice<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Zero-based index of the first row of this page within the ordered list.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Derives what a list page displays for `view`.
pub fn project<'a, T: Listable>(
    items: &'a [T],
    view: &ListView<T::Filter, T::Sort>,
) -> PageSlice<'a, T> {
    let ordered = ordered_rows(items, &view.query, &view.filters, view.sort);
    let page = view.page.max(1);
    PageSlice {
        rows: paginate(&ordered, page, view.page_size).to_vec(),
        page,
        page_size: view.page_size,
        total_matches: ordered.len(),
        total_pages: total_pages(ordered.len(), view.page_size),
    }
}
