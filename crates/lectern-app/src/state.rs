// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::listing::{DEFAULT_PAGE_SIZE, Selection, total_pages};

/// Everything a list page needs to derive its visible rows, apart from the
/// rows themselves. Updated only through [`ListView::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<F: Ord, S> {
    pub query: String,
    /// Only constrained filters are stored; a missing key means `All`.
    pub filters: BTreeMap<F, Selection>,
    pub sort: S,
    pub page: usize,
    pub page_size: usize,
}

impl<F: Ord, S> ListView<F, S> {
    pub fn new(sort: S, page_size: usize) -> Self {
        Self {
            query: String::new(),
            filters: BTreeMap::new(),
            sort,
            page: 1,
            page_size,
        }
    }

    pub fn with_default_page_size(sort: S) -> Self {
        Self::new(sort, DEFAULT_PAGE_SIZE)
    }

    pub fn selection(&self, filter: &F) -> &Selection {
        static ALL: Selection = Selection::All;
        self.filters.get(filter).unwrap_or(&ALL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand<F, S> {
    SetQuery(String),
    SetFilter(F, Selection),
    ClearFilters,
    SetSort(S),
    SetPage(usize),
    /// The underlying list was reloaded and this many rows now match the
    /// query and filters.
    ItemsReloaded(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent<F, S> {
    QueryChanged(String),
    FilterChanged(F, Selection),
    FiltersCleared,
    SortChanged(S),
    PageChanged(usize),
    PageReset,
}

impl<F, S> ListView<F, S>
where
    F: Ord + Copy,
    S: Copy + PartialEq,
{
    /// Applies `command` and returns the resulting view with the events it
    /// produced. A command that changes nothing produces no events.
    pub fn dispatch(&self, command: ListCommand<F, S>) -> (Self, Vec<ListEvent<F, S>>) {
        let mut next = self.clone();
        let mut events = Vec::new();
        match command {
            ListCommand::SetQuery(query) => {
                if next.query != query {
                    next.query = query.clone();
                    events.push(ListEvent::QueryChanged(query));
                    next.reset_page(&mut events);
                }
            }
            ListCommand::SetFilter(filter, selection) => {
                if *next.selection(&filter) != selection {
                    if selection.is_all() {
                        next.filters.remove(&filter);
                    } else {
                        next.filters.insert(filter, selection.clone());
                    }
                    events.push(ListEvent::FilterChanged(filter, selection));
                    next.reset_page(&mut events);
                }
            }
            ListCommand::ClearFilters => {
                if !next.filters.is_empty() {
                    next.filters.clear();
                    events.push(ListEvent::FiltersCleared);
                    next.reset_page(&mut events);
                }
            }
            ListCommand::SetSort(sort) => {
                if next.sort != sort {
                    next.sort = sort;
                    events.push(ListEvent::SortChanged(sort));
                    next.reset_page(&mut events);
                }
            }
            ListCommand::SetPage(page) => {
                let page = page.max(1);
                if next.page != page {
                    next.page = page;
                    events.push(ListEvent::PageChanged(page));
                }
            }
            ListCommand::ItemsReloaded(match_count) => {
                let last_page = total_pages(match_count, next.page_size).max(1);
                if next.page > last_page {
                    next.page = last_page;
                    events.push(ListEvent::PageChanged(last_page));
                }
            }
        }
        (next, events)
    }

    fn reset_page(&mut self, events: &mut Vec<ListEvent<F, S>>) {
        if self.page > 1 {
            self.page = 1;
            events.push(ListEvent::PageReset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ListCommand, ListEvent, ListView};
    use crate::listing::Selection;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Filter {
        Status,
        Skill,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Sort {
        Name,
        Enrollment,
    }

    type View = ListView<Filter, Sort>;

    fn on_page(page: usize) -> View {
        View {
            page,
            ..View::new(Sort::Name, 2)
        }
    }

    #[test]
    fn query_change_resets_page() {
        let view = on_page(3);
        let (next, events) = view.dispatch(ListCommand::SetQuery("al".to_owned()));
        assert_eq!(next.page, 1);
        assert_eq!(next.query, "al");
        assert_eq!(
            events,
            vec![
                ListEvent::QueryChanged("al".to_owned()),
                ListEvent::PageReset
            ]
        );
        assert_eq!(view.page, 3, "original view is untouched");
    }

    #[test]
    fn filter_change_resets_page() {
        let view = on_page(2);
        let (next, events) = view.dispatch(ListCommand::SetFilter(
            Filter::Status,
            Selection::Only("Active".to_owned()),
        ));
        assert_eq!(next.page, 1);
        assert_eq!(
            next.selection(&Filter::Status),
            &Selection::Only("Active".to_owned())
        );
        assert!(events.contains(&ListEvent::PageReset));
    }

    #[test]
    fn sort_change_resets_page() {
        let (next, events) = on_page(4).dispatch(ListCommand::SetSort(Sort::Enrollment));
        assert_eq!(next.page, 1);
        assert_eq!(next.sort, Sort::Enrollment);
        assert_eq!(
            events,
            vec![ListEvent::SortChanged(Sort::Enrollment), ListEvent::PageReset]
        );
    }

    #[test]
    fn change_on_first_page_emits_no_reset() {
        let (next, events) = on_page(1).dispatch(ListCommand::SetSort(Sort::Enrollment));
        assert_eq!(next.page, 1);
        assert_eq!(events, vec![ListEvent::SortChanged(Sort::Enrollment)]);
    }

    #[test]
    fn unchanged_input_keeps_page() {
        let view = on_page(3);
        let (next, events) = view.dispatch(ListCommand::SetSort(Sort::Name));
        assert_eq!(next, view);
        assert!(events.is_empty());

        let (next, events) = view.dispatch(ListCommand::SetFilter(Filter::Skill, Selection::All));
        assert_eq!(next.page, 3);
        assert!(events.is_empty());
    }

    #[test]
    fn selecting_all_removes_the_constraint() {
        let (filtered, _) = on_page(1).dispatch(ListCommand::SetFilter(
            Filter::Skill,
            Selection::Only("Python".to_owned()),
        ));
        let (cleared, events) =
            filtered.dispatch(ListCommand::SetFilter(Filter::Skill, Selection::All));
        assert!(cleared.filters.is_empty());
        assert_eq!(
            events,
            vec![ListEvent::FilterChanged(Filter::Skill, Selection::All)]
        );
    }

    #[test]
    fn clear_filters_resets_page_only_when_something_was_cleared() {
        let (filtered, _) = on_page(1).dispatch(ListCommand::SetFilter(
            Filter::Status,
            Selection::Only("Draft".to_owned()),
        ));
        let (paged, _) = filtered.dispatch(ListCommand::SetPage(2));
        let (cleared, events) = paged.dispatch(ListCommand::ClearFilters);
        assert!(cleared.filters.is_empty());
        assert_eq!(cleared.page, 1);
        assert_eq!(events, vec![ListEvent::FiltersCleared, ListEvent::PageReset]);

        let (again, events) = cleared.dispatch(ListCommand::ClearFilters);
        assert_eq!(again, cleared);
        assert!(events.is_empty());
    }

    #[test]
    fn set_page_is_not_clamped_but_floors_at_one() {
        let (far, events) = on_page(1).dispatch(ListCommand::SetPage(40));
        assert_eq!(far.page, 40);
        assert_eq!(events, vec![ListEvent::PageChanged(40)]);

        let (zero, _) = far.dispatch(ListCommand::SetPage(0));
        assert_eq!(zero.page, 1);
    }

    #[test]
    fn reload_pulls_page_back_inside_the_list() {
        let (next, events) = on_page(3).dispatch(ListCommand::ItemsReloaded(3));
        assert_eq!(next.page, 2);
        assert_eq!(events, vec![ListEvent::PageChanged(2)]);

        let (empty, _) = on_page(3).dispatch(ListCommand::ItemsReloaded(0));
        assert_eq!(empty.page, 1);

        let (kept, events) = on_page(2).dispatch(ListCommand::ItemsReloaded(4));
        assert_eq!(kept.page, 2);
        assert!(events.is_empty());
    }
}
