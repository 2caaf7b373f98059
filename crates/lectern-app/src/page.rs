// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The list page view-model: one loaded entity list, its view state and the
//! last data-layer error. Rendering layers read [`ListPage::visible`] and
//! [`ListPage::analytics`]; everything that changes the page goes through a
//! method here.

use anyhow::Result;
use std::fmt::Debug;
use time::OffsetDateTime;

use crate::analytics::Summarize;
use crate::forms::{
    BadgeFormInput, CourseFormInput, EducatorFormInput, EnrollmentFormInput, MentorNoteFormInput,
    ProgramSectionFormInput, Validate,
};
use crate::listing::{DEFAULT_PAGE_SIZE, Listable, PageSlice, filter_items, project};
use crate::state::{ListCommand, ListEvent, ListView};
use crate::{
    Badge, BadgeId, Course, CourseId, Educator, EducatorId, Enrollment, EnrollmentId, EntityKind,
    MentorNote, MentorNoteId, ProgramSection, ProgramSectionId,
};

/// An entity a list page can show and edit.
pub trait Record: Listable + Summarize + Clone {
    type Id: Copy + Debug;
    type Form: Validate;

    const KIND: EntityKind;

    fn id(&self) -> Self::Id;
}

/// The data layer as seen by a list page. Every call touches one row or
/// lists the whole table; there is no batching.
pub trait RecordSource<T: Record> {
    fn list(&mut self) -> Result<Vec<T>>;
    fn create(&mut self, form: &T::Form) -> Result<T>;
    fn update(&mut self, id: T::Id, form: &T::Form) -> Result<T>;
    fn delete(&mut self, id: T::Id) -> Result<()>;
}

pub type PageView<T> = ListView<<T as Listable>::Filter, <T as Listable>::Sort>;
pub type PageCommand<T> = ListCommand<<T as Listable>::Filter, <T as Listable>::Sort>;
pub type PageEvent<T> = ListEvent<<T as Listable>::Filter, <T as Listable>::Sort>;

#[derive(Debug, Clone)]
pub struct ListPage<T: Record> {
    items: Vec<T>,
    view: PageView<T>,
    error: Option<String>,
}

impl<T: Record> Default for ListPage<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<T: Record> ListPage<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            view: ListView::new(T::DEFAULT_SORT, page_size),
            error: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn view(&self) -> &PageView<T> {
        &self.view
    }

    /// The last load or mutation failure, until dismissed or a later load
    /// succeeds.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn dispatch(&mut self, command: PageCommand<T>) -> Vec<PageEvent<T>> {
        let (next, events) = self.view.dispatch(command);
        self.view = next;
        events
    }

    /// Replaces the list with a fresh read. On failure the previous rows stay
    /// and the error is kept for display. Returns whether the load succeeded.
    pub fn load(&mut self, source: &mut impl RecordSource<T>) -> bool {
        match source.list() {
            Ok(items) => {
                tracing::debug!(kind = T::KIND.label(), rows = items.len(), "list loaded");
                self.items = items;
                self.error = None;
                let matches =
                    filter_items(&self.items, &self.view.query, &self.view.filters).len();
                self.dispatch(ListCommand::ItemsReloaded(matches));
                true
            }
            Err(error) => {
                tracing::warn!(kind = T::KIND.label(), error = %format!("{error:#}"), "list load failed");
                self.error = Some(format!("load {} failed: {error:#}", T::KIND.label()));
                false
            }
        }
    }

    pub fn retry(&mut self, source: &mut impl RecordSource<T>) -> bool {
        self.load(source)
    }

    pub fn create(&mut self, source: &mut impl RecordSource<T>, form: &T::Form) -> bool {
        let result = form.validate().and_then(|()| source.create(form));
        self.after_mutation(source, "create", result.map(|_| ()))
    }

    pub fn update(&mut self, source: &mut impl RecordSource<T>, id: T::Id, form: &T::Form) -> bool {
        let result = form.validate().and_then(|()| source.update(id, form));
        self.after_mutation(source, "update", result.map(|_| ()))
    }

    pub fn delete(&mut self, source: &mut impl RecordSource<T>, id: T::Id) -> bool {
        let result = source.delete(id);
        self.after_mutation(source, "delete", result)
    }

    fn after_mutation(
        &mut self,
        source: &mut impl RecordSource<T>,
        action: &str,
        result: Result<()>,
    ) -> bool {
        if let Err(error) = result {
            tracing::warn!(
                kind = T::KIND.label(),
                action,
                error = %format!("{error:#}"),
                "mutation failed"
            );
            self.error = Some(format!(
                "{action} {} failed: {error:#}",
                T::KIND.singular()
            ));
            return false;
        }
        self.load(source)
    }

    /// The current page of the filtered, sorted list.
    pub fn visible(&self) -> PageSlice<'_, T> {
        project(&self.items, &self.view)
    }

    /// Summary over every loaded row, ignoring the view state.
    pub fn analytics(&self, now: OffsetDateTime) -> T::Summary {
        T::summarize(&self.items, now)
    }
}

impl Record for Course {
    type Id = CourseId;
    type Form = CourseFormInput;

    const KIND: EntityKind = EntityKind::Course;

    fn id(&self) -> CourseId {
        self.id
    }
}

impl Record for Enrollment {
    type Id = EnrollmentId;
    type Form = EnrollmentFormInput;

    const KIND: EntityKind = EntityKind::Enrollment;

    fn id(&self) -> EnrollmentId {
        self.id
    }
}

impl Record for Badge {
    type Id = BadgeId;
    type Form = BadgeFormInput;

    const KIND: EntityKind = EntityKind::Badge;

    fn id(&self) -> BadgeId {
        self.id
    }
}

impl Record for ProgramSection {
    type Id = ProgramSectionId;
    type Form = ProgramSectionFormInput;

    const KIND: EntityKind = EntityKind::ProgramSection;

    fn id(&self) -> ProgramSectionId {
        self.id
    }
}

impl Record for MentorNote {
    type Id = MentorNoteId;
    type Form = MentorNoteFormInput;

    const KIND: EntityKind = EntityKind::MentorNote;

    fn id(&self) -> MentorNoteId {
        self.id
    }
}

impl Record for Educator {
    type Id = EducatorId;
    type Form = EducatorFormInput;

    const KIND: EntityKind = EntityKind::Educator;

    fn id(&self) -> EducatorId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::{ListPage, RecordSource};
    use crate::forms::{CourseFormInput, FormPayload};
    use crate::listing::Selection;
    use crate::lists::{CourseFilter, CourseSort};
    use crate::state::{ListCommand, ListEvent};
    use crate::{Course, CourseId, CourseStatus, FormKind};
    use anyhow::{Result, anyhow, bail};
    use time::OffsetDateTime;

    #[derive(Default)]
    struct MemorySource {
        rows: Vec<Course>,
        next_id: i64,
        fail_next_list: bool,
        list_calls: usize,
    }

    fn to_course(id: CourseId, form: &CourseFormInput) -> Course {
        Course {
            id,
            title: form.title.clone(),
            code: form.code.clone(),
            description: form.description.clone(),
            status: form.status,
            skills: form.skills.clone(),
            linked_classes: form.linked_classes.clone(),
            enrollment_count: form.enrollment_count,
            completion_rate: form.completion_rate,
            evidence_pending: form.evidence_pending,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    impl RecordSource<Course> for MemorySource {
        fn list(&mut self) -> Result<Vec<Course>> {
            self.list_calls += 1;
            if std::mem::take(&mut self.fail_next_list) {
                return Err(anyhow!("connection reset"));
            }
            Ok(self.rows.clone())
        }

        fn create(&mut self, form: &CourseFormInput) -> Result<Course> {
            self.next_id += 1;
            let course = to_course(CourseId::new(self.next_id), form);
            self.rows.push(course.clone());
            Ok(course)
        }

        fn update(&mut self, id: CourseId, form: &CourseFormInput) -> Result<Course> {
            let Some(row) = self.rows.iter_mut().find(|row| row.id == id) else {
                bail!("course {} not found", id.get());
            };
            *row = to_course(id, form);
            Ok(row.clone())
        }

        fn delete(&mut self, id: CourseId) -> Result<()> {
            let before = self.rows.len();
            self.rows.retain(|row| row.id != id);
            if self.rows.len() == before {
                bail!("course {} not found", id.get());
            }
            Ok(())
        }
    }

    fn form(title: &str, status: CourseStatus, enrolled: i64) -> CourseFormInput {
        let FormPayload::Course(blank) = FormPayload::blank_for(FormKind::Course) else {
            panic!("blank course payload");
        };
        CourseFormInput {
            title: title.to_owned(),
            code: title.to_uppercase(),
            status,
            enrollment_count: enrolled,
            ..blank
        }
    }

    fn seeded(count: i64) -> MemorySource {
        let mut source = MemorySource::default();
        for index in 0..count {
            source
                .create(&form(&format!("Course {index}"), CourseStatus::Active, index))
                .expect("seed course");
        }
        source
    }

    #[test]
    fn load_replaces_items_and_clears_error() {
        let mut source = seeded(3);
        let mut page = ListPage::<Course>::new(2);
        source.fail_next_list = true;
        assert!(!page.load(&mut source));
        assert!(page.error().is_some_and(|msg| msg.contains("connection reset")));
        assert!(page.items().is_empty());

        assert!(page.retry(&mut source));
        assert_eq!(page.items().len(), 3);
        assert!(page.error().is_none());
    }

    #[test]
    fn failed_reload_keeps_previous_rows() {
        let mut source = seeded(2);
        let mut page = ListPage::<Course>::new(25);
        assert!(page.load(&mut source));
        source.fail_next_list = true;
        assert!(!page.load(&mut source));
        assert_eq!(page.items().len(), 2);

        page.dismiss_error();
        assert!(page.error().is_none());
    }

    #[test]
    fn visible_reflects_view_and_analytics_use_full_list() {
        let mut source = seeded(5);
        let mut page = ListPage::<Course>::new(2);
        page.load(&mut source);
        page.dispatch(ListCommand::SetFilter(
            CourseFilter::Status,
            Selection::Only("Draft".to_owned()),
        ));
        assert!(page.visible().is_empty());
        assert_eq!(page.analytics(OffsetDateTime::UNIX_EPOCH).total, 5);

        page.dispatch(ListCommand::ClearFilters);
        page.dispatch(ListCommand::SetSort(CourseSort::Enrollment));
        let visible = page.visible();
        assert_eq!(visible.total_pages, 3);
        let titles: Vec<&str> = visible.rows.iter().map(|row| row.title.as_str()).collect();
        assert_eq!(titles, vec!["Course 4", "Course 3"]);
    }

    #[test]
    fn create_reloads_and_invalid_form_never_reaches_source() {
        let mut source = seeded(1);
        let mut page = ListPage::<Course>::new(25);
        page.load(&mut source);

        assert!(page.create(&mut source, &form("Biology", CourseStatus::Active, 25)));
        assert_eq!(page.items().len(), 2);

        let calls = source.list_calls;
        assert!(!page.create(&mut source, &form("", CourseStatus::Active, 0)));
        assert_eq!(source.rows.len(), 2);
        assert_eq!(source.list_calls, calls);
        assert!(page.error().is_some_and(|msg| msg.contains("title is required")));
    }

    #[test]
    fn update_of_missing_row_surfaces_error() {
        let mut source = seeded(1);
        let mut page = ListPage::<Course>::new(25);
        page.load(&mut source);
        let ok = page.update(
            &mut source,
            CourseId::new(99),
            &form("Ghost", CourseStatus::Draft, 0),
        );
        assert!(!ok);
        assert!(page.error().is_some_and(|msg| msg.contains("not found")));
    }

    #[test]
    fn delete_on_last_page_moves_back_a_page() {
        let mut source = seeded(5);
        let mut page = ListPage::<Course>::new(2);
        page.load(&mut source);
        page.dispatch(ListCommand::SetPage(3));
        assert_eq!(page.visible().rows.len(), 1);

        let last_id = page.visible().rows[0].id;
        assert!(page.delete(&mut source, last_id));
        assert_eq!(page.view().page, 2);
        assert_eq!(page.visible().rows.len(), 2);
    }

    #[test]
    fn delete_under_active_filter_clamps_to_last_filtered_page() {
        let mut source = seeded(5);
        for index in 0..5 {
            source
                .create(&form(&format!("Draft {index}"), CourseStatus::Draft, 0))
                .expect("seed draft course");
        }
        let mut page = ListPage::<Course>::new(2);
        page.load(&mut source);
        page.dispatch(ListCommand::SetFilter(
            CourseFilter::Status,
            Selection::Only("Active".to_owned()),
        ));
        page.dispatch(ListCommand::SetPage(3));
        let visible = page.visible();
        assert_eq!(visible.rows.len(), 1);
        assert_eq!(visible.total_pages, 3);

        let last_id = visible.rows[0].id;
        assert!(page.delete(&mut source, last_id));
        let visible = page.visible();
        assert_eq!(visible.total_pages, 2);
        assert_eq!(visible.page, 2);
        assert_eq!(visible.rows.len(), 2);
        assert_eq!(page.items().len(), 9);
    }

    #[test]
    fn dispatch_reports_page_reset() {
        let mut source = seeded(5);
        let mut page = ListPage::<Course>::new(2);
        page.load(&mut source);
        page.dispatch(ListCommand::SetPage(2));
        let events = page.dispatch(ListCommand::SetQuery("course".to_owned()));
        assert_eq!(
            events,
            vec![
                ListEvent::QueryChanged("course".to_owned()),
                ListEvent::PageReset
            ]
        );
    }
}
