// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use lectern_app::{
    Badge, BadgeFormInput, BadgeId, Course, CourseFormInput, CourseId, CourseStatus, Educator,
    EducatorFormInput, EducatorId, EducatorProfile, EducatorProfileId, Enrollment,
    EnrollmentFormInput, EnrollmentId,
    FormPayload, MentorNote, MentorNoteFormInput, MentorNoteId, ProfileFormInput,
    ProgramSection, ProgramSectionFormInput, ProgramSectionId, RecordSource, SettingKey,
    SettingValue, Validate,
};
use lectern_db::Store;
use lectern_testkit::ClassroomFaker;

const DEMO_COURSES: usize = 12;
const DEMO_BADGES: usize = 18;
const DEMO_SECTIONS: usize = 8;
const DEMO_NOTES: usize = 14;
const DEMO_EDUCATORS: usize = 10;

/// Adapts a [`Store`] to the list pages' data-source seam.
pub struct DbRuntime<'a> {
    store: &'a Store,
    course_scope: Option<CourseId>,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            course_scope: None,
        }
    }

    /// Restricts the enrollment list to one course, as the per-course
    /// analytics page does.
    pub fn with_course_scope(mut self, course_id: Option<CourseId>) -> Self {
        self.course_scope = course_id;
        self
    }

    pub fn submit_form(&mut self, payload: &FormPayload) -> Result<()> {
        payload.validate()?;

        match payload {
            FormPayload::Course(form) => {
                self.store.create_course(form)?;
            }
            FormPayload::Enrollment(form) => {
                self.store.create_enrollment(form)?;
            }
            FormPayload::Badge(form) => {
                self.store.create_badge(form)?;
            }
            FormPayload::ProgramSection(form) => {
                self.store.create_program_section(form)?;
            }
            FormPayload::MentorNote(form) => {
                self.store.create_mentor_note(form)?;
            }
            FormPayload::Educator(form) => {
                self.store.create_educator(form)?;
            }
            FormPayload::Profile(form) => {
                self.store.upsert_profile(form)?;
            }
        }
        Ok(())
    }

    /// Applies `key=value` pairs to the typed settings table.
    pub fn apply_settings(&mut self, pairs: &[(String, String)]) -> Result<()> {
        for (raw_key, raw_value) in pairs {
            let key = SettingKey::parse(raw_key).ok_or_else(|| {
                anyhow!(
                    "unknown setting {raw_key:?} -- expected one of: {}",
                    SettingKey::ALL
                        .iter()
                        .map(|key| key.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })?;
            let value = SettingValue::parse_for_key(key, raw_value).ok_or_else(|| {
                anyhow!(
                    "setting {} needs an on/off value, got {raw_value:?} -- use true or false",
                    key.as_str()
                )
            })?;
            self.store.put_setting(key, value)?;
        }
        Ok(())
    }

    /// Merges `field=value` pairs into the saved profile (or a blank one) and
    /// saves the result.
    pub fn apply_profile(&mut self, pairs: &[(String, String)]) -> Result<EducatorProfileId> {
        let mut form = self
            .store
            .get_profile()?
            .as_ref()
            .map(profile_form)
            .unwrap_or_default();
        for (key, value) in pairs {
            form.set_field(key, value)?;
        }
        form.validate().context("save profile")?;
        self.store.upsert_profile(&form)
    }

    pub fn seed_demo_data(&mut self, faker: &mut ClassroomFaker) -> Result<()> {
        for _ in 0..DEMO_COURSES {
            let course = RecordSource::<Course>::create(self, &faker.course())?;
            if matches!(course.status, CourseStatus::Active | CourseStatus::Archived) {
                let count = 3 + faker.int_n(6);
                for _ in 0..count {
                    self.submit_form(&FormPayload::Enrollment(faker.enrollment(course.id)))?;
                }
            }
        }
        for _ in 0..DEMO_BADGES {
            self.submit_form(&FormPayload::Badge(faker.badge()))?;
        }
        for _ in 0..DEMO_SECTIONS {
            self.submit_form(&FormPayload::ProgramSection(faker.program_section()))?;
        }
        for _ in 0..DEMO_NOTES {
            self.submit_form(&FormPayload::MentorNote(faker.mentor_note()))?;
        }
        for _ in 0..DEMO_EDUCATORS {
            self.submit_form(&FormPayload::Educator(faker.educator()))?;
        }
        self.submit_form(&FormPayload::Profile(faker.profile()))?;
        tracing::debug!("demo data seeded");
        Ok(())
    }
}

fn profile_form(profile: &EducatorProfile) -> ProfileFormInput {
    ProfileFormInput {
        full_name: profile.full_name.clone(),
        email: profile.email.clone(),
        phone: profile.phone.clone(),
        department: profile.department.clone(),
        title: profile.title.clone(),
        office_location: profile.office_location.clone(),
        office_hours: profile.office_hours.clone(),
        specialization: profile.specialization.clone(),
        bio: profile.bio.clone(),
        city: profile.city.clone(),
        state: profile.state.clone(),
        country: profile.country.clone(),
        years_of_experience: profile.years_of_experience,
    }
}

impl RecordSource<Course> for DbRuntime<'_> {
    fn list(&mut self) -> Result<Vec<Course>> {
        self.store.list_courses()
    }

    fn create(&mut self, form: &CourseFormInput) -> Result<Course> {
        let id = self.store.create_course(form)?;
        self.store.get_course(id)
    }

    fn update(&mut self, id: CourseId, form: &CourseFormInput) -> Result<Course> {
        self.store.update_course(id, form)?;
        self.store.get_course(id)
    }

    fn delete(&mut self, id: CourseId) -> Result<()> {
        self.store.delete_course(id)
    }
}

impl RecordSource<Enrollment> for DbRuntime<'_> {
    fn list(&mut self) -> Result<Vec<Enrollment>> {
        match self.course_scope {
            Some(course_id) => self.store.list_course_enrollments(course_id),
            None => self.store.list_enrollments(),
        }
    }

    fn create(&mut self, form: &EnrollmentFormInput) -> Result<Enrollment> {
        let id = self.store.create_enrollment(form)?;
        self.store.get_enrollment(id)
    }

    fn update(&mut self, id: EnrollmentId, form: &EnrollmentFormInput) -> Result<Enrollment> {
        self.store.update_enrollment(id, form)?;
        self.store.get_enrollment(id)
    }

    fn delete(&mut self, id: EnrollmentId) -> Result<()> {
        self.store.delete_enrollment(id)
    }
}

impl RecordSource<Badge> for DbRuntime<'_> {
    fn list(&mut self) -> Result<Vec<Badge>> {
        self.store.list_badges()
    }

    fn create(&mut self, form: &BadgeFormInput) -> Result<Badge> {
        let id = self.store.create_badge(form)?;
        self.store.get_badge(id)
    }

    fn update(&mut self, id: BadgeId, form: &BadgeFormInput) -> Result<Badge> {
        self.store.update_badge(id, form)?;
        self.store.get_badge(id)
    }

    fn delete(&mut self, id: BadgeId) -> Result<()> {
        self.store.delete_badge(id)
    }
}

impl RecordSource<ProgramSection> for DbRuntime<'_> {
    fn list(&mut self) -> Result<Vec<ProgramSection>> {
        self.store.list_program_sections()
    }

    fn create(&mut self, form: &ProgramSectionFormInput) -> Result<ProgramSection> {
        let id = self.store.create_program_section(form)?;
        self.store.get_program_section(id)
    }

    fn update(
        &mut self,
        id: ProgramSectionId,
        form: &ProgramSectionFormInput,
    ) -> Result<ProgramSection> {
        self.store.update_program_section(id, form)?;
        self.store.get_program_section(id)
    }

    fn delete(&mut self, id: ProgramSectionId) -> Result<()> {
        self.store.delete_program_section(id)
    }
}

impl RecordSource<MentorNote> for DbRuntime<'_> {
    fn list(&mut self) -> Result<Vec<MentorNote>> {
        self.store.list_mentor_notes()
    }

    fn create(&mut self, form: &MentorNoteFormInput) -> Result<MentorNote> {
        let id = self.store.create_mentor_note(form)?;
        self.store.get_mentor_note(id)
    }

    fn update(&mut self, id: MentorNoteId, form: &MentorNoteFormInput) -> Result<MentorNote> {
        self.store.update_mentor_note(id, form)?;
        self.store.get_mentor_note(id)
    }

    fn delete(&mut self, id: MentorNoteId) -> Result<()> {
        self.store.delete_mentor_note(id)
    }
}

impl RecordSource<Educator> for DbRuntime<'_> {
    fn list(&mut self) -> Result<Vec<Educator>> {
        self.store.list_educators()
    }

    fn create(&mut self, form: &EducatorFormInput) -> Result<Educator> {
        let id = self.store.create_educator(form)?;
        self.store.get_educator(id)
    }

    fn update(&mut self, id: EducatorId, form: &EducatorFormInput) -> Result<Educator> {
        self.store.update_educator(id, form)?;
        self.store.get_educator(id)
    }

    fn delete(&mut self, id: EducatorId) -> Result<()> {
        self.store.delete_educator(id)
    }
}
