// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use std::collections::{BTreeMap, BTreeSet};
use time::OffsetDateTime;

use crate::validation::parse_optional_int;
use crate::{
    AccountStatus, BadgeDefinitionId, CollegeId, CourseId, CourseStatus, EnrollmentStatus,
    FormKind, MentorNoteCategory, SchoolId, StudentId, VerificationStatus,
};

/// Checks a form before it is submitted to the data layer.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseFormInput {
    pub title: String,
    pub code: String,
    pub description: String,
    pub status: CourseStatus,
    pub skills: BTreeSet<String>,
    pub linked_classes: BTreeSet<String>,
    pub enrollment_count: i64,
    pub completion_rate: Option<i64>,
    pub evidence_pending: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentFormInput {
    pub course_id: CourseId,
    pub student_id: StudentId,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub status: EnrollmentStatus,
    pub progress: i64,
    pub enrolled_at: OffsetDateTime,
    pub last_accessed_at: Option<OffsetDateTime>,
    pub lessons_completed: i64,
    pub lessons_total: i64,
    pub total_time_spent_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeFormInput {
    pub badge_definition_id: BadgeDefinitionId,
    pub badge_name: String,
    pub student_id: StudentId,
    pub student_name: String,
    pub category: String,
    pub awarded_at: OffsetDateTime,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSectionFormInput {
    pub program_name: String,
    pub program_code: String,
    pub department_name: String,
    pub college_id: CollegeId,
    pub semester: String,
    pub section: String,
    pub academic_year: String,
    pub current_students: i64,
    pub max_students: i64,
    pub faculty_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentInput {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentorNoteFormInput {
    pub student_id: StudentId,
    pub student_name: String,
    pub category: MentorNoteCategory,
    pub quick_notes: Vec<String>,
    pub description: String,
    pub action_points: String,
    pub attachment: Option<AttachmentInput>,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EducatorFormInput {
    pub school_id: SchoolId,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub qualification: String,
    pub experience_years: Option<i64>,
    pub designation: String,
    pub department: String,
    pub joined_at: Option<OffsetDateTime>,
    pub account_status: AccountStatus,
    pub verification_status: VerificationStatus,
    pub subjects_handled: BTreeSet<String>,
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileFormInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub title: String,
    pub office_location: String,
    pub office_hours: String,
    pub specialization: String,
    pub bio: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub years_of_experience: Option<i64>,
}

impl ProfileFormInput {
    pub const FIELDS: [&'static str; 13] = [
        "full_name",
        "email",
        "phone",
        "department",
        "title",
        "office_location",
        "office_hours",
        "specialization",
        "bio",
        "city",
        "state",
        "country",
        "years_of_experience",
    ];

    /// Builds a profile from loosely keyed input such as `--set key=value`
    /// pairs. Missing keys stay empty; unknown keys are an error.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Result<Self> {
        let mut profile = Self::default();
        for (key, value) in fields {
            profile.set_field(key, value)?;
        }
        Ok(profile)
    }

    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        let slot = match key {
            "full_name" => &mut self.full_name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "department" => &mut self.department,
            "title" => &mut self.title,
            "office_location" => &mut self.office_location,
            "office_hours" => &mut self.office_hours,
            "specialization" => &mut self.specialization,
            "bio" => &mut self.bio,
            "city" => &mut self.city,
            "state" => &mut self.state,
            "country" => &mut self.country,
            "years_of_experience" => {
                self.years_of_experience = parse_optional_int(value)
                    .with_context(|| format!("profile field {key} = {value:?}"))?;
                return Ok(());
            }
            other => bail!(
                "unknown profile field {other:?} -- expected one of: {}",
                Self::FIELDS.join(", ")
            ),
        };
        *slot = value.to_owned();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Course(CourseFormInput),
    Enrollment(EnrollmentFormInput),
    Badge(BadgeFormInput),
    ProgramSection(ProgramSectionFormInput),
    MentorNote(MentorNoteFormInput),
    Educator(EducatorFormInput),
    Profile(ProfileFormInput),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Course(_) => FormKind::Course,
            Self::Enrollment(_) => FormKind::Enrollment,
            Self::Badge(_) => FormKind::Badge,
            Self::ProgramSection(_) => FormKind::ProgramSection,
            Self::MentorNote(_) => FormKind::MentorNote,
            Self::Educator(_) => FormKind::Educator,
            Self::Profile(_) => FormKind::Profile,
        }
    }

    pub fn blank_for(kind: FormKind) -> Self {
        match kind {
            FormKind::Course => Self::Course(CourseFormInput {
                title: String::new(),
                code: String::new(),
                description: String::new(),
                status: CourseStatus::Draft,
                skills: BTreeSet::new(),
                linked_classes: BTreeSet::new(),
                enrollment_count: 0,
                completion_rate: None,
                evidence_pending: 0,
            }),
            FormKind::Enrollment => Self::Enrollment(EnrollmentFormInput {
                course_id: CourseId::new(0),
                student_id: StudentId::new(0),
                student_name: None,
                student_email: None,
                status: EnrollmentStatus::Active,
                progress: 0,
                enrolled_at: OffsetDateTime::UNIX_EPOCH,
                last_accessed_at: None,
                lessons_completed: 0,
                lessons_total: 0,
                total_time_spent_seconds: None,
            }),
            FormKind::Badge => Self::Badge(BadgeFormInput {
                badge_definition_id: BadgeDefinitionId::new(0),
                badge_name: String::new(),
                student_id: StudentId::new(0),
                student_name: String::new(),
                category: String::new(),
                awarded_at: OffsetDateTime::UNIX_EPOCH,
                notes: String::new(),
            }),
            FormKind::ProgramSection => Self::ProgramSection(ProgramSectionFormInput {
                program_name: String::new(),
                program_code: String::new(),
                department_name: String::new(),
                college_id: CollegeId::new(0),
                semester: String::new(),
                section: String::new(),
                academic_year: String::new(),
                current_students: 0,
                max_students: 0,
                faculty_name: None,
            }),
            FormKind::MentorNote => Self::MentorNote(MentorNoteFormInput {
                student_id: StudentId::new(0),
                student_name: String::new(),
                category: MentorNoteCategory::General,
                quick_notes: Vec::new(),
                description: String::new(),
                action_points: String::new(),
                attachment: None,
                author: String::new(),
            }),
            FormKind::Educator => Self::Educator(EducatorFormInput {
                school_id: SchoolId::new(0),
                employee_id: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
                phone: String::new(),
                specialization: String::new(),
                qualification: String::new(),
                experience_years: None,
                designation: String::new(),
                department: String::new(),
                joined_at: None,
                account_status: AccountStatus::Active,
                verification_status: VerificationStatus::Pending,
                subjects_handled: BTreeSet::new(),
                city: String::new(),
                state: String::new(),
                country: String::new(),
            }),
            FormKind::Profile => Self::Profile(ProfileFormInput::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Course(course) => course.validate(),
            Self::Enrollment(enrollment) => enrollment.validate(),
            Self::Badge(badge) => badge.validate(),
            Self::ProgramSection(section) => section.validate(),
            Self::MentorNote(note) => note.validate(),
            Self::Educator(educator) => educator.validate(),
            Self::Profile(profile) => profile.validate(),
        }
    }
}

impl Validate for CourseFormInput {
    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            bail!("course title is required -- enter a title and retry");
        }
        if self.code.trim().is_empty() {
            bail!("course code is required -- enter a code and retry");
        }
        if let Some(rate) = self.completion_rate
            && !(0..=100).contains(&rate)
        {
            bail!("course completion rate must be between 0 and 100");
        }
        if self.enrollment_count < 0 || self.evidence_pending < 0 {
            bail!("course counts cannot be negative");
        }
        Ok(())
    }
}

impl Validate for EnrollmentFormInput {
    fn validate(&self) -> Result<()> {
        if self.course_id.get() <= 0 {
            bail!("enrollment course is required -- choose a course and retry");
        }
        if self.student_id.get() <= 0 {
            bail!("enrollment student is required -- choose a student and retry");
        }
        if !(0..=100).contains(&self.progress) {
            bail!("enrollment progress must be between 0 and 100");
        }
        if self.lessons_completed < 0 || self.lessons_total < 0 {
            bail!("lesson counts cannot be negative");
        }
        if self.lessons_completed > self.lessons_total {
            bail!("completed lessons cannot exceed total lessons");
        }
        if let Some(seconds) = self.total_time_spent_seconds
            && seconds < 0
        {
            bail!("time spent cannot be negative");
        }
        Ok(())
    }
}

impl Validate for BadgeFormInput {
    fn validate(&self) -> Result<()> {
        if self.badge_definition_id.get() <= 0 {
            bail!("badge definition is required -- choose a badge and retry");
        }
        if self.student_id.get() <= 0 {
            bail!("badge student is required -- choose a student and retry");
        }
        if self.badge_name.trim().is_empty() {
            bail!("badge name is required -- enter a name and retry");
        }
        Ok(())
    }
}

impl Validate for ProgramSectionFormInput {
    fn validate(&self) -> Result<()> {
        if self.program_name.trim().is_empty() {
            bail!("program name is required -- enter a program and retry");
        }
        if self.semester.trim().is_empty() {
            bail!("semester is required -- enter a semester and retry");
        }
        if self.section.trim().is_empty() {
            bail!("section label is required -- enter a section and retry");
        }
        if self.max_students <= 0 {
            bail!("maximum students must be positive");
        }
        if self.current_students < 0 {
            bail!("current students cannot be negative");
        }
        if self.current_students > self.max_students {
            bail!(
                "section is over capacity ({} of {}) -- raise the maximum or move students",
                self.current_students,
                self.max_students
            );
        }
        Ok(())
    }
}

impl Validate for AttachmentInput {
    fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            bail!("attachment file name is required -- choose a file and retry");
        }
        if self.mime_type.trim().is_empty() {
            bail!("attachment MIME type is required");
        }
        if self.data.is_empty() {
            bail!("attachment content is empty -- choose a file with content and retry");
        }
        Ok(())
    }
}

impl Validate for MentorNoteFormInput {
    fn validate(&self) -> Result<()> {
        if self.student_id.get() <= 0 {
            bail!("mentor note student is required -- choose a student and retry");
        }
        let has_quick_note = self.quick_notes.iter().any(|note| !note.trim().is_empty());
        if self.description.trim().is_empty() && !has_quick_note {
            bail!("mentor note is empty -- write feedback or pick a quick note and retry");
        }
        if let Some(attachment) = &self.attachment {
            attachment.validate()?;
        }
        Ok(())
    }
}

impl Validate for EducatorFormInput {
    fn validate(&self) -> Result<()> {
        if self.school_id.get() <= 0 {
            bail!("educator school is required -- choose a school and retry");
        }
        if self.first_name.trim().is_empty() && self.last_name.trim().is_empty() {
            bail!("educator name is required -- enter a first or last name and retry");
        }
        let email = self.email.trim();
        if !email.is_empty() && !email.contains('@') {
            bail!("educator email {:?} is not an email address", self.email);
        }
        if let Some(years) = self.experience_years
            && years < 0
        {
            bail!("educator experience cannot be negative, got {years} years");
        }
        Ok(())
    }
}

impl Validate for ProfileFormInput {
    fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            bail!("profile name is required -- enter your full name and retry");
        }
        if self.email.trim().is_empty() {
            bail!("profile email is required -- enter an email and retry");
        }
        if !self.email.contains('@') {
            bail!("profile email {:?} is not an email address", self.email);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AttachmentInput, CourseFormInput, EducatorFormInput, EnrollmentFormInput, FormPayload,
        MentorNoteFormInput, ProfileFormInput, ProgramSectionFormInput, Validate,
    };
    use crate::{CourseId, FormKind, MentorNoteCategory, SchoolId, StudentId};
    use std::collections::BTreeMap;

    fn course_form() -> CourseFormInput {
        let FormPayload::Course(course) = FormPayload::blank_for(FormKind::Course) else {
            panic!("blank course payload");
        };
        CourseFormInput {
            title: "Algebra I".to_owned(),
            code: "MATH-101".to_owned(),
            ..course
        }
    }

    fn note_form() -> MentorNoteFormInput {
        MentorNoteFormInput {
            student_id: StudentId::new(4),
            student_name: "Priya Nair".to_owned(),
            category: MentorNoteCategory::Academic,
            quick_notes: Vec::new(),
            description: "Strong start on the lab report.".to_owned(),
            action_points: String::new(),
            attachment: None,
            author: "Dr. Rao".to_owned(),
        }
    }

    #[test]
    fn blank_payload_matches_requested_kind() {
        for kind in [
            FormKind::Course,
            FormKind::Enrollment,
            FormKind::Badge,
            FormKind::ProgramSection,
            FormKind::MentorNote,
            FormKind::Educator,
            FormKind::Profile,
        ] {
            assert_eq!(FormPayload::blank_for(kind).kind(), kind);
        }
    }

    #[test]
    fn blank_course_fails_validation() {
        assert!(FormPayload::blank_for(FormKind::Course).validate().is_err());
    }

    #[test]
    fn course_validation_accepts_valid_payload() {
        assert!(course_form().validate().is_ok());
    }

    #[test]
    fn course_validation_rejects_out_of_range_completion() {
        let course = CourseFormInput {
            completion_rate: Some(101),
            ..course_form()
        };
        assert!(course.validate().is_err());
    }

    #[test]
    fn enrollment_validation_rejects_more_completed_than_total_lessons() {
        let FormPayload::Enrollment(blank) = FormPayload::blank_for(FormKind::Enrollment) else {
            panic!("blank enrollment payload");
        };
        let enrollment = EnrollmentFormInput {
            course_id: CourseId::new(1),
            student_id: StudentId::new(2),
            lessons_completed: 5,
            lessons_total: 4,
            ..blank
        };
        let err = enrollment.validate().expect_err("lessons exceed total");
        assert!(err.to_string().contains("completed lessons"));
    }

    #[test]
    fn section_validation_rejects_over_capacity() {
        let FormPayload::ProgramSection(blank) = FormPayload::blank_for(FormKind::ProgramSection)
        else {
            panic!("blank section payload");
        };
        let section = ProgramSectionFormInput {
            program_name: "BSc Physics".to_owned(),
            semester: "1".to_owned(),
            section: "A".to_owned(),
            current_students: 61,
            max_students: 60,
            ..blank
        };
        assert!(section.validate().is_err());
        let section = ProgramSectionFormInput {
            current_students: 60,
            ..section
        };
        assert!(section.validate().is_ok());
    }

    #[test]
    fn mentor_note_accepts_quick_note_without_description() {
        let note = MentorNoteFormInput {
            description: "  ".to_owned(),
            quick_notes: vec!["Needs follow-up".to_owned()],
            ..note_form()
        };
        assert!(note.validate().is_ok());

        let empty = MentorNoteFormInput {
            quick_notes: Vec::new(),
            ..note
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn mentor_note_attachment_requires_content() {
        let note = MentorNoteFormInput {
            attachment: Some(AttachmentInput {
                file_name: "report.pdf".to_owned(),
                mime_type: "application/pdf".to_owned(),
                data: Vec::new(),
            }),
            ..note_form()
        };
        assert!(FormPayload::MentorNote(note).validate().is_err());
    }

    #[test]
    fn educator_validation_needs_school_and_a_name() {
        let FormPayload::Educator(blank) = FormPayload::blank_for(FormKind::Educator) else {
            panic!("blank educator payload");
        };
        let err = blank.validate().expect_err("blank educator");
        assert!(err.to_string().contains("school is required"));

        let educator = EducatorFormInput {
            school_id: SchoolId::new(3),
            ..blank
        };
        let err = educator.validate().expect_err("nameless educator");
        assert!(err.to_string().contains("name is required"));

        let educator = EducatorFormInput {
            last_name: "Iyer".to_owned(),
            ..educator
        };
        assert!(educator.validate().is_ok());

        let bad_email = EducatorFormInput {
            email: "meera.school.edu".to_owned(),
            ..educator.clone()
        };
        assert!(bad_email.validate().is_err());

        let negative = EducatorFormInput {
            experience_years: Some(-1),
            ..educator
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn profile_from_fields_rejects_unknown_keys() {
        let fields = BTreeMap::from([
            ("full_name".to_owned(), "Anita Rao".to_owned()),
            ("favourite_colour".to_owned(), "green".to_owned()),
        ]);
        let err = ProfileFormInput::from_fields(&fields).expect_err("unknown key");
        assert!(err.to_string().contains("favourite_colour"));
    }

    #[test]
    fn profile_from_fields_parses_experience() {
        let fields = BTreeMap::from([
            ("full_name".to_owned(), "Anita Rao".to_owned()),
            ("email".to_owned(), "anita@campus.edu".to_owned()),
            ("years_of_experience".to_owned(), "12".to_owned()),
        ]);
        let profile = ProfileFormInput::from_fields(&fields).expect("valid fields");
        assert_eq!(profile.years_of_experience, Some(12));
        assert!(profile.validate().is_ok());

        let bad = BTreeMap::from([("years_of_experience".to_owned(), "lots".to_owned())]);
        assert!(ProfileFormInput::from_fields(&bad).is_err());
    }

    #[test]
    fn profile_validation_requires_email_shape() {
        let profile = ProfileFormInput {
            full_name: "Anita Rao".to_owned(),
            email: "anita.campus.edu".to_owned(),
            ..ProfileFormInput::default()
        };
        assert!(profile.validate().is_err());
    }
}
