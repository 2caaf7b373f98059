// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use lectern_app::{
    AccountStatus, AppSetting, Attachment, AttachmentInput, Badge, BadgeDefinitionId,
    BadgeFormInput, BadgeId, CollegeId, Course, CourseFormInput, CourseId, CourseStatus, Educator,
    EducatorFormInput, EducatorId, EducatorProfile, EducatorProfileId, Enrollment,
    EnrollmentFormInput, EnrollmentId, EnrollmentStatus, MentorNote, MentorNoteCategory,
    MentorNoteFormInput, MentorNoteId, ProfileFormInput, ProgramSection, ProgramSectionFormInput,
    ProgramSectionId, SchoolId, SettingKey, SettingValue, StudentId, VerificationStatus,
};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

pub const APP_NAME: &str = "lectern";
pub const MAX_ATTACHMENT_SIZE: i64 = 10 << 20;

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "courses",
        &[
            "id",
            "title",
            "code",
            "description",
            "status",
            "skills",
            "linked_classes",
            "enrollment_count",
            "completion_rate",
            "evidence_pending",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "enrollments",
        &[
            "id",
            "course_id",
            "student_id",
            "student_name",
            "student_email",
            "status",
            "progress",
            "enrolled_at",
            "last_accessed_at",
            "lessons_completed",
            "lessons_total",
            "total_time_spent_seconds",
        ],
    ),
    (
        "badges",
        &[
            "id",
            "badge_definition_id",
            "badge_name",
            "student_id",
            "student_name",
            "category",
            "awarded_at",
            "notes",
        ],
    ),
    (
        "program_sections",
        &[
            "id",
            "program_name",
            "program_code",
            "department_name",
            "college_id",
            "semester",
            "section",
            "academic_year",
            "current_students",
            "max_students",
            "faculty_name",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "mentor_notes",
        &[
            "id",
            "student_id",
            "student_name",
            "category",
            "quick_notes",
            "description",
            "action_points",
            "attachment_name",
            "attachment_mime",
            "attachment_size",
            "attachment_sha256",
            "attachment_data",
            "author",
            "created_at",
        ],
    ),
    (
        "educators",
        &[
            "id",
            "school_id",
            "employee_id",
            "first_name",
            "last_name",
            "email",
            "phone",
            "specialization",
            "qualification",
            "experience_years",
            "designation",
            "department",
            "joined_at",
            "account_status",
            "verification_status",
            "subjects_handled",
            "city",
            "state",
            "country",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "educator_profiles",
        &[
            "id",
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
            "created_at",
            "updated_at",
        ],
    ),
    ("settings", &["key", "value", "updated_at"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_courses_status",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_courses_status ON courses (status);",
    },
    RequiredIndex {
        name: "idx_enrollments_course_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_enrollments_course_id ON enrollments (course_id);",
    },
    RequiredIndex {
        name: "idx_enrollments_student_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_enrollments_student_id ON enrollments (student_id);",
    },
    RequiredIndex {
        name: "idx_badges_student_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_badges_student_id ON badges (student_id);",
    },
    RequiredIndex {
        name: "idx_program_sections_college_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_program_sections_college_id ON program_sections (college_id);",
    },
    RequiredIndex {
        name: "idx_mentor_notes_student_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_mentor_notes_student_id ON mentor_notes (student_id);",
    },
    RequiredIndex {
        name: "idx_educators_school_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_educators_school_id ON educators (school_id);",
    },
];

const COURSE_COLUMNS: &str = "
  id, title, code, description, status, skills, linked_classes,
  enrollment_count, completion_rate, evidence_pending, created_at, updated_at
";

const ENROLLMENT_COLUMNS: &str = "
  id, course_id, student_id, student_name, student_email, status, progress,
  enrolled_at, last_accessed_at, lessons_completed, lessons_total,
  total_time_spent_seconds
";

const BADGE_COLUMNS: &str = "
  id, badge_definition_id, badge_name, student_id, student_name, category,
  awarded_at, notes
";

const SECTION_COLUMNS: &str = "
  id, program_name, program_code, department_name, college_id, semester,
  section, academic_year, current_students, max_students, faculty_name,
  created_at, updated_at
";

const NOTE_COLUMNS: &str = "
  id, student_id, student_name, category, quick_notes, description,
  action_points, attachment_name, attachment_mime, attachment_size,
  attachment_sha256, author, created_at
";

const EDUCATOR_COLUMNS: &str = "
  id, school_id, employee_id, first_name, last_name, email, phone,
  specialization, qualification, experience_years, designation, department,
  joined_at, account_status, verification_status, subjects_handled, city,
  state, country, created_at, updated_at
";

const PROFILE_COLUMNS: &str = "
  id, full_name, email, phone, department, title, office_location,
  office_hours, specialization, bio, city, state, country,
  years_of_experience, created_at, updated_at
";

/// The bytes of a mentor-note attachment together with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentContent {
    pub attachment: Attachment,
    pub data: Vec<u8>,
}

pub struct Store {
    conn: Connection,
    max_attachment_size: i64,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self {
            conn,
            max_attachment_size: MAX_ATTACHMENT_SIZE,
        })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self {
            conn,
            max_attachment_size: MAX_ATTACHMENT_SIZE,
        })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
            tracing::debug!("existing schema validated");
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
            tracing::debug!("schema created");
        }

        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    pub fn set_max_attachment_size(&mut self, value: i64) -> Result<()> {
        if value <= 0 {
            bail!("max attachment size must be positive, got {value}");
        }
        self.max_attachment_size = value;
        Ok(())
    }

    pub fn max_attachment_size(&self) -> i64 {
        self.max_attachment_size
    }

    pub fn list_courses(&self) -> Result<Vec<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY id ASC"))
            .context("prepare courses query")?;
        let rows = stmt
            .query_map([], course_from_row)
            .context("query courses")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect courses")
    }

    pub fn get_course(&self, course_id: CourseId) -> Result<Course> {
        self.conn
            .query_row(
                &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"),
                params![course_id.get()],
                course_from_row,
            )
            .with_context(|| format!("load course {}", course_id.get()))
    }

    pub fn create_course(&self, course: &CourseFormInput) -> Result<CourseId> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO courses (
                  title, code, description, status, skills, linked_classes,
                  enrollment_count, completion_rate, evidence_pending,
                  created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    course.title,
                    course.code,
                    course.description,
                    course.status.as_str(),
                    encode_tag_set(&course.skills)?,
                    encode_tag_set(&course.linked_classes)?,
                    course.enrollment_count,
                    course.completion_rate,
                    course.evidence_pending,
                    now,
                    now,
                ],
            )
            .context("insert course")?;

        let id = CourseId::new(self.conn.last_insert_rowid());
        tracing::debug!(course_id = id.get(), "course created");
        Ok(id)
    }

    pub fn update_course(&self, course_id: CourseId, course: &CourseFormInput) -> Result<()> {
        let now = now_rfc3339()?;
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE courses
                SET
                  title = ?,
                  code = ?,
                  description = ?,
                  status = ?,
                  skills = ?,
                  linked_classes = ?,
                  enrollment_count = ?,
                  completion_rate = ?,
                  evidence_pending = ?,
                  updated_at = ?
                WHERE id = ?
                ",
                params![
                    course.title,
                    course.code,
                    course.description,
                    course.status.as_str(),
                    encode_tag_set(&course.skills)?,
                    encode_tag_set(&course.linked_classes)?,
                    course.enrollment_count,
                    course.completion_rate,
                    course.evidence_pending,
                    now,
                    course_id.get(),
                ],
            )
            .context("update course")?;
        if rows_affected == 0 {
            bail!(
                "course {} not found -- choose an existing course and retry",
                course_id.get()
            );
        }
        tracing::debug!(course_id = course_id.get(), "course updated");
        Ok(())
    }

    /// Deleting a course also removes its enrollments.
    pub fn delete_course(&self, course_id: CourseId) -> Result<()> {
        self.delete_row("courses", "course", course_id.get())
    }

    pub fn list_enrollments(&self) -> Result<Vec<Enrollment>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {ENROLLMENT_COLUMNS} FROM enrollments ORDER BY id ASC"
            ))
            .context("prepare enrollments query")?;
        let rows = stmt
            .query_map([], enrollment_from_row)
            .context("query enrollments")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect enrollments")
    }

    pub fn list_course_enrollments(&self, course_id: CourseId) -> Result<Vec<Enrollment>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE course_id = ? ORDER BY id ASC"
            ))
            .context("prepare course enrollments query")?;
        let rows = stmt
            .query_map(params![course_id.get()], enrollment_from_row)
            .with_context(|| format!("query enrollments for course {}", course_id.get()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect course enrollments")
    }

    pub fn get_enrollment(&self, enrollment_id: EnrollmentId) -> Result<Enrollment> {
        self.conn
            .query_row(
                &format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?"),
                params![enrollment_id.get()],
                enrollment_from_row,
            )
            .with_context(|| format!("load enrollment {}", enrollment_id.get()))
    }

    pub fn create_enrollment(&self, enrollment: &EnrollmentFormInput) -> Result<EnrollmentId> {
        self.require_course(enrollment.course_id)?;
        self.conn
            .execute(
                "
                INSERT INTO enrollments (
                  course_id, student_id, student_name, student_email, status,
                  progress, enrolled_at, last_accessed_at, lessons_completed,
                  lessons_total, total_time_spent_seconds
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    enrollment.course_id.get(),
                    enrollment.student_id.get(),
                    enrollment.student_name,
                    enrollment.student_email,
                    enrollment.status.as_str(),
                    enrollment.progress,
                    format_datetime(enrollment.enrolled_at)?,
                    format_opt_datetime(enrollment.last_accessed_at)?,
                    enrollment.lessons_completed,
                    enrollment.lessons_total,
                    enrollment.total_time_spent_seconds,
                ],
            )
            .context("insert enrollment")?;

        let id = EnrollmentId::new(self.conn.last_insert_rowid());
        tracing::debug!(enrollment_id = id.get(), "enrollment created");
        Ok(id)
    }

    pub fn update_enrollment(
        &self,
        enrollment_id: EnrollmentId,
        enrollment: &EnrollmentFormInput,
    ) -> Result<()> {
        self.require_course(enrollment.course_id)?;
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE enrollments
                SET
                  course_id = ?,
                  student_id = ?,
                  student_name = ?,
                  student_email = ?,
                  status = ?,
                  progress = ?,
                  enrolled_at = ?,
                  last_accessed_at = ?,
                  lessons_completed = ?,
                  lessons_total = ?,
                  total_time_spent_seconds = ?
                WHERE id = ?
                ",
                params![
                    enrollment.course_id.get(),
                    enrollment.student_id.get(),
                    enrollment.student_name,
                    enrollment.student_email,
                    enrollment.status.as_str(),
                    enrollment.progress,
                    format_datetime(enrollment.enrolled_at)?,
                    format_opt_datetime(enrollment.last_accessed_at)?,
                    enrollment.lessons_completed,
                    enrollment.lessons_total,
                    enrollment.total_time_spent_seconds,
                    enrollment_id.get(),
                ],
            )
            .context("update enrollment")?;
        if rows_affected == 0 {
            bail!(
                "enrollment {} not found -- choose an existing enrollment and retry",
                enrollment_id.get()
            );
        }
        tracing::debug!(enrollment_id = enrollment_id.get(), "enrollment updated");
        Ok(())
    }

    pub fn delete_enrollment(&self, enrollment_id: EnrollmentId) -> Result<()> {
        self.delete_row("enrollments", "enrollment", enrollment_id.get())
    }

    pub fn list_badges(&self) -> Result<Vec<Badge>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {BADGE_COLUMNS} FROM badges ORDER BY id ASC"))
            .context("prepare badges query")?;
        let rows = stmt.query_map([], badge_from_row).context("query badges")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect badges")
    }

    pub fn get_badge(&self, badge_id: BadgeId) -> Result<Badge> {
        self.conn
            .query_row(
                &format!("SELECT {BADGE_COLUMNS} FROM badges WHERE id = ?"),
                params![badge_id.get()],
                badge_from_row,
            )
            .with_context(|| format!("load badge {}", badge_id.get()))
    }

    pub fn create_badge(&self, badge: &BadgeFormInput) -> Result<BadgeId> {
        self.conn
            .execute(
                "
                INSERT INTO badges (
                  badge_definition_id, badge_name, student_id, student_name,
                  category, awarded_at, notes
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    badge.badge_definition_id.get(),
                    badge.badge_name,
                    badge.student_id.get(),
                    badge.student_name,
                    badge.category,
                    format_datetime(badge.awarded_at)?,
                    badge.notes,
                ],
            )
            .context("insert badge")?;

        let id = BadgeId::new(self.conn.last_insert_rowid());
        tracing::debug!(badge_id = id.get(), "badge awarded");
        Ok(id)
    }

    pub fn update_badge(&self, badge_id: BadgeId, badge: &BadgeFormInput) -> Result<()> {
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE badges
                SET
                  badge_definition_id = ?,
                  badge_name = ?,
                  student_id = ?,
                  student_name = ?,
                  category = ?,
                  awarded_at = ?,
                  notes = ?
                WHERE id = ?
                ",
                params![
                    badge.badge_definition_id.get(),
                    badge.badge_name,
                    badge.student_id.get(),
                    badge.student_name,
                    badge.category,
                    format_datetime(badge.awarded_at)?,
                    badge.notes,
                    badge_id.get(),
                ],
            )
            .context("update badge")?;
        if rows_affected == 0 {
            bail!(
                "badge {} not found -- choose an existing badge and retry",
                badge_id.get()
            );
        }
        tracing::debug!(badge_id = badge_id.get(), "badge updated");
        Ok(())
    }

    pub fn delete_badge(&self, badge_id: BadgeId) -> Result<()> {
        self.delete_row("badges", "badge", badge_id.get())
    }

    pub fn list_program_sections(&self) -> Result<Vec<ProgramSection>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SECTION_COLUMNS} FROM program_sections ORDER BY id ASC"
            ))
            .context("prepare program sections query")?;
        let rows = stmt
            .query_map([], section_from_row)
            .context("query program sections")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect program sections")
    }

    pub fn get_program_section(&self, section_id: ProgramSectionId) -> Result<ProgramSection> {
        self.conn
            .query_row(
                &format!("SELECT {SECTION_COLUMNS} FROM program_sections WHERE id = ?"),
                params![section_id.get()],
                section_from_row,
            )
            .with_context(|| format!("load program section {}", section_id.get()))
    }

    pub fn create_program_section(
        &self,
        section: &ProgramSectionFormInput,
    ) -> Result<ProgramSectionId> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO program_sections (
                  program_name, program_code, department_name, college_id,
                  semester, section, academic_year, current_students,
                  max_students, faculty_name, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    section.program_name,
                    section.program_code,
                    section.department_name,
                    section.college_id.get(),
                    section.semester,
                    section.section,
                    section.academic_year,
                    section.current_students,
                    section.max_students,
                    section.faculty_name,
                    now,
                    now,
                ],
            )
            .context("insert program section")?;

        let id = ProgramSectionId::new(self.conn.last_insert_rowid());
        tracing::debug!(section_id = id.get(), "program section created");
        Ok(id)
    }

    pub fn update_program_section(
        &self,
        section_id: ProgramSectionId,
        section: &ProgramSectionFormInput,
    ) -> Result<()> {
        let now = now_rfc3339()?;
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE program_sections
                SET
                  program_name = ?,
                  program_code = ?,
                  department_name = ?,
                  college_id = ?,
                  semester = ?,
                  section = ?,
                  academic_year = ?,
                  current_students = ?,
                  max_students = ?,
                  faculty_name = ?,
                  updated_at = ?
                WHERE id = ?
                ",
                params![
                    section.program_name,
                    section.program_code,
                    section.department_name,
                    section.college_id.get(),
                    section.semester,
                    section.section,
                    section.academic_year,
                    section.current_students,
                    section.max_students,
                    section.faculty_name,
                    now,
                    section_id.get(),
                ],
            )
            .context("update program section")?;
        if rows_affected == 0 {
            bail!(
                "program section {} not found -- choose an existing section and retry",
                section_id.get()
            );
        }
        tracing::debug!(section_id = section_id.get(), "program section updated");
        Ok(())
    }

    pub fn delete_program_section(&self, section_id: ProgramSectionId) -> Result<()> {
        self.delete_row("program_sections", "program section", section_id.get())
    }

    pub fn list_mentor_notes(&self) -> Result<Vec<MentorNote>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {NOTE_COLUMNS} FROM mentor_notes ORDER BY id ASC"
            ))
            .context("prepare mentor notes query")?;
        let rows = stmt
            .query_map([], note_from_row)
            .context("query mentor notes")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect mentor notes")
    }

    pub fn get_mentor_note(&self, note_id: MentorNoteId) -> Result<MentorNote> {
        self.conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM mentor_notes WHERE id = ?"),
                params![note_id.get()],
                note_from_row,
            )
            .with_context(|| format!("load mentor note {}", note_id.get()))
    }

    pub fn create_mentor_note(&self, note: &MentorNoteFormInput) -> Result<MentorNoteId> {
        let attachment = note
            .attachment
            .as_ref()
            .map(|input| self.prepare_attachment(input))
            .transpose()?;
        let (name, mime, size, checksum, data) = attachment_params(attachment.as_ref());
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO mentor_notes (
                  student_id, student_name, category, quick_notes, description,
                  action_points, attachment_name, attachment_mime, attachment_size,
                  attachment_sha256, attachment_data, author, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    note.student_id.get(),
                    note.student_name,
                    note.category.as_str(),
                    encode_tag_list(&note.quick_notes)?,
                    note.description,
                    note.action_points,
                    name,
                    mime,
                    size,
                    checksum,
                    data,
                    note.author,
                    now,
                ],
            )
            .context("insert mentor note")?;

        let id = MentorNoteId::new(self.conn.last_insert_rowid());
        tracing::debug!(
            note_id = id.get(),
            attachment = attachment.is_some(),
            "mentor note created"
        );
        Ok(id)
    }

    /// Rewrites the note's text fields. A form without an attachment keeps
    /// the stored one; use [`Store::clear_mentor_note_attachment`] to drop it.
    pub fn update_mentor_note(&self, note_id: MentorNoteId, note: &MentorNoteFormInput) -> Result<()> {
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE mentor_notes
                SET
                  student_id = ?,
                  student_name = ?,
                  category = ?,
                  quick_notes = ?,
                  description = ?,
                  action_points = ?,
                  author = ?
                WHERE id = ?
                ",
                params![
                    note.student_id.get(),
                    note.student_name,
                    note.category.as_str(),
                    encode_tag_list(&note.quick_notes)?,
                    note.description,
                    note.action_points,
                    note.author,
                    note_id.get(),
                ],
            )
            .context("update mentor note")?;
        if rows_affected == 0 {
            bail!(
                "mentor note {} not found -- choose an existing note and retry",
                note_id.get()
            );
        }

        if let Some(input) = &note.attachment {
            let attachment = self.prepare_attachment(input)?;
            let (name, mime, size, checksum, data) = attachment_params(Some(&attachment));
            self.conn
                .execute(
                    "
                    UPDATE mentor_notes
                    SET
                      attachment_name = ?,
                      attachment_mime = ?,
                      attachment_size = ?,
                      attachment_sha256 = ?,
                      attachment_data = ?
                    WHERE id = ?
                    ",
                    params![name, mime, size, checksum, data, note_id.get()],
                )
                .context("replace mentor note attachment")?;
        }
        tracing::debug!(note_id = note_id.get(), "mentor note updated");
        Ok(())
    }

    pub fn clear_mentor_note_attachment(&self, note_id: MentorNoteId) -> Result<()> {
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE mentor_notes
                SET
                  attachment_name = NULL,
                  attachment_mime = NULL,
                  attachment_size = NULL,
                  attachment_sha256 = NULL,
                  attachment_data = NULL
                WHERE id = ?
                ",
                params![note_id.get()],
            )
            .context("clear mentor note attachment")?;
        if rows_affected == 0 {
            bail!("mentor note {} not found", note_id.get());
        }
        Ok(())
    }

    /// Loads an attachment's bytes and checks them against the stored
    /// checksum. `None` when the note has no attachment.
    pub fn get_mentor_note_attachment(
        &self,
        note_id: MentorNoteId,
    ) -> Result<Option<AttachmentContent>> {
        let row = self
            .conn
            .query_row(
                "
                SELECT attachment_name, attachment_mime, attachment_size,
                       attachment_sha256, attachment_data
                FROM mentor_notes
                WHERE id = ?
                ",
                params![note_id.get()],
                |row| {
                    let name: Option<String> = row.get(0)?;
                    let mime: Option<String> = row.get(1)?;
                    let size: Option<i64> = row.get(2)?;
                    let checksum: Option<String> = row.get(3)?;
                    let data: Option<Vec<u8>> = row.get(4)?;
                    Ok((name, mime, size, checksum, data))
                },
            )
            .with_context(|| format!("load mentor note attachment {}", note_id.get()))?;

        let (Some(file_name), Some(data)) = (row.0, row.4) else {
            return Ok(None);
        };
        let checksum_sha256 = row.3.unwrap_or_default();
        let actual = checksum_sha256_hex(&data);
        if actual != checksum_sha256 {
            bail!(
                "attachment {file_name:?} on note {} is corrupt (checksum mismatch) -- re-upload the file",
                note_id.get()
            );
        }
        Ok(Some(AttachmentContent {
            attachment: Attachment {
                file_name,
                mime_type: row.1.unwrap_or_default(),
                size_bytes: row.2.unwrap_or_default(),
                checksum_sha256,
            },
            data,
        }))
    }

    pub fn delete_mentor_note(&self, note_id: MentorNoteId) -> Result<()> {
        self.delete_row("mentor_notes", "mentor note", note_id.get())
    }

    pub fn list_educators(&self) -> Result<Vec<Educator>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {EDUCATOR_COLUMNS} FROM educators ORDER BY id ASC"))
            .context("prepare educators query")?;
        let rows = stmt
            .query_map([], educator_from_row)
            .context("query educators")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect educators")
    }

    pub fn get_educator(&self, educator_id: EducatorId) -> Result<Educator> {
        self.conn
            .query_row(
                &format!("SELECT {EDUCATOR_COLUMNS} FROM educators WHERE id = ?"),
                params![educator_id.get()],
                educator_from_row,
            )
            .with_context(|| format!("load educator {}", educator_id.get()))
    }

    pub fn create_educator(&self, educator: &EducatorFormInput) -> Result<EducatorId> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO educators (
                  school_id, employee_id, first_name, last_name, email, phone,
                  specialization, qualification, experience_years, designation,
                  department, joined_at, account_status, verification_status,
                  subjects_handled, city, state, country, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    educator.school_id.get(),
                    educator.employee_id,
                    educator.first_name.trim(),
                    educator.last_name.trim(),
                    educator.email.trim(),
                    educator.phone,
                    educator.specialization,
                    educator.qualification,
                    educator.experience_years,
                    educator.designation,
                    educator.department,
                    format_opt_datetime(educator.joined_at)?,
                    educator.account_status.as_str(),
                    educator.verification_status.as_str(),
                    encode_tag_set(&educator.subjects_handled)?,
                    educator.city,
                    educator.state,
                    educator.country,
                    now,
                    now,
                ],
            )
            .context("insert educator")?;

        let id = EducatorId::new(self.conn.last_insert_rowid());
        tracing::debug!(educator_id = id.get(), "educator created");
        Ok(id)
    }

    pub fn update_educator(
        &self,
        educator_id: EducatorId,
        educator: &EducatorFormInput,
    ) -> Result<()> {
        let now = now_rfc3339()?;
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE educators
                SET
                  school_id = ?,
                  employee_id = ?,
                  first_name = ?,
                  last_name = ?,
                  email = ?,
                  phone = ?,
                  specialization = ?,
                  qualification = ?,
                  experience_years = ?,
                  designation = ?,
                  department = ?,
                  joined_at = ?,
                  account_status = ?,
                  verification_status = ?,
                  subjects_handled = ?,
                  city = ?,
                  state = ?,
                  country = ?,
                  updated_at = ?
                WHERE id = ?
                ",
                params![
                    educator.school_id.get(),
                    educator.employee_id,
                    educator.first_name.trim(),
                    educator.last_name.trim(),
                    educator.email.trim(),
                    educator.phone,
                    educator.specialization,
                    educator.qualification,
                    educator.experience_years,
                    educator.designation,
                    educator.department,
                    format_opt_datetime(educator.joined_at)?,
                    educator.account_status.as_str(),
                    educator.verification_status.as_str(),
                    encode_tag_set(&educator.subjects_handled)?,
                    educator.city,
                    educator.state,
                    educator.country,
                    now,
                    educator_id.get(),
                ],
            )
            .context("update educator")?;
        if rows_affected == 0 {
            bail!(
                "educator {} not found -- choose an existing educator and retry",
                educator_id.get()
            );
        }
        tracing::debug!(educator_id = educator_id.get(), "educator updated");
        Ok(())
    }

    pub fn delete_educator(&self, educator_id: EducatorId) -> Result<()> {
        self.delete_row("educators", "educator", educator_id.get())
    }

    pub fn get_profile(&self) -> Result<Option<EducatorProfile>> {
        self.conn
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM educator_profiles ORDER BY id ASC LIMIT 1"),
                [],
                profile_from_row,
            )
            .optional()
            .context("load educator profile")
    }

    pub fn upsert_profile(&self, profile: &ProfileFormInput) -> Result<EducatorProfileId> {
        let now = now_rfc3339()?;
        if let Some(existing) = self.get_profile()? {
            self.conn
                .execute(
                    "
                    UPDATE educator_profiles
                    SET
                      full_name = ?,
                      email = ?,
                      phone = ?,
                      department = ?,
                      title = ?,
                      office_location = ?,
                      office_hours = ?,
                      specialization = ?,
                      bio = ?,
                      city = ?,
                      state = ?,
                      country = ?,
                      years_of_experience = ?,
                      updated_at = ?
                    WHERE id = ?
                    ",
                    params![
                        profile.full_name,
                        profile.email,
                        profile.phone,
                        profile.department,
                        profile.title,
                        profile.office_location,
                        profile.office_hours,
                        profile.specialization,
                        profile.bio,
                        profile.city,
                        profile.state,
                        profile.country,
                        profile.years_of_experience,
                        now,
                        existing.id.get(),
                    ],
                )
                .context("update educator profile")?;
            tracing::debug!(profile_id = existing.id.get(), "profile updated");
            return Ok(existing.id);
        }

        self.conn
            .execute(
                "
                INSERT INTO educator_profiles (
                  full_name, email, phone, department, title, office_location,
                  office_hours, specialization, bio, city, state, country,
                  years_of_experience, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    profile.full_name,
                    profile.email,
                    profile.phone,
                    profile.department,
                    profile.title,
                    profile.office_location,
                    profile.office_hours,
                    profile.specialization,
                    profile.bio,
                    profile.city,
                    profile.state,
                    profile.country,
                    profile.years_of_experience,
                    now,
                    now,
                ],
            )
            .context("insert educator profile")?;
        let id = EducatorProfileId::new(self.conn.last_insert_rowid());
        tracing::debug!(profile_id = id.get(), "profile created");
        Ok(id)
    }

    fn get_setting_raw(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read setting {key}"))
    }

    fn put_setting_raw(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO settings (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert setting {key}"))?;
        Ok(())
    }

    pub fn get_setting(&self, key: SettingKey) -> Result<Option<SettingValue>> {
        let raw = self.get_setting_raw(key.as_str())?;
        raw.map(|value| {
            SettingValue::parse_for_key(key, &value).ok_or_else(|| {
                anyhow!(
                    "setting `{}` has invalid value `{}`; run `lectern settings --set {}=<value>` with a valid value",
                    key.as_str(),
                    value,
                    key.as_str()
                )
            })
        })
        .transpose()
    }

    pub fn put_setting(&self, key: SettingKey, value: SettingValue) -> Result<()> {
        let raw = value.to_storage(key).ok_or_else(|| {
            anyhow!(
                "setting `{}` expected {:?} value; choose a valid option and retry",
                key.as_str(),
                key.expected_value_kind()
            )
        })?;
        self.put_setting_raw(key.as_str(), &raw)?;
        tracing::debug!(key = key.as_str(), "setting saved");
        Ok(())
    }

    /// Every known setting, falling back to its default when never saved.
    pub fn list_settings(&self) -> Result<Vec<AppSetting>> {
        let mut settings = Vec::with_capacity(SettingKey::ALL.len());
        for key in SettingKey::ALL {
            let value = self
                .get_setting(key)?
                .unwrap_or_else(|| key.default_value());
            settings.push(AppSetting { key, value });
        }
        Ok(settings)
    }

    fn prepare_attachment(&self, input: &AttachmentInput) -> Result<PreparedAttachment> {
        let size = i64::try_from(input.data.len()).context("attachment size overflow")?;
        if size > self.max_attachment_size {
            bail!(
                "attachment is {} bytes but max allowed is {}; shrink the file and retry",
                size,
                self.max_attachment_size
            );
        }
        Ok(PreparedAttachment {
            file_name: input.file_name.clone(),
            mime_type: input.mime_type.clone(),
            size_bytes: size,
            checksum_sha256: checksum_sha256_hex(&input.data),
            data: input.data.clone(),
        })
    }

    fn require_course(&self, course_id: CourseId) -> Result<()> {
        let exists: i64 = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM courses WHERE id = ?)",
                params![course_id.get()],
                |row| row.get(0),
            )
            .with_context(|| format!("check course {}", course_id.get()))?;
        if exists != 1 {
            bail!(
                "course {} does not exist -- choose an existing course and retry",
                course_id.get()
            );
        }
        Ok(())
    }

    fn delete_row(&self, table: &str, label: &str, id: i64) -> Result<()> {
        let rows_affected = self
            .conn
            .execute(&format!("DELETE FROM {table} WHERE id = ?"), params![id])
            .with_context(|| format!("delete {label} {id}"))?;
        if rows_affected == 0 {
            bail!("{label} {id} not found -- it may already be deleted");
        }
        tracing::debug!(table, id, "row deleted");
        Ok(())
    }
}

struct PreparedAttachment {
    file_name: String,
    mime_type: String,
    size_bytes: i64,
    checksum_sha256: String,
    data: Vec<u8>,
}

type AttachmentParams<'a> = (
    Option<&'a str>,
    Option<&'a str>,
    Option<i64>,
    Option<&'a str>,
    Option<&'a [u8]>,
);

fn attachment_params(attachment: Option<&PreparedAttachment>) -> AttachmentParams<'_> {
    match attachment {
        Some(attachment) => (
            Some(attachment.file_name.as_str()),
            Some(attachment.mime_type.as_str()),
            Some(attachment.size_bytes),
            Some(attachment.checksum_sha256.as_str()),
            Some(attachment.data.as_slice()),
        ),
        None => (None, None, None, None, None),
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("LECTERN_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set LECTERN_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("lectern.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    let status_raw: String = row.get(4)?;
    let status = CourseStatus::parse(&status_raw)
        .ok_or_else(|| invalid_column(4, format!("unknown course status {status_raw}")))?;
    Ok(Course {
        id: CourseId::new(row.get(0)?),
        title: row.get(1)?,
        code: row.get(2)?,
        description: row.get(3)?,
        status,
        skills: tag_set_column(row, 5)?,
        linked_classes: tag_set_column(row, 6)?,
        enrollment_count: row.get(7)?,
        completion_rate: row.get(8)?,
        evidence_pending: row.get(9)?,
        created_at: datetime_column(row, 10)?,
        updated_at: datetime_column(row, 11)?,
    })
}

fn enrollment_from_row(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    let status_raw: String = row.get(5)?;
    let status = EnrollmentStatus::parse(&status_raw)
        .ok_or_else(|| invalid_column(5, format!("unknown enrollment status {status_raw}")))?;
    Ok(Enrollment {
        id: EnrollmentId::new(row.get(0)?),
        course_id: CourseId::new(row.get(1)?),
        student_id: StudentId::new(row.get(2)?),
        student_name: row.get(3)?,
        student_email: row.get(4)?,
        status,
        progress: row.get(6)?,
        enrolled_at: datetime_column(row, 7)?,
        last_accessed_at: opt_datetime_column(row, 8)?,
        lessons_completed: row.get(9)?,
        lessons_total: row.get(10)?,
        total_time_spent_seconds: row.get(11)?,
    })
}

fn badge_from_row(row: &Row<'_>) -> rusqlite::Result<Badge> {
    Ok(Badge {
        id: BadgeId::new(row.get(0)?),
        badge_definition_id: BadgeDefinitionId::new(row.get(1)?),
        badge_name: row.get(2)?,
        student_id: StudentId::new(row.get(3)?),
        student_name: row.get(4)?,
        category: row.get(5)?,
        awarded_at: datetime_column(row, 6)?,
        notes: row.get(7)?,
    })
}

fn section_from_row(row: &Row<'_>) -> rusqlite::Result<ProgramSection> {
    Ok(ProgramSection {
        id: ProgramSectionId::new(row.get(0)?),
        program_name: row.get(1)?,
        program_code: row.get(2)?,
        department_name: row.get(3)?,
        college_id: CollegeId::new(row.get(4)?),
        semester: row.get(5)?,
        section: row.get(6)?,
        academic_year: row.get(7)?,
        current_students: row.get(8)?,
        max_students: row.get(9)?,
        faculty_name: row.get(10)?,
        created_at: datetime_column(row, 11)?,
        updated_at: datetime_column(row, 12)?,
    })
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<MentorNote> {
    let category_raw: String = row.get(3)?;
    let category = MentorNoteCategory::parse(&category_raw)
        .ok_or_else(|| invalid_column(3, format!("unknown note category {category_raw}")))?;
    let quick_notes_raw: String = row.get(4)?;
    let quick_notes: Vec<String> = serde_json::from_str(&quick_notes_raw)
        .map_err(|error| invalid_column(4, format!("decode quick notes: {error}")))?;

    let attachment_name: Option<String> = row.get(7)?;
    let attachment = match attachment_name {
        Some(file_name) => Some(Attachment {
            file_name,
            mime_type: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            size_bytes: row.get::<_, Option<i64>>(9)?.unwrap_or_default(),
            checksum_sha256: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        }),
        None => None,
    };

    Ok(MentorNote {
        id: MentorNoteId::new(row.get(0)?),
        student_id: StudentId::new(row.get(1)?),
        student_name: row.get(2)?,
        category,
        quick_notes,
        description: row.get(5)?,
        action_points: row.get(6)?,
        attachment,
        author: row.get(11)?,
        created_at: datetime_column(row, 12)?,
    })
}

fn educator_from_row(row: &Row<'_>) -> rusqlite::Result<Educator> {
    let status_raw: String = row.get(13)?;
    let account_status = AccountStatus::parse(&status_raw)
        .ok_or_else(|| invalid_column(13, format!("unknown account status {status_raw}")))?;
    let verification_raw: String = row.get(14)?;
    let verification_status = VerificationStatus::parse(&verification_raw).ok_or_else(|| {
        invalid_column(14, format!("unknown verification status {verification_raw}"))
    })?;
    let first_name: String = row.get(3)?;
    let last_name: String = row.get(4)?;
    Ok(Educator {
        id: EducatorId::new(row.get(0)?),
        school_id: SchoolId::new(row.get(1)?),
        employee_id: row.get(2)?,
        full_name: Educator::join_name(&first_name, &last_name),
        first_name,
        last_name,
        email: row.get(5)?,
        phone: row.get(6)?,
        specialization: row.get(7)?,
        qualification: row.get(8)?,
        experience_years: row.get(9)?,
        designation: row.get(10)?,
        department: row.get(11)?,
        joined_at: opt_datetime_column(row, 12)?,
        account_status,
        verification_status,
        subjects_handled: tag_set_column(row, 15)?,
        city: row.get(16)?,
        state: row.get(17)?,
        country: row.get(18)?,
        created_at: datetime_column(row, 19)?,
        updated_at: datetime_column(row, 20)?,
    })
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<EducatorProfile> {
    Ok(EducatorProfile {
        id: EducatorProfileId::new(row.get(0)?),
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        department: row.get(4)?,
        title: row.get(5)?,
        office_location: row.get(6)?,
        office_hours: row.get(7)?,
        specialization: row.get(8)?,
        bio: row.get(9)?,
        city: row.get(10)?,
        state: row.get(11)?,
        country: row.get(12)?,
        years_of_experience: row.get(13)?,
        created_at: datetime_column(row, 14)?,
        updated_at: datetime_column(row, 15)?,
    })
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; use a lectern database or point LECTERN_DB_PATH at a new file"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; migrate the database before launching",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}; migrate the database before launching",
            missing.join(", ")
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    format_datetime(OffsetDateTime::now_utc())
}

fn format_datetime(value: OffsetDateTime) -> Result<String> {
    value.format(&Rfc3339).context("format timestamp")
}

fn format_opt_datetime(value: Option<OffsetDateTime>) -> Result<Option<String>> {
    value.map(format_datetime).transpose()
}

fn parse_datetime(raw: &str) -> Result<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(value);
    }

    // SQLite's CURRENT_TIMESTAMP form, always UTC.
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    bail!("unsupported datetime format {raw:?}")
}

fn datetime_column(row: &Row<'_>, index: usize) -> rusqlite::Result<OffsetDateTime> {
    let raw: String = row.get(index)?;
    parse_datetime(&raw).map_err(|error| invalid_column(index, error.to_string()))
}

fn opt_datetime_column(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<OffsetDateTime>> {
    let raw: Option<String> = row.get(index)?;
    raw.as_deref()
        .map(parse_datetime)
        .transpose()
        .map_err(|error| invalid_column(index, error.to_string()))
}

fn tag_set_column(row: &Row<'_>, index: usize) -> rusqlite::Result<BTreeSet<String>> {
    let raw: String = row.get(index)?;
    serde_json::from_str(&raw)
        .map_err(|error| invalid_column(index, format!("decode tag list: {error}")))
}

fn encode_tag_set(tags: &BTreeSet<String>) -> Result<String> {
    serde_json::to_string(tags).context("encode tag list")
}

fn encode_tag_list(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).context("encode quick notes")
}

fn invalid_column(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}

fn checksum_sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut output = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write as _;
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{Store, checksum_sha256_hex, parse_datetime};
    use anyhow::Result;
    use lectern_app::{SettingKey, SettingValue};
    use time::macros::datetime;

    #[test]
    fn list_settings_returns_typed_defaults() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;

        let settings = store.list_settings()?;
        assert_eq!(settings.len(), SettingKey::ALL.len());
        assert_eq!(settings[0].key, SettingKey::EmailNotifications);
        assert_eq!(settings[0].value, SettingValue::Bool(true));
        let time_zone = settings
            .iter()
            .find(|setting| setting.key == SettingKey::ClassTimeZone)
            .expect("time zone setting");
        assert_eq!(time_zone.value, SettingValue::Text("UTC".to_owned()));
        Ok(())
    }

    #[test]
    fn typed_settings_round_trip() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;

        store.put_setting(SettingKey::AutoGradeEnabled, SettingValue::Bool(true))?;
        store.put_setting(
            SettingKey::ClassTimeZone,
            SettingValue::Text("Asia/Kolkata".to_owned()),
        )?;

        assert_eq!(
            store.get_setting(SettingKey::AutoGradeEnabled)?,
            Some(SettingValue::Bool(true))
        );
        let settings = store.list_settings()?;
        assert!(settings.iter().any(|setting| setting.key
            == SettingKey::ClassTimeZone
            && setting.value == SettingValue::Text("Asia/Kolkata".to_owned())));
        Ok(())
    }

    #[test]
    fn mismatched_setting_kind_is_rejected() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        let error = store
            .put_setting(SettingKey::EmailNotifications, SettingValue::Text("yes".to_owned()))
            .expect_err("text value for bool setting");
        assert!(error.to_string().contains("notify.email"));
        Ok(())
    }

    #[test]
    fn invalid_bool_setting_is_actionable() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;

        store.put_setting_raw(SettingKey::WeeklyReportNotifications.as_str(), "maybe")?;
        let error = store
            .get_setting(SettingKey::WeeklyReportNotifications)
            .expect_err("invalid bool should be rejected");
        assert!(error.to_string().contains("lectern settings --set"));
        Ok(())
    }

    #[test]
    fn parse_datetime_accepts_sqlite_timestamps() -> Result<()> {
        assert_eq!(
            parse_datetime("2026-02-03 04:05:06")?,
            datetime!(2026-02-03 04:05:06 UTC)
        );
        assert_eq!(
            parse_datetime("2026-02-03T04:05:06+05:30")?,
            datetime!(2026-02-03 04:05:06 +05:30)
        );
        assert!(parse_datetime("03/02/2026").is_err());
        Ok(())
    }

    #[test]
    fn checksum_is_lowercase_hex_sha256() {
        assert_eq!(
            checksum_sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
