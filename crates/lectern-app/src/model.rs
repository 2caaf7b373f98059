// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::OffsetDateTime;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseStatus {
    Draft,
    Active,
    Archived,
    Upcoming,
}

impl CourseStatus {
    pub const ALL: [Self; 4] = [Self::Draft, Self::Active, Self::Archived, Self::Upcoming];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Active => "Active",
            Self::Archived => "Archived",
            Self::Upcoming => "Upcoming",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Draft" => Some(Self::Draft),
            "Active" => Some(Self::Active),
            "Archived" => Some(Self::Archived),
            "Upcoming" => Some(Self::Upcoming),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Dropped,
}

impl EnrollmentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "dropped" => Some(Self::Dropped),
            _ => None,
        }
    }
}

/// Coarse progress state derived from an enrollment's progress percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressBucket {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressBucket {
    pub const fn from_progress(progress: i64) -> Self {
        if progress >= 100 {
            Self::Completed
        } else if progress > 0 {
            Self::InProgress
        } else {
            Self::NotStarted
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MentorNoteCategory {
    Academic,
    Behavioral,
    Career,
    Wellbeing,
    General,
}

impl MentorNoteCategory {
    pub const ALL: [Self; 5] = [
        Self::Academic,
        Self::Behavioral,
        Self::Career,
        Self::Wellbeing,
        Self::General,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::Behavioral => "behavioral",
            Self::Career => "career",
            Self::Wellbeing => "wellbeing",
            Self::General => "general",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "academic" => Some(Self::Academic),
            "behavioral" => Some(Self::Behavioral),
            "career" => Some(Self::Career),
            "wellbeing" => Some(Self::Wellbeing),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

/// Whether an educator may sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
}

impl AccountStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::Suspended];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Verified, Self::Rejected];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Verified => "Verified",
            Self::Rejected => "Rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Course,
    Enrollment,
    Badge,
    ProgramSection,
    MentorNote,
    Educator,
}

impl EntityKind {
    pub const ALL: [Self; 6] = [
        Self::Course,
        Self::Enrollment,
        Self::Badge,
        Self::ProgramSection,
        Self::MentorNote,
        Self::Educator,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Course => "courses",
            Self::Enrollment => "enrollments",
            Self::Badge => "badges",
            Self::ProgramSection => "sections",
            Self::MentorNote => "notes",
            Self::Educator => "educators",
        }
    }

    pub const fn singular(self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Enrollment => "enrollment",
            Self::Badge => "badge",
            Self::ProgramSection => "program section",
            Self::MentorNote => "mentor note",
            Self::Educator => "educator",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingKey {
    EmailNotifications,
    ActivityNotifications,
    SubmissionNotifications,
    WeeklyReportNotifications,
    ClassTimeZone,
    PreferredLanguage,
    AutoGradeEnabled,
}

impl SettingKey {
    pub const ALL: [Self; 7] = [
        Self::EmailNotifications,
        Self::ActivityNotifications,
        Self::SubmissionNotifications,
        Self::WeeklyReportNotifications,
        Self::ClassTimeZone,
        Self::PreferredLanguage,
        Self::AutoGradeEnabled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailNotifications => "notify.email",
            Self::ActivityNotifications => "notify.activity",
            Self::SubmissionNotifications => "notify.submissions",
            Self::WeeklyReportNotifications => "notify.weekly_report",
            Self::ClassTimeZone => "class.time_zone",
            Self::PreferredLanguage => "ui.language",
            Self::AutoGradeEnabled => "grading.auto",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EmailNotifications => "email notifications",
            Self::ActivityNotifications => "activity notifications",
            Self::SubmissionNotifications => "submission notifications",
            Self::WeeklyReportNotifications => "weekly report",
            Self::ClassTimeZone => "class time zone",
            Self::PreferredLanguage => "language",
            Self::AutoGradeEnabled => "auto-grade",
        }
    }

    pub const fn expected_value_kind(self) -> SettingValueKind {
        match self {
            Self::ClassTimeZone | Self::PreferredLanguage => SettingValueKind::Text,
            Self::EmailNotifications
            | Self::ActivityNotifications
            | Self::SubmissionNotifications
            | Self::WeeklyReportNotifications
            | Self::AutoGradeEnabled => SettingValueKind::Bool,
        }
    }

    pub fn default_value(self) -> SettingValue {
        match self {
            Self::EmailNotifications | Self::SubmissionNotifications => SettingValue::Bool(true),
            Self::ActivityNotifications
            | Self::WeeklyReportNotifications
            | Self::AutoGradeEnabled => SettingValue::Bool(false),
            Self::ClassTimeZone => SettingValue::Text("UTC".to_owned()),
            Self::PreferredLanguage => SettingValue::Text("en".to_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValueKind {
    Bool,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

impl SettingValue {
    pub fn parse_for_key(key: SettingKey, raw: &str) -> Option<Self> {
        match key.expected_value_kind() {
            SettingValueKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => Some(Self::Bool(true)),
                "0" | "false" | "off" | "no" => Some(Self::Bool(false)),
                _ => None,
            },
            SettingValueKind::Text => Some(Self::Text(raw.to_owned())),
        }
    }

    pub fn to_storage(&self, key: SettingKey) -> Option<String> {
        match (key.expected_value_kind(), self) {
            (SettingValueKind::Bool, Self::Bool(value)) => {
                Some(if *value { "true" } else { "false" }.to_owned())
            }
            (SettingValueKind::Text, Self::Text(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Bool(true) => "on".to_owned(),
            Self::Bool(false) => "off".to_owned(),
            Self::Text(value) => value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSetting {
    pub key: SettingKey,
    pub value: SettingValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
    Course,
    Enrollment,
    Badge,
    ProgramSection,
    MentorNote,
    Educator,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub code: String,
    pub description: String,
    pub status: CourseStatus,
    pub skills: BTreeSet<String>,
    pub linked_classes: BTreeSet<String>,
    pub enrollment_count: i64,
    pub completion_rate: Option<i64>,
    pub evidence_pending: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub course_id: CourseId,
    pub student_id: StudentId,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub status: EnrollmentStatus,
    pub progress: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub enrolled_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_accessed_at: Option<OffsetDateTime>,
    pub lessons_completed: i64,
    pub lessons_total: i64,
    pub total_time_spent_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: BadgeId,
    pub badge_definition_id: BadgeDefinitionId,
    pub badge_name: String,
    pub student_id: StudentId,
    pub student_name: String,
    pub category: String,
    #[serde(with = "time::serde::rfc3339")]
    pub awarded_at: OffsetDateTime,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSection {
    pub id: ProgramSectionId,
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Metadata for the single file a mentor note may carry. The bytes stay in
/// the store until explicitly requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub checksum_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorNote {
    pub id: MentorNoteId,
    pub student_id: StudentId,
    pub student_name: String,
    pub category: MentorNoteCategory,
    pub quick_notes: Vec<String>,
    pub description: String,
    pub action_points: String,
    pub attachment: Option<Attachment>,
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A row of the school's educator roster. `full_name` is derived from the
/// first and last name when the row is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Educator {
    pub id: EducatorId,
    pub school_id: SchoolId,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub qualification: String,
    pub experience_years: Option<i64>,
    pub designation: String,
    pub department: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub joined_at: Option<OffsetDateTime>,
    pub account_status: AccountStatus,
    pub verification_status: VerificationStatus,
    pub subjects_handled: BTreeSet<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Educator {
    /// First and last name joined by one space, skipping a missing half.
    pub fn join_name(first_name: &str, last_name: &str) -> String {
        match (first_name.trim(), last_name.trim()) {
            ("", last) => last.to_owned(),
            (first, "") => first.to_owned(),
            (first, last) => format!("{first} {last}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducatorProfile {
    pub id: EducatorProfileId,
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::{
        AccountStatus, Educator, EntityKind, ProgressBucket, SettingKey, SettingValue,
        VerificationStatus,
    };

    #[test]
    fn bool_setting_parse_and_storage_round_trip() {
        let parsed = SettingValue::parse_for_key(SettingKey::EmailNotifications, "off")
            .expect("parse off bool setting");
        assert_eq!(parsed, SettingValue::Bool(false));
        assert_eq!(
            parsed.to_storage(SettingKey::EmailNotifications),
            Some("false".to_owned())
        );
    }

    #[test]
    fn text_setting_parse_and_storage_round_trip() {
        let parsed = SettingValue::parse_for_key(SettingKey::ClassTimeZone, "Asia/Kolkata")
            .expect("parse text setting");
        assert_eq!(parsed, SettingValue::Text("Asia/Kolkata".to_owned()));
        assert_eq!(
            parsed.to_storage(SettingKey::ClassTimeZone),
            Some("Asia/Kolkata".to_owned())
        );
    }

    #[test]
    fn mismatched_setting_value_type_rejected() {
        let text = SettingValue::Text("yes please".to_owned());
        assert!(text.to_storage(SettingKey::AutoGradeEnabled).is_none());
    }

    #[test]
    fn progress_buckets_follow_percentage_boundaries() {
        assert_eq!(ProgressBucket::from_progress(0), ProgressBucket::NotStarted);
        assert_eq!(ProgressBucket::from_progress(1), ProgressBucket::InProgress);
        assert_eq!(ProgressBucket::from_progress(99), ProgressBucket::InProgress);
        assert_eq!(ProgressBucket::from_progress(100), ProgressBucket::Completed);
    }

    #[test]
    fn entity_kind_parses_page_labels() {
        assert_eq!(EntityKind::parse("sections"), Some(EntityKind::ProgramSection));
        assert_eq!(EntityKind::parse("notes"), Some(EntityKind::MentorNote));
        assert_eq!(EntityKind::parse("educators"), Some(EntityKind::Educator));
        assert_eq!(EntityKind::parse("students"), None);
    }

    #[test]
    fn educator_statuses_keep_their_stored_spelling() {
        assert_eq!(AccountStatus::parse("suspended"), Some(AccountStatus::Suspended));
        assert_eq!(AccountStatus::parse("Active"), None);
        assert_eq!(VerificationStatus::parse("Verified"), Some(VerificationStatus::Verified));
        assert_eq!(VerificationStatus::parse("verified"), None);
    }

    #[test]
    fn educator_name_join_skips_missing_halves() {
        assert_eq!(Educator::join_name("Meera", "Iyer"), "Meera Iyer");
        assert_eq!(Educator::join_name(" Meera ", ""), "Meera");
        assert_eq!(Educator::join_name("", "Iyer"), "Iyer");
        assert_eq!(Educator::join_name("", ""), "");
    }
}
