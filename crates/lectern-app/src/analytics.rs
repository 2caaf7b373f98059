// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Summary figures shown beside each list. They are always computed over the
//! full list a page loaded; search, filters and paging never affect them.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use time::{Duration, OffsetDateTime};

use crate::{
    AccountStatus, Badge, Course, CourseStatus, Educator, Enrollment, EnrollmentStatus,
    MentorNote, MentorNoteCategory, ProgramSection, VerificationStatus,
};

pub const RECENT_BADGE_WINDOW_DAYS: i64 = 30;
pub const TREND_WEEKS: i64 = 4;

/// Entities with a fixed-shape summary.
pub trait Summarize: Sized {
    type Summary: Serialize;

    /// `now` anchors the time-window figures; summaries without one ignore it.
    fn summarize(items: &[Self], now: OffsetDateTime) -> Self::Summary;
}

/// Mean rounded to the nearest integer with halves rounding up, or zero for
/// an empty list.
pub fn rounded_average(sum: i64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    ((sum as f64) / (count as f64) + 0.5).floor() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct CourseAnalytics {
    pub total: usize,
    pub active: usize,
    pub total_enrolled: i64,
    pub average_completion: i64,
    pub pending_evidence: i64,
}

pub fn course_analytics(courses: &[Course]) -> CourseAnalytics {
    let completion_sum = courses
        .iter()
        .map(|course| course.completion_rate.unwrap_or(0))
        .sum();
    CourseAnalytics {
        total: courses.len(),
        active: courses
            .iter()
            .filter(|course| course.status == CourseStatus::Active)
            .count(),
        total_enrolled: courses.iter().map(|course| course.enrollment_count).sum(),
        average_completion: rounded_average(completion_sum, courses.len()),
        pending_evidence: courses.iter().map(|course| course.evidence_pending).sum(),
    }
}

impl Summarize for Course {
    type Summary = CourseAnalytics;

    fn summarize(items: &[Self], _now: OffsetDateTime) -> CourseAnalytics {
        course_analytics(items)
    }
}

/// Enrollment counts per progress band. The bands do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct ProgressDistribution {
    pub not_started: usize,
    pub up_to_25: usize,
    pub up_to_50: usize,
    pub up_to_75: usize,
    pub nearly_done: usize,
    pub completed: usize,
}

impl ProgressDistribution {
    fn record(&mut self, progress: i64) {
        match progress {
            i64::MIN..=0 => self.not_started += 1,
            1..=25 => self.up_to_25 += 1,
            26..=50 => self.up_to_50 += 1,
            51..=75 => self.up_to_75 += 1,
            76..=99 => self.nearly_done += 1,
            _ => self.completed += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyTrend {
    pub label: String,
    pub enrollments: usize,
    pub completions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct EnrollmentAnalytics {
    pub total_enrollments: usize,
    pub active_students: usize,
    pub completed_students: usize,
    pub average_progress: i64,
    pub total_time_spent_seconds: i64,
    pub average_time_per_student_seconds: i64,
    pub distribution: ProgressDistribution,
    pub weekly_trend: Vec<WeeklyTrend>,
}

pub fn enrollment_analytics(enrollments: &[Enrollment], now: OffsetDateTime) -> EnrollmentAnalytics {
    let count = enrollments.len();
    let progress_sum = enrollments.iter().map(|enrollment| enrollment.progress).sum();
    let time_sum = enrollments
        .iter()
        .map(|enrollment| enrollment.total_time_spent_seconds.unwrap_or(0))
        .sum();

    let mut distribution = ProgressDistribution::default();
    for enrollment in enrollments {
        distribution.record(enrollment.progress);
    }

    EnrollmentAnalytics {
        total_enrollments: count,
        active_students: enrollments
            .iter()
            .filter(|enrollment| enrollment.status == EnrollmentStatus::Active)
            .count(),
        completed_students: enrollments
            .iter()
            .filter(|enrollment| {
                enrollment.status == EnrollmentStatus::Completed || enrollment.progress == 100
            })
            .count(),
        average_progress: rounded_average(progress_sum, count),
        total_time_spent_seconds: time_sum,
        average_time_per_student_seconds: rounded_average(time_sum, count),
        distribution,
        weekly_trend: weekly_trend(enrollments, now),
    }
}

/// Enrollments and completions for the last four Sunday-to-Saturday weeks,
/// oldest first. The final week is the one containing `now`.
pub fn weekly_trend(enrollments: &[Enrollment], now: OffsetDateTime) -> Vec<WeeklyTrend> {
    let today = now.date();
    let current_week_start =
        today - Duration::days(i64::from(today.weekday().number_days_from_sunday()));

    (0..TREND_WEEKS)
        .rev()
        .map(|weeks_back| {
            let start = current_week_start - Duration::weeks(weeks_back);
            let end = start + Duration::days(6);
            let in_week: Vec<&Enrollment> = enrollments
                .iter()
                .filter(|enrollment| {
                    let day = enrollment.enrolled_at.date();
                    day >= start && day <= end
                })
                .collect();
            WeeklyTrend {
                label: format!("Week {}", TREND_WEEKS - weeks_back),
                enrollments: in_week.len(),
                completions: in_week
                    .iter()
                    .filter(|enrollment| enrollment.progress == 100)
                    .count(),
            }
        })
        .collect()
}

impl Summarize for Enrollment {
    type Summary = EnrollmentAnalytics;

    fn summarize(items: &[Self], now: OffsetDateTime) -> EnrollmentAnalytics {
        enrollment_analytics(items, now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct BadgeAnalytics {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    pub awarded_recently: usize,
    pub distinct_students: usize,
}

pub fn badge_analytics(badges: &[Badge], now: OffsetDateTime) -> BadgeAnalytics {
    let window_start = now - Duration::days(RECENT_BADGE_WINDOW_DAYS);
    let mut by_category = BTreeMap::new();
    for badge in badges {
        *by_category.entry(badge.category.clone()).or_insert(0) += 1;
    }
    let mut students: Vec<i64> = badges.iter().map(|badge| badge.student_id.get()).collect();
    students.sort_unstable();
    students.dedup();

    BadgeAnalytics {
        total: badges.len(),
        by_category,
        awarded_recently: badges
            .iter()
            .filter(|badge| badge.awarded_at >= window_start && badge.awarded_at <= now)
            .count(),
        distinct_students: students.len(),
    }
}

impl Summarize for Badge {
    type Summary = BadgeAnalytics;

    fn summarize(items: &[Self], now: OffsetDateTime) -> BadgeAnalytics {
        badge_analytics(items, now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct SectionAnalytics {
    pub total_sections: usize,
    pub total_students: i64,
    pub total_capacity: i64,
    pub without_faculty: usize,
    pub average_fill_percent: i64,
}

pub fn section_analytics(sections: &[ProgramSection]) -> SectionAnalytics {
    let fill_sum = sections
        .iter()
        .map(|section| {
            if section.max_students > 0 {
                rounded_average(section.current_students * 100, section.max_students as usize)
            } else {
                0
            }
        })
        .sum();
    SectionAnalytics {
        total_sections: sections.len(),
        total_students: sections.iter().map(|section| section.current_students).sum(),
        total_capacity: sections.iter().map(|section| section.max_students).sum(),
        without_faculty: sections
            .iter()
            .filter(|section| {
                section
                    .faculty_name
                    .as_deref()
                    .is_none_or(|name| name.trim().is_empty())
            })
            .count(),
        average_fill_percent: rounded_average(fill_sum, sections.len()),
    }
}

impl Summarize for ProgramSection {
    type Summary = SectionAnalytics;

    fn summarize(items: &[Self], _now: OffsetDateTime) -> SectionAnalytics {
        section_analytics(items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct NoteAnalytics {
    pub total: usize,
    pub by_category: BTreeMap<MentorNoteCategory, usize>,
    pub with_attachment: usize,
}

pub fn note_analytics(notes: &[MentorNote]) -> NoteAnalytics {
    let mut by_category: BTreeMap<MentorNoteCategory, usize> = MentorNoteCategory::ALL
        .into_iter()
        .map(|category| (category, 0))
        .collect();
    for note in notes {
        *by_category.entry(note.category).or_insert(0) += 1;
    }
    NoteAnalytics {
        total: notes.len(),
        by_category,
        with_attachment: notes.iter().filter(|note| note.attachment.is_some()).count(),
    }
}

impl Summarize for MentorNote {
    type Summary = NoteAnalytics;

    fn summarize(items: &[Self], _now: OffsetDateTime) -> NoteAnalytics {
        note_analytics(items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct EducatorAnalytics {
    pub total: usize,
    pub by_account_status: BTreeMap<AccountStatus, usize>,
    pub by_verification: BTreeMap<VerificationStatus, usize>,
    /// Averaged over educators that report their experience.
    pub average_experience_years: i64,
    pub departments: usize,
}

pub fn educator_analytics(educators: &[Educator]) -> EducatorAnalytics {
    let mut by_account_status: BTreeMap<AccountStatus, usize> =
        AccountStatus::ALL.into_iter().map(|status| (status, 0)).collect();
    let mut by_verification: BTreeMap<VerificationStatus, usize> =
        VerificationStatus::ALL.into_iter().map(|status| (status, 0)).collect();
    let mut departments = BTreeSet::new();
    let mut experience_sum = 0;
    let mut reporting = 0;
    for educator in educators {
        *by_account_status.entry(educator.account_status).or_insert(0) += 1;
        *by_verification.entry(educator.verification_status).or_insert(0) += 1;
        let department = educator.department.trim();
        if !department.is_empty() {
            departments.insert(department);
        }
        if let Some(years) = educator.experience_years {
            experience_sum += years;
            reporting += 1;
        }
    }
    EducatorAnalytics {
        total: educators.len(),
        by_account_status,
        by_verification,
        average_experience_years: rounded_average(experience_sum, reporting),
        departments: departments.len(),
    }
}

impl Summarize for Educator {
    type Summary = EducatorAnalytics;

    fn summarize(items: &[Self], _now: OffsetDateTime) -> EducatorAnalytics {
        educator_analytics(items)
    }
}
