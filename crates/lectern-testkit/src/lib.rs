// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use lectern_app::{
    AccountStatus, AttachmentInput, BadgeDefinitionId, BadgeFormInput, CollegeId,
    CourseFormInput, CourseId, CourseStatus, EducatorFormInput, EnrollmentFormInput,
    EnrollmentStatus, MentorNoteCategory, MentorNoteFormInput, ProfileFormInput,
    ProgramSectionFormInput, SchoolId, StudentId, VerificationStatus,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const COURSE_SUBJECTS: [&str; 14] = [
    "Algebra",
    "Biology",
    "Chemistry",
    "Drama",
    "Economics",
    "Geometry",
    "History",
    "Literature",
    "Music Theory",
    "Physics",
    "Programming",
    "Psychology",
    "Sociology",
    "Statistics",
];

const COURSE_LEVELS: [&str; 4] = ["I", "II", "Foundations", "Seminar"];

const SKILLS: [&str; 12] = [
    "critical thinking",
    "collaboration",
    "communication",
    "data analysis",
    "experimentation",
    "problem solving",
    "public speaking",
    "research",
    "writing",
    "modeling",
    "creativity",
    "ethics",
];

const CLASS_CODES: [&str; 8] = [
    "7A", "7B", "8A", "8B", "9A", "9B", "10A", "10B",
];

const FIRST_NAMES: [&str; 16] = [
    "Aarav", "Bea", "Chen", "Dara", "Elif", "Farah", "Gus", "Hana", "Ines", "Jun", "Kofi", "Lena",
    "Mateo", "Nia", "Omar", "Priya",
];
const LAST_NAMES: [&str; 12] = [
    "Adams", "Bose", "Costa", "Diallo", "Eriksen", "Fischer", "Garcia", "Haddad", "Ito",
    "Kumar", "Lopez", "Mensah",
];

const BADGES: [(&str, &str); 10] = [
    ("Perfect Attendance", "Participation"),
    ("Team Player", "Participation"),
    ("Lab Safety Star", "Science"),
    ("Curious Mind", "Science"),
    ("Bookworm", "Literacy"),
    ("Storyteller", "Literacy"),
    ("Number Ninja", "Mathematics"),
    ("Proof Builder", "Mathematics"),
    ("Helping Hand", "Leadership"),
    ("Debate Captain", "Leadership"),
];

const PROGRAMS: [(&str, &str, &str); 8] = [
    ("BSc Computer Science", "BSC-CS", "Computing"),
    ("BSc Physics", "BSC-PH", "Physical Sciences"),
    ("BSc Chemistry", "BSC-CH", "Physical Sciences"),
    ("BA English", "BA-EN", "Humanities"),
    ("BA History", "BA-HI", "Humanities"),
    ("BCom", "BCOM", "Commerce"),
    ("MSc Data Science", "MSC-DS", "Computing"),
    ("BSc Mathematics", "BSC-MA", "Mathematics"),
];

const ACADEMIC_YEARS: [&str; 3] = ["2024-25", "2025-26", "2026-27"];
const SECTIONS: [&str; 4] = ["A", "B", "C", "D"];

const FACULTY: [&str; 8] = [
    "Dr. Anita Rao",
    "Dr. Samuel Okafor",
    "Prof. Mei Lin",
    "Dr. Rafael Souza",
    "Prof. Grace Mwangi",
    "Dr. Tomas Novak",
    "Prof. Leila Karimi",
    "Dr. Owen Hughes",
];

const DESIGNATIONS: [&str; 4] = ["Teacher", "Senior Teacher", "Head of Department", "Lecturer"];
const QUALIFICATIONS: [&str; 4] = ["B.Ed", "M.Ed", "MSc", "PhD"];

const QUICK_NOTES: [&str; 8] = [
    "Great participation",
    "Needs follow-up",
    "Missed deadline",
    "Improved since last check-in",
    "Asked for extra reading",
    "Discussed career options",
    "Referred to counselling",
    "Parent meeting suggested",
];

const CITIES: [(&str, &str, &str); 6] = [
    ("Pune", "Maharashtra", "India"),
    ("Nairobi", "Nairobi", "Kenya"),
    ("Porto", "Porto", "Portugal"),
    ("Leeds", "West Yorkshire", "United Kingdom"),
    ("Austin", "Texas", "United States"),
    ("Osaka", "Osaka", "Japan"),
];

const REFERENCE_NOW: OffsetDateTime = datetime!(2026-03-02 09:00 UTC);

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Generates plausible classroom records as form inputs. The same seed and
/// anchor always produce the same sequence.
#[derive(Debug, Clone)]
pub struct ClassroomFaker {
    rng: DeterministicRng,
    now: OffsetDateTime,
}

impl ClassroomFaker {
    pub fn new(seed: u64) -> Self {
        Self::anchored(seed, REFERENCE_NOW)
    }

    /// Like [`ClassroomFaker::new`] but with generated timestamps placed
    /// relative to `now` instead of the fixed reference instant.
    pub fn anchored(seed: u64, now: OffsetDateTime) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            now,
        }
    }

    pub fn now(&self) -> OffsetDateTime {
        self.now
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// A student drawn from a fixed pool; the id is stable for a given name.
    pub fn student(&mut self) -> (StudentId, String) {
        let first = self.rng.int_n(FIRST_NAMES.len());
        let last = self.rng.int_n(LAST_NAMES.len());
        let id = (first * LAST_NAMES.len() + last + 1) as i64;
        (
            StudentId::new(id),
            format!("{} {}", FIRST_NAMES[first], LAST_NAMES[last]),
        )
    }

    pub fn course(&mut self) -> CourseFormInput {
        let subject = self.pick(&COURSE_SUBJECTS);
        let level = self.pick(&COURSE_LEVELS);
        let status = CourseStatus::ALL[self.rng.int_n(CourseStatus::ALL.len())];
        let enrollment_count = match status {
            CourseStatus::Draft | CourseStatus::Upcoming => 0,
            CourseStatus::Active | CourseStatus::Archived => self.int_range(5, 60),
        };
        let completion_rate =
            (enrollment_count > 0).then(|| self.int_range(0, 100));

        CourseFormInput {
            title: format!("{subject} {level}"),
            code: format!(
                "{}-{}",
                subject
                    .chars()
                    .filter(char::is_ascii_alphabetic)
                    .take(4)
                    .collect::<String>()
                    .to_ascii_uppercase(),
                self.int_range(100, 499)
            ),
            description: self.sentence(6, 14),
            status,
            skills: self.tag_set(&SKILLS, 3),
            linked_classes: self.tag_set(&CLASS_CODES, 2),
            enrollment_count,
            completion_rate,
            evidence_pending: self.int_range(0, 8),
        }
    }

    pub fn enrollment(&mut self, course_id: CourseId) -> EnrollmentFormInput {
        let (student_id, student_name) = self.student();
        let enrolled_at = self.datetime_between(self.now - Duration::days(42), self.now);
        let lessons_total = self.int_range(8, 24);

        let roll = self.rng.int_n(10);
        let (status, progress) = match roll {
            0 => (EnrollmentStatus::Dropped, self.int_range(0, 40)),
            1 | 2 => (EnrollmentStatus::Completed, 100),
            3 => (EnrollmentStatus::Active, 0),
            _ => (EnrollmentStatus::Active, self.int_range(1, 99)),
        };
        let lessons_completed = lessons_total * progress / 100;
        let last_accessed_at = (progress > 0)
            .then(|| self.datetime_between(enrolled_at, self.now));
        let total_time_spent_seconds =
            (progress > 0).then(|| lessons_completed * self.int_range(600, 3_600));
        let email = student_name.to_ascii_lowercase().replace(' ', ".");

        EnrollmentFormInput {
            course_id,
            student_id,
            student_name: Some(student_name),
            student_email: Some(format!("{email}@students.example.edu")),
            status,
            progress,
            enrolled_at,
            last_accessed_at,
            lessons_completed,
            lessons_total,
            total_time_spent_seconds,
        }
    }

    pub fn badge(&mut self) -> BadgeFormInput {
        let index = self.rng.int_n(BADGES.len());
        let (badge_name, category) = BADGES[index];
        let (student_id, student_name) = self.student();
        let notes = if self.rng.bool() {
            self.sentence(4, 10)
        } else {
            String::new()
        };

        BadgeFormInput {
            badge_definition_id: BadgeDefinitionId::new(index as i64 + 1),
            badge_name: badge_name.to_owned(),
            student_id,
            student_name,
            category: category.to_owned(),
            awarded_at: self.datetime_between(self.now - Duration::days(90), self.now),
            notes,
        }
    }

    pub fn program_section(&mut self) -> ProgramSectionFormInput {
        let index = self.rng.int_n(PROGRAMS.len());
        let (program_name, program_code, department_name) = PROGRAMS[index];
        let max_students = self.int_range(30, 72);
        let faculty_name = if self.rng.int_n(4) == 0 {
            None
        } else {
            Some(self.pick(&FACULTY).to_owned())
        };

        ProgramSectionFormInput {
            program_name: program_name.to_owned(),
            program_code: program_code.to_owned(),
            department_name: department_name.to_owned(),
            college_id: CollegeId::new(1 + (index as i64 % 3)),
            semester: self.int_range(1, 8).to_string(),
            section: self.pick(&SECTIONS).to_owned(),
            academic_year: self.pick(&ACADEMIC_YEARS).to_owned(),
            current_students: self.int_range(0, max_students),
            max_students,
            faculty_name,
        }
    }

    pub fn mentor_note(&mut self) -> MentorNoteFormInput {
        let (student_id, student_name) = self.student();
        let category = MentorNoteCategory::ALL[self.rng.int_n(MentorNoteCategory::ALL.len())];
        let quick_notes = self.tag_set(&QUICK_NOTES, 2).into_iter().collect();
        let attachment = (self.rng.int_n(4) == 0).then(|| AttachmentInput {
            file_name: "progress-report.txt".to_owned(),
            mime_type: "text/plain".to_owned(),
            data: format!("Progress report for {student_name}").into_bytes(),
        });

        MentorNoteFormInput {
            student_id,
            student_name,
            category,
            quick_notes,
            description: self.sentence(8, 18),
            action_points: self.sentence(4, 8),
            attachment,
            author: self.pick(&FACULTY).to_owned(),
        }
    }

    /// A roster educator. Roughly one in five has no recorded experience and
    /// one in eight is inactive.
    pub fn educator(&mut self) -> EducatorFormInput {
        let first = self.pick(&FIRST_NAMES).to_owned();
        let last = self.pick(&LAST_NAMES).to_owned();
        let (city, state, country) = CITIES[self.rng.int_n(CITIES.len())];
        let department = PROGRAMS[self.rng.int_n(PROGRAMS.len())].2;
        let experience_years = (self.rng.int_n(5) != 0).then(|| self.int_range(0, 30));
        let account_status = if self.rng.int_n(8) == 0 {
            AccountStatus::Inactive
        } else {
            AccountStatus::Active
        };
        let verification_status =
            VerificationStatus::ALL[self.rng.int_n(VerificationStatus::ALL.len())];
        let joined_at = self.datetime_between(self.now - Duration::days(3 * 365), self.now);

        EducatorFormInput {
            school_id: SchoolId::new(1 + self.rng.int_n(3) as i64),
            employee_id: format!("EMP-{:04}", self.int_range(1, 9_999)),
            email: format!(
                "{}.{}@school.example.edu",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase()
            ),
            first_name: first,
            last_name: last,
            phone: format!(
                "+1 {:03} {:03} {:04}",
                self.int_range(200, 999),
                self.int_range(200, 999),
                self.int_range(0, 9_999)
            ),
            specialization: self.pick(&SKILLS).to_owned(),
            qualification: self.pick(&QUALIFICATIONS).to_owned(),
            experience_years,
            designation: self.pick(&DESIGNATIONS).to_owned(),
            department: department.to_owned(),
            joined_at: Some(joined_at),
            account_status,
            verification_status,
            subjects_handled: self.tag_set(&COURSE_SUBJECTS, 3),
            city: city.to_owned(),
            state: state.to_owned(),
            country: country.to_owned(),
        }
    }

    pub fn profile(&mut self) -> ProfileFormInput {
        let full_name = self.pick(&FACULTY).to_owned();
        let (city, state, country) = CITIES[self.rng.int_n(CITIES.len())];
        let handle = full_name
            .rsplit(' ')
            .next()
            .unwrap_or("educator")
            .to_ascii_lowercase();
        let department = PROGRAMS[self.rng.int_n(PROGRAMS.len())].2;

        ProfileFormInput {
            full_name,
            email: format!("{handle}@faculty.example.edu"),
            phone: format!(
                "+1 {:03} {:03} {:04}",
                self.int_range(200, 999),
                self.int_range(200, 999),
                self.int_range(0, 9_999)
            ),
            department: department.to_owned(),
            title: self
                .pick(&["Lecturer", "Assistant Professor", "Associate Professor"])
                .to_owned(),
            office_location: format!("Block {}, Room {}", self.pick(&SECTIONS), self.int_range(100, 420)),
            office_hours: "Tue/Thu 14:00-16:00".to_owned(),
            specialization: self.pick(&SKILLS).to_owned(),
            bio: self.sentence(10, 20),
            city: city.to_owned(),
            state: state.to_owned(),
            country: country.to_owned(),
            years_of_experience: Some(self.int_range(1, 30)),
        }
    }

    pub fn datetime_between(
        &mut self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> OffsetDateTime {
        let start_ts = start.unix_timestamp();
        let end_ts = end.unix_timestamp();
        if end_ts <= start_ts {
            return start;
        }
        let span = (end_ts - start_ts) as u64;
        let offset = self.rng.next_u64() % (span + 1);
        start + Duration::seconds(offset as i64)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn tag_set(&mut self, pool: &[&str], max: usize) -> BTreeSet<String> {
        let count = 1 + self.rng.int_n(max);
        (0..count).map(|_| self.pick(pool).to_owned()).collect()
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        const WORDS: [&str; 24] = [
            "review",
            "practice",
            "lesson",
            "quiz",
            "project",
            "lab",
            "essay",
            "reading",
            "feedback",
            "draft",
            "presentation",
            "group",
            "homework",
            "concept",
            "revision",
            "question",
            "progress",
            "notes",
            "peer",
            "exercise",
            "chapter",
            "outline",
            "portfolio",
            "goal",
        ];

        let count = self.int_range(min_words as i64, max_words as i64) as usize;
        let mut parts = Vec::with_capacity(count);
        for _ in 0..count {
            parts.push(self.pick(&WORDS).to_owned());
        }
        let mut sentence = parts.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("lectern.db");
    Ok((dir, db_path))
}

/// The instant [`ClassroomFaker::new`] anchors its timestamps to.
pub fn reference_now() -> OffsetDateTime {
    REFERENCE_NOW
}

pub fn course_subjects() -> &'static [&'static str] {
    &COURSE_SUBJECTS
}

#[cfg(test)]
mod tests {
    use super::{ClassroomFaker, course_subjects, reference_now};
    use lectern_app::{CourseId, CourseStatus, EnrollmentStatus, Validate};
    use time::Duration;

    #[test]
    fn same_seed_same_sequence() {
        let mut left = ClassroomFaker::new(42);
        let mut right = ClassroomFaker::new(42);
        assert_eq!(left.course(), right.course());
        assert_eq!(left.badge(), right.badge());
    }

    #[test]
    fn zero_seed_is_normalized() {
        let mut zero = ClassroomFaker::new(0);
        let mut one = ClassroomFaker::new(1);
        assert_eq!(zero.mentor_note(), one.mentor_note());
    }

    #[test]
    fn generated_forms_pass_validation() {
        let mut faker = ClassroomFaker::new(7);
        for _ in 0..50 {
            faker.course().validate().expect("course form");
            faker.enrollment(CourseId::new(1)).validate().expect("enrollment form");
            faker.badge().validate().expect("badge form");
            faker.program_section().validate().expect("section form");
            faker.mentor_note().validate().expect("note form");
            faker.educator().validate().expect("educator form");
        }
        faker.profile().validate().expect("profile form");
    }

    #[test]
    fn course_titles_use_known_subjects() {
        let mut faker = ClassroomFaker::new(3);
        for _ in 0..20 {
            let course = faker.course();
            assert!(
                course_subjects()
                    .iter()
                    .any(|subject| course.title.starts_with(subject)),
                "title {}",
                course.title
            );
            if matches!(course.status, CourseStatus::Draft | CourseStatus::Upcoming) {
                assert_eq!(course.enrollment_count, 0);
                assert_eq!(course.completion_rate, None);
            }
        }
    }

    #[test]
    fn completed_enrollments_are_fully_progressed() {
        let mut faker = ClassroomFaker::new(11);
        let mut found_completed = false;
        for _ in 0..100 {
            let enrollment = faker.enrollment(CourseId::new(2));
            assert!(enrollment.enrolled_at <= reference_now());
            assert!(enrollment.enrolled_at >= reference_now() - Duration::days(42));
            if enrollment.status == EnrollmentStatus::Completed {
                assert_eq!(enrollment.progress, 100);
                assert_eq!(enrollment.lessons_completed, enrollment.lessons_total);
                found_completed = true;
            }
        }
        assert!(found_completed);
    }

    #[test]
    fn educators_join_before_anchor_and_teach_known_subjects() {
        let mut faker = ClassroomFaker::new(13);
        for _ in 0..30 {
            let educator = faker.educator();
            let joined = educator.joined_at.expect("joined date");
            assert!(joined <= reference_now());
            assert!(!educator.subjects_handled.is_empty());
            for subject in &educator.subjects_handled {
                assert!(course_subjects().contains(&subject.as_str()), "subject {subject}");
            }
            assert!(educator.email.ends_with("@school.example.edu"));
        }
    }

    #[test]
    fn student_ids_are_stable_per_name() {
        let mut faker = ClassroomFaker::new(5);
        let mut seen = std::collections::BTreeMap::new();
        for _ in 0..200 {
            let (id, name) = faker.student();
            let previous = seen.insert(name.clone(), id);
            if let Some(previous) = previous {
                assert_eq!(previous, id, "student {name}");
            }
        }
    }

    #[test]
    fn anchored_faker_places_badges_before_anchor() {
        let anchor = reference_now() + Duration::days(365);
        let mut faker = ClassroomFaker::anchored(9, anchor);
        for _ in 0..20 {
            let badge = faker.badge();
            assert!(badge.awarded_at <= anchor);
            assert!(badge.awarded_at >= anchor - Duration::days(90));
        }
    }
}
