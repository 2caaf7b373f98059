// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Per-entity list configuration: which fields the search box reads, which
//! fields the filter dropdowns compare, and what each sort key orders by.

use crate::listing::{ListKey, Listable, SortValue};
use crate::{Badge, Course, Educator, Enrollment, MentorNote, ProgramSection, ProgressBucket};

macro_rules! list_key {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl ListKey for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }
    };
}

list_key!(CourseFilter {
    Status => "status",
    Skill => "skill",
    Class => "class",
});

list_key!(CourseSort {
    Name => "name",
    Created => "created",
    Updated => "updated",
    Enrollment => "enrollment",
});

list_key!(EnrollmentFilter {
    Status => "status",
    Progress => "progress",
});

list_key!(EnrollmentSort {
    Progress => "progress",
    Name => "name",
    Recent => "recent",
    Time => "time",
    Enrolled => "enrolled",
});

list_key!(BadgeFilter {
    Category => "category",
});

list_key!(BadgeSort {
    Awarded => "awarded",
    Badge => "badge",
    Student => "student",
});

list_key!(SectionFilter {
    Semester => "semester",
    Year => "year",
    Department => "department",
});

list_key!(SectionSort {
    Program => "program",
    Students => "students",
    Updated => "updated",
});

list_key!(NoteFilter {
    Category => "category",
    Student => "student",
});

list_key!(NoteSort {
    Newest => "newest",
    Student => "student",
});

list_key!(EducatorFilter {
    Department => "department",
    Status => "status",
    Verification => "verification",
    Subject => "subject",
});

list_key!(EducatorSort {
    Name => "name",
    Newest => "newest",
    Experience => "experience",
});

impl Listable for Course {
    type Filter = CourseFilter;
    type Sort = CourseSort;

    const DEFAULT_SORT: CourseSort = CourseSort::Name;

    fn searchable_fields(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(2 + self.skills.len());
        fields.push(self.title.as_str());
        fields.push(self.code.as_str());
        fields.extend(self.skills.iter().map(String::as_str));
        fields
    }

    fn filter_values(&self, filter: CourseFilter) -> Vec<&str> {
        match filter {
            CourseFilter::Status => vec![self.status.as_str()],
            CourseFilter::Skill => self.skills.iter().map(String::as_str).collect(),
            CourseFilter::Class => self.linked_classes.iter().map(String::as_str).collect(),
        }
    }

    fn sort_value(&self, sort: CourseSort) -> SortValue<'_> {
        match sort {
            CourseSort::Name => SortValue::Text(&self.title),
            CourseSort::Created => SortValue::Timestamp(Some(self.created_at)),
            CourseSort::Updated => SortValue::Timestamp(Some(self.updated_at)),
            CourseSort::Enrollment => SortValue::Number(self.enrollment_count),
        }
    }
}

impl Listable for Enrollment {
    type Filter = EnrollmentFilter;
    type Sort = EnrollmentSort;

    const DEFAULT_SORT: EnrollmentSort = EnrollmentSort::Progress;

    fn searchable_fields(&self) -> Vec<&str> {
        vec![
            self.student_name.as_deref().unwrap_or(""),
            self.student_email.as_deref().unwrap_or(""),
        ]
    }

    fn filter_values(&self, filter: EnrollmentFilter) -> Vec<&str> {
        match filter {
            EnrollmentFilter::Status => vec![self.status.as_str()],
            EnrollmentFilter::Progress => {
                vec![ProgressBucket::from_progress(self.progress).as_str()]
            }
        }
    }

    fn sort_value(&self, sort: EnrollmentSort) -> SortValue<'_> {
        match sort {
            EnrollmentSort::Progress => SortValue::Number(self.progress),
            EnrollmentSort::Name => SortValue::Text(self.student_name.as_deref().unwrap_or("")),
            EnrollmentSort::Recent => SortValue::Timestamp(self.last_accessed_at),
            EnrollmentSort::Time => {
                SortValue::Number(self.total_time_spent_seconds.unwrap_or(0))
            }
            EnrollmentSort::Enrolled => SortValue::Timestamp(Some(self.enrolled_at)),
        }
    }
}

impl Listable for Badge {
    type Filter = BadgeFilter;
    type Sort = BadgeSort;

    const DEFAULT_SORT: BadgeSort = BadgeSort::Awarded;

    fn searchable_fields(&self) -> Vec<&str> {
        vec![
            self.badge_name.as_str(),
            self.student_name.as_str(),
            self.category.as_str(),
        ]
    }

    fn filter_values(&self, filter: BadgeFilter) -> Vec<&str> {
        match filter {
            BadgeFilter::Category => vec![self.category.as_str()],
        }
    }

    fn sort_value(&self, sort: BadgeSort) -> SortValue<'_> {
        match sort {
            BadgeSort::Awarded => SortValue::Timestamp(Some(self.awarded_at)),
            BadgeSort::Badge => SortValue::Text(&self.badge_name),
            BadgeSort::Student => SortValue::Text(&self.student_name),
        }
    }
}

impl Listable for ProgramSection {
    type Filter = SectionFilter;
    type Sort = SectionSort;

    const DEFAULT_SORT: SectionSort = SectionSort::Program;

    fn searchable_fields(&self) -> Vec<&str> {
        vec![
            self.program_name.as_str(),
            self.program_code.as_str(),
            self.section.as_str(),
            self.academic_year.as_str(),
            self.department_name.as_str(),
        ]
    }

    fn filter_values(&self, filter: SectionFilter) -> Vec<&str> {
        match filter {
            SectionFilter::Semester => vec![self.semester.as_str()],
            SectionFilter::Year => vec![self.academic_year.as_str()],
            SectionFilter::Department => vec![self.department_name.as_str()],
        }
    }

    fn sort_value(&self, sort: SectionSort) -> SortValue<'_> {
        match sort {
            SectionSort::Program => SortValue::Text(&self.program_name),
            SectionSort::Students => SortValue::Number(self.current_students),
            SectionSort::Updated => SortValue::Timestamp(Some(self.updated_at)),
        }
    }
}

impl Listable for MentorNote {
    type Filter = NoteFilter;
    type Sort = NoteSort;

    const DEFAULT_SORT: NoteSort = NoteSort::Newest;

    fn searchable_fields(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(2 + self.quick_notes.len());
        fields.push(self.student_name.as_str());
        fields.push(self.description.as_str());
        fields.extend(self.quick_notes.iter().map(String::as_str));
        fields
    }

    fn filter_values(&self, filter: NoteFilter) -> Vec<&str> {
        match filter {
            NoteFilter::Category => vec![self.category.as_str()],
            NoteFilter::Student => vec![self.student_name.as_str()],
        }
    }

    fn sort_value(&self, sort: NoteSort) -> SortValue<'_> {
        match sort {
            NoteSort::Newest => SortValue::Timestamp(Some(self.created_at)),
            NoteSort::Student => SortValue::Text(&self.student_name),
        }
    }
}

impl Listable for Educator {
    type Filter = EducatorFilter;
    type Sort = EducatorSort;

    const DEFAULT_SORT: EducatorSort = EducatorSort::Newest;

    fn searchable_fields(&self) -> Vec<&str> {
        vec![
            self.full_name.as_str(),
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_str(),
            self.specialization.as_str(),
        ]
    }

    fn filter_values(&self, filter: EducatorFilter) -> Vec<&str> {
        match filter {
            EducatorFilter::Department => vec![self.department.as_str()],
            EducatorFilter::Status => vec![self.account_status.as_str()],
            EducatorFilter::Verification => vec![self.verification_status.as_str()],
            EducatorFilter::Subject => self.subjects_handled.iter().map(String::as_str).collect(),
        }
    }

    fn sort_value(&self, sort: EducatorSort) -> SortValue<'_> {
        match sort {
            EducatorSort::Name => SortValue::Text(&self.full_name),
            EducatorSort::Newest => SortValue::Timestamp(Some(self.created_at)),
            EducatorSort::Experience => SortValue::Number(self.experience_years.unwrap_or(0)),
        }
    }
}
