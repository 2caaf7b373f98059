// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use lectern_app::validation::{
    format_day, format_optional_duration, format_percent, format_tags, format_timestamp,
};
use lectern_app::{
    AppSetting, Badge, Course, Educator, EducatorProfile, Enrollment, MentorNote, PageSlice,
    ProgramSection, ProgressBucket,
};
use serde::Serialize;
use serde_json::Value;

/// Column layout for one entity in the text table.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl TableRow for Course {
    const HEADERS: &'static [&'static str] = &[
        "ID", "Code", "Title", "Status", "Enrolled", "Completion", "Pending", "Skills", "Updated",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.get().to_string(),
            self.code.clone(),
            self.title.clone(),
            self.status.as_str().to_owned(),
            self.enrollment_count.to_string(),
            format_percent(self.completion_rate),
            self.evidence_pending.to_string(),
            format_tags(&self.skills),
            format_day(self.updated_at),
        ]
    }
}

impl TableRow for Enrollment {
    const HEADERS: &'static [&'static str] = &[
        "ID", "Course", "Student", "Email", "Status", "Progress", "Lessons", "Time", "Enrolled",
        "Last Access",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.get().to_string(),
            self.course_id.get().to_string(),
            self.student_name.clone().unwrap_or_default(),
            self.student_email.clone().unwrap_or_default(),
            format!(
                "{} ({})",
                self.status.as_str(),
                ProgressBucket::from_progress(self.progress).as_str()
            ),
            format_percent(Some(self.progress)),
            format!("{}/{}", self.lessons_completed, self.lessons_total),
            format_optional_duration(self.total_time_spent_seconds),
            format_day(self.enrolled_at),
            self.last_accessed_at.map(format_day).unwrap_or_default(),
        ]
    }
}

impl TableRow for Badge {
    const HEADERS: &'static [&'static str] =
        &["ID", "Badge", "Category", "Student", "Awarded", "Notes"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.get().to_string(),
            self.badge_name.clone(),
            self.category.clone(),
            self.student_name.clone(),
            format_day(self.awarded_at),
            self.notes.clone(),
        ]
    }
}

impl TableRow for ProgramSection {
    const HEADERS: &'static [&'static str] = &[
        "ID", "Program", "Code", "Department", "Sem", "Sec", "Year", "Students", "Faculty",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.get().to_string(),
            self.program_name.clone(),
            self.program_code.clone(),
            self.department_name.clone(),
            self.semester.clone(),
            self.section.clone(),
            self.academic_year.clone(),
            format!("{}/{}", self.current_students, self.max_students),
            self.faculty_name
                .clone()
                .unwrap_or_else(|| "unassigned".to_owned()),
        ]
    }
}

impl TableRow for MentorNote {
    const HEADERS: &'static [&'static str] = &[
        "ID", "Student", "Category", "Quick Notes", "Feedback", "File", "Author", "Created",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.get().to_string(),
            self.student_name.clone(),
            self.category.as_str().to_owned(),
            format_tags(&self.quick_notes),
            self.description.clone(),
            self.attachment
                .as_ref()
                .map(|attachment| attachment.file_name.clone())
                .unwrap_or_default(),
            self.author.clone(),
            format_day(self.created_at),
        ]
    }
}

impl TableRow for Educator {
    const HEADERS: &'static [&'static str] = &[
        "ID", "Name", "Email", "Department", "Specialization", "Experience", "Status", "Verified",
        "Subjects",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.get().to_string(),
            self.full_name.clone(),
            self.email.clone(),
            self.department.clone(),
            self.specialization.clone(),
            self.experience_years
                .map(|years| format!("{years}y"))
                .unwrap_or_default(),
            self.account_status.as_str().to_owned(),
            self.verification_status.as_str().to_owned(),
            format_tags(&self.subjects_handled),
        ]
    }
}

/// Lays out `rows` under `headers` with columns padded to the widest cell.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut output = String::new();
    push_line(&mut output, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_line(&mut output, rule.iter().map(String::as_str), &widths);
    for row in rows {
        push_line(&mut output, row.iter().map(String::as_str), &widths);
    }
    output
}

fn push_line<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    output.push_str(line.trim_end());
    output.push('\n');
}

pub fn page_text<T: TableRow>(slice: &PageSlice<'_, T>, label: &str) -> String {
    if slice.total_matches == 0 {
        return format!("no {label} match the current query and filters\n");
    }

    let rows: Vec<Vec<String>> = slice.rows.iter().map(|row| row.cells()).collect();
    let mut output = table(T::HEADERS, &rows);
    output.push_str(&page_footer(slice, label));
    output
}

pub fn page_footer<T>(slice: &PageSlice<'_, T>, label: &str) -> String {
    if slice.is_empty() {
        return format!(
            "page {} is past the end ({} pages, {} {label})\n",
            slice.page, slice.total_pages, slice.total_matches
        );
    }
    format!(
        "rows {}-{} of {} {label}, page {} of {}\n",
        slice.offset() + 1,
        slice.offset() + slice.rows.len(),
        slice.total_matches,
        slice.page,
        slice.total_pages
    )
}

#[derive(Debug, Serialize)]
struct PageJson<'a, T> {
    page: usize,
    page_size: usize,
    total_pages: usize,
    total_matches: usize,
    rows: &'a [&'a T],
}

pub fn page_json<T: Serialize>(slice: &PageSlice<'_, T>) -> Result<String> {
    serde_json::to_string_pretty(&PageJson {
        page: slice.page,
        page_size: slice.page_size,
        total_pages: slice.total_pages,
        total_matches: slice.total_matches,
        rows: &slice.rows,
    })
    .context("encode page as JSON")
}

/// Flattens an analytics summary into `key: value` lines. Nested objects are
/// joined with dots and arrays are indexed.
pub fn summary_text<S: Serialize>(summary: &S) -> Result<String> {
    let value = serde_json::to_value(summary).context("encode analytics summary")?;
    let mut lines = Vec::new();
    flatten(&value, String::new(), &mut lines);
    let width = lines.iter().map(|(key, _)| key.chars().count()).max().unwrap_or(0);

    let mut output = String::new();
    for (key, value) in lines {
        let pad = width - key.chars().count();
        output.push_str(&format!("{key}{}  {value}\n", " ".repeat(pad)));
    }
    Ok(output)
}

fn flatten(value: &Value, prefix: String, lines: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten(nested, child_key(&prefix, key), lines);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten(nested, child_key(&prefix, &index.to_string()), lines);
            }
        }
        Value::String(text) => lines.push((prefix, text.clone())),
        Value::Null => lines.push((prefix, String::new())),
        other => lines.push((prefix, other.to_string())),
    }
}

fn child_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

pub fn settings_text(settings: &[AppSetting]) -> String {
    let rows: Vec<Vec<String>> = settings
        .iter()
        .map(|setting| {
            vec![
                setting.key.as_str().to_owned(),
                setting.key.label().to_owned(),
                setting.value.display(),
            ]
        })
        .collect();
    table(&["Key", "Setting", "Value"], &rows)
}

pub fn profile_text(profile: Option<&EducatorProfile>) -> String {
    let Some(profile) = profile else {
        return "no profile saved; set one with `lectern profile --set full_name=... --set email=...`\n"
            .to_owned();
    };
    let rows = vec![
        vec!["full_name".to_owned(), profile.full_name.clone()],
        vec!["email".to_owned(), profile.email.clone()],
        vec!["phone".to_owned(), profile.phone.clone()],
        vec!["department".to_owned(), profile.department.clone()],
        vec!["title".to_owned(), profile.title.clone()],
        vec!["office_location".to_owned(), profile.office_location.clone()],
        vec!["office_hours".to_owned(), profile.office_hours.clone()],
        vec!["specialization".to_owned(), profile.specialization.clone()],
        vec!["bio".to_owned(), profile.bio.clone()],
        vec!["city".to_owned(), profile.city.clone()],
        vec!["state".to_owned(), profile.state.clone()],
        vec!["country".to_owned(), profile.country.clone()],
        vec![
            "years_of_experience".to_owned(),
            profile
                .years_of_experience
                .map(|years| years.to_string())
                .unwrap_or_default(),
        ],
        vec!["updated_at".to_owned(), format_timestamp(Some(profile.updated_at))],
    ];
    table(&["Field", "Value"], &rows)
}

#[cfg(test)]
mod tests {
    use super::{TableRow, page_footer, page_json, page_text, summary_text, table};
    use lectern_app::{
        AccountStatus, Course, CourseId, CourseStatus, DEFAULT_PAGE_SIZE, Educator, EducatorId,
        ListView, ListCommand, SchoolId, VerificationStatus, course_analytics, project,
    };
    use std::collections::BTreeSet;
    use time::OffsetDateTime;

    fn course(id: i64, title: &str) -> Course {
        Course {
            id: CourseId::new(id),
            title: title.to_owned(),
            code: format!("C-{id}"),
            description: String::new(),
            status: CourseStatus::Active,
            skills: BTreeSet::from(["writing".to_owned()]),
            linked_classes: BTreeSet::new(),
            enrollment_count: id * 3,
            completion_rate: Some(50),
            evidence_pending: 0,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn table_pads_columns_to_widest_cell() {
        let output = table(
            &["A", "Name"],
            &[
                vec!["1".to_owned(), "Algebra".to_owned()],
                vec!["10".to_owned(), "Art".to_owned()],
            ],
        );
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "A   Name");
        assert_eq!(lines[1], "--  -------");
        assert_eq!(lines[2], "1   Algebra");
        assert_eq!(lines[3], "10  Art");
    }

    #[test]
    fn course_cells_line_up_with_headers() {
        let row = course(1, "Algebra I");
        assert_eq!(row.cells().len(), Course::HEADERS.len());
        assert_eq!(row.cells()[5], "50%");
        assert_eq!(row.cells()[8], "1970-01-01");
    }

    #[test]
    fn educator_cells_leave_unknown_experience_blank() {
        let mut educator = Educator {
            id: EducatorId::new(4),
            school_id: SchoolId::new(1),
            employee_id: "EMP-0004".to_owned(),
            first_name: "Meera".to_owned(),
            last_name: "Iyer".to_owned(),
            full_name: "Meera Iyer".to_owned(),
            email: "meera@school.example.edu".to_owned(),
            phone: String::new(),
            specialization: "research".to_owned(),
            qualification: "PhD".to_owned(),
            experience_years: None,
            designation: "Lecturer".to_owned(),
            department: "Computing".to_owned(),
            joined_at: None,
            account_status: AccountStatus::Active,
            verification_status: VerificationStatus::Verified,
            subjects_handled: BTreeSet::from(["Physics".to_owned()]),
            city: String::new(),
            state: String::new(),
            country: String::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(educator.cells().len(), Educator::HEADERS.len());
        assert_eq!(educator.cells()[5], "");
        assert_eq!(educator.cells()[7], "Verified");

        educator.experience_years = Some(9);
        assert_eq!(educator.cells()[5], "9y");
    }

    #[test]
    fn page_text_reports_position() {
        let courses: Vec<Course> = (1..=5).map(|id| course(id, &format!("Course {id}"))).collect();
        let (view, _) = ListView::new(lectern_app::CourseSort::Name, 2).dispatch(ListCommand::SetPage(3));
        let slice = project(&courses, &view);
        let text = page_text(&slice, "courses");
        assert!(text.ends_with("rows 5-5 of 5 courses, page 3 of 3\n"), "{text}");
    }

    #[test]
    fn past_the_end_and_empty_pages_are_explained() {
        let courses = vec![course(1, "Algebra I")];
        let (view, _) = ListView::new(lectern_app::CourseSort::Name, DEFAULT_PAGE_SIZE)
            .dispatch(ListCommand::SetPage(4));
        let slice = project(&courses, &view);
        assert!(page_footer(&slice, "courses").contains("past the end"));

        let (view, _) = view.dispatch(ListCommand::SetQuery("zzz".to_owned()));
        let slice = project(&courses, &view);
        assert!(page_text(&slice, "courses").starts_with("no courses match"));
    }

    #[test]
    fn page_json_includes_paging_fields() -> anyhow::Result<()> {
        let courses = vec![course(1, "Algebra I"), course(2, "Biology")];
        let view = ListView::new(lectern_app::CourseSort::Enrollment, 1);
        let slice = project(&courses, &view);
        let value: serde_json::Value = serde_json::from_str(&page_json(&slice)?)?;
        assert_eq!(value["total_pages"], 2);
        assert_eq!(value["rows"][0]["title"], "Biology");
        Ok(())
    }

    #[test]
    fn summary_text_flattens_nested_fields() -> anyhow::Result<()> {
        let courses = vec![course(1, "Algebra I"), course(2, "Biology")];
        let text = summary_text(&course_analytics(&courses))?;
        assert!(text.lines().any(|line| line.starts_with("total ") && line.ends_with(" 2")));
        assert!(text.contains("total_enrolled"));
        Ok(())
    }
}
