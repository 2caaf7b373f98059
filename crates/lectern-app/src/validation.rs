// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    InvalidInt,
    InvalidPercent,
    InvalidTimestamp,
    InvalidFlag,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInt => f.write_str("invalid whole number"),
            Self::InvalidPercent => f.write_str("invalid percentage (expected 0-100)"),
            Self::InvalidTimestamp => f.write_str("invalid timestamp (expected RFC 3339)"),
            Self::InvalidFlag => f.write_str("invalid flag (expected on/off)"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

pub fn parse_optional_int(input: &str) -> ValidationResult<Option<i64>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = trimmed
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidInt)?;
    if value < 0 {
        return Err(ValidationError::InvalidInt);
    }
    Ok(Some(value))
}

pub fn parse_required_int(input: &str) -> ValidationResult<i64> {
    parse_optional_int(input)?.ok_or(ValidationError::InvalidInt)
}

/// Accepts `40` and `40%`.
pub fn parse_percent(input: &str) -> ValidationResult<i64> {
    let trimmed = input.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    let value = digits
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidPercent)?;
    if !(0..=100).contains(&value) {
        return Err(ValidationError::InvalidPercent);
    }
    Ok(value)
}

pub fn parse_optional_timestamp(input: &str) -> ValidationResult<Option<OffsetDateTime>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    OffsetDateTime::parse(trimmed, &Rfc3339)
        .map(Some)
        .map_err(|_| ValidationError::InvalidTimestamp)
}

pub fn parse_flag(input: &str) -> ValidationResult<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ValidationError::InvalidFlag),
    }
}

/// Comma-separated tags, trimmed, empties dropped, duplicates collapsed.
pub fn parse_tags(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn format_tags<'a>(tags: impl IntoIterator<Item = &'a String>) -> String {
    tags.into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_timestamp(value: Option<OffsetDateTime>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    value.format(&Rfc3339).unwrap_or_default()
}

/// Calendar date only, for table cells.
pub fn format_day(value: OffsetDateTime) -> String {
    let date = value.date();
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

pub fn format_percent(value: Option<i64>) -> String {
    value.map_or_else(String::new, |value| format!("{value}%"))
}

/// Compact hours and minutes, e.g. `3h 05m` or `42m`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours == 0 {
        format!("{minutes}m")
    } else {
        format!("{hours}h {minutes:02}m")
    }
}

pub fn format_optional_duration(seconds: Option<i64>) -> String {
    seconds.map_or_else(String::new, format_duration)
}
