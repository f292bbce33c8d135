//! Field limits and normalization shared by task and column records.
//!
//! # Invariants
//! - Lengths are measured in Unicode scalar values, not bytes.
//! - Normalization trims surrounding whitespace before any limit check.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MAX_TASK_TITLE_CHARS: usize = 100;
pub const MAX_TASK_DESCRIPTION_CHARS: usize = 500;
pub const MAX_TAG_CHARS: usize = 20;
pub const MAX_TAGS_PER_TASK: usize = 10;
pub const MAX_COLUMN_TITLE_CHARS: usize = 50;

/// Which record field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TaskTitle,
    TaskDescription,
    TaskTag,
    ColumnTitle,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskTitle => "task.title",
            Self::TaskDescription => "task.description",
            Self::TaskTag => "task.tags",
            Self::ColumnTitle => "column.title",
        }
    }
}

/// Validation errors for task/column records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Record id is empty or whitespace.
    BlankId,
    /// Required title is empty after trim.
    BlankTitle(Field),
    /// Field exceeds its character limit.
    TooLong {
        field: Field,
        max_chars: usize,
        actual_chars: usize,
    },
    /// More tags than allowed on one task.
    TooManyTags { max: usize, actual: usize },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "id must not be blank"),
            Self::BlankTitle(field) => write!(f, "{} must not be blank", field.as_str()),
            Self::TooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{} exceeds {max_chars} chars (got {actual_chars})",
                field.as_str()
            ),
            Self::TooManyTags { max, actual } => {
                write!(f, "task.tags allows at most {max} tags (got {actual})")
            }
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn normalize_title(
    value: &str,
    field: Field,
    max_chars: usize,
) -> Result<String, ModelValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelValidationError::BlankTitle(field));
    }
    ensure_max_chars(trimmed, field, max_chars)?;
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_description(value: &str) -> Result<String, ModelValidationError> {
    let trimmed = value.trim();
    ensure_max_chars(trimmed, Field::TaskDescription, MAX_TASK_DESCRIPTION_CHARS)?;
    Ok(trimmed.to_string())
}

/// Trims tags, drops blanks and keeps the first occurrence of duplicates.
pub(crate) fn clean_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cleaned: Vec<String> = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if !trimmed.is_empty() && !cleaned.iter().any(|existing| existing == trimmed) {
            cleaned.push(trimmed.to_string());
        }
    }
    cleaned
}

/// [`clean_tags`] plus the per-tag and per-task limits.
pub(crate) fn normalize_tags<I, S>(tags: I) -> Result<Vec<String>, ModelValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let normalized = clean_tags(tags);
    for tag in &normalized {
        ensure_max_chars(tag, Field::TaskTag, MAX_TAG_CHARS)?;
    }
    if normalized.len() > MAX_TAGS_PER_TASK {
        return Err(ModelValidationError::TooManyTags {
            max: MAX_TAGS_PER_TASK,
            actual: normalized.len(),
        });
    }
    Ok(normalized)
}

fn ensure_max_chars(value: &str, field: Field, max_chars: usize) -> Result<(), ModelValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ModelValidationError::TooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed_and_counted_in_chars() {
        let title = normalize_title("  héllo  ", Field::TaskTitle, 5).unwrap();
        assert_eq!(title, "héllo");
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = normalize_title(" \t", Field::ColumnTitle, 50).unwrap_err();
        assert_eq!(err, ModelValidationError::BlankTitle(Field::ColumnTitle));
    }

    #[test]
    fn tags_keep_first_occurrence_order() {
        let tags = normalize_tags(["ui", " design", "", "ui", "design "]).unwrap();
        assert_eq!(tags, vec!["ui".to_string(), "design".to_string()]);
    }

    #[test]
    fn clean_tags_ignores_limits() {
        let long = "x".repeat(MAX_TAG_CHARS + 5);
        let many: Vec<String> = (0..MAX_TAGS_PER_TASK + 2).map(|i| format!("t{i}")).collect();
        assert_eq!(clean_tags([long.as_str(), " ", long.as_str()]), vec![long.clone()]);
        assert_eq!(clean_tags(&many).len(), MAX_TAGS_PER_TASK + 2);
    }

    #[test]
    fn overlong_tag_is_rejected() {
        let err = normalize_tags(["x".repeat(MAX_TAG_CHARS + 1)]).unwrap_err();
        assert!(matches!(
            err,
            ModelValidationError::TooLong {
                field: Field::TaskTag,
                ..
            }
        ));
    }
}
