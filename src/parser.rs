use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::models::{Category, Priority, TaskDraft};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid due date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("internal regex compile failure: {0}")]
    Pattern(String),
}

/// One line of quick-add input split into its parts.
#[derive(Debug, PartialEq)]
pub struct ParsedTask {
    pub title: String,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub due_date: Option<NaiveDate>,
}

fn pattern(re: &str) -> Result<Regex, ParseError> {
    RegexBuilder::new(re)
        .case_insensitive(true)
        .build()
        .map_err(|e| ParseError::Pattern(e.to_string()))
}

/// Parse `!low|!medium|!high`, `#category` and `due:YYYY-MM-DD` tokens out of
/// `input`. The first token of each kind wins; all of them are removed from
/// the title.
pub fn parse_task_input(input: &str) -> Result<ParsedTask, ParseError> {
    let priority_re = pattern(r"(^|\s)!(low|medium|high)\b")?;
    let category_re = pattern(r"(^|\s)#(\S+)")?;
    let due_re = pattern(r"(^|\s)due:(\S*)")?;

    // Priority
    let priority = priority_re
        .captures(input)
        .and_then(|caps| caps.get(2))
        .and_then(|m| Priority::parse(m.as_str()));

    // Category
    let category = category_re
        .captures(input)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().to_string());

    // Due date
    let due_date = match due_re.captures(input).and_then(|caps| caps.get(2)) {
        Some(m) => Some(
            NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d")
                .map_err(|_| ParseError::InvalidDate(m.as_str().to_string()))?,
        ),
        None => None,
    };

    let title = priority_re.replace_all(input, " ");
    let title = category_re.replace_all(&title, " ");
    let title = due_re.replace_all(&title, " ");
    let title = pattern(r"\s+")?.replace_all(&title, " ").trim().to_string();

    Ok(ParsedTask {
        title,
        priority,
        category,
        due_date,
    })
}

impl ParsedTask {
    /// Resolve the category name and build a draft. Without a `#category`
    /// token the first category is used.
    pub fn into_draft(self, categories: &[Category]) -> Result<TaskDraft, ParseError> {
        let category = match &self.category {
            Some(name) => Some(
                categories
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(name))
                    .map(|c| c.id)
                    .ok_or_else(|| ParseError::UnknownCategory(name.clone()))?,
            ),
            None => categories.first().map(|c| c.id),
        };

        Ok(TaskDraft {
            title: self.title,
            category,
            priority: self.priority.unwrap_or_default(),
            due_date: self.due_date,
            ..TaskDraft::default()
        })
    }
}
