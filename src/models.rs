use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TaskId = u64;
pub type CategoryId = u64;

/// An entity kind the stores know how to create and merge-update.
pub trait Record: Clone + Send + Sync + 'static {
    type Draft: Clone + Send + Sync + 'static;
    type Patch: Clone + Send + Sync + 'static;

    /// Singular name used in logs and error messages.
    const KIND: &'static str;

    fn id(&self) -> u64;

    fn from_draft(id: u64, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Merge the set fields of `patch` into `self`.
    fn apply(&mut self, patch: &Self::Patch, now: DateTime<Utc>);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Priority> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status tabs of the main task view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [
        StatusFilter::All,
        StatusFilter::Active,
        StatusFilter::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Active => "Active",
            StatusFilter::Completed => "Completed",
        }
    }

    pub fn next(self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }
}

// Task struct
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
}

/// Fields supplied when creating a task. The store assigns id and timestamps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub category: Option<CategoryId>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub archived: bool,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, category: Option<CategoryId>) -> Self {
        TaskDraft {
            title: title.into(),
            category,
            ..TaskDraft::default()
        }
    }
}

/// Partial task update. `None` leaves the field untouched; the nested
/// options on `category` and `due_date` allow clearing them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub category: Option<Option<CategoryId>>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub archived: Option<bool>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        TaskPatch {
            title: Some(title.into()),
            ..TaskPatch::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        TaskPatch {
            completed: Some(completed),
            ..TaskPatch::default()
        }
    }

    pub fn archived(archived: bool) -> Self {
        TaskPatch {
            archived: Some(archived),
            ..TaskPatch::default()
        }
    }
}

impl Record for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    const KIND: &'static str = "task";

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Task {
            id,
            title: draft.title,
            completed: draft.completed,
            category: draft.category,
            priority: draft.priority,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
            archived: draft.archived,
        }
    }

    fn apply(&mut self, patch: &TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
        self.updated_at = now;
    }
}

// Category struct with its stored counters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub task_count: u32,
    #[serde(default)]
    pub active_tasks: u32,
    #[serde(default)]
    pub completed_tasks: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub color: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub task_count: Option<u32>,
    pub active_tasks: Option<u32>,
    pub completed_tasks: Option<u32>,
}

impl Record for Category {
    type Draft = CategoryDraft;
    type Patch = CategoryPatch;

    const KIND: &'static str = "category";

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: CategoryDraft, _now: DateTime<Utc>) -> Self {
        Category {
            id,
            name: draft.name,
            color: draft.color,
            task_count: 0,
            active_tasks: 0,
            completed_tasks: 0,
        }
    }

    // Categories carry no timestamps.
    fn apply(&mut self, patch: &CategoryPatch, _now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(n) = patch.task_count {
            self.task_count = n;
        }
        if let Some(n) = patch.active_tasks {
            self.active_tasks = n;
        }
        if let Some(n) = patch.completed_tasks {
            self.completed_tasks = n;
        }
    }
}
