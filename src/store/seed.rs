//! Sample dataset for the local store.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Category, CategoryId, Priority, Task};

fn stamp(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

fn category(id: CategoryId, name: &str, color: &str, counts: (u32, u32, u32)) -> Category {
    Category {
        id,
        name: name.to_string(),
        color: color.to_string(),
        task_count: counts.0,
        active_tasks: counts.1,
        completed_tasks: counts.2,
    }
}

pub fn categories() -> Vec<Category> {
    vec![
        category(1, "Work", "#6366F1", (4, 3, 1)),
        category(2, "Personal", "#10B981", (3, 2, 1)),
        category(3, "Shopping", "#F59E0B", (2, 1, 1)),
        category(4, "Health", "#EF4444", (2, 1, 1)),
    ]
}

struct Row {
    id: u64,
    title: &'static str,
    category: CategoryId,
    priority: Priority,
    completed: bool,
    archived: bool,
    due: Option<(i32, u32, u32)>,
    created: (u32, u32),
    updated: (u32, u32),
}

const ROWS: &[Row] = &[
    Row {
        id: 1,
        title: "Prepare quarterly report",
        category: 1,
        priority: Priority::High,
        completed: false,
        archived: false,
        due: Some((2025, 3, 14)),
        created: (3, 1),
        updated: (3, 1),
    },
    Row {
        id: 2,
        title: "Review pull requests",
        category: 1,
        priority: Priority::Medium,
        completed: false,
        archived: false,
        due: None,
        created: (3, 2),
        updated: (3, 2),
    },
    Row {
        id: 3,
        title: "Update team wiki",
        category: 1,
        priority: Priority::Low,
        completed: true,
        archived: false,
        due: None,
        created: (2, 20),
        updated: (3, 3),
    },
    Row {
        id: 4,
        title: "Schedule one-on-ones",
        category: 1,
        priority: Priority::Medium,
        completed: false,
        archived: false,
        due: Some((2025, 3, 20)),
        created: (3, 4),
        updated: (3, 4),
    },
    Row {
        id: 5,
        title: "Call the landlord",
        category: 2,
        priority: Priority::High,
        completed: false,
        archived: false,
        due: Some((2025, 3, 10)),
        created: (3, 5),
        updated: (3, 5),
    },
    Row {
        id: 6,
        title: "Plan weekend trip",
        category: 2,
        priority: Priority::Low,
        completed: false,
        archived: false,
        due: None,
        created: (3, 5),
        updated: (3, 5),
    },
    Row {
        id: 7,
        title: "Renew passport",
        category: 2,
        priority: Priority::Medium,
        completed: true,
        archived: true,
        due: None,
        created: (1, 15),
        updated: (2, 10),
    },
    Row {
        id: 8,
        title: "Buy groceries",
        category: 3,
        priority: Priority::Medium,
        completed: false,
        archived: false,
        due: Some((2025, 3, 8)),
        created: (3, 6),
        updated: (3, 6),
    },
    Row {
        id: 9,
        title: "Order printer ink",
        category: 3,
        priority: Priority::Low,
        completed: true,
        archived: false,
        due: None,
        created: (2, 28),
        updated: (3, 1),
    },
    Row {
        id: 10,
        title: "Book dentist appointment",
        category: 4,
        priority: Priority::Medium,
        completed: false,
        archived: false,
        due: Some((2025, 3, 25)),
        created: (3, 6),
        updated: (3, 6),
    },
    Row {
        id: 11,
        title: "Morning run",
        category: 4,
        priority: Priority::Low,
        completed: true,
        archived: true,
        due: None,
        created: (2, 1),
        updated: (2, 2),
    },
];

pub fn tasks() -> Vec<Task> {
    ROWS.iter()
        .map(|row| Task {
            id: row.id,
            title: row.title.to_string(),
            completed: row.completed,
            category: Some(row.category),
            priority: row.priority,
            due_date: row
                .due
                .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            created_at: stamp(2025, row.created.0, row.created.1, 9),
            updated_at: stamp(2025, row.updated.0, row.updated.1, 17),
            archived: row.archived,
        })
        .collect()
}
