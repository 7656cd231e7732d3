//! Pure derivations over the loaded tasks and categories.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};

use crate::models::{Category, CategoryId, StatusFilter, Task};

/// Filter inputs of the main task view.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskFilter<'a> {
    pub search: &'a str,
    pub category: Option<CategoryId>,
    pub status: StatusFilter,
}

impl TaskFilter<'_> {
    /// Whether `task` belongs in the main view. Archived tasks never do.
    pub fn matches(&self, task: &Task) -> bool {
        if !title_matches(task, self.search) {
            return false;
        }
        if self.category.is_some_and(|id| task.category != Some(id)) {
            return false;
        }
        match self.status {
            StatusFilter::Active => !task.completed && !task.archived,
            StatusFilter::Completed => task.completed && !task.archived,
            StatusFilter::All => !task.archived,
        }
    }
}

/// Case-insensitive substring match; an empty query matches everything.
pub fn title_matches(task: &Task, query: &str) -> bool {
    query.is_empty() || task.title.to_lowercase().contains(&query.to_lowercase())
}

pub fn filter_tasks<'t>(tasks: &'t [Task], filter: &TaskFilter<'_>) -> Vec<&'t Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// Counts shown on the status tabs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Length of the currently filtered view.
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn get(&self, status: StatusFilter) -> usize {
        match status {
            StatusFilter::All => self.all,
            StatusFilter::Active => self.active,
            StatusFilter::Completed => self.completed,
        }
    }
}

pub fn status_counts(tasks: &[Task], filter: &TaskFilter<'_>) -> StatusCounts {
    StatusCounts {
        all: filter_tasks(tasks, filter).len(),
        active: tasks.iter().filter(|t| !t.completed && !t.archived).count(),
        completed: tasks.iter().filter(|t| t.completed && !t.archived).count(),
    }
}

/// Tasks marked completed whose last update falls on `day` in the local
/// time zone. Archived tasks are counted too.
pub fn completed_on(tasks: &[Task], day: NaiveDate) -> usize {
    completed_on_in(tasks, day, &Local)
}

pub fn completed_on_in<Tz: TimeZone>(tasks: &[Task], day: NaiveDate, tz: &Tz) -> usize {
    tasks
        .iter()
        .filter(|t| t.completed && t.updated_at.with_timezone(tz).date_naive() == day)
        .count()
}

/// A task is overdue once its due date has started and it is not today.
pub fn is_overdue<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> bool {
    let Some(due) = task.due_date else {
        return false;
    };
    let today = now.date_naive();
    now.naive_local() > due.and_time(NaiveTime::MIN) && due != today
}

pub fn category_by_id(categories: &[Category], id: Option<CategoryId>) -> Option<&Category> {
    let id = id?;
    categories.iter().find(|c| c.id == id)
}

/// Sidebar data: per-category counts plus the quick stats totals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorySummary {
    pub rows: Vec<CategoryRow>,
    pub active_total: u32,
    pub completed_total: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
    pub task_count: u32,
}

pub fn category_summary(categories: &[Category]) -> CategorySummary {
    CategorySummary {
        rows: categories
            .iter()
            .map(|c| CategoryRow {
                id: c.id,
                name: c.name.clone(),
                color: c.color.clone(),
                task_count: c.task_count,
            })
            .collect(),
        active_total: categories.iter().map(|c| c.active_tasks).sum(),
        completed_total: categories.iter().map(|c| c.completed_tasks).sum(),
    }
}

/// Overwrite each category's counters with values counted from `tasks`.
/// Archived tasks are left out of every counter.
pub fn recount_categories(categories: &mut [Category], tasks: &[Task]) {
    for category in categories.iter_mut() {
        let own = tasks
            .iter()
            .filter(|t| !t.archived && t.category == Some(category.id));
        let (mut total, mut active, mut completed) = (0u32, 0u32, 0u32);
        for task in own {
            total += 1;
            if task.completed {
                completed += 1;
            } else {
                active += 1;
            }
        }
        category.task_count = total;
        category.active_tasks = active;
        category.completed_tasks = completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, TaskDraft};
    use chrono::{Duration, FixedOffset, Utc};

    fn task(id: u64, title: &str, category: Option<u64>, completed: bool, archived: bool) -> Task {
        let mut task = Task::from_draft(id, TaskDraft::new(title, category), Utc::now());
        task.completed = completed;
        task.archived = archived;
        task
    }

    fn sample() -> Vec<Task> {
        vec![
            task(1, "Write Report", Some(1), false, false),
            task(2, "report expenses", Some(2), true, false),
            task(3, "Archive old report", Some(1), true, true),
            task(4, "Buy milk", Some(3), false, false),
            task(5, "Old draft", Some(1), false, true),
        ]
    }

    fn ids(tasks: &[&Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_default_filter_hides_archived() {
        let tasks = sample();
        let view = filter_tasks(&tasks, &TaskFilter::default());
        assert_eq!(ids(&view), vec![1, 2, 4]);
    }

    #[test]
    fn test_archived_never_shown_for_any_filter_combination() {
        let tasks = sample();
        for status in StatusFilter::ALL {
            for category in [None, Some(1), Some(2), Some(3), Some(9)] {
                for search in ["", "report", "OLD", "zzz"] {
                    let filter = TaskFilter {
                        search,
                        category,
                        status,
                    };
                    let view = filter_tasks(&tasks, &filter);
                    assert!(view.iter().all(|t| !t.archived), "{:?}", filter);
                    // deterministic
                    assert_eq!(ids(&view), ids(&filter_tasks(&tasks, &filter)));
                }
            }
        }
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let tasks = sample();
        let filter = TaskFilter {
            search: "REPORT",
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec![1, 2]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let tasks = sample();
        let filter = TaskFilter {
            search: "report",
            category: Some(1),
            status: StatusFilter::Active,
        };
        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec![1]);

        let filter = TaskFilter {
            status: StatusFilter::Completed,
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec![2]);
    }

    #[test]
    fn test_dangling_category_matches_nothing() {
        let tasks = sample();
        let filter = TaskFilter {
            category: Some(42),
            ..TaskFilter::default()
        };
        assert!(filter_tasks(&tasks, &filter).is_empty());
    }

    #[test]
    fn test_status_counts() {
        let tasks = sample();
        let filter = TaskFilter {
            search: "report",
            ..TaskFilter::default()
        };
        let counts = status_counts(&tasks, &filter);
        assert_eq!(
            counts,
            StatusCounts {
                all: 2,
                active: 2,
                completed: 1
            }
        );
        assert_eq!(counts.get(StatusFilter::Active), 2);

        // Search narrows the "all" tab only.
        let unfiltered = status_counts(&tasks, &TaskFilter::default());
        assert_eq!(unfiltered.all, 3);
        assert_eq!(unfiltered.active, counts.active);
        assert_eq!(unfiltered.completed, counts.completed);
    }

    #[test]
    fn test_completed_today_includes_archived_tasks() {
        // Current behavior: the rule only looks at `completed` and
        // `updated_at`, so archived tasks completed today are counted.
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let noon = tz
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .unwrap()
            .with_timezone(&Utc);

        let mut a = task(1, "A", None, true, false);
        a.updated_at = noon;
        let mut b = task(2, "B", None, true, true);
        b.updated_at = noon;
        let mut c = task(3, "C", None, false, false);
        c.updated_at = noon;
        let mut d = task(4, "D", None, true, false);
        d.updated_at = noon - Duration::days(1);

        assert_eq!(completed_on_in(&[a, b, c, d], day, &tz), 2);
    }

    #[test]
    fn test_completed_today_uses_local_calendar_day() {
        // 23:30 UTC on the 15th is already the 16th at UTC+2.
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mut a = task(1, "A", None, true, false);
        a.updated_at = Utc.with_ymd_and_hms(2026, 10, 15, 23, 30, 0).unwrap();

        assert_eq!(completed_on_in(&[a.clone()], day, &tz), 1);
        assert_eq!(completed_on_in(&[a], day, &Utc), 0);
    }

    #[test]
    fn test_overdue_predicate() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 15, 0, 0).unwrap();
        let mut t = task(1, "Due", None, false, false);

        assert!(!is_overdue(&t, &now));

        t.due_date = NaiveDate::from_ymd_opt(2026, 10, 16);
        assert!(!is_overdue(&t, &now), "due today is never overdue");

        t.due_date = NaiveDate::from_ymd_opt(2026, 10, 15);
        assert!(is_overdue(&t, &now));

        t.due_date = NaiveDate::from_ymd_opt(2026, 10, 17);
        assert!(!is_overdue(&t, &now));
    }

    #[test]
    fn test_overdue_at_midnight_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap();
        let mut t = task(1, "Due", None, false, false);
        t.due_date = NaiveDate::from_ymd_opt(2026, 10, 16);
        assert!(is_overdue(&t, &now));
    }

    #[test]
    fn test_category_lookup() {
        let categories = vec![Category {
            id: 1,
            name: "Work".into(),
            color: "#6366F1".into(),
            task_count: 0,
            active_tasks: 0,
            completed_tasks: 0,
        }];
        assert_eq!(category_by_id(&categories, Some(1)).map(|c| c.name.as_str()), Some("Work"));
        assert!(category_by_id(&categories, Some(2)).is_none());
        assert!(category_by_id(&categories, None).is_none());
    }

    #[test]
    fn test_summary_sums_stored_counters() {
        let mk = |id, counts: (u32, u32, u32)| Category {
            id,
            name: format!("c{}", id),
            color: String::new(),
            task_count: counts.0,
            active_tasks: counts.1,
            completed_tasks: counts.2,
        };
        let summary = category_summary(&[mk(1, (4, 3, 1)), mk(2, (2, 0, 2))]);

        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[0].task_count, 4);
        assert_eq!(summary.active_total, 3);
        assert_eq!(summary.completed_total, 3);
    }

    #[test]
    fn test_recount_from_tasks() {
        let tasks = sample();
        let mut categories: Vec<Category> = (1..=3)
            .map(|id| Category {
                id,
                name: String::new(),
                color: String::new(),
                task_count: 99,
                active_tasks: 99,
                completed_tasks: 99,
            })
            .collect();

        recount_categories(&mut categories, &tasks);

        assert_eq!(
            (categories[0].task_count, categories[0].active_tasks, categories[0].completed_tasks),
            (1, 1, 0)
        );
        assert_eq!(
            (categories[1].task_count, categories[1].active_tasks, categories[1].completed_tasks),
            (1, 0, 1)
        );
        assert_eq!(categories[2].task_count, 1);
    }
}
