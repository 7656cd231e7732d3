//! View state for the "Tasks" and "Archive" screens.
//!
//! Controllers own the loaded records plus the filter and edit state, call
//! the stores, and only touch their state once a call has succeeded. Each
//! outcome is also queued as a [`Notification`] for the presentation layer.

use chrono::Local;
use tracing::{info, warn};

use crate::config::CounterPolicy;
use crate::error::{StoreError, ValidationErrors};
use crate::models::{Category, CategoryId, Record, StatusFilter, Task, TaskDraft, TaskId, TaskPatch};
use crate::store::Stores;
use crate::view::{self, CategorySummary, StatusCounts, TaskFilter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// A transient message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// Trims the title and checks the required fields before anything is sent
/// to a store.
pub fn validate_draft(mut draft: TaskDraft) -> Result<TaskDraft, StoreError> {
    let mut errors = ValidationErrors::default();
    draft.title = draft.title.trim().to_string();
    if draft.title.is_empty() {
        errors.push("title", "Title is required");
    }
    if draft.category.is_none() {
        errors.push("category", "Category is required");
    }
    if errors.is_empty() {
        Ok(draft)
    } else {
        Err(StoreError::Validation {
            kind: Task::KIND,
            errors,
        })
    }
}

fn update_message(patch: &TaskPatch) -> &'static str {
    match (patch.completed, patch.archived) {
        (Some(true), _) => "Task completed!",
        (Some(false), _) => "Task reopened",
        (None, Some(true)) => "Task archived",
        (None, Some(false)) => "Task restored",
        (None, None) => "Task updated",
    }
}

/// The single in-progress inline title edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineEdit {
    pub task_id: TaskId,
    pub draft: String,
}

pub struct TaskController {
    stores: Stores,
    counters: CounterPolicy,
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub loading: bool,
    pub error: Option<String>,
    pub search_query: String,
    pub status_filter: StatusFilter,
    pub selected_category: Option<CategoryId>,
    pub show_form: bool,
    edit: Option<InlineEdit>,
    notifications: Vec<Notification>,
}

impl TaskController {
    pub fn new(stores: Stores, counters: CounterPolicy) -> Self {
        TaskController {
            stores,
            counters,
            tasks: Vec::new(),
            categories: Vec::new(),
            loading: false,
            error: None,
            search_query: String::new(),
            status_filter: StatusFilter::All,
            selected_category: None,
            show_form: false,
            edit: None,
            notifications: Vec::new(),
        }
    }

    /// Fetch tasks and categories together. Either both replace the current
    /// lists or neither does.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        self.loading = true;
        self.error = None;
        info!("loading tasks and categories");

        let fetched = tokio::try_join!(
            self.stores.tasks.get_all(),
            self.stores.categories.get_all()
        );
        let outcome = match fetched {
            Ok((tasks, categories)) => {
                info!(tasks = tasks.len(), categories = categories.len(), "loaded");
                self.tasks = tasks;
                self.categories = categories;
                self.sync_counters();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, kind = err.kind(), "load failed");
                self.error = Some(err.to_string());
                self.notify(Notification::error("Failed to load tasks"));
                Err(err)
            }
        };

        self.loading = false;
        outcome
    }

    /// Validate and create a task; the new task goes to the top of the list.
    pub async fn create_task(&mut self, draft: TaskDraft) -> Result<TaskId, StoreError> {
        let draft = validate_draft(draft)?;

        match self.stores.tasks.create(draft).await {
            Ok(task) => {
                let id = task.id;
                info!(id, "task created");
                self.tasks.insert(0, task);
                self.show_form = false;
                self.sync_counters();
                self.notify(Notification::success("Task created successfully"));
                Ok(id)
            }
            Err(err) => {
                warn!(error = %err, kind = err.kind(), "create failed");
                self.notify(Notification::error("Failed to create task"));
                Err(err)
            }
        }
    }

    pub async fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> Result<(), StoreError> {
        let message = update_message(&patch);

        match self.stores.tasks.update(id, patch).await {
            Ok(updated) => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                    *task = updated;
                }
                self.sync_counters();
                self.notify(Notification::success(message));
                Ok(())
            }
            Err(err) => {
                warn!(id, error = %err, kind = err.kind(), "update failed");
                self.notify(Notification::error("Failed to update task"));
                Err(err)
            }
        }
    }

    pub async fn toggle_complete(&mut self, id: TaskId) -> Result<(), StoreError> {
        let Some(completed) = self.task(id).map(|t| t.completed) else {
            self.notify(Notification::error("Failed to update task"));
            return Err(StoreError::NotFound {
                kind: Task::KIND,
                id,
            });
        };
        self.update_task(id, TaskPatch::completed(!completed)).await
    }

    pub async fn archive_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        self.update_task(id, TaskPatch::archived(true)).await
    }

    pub async fn delete_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        match self.stores.tasks.delete(id).await {
            Ok(_) => {
                self.tasks.retain(|t| t.id != id);
                self.sync_counters();
                self.notify(Notification::success("Task deleted"));
                Ok(())
            }
            Err(err) => {
                warn!(id, error = %err, kind = err.kind(), "delete failed");
                self.notify(Notification::error("Failed to delete task"));
                Err(err)
            }
        }
    }

    /// Begin editing a task's title, dropping any other unsaved edit.
    pub fn start_edit(&mut self, id: TaskId) -> bool {
        let Some(title) = self.task(id).map(|t| t.title.clone()) else {
            return false;
        };
        self.edit = Some(InlineEdit {
            task_id: id,
            draft: title,
        });
        true
    }

    pub fn set_edit_draft(&mut self, draft: impl Into<String>) {
        if let Some(edit) = self.edit.as_mut() {
            edit.draft = draft.into();
        }
    }

    pub fn edit_draft_mut(&mut self) -> Option<&mut String> {
        self.edit.as_mut().map(|edit| &mut edit.draft)
    }

    /// Commit the edit if the trimmed draft is non-empty. Returns whether an
    /// update was issued; an empty draft keeps the edit open.
    pub async fn save_edit(&mut self) -> Result<bool, StoreError> {
        let Some(edit) = &self.edit else {
            return Ok(false);
        };
        let title = edit.draft.trim().to_string();
        if title.is_empty() {
            return Ok(false);
        }
        let id = edit.task_id;

        let result = self.update_task(id, TaskPatch::title(title)).await;
        self.edit = None;
        result.map(|_| true)
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    pub fn editing(&self) -> Option<&InlineEdit> {
        self.edit.as_ref()
    }

    pub fn editing_task_id(&self) -> Option<TaskId> {
        self.edit.as_ref().map(|e| e.task_id)
    }

    pub fn open_form(&mut self) {
        self.show_form = true;
    }

    pub fn close_form(&mut self) {
        self.show_form = false;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.status_filter = status;
    }

    pub fn select_category(&mut self, category: Option<CategoryId>) {
        self.selected_category = category;
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn filter(&self) -> TaskFilter<'_> {
        TaskFilter {
            search: &self.search_query,
            category: self.selected_category,
            status: self.status_filter,
        }
    }

    pub fn filtered_tasks(&self) -> Vec<&Task> {
        view::filter_tasks(&self.tasks, &self.filter())
    }

    pub fn status_counts(&self) -> StatusCounts {
        view::status_counts(&self.tasks, &self.filter())
    }

    pub fn completed_today(&self) -> usize {
        view::completed_on(&self.tasks, Local::now().date_naive())
    }

    pub fn category_summary(&self) -> CategorySummary {
        view::category_summary(&self.categories)
    }

    pub fn category_for(&self, task: &Task) -> Option<&Category> {
        view::category_by_id(&self.categories, task.category)
    }

    pub fn is_overdue(&self, task: &Task) -> bool {
        view::is_overdue(task, &Local::now())
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn sync_counters(&mut self) {
        if self.counters == CounterPolicy::Recompute {
            view::recount_categories(&mut self.categories, &self.tasks);
        }
    }
}

/// State of the archive screen: archived tasks only, restore or purge.
pub struct ArchiveController {
    stores: Stores,
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub loading: bool,
    pub error: Option<String>,
    pub search_query: String,
    notifications: Vec<Notification>,
}

impl ArchiveController {
    pub fn new(stores: Stores) -> Self {
        ArchiveController {
            stores,
            tasks: Vec::new(),
            categories: Vec::new(),
            loading: false,
            error: None,
            search_query: String::new(),
            notifications: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> Result<(), StoreError> {
        self.loading = true;
        self.error = None;

        let fetched = tokio::try_join!(
            self.stores.tasks.get_all(),
            self.stores.categories.get_all()
        );
        let outcome = match fetched {
            Ok((tasks, categories)) => {
                self.tasks = tasks.into_iter().filter(|t| t.archived).collect();
                self.categories = categories;
                info!(archived = self.tasks.len(), "loaded archive");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, kind = err.kind(), "archive load failed");
                self.error = Some(err.to_string());
                self.notify(Notification::error("Failed to load archived tasks"));
                Err(err)
            }
        };

        self.loading = false;
        outcome
    }

    pub async fn restore_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        match self.stores.tasks.update(id, TaskPatch::archived(false)).await {
            Ok(_) => {
                self.tasks.retain(|t| t.id != id);
                self.notify(Notification::success("Task restored successfully"));
                Ok(())
            }
            Err(err) => {
                warn!(id, error = %err, "restore failed");
                self.notify(Notification::error("Failed to restore task"));
                Err(err)
            }
        }
    }

    /// Permanently delete an archived task.
    pub async fn purge_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        match self.stores.tasks.delete(id).await {
            Ok(_) => {
                self.tasks.retain(|t| t.id != id);
                self.notify(Notification::success("Task permanently deleted"));
                Ok(())
            }
            Err(err) => {
                warn!(id, error = %err, "purge failed");
                self.notify(Notification::error("Failed to delete task"));
                Err(err)
            }
        }
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn filtered_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| view::title_matches(t, &self.search_query))
            .collect()
    }

    pub fn category_for(&self, task: &Task) -> Option<&Category> {
        view::category_by_id(&self.categories, task.category)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::local::{Latency, LocalStore};
    use crate::store::{seed, EntityStore};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Wraps a store and counts the calls that reach it.
    struct Recording<S> {
        inner: S,
        creates: AtomicUsize,
        updates: AtomicUsize,
    }

    impl<S> Recording<S> {
        fn new(inner: S) -> Self {
            Recording {
                inner,
                creates: AtomicUsize::new(0),
                updates: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl<R: Record, S: EntityStore<R>> EntityStore<R> for Recording<S> {
        async fn get_all(&self) -> Result<Vec<R>, StoreError> {
            self.inner.get_all().await
        }
        async fn get_by_id(&self, id: u64) -> Result<R, StoreError> {
            self.inner.get_by_id(id).await
        }
        async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            self.inner.create(draft).await
        }
        async fn update(&self, id: u64, patch: R::Patch) -> Result<R, StoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.update(id, patch).await
        }
        async fn delete(&self, id: u64) -> Result<bool, StoreError> {
            self.inner.delete(id).await
        }
    }

    /// Fails every call.
    struct Broken;

    #[async_trait]
    impl<R: Record> EntityStore<R> for Broken {
        async fn get_all(&self) -> Result<Vec<R>, StoreError> {
            Err(StoreError::load(R::KIND, "connection refused"))
        }
        async fn get_by_id(&self, id: u64) -> Result<R, StoreError> {
            Err(StoreError::NotFound { kind: R::KIND, id })
        }
        async fn create(&self, _draft: R::Draft) -> Result<R, StoreError> {
            Err(StoreError::mutation(R::KIND, "create", "connection refused"))
        }
        async fn update(&self, _id: u64, _patch: R::Patch) -> Result<R, StoreError> {
            Err(StoreError::mutation(R::KIND, "update", "connection refused"))
        }
        async fn delete(&self, _id: u64) -> Result<bool, StoreError> {
            Err(StoreError::mutation(R::KIND, "delete", "connection refused"))
        }
    }

    fn local_tasks() -> Arc<Recording<LocalStore<Task>>> {
        Arc::new(Recording::new(LocalStore::new(seed::tasks(), Latency::none())))
    }

    fn local_categories() -> Arc<LocalStore<Category>> {
        Arc::new(LocalStore::new(seed::categories(), Latency::none()))
    }

    async fn loaded() -> (TaskController, Arc<Recording<LocalStore<Task>>>) {
        let tasks = local_tasks();
        let stores = Stores::new(tasks.clone(), local_categories());
        let mut controller = TaskController::new(stores, CounterPolicy::Stored);
        controller.load().await.unwrap();
        controller.take_notifications();
        (controller, tasks)
    }

    #[tokio::test]
    async fn test_load_fills_state() {
        let (controller, _) = loaded().await;
        assert_eq!(controller.tasks.len(), seed::tasks().len());
        assert_eq!(controller.categories.len(), seed::categories().len());
        assert!(!controller.loading);
        assert!(controller.error.is_none());
    }

    #[tokio::test]
    async fn test_load_failure_of_either_fetch_discards_both() {
        let stores = Stores::new(local_tasks(), Arc::new(Broken));
        let mut controller = TaskController::new(stores, CounterPolicy::Stored);

        let result = controller.load().await;

        assert!(matches!(result, Err(StoreError::Load { .. })));
        assert!(controller.tasks.is_empty());
        assert!(controller.categories.is_empty());
        assert!(!controller.loading);
        assert_eq!(
            controller.error.as_deref(),
            Some("failed to load category records: connection refused")
        );
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::error("Failed to load tasks")]
        );
    }

    #[tokio::test]
    async fn test_reload_after_failure_clears_error() {
        let (mut controller, _) = loaded().await;
        controller.error = Some("earlier failure".into());
        controller.load().await.unwrap();
        assert!(controller.error.is_none());
    }

    #[tokio::test]
    async fn test_create_prepends_and_closes_form() {
        let (mut controller, _) = loaded().await;
        controller.open_form();

        let id = controller
            .create_task(TaskDraft::new("  Water plants  ", Some(2)))
            .await
            .unwrap();

        assert_eq!(controller.tasks[0].id, id);
        assert_eq!(controller.tasks[0].title, "Water plants");
        assert!(!controller.show_form);
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::success("Task created successfully")]
        );
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title_and_missing_category_before_store() {
        let (mut controller, store) = loaded().await;
        controller.open_form();
        let before = controller.tasks.clone();

        let err = controller
            .create_task(TaskDraft::new("   ", None))
            .await
            .unwrap_err();

        match err {
            StoreError::Validation { errors, .. } => {
                assert_eq!(errors.get("title"), Some("Title is required"));
                assert_eq!(errors.get("category"), Some("Category is required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.creates.load(Ordering::SeqCst), 0);
        assert_eq!(controller.tasks, before);
        assert!(controller.show_form);
        assert!(controller.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_leaves_state_unchanged() {
        let stores = Stores::new(Arc::new(Broken), local_categories());
        let mut controller = TaskController::new(stores, CounterPolicy::Stored);
        controller.open_form();

        let result = controller.create_task(TaskDraft::new("Valid", Some(1))).await;

        assert!(matches!(result, Err(StoreError::Mutation { .. })));
        assert!(controller.tasks.is_empty());
        assert!(controller.show_form);
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::error("Failed to create task")]
        );
    }

    #[tokio::test]
    async fn test_toggle_complete_emits_completed_variant() {
        let (mut controller, _) = loaded().await;
        let before = controller.task(1).unwrap().clone();
        assert!(!before.completed);
        let started = Utc::now();

        controller.toggle_complete(1).await.unwrap();

        let after = controller.task(1).unwrap();
        assert!(after.completed);
        assert!(after.updated_at >= started);
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::success("Task completed!")]
        );

        controller.toggle_complete(1).await.unwrap();
        assert!(!controller.task(1).unwrap().completed);
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::success("Task reopened")]
        );
    }

    #[tokio::test]
    async fn test_update_keeps_ordering() {
        let (mut controller, _) = loaded().await;
        let order: Vec<u64> = controller.tasks.iter().map(|t| t.id).collect();

        controller
            .update_task(4, TaskPatch::title("Schedule reviews"))
            .await
            .unwrap();

        let after: Vec<u64> = controller.tasks.iter().map(|t| t.id).collect();
        assert_eq!(order, after);
        assert_eq!(controller.task(4).unwrap().title, "Schedule reviews");
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::success("Task updated")]
        );
    }

    #[tokio::test]
    async fn test_delete_missing_id_leaves_tasks_unchanged() {
        let (mut controller, _) = loaded().await;
        let before = controller.tasks.clone();

        let result = controller.delete_task(999).await;

        assert!(result.is_err());
        assert_eq!(controller.tasks, before);
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::error("Failed to delete task")]
        );
    }

    #[tokio::test]
    async fn test_delete_removes_task() {
        let (mut controller, _) = loaded().await;
        controller.delete_task(2).await.unwrap();
        assert!(controller.task(2).is_none());
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::success("Task deleted")]
        );
    }

    #[tokio::test]
    async fn test_archive_hides_task_from_main_view() {
        let (mut controller, _) = loaded().await;
        controller.archive_task(3).await.unwrap();

        assert!(controller.task(3).unwrap().archived);
        assert!(controller.filtered_tasks().iter().all(|t| t.id != 3));
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::success("Task archived")]
        );
    }

    #[tokio::test]
    async fn test_save_edit_with_blank_draft_is_a_no_op() {
        let (mut controller, store) = loaded().await;
        assert!(controller.start_edit(2));
        controller.set_edit_draft("   ");

        let saved = controller.save_edit().await.unwrap();

        assert!(!saved);
        assert_eq!(controller.editing_task_id(), Some(2));
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_save_edit_commits_trimmed_title() {
        let (mut controller, store) = loaded().await;
        controller.start_edit(2);
        assert_eq!(
            controller.editing().map(|e| e.draft.as_str()),
            Some("Review pull requests")
        );
        controller.set_edit_draft("  Review open PRs ");

        assert!(controller.save_edit().await.unwrap());

        assert_eq!(controller.editing_task_id(), None);
        assert_eq!(controller.task(2).unwrap().title, "Review open PRs");
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_start_edit_on_other_task_switches_and_drops_draft() {
        let (mut controller, _) = loaded().await;
        controller.start_edit(1);
        controller.set_edit_draft("unsaved");

        controller.start_edit(2);

        let edit = controller.editing().unwrap();
        assert_eq!(edit.task_id, 2);
        assert_eq!(edit.draft, "Review pull requests");
    }

    #[tokio::test]
    async fn test_cancel_edit_does_not_commit() {
        let (mut controller, store) = loaded().await;
        controller.start_edit(1);
        controller.set_edit_draft("Something else");
        controller.cancel_edit();

        assert_eq!(controller.editing_task_id(), None);
        assert_eq!(controller.task(1).unwrap().title, "Prepare quarterly report");
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_save_edit_clears_state_even_when_update_fails() {
        let stores = Stores::new(Arc::new(Broken), local_categories());
        let mut controller = TaskController::new(stores, CounterPolicy::Stored);
        controller.tasks = seed::tasks();
        controller.start_edit(1);
        controller.set_edit_draft("New title");

        assert!(controller.save_edit().await.is_err());
        assert_eq!(controller.editing_task_id(), None);
        assert_eq!(controller.task(1).unwrap().title, "Prepare quarterly report");
    }

    #[tokio::test]
    async fn test_recompute_policy_tracks_mutations() {
        let stores = Stores::new(local_tasks(), local_categories());
        let mut controller = TaskController::new(stores, CounterPolicy::Recompute);
        controller.load().await.unwrap();
        let work_before = controller.categories[0].completed_tasks;

        controller.toggle_complete(1).await.unwrap();

        assert_eq!(controller.categories[0].completed_tasks, work_before + 1);
    }

    #[tokio::test]
    async fn test_stored_policy_keeps_category_counters() {
        let (mut controller, _) = loaded().await;
        let before = controller.category_summary();

        controller.toggle_complete(1).await.unwrap();

        assert_eq!(controller.category_summary(), before);
    }

    #[tokio::test]
    async fn test_archive_controller_lists_only_archived() {
        let stores = Stores::seeded(Latency::none());
        let mut archive = ArchiveController::new(stores);
        archive.load().await.unwrap();

        assert!(!archive.tasks.is_empty());
        assert!(archive.tasks.iter().all(|t| t.archived));

        archive.set_search_query("PASSPORT");
        let ids: Vec<u64> = archive.filtered_tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![7]);
    }

    #[tokio::test]
    async fn test_archive_restore_and_purge() {
        let stores = Stores::seeded(Latency::none());
        let mut archive = ArchiveController::new(stores.clone());
        archive.load().await.unwrap();

        archive.restore_task(7).await.unwrap();
        archive.purge_task(11).await.unwrap();

        assert!(archive.tasks.is_empty());
        assert_eq!(
            archive.take_notifications(),
            vec![
                Notification::success("Task restored successfully"),
                Notification::success("Task permanently deleted"),
            ]
        );
        assert!(!stores.tasks.get_by_id(7).await.unwrap().archived);
        assert!(stores.tasks.get_by_id(11).await.is_err());
    }

    #[tokio::test]
    async fn test_archive_load_failure() {
        let stores = Stores::new(Arc::new(Broken), local_categories());
        let mut archive = ArchiveController::new(stores);

        assert!(archive.load().await.is_err());
        assert!(archive.error.is_some());
        assert!(!archive.loading);
        assert_eq!(
            archive.take_notifications(),
            vec![Notification::error("Failed to load archived tasks")]
        );
    }
}
