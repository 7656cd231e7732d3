use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use tracing::{debug, error, info};

use crate::config::CounterPolicy;
use crate::controller::{ArchiveController, Level, Notification, TaskController};
use crate::error::StoreError;
use crate::models::TaskId;
use crate::parser::parse_task_input;
use crate::store::Stores;

const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Tasks,
    Archive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Create,
    Edit,
    ConfirmPurge(TaskId),
}

pub struct App {
    pub screen: Screen,
    pub tasks: TaskController,
    pub archive: ArchiveController,
    pub state: ListState,
    pub archive_state: ListState,
    pub input_mode: InputMode,
    pub new_task_input: String,
    pub form_error: Option<String>,
    pub toast: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(stores: Stores, counters: CounterPolicy) -> App {
        App {
            screen: Screen::Tasks,
            tasks: TaskController::new(stores.clone(), counters),
            archive: ArchiveController::new(stores),
            state: ListState::default(),
            archive_state: ListState::default(),
            input_mode: InputMode::Normal,
            new_task_input: String::new(),
            form_error: None,
            toast: None,
        }
    }

    /// Reload whichever screen is showing.
    pub async fn refresh(&mut self) {
        let result = match self.screen {
            Screen::Tasks => self.tasks.load().await,
            Screen::Archive => self.archive.load().await,
        };
        if let Err(err) = result {
            error!(error = %err, "refresh failed");
        }
        self.collect_notifications();
        self.clamp_selection();
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        match self.screen {
            Screen::Tasks => {
                let visible = self.tasks.filtered_tasks();
                self.state.selected().and_then(|i| visible.get(i)).map(|t| t.id)
            }
            Screen::Archive => {
                let visible = self.archive.filtered_tasks();
                self.archive_state
                    .selected()
                    .and_then(|i| visible.get(i))
                    .map(|t| t.id)
            }
        }
    }

    pub fn next(&mut self) {
        let len = self.visible_len();
        let state = self.list_state_mut();
        let i = match state.selected() {
            Some(i) if len > 0 => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            _ => 0,
        };
        state.select(if len == 0 { None } else { Some(i) });
    }

    pub fn previous(&mut self) {
        let len = self.visible_len();
        let state = self.list_state_mut();
        let i = match state.selected() {
            Some(i) if len > 0 => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            _ => 0,
        };
        state.select(if len == 0 { None } else { Some(i) });
    }

    /// Current toast, if it has not expired yet.
    pub fn active_toast(&self) -> Option<&Notification> {
        self.toast
            .as_ref()
            .filter(|(_, shown)| shown.elapsed() < TOAST_TTL)
            .map(|(n, _)| n)
    }

    fn visible_len(&self) -> usize {
        match self.screen {
            Screen::Tasks => self.tasks.filtered_tasks().len(),
            Screen::Archive => self.archive.filtered_tasks().len(),
        }
    }

    fn list_state_mut(&mut self) -> &mut ListState {
        match self.screen {
            Screen::Tasks => &mut self.state,
            Screen::Archive => &mut self.archive_state,
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        let state = self.list_state_mut();
        match (state.selected(), len) {
            (_, 0) => state.select(None),
            (None, _) => state.select(Some(0)),
            (Some(i), len) if i >= len => state.select(Some(len - 1)),
            _ => {}
        }
    }

    fn collect_notifications(&mut self) {
        let mut drained = self.tasks.take_notifications();
        drained.extend(self.archive.take_notifications());
        for notification in &drained {
            match notification.level {
                Level::Success => info!(message = %notification.message, "notify"),
                Level::Error => error!(message = %notification.message, "notify"),
            }
        }
        if let Some(last) = drained.pop() {
            self.toast = Some((last, Instant::now()));
        }
    }

    async fn switch_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Tasks => Screen::Archive,
            Screen::Archive => Screen::Tasks,
        };
        self.input_mode = InputMode::Normal;
        self.tasks.cancel_edit();
        self.refresh().await;
    }

    fn cycle_category(&mut self) {
        let ids: Vec<u64> = self.tasks.categories.iter().map(|c| c.id).collect();
        let next = match self.tasks.selected_category {
            None => ids.first().copied(),
            Some(current) => ids
                .iter()
                .position(|id| *id == current)
                .and_then(|i| ids.get(i + 1))
                .copied(),
        };
        self.tasks.select_category(next);
    }

    async fn submit_new_task(&mut self) {
        let draft = match parse_task_input(&self.new_task_input)
            .and_then(|parsed| parsed.into_draft(&self.tasks.categories))
        {
            Ok(draft) => draft,
            Err(err) => {
                self.form_error = Some(err.to_string());
                return;
            }
        };

        match self.tasks.create_task(draft).await {
            Ok(_) => {
                self.new_task_input.clear();
                self.form_error = None;
                self.input_mode = InputMode::Normal;
                self.state.select(Some(0));
            }
            Err(StoreError::Validation { errors, .. }) => {
                self.form_error = Some(errors.to_string());
            }
            Err(err) => debug!(error = %err, kind = err.kind(), "create_task failed"),
        }
        self.collect_notifications();
    }

    /// Returns `true` when the user asked to quit.
    pub async fn handle_input(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.input_mode {
            InputMode::Normal => match (self.screen, key.code) {
                (_, KeyCode::Char('q')) => return true,
                (_, KeyCode::Char('j')) | (_, KeyCode::Down) => self.next(),
                (_, KeyCode::Char('k')) | (_, KeyCode::Up) => self.previous(),
                (_, KeyCode::Tab) => self.switch_screen().await,
                (_, KeyCode::Char('r')) => self.refresh().await,
                (_, KeyCode::Char('/')) => self.input_mode = InputMode::Search,
                (Screen::Tasks, KeyCode::Char('f')) => {
                    self.tasks.set_status_filter(self.tasks.status_filter.next());
                    self.clamp_selection();
                }
                (Screen::Tasks, KeyCode::Char('c')) => {
                    self.cycle_category();
                    self.clamp_selection();
                }
                (Screen::Tasks, KeyCode::Char('a')) => {
                    self.tasks.open_form();
                    self.new_task_input.clear();
                    self.form_error = None;
                    self.input_mode = InputMode::Create;
                }
                (Screen::Tasks, KeyCode::Char(' ')) | (Screen::Tasks, KeyCode::Char('x')) => {
                    if let Some(id) = self.selected_task_id() {
                        if let Err(err) = self.tasks.toggle_complete(id).await {
                            debug!(error = %err, kind = err.kind(), "toggle_complete failed");
                        }
                        self.collect_notifications();
                        self.clamp_selection();
                    }
                }
                (Screen::Tasks, KeyCode::Char('e')) | (Screen::Tasks, KeyCode::Enter) => {
                    if let Some(id) = self.selected_task_id() {
                        if self.tasks.start_edit(id) {
                            self.input_mode = InputMode::Edit;
                        }
                    }
                }
                (Screen::Tasks, KeyCode::Char('A')) => {
                    if let Some(id) = self.selected_task_id() {
                        if let Err(err) = self.tasks.archive_task(id).await {
                            debug!(error = %err, kind = err.kind(), "archive_task failed");
                        }
                        self.collect_notifications();
                        self.clamp_selection();
                    }
                }
                (Screen::Tasks, KeyCode::Char('d')) => {
                    if let Some(id) = self.selected_task_id() {
                        if let Err(err) = self.tasks.delete_task(id).await {
                            debug!(error = %err, kind = err.kind(), "delete_task failed");
                        }
                        self.collect_notifications();
                        self.clamp_selection();
                    }
                }
                (Screen::Archive, KeyCode::Char('u')) => {
                    if let Some(id) = self.selected_task_id() {
                        if let Err(err) = self.archive.restore_task(id).await {
                            debug!(error = %err, kind = err.kind(), "restore_task failed");
                        }
                        self.collect_notifications();
                        self.clamp_selection();
                    }
                }
                (Screen::Archive, KeyCode::Char('d')) => {
                    if let Some(id) = self.selected_task_id() {
                        self.input_mode = InputMode::ConfirmPurge(id);
                    }
                }
                _ => {}
            },

            InputMode::Search => {
                let query = match self.screen {
                    Screen::Tasks => &mut self.tasks.search_query,
                    Screen::Archive => &mut self.archive.search_query,
                };
                match key.code {
                    KeyCode::Char(c) => query.push(c),
                    KeyCode::Backspace => {
                        query.pop();
                    }
                    KeyCode::Esc => {
                        query.clear();
                        self.input_mode = InputMode::Normal;
                    }
                    KeyCode::Enter => self.input_mode = InputMode::Normal,
                    _ => {}
                }
                self.clamp_selection();
            }

            InputMode::Create => match key.code {
                KeyCode::Enter => self.submit_new_task().await,
                KeyCode::Char(c) => self.new_task_input.push(c),
                KeyCode::Backspace => {
                    self.new_task_input.pop();
                }
                KeyCode::Esc => {
                    self.tasks.close_form();
                    self.new_task_input.clear();
                    self.form_error = None;
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            },

            InputMode::Edit => match key.code {
                KeyCode::Enter => {
                    // A blank draft keeps the editor open.
                    if let Err(err) = self.tasks.save_edit().await {
                        debug!(error = %err, kind = err.kind(), "save_edit failed");
                    }
                    if self.tasks.editing().is_none() {
                        self.input_mode = InputMode::Normal;
                    }
                    self.collect_notifications();
                }
                KeyCode::Esc => {
                    self.tasks.cancel_edit();
                    self.input_mode = InputMode::Normal;
                }
                KeyCode::Char(c) => {
                    if let Some(draft) = self.tasks.edit_draft_mut() {
                        draft.push(c);
                    }
                }
                KeyCode::Backspace => {
                    if let Some(draft) = self.tasks.edit_draft_mut() {
                        draft.pop();
                    }
                }
                _ => {}
            },

            InputMode::ConfirmPurge(id) => {
                if key.code == KeyCode::Char('y') {
                    if let Err(err) = self.archive.purge_task(id).await {
                        debug!(error = %err, kind = err.kind(), "purge_task failed");
                    }
                    self.collect_notifications();
                    self.clamp_selection();
                }
                self.input_mode = InputMode::Normal;
            }
        }
        false
    }
}
