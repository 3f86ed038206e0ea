// Task list state manager: collection mutations, derived views, persistence sync

use crate::filter::{SortDirection, StatusFilter};
use crate::models::{StatusSet, Task, TaskId, now_ms};
use crate::notice::Notice;
use crate::record::{Record, load_record, save_record};
use crate::storage::Storage;
use eyre::Result;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Number of tasks shown per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 4;

/// Construction options for a [`TaskStore`]
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Tasks per page (at least 1)
    pub page_size: usize,
    /// Status set used when none is stored yet
    pub default_statuses: StatusSet,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            default_statuses: StatusSet::default(),
        }
    }
}

/// Contents of the input form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingInput {
    pub description: String,
    pub status: String,
}

/// Read-only projection of the store for rendering
#[derive(Debug, Clone)]
pub struct View<'a> {
    /// Tasks on the current page, in canonical order
    pub tasks: Vec<&'a Task>,
    /// Current page, 1-based
    pub page: usize,
    /// ceil(filtered_count / page_size); zero when nothing matches
    pub total_pages: usize,
    pub filtered_count: usize,
    pub filter: &'a StatusFilter,
    /// Direction the next `toggle_sort` applies
    pub next_sort: SortDirection,
    pub editing: Option<TaskId>,
    pub statuses: &'a StatusSet,
}

/// Owns the task collection and the view state derived from it.
///
/// Every mutation is written back to the injected [`Storage`]. Write
/// failures never abort an operation: they are logged and kept as the
/// last persistence error, while the in-memory state stays authoritative.
pub struct TaskStore<S: Storage> {
    storage: S,
    tasks: Vec<Task>,
    statuses: StatusSet,
    filter: StatusFilter,
    sort: SortDirection,
    page: usize,
    page_size: usize,
    editing: Option<TaskId>,
    pending: PendingInput,
    last_id: TaskId,
    persist_error: Option<String>,
}

impl<S: Storage> TaskStore<S> {
    /// Load the store with default options
    pub fn open(storage: S) -> Self {
        Self::load(storage, StoreOptions::default())
    }

    /// Load tasks and statuses from storage, falling back to defaults
    ///
    /// Absent keys yield defaults silently. Unreadable or malformed values
    /// also yield defaults, and are reported through `persistence_error()`.
    pub fn load(storage: S, options: StoreOptions) -> Self {
        let mut failure = None;

        let mut tasks: Vec<Task> = load_or_default(&storage, Vec::new, &mut failure);
        let mut seen = HashSet::new();
        tasks.retain(|task| {
            let fresh = seen.insert(task.id);
            if !fresh {
                warn!(id = task.id, "Dropping task with duplicate id");
            }
            fresh
        });

        let default_statuses = options.default_statuses;
        let stored: StatusSet = load_or_default(&storage, || default_statuses.clone(), &mut failure);
        let mut statuses = StatusSet::new(stored.labels());
        if statuses.is_empty() {
            warn!("Stored status set is empty, using defaults");
            statuses = default_statuses;
        }

        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        let pending = PendingInput {
            description: String::new(),
            status: statuses.first().unwrap_or_default().to_string(),
        };

        info!(tasks = tasks.len(), statuses = statuses.len(), "Loaded task store");

        Self {
            storage,
            tasks,
            statuses,
            filter: StatusFilter::All,
            sort: SortDirection::Ascending,
            page: 1,
            page_size: options.page_size.max(1),
            editing: None,
            pending,
            last_id,
            persist_error: failure,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The canonical collection, in insertion (or last sorted) order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn statuses(&self) -> &StatusSet {
        &self.statuses
    }

    pub fn filter(&self) -> &StatusFilter {
        &self.filter
    }

    /// Direction the next `toggle_sort` applies
    pub fn sort_direction(&self) -> SortDirection {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Id of the task under edit, if any
    pub fn editing(&self) -> Option<TaskId> {
        self.editing
    }

    pub fn pending(&self) -> &PendingInput {
        &self.pending
    }

    /// Last persistence failure, cleared by the next successful write
    pub fn persistence_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // ========================================================================
    // Input form
    // ========================================================================

    pub fn set_pending_description(&mut self, description: impl Into<String>) {
        self.pending.description = description.into();
    }

    pub fn set_pending_status(&mut self, status: impl Into<String>) {
        self.pending.status = status.into();
    }

    // ========================================================================
    // Collection mutations
    // ========================================================================

    /// Append a new task with a fresh id
    pub fn add(&mut self, description: &str, status: &str) -> std::result::Result<Task, Notice> {
        let description = description.trim();
        let status = status.trim();
        if description.is_empty() {
            return Err(Notice::EmptyDescription);
        }
        if status.is_empty() {
            return Err(Notice::EmptyStatus);
        }

        let task = Task {
            id: self.next_id(),
            description: description.to_string(),
            status: status.to_string(),
        };
        debug!(id = task.id, status = %task.status, "add");

        self.tasks.push(task.clone());
        self.reset_pending();
        self.persist_tasks();
        Ok(task)
    }

    /// Load a task into the input form and put it under edit
    pub fn begin_edit(&mut self, id: TaskId) -> std::result::Result<(), Notice> {
        let task = self.get(id).ok_or(Notice::NotFound(id))?;
        self.pending = PendingInput {
            description: task.description.clone(),
            status: task.status.clone(),
        };
        self.editing = Some(id);
        debug!(id, "begin_edit");
        Ok(())
    }

    /// Apply the input form to the task under edit
    ///
    /// On empty input the edit stays open so the form can be corrected. If
    /// the task under edit has disappeared the edit is closed and
    /// `NotFound` is returned.
    pub fn update(&mut self) -> std::result::Result<Task, Notice> {
        let id = self.editing.ok_or(Notice::NotEditing)?;
        let description = self.pending.description.trim().to_string();
        let status = self.pending.status.trim().to_string();
        if description.is_empty() {
            return Err(Notice::EmptyDescription);
        }
        if status.is_empty() {
            return Err(Notice::EmptyStatus);
        }

        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            warn!(id, "Task under edit no longer exists, closing edit");
            self.cancel_edit();
            return Err(Notice::NotFound(id));
        };
        let task = &mut self.tasks[pos];
        task.description = description;
        task.status = status;
        let updated = task.clone();
        debug!(id, status = %updated.status, "update");

        self.cancel_edit();
        self.clamp_page();
        self.persist_tasks();
        Ok(updated)
    }

    /// The form's single button: update while editing, add otherwise
    pub fn submit(&mut self) -> std::result::Result<Task, Notice> {
        if self.editing.is_some() {
            return self.update();
        }
        let PendingInput { description, status } = self.pending.clone();
        self.add(&description, &status)
    }

    /// Close the edit without applying it
    pub fn cancel_edit(&mut self) {
        if let Some(id) = self.editing.take() {
            debug!(id, "cancel_edit");
        }
        self.reset_pending();
    }

    /// Remove a task, closing the edit if it was the one under edit
    pub fn delete(&mut self, id: TaskId) -> std::result::Result<Task, Notice> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(Notice::NotFound(id))?;
        let removed = self.tasks.remove(pos);
        debug!(id, "delete");

        if self.editing == Some(id) {
            debug!(id, "Deleted task was under edit, closing edit");
            self.cancel_edit();
        }

        self.clamp_page();
        self.persist_tasks();
        Ok(removed)
    }

    /// Sort the canonical collection by description, then flip the direction
    ///
    /// The sort is stable and persisted: the collection order itself changes.
    pub fn toggle_sort(&mut self) {
        let direction = self.sort;
        self.tasks.sort_by(|a, b| direction.compare(a, b));
        self.sort = direction.flip();
        debug!(%direction, "toggle_sort");
        self.persist_tasks();
    }

    // ========================================================================
    // Status set
    // ========================================================================

    pub fn add_status(&mut self, label: &str) -> std::result::Result<(), Notice> {
        let label = label.trim();
        if label.is_empty() {
            return Err(Notice::EmptyStatus);
        }
        if !self.statuses.insert(label) {
            return Err(Notice::DuplicateStatus(label.to_string()));
        }
        debug!(label, "add_status");
        self.persist_statuses();
        Ok(())
    }

    /// Remove a status label; refused while any task still holds it
    pub fn remove_status(&mut self, label: &str) -> std::result::Result<(), Notice> {
        let label = label.trim();
        if !self.statuses.contains(label) {
            return Err(Notice::UnknownStatus(label.to_string()));
        }
        let count = self.tasks.iter().filter(|t| t.status == label).count();
        if count > 0 {
            return Err(Notice::StatusInUse {
                label: label.to_string(),
                count,
            });
        }

        self.statuses.remove(label);
        debug!(label, "remove_status");

        if matches!(&self.filter, StatusFilter::Status(s) if s == label) {
            self.filter = StatusFilter::All;
            self.clamp_page();
        }
        if self.pending.status == label && self.editing.is_none() {
            self.pending.status = self.statuses.first().unwrap_or_default().to_string();
        }

        self.persist_statuses();
        Ok(())
    }

    // ========================================================================
    // View selection
    // ========================================================================

    /// Select the filter, keeping the current page within the new page count
    pub fn set_filter(&mut self, filter: StatusFilter) {
        debug!(%filter, "set_filter");
        self.filter = filter;
        self.clamp_page();
    }

    /// Jump to a page. Pages past the end yield an empty view.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self) {
        let last = self.total_pages().max(1);
        self.page = (self.page + 1).min(last);
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn total_pages(&self) -> usize {
        self.filtered().count().div_ceil(self.page_size)
    }

    /// Filtered, paginated projection of the collection
    pub fn view(&self) -> View<'_> {
        let filtered: Vec<&Task> = self.filtered().collect();
        let filtered_count = filtered.len();
        let start = (self.page - 1).saturating_mul(self.page_size);

        View {
            tasks: filtered.into_iter().skip(start).take(self.page_size).collect(),
            page: self.page,
            total_pages: filtered_count.div_ceil(self.page_size),
            filtered_count,
            filter: &self.filter,
            next_sort: self.sort,
            editing: self.editing,
            statuses: &self.statuses,
        }
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn filtered(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| self.filter.matches(t))
    }

    fn clamp_page(&mut self) {
        let last = self.total_pages().max(1);
        self.page = self.page.clamp(1, last);
    }

    fn reset_pending(&mut self) {
        self.pending = PendingInput {
            description: String::new(),
            status: self.statuses.first().unwrap_or_default().to_string(),
        };
    }

    /// Timestamp-derived id, strictly greater than any id seen so far
    ///
    /// Once an id of `i64::MAX` has been seen there is no greater one, so
    /// the smallest positive id not held by a current task is used instead.
    fn next_id(&mut self) -> TaskId {
        match self.last_id.checked_add(1) {
            Some(next) => {
                let id = now_ms().max(next);
                self.last_id = id;
                id
            }
            None => {
                let used: HashSet<TaskId> = self.tasks.iter().map(|t| t.id).collect();
                let id = (1..=TaskId::MAX).find(|id| !used.contains(id)).unwrap_or(0);
                warn!(id, "Task ids exhausted, using smallest free id");
                id
            }
        }
    }

    fn persist_tasks(&mut self) {
        let result = save_record(&mut self.storage, &self.tasks);
        self.record_persist(<Vec<Task>>::key(), result);
    }

    fn persist_statuses(&mut self) {
        let result = save_record(&mut self.storage, &self.statuses);
        self.record_persist(StatusSet::key(), result);
    }

    fn record_persist(&mut self, key: &str, result: Result<()>) {
        match result {
            Ok(()) => self.persist_error = None,
            Err(e) => {
                error!(key, error = ?e, "Failed to persist, keeping in-memory state");
                self.persist_error = Some(format!("{:#}", e));
            }
        }
    }
}

fn load_or_default<T, S>(storage: &S, default: impl FnOnce() -> T, failure: &mut Option<String>) -> T
where
    T: Record,
    S: Storage,
{
    match load_record::<T, S>(storage) {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!(key = T::key(), "Nothing stored, using default");
            default()
        }
        Err(e) => {
            warn!(key = T::key(), error = ?e, "Failed to load, using default");
            let message = format!("{:#}", e);
            *failure = Some(match failure.take() {
                Some(earlier) => format!("{}; {}", earlier, message),
                None => message,
            });
            default()
        }
    }
}
