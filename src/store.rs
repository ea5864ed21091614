// In-memory task list store
//
// Holds the ordered task sequence plus per-task view flags and applies the
// mutation rules. Every operation that can change a priority re-sorts the
// sequence (stable, highest weight first).

use crate::filter::{self, Filter};
use crate::intent::{Intent, Target};
use crate::models::{NewTask, Priority, Task, TaskChanges, TaskId, ViewFlags};
use chrono::Utc;
use eyre::{Result, eyre};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// What the last successful mutation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added(TaskId),
    Updated(TaskId),
    Deleted(TaskId),
    ViewToggled(TaskId),
}

impl Change {
    pub fn id(&self) -> TaskId {
        match self {
            Change::Added(id) | Change::Updated(id) | Change::Deleted(id) | Change::ViewToggled(id) => *id,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked after each state change with the change and the store as it now is
pub type Subscriber = Box<dyn FnMut(&Change, &TaskListStore)>;

/// Field values for tasks synthesized by `add_default`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefaults {
    pub title_prefix: String,
    pub priority: Priority,
}

impl Default for TaskDefaults {
    fn default() -> Self {
        Self {
            title_prefix: "Task".to_string(),
            priority: Priority::Medium,
        }
    }
}

/// Ordered, in-memory task list
#[derive(Default)]
pub struct TaskListStore {
    items: Vec<Task>,
    views: HashMap<TaskId, ViewFlags>,
    defaults: TaskDefaults,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for TaskListStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskListStore")
            .field("items", &self.items)
            .field("views", &self.views)
            .field("defaults", &self.defaults)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl TaskListStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: TaskDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a task from caller-supplied fields.
    ///
    /// A blank title is rejected and the list is left untouched.
    pub fn add(&mut self, new: NewTask) -> Result<TaskId> {
        let title = validate_title(&new.title)?;
        let task = Task {
            id: TaskId::new(),
            title,
            priority: new.priority,
            completed: new.completed,
            due_date: new.due_date,
            created_at: Utc::now(),
        };
        Ok(self.insert(task))
    }

    /// Add a task with synthesized fields: "<prefix> N", default priority, due now
    pub fn add_default(&mut self) -> TaskId {
        let now = Utc::now();
        let task = Task {
            id: TaskId::new(),
            title: format!("{} {}", self.defaults.title_prefix, self.items.len() + 1),
            priority: self.defaults.priority,
            completed: false,
            due_date: now,
            created_at: now,
        };
        self.insert(task)
    }

    fn insert(&mut self, task: Task) -> TaskId {
        let id = task.id;
        info!(%id, title = %task.title, priority = %task.priority, "Adding task");
        self.views.insert(id, ViewFlags::default());
        self.items.push(task);
        self.resort();
        self.notify(Change::Added(id));
        id
    }

    /// Overwrite the supplied fields of a task.
    ///
    /// Returns `Ok(false)` when no task has this id or the change set is
    /// empty. Re-sorts only when the changes carry a priority.
    pub fn update(&mut self, id: TaskId, changes: TaskChanges) -> Result<bool> {
        let Some(index) = self.position(id) else {
            debug!(%id, "update: task not found");
            return Ok(false);
        };
        if changes.is_empty() {
            return Ok(false);
        }

        let title = changes.title.as_deref().map(validate_title).transpose()?;

        let task = &mut self.items[index];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(priority) = changes.priority {
            task.priority = priority;
        }
        if let Some(completed) = changes.completed {
            task.completed = completed;
        }
        if let Some(due_date) = changes.due_date {
            task.due_date = due_date;
        }
        debug!(%id, ?changes, "Updated task");

        if changes.priority.is_some() {
            self.resort();
        }
        self.notify(Change::Updated(id));
        Ok(true)
    }

    /// Remove a task permanently. Returns false when no task has this id.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            debug!(%id, "delete: task not found");
            return false;
        };

        let task = self.items.remove(index);
        self.views.remove(&id);
        info!(%id, title = %task.title, "Deleted task");
        self.notify(Change::Deleted(id));
        true
    }

    pub fn toggle_edit(&mut self, id: TaskId) -> bool {
        self.toggle_view(id, |v| v.is_edit = !v.is_edit)
    }

    pub fn toggle_date_picker(&mut self, id: TaskId) -> bool {
        self.toggle_view(id, |v| v.show_date_picker = !v.show_date_picker)
    }

    pub fn toggle_priority_picker(&mut self, id: TaskId) -> bool {
        self.toggle_view(id, |v| v.show_priority_picker = !v.show_priority_picker)
    }

    fn toggle_view(&mut self, id: TaskId, flip: impl FnOnce(&mut ViewFlags)) -> bool {
        let Some(view) = self.views.get_mut(&id) else {
            debug!(%id, "toggle_view: task not found");
            return false;
        };
        flip(view);
        debug!(%id, ?view, "Toggled view flags");
        self.notify(Change::ViewToggled(id));
        true
    }

    /// Flip the completed flag. Priority is untouched, so no re-sort.
    pub fn toggle_complete(&mut self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            debug!(%id, "toggle_complete: task not found");
            return false;
        };
        let task = &mut self.items[index];
        task.completed = !task.completed;
        debug!(%id, completed = task.completed, "Toggled completion");
        self.notify(Change::Updated(id));
        true
    }

    /// Advance the priority Low -> Medium -> High -> Low and re-sort
    pub fn cycle_priority(&mut self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            debug!(%id, "cycle_priority: task not found");
            return false;
        };
        let task = &mut self.items[index];
        task.priority = task.priority.cycle();
        debug!(%id, priority = %task.priority, "Cycled priority");
        self.resort();
        self.notify(Change::Updated(id));
        true
    }

    /// Apply an intent. Returns whether the state changed.
    ///
    /// Intents whose target does not resolve are no-ops.
    pub fn dispatch(&mut self, intent: Intent) -> Result<bool> {
        debug!(?intent, "dispatch");
        let id = match intent.target() {
            Some(target) => match self.resolve(target) {
                Some(id) => Some(id),
                None => {
                    debug!(?target, "dispatch: target not found");
                    return Ok(false);
                }
            },
            None => None,
        };

        let changed = match (intent, id) {
            (Intent::Add(new), _) => {
                self.add(new)?;
                true
            }
            (Intent::AddDefault, _) => {
                self.add_default();
                true
            }
            (Intent::Update { changes, .. }, Some(id)) => self.update(id, changes)?,
            (Intent::Delete { .. }, Some(id)) => self.delete(id),
            (Intent::ToggleEdit { .. }, Some(id)) => self.toggle_edit(id),
            (Intent::ToggleDatePicker { .. }, Some(id)) => self.toggle_date_picker(id),
            (Intent::TogglePriorityPicker { .. }, Some(id)) => self.toggle_priority_picker(id),
            (Intent::ToggleComplete { .. }, Some(id)) => self.toggle_complete(id),
            (Intent::CyclePriority { .. }, Some(id)) => self.cycle_priority(id),
            (_, None) => false,
        };
        Ok(changed)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current ordered sequence
    pub fn items(&self) -> &[Task] {
        &self.items
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.items.iter().find(|t| t.id == id)
    }

    pub fn view(&self, id: TaskId) -> Option<ViewFlags> {
        self.views.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First task, in current order, whose title equals `title` (trimmed)
    pub fn find_by_title(&self, title: &str) -> Option<&Task> {
        let title = title.trim();
        self.items.iter().find(|t| t.title == title)
    }

    pub fn resolve(&self, target: &Target) -> Option<TaskId> {
        match target {
            Target::Id(id) => self.get(*id).map(|t| t.id),
            Target::Title(title) => self.find_by_title(title).map(|t| t.id),
        }
    }

    /// Tasks matching every filter, in current order
    pub fn list(&self, filters: &[Filter]) -> Result<Vec<&Task>> {
        for f in filters {
            filter::validate_field_name(&f.field)?;
        }
        Ok(self
            .items
            .iter()
            .filter(|t| filter::matches_all(*t, filters))
            .collect())
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Change, &TaskListStore) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn position(&self, id: TaskId) -> Option<usize> {
        self.items.iter().position(|t| t.id == id)
    }

    // sort_by_key is stable: equal priorities keep their relative order
    fn resort(&mut self) {
        self.items.sort_by_key(|t| Reverse(t.priority.weight()));
    }

    // Subscribers are moved out while they run so they can read the store
    fn notify(&mut self, change: Change) {
        let mut subscribers = std::mem::take(&mut self.subscribers);
        for (_, subscriber) in subscribers.iter_mut() {
            subscriber(&change, self);
        }
        self.subscribers = subscribers;
    }
}

/// Trim a title, rejecting blank ones
fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(eyre!("Task title cannot be empty or whitespace-only"));
    }
    Ok(trimmed.to_string())
}
