// omnibox_suggestions — Omnibox suggestion sessions and dropdown rendering
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

/// Delayed tasks run on the orchestrator's thread. Tasks due at the same
/// instant pop in posting order. Cancelling only affects tasks not yet popped.
#[derive(Debug)]
pub struct TaskQueue<T> {
    next_id: u64,
    queue: BTreeMap<(Instant, TaskId), T>,
    due: HashMap<TaskId, Instant>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self { next_id: 0, queue: BTreeMap::new(), due: HashMap::new() }
    }
}

impl<T> TaskQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, due: Instant, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.insert((due, id), task);
        self.due.insert(id, due);
        id
    }

    /// Remove a task that has not run yet. Returns it if it was still queued.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let due = self.due.remove(&id)?;
        self.queue.remove(&(due, id))
    }

    #[must_use]
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.due.contains_key(&id)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|&(due, _)| due)
    }

    /// Pop the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        let entry = self.queue.first_entry()?;
        if entry.key().0 > now {
            return None;
        }
        let ((_, id), task) = entry.remove_entry();
        self.due.remove(&id);
        Some(task)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.due.clear();
    }
}
