use std::collections::VecDeque;

use super::change_event::ChangeEvent;
use crate::constants::DEFAULT_HISTORY_CAPACITY;

/// The last N change events, oldest evicted first.
#[derive(Debug, Clone)]
pub struct MirrorHistory {
    capacity: usize,
    entries: VecDeque<ChangeEvent>,
}

impl MirrorHistory {
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends `event`, returning the entry evicted to stay within capacity.
    pub fn push(&mut self, event: ChangeEvent) -> Option<ChangeEvent> {
        self.entries.push_back(event);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeEvent> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&ChangeEvent> {
        self.entries.back()
    }

    /// Copy of the entries in delivery order.
    pub fn snapshot(&self) -> Vec<ChangeEvent> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for MirrorHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
