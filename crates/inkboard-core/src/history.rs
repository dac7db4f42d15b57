//! Linear undo/redo over element snapshots.

use crate::shapes::Element;
use std::sync::Arc;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// One history entry: the full element sequence at that step.
///
/// Elements are shared handles, so a snapshot costs one pointer per element.
pub type Snapshot = Arc<[Arc<Element>]>;

/// Snapshot history with a cursor.
///
/// `entries` is never empty and `step` always indexes into it. Layers are not
/// versioned here.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    step: usize,
    capacity: usize,
}

impl History {
    /// History holding only `initial`.
    pub fn new(initial: Snapshot) -> Self {
        Self::with_capacity(initial, MAX_UNDO_HISTORY)
    }

    /// History bounded to `capacity` entries (at least one).
    pub fn with_capacity(initial: Snapshot, capacity: usize) -> Self {
        Self {
            entries: vec![initial],
            step: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a new state. Drops any redo tail and evicts the oldest entry
    /// once over capacity.
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.step + 1);
        self.entries.push(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
        self.step = self.entries.len() - 1;
        log::debug!("history commit: step {} of {}", self.step, self.entries.len());
    }

    /// Step back. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.step == 0 {
            return None;
        }
        self.step -= 1;
        Some(self.current())
    }

    /// Step forward. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if self.step + 1 >= self.entries.len() {
            return None;
        }
        self.step += 1;
        Some(self.current())
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> Snapshot {
        Arc::clone(&self.entries[self.step])
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        self.step > 0
    }

    pub fn can_redo(&self) -> bool {
        self.step + 1 < self.entries.len()
    }

    /// Discard everything and start over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.entries.clear();
        self.entries.push(initial);
        self.step = 0;
    }

    /// Drop elements failing `keep` from every entry.
    pub fn retain(&mut self, mut keep: impl FnMut(&Element) -> bool) {
        for entry in &mut self.entries {
            if entry.iter().all(|e| keep(e)) {
                continue;
            }
            *entry = entry.iter().filter(|e| keep(e)).cloned().collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Extent, Style};
    use uuid::Uuid;

    fn snapshot_of(n: usize) -> Snapshot {
        let layer = Uuid::nil();
        (0..n)
            .map(|i| {
                Arc::new(Element::rectangle(
                    layer,
                    Style::default(),
                    Extent::new(i as f64, 0.0, 10.0, 10.0),
                ))
            })
            .collect()
    }

    #[test]
    fn test_undo_redo_restores_exact_snapshots() {
        let mut history = History::new(snapshot_of(0));
        let a = snapshot_of(1);
        let b = snapshot_of(2);
        history.commit(Arc::clone(&a));
        history.commit(Arc::clone(&b));

        assert!(Arc::ptr_eq(&history.undo().unwrap(), &a));
        assert!(Arc::ptr_eq(&history.redo().unwrap(), &b));
        assert!(history.redo().is_none());

        history.undo();
        history.undo();
        assert_eq!(history.step(), 0);
        assert!(history.undo().is_none());
        assert_eq!(history.step(), 0);
    }

    #[test]
    fn test_commit_truncates_redo_tail() {
        let mut history = History::new(snapshot_of(0));
        history.commit(snapshot_of(1));
        history.commit(snapshot_of(2));
        history.undo();
        history.commit(snapshot_of(3));

        assert_eq!(history.len(), 3);
        assert_eq!(history.current().len(), 3);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let all: Vec<Snapshot> = (1..=60).map(snapshot_of).collect();
        let mut history = History::new(Arc::clone(&all[0]));
        for snapshot in &all[1..] {
            history.commit(Arc::clone(snapshot));
        }

        assert_eq!(history.len(), 50);
        assert_eq!(history.step(), 49);
        assert!(Arc::ptr_eq(&history.current(), &all[59]));

        while history.undo().is_some() {}
        // The first ten were evicted
        assert!(Arc::ptr_eq(&history.current(), &all[10]));
    }

    #[test]
    fn test_retain_filters_all_entries() {
        let mut history = History::new(snapshot_of(2));
        history.commit(snapshot_of(3));
        let doomed = history.current()[0].id();
        history.retain(|e| e.id() != doomed);
        assert_eq!(history.current().len(), 2);
        history.undo();
        assert_eq!(history.current().len(), 2);
    }
}
