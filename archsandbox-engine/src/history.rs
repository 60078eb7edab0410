//! Bounded undo/redo stack of schema snapshots.
use std::collections::VecDeque;

use crate::constants::DEFAULT_HISTORY_DEPTH;
use crate::schema::AppSchema;

#[derive(Debug, Clone)]
pub struct SchemaHistory {
    undo: VecDeque<AppSchema>,
    redo: Vec<AppSchema>,
    depth: usize,
}

impl Default for SchemaHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl SchemaHistory {
    /// History that keeps at most `depth` undo steps. A depth of zero disables undo.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(depth.min(DEFAULT_HISTORY_DEPTH)),
            redo: Vec::new(),
            depth,
        }
    }

    /// Remember `previous` before a mutation. Clears the redo stack.
    pub fn record(&mut self, previous: AppSchema) {
        self.redo.clear();
        if self.depth == 0 {
            return;
        }
        if self.undo.len() == self.depth {
            self.undo.pop_front();
        }
        self.undo.push_back(previous);
    }

    /// Step back, stashing `current` for redo.
    pub fn undo(&mut self, current: AppSchema) -> Option<AppSchema> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward again, stashing `current` for undo.
    pub fn redo(&mut self, current: AppSchema) -> Option<AppSchema> {
        let next = self.redo.pop()?;
        if self.depth > 0 {
            if self.undo.len() == self.depth {
                self.undo.pop_front();
            }
            self.undo.push_back(current);
        }
        Some(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tech::{Category, Technology};

    fn schema_with(n: usize) -> AppSchema {
        AppSchema::from_technologies(
            (0..n).map(|i| Technology::uniform(format!("t{i}"), Category::Service, 10.0)),
            [],
        )
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut history = SchemaHistory::default();
        history.record(schema_with(0));
        let current = schema_with(1);

        let restored = history.undo(current.clone()).unwrap();
        assert!(restored.is_empty());
        assert!(history.can_redo());

        let again = history.redo(restored).unwrap();
        assert_eq!(again, current);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn recording_clears_redo() {
        let mut history = SchemaHistory::default();
        history.record(schema_with(0));
        let _ = history.undo(schema_with(1));
        history.record(schema_with(2));
        assert!(!history.can_redo());
    }

    #[test]
    fn oldest_snapshots_are_dropped() {
        let mut history = SchemaHistory::new(2);
        for n in 0..4 {
            history.record(schema_with(n));
        }
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.undo(schema_with(9)).unwrap().len(), 3);
        assert_eq!(history.undo(schema_with(9)).unwrap().len(), 2);
        assert!(history.undo(schema_with(9)).is_none());
    }

    #[test]
    fn empty_history_has_nothing_to_undo() {
        let mut history = SchemaHistory::new(0);
        history.record(schema_with(1));
        assert!(history.undo(AppSchema::new()).is_none());
    }
}
