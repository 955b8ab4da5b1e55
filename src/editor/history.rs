//! Snapshot undo/redo history.

use std::collections::VecDeque;

use crate::tree::ElementTree;

/// Number of undo steps kept by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Bounded undo stack of tree snapshots with a redo branch.
///
/// Once full, recording drops the oldest snapshot. Recording a new edit
/// discards the redo branch.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<ElementTree>,
    future: Vec<ElementTree>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `limit` undo steps (at least one).
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            past: VecDeque::with_capacity(limit),
            future: Vec::new(),
            limit,
        }
    }

    /// Record the state before an edit.
    pub fn record(&mut self, before: ElementTree) {
        if self.past.len() == self.limit {
            let _ = self.past.pop_front();
        }
        self.past.push_back(before);
        self.future.clear();
    }

    /// Step back: returns the snapshot to restore, stashing `current` for
    /// redo.
    pub fn undo(&mut self, current: ElementTree) -> Option<ElementTree> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: ElementTree) -> Option<ElementTree> {
        let next = self.future.pop()?;
        self.past.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
