// Copyright 2026 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bounded undo/redo over full serialized snapshots.
//!
//! The composer pushes a snapshot before every externally visible
//! mutation. Undo and redo exchange the current snapshot with the stack
//! tops; the `replaying` guard stops a replay from re-polluting its own
//! history.

use std::collections::VecDeque;

use crate::formatted_text::FormattedText;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One saved state: serialized content plus the selection at the time.
/// Opaque to everything except the history itself and the replay path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub(crate) text: FormattedText,
    pub(crate) selection: (usize, usize),
}

impl HistoryEntry {
    pub(crate) fn new(text: FormattedText, selection: (usize, usize)) -> Self {
        Self { text, selection }
    }
}

pub struct EditHistory {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    limit: usize,
    enabled: bool,
    replaying: bool,
}

impl EditHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit,
            enabled: true,
            replaying: false,
        }
    }

    /// Record a snapshot and clear the redo stack. No-op while disabled
    /// or while a replay is in progress. The oldest entry is evicted
    /// when the stack is full.
    pub fn push(&mut self, entry: HistoryEntry) {
        if !self.enabled || self.replaying {
            return;
        }
        if self.undo_stack.len() == self.limit {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(entry);
        self.redo_stack.clear();
    }

    /// Pop the last snapshot, moving `current` to the redo stack.
    pub fn undo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let entry = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(entry)
    }

    /// Pop the last undone snapshot, moving `current` back to the undo
    /// stack (bypassing `push` so the redo stack survives).
    pub fn redo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        if self.undo_stack.len() == self.limit {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(current);
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_replaying(&mut self, replaying: bool) {
        self.replaying = replaying;
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.undo_stack.len()
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> HistoryEntry {
        HistoryEntry::new(FormattedText::plain(text), (0, 0))
    }

    // ===================================================================
    // Push / bound
    // ===================================================================

    #[test]
    fn pushing_records_an_entry() {
        let mut history = EditHistory::default();
        assert!(!history.can_undo());
        history.push(entry("a"));
        assert!(history.can_undo());
    }

    #[test]
    fn overflow_evicts_the_oldest_entry() {
        let mut history = EditHistory::new(50);
        for i in 0..60 {
            history.push(entry(&i.to_string()));
        }
        assert_eq!(history.depth(), 50);

        // The 50 retained entries are the most recent ones.
        let mut undone = 0;
        let mut last = entry("current");
        while let Some(e) = history.undo(last.clone()) {
            last = e;
            undone += 1;
        }
        assert_eq!(undone, 50);
        assert_eq!(last.text.text, "10");
    }

    #[test]
    fn push_while_disabled_is_a_noop() {
        let mut history = EditHistory::default();
        history.set_enabled(false);
        history.push(entry("a"));
        assert!(!history.can_undo());
    }

    #[test]
    fn push_while_replaying_is_a_noop() {
        let mut history = EditHistory::default();
        history.set_replaying(true);
        history.push(entry("a"));
        assert!(!history.can_undo());
        history.set_replaying(false);
        history.push(entry("a"));
        assert!(history.can_undo());
    }

    #[test]
    fn push_clears_the_redo_stack() {
        let mut history = EditHistory::default();
        history.push(entry("a"));
        history.undo(entry("b"));
        assert!(history.can_redo());
        history.push(entry("c"));
        assert!(!history.can_redo());
    }

    // ===================================================================
    // Undo / redo exchange
    // ===================================================================

    #[test]
    fn undo_returns_the_last_snapshot_and_keeps_current_for_redo() {
        let mut history = EditHistory::default();
        history.push(entry("old"));
        let restored = history.undo(entry("current")).unwrap();
        assert_eq!(restored.text.text, "old");
        let redone = history.redo(entry("old")).unwrap();
        assert_eq!(redone.text.text, "current");
    }

    #[test]
    fn undo_on_empty_history_returns_none() {
        let mut history = EditHistory::default();
        assert_eq!(history.undo(entry("x")), None);
        assert!(!history.can_redo());
    }

    #[test]
    fn redo_on_empty_history_returns_none() {
        let mut history = EditHistory::default();
        assert_eq!(history.redo(entry("x")), None);
    }

    #[test]
    fn redo_does_not_clear_the_remaining_redo_entries() {
        let mut history = EditHistory::default();
        history.push(entry("a"));
        history.push(entry("b"));
        history.undo(entry("c"));
        history.undo(entry("b"));
        assert!(history.can_redo());
        history.redo(entry("a"));
        assert!(history.can_redo());
    }

    #[test]
    fn entries_keep_their_selection() {
        let mut history = EditHistory::default();
        history.push(HistoryEntry::new(FormattedText::plain("ab"), (1, 2)));
        let restored = history.undo(entry("x")).unwrap();
        assert_eq!(restored.selection, (1, 2));
    }
}
