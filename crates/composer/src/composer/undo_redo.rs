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

use super::Composer;
use crate::history::HistoryEntry;
use crate::serializer::to_content;
use crate::update::{ComposerUpdate, SuggestionUpdate};

impl Composer {
    /// Step back to the previous snapshot. Any active suggestion
    /// session is dropped; the restored selection comes from the
    /// snapshot itself.
    pub fn undo(&mut self) -> ComposerUpdate {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(entry) => self.apply_history_entry(entry),
            None => ComposerUpdate::keep(),
        }
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self) -> ComposerUpdate {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(entry) => self.apply_history_entry(entry),
            None => ComposerUpdate::keep(),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Swap in a snapshot without recording the swap itself as an
    /// undoable edit.
    fn apply_history_entry(&mut self, entry: HistoryEntry) -> ComposerUpdate {
        self.history.set_replaying(true);
        self.clear_session();
        self.doc = to_content(&entry.text);
        let len = self.doc.char_len();
        let (start, end) = entry.selection;
        self.selection_start = start.min(len);
        self.selection_end = end.min(len);
        self.revision += 1;
        self.history.set_replaying(false);
        self.create_update_replace_all()
            .with_suggestion(SuggestionUpdate::Hide)
    }
}
