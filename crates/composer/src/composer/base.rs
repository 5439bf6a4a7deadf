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

use std::time::Instant;

use super::Composer;
use crate::formatted_text::{char_len, FormattedText};
use crate::history::HistoryEntry;
use crate::serializer::{to_content, to_formatted_text};
use crate::update::ComposerUpdate;

/// An opaque saved cursor position. Valid until the next structural
/// mutation; restoring a stale handle degrades to end of content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaretHandle {
    revision: u64,
    start: usize,
    end: usize,
}

impl Composer {
    /// Serialize the current content for storage or sending.
    pub fn get_formatted_text(&self) -> FormattedText {
        self.formatted()
    }

    pub fn get_content_as_plain_text(&self) -> String {
        self.doc.to_plain_text()
    }

    pub fn has_selection(&self) -> bool {
        self.selection_start != self.selection_end
    }

    /// Capture the cursor as a content-relative handle.
    pub fn save_caret(&self) -> CaretHandle {
        CaretHandle {
            revision: self.revision,
            start: self.selection_start,
            end: self.selection_end,
        }
    }

    /// Re-apply a saved handle. A handle from before a structural
    /// mutation no longer addresses the same content, so it degrades to
    /// end of content; this never errors.
    pub fn restore_caret(&mut self, handle: &CaretHandle) -> ComposerUpdate {
        if handle.revision == self.revision {
            self.select(handle.start, handle.end)
        } else {
            let end = self.doc.char_len();
            self.select(end, end)
        }
    }

    /// Drive the debounce deadlines. Host calls this on its own tick;
    /// fired deadlines run trigger re-evaluation and query dispatch.
    pub fn poll(&mut self, now: Instant) -> ComposerUpdate {
        if self.torn_down {
            return ComposerUpdate::keep();
        }
        let mut update = ComposerUpdate::keep();
        if self.detect_debounce.fire(now) {
            update.suggestion = self.evaluate_trigger(now);
        }
        if self.query_debounce.fire(now) {
            if let Some(suggestion) = self.dispatch_query() {
                update.suggestion = suggestion;
            }
        }
        update
    }

    /// Cancel all pending deadlines and make the instance inert. Later
    /// polls and query results do nothing.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.detect_debounce.cancel();
        self.query_debounce.cancel();
        self.clear_session();
    }

    pub fn set_history_enabled(&mut self, enabled: bool) {
        self.history.set_enabled(enabled);
    }

    /// Selection start, ensuring start <= end.
    pub(crate) fn sel_start(&self) -> usize {
        self.selection_start.min(self.selection_end)
    }

    /// Selection end, ensuring start <= end.
    pub(crate) fn sel_end(&self) -> usize {
        self.selection_start.max(self.selection_end)
    }

    pub(crate) fn formatted(&self) -> FormattedText {
        to_formatted_text(&self.doc)
    }

    /// Push the current state to the undo stack. Called before every
    /// externally visible mutation.
    pub(crate) fn push_undo(&mut self) {
        let entry = self.snapshot();
        self.history.push(entry);
    }

    pub(crate) fn snapshot(&self) -> HistoryEntry {
        HistoryEntry::new(
            self.formatted(),
            (self.selection_start, self.selection_end),
        )
    }

    /// Replace the document from a flat model, place the cursor, bump
    /// the revision and schedule trigger re-evaluation.
    pub(crate) fn set_content(&mut self, text: FormattedText, cursor: usize) {
        self.doc = to_content(&text);
        let len = self.doc.char_len();
        self.selection_start = cursor.min(len);
        self.selection_end = self.selection_start;
        self.revision += 1;
        self.schedule_detection();
    }

    /// Replace codepoints `[start, end)` with `replacement` and put the
    /// cursor after it.
    pub(crate) fn do_splice(
        &mut self,
        start: usize,
        end: usize,
        replacement: &str,
    ) {
        let mut text = self.formatted();
        text.splice(start, end, replacement);
        self.set_content(text, start + char_len(replacement));
    }

    pub(crate) fn schedule_detection(&mut self) {
        if !self.torn_down {
            self.detect_debounce.schedule(Instant::now());
        }
    }

    /// Drop the suggestion session and anything attached to it.
    pub(crate) fn clear_session(&mut self) {
        self.mention_state = None;
        self.suggestions.clear();
        self.active_token = None;
        self.query_debounce.cancel();
    }

    pub(crate) fn create_update_replace_all(&self) -> ComposerUpdate {
        ComposerUpdate::replace_all(
            self.formatted(),
            self.selection_start,
            self.selection_end,
        )
    }
}
