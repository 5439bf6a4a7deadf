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

use unicode_segmentation::UnicodeSegmentation;

use super::Composer;
use crate::formatted_text::char_len;
use crate::update::ComposerUpdate;

impl Composer {
    /// Replace the current selection with text.
    pub fn replace_text(&mut self, new_text: &str) -> ComposerUpdate {
        self.push_undo();
        self.do_splice(self.sel_start(), self.sel_end(), new_text);
        self.create_update_replace_all()
    }

    /// Replace a specific range with text.
    pub fn replace_text_in(
        &mut self,
        new_text: &str,
        start: usize,
        end: usize,
    ) -> ComposerUpdate {
        let len = self.doc.char_len();
        let start = start.min(len);
        let end = end.clamp(start, len);
        self.push_undo();
        self.do_splice(start, end, new_text);
        self.create_update_replace_all()
    }

    /// Delete backward from the cursor, or delete the selection.
    /// Collapsed-cursor deletion removes one whole grapheme, so a
    /// multi-codepoint emoji goes in one keypress.
    pub fn backspace(&mut self) -> ComposerUpdate {
        if self.has_selection() {
            return self.replace_text("");
        }
        let cursor = self.sel_start();
        if cursor == 0 {
            return ComposerUpdate::keep();
        }
        let start = previous_grapheme_start(&self.doc.to_plain_text(), cursor);
        self.push_undo();
        self.do_splice(start, cursor, "");
        self.create_update_replace_all()
    }

    /// Delete forward from the cursor, or delete the selection.
    pub fn delete(&mut self) -> ComposerUpdate {
        if self.has_selection() {
            return self.replace_text("");
        }
        let cursor = self.sel_start();
        let text = self.doc.to_plain_text();
        let Some(end) = next_grapheme_end(&text, cursor) else {
            return ComposerUpdate::keep();
        };
        self.push_undo();
        self.do_splice(cursor, end, "");
        self.create_update_replace_all()
    }

    /// Insert a line break at the cursor (replacing any selection).
    pub fn insert_line_break(&mut self) -> ComposerUpdate {
        self.push_undo();
        self.do_splice(self.sel_start(), self.sel_end(), "\n");
        self.create_update_replace_all()
    }

    /// Move the selection. Clamped to the content bounds.
    pub fn select(&mut self, start: usize, end: usize) -> ComposerUpdate {
        let len = self.doc.char_len();
        self.selection_start = start.min(len);
        self.selection_end = end.min(len);
        self.schedule_detection();
        ComposerUpdate::update_selection(
            self.selection_start,
            self.selection_end,
        )
    }

    pub fn get_selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }
}

/// Codepoint offset of the grapheme boundary immediately before
/// `cursor`.
fn previous_grapheme_start(text: &str, cursor: usize) -> usize {
    let mut acc = 0;
    let mut prev = 0;
    for grapheme in text.graphemes(true) {
        if acc >= cursor {
            break;
        }
        prev = acc;
        acc += char_len(grapheme);
    }
    prev
}

/// Codepoint offset just past the grapheme starting at `cursor`, or
/// `None` at end of text.
fn next_grapheme_end(text: &str, cursor: usize) -> Option<usize> {
    let mut acc = 0;
    for grapheme in text.graphemes(true) {
        let len = char_len(grapheme);
        if acc >= cursor {
            return Some(acc + len);
        }
        acc += len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::SendKey;
    use crate::formatted_text::EntityKind;
    use crate::suggestion::{SuggestionSource, TriggerConfig};
    use crate::update::TextUpdate;

    fn new_model() -> Composer {
        Composer::new(
            vec![TriggerConfig::new(
                '@',
                "Mentions",
                EntityKind::MentionUser,
                SuggestionSource::Static(vec![]),
            )],
            SendKey::Enter,
        )
        .unwrap()
    }

    fn model_with_text(text: &str) -> Composer {
        let mut model = new_model();
        model.replace_text(text);
        model
    }

    fn plain(model: &Composer) -> String {
        model.get_content_as_plain_text()
    }

    // ===================================================================
    // Replace
    // ===================================================================

    #[test]
    fn typing_text_inserts_it_at_the_cursor() {
        let mut model = new_model();
        model.replace_text("hello");
        assert_eq!(plain(&model), "hello");
        assert_eq!(model.get_selection(), (5, 5));
    }

    #[test]
    fn typing_replaces_the_selection() {
        let mut model = model_with_text("hello world");
        model.select(6, 11);
        model.replace_text("there");
        assert_eq!(plain(&model), "hello there");
        assert_eq!(model.get_selection(), (11, 11));
    }

    #[test]
    fn replace_text_in_targets_an_explicit_range() {
        let mut model = model_with_text("abcdef");
        model.replace_text_in("XY", 2, 4);
        assert_eq!(plain(&model), "abXYef");
    }

    #[test]
    fn replace_text_in_clamps_out_of_bounds_ranges() {
        let mut model = model_with_text("abc");
        model.replace_text_in("X", 10, 20);
        assert_eq!(plain(&model), "abcX");
    }

    // ===================================================================
    // Backspace / delete
    // ===================================================================

    #[test]
    fn backspace_removes_the_previous_character() {
        let mut model = model_with_text("abc");
        model.backspace();
        assert_eq!(plain(&model), "ab");
        assert_eq!(model.get_selection(), (2, 2));
    }

    #[test]
    fn backspace_at_start_is_a_noop() {
        let mut model = model_with_text("abc");
        model.select(0, 0);
        let update = model.backspace();
        assert_eq!(update.text_update, TextUpdate::Keep);
        assert_eq!(plain(&model), "abc");
    }

    #[test]
    fn backspace_removes_a_whole_grapheme() {
        // Flag emoji: two codepoints, one grapheme.
        let mut model = model_with_text("a\u{1F1EB}\u{1F1F7}");
        model.backspace();
        assert_eq!(plain(&model), "a");
    }

    #[test]
    fn backspace_deletes_the_selection() {
        let mut model = model_with_text("hello world");
        model.select(5, 11);
        model.backspace();
        assert_eq!(plain(&model), "hello");
    }

    #[test]
    fn delete_removes_the_next_character() {
        let mut model = model_with_text("abc");
        model.select(1, 1);
        model.delete();
        assert_eq!(plain(&model), "ac");
        assert_eq!(model.get_selection(), (1, 1));
    }

    #[test]
    fn delete_at_end_is_a_noop() {
        let mut model = model_with_text("abc");
        let update = model.delete();
        assert_eq!(update.text_update, TextUpdate::Keep);
    }

    // ===================================================================
    // Line breaks
    // ===================================================================

    #[test]
    fn line_break_splits_the_text() {
        let mut model = model_with_text("ab");
        model.select(1, 1);
        model.insert_line_break();
        assert_eq!(plain(&model), "a\nb");
        assert_eq!(model.get_selection(), (2, 2));
    }

    #[test]
    fn consecutive_line_breaks_collapse() {
        let mut model = model_with_text("ab");
        model.insert_line_break();
        model.insert_line_break();
        assert_eq!(plain(&model), "ab\n");
    }

    // ===================================================================
    // Selection
    // ===================================================================

    #[test]
    fn select_clamps_to_content_length() {
        let mut model = model_with_text("abc");
        model.select(10, 20);
        assert_eq!(model.get_selection(), (3, 3));
    }

    #[test]
    fn grapheme_helpers_count_codepoints() {
        assert_eq!(previous_grapheme_start("ab", 2), 1);
        assert_eq!(previous_grapheme_start("a\u{1F1EB}\u{1F1F7}", 3), 1);
        assert_eq!(next_grapheme_end("ab", 0), Some(1));
        assert_eq!(next_grapheme_end("\u{1F1EB}\u{1F1F7}b", 0), Some(2));
        assert_eq!(next_grapheme_end("ab", 2), None);
    }
}
