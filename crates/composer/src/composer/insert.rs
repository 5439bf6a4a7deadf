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
use crate::formatted_text::{
    char_len, Entity, EntityKind, EntityPayload, FormattedText,
};
use crate::suggestion::Suggestion;
use crate::update::{ComposerUpdate, SuggestionUpdate};

/// Separator appended after committed mentions so the next word does
/// not merge into the entity.
const SEPARATOR: char = '\u{A0}';

impl Composer {
    /// Commit a suggestion for the active session: replace the
    /// trigger+query span with the rendered template and entity, then
    /// place the cursor after the fragment.
    ///
    /// If the trigger text is no longer at the recorded span the session
    /// raced a concurrent edit; the commit aborts silently with content
    /// unchanged and the session retained, so the caller may retry after
    /// the next detection pass.
    pub fn insert_suggestion(
        &mut self,
        suggestion: &Suggestion,
    ) -> ComposerUpdate {
        let Some(state) = self.mention_state.clone() else {
            return ComposerUpdate::keep();
        };
        let Some(config) = self
            .configs
            .iter()
            .find(|c| c.trigger == state.trigger)
            .cloned()
        else {
            return ComposerUpdate::keep();
        };

        let mut text = self.formatted();
        let expected: String =
            std::iter::once(state.trigger).chain(state.query.chars()).collect();
        let actual: String = text
            .text
            .chars()
            .skip(state.start)
            .take(state.end - state.start)
            .collect();
        if actual != expected {
            tracing::debug!(
                expected,
                actual,
                "trigger text moved, aborting commit"
            );
            return ComposerUpdate::keep();
        }

        self.push_undo();
        let rendered = config
            .template
            .replace("{id}", &suggestion.id)
            .replace("{display}", &suggestion.display);
        let rendered_len = char_len(&rendered);
        text.splice(state.start, state.end, &rendered);
        if rendered_len > 0 {
            text.entities.push(Entity::with_payload(
                config.kind,
                state.start,
                rendered_len,
                payload_for(config.kind, &suggestion.id),
            ));
            text.sort_entities();
        }
        let mut cursor = state.start + rendered_len;
        if config.append_space {
            text.splice(cursor, cursor, &SEPARATOR.to_string());
            cursor += 1;
        }
        self.clear_session();
        self.set_content(text, cursor);
        self.create_update_replace_all()
            .with_suggestion(SuggestionUpdate::Hide)
    }

    /// Programmatic insertion at the cursor, independent of any trigger
    /// session (e.g. from an emoji picker).
    pub fn insert_entity(
        &mut self,
        kind: EntityKind,
        id: &str,
        display: &str,
    ) -> ComposerUpdate {
        if display.is_empty() {
            return ComposerUpdate::keep();
        }
        self.push_undo();
        let mut text = self.formatted();
        let start = self.sel_start();
        text.splice(start, self.sel_end(), display);
        let display_len = char_len(display);
        text.entities.push(Entity::with_payload(
            kind,
            start,
            display_len,
            payload_for(kind, id),
        ));
        text.sort_entities();
        let mut cursor = start + display_len;
        if matches!(kind, EntityKind::MentionUser | EntityKind::MentionRole) {
            text.splice(cursor, cursor, &SEPARATOR.to_string());
            cursor += 1;
        }
        self.set_content(text, cursor);
        self.create_update_replace_all()
    }

    /// Bulk replace or append a formatted fragment.
    pub fn insert_raw(
        &mut self,
        content: &FormattedText,
        clear_existing: bool,
    ) -> ComposerUpdate {
        self.push_undo();
        if clear_existing {
            self.clear_session();
            self.set_content(content.clone(), content.char_len());
        } else {
            let mut text = self.formatted();
            let start = self.sel_start();
            if self.has_selection() {
                text.splice(start, self.sel_end(), "");
            }
            text.insert_fragment(start, content);
            self.set_content(text, start + content.char_len());
        }
        self.create_update_replace_all()
    }
}

/// The payload an inserted entity of this kind carries.
fn payload_for(kind: EntityKind, id: &str) -> EntityPayload {
    match kind {
        EntityKind::MentionUser => EntityPayload::UserId(id.to_string()),
        EntityKind::MentionRole => EntityPayload::RoleId(id.to_string()),
        EntityKind::CustomEmoji => EntityPayload::DocumentId(id.to_string()),
        EntityKind::Link => EntityPayload::Url(id.to_string()),
        _ => EntityPayload::None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::composer::SendKey;
    use crate::suggestion::{SuggestionSource, TriggerConfig};

    fn mention_model() -> Composer {
        Composer::new(
            vec![TriggerConfig::new(
                '@',
                "Mentions",
                EntityKind::MentionUser,
                SuggestionSource::Static(vec![
                    Suggestion::new("u1", "Alice"),
                    Suggestion::new("u2", "Albert"),
                ]),
            )],
            SendKey::Enter,
        )
        .unwrap()
    }

    fn settle(model: &mut Composer) {
        model.poll(Instant::now() + Duration::from_secs(1));
    }

    fn alice() -> Suggestion {
        Suggestion::new("u1", "Alice")
    }

    // ===================================================================
    // Suggestion commit
    // ===================================================================

    #[test]
    fn committing_replaces_the_trigger_with_the_display_text() {
        let mut model = mention_model();
        model.replace_text("hi @al");
        settle(&mut model);
        model.insert_suggestion(&alice());

        let text = model.get_formatted_text();
        assert_eq!(text.text, "hi Alice\u{A0}");
        assert_eq!(
            text.entities,
            vec![Entity::with_payload(
                EntityKind::MentionUser,
                3,
                5,
                EntityPayload::UserId("u1".into()),
            )]
        );
        // Cursor lands after the separator.
        assert_eq!(model.get_selection(), (9, 9));
        assert!(model.mention_state.is_none());
    }

    #[test]
    fn commit_without_a_session_is_a_noop() {
        let mut model = mention_model();
        model.replace_text("hi");
        let update = model.insert_suggestion(&alice());
        assert_eq!(update, ComposerUpdate::keep());
    }

    #[test]
    fn commit_after_a_concurrent_edit_aborts_silently() {
        let mut model = mention_model();
        model.replace_text("hi @al");
        settle(&mut model);

        // The trigger span changes underneath the session.
        model.replace_text_in("X", 3, 4);
        let before = model.get_formatted_text();
        let update = model.insert_suggestion(&alice());
        assert_eq!(update, ComposerUpdate::keep());
        assert_eq!(model.get_formatted_text(), before);
        // Session retained so the caller can retry after re-detection.
        assert!(model.mention_state.is_some());
    }

    #[test]
    fn commit_respects_append_space_off() {
        let mut config = TriggerConfig::new(
            '#',
            "Hashtags",
            EntityKind::Hashtag,
            SuggestionSource::Static(vec![Suggestion::new("t1", "rust")]),
        );
        config.append_space = false;
        let mut model = Composer::new(vec![config], SendKey::Enter).unwrap();
        model.replace_text("#ru");
        settle(&mut model);
        model.insert_suggestion(&Suggestion::new("t1", "rust"));
        assert_eq!(model.get_formatted_text().text, "rust");
        assert_eq!(model.get_selection(), (4, 4));
    }

    #[test]
    fn commit_renders_the_template() {
        let mut config = TriggerConfig::new(
            '@',
            "Mentions",
            EntityKind::MentionUser,
            SuggestionSource::Static(vec![alice()]),
        );
        config.template = "@{display}".into();
        config.append_space = false;
        let mut model = Composer::new(vec![config], SendKey::Enter).unwrap();
        model.replace_text("@al");
        settle(&mut model);
        model.insert_suggestion(&alice());
        assert_eq!(model.get_formatted_text().text, "@Alice");
    }

    #[test]
    fn committed_suggestion_survives_an_undo_redo_round_trip() {
        let mut model = mention_model();
        model.replace_text("hi @al");
        settle(&mut model);
        model.insert_suggestion(&alice());
        let committed = model.get_formatted_text();

        model.undo();
        assert_eq!(model.get_formatted_text().text, "hi @al");
        model.redo();
        assert_eq!(model.get_formatted_text(), committed);
        assert_eq!(model.get_selection(), (9, 9));
    }

    // ===================================================================
    // Programmatic insertion
    // ===================================================================

    #[test]
    fn insert_entity_writes_display_text_and_payload() {
        let mut model = mention_model();
        model.replace_text("see ");
        model.insert_entity(EntityKind::CustomEmoji, "doc42", "\u{1F600}");
        let text = model.get_formatted_text();
        assert_eq!(text.text, "see \u{1F600}");
        assert_eq!(
            text.entities,
            vec![Entity::with_payload(
                EntityKind::CustomEmoji,
                4,
                1,
                EntityPayload::DocumentId("doc42".into()),
            )]
        );
        assert_eq!(model.get_selection(), (5, 5));
    }

    #[test]
    fn insert_entity_mention_appends_a_separator() {
        let mut model = mention_model();
        model.insert_entity(EntityKind::MentionUser, "u1", "Alice");
        assert_eq!(model.get_formatted_text().text, "Alice\u{A0}");
        assert_eq!(model.get_selection(), (6, 6));
    }

    #[test]
    fn insert_entity_replaces_the_selection() {
        let mut model = mention_model();
        model.replace_text("dear Bob!");
        model.select(5, 8);
        model.insert_entity(EntityKind::MentionUser, "u9", "Robert");
        assert_eq!(
            model.get_formatted_text().text,
            "dear Robert\u{A0}!"
        );
    }

    // ===================================================================
    // Raw insertion
    // ===================================================================

    #[test]
    fn insert_raw_appends_at_the_cursor() {
        let mut model = mention_model();
        model.replace_text("hello ");
        let fragment = FormattedText::new(
            "Alice",
            vec![Entity::with_payload(
                EntityKind::MentionUser,
                0,
                5,
                EntityPayload::UserId("u1".into()),
            )],
        );
        model.insert_raw(&fragment, false);
        let text = model.get_formatted_text();
        assert_eq!(text.text, "hello Alice");
        assert_eq!(text.entities.len(), 1);
        assert_eq!(text.entities[0].offset, 6);
    }

    #[test]
    fn insert_raw_can_replace_everything() {
        let mut model = mention_model();
        model.replace_text("old content");
        model.insert_raw(&FormattedText::plain("new"), true);
        assert_eq!(model.get_formatted_text().text, "new");
        assert_eq!(model.get_selection(), (3, 3));
    }

    #[test]
    fn insert_raw_is_undoable() {
        let mut model = mention_model();
        model.replace_text("keep ");
        model.insert_raw(&FormattedText::plain("this"), false);
        model.undo();
        assert_eq!(model.get_formatted_text().text, "keep ");
    }
}
