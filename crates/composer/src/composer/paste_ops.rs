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
use crate::formatted_text::FormattedText;
use crate::paste::{sanitize_markup, strip_tags, PastePayload, PasteResult};

impl Composer {
    /// Ingest clipboard data at the cursor. Markup that cannot be
    /// sanitized degrades to its visible text; binary payloads go to the
    /// host's attachment pipeline untouched.
    pub fn paste(&mut self, payload: PastePayload) -> PasteResult {
        let fragment = match payload {
            PastePayload::Binary { mime } => {
                return PasteResult::Attachment { mime };
            }
            PastePayload::Plain(text) => FormattedText::plain(&text),
            PastePayload::Markup(html) => match sanitize_markup(&html) {
                Ok(fragment) => fragment,
                Err(error) => {
                    tracing::warn!(%error, "pasted markup rejected, keeping its text");
                    FormattedText::plain(&strip_tags(&html))
                }
            },
        };
        PasteResult::Update(self.insert_raw(&fragment, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::SendKey;
    use crate::formatted_text::{Entity, EntityKind};
    use crate::suggestion::{SuggestionSource, TriggerConfig};

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

    // ===================================================================
    // Plain and binary payloads
    // ===================================================================

    #[test]
    fn plain_text_is_inserted_verbatim() {
        let mut model = new_model();
        model.replace_text("hi ");
        model.paste(PastePayload::Plain("there".into()));
        assert_eq!(model.get_content_as_plain_text(), "hi there");
    }

    #[test]
    fn plain_newlines_become_line_breaks() {
        let mut model = new_model();
        model.paste(PastePayload::Plain("a\nb".into()));
        assert_eq!(model.get_content_as_plain_text(), "a\nb");
    }

    #[test]
    fn binary_payloads_are_handed_off_untouched() {
        let mut model = new_model();
        model.replace_text("text");
        let result = model.paste(PastePayload::Binary {
            mime: "image/png".into(),
        });
        assert_eq!(
            result,
            PasteResult::Attachment {
                mime: "image/png".into()
            }
        );
        // Content unchanged.
        assert_eq!(model.get_content_as_plain_text(), "text");
    }

    // ===================================================================
    // Markup payloads
    // ===================================================================

    #[test]
    fn allow_listed_markup_keeps_its_formatting() {
        let mut model = new_model();
        model.paste(PastePayload::Markup("<b>bold</b> rest".into()));
        let text = model.get_formatted_text();
        assert_eq!(text.text, "bold rest");
        assert_eq!(text.entities, vec![Entity::new(EntityKind::Bold, 0, 4)]);
    }

    #[test]
    fn pasted_markup_lands_at_the_cursor() {
        let mut model = new_model();
        model.replace_text("AB");
        model.select(1, 1);
        model.paste(PastePayload::Markup("<i>x</i>".into()));
        let text = model.get_formatted_text();
        assert_eq!(text.text, "AxB");
        assert_eq!(text.entities, vec![Entity::new(EntityKind::Italic, 1, 1)]);
        assert_eq!(model.get_selection(), (2, 2));
    }

    #[test]
    fn pasting_replaces_the_selection() {
        let mut model = new_model();
        model.replace_text("hello world");
        model.select(6, 11);
        model.paste(PastePayload::Markup("<b>there</b>".into()));
        assert_eq!(model.get_content_as_plain_text(), "hello there");
    }

    #[test]
    fn dangerous_markup_is_reduced_to_safe_text() {
        let mut model = new_model();
        model.paste(PastePayload::Markup(
            r#"<script>alert(1)</script><a href="javascript:x">click</a>"#
                .into(),
        ));
        let text = model.get_formatted_text();
        assert_eq!(text.text, "click");
        assert!(text.entities.is_empty());
    }

    #[test]
    fn a_paste_is_one_undo_step() {
        let mut model = new_model();
        model.replace_text("keep ");
        model.paste(PastePayload::Markup("<b>this</b>".into()));
        model.undo();
        assert_eq!(model.get_content_as_plain_text(), "keep ");
    }
}
