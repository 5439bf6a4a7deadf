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

//! Reduces a parsed markup tree to flat text plus entities. Only the
//! allow-listed tags survive; unknown tags are unwrapped so none of the
//! source styling or nesting reaches the model.

use super::parser::{NodeHandle, ParsedDom, ParsedNode};
use crate::formatted_text::{
    char_len, Entity, EntityKind, EntityPayload, FormattedText,
};

/// Subtrees dropped whole, text included.
const DROP_WHOLE: &[&str] = &["script", "style", "head", "title", "template"];

/// Tags that separate lines in flat text.
const BLOCK: &[&str] = &[
    "p", "div", "li", "ul", "ol", "table", "tr", "h1", "h2", "h3", "h4", "h5",
    "h6",
];

pub(crate) fn convert(dom: &ParsedDom) -> FormattedText {
    let mut converter = Converter {
        dom,
        text: String::new(),
        len: 0,
        entities: Vec::new(),
        literal_depth: 0,
    };
    converter.walk(dom.document());
    converter.into_formatted_text()
}

struct Converter<'a> {
    dom: &'a ParsedDom,
    text: String,
    /// Codepoint length of `text`.
    len: usize,
    entities: Vec<Entity>,
    /// Inside Code/Pre nothing nests; nested markup stays literal text.
    literal_depth: usize,
}

impl Converter<'_> {
    fn into_formatted_text(mut self) -> FormattedText {
        let lead = self.text.chars().take_while(|c| *c == '\n').count();
        if lead > 0 {
            self.text.drain(..lead);
            self.len -= lead;
            for e in &mut self.entities {
                let end = e.end().saturating_sub(lead);
                e.offset = e.offset.saturating_sub(lead);
                e.length = end - e.offset;
            }
        }
        while self.text.ends_with('\n') {
            self.text.pop();
            self.len -= 1;
        }
        for e in &mut self.entities {
            if e.end() > self.len {
                e.length = self.len.saturating_sub(e.offset);
            }
        }
        self.entities.retain(|e| e.length > 0);
        let mut result = FormattedText::new(self.text, self.entities);
        result.sort_entities();
        result
    }

    fn walk(&mut self, handle: &NodeHandle) {
        match self.dom.get(handle) {
            ParsedNode::Document { children } => self.walk_all(children),
            ParsedNode::Text { content } => self.markup_text(content),
            ParsedNode::Ignored => {}
            ParsedNode::Element {
                name,
                attrs,
                children,
            } => self.element(name.local.as_ref(), attrs, children),
        }
    }

    fn walk_all(&mut self, children: &[NodeHandle]) {
        for child in children {
            self.walk(child);
        }
    }

    fn element(
        &mut self,
        tag: &str,
        attrs: &[(String, String)],
        children: &[NodeHandle],
    ) {
        if DROP_WHOLE.contains(&tag) {
            return;
        }
        match tag {
            "br" => self.push_text("\n"),
            "b" | "strong" => self.entity(EntityKind::Bold, children),
            "i" | "em" => self.entity(EntityKind::Italic, children),
            "u" => self.entity(EntityKind::Underline, children),
            "del" | "s" | "strike" => {
                self.entity(EntityKind::Strike, children)
            }
            "code" => self.literal(EntityKind::Code, children),
            "pre" => {
                self.ensure_break();
                self.literal(EntityKind::Pre, children);
                self.ensure_break();
            }
            "blockquote" => {
                self.ensure_break();
                self.entity(EntityKind::Blockquote, children);
                self.ensure_break();
            }
            "a" => self.anchor(attrs, children),
            "span" => self.span(attrs, children),
            "img" => self.image(attrs),
            _ if BLOCK.contains(&tag) => {
                self.ensure_break();
                self.walk_all(children);
                self.ensure_break();
            }
            // Unknown tag: keep the children, drop the styling.
            _ => self.walk_all(children),
        }
    }

    fn anchor(&mut self, attrs: &[(String, String)], children: &[NodeHandle]) {
        let href = get_attr(attrs, "href").filter(|href| safe_link(href));
        match href {
            Some(href) => self.entity_with_payload(
                EntityKind::Link,
                EntityPayload::Url(href.to_owned()),
                children,
            ),
            None => self.walk_all(children),
        }
    }

    fn span(&mut self, attrs: &[(String, String)], children: &[NodeHandle]) {
        if let Some(id) = get_attr(attrs, "data-user-id") {
            self.entity_with_payload(
                EntityKind::MentionUser,
                EntityPayload::UserId(id.to_owned()),
                children,
            );
        } else if let Some(id) = get_attr(attrs, "data-role-id") {
            self.entity_with_payload(
                EntityKind::MentionRole,
                EntityPayload::RoleId(id.to_owned()),
                children,
            );
        } else if get_attr(attrs, "data-hashtag").is_some() {
            self.entity(EntityKind::Hashtag, children);
        } else if get_attr(attrs, "data-spoiler").is_some() {
            self.entity(EntityKind::Spoiler, children);
        } else {
            self.walk_all(children);
        }
    }

    /// Custom emoji render as an entity over their alt text; any other
    /// image has no textual representation and is dropped.
    fn image(&mut self, attrs: &[(String, String)]) {
        let Some(id) = get_attr(attrs, "data-emoji-id") else {
            return;
        };
        let Some(alt) = get_attr(attrs, "alt").filter(|alt| !alt.is_empty())
        else {
            return;
        };
        let (id, alt) = (id.to_owned(), alt.to_owned());
        let start = self.len;
        self.push_text(&alt);
        self.record(
            EntityKind::CustomEmoji,
            EntityPayload::DocumentId(id),
            start,
        );
    }

    fn entity(&mut self, kind: EntityKind, children: &[NodeHandle]) {
        self.entity_with_payload(kind, EntityPayload::None, children);
    }

    fn entity_with_payload(
        &mut self,
        kind: EntityKind,
        payload: EntityPayload,
        children: &[NodeHandle],
    ) {
        let start = self.len;
        self.walk_all(children);
        self.record(kind, payload, start);
    }

    fn literal(&mut self, kind: EntityKind, children: &[NodeHandle]) {
        let start = self.len;
        self.literal_depth += 1;
        self.walk_all(children);
        self.literal_depth -= 1;
        self.record(kind, EntityPayload::None, start);
    }

    fn record(&mut self, kind: EntityKind, payload: EntityPayload, start: usize) {
        if self.literal_depth > 0 || self.len == start {
            return;
        }
        self.entities.push(Entity::with_payload(
            kind,
            start,
            self.len - start,
            payload,
        ));
    }

    /// Markup whitespace renders collapsed: runs become one space, and
    /// space at a line start is formatting noise from the source markup.
    /// Inside Code/Pre the raw text is kept.
    fn markup_text(&mut self, content: &str) {
        if self.literal_depth > 0 {
            self.push_text(content);
            return;
        }
        let mut collapsed = String::new();
        let mut in_run = false;
        for c in content.chars() {
            if c.is_whitespace() && c != '\u{A0}' {
                if !in_run {
                    collapsed.push(' ');
                }
                in_run = true;
            } else {
                collapsed.push(c);
                in_run = false;
            }
        }
        let at_line_start =
            self.text.is_empty() || self.text.ends_with('\n');
        let trimmed = if at_line_start {
            collapsed.trim_start()
        } else {
            &collapsed
        };
        self.push_text(trimmed);
    }

    fn push_text(&mut self, s: &str) {
        self.text.push_str(s);
        self.len += char_len(s);
    }

    fn ensure_break(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.push_text("\n");
        }
    }
}

fn get_attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

/// Links survive only with an http, https or mailto target.
fn safe_link(href: &str) -> bool {
    url::Url::parse(href)
        .map(|url| matches!(url.scheme(), "http" | "https" | "mailto"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::super::sanitize_markup;
    use crate::formatted_text::{Entity, EntityKind, EntityPayload};

    // ===================================================================
    // Inline formatting
    // ===================================================================

    #[test]
    fn bold_and_italic_tags_become_entities() {
        let text = sanitize_markup("plain <b>bold</b> <em>italic</em>").unwrap();
        assert_eq!(text.text, "plain bold italic");
        assert_eq!(
            text.entities,
            vec![
                Entity::new(EntityKind::Bold, 6, 4),
                Entity::new(EntityKind::Italic, 11, 6),
            ]
        );
    }

    #[test]
    fn strong_and_strike_aliases_map_to_the_same_kinds() {
        let text =
            sanitize_markup("<strong>a</strong><del>b</del><s>c</s>").unwrap();
        assert_eq!(text.entities[0].kind, EntityKind::Bold);
        assert_eq!(text.entities[1].kind, EntityKind::Strike);
        assert_eq!(text.entities[2].kind, EntityKind::Strike);
    }

    #[test]
    fn nested_formatting_produces_nested_entities() {
        let text = sanitize_markup("<b>bold <i>both</i></b>").unwrap();
        assert_eq!(text.text, "bold both");
        assert_eq!(
            text.entities,
            vec![
                Entity::new(EntityKind::Bold, 0, 9),
                Entity::new(EntityKind::Italic, 5, 4),
            ]
        );
    }

    #[test]
    fn empty_elements_produce_no_entities() {
        let text = sanitize_markup("a<b></b>c").unwrap();
        assert_eq!(text.text, "ac");
        assert!(text.entities.is_empty());
    }

    // ===================================================================
    // Links
    // ===================================================================

    #[test]
    fn https_links_keep_their_target() {
        let text =
            sanitize_markup(r#"<a href="https://example.com/x">site</a>"#)
                .unwrap();
        assert_eq!(
            text.entities,
            vec![Entity::with_payload(
                EntityKind::Link,
                0,
                4,
                EntityPayload::Url("https://example.com/x".into()),
            )]
        );
    }

    #[test]
    fn unsafe_link_schemes_are_unwrapped() {
        let text =
            sanitize_markup(r#"<a href="javascript:alert(1)">x</a>"#).unwrap();
        assert_eq!(text.text, "x");
        assert!(text.entities.is_empty());
    }

    #[test]
    fn relative_links_are_unwrapped() {
        let text = sanitize_markup(r#"<a href="/path">x</a>"#).unwrap();
        assert!(text.entities.is_empty());
    }

    // ===================================================================
    // Data-attribute spans and emoji
    // ===================================================================

    #[test]
    fn mention_spans_carry_their_ids() {
        let text = sanitize_markup(
            r#"<span data-user-id="u1">Alice</span> <span data-role-id="r2">ops</span>"#,
        )
        .unwrap();
        assert_eq!(text.text, "Alice ops");
        assert_eq!(
            text.entities,
            vec![
                Entity::with_payload(
                    EntityKind::MentionUser,
                    0,
                    5,
                    EntityPayload::UserId("u1".into()),
                ),
                Entity::with_payload(
                    EntityKind::MentionRole,
                    6,
                    3,
                    EntityPayload::RoleId("r2".into()),
                ),
            ]
        );
    }

    #[test]
    fn hashtag_and_spoiler_spans_are_recognized() {
        let text = sanitize_markup(
            r#"<span data-hashtag="">#rust</span> <span data-spoiler="">shh</span>"#,
        )
        .unwrap();
        assert_eq!(text.entities[0].kind, EntityKind::Hashtag);
        assert_eq!(text.entities[1].kind, EntityKind::Spoiler);
    }

    #[test]
    fn plain_styled_spans_are_unwrapped() {
        let text =
            sanitize_markup(r#"<span style="color:red">hot</span>"#).unwrap();
        assert_eq!(text.text, "hot");
        assert!(text.entities.is_empty());
    }

    #[test]
    fn emoji_images_become_entities_over_their_alt_text() {
        let text = sanitize_markup(
            r#"ok <img data-emoji-id="e7" alt=":tada:"> done"#,
        )
        .unwrap();
        assert_eq!(text.text, "ok :tada: done");
        assert_eq!(
            text.entities,
            vec![Entity::with_payload(
                EntityKind::CustomEmoji,
                3,
                6,
                EntityPayload::DocumentId("e7".into()),
            )]
        );
    }

    #[test]
    fn ordinary_images_are_dropped() {
        let text = sanitize_markup(r#"a<img src="cat.png" alt="cat">b"#).unwrap();
        assert_eq!(text.text, "ab");
    }

    // ===================================================================
    // Blocks and literals
    // ===================================================================

    #[test]
    fn paragraphs_become_line_breaks() {
        let text = sanitize_markup("<p>one</p><p>two</p>").unwrap();
        assert_eq!(text.text, "one\ntwo");
    }

    #[test]
    fn br_breaks_the_line() {
        let text = sanitize_markup("a<br>b").unwrap();
        assert_eq!(text.text, "a\nb");
    }

    #[test]
    fn leading_line_breaks_are_trimmed() {
        let text = sanitize_markup("<br>one<br>two").unwrap();
        assert_eq!(text.text, "one\ntwo");

        let text = sanitize_markup("<br><b>x</b>").unwrap();
        assert_eq!(text.text, "x");
        assert_eq!(text.entities, vec![Entity::new(EntityKind::Bold, 0, 1)]);
    }

    #[test]
    fn list_items_each_get_their_own_line() {
        let text =
            sanitize_markup("<ul><li>one</li><li>two</li></ul>").unwrap();
        assert_eq!(text.text, "one\ntwo");
    }

    #[test]
    fn code_suppresses_nested_markup() {
        let text =
            sanitize_markup("<code>let <b>x</b> = 1;</code>").unwrap();
        assert_eq!(text.text, "let x = 1;");
        assert_eq!(
            text.entities,
            vec![Entity::new(EntityKind::Code, 0, 10)]
        );
    }

    #[test]
    fn pre_blocks_are_literal_and_line_separated() {
        let text = sanitize_markup("before<pre>fn <i>f</i>()</pre>after")
            .unwrap();
        assert_eq!(text.text, "before\nfn f()\nafter");
        assert_eq!(
            text.entities,
            vec![Entity::new(EntityKind::Pre, 7, 6)]
        );
    }

    #[test]
    fn blockquotes_wrap_their_content() {
        let text = sanitize_markup("<blockquote>wise words</blockquote>")
            .unwrap();
        assert_eq!(text.text, "wise words");
        assert_eq!(
            text.entities,
            vec![Entity::new(EntityKind::Blockquote, 0, 10)]
        );
    }

    // ===================================================================
    // Dropping and unwrapping
    // ===================================================================

    #[test]
    fn script_and_style_subtrees_are_dropped_whole() {
        let text = sanitize_markup(
            "a<script>alert(1)</script>b<style>p{}</style>c",
        )
        .unwrap();
        assert_eq!(text.text, "abc");
    }

    #[test]
    fn unknown_tags_keep_their_children() {
        let text =
            sanitize_markup("<article><font color=\"red\">hi</font></article>")
                .unwrap();
        assert_eq!(text.text, "hi");
        assert!(text.entities.is_empty());
    }

    #[test]
    fn markup_whitespace_collapses_like_rendered_html() {
        let text =
            sanitize_markup("<p>\n  hello\n  there</p>\n<p>next</p>").unwrap();
        assert_eq!(text.text, "hello there\nnext");
    }

    #[test]
    fn code_keeps_its_whitespace_verbatim() {
        let text = sanitize_markup("<pre>fn main() {\n    go()\n}</pre>")
            .unwrap();
        assert_eq!(text.text, "fn main() {\n    go()\n}");
    }

    #[test]
    fn word_processor_noise_reduces_to_the_text() {
        let text = sanitize_markup(
            r#"<div class="x" style="margin:0"><p><span style="font-weight:700">Bold?</span></p></div>"#,
        )
        .unwrap();
        assert_eq!(text.text, "Bold?");
        assert!(text.entities.is_empty());
    }
}
