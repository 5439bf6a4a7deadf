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

//! Conversion between the live content tree and [`FormattedText`].
//!
//! `to_formatted_text` walks the tree depth-first, accumulating plain text
//! and recording each span's `[start, end)` as its boundary is entered and
//! exited. `to_content` is the inverse: entities are applied ordered by
//! offset ascending, ties broken by length descending, so the outer span
//! is materialized first and nesting is deterministic.
//!
//! `to_content` also applies the whitespace-normalization rule: runs of
//! two or more line breaks collapse to a single break node, and each
//! line's leading spaces/tabs become literal non-breaking spaces. Both
//! rules are idempotent, so round-tripping previously round-tripped
//! content is stable.

use crate::content::{ContentNode, Document, SpanNode};
use crate::formatted_text::{Entity, FormattedText};

/// Serialize the content tree into the portable flat model.
pub fn to_formatted_text(doc: &Document) -> FormattedText {
    let mut text = String::new();
    let mut pos = 0usize;
    let mut entities = Vec::new();
    walk(&doc.children, &mut text, &mut pos, &mut entities, false);
    let mut ft = FormattedText::new(text, entities);
    ft.sort_entities();
    ft
}

fn walk(
    nodes: &[ContentNode],
    text: &mut String,
    pos: &mut usize,
    entities: &mut Vec<Entity>,
    in_literal: bool,
) {
    for node in nodes {
        match node {
            ContentNode::Text(s) => {
                text.push_str(s);
                *pos += s.chars().count();
            }
            ContentNode::LineBreak => {
                text.push('\n');
                *pos += 1;
            }
            ContentNode::Span(span) => {
                if in_literal {
                    // Text inside Code/Pre is literal: flatten any nested
                    // span to its text and record no entity.
                    walk(&span.children, text, pos, entities, true);
                } else {
                    let start = *pos;
                    let literal = span.kind.is_literal();
                    walk(&span.children, text, pos, entities, literal);
                    if *pos > start {
                        entities.push(Entity::with_payload(
                            span.kind,
                            start,
                            *pos - start,
                            span.payload.clone(),
                        ));
                    }
                }
            }
        }
    }
}

/// Materialize a content tree from the flat model.
///
/// Entities that violate the model invariants (partial overlap, nesting
/// inside a Code/Pre span, out of bounds) are skipped with a warning
/// rather than corrupting the tree.
pub fn to_content(ft: &FormattedText) -> Document {
    let (chars, entities) = normalize(ft);
    let children = build_nodes(&chars, 0, &entities);
    Document::new(children)
}

/// Apply the whitespace-normalization rule and remap entity offsets
/// across it. Positions inside a collapsed break run map past the break.
fn normalize(ft: &FormattedText) -> (Vec<char>, Vec<Entity>) {
    let chars: Vec<char> = ft.text.chars().collect();
    let mut out: Vec<char> = Vec::with_capacity(chars.len());
    let mut map = vec![0usize; chars.len() + 1];
    let mut at_line_start = true;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            let mut j = i + 1;
            while j < chars.len() && chars[j] == '\n' {
                j += 1;
            }
            map[i] = out.len();
            out.push('\n');
            for k in (i + 1)..j {
                map[k] = out.len();
            }
            i = j;
            at_line_start = true;
        } else {
            map[i] = out.len();
            if at_line_start && (c == ' ' || c == '\t') {
                out.push('\u{A0}');
            } else {
                if c != '\u{A0}' {
                    at_line_start = false;
                }
                out.push(c);
            }
            i += 1;
        }
    }
    map[chars.len()] = out.len();

    let mut entities: Vec<Entity> = ft
        .entities
        .iter()
        .filter_map(|e| {
            let offset = map[e.offset.min(chars.len())];
            let end = map[e.end().min(chars.len())];
            if end > offset {
                let mut e = e.clone();
                e.offset = offset;
                e.length = end - offset;
                Some(e)
            } else {
                None
            }
        })
        .collect();
    entities.sort_by(|a, b| {
        a.offset.cmp(&b.offset).then(b.length.cmp(&a.length))
    });
    (out, entities)
}

/// Build the nodes for `chars` (document positions `[base, base+len)`),
/// consuming the entities that lie within that range.
fn build_nodes(
    chars: &[char],
    base: usize,
    entities: &[Entity],
) -> Vec<ContentNode> {
    let mut nodes = Vec::new();
    let end = base + chars.len();
    let mut pos = base;
    let mut i = 0;
    while i < entities.len() {
        let e = &entities[i];
        if e.offset < pos || e.end() > end {
            tracing::warn!(
                kind = ?e.kind,
                offset = e.offset,
                length = e.length,
                "skipping entity with invalid span"
            );
            i += 1;
            continue;
        }
        push_text_nodes(&chars[pos - base..e.offset - base], &mut nodes);

        // Collect the entities nested inside this one.
        let mut inner = Vec::new();
        let mut j = i + 1;
        while j < entities.len() && entities[j].offset < e.end() {
            if entities[j].end() <= e.end() {
                inner.push(entities[j].clone());
            } else {
                tracing::warn!(
                    kind = ?entities[j].kind,
                    offset = entities[j].offset,
                    "skipping partially overlapping entity"
                );
            }
            j += 1;
        }

        let seg = &chars[e.offset - base..e.end() - base];
        let children = if e.kind.is_literal() {
            if !inner.is_empty() {
                tracing::warn!(
                    kind = ?e.kind,
                    offset = e.offset,
                    "dropping entities nested inside a literal span"
                );
            }
            push_text_nodes_vec(seg)
        } else {
            build_nodes(seg, e.offset, &inner)
        };
        if !children.is_empty() {
            nodes.push(ContentNode::Span(SpanNode::new(
                e.kind,
                e.payload.clone(),
                children,
            )));
        }
        pos = e.end();
        i = j;
    }
    push_text_nodes(&chars[pos - base..], &mut nodes);
    nodes
}

fn push_text_nodes(chars: &[char], nodes: &mut Vec<ContentNode>) {
    let mut run = String::new();
    for &c in chars {
        if c == '\n' {
            if !run.is_empty() {
                nodes.push(ContentNode::Text(std::mem::take(&mut run)));
            }
            nodes.push(ContentNode::LineBreak);
        } else {
            run.push(c);
        }
    }
    if !run.is_empty() {
        nodes.push(ContentNode::Text(run));
    }
}

fn push_text_nodes_vec(chars: &[char]) -> Vec<ContentNode> {
    let mut nodes = Vec::new();
    push_text_nodes(chars, &mut nodes);
    nodes
}
