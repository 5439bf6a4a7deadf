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

//! The live, hierarchical content tree the composer edits.
//!
//! Text nodes hold literal runs, line breaks are explicit nodes so
//! line-based caret math stays measurable, and entity spans are container
//! nodes whose children render as the span's display text.

use crate::formatted_text::{char_len, EntityKind, EntityPayload};

/// One node of the content tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentNode {
    Text(String),
    LineBreak,
    Span(SpanNode),
}

/// An entity container node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanNode {
    pub kind: EntityKind,
    pub payload: EntityPayload,
    pub children: Vec<ContentNode>,
}

impl SpanNode {
    pub fn new(
        kind: EntityKind,
        payload: EntityPayload,
        children: Vec<ContentNode>,
    ) -> Self {
        Self {
            kind,
            payload,
            children,
        }
    }

    /// A span over a single text run.
    pub fn over_text(
        kind: EntityKind,
        payload: EntityPayload,
        text: impl Into<String>,
    ) -> Self {
        Self::new(kind, payload, vec![ContentNode::Text(text.into())])
    }
}

impl ContentNode {
    /// Rendered (display) length of this node in codepoints.
    pub fn char_len(&self) -> usize {
        match self {
            ContentNode::Text(s) => char_len(s),
            ContentNode::LineBreak => 1,
            ContentNode::Span(span) => {
                span.children.iter().map(ContentNode::char_len).sum()
            }
        }
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            ContentNode::Text(s) => out.push_str(s),
            ContentNode::LineBreak => out.push('\n'),
            ContentNode::Span(span) => {
                for child in &span.children {
                    child.push_plain_text(out);
                }
            }
        }
    }
}

/// The root of a composer's content.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Document {
    pub children: Vec<ContentNode>,
}

impl Document {
    pub fn new(children: Vec<ContentNode>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Rendered length of the whole document in codepoints.
    pub fn char_len(&self) -> usize {
        self.children.iter().map(ContentNode::char_len).sum()
    }

    /// The plain-text rendering, line breaks as `\n`.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            node.push_plain_text(&mut out);
        }
        out
    }
}
