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

//! The portable formatted-text model: plain text plus typed,
//! offset-addressed entities.
//!
//! All offsets and lengths are counted in Unicode scalar values
//! (codepoints), applied consistently across the serializer, the trigger
//! detector and the inserter.

use strum_macros::{AsRefStr, EnumIter};
use thiserror::Error;

/// Count the codepoints of a string slice.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the codepoint at `idx`, or `s.len()` when past the end.
pub(crate) fn byte_of_char(s: &str, idx: usize) -> usize {
    s.char_indices()
        .nth(idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}

/// The formatting or inline-object kind a span of text carries.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr, EnumIter,
)]
pub enum EntityKind {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Pre,
    Spoiler,
    Blockquote,
    MentionUser,
    MentionRole,
    Hashtag,
    CustomEmoji,
    Link,
}

impl EntityKind {
    /// Code and Pre spans contain literal text: no other entity may
    /// appear inside them.
    pub fn is_literal(&self) -> bool {
        matches!(self, EntityKind::Code | EntityKind::Pre)
    }

    /// Inline objects whose display text stands in for an underlying id.
    /// Editing inside them breaks the object, so splices drop the entity
    /// rather than stretching it.
    pub fn is_inline_object(&self) -> bool {
        matches!(
            self,
            EntityKind::MentionUser
                | EntityKind::MentionRole
                | EntityKind::CustomEmoji
        )
    }
}

/// Kind-specific entity data.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum EntityPayload {
    #[default]
    None,
    UserId(String),
    RoleId(String),
    Url(String),
    Language(String),
    DocumentId(String),
}

/// A typed span over `[offset, offset + length)` of the plain text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub offset: usize,
    pub length: usize,
    pub payload: EntityPayload,
}

impl Entity {
    pub fn new(kind: EntityKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            offset,
            length,
            payload: EntityPayload::None,
        }
    }

    pub fn with_payload(
        kind: EntityKind,
        offset: usize,
        length: usize,
        payload: EntityPayload,
    ) -> Self {
        Self {
            kind,
            offset,
            length,
            payload,
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Why a [`FormattedText`] failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormattedTextError {
    #[error("entity [{offset}, {end}) exceeds text length {len}")]
    OutOfBounds { offset: usize, end: usize, len: usize },
    #[error("entities are not ordered by offset")]
    Unordered,
    #[error("entities at offsets {0} and {1} partially overlap")]
    PartialOverlap(usize, usize),
    #[error("entity nested inside a Code/Pre span at offset {0}")]
    NestedInLiteral(usize),
}

/// Plain text with an ordered list of entities. The portable
/// representation handed to callers for storage and transmission.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FormattedText {
    pub text: String,
    pub entities: Vec<Entity>,
}

impl FormattedText {
    pub fn new(text: impl Into<String>, entities: Vec<Entity>) -> Self {
        Self {
            text: text.into(),
            entities,
        }
    }

    /// Plain text with no entities.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entities: Vec::new(),
        }
    }

    /// Length of the text in codepoints.
    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Sort entities into canonical order: offset ascending, ties broken
    /// by length descending so the outer span comes first.
    pub fn sort_entities(&mut self) {
        self.entities.sort_by(|a, b| {
            a.offset
                .cmp(&b.offset)
                .then(b.length.cmp(&a.length))
                .then(a.kind.cmp(&b.kind))
        });
    }

    /// Check the model invariants: bounds, canonical ordering, proper
    /// nesting (no partial overlap) and literal Code/Pre spans.
    pub fn validate(&self) -> Result<(), FormattedTextError> {
        let len = self.char_len();
        let mut prev_offset = 0;
        for e in &self.entities {
            if e.end() > len {
                return Err(FormattedTextError::OutOfBounds {
                    offset: e.offset,
                    end: e.end(),
                    len,
                });
            }
            if e.offset < prev_offset {
                return Err(FormattedTextError::Unordered);
            }
            prev_offset = e.offset;
        }
        for (i, a) in self.entities.iter().enumerate() {
            for b in &self.entities[i + 1..] {
                if b.offset >= a.end() {
                    break;
                }
                // b starts inside a: it must end inside a too
                if b.end() > a.end() {
                    return Err(FormattedTextError::PartialOverlap(
                        a.offset, b.offset,
                    ));
                }
                if a.kind.is_literal() {
                    return Err(FormattedTextError::NestedInLiteral(
                        b.offset,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Replace codepoints `[start, end)` with `replacement`, keeping the
    /// entity list consistent.
    ///
    /// Entities fully inside the removed range are dropped; entities
    /// straddling a boundary are truncated to the surviving side; entities
    /// containing the whole range stretch or shrink with it, except inline
    /// objects (mentions, custom emoji) whose interior was touched, which
    /// are dropped.
    pub fn splice(&mut self, start: usize, end: usize, replacement: &str) {
        debug_assert!(start <= end);
        let b_start = byte_of_char(&self.text, start);
        let b_end = byte_of_char(&self.text, end);
        self.text.replace_range(b_start..b_end, replacement);

        let removed = end - start;
        let added = char_len(replacement);

        self.entities.retain_mut(|e| {
            let e_start = e.offset;
            let e_end = e.end();
            if e_end <= start {
                // Entirely before the splice (includes an insert right at
                // the entity's end, which does not extend it).
                true
            } else if e_start >= end {
                // Entirely after: shift.
                e.offset = e_start - removed + added;
                true
            } else if e_start <= start && e_end >= end {
                // Contains the spliced range.
                if e.kind.is_inline_object() {
                    if removed == 0 && start == e_start {
                        // Insert right before the object: shift it.
                        e.offset += added;
                        true
                    } else {
                        // Interior touched: the object is broken.
                        false
                    }
                } else {
                    e.length = e.length - removed + added;
                    e.length > 0
                }
            } else if e_start < start {
                // Straddles the left boundary: keep the head.
                e.length = start - e_start;
                !e.kind.is_inline_object() && e.length > 0
            } else {
                // Straddles the right boundary: keep the tail.
                e.offset = start + added;
                e.length = e_end - end;
                !e.kind.is_inline_object() && e.length > 0
            }
        });
        self.sort_entities();
    }

    /// Insert another formatted-text fragment at codepoint `at`, shifting
    /// and merging its entities into this one.
    pub fn insert_fragment(&mut self, at: usize, fragment: &FormattedText) {
        self.splice(at, at, &fragment.text);
        for e in &fragment.entities {
            let mut e = e.clone();
            e.offset += at;
            self.entities.push(e);
        }
        self.sort_entities();
    }
}
