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

//! A platform-independent editing engine for formatted chat messages.
//!
//! The engine owns the message content as a tree of text runs, line
//! breaks and entity spans, and exposes a flat view of it as plain text
//! plus `(kind, offset, length)` entities. Hosts feed it keystrokes,
//! selection moves, clipboard payloads and suggestion results; every
//! mutating call returns a [`ComposerUpdate`] describing what the
//! surface must re-render.
//!
//! All offsets in the public API are Unicode codepoints. Deleting by one
//! position is grapheme-aware, so a multi-codepoint emoji disappears in
//! a single backspace.
//!
//! ```
//! use composer::{Composer, EntityKind, SendKey, Suggestion, SuggestionSource, TriggerConfig};
//!
//! let config = TriggerConfig::new(
//!     '@',
//!     "Mentions",
//!     EntityKind::MentionUser,
//!     SuggestionSource::Static(vec![Suggestion::new("u1", "Alice")]),
//! );
//! let mut composer = Composer::new(vec![config], SendKey::Enter).unwrap();
//! composer.replace_text("hello");
//! assert_eq!(composer.get_content_as_plain_text(), "hello");
//! ```

pub mod composer;
pub mod content;
pub mod formatted_text;
pub mod history;
pub mod paste;
pub mod serializer;
pub mod suggestion;
pub mod update;

pub use crate::composer::{
    CaretHandle, Composer, ComposerError, Key, Modifiers, SendKey,
};
pub use crate::content::{ContentNode, Document, SpanNode};
pub use crate::formatted_text::{
    Entity, EntityKind, EntityPayload, FormattedText, FormattedTextError,
};
pub use crate::history::{EditHistory, HistoryEntry, DEFAULT_HISTORY_LIMIT};
pub use crate::paste::{
    sanitize_markup, PasteError, PastePayload, PasteResult,
};
pub use crate::serializer::{to_content, to_formatted_text};
pub use crate::suggestion::{
    rank, MentionState, QueryToken, Suggestion, SuggestionSource,
    TriggerConfig, TriggerDetector, DETECT_DEBOUNCE, MAX_RESULTS,
    QUERY_DEBOUNCE,
};
pub use crate::update::{ComposerUpdate, SuggestionUpdate, TextUpdate};
