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

//! Trigger detection and suggestion matching for mention/hashtag/emoji
//! query sessions.

mod debounce;
mod matcher;
mod trigger;

pub(crate) use debounce::Debouncer;
pub use matcher::{rank, MAX_RESULTS};
pub use trigger::TriggerDetector;

use std::time::Duration;

use crate::formatted_text::EntityKind;

/// Debounce between a content mutation and trigger re-evaluation.
pub const DETECT_DEBOUNCE: Duration = Duration::from_millis(30);
/// Debounce between a keystroke and dispatch of a new async query.
pub const QUERY_DEBOUNCE: Duration = Duration::from_millis(50);

/// One candidate offered for the active trigger session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
    pub id: String,
    pub display: String,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: display.into(),
        }
    }
}

/// Where candidates for a trigger come from.
#[derive(Clone, Debug)]
pub enum SuggestionSource {
    /// A fixed list filtered and ranked synchronously.
    Static(Vec<Suggestion>),
    /// Host-driven: the composer emits [`SuggestionUpdate::Query`] and
    /// the host answers through `apply_query_results`.
    ///
    /// [`SuggestionUpdate::Query`]: crate::SuggestionUpdate::Query
    Query,
}

/// Declarative registration of one trigger character.
#[derive(Clone, Debug)]
pub struct TriggerConfig {
    pub trigger: char,
    pub title: String,
    /// Entity kind written on commit.
    pub kind: EntityKind,
    pub source: SuggestionSource,
    /// Rendered on commit with `{id}` and `{display}` placeholders.
    pub template: String,
    /// Append one NBSP after the inserted fragment.
    pub append_space: bool,
    /// Characters allowed in the query besides word characters.
    pub extra_chars: String,
    /// Allow a single space inside the query.
    pub allow_space: bool,
}

impl TriggerConfig {
    pub fn new(
        trigger: char,
        title: impl Into<String>,
        kind: EntityKind,
        source: SuggestionSource,
    ) -> Self {
        Self {
            trigger,
            title: title.into(),
            kind,
            source,
            template: "{display}".into(),
            append_space: true,
            extra_chars: "_-".into(),
            allow_space: false,
        }
    }
}

/// The active suggestion session, measured in the codepoint space of the
/// text preceding the cursor. Created when the detector matches;
/// destroyed on commit, Escape, or loss of match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MentionState {
    pub trigger: char,
    pub query: String,
    /// Offset of the trigger character.
    pub start: usize,
    /// Offset one past the last query character (the cursor).
    pub end: usize,
    pub selected_index: usize,
}

/// Generation token guarding one dispatched async query. Results carry
/// it back; anything but the most recently issued token is stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QueryToken(pub(crate) u64);
