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

//! What the host surface must do after a composer call.

use crate::formatted_text::FormattedText;
use crate::suggestion::{MentionState, QueryToken, Suggestion};

/// How the rendered text must change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextUpdate {
    /// Nothing changed.
    Keep,
    /// Only the selection moved.
    Select { start: usize, end: usize },
    /// The whole content was replaced; re-render and place the cursor.
    ReplaceAll {
        text: FormattedText,
        start: usize,
        end: usize,
    },
}

/// How the suggestion list must change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuggestionUpdate {
    /// Leave the list as it is.
    Keep,
    /// Show (or refresh) the list for the active session.
    Show {
        state: MentionState,
        items: Vec<Suggestion>,
    },
    /// Run this query against the host's data source and hand the results
    /// back through `apply_query_results` with the same token.
    Query {
        token: QueryToken,
        trigger: char,
        query: String,
    },
    /// Close the list.
    Hide,
}

/// Returned by every mutating composer method: what the host must
/// re-render, how the suggestion list changes, and whether the commit
/// key produced a message to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposerUpdate {
    pub text_update: TextUpdate,
    pub suggestion: SuggestionUpdate,
    pub send: Option<FormattedText>,
}

impl ComposerUpdate {
    pub fn keep() -> Self {
        Self {
            text_update: TextUpdate::Keep,
            suggestion: SuggestionUpdate::Keep,
            send: None,
        }
    }

    pub fn replace_all(text: FormattedText, start: usize, end: usize) -> Self {
        Self {
            text_update: TextUpdate::ReplaceAll { text, start, end },
            suggestion: SuggestionUpdate::Keep,
            send: None,
        }
    }

    pub fn update_selection(start: usize, end: usize) -> Self {
        Self {
            text_update: TextUpdate::Select { start, end },
            suggestion: SuggestionUpdate::Keep,
            send: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: SuggestionUpdate) -> Self {
        self.suggestion = suggestion;
        self
    }

    pub fn with_send(mut self, text: FormattedText) -> Self {
        self.send = Some(text);
        self
    }
}
