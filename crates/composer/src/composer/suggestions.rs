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

use std::time::Instant;

use super::Composer;
use crate::formatted_text::{byte_of_char, FormattedText};
use crate::suggestion::{rank, QueryToken, Suggestion, SuggestionSource, MAX_RESULTS};
use crate::update::{ComposerUpdate, SuggestionUpdate};

impl Composer {
    /// Hand back the results of a dispatched query. Results carrying
    /// anything but the most recently issued token are stale and are
    /// discarded unconditionally.
    pub fn apply_query_results(
        &mut self,
        token: QueryToken,
        items: Vec<Suggestion>,
    ) -> ComposerUpdate {
        if self.torn_down || self.active_token != Some(token) {
            tracing::debug!(?token, "discarding stale suggestion results");
            return ComposerUpdate::keep();
        }
        let Some(state) = self.mention_state.as_mut() else {
            return ComposerUpdate::keep();
        };
        let mut items = items;
        items.truncate(MAX_RESULTS);
        state.selected_index =
            state.selected_index.min(items.len().saturating_sub(1));
        let state = state.clone();
        self.suggestions = items.clone();
        ComposerUpdate::keep()
            .with_suggestion(SuggestionUpdate::Show { state, items })
    }

    /// Report a failed query. The list is cleared but the session stays
    /// alive and the composer remains usable.
    pub fn fail_query(&mut self, token: QueryToken) -> ComposerUpdate {
        if self.torn_down || self.active_token != Some(token) {
            return ComposerUpdate::keep();
        }
        tracing::warn!(?token, "suggestion query failed, clearing the list");
        self.suggestions.clear();
        match self.mention_state.clone() {
            Some(state) => ComposerUpdate::keep().with_suggestion(
                SuggestionUpdate::Show {
                    state,
                    items: Vec::new(),
                },
            ),
            None => ComposerUpdate::keep(),
        }
    }

    /// Re-run the detector over the pre-cursor text. Fired from `poll`
    /// after the detection debounce.
    pub(crate) fn evaluate_trigger(&mut self, now: Instant) -> SuggestionUpdate {
        let text = self.formatted();
        let cursor = self.sel_start();
        let before = &text.text[..byte_of_char(&text.text, cursor)];

        let detected = if self.has_selection() {
            None
        } else {
            self.detector
                .detect(before)
                .filter(|s| !overlaps_literal(&text, s.start, cursor))
        };

        let Some(mut state) = detected else {
            if self.mention_state.is_some() {
                self.clear_session();
                return SuggestionUpdate::Hide;
            }
            return SuggestionUpdate::Keep;
        };

        // The same session continuing keeps its highlighted row.
        let continuing = self.mention_state.as_ref().is_some_and(|prev| {
            prev.trigger == state.trigger && prev.start == state.start
        });
        if continuing {
            if let Some(prev) = &self.mention_state {
                state.selected_index = prev.selected_index;
            }
        }
        let query_changed = !continuing
            || self
                .mention_state
                .as_ref()
                .is_some_and(|prev| prev.query != state.query);

        let Some(config) =
            self.configs.iter().find(|c| c.trigger == state.trigger)
        else {
            // The detector only matches registered triggers.
            return SuggestionUpdate::Keep;
        };

        match &config.source {
            SuggestionSource::Static(candidates) => {
                let items = rank(candidates, &state.query, MAX_RESULTS);
                state.selected_index =
                    state.selected_index.min(items.len().saturating_sub(1));
                self.mention_state = Some(state.clone());
                self.suggestions = items.clone();
                SuggestionUpdate::Show { state, items }
            }
            SuggestionSource::Query => {
                self.mention_state = Some(state);
                if query_changed {
                    self.query_debounce.schedule(now);
                }
                SuggestionUpdate::Keep
            }
        }
    }

    /// Issue a fresh token for the current session's query. Fired from
    /// `poll` after the query debounce.
    pub(crate) fn dispatch_query(&mut self) -> Option<SuggestionUpdate> {
        let state = self.mention_state.as_ref()?;
        self.next_token += 1;
        let token = QueryToken(self.next_token);
        self.active_token = Some(token);
        Some(SuggestionUpdate::Query {
            token,
            trigger: state.trigger,
            query: state.query.clone(),
        })
    }
}

/// Whether any Code/Pre span overlaps `[start, cursor)`; triggers typed
/// inside literal text stay literal.
fn overlaps_literal(text: &FormattedText, start: usize, cursor: usize) -> bool {
    text.entities.iter().any(|e| {
        e.kind.is_literal() && e.offset < cursor.max(start + 1) && e.end() > start
    })
}
