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

//! The composer facade: one editing session over one document.
//!
//! Every mutating method returns a [`ComposerUpdate`] telling the host
//! what to re-render. Timers are deadlines driven by `poll(now)`; async
//! suggestion results re-enter through `apply_query_results` guarded by
//! a generation token.

mod base;
mod insert;
mod keyboard;
mod paste_ops;
mod suggestions;
mod text_ops;
mod undo_redo;

pub use base::CaretHandle;
pub use keyboard::{Key, Modifiers, SendKey};

use thiserror::Error;

use crate::content::Document;
use crate::history::{EditHistory, DEFAULT_HISTORY_LIMIT};
use crate::suggestion::{
    Debouncer, MentionState, QueryToken, Suggestion, TriggerConfig,
    TriggerDetector, DETECT_DEBOUNCE, QUERY_DEBOUNCE,
};

/// Why a composer could not be constructed.
#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("invalid trigger pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("trigger character {0:?} registered twice")]
    DuplicateTrigger(char),
}

pub struct Composer {
    /// The live content tree.
    pub(crate) doc: Document,

    /// Selection bounds in codepoints. Equal when the cursor is collapsed.
    pub(crate) selection_start: usize,
    pub(crate) selection_end: usize,

    pub(crate) configs: Vec<TriggerConfig>,
    pub(crate) detector: TriggerDetector,
    pub(crate) history: EditHistory,
    pub(crate) send_key: SendKey,

    /// The active suggestion session, if any.
    pub(crate) mention_state: Option<MentionState>,
    /// The ranked list currently shown for the session.
    pub(crate) suggestions: Vec<Suggestion>,

    /// Generation counter for async queries; only results carrying
    /// `active_token` are ever applied.
    pub(crate) next_token: u64,
    pub(crate) active_token: Option<QueryToken>,

    pub(crate) detect_debounce: Debouncer,
    pub(crate) query_debounce: Debouncer,

    /// Bumped on every structural mutation; caret handles check it.
    pub(crate) revision: u64,

    pub(crate) torn_down: bool,
}

impl Composer {
    /// Build a composer with the given trigger registrations and commit
    /// key. Fails if two configs share a trigger character or a config
    /// compiles into an invalid pattern.
    pub fn new(
        configs: Vec<TriggerConfig>,
        send_key: SendKey,
    ) -> Result<Self, ComposerError> {
        Self::with_history_limit(configs, send_key, DEFAULT_HISTORY_LIMIT)
    }

    /// Like [`Composer::new`] with a custom undo depth.
    pub fn with_history_limit(
        configs: Vec<TriggerConfig>,
        send_key: SendKey,
        history_limit: usize,
    ) -> Result<Self, ComposerError> {
        for (i, config) in configs.iter().enumerate() {
            if configs[..i].iter().any(|c| c.trigger == config.trigger) {
                return Err(ComposerError::DuplicateTrigger(config.trigger));
            }
        }
        let detector = TriggerDetector::new(&configs)?;
        Ok(Self {
            doc: Document::default(),
            selection_start: 0,
            selection_end: 0,
            configs,
            detector,
            history: EditHistory::new(history_limit),
            send_key,
            mention_state: None,
            suggestions: Vec::new(),
            next_token: 0,
            active_token: None,
            detect_debounce: Debouncer::new(DETECT_DEBOUNCE),
            query_debounce: Debouncer::new(QUERY_DEBOUNCE),
            revision: 0,
            torn_down: false,
        })
    }
}
