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
use crate::update::{ComposerUpdate, SuggestionUpdate};

/// Keys with composer-level behavior. Plain character input goes through
/// `replace_text` instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Tab,
    Escape,
    ArrowUp,
    ArrowDown,
}

/// Modifier state at the time of the keypress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Which Enter combination commits the message. The opposite
/// combination inserts a literal line break.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SendKey {
    #[default]
    Enter,
    ModifierEnter,
}

impl Composer {
    /// Route a special keypress. While a suggestion session is active
    /// the arrows, Enter, Tab and Escape belong to the list; Enter never
    /// both commits a suggestion and sends.
    pub fn key_down(
        &mut self,
        key: Key,
        modifiers: Modifiers,
    ) -> ComposerUpdate {
        if self.mention_state.is_some() {
            match key {
                Key::ArrowDown => return self.cycle_selection(1),
                Key::ArrowUp => return self.cycle_selection(-1),
                Key::Enter | Key::Tab => {
                    let Some(selected) = self
                        .mention_state
                        .as_ref()
                        .and_then(|s| self.suggestions.get(s.selected_index))
                        .cloned()
                    else {
                        return ComposerUpdate::keep();
                    };
                    return self.insert_suggestion(&selected);
                }
                Key::Escape => {
                    self.clear_session();
                    return ComposerUpdate::keep()
                        .with_suggestion(SuggestionUpdate::Hide);
                }
            }
        }

        match key {
            Key::Enter => {
                let wants_send = match self.send_key {
                    SendKey::Enter => !modifiers.any(),
                    SendKey::ModifierEnter => modifiers.any(),
                };
                if wants_send {
                    if self.doc.is_empty() {
                        return ComposerUpdate::keep();
                    }
                    ComposerUpdate::keep().with_send(self.get_formatted_text())
                } else {
                    self.insert_line_break()
                }
            }
            _ => ComposerUpdate::keep(),
        }
    }

    /// Move the highlighted row, wrapping at either end.
    fn cycle_selection(&mut self, step: isize) -> ComposerUpdate {
        let len = self.suggestions.len();
        let Some(state) = self.mention_state.as_mut() else {
            return ComposerUpdate::keep();
        };
        if len == 0 {
            return ComposerUpdate::keep();
        }
        state.selected_index =
            (state.selected_index as isize + step).rem_euclid(len as isize)
                as usize;
        let state = state.clone();
        ComposerUpdate::keep().with_suggestion(SuggestionUpdate::Show {
            state,
            items: self.suggestions.clone(),
        })
    }
}
