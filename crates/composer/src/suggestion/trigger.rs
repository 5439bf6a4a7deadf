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

//! Scans the text preceding the cursor for a registered trigger.
//!
//! All configs compile into one alternation anchored at the end of the
//! pre-cursor text: `(^|\s)(trigger(allowed)*)$`. One `detect` call per
//! (debounced) mutation, no per-config scanning.

use regex::Regex;

use super::{MentionState, TriggerConfig};
use crate::formatted_text::char_len;

pub struct TriggerDetector {
    pattern: Regex,
}

impl TriggerDetector {
    /// Compile the combined matcher. Fails only on a config whose
    /// trigger or extra characters produce an invalid pattern.
    pub fn new(configs: &[TriggerConfig]) -> Result<Self, regex::Error> {
        let alternation = configs
            .iter()
            .map(|c| {
                let mut class = String::from(r"\w");
                for ch in c.extra_chars.chars() {
                    class.push_str(&escape_in_class(ch));
                }
                let trigger = regex::escape(&c.trigger.to_string());
                if c.allow_space {
                    // At most one interior space.
                    format!("(?:{trigger}[{class}]*(?: [{class}]*)?)")
                } else {
                    format!("(?:{trigger}[{class}]*)")
                }
            })
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?:^|\s)({alternation})$"))?;
        Ok(Self { pattern })
    }

    /// Test the text immediately preceding the cursor. A match yields a
    /// fresh session state with `selected_index` 0; offsets are
    /// codepoints into `before_cursor`.
    pub fn detect(&self, before_cursor: &str) -> Option<MentionState> {
        let captures = self.pattern.captures(before_cursor)?;
        let matched = captures.get(1)?;
        let start = char_len(&before_cursor[..matched.start()]);
        let text = matched.as_str();
        let mut chars = text.chars();
        let trigger = chars.next()?;
        Some(MentionState {
            trigger,
            query: chars.as_str().to_string(),
            start,
            end: start + char_len(text),
            selected_index: 0,
        })
    }
}

/// Escape a character for use inside a regex character class.
fn escape_in_class(ch: char) -> String {
    match ch {
        '\\' | ']' | '^' | '-' => format!("\\{ch}"),
        _ => ch.to_string(),
    }
}
