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

//! Ranking for static suggestion lists.
//!
//! Matching is case- and diacritic-insensitive: both sides are folded
//! through NFD with combining marks stripped, then lowercased. Exact
//! matches rank above prefix matches above substring matches; ties break
//! by shorter display text, then lexicographically.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::Suggestion;
use crate::formatted_text::char_len;

/// Default cap on ranked results.
pub const MAX_RESULTS: usize = 10;

/// Fold for matching: strip diacritics, lowercase.
pub(crate) fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Filter and rank `candidates` for `query`, capped at `limit`.
pub fn rank(
    candidates: &[Suggestion],
    query: &str,
    limit: usize,
) -> Vec<Suggestion> {
    let folded_query = fold(query);
    let mut ranked: Vec<(u8, &Suggestion)> = candidates
        .iter()
        .filter_map(|candidate| {
            let folded = fold(&candidate.display);
            let tier = if folded == folded_query {
                0
            } else if folded.starts_with(&folded_query) {
                1
            } else if folded.contains(&folded_query) {
                2
            } else {
                return None;
            };
            Some((tier, candidate))
        })
        .collect();
    ranked.sort_by(|(tier_a, a), (tier_b, b)| {
        tier_a
            .cmp(tier_b)
            .then(char_len(&a.display).cmp(&char_len(&b.display)))
            .then(a.display.cmp(&b.display))
    });
    ranked
        .into_iter()
        .take(limit)
        .map(|(_, s)| s.clone())
        .collect()
}
