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

//! Clipboard ingestion. Markup is parsed and reduced to the entity
//! model through an allow-list; anything that cannot be represented
//! degrades to plain text rather than erroring out of the engine.

mod convert;
mod parser;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::formatted_text::FormattedText;
use crate::update::ComposerUpdate;

/// What landed on the clipboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PastePayload {
    /// HTML markup, e.g. copied from a browser or word processor.
    Markup(String),
    Plain(String),
    /// Non-text data; handed to the host's attachment pipeline untouched.
    Binary { mime: String },
}

/// What became of a paste.
#[derive(Clone, Debug, PartialEq)]
pub enum PasteResult {
    Update(ComposerUpdate),
    Attachment { mime: String },
}

#[derive(Clone, Debug, Error)]
pub enum PasteError {
    #[error("pasted markup could not be represented: {0}")]
    UnsupportedMarkup(String),
}

// Word processors prepend <meta> headers that confuse fragment parsing.
static META_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<meta[^>]*>").unwrap());

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Reduce pasted markup to a formatted fragment.
pub fn sanitize_markup(html: &str) -> Result<FormattedText, PasteError> {
    let html = META_TAG.replace_all(html, "");
    let dom = parser::parse(&html)
        .map_err(|e| PasteError::UnsupportedMarkup(e.reasons.join("; ")))?;
    Ok(convert::convert(&dom))
}

/// The fallback when markup cannot be sanitized: drop every tag and
/// decode character references, keeping the visible text.
pub(crate) fn strip_tags(html: &str) -> String {
    let stripped = ANY_TAG.replace_all(html, "");
    html_escape::decode_html_entities(stripped.as_ref()).into_owned()
}
