//! Code-fence grammar for model output.
//!
//! ```text
//! output  := raw | fenced
//! fenced  := "```" [language] NEWLINE body "```"
//! raw     := body
//! ```
//!
//! Surrounding whitespace is ignored. A fence that opens but never closes is an
//! error, not something to guess around.

use serde::de::DeserializeOwned;
use thiserror::Error;

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("model output is empty")]
    Empty,

    #[error("model output opens a code fence that is never closed")]
    UnterminatedFence,

    #[error("model output is not valid JSON: {0}")]
    Json(String),
}

/// Model output after the optional fence has been recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FencedBlock<'a> {
    Raw(&'a str),
    Fenced {
        language: Option<&'a str>,
        body: &'a str,
    },
}

impl<'a> FencedBlock<'a> {
    pub fn body(&self) -> &'a str {
        match self {
            FencedBlock::Raw(body) => body,
            FencedBlock::Fenced { body, .. } => body,
        }
    }
}

/// Recognises an optional markdown code fence with an optional language tag.
pub fn unwrap_code_fence(text: &str) -> Result<FencedBlock<'_>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let Some(after_open) = text.strip_prefix(FENCE) else {
        return Ok(FencedBlock::Raw(text));
    };

    let inner = after_open
        .strip_suffix(FENCE)
        .ok_or(ParseError::UnterminatedFence)?;

    // The info string runs to the first newline. It is a language tag only if it
    // is a bare word; `{"a":1}` on the opening line is body.
    let (language, body) = match inner.split_once('\n') {
        Some((info, rest)) if is_language_tag(info.trim()) => (Some(info.trim()), rest),
        Some((info, rest)) if info.trim().is_empty() => (None, rest),
        _ => (None, inner),
    };

    Ok(FencedBlock::Fenced {
        language,
        body: body.trim(),
    })
}

/// Unwraps the optional fence and deserializes the body.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ParseError> {
    let block = unwrap_code_fence(text)?;
    let body = block.body();
    if body.is_empty() {
        return Err(ParseError::Empty);
    }
    serde_json::from_str(body).map_err(|e| ParseError::Json(e.to_string()))
}

fn is_language_tag(info: &str) -> bool {
    !info.is_empty()
        && info
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
}
