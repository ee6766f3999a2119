use serde::{Deserialize, Serialize};
use std::fmt;

use super::assets::StoredAsset;

pub const VIDEO_RESOURCE_TYPE: &str = "video";

/// Search expression understood by the media service's search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchExpression(String);

impl SearchExpression {
    /// `resource_type:video AND folder:<folder>`
    pub fn videos_in_folder(folder: &str) -> Self {
        Self(format!(
            "resource_type:{} AND folder:{}",
            VIDEO_RESOURCE_TYPE,
            quote_if_needed(folder)
        ))
    }

    /// Narrows the expression with a quoted free-text term. Blank terms are ignored.
    pub fn with_text(self, term: &str) -> Self {
        let term = term.trim();
        if term.is_empty() {
            return self;
        }
        Self(format!("{} AND {}", self.0, quote(term)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn quote(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

fn quote_if_needed(raw: &str) -> String {
    if raw
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '/'))
    {
        raw.to_string()
    } else {
        quote(raw)
    }
}

/// One page request against the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub expression: SearchExpression,
    pub max_results: u32,
    pub next_cursor: Option<String>,
}

/// Raw search response: the `resources` array plus pagination details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub resources: Vec<StoredAsset>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub total_count: Option<u64>,
}
