use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TITLE_KEY: &str = "title";

const PAIR_SEPARATOR: char = '|';
const KEY_VALUE_SEPARATOR: char = '=';
const ESCAPE: char = '\\';

/// Key-value annotations attached to a stored asset.
///
/// Kept as a typed map inside the application and only flattened into the
/// media service's `key=value|key=value` form at the wire boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetContext(BTreeMap<String, String>);

impl AssetContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        let mut context = Self::new();
        context.insert(TITLE_KEY, title);
        context
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(TITLE_KEY)
    }

    /// Encodes the map as `key=value|key=value`, escaping `\`, `=` and `|`.
    pub fn to_wire(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{}={}", escape(key), escape(value)))
            .collect::<Vec<_>>()
            .join("|")
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, ESCAPE | KEY_VALUE_SEPARATOR | PAIR_SEPARATOR) {
            escaped.push(ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}
