//! Event, fact, joke, and quote records.
//!
//! Events are addressed by their `title` (a caller-supplied natural key,
//! mutable via update, duplicates tolerated). All other collections carry a
//! store-assigned immutable `id`. Patch types carry only the fields a partial
//! update supplies; everything else keeps its prior value.

use serde::{Deserialize, Serialize};

/// A club event. `title` doubles as the record identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub title: String,
    /// ISO-8601 timestamp, with or without a UTC offset.
    pub date: String,
    pub description: String,
    pub location: String,
}

/// Partial update for an event. A supplied `title` renames the record;
/// the old title stops resolving afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A cybersecurity fact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
}

impl Fact {
    pub fn new(content: impl Into<String>) -> Self {
        Self { id: None, content: content.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A cybersecurity joke.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Joke {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
}

impl Joke {
    pub fn new(content: impl Into<String>) -> Self {
        Self { id: None, content: content.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JokePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A quote with attribution. Author defaults to "Unknown".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
    #[serde(default = "default_author")]
    pub author: String,
}

fn default_author() -> String {
    "Unknown".into()
}

impl Quote {
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self { id: None, content: content.into(), author: author.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_author_defaults_to_unknown() {
        let q: Quote = serde_json::from_str(r#"{"content":"trust, but verify"}"#)
            .expect("quote without author parses");
        assert_eq!(q.author, "Unknown");
    }

    #[test]
    fn test_fact_id_omitted_when_absent() {
        let json = serde_json::to_string(&Fact::new("DNS runs on port 53"))
            .expect("serialize");
        assert!(!json.contains("\"id\""));
    }

    #[test]
    fn test_event_patch_skips_missing_fields() {
        let patch: EventPatch =
            serde_json::from_str(r#"{"location":"Room B"}"#).expect("patch parses");
        assert_eq!(patch.location.as_deref(), Some("Room B"));
        assert!(patch.title.is_none());
        assert!(patch.date.is_none());
    }
}
