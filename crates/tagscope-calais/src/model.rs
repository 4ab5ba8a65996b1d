//! Open Calais response model
//!
//! The enrichment response is a JSON object keyed by opaque item ids. Each
//! item carries a `_typeGroup` discriminator; a top-level `doc` entry
//! describes the submission and is ignored.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Social tag suggestion
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteTag {
    #[serde(rename = "_typeGroup", default)]
    pub group: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub importance: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "socialTag", default)]
    pub social_tag: Option<String>,
}

/// Named entity with its occurrences in the submitted text
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteEntity {
    #[serde(rename = "_type", default)]
    pub entity_type: Option<String>,
    #[serde(rename = "_typeGroup", default)]
    pub group: Option<String>,
    #[serde(rename = "_typeReference", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub relevance: Option<Value>,
    /// Instance records, accumulated across repeat sightings
    #[serde(default, deserialize_with = "instance_list")]
    pub instances: Vec<Value>,
    #[serde(default)]
    pub resolutions: Option<Value>,
    #[serde(default)]
    pub nationality: Option<Value>,
}

/// Topic classification
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteTopic {
    #[serde(rename = "_typeGroup", default)]
    pub group: Option<String>,
    #[serde(rename = "categoryName", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "zero_score")]
    pub score: Value,
}

fn zero_score() -> Value {
    Value::from(0)
}

fn instance_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    })
}

/// One item of a response, routed by `_typeGroup`
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedItem {
    SocialTag(RemoteTag),
    Entity(RemoteEntity),
    Topic(RemoteTopic),
}

impl TaggedItem {
    /// Discriminator value this item was decoded from
    pub fn group(&self) -> &'static str {
        match self {
            Self::SocialTag(_) => "socialTag",
            Self::Entity(_) => "entities",
            Self::Topic(_) => "topics",
        }
    }
}

/// Decode a response body into its items
///
/// Items with an unknown or missing `_typeGroup`, or whose fields have
/// unexpected types, are skipped. `\uXXXX` escapes of unpaired UTF-16
/// surrogates are removed before decoding. Only a body that is not a JSON
/// object is an error.
pub fn parse_response(body: &str) -> Result<Vec<TaggedItem>, serde_json::Error> {
    let body = drop_lone_surrogates(body);
    let value: Value = serde_json::from_str(&body)?;
    let Value::Object(mut items) = value else {
        return Err(serde::de::Error::custom("response is not a JSON object"));
    };
    items.remove("doc");

    let mut parsed = Vec::with_capacity(items.len());
    for (id, item) in items {
        let group = item
            .get("_typeGroup")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let decoded = match group.as_str() {
            "socialTag" => serde_json::from_value(item).map(TaggedItem::SocialTag),
            "entities" => serde_json::from_value(item).map(TaggedItem::Entity),
            "topics" => serde_json::from_value(item).map(TaggedItem::Topic),
            other => {
                tracing::trace!("skipping item {} in group {:?}", id, other);
                continue;
            }
        };

        match decoded {
            Ok(tagged) => parsed.push(tagged),
            Err(e) => tracing::debug!("skipping malformed {} item {}: {}", group, id, e),
        }
    }

    Ok(parsed)
}

/// Remove `\uD800`-`\uDFFF` escapes that are not a high/low pair
fn drop_lone_surrogates(body: &str) -> Cow<'_, str> {
    if !body.contains("\\u") {
        return Cow::Borrowed(body);
    }

    let bytes = body.as_bytes();
    let mut cleaned = String::with_capacity(body.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }

        let Some(unit) = escaped_unit(bytes, i) else {
            // any other escape, including an escaped backslash
            i += 2;
            continue;
        };

        let paired = (0xD800..0xDC00).contains(&unit)
            && escaped_unit(bytes, i + 6).is_some_and(|low| (0xDC00..0xE000).contains(&low));
        if paired {
            i += 12;
        } else if (0xD800..0xE000).contains(&unit) {
            cleaned.push_str(&body[copied..i]);
            i += 6;
            copied = i;
        } else {
            i += 6;
        }
    }

    if copied == 0 {
        return Cow::Borrowed(body);
    }
    tracing::debug!("dropped unpaired surrogate escapes from response");
    cleaned.push_str(&body[copied..]);
    Cow::Owned(cleaned)
}

/// Code unit of a `\uXXXX` escape starting at `at`
fn escaped_unit(bytes: &[u8], at: usize) -> Option<u16> {
    let escape = bytes.get(at..at + 6)?;
    if escape[0] != b'\\' || escape[1] != b'u' {
        return None;
    }
    let hex = std::str::from_utf8(&escape[2..]).ok()?;
    u16::from_str_radix(hex, 16).ok()
}
