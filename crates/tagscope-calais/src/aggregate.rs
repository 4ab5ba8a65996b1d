//! Cross-batch aggregation of tags, entities and topics
//!
//! Dedup policy differs by group: social tags and topics keep the first
//! record seen for a key, entities keep growing. A repeat entity adds its
//! whole instance payload as one more entry, so an entity's instance count
//! is its first sighting's instances plus one per repeat.

use std::collections::HashMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::model::{RemoteEntity, RemoteTag, RemoteTopic, TaggedItem};

/// Placeholder used for missing key fields
const BLANK: &str = "blank";

/// Dedup key of a social tag: its name
pub fn tag_key(tag: &RemoteTag) -> String {
    tag.name.clone().unwrap_or_else(|| BLANK.to_string())
}

/// Dedup key of an entity: hash of type and name
pub fn entity_key(entity: &RemoteEntity) -> String {
    hash_fields(&[
        entity.entity_type.as_deref().unwrap_or(BLANK),
        entity.name.as_deref().unwrap_or(BLANK),
    ])
}

/// Dedup key of a topic: hash of category name and category
pub fn topic_key(topic: &RemoteTopic) -> String {
    hash_fields(&[
        topic.name.as_deref().unwrap_or(BLANK),
        topic.category.as_deref().unwrap_or(BLANK),
    ])
}

fn hash_fields(fields: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update(field.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

/// Counts of what one response contributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsorbStats {
    pub new_tags: usize,
    pub new_entities: usize,
    pub merged_entities: usize,
    pub new_topics: usize,
    pub dropped: usize,
}

/// Accumulates one file's responses, batch by batch
#[derive(Debug, Clone, Default)]
pub struct TagAggregator {
    tags: HashMap<String, RemoteTag>,
    entities: HashMap<String, RemoteEntity>,
    topics: HashMap<String, RemoteTopic>,
}

impl TagAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a tag unless one with the same key exists
    pub fn add_tag(&mut self, key: String, tag: RemoteTag) -> bool {
        if self.tags.contains_key(&key) {
            return false;
        }
        self.tags.insert(key, tag);
        true
    }

    /// Store an entity, or append its instance payload to the stored one
    ///
    /// Returns `true` when the entity is new.
    pub fn add_entity(&mut self, key: String, entity: RemoteEntity) -> bool {
        match self.entities.get_mut(&key) {
            Some(existing) => {
                existing.instances.push(Value::Array(entity.instances));
                false
            }
            None => {
                self.entities.insert(key, entity);
                true
            }
        }
    }

    /// Store a topic unless one with the same key exists
    pub fn add_topic(&mut self, key: String, topic: RemoteTopic) -> bool {
        if self.topics.contains_key(&key) {
            return false;
        }
        self.topics.insert(key, topic);
        true
    }

    /// Route every item of one response
    pub fn absorb(&mut self, items: Vec<TaggedItem>) -> AbsorbStats {
        let mut stats = AbsorbStats::default();

        for item in items {
            match item {
                TaggedItem::SocialTag(tag) => {
                    if self.add_tag(tag_key(&tag), tag) {
                        stats.new_tags += 1;
                    } else {
                        stats.dropped += 1;
                    }
                }
                TaggedItem::Entity(entity) => {
                    if self.add_entity(entity_key(&entity), entity) {
                        stats.new_entities += 1;
                    } else {
                        stats.merged_entities += 1;
                    }
                }
                TaggedItem::Topic(topic) => {
                    if self.add_topic(topic_key(&topic), topic) {
                        stats.new_topics += 1;
                    } else {
                        stats.dropped += 1;
                    }
                }
            }
        }

        stats
    }

    pub fn tag(&self, key: &str) -> Option<&RemoteTag> {
        self.tags.get(key)
    }

    pub fn entity(&self, key: &str) -> Option<&RemoteEntity> {
        self.entities.get(key)
    }

    pub fn topic(&self, key: &str) -> Option<&RemoteTopic> {
        self.topics.get(key)
    }

    /// Tags sorted by name
    pub fn sorted_tags(&self) -> Vec<&RemoteTag> {
        let mut tags: Vec<&RemoteTag> = self.tags.values().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    /// Entities sorted by name
    pub fn sorted_entities(&self) -> Vec<&RemoteEntity> {
        let mut entities: Vec<&RemoteEntity> = self.entities.values().collect();
        entities.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.entity_type.cmp(&b.entity_type))
        });
        entities
    }

    /// Topics sorted by category name
    pub fn sorted_topics(&self) -> Vec<&RemoteTopic> {
        let mut topics: Vec<&RemoteTopic> = self.topics.values().collect();
        topics.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.category.cmp(&b.category)));
        topics
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.entities.is_empty() && self.topics.is_empty()
    }
}

/// Render a loosely typed field for display
pub(crate) fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}
