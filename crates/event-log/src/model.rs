use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use feedlab_core_types::{ParticipantId, PostId, SessionId};

/// Action-specific metadata carried on an event.
///
/// The fields the pipeline itself reads are typed; anything else rides in the
/// open `extra` map, which is flattened on the wire.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<PostId>,
    /// Reaction-type tag (`like`, `angry`, ...). Serialized as `type`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl EventMeta {
    pub fn for_post(post_id: PostId) -> Self {
        Self {
            post_id: Some(post_id),
            ..Self::default()
        }
    }

    pub fn with_reaction(mut self, reaction: impl Into<String>) -> Self {
        self.reaction = Some(reaction.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.length = Some(text.chars().count() as u64);
        self.text = Some(text);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// One user- or system-triggered occurrence inside a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<ParticipantId>,
    /// Wall clock at record time; RFC-3339 on the wire.
    #[serde(rename = "timestamp_iso")]
    pub ts_wall: DateTime<Utc>,
    /// Time since session start.
    pub elapsed_ms: u64,
    pub action: String,
    #[serde(flatten)]
    pub meta: EventMeta,
}

impl EventRecord {
    pub fn post_id(&self) -> Option<&PostId> {
        self.meta.post_id.as_ref()
    }

    pub fn is(&self, action: &str) -> bool {
        self.action == action
    }
}
