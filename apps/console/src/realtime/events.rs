use serde::{Deserialize, Serialize};

/// Entity family an update event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Resume,
    Job,
    Match,
}

impl EntityKind {
    pub fn event_name(self) -> &'static str {
        match self {
            EntityKind::Resume => "resume:update",
            EntityKind::Job => "job:update",
            EntityKind::Match => "match:update",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "resume:update" => Some(EntityKind::Resume),
            "job:update" => Some(EntityKind::Job),
            "match:update" => Some(EntityKind::Match),
            _ => None,
        }
    }
}

/// Body of an update event. Only a hint: it names the entity that changed
/// and what the server knew at emit time, never the full record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "updatedAt", alias = "updated_at")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl UpdatePayload {
    pub fn for_id(id: impl Into<String>) -> Self {
        UpdatePayload {
            id: id.into(),
            status: None,
            updated_at: None,
            title: None,
        }
    }
}

/// Parsed update event, as fanned out to watchers.
#[derive(Debug, Clone)]
pub struct UpdateEvent {
    pub kind: EntityKind,
    pub payload: UpdatePayload,
}

/// Wire shape of one realtime frame: `{"event": "...", "data": {...}}`.
/// Serialization exists so test servers can emit frames.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl UpdateEvent {
    /// Decode one text frame. Frames that are not JSON, name an event we do
    /// not track (acks, server notices), or carry an unusable payload are
    /// dropped with `None`; the channel stays up regardless of what arrives.
    pub fn parse_frame(text: &str) -> Option<UpdateEvent> {
        let frame: EventFrame = serde_json::from_str(text).ok()?;
        let kind = EntityKind::from_event_name(&frame.event)?;
        let payload: UpdatePayload = serde_json::from_value(frame.data).ok()?;
        if payload.id.is_empty() {
            return None;
        }
        Some(UpdateEvent { kind, payload })
    }

    /// Encode as a wire frame (test helper for mock servers).
    pub fn to_frame(&self) -> String {
        let frame = EventFrame {
            event: self.kind.event_name().to_string(),
            data: serde_json::to_value(&self.payload).unwrap_or(serde_json::Value::Null),
        };
        serde_json::to_string(&frame).unwrap_or_default()
    }
}
