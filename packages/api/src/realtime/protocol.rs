//! Phoenix channel frames as spoken by the realtime endpoint.
//!
//! | Event | Direction | Payload |
//! |-------|-----------|---------|
//! | `phx_join` | out | `postgres_changes` config for one table |
//! | `phx_leave` | out | empty |
//! | `heartbeat` | out | empty, topic `phoenix` |
//! | `phx_reply` | in | `{status, response}` acknowledging a join/heartbeat |
//! | `postgres_changes` | in | `{data: {type, table, record, old_record}}` |
//! | `INSERT` / `UPDATE` / `DELETE` | in | legacy per-row events with `{type, table, record}` |

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;

pub const PHOENIX_TOPIC: &str = "phoenix";
pub const SCHEMA: &str = "public";

pub fn topic_for(table: &str) -> String {
    format!("realtime:{SCHEMA}:{table}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl Frame {
    pub fn join(table: &str, reference: u64, access_token: Option<&str>) -> Self {
        let mut payload = json!({
            "config": {
                "postgres_changes": [
                    { "event": "*", "schema": SCHEMA, "table": table }
                ]
            }
        });
        if let Some(token) = access_token {
            payload["access_token"] = Value::String(token.to_string());
        }
        Self {
            topic: topic_for(table),
            event: "phx_join".to_string(),
            payload,
            reference: Some(reference.to_string()),
        }
    }

    pub fn leave(topic: &str, reference: u64) -> Self {
        Self {
            topic: topic.to_string(),
            event: "phx_leave".to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    pub fn heartbeat(reference: u64) -> Self {
        Self {
            topic: PHOENIX_TOPIC.to_string(),
            event: "heartbeat".to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    pub fn encode(&self) -> Result<String, ApiError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self, ApiError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Error text of a `phx_reply` whose status is not `ok`.
    pub fn reply_error(&self) -> Option<String> {
        if self.event != "phx_reply" {
            return None;
        }
        let status = self.payload.get("status").and_then(Value::as_str)?;
        (status != "ok").then(|| self.payload.get("response").map(Value::to_string).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "INSERT" => Some(ChangeKind::Insert),
            "UPDATE" => Some(ChangeKind::Update),
            "DELETE" => Some(ChangeKind::Delete),
            _ => None,
        }
    }
}

/// A row change on a watched table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    /// New row for inserts and updates, old row for deletes. `Null` when the
    /// backend withholds it.
    pub record: Value,
}

pub fn change_event(frame: &Frame) -> Option<ChangeEvent> {
    let data = match frame.event.as_str() {
        "postgres_changes" => frame.payload.get("data")?,
        "INSERT" | "UPDATE" | "DELETE" => &frame.payload,
        _ => return None,
    };
    let kind = ChangeKind::parse(data.get("type").and_then(Value::as_str)?)?;
    let table = data.get("table").and_then(Value::as_str)?.to_string();
    let record = match kind {
        ChangeKind::Delete => data.get("old_record"),
        _ => data.get("record"),
    }
    .cloned()
    .unwrap_or(Value::Null);
    Some(ChangeEvent { table, kind, record })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_frame() {
        let text = Frame::join("activities", 1, Some("jwt")).encode().unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["topic"], "realtime:public:activities");
        assert_eq!(value["event"], "phx_join");
        assert_eq!(value["ref"], "1");
        assert_eq!(value["payload"]["access_token"], "jwt");
        assert_eq!(
            value["payload"]["config"]["postgres_changes"][0]["table"],
            "activities"
        );

        let anonymous = Frame::join("activities", 2, None);
        assert!(anonymous.payload.get("access_token").is_none());
    }

    #[test]
    fn test_heartbeat_and_leave() {
        let heartbeat = Frame::heartbeat(7);
        assert_eq!(heartbeat.topic, "phoenix");
        assert_eq!(heartbeat.event, "heartbeat");

        let leave = Frame::leave("realtime:public:gallery", 8);
        assert_eq!(leave.event, "phx_leave");
        assert_eq!(leave.reference.as_deref(), Some("8"));
    }

    #[test]
    fn test_postgres_changes() {
        let frame = Frame::decode(
            r#"{"topic":"realtime:public:profiles","event":"postgres_changes","ref":null,
                "payload":{"data":{"type":"UPDATE","table":"profiles","schema":"public",
                "record":{"id":"a","status":"active"},"old_record":{"id":"a"}}}}"#,
        )
        .unwrap();
        let change = change_event(&frame).unwrap();
        assert_eq!(change.kind, ChangeKind::Update);
        assert_eq!(change.table, "profiles");
        assert_eq!(change.record["status"], "active");
    }

    #[test]
    fn test_legacy_delete_uses_old_record() {
        let frame = Frame::decode(
            r#"{"topic":"realtime:public:gallery","event":"DELETE",
                "payload":{"type":"DELETE","table":"gallery","old_record":{"id":"g1"}}}"#,
        )
        .unwrap();
        let change = change_event(&frame).unwrap();
        assert_eq!(change.kind, ChangeKind::Delete);
        assert_eq!(change.record["id"], "g1");
    }

    #[test]
    fn test_other_events_are_ignored() {
        let reply = Frame::decode(
            r#"{"topic":"phoenix","event":"phx_reply","ref":"3","payload":{"status":"ok","response":{}}}"#,
        )
        .unwrap();
        assert_eq!(change_event(&reply), None);
        assert_eq!(reply.reply_error(), None);

        let failed = Frame::decode(
            r#"{"topic":"realtime:public:x","event":"phx_reply","ref":"4","payload":{"status":"error","response":{"reason":"unmatched topic"}}}"#,
        )
        .unwrap();
        assert!(failed.reply_error().unwrap().contains("unmatched topic"));
    }
}
