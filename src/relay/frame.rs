use serde::{Deserialize, Deserializer, Serialize};

use crate::pair::{self, Reject};

/// An inbound wire frame, deserialized permissively: unknown fields are
/// ignored and anything but `type` may be absent. Validation into a
/// [`Message`] happens separately so a malformed frame can be dropped
/// without tearing the connection down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub pair_id: Option<String>,
}

impl Frame {
    pub fn is_ping(&self) -> bool {
        self.kind == "ping"
    }

    /// Validate into a message, running pair authorization. Missing required
    /// fields are an authorization failure, not a protocol error.
    pub fn into_message(self) -> Result<Message, Reject> {
        let (Some(id), Some(from), Some(to), Some(pair_id)) =
            (self.id, self.from, self.to, self.pair_id)
        else {
            return Err(Reject::MissingField);
        };

        pair::authorize(&from, &to, &pair_id)?;

        Ok(Message {
            id,
            from,
            to,
            kind: self.kind,
            content: self.message,
            media: self.image_data,
            pair_id,
        })
    }
}

/// A validated content message, ready to persist and forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub from: String,
    pub to: String,
    pub kind: String,
    pub content: String,
    pub media: Option<String>,
    pub pair_id: String,
}

// Clients send pair_id as a JSON number on some frames and a string on
// others; both are normalized here.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
