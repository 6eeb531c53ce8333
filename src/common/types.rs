use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DecodePolicy;
use crate::error::ChatError;

/// Chữ hiển thị thay cho trường server bỏ trống.
pub const MISSING_FIELD_PLACEHOLDER: &str = "undefined";

/// Frame gửi lên server khi người dùng submit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingChatMessage {
    pub message: String,
    pub patient_id: String,
}

impl OutgoingChatMessage {
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Frame nhận từ server; `message` là markdown, `sender` chỉ dùng để gắn nhãn.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IncomingChatMessage {
    pub message: String,
    pub sender: String,
}

impl IncomingChatMessage {
    /// Giải mã một text frame.
    ///
    /// Frame không phải JSON luôn bị loại. Với [`DecodePolicy::Placeholder`]
    /// trường thiếu hoặc null thành chữ `undefined`; với
    /// [`DecodePolicy::Reject`] đó là lỗi.
    pub fn decode(frame: &str, policy: DecodePolicy) -> Result<Self, ChatError> {
        match policy {
            DecodePolicy::Reject => Ok(serde_json::from_str(frame)?),
            DecodePolicy::Placeholder => {
                let value: Value = serde_json::from_str(frame)?;
                Ok(Self {
                    message: field_or_placeholder(&value, "message"),
                    sender: field_or_placeholder(&value, "sender"),
                })
            }
        }
    }
}

fn field_or_placeholder(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => MISSING_FIELD_PLACEHOLDER.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Một mục đã render trong lịch sử chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub sender: String,
    /// Markdown gốc, giữ lại để giao diện desktop dàn rich text.
    pub source: String,
    pub html: String,
    /// Thời điểm nhận theo giờ máy, đã format.
    pub timestamp: String,
}
