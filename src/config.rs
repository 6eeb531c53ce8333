use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/chat.json";

/// Cách xử lý frame là JSON nhưng thiếu `message`/`sender`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Ghi log rồi bỏ frame.
    Reject,
    /// Hiển thị trường thiếu bằng chữ `undefined`. Server gửi lỗi dạng
    /// `{"message": "Error: ..."}` không có `sender`.
    #[default]
    Placeholder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `host[:port]` của chat server.
    pub host: String,
    pub patient_id: Option<String>,
    pub decode_policy: DecodePolicy,
    /// Mẫu `strftime` cho thời điểm nhận (giờ máy).
    pub timestamp_format: String,
    pub window_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:8000".to_string(),
            patient_id: None,
            decode_policy: DecodePolicy::default(),
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            window_title: "Patient Chat".to_string(),
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}
