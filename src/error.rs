use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("malformed chat frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("websocket transport failed: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("no patient identifier configured; pass --patient-id or set PATIENT_CHAT_PATIENT_ID")]
    MissingPatientId,

    /// Chỉ giữ thông điệp: eframe::Error không phải `Send`.
    #[error("desktop window failed: {0}")]
    Ui(String),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;
