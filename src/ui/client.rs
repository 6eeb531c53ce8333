use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use tokio::sync::mpsc;

use crate::common::{
    HistoryEntry, IncomingChatMessage, OutgoingChatMessage, SocketCommand, SocketEvent,
};
use crate::config::{AppConfig, DecodePolicy};
use crate::network::ChatSocket;
use crate::network::endpoint::{chat_endpoint, warn_if_unroutable};
use crate::render::markdown_to_html;

use super::state::AppState;

pub const CHANNEL_CAPACITY: usize = 100;
const FALLBACK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub decode_policy: DecodePolicy,
    pub timestamp_format: String,
}

impl ClientOptions {
    pub fn new(decode_policy: DecodePolicy, timestamp_format: &str) -> Self {
        let timestamp_format = if is_valid_timestamp_format(timestamp_format) {
            timestamp_format.to_string()
        } else {
            log::warn!(
                "Invalid timestamp format `{timestamp_format}`; using `{FALLBACK_TIMESTAMP_FORMAT}`"
            );
            FALLBACK_TIMESTAMP_FORMAT.to_string()
        };
        Self {
            decode_policy,
            timestamp_format,
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new(DecodePolicy::default(), FALLBACK_TIMESTAMP_FORMAT)
    }
}

impl From<&AppConfig> for ClientOptions {
    fn from(config: &AppConfig) -> Self {
        Self::new(config.decode_policy, &config.timestamp_format)
    }
}

fn is_valid_timestamp_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Một phiên chat cho một bệnh nhân: biến form thành frame gửi đi và frame
/// nhận về thành mục lịch sử.
///
/// Patient id được giữ cố định từ lúc tạo. Các handler chạy trên luồng của
/// người gọi; I/O của socket nằm trong task [`ChatSocket`] riêng, nhận lệnh
/// qua command channel.
pub struct ChatClient {
    patient_id: String,
    endpoint: String,
    options: ClientOptions,
    command_sender: mpsc::Sender<SocketCommand>,
    state: AppState,
    closed: bool,
}

impl ChatClient {
    pub fn new(
        patient_id: String,
        endpoint: String,
        command_sender: mpsc::Sender<SocketCommand>,
        options: ClientOptions,
    ) -> Self {
        Self {
            patient_id,
            endpoint,
            options,
            command_sender,
            state: AppState::new(),
            closed: false,
        }
    }

    /// Dựng endpoint và spawn task socket, không chờ kết nối mở.
    /// Phải gọi bên trong tokio runtime.
    pub fn connect(
        host: &str,
        patient_id: impl Into<String>,
        options: ClientOptions,
    ) -> (Self, mpsc::Receiver<SocketEvent>) {
        let patient_id = patient_id.into();
        warn_if_unroutable(&patient_id);
        let endpoint = chat_endpoint(host, &patient_id);

        // ChatClient -> Socket
        let (command_sender, command_receiver) = mpsc::channel(CHANNEL_CAPACITY);
        // Socket -> ChatClient
        let (event_sender, event_receiver) = mpsc::channel(CHANNEL_CAPACITY);

        let socket = ChatSocket::new(endpoint.clone(), event_sender, command_receiver);
        tokio::spawn(async move {
            if let Err(err) = socket.run().await {
                log::debug!("Socket task ended: {err}");
            }
        });

        log::info!("Opening chat socket {endpoint}");
        let client = Self::new(patient_id, endpoint, command_sender, options);
        (client, event_receiver)
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Gửi nội dung ô nhập. Chuỗi rỗng hoặc toàn khoảng trắng bị bỏ qua và giữ nguyên.
    /// Sau `close()` thì không gửi gì nữa.
    ///
    /// Trả về `true` khi frame đã được chuyển cho socket.
    pub fn submit(&mut self) -> bool {
        if self.closed {
            log::warn!("Chat socket is closing; message not sent");
            return false;
        }
        let message = self.state.input_text.trim().to_string();
        if message.is_empty() {
            return false;
        }
        self.state.input_text.clear();

        let outgoing = OutgoingChatMessage {
            message,
            patient_id: self.patient_id.clone(),
        };

        match outgoing.to_frame() {
            Ok(frame) => {
                if let Err(err) = self.command_sender.try_send(SocketCommand::SendFrame(frame)) {
                    log::warn!("Failed to hand frame to socket: {err}");
                    false
                } else {
                    true
                }
            }
            Err(err) => {
                log::warn!("Failed to serialize message: {err}");
                false
            }
        }
    }

    pub fn handle_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::Opened => log::debug!("Chat socket open: {}", self.endpoint),
            SocketEvent::Frame(frame) => self.on_receive(&frame),
            SocketEvent::Error(detail) => log::error!("WebSocket error observed: {detail}"),
            SocketEvent::Closed { code, reason } if self.closed => {
                log::info!("Chat socket closed. Code: {code} Reason: {reason}");
            }
            SocketEvent::Closed { code, reason } => {
                log::error!("Chat socket closed unexpectedly. Code: {code} Reason: {reason}");
            }
        }
    }

    pub fn on_receive(&mut self, frame: &str) {
        let incoming = match IncomingChatMessage::decode(frame, self.options.decode_policy) {
            Ok(incoming) => incoming,
            Err(err) => {
                log::warn!("Dropping chat frame: {err}");
                return;
            }
        };

        let timestamp = Local::now()
            .format(&self.options.timestamp_format)
            .to_string();
        let html = markdown_to_html(&incoming.message);

        self.state.push_entry(HistoryEntry {
            sender: incoming.sender,
            source: incoming.message,
            html,
            timestamp,
        });
    }

    /// Yêu cầu socket đóng. Các lần submit sau đó chỉ ghi log và bị bỏ.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.command_sender.try_send(SocketCommand::Close) {
            log::debug!("Socket already gone while closing: {err}");
        }
    }
}
